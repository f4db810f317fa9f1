// quadlin_core/src/symbolic/substitution.rs

use super::expr::{Expr, Symbol};
use crate::error::LinearizationError;
use std::collections::BTreeMap;

/// An assignment of expressions to symbols.
///
/// Replacement is a single pass: the bound expressions are inserted as-is and
/// are not themselves searched for further bound symbols. Apply successive
/// substitutions to resolve chains such as `F -> m*g` followed by `m -> 0.027`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: BTreeMap<Symbol, Expr>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, symbol: Symbol, value: impl Into<Expr>) -> &mut Self {
        self.bindings.insert(symbol, value.into());
        self
    }

    pub fn bind_value(&mut self, symbol: Symbol, value: f64) -> &mut Self {
        self.bind(symbol, Expr::Const(value))
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.bindings.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.bindings.iter()
    }
}

impl FromIterator<(Symbol, Expr)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Symbol, Expr)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl Expr {
    /// Replaces every bound symbol and re-simplifies bottom-up.
    pub fn substitute(&self, subs: &Substitution) -> Expr {
        match self {
            Expr::Const(v) => Expr::Const(*v),
            Expr::Sym(s) => subs.get(s).cloned().unwrap_or_else(|| Expr::Sym(s.clone())),
            Expr::Add(l, r) => l.substitute(subs) + r.substitute(subs),
            Expr::Mul(l, r) => l.substitute(subs) * r.substitute(subs),
            Expr::Div(l, r) => l.substitute(subs) / r.substitute(subs),
            Expr::Neg(e) => -e.substitute(subs),
            Expr::Powi(b, n) => Expr::powi(b.substitute(subs), *n),
            Expr::Sin(e) => Expr::sin(e.substitute(subs)),
            Expr::Cos(e) => Expr::cos(e.substitute(subs)),
            Expr::Tan(e) => Expr::tan(e.substitute(subs)),
        }
    }

    /// Reduces the expression to a floating-point number.
    ///
    /// Fails with [`LinearizationError::UnboundSymbol`] naming the first free
    /// symbol found; callers that know which matrix entry they are reducing
    /// re-map it to `ResidualSymbol`.
    pub fn evaluate(&self) -> Result<f64, LinearizationError> {
        let value = match self {
            Expr::Const(v) => *v,
            Expr::Sym(s) => {
                return Err(LinearizationError::UnboundSymbol {
                    symbol: s.name().to_string(),
                })
            }
            Expr::Add(l, r) => l.evaluate()? + r.evaluate()?,
            Expr::Mul(l, r) => l.evaluate()? * r.evaluate()?,
            Expr::Div(l, r) => l.evaluate()? / r.evaluate()?,
            Expr::Neg(e) => -e.evaluate()?,
            Expr::Powi(b, n) => b.evaluate()?.powi(*n),
            Expr::Sin(e) => e.evaluate()?.sin(),
            Expr::Cos(e) => e.evaluate()?.cos(),
            Expr::Tan(e) => e.evaluate()?.tan(),
        };
        Ok(value)
    }
}
