// quadlin_core/src/symbolic/calculus.rs

use super::expr::{Expr, Symbol};
use crate::error::LinearizationError;

impl Expr {
    /// Partial derivative with respect to a time-varying symbol.
    ///
    /// Every other symbol, time-varying or not, is held constant. Asking for a
    /// derivative with respect to a parameter is a modelling mistake and
    /// returns [`LinearizationError::MalformedState`].
    pub fn derivative(&self, var: &Symbol) -> Result<Expr, LinearizationError> {
        if !var.is_time_varying() {
            return Err(LinearizationError::MalformedState {
                symbol: var.name().to_string(),
            });
        }
        Ok(self.partial(var))
    }

    fn partial(&self, var: &Symbol) -> Expr {
        match self {
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Sym(s) => {
                if s == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Add(l, r) => l.partial(var) + r.partial(var),
            Expr::Neg(e) => -e.partial(var),
            // d(uv) = u'v + uv'
            Expr::Mul(l, r) => {
                l.partial(var) * r.as_ref().clone() + l.as_ref().clone() * r.partial(var)
            }
            // d(u/v) = u'/v - u v' / v^2, collapsing to u'/v when v is constant in `var`
            Expr::Div(l, r) => {
                let dl = l.partial(var);
                let dr = r.partial(var);
                let first = dl / r.as_ref().clone();
                if dr.is_const_zero() {
                    first
                } else {
                    first - l.as_ref().clone() * dr / Expr::powi(r.as_ref().clone(), 2)
                }
            }
            // d(u^n) = n u^(n-1) u'
            Expr::Powi(b, n) => {
                Expr::from(*n as f64) * Expr::powi(b.as_ref().clone(), n - 1) * b.partial(var)
            }
            Expr::Sin(e) => Expr::cos(e.as_ref().clone()) * e.partial(var),
            Expr::Cos(e) => -(Expr::sin(e.as_ref().clone()) * e.partial(var)),
            // d(tan u) = u' / cos^2 u
            Expr::Tan(e) => e.partial(var) / Expr::powi(Expr::cos(e.as_ref().clone()), 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Substitution;
    use approx::assert_abs_diff_eq;

    fn eval_at(e: &Expr, var: &Symbol, value: f64) -> f64 {
        let mut subs = Substitution::new();
        subs.bind_value(var.clone(), value);
        e.substitute(&subs).evaluate().unwrap()
    }

    #[test]
    fn test_derivative_of_product_and_trig() {
        let th = Symbol::time_varying("theta");
        let u = Symbol::time_varying("u");
        // f = -u sin(theta)
        let f = -(u.expr() * Expr::sin(th.expr()));
        let df_dth = f.derivative(&th).unwrap();

        let mut subs = Substitution::new();
        subs.bind_value(th.clone(), 0.3);
        subs.bind_value(u.clone(), 2.0);
        let value = df_dth.substitute(&subs).evaluate().unwrap();
        assert_abs_diff_eq!(value, -2.0 * 0.3_f64.cos(), epsilon = 1e-15);

        let df_du = f.derivative(&u).unwrap();
        let value = df_du.substitute(&subs).evaluate().unwrap();
        assert_abs_diff_eq!(value, -(0.3_f64.sin()), epsilon = 1e-15);
    }

    #[test]
    fn test_derivative_of_quotient_and_tan() {
        let x = Symbol::time_varying("x");
        // f = tan(x) / cos(x)
        let f = Expr::tan(x.expr()) / Expr::cos(x.expr());
        let df = f.derivative(&x).unwrap();
        let at = 0.4_f64;
        let expected = 1.0 / at.cos().powi(3) + at.tan() * at.sin() / at.cos().powi(2);
        assert_abs_diff_eq!(eval_at(&df, &x, at), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_of_power() {
        let x = Symbol::time_varying("x");
        let f = Expr::powi(x.expr(), 3);
        let df = f.derivative(&x).unwrap();
        assert_abs_diff_eq!(eval_at(&df, &x, 2.0), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_independent_symbol_has_zero_derivative() {
        let x = Symbol::time_varying("x");
        let y = Symbol::time_varying("y");
        let m = Symbol::parameter("m");
        let f = Expr::sin(y.expr()) / m.expr();
        assert!(f.derivative(&x).unwrap().is_const_zero());
    }

    #[test]
    fn test_derivative_wrt_parameter_is_malformed() {
        let m = Symbol::parameter("m");
        let f = m.expr() * Expr::from(2.0);
        assert_eq!(
            f.derivative(&m),
            Err(LinearizationError::MalformedState {
                symbol: "m".to_string()
            })
        );
    }
}
