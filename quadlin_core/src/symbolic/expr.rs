// quadlin_core/src/symbolic/expr.rs

use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Whether a symbol is a function of time or a fixed constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    /// A state or input component, e.g. `theta(t)`.
    TimeVarying,
    /// A physical constant such as mass or gravity.
    Parameter,
}

/// A named scalar appearing in an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn time_varying(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::TimeVarying,
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_time_varying(&self) -> bool {
        self.kind == SymbolKind::TimeVarying
    }

    /// Lifts the symbol into an expression leaf.
    pub fn expr(&self) -> Expr {
        Expr::Sym(self.clone())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::TimeVarying => write!(f, "{}(t)", self.name),
            SymbolKind::Parameter => write!(f, "{}", self.name),
        }
    }
}

/// An immutable symbolic expression tree.
///
/// Use the smart constructors (or the operator overloads, which call them)
/// rather than building variants directly: they fold constants and drop
/// neutral elements, which keeps Jacobians of trigonometric models small and
/// makes fully-substituted expressions collapse to a single [`Expr::Const`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Sym(Symbol),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Powi(Box<Expr>, i32),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    /// Returns the numeric value if the expression has been reduced to a constant.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_const_zero(&self) -> bool {
        matches!(self, Expr::Const(v) if *v == 0.0)
    }

    pub fn is_const_one(&self) -> bool {
        matches!(self, Expr::Const(v) if *v == 1.0)
    }

    /// Leaves and function calls print without needing parentheses.
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Expr::Const(_) | Expr::Sym(_) | Expr::Sin(_) | Expr::Cos(_) | Expr::Tan(_) | Expr::Add(..)
        )
    }

    pub fn sum(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
            (l, r) if l.is_const_zero() => r,
            (l, r) if r.is_const_zero() => l,
            (l, Expr::Neg(r)) => Expr::difference(l, *r),
            (l, r) => Expr::Add(Box::new(l), Box::new(r)),
        }
    }

    pub fn difference(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
            (l, r) if r.is_const_zero() => l,
            (l, r) if l.is_const_zero() => Expr::negate(r),
            (l, Expr::Neg(r)) => Expr::sum(l, *r),
            (l, r) => Expr::Add(Box::new(l), Box::new(Expr::Neg(Box::new(r)))),
        }
    }

    pub fn product(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
            (l, r) if l.is_const_zero() || r.is_const_zero() => Expr::Const(0.0),
            (l, r) if l.is_const_one() => r,
            (l, r) if r.is_const_one() => l,
            (Expr::Neg(l), Expr::Neg(r)) => Expr::product(*l, *r),
            (Expr::Neg(l), r) => Expr::negate(Expr::product(*l, r)),
            (l, Expr::Neg(r)) => Expr::negate(Expr::product(l, *r)),
            (Expr::Const(c), r) if c == -1.0 => Expr::negate(r),
            (l, Expr::Const(c)) if c == -1.0 => Expr::negate(l),
            (l, r) => Expr::Mul(Box::new(l), Box::new(r)),
        }
    }

    pub fn quotient(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) if b != 0.0 => Expr::Const(a / b),
            (l, _) if l.is_const_zero() => Expr::Const(0.0),
            (l, r) if r.is_const_one() => l,
            (Expr::Neg(l), r) => Expr::negate(Expr::quotient(*l, r)),
            (l, r) => Expr::Div(Box::new(l), Box::new(r)),
        }
    }

    pub fn negate(inner: Expr) -> Expr {
        match inner {
            Expr::Const(a) => Expr::Const(-a),
            Expr::Neg(e) => *e,
            e => Expr::Neg(Box::new(e)),
        }
    }

    pub fn powi(base: Expr, exponent: i32) -> Expr {
        match (base, exponent) {
            (_, 0) => Expr::Const(1.0),
            (b, 1) => b,
            (Expr::Const(a), n) => Expr::Const(a.powi(n)),
            (b, n) => Expr::Powi(Box::new(b), n),
        }
    }

    pub fn sin(arg: Expr) -> Expr {
        match arg {
            Expr::Const(a) => Expr::Const(a.sin()),
            e => Expr::Sin(Box::new(e)),
        }
    }

    pub fn cos(arg: Expr) -> Expr {
        match arg {
            Expr::Const(a) => Expr::Const(a.cos()),
            e => Expr::Cos(Box::new(e)),
        }
    }

    pub fn tan(arg: Expr) -> Expr {
        match arg {
            Expr::Const(a) => Expr::Const(a.tan()),
            e => Expr::Tan(Box::new(e)),
        }
    }

    /// Visits every symbol leaf in the tree, depth first, left to right.
    pub fn for_each_symbol<'a>(&'a self, visit: &mut dyn FnMut(&'a Symbol)) {
        match self {
            Expr::Const(_) => {}
            Expr::Sym(s) => visit(s),
            Expr::Add(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                l.for_each_symbol(visit);
                r.for_each_symbol(visit);
            }
            Expr::Neg(e) | Expr::Powi(e, _) | Expr::Sin(e) | Expr::Cos(e) | Expr::Tan(e) => {
                e.for_each_symbol(visit)
            }
        }
    }

    /// The first free symbol in the tree, if any.
    pub fn first_symbol(&self) -> Option<&Symbol> {
        let mut found = None;
        self.for_each_symbol(&mut |s| {
            if found.is_none() {
                found = Some(s);
            }
        });
        found
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

// --- Operator overloads ---
// They forward to the simplifying constructors above so model code can be
// written as ordinary arithmetic.

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::sum(self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::difference(self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::product(self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::quotient(self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

// The compound-assignment forms let `Expr` act as a nalgebra scalar, so
// rotation matrices and cross products can be written with `Matrix3<Expr>`.

impl AddAssign for Expr {
    fn add_assign(&mut self, rhs: Expr) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs + rhs;
    }
}

impl SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Expr) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs - rhs;
    }
}

impl MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Expr) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs * rhs;
    }
}

impl DivAssign for Expr {
    fn div_assign(&mut self, rhs: Expr) {
        let lhs = std::mem::replace(self, Expr::Const(0.0));
        *self = lhs / rhs;
    }
}

impl Zero for Expr {
    fn zero() -> Self {
        Expr::Const(0.0)
    }

    fn is_zero(&self) -> bool {
        self.is_const_zero()
    }
}

impl One for Expr {
    fn one() -> Self {
        Expr::Const(1.0)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{}", v),
            Expr::Sym(s) => write!(f, "{}", s),
            Expr::Add(l, r) => match r.as_ref() {
                Expr::Neg(inner) => write!(f, "({} - {})", l, inner),
                _ => write!(f, "({} + {})", l, r),
            },
            Expr::Mul(l, r) => write!(f, "{}*{}", l, r),
            Expr::Div(l, r) if r.is_atomic() => write!(f, "{}/{}", l, r),
            Expr::Div(l, r) => write!(f, "{}/({})", l, r),
            Expr::Neg(e) => write!(f, "-{}", e),
            Expr::Powi(b, n) if b.is_atomic() => write!(f, "{}^{}", b, n),
            Expr::Powi(b, n) => write!(f, "({})^{}", b, n),
            Expr::Sin(e) => write!(f, "sin({})", e),
            Expr::Cos(e) => write!(f, "cos({})", e),
            Expr::Tan(e) => write!(f, "tan({})", e),
        }
    }
}
