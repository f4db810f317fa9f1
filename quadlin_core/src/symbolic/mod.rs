// quadlin_core/src/symbolic/mod.rs

//! A small computer-algebra layer: expression trees over named
//! symbols, exact partial derivatives, substitution and numeric reduction.
//! It covers exactly the operators the rigid-body models need.

mod calculus;
mod expr;
mod substitution;

pub use expr::{Expr, Symbol, SymbolKind};
pub use substitution::Substitution;
