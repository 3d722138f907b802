//! Meaning-preserving transformations of boolean expressions:
//! simplify them, and bring them into conjunctive or disjunctive
//! normal form, either by distribution or by Tseitin encoding.

mod clause;
mod formula;
mod simplify;
mod tseitin;

use thiserror::Error;

use cnfgen_syntax::Expr;

pub use clause::{Clause, Cnf, Conjunction, Disjunction, Dnf, Literal};
pub use formula::{counterexample, equivalent, Formula, Interpretation, Variables};
pub use simplify::simplify;
pub use tseitin::{tseitin_cnf, FRESH_PREFIX};

#[derive(Debug, Error)]
pub enum NormalError {
    #[error("normal form {normal} is not equivalent to {expr}: they differ when exactly {{{model}}} are true")]
    NotEquivalent {
        expr: String,
        normal: String,
        model: String,
    },
}

/// Negation normal form.
pub fn nnf(expr: Expr) -> Clause {
    Clause::nnf(expr)
}

/// Conjunctive normal form by distribution, which can blow up
/// exponentially; see [`tseitin_cnf`] for a linear alternative.
pub fn exp_cnf(expr: Expr) -> Cnf {
    nnf(expr).cnf().simplify()
}

/// Disjunctive normal form by distribution.
pub fn exp_dnf(expr: Expr) -> Dnf {
    nnf(expr).dnf().simplify()
}

/// Render a CNF in the std grammar, e.g. `(a | ~b) & c`.
pub fn print_expr(cnf: &Cnf) -> String {
    cnf.to_string()
}

/// Check by truth table that `normal` means the same as `expr`.
pub fn verify<F>(expr: &Expr, normal: &F) -> Result<(), NormalError>
where
    F: Formula + Variables + std::fmt::Display,
{
    match counterexample(expr, normal) {
        None => Ok(()),
        Some(model) => Err(NormalError::NotEquivalent {
            expr: expr.to_string(),
            normal: normal.to_string(),
            model: model
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
