//! Evaluating expressions and normal forms under an interpretation,
//! and comparing them by truth table.

use std::collections::BTreeSet;

use gray_codes::{InclusionExclusion, SetMutation};

use cnfgen_syntax::{Expr, Symbol};

use crate::clause::*;

/// An interpretation is a set of variables interpreted as true.
/// Any variable not contained in the set is interpreted as false.
pub type Interpretation = BTreeSet<Symbol>;

/// Collect the variables a formula mentions.
pub trait Variables {
    fn variables(&self, vars: &mut BTreeSet<Symbol>);
}

/// Evaluate a formula with respect to an interpretation;
/// i.e., ask "is this interpretation a model of `self`?"
pub trait Formula {
    fn eval(&self, interp: &Interpretation) -> bool;
}

impl Variables for Expr {
    fn variables(&self, vars: &mut BTreeSet<Symbol>) {
        vars.extend(Expr::variables(self));
    }
}

impl Formula for Expr {
    fn eval(&self, interp: &Interpretation) -> bool {
        match self {
            Expr::Const(b) => *b,
            Expr::Var(v) => interp.contains(v),
            Expr::Not(e) => !e.eval(interp),
            Expr::Binary(l, op, r) => op.eval(l.eval(interp), r.eval(interp)),
        }
    }
}

impl Variables for Literal {
    fn variables(&self, vars: &mut BTreeSet<Symbol>) {
        vars.insert(self.var.clone());
    }
}

impl Formula for Literal {
    fn eval(&self, interp: &Interpretation) -> bool {
        interp.contains(&self.var) == self.positive
    }
}

impl<T: Variables> Variables for Conjunction<T> {
    fn variables(&self, vars: &mut BTreeSet<Symbol>) {
        for c in self.iter() {
            c.variables(vars);
        }
    }
}

impl<T: Formula> Formula for Conjunction<T> {
    fn eval(&self, interp: &Interpretation) -> bool {
        self.iter().all(|c| c.eval(interp))
    }
}

impl<T: Variables> Variables for Disjunction<T> {
    fn variables(&self, vars: &mut BTreeSet<Symbol>) {
        for d in self.iter() {
            d.variables(vars);
        }
    }
}

impl<T: Formula> Formula for Disjunction<T> {
    fn eval(&self, interp: &Interpretation) -> bool {
        self.iter().any(|d| d.eval(interp))
    }
}

impl Variables for Clause {
    fn variables(&self, vars: &mut BTreeSet<Symbol>) {
        match self {
            Self::Lit(l) => l.variables(vars),
            Self::And(c) => c.variables(vars),
            Self::Or(d) => d.variables(vars),
        }
    }
}

impl Formula for Clause {
    fn eval(&self, interp: &Interpretation) -> bool {
        match self {
            Self::Lit(l) => l.eval(interp),
            Self::And(c) => c.eval(interp),
            Self::Or(d) => d.eval(interp),
        }
    }
}

/// Walk every interpretation of the variables of `f` and `g` in
/// Gray-code order (one insertion or removal per step), and return
/// the first one on which they disagree.
pub fn counterexample<F, G>(f: &F, g: &G) -> Option<Interpretation>
where
    F: Formula + Variables,
    G: Formula + Variables,
{
    let mut vars = BTreeSet::new();
    f.variables(&mut vars);
    g.variables(&mut vars);
    let vars = vars.into_iter().collect::<Vec<_>>();

    let mut interp = Interpretation::new();
    if f.eval(&interp) != g.eval(&interp) {
        return Some(interp);
    }
    if vars.is_empty() {
        return None;
    }
    for mutation in InclusionExclusion::of_len(vars.len()) {
        match mutation {
            SetMutation::Insert(i) => interp.insert(vars[i].clone()),
            SetMutation::Remove(i) => interp.remove(&vars[i]),
        };
        if f.eval(&interp) != g.eval(&interp) {
            return Some(interp);
        }
    }
    None
}

/// Do `f` and `g` agree on every interpretation?
pub fn equivalent<F, G>(f: &F, g: &G) -> bool
where
    F: Formula + Variables,
    G: Formula + Variables,
{
    counterexample(f, g).is_none()
}
