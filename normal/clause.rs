//! Compositional clauses: formulas built from literals with conjunctions
//! & disjunctions, and their conjunctive & disjunctive normal forms.
//! The normalization routines were adapted from [Stuart Russel's beautiful
//! Common Lisp code](https://people.eecs.berkeley.edu/~russell/code/logic/algorithms/normal.lisp).

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;
use std::vec;

use cnfgen_syntax::{BinOp, Expr, Symbol};

/// A variable or its negation.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Literal {
    pub var: Symbol,
    pub positive: bool,
}

impl Literal {
    pub fn new(var: Symbol, positive: bool) -> Self {
        Self { var, positive }
    }

    pub fn pos(var: impl Into<Symbol>) -> Self {
        Self::new(var.into(), true)
    }

    pub fn neg(var: impl Into<Symbol>) -> Self {
        Self::new(var.into(), false)
    }

    pub fn negate(self) -> Self {
        Self {
            positive: !self.positive,
            ..self
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            self.var.fmt(f)
        } else {
            f.write_fmt(format_args!("~{}", self.var))
        }
    }
}

/// Does this need parentheses when it appears inside another junction?
pub trait Grouped {
    fn needs_parens(&self) -> bool;
}

impl Grouped for Literal {
    fn needs_parens(&self) -> bool {
        false
    }
}

/// Join `items` with `op` in the std grammar, writing `empty` if
/// there are none and parenthesizing compound items.
fn write_junction<'a, T>(
    f: &mut fmt::Formatter<'_>,
    items: impl ExactSizeIterator<Item = &'a T>,
    op: BinOp,
    empty: &str,
) -> fmt::Result
where
    T: fmt::Display + Grouped + 'a,
{
    if items.len() == 0 {
        return f.write_str(empty);
    }
    let s = items
        .map(|x| {
            if x.needs_parens() {
                format!("({x})")
            } else {
                x.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&format!(" {op} "));
    f.write_str(&s)
}

/// Conjunction means _and_. It is spelled "&" in the std grammar.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Conjunction<T>(Vec<T>);

impl<T> Conjunction<T> {
    /// The empty conjunction is _true_.
    pub fn t() -> Self {
        Self(Vec::new())
    }

    pub fn and_also(mut self, conjuncts: impl IntoIterator<Item = T>) -> Self {
        self.0.extend(conjuncts);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Default for Conjunction<T> {
    fn default() -> Self {
        Self::t()
    }
}

impl<T> Index<usize> for Conjunction<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl<T> FromIterator<T> for Conjunction<T> {
    fn from_iter<I: IntoIterator<Item = T>>(conjuncts: I) -> Self {
        Self(conjuncts.into_iter().collect())
    }
}

impl<T> Extend<T> for Conjunction<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, conjuncts: I) {
        self.0.extend(conjuncts)
    }
}

impl<T> IntoIterator for Conjunction<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T> Grouped for Conjunction<T> {
    fn needs_parens(&self) -> bool {
        self.len() > 1
    }
}

impl<T> fmt::Display for Conjunction<T>
where
    T: fmt::Display + Grouped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_junction(f, self.iter(), BinOp::And, "1")
    }
}

/// Disjunction means _or_. It is spelled "|" in the std grammar.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Disjunction<T>(Vec<T>);

impl<T> Disjunction<T> {
    /// The empty disjunction is _false_.
    pub fn f() -> Self {
        Self(Vec::new())
    }

    pub fn or_else(mut self, disjuncts: impl IntoIterator<Item = T>) -> Self {
        self.0.extend(disjuncts);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Default for Disjunction<T> {
    fn default() -> Self {
        Self::f()
    }
}

impl<T> Index<usize> for Disjunction<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl<T> FromIterator<T> for Disjunction<T> {
    fn from_iter<I: IntoIterator<Item = T>>(disjuncts: I) -> Self {
        Self(disjuncts.into_iter().collect())
    }
}

impl<T> Extend<T> for Disjunction<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, disjuncts: I) {
        self.0.extend(disjuncts)
    }
}

impl<T> IntoIterator for Disjunction<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T> Grouped for Disjunction<T> {
    fn needs_parens(&self) -> bool {
        self.len() > 1
    }
}

impl<T> fmt::Display for Disjunction<T>
where
    T: fmt::Display + Grouped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_junction(f, self.iter(), BinOp::Or, "0")
    }
}

/// A literal, conjunction, or disjunction of literals:
/// an expression in negation normal form.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Clause {
    Lit(Literal),
    And(Conjunction<Clause>),
    Or(Disjunction<Clause>),
}

impl Clause {
    pub fn t() -> Self {
        Self::And(Conjunction::t())
    }

    /// Conjoin `conjuncts`, splicing in the items of nested conjunctions.
    pub fn and(conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        let mut c = Conjunction::t();
        for conjunct in conjuncts {
            match conjunct {
                Self::And(nested) => c.extend(nested),
                other => c.extend([other]),
            }
        }
        Self::And(c)
    }

    pub fn f() -> Self {
        Self::Or(Disjunction::f())
    }

    /// Disjoin `disjuncts`, splicing in the items of nested disjunctions.
    pub fn or(disjuncts: impl IntoIterator<Item = Clause>) -> Self {
        let mut d = Disjunction::f();
        for disjunct in disjuncts {
            match disjunct {
                Self::Or(nested) => d.extend(nested),
                other => d.extend([other]),
            }
        }
        Self::Or(d)
    }

    pub fn negate(self) -> Self {
        match self {
            Self::Lit(l) => Self::Lit(l.negate()),
            Self::And(c) => Self::or(c.into_iter().map(Self::negate)),
            Self::Or(d) => Self::and(d.into_iter().map(Self::negate)),
        }
    }

    /// Negation normal form of `expr`: only literals under
    /// conjunctions & disjunctions. Constants become the empty
    /// conjunction (true) or the empty disjunction (false).
    pub fn nnf(expr: Expr) -> Self {
        Self::nnf_signed(expr, true)
    }

    fn nnf_signed(mut expr: Expr, mut positive: bool) -> Self {
        use BinOp::*;
        while let Expr::Not(e) = expr {
            expr = *e;
            positive = !positive;
        }
        match expr {
            Expr::Const(b) if b == positive => Self::t(),
            Expr::Const(_) => Self::f(),
            Expr::Var(v) => Self::Lit(Literal::new(v, positive)),
            Expr::Not(e) => Self::nnf_signed(*e, !positive),
            Expr::Binary(l, op, r) => {
                let (l, r) = (*l, *r);
                match (op, positive) {
                    (And, true) | (Or, false) => Self::and(
                        operands(l, op, r)
                            .into_iter()
                            .map(|e| Self::nnf_signed(e, positive)),
                    ),
                    (Or, true) | (And, false) => Self::or(
                        operands(l, op, r)
                            .into_iter()
                            .map(|e| Self::nnf_signed(e, positive)),
                    ),
                    (Implies, true) => {
                        Self::or([Self::nnf_signed(l, false), Self::nnf_signed(r, true)])
                    }
                    (Implies, false) => {
                        Self::and([Self::nnf_signed(l, true), Self::nnf_signed(r, false)])
                    }
                    // l <=> r  ≡  (~l | r) & (l | ~r)
                    (Iff, true) | (Xor, false) => Self::and([
                        Self::or([Self::nnf_signed(l.clone(), false), Self::nnf_signed(r.clone(), true)]),
                        Self::or([Self::nnf_signed(l, true), Self::nnf_signed(r, false)]),
                    ]),
                    // l ^ r  ≡  (l | r) & (~l | ~r)
                    (Xor, true) | (Iff, false) => Self::and([
                        Self::or([Self::nnf_signed(l.clone(), true), Self::nnf_signed(r.clone(), true)]),
                        Self::or([Self::nnf_signed(l, false), Self::nnf_signed(r, false)]),
                    ]),
                }
            }
        }
    }
}

/// The operands of a chain of `op`s, left to right, gathered
/// without recursion so that long chains can't exhaust the stack.
fn operands(l: Expr, op: BinOp, r: Expr) -> Vec<Expr> {
    let mut stack = vec![r, l];
    let mut operands = Vec::new();
    while let Some(e) = stack.pop() {
        match e {
            Expr::Binary(l, o, r) if o == op => {
                stack.push(*r);
                stack.push(*l);
            }
            e => operands.push(e),
        }
    }
    operands
}

impl IntoIterator for Clause {
    type Item = Clause;
    type IntoIter = vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Lit(_) => vec![self].into_iter(),
            Self::And(c) => c.into_iter(),
            Self::Or(d) => d.into_iter(),
        }
    }
}

impl Grouped for Clause {
    fn needs_parens(&self) -> bool {
        match self {
            Self::Lit(l) => l.needs_parens(),
            Self::And(c) => c.needs_parens(),
            Self::Or(d) => d.needs_parens(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit(l) => l.fmt(f),
            Self::And(c) => c.fmt(f),
            Self::Or(d) => d.fmt(f),
        }
    }
}

/// Conjuctive normal form.
pub type Cnf = Conjunction<Disjunction<Literal>>;

/// Disjunctive normal form.
pub type Dnf = Disjunction<Conjunction<Literal>>;

impl Clause {
    /// Normalize to CNF.
    pub fn cnf(self) -> Cnf {
        match self {
            Self::Lit(l) => Conjunction::from_iter([Disjunction::from_iter([l])]),
            Self::And(c) => c
                .into_iter()
                .fold(Conjunction::default(), |cnf, c| cnf.and_also(c.cnf())),
            Self::Or(d) => merge_arguments(d.into_iter().map(Self::cnf).collect()),
        }
    }

    /// Normalize to DNF.
    pub fn dnf(self) -> Dnf {
        match self {
            Self::Lit(l) => Disjunction::from_iter([Conjunction::from_iter([l])]),
            Self::And(c) => merge_arguments(c.into_iter().map(Self::dnf).collect()),
            Self::Or(d) => d
                .into_iter()
                .fold(Disjunction::default(), |dnf, d| dnf.or_else(d.dnf())),
        }
    }
}

/// Helper for C/DNF conversion: distribute the outer connective
/// over the inner one, taking one group from each argument.
/// Groups of earlier arguments vary fastest.
fn merge_arguments<F, G, Y>(args: Vec<F>) -> F
where
    F: IntoIterator<Item = G> + FromIterator<G>,
    G: IntoIterator<Item = Y> + Extend<Y> + Clone + Default,
{
    args.into_iter().fold(F::from_iter([G::default()]), |merged, arg| {
        let arg = arg.into_iter().collect::<Vec<G>>();
        if let [x] = &arg[..] {
            // One group: extend in place rather than copy every prefix.
            return merged
                .into_iter()
                .map(|mut y| {
                    y.extend(x.clone());
                    y
                })
                .collect();
        }
        let merged = merged.into_iter().collect::<Vec<G>>();
        arg.into_iter()
            .flat_map(|x| {
                merged.iter().cloned().map(move |mut y| {
                    y.extend(x.clone());
                    y
                })
            })
            .collect()
    })
}

/// Tidy groups of literals (clauses of a CNF, or terms of a DNF):
/// drop repeated literals within a group, then groups that contain
/// a complementary pair, then repeated groups, then any group that
/// is a strict superset of another. Order is otherwise preserved.
fn reduce(groups: Vec<Vec<Literal>>) -> Vec<Vec<Literal>> {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::<(Vec<Literal>, BTreeSet<Literal>)>::new();
    for group in groups {
        let mut set = BTreeSet::new();
        let lits = group
            .into_iter()
            .filter(|l| set.insert(l.clone()))
            .collect::<Vec<_>>();
        if lits.iter().any(|l| set.contains(&l.clone().negate())) {
            continue;
        }
        if seen.insert(set.clone()) {
            kept.push((lits, set));
        }
    }

    // Only a strictly shorter group can subsume another.
    let mut by_len = kept.iter().map(|(_, set)| set).collect::<Vec<_>>();
    by_len.sort_by_key(|set| set.len());
    let subsumed = kept
        .iter()
        .map(|(_, set)| {
            let shorter = by_len.partition_point(|other| other.len() < set.len());
            by_len[..shorter].iter().any(|other| other.is_subset(set))
        })
        .collect::<Vec<_>>();
    kept.into_iter()
        .zip(subsumed)
        .filter_map(|((lits, _), subsumed)| (!subsumed).then_some(lits))
        .collect()
}

impl Cnf {
    /// Turn CNF back into a clause (for conversion to DNF).
    pub fn clause(self) -> Clause {
        Clause::and(
            self.into_iter()
                .map(|x| Clause::or(x.into_iter().map(Clause::Lit))),
        )
    }

    /// Convert CNF → DNF
    pub fn dnf(self) -> Dnf {
        self.clause().dnf()
    }

    /// Remove redundant literals and clauses; see [`reduce`].
    pub fn simplify(self) -> Self {
        reduce(self.into_iter().map(|d| d.into_iter().collect()).collect())
            .into_iter()
            .map(Disjunction::from_iter)
            .collect()
    }

    /// Is this the trivially false CNF (containing the empty clause)?
    pub fn is_contradiction(&self) -> bool {
        self.iter().any(Disjunction::is_empty)
    }
}

impl Dnf {
    /// Turn DNF back into a clause (for conversion to CNF).
    pub fn clause(self) -> Clause {
        Clause::or(
            self.into_iter()
                .map(|x| Clause::and(x.into_iter().map(Clause::Lit))),
        )
    }

    /// Convert DNF → CNF
    pub fn cnf(self) -> Cnf {
        self.clause().cnf()
    }

    /// Remove redundant literals and terms; see [`reduce`].
    pub fn simplify(self) -> Self {
        reduce(self.into_iter().map(|c| c.into_iter().collect()).collect())
            .into_iter()
            .map(Conjunction::from_iter)
            .collect()
    }
}
