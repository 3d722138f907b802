//! Equisatisfiable CNF by the Tseitin transformation: one fresh
//! variable per connective, so the output grows linearly.

use std::collections::BTreeSet;

use cnfgen_syntax::{BinOp, Expr, Symbol};

use crate::clause::*;
use crate::simplify::simplify;

/// Fresh variables are named with this prefix and a counter.
pub const FRESH_PREFIX: &str = "_t";

struct Encoder {
    used: BTreeSet<Symbol>,
    next: usize,
    clauses: Vec<Disjunction<Literal>>,
}

impl Encoder {
    fn new(used: BTreeSet<Symbol>) -> Self {
        Self {
            used,
            next: 0,
            clauses: Vec::new(),
        }
    }

    /// The next `_t<n>` not already taken.
    fn fresh(&mut self) -> Symbol {
        loop {
            let name = Symbol::new(format!("{FRESH_PREFIX}{}", self.next));
            self.next += 1;
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }

    fn clause(&mut self, lits: impl IntoIterator<Item = Literal>) {
        self.clauses.push(Disjunction::from_iter(lits));
    }

    /// Return a literal equivalent to `expr` under the clauses
    /// emitted so far. Operands are encoded before their parents;
    /// negation runs and the left spines of chains are walked in loops.
    fn encode(&mut self, expr: Expr) -> Literal {
        match expr {
            Expr::Const(b) => {
                let x = Literal::pos(self.fresh());
                self.clause([Literal::new(x.var.clone(), b)]);
                x
            }
            Expr::Var(v) => Literal::pos(v),
            Expr::Not(e) => {
                let mut e = *e;
                let mut positive = false;
                while let Expr::Not(inner) = e {
                    e = *inner;
                    positive = !positive;
                }
                let x = self.encode(e);
                if positive {
                    x
                } else {
                    x.negate()
                }
            }
            Expr::Binary(l, op, r) => {
                let mut rights = vec![*r];
                let mut left = *l;
                loop {
                    match left {
                        Expr::Binary(l, o, r) if o == op => {
                            rights.push(*r);
                            left = *l;
                        }
                        e => {
                            left = e;
                            break;
                        }
                    }
                }
                let mut a = self.encode(left);
                for r in rights.into_iter().rev() {
                    let b = self.encode(r);
                    a = self.define(a, op, b);
                }
                a
            }
        }
    }

    /// A fresh variable constrained to equal `a op b`.
    fn define(&mut self, a: Literal, op: BinOp, b: Literal) -> Literal {
        let x = Literal::pos(self.fresh());
        let defined = x.clone();
        let (na, nb, nx) = (a.clone().negate(), b.clone().negate(), x.clone().negate());
        match op {
            BinOp::And => {
                self.clause([nx.clone(), a]);
                self.clause([nx, b]);
                self.clause([x, na, nb]);
            }
            BinOp::Or => {
                self.clause([nx, a, b]);
                self.clause([x.clone(), na]);
                self.clause([x, nb]);
            }
            BinOp::Xor => {
                self.clause([nx.clone(), a.clone(), b.clone()]);
                self.clause([nx, na.clone(), nb.clone()]);
                self.clause([x.clone(), na, b]);
                self.clause([x, a, nb]);
            }
            BinOp::Implies => {
                self.clause([nx, na, b]);
                self.clause([x.clone(), a]);
                self.clause([x, nb]);
            }
            BinOp::Iff => {
                self.clause([nx.clone(), na.clone(), b.clone()]);
                self.clause([nx, a.clone(), nb.clone()]);
                self.clause([x.clone(), a, b]);
                self.clause([x, na, nb]);
            }
        }
        defined
    }
}

/// Tseitin-encode `expr`. The result is satisfiable exactly when
/// `expr` is, and its models restricted to the variables of `expr`
/// are exactly the models of `expr`. Fresh variables are `_t0`, `_t1`, …
/// skipping any name `expr` already uses.
///
/// Constants are folded first; a true expression yields the empty
/// CNF and a false one the CNF containing just the empty clause.
pub fn tseitin_cnf(expr: Expr) -> Cnf {
    match simplify(expr) {
        Expr::Const(true) => Cnf::t(),
        Expr::Const(false) => Cnf::from_iter([Disjunction::f()]),
        expr => {
            let mut encoder = Encoder::new(expr.variables());
            let root = encoder.encode(expr);
            encoder.clause([root]);
            Cnf::from_iter(encoder.clauses)
        }
    }
}

#[cfg(test)]
mod test {
    use cnfgen_syntax::parse;

    use super::*;
    use crate::formula::{Formula, Interpretation};
    use crate::print_expr;

    /// Every assignment to the variables of `expr` satisfies `expr`
    /// exactly when some assignment to the fresh variables extends
    /// it to a model of `cnf`.
    fn assert_equisatisfiable(expr: &Expr, cnf: &Cnf) {
        let vars = expr.variables().into_iter().collect::<Vec<_>>();
        let mut fresh = BTreeSet::new();
        for d in cnf.iter() {
            for l in d.iter() {
                if !vars.contains(&l.var) {
                    fresh.insert(l.var.clone());
                }
            }
        }
        let fresh = fresh.into_iter().collect::<Vec<_>>();
        let subsets = |names: &[Symbol]| {
            (0..1usize << names.len())
                .map(|bits| {
                    names
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| bits & (1 << i) != 0)
                        .map(|(_, n)| n.clone())
                        .collect::<Interpretation>()
                })
                .collect::<Vec<_>>()
        };
        for interp in subsets(&vars) {
            let extended = subsets(&fresh).into_iter().any(|extra| {
                let mut all = interp.clone();
                all.extend(extra);
                cnf.eval(&all)
            });
            assert_eq!(expr.eval(&interp), extended, "{expr} at {interp:?}");
        }
    }

    #[test]
    fn encoding() {
        let cnf = tseitin_cnf(parse!("(a & b) | c"));
        assert_eq!(
            print_expr(&cnf),
            "(~_t0 | a) & (~_t0 | b) & (_t0 | ~a | ~b) & \
             (~_t1 | _t0 | c) & (_t1 | ~_t0) & (_t1 | ~c) & _t1"
        );
    }

    #[test]
    fn literals_need_no_fresh_variables() {
        assert_eq!(print_expr(&tseitin_cnf(parse!("a"))), "a");
        assert_eq!(print_expr(&tseitin_cnf(parse!("~~~a"))), "~a");
    }

    #[test]
    fn constants() {
        assert_eq!(tseitin_cnf(parse!("a | 1")), Cnf::t());
        assert_eq!(print_expr(&tseitin_cnf(parse!("a & ~a"))), "0");
        assert!(tseitin_cnf(parse!("a & ~a")).is_contradiction());
        assert!(!tseitin_cnf(parse!("a & ~b")).is_contradiction());
        assert_eq!(print_expr(&tseitin_cnf(parse!("(a & 1) | 0"))), "a");
    }

    #[test]
    fn fresh_names_avoid_inputs() {
        let cnf = tseitin_cnf(parse!("_t0 & _t2"));
        assert_eq!(print_expr(&cnf), "(~_t1 | _t0) & (~_t1 | _t2) & (_t1 | ~_t0 | ~_t2) & _t1");
    }

    #[test]
    fn long_chain() {
        let n = 10_000;
        let cnf = tseitin_cnf(Expr::any((0..n).map(|i| Expr::var(format!("x{i}")))));
        // Three clauses per connective, then the root.
        assert_eq!(cnf.len(), 3 * (n - 1) + 1);
        assert_eq!(cnf[cnf.len() - 1].to_string(), format!("{FRESH_PREFIX}{}", n - 2));
    }

    #[test]
    fn equisatisfiable() {
        for source in [
            "(a & b) | c",
            "a ^ b ^ c",
            "a => ~b",
            "a <=> (b | ~c)",
            "~(a & b) <=> (a => c)",
            "(a ^ b) & (b ^ c) & (a ^ c)",
        ] {
            let expr = parse!(source);
            assert_equisatisfiable(&expr, &tseitin_cnf(expr.clone()));
        }
    }
}
