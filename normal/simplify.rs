//! Algebraic simplification of expressions.

use cnfgen_syntax::{BinOp, Expr};

/// Rewrite `expr` bottom-up until no rule applies. Afterwards the
/// result contains no constants unless it is itself a constant.
///
/// Rules, for each connective and both operand orders:
/// constant folding, `~~x = x`, `x & x = x`, `x | x = x`,
/// `x & ~x = 0`, `x | ~x = 1`, `x ^ x = 0`, `x => x = 1`,
/// `x <=> x = 1`, and absorption `x & (x | y) = x`, `x | (x & y) = x`.
pub fn simplify(expr: Expr) -> Expr {
    let mut expr = expr;
    loop {
        let mut changed = false;
        expr = step(expr, &mut changed);
        if !changed {
            return expr;
        }
    }
}

/// One bottom-up pass. Runs of negations and the left spines of
/// chains are walked in loops, so their length doesn't cost stack.
fn step(expr: Expr, changed: &mut bool) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Var(_) => expr,
        Expr::Not(e) => {
            let mut e = *e;
            let mut odd = true;
            while let Expr::Not(inner) = e {
                e = *inner;
                odd = !odd;
                *changed = true;
            }
            let e = step(e, changed);
            if !odd {
                e
            } else if matches!(e, Expr::Const(_) | Expr::Not(_)) {
                *changed = true;
                negate(e)
            } else {
                Expr::not(e)
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
            let mut acc = step(left, changed);
            for r in rights.into_iter().rev() {
                let r = step(r, changed);
                acc = match rewrite(acc, op, r) {
                    Rewrite::Done(e) => {
                        *changed = true;
                        e
                    }
                    Rewrite::Keep(l, r) => Expr::binary(l, op, r),
                };
            }
            acc
        }
    }
}

fn negate(e: Expr) -> Expr {
    match e {
        Expr::Const(b) => Expr::Const(!b),
        Expr::Not(e) => *e,
        e => Expr::not(e),
    }
}

fn is_complement(x: &Expr, y: &Expr) -> bool {
    matches!(x, Expr::Not(e) if **e == *y) || matches!(y, Expr::Not(e) if **e == *x)
}

/// Is `x` a direct operand of `y`, which is an `op` expression?
fn is_operand_of(x: &Expr, op: BinOp, y: &Expr) -> bool {
    matches!(y, Expr::Binary(l, o, r) if *o == op && (**l == *x || **r == *x))
}

enum Rewrite {
    Done(Expr),
    /// No rule applies; here are the operands back.
    Keep(Expr, Expr),
}

fn rewrite(l: Expr, op: BinOp, r: Expr) -> Rewrite {
    use BinOp::*;
    use Expr::Const;
    use Rewrite::*;
    let done = match op {
        And => match (l, r) {
            (Const(false), _) | (_, Const(false)) => Const(false),
            (Const(true), x) | (x, Const(true)) => x,
            (l, r) if l == r => l,
            (l, r) if is_complement(&l, &r) => Const(false),
            (l, r) if is_operand_of(&l, Or, &r) => l,
            (l, r) if is_operand_of(&r, Or, &l) => r,
            (l, r) => return Keep(l, r),
        },
        Or => match (l, r) {
            (Const(true), _) | (_, Const(true)) => Const(true),
            (Const(false), x) | (x, Const(false)) => x,
            (l, r) if l == r => l,
            (l, r) if is_complement(&l, &r) => Const(true),
            (l, r) if is_operand_of(&l, And, &r) => l,
            (l, r) if is_operand_of(&r, And, &l) => r,
            (l, r) => return Keep(l, r),
        },
        Xor => match (l, r) {
            (Const(false), x) | (x, Const(false)) => x,
            (Const(true), x) | (x, Const(true)) => negate(x),
            (l, r) if l == r => Const(false),
            (l, r) if is_complement(&l, &r) => Const(true),
            (l, r) => return Keep(l, r),
        },
        Implies => match (l, r) {
            (Const(false), _) | (_, Const(true)) => Const(true),
            (Const(true), x) => x,
            (x, Const(false)) => negate(x),
            (l, r) if l == r => Const(true),
            // ~r => r  and  l => ~l  are both just the consequent.
            (l, r) if is_complement(&l, &r) => r,
            (l, r) => return Keep(l, r),
        },
        Iff => match (l, r) {
            (Const(true), x) | (x, Const(true)) => x,
            (Const(false), x) | (x, Const(false)) => negate(x),
            (l, r) if l == r => Const(true),
            (l, r) if is_complement(&l, &r) => Const(false),
            (l, r) => return Keep(l, r),
        },
    };
    Done(done)
}
