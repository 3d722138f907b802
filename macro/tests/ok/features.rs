use cnfgen_macro::expr;
use cnfgen_syntax::{Expr, Symbol};

fn main() {
    let e: Expr = expr!((engine & ~electric) | (battery => electric));
    assert!(e.variables().contains(&Symbol::from("battery")));
    assert_eq!(e.to_string(), "engine & ~electric | (battery => electric)");
}
