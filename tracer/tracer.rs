//! A trivial tracing facility: a set of pipeline phases
//! whose intermediate results should be echoed to stderr.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    Parse,
    Simplify,
    Normalize,
}

#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects($crate::Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}
