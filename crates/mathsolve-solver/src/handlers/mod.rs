//! One function per problem kind. Each narrates into `Work::steps` and
//! returns the final answer.

pub(crate) mod calculus;
pub(crate) mod equations;
pub(crate) mod geometry;
pub(crate) mod inequality;
pub(crate) mod statistics;
pub(crate) mod system;

use mathsolve_engine::Expr;

/// `x = a or x = b`.
fn join_roots(var: &str, roots: &[Expr]) -> String {
    roots
        .iter()
        .map(|root| format!("{var} = {root}"))
        .collect::<Vec<_>>()
        .join(" or ")
}
