//! A small computer algebra system over real numbers.
//!
//! Input text is parsed by a closed grammar into an [`Expr`] tree which the
//! rest of the crate rewrites: simplification, expansion, differentiation,
//! integration, limits, and exact or numeric equation solving.

mod calculus;
mod error;
mod expr;
mod inequality;
mod limit;
mod number;
mod parser;
mod poly;
mod sample;
mod simplify;
mod solve;
mod system;

pub use calculus::{diff, integrate};
pub use error::{EngineError, Result};
pub use expr::{Constant, Expr, Func};
pub use inequality::{Bound, Interval, Relation, SolutionSet, solve_inequality};
pub use limit::{LimitPoint, LimitValue, limit};
pub use number::{Number, Rational, format_float};
pub use parser::{VARIABLES, parse, parse_raw};
pub use poly::{coefficients, degree, expand, together};
pub use sample::sample;
pub use simplify::simplify;
pub use solve::{Solutions, discriminant, period, solve, solve_equation, solve_polynomial};
pub use system::{Assignment, SystemSolution, solve_system};
