//! The problem dispatcher.
//!
//! Every problem kind is described by one entry of [`DESCRIPTORS`]: the
//! shape its expression must have, whether it needs a sub type, whether the
//! answer is worth plotting, and the handler that narrates the solution.
//! [`Dispatcher::handle`] validates a request against its descriptor, parses
//! the expression into that shape and runs the handler.

mod descriptor;
mod dispatcher;
mod error;
mod handlers;
mod input;
mod narration;

pub use descriptor::{DESCRIPTORS, Descriptor, Handler, Outcome, Shape, SubTypeRule, descriptor};
pub use dispatcher::{Dispatcher, Work};
pub use error::SolveError;
pub use input::{Comparison, Equation, LimitCall, Source};
pub use narration::Narration;
