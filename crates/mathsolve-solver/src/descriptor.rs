use std::fmt;

use mathsolve_core::ProblemKind;

use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::handlers::{calculus, equations, geometry, inequality, statistics, system};
use crate::input::{self, Comparison, Equation, LimitCall, Source};

/// The final answer of a handler; the steps are left in its [`Work`].
pub type Outcome = Result<String, SolveError>;

/// The textual form an expression must take for a problem kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `lhs = rhs`
    Equation,
    /// `lhs = rhs; lhs = rhs; ...`
    EquationList,
    /// `lhs < rhs` and the other comparison operators
    Comparison,
    /// `key=value; key=value`
    KeyValues,
    /// a single expression
    Expression,
    /// `limit(var, point, expr)`
    LimitCall,
    /// `data = [v, v, ...]`
    DataList,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Equation => "equation",
            Shape::EquationList => "list of equations",
            Shape::Comparison => "inequality",
            Shape::KeyValues => "key=value pairs",
            Shape::Expression => "expression",
            Shape::LimitCall => "limit call",
            Shape::DataList => "data list",
        })
    }
}

/// A handler together with the shape of input it takes.
#[derive(Clone, Copy)]
pub enum Handler {
    Equation(fn(&mut Work<'_>, Equation) -> Outcome),
    EquationList(fn(&mut Work<'_>, Vec<Equation>) -> Outcome),
    Comparison(fn(&mut Work<'_>, Comparison) -> Outcome),
    KeyValues(fn(&mut Work<'_>, Vec<(String, f64)>) -> Outcome),
    Expression(fn(&mut Work<'_>, Source) -> Outcome),
    LimitCall(fn(&mut Work<'_>, LimitCall) -> Outcome),
    DataList(fn(&mut Work<'_>, Vec<f64>) -> Outcome),
}

impl Handler {
    pub fn shape(&self) -> Shape {
        match self {
            Handler::Equation(_) => Shape::Equation,
            Handler::EquationList(_) => Shape::EquationList,
            Handler::Comparison(_) => Shape::Comparison,
            Handler::KeyValues(_) => Shape::KeyValues,
            Handler::Expression(_) => Shape::Expression,
            Handler::LimitCall(_) => Shape::LimitCall,
            Handler::DataList(_) => Shape::DataList,
        }
    }

    /// Parse `text` into this handler's shape and run it.
    pub fn run(self, work: &mut Work<'_>, text: &str) -> Outcome {
        match self {
            Handler::Equation(f) => f(work, input::equation(text)?),
            Handler::EquationList(f) => f(work, input::equation_list(text)?),
            Handler::Comparison(f) => f(work, input::comparison(text)?),
            Handler::KeyValues(f) => f(work, input::key_values(text)?),
            Handler::Expression(f) => f(work, input::source(text)?),
            Handler::LimitCall(f) => f(work, input::limit_call(text)?),
            Handler::DataList(f) => f(work, input::data_list(text)?),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.shape()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTypeRule {
    Ignored,
    Optional,
    /// Rejected with the given message when absent.
    Required(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub kind: ProblemKind,
    pub sub_type: SubTypeRule,
    /// Whether the client may offer a plot of the answer.
    pub graph: bool,
    pub handler: Handler,
}

impl Descriptor {
    pub fn shape(&self) -> Shape {
        self.handler.shape()
    }
}

pub static DESCRIPTORS: [Descriptor; 12] = [
    Descriptor {
        kind: ProblemKind::Linear,
        sub_type: SubTypeRule::Ignored,
        graph: false,
        handler: Handler::Equation(equations::linear),
    },
    Descriptor {
        kind: ProblemKind::Quadratic,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Equation(equations::quadratic),
    },
    Descriptor {
        kind: ProblemKind::System,
        sub_type: SubTypeRule::Ignored,
        graph: false,
        handler: Handler::EquationList(system::system),
    },
    Descriptor {
        kind: ProblemKind::Inequality,
        sub_type: SubTypeRule::Ignored,
        graph: false,
        handler: Handler::Comparison(inequality::inequality),
    },
    Descriptor {
        kind: ProblemKind::Polynomial,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Equation(equations::polynomial),
    },
    Descriptor {
        kind: ProblemKind::Geometry,
        // `circle_area=5` names the figure in the expression itself
        sub_type: SubTypeRule::Optional,
        graph: false,
        handler: Handler::KeyValues(geometry::geometry),
    },
    Descriptor {
        kind: ProblemKind::Differentiation,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Expression(calculus::differentiation),
    },
    Descriptor {
        kind: ProblemKind::Integration,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Expression(calculus::integration),
    },
    Descriptor {
        kind: ProblemKind::Trigonometry,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Equation(equations::trigonometry),
    },
    Descriptor {
        kind: ProblemKind::Limit,
        sub_type: SubTypeRule::Ignored,
        graph: false,
        handler: Handler::LimitCall(calculus::limit),
    },
    Descriptor {
        kind: ProblemKind::Statistics,
        sub_type: SubTypeRule::Required("Statistics sub-type is required"),
        graph: false,
        handler: Handler::DataList(statistics::statistics),
    },
    Descriptor {
        kind: ProblemKind::Graphing,
        sub_type: SubTypeRule::Ignored,
        graph: true,
        handler: Handler::Expression(calculus::graphing),
    },
];

/// The descriptor for `kind`.
pub fn descriptor(kind: ProblemKind) -> Option<&'static Descriptor> {
    DESCRIPTORS.iter().find(|d| d.kind == kind)
}
