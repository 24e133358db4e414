use mathsolve_core::{ProblemKind, ProblemRequest, SolutionResult, SolverConfig, UnsupportedKind};
use tracing::debug;

use crate::descriptor::{SubTypeRule, descriptor};
use crate::error::SolveError;
use crate::narration::Narration;

/// State a handler works on while answering one request.
#[derive(Debug)]
pub struct Work<'a> {
    pub config: &'a SolverConfig,
    pub sub_type: Option<&'a str>,
    pub steps: Narration,
    /// Samples for graphing requests.
    pub points: Option<Vec<[f64; 2]>>,
}

impl<'a> Work<'a> {
    pub fn new(config: &'a SolverConfig, sub_type: Option<&'a str>) -> Self {
        Self {
            config,
            sub_type,
            steps: Narration::new(),
            points: None,
        }
    }
}

/// Answers problem requests. Holds no per-request state, so one instance
/// can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: SolverConfig,
}

impl Dispatcher {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn handle(&self, request: &ProblemRequest) -> Result<SolutionResult, SolveError> {
        let kind: ProblemKind = request.kind.trim().parse()?;
        let descriptor =
            descriptor(kind).ok_or_else(|| UnsupportedKind(request.kind.clone()))?;
        let expression = request.expression.trim();
        debug!(%kind, len = expression.len(), "dispatching problem");

        let limit = self.config.max_expression_len;
        if expression.chars().count() > limit {
            return Err(SolveError::malformed(format!(
                "Expression is longer than {limit} characters"
            )));
        }
        if expression.is_empty() {
            return Err(SolveError::malformed("Expression is empty"));
        }
        let sub_type = match descriptor.sub_type {
            SubTypeRule::Ignored => None,
            SubTypeRule::Optional => request.sub_type.as_deref().map(str::trim),
            SubTypeRule::Required(message) => Some(
                request
                    .sub_type
                    .as_deref()
                    .map(str::trim)
                    .ok_or_else(|| SolveError::malformed(message))?,
            ),
        };

        let mut work = Work::new(&self.config, sub_type);
        let solution = descriptor.handler.run(&mut work, expression)?;
        Ok(SolutionResult {
            steps: work.steps.into_steps(),
            solution,
            graph: descriptor.graph,
            points: work.points,
        })
    }
}
