use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The kinds of problem the service can solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    Linear,
    Quadratic,
    System,
    Inequality,
    Polynomial,
    Geometry,
    Differentiation,
    Integration,
    Trigonometry,
    Limit,
    Statistics,
    Graphing,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 12] = [
        ProblemKind::Linear,
        ProblemKind::Quadratic,
        ProblemKind::System,
        ProblemKind::Inequality,
        ProblemKind::Polynomial,
        ProblemKind::Geometry,
        ProblemKind::Differentiation,
        ProblemKind::Integration,
        ProblemKind::Trigonometry,
        ProblemKind::Limit,
        ProblemKind::Statistics,
        ProblemKind::Graphing,
    ];

    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::Linear => "linear",
            ProblemKind::Quadratic => "quadratic",
            ProblemKind::System => "system",
            ProblemKind::Inequality => "inequality",
            ProblemKind::Polynomial => "polynomial",
            ProblemKind::Geometry => "geometry",
            ProblemKind::Differentiation => "differentiation",
            ProblemKind::Integration => "integration",
            ProblemKind::Trigonometry => "trigonometry",
            ProblemKind::Limit => "limit",
            ProblemKind::Statistics => "statistics",
            ProblemKind::Graphing => "graphing",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported problem type: {0}")]
pub struct UnsupportedKind(pub String);

impl FromStr for ProblemKind {
    type Err = UnsupportedKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProblemKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedKind(s.to_string()))
    }
}

/// Body of `POST /solve`.
///
/// `type` stays a plain string so that unknown kinds reach the dispatcher
/// and are reported in the usual error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub expression: String,
    #[serde(
        rename = "subType",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_type: Option<String>,
}

impl ProblemRequest {
    pub fn new(kind: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            expression: expression.into(),
            sub_type: None,
        }
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Successful answer to a problem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolutionResult {
    pub steps: Vec<String>,
    pub solution: String,
    /// Whether the client may offer a plot of the input.
    pub graph: bool,
    /// Sampled `[x, y]` pairs, only for graphing requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 2]>>,
}

/// Body of every 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
