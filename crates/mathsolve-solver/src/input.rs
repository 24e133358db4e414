//! Parsing of the expression shapes the problem kinds accept.

use std::collections::BTreeSet;

use mathsolve_engine::{Expr, LimitPoint, Relation, parse};
use regex_lite::Regex;

use crate::error::SolveError;

const INVALID_EXPRESSION: &str = "Invalid expression";

/// Variables tried, in order, for equations and limits.
pub(crate) const EQUATION_VARIABLES: [&str; 3] = ["x", "y", "z"];

/// `lhs = rhs`, with the text of each side as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs_text: String,
    pub rhs_text: String,
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    /// `lhs - rhs`, the form every equation is solved in.
    pub fn difference(&self) -> Expr {
        Expr::sub(self.lhs.clone(), self.rhs.clone())
    }
}

/// `lhs <relation> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub lhs_text: String,
    pub rhs_text: String,
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: Expr,
}

/// A single expression and the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub text: String,
    pub expr: Expr,
}

/// `limit(var, point, expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitCall {
    pub var: String,
    pub point: LimitPoint,
    pub expr_text: String,
    pub expr: Expr,
}

pub(crate) fn expression(text: &str) -> Result<Expr, SolveError> {
    parse(text.trim()).map_err(SolveError::engine(INVALID_EXPRESSION))
}

pub(crate) fn source(text: &str) -> Result<Source, SolveError> {
    Ok(Source {
        text: text.trim().to_string(),
        expr: expression(text)?,
    })
}

pub(crate) fn equation(text: &str) -> Result<Equation, SolveError> {
    let mut sides = text.split('=');
    let (Some(lhs), Some(rhs), None) = (sides.next(), sides.next(), sides.next()) else {
        return Err(if text.contains('=') {
            SolveError::malformed("Equation must contain exactly one equals sign")
        } else {
            SolveError::malformed("Equation must contain an equals sign")
        });
    };
    Ok(Equation {
        lhs_text: lhs.trim().to_string(),
        rhs_text: rhs.trim().to_string(),
        lhs: expression(lhs)?,
        rhs: expression(rhs)?,
    })
}

/// `;`-separated equations; blank parts are skipped.
pub(crate) fn equation_list(text: &str) -> Result<Vec<Equation>, SolveError> {
    let parts: Vec<&str> = text.split(';').filter(|p| !p.trim().is_empty()).collect();
    if parts.is_empty() {
        return Err(SolveError::malformed("No equations given"));
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if !part.contains('=') {
                return Err(SolveError::malformed(format!(
                    "Equation {} does not contain an equals sign",
                    i + 1
                )));
            }
            equation(part)
        })
        .collect()
}

/// Splits on the first operator of [`Relation::SEARCH_ORDER`] that cuts the
/// text into exactly two parts.
pub(crate) fn comparison(text: &str) -> Result<Comparison, SolveError> {
    for relation in Relation::SEARCH_ORDER {
        let parts: Vec<&str> = text.split(relation.symbol()).collect();
        if let [lhs, rhs] = parts.as_slice() {
            return Ok(Comparison {
                lhs_text: lhs.trim().to_string(),
                rhs_text: rhs.trim().to_string(),
                lhs: expression(lhs)?,
                relation,
                rhs: expression(rhs)?,
            });
        }
    }
    Err(SolveError::malformed("Invalid inequality format"))
}

/// `key=value; key=value` with numeric values.
pub(crate) fn key_values(text: &str) -> Result<Vec<(String, f64)>, SolveError> {
    text.split(';')
        .filter(|p| !p.trim().is_empty())
        .map(|part| {
            let Some((key, value)) = part.split_once('=') else {
                return Err(SolveError::malformed(format!(
                    "Expected key=value, got '{}'",
                    part.trim()
                )));
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            let number = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SolveError::malformed(format!("Invalid number for {key}: {value}")))?;
            Ok((key, number))
        })
        .collect()
}

pub(crate) fn limit_call(text: &str) -> Result<LimitCall, SolveError> {
    let pattern = Regex::new(r"^limit\(\s*(\w+)\s*,\s*([^,]+?)\s*,\s*(.+?)\s*\)$")
        .map_err(|e| SolveError::internal(format!("limit pattern: {e}")))?;
    let invalid = || SolveError::malformed("Invalid limit syntax. Use format: limit(x, a, f(x))");
    let captures = pattern.captures(text.trim()).ok_or_else(invalid)?;
    let (Some(var), Some(point), Some(expr)) = (captures.get(1), captures.get(2), captures.get(3))
    else {
        return Err(invalid());
    };
    let var = var.as_str();
    if !EQUATION_VARIABLES.contains(&var) {
        return Err(SolveError::malformed(format!("Unsupported variable: {var}")));
    }
    Ok(LimitCall {
        var: var.to_string(),
        point: limit_point(point.as_str())?,
        expr_text: expr.as_str().to_string(),
        expr: expression(expr.as_str())?,
    })
}

fn limit_point(text: &str) -> Result<LimitPoint, SolveError> {
    match text.trim() {
        "oo" | "+oo" | "inf" | "infinity" => Ok(LimitPoint::PosInfinity),
        "-oo" | "-inf" | "-infinity" => Ok(LimitPoint::NegInfinity),
        other => {
            let point = expression(other)?;
            if !point.is_constant() {
                return Err(SolveError::malformed(
                    "Limit point must be a number, a constant expression or oo",
                ));
            }
            Ok(LimitPoint::Finite(point))
        }
    }
}

/// `data = [1, 2, 3]`.
pub(crate) fn data_list(text: &str) -> Result<Vec<f64>, SolveError> {
    let shape_error = || SolveError::malformed("Data must be provided in format: data = [...]");
    let rest = text.trim().strip_prefix("data").ok_or_else(shape_error)?;
    let rest = rest.trim_start().strip_prefix('=').ok_or_else(shape_error)?;
    let body = rest
        .trim()
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| SolveError::malformed("Data must be a list of numbers"))?;
    let values = body
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SolveError::malformed("Data must be a list of numbers"))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    if values.is_empty() {
        return Err(SolveError::malformed("Data set must not be empty"));
    }
    Ok(values)
}

/// The first variable of `order` that is free in any of `exprs`.
pub(crate) fn first_free<'e>(
    exprs: impl IntoIterator<Item = &'e Expr>,
    order: &[&str],
) -> Option<String> {
    let free: BTreeSet<String> = exprs.into_iter().flat_map(Expr::free_symbols).collect();
    order
        .iter()
        .find(|v| free.contains(**v))
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equations_need_exactly_one_equals_sign() {
        let eq = equation(" 2*x + 3 = 7 ").unwrap();
        assert_eq!(eq.lhs_text, "2*x + 3");
        assert_eq!(eq.rhs_text, "7");
        assert_eq!(
            equation("2*x + 3").unwrap_err().to_string(),
            "Equation must contain an equals sign"
        );
        assert_eq!(
            equation("x = 1 = 2").unwrap_err().to_string(),
            "Equation must contain exactly one equals sign"
        );
    }

    #[test]
    fn equation_lists_number_their_parts() {
        let eqs = equation_list("x + y = 10; x - y = 2;").unwrap();
        assert_eq!(eqs.len(), 2);
        let err = equation_list("x + y = 10; x - y").unwrap_err();
        assert_eq!(err.to_string(), "Equation 2 does not contain an equals sign");
    }

    #[test]
    fn comparisons_prefer_two_character_operators() {
        assert_eq!(comparison("x <= 2").unwrap().relation, Relation::LessEq);
        assert_eq!(comparison("x >= 2").unwrap().relation, Relation::GreaterEq);
        assert_eq!(comparison("x**2 > 4").unwrap().relation, Relation::Greater);
        assert_eq!(
            comparison("x = 2").unwrap_err().to_string(),
            "Invalid inequality format"
        );
    }

    #[test]
    fn key_values_are_numeric() {
        assert_eq!(
            key_values("base=3; Height = 4.5").unwrap(),
            vec![("base".to_string(), 3.0), ("height".to_string(), 4.5)]
        );
        assert_eq!(
            key_values("radius=five").unwrap_err().to_string(),
            "Invalid number for radius: five"
        );
        assert!(key_values("radius").is_err());
    }

    #[test]
    fn limit_calls_are_matched() {
        let call = limit_call("limit(x, 0, sin(x)/x)").unwrap();
        assert_eq!(call.var, "x");
        assert_eq!(call.point, LimitPoint::Finite(Expr::int(0)));
        assert_eq!(call.expr_text, "sin(x)/x");
        assert_eq!(limit_call("limit(x, -oo, 1/x)").unwrap().point, LimitPoint::NegInfinity);
        assert_eq!(
            limit_call("limit(w, 0, w)").unwrap_err().to_string(),
            "Unsupported variable: w"
        );
        assert!(limit_call("lim x -> 0").is_err());
    }

    #[test]
    fn data_lists_need_the_data_prefix() {
        assert_eq!(data_list("data = [1, 2.5, 3]").unwrap(), vec![1.0, 2.5, 3.0]);
        assert_eq!(data_list("data=[4]").unwrap(), vec![4.0]);
        assert!(data_list("[1, 2]").is_err());
        assert!(data_list("data = [1, two]").is_err());
        assert_eq!(
            data_list("data = []").unwrap_err().to_string(),
            "Data set must not be empty"
        );
    }

    #[test]
    fn picks_variables_in_priority_order() {
        let lhs = parse("z").unwrap();
        let rhs = parse("y + 1").unwrap();
        assert_eq!(first_free([&lhs, &rhs], &EQUATION_VARIABLES), Some("y".to_string()));
        assert_eq!(first_free([&parse("t").unwrap()], &EQUATION_VARIABLES), None);
    }
}
