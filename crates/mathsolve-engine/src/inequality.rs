//! Single-variable inequalities.
//!
//! The real line is cut at the zeros and poles of `lhs - rhs`; the sign of
//! each open piece is decided at a test point, each cut point is checked on
//! its own, and adjacent satisfied pieces are merged into intervals.

use std::fmt;

use crate::error::{EngineError, Result};
use crate::expr::Expr;
use crate::limit::snap_within;
use crate::poly::together;
use crate::simplify::simplify;
use crate::solve::{Solutions, scan_roots, solve};

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl Relation {
    /// Operators in the order they are searched for in input text, so that
    /// `<=` is never mistaken for `<`.
    pub const SEARCH_ORDER: [Relation; 4] = [
        Relation::LessEq,
        Relation::GreaterEq,
        Relation::Less,
        Relation::Greater,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Less => "<",
            Relation::LessEq => "<=",
            Relation::Greater => ">",
            Relation::GreaterEq => ">=",
        }
    }

    /// Does `lhs - rhs = difference` satisfy the relation?
    pub fn holds(self, difference: f64) -> bool {
        let d = if difference.abs() < TOLERANCE { 0.0 } else { difference };
        match self {
            Relation::Less => d < 0.0,
            Relation::LessEq => d <= 0.0,
            Relation::Greater => d > 0.0,
            Relation::GreaterEq => d >= 0.0,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: Expr,
    pub closed: bool,
}

/// An interval of the real line; `None` bounds are infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Interval {
    pub fn contains(&self, value: f64) -> bool {
        let above = self.lower.as_ref().is_none_or(|b| {
            let v = b.value.eval_constant();
            value > v || (b.closed && value == v)
        });
        let below = self.upper.as_ref().is_none_or(|b| {
            let v = b.value.eval_constant();
            value < v || (b.closed && value == v)
        });
        above && below
    }

    fn render(&self, var: &str) -> String {
        let op = |closed: bool| if closed { "<=" } else { "<" };
        match (&self.lower, &self.upper) {
            (None, None) => format!("all real {var}"),
            (Some(l), Some(u)) if l.value == u.value => format!("{var} = {}", l.value),
            (None, Some(u)) => format!("{var} {} {}", op(u.closed), u.value),
            (Some(l), None) => {
                let op = if l.closed { ">=" } else { ">" };
                format!("{var} {op} {}", l.value)
            }
            (Some(l), Some(u)) => {
                format!("{} {} {var} {} {}", l.value, op(l.closed), op(u.closed), u.value)
            }
        }
    }
}

/// The solution set of an inequality as a union of disjoint intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionSet {
    pub var: String,
    pub intervals: Vec<Interval>,
}

impl SolutionSet {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.intervals.iter().any(|i| i.contains(value))
    }
}

impl fmt::Display for SolutionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            return f.write_str("No solution");
        }
        let parts: Vec<String> = self.intervals.iter().map(|i| i.render(&self.var)).collect();
        f.write_str(&parts.join(" or "))
    }
}

/// Solve `lhs <relation> rhs` for `var`.
pub fn solve_inequality(lhs: &Expr, relation: Relation, rhs: &Expr, var: &str) -> Result<SolutionSet> {
    let f = simplify(&Expr::sub(lhs.clone(), rhs.clone()));
    if f.free_symbols().iter().any(|s| s != var) {
        return Err(EngineError::unsupported(
            "inequalities in more than one variable are not supported",
        ));
    }
    let everything = || SolutionSet {
        var: var.to_string(),
        intervals: vec![Interval {
            lower: None,
            upper: None,
        }],
    };
    let nothing = || SolutionSet {
        var: var.to_string(),
        intervals: Vec::new(),
    };
    if !f.contains(var) {
        return Ok(if relation.holds(f.eval_constant()) {
            everything()
        } else {
            nothing()
        });
    }

    let (numer, denom) = together(&f);
    let mut points = Vec::new();
    for part in [&numer, &denom] {
        if part.contains(var) {
            points.extend(critical_points(part, var)?);
        }
    }
    points.retain(|p| p.eval_constant().is_finite());
    points.sort_by(|a, b| {
        a.eval_constant()
            .partial_cmp(&b.eval_constant())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    points.dedup_by(|a, b| (a.eval_constant() - b.eval_constant()).abs() <= TOLERANCE);

    let values: Vec<f64> = points.iter().map(Expr::eval_constant).collect();
    let satisfied = |x: f64| {
        let v = f.eval_at(var, x);
        v.is_finite() && relation.holds(v)
    };

    // pieces alternate: open interval, cut point, open interval, ...
    let mut pieces = Vec::with_capacity(2 * values.len() + 1);
    for (k, value) in values.iter().enumerate() {
        let test = if k == 0 {
            value - 1.0
        } else {
            0.5 * (values[k - 1] + value)
        };
        pieces.push(satisfied(test));
        pieces.push(satisfied(*value));
    }
    pieces.push(satisfied(values.last().map_or(0.0, |v| v + 1.0)));

    let bound = |index: usize, closed: bool| Bound {
        value: points[index].clone(),
        closed,
    };
    let mut intervals = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        if !pieces[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < pieces.len() && pieces[i + 1] {
            i += 1;
        }
        let end = i;
        let lower = match start {
            0 => None,
            s if s % 2 == 0 => Some(bound(s / 2 - 1, false)),
            s => Some(bound(s / 2, true)),
        };
        let upper = match end {
            e if e == pieces.len() - 1 => None,
            e if e % 2 == 0 => Some(bound(e / 2, false)),
            e => Some(bound(e / 2, true)),
        };
        intervals.push(Interval { lower, upper });
        i += 1;
    }
    Ok(SolutionSet {
        var: var.to_string(),
        intervals,
    })
}

/// Zeros of `part`, exact where the solver manages, numeric otherwise.
fn critical_points(part: &Expr, var: &str) -> Result<Vec<Expr>> {
    match solve(part, var) {
        Ok(Solutions::Finite(roots)) => Ok(roots),
        Ok(Solutions::All) => Ok(Vec::new()),
        Err(EngineError::Unsupported(_)) => Ok(scan_roots(part, var, -100.0, 100.0)
            .into_iter()
            .map(|r| snap_within(r, TOLERANCE))
            .collect()),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn solve_text(lhs: &str, relation: Relation, rhs: &str) -> String {
        let set = solve_inequality(&parse(lhs).unwrap(), relation, &parse(rhs).unwrap(), "x")
            .unwrap();
        set.to_string()
    }

    #[test]
    fn linear_inequalities() {
        assert_eq!(solve_text("2*x + 3", Relation::LessEq, "7"), "x <= 2");
        assert_eq!(solve_text("-x", Relation::Greater, "1"), "x < -1");
    }

    #[test]
    fn quadratic_inequalities() {
        assert_eq!(solve_text("x**2", Relation::Less, "4"), "-2 < x < 2");
        assert_eq!(solve_text("x**2", Relation::GreaterEq, "1"), "x <= -1 or x >= 1");
        assert_eq!(solve_text("x**2 + 1", Relation::Greater, "0"), "all real x");
        assert_eq!(solve_text("x**2", Relation::Less, "0"), "No solution");
        assert_eq!(solve_text("x**2", Relation::LessEq, "0"), "x = 0");
    }

    #[test]
    fn rational_inequalities_exclude_poles() {
        assert_eq!(solve_text("1/x", Relation::Greater, "0"), "x > 0");
        assert_eq!(
            solve_text("(x - 1)/(x + 2)", Relation::GreaterEq, "0"),
            "x < -2 or x >= 1"
        );
    }

    #[test]
    fn membership_matches_rendering() {
        let set = solve_inequality(
            &parse("x**2").unwrap(),
            Relation::Less,
            &parse("4").unwrap(),
            "x",
        )
        .unwrap();
        assert!(set.contains(0.0));
        assert!(!set.contains(2.0));
        assert!(!set.contains(-3.0));
    }
}
