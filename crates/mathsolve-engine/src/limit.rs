//! Two-sided limits.
//!
//! Direct substitution is tried first, then L'Hôpital's rule on `0/0` and
//! `oo/oo` quotients, then leading-term analysis for rational functions at
//! infinity. When no rule applies the limit is estimated numerically and the
//! estimate is snapped to a nearby closed form.

use std::fmt;

use crate::calculus::diff;
use crate::error::Result;
use crate::expr::{Constant, Expr};
use crate::number::Number;
use crate::poly::{coefficients, numeric_coefficients, split_fraction};
use crate::simplify::simplify;

const MAX_LHOPITAL_STEPS: usize = 6;
const ZERO_TOLERANCE: f64 = 1e-12;
/// Magnitude beyond which a probed value is treated as diverging.
const DIVERGENCE: f64 = 1e6;

/// The point a variable approaches.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitPoint {
    Finite(Expr),
    PosInfinity,
    NegInfinity,
}

impl fmt::Display for LimitPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitPoint::Finite(e) => write!(f, "{e}"),
            LimitPoint::PosInfinity => f.write_str("oo"),
            LimitPoint::NegInfinity => f.write_str("-oo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LimitValue {
    Finite(Expr),
    PosInfinity,
    NegInfinity,
    DoesNotExist,
}

impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitValue::Finite(e) => write!(f, "{e}"),
            LimitValue::PosInfinity => f.write_str("oo"),
            LimitValue::NegInfinity => f.write_str("-oo"),
            LimitValue::DoesNotExist => f.write_str("does not exist"),
        }
    }
}

/// `lim(var -> point) expr`.
pub fn limit(expr: &Expr, var: &str, point: &LimitPoint) -> Result<LimitValue> {
    Ok(limit_at(&simplify(expr), var, point, 0))
}

fn limit_at(expr: &Expr, var: &str, point: &LimitPoint, depth: usize) -> LimitValue {
    if !expr.contains(var) {
        return LimitValue::Finite(expr.clone());
    }
    match point {
        LimitPoint::Finite(p) => finite_limit(expr, var, p, depth),
        LimitPoint::PosInfinity | LimitPoint::NegInfinity => {
            infinite_limit(expr, var, point, depth)
        }
    }
}

fn finite_limit(expr: &Expr, var: &str, point: &Expr, depth: usize) -> LimitValue {
    let (numer, denom) = split_fraction(expr);
    let at = |e: &Expr| e.substitute(var, point).eval_constant();
    let denom_value = at(&denom);

    if denom_value.is_finite() && denom_value.abs() > ZERO_TOLERANCE {
        let substituted = simplify(&expr.substitute(var, point));
        if substituted.eval_constant().is_finite() {
            return LimitValue::Finite(substituted);
        }
    } else if depth < MAX_LHOPITAL_STEPS && at(&numer).abs() <= ZERO_TOLERANCE {
        let quotient = simplify(&Expr::div(diff(&numer, var), diff(&denom, var)));
        return finite_limit(&quotient, var, point, depth + 1);
    }

    let center = point.eval_constant();
    let probe = |side: f64| {
        let values: Vec<f64> = (2..=7)
            .map(|k| expr.eval_at(var, center + side * 10f64.powi(-k)))
            .collect();
        classify(&values)
    };
    combine(probe(1.0), probe(-1.0))
}

fn infinite_limit(expr: &Expr, var: &str, point: &LimitPoint, depth: usize) -> LimitValue {
    let sign = if *point == LimitPoint::NegInfinity { -1.0 } else { 1.0 };
    let (numer, denom) = split_fraction(expr);

    if let Some(value) = rational_at_infinity(&numer, &denom, var, sign) {
        return value;
    }

    let far = |e: &Expr| e.eval_at(var, sign * 1e3).abs();
    if depth < MAX_LHOPITAL_STEPS && !denom.is_one() && far(&numer) > 1e3 && far(&denom) > 1e3 {
        let quotient = simplify(&Expr::div(diff(&numer, var), diff(&denom, var)));
        if quotient != *expr {
            return infinite_limit(&quotient, var, point, depth + 1);
        }
    }

    let values: Vec<f64> = (1..=8)
        .map(|k| expr.eval_at(var, sign * 10f64.powi(k)))
        .collect();
    match classify(&values) {
        Side::Finite(v) => LimitValue::Finite(snap(v)),
        Side::PosInfinity => LimitValue::PosInfinity,
        Side::NegInfinity => LimitValue::NegInfinity,
        Side::Undefined | Side::Unknown => LimitValue::DoesNotExist,
    }
}

/// Compare leading terms when both parts are polynomials with constant
/// coefficients.
fn rational_at_infinity(numer: &Expr, denom: &Expr, var: &str, sign: f64) -> Option<LimitValue> {
    let top = coefficients(numer, var)?;
    let bottom = coefficients(denom, var)?;
    numeric_coefficients(&top)?;
    numeric_coefficients(&bottom)?;
    let (n, m) = (top.len() - 1, bottom.len() - 1);
    let lead_top = top.last()?.clone();
    let lead_bottom = bottom.last()?.clone();
    if bottom.last()?.is_zero() {
        return None;
    }
    if n < m {
        return Some(LimitValue::Finite(Expr::zero()));
    }
    if n == m {
        return Some(LimitValue::Finite(simplify(&Expr::div(lead_top, lead_bottom))));
    }
    let ratio = lead_top.eval_constant() / lead_bottom.eval_constant();
    let parity = if (n - m) % 2 == 1 { sign } else { 1.0 };
    Some(if ratio * parity > 0.0 {
        LimitValue::PosInfinity
    } else {
        LimitValue::NegInfinity
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Finite(f64),
    PosInfinity,
    NegInfinity,
    /// Every probe fell outside the domain.
    Undefined,
    /// The probes neither settle nor diverge.
    Unknown,
}

/// Read the trend of a sequence of probes taken ever closer to the point.
fn classify(values: &[f64]) -> Side {
    let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.len() < 3 {
        return Side::Undefined;
    }
    let tail = &defined[defined.len() - 3..];
    if tail.iter().all(|v| *v > DIVERGENCE) && tail[2] >= tail[0] {
        return Side::PosInfinity;
    }
    if tail.iter().all(|v| *v < -DIVERGENCE) && tail[2] <= tail[0] {
        return Side::NegInfinity;
    }
    let (prev, last) = (tail[1], tail[2]);
    if last.is_finite() && (last - prev).abs() <= 1e-5 * last.abs().max(1.0) {
        return Side::Finite(last);
    }
    Side::Unknown
}

fn combine(right: Side, left: Side) -> LimitValue {
    match (right, left) {
        (Side::Finite(a), Side::Finite(b)) if (a - b).abs() <= 1e-4 * a.abs().max(1.0) => {
            LimitValue::Finite(snap((a + b) / 2.0))
        }
        (Side::PosInfinity, Side::PosInfinity) => LimitValue::PosInfinity,
        (Side::NegInfinity, Side::NegInfinity) => LimitValue::NegInfinity,
        // one side outside the domain: the limit is the other one-sided limit
        (side, Side::Undefined) | (Side::Undefined, side) => match side {
            Side::Finite(v) => LimitValue::Finite(snap(v)),
            Side::PosInfinity => LimitValue::PosInfinity,
            Side::NegInfinity => LimitValue::NegInfinity,
            Side::Undefined | Side::Unknown => LimitValue::DoesNotExist,
        },
        _ => LimitValue::DoesNotExist,
    }
}

/// Probed estimates are good to about this much, absolutely near zero and
/// relatively elsewhere.
const ESTIMATE_TOLERANCE: f64 = 1e-6;

fn snap(value: f64) -> Expr {
    if value.abs() < ESTIMATE_TOLERANCE {
        return Expr::zero();
    }
    snap_within(value, ESTIMATE_TOLERANCE / value.abs().min(1.0))
}

/// Snap a numeric value to a rational or a rational multiple of `pi` or
/// `E` when one lies within the relative `tolerance`.
pub(crate) fn snap_within(value: f64, tolerance: f64) -> Expr {
    let rational = Number::recognize_within(value, tolerance);
    if rational.is_exact() {
        return Expr::Num(rational);
    }
    for constant in [Constant::Pi, Constant::E] {
        let multiple = Number::recognize_within(value / constant.value(), tolerance);
        if multiple.is_exact() && !multiple.is_zero() {
            return simplify(&Expr::mul(Expr::Num(multiple), Expr::Const(constant)));
        }
    }
    Expr::float(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn lim(input: &str, point: LimitPoint) -> String {
        limit(&parse(input).unwrap(), "x", &point).unwrap().to_string()
    }

    fn at(value: i64) -> LimitPoint {
        LimitPoint::Finite(Expr::int(value))
    }

    #[test]
    fn substitutes_continuous_points() {
        assert_eq!(lim("x**2 + 1", at(2)), "5");
        assert_eq!(lim("cos(x)", at(0)), "1");
    }

    #[test]
    fn resolves_indeterminate_quotients() {
        assert_eq!(lim("sin(x)/x", at(0)), "1");
        assert_eq!(lim("(x**2 - 1)/(x - 1)", at(1)), "2");
        assert_eq!(lim("(1 - cos(x))/x**2", at(0)), "1/2");
    }

    #[test]
    fn handles_infinity() {
        assert_eq!(lim("(2*x**2 + 1)/(x**2 - 3)", LimitPoint::PosInfinity), "2");
        assert_eq!(lim("1/x", LimitPoint::PosInfinity), "0");
        assert_eq!(lim("x**3", LimitPoint::NegInfinity), "-oo");
        assert_eq!(lim("x*exp(-x)", LimitPoint::PosInfinity), "0");
        assert_eq!(lim("(1 + 1/x)**x", LimitPoint::PosInfinity), "E");
    }

    #[test]
    fn detects_divergence_and_disagreement() {
        assert_eq!(lim("1/x**2", at(0)), "oo");
        assert_eq!(lim("1/x", at(0)), "does not exist");
    }

    #[test]
    fn one_sided_domains_use_the_defined_side() {
        assert_eq!(lim("sqrt(x)", at(0)), "0");
    }

    #[test]
    fn snapping_is_relative() {
        assert_eq!(snap_within(1e-20, 1e-9).to_string(), "1e-20");
        assert_eq!(snap_within(0.2500000000001, 1e-9).to_string(), "1/4");
        assert_eq!(snap_within(2.0 * std::f64::consts::PI, 1e-9).to_string(), "2*pi");
        // probe estimates near zero are zero
        assert_eq!(snap(3e-8), Expr::zero());
        assert_eq!(snap(0.2500001).to_string(), "1/4");
    }
}
