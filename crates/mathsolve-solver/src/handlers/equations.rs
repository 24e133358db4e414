//! Single equations: linear, quadratic, polynomial and trigonometric.

use mathsolve_engine::{Expr, Solutions, coefficients, degree, discriminant, period, simplify, solve};

use super::join_roots;
use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::input::{EQUATION_VARIABLES, Equation, first_free};

const SOLVE_CONTEXT: &str = "Error solving equation";
const INFINITELY_MANY: &str = "Infinitely many solutions";

/// Narrates moving everything to the left and returns `lhs - rhs`
/// simplified.
fn move_left(work: &mut Work<'_>, eq: &Equation, opening: &str, standard: &str) -> Expr {
    work.steps
        .push(format!("{opening}: {} = {}", eq.lhs_text, eq.rhs_text));
    work.steps.push(format!(
        "Move all terms to the left side: {} - ({}) = 0",
        eq.lhs_text, eq.rhs_text
    ));
    let expr = simplify(&eq.difference());
    work.steps.push(format!("{standard}: {expr} = 0"));
    expr
}

fn unknown(eq: &Equation) -> Result<String, SolveError> {
    first_free([&eq.lhs, &eq.rhs], &EQUATION_VARIABLES)
        .ok_or_else(|| SolveError::malformed("No variable found in equation"))
}

/// The roots, or `None` when every value is a root.
fn finite_roots(work: &mut Work<'_>, solutions: Solutions, var: &str) -> Option<Vec<Expr>> {
    match solutions {
        Solutions::Finite(roots) => Some(roots),
        Solutions::All => {
            work.steps
                .push(format!("The equation holds for every value of {var}"));
            None
        }
    }
}

pub(crate) fn linear(work: &mut Work<'_>, eq: Equation) -> Outcome {
    let expr = move_left(work, &eq, "Formulate the equation", "Simplified equation");
    let var = unknown(&eq)?;
    work.steps.push(format!("Solve for {var}"));
    let solutions = solve(&expr, &var).map_err(SolveError::engine(SOLVE_CONTEXT))?;
    let Some(roots) = finite_roots(work, solutions, &var) else {
        return Ok(INFINITELY_MANY.to_string());
    };
    match roots.first() {
        Some(root) => {
            let answer = format!("{var} = {root}");
            work.steps.push(format!("Solution: {answer}"));
            Ok(answer)
        }
        None => {
            work.steps.push("No solution found");
            Ok("No solution".to_string())
        }
    }
}

pub(crate) fn quadratic(work: &mut Work<'_>, eq: Equation) -> Outcome {
    let expr = move_left(work, &eq, "Write the equation", "Standard form");
    let var = unknown(&eq)?;
    work.steps
        .push(format!("Identify this as a quadratic equation in {var}"));
    let is_quadratic = match coefficients(&expr, &var) {
        Some(cs) if cs.len() == 3 => {
            let (a, b, c) = (&cs[2], &cs[1], &cs[0]);
            work.steps
                .push(format!("Coefficients: a = {a}, b = {b}, c = {c}"));
            work.steps
                .push("Use the quadratic formula: x = [-b ± √(b² - 4ac)] / 2a");
            work.steps
                .push(format!("Discriminant: b² - 4ac = {}", discriminant(a, b, c)));
            true
        }
        _ => {
            work.steps.push(format!(
                "The equation is not a quadratic polynomial in {var}, so it is solved directly"
            ));
            false
        }
    };
    let solutions = solve(&expr, &var).map_err(SolveError::engine(SOLVE_CONTEXT))?;
    let Some(roots) = finite_roots(work, solutions, &var) else {
        return Ok(INFINITELY_MANY.to_string());
    };
    match roots.len() {
        0 => {
            work.steps.push("No real solutions found");
            return Ok("No real solutions".to_string());
        }
        1 if is_quadratic => work
            .steps
            .push("The discriminant is zero, giving a repeated root"),
        2 if is_quadratic => work
            .steps
            .push("Calculate the discriminant and find two roots"),
        n => work.steps.push(format!("Found {n} solution(s)")),
    }
    Ok(join_roots(&var, &roots))
}

pub(crate) fn polynomial(work: &mut Work<'_>, eq: Equation) -> Outcome {
    let expr = move_left(work, &eq, "Write the polynomial equation", "Standard form");
    let var = unknown(&eq)?;
    work.steps
        .push(format!("Find the roots of the polynomial in {var}"));
    if let Some(d) = degree(&expr, &var) {
        work.steps.push(format!("The polynomial has degree {d}"));
    }
    let solutions = solve(&expr, &var).map_err(SolveError::engine(SOLVE_CONTEXT))?;
    let Some(roots) = finite_roots(work, solutions, &var) else {
        return Ok(INFINITELY_MANY.to_string());
    };
    if roots.is_empty() {
        work.steps.push("No real solutions found");
        return Ok("No real solutions".to_string());
    }
    work.steps
        .push(format!("Found {} solution(s)", roots.len()));
    Ok(join_roots(&var, &roots))
}

pub(crate) fn trigonometry(work: &mut Work<'_>, eq: Equation) -> Outcome {
    work.steps.push(format!(
        "Trigonometric equation: {} = {}",
        eq.lhs_text, eq.rhs_text
    ));
    let var = unknown(&eq)?;
    work.steps.push(format!("Solve for {var}"));
    let expr = simplify(&eq.difference());
    let solutions =
        solve(&expr, &var).map_err(SolveError::engine("Error solving trigonometric equation"))?;
    let Some(roots) = finite_roots(work, solutions, &var) else {
        return Ok(INFINITELY_MANY.to_string());
    };
    if roots.is_empty() {
        work.steps.push("No real solutions found");
        return Ok("No real solutions".to_string());
    }
    let period = period(&expr, &var).map_or_else(|| "2π".to_string(), |p| period_text(&p));
    work.steps
        .push(format!("Found {} real solution(s)", roots.len()));
    for root in &roots {
        work.steps.push(format!(
            "General solution: {var} = {root} + {period}n, where n is an integer"
        ));
    }
    Ok(join_roots(&var, &roots))
}

/// `2*pi` as `2π`, `pi/2` as `(π/2)`.
fn period_text(period: &Expr) -> String {
    let text = period.to_string();
    if text == "pi" {
        return "π".to_string();
    }
    match text.strip_suffix("*pi") {
        Some(k) if k.parse::<i64>().is_ok() => format!("{k}π"),
        _ => format!("({})", text.replace("pi", "π")),
    }
}
