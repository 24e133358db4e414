use std::collections::BTreeSet;

use mathsolve_engine::{Assignment, Expr, SystemSolution, coefficients, simplify, solve_system};

use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::input::Equation;

pub(crate) fn system(work: &mut Work<'_>, equations: Vec<Equation>) -> Outcome {
    work.steps.push("Write the system of equations:");
    for (i, eq) in equations.iter().enumerate() {
        work.steps
            .push(format!("Equation {}: {} = {}", i + 1, eq.lhs_text, eq.rhs_text));
    }
    let exprs: Vec<Expr> = equations.iter().map(|eq| simplify(&eq.difference())).collect();
    let vars: Vec<String> = equations
        .iter()
        .flat_map(|eq| [&eq.lhs, &eq.rhs])
        .flat_map(Expr::free_symbols)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if vars.is_empty() {
        return Err(SolveError::malformed("No variable found in system"));
    }
    if vars.len() != exprs.len() {
        work.steps.push(format!(
            "Note: The system has {} variables and {} equations.",
            vars.len(),
            exprs.len()
        ));
    }
    work.steps.push(if is_linear(&exprs, &vars) {
        "Solving the system by Gaussian elimination."
    } else {
        "Solving the system using substitution method."
    });

    let sets = match solve_system(&exprs, &vars) {
        Ok(SystemSolution::Solutions(sets)) => sets,
        Ok(SystemSolution::Identity) => {
            work.steps.push("Every equation reduces to 0 = 0");
            return Ok("Infinitely many solutions".to_string());
        }
        Err(e) => {
            work.steps.push(format!("Error solving system: {e}"));
            return Ok("Could not solve system".to_string());
        }
    };
    if sets.is_empty() {
        work.steps.push("No solution found for the system.");
        return Ok("No solution".to_string());
    }
    let answers: Vec<String> = sets.iter().map(|set| describe(work, set, &vars)).collect();
    Ok(answers.join(" or "))
}

/// Narrates one solution set and returns its answer text.
fn describe(work: &mut Work<'_>, set: &Assignment, vars: &[String]) -> String {
    let text = set
        .iter()
        .map(|(var, value)| format!("{var} = {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    let free: Vec<&str> = vars
        .iter()
        .filter(|v| !set.iter().any(|(name, _)| name == *v))
        .map(String::as_str)
        .collect();
    if free.is_empty() {
        work.steps.push(format!("Found solution: {text}"));
        return text;
    }
    work.steps.push(format!(
        "The system is dependent; {} can take any value",
        free.join(", ")
    ));
    if set.is_empty() {
        return "Infinitely many solutions".to_string();
    }
    work.steps.push(format!("Found solution: {text}"));
    format!("Infinitely many solutions: {text}")
}

/// Whether every equation is linear with constant coefficients in every
/// unknown.
fn is_linear(exprs: &[Expr], vars: &[String]) -> bool {
    exprs.iter().all(|expr| {
        vars.iter().all(|var| {
            coefficients(expr, var)
                .is_some_and(|cs| cs.len() <= 2 && cs.get(1).is_none_or(Expr::is_constant))
        })
    })
}
