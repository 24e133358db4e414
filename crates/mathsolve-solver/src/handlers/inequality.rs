use mathsolve_engine::{VARIABLES, solve_inequality};

use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::input::{Comparison, first_free};

pub(crate) fn inequality(work: &mut Work<'_>, cmp: Comparison) -> Outcome {
    work.steps.push(format!(
        "Inequality: {} {} {}",
        cmp.lhs_text, cmp.relation, cmp.rhs_text
    ));
    let var = first_free([&cmp.lhs, &cmp.rhs], VARIABLES)
        .ok_or_else(|| SolveError::malformed("No variable found in inequality"))?;
    work.steps.push(format!("Solve for {var}"));
    let set = solve_inequality(&cmp.lhs, cmp.relation, &cmp.rhs, &var)
        .map_err(SolveError::engine("Error solving inequality"))?;
    work.steps.push(format!("Solution: {set}"));
    Ok(set.to_string())
}
