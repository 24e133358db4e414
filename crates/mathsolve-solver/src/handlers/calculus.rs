//! Derivatives, integrals, limits and function plots.

use mathsolve_engine::{Expr, LimitValue, diff, integrate, limit as evaluate_limit, sample};

use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::input::{LimitCall, Source};

/// Plots span this interval on either side of zero.
const PLOT_HALF_WIDTH: f64 = 10.0;

/// The configured calculus variable, unless the expression lacks it and has
/// exactly one other unknown.
fn variable(work: &Work<'_>, expr: &Expr) -> String {
    let preferred = work.config.calculus_variable.as_str();
    let free = expr.free_symbols();
    if free.len() == 1 && !free.contains(preferred) {
        if let Some(only) = free.into_iter().next() {
            return only;
        }
    }
    preferred.to_string()
}

pub(crate) fn differentiation(work: &mut Work<'_>, src: Source) -> Outcome {
    let var = variable(work, &src.expr);
    work.steps
        .push(format!("Expression to differentiate: {}", src.text));
    work.steps
        .push(format!("Find the derivative with respect to {var}"));
    let derivative = diff(&src.expr, &var);
    work.steps.push("Apply the rules of differentiation");
    work.steps
        .push(format!("The derivative is: {derivative}"));
    Ok(format!("f'({var}) = {derivative}"))
}

pub(crate) fn integration(work: &mut Work<'_>, src: Source) -> Outcome {
    let var = variable(work, &src.expr);
    work.steps
        .push(format!("Expression to integrate: {}", src.text));
    work.steps
        .push(format!("Find the indefinite integral with respect to {var}"));
    let integral =
        integrate(&src.expr, &var).map_err(SolveError::engine("Error in integration"))?;
    work.steps.push("Apply the rules of integration");
    work.steps
        .push(format!("The indefinite integral is: {integral} + C"));
    Ok(format!("∫{} d{var} = {integral} + C", src.text))
}

pub(crate) fn limit(work: &mut Work<'_>, call: LimitCall) -> Outcome {
    let head = format!("lim({}→{}) {}", call.var, call.point, call.expr_text);
    work.steps.push(format!("Limit problem: {head}"));
    work.steps.push(format!(
        "Computing the limit of {} as {} approaches {}",
        call.expr, call.var, call.point
    ));
    let value = evaluate_limit(&call.expr, &call.var, &call.point)
        .map_err(SolveError::engine("Error computing limit"))?;
    work.steps.push("Apply limit rules and evaluate");
    if value == LimitValue::DoesNotExist {
        work.steps
            .push("The one-sided limits differ, so the limit does not exist");
        return Ok(format!("{head} does not exist"));
    }
    work.steps.push(format!("The limit equals {value}"));
    Ok(format!("{head} = {value}"))
}

pub(crate) fn graphing(work: &mut Work<'_>, src: Source) -> Outcome {
    let free = src.expr.free_symbols();
    if free.len() > 1 {
        let names: Vec<String> = free.into_iter().collect();
        return Err(SolveError::malformed(format!(
            "Graphing needs a function of one variable, found {}",
            names.join(", ")
        )));
    }
    let var = variable(work, &src.expr);
    let samples = work.config.plot_samples.max(2);
    work.steps.push(format!("Function to plot: y = {}", src.expr));
    work.steps.push(format!(
        "Sample {var} from {} to {} at {samples} points",
        -PLOT_HALF_WIDTH, PLOT_HALF_WIDTH
    ));
    let points = sample(&src.expr, &var, -PLOT_HALF_WIDTH, PLOT_HALF_WIDTH, samples);
    if points.len() < samples {
        work.steps.push(format!(
            "Skipped {} points where the function is undefined",
            samples - points.len()
        ));
    }
    work.points = Some(points);
    Ok(format!("y = {}", src.expr))
}
