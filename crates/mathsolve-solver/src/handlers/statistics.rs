//! Descriptive statistics over a literal data list. Variance is the
//! population variance.

use mathsolve_engine::format_float;

use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::narration::{list, number};

pub(crate) fn statistics(work: &mut Work<'_>, data: Vec<f64>) -> Outcome {
    let sub_type = work
        .sub_type
        .ok_or_else(|| SolveError::malformed("Statistics sub-type is required"))?;
    work.steps
        .push(format!("Statistical analysis: {sub_type}"));
    work.steps.push(format!("Data set: {}", list(&data)));
    match sub_type {
        "mean" => {
            let m = mean(&data);
            let terms: Vec<String> = data.iter().map(|v| number(*v)).collect();
            work.steps.push("Calculate the mean: sum(data) / n");
            work.steps.push(format!(
                "Mean = ({}) / {} = {}",
                terms.join(" + "),
                data.len(),
                format_float(m)
            ));
            Ok(format!("Mean = {}", format_float(m)))
        }
        "median" => {
            let sorted = sorted(&data);
            let n = sorted.len();
            work.steps.push(format!("Sort the data: {}", list(&sorted)));
            let median = if n % 2 == 0 {
                let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
                let median = format_float((lo + hi) / 2.0);
                work.steps.push(
                    "For even number of elements, median = (data[n/2 - 1] + data[n/2]) / 2",
                );
                work.steps.push(format!(
                    "Median = ({} + {}) / 2 = {median}",
                    number(lo),
                    number(hi)
                ));
                median
            } else {
                let median = number(sorted[n / 2]);
                work.steps
                    .push("For odd number of elements, median = data[n/2]");
                work.steps.push(format!("Median = {median}"));
                median
            };
            Ok(format!("Median = {median}"))
        }
        "mode" => {
            let modes = modes(&data);
            if modes.is_empty() {
                work.steps.push("No value appears more than once");
                return Ok("No mode (all values appear exactly once)".to_string());
            }
            work.steps
                .push("Find the value(s) that appear most frequently");
            work.steps.push(format!("Mode = {}", list(&modes)));
            Ok(format!("Mode = {}", list(&modes)))
        }
        "variance" => {
            let v = variance(work, &data);
            Ok(format!("Variance = {}", format_float(v)))
        }
        "standard_deviation" | "std" => {
            let std_dev = variance(work, &data).sqrt();
            work.steps.push(format!(
                "Standard deviation = √variance = {}",
                format_float(std_dev)
            ));
            Ok(format!("Standard Deviation = {}", format_float(std_dev)))
        }
        "range" => {
            let sorted = sorted(&data);
            let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
            let range = number(max - min);
            work.steps.push("Range = maximum value - minimum value");
            work.steps.push(format!(
                "Range = {} - {} = {range}",
                number(max),
                number(min)
            ));
            Ok(format!("Range = {range}"))
        }
        other => Err(SolveError::malformed(format!(
            "Unsupported statistics sub-type: {other}"
        ))),
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Narrates and returns the population variance.
fn variance(work: &mut Work<'_>, data: &[f64]) -> f64 {
    let m = mean(data);
    work.steps
        .push(format!("Calculate the mean: {}", format_float(m)));
    let v = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    work.steps
        .push("Calculate the variance: sum((x - mean)² for x in data) / n");
    work.steps.push(format!("Variance = {}", format_float(v)));
    v
}

/// Every value tied for the highest count, ascending; empty when no value
/// repeats.
fn modes(data: &[f64]) -> Vec<f64> {
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for value in sorted(data) {
        if let Some((last, count)) = runs.last_mut() {
            if *last == value {
                *count += 1;
                continue;
            }
        }
        runs.push((value, 1));
    }
    let best = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    if best < 2 {
        return Vec::new();
    }
    runs.into_iter()
        .filter(|(_, count)| *count == best)
        .map(|(value, _)| value)
        .collect()
}
