use crate::expr::Expr;

/// Evaluate `expr` at `samples` evenly spaced points of `[from, to]`.
///
/// Points where the expression is undefined or infinite are dropped, so the
/// result may be shorter than `samples`.
pub fn sample(expr: &Expr, var: &str, from: f64, to: f64, samples: usize) -> Vec<[f64; 2]> {
    if samples == 0 {
        return Vec::new();
    }
    if samples == 1 {
        let y = expr.eval_at(var, from);
        return if y.is_finite() { vec![[from, y]] } else { Vec::new() };
    }
    let step = (to - from) / (samples - 1) as f64;
    (0..samples)
        .filter_map(|i| {
            let x = from + step * i as f64;
            let y = expr.eval_at(var, x);
            y.is_finite().then_some([x, y])
        })
        .collect()
}
