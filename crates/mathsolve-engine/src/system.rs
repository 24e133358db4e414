//! Systems of equations in several unknowns.
//!
//! Linear systems with numeric coefficients are reduced exactly by
//! Gauss-Jordan elimination, which also classifies inconsistent and
//! underdetermined systems. Everything else is solved by substitution:
//! repeatedly pick an equation that can be solved for one unknown, solve
//! it, and substitute every resulting value into the remaining equations.

use crate::error::{EngineError, Result};
use crate::expr::Expr;
use crate::number::Number;
use crate::poly::{coefficients, expand};
use crate::simplify::{simplify, split_coeff};
use crate::solve::{Solutions, solve};

const MAX_SUBSTITUTION_DEPTH: usize = 8;

/// Values for some of the unknowns, ordered by variable name.
pub type Assignment = Vec<(String, Expr)>;

#[derive(Debug, Clone, PartialEq)]
pub enum SystemSolution {
    /// Every solution set found; empty when the system is inconsistent.
    /// Unknowns left free are absent from an assignment, and pivot
    /// unknowns are then expressed in terms of them.
    Solutions(Vec<Assignment>),
    /// Every equation reduces to `0 = 0`.
    Identity,
}

/// Solve the system `equations[i] = 0` for `vars`.
pub fn solve_system(equations: &[Expr], vars: &[String]) -> Result<SystemSolution> {
    let equations: Vec<Expr> = equations.iter().map(simplify).collect();
    if equations.iter().all(Expr::is_zero) {
        return Ok(SystemSolution::Identity);
    }
    let rows: Option<Vec<_>> = equations.iter().map(|eq| linear_row(eq, vars)).collect();
    if let Some(rows) = rows {
        return Ok(gauss_jordan(rows, vars));
    }
    let mut found = substitute(equations, vars.to_vec(), 0)?;
    for assignment in &mut found {
        assignment.sort_by(|a, b| a.0.cmp(&b.0));
    }
    found.dedup();
    Ok(SystemSolution::Solutions(found))
}

/// Zero for elimination purposes: exactly for rationals, relative to the
/// largest comparable entry of the system for floats.
fn negligible(n: &Number, scale: f64) -> bool {
    match n {
        Number::Rational(_) => n.is_zero(),
        Number::Float(f) => f.abs() <= 1e-12 * scale,
    }
}

fn largest<'a>(values: impl Iterator<Item = &'a Number>) -> f64 {
    values.map(|n| n.to_f64().abs()).fold(0.0, f64::max)
}

/// Coefficients and right-hand side of a linear equation, if it is one.
fn linear_row(equation: &Expr, vars: &[String]) -> Option<(Vec<Number>, Number)> {
    let expanded = expand(equation);
    let terms = match expanded {
        Expr::Add(terms) => terms,
        other => vec![other],
    };
    let mut row = vec![Number::zero(); vars.len()];
    let mut constant = Number::zero();
    for term in terms {
        let (coeff, rest) = split_coeff(&term);
        if rest.is_one() {
            constant = constant + coeff;
            continue;
        }
        if let Expr::Sym(name) = &rest {
            let index = vars.iter().position(|v| v == name)?;
            row[index] = row[index] + coeff;
            continue;
        }
        if rest.is_constant() {
            constant = constant + coeff * Number::Float(rest.eval_constant());
            continue;
        }
        return None;
    }
    Some((row, -constant))
}

fn gauss_jordan(mut rows: Vec<(Vec<Number>, Number)>, vars: &[String]) -> SystemSolution {
    let scale = largest(rows.iter().flat_map(|(coeffs, _)| coeffs.iter()));
    let rhs_scale = largest(rows.iter().map(|(_, rhs)| rhs));
    let mut pivots: Vec<usize> = Vec::new();
    for col in 0..vars.len() {
        let r = pivots.len();
        let pivot = (r..rows.len())
            .filter(|&i| !negligible(&rows[i].0[col], scale))
            .max_by(|&a, &b| {
                let (x, y) = (rows[a].0[col].to_f64().abs(), rows[b].0[col].to_f64().abs());
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(p) = pivot else {
            continue;
        };
        rows.swap(r, p);
        let Some(inverse) = rows[r].0[col].recip() else {
            continue;
        };
        let (pivot_row, pivot_rhs) = {
            let (coeffs, rhs) = &rows[r];
            (
                coeffs.iter().map(|c| *c * inverse).collect::<Vec<_>>(),
                *rhs * inverse,
            )
        };
        for (i, (coeffs, rhs)) in rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let factor = coeffs[col];
            if negligible(&factor, scale) {
                continue;
            }
            for (c, p) in coeffs.iter_mut().zip(&pivot_row) {
                *c = *c - factor * *p;
            }
            *rhs = *rhs - factor * pivot_rhs;
        }
        rows[r] = (pivot_row, pivot_rhs);
        pivots.push(col);
    }

    if rows[pivots.len()..].iter().any(|(_, rhs)| !negligible(rhs, rhs_scale)) {
        return SystemSolution::Solutions(Vec::new());
    }
    if pivots.is_empty() {
        return SystemSolution::Identity;
    }
    let free: Vec<usize> = (0..vars.len()).filter(|c| !pivots.contains(c)).collect();
    let mut assignment: Assignment = pivots
        .iter()
        .enumerate()
        .map(|(row, &col)| {
            let (coeffs, rhs) = &rows[row];
            let mut terms = vec![Expr::Num(*rhs)];
            for &f in &free {
                if !negligible(&coeffs[f], scale) {
                    terms.push(Expr::mul(Expr::Num(-coeffs[f]), Expr::sym(vars[f].as_str())));
                }
            }
            (vars[col].clone(), simplify(&Expr::Add(terms)))
        })
        .collect();
    assignment.sort_by(|a, b| a.0.cmp(&b.0));
    SystemSolution::Solutions(vec![assignment])
}

/// How an equation is used to eliminate an unknown, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Elimination {
    /// Linear in the unknown with a constant coefficient.
    Linear,
    /// The only unknown in its equation.
    Univariate,
    /// Linear with a coefficient that depends on other unknowns.
    Rational,
    Quadratic,
}

fn choose(equations: &[Expr], vars: &[String]) -> Option<(usize, usize)> {
    let mut best: Option<(Elimination, usize, usize)> = None;
    for (i, eq) in equations.iter().enumerate() {
        for (j, var) in vars.iter().enumerate() {
            if !eq.contains(var) {
                continue;
            }
            let coeffs = coefficients(eq, var);
            let kind = match &coeffs {
                Some(c) if c.len() == 2 && c[1].is_constant() => Elimination::Linear,
                _ if eq.free_symbols().len() == 1 => Elimination::Univariate,
                Some(c) if c.len() == 2 => Elimination::Rational,
                Some(c) if c.len() == 3 => Elimination::Quadratic,
                _ => continue,
            };
            if best.as_ref().is_none_or(|(k, _, _)| kind < *k) {
                best = Some((kind, i, j));
            }
        }
    }
    best.map(|(_, i, j)| (i, j))
}

fn substitute(equations: Vec<Expr>, vars: Vec<String>, depth: usize) -> Result<Vec<Assignment>> {
    let mut remaining = Vec::with_capacity(equations.len());
    for eq in equations {
        let eq = simplify(&eq);
        if eq.is_zero() {
            continue;
        }
        if eq.is_constant() {
            let value = eq.eval_constant();
            if !value.is_finite() || value.abs() > 1e-9 {
                return Ok(Vec::new());
            }
            continue;
        }
        remaining.push(eq);
    }
    if remaining.is_empty() {
        return Ok(vec![Vec::new()]);
    }
    if depth > MAX_SUBSTITUTION_DEPTH {
        return Err(EngineError::unsupported("the system is too deeply nested to solve"));
    }
    let Some((index, var_index)) = choose(&remaining, &vars) else {
        return Err(EngineError::unsupported("could not isolate any unknown in the system"));
    };

    let equation = remaining.remove(index);
    let var = vars[var_index].clone();
    let others: Vec<String> = vars.iter().filter(|v| **v != var).cloned().collect();
    let values = match solve(&equation, &var)? {
        Solutions::Finite(values) => values,
        Solutions::All => return substitute(remaining, vars, depth + 1),
    };

    let mut out = Vec::new();
    for value in values {
        let reduced: Vec<Expr> = remaining
            .iter()
            .map(|eq| simplify(&eq.substitute(&var, &value)))
            .collect();
        for mut assignment in substitute(reduced, others.clone(), depth + 1)? {
            let mut resolved = value.clone();
            for (name, known) in &assignment {
                resolved = resolved.substitute(name, known);
            }
            assignment.push((var.clone(), simplify(&resolved)));
            out.push(assignment);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn system(equations: &[(&str, &str)]) -> SystemSolution {
        let exprs: Vec<Expr> = equations
            .iter()
            .map(|(l, r)| Expr::sub(parse(l).unwrap(), parse(r).unwrap()))
            .collect();
        let mut vars: Vec<String> = exprs.iter().flat_map(Expr::free_symbols).collect();
        vars.sort();
        vars.dedup();
        solve_system(&exprs, &vars).unwrap()
    }

    fn render(solution: &SystemSolution) -> Vec<String> {
        match solution {
            SystemSolution::Identity => vec!["identity".to_string()],
            SystemSolution::Solutions(sets) => sets
                .iter()
                .map(|set| {
                    set.iter()
                        .map(|(v, e)| format!("{v} = {e}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect(),
        }
    }

    #[test]
    fn solves_square_linear_systems() {
        let found = system(&[("x + y", "10"), ("x - y", "2")]);
        assert_eq!(render(&found), vec!["x = 6, y = 4"]);
        let found = system(&[("2*x + 3*y", "7"), ("x - y", "1")]);
        assert_eq!(render(&found), vec!["x = 2, y = 1"]);
    }

    #[test]
    fn classifies_degenerate_linear_systems() {
        assert_eq!(render(&system(&[("x + y", "1"), ("x + y", "2")])), Vec::<String>::new());
        assert_eq!(render(&system(&[("x + y", "5")])), vec!["x = 5 - y"]);
        assert_eq!(render(&system(&[("x", "x")])), vec!["identity"]);
    }

    #[test]
    fn tiny_values_are_not_eliminated() {
        let found = system(&[("x + y", "1e-20"), ("x - y", "0")]);
        assert_eq!(render(&found), vec!["x = 5e-21, y = 5e-21"]);
        let found = system(&[("x + y", "1e-20"), ("x + y", "0")]);
        assert_eq!(render(&found), Vec::<String>::new());
    }

    #[test]
    fn solves_nonlinear_systems_by_substitution() {
        let found = system(&[("x + y", "5"), ("x*y", "6")]);
        assert_eq!(render(&found), vec!["x = 3, y = 2", "x = 2, y = 3"]);
        let found = system(&[("x**2 + y**2", "25"), ("x - y", "1")]);
        assert_eq!(render(&found), vec!["x = -3, y = -4", "x = 4, y = 3"]);
    }
}
