//! Polynomial views of expressions.

use crate::expr::Expr;
use crate::simplify::{simplify, simplify_add, simplify_mul};

/// Integer powers of sums above this are left unexpanded.
const MAX_EXPANDED_POWER: i64 = 16;
/// Highest degree treated as a polynomial.
pub const MAX_DEGREE: usize = 64;

/// Multiply out products of sums and small integer powers of sums.
pub fn expand(expr: &Expr) -> Expr {
    simplify(&expand_inner(&simplify(expr)))
}

fn expand_inner(expr: &Expr) -> Expr {
    match expr {
        Expr::Add(terms) => simplify_add(terms.iter().map(expand_inner).collect()),
        Expr::Mul(factors) => {
            let expanded: Vec<Expr> = factors.iter().map(expand_inner).collect();
            distribute(expanded)
        }
        Expr::Pow(base, exp) => {
            let base = expand_inner(base);
            let power = exp.as_number().and_then(|n| n.as_integer());
            match (power, &base) {
                (Some(k), Expr::Add(_)) if (2..=MAX_EXPANDED_POWER).contains(&k) => {
                    distribute(vec![base; k as usize])
                }
                _ => simplify(&Expr::pow(base, (**exp).clone())),
            }
        }
        Expr::Func(func, arg) => simplify(&Expr::func(*func, expand_inner(arg))),
        Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => expr.clone(),
    }
}

fn terms_of(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(terms) => terms,
        other => vec![other],
    }
}

/// Multiply a list of factors, distributing over every sum.
fn distribute(factors: Vec<Expr>) -> Expr {
    let mut acc = vec![Expr::one()];
    for factor in factors {
        let rhs = terms_of(factor);
        let mut next = Vec::with_capacity(acc.len() * rhs.len());
        for a in &acc {
            for b in &rhs {
                next.push(simplify_mul(vec![a.clone(), b.clone()]));
            }
        }
        acc = terms_of(simplify_add(next));
    }
    simplify_add(acc)
}

/// Coefficients of `expr` as a polynomial in `var`, lowest degree first.
///
/// Returns `None` when `var` appears anywhere other than in non-negative
/// integer powers.
pub fn coefficients(expr: &Expr, var: &str) -> Option<Vec<Expr>> {
    let expanded = expand(expr);
    let mut buckets: Vec<Vec<Expr>> = Vec::new();
    for term in terms_of(expanded) {
        let (degree, coeff) = term_degree(&term, var)?;
        if degree > MAX_DEGREE {
            return None;
        }
        if buckets.len() <= degree {
            buckets.resize(degree + 1, Vec::new());
        }
        buckets[degree].push(coeff);
    }
    let mut coeffs: Vec<Expr> = buckets.into_iter().map(simplify_add).collect();
    while coeffs.len() > 1 && coeffs.last().is_some_and(Expr::is_zero) {
        coeffs.pop();
    }
    if coeffs.is_empty() {
        coeffs.push(Expr::zero());
    }
    Some(coeffs)
}

/// Highest power of `var` in a polynomial of any degree, without building
/// its coefficients.
pub fn leading_power(expr: &Expr, var: &str) -> Option<usize> {
    terms_of(expand(expr))
        .iter()
        .try_fold(0, |max, term| Some(max.max(term_degree(term, var)?.0)))
}

/// Degree in `var`, or zero for the zero polynomial.
pub fn degree(expr: &Expr, var: &str) -> Option<usize> {
    coefficients(expr, var).map(|c| c.len() - 1)
}

fn var_power(factor: &Expr, var: &str) -> Option<usize> {
    match factor {
        Expr::Sym(name) if name == var => Some(1),
        Expr::Pow(base, exp) if matches!(base.as_ref(), Expr::Sym(name) if name == var) => {
            let k = exp.as_number()?.as_integer()?;
            usize::try_from(k).ok()
        }
        _ => None,
    }
}

fn term_degree(term: &Expr, var: &str) -> Option<(usize, Expr)> {
    if !term.contains(var) {
        return Some((0, term.clone()));
    }
    if let Some(k) = var_power(term, var) {
        return Some((k, Expr::one()));
    }
    let Expr::Mul(factors) = term else {
        return None;
    };
    let mut degree = 0;
    let mut rest = Vec::with_capacity(factors.len());
    for factor in factors {
        if factor.contains(var) {
            degree += var_power(factor, var)?;
        } else {
            rest.push(factor.clone());
        }
    }
    Some((degree, simplify_mul(rest)))
}

/// Split a canonical product into numerator and denominator.
pub fn split_fraction(expr: &Expr) -> (Expr, Expr) {
    let mut numer = Vec::new();
    let mut denom = Vec::new();
    for factor in terms_or_factors(expr) {
        match &factor {
            Expr::Pow(base, exp) if exp.as_number().is_some_and(|n| n.is_negative()) => {
                denom.push(simplify(&Expr::pow((**base).clone(), Expr::neg((**exp).clone()))));
            }
            _ => numer.push(factor),
        }
    }
    (simplify_mul(numer), simplify_mul(denom))
}

fn terms_or_factors(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(factors) => factors.clone(),
        other => vec![other.clone()],
    }
}

/// Bring a sum over a common denominator. The numerator is expanded.
pub fn together(expr: &Expr) -> (Expr, Expr) {
    let Expr::Add(terms) = expr else {
        return split_fraction(expr);
    };
    let parts: Vec<(Expr, Expr)> = terms.iter().map(split_fraction).collect();
    let mut common: Vec<Expr> = Vec::new();
    for (_, denom) in &parts {
        for factor in terms_or_factors(denom) {
            if !factor.is_one() && !common.contains(&factor) {
                common.push(factor);
            }
        }
    }
    if common.is_empty() {
        return (expr.clone(), Expr::one());
    }
    let denominator = simplify_mul(common);
    let numerator = parts
        .into_iter()
        .map(|(numer, denom)| {
            let scale = simplify(&Expr::div(denominator.clone(), denom));
            simplify_mul(vec![numer, scale])
        })
        .collect();
    (expand(&simplify_add(numerator)), denominator)
}

/// The coefficient vector as numbers, when every entry is a closed
/// constant.
pub fn numeric_coefficients(coeffs: &[Expr]) -> Option<Vec<f64>> {
    coeffs
        .iter()
        .map(|c| {
            let value = c.eval_constant();
            value.is_finite().then_some(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn show(input: &str) -> String {
        expand(&parse(input).unwrap()).to_string()
    }

    #[test]
    fn expands_products_and_powers() {
        assert_eq!(show("(x + 1)*(x - 1)"), "x**2 - 1");
        assert_eq!(show("(x + 2)**2"), "x**2 + 4*x + 4");
        assert_eq!(show("x*(x + 3) - 2*(x - 1)"), "x**2 + x + 2");
    }

    #[test]
    fn extracts_coefficients() {
        let e = parse("2*x**2 - 4*x + 2").unwrap();
        let coeffs = coefficients(&e, "x").unwrap();
        let shown: Vec<String> = coeffs.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["2", "-4", "2"]);
        assert_eq!(degree(&e, "x"), Some(2));
    }

    #[test]
    fn symbolic_coefficients_are_kept() {
        let e = parse("a*x**2 + b*x + c").unwrap();
        let coeffs = coefficients(&e, "x").unwrap();
        let shown: Vec<String> = coeffs.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["c", "b", "a"]);
    }

    #[test]
    fn rejects_non_polynomials() {
        assert_eq!(coefficients(&parse("sin(x) + 1").unwrap(), "x"), None);
        assert_eq!(coefficients(&parse("1/x").unwrap(), "x"), None);
        assert_eq!(degree(&parse("y + 1").unwrap(), "x"), Some(0));
    }
}
