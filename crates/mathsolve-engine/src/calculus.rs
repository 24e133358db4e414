//! Symbolic differentiation and rule-based integration.

use crate::error::{EngineError, Result};
use crate::expr::{Expr, Func};
use crate::number::Number;
use crate::poly::{coefficients, expand};
use crate::simplify::simplify;

/// Nesting limit for integration by parts and expansion retries.
const MAX_INTEGRATION_DEPTH: usize = 6;

/// `d(expr)/d(var)`, simplified.
pub fn diff(expr: &Expr, var: &str) -> Expr {
    simplify(&derive(&simplify(expr), var))
}

fn derive(expr: &Expr, var: &str) -> Expr {
    if !expr.contains(var) {
        return Expr::zero();
    }
    match expr {
        Expr::Sym(_) => Expr::one(),
        Expr::Num(_) | Expr::Const(_) => Expr::zero(),
        Expr::Add(terms) => Expr::Add(terms.iter().map(|t| derive(t, var)).collect()),
        Expr::Mul(factors) => {
            let mut terms = Vec::new();
            for (i, factor) in factors.iter().enumerate() {
                if !factor.contains(var) {
                    continue;
                }
                let mut product = factors.clone();
                product[i] = derive(factor, var);
                terms.push(Expr::Mul(product));
            }
            Expr::Add(terms)
        }
        Expr::Pow(base, exp) => {
            let (base, exp) = (base.as_ref(), exp.as_ref());
            if !exp.contains(var) {
                // power rule
                let lowered = Expr::pow(base.clone(), Expr::sub(exp.clone(), Expr::one()));
                Expr::Mul(vec![exp.clone(), lowered, derive(base, var)])
            } else if !base.contains(var) {
                Expr::Mul(vec![
                    expr.clone(),
                    Expr::func(Func::Log, base.clone()),
                    derive(exp, var),
                ])
            } else {
                // d(u**v) = u**v * (v' * log(u) + v * u' / u)
                let inner = Expr::add(
                    Expr::mul(derive(exp, var), Expr::func(Func::Log, base.clone())),
                    Expr::Mul(vec![exp.clone(), derive(base, var), Expr::pow(base.clone(), Expr::int(-1))]),
                );
                Expr::mul(expr.clone(), inner)
            }
        }
        Expr::Func(func, arg) => {
            let arg = arg.as_ref();
            Expr::mul(outer_derivative(*func, arg), derive(arg, var))
        }
    }
}

/// `f'(u)` for a whitelisted function `f`.
fn outer_derivative(func: Func, u: &Expr) -> Expr {
    let u = u.clone();
    let square = |e: Expr| Expr::pow(e, Expr::int(2));
    let one_minus_square = |e: Expr| Expr::sub(Expr::one(), square(e));
    match func {
        Func::Sin => Expr::func(Func::Cos, u),
        Func::Cos => Expr::neg(Expr::func(Func::Sin, u)),
        Func::Tan => Expr::add(square(Expr::func(Func::Tan, u)), Expr::one()),
        Func::Asin => Expr::pow(Expr::sqrt(one_minus_square(u)), Expr::int(-1)),
        Func::Acos => Expr::neg(Expr::pow(Expr::sqrt(one_minus_square(u)), Expr::int(-1))),
        Func::Atan => Expr::pow(Expr::add(square(u), Expr::one()), Expr::int(-1)),
        Func::Sinh => Expr::func(Func::Cosh, u),
        Func::Cosh => Expr::func(Func::Sinh, u),
        Func::Tanh => one_minus_square(Expr::func(Func::Tanh, u)),
        Func::Exp => Expr::func(Func::Exp, u),
        Func::Log => Expr::pow(u, Expr::int(-1)),
        Func::Abs => Expr::mul(u.clone(), Expr::pow(Expr::func(Func::Abs, u), Expr::int(-1))),
    }
}

/// An antiderivative of `expr` with respect to `var`, without the constant
/// of integration.
pub fn integrate(expr: &Expr, var: &str) -> Result<Expr> {
    let expr = simplify(expr);
    match antiderivative(&expr, var, 0) {
        Some(result) => Ok(simplify(&result)),
        None => Err(EngineError::unsupported(format!(
            "no closed form found for the integral of {expr} with respect to {var}"
        ))),
    }
}

fn antiderivative(expr: &Expr, var: &str, depth: usize) -> Option<Expr> {
    if depth > MAX_INTEGRATION_DEPTH {
        return None;
    }
    if !expr.contains(var) {
        return Some(Expr::mul(expr.clone(), Expr::sym(var)));
    }
    match expr {
        Expr::Add(terms) => terms
            .iter()
            .map(|t| antiderivative(t, var, depth))
            .collect::<Option<Vec<_>>>()
            .map(Expr::Add),
        Expr::Mul(factors) => {
            let (constant, varying): (Vec<Expr>, Vec<Expr>) =
                factors.iter().cloned().partition(|f| !f.contains(var));
            if !constant.is_empty() {
                let inner = simplify(&Expr::Mul(varying));
                return antiderivative(&inner, var, depth).map(|r| {
                    let mut product = constant;
                    product.push(r);
                    Expr::Mul(product)
                });
            }
            by_substitution(expr, var)
                .or_else(|| by_expansion(expr, var, depth))
                .or_else(|| by_parts(&varying, var, depth))
        }
        _ => by_substitution(expr, var)
            .or_else(|| by_inverse_trig(expr, var))
            .or_else(|| by_expansion(expr, var, depth)),
    }
}

/// Factors of a product, or the expression itself.
fn factors_of(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(factors) => factors.clone(),
        other => vec![other.clone()],
    }
}

/// Everything in `factors` except the one at `skip`.
fn product_without(factors: &[Expr], skip: usize) -> Expr {
    let rest: Vec<Expr> = factors
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, f)| f.clone())
        .collect();
    simplify(&Expr::Mul(rest))
}

/// Reverse chain rule: find a factor `F(u)` whose companion factors are a
/// constant multiple of `u'`.
fn by_substitution(expr: &Expr, var: &str) -> Option<Expr> {
    let factors = factors_of(expr);
    for (i, factor) in factors.iter().enumerate() {
        if !factor.contains(var) {
            continue;
        }
        let rest = product_without(&factors, i);
        for (u, integral_in_u) in substitution_candidates(factor, var) {
            let du = diff(&u, var);
            if du.is_zero() {
                continue;
            }
            let ratio = simplify(&Expr::div(rest.clone(), du));
            if !ratio.contains(var) {
                return Some(Expr::mul(ratio, integral_in_u));
            }
        }
    }
    None
}

/// Ways to read `factor` as `g(u)`, paired with `∫ g(u) du`.
fn substitution_candidates(factor: &Expr, var: &str) -> Vec<(Expr, Expr)> {
    let mut out = Vec::new();
    match factor {
        Expr::Pow(base, exp) if !exp.contains(var) => {
            out.push(((**base).clone(), power_integral(base, exp)));
        }
        Expr::Pow(base, exp) if !base.contains(var) => {
            // b**u integrates to b**u / log(b)
            let integral = Expr::div(factor.clone(), Expr::func(Func::Log, (**base).clone()));
            out.push(((**exp).clone(), integral));
        }
        Expr::Pow(..) => {}
        Expr::Func(func, arg) => {
            if let Some(integral) = function_integral(*func, arg) {
                out.push(((**arg).clone(), integral));
            }
            out.push((factor.clone(), power_integral(factor, &Expr::one())));
        }
        other => out.push((other.clone(), power_integral(other, &Expr::one()))),
    }
    out
}

/// `∫ u**n du`.
fn power_integral(u: &Expr, n: &Expr) -> Expr {
    if simplify(n) == Expr::int(-1) {
        return Expr::func(Func::Log, u.clone());
    }
    let raised = simplify(&Expr::add(n.clone(), Expr::one()));
    Expr::div(Expr::pow(u.clone(), raised.clone()), raised)
}

/// `∫ f(u) du` for the functions with a table entry.
fn function_integral(func: Func, u: &Expr) -> Option<Expr> {
    let u = u.clone();
    let sqrt_one_minus_square = || {
        Expr::sqrt(Expr::sub(Expr::one(), Expr::pow(u.clone(), Expr::int(2))))
    };
    Some(match func {
        Func::Sin => Expr::neg(Expr::func(Func::Cos, u)),
        Func::Cos => Expr::func(Func::Sin, u),
        Func::Tan => Expr::neg(Expr::func(Func::Log, Expr::func(Func::Cos, u))),
        Func::Exp => Expr::func(Func::Exp, u),
        Func::Sinh => Expr::func(Func::Cosh, u),
        Func::Cosh => Expr::func(Func::Sinh, u),
        Func::Tanh => Expr::func(Func::Log, Expr::func(Func::Cosh, u)),
        Func::Log => Expr::sub(Expr::mul(u.clone(), Expr::func(Func::Log, u.clone())), u),
        Func::Asin => Expr::add(
            Expr::mul(u.clone(), Expr::func(Func::Asin, u.clone())),
            sqrt_one_minus_square(),
        ),
        Func::Acos => Expr::sub(
            Expr::mul(u.clone(), Expr::func(Func::Acos, u.clone())),
            sqrt_one_minus_square(),
        ),
        Func::Atan => Expr::sub(
            Expr::mul(u.clone(), Expr::func(Func::Atan, u.clone())),
            Expr::mul(
                Expr::rational(1, 2),
                Expr::func(Func::Log, Expr::add(Expr::pow(u, Expr::int(2)), Expr::one())),
            ),
        ),
        Func::Abs => return None,
    })
}

/// `1/(a*x**2 + c)` and `1/sqrt(c - a*x**2)` with `a, c > 0`.
fn by_inverse_trig(expr: &Expr, var: &str) -> Option<Expr> {
    let Expr::Pow(base, exp) = expr else {
        return None;
    };
    let power = exp.as_number()?;
    let cs = coefficients(base, var)?;
    let [c, b, a] = cs.as_slice() else {
        return None;
    };
    if !b.is_zero() || !a.is_constant() || !c.is_constant() {
        return None;
    }
    let (av, cv) = (a.eval_constant(), c.eval_constant());
    let x = Expr::sym(var);
    if power == Number::int(-1) && av > 0.0 && cv > 0.0 {
        // atan(x*sqrt(a/c)) / sqrt(a*c)
        let scale = Expr::sqrt(Expr::div(a.clone(), c.clone()));
        let norm = Expr::sqrt(Expr::mul(a.clone(), c.clone()));
        return Some(Expr::div(Expr::func(Func::Atan, Expr::mul(scale, x)), norm));
    }
    if power == Number::ratio(-1, 2) && av < 0.0 && cv > 0.0 {
        // asin(x*sqrt(-a/c)) / sqrt(-a)
        let neg_a = Expr::neg(a.clone());
        let scale = Expr::sqrt(Expr::div(neg_a.clone(), c.clone()));
        return Some(Expr::div(Expr::func(Func::Asin, Expr::mul(scale, x)), Expr::sqrt(neg_a)));
    }
    None
}

fn by_expansion(expr: &Expr, var: &str, depth: usize) -> Option<Expr> {
    let expanded = expand(expr);
    if expanded == *expr || !matches!(expanded, Expr::Add(_)) {
        return None;
    }
    antiderivative(&expanded, var, depth + 1)
}

/// Is `expr` a linear function of `var`?
fn is_linear(expr: &Expr, var: &str) -> bool {
    coefficients(expr, var).is_some_and(|c| c.len() == 2 && c.iter().all(|k| !k.contains(var)))
}

/// Integration by parts for a polynomial times one transcendental factor.
fn by_parts(factors: &[Expr], var: &str, depth: usize) -> Option<Expr> {
    let (transcendental, algebraic): (Vec<Expr>, Vec<Expr>) = factors
        .iter()
        .cloned()
        .partition(|f| matches!(f, Expr::Func(..)));
    let [kernel] = transcendental.as_slice() else {
        return None;
    };
    let Expr::Func(func, arg) = kernel else {
        return None;
    };
    if algebraic.is_empty() || !is_linear(arg, var) {
        return None;
    }
    let polynomial = simplify(&Expr::Mul(algebraic));
    coefficients(&polynomial, var)?;

    match func {
        // differentiate the polynomial, integrate the kernel
        Func::Exp | Func::Sin | Func::Cos | Func::Sinh | Func::Cosh => {
            let kernel_integral = simplify(&antiderivative(kernel, var, depth + 1)?);
            let remainder = simplify(&Expr::mul(diff(&polynomial, var), kernel_integral.clone()));
            let rest = antiderivative(&remainder, var, depth + 1)?;
            Some(Expr::sub(Expr::mul(polynomial, kernel_integral), rest))
        }
        // differentiate the kernel, integrate the polynomial
        Func::Log | Func::Atan | Func::Asin | Func::Acos => {
            let poly_integral = simplify(&antiderivative(&polynomial, var, depth + 1)?);
            let remainder = simplify(&Expr::mul(diff(kernel, var), poly_integral.clone()));
            let rest = antiderivative(&expand(&remainder), var, depth + 1)?;
            Some(Expr::sub(Expr::mul(kernel.clone(), poly_integral), rest))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn d(input: &str) -> String {
        diff(&parse(input).unwrap(), "x").to_string()
    }

    fn int(input: &str) -> String {
        integrate(&parse(input).unwrap(), "x").unwrap().to_string()
    }

    #[test]
    fn differentiates_polynomials() {
        assert_eq!(d("x**2 + 3*x"), "2*x + 3");
        assert_eq!(d("5"), "0");
        assert_eq!(d("x**3/3 - x"), "x**2 - 1");
    }

    #[test]
    fn differentiates_with_chain_and_product_rules() {
        assert_eq!(d("sin(x)"), "cos(x)");
        assert_eq!(d("cos(2*x)"), "-2*sin(2*x)");
        assert_eq!(d("x*exp(x)"), "x*exp(x) + exp(x)");
        assert_eq!(d("log(x)"), "1/x");
    }

    #[test]
    fn integrates_polynomials() {
        assert_eq!(int("x**2 + 3*x"), "x**3/3 + 3*x**2/2");
        assert_eq!(int("4"), "4*x");
        assert_eq!(int("1/x"), "log(x)");
    }

    #[test]
    fn integrates_by_substitution() {
        assert_eq!(int("cos(x)"), "sin(x)");
        assert_eq!(int("exp(2*x)"), "exp(2*x)/2");
        assert_eq!(int("2*x*cos(x**2)"), "sin(x**2)");
        assert_eq!(int("x/(x**2 + 1)"), "log(x**2 + 1)/2");
    }

    #[test]
    fn integrates_inverse_trig_forms() {
        assert_eq!(int("1/(x**2 + 1)"), "atan(x)");
        assert_eq!(int("1/sqrt(1 - x**2)"), "asin(x)");
        assert_eq!(int("1/(x**2 + 4)"), "atan(x/2)/2");
    }

    #[test]
    fn integrates_by_parts() {
        assert_eq!(int("x*exp(x)"), "x*exp(x) - exp(x)");
        assert_eq!(int("log(x)"), "x*log(x) - x");
    }

    #[test]
    fn reports_missing_closed_forms() {
        let err = integrate(&parse("exp(x**2)").unwrap(), "x").unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(_)));
    }
}
