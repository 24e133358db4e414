//! Real solutions of single-variable equations.
//!
//! Polynomials are solved exactly where possible: rational roots are found
//! with the rational root theorem and deflated out, and what remains up to
//! degree two goes through the quadratic formula with surds. Equations in a
//! single function of the unknown (`2*sin(x) = 1`, `exp(x + 1) = 3`) are
//! solved by inverting the function. Anything else falls back to a bracketing
//! scan whose roots are snapped onto nearby closed forms.

use std::cmp::Ordering;

use num_complex::Complex64;

use crate::error::{EngineError, Result};
use crate::expr::{Expr, Func};
use crate::limit::snap_within;
use crate::number::Number;
use crate::poly::{MAX_DEGREE, coefficients, expand, leading_power, together};
use crate::simplify::simplify;

/// Placeholder name for an isolated function of the unknown. Never a valid
/// input identifier.
const KERNEL: &str = "_u";
const ROOT_TOLERANCE: f64 = 1e-9;
const SCAN_STEPS: usize = 20_000;
/// Rational-root candidates are only enumerated for coefficients up to this.
const MAX_ROOT_CANDIDATE: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Solutions {
    /// The real solutions in ascending order; possibly none.
    Finite(Vec<Expr>),
    /// The equation holds for every value.
    All,
}

/// Solve `lhs = rhs` for `var`.
pub fn solve_equation(lhs: &Expr, rhs: &Expr, var: &str) -> Result<Solutions> {
    solve(&Expr::sub(lhs.clone(), rhs.clone()), var)
}

/// Solve `expr = 0` for `var`.
pub fn solve(expr: &Expr, var: &str) -> Result<Solutions> {
    let f = simplify(expr);
    if !f.contains(var) {
        return Ok(if f.is_zero() {
            Solutions::All
        } else {
            Solutions::Finite(Vec::new())
        });
    }
    let (numer, denom) = together(&f);
    let candidates = match solve_numerator(&numer, var)? {
        Solutions::All => return Ok(Solutions::All),
        Solutions::Finite(roots) => roots,
    };
    let roots = candidates
        .into_iter()
        .filter(|root| {
            let at_root = denom.substitute(var, root).eval_constant();
            !(at_root.is_finite() && at_root.abs() < ROOT_TOLERANCE)
        })
        .collect();
    Ok(Solutions::Finite(sort_roots(roots)))
}

fn solve_numerator(numer: &Expr, var: &str) -> Result<Solutions> {
    if let Some(coeffs) = coefficients(numer, var) {
        return solve_polynomial(&coeffs);
    }
    if let Some(degree) = leading_power(numer, var).filter(|d| *d > MAX_DEGREE) {
        return Err(EngineError::unsupported(format!(
            "polynomials of degree {degree} are not supported (maximum {MAX_DEGREE})"
        )));
    }
    if let Some(roots) = solve_by_inversion(numer, var)? {
        return Ok(Solutions::Finite(roots));
    }
    if numer.free_symbols().iter().any(|s| s != var) {
        return Err(EngineError::unsupported(format!(
            "cannot solve {numer} = 0 for {var}"
        )));
    }
    let (lo, hi) = if has_trig(numer) {
        (0.0, 2.0 * std::f64::consts::PI)
    } else {
        (-100.0, 100.0)
    };
    let roots = scan_roots(numer, var, lo, hi)
        .into_iter()
        .map(|r| snap_within(r, ROOT_TOLERANCE))
        .collect();
    Ok(Solutions::Finite(roots))
}

/// Order roots by value and drop numeric duplicates.
fn sort_roots(mut roots: Vec<Expr>) -> Vec<Expr> {
    roots.sort_by(|a, b| {
        a.eval_constant()
            .partial_cmp(&b.eval_constant())
            .unwrap_or(Ordering::Equal)
    });
    let mut out: Vec<Expr> = Vec::with_capacity(roots.len());
    for root in roots {
        let duplicate = out.last().is_some_and(|prev| {
            let exact = |e: &Expr| e.as_number().is_some_and(|n| n.is_exact());
            if *prev == root || (exact(prev) && exact(&root)) {
                return *prev == root;
            }
            let (a, b) = (prev.eval_constant(), root.eval_constant());
            a.is_finite() && (a - b).abs() <= 1e-9 * a.abs().max(1.0)
        });
        if !duplicate {
            out.push(root);
        }
    }
    out
}

// --- Polynomials ---

/// Solve `sum(coeffs[i] * x**i) = 0`.
pub fn solve_polynomial(coeffs: &[Expr]) -> Result<Solutions> {
    let degree = coeffs.len().saturating_sub(1);
    if degree == 0 {
        return Ok(match coeffs.first() {
            Some(c) if !c.is_zero() => Solutions::Finite(Vec::new()),
            _ => Solutions::All,
        });
    }
    let constant = coeffs.iter().all(Expr::is_constant);
    if constant {
        let exact: Option<Vec<Number>> = coeffs.iter().map(exact_coefficient).collect();
        if let Some(exact) = exact {
            return Ok(Solutions::Finite(exact_polynomial_roots(exact)));
        }
    }
    match degree {
        1 => {
            let root = Expr::neg(Expr::div(coeffs[0].clone(), coeffs[1].clone()));
            Ok(Solutions::Finite(vec![simplify(&root)]))
        }
        2 => Ok(Solutions::Finite(sort_roots(quadratic_roots(
            &coeffs[2], &coeffs[1], &coeffs[0],
        )))),
        _ if constant => {
            let values: Vec<f64> = coeffs.iter().map(Expr::eval_constant).collect();
            let roots = real_polynomial_roots(&values)
                .into_iter()
                .map(|r| snap_within(r, ROOT_TOLERANCE))
                .collect();
            Ok(Solutions::Finite(sort_roots(roots)))
        }
        _ => Err(EngineError::unsupported(format!(
            "cannot solve a degree {degree} polynomial with symbolic coefficients"
        ))),
    }
}

fn exact_coefficient(expr: &Expr) -> Option<Number> {
    expr.as_number().filter(Number::is_exact)
}

/// `b**2 - 4*a*c`.
pub fn discriminant(a: &Expr, b: &Expr, c: &Expr) -> Expr {
    expand(&Expr::sub(
        Expr::pow(b.clone(), Expr::int(2)),
        Expr::Mul(vec![Expr::int(4), a.clone(), c.clone()]),
    ))
}

/// Real roots of `a*x**2 + b*x + c`, by the quadratic formula.
fn quadratic_roots(a: &Expr, b: &Expr, c: &Expr) -> Vec<Expr> {
    let disc = discriminant(a, b, c);
    let disc_sign = match disc.as_number() {
        Some(n) if n.is_exact() => n.partial_cmp(&Number::zero()).unwrap_or(Ordering::Equal),
        _ => float_sign(disc.eval_constant(), a, b, c),
    };
    if disc_sign == Ordering::Less {
        return Vec::new();
    }
    let two_a = Expr::mul(Expr::int(2), a.clone());
    if disc_sign == Ordering::Equal {
        return vec![simplify(&Expr::neg(Expr::div(b.clone(), two_a)))];
    }
    let root = |sign: i64| {
        let offset = Expr::mul(Expr::int(sign), Expr::sqrt(disc.clone()));
        simplify(&Expr::div(Expr::sub(offset, b.clone()), two_a.clone()))
    };
    vec![root(-1), root(1)]
}

/// Sign of a float discriminant, treating anything within rounding of
/// `b**2` and `4*a*c` as zero.
fn float_sign(value: f64, a: &Expr, b: &Expr, c: &Expr) -> Ordering {
    if !value.is_finite() {
        return Ordering::Greater;
    }
    let b = b.eval_constant();
    let scale = (b * b).abs().max((4.0 * a.eval_constant() * c.eval_constant()).abs());
    if value.abs() <= ROOT_TOLERANCE * scale {
        Ordering::Equal
    } else if value < 0.0 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

fn exact_polynomial_roots(mut coeffs: Vec<Number>) -> Vec<Expr> {
    let mut roots = Vec::new();
    while coeffs.len() > 1 && coeffs[0].is_zero() {
        roots.push(Expr::zero());
        coeffs.remove(0);
    }
    while coeffs.len() > 3 {
        match find_rational_root(&coeffs) {
            Some(root) => {
                roots.push(Expr::Num(root));
                coeffs = deflate(&coeffs, root);
            }
            None => break,
        }
    }
    match coeffs.len() {
        0 | 1 => {}
        2 => {
            if let Some(root) = (-coeffs[0]).checked_div(coeffs[1]) {
                roots.push(Expr::Num(root));
            }
        }
        3 => {
            let [c, b, a] = [coeffs[0], coeffs[1], coeffs[2]].map(Expr::Num);
            roots.extend(quadratic_roots(&a, &b, &c));
        }
        _ => {
            let values: Vec<f64> = coeffs.iter().map(Number::to_f64).collect();
            roots.extend(
                real_polynomial_roots(&values)
                    .into_iter()
                    .map(|r| snap_within(r, ROOT_TOLERANCE)),
            );
        }
    }
    sort_roots(roots)
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

/// Scale rational coefficients to integers.
fn integer_coefficients(coeffs: &[Number]) -> Option<Vec<i64>> {
    let mut lcm = 1i64;
    for c in coeffs {
        let denom = *c.as_rational()?.denom();
        lcm = lcm.checked_mul(denom / gcd(lcm, denom))?;
    }
    coeffs
        .iter()
        .map(|c| {
            let r = c.as_rational()?;
            r.numer().checked_mul(lcm / r.denom())
        })
        .collect()
}

fn divisors(n: i64) -> Vec<i64> {
    let n = n.abs();
    let mut out = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            out.push(d);
            if d != n / d {
                out.push(n / d);
            }
        }
        d += 1;
    }
    out
}

fn horner(coeffs: &[Number], x: Number) -> Number {
    coeffs
        .iter()
        .rev()
        .fold(Number::zero(), |acc, c| acc * x + *c)
}

/// A rational root `p/q` with `p | a0` and `q | an`, if there is one.
fn find_rational_root(coeffs: &[Number]) -> Option<Number> {
    let ints = integer_coefficients(coeffs)?;
    let (a0, an) = (*ints.first()?, *ints.last()?);
    if a0 == 0 || a0.abs() > MAX_ROOT_CANDIDATE || an.abs() > MAX_ROOT_CANDIDATE {
        return None;
    }
    for p in divisors(a0) {
        for q in divisors(an) {
            for candidate in [Number::ratio(p, q), Number::ratio(-p, q)] {
                let value = horner(coeffs, candidate);
                if value.is_exact() && value.is_zero() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Divide out the factor `(x - root)` by synthetic division.
fn deflate(coeffs: &[Number], root: Number) -> Vec<Number> {
    let n = coeffs.len() - 1;
    let mut quotient = vec![Number::zero(); n];
    let mut carry = Number::zero();
    for k in (1..=n).rev() {
        carry = coeffs[k] + carry * root;
        quotient[k - 1] = carry;
    }
    quotient
}

/// Real roots of a polynomial with float coefficients, lowest degree
/// first, via Durand-Kerner iteration on all complex roots.
pub fn real_polynomial_roots(coeffs: &[f64]) -> Vec<f64> {
    let mut coeffs = coeffs.to_vec();
    while coeffs.len() > 1 && coeffs.last().is_some_and(|c| c.abs() < 1e-300) {
        coeffs.pop();
    }
    let n = coeffs.len().saturating_sub(1);
    if n == 0 {
        return Vec::new();
    }
    let lead = coeffs[n];
    let monic: Vec<f64> = coeffs.iter().map(|c| c / lead).collect();
    let eval = |z: Complex64| {
        monic
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z + *c)
    };

    let seed = Complex64::new(0.4, 0.9);
    let mut roots: Vec<Complex64> = (0..n).map(|k| seed.powu(k as u32)).collect();
    for _ in 0..1000 {
        let mut largest_step: f64 = 0.0;
        for i in 0..n {
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..n {
                if i != j {
                    denom *= roots[i] - roots[j];
                }
            }
            if denom.norm() == 0.0 {
                continue;
            }
            let step = eval(roots[i]) / denom;
            roots[i] -= step;
            largest_step = largest_step.max(step.norm());
        }
        if largest_step < 1e-15 {
            break;
        }
    }

    let real = |x: f64| monic.iter().rev().fold(0.0, |acc, c| acc * x + c);
    let slope = |x: f64| {
        monic
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (k, c)| acc * x + k as f64 * c)
    };
    let mut out: Vec<f64> = roots
        .into_iter()
        .filter(|z| z.im.abs() <= 1e-7 * z.re.abs().max(1.0))
        .map(|z| {
            // a few Newton steps on the real axis
            let mut x = z.re;
            for _ in 0..3 {
                let d = slope(x);
                if d == 0.0 {
                    break;
                }
                x -= real(x) / d;
            }
            x
        })
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out.dedup_by(|a, b| (*a - *b).abs() <= 1e-7 * a.abs().max(1.0));
    out
}

// --- Inversion ---

/// Collect the maximal subterms through which `var` enters `expr`.
fn collect_kernels(expr: &Expr, var: &str, out: &mut Vec<Expr>) {
    if !expr.contains(var) {
        return;
    }
    let is_kernel = match expr {
        Expr::Sym(_) | Expr::Func(..) => true,
        Expr::Pow(base, exp) => {
            (exp.contains(var) && !base.contains(var))
                || exp.as_number().is_some_and(|n| !n.is_integer())
        }
        _ => false,
    };
    if is_kernel {
        if !out.contains(expr) {
            out.push(expr.clone());
        }
        return;
    }
    match expr {
        Expr::Add(items) | Expr::Mul(items) => {
            for item in items {
                collect_kernels(item, var, out);
            }
        }
        Expr::Pow(base, exp) => {
            collect_kernels(base, var, out);
            collect_kernels(exp, var, out);
        }
        _ => {}
    }
}

fn replace(expr: &Expr, target: &Expr, with: &Expr) -> Expr {
    if expr == target {
        return with.clone();
    }
    match expr {
        Expr::Add(items) => Expr::Add(items.iter().map(|i| replace(i, target, with)).collect()),
        Expr::Mul(items) => Expr::Mul(items.iter().map(|i| replace(i, target, with)).collect()),
        Expr::Pow(base, exp) => Expr::pow(replace(base, target, with), replace(exp, target, with)),
        Expr::Func(func, arg) => Expr::func(*func, replace(arg, target, with)),
        Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => expr.clone(),
    }
}

/// Solve an equation in which `var` only occurs inside one function
/// application `g(u)`: solve for `g(u)` first, then invert `g`.
fn solve_by_inversion(expr: &Expr, var: &str) -> Result<Option<Vec<Expr>>> {
    let mut kernels = Vec::new();
    collect_kernels(expr, var, &mut kernels);
    let [kernel] = kernels.as_slice() else {
        return Ok(None);
    };
    if matches!(kernel, Expr::Sym(_)) {
        return Ok(None);
    }
    let reduced = simplify(&replace(expr, kernel, &Expr::sym(KERNEL)));
    let values = match solve(&reduced, KERNEL)? {
        Solutions::Finite(values) => values,
        Solutions::All => return Ok(None),
    };

    let mut roots = Vec::new();
    for value in values {
        let Some((inner, targets)) = invert(kernel, &value) else {
            return Ok(None);
        };
        for target in targets {
            if let Solutions::Finite(found) = solve(&Expr::sub(inner.clone(), target), var)? {
                roots.extend(found);
            }
        }
    }
    // inversion can introduce extraneous roots through even powers
    roots.retain(|root| {
        let residual = expr.substitute(var, root).eval_constant();
        !residual.is_finite() || residual.abs() <= 1e-7
    });
    Ok(Some(roots))
}

/// For a kernel `g(u)` and a value `c`, return `u` and the values of `u`
/// with `g(u) = c`.
fn invert(kernel: &Expr, value: &Expr) -> Option<(Expr, Vec<Expr>)> {
    let c = value.eval_constant();
    let known = c.is_finite();
    let f = |func: Func, arg: Expr| simplify(&Expr::func(func, arg));
    match kernel {
        Expr::Func(func, inner) => {
            let inner = (**inner).clone();
            let targets = match func {
                Func::Sin | Func::Cos if known && c.abs() > 1.0 + ROOT_TOLERANCE => Vec::new(),
                Func::Sin => {
                    let principal = f(Func::Asin, value.clone());
                    let mirrored = simplify(&Expr::sub(Expr::pi(), principal.clone()));
                    vec![principal, mirrored]
                }
                Func::Cos => {
                    let principal = f(Func::Acos, value.clone());
                    let two_pi = Expr::mul(Expr::int(2), Expr::pi());
                    let mirrored = simplify(&Expr::sub(two_pi, principal.clone()));
                    vec![principal, mirrored]
                }
                Func::Tan => vec![f(Func::Atan, value.clone())],
                Func::Exp if known && c <= 0.0 => Vec::new(),
                Func::Exp => vec![f(Func::Log, value.clone())],
                Func::Log => vec![f(Func::Exp, value.clone())],
                Func::Abs if known && c < 0.0 => Vec::new(),
                Func::Abs => vec![value.clone(), simplify(&Expr::neg(value.clone()))],
                Func::Asin if known && c.abs() > std::f64::consts::FRAC_PI_2 => Vec::new(),
                Func::Asin => vec![f(Func::Sin, value.clone())],
                Func::Acos if known && !(0.0..=std::f64::consts::PI).contains(&c) => Vec::new(),
                Func::Acos => vec![f(Func::Cos, value.clone())],
                Func::Atan => vec![f(Func::Tan, value.clone())],
                Func::Sinh | Func::Cosh | Func::Tanh => return None,
            };
            Some((inner, targets))
        }
        Expr::Pow(base, exp) if !exp.is_constant() => {
            // b**u = c  =>  u = log(c) / log(b)
            if known && c <= 0.0 {
                return Some(((**exp).clone(), Vec::new()));
            }
            let target = exact_log(base, value).unwrap_or_else(|| {
                simplify(&Expr::div(
                    Expr::func(Func::Log, value.clone()),
                    Expr::func(Func::Log, (**base).clone()),
                ))
            });
            Some(((**exp).clone(), vec![target]))
        }
        Expr::Pow(base, exp) => {
            // u**(p/q) = c  =>  u = c**(q/p)
            let n = exp.as_number()?;
            let even_root = n.as_rational().is_some_and(|r| r.denom() % 2 == 0);
            if known && c < 0.0 && even_root {
                return Some(((**base).clone(), Vec::new()));
            }
            let inverse = Expr::Num(n.recip()?);
            let target = simplify(&Expr::pow(value.clone(), inverse));
            Some(((**base).clone(), vec![target]))
        }
        _ => None,
    }
}

/// `k` with `base**k = value` for exact rationals and small integer `k`.
fn exact_log(base: &Expr, value: &Expr) -> Option<Expr> {
    let b = base.as_number().filter(Number::is_exact)?;
    let v = value.as_number().filter(Number::is_exact)?;
    (-64..=64)
        .find(|k| b.powi(*k) == Some(v))
        .map(Expr::int)
}

// --- Numeric fallback ---

fn has_trig(expr: &Expr) -> bool {
    match expr {
        Expr::Func(Func::Sin | Func::Cos | Func::Tan, _) => true,
        Expr::Func(_, arg) => has_trig(arg),
        Expr::Add(items) | Expr::Mul(items) => items.iter().any(has_trig),
        Expr::Pow(base, exp) => has_trig(base) || has_trig(exp),
        Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => false,
    }
}

/// Roots of `expr` in `[lo, hi)` found by sign changes on a fine grid and
/// refined by bisection. Sign changes across poles are discarded.
pub fn scan_roots(expr: &Expr, var: &str, lo: f64, hi: f64) -> Vec<f64> {
    let f = |x: f64| expr.eval_at(var, x);
    let step = (hi - lo) / SCAN_STEPS as f64;
    let mut roots: Vec<f64> = Vec::new();
    let mut x0 = lo;
    let mut f0 = f(x0);
    for i in 1..=SCAN_STEPS {
        let x1 = lo + step * i as f64;
        let f1 = f(x1);
        if f0.is_finite() && f1.is_finite() {
            if f0 == 0.0 {
                roots.push(x0);
            } else if f1 != 0.0 && f0.signum() != f1.signum() {
                let root = bisect(&f, x0, x1, f0);
                if f(root).abs() < 1e-6 {
                    roots.push(root);
                }
            }
        }
        x0 = x1;
        f0 = f1;
    }
    roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-7);
    roots
}

fn bisect(f: &dyn Fn(f64) -> f64, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo).abs() < 1e-15 {
            return mid;
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

// --- Periodicity ---

/// The period of an equation whose unknown only appears inside `sin`,
/// `cos` and `tan` of linear arguments sharing one period.
pub fn period(expr: &Expr, var: &str) -> Option<Expr> {
    let mut kernels = Vec::new();
    collect_kernels(expr, var, &mut kernels);
    let mut found: Option<Expr> = None;
    for kernel in &kernels {
        let Expr::Func(func @ (Func::Sin | Func::Cos | Func::Tan), arg) = kernel else {
            return None;
        };
        let cs = coefficients(arg, var)?;
        if cs.len() != 2 || !cs[1].is_constant() {
            return None;
        }
        let base = if *func == Func::Tan {
            Expr::pi()
        } else {
            Expr::mul(Expr::int(2), Expr::pi())
        };
        let slope = if cs[1].eval_constant() < 0.0 {
            Expr::neg(cs[1].clone())
        } else {
            cs[1].clone()
        };
        let candidate = simplify(&Expr::div(base, slope));
        match &found {
            None => found = Some(candidate),
            Some(existing) if *existing == candidate => {}
            Some(_) => return None,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn roots(lhs: &str, rhs: &str) -> Vec<String> {
        let lhs = parse(lhs).unwrap();
        let rhs = parse(rhs).unwrap();
        match solve_equation(&lhs, &rhs, "x").unwrap() {
            Solutions::Finite(found) => found.iter().map(ToString::to_string).collect(),
            Solutions::All => vec!["all".to_string()],
        }
    }

    #[test]
    fn solves_linear_equations() {
        assert_eq!(roots("2*x + 3", "7"), vec!["2"]);
        assert_eq!(roots("x/3 - 1", "0"), vec!["3"]);
        assert_eq!(roots("x + 1", "x + 1"), vec!["all"]);
        assert!(roots("x + 1", "x + 2").is_empty());
    }

    #[test]
    fn solves_quadratics_exactly() {
        assert_eq!(roots("x**2 + 3*x + 2", "0"), vec!["-2", "-1"]);
        assert_eq!(roots("x**2", "2"), vec!["-sqrt(2)", "sqrt(2)"]);
        assert_eq!(roots("x**2 - 2*x + 1", "0"), vec!["1"]);
        assert!(roots("x**2 + 1", "0").is_empty());
    }

    #[test]
    fn tiny_exact_discriminants_keep_both_roots() {
        assert_eq!(roots("x**2", "1e-10"), vec!["-1/100000", "1/100000"]);
        assert_eq!(
            roots("x**2 - 2*x", "-1 + 1e-18"),
            vec!["999999999/1000000000", "1000000001/1000000000"]
        );
        assert_eq!(roots("x**2 - 2*x + 1", "0"), vec!["1"]);
        assert_eq!(
            sort_roots(vec![Expr::rational(1, 10_000_000_000), Expr::zero(), Expr::zero()]),
            vec![Expr::zero(), Expr::rational(1, 10_000_000_000)]
        );
    }

    #[test]
    fn tiny_and_huge_coefficients_keep_linear_roots() {
        assert_eq!(roots("x", "1e-20"), vec!["1e-20"]);
        assert_eq!(roots("1e300*x", "1"), vec!["1e-300"]);
        assert_eq!(roots("10000000000000000000*x", "1"), vec!["1e-19"]);
    }

    #[test]
    fn rejects_polynomials_above_the_degree_limit() {
        let e = parse("x**1000000 - 1").unwrap();
        assert!(matches!(solve(&e, "x"), Err(EngineError::Unsupported(_))));
        assert_eq!(roots("x**4", "1"), vec!["-1", "1"]);
    }

    #[test]
    fn deflates_rational_roots() {
        assert_eq!(roots("x**3 - 6*x**2 + 11*x - 6", "0"), vec!["1", "2", "3"]);
        assert_eq!(roots("x**4 - x**2", "0"), vec!["-1", "0", "1"]);
    }

    #[test]
    fn falls_back_to_numeric_roots() {
        let e = parse("x**5 - x - 1").unwrap();
        let Solutions::Finite(found) = solve(&e, "x").unwrap() else {
            panic!("expected finite solutions");
        };
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].eval_constant(), 1.1673039782614187, epsilon = 1e-9);
    }

    #[test]
    fn excludes_poles() {
        assert_eq!(roots("x/(x - 1)", "2"), vec!["2"]);
        assert_eq!(roots("(x**2 - 1)/(x - 1)", "0"), vec!["-1"]);
    }

    #[test]
    fn inverts_functions() {
        assert_eq!(roots("2*sin(x)", "1"), vec!["pi/6", "5*pi/6"]);
        assert_eq!(roots("cos(x)", "0"), vec!["pi/2", "3*pi/2"]);
        assert_eq!(roots("exp(x)", "1"), vec!["0"]);
        assert_eq!(roots("2**x", "8"), vec!["3"]);
        assert_eq!(roots("sqrt(x)", "3"), vec!["9"]);
        assert!(roots("sin(x)", "2").is_empty());
    }

    #[test]
    fn symbolic_coefficients() {
        let lhs = parse("a*x + b").unwrap();
        let Solutions::Finite(found) = solve(&lhs, "x").unwrap() else {
            panic!("expected finite solutions");
        };
        assert_eq!(found[0].to_string(), "-b/a");
    }

    #[test]
    fn reports_periods() {
        assert_eq!(period(&parse("sin(2*x) - 1").unwrap(), "x").unwrap().to_string(), "pi");
        assert_eq!(period(&parse("tan(x)").unwrap(), "x").unwrap().to_string(), "pi");
        assert_eq!(period(&parse("sin(x) - x").unwrap(), "x"), None);
    }
}
