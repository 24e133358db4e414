use std::ops::RangeInclusive;

use approx::assert_abs_diff_eq;
use mathsolve_engine::{Expr, Solutions, diff, integrate, parse, simplify, solve_equation};

fn nonzero(rng: &mut fastrand::Rng, range: RangeInclusive<i64>) -> i64 {
    loop {
        let v = rng.i64(range.clone());
        if v != 0 {
            return v;
        }
    }
}

fn roots(lhs: &str, rhs: &str) -> Vec<Expr> {
    let lhs = parse(lhs).unwrap();
    let rhs = parse(rhs).unwrap();
    match solve_equation(&lhs, &rhs, "x").unwrap() {
        Solutions::Finite(roots) => roots,
        Solutions::All => panic!("{lhs} = {rhs} reported as an identity"),
    }
}

#[test]
fn linear_roots_satisfy_their_equation() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..200 {
        let a = nonzero(&mut rng, -12..=12);
        let b = rng.i64(-50..=50);
        let c = rng.i64(-50..=50);
        let lhs = format!("{a}*x + {b}");
        let found = roots(&lhs, &c.to_string());
        assert_eq!(found.len(), 1, "{lhs} = {c}");

        let residual = Expr::sub(
            parse(&lhs).unwrap().substitute("x", &found[0]),
            Expr::int(c),
        );
        assert!(simplify(&residual).is_zero(), "{lhs} = {c} gave x = {}", found[0]);
    }
}

/// A coefficient as a user might type it: small or large integers, decimals,
/// or scientific notation far below one.
fn coefficient(rng: &mut fastrand::Rng) -> String {
    match rng.u8(0..4) {
        0 => rng.i64(-20..=20).to_string(),
        1 => rng.i64(-1_000_000_000_000..=1_000_000_000_000).to_string(),
        2 => format!("{}.{:02}", rng.i64(-500..=500), rng.u8(0..100)),
        _ => format!("{}e-{}", nonzero(rng, -9..=9), rng.u8(12..=30)),
    }
}

#[test]
fn linear_roots_hold_across_magnitudes() {
    let mut rng = fastrand::Rng::with_seed(13);
    let mut checked = 0;
    while checked < 300 {
        let [a, b, c, d] = [(); 4].map(|_| coefficient(&mut rng));
        let value = |text: &str| parse(text).unwrap().eval_constant();
        let (av, bv, cv, dv) = (value(&a), value(&b), value(&c), value(&d));
        if (av - cv).abs() <= 1e-6 * av.abs().max(cv.abs()) {
            continue;
        }
        checked += 1;

        let (lhs, rhs) = (format!("({a})*x + ({b})"), format!("({c})*x + ({d})"));
        let found = roots(&lhs, &rhs);
        assert_eq!(found.len(), 1, "{lhs} = {rhs}");
        let x = found[0].eval_constant();
        if bv != dv {
            assert!(x != 0.0, "{lhs} = {rhs} gave x = 0");
        }
        let scale = [av * x, bv, cv * x, dv]
            .iter()
            .fold(0.0f64, |m, v| m.max(v.abs()));
        let residual = (av * x + bv) - (cv * x + dv);
        assert!(
            residual.abs() <= 1e-9 * scale,
            "{lhs} = {rhs} gave x = {} (residual {residual})",
            found[0]
        );
    }
}

#[test]
fn quadratic_root_count_follows_the_discriminant() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..200 {
        let a = nonzero(&mut rng, -6..=6);
        let b = rng.i64(-10..=10);
        let c = rng.i64(-10..=10);
        let disc = b * b - 4 * a * c;
        let expected = match disc.signum() {
            1 => 2,
            0 => 1,
            _ => 0,
        };
        let text = format!("{a}*x**2 + {b}*x + {c}");
        let found = roots(&text, "0");
        assert_eq!(found.len(), expected, "{text} with discriminant {disc}");

        for root in found {
            let x = root.eval_constant();
            let value = (a as f64) * x * x + (b as f64) * x + c as f64;
            assert_abs_diff_eq!(value, 0.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn integrating_a_derivative_recovers_the_function() {
    let cases = [
        "x**3 + 2*x",
        "sin(x)",
        "x*exp(x)",
        "log(x)",
        "exp(2*x)",
        "sin(x**2)",
        "cos(3*x + 1)",
        "x**2*sin(x)",
        "sqrt(x)",
        "atan(x)",
    ];
    for case in cases {
        let f = parse(case).unwrap();
        let antiderivative = integrate(&diff(&f, "x"), "x")
            .unwrap_or_else(|err| panic!("could not integrate d/dx {case}: {err}"));
        // F - f must be constant
        let gap = |x: f64| antiderivative.eval_at("x", x) - f.eval_at("x", x);
        assert_abs_diff_eq!(gap(0.7), gap(1.9), epsilon = 1e-9);
    }
}

#[test]
fn parser_never_panics_on_noise() {
    const ALPHABET: &[u8] = b"x+-*/^() 0123456789.sincoeplqrt,=";
    let mut rng = fastrand::Rng::with_seed(3);
    for _ in 0..2000 {
        let len = rng.usize(0..24);
        let text: String = (0..len)
            .map(|_| ALPHABET[rng.usize(0..ALPHABET.len())] as char)
            .collect();
        let _ = parse(&text);
    }
}

#[test]
fn simplification_is_idempotent_on_polynomials() {
    let mut rng = fastrand::Rng::with_seed(5);
    for _ in 0..200 {
        let text = format!(
            "{}*x**2 + {}*x*y + ({} - x)*({} + y) + {}",
            rng.i64(-9..=9),
            rng.i64(-9..=9),
            rng.i64(-9..=9),
            rng.i64(-9..=9),
            rng.i64(-9..=9),
        );
        let once = parse(&text).unwrap();
        assert_eq!(simplify(&once), once, "{text}");
    }
}
