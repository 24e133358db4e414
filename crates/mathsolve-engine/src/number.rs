use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, One, Signed, Zero};

pub type Rational = Ratio<i64>;

/// Exponents above this magnitude are evaluated in floating point.
const MAX_EXACT_EXPONENT: u64 = 256;

/// A numeric literal: exact while the arithmetic stays rational and fits in
/// `i64`, floating point otherwise.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Rational(Rational),
    Float(f64),
}

impl Number {
    pub fn int(value: i64) -> Self {
        Number::Rational(Rational::from_integer(value))
    }

    /// Exact `numer / denom`. `denom` must be non-zero.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        Number::Rational(Rational::new(numer, denom))
    }

    pub fn zero() -> Self {
        Number::int(0)
    }

    pub fn one() -> Self {
        Number::int(1)
    }

    /// Snap a float onto a nearby rational with a small denominator.
    pub fn recognize(value: f64) -> Self {
        Number::recognize_within(value, 1e-9)
    }

    /// Like [`Number::recognize`] with an explicit relative tolerance.
    pub fn recognize_within(value: f64, tolerance: f64) -> Self {
        if !value.is_finite() {
            return Number::Float(value);
        }
        for denom in 1..=64i64 {
            let numer = (value * denom as f64).round();
            if numer.abs() > 1e15 {
                break;
            }
            if (value - numer / denom as f64).abs() <= tolerance * value.abs() {
                return Number::ratio(numer as i64, denom);
            }
        }
        Number::Float(value)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_one(),
            Number::Float(f) => *f == 1.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_negative(),
            Number::Float(f) => *f < 0.0,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Rational(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Rational(r) if r.is_integer())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Number::Rational(r) if r.is_integer() => Some(r.to_integer()),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Number::Rational(r) => Some(*r),
            Number::Float(_) => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Rational(r) => *r.numer() as f64 / *r.denom() as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn abs(self) -> Self {
        if self.is_negative() { -self } else { self }
    }

    /// `None` when dividing by zero.
    pub fn recip(self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(match self {
            Number::Rational(r) => Number::Rational(r.recip()),
            Number::Float(f) => Number::Float(1.0 / f),
        })
    }

    pub fn checked_div(self, rhs: Number) -> Option<Self> {
        rhs.recip().map(|r| self * r)
    }

    /// Integer power; `None` for a negative power of zero.
    pub fn powi(self, exp: i64) -> Option<Self> {
        if exp < 0 && self.is_zero() {
            return None;
        }
        match self {
            Number::Rational(r) if exp.unsigned_abs() <= MAX_EXACT_EXPONENT => {
                let base = if exp < 0 { r.recip() } else { r };
                let mut acc = Rational::one();
                for _ in 0..exp.unsigned_abs() {
                    match acc.checked_mul(&base) {
                        Some(next) => acc = next,
                        None => return Some(Number::Float(self.to_f64().powf(exp as f64))),
                    }
                }
                Some(Number::Rational(acc))
            }
            _ => Some(Number::Float(self.to_f64().powf(exp as f64))),
        }
    }

    /// Exact `q`-th root of a rational, when one exists.
    pub fn exact_root(self, q: u32) -> Option<Self> {
        let r = self.as_rational()?;
        let numer = int_root(*r.numer(), q)?;
        let denom = int_root(*r.denom(), q)?;
        Some(Number::ratio(numer, denom))
    }

    pub fn powf(self, exp: Number) -> Self {
        Number::Float(self.to_f64().powf(exp.to_f64()))
    }
}

fn int_root(n: i64, q: u32) -> Option<i64> {
    if q == 0 {
        return None;
    }
    if n < 0 {
        return if q % 2 == 1 { int_root(-n, q).map(|r| -r) } else { None };
    }
    let guess = (n as f64).powf(1.0 / q as f64).round() as i64;
    (guess.saturating_sub(1)..=guess + 1)
        .find(|candidate| *candidate >= 0 && candidate.checked_pow(q) == Some(n))
}

/// Split a positive integer into `k² · m` and return `(k, m)`.
pub fn split_square(n: i64) -> (i64, i64) {
    let mut outside = 1i64;
    let mut inside = n;
    let mut i = 2i64;
    while i.saturating_mul(i) <= inside && i < 1_000_000 {
        while inside % (i * i) == 0 {
            inside /= i * i;
            outside *= i;
        }
        i += 1;
    }
    (outside, inside)
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        if let (Number::Rational(a), Number::Rational(b)) = (self, rhs) {
            if let Some(sum) = a.checked_add(&b) {
                return Number::Rational(sum);
            }
        }
        Number::Float(self.to_f64() + rhs.to_f64())
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        if let (Number::Rational(a), Number::Rational(b)) = (self, rhs) {
            if let Some(diff) = a.checked_sub(&b) {
                return Number::Rational(diff);
            }
        }
        Number::Float(self.to_f64() - rhs.to_f64())
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        if let (Number::Rational(a), Number::Rational(b)) = (self, rhs) {
            if let Some(product) = a.checked_mul(&b) {
                return Number::Rational(product);
            }
        }
        Number::Float(self.to_f64() * rhs.to_f64())
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(-r),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a == b,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::int(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Rational(r) if r.is_integer() => write!(f, "{}", r.numer()),
            Number::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Float(v) => f.write_str(&compact_float(*v)),
        }
    }
}

/// Render a float in shortest round-trip form: `30.0`, `0.30000000000000004`,
/// `1e+16`, `1.5e-05`, `inf`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{value:e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => match exp.strip_prefix('-') {
                Some(digits) => format!("{mantissa}e-{digits:0>2}"),
                None => format!("{mantissa}e+{exp:0>2}"),
            },
            None => sci,
        };
    }
    if value == value.trunc() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Floats inside expressions: at most twelve significant digits.
fn compact_float(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "oo" } else { "-oo" }.to_string();
    }
    let rounded: f64 = format!("{value:.11e}").parse().unwrap_or(value);
    if rounded == 0.0 {
        return "0.0".to_string();
    }
    format_float(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_arithmetic_stays_exact() {
        let sum = Number::ratio(1, 3) + Number::ratio(1, 6);
        assert_eq!(sum, Number::ratio(1, 2));
        assert!(sum.is_exact());
        assert_eq!(sum.to_string(), "1/2");
    }

    #[test]
    fn overflow_falls_back_to_float() {
        let big = Number::int(i64::MAX);
        let product = big * Number::int(4);
        assert!(!product.is_exact());
    }

    #[test]
    fn integer_powers_and_roots() {
        assert_eq!(Number::ratio(2, 3).powi(-2), Some(Number::ratio(9, 4)));
        assert_eq!(Number::zero().powi(-1), None);
        assert_eq!(Number::ratio(9, 4).exact_root(2), Some(Number::ratio(3, 2)));
        assert_eq!(Number::int(2).exact_root(2), None);
        assert_eq!(Number::int(-27).exact_root(3), Some(Number::int(-3)));
    }

    #[test]
    fn square_factors_are_extracted() {
        assert_eq!(split_square(8), (2, 2));
        assert_eq!(split_square(72), (6, 2));
        assert_eq!(split_square(7), (1, 7));
    }

    #[test]
    fn recognizes_simple_fractions() {
        assert_eq!(Number::recognize(0.5), Number::ratio(1, 2));
        assert_eq!(Number::recognize(-2.0000000000004), Number::int(-2));
        assert!(!Number::recognize(std::f64::consts::PI).is_exact());
        assert_eq!(Number::recognize(0.0), Number::zero());
        assert_eq!(Number::recognize(1e-20), Number::Float(1e-20));
        assert_eq!(Number::recognize(-3e-10), Number::Float(-3e-10));
    }

    #[test]
    fn floats_print_compactly() {
        assert_eq!(compact_float(30.0), "30.0");
        assert_eq!(compact_float(78.53981633974483), "78.5398163397");
        assert_eq!(compact_float(0.1 + 0.2), "0.3");
        assert_eq!(compact_float(f64::INFINITY), "oo");
        assert_eq!(Number::Float(0.1 + 0.2).to_string(), "0.3");
        assert_eq!(compact_float(-0.0), "0.0");
        assert_eq!(compact_float(1e-20), "1e-20");
        assert_eq!(compact_float(1.0 / 3.0 * 1e-300), "3.33333333333e-301");
        assert_eq!(compact_float(1e19), "1e+19");
    }

    #[test]
    fn reported_floats_round_trip() {
        assert_eq!(format_float(30.0), "30.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(14.142135623730951), "14.142135623730951");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(2.5e300), "2.5e+300");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
        for value in [1.0 / 3.0, 123456.789, 9.87654321e-3, 6.02214076e23] {
            assert_eq!(format_float(value).parse::<f64>().ok(), Some(value));
        }
    }
}
