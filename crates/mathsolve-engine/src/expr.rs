use std::collections::BTreeSet;
use std::fmt;

use crate::number::Number;

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "E",
        }
    }
}

/// The whitelisted unary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Abs,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Abs => "Abs",
        }
    }

    /// Look a function up by the name accepted in input text.
    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Log,
            "abs" | "Abs" => Func::Abs,
            _ => return None,
        })
    }

    pub fn apply(self, value: f64) -> f64 {
        match self {
            Func::Sin => value.sin(),
            Func::Cos => value.cos(),
            Func::Tan => value.tan(),
            Func::Asin => value.asin(),
            Func::Acos => value.acos(),
            Func::Atan => value.atan(),
            Func::Sinh => value.sinh(),
            Func::Cosh => value.cosh(),
            Func::Tanh => value.tanh(),
            Func::Exp => value.exp(),
            Func::Log => value.ln(),
            Func::Abs => value.abs(),
        }
    }

    /// True for functions with `f(-u) = -f(u)`.
    pub fn is_odd(self) -> bool {
        matches!(
            self,
            Func::Sin | Func::Tan | Func::Asin | Func::Atan | Func::Sinh | Func::Tanh
        )
    }

    /// True for functions with `f(-u) = f(u)`.
    pub fn is_even(self) -> bool {
        matches!(self, Func::Cos | Func::Cosh | Func::Abs)
    }
}

/// A symbolic expression tree.
///
/// Subtraction is represented as addition of a term multiplied by `-1` and
/// division as multiplication by a `-1` power, so that `Add` and `Mul` are
/// the only n-ary nodes the rewriting passes have to understand.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Number),
    Const(Constant),
    Sym(String),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Func(Func, Box<Expr>),
}

impl Expr {
    pub fn int(value: i64) -> Expr {
        Expr::Num(Number::int(value))
    }

    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Num(Number::ratio(numer, denom))
    }

    pub fn float(value: f64) -> Expr {
        Expr::Num(Number::Float(value))
    }

    pub fn sym(name: impl Into<String>) -> Expr {
        Expr::Sym(name.into())
    }

    pub fn pi() -> Expr {
        Expr::Const(Constant::Pi)
    }

    pub fn zero() -> Expr {
        Expr::int(0)
    }

    pub fn one() -> Expr {
        Expr::int(1)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Add(vec![lhs, rhs])
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Add(vec![lhs, Expr::neg(rhs)])
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Mul(vec![lhs, rhs])
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Mul(vec![lhs, Expr::pow(rhs, Expr::int(-1))])
    }

    pub fn neg(expr: Expr) -> Expr {
        Expr::Mul(vec![Expr::int(-1), expr])
    }

    pub fn pow(base: Expr, exp: Expr) -> Expr {
        Expr::Pow(Box::new(base), Box::new(exp))
    }

    pub fn sqrt(expr: Expr) -> Expr {
        Expr::pow(expr, Expr::rational(1, 2))
    }

    pub fn func(func: Func, arg: Expr) -> Expr {
        Expr::Func(func, Box::new(arg))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Expr::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_one())
    }

    /// The free symbols of the expression, in name order.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Sym(name) => {
                out.insert(name.clone());
            }
            Expr::Num(_) | Expr::Const(_) => {}
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Pow(base, exp) => {
                base.collect_symbols(out);
                exp.collect_symbols(out);
            }
            Expr::Func(_, arg) => arg.collect_symbols(out),
        }
    }

    pub fn contains(&self, var: &str) -> bool {
        match self {
            Expr::Sym(name) => name == var,
            Expr::Num(_) | Expr::Const(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|item| item.contains(var)),
            Expr::Pow(base, exp) => base.contains(var) || exp.contains(var),
            Expr::Func(_, arg) => arg.contains(var),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.free_symbols().is_empty()
    }

    /// Replace every occurrence of `var` with `value`. The result is not
    /// simplified.
    pub fn substitute(&self, var: &str, value: &Expr) -> Expr {
        match self {
            Expr::Sym(name) if name == var => value.clone(),
            Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => self.clone(),
            Expr::Add(items) => Expr::Add(items.iter().map(|i| i.substitute(var, value)).collect()),
            Expr::Mul(items) => Expr::Mul(items.iter().map(|i| i.substitute(var, value)).collect()),
            Expr::Pow(base, exp) => Expr::pow(base.substitute(var, value), exp.substitute(var, value)),
            Expr::Func(func, arg) => Expr::func(*func, arg.substitute(var, value)),
        }
    }

    /// Evaluate numerically. Unbound symbols evaluate to NaN.
    pub fn eval_with(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> f64 {
        match self {
            Expr::Num(n) => n.to_f64(),
            Expr::Const(c) => c.value(),
            Expr::Sym(name) => lookup(name).unwrap_or(f64::NAN),
            Expr::Add(items) => items.iter().map(|i| i.eval_with(lookup)).sum(),
            Expr::Mul(items) => items.iter().map(|i| i.eval_with(lookup)).product(),
            Expr::Pow(base, exp) => {
                let b = base.eval_with(lookup);
                match exp.as_number() {
                    Some(n) if n.is_integer() => b.powf(n.to_f64()),
                    // real odd roots of negative numbers
                    Some(Number::Rational(r)) if b < 0.0 && r.denom() % 2 == 1 => {
                        let magnitude = (-b).powf(n_to_f64(r));
                        if r.numer() % 2 == 0 { magnitude } else { -magnitude }
                    }
                    _ => b.powf(exp.eval_with(lookup)),
                }
            }
            Expr::Func(func, arg) => func.apply(arg.eval_with(lookup)),
        }
    }

    /// Evaluate with a single variable bound.
    pub fn eval_at(&self, var: &str, value: f64) -> f64 {
        self.eval_with(&|name| (name == var).then_some(value))
    }

    /// Evaluate an expression without free symbols.
    pub fn eval_constant(&self) -> f64 {
        self.eval_with(&|_| None)
    }
}

fn n_to_f64(r: crate::number::Rational) -> f64 {
    *r.numer() as f64 / *r.denom() as f64
}

// --- Printing ---

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Num(n) if n.is_negative() => PREC_ADD,
            Expr::Num(n) if n.is_exact() && !n.is_integer() => PREC_MUL,
            Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) | Expr::Func(..) => PREC_ATOM,
            Expr::Add(_) => PREC_ADD,
            Expr::Mul(_) => {
                if leading_coefficient(self).is_some_and(|c| c.is_negative()) {
                    PREC_ADD
                } else {
                    PREC_MUL
                }
            }
            Expr::Pow(_, exp) => match exp.as_number() {
                Some(n) if n == Number::ratio(1, 2) => PREC_ATOM,
                Some(n) if n.is_negative() => PREC_MUL,
                _ => PREC_POW,
            },
        }
    }

    fn write_with(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            f.write_str("(")?;
            self.write_plain(f)?;
            f.write_str(")")
        } else {
            self.write_plain(f)
        }
    }

    fn write_plain(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{n}"),
            Expr::Const(c) => f.write_str(c.name()),
            Expr::Sym(name) => f.write_str(name),
            Expr::Func(func, arg) => write!(f, "{}({arg})", func.name()),
            Expr::Add(terms) => write_sum(f, terms),
            Expr::Mul(factors) => write_product(f, factors),
            Expr::Pow(base, exp) => write_power(f, base, exp),
        }
    }
}

/// The numeric leading factor of a product, if any.
pub(crate) fn leading_coefficient(expr: &Expr) -> Option<Number> {
    match expr {
        Expr::Mul(factors) => factors.first().and_then(Expr::as_number),
        Expr::Num(n) => Some(*n),
        _ => None,
    }
}

/// Flip the sign of a term for printing after a ` - ` separator.
fn negated_term(term: &Expr) -> Option<Expr> {
    match term {
        Expr::Num(n) if n.is_negative() => Some(Expr::Num(-*n)),
        Expr::Mul(factors) => {
            let coeff = factors.first().and_then(Expr::as_number)?;
            if !coeff.is_negative() {
                return None;
            }
            let flipped = -coeff;
            let mut rest: Vec<Expr> = factors[1..].to_vec();
            if !flipped.is_one() {
                rest.insert(0, Expr::Num(flipped));
            }
            Some(match rest.len() {
                0 => Expr::one(),
                1 => rest.remove(0),
                _ => Expr::Mul(rest),
            })
        }
        _ => None,
    }
}

fn write_sum(f: &mut fmt::Formatter<'_>, terms: &[Expr]) -> fmt::Result {
    // `5 - y` rather than `-y + 5`
    if let [first, Expr::Num(n)] = terms {
        if !n.is_negative() && negated_term(first).is_some() {
            return write_terms(f, &[Expr::Num(*n), first.clone()]);
        }
    }
    write_terms(f, terms)
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Expr]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i == 0 {
            term.write_with(f, PREC_ADD)?;
            continue;
        }
        match negated_term(term) {
            Some(positive) => {
                f.write_str(" - ")?;
                positive.write_with(f, PREC_MUL)?;
            }
            None => {
                f.write_str(" + ")?;
                term.write_with(f, PREC_MUL)?;
            }
        }
    }
    Ok(())
}

fn write_product(f: &mut fmt::Formatter<'_>, factors: &[Expr]) -> fmt::Result {
    let mut coeff = Number::one();
    let mut rest = factors;
    if let Some(n) = factors.first().and_then(Expr::as_number) {
        coeff = n;
        rest = &factors[1..];
    }
    if coeff.is_negative() {
        f.write_str("-")?;
        coeff = -coeff;
    }

    let mut numer: Vec<Expr> = Vec::new();
    let mut denom: Vec<Expr> = Vec::new();
    match coeff.as_rational() {
        Some(r) => {
            if *r.numer() != 1 {
                numer.push(Expr::int(*r.numer()));
            }
            if *r.denom() != 1 {
                denom.push(Expr::int(*r.denom()));
            }
        }
        None => numer.push(Expr::Num(coeff)),
    }
    for factor in rest {
        match factor {
            Expr::Pow(base, exp) if exp.as_number().is_some_and(|n| n.is_negative()) => {
                let positive = -exp.as_number().unwrap_or_else(Number::one);
                if positive.is_one() {
                    denom.push((**base).clone());
                } else {
                    denom.push(Expr::pow((**base).clone(), Expr::Num(positive)));
                }
            }
            other => numer.push(other.clone()),
        }
    }

    if numer.is_empty() {
        f.write_str("1")?;
    }
    for (i, factor) in numer.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        factor.write_with(f, PREC_MUL)?;
    }
    match denom.len() {
        0 => Ok(()),
        1 => {
            f.write_str("/")?;
            denom[0].write_with(f, PREC_POW)
        }
        _ => {
            f.write_str("/(")?;
            for (i, factor) in denom.iter().enumerate() {
                if i > 0 {
                    f.write_str("*")?;
                }
                factor.write_with(f, PREC_MUL)?;
            }
            f.write_str(")")
        }
    }
}

fn write_power(f: &mut fmt::Formatter<'_>, base: &Expr, exp: &Expr) -> fmt::Result {
    if let Some(n) = exp.as_number() {
        if n == Number::ratio(1, 2) {
            return write!(f, "sqrt({base})");
        }
        if n.is_negative() {
            f.write_str("1/")?;
            let positive = -n;
            if positive.is_one() {
                return base.write_with(f, PREC_POW);
            }
            return Expr::pow(base.clone(), Expr::Num(positive)).write_with(f, PREC_POW);
        }
    }
    base.write_with(f, PREC_ATOM)?;
    f.write_str("**")?;
    exp.write_with(f, PREC_ATOM)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_plain(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn x() -> Expr {
        Expr::sym("x")
    }

    #[test]
    fn prints_sums_with_signs() {
        let e = Expr::Add(vec![
            Expr::Mul(vec![Expr::int(2), x()]),
            Expr::int(-4),
        ]);
        assert_eq!(e.to_string(), "2*x - 4");
        let flipped = Expr::Add(vec![Expr::neg(x()), Expr::int(5)]);
        assert_eq!(flipped.to_string(), "5 - x");
    }

    #[test]
    fn prints_fractions_and_roots() {
        let third = Expr::Mul(vec![Expr::rational(1, 3), Expr::pow(x(), Expr::int(3))]);
        assert_eq!(third.to_string(), "x**3/3");
        let half_root = Expr::Mul(vec![Expr::rational(1, 2), Expr::sqrt(Expr::int(2))]);
        assert_eq!(half_root.to_string(), "sqrt(2)/2");
        let neg = Expr::Mul(vec![Expr::rational(-3, 2), x()]);
        assert_eq!(neg.to_string(), "-3*x/2");
    }

    #[test]
    fn prints_reciprocals() {
        assert_eq!(Expr::pow(x(), Expr::int(-1)).to_string(), "1/x");
        let quotient = Expr::Mul(vec![
            Expr::func(Func::Sin, x()),
            Expr::pow(x(), Expr::int(-1)),
        ]);
        assert_eq!(quotient.to_string(), "sin(x)/x");
    }

    #[test]
    fn parenthesises_compound_bases() {
        let base = Expr::Add(vec![x(), Expr::int(1)]);
        assert_eq!(Expr::pow(base, Expr::int(2)).to_string(), "(x + 1)**2");
    }

    #[test]
    fn evaluates_with_bindings() {
        let e = Expr::Add(vec![Expr::pow(x(), Expr::int(2)), Expr::int(1)]);
        assert_eq!(e.eval_at("x", 3.0), 10.0);
        assert!(e.eval_constant().is_nan());
        let cube_root = Expr::pow(x(), Expr::rational(1, 3));
        assert!((cube_root.eval_at("x", -8.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn substitution_and_symbols() {
        let e = Expr::Mul(vec![x(), Expr::sym("y")]);
        let names: Vec<String> = e.free_symbols().into_iter().collect();
        assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
        let replaced = e.substitute("y", &Expr::int(2));
        assert!(!replaced.contains("y"));
    }
}
