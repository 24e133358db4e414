//! Closed-form area, perimeter and volume formulas.

use mathsolve_engine::{Expr, simplify};

use crate::descriptor::Outcome;
use crate::dispatcher::Work;
use crate::error::SolveError;
use crate::narration::{approx, number};

struct Figure {
    sub_type: &'static str,
    /// Required keys, in the order the closures below receive them.
    keys: &'static [&'static str],
    quantity: &'static str,
    describe: fn(&[String]) -> String,
    formula: &'static str,
    substitute: fn(&[String]) -> String,
    evaluate: fn(&[Expr]) -> Expr,
}

const FIGURES: [Figure; 5] = [
    Figure {
        sub_type: "circle_area",
        keys: &["radius"],
        quantity: "Area",
        describe: |v| format!("Circle with radius = {}", v[0]),
        formula: "Area of a circle: A = π × r²",
        substitute: |v| format!("A = π × {}²", v[0]),
        evaluate: |v| Expr::mul(Expr::pi(), square(&v[0])),
    },
    Figure {
        sub_type: "circle_circumference",
        keys: &["radius"],
        quantity: "Circumference",
        describe: |v| format!("Circle with radius = {}", v[0]),
        formula: "Circumference of a circle: C = 2π × r",
        substitute: |v| format!("C = 2π × {}", v[0]),
        evaluate: |v| Expr::Mul(vec![Expr::int(2), Expr::pi(), v[0].clone()]),
    },
    Figure {
        sub_type: "triangle_area",
        keys: &["base", "height"],
        quantity: "Area",
        describe: |v| format!("Triangle with base = {} and height = {}", v[0], v[1]),
        formula: "Area of a triangle: A = (b × h) / 2",
        substitute: |v| format!("A = ({} × {}) / 2", v[0], v[1]),
        evaluate: |v| Expr::div(Expr::mul(v[0].clone(), v[1].clone()), Expr::int(2)),
    },
    Figure {
        sub_type: "rectangle_area",
        keys: &["length", "width"],
        quantity: "Area",
        describe: |v| format!("Rectangle with length = {} and width = {}", v[0], v[1]),
        formula: "Area of a rectangle: A = l × w",
        substitute: |v| format!("A = {} × {}", v[0], v[1]),
        evaluate: |v| Expr::mul(v[0].clone(), v[1].clone()),
    },
    Figure {
        sub_type: "sphere_volume",
        keys: &["radius"],
        quantity: "Volume",
        describe: |v| format!("Sphere with radius = {}", v[0]),
        formula: "Volume of a sphere: V = (4/3) × π × r³",
        substitute: |v| format!("V = (4/3) × π × {}³", v[0]),
        evaluate: |v| {
            Expr::Mul(vec![
                Expr::rational(4, 3),
                Expr::pi(),
                Expr::pow(v[0].clone(), Expr::int(3)),
            ])
        },
    },
];

fn square(e: &Expr) -> Expr {
    Expr::pow(e.clone(), Expr::int(2))
}

/// Expressions like `circle_area=5` name the figure instead of a key.
const LEGACY_SUB_TYPES: [&str; 2] = ["circle_area", "circle_circumference"];

pub(crate) fn geometry(work: &mut Work<'_>, values: Vec<(String, f64)>) -> Outcome {
    let (sub_type, values) = match work.sub_type {
        Some(sub_type) => (sub_type.to_string(), values),
        None => legacy(values)?,
    };
    let figure = FIGURES
        .iter()
        .find(|f| f.sub_type == sub_type)
        .ok_or_else(|| SolveError::malformed("Unsupported geometry sub-type"))?;

    let mut numbers = Vec::with_capacity(figure.keys.len());
    for key in figure.keys {
        let value = values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| SolveError::malformed(format!("Missing required value: {key}")))?;
        if value < 0.0 {
            return Err(SolveError::malformed(format!("{key} must not be negative")));
        }
        numbers.push(value);
    }
    let shown: Vec<String> = numbers.iter().map(|v| number(*v)).collect();
    let exact: Vec<Expr> = numbers.iter().map(|v| exact(*v)).collect();
    let result = render(&simplify(&(figure.evaluate)(&exact)));

    work.steps
        .push(format!("Geometry problem type: {sub_type}"));
    work.steps.push((figure.describe)(&shown));
    work.steps.push(figure.formula);
    work.steps
        .push(format!("{} = {result}", (figure.substitute)(&shown)));
    Ok(format!("{} = {result}", figure.quantity))
}

fn legacy(values: Vec<(String, f64)>) -> Result<(String, Vec<(String, f64)>), SolveError> {
    match values.as_slice() {
        [(key, radius)] if LEGACY_SUB_TYPES.contains(&key.as_str()) => {
            Ok((key.clone(), vec![("radius".to_string(), *radius)]))
        }
        _ => Err(SolveError::malformed("Geometry sub-type is required")),
    }
}

/// Integers stay exact so that results read `25*pi`.
fn exact(value: f64) -> Expr {
    if value == value.trunc() && value.abs() < 1e15 {
        Expr::int(value as i64)
    } else {
        Expr::float(value)
    }
}

/// Integers and decimals as they are; anything else with a decimal
/// approximation.
fn render(result: &Expr) -> String {
    match result.as_number() {
        Some(n) if n.is_integer() || !n.is_exact() => result.to_string(),
        _ => format!("{result} ≈ {}", approx(result.eval_constant())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_figure_has_a_distinct_sub_type() {
        for (i, figure) in FIGURES.iter().enumerate() {
            assert!(FIGURES[i + 1..].iter().all(|f| f.sub_type != figure.sub_type));
        }
    }

    #[test]
    fn renders_exact_and_approximate_values() {
        let area = simplify(&Expr::mul(Expr::pi(), square(&Expr::int(5))));
        assert_eq!(render(&area), "25*pi ≈ 78.5398");
        assert_eq!(render(&Expr::int(6)), "6");
        assert_eq!(render(&Expr::rational(15, 2)), "15/2 ≈ 7.5");
    }

    #[test]
    fn legacy_expressions_name_the_figure() {
        let (sub_type, values) = legacy(vec![("circle_area".into(), 5.0)]).unwrap();
        assert_eq!(sub_type, "circle_area");
        assert_eq!(values, vec![("radius".to_string(), 5.0)]);
        assert!(legacy(vec![("radius".into(), 5.0)]).is_err());
    }
}
