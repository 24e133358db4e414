use mathsolve_engine::format_float;

/// The ordered steps shown to the user for one problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narration {
    steps: Vec<String>,
}

impl Narration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }
}

/// A user-supplied number as it would be written by hand: integers without
/// a decimal point, everything else in shortest form.
pub(crate) fn number(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format_float(value)
    }
}

/// `[a, b, c]`.
pub(crate) fn list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| number(*v)).collect();
    format!("[{}]", items.join(", "))
}

/// A computed value rounded for display, e.g. `78.5398`.
pub(crate) fn approx(value: f64) -> String {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn steps_keep_their_order() {
        let mut steps = Narration::new();
        steps.push("first");
        steps.push(String::from("second"));
        assert_eq!(steps.into_steps(), vec!["first", "second"]);
    }

    #[test]
    fn formats_numbers_for_people() {
        assert_eq!(number(5.0), "5");
        assert_eq!(number(-2.5), "-2.5");
        assert_eq!(list(&[10.0, 2.5]), "[10, 2.5]");
        assert_eq!(approx(78.53981633974483), "78.5398");
        assert_eq!(approx(7.5), "7.5");
        assert_eq!(approx(-0.00001), "0");
    }
}
