use mathsolve_core::{ProblemRequest, SolutionResult, SolverConfig};
use mathsolve_solver::{Dispatcher, SolveError};
use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;

fn solve(kind: &str, expression: &str) -> Result<SolutionResult, SolveError> {
    Dispatcher::default().handle(&ProblemRequest::new(kind, expression))
}

fn solve_sub(kind: &str, sub_type: &str, expression: &str) -> Result<SolutionResult, SolveError> {
    Dispatcher::default().handle(&ProblemRequest::new(kind, expression).with_sub_type(sub_type))
}

fn answer(kind: &str, expression: &str) -> String {
    solve(kind, expression)
        .unwrap_or_else(|e| panic!("{kind} {expression}: {e}"))
        .solution
}

fn error(result: Result<SolutionResult, SolveError>) -> String {
    match result {
        Ok(r) => panic!("expected an error, got {}", r.solution),
        Err(e) => e.to_string(),
    }
}

#[test]
fn linear_equation_end_to_end() {
    let result = solve("linear", "2*x + 3 = 7").unwrap();
    assert_eq!(
        result,
        SolutionResult {
            steps: vec![
                "Formulate the equation: 2*x + 3 = 7".to_string(),
                "Move all terms to the left side: 2*x + 3 - (7) = 0".to_string(),
                "Simplified equation: 2*x - 4 = 0".to_string(),
                "Solve for x".to_string(),
                "Solution: x = 2".to_string(),
            ],
            solution: "x = 2".to_string(),
            graph: false,
            points: None,
        }
    );
}

#[test]
fn linear_degenerate_cases() {
    assert_eq!(answer("linear", "x = x + 1"), "No solution");
    assert_eq!(answer("linear", "2*(x + 1) = 2*x + 2"), "Infinitely many solutions");
    assert_eq!(answer("linear", "3*y - 1 = 2"), "y = 1");
    assert_eq!(error(solve("linear", "4 = 4")), "No variable found in equation");
    assert_eq!(error(solve("linear", "2*x + 3")), "Equation must contain an equals sign");
}

#[test]
fn tiny_and_huge_coefficients_survive() {
    assert_eq!(answer("linear", "x = 1e-20"), "x = 1e-20");
    assert_eq!(answer("linear", "1e300*x = 1"), "x = 1e-300");
    assert_eq!(answer("linear", "10000000000000000000*x = 1"), "x = 1e-19");
    assert_eq!(answer("linear", "99999999999999999999999*x = 1"), "x = 1e-23");
    assert_eq!(answer("quadratic", "x**2 = 1e-10"), "x = -1/100000 or x = 1/100000");
}

#[test]
fn oversized_inputs_are_rejected() {
    let nested = format!("{}x{} = 1", "(".repeat(900), ")".repeat(900));
    assert!(error(solve("linear", &nested)).starts_with("Invalid expression"));
    assert_eq!(
        error(solve("polynomial", "x**1000000 = 1")),
        "Error solving equation: polynomials of degree 1000000 are not supported (maximum 64)"
    );
}

#[test]
fn quadratic_roots_follow_the_discriminant() {
    let result = solve("quadratic", "x**2 - 5*x + 6 = 0").unwrap();
    assert_eq!(result.solution, "x = 2 or x = 3");
    assert!(result.graph);
    assert!(result.steps.contains(&"Coefficients: a = 1, b = -5, c = 6".to_string()));
    assert!(result.steps.contains(&"Discriminant: b² - 4ac = 1".to_string()));

    assert_eq!(answer("quadratic", "x**2 - 2 = 0"), "x = -sqrt(2) or x = sqrt(2)");
    assert_eq!(answer("quadratic", "x**2 + 1 = 0"), "No real solutions");

    let repeated = solve("quadratic", "x**2 - 2*x + 1 = 0").unwrap();
    assert_eq!(repeated.solution, "x = 1");
    assert!(
        repeated
            .steps
            .contains(&"The discriminant is zero, giving a repeated root".to_string())
    );
}

#[test]
fn polynomial_roots() {
    let result = solve("polynomial", "x**3 - 6*x**2 + 11*x - 6 = 0").unwrap();
    assert_eq!(result.solution, "x = 1 or x = 2 or x = 3");
    assert!(result.steps.contains(&"The polynomial has degree 3".to_string()));
    assert!(result.steps.contains(&"Found 3 solution(s)".to_string()));
}

#[test]
fn systems() {
    let result = solve("system", "2*x + y = 5; x - y = 1").unwrap();
    assert_eq!(result.solution, "x = 2, y = 1");
    assert_eq!(result.steps[0], "Write the system of equations:");
    assert_eq!(result.steps[1], "Equation 1: 2*x + y = 5");
    assert!(result.steps.contains(&"Solving the system by Gaussian elimination.".to_string()));

    assert_eq!(answer("system", "x + y = 1; x + y = 2"), "No solution");
    assert_eq!(
        answer("system", "x + y = 5; x*y = 6"),
        "x = 3, y = 2 or x = 2, y = 3"
    );

    let dependent = solve("system", "x + y = 5").unwrap();
    assert_eq!(dependent.solution, "Infinitely many solutions: x = 5 - y");
    assert!(
        dependent
            .steps
            .contains(&"Note: The system has 2 variables and 1 equations.".to_string())
    );

    assert_eq!(
        error(solve("system", "x + y = 10; x - y")),
        "Equation 2 does not contain an equals sign"
    );
}

#[test]
fn inequalities() {
    assert_eq!(answer("inequality", "2*x + 3 <= 7"), "x <= 2");
    assert_eq!(answer("inequality", "x**2 - 4 > 0"), "x < -2 or x > 2");
    assert_eq!(answer("inequality", "x**2 + 1 < 0"), "No solution");
    assert_eq!(error(solve("inequality", "x = 2")), "Invalid inequality format");
    assert_eq!(error(solve("inequality", "5 > 3")), "No variable found in inequality");
}

#[test]
fn geometry_formulas() {
    let circle = solve_sub("geometry", "circle_area", "radius=5").unwrap();
    assert_eq!(circle.solution, "Area = 25*pi ≈ 78.5398");
    assert_eq!(
        circle.steps,
        vec![
            "Geometry problem type: circle_area",
            "Circle with radius = 5",
            "Area of a circle: A = π × r²",
            "A = π × 5² = 25*pi ≈ 78.5398",
        ]
    );
    assert_eq!(
        solve_sub("geometry", "sphere_volume", "radius=3").unwrap().solution,
        "Volume = 36*pi ≈ 113.0973"
    );
    assert_eq!(
        solve_sub("geometry", "triangle_area", "base=3; height=4").unwrap().solution,
        "Area = 6"
    );
    assert_eq!(
        solve_sub("geometry", "rectangle_area", "length=4; width=2").unwrap().solution,
        "Area = 8"
    );
    assert_eq!(
        answer("geometry", "circle_circumference=5"),
        "Circumference = 10*pi ≈ 31.4159"
    );
}

#[test]
fn geometry_rejects_bad_input() {
    assert_eq!(
        error(solve_sub("geometry", "circle_area", "r=5")),
        "Missing required value: radius"
    );
    assert_eq!(
        error(solve_sub("geometry", "triangle_area", "base=3")),
        "Missing required value: height"
    );
    assert_eq!(
        error(solve_sub("geometry", "hexagon_area", "side=1")),
        "Unsupported geometry sub-type"
    );
    assert_eq!(
        error(solve_sub("geometry", "circle_area", "radius=-2")),
        "radius must not be negative"
    );
    assert_eq!(error(solve("geometry", "radius=5")), "Geometry sub-type is required");
}

#[test]
fn derivatives_and_integrals() {
    let derivative = solve("differentiation", "x**2 + 3*x").unwrap();
    assert_eq!(derivative.solution, "f'(x) = 2*x + 3");
    assert!(derivative.graph);
    assert_eq!(answer("differentiation", "sin(x)"), "f'(x) = cos(x)");
    assert_eq!(answer("differentiation", "t**3"), "f'(t) = 3*t**2");

    assert_eq!(
        answer("integration", "x**2 + 3*x"),
        "∫x**2 + 3*x dx = x**3/3 + 3*x**2/2 + C"
    );
    let failure = error(solve("integration", "exp(x**2)"));
    assert!(failure.starts_with("Error in integration: "), "{failure}");
}

#[test]
fn trigonometric_equations() {
    let result = solve("trigonometry", "2*sin(x) = 1").unwrap();
    assert_eq!(result.solution, "x = pi/6 or x = 5*pi/6");
    assert!(result.steps.contains(
        &"General solution: x = pi/6 + 2πn, where n is an integer".to_string()
    ));
    assert_eq!(answer("trigonometry", "sin(x) = 2"), "No real solutions");
}

#[test]
fn limits() {
    assert_eq!(answer("limit", "limit(x, 0, sin(x)/x)"), "lim(x→0) sin(x)/x = 1");
    assert_eq!(answer("limit", "limit(x, oo, 1/x)"), "lim(x→oo) 1/x = 0");
    assert_eq!(answer("limit", "limit(x, 0, 1/x)"), "lim(x→0) 1/x does not exist");
    assert_eq!(error(solve("limit", "limit(w, 0, w)")), "Unsupported variable: w");
    assert_eq!(
        error(solve("limit", "lim x -> 0")),
        "Invalid limit syntax. Use format: limit(x, a, f(x))"
    );
}

#[test]
fn statistics() {
    let data = "data = [10, 20, 30, 40, 50]";
    let stat = |sub: &str| solve_sub("statistics", sub, data).unwrap().solution;
    assert_eq!(stat("mean"), "Mean = 30.0");
    assert_eq!(stat("median"), "Median = 30");
    assert_eq!(stat("range"), "Range = 40");
    assert_eq!(stat("variance"), "Variance = 200.0");
    assert_eq!(stat("standard_deviation"), "Standard Deviation = 14.142135623730951");
    assert_eq!(
        solve_sub("statistics", "mean", "data = [1, 2, 2]").unwrap().solution,
        "Mean = 1.6666666666666667"
    );

    let mode = |data: &str| solve_sub("statistics", "mode", data).unwrap().solution;
    assert_eq!(mode("data = [1, 2, 2, 3, 3]"), "Mode = [2, 3]");
    assert_eq!(mode("data = [1, 2, 3]"), "No mode (all values appear exactly once)");
    assert_eq!(
        solve_sub("statistics", "median", "data = [4, 1, 3, 2]").unwrap().solution,
        "Median = 2.5"
    );

    assert_eq!(error(solve("statistics", data)), "Statistics sub-type is required");
    assert_eq!(
        error(solve_sub("statistics", "kurtosis", data)),
        "Unsupported statistics sub-type: kurtosis"
    );
    assert_eq!(
        error(solve_sub("statistics", "mean", "values = [1]")),
        "Data must be provided in format: data = [...]"
    );
}

#[test]
fn graphing_returns_samples() {
    let result = solve("graphing", "x**2").unwrap();
    assert_eq!(result.solution, "y = x**2");
    assert!(result.graph);
    let points = result.points.unwrap();
    assert_eq!(points.len(), 201);
    assert_eq!(points[0], [-10.0, 100.0]);
    let [x, y] = points[200];
    assert_abs_diff_eq!(x, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(y, 100.0, epsilon = 1e-9);
    assert!(solve("graphing", "x*y").is_err());
}

#[test]
fn rejects_unknown_kinds_and_oversized_input() {
    let err = solve("calculus", "x").unwrap_err();
    assert!(matches!(err, SolveError::UnsupportedType(_)));
    assert_eq!(err.to_string(), "Unsupported problem type: calculus");

    let small = Dispatcher::new(SolverConfig {
        max_expression_len: 8,
        ..SolverConfig::default()
    });
    let err = small
        .handle(&ProblemRequest::new("linear", "2*x + 3 = 7"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Expression is longer than 8 characters");
    assert_eq!(error(solve("linear", "   ")), "Expression is empty");
}

#[test]
fn engine_failures_carry_context() {
    let err = solve("linear", "2*$ = 1").unwrap_err();
    assert!(matches!(err, SolveError::Engine { .. }));
    assert!(err.to_string().starts_with("Invalid expression: "));
    assert_eq!(
        error(solve("linear", "__import__('os') = 1")).split(':').next(),
        Some("Invalid expression")
    );
}
