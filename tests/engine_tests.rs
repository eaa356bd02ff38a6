use std::collections::HashMap;

use symcalc::integration::{self, derivative::differentiate, Expr, Integral};
use symcalc::core::calculus::{compute_derivative, compute_integral};

fn at(x: f64) -> HashMap<String, f64> {
    HashMap::from([("x".to_string(), x)])
}

/// Checks `d/dx ∫ f dx == f` at sample points inside the domain.
fn assert_round_trip(input: &str) -> anyhow::Result<()> {
    let integrand = integration::parse(input)?;
    let antiderivative = match integration::integrate(&integrand, "x") {
        Integral::Evaluated(result) => result,
        Integral::Unevaluated => anyhow::bail!("no antiderivative for {input}"),
    };
    let derivative = differentiate(&antiderivative, "x");

    let mut checked = 0;
    for point in [0.25, 0.6, 1.4, 2.5] {
        if let (Some(expected), Some(actual)) =
            (integrand.eval(&at(point)), derivative.eval(&at(point)))
        {
            let tolerance = 1e-6 * (1.0 + expected.abs());
            anyhow::ensure!(
                (expected - actual).abs() <= tolerance,
                "{input}: d/dx {antiderivative} = {derivative} gives {actual}, expected {expected} at {point}"
            );
            checked += 1;
        }
    }
    anyhow::ensure!(checked > 0, "{input}: no sample point in domain");
    Ok(())
}

/// Checks that `actual` and `expected` agree numerically in `variable`.
fn assert_same_function(actual: &str, expected: &str, variable: &str) -> anyhow::Result<()> {
    let actual_expr = integration::parse(actual)?;
    let expected_expr = integration::parse(expected)?;
    let mut checked = 0;
    for point in [0.25, 0.6, 1.4, 2.5] {
        let bindings = HashMap::from([
            (variable.to_string(), point),
            ("a".to_string(), 1.5),
            ("b".to_string(), -0.75),
        ]);
        if let (Some(a), Some(e)) = (actual_expr.eval(&bindings), expected_expr.eval(&bindings)) {
            anyhow::ensure!(
                (a - e).abs() <= 1e-9 * (1.0 + e.abs()),
                "{actual} != {expected} at {variable} = {point}"
            );
            checked += 1;
        }
    }
    anyhow::ensure!(checked > 0, "{expected}: no sample point in domain");
    Ok(())
}

#[test]
fn test_integrals_differentiate_back() -> anyhow::Result<()> {
    let integrands = [
        "3*x**2 - 4*x + 7",
        "x**(-3)",
        "1/sqrt(x)",
        "exp(-x)",
        "5**x",
        "sin(3*x + 1)",
        "cos(x/2)",
        "tan(x)",
        "cosh(x) + sinh(x)",
        "log(2*x)",
        "atan(x)",
        "cos(x)**2",
        "tan(x)**2",
        "1/(x**2 + 9)",
        "(x + 2)/(x**2 - 1)",
        "x**4/(x**2 + 1)",
        "(3*x + 1)/(x**2 + 4*x + 13)",
        "1/(x**3 - x)",
        "1/(x + 1)**3",
        "x*exp(x**2)",
        "sin(x)**3*cos(x)",
        "x/sqrt(1 + x**2)",
        "x**3*exp(x)",
        "x**2*cos(x)",
        "log(x)**2",
        "x*exp(-x)*2",
        "exp(x)*cos(2*x)",
        "1/(x*log(x))",
    ];
    for input in integrands {
        assert_round_trip(input)?;
    }
    Ok(())
}

#[test]
fn test_string_level_results() -> anyhow::Result<()> {
    let derivatives = [
        ("x**3", "3*x**2"),
        ("exp(x)*x", "x*exp(x) + exp(x)"),
        ("log(x**2)", "2/x"),
        ("cos(x)**2", "-2*cos(x)*sin(x)"),
        ("sqrt(x**2 + 1)", "x/sqrt(x**2 + 1)"),
    ];
    for (input, expected) in derivatives {
        let derivative = compute_derivative(input, "x")?;
        anyhow::ensure!(!derivative.contains('^'), "d/dx {input} = {derivative}");
        assert_same_function(&derivative, expected, "x")?;
    }

    let integrals = [
        ("3*x**2", "x**3"),
        ("1/x", "log(x)"),
        ("exp(x)", "exp(x)"),
        ("sin(x)", "-cos(x)"),
        ("x*exp(x)", "x*exp(x) - exp(x)"),
        ("sin(x)/x", "Integral(sin(x)/x, x)"),
    ];
    for (input, expected) in integrals {
        assert_eq!(compute_integral(input, "x")?, expected, "∫ {input}");
    }
    Ok(())
}

#[test]
fn test_other_symbols_are_constants() -> anyhow::Result<()> {
    let derivative = compute_derivative("a*x**2 + b*x + c", "x")?;
    assert_same_function(&derivative, "2*a*x + b", "x")?;
    assert_eq!(compute_integral("a*x", "x")?, "a*x**2/2");
    assert_eq!(compute_integral("exp(k*t)", "t")?, "exp(k*t)/k");
    Ok(())
}

#[test]
fn test_parse_render_is_stable() -> anyhow::Result<()> {
    for input in ["x**2 - 2*x + 1", "sin(x)/x", "x*log(x) - x", "Integral"] {
        let expr: Expr = integration::parse(input)?;
        let rendered = integration::render(&expr);
        assert_eq!(integration::parse(&rendered)?, expr, "{input} -> {rendered}");
    }
    Ok(())
}
