use std::time::Duration;

use async_trait::async_trait;

use super::notation;
use crate::domain::ports::Calculus;
use crate::integration::{self, Integral};
use crate::utils::error::{CalcError, Result};

/// [`Calculus`] backed by `symb_anafis` for derivatives and by
/// [`crate::integration`] for antiderivatives.
///
/// Engine calls are CPU-bound, so each one runs on the blocking pool and is
/// abandoned once `timeout` elapses.
#[derive(Debug, Clone)]
pub struct CasCalculus {
    timeout: Duration,
}

impl CasCalculus {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run_blocking<F>(&self, job: F) -> Result<String>
    where
        F: FnOnce() -> Result<String> + Send + 'static,
    {
        match tokio::time::timeout(self.timeout, tokio::task::spawn_blocking(job)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(CalcError::InternalError {
                message: format!("computation task failed: {}", join_error),
            }),
            Err(_) => Err(CalcError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl Calculus for CasCalculus {
    async fn differentiate(&self, expression: &str, variable: &str) -> Result<String> {
        let (expression, variable) = (expression.to_string(), variable.to_string());
        self.run_blocking(move || compute_derivative(&expression, &variable))
            .await
    }

    async fn integrate(&self, expression: &str, variable: &str) -> Result<String> {
        let (expression, variable) = (expression.to_string(), variable.to_string());
        self.run_blocking(move || compute_integral(&expression, &variable))
            .await
    }
}

fn check_variable(variable: &str) -> Result<()> {
    if integration::is_identifier(variable) {
        Ok(())
    } else {
        Err(CalcError::InvalidVariable {
            name: variable.to_string(),
        })
    }
}

/// Differentiates `expression` with respect to `variable` through `symb_anafis`.
///
/// Numbers keep the engine's floating-point form, so `0.5*x` yields `0.5`.
pub fn compute_derivative(expression: &str, variable: &str) -> Result<String> {
    check_variable(variable)?;
    notation::check_expression(expression)?;
    let formula = notation::to_engine(expression)?;
    let constants = notation::constant_symbols(expression, variable)?;
    let constants: Vec<&str> = constants.iter().map(String::as_str).collect();
    tracing::debug!("Differentiating: {} with respect to {}", formula, variable);

    let fixed = (!constants.is_empty()).then_some(constants.as_slice());
    let derivative = symb_anafis::diff(&formula, variable, fixed, None)?;
    let derivative = notation::from_engine(&derivative)?;
    tracing::debug!("Derivative: {}", derivative);
    Ok(derivative)
}

/// Parses `expression` and renders its antiderivative with respect to `variable`,
/// or `Integral(<expression>, <variable>)` when none is found.
pub fn compute_integral(expression: &str, variable: &str) -> Result<String> {
    check_variable(variable)?;
    notation::check_expression(expression)?;
    let expr = integration::parse(expression)?;
    tracing::debug!("Integrating: {} with respect to {}", expr, variable);

    let integral = match integration::integrate(&expr, variable) {
        Integral::Evaluated(result) => integration::render(&result),
        Integral::Unevaluated => {
            tracing::debug!("No antiderivative found for {}", expr);
            integration::render_unevaluated_integral(&expr, variable)
        }
    };
    tracing::debug!("Integral: {}", integral);
    Ok(integral)
}
