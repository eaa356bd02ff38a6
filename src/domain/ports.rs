use crate::utils::error::Result;
use async_trait::async_trait;

/// Symbolic calculus backend used by the HTTP handlers.
///
/// Both operations take the raw expression text and variable name from the
/// request and return the rendered result.
#[async_trait]
pub trait Calculus: Send + Sync {
    async fn differentiate(&self, expression: &str, variable: &str) -> Result<String>;
    async fn integrate(&self, expression: &str, variable: &str) -> Result<String>;
}
