//! Translation between the Python-style notation clients send and receive
//! (`**`, `log`, `Abs`) and the notation `symb_anafis` reads and prints
//! (`^`, `ln`, `abs`).

use std::collections::BTreeSet;

use regex::Regex;

use crate::integration::reader::check_nesting;
use crate::utils::error::{CalcError, Result};

/// Longest expression accepted from a request.
pub const MAX_EXPRESSION_BYTES: usize = 10_000;

/// Names `symb_anafis` resolves on its own and that must not be declared as constants.
const ENGINE_CONSTANTS: &[&str] = &["pi", "e"];

/// Size and nesting checks shared by both operations.
pub fn check_expression(expression: &str) -> Result<()> {
    if expression.trim().is_empty() {
        return Err(CalcError::parse("expression is empty"));
    }
    if expression.len() > MAX_EXPRESSION_BYTES {
        return Err(CalcError::parse(format!(
            "expression is longer than {} bytes",
            MAX_EXPRESSION_BYTES
        )));
    }
    check_nesting(expression)
}

/// Rewrites request notation into the engine's.
pub fn to_engine(expression: &str) -> Result<String> {
    let abs = pattern(r"\bAbs\(")?;
    Ok(abs.replace_all(&expression.replace("**", "^"), "abs(").into_owned())
}

/// Rewrites engine output back into request notation.
pub fn from_engine(output: &str) -> Result<String> {
    let ln = pattern(r"\bln\(")?;
    let abs = pattern(r"\babs\(")?;
    let output = output.replace('^', "**");
    let output = ln.replace_all(&output, "log(");
    Ok(abs.replace_all(&output, "Abs(").into_owned())
}

/// Every bare name in `expression` other than `variable` and the engine's
/// constants. These are passed to the engine as fixed symbols so multi-letter
/// names such as `theta` are read as one symbol.
pub fn constant_symbols(expression: &str, variable: &str) -> Result<Vec<String>> {
    let name = pattern(r"[A-Za-z_][A-Za-z0-9_]*(\s*\()?")?;
    let symbols: BTreeSet<String> = name
        .captures_iter(expression)
        .filter(|caps| caps.get(1).is_none())
        .map(|caps| caps[0].to_string())
        .filter(|symbol| symbol != variable && !ENGINE_CONSTANTS.contains(&symbol.as_str()))
        .collect();
    Ok(symbols.into_iter().collect())
}

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| CalcError::InternalError {
        message: format!("invalid notation pattern {}: {}", source, e),
    })
}
