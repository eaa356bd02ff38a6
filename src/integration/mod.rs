//! Symbolic integration over exact rational arithmetic.
//!
//! Differentiation requests go to `symb_anafis`; its expression tree stores
//! numbers as `f64`, which partial fractions and rational root search cannot
//! work with. The integrand is therefore read into [`Expr`], a canonical tree
//! over `BigRational`, and every integration strategy runs on that tree. The
//! derivative in [`derivative`] exists for the strategies themselves (affine
//! argument detection, substitution checks) and is not served by any route.

pub mod derivative;
pub mod expr;
pub mod format;
pub mod integrate;
pub mod poly;
pub mod reader;

pub use expr::{Expr, Func};
pub use format::{render, render_unevaluated_integral};
pub use integrate::{integrate, Integral};
pub use reader::{is_identifier, parse};
