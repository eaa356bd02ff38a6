pub mod calculus;
pub mod notation;

pub use crate::core::calculus::CasCalculus;
