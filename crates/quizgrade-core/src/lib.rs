//! quizgrade-core — Answer evaluation, session flow, and log persistence.
//!
//! This crate defines the data model, the text-generation provider trait,
//! and the logic that scores free-text interview answers and walks a
//! candidate through a question set.

pub mod error;
pub mod evaluator;
pub mod extract;
pub mod flow;
pub mod logs;
pub mod model;
pub mod parser;
pub mod session;
pub mod summary;
pub mod traits;
