//! mathdrill-core — Question generation, spaced-repetition allocation, and scoring.
//!
//! This crate defines the data model, the arithmetic fact generator, the
//! allocator that recycles previously-missed questions, and the two-try
//! answer state machine that the rest of mathdrill builds on.

pub mod allocator;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod history;
pub mod model;
pub mod session;
pub mod summary;
