// Data models for weekly workout plans

pub mod error;
pub mod exercise;
pub mod weekly_plan;

pub use error::*;
pub use exercise::*;
pub use weekly_plan::*;
