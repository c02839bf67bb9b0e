mod summary;
pub mod views;

pub use summary::{HonorRoll, UnevaluatedStudent};
