pub mod collector;
pub mod reporter;

pub use collector::{TestSummary, TestVerdict};
pub use reporter::Reporter;
