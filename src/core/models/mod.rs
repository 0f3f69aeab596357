pub mod billing;
pub mod chart;
pub mod cost;
