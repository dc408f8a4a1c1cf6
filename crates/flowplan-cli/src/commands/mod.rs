pub mod check;
pub mod graph;
pub mod loader;
pub mod plan;
pub mod report;

#[cfg(test)]
mod report_tests;
