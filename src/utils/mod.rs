pub mod data;
pub mod diff;
pub mod report;
