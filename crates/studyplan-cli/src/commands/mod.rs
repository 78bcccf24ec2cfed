pub mod config;
pub mod plan;
pub mod review;
pub mod schedule;
pub mod session;
pub mod subject;
