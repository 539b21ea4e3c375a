pub mod artifacts;
pub mod browser;
pub mod cli;
pub mod error;
pub mod exec;
pub mod readiness;
pub mod report;
pub mod run;
pub mod scanner;
