pub mod cli;
pub mod config;
pub mod discover;
pub mod parse;
pub mod pattern;
pub mod report;
pub mod rewrite;
pub mod rules;
pub mod runner;
pub mod stats;

pub use runner::run;
