pub mod cache;
pub mod catalog;
pub mod config;
pub mod diagram;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod report;
pub mod schema;
pub mod storage;
