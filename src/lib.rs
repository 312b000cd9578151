pub mod config;
pub mod data_models;
pub mod fetcher;
pub mod isolator;
pub mod llm;
pub mod logging;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod report;
