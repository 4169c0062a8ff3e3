pub mod api_key;
pub mod app;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod llm;
pub mod markdown;
pub mod page;
pub mod paths;
pub mod search;
pub mod transcript;
pub mod turn;
