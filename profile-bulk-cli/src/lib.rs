pub mod api;
pub mod bulk;
pub mod cli;
pub mod config;
