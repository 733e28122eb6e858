pub mod add;
pub mod admin;
pub mod clear;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod sync;
