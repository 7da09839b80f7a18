pub mod auth;
pub mod challenge;
pub mod common;
pub mod config;
pub mod habit;
pub mod plan;
pub mod stats;
pub mod sync;
