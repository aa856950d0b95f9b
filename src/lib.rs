//! CFDB MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to explore CFDB college-football data held in the Databricks bronze layer.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, ToolError};
pub use mcp::CfdbService;
