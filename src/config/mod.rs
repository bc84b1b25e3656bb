//! Configuration module for the Meridian MCP server.

mod settings;

pub use settings::*;
