pub mod azure;
pub mod config;
pub mod mcp;
pub mod output;
pub mod server;
pub mod tools;
