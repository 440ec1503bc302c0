pub mod agent;
pub mod config;
pub mod core;
pub mod es;
pub mod llm;
pub mod memory;
pub mod server;
pub mod state;
pub mod tools;
