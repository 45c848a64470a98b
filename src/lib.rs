pub mod error;
pub mod types;
pub mod config;
pub mod schema_loader;
pub mod ddl;
pub mod bindings;
pub mod generator;
pub mod output;
