// Schema model loader and validation layer
pub mod loader;
pub mod type_parser;
pub mod validator;


pub use loader::{is_identifier, SchemaLoader};
pub use validator::SchemaValidator;
