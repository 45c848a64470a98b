// Binding generator
pub mod binding_generator;
pub mod naming;
pub mod type_mapper;


pub use binding_generator::*;
pub use type_mapper::*;
