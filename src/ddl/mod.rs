// DDL emitter
pub mod ddl_generator;
pub mod index_generator;

#[cfg(test)]
mod tests;

pub use ddl_generator::*;
pub use index_generator::*;
