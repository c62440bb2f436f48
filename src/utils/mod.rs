pub mod csv;
pub mod env;
