pub mod error;
pub mod operations;
pub mod scope;
pub mod value;
