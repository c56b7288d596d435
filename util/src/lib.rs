pub mod dom;
pub mod error;
pub mod xml;
