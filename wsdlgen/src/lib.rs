mod generate;

pub mod description;
pub mod error;

pub use generate::generate;
