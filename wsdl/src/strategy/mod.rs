//! Policies turning named types into schema fragments.
//!
//! [`Wsdl::add_complex_type`] consults the document's type cache first and
//! only calls the active strategy for types it has not seen. The document is
//! passed to the strategy for the duration of that single call, so one
//! strategy instance can serve several documents.

use super::{document::Wsdl, error::Error};

mod any_type;
mod array_of_type;
mod composite;
mod default;

pub use any_type::AnyType;
pub use array_of_type::ArrayOfTypeSequence;
pub use composite::Composite;
pub use default::DefaultComplexType;

pub trait ComplexTypeStrategy {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Emits whatever schema `type_name` needs into `context` and returns the
    /// QName referring to it.
    fn add_complex_type(&self, context: &mut Wsdl, type_name: &str) -> Result<String, Error>;
}
