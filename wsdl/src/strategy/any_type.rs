use super::{ComplexTypeStrategy, Error, Wsdl};

/// Maps every complex type to `xsd:anyType` without emitting any schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyType;

impl ComplexTypeStrategy for AnyType {
    fn name(&self) -> &'static str {
        "any type"
    }

    fn add_complex_type(&self, _context: &mut Wsdl, _type_name: &str) -> Result<String, Error> {
        Ok("xsd:anyType".to_owned())
    }
}
