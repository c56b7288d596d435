use tracing::{debug, trace};

use super::{document::Wsdl, error::Error};

const NAMESPACE_SEPARATOR: char = '\\';

/// The XML Schema type for a primitive source type, matched case-insensitively.
///
/// `void` maps to an empty string: no `type` attribute should be emitted for it.
pub fn primitive_xsd_type(name: &str) -> Option<&'static str> {
    let ty = match name.to_lowercase().as_str() {
        "string" | "str" => "xsd:string",
        "long" => "xsd:long",
        "int" | "integer" => "xsd:int",
        "float" => "xsd:float",
        "double" => "xsd:double",
        "boolean" | "bool" => "xsd:boolean",
        "array" => "soap-enc:Array",
        "object" => "xsd:struct",
        "mixed" => "xsd:anyType",
        "void" => "",
        _ => return None,
    };

    Some(ty)
}

impl Wsdl {
    /// Resolves a source type name to the QName used in `type` attributes,
    /// handing non-primitive names to [`Wsdl::add_complex_type`].
    pub fn resolve_xsd_type(&mut self, name: &str) -> Result<String, Error> {
        match primitive_xsd_type(name) {
            Some(ty) => Ok(ty.to_owned()),
            None => self.add_complex_type(name),
        }
    }

    /// Derives the schema local name of a source type.
    ///
    /// A class map entry is returned verbatim. Otherwise a leading `\` is
    /// dropped and only the part after the last `\` is kept.
    pub fn translate_type(&self, name: &str) -> String {
        if let Some(mapped) = self.class_map().get(name) {
            return mapped.clone();
        }

        let name = name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name);
        let name = match name.rfind(NAMESPACE_SEPARATOR) {
            Some(position) if position > 0 => &name[position + NAMESPACE_SEPARATOR.len_utf8()..],
            _ => name,
        };

        name.replace(NAMESPACE_SEPARATOR, ".")
    }

    /// Returns the QName of a complex type, asking the active strategy to emit
    /// its schema the first time the type is seen.
    pub fn add_complex_type(&mut self, name: &str) -> Result<String, Error> {
        if let Some(qname) = self.types().get(name) {
            trace!(type_name = name, qname = %qname, "complex type already included");
            return Ok(qname.clone());
        }

        self.schema();

        let strategy = self.complex_type_strategy();
        debug!(type_name = name, strategy = strategy.name(), "adding complex type");

        let qname = strategy.add_complex_type(self, name)?;
        if qname.is_empty() {
            return Err(Error::EmptyQName(name.to_owned()));
        }

        self.add_type(name, &qname);
        Ok(qname)
    }
}
