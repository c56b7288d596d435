use tracing::trace;

use super::{ComplexTypeStrategy, DefaultComplexType, Error, Wsdl};

const ARRAY_SUFFIX: &str = "[]";

/// Handles `T[]` style names by emitting one `ArrayOf…` sequence type per
/// nesting level; every other name goes to the wrapped [`DefaultComplexType`].
///
/// `int[][]` produces `ArrayOfInt` and `ArrayOfArrayOfInt`, each holding a
/// repeated `item` element of the next inner type.
#[derive(Clone, Default)]
pub struct ArrayOfTypeSequence {
    fallback: DefaultComplexType,
}

impl ArrayOfTypeSequence {
    pub fn new(fallback: DefaultComplexType) -> Self {
        Self { fallback }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ComplexTypeStrategy for ArrayOfTypeSequence {
    fn name(&self) -> &'static str {
        "array of type sequence"
    }

    fn add_complex_type(&self, context: &mut Wsdl, type_name: &str) -> Result<String, Error> {
        let item_type = match type_name.strip_suffix(ARRAY_SUFFIX) {
            Some(item_type) => item_type,
            None => return self.fallback.add_complex_type(context, type_name),
        };

        // Inner levels go through the document again so they are cached too.
        let child_type = context.resolve_xsd_type(item_type)?;
        let local_name = child_type.rsplit(':').next().unwrap_or_default();
        if local_name.is_empty() {
            return Err(Error::UnknownType {
                type_name: type_name.to_owned(),
                strategy: self.name(),
            });
        }

        let complex_type_name = format!("ArrayOf{}", capitalize(local_name));
        let qname = format!("tns:{}", complex_type_name);

        // `int[]` and `integer[]` share one schema type.
        let emitted = context.types().values().any(|existing| *existing == qname);
        context.add_type(type_name, &qname);
        if emitted {
            return Ok(qname);
        }

        let schema = context.schema();
        let dom = context.document_mut();

        let complex_type = dom.create_element("xsd:complexType");
        dom.set_attribute(complex_type, "name", &complex_type_name);

        let sequence = dom.create_element("xsd:sequence");
        let item = dom.create_element("xsd:element");
        dom.set_attribute(item, "name", "item");
        dom.set_attribute(item, "type", &child_type);
        dom.set_attribute(item, "minOccurs", "0");
        dom.set_attribute(item, "maxOccurs", "unbounded");

        dom.append_child(sequence, item);
        dom.append_child(complex_type, sequence);
        dom.append_child(schema, complex_type);

        trace!(type_name, qname = %qname, "added array type");
        Ok(qname)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, rc::Rc};

    use super::*;
    use crate::introspect::{Property, TypeRegistry};

    fn wsdl() -> Wsdl {
        let registry = TypeRegistry::new().with_type("Point", vec![Property::new("x", "int")]);
        let strategy = ArrayOfTypeSequence::new(DefaultComplexType::new(registry));

        Wsdl::with_strategy("Shapes", "urn:shapes", Rc::new(strategy), HashMap::new()).unwrap()
    }

    #[test]
    fn primitive_array_becomes_sequence_type() {
        let mut wsdl = wsdl();
        assert_eq!(wsdl.resolve_xsd_type("int[]").unwrap(), "tns:ArrayOfInt");

        let schema = wsdl.schema();
        assert_eq!(
            wsdl.document().node_to_string(schema).unwrap(),
            "<xsd:schema targetNamespace=\"urn:shapes\">\
             <xsd:complexType name=\"ArrayOfInt\"><xsd:sequence>\
             <xsd:element name=\"item\" type=\"xsd:int\" minOccurs=\"0\" maxOccurs=\"unbounded\"/>\
             </xsd:sequence></xsd:complexType></xsd:schema>"
        );
    }

    #[test]
    fn nested_arrays_emit_one_type_per_level() {
        let mut wsdl = wsdl();
        assert_eq!(
            wsdl.resolve_xsd_type("Point[][]").unwrap(),
            "tns:ArrayOfArrayOfPoint"
        );

        let schema = wsdl.schema();
        let dom = wsdl.document();
        let names: Vec<_> = dom
            .element_children(schema)
            .map(|child| dom.attribute(child, "name").unwrap().to_owned())
            .collect();
        assert_eq!(names, ["Point", "ArrayOfPoint", "ArrayOfArrayOfPoint"]);
    }

    #[test]
    fn aliases_share_one_schema_type() {
        let mut wsdl = wsdl();
        assert_eq!(wsdl.resolve_xsd_type("int[]").unwrap(), "tns:ArrayOfInt");
        assert_eq!(wsdl.resolve_xsd_type("integer[]").unwrap(), "tns:ArrayOfInt");

        let schema = wsdl.schema();
        assert_eq!(wsdl.document().children(schema).len(), 1);
    }

    #[test]
    fn plain_types_use_fallback() {
        let mut wsdl = wsdl();
        assert_eq!(wsdl.resolve_xsd_type("Point").unwrap(), "tns:Point");
        assert!(wsdl.resolve_xsd_type("Unknown").is_err());
    }
}
