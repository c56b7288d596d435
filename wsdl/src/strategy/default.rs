use std::rc::Rc;

use tracing::trace;

use super::{ComplexTypeStrategy, Error, Wsdl};
use crate::introspect::{TypeIntrospector, TypeRegistry};

/// Emits `xsd:complexType name=… > xsd:all` with one `xsd:element` per field
/// reported by the introspector.
#[derive(Clone)]
pub struct DefaultComplexType {
    introspector: Rc<dyn TypeIntrospector>,
}

impl Default for DefaultComplexType {
    fn default() -> Self {
        Self::new(TypeRegistry::default())
    }
}

impl DefaultComplexType {
    pub fn new<I: TypeIntrospector + 'static>(introspector: I) -> Self {
        Self::shared(Rc::new(introspector))
    }

    pub fn shared(introspector: Rc<dyn TypeIntrospector>) -> Self {
        Self { introspector }
    }

    pub fn introspector(&self) -> Rc<dyn TypeIntrospector> {
        Rc::clone(&self.introspector)
    }
}

impl ComplexTypeStrategy for DefaultComplexType {
    fn name(&self) -> &'static str {
        "default"
    }

    fn add_complex_type(&self, context: &mut Wsdl, type_name: &str) -> Result<String, Error> {
        let properties =
            self.introspector
                .properties(type_name)
                .ok_or_else(|| Error::UnknownType {
                    type_name: type_name.to_owned(),
                    strategy: self.name(),
                })?;

        let soap_type_name = context.translate_type(type_name);
        let soap_type = format!("tns:{}", soap_type_name);

        // Registered before the fields are resolved so self-referencing types
        // resolve to this QName instead of recursing.
        let registered = !context.types().contains_key(type_name);
        context.add_type(type_name, &soap_type);

        let mut elements = Vec::with_capacity(properties.len());
        for property in properties {
            let ty = match context.resolve_xsd_type(&property.ty) {
                Ok(ty) => ty,
                Err(error) => {
                    // No complexType was emitted, so the QName must not stay cached.
                    if registered {
                        context.remove_type(type_name);
                    }
                    return Err(error);
                }
            };

            let dom = context.document_mut();
            let element = dom.create_element("xsd:element");
            dom.set_attribute(element, "name", &property.name);
            if !ty.is_empty() {
                dom.set_attribute(element, "type", &ty);
            }
            if property.nillable {
                dom.set_attribute(element, "nillable", "true");
            }

            trace!(type_name, field = %property.name, ty = %ty, "added field");
            elements.push(element);
        }

        let schema = context.schema();
        let dom = context.document_mut();

        let complex_type = dom.create_element("xsd:complexType");
        dom.set_attribute(complex_type, "name", &soap_type_name);

        let all = dom.create_element("xsd:all");
        for element in elements {
            dom.append_child(all, element);
        }

        dom.append_child(complex_type, all);
        dom.append_child(schema, complex_type);

        Ok(soap_type)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::introspect::Property;

    fn wsdl_with(registry: TypeRegistry) -> Wsdl {
        Wsdl::with_strategy(
            "Shapes",
            "urn:shapes",
            Rc::new(DefaultComplexType::new(registry)),
            HashMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn emits_complex_type_with_all_fields() {
        let registry = TypeRegistry::new().with_type(
            "App\\Point",
            vec![
                Property::new("x", "int"),
                Property::new("y", "int"),
                Property::new("label", "string").nillable(),
            ],
        );
        let mut wsdl = wsdl_with(registry);

        assert_eq!(wsdl.resolve_xsd_type("App\\Point").unwrap(), "tns:Point");

        let schema = wsdl.schema();
        assert_eq!(
            wsdl.document().node_to_string(schema).unwrap(),
            "<xsd:schema targetNamespace=\"urn:shapes\">\
             <xsd:complexType name=\"Point\"><xsd:all>\
             <xsd:element name=\"x\" type=\"xsd:int\"/>\
             <xsd:element name=\"y\" type=\"xsd:int\"/>\
             <xsd:element name=\"label\" type=\"xsd:string\" nillable=\"true\"/>\
             </xsd:all></xsd:complexType></xsd:schema>"
        );
    }

    #[test]
    fn adding_twice_does_not_duplicate_schema() {
        let registry = TypeRegistry::new().with_type("Point", vec![Property::new("x", "int")]);
        let mut wsdl = wsdl_with(registry);

        let first = wsdl.add_complex_type("Point").unwrap();
        let schema = wsdl.schema();
        let count = wsdl.document().children(schema).len();
        let second = wsdl.add_complex_type("Point").unwrap();

        assert_eq!(first, second);
        assert_eq!(wsdl.document().children(schema).len(), count);
        assert_eq!(count, 1);
    }

    #[test]
    fn nested_and_recursive_types_terminate() {
        let registry = TypeRegistry::new()
            .with_type(
                "Node",
                vec![
                    Property::new("value", "Point"),
                    Property::new("next", "Node").nillable(),
                ],
            )
            .with_type("Point", vec![Property::new("x", "int")]);
        let mut wsdl = wsdl_with(registry);

        assert_eq!(wsdl.resolve_xsd_type("Node").unwrap(), "tns:Node");
        assert_eq!(wsdl.types().get("Point").map(String::as_str), Some("tns:Point"));

        let schema = wsdl.schema();
        let dom = wsdl.document();
        let names: Vec<_> = dom
            .element_children(schema)
            .map(|child| dom.attribute(child, "name").unwrap().to_owned())
            .collect();
        assert_eq!(names, ["Point", "Node"]);
    }

    #[test]
    fn class_map_renames_emitted_type() {
        let registry = TypeRegistry::new().with_type("Point", vec![Property::new("x", "int")]);
        let mut wsdl = wsdl_with(registry);
        let mut class_map = HashMap::new();
        class_map.insert("Point".to_owned(), "Coordinate".to_owned());
        wsdl.set_class_map(class_map);

        assert_eq!(wsdl.resolve_xsd_type("Point").unwrap(), "tns:Coordinate");
    }

    #[test]
    fn failed_field_does_not_leave_type_registered() {
        let registry = TypeRegistry::new()
            .with_type(
                "Node",
                vec![Property::new("next", "Node"), Property::new("bad", "Missing")],
            )
            .with_type("Point", vec![Property::new("x", "int")]);
        let mut wsdl = wsdl_with(registry);

        for _ in 0..2 {
            assert!(matches!(
                wsdl.resolve_xsd_type("Node"),
                Err(Error::UnknownType { type_name, .. }) if type_name == "Missing"
            ));
            assert!(wsdl.types().is_empty());
        }

        let schema = wsdl.schema();
        assert!(!wsdl.document().has_children(schema));

        assert_eq!(wsdl.resolve_xsd_type("Point").unwrap(), "tns:Point");
        assert_eq!(wsdl.types().len(), 1);
    }

    #[test]
    fn void_field_has_no_type_attribute() {
        let registry = TypeRegistry::new().with_type("Empty", vec![Property::new("nothing", "void")]);
        let mut wsdl = wsdl_with(registry);
        wsdl.resolve_xsd_type("Empty").unwrap();

        let schema = wsdl.schema();
        assert!(wsdl
            .document()
            .node_to_string(schema)
            .unwrap()
            .contains("<xsd:element name=\"nothing\"/>"));
    }
}
