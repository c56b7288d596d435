//! JSON description of a service, the input of the `wsdlgen` binary.

use std::{collections::HashMap, fs::File, io::Read, path::Path, rc::Rc};

use serde::Deserialize;
use serde_json::Value;
use wsdlgen_wsdl::{
    introspect::{Property, TypeRegistry},
    strategy::{AnyType, ArrayOfTypeSequence, ComplexTypeStrategy, DefaultComplexType},
    BindingStyle,
};

use super::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Document,
    #[default]
    Rpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Default,
    AnyType,
    ArrayOfTypeSequence,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    pub name: String,
    pub uri: String,
    pub location: String,

    #[serde(default)]
    pub style: Style,

    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub class_map: HashMap<String, String>,

    #[serde(default)]
    pub documentation: Option<String>,

    #[serde(default)]
    pub types: Vec<TypeDefinition>,

    /// Raw `xsd:element` descriptions added to the schema as they are.
    #[serde(default)]
    pub elements: Vec<Value>,

    #[serde(default)]
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub nillable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,

    #[serde(default)]
    pub documentation: Option<String>,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default = "void")]
    pub returns: String,

    /// Type of the fault message, if the operation declares one.
    #[serde(default)]
    pub fault: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Param {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,
}

fn void() -> String {
    "void".to_owned()
}

impl Style {
    pub fn binding_style(self) -> BindingStyle {
        match self {
            Style::Document => BindingStyle::Document,
            Style::Rpc => BindingStyle::Rpc,
        }
    }
}

impl Description {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_reader(File::open(path)?)
    }

    pub fn registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();

        for definition in &self.types {
            let properties = definition
                .fields
                .iter()
                .map(|field| Property {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    nillable: field.nillable,
                })
                .collect();

            registry.register(definition.name.clone(), properties);
        }

        registry
    }

    pub fn strategy(&self) -> Rc<dyn ComplexTypeStrategy> {
        let default = DefaultComplexType::new(self.registry());

        match self.strategy {
            StrategyKind::Default => Rc::new(default),
            StrategyKind::AnyType => Rc::new(AnyType),
            StrategyKind::ArrayOfTypeSequence => Rc::new(ArrayOfTypeSequence::new(default)),
        }
    }
}

#[cfg(test)]
mod tests {
    use wsdlgen_wsdl::introspect::TypeIntrospector;

    use super::*;

    #[test]
    fn minimal_description_uses_defaults() {
        let description = Description::from_reader(
            r#"{ "name": "Calc", "uri": "urn:calc", "location": "http://host/calc" }"#.as_bytes(),
        )
        .unwrap();

        assert_eq!(description.style, Style::Rpc);
        assert_eq!(description.strategy, StrategyKind::Default);
        assert!(description.operations.is_empty());
        assert!(description.class_map.is_empty());
    }

    #[test]
    fn reads_types_and_operations() {
        let description = Description::from_reader(
            r#"{
                "name": "Shapes",
                "uri": "urn:shapes",
                "location": "http://host/shapes",
                "style": "document",
                "strategy": "array_of_type_sequence",
                "types": [
                    { "name": "Point", "fields": [
                        { "name": "x", "type": "int" },
                        { "name": "label", "type": "string", "nillable": true }
                    ] }
                ],
                "operations": [
                    { "name": "move", "params": [ { "name": "to", "type": "Point" } ] }
                ]
            }"#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(description.style, Style::Document);
        assert_eq!(description.strategy, StrategyKind::ArrayOfTypeSequence);
        assert_eq!(description.operations[0].returns, "void");
        assert_eq!(description.operations[0].params[0].ty, "Point");

        let properties = description.registry().properties("Point").unwrap();
        assert_eq!(
            properties,
            vec![Property::new("x", "int"), Property::new("label", "string").nillable()]
        );
    }

    #[test]
    fn rejects_unknown_style() {
        let result = Description::from_reader(
            r#"{ "name": "A", "uri": "urn:a", "location": "http://a", "style": "soap" }"#.as_bytes(),
        );

        assert!(matches!(result, Err(Error::JsonError(_))));
    }
}
