use serde_json::Value;
use tracing::trace;
use wsdlgen_util::dom::{Document, NodeId};

use super::{document::Wsdl, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    Sequence,
    All,
    Choice,
}

/// Declarative description of one `xsd:element`.
///
/// Attributes are copied onto the element as given. A compositor wraps the
/// nested descriptors in `xsd:complexType > xsd:sequence|all|choice`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    attributes: Vec<(String, String)>,
    compositor: Option<(Compositor, Vec<ElementDescriptor>)>,
}

impl Compositor {
    pub fn key(self) -> &'static str {
        match self {
            Compositor::Sequence => "sequence",
            Compositor::All => "all",
            Compositor::Choice => "choice",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sequence" => Some(Compositor::Sequence),
            "all" => Some(Compositor::All),
            "choice" => Some(Compositor::Choice),
            _ => None,
        }
    }
}

impl ElementDescriptor {
    pub fn new(name: &str) -> Self {
        Self::default().attribute("name", name)
    }

    pub fn attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn sequence(self, children: Vec<ElementDescriptor>) -> Self {
        self.compositor(Compositor::Sequence, children)
    }

    pub fn all(self, children: Vec<ElementDescriptor>) -> Self {
        self.compositor(Compositor::All, children)
    }

    pub fn choice(self, children: Vec<ElementDescriptor>) -> Self {
        self.compositor(Compositor::Choice, children)
    }

    /// Sets the compositor, replacing any previous one.
    pub fn compositor(mut self, compositor: Compositor, children: Vec<ElementDescriptor>) -> Self {
        self.compositor = Some((compositor, children));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == "name")
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> Option<(Compositor, &[ElementDescriptor])> {
        self.compositor
            .as_ref()
            .map(|(compositor, children)| (*compositor, children.as_slice()))
    }

    /// Reads a descriptor from an untyped JSON object.
    ///
    /// `sequence`, `all` and `choice` holding arrays become the compositor
    /// (a non-array value under those keys is ignored); every other key must
    /// hold a scalar and becomes an attribute.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidElement(format!("expected an object, found {}", value))
        })?;

        let mut descriptor = Self::default();

        for (key, value) in object {
            if let Some(compositor) = Compositor::from_key(key) {
                let children = match value.as_array() {
                    Some(children) => children,
                    None => continue,
                };

                if let Some((existing, _)) = &descriptor.compositor {
                    return Err(Error::InvalidElement(format!(
                        "both {} and {} given for one element",
                        existing.key(),
                        compositor.key()
                    )));
                }

                let children = children
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                descriptor.compositor = Some((compositor, children));
                continue;
            }

            let text = match value {
                Value::String(text) => text.clone(),
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::InvalidElement(format!(
                        "attribute {} must be a scalar",
                        key
                    )))
                }
            };

            descriptor.attributes.push((key.clone(), text));
        }

        Ok(descriptor)
    }
}

fn build(dom: &mut Document, descriptor: &ElementDescriptor) -> NodeId {
    let element = dom.create_element("xsd:element");

    for (key, value) in &descriptor.attributes {
        dom.set_attribute(element, key, value);
    }

    if let Some((compositor, children)) = &descriptor.compositor {
        let complex_type = dom.create_element("xsd:complexType");

        if !children.is_empty() {
            let container = dom.create_element(format!("xsd:{}", compositor.key()));
            for child in children {
                let child = build(dom, child);
                dom.append_child(container, child);
            }
            dom.append_child(complex_type, container);
        }

        dom.append_child(element, complex_type);
    }

    element
}

impl Wsdl {
    /// Builds a detached `xsd:element` tree from `descriptor`.
    pub fn build_element(&mut self, descriptor: &ElementDescriptor) -> NodeId {
        build(self.document_mut(), descriptor)
    }

    /// Appends the element to the schema and returns `tns:<name>` for use in
    /// message parts.
    pub fn add_element(&mut self, descriptor: &ElementDescriptor) -> Result<String, Error> {
        let name = descriptor.name().ok_or(Error::MissingElementName)?.to_owned();

        let schema = self.schema();
        let element = self.build_element(descriptor);
        self.document_mut().append_child(schema, element);

        trace!(name = %name, "added schema element");
        Ok(format!("tns:{}", name))
    }
}
