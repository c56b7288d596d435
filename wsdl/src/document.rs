use std::{collections::HashMap, fs::File, io::Write, path::Path, rc::Rc};

use tracing::{debug, warn};
use wsdlgen_util::{
    dom::{Document, NodeId},
    error::Error as XmlError,
    xml::escape,
};

use super::{
    error::Error,
    strategy::{ComplexTypeStrategy, DefaultComplexType},
};

pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAP_ENCODING_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// A WSDL document under construction.
///
/// The builders take and return [`NodeId`] handles into this document only.
/// Passing a handle from another `Wsdl`, or one taken before a [`Wsdl::set_uri`]
/// that changed the tree shape, panics or targets an unrelated node.
pub struct Wsdl {
    pub(crate) dom: Document,
    pub(crate) definitions: NodeId,
    uri: String,
    schema: Option<NodeId>,
    included_types: HashMap<String, String>,
    class_map: HashMap<String, String>,
    strategy: Rc<dyn ComplexTypeStrategy>,
}

impl Wsdl {
    /// Creates an empty `definitions` document for the service `name`,
    /// targeting the namespace `uri`, using [`DefaultComplexType`].
    pub fn new(name: &str, uri: &str) -> Result<Self, Error> {
        Self::with_strategy(
            name,
            uri,
            Rc::new(DefaultComplexType::default()),
            HashMap::new(),
        )
    }

    pub fn with_strategy(
        name: &str,
        uri: &str,
        strategy: Rc<dyn ComplexTypeStrategy>,
        class_map: HashMap<String, String>,
    ) -> Result<Self, Error> {
        let skeleton = format!(
            "<?xml version=\"1.0\"?>\
             <definitions name=\"{name}\" targetNamespace=\"{uri}\" \
             xmlns=\"{wsdl}\" \
             xmlns:tns=\"{uri}\" \
             xmlns:soap=\"{soap}\" \
             xmlns:xsd=\"{xsd}\" \
             xmlns:soap-enc=\"{soap_enc}\" \
             xmlns:wsdl=\"{wsdl}\"/>",
            name = escape(name),
            uri = escape(uri),
            wsdl = WSDL_NAMESPACE,
            soap = SOAP_NAMESPACE,
            xsd = XSD_NAMESPACE,
            soap_enc = SOAP_ENCODING_NAMESPACE,
        );

        let dom = Document::parse(&skeleton).map_err(Error::ConstructionError)?;
        let definitions = dom
            .document_element()
            .ok_or(Error::ConstructionError(XmlError::MissingRoot))?;

        debug!(name, uri, strategy = strategy.name(), "created WSDL document");

        Ok(Self {
            dom,
            definitions,
            uri: uri.to_owned(),
            schema: None,
            included_types: HashMap::new(),
            class_map,
            strategy,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Moves the document to a new target namespace.
    ///
    /// The serialized document is rewritten by plain text substitution of the
    /// old URI (in its escaped form, as the writer emits it) and parsed again, so the old URI is also replaced wherever it
    /// occurs verbatim in documentation or custom attribute values. If the
    /// rewritten text no longer parses, the document is left as it was.
    ///
    /// Node handles stay valid as long as the substitution does not change
    /// the shape of the tree. Otherwise the reparsed tree replaces the old one
    /// and only handles obtained afterwards can be used.
    pub fn set_uri(&mut self, uri: &str) -> Result<&mut Self, Error> {
        if self.uri.is_empty() || self.uri == uri {
            self.uri = uri.to_owned();
            return Ok(self);
        }

        let (old, new) = (escape(&self.uri), escape(uri));
        let xml = self.dom.to_xml_string()?.replace(&*old, &new);
        let reparsed = Document::parse(&xml)?;

        if !self.dom.copy_values_from(&reparsed) {
            warn!(
                old = %self.uri,
                new = uri,
                "URI substitution changed the document structure, existing node handles are stale"
            );

            let definitions = reparsed.document_element().ok_or(XmlError::MissingRoot)?;
            self.schema = reparsed
                .find_child(definitions, "types")
                .and_then(|types| reparsed.find_child(types, "xsd:schema"));
            self.definitions = definitions;
            self.dom = reparsed;
        }

        debug!(old = %self.uri, new = uri, "rewrote target namespace");
        self.uri = uri.to_owned();
        Ok(self)
    }

    pub fn set_complex_type_strategy(&mut self, strategy: Rc<dyn ComplexTypeStrategy>) -> &mut Self {
        self.strategy = strategy;
        self
    }

    pub fn complex_type_strategy(&self) -> Rc<dyn ComplexTypeStrategy> {
        Rc::clone(&self.strategy)
    }

    pub fn class_map(&self) -> &HashMap<String, String> {
        &self.class_map
    }

    pub fn set_class_map(&mut self, class_map: HashMap<String, String>) -> &mut Self {
        self.class_map = class_map;
        self
    }

    /// Registers `qname` for `type_name` unless the type is already known.
    pub fn add_type(&mut self, type_name: &str, qname: &str) -> &mut Self {
        if !self.included_types.contains_key(type_name) {
            debug!(type_name, qname, "registered type");
            self.included_types
                .insert(type_name.to_owned(), qname.to_owned());
        }
        self
    }

    /// Forgets a registration whose schema could not be emitted.
    pub(crate) fn remove_type(&mut self, type_name: &str) {
        if self.included_types.remove(type_name).is_some() {
            debug!(type_name, "dropped type registration");
        }
    }

    pub fn types(&self) -> &HashMap<String, String> {
        &self.included_types
    }

    /// The `xsd:schema` node, created inside a new `types` element on first
    /// use.
    pub fn schema(&mut self) -> NodeId {
        if let Some(schema) = self.schema {
            return schema;
        }

        let schema = self.dom.create_element("xsd:schema");
        self.dom.set_attribute(schema, "targetNamespace", &self.uri);

        let types = self.dom.create_element("types");
        self.dom.append_child(types, schema);
        self.dom.append_child(self.definitions, types);

        self.schema = Some(schema);
        schema
    }

    /// The `definitions` element.
    pub fn root(&self) -> NodeId {
        self.definitions
    }

    pub fn document(&self) -> &Document {
        &self.dom
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.dom
    }

    pub fn to_xml(&self) -> Result<String, Error> {
        Ok(self.dom.to_xml_string()?)
    }

    pub fn dump<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(self.to_xml()?.as_bytes())?;
        Ok(())
    }

    pub fn dump_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.dump(File::create(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_declares_namespaces() {
        let wsdl = Wsdl::new("Calc", "urn:calc").unwrap();
        let dom = wsdl.document();
        let root = wsdl.root();

        assert_eq!(dom.name(root), Some("definitions"));
        assert_eq!(dom.attribute(root, "name"), Some("Calc"));
        assert_eq!(dom.attribute(root, "targetNamespace"), Some("urn:calc"));
        assert_eq!(dom.attribute(root, "xmlns"), Some(WSDL_NAMESPACE));
        assert_eq!(dom.attribute(root, "xmlns:tns"), Some("urn:calc"));
        assert_eq!(dom.attribute(root, "xmlns:soap"), Some(SOAP_NAMESPACE));
        assert_eq!(dom.attribute(root, "xmlns:xsd"), Some(XSD_NAMESPACE));
        assert_eq!(dom.attribute(root, "xmlns:soap-enc"), Some(SOAP_ENCODING_NAMESPACE));
        assert_eq!(dom.attribute(root, "xmlns:wsdl"), Some(WSDL_NAMESPACE));
        assert!(!dom.has_children(root));
    }

    #[test]
    fn skeleton_escapes_name_and_uri() {
        let wsdl = Wsdl::new("A & \"B\"", "urn:x?a=1&b=2").unwrap();
        let dom = wsdl.document();

        assert_eq!(dom.attribute(wsdl.root(), "name"), Some("A & \"B\""));
        assert_eq!(dom.attribute(wsdl.root(), "xmlns:tns"), Some("urn:x?a=1&b=2"));
    }

    #[test]
    fn add_type_keeps_first_mapping() {
        let mut wsdl = Wsdl::new("Calc", "urn:calc").unwrap();
        wsdl.add_type("Point", "tns:Point")
            .add_type("Point", "tns:Other");

        assert_eq!(wsdl.types().get("Point").map(String::as_str), Some("tns:Point"));
        assert_eq!(wsdl.types().len(), 1);
    }

    #[test]
    fn schema_is_created_once_under_types() {
        let mut wsdl = Wsdl::new("Calc", "urn:calc").unwrap();
        let schema = wsdl.schema();
        assert_eq!(wsdl.schema(), schema);

        let dom = wsdl.document();
        let types = dom.parent(schema).unwrap();
        assert_eq!(dom.name(types), Some("types"));
        assert_eq!(dom.parent(types), Some(wsdl.root()));
        assert_eq!(dom.attribute(schema, "targetNamespace"), Some("urn:calc"));
        assert_eq!(
            dom.element_children(wsdl.root())
                .filter(|&child| dom.name(child) == Some("types"))
                .count(),
            1
        );
    }

    #[test]
    fn set_uri_rewrites_every_occurrence_and_keeps_handles() {
        let mut wsdl = Wsdl::new("Calc", "urn:calc").unwrap();
        let schema = wsdl.schema();
        let port_type = wsdl.add_port_type("CalcPort");
        wsdl.add_documentation(port_type, "see urn:calc for details");

        wsdl.set_uri("urn:calculator").unwrap();

        let xml = wsdl.to_xml().unwrap();
        assert!(!xml.contains("\"urn:calc\""));
        assert!(xml.contains("targetNamespace=\"urn:calculator\""));
        assert!(xml.contains("xmlns:tns=\"urn:calculator\""));
        assert!(xml.contains("see urn:calculator for details"));
        assert_eq!(wsdl.uri(), "urn:calculator");

        let dom = wsdl.document();
        assert_eq!(dom.attribute(schema, "targetNamespace"), Some("urn:calculator"));
        assert_eq!(dom.attribute(port_type, "name"), Some("CalcPort"));
    }

    #[test]
    fn set_uri_handles_uris_that_need_escaping() {
        let mut wsdl = Wsdl::new("Calc", "urn:x?a=1&b=2").unwrap();
        let schema = wsdl.schema();

        wsdl.set_uri("urn:calc").unwrap();
        let dom = wsdl.document();
        assert_eq!(dom.attribute(wsdl.root(), "targetNamespace"), Some("urn:calc"));
        assert_eq!(dom.attribute(wsdl.root(), "xmlns:tns"), Some("urn:calc"));
        assert_eq!(dom.attribute(schema, "targetNamespace"), Some("urn:calc"));
        assert!(!wsdl.to_xml().unwrap().contains("urn:x?"));

        wsdl.set_uri("urn:y?c=3&d='4'").unwrap();
        let dom = wsdl.document();
        assert_eq!(dom.attribute(wsdl.root(), "targetNamespace"), Some("urn:y?c=3&d='4'"));
        assert_eq!(dom.attribute(wsdl.root(), "xmlns:tns"), Some("urn:y?c=3&d='4'"));
        assert_eq!(wsdl.uri(), "urn:y?c=3&d='4'");
    }

    #[test]
    fn set_uri_leaves_document_alone_when_result_does_not_parse() {
        // The old URI also matches inside the `&amp;` entity of the text.
        let mut wsdl = Wsdl::new("Calc", "amp").unwrap();
        let root = wsdl.root();
        wsdl.add_documentation(root, "fish & chips");
        let before = wsdl.to_xml().unwrap();

        assert!(wsdl.set_uri("x y").is_err());
        assert_eq!(wsdl.to_xml().unwrap(), before);
        assert_eq!(wsdl.uri(), "amp");
    }

    #[test]
    fn dump_writes_serialized_document() {
        let wsdl = Wsdl::new("Calc", "urn:calc").unwrap();
        let mut buffer = Vec::new();
        wsdl.dump(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), wsdl.to_xml().unwrap());
    }
}
