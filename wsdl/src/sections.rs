use tracing::trace;
use wsdlgen_util::dom::{Document, NodeId, NodeKind};

use super::document::Wsdl;

pub const HTTP_TRANSPORT: &str = "http://schemas.xmlsoap.org/soap/http";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingStyle {
    #[default]
    Document,
    Rpc,
}

/// The description of one `part` of a `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// Emitted as the part's `type` attribute.
    Type(String),
    /// Arbitrary attributes, e.g. `element="tns:Request"`.
    Attributes(Vec<(String, String)>),
}

/// Schema definitions built outside the WSDL document.
#[derive(Debug, Clone, Copy)]
pub enum TypesSource<'a> {
    /// Imports the document element.
    Document(&'a Document),
    /// Imports one node and its descendants.
    Node(&'a Document, NodeId),
    /// Imports every top-level node of a fragment.
    Fragment(&'a Document),
}

impl BindingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BindingStyle::Document => "document",
            BindingStyle::Rpc => "rpc",
        }
    }
}

impl MessagePart {
    pub fn element<S: Into<String>>(qname: S) -> Self {
        MessagePart::Attributes(vec![("element".to_owned(), qname.into())])
    }
}

impl From<&str> for MessagePart {
    fn from(ty: &str) -> Self {
        MessagePart::Type(ty.to_owned())
    }
}

impl From<String> for MessagePart {
    fn from(ty: String) -> Self {
        MessagePart::Type(ty)
    }
}

fn message_reference(message: Option<&str>) -> Option<&str> {
    message.filter(|message| !message.trim().is_empty())
}

impl Wsdl {
    fn append_to_definitions(&mut self, node: NodeId) {
        let definitions = self.definitions;
        self.dom.append_child(definitions, node);
    }

    fn create_named(&mut self, element: &str, name: &str) -> NodeId {
        let node = self.dom.create_element(element);
        self.dom.set_attribute(node, "name", name);
        node
    }

    fn create_with_attributes(&mut self, element: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.dom.create_element(element);
        for (key, value) in attributes {
            self.dom.set_attribute(node, key, value);
        }
        node
    }

    pub fn add_message<I, N, P>(&mut self, name: &str, parts: I) -> NodeId
    where
        I: IntoIterator<Item = (N, P)>,
        N: AsRef<str>,
        P: Into<MessagePart>,
    {
        let message = self.create_named("message", name);

        for (part_name, part) in parts {
            let node = self.create_named("part", part_name.as_ref());

            let part: MessagePart = part.into();
            match part {
                MessagePart::Type(ty) => self.dom.set_attribute(node, "type", &ty),
                MessagePart::Attributes(attributes) => {
                    for (key, value) in attributes {
                        self.dom.set_attribute(node, &key, &value);
                    }
                }
            }

            self.dom.append_child(message, node);
        }

        self.append_to_definitions(message);
        trace!(name, "added message");
        message
    }

    pub fn add_port_type(&mut self, name: &str) -> NodeId {
        let port_type = self.create_named("portType", name);
        self.append_to_definitions(port_type);
        trace!(name, "added port type");
        port_type
    }

    /// Adds an `operation` to a `portType`. Each of `input`, `output` and
    /// `fault` names a message; `None` or a blank name leaves it out.
    pub fn add_port_operation(
        &mut self,
        port_type: NodeId,
        name: &str,
        input: Option<&str>,
        output: Option<&str>,
        fault: Option<&str>,
    ) -> NodeId {
        let operation = self.create_named("operation", name);

        for (element, message) in [("input", input), ("output", output), ("fault", fault)] {
            if let Some(message) = message_reference(message) {
                let node = self.create_with_attributes(element, &[("message", message)]);
                self.dom.append_child(operation, node);
            }
        }

        self.dom.append_child(port_type, operation);
        trace!(name, "added port operation");
        operation
    }

    pub fn add_binding(&mut self, name: &str, port_type: &str) -> NodeId {
        let binding = self.create_with_attributes("binding", &[("name", name), ("type", port_type)]);
        self.append_to_definitions(binding);
        trace!(name, port_type, "added binding");
        binding
    }

    /// Adds an `operation` to a `binding`. `input` and `output` become
    /// `soap:body` attributes; `fault` becomes `soap:fault` attributes and its
    /// `name`, when present, is repeated on the enclosing `fault` element.
    pub fn add_binding_operation(
        &mut self,
        binding: NodeId,
        name: &str,
        input: Option<&[(&str, &str)]>,
        output: Option<&[(&str, &str)]>,
        fault: Option<&[(&str, &str)]>,
    ) -> NodeId {
        let operation = self.create_named("operation", name);

        for (element, attributes) in [("input", input), ("output", output)] {
            if let Some(attributes) = attributes {
                let node = self.dom.create_element(element);
                let body = self.create_with_attributes("soap:body", attributes);
                self.dom.append_child(node, body);
                self.dom.append_child(operation, node);
            }
        }

        if let Some(attributes) = fault {
            let node = self.dom.create_element("fault");
            if let Some((_, fault_name)) = attributes.iter().find(|(key, _)| *key == "name") {
                self.dom.set_attribute(node, "name", fault_name);
            }

            let soap_fault = self.create_with_attributes("soap:fault", attributes);
            self.dom.append_child(node, soap_fault);
            self.dom.append_child(operation, node);
        }

        self.dom.append_child(binding, operation);
        trace!(name, "added binding operation");
        operation
    }

    /// Adds `soap:binding` as the first child of `binding`.
    pub fn add_soap_binding(&mut self, binding: NodeId, style: BindingStyle, transport: &str) -> NodeId {
        let soap_binding = self.create_with_attributes(
            "soap:binding",
            &[("style", style.as_str()), ("transport", transport)],
        );
        self.dom.prepend_child(binding, soap_binding);
        soap_binding
    }

    /// Adds `soap:operation` as the first child of a binding `operation`, ahead
    /// of its `input`, `output` and `fault`.
    pub fn add_soap_operation(&mut self, operation: NodeId, soap_action: &str) -> NodeId {
        let soap_operation = self.create_with_attributes("soap:operation", &[("soapAction", soap_action)]);
        self.dom.prepend_child(operation, soap_operation);
        soap_operation
    }

    pub fn add_service(&mut self, name: &str, port_name: &str, binding: &str, location: &str) -> NodeId {
        let service = self.create_named("service", name);
        let port = self.create_with_attributes("port", &[("name", port_name), ("binding", binding)]);
        let address = self.create_with_attributes("soap:address", &[("location", location)]);

        self.dom.append_child(port, address);
        self.dom.append_child(service, port);
        self.append_to_definitions(service);

        trace!(name, location, "added service");
        service
    }

    /// Adds a `documentation` element as the first child of `node`; pass
    /// [`Wsdl::root`] or the document's own root to document the whole
    /// service. Line endings are normalized to `\n`.
    pub fn add_documentation(&mut self, node: NodeId, documentation: &str) -> NodeId {
        let node = if node == self.dom.root() {
            self.definitions
        } else {
            node
        };
        let text = documentation.replace("\r\n", "\n").replace('\r', "\n");

        let element = self.dom.create_element("documentation");
        if !text.is_empty() {
            let content = self.dom.create_text(text);
            self.dom.append_child(element, content);
        }

        self.dom.prepend_child(node, element);
        element
    }

    /// Copies externally built schema definitions under `definitions`.
    pub fn add_types(&mut self, types: TypesSource<'_>) {
        let imported = match types {
            TypesSource::Document(document) => match document.document_element() {
                Some(element) => self.dom.import_node(document, element),
                None => return,
            },
            TypesSource::Node(document, node) => self.dom.import_node(document, node),
            TypesSource::Fragment(document) => self.dom.import_node(document, document.root()),
        };

        if let NodeKind::Element { name, .. } = self.dom.kind(imported) {
            trace!(name = %name, "imported types");
        }

        self.append_to_definitions(imported);
    }
}
