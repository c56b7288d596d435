//! In-memory assembly of WSDL 1.1 documents and their XML Schema types.
//!
//! A [`Wsdl`] owns the document tree. Section builders append `message`,
//! `portType`, `binding` and `service` nodes and hand back [`NodeId`]s so that
//! operations, SOAP extensions and documentation can be attached afterwards.
//! Non-primitive types are turned into schema fragments by the active
//! [`strategy::ComplexTypeStrategy`].
//!
//! A `Wsdl` does no internal locking and is not `Send`; sharing one between
//! threads needs external synchronization.

mod document;
mod element;
mod resolver;
mod sections;

pub mod error;
pub mod introspect;
pub mod strategy;

pub use document::{Wsdl, SOAP_ENCODING_NAMESPACE, SOAP_NAMESPACE, WSDL_NAMESPACE, XSD_NAMESPACE};
pub use element::{Compositor, ElementDescriptor};
pub use resolver::primitive_xsd_type;
pub use sections::{BindingStyle, MessagePart, TypesSource, HTTP_TRANSPORT};
pub use wsdlgen_util::dom::{Document, NodeId, NodeKind};
