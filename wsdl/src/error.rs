use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to create the WSDL skeleton")]
    ConstructionError(#[source] wsdlgen_util::error::Error),

    #[error("Error reading or writing XML")]
    XmlError(#[from] wsdlgen_util::error::Error),

    #[error("Invalid element description: {0}")]
    InvalidElement(String),

    #[error("Element description has no name")]
    MissingElementName,

    #[error("Cannot add complex type {type_name} using the {strategy} strategy")]
    UnknownType {
        type_name: String,
        strategy: &'static str,
    },

    #[error("Complex type strategy returned no QName for {0}")]
    EmptyQName(String),

    #[error("Unable to write WSDL")]
    IoError(#[from] std::io::Error),
}
