use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error reading or writing XML")]
    XmlError(#[from] quick_xml::Error),

    #[error("Serialized XML is not valid UTF-8")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Found text outside of the root element")]
    TextOutsideRoot,

    #[error("Element {0} is never closed")]
    UnclosedElement(String),
}
