use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to read or write file")]
    IoError(#[from] std::io::Error),

    #[error("Unable to parse service description")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid service location")]
    LocationError(#[from] url::ParseError),

    #[error("Error building WSDL")]
    WsdlError(#[from] wsdlgen_wsdl::error::Error),
}
