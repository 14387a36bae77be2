use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid consumer key given: must not be empty")]
    InvalidConsumerKey,
    #[error("invalid consumer secret given: must not be empty")]
    InvalidConsumerSecret,
    #[error("invalid api endpoint : {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("api endpoint must not carry a query or fragment : {0}")]
    EndpointWithQuery(String),
    #[error("parameters could not be serialized : {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
    #[error("request failed : {0}")]
    Transport(#[from] reqwest::Error),
}
