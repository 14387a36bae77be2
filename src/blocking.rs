//! Blocking counterpart of [`crate::Client`], enabled by the `blocking`
//! feature.
//!
//! Must not be used from inside an async runtime.

use reqwest::blocking::Client as ReqwestClient;

use crate::request::{Params, RequestBuilder};
use crate::{ClientBuilder, Result, Secrets};

#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    builder: RequestBuilder,
}

impl Client {
    /// Constructs a new blocking `Client` for the public endpoint.
    ///
    /// # Errors
    ///
    /// Fails when the consumer key or secret is empty.
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Result<Self>
    where
        TKey: AsRef<str>,
        TSecret: AsRef<str>,
    {
        let secrets = Secrets::new(consumer_key.as_ref(), consumer_secret.as_ref())?;
        ClientBuilder::new(&secrets).build_blocking()
    }

    pub(crate) fn from_parts(inner: ReqwestClient, builder: RequestBuilder) -> Self {
        Client { inner, builder }
    }

    pub fn build_url(&self, api_method: &str, params: &Params) -> String {
        self.builder.build_url(api_method, params)
    }

    /// Sends a signed GET for `api_method` and returns the response body.
    ///
    /// # Errors
    ///
    /// This method fails if the request could not be sent or the body could
    /// not be read completely.
    pub fn invoke(&self, api_method: &str, params: &Params) -> Result<Vec<u8>> {
        let url = self.builder.build_url(api_method, params);
        let resp = self.inner.get(url.as_str()).send()?;
        let status = resp.status();
        let body = resp.bytes()?;
        tracing::debug!(
            api_method,
            status = status.as_u16(),
            bytes = body.len(),
            "api response received"
        );
        Ok(body.to_vec())
    }
}
