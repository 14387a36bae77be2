use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::nonce::{Clock, NonceSource};
use crate::request::{Params, RequestBuilder};
use crate::signer::Signer;
use crate::{Result, Secrets, SecretsProvider};

/// Entry point for endpoint-specific code: call an API method, get the raw
/// response body back.
#[async_trait]
pub trait ApiInvoker {
    async fn invoke(&self, api_method: &str, params: &Params) -> Result<Vec<u8>>;
}

/// Asynchronous FatSecret client.
///
/// Cloning is cheap and clones share the nonce source and connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    builder: RequestBuilder,
}

impl Client {
    /// Constructs a new `Client` for the public endpoint.
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
        ClientBuilder::new(&secrets).build()
    }

    pub fn builder<T: SecretsProvider>(secrets: &T) -> ClientBuilder {
        ClientBuilder::new(secrets)
    }

    /// Builds the signed URL without sending anything.
    pub fn build_url(&self, api_method: &str, params: &Params) -> String {
        self.builder.build_url(api_method, params)
    }

    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Sends a signed GET for `api_method` and returns the response body.
    ///
    /// The status code is not inspected; API-level errors arrive as a
    /// regular body.
    ///
    /// # Errors
    ///
    /// This method fails if the request could not be sent or the body could
    /// not be read completely.
    pub async fn invoke(&self, api_method: &str, params: &Params) -> Result<Vec<u8>> {
        let url = self.builder.build_url(api_method, params);
        let resp = self.inner.get(url.as_str()).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        tracing::debug!(
            api_method,
            status = status.as_u16(),
            bytes = body.len(),
            "api response received"
        );
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ApiInvoker for Client {
    async fn invoke(&self, api_method: &str, params: &Params) -> Result<Vec<u8>> {
        Client::invoke(self, api_method, params).await
    }
}

/// Configures a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    builder: RequestBuilder,
    endpoint: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<ReqwestClient>,
}

impl ClientBuilder {
    pub fn new<T: SecretsProvider>(secrets: &T) -> Self {
        ClientBuilder {
            builder: RequestBuilder::new(secrets),
            endpoint: None,
            timeout: None,
            http_client: None,
        }
    }

    /// Sends requests somewhere other than the public FatSecret endpoint.
    ///
    /// The endpoint must not carry a query string or a fragment, and it is
    /// signed in normalized form (`http://example.com` signs as
    /// `http://example.com/`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn signer<S: Signer + 'static>(mut self, signer: S) -> Self {
        self.builder = self.builder.signer(signer);
        self
    }

    pub fn nonce_source<N: NonceSource + 'static>(mut self, nonce_source: N) -> Self {
        self.builder = self.builder.nonce_source(nonce_source);
        self
    }

    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.builder = self.builder.clock(clock);
        self
    }

    /// Enables a timeout covering connect through the end of the body.
    ///
    /// Ignored when an inner client is supplied with
    /// [`ClientBuilder::http_client`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses the given `reqwest::Client` for transport.
    ///
    /// Only [`ClientBuilder::build`] uses it; `build_blocking` always creates
    /// its own blocking client.
    pub fn http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// # Errors
    ///
    /// Fails on a malformed endpoint, an endpoint with a query or fragment,
    /// or when the HTTP client cannot be initialized.
    pub fn build(self) -> Result<Client> {
        let builder = self.request_builder()?;
        let inner = match self.http_client {
            Some(client) => client,
            None => {
                let mut http = ReqwestClient::builder();
                if let Some(timeout) = self.timeout {
                    http = http.timeout(timeout);
                }
                http.build()?
            }
        };
        Ok(Client { inner, builder })
    }

    /// Builds a [`crate::blocking::Client`] with the same signing setup.
    ///
    /// Any `http_client` set on this builder is ignored; `timeout` applies.
    ///
    /// # Errors
    ///
    /// Same as [`ClientBuilder::build`].
    #[cfg(feature = "blocking")]
    pub fn build_blocking(self) -> Result<crate::blocking::Client> {
        let builder = self.request_builder()?;
        let mut http = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        Ok(crate::blocking::Client::from_parts(http.build()?, builder))
    }

    fn request_builder(&self) -> Result<RequestBuilder> {
        match self.endpoint {
            Some(ref endpoint) => self.builder.clone().endpoint(Url::parse(endpoint)?),
            None => Ok(self.builder.clone()),
        }
    }
}
