use std::borrow::Cow;

use crate::{Error, Result};

pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);
}

/// Consumer credentials issued by the API provider.
///
/// Both halves are validated once at construction and never change
/// afterwards.
#[derive(Clone)]
pub struct Secrets<'a> {
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
}

impl<'a> Secrets<'a> {
    /// Constructs the consumer key pair.
    ///
    /// # Errors
    ///
    /// Fails when either the key or the secret is empty.
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Result<Self>
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        if consumer_key.is_empty() {
            return Err(Error::InvalidConsumerKey);
        }
        if consumer_secret.is_empty() {
            return Err(Error::InvalidConsumerSecret);
        }
        Ok(Secrets {
            consumer_key,
            consumer_secret,
        })
    }

    /// Detaches the credentials from any borrowed input.
    pub fn into_owned(self) -> Secrets<'static> {
        Secrets {
            consumer_key: Cow::Owned(self.consumer_key.into_owned()),
            consumer_secret: Cow::Owned(self.consumer_secret.into_owned()),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }
}

impl SecretsProvider for Secrets<'_> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }
}

// keep the secret out of logs and panic messages
impl std::fmt::Debug for Secrets<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}
