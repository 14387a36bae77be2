use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashMap;
use std::fmt;
use std::iter::FromIterator;
use std::sync::Arc;

use http::Method;
use serde::Serialize;
use url::Url;

use crate::encode::sig_escape;
use crate::nonce::{Clock, NonceSource, RandomNonce, SystemClock};
use crate::signer::{HmacSha1Signer, Signer};
use crate::{
    Error, Result, SecretsProvider, FATSECRET_API_URL, FORMAT_KEY, METHOD_KEY, OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY,
    OAUTH_VERSION_KEY, RESERVED_KEYS,
};

const OAUTH_VERSION: &str = "1.0";
const RESPONSE_FORMAT: &str = "json";

/// API parameters of a single call, kept in byte-wise key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Params(BTreeMap::new())
    }

    /// Flattens any serializable value into string pairs.
    ///
    /// Accepts everything `serde_urlencoded` does: structs, maps and
    /// sequences of pairs.
    ///
    /// # Errors
    /// This method will fail if the value cannot be serialized into a query
    /// string.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(value)?;
        Ok(url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect())
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for Params {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        IntoIterator::into_iter(pairs).collect()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-request OAuth values.
///
/// Anything left unset is drawn from the builder's nonce source and clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct OAuthParameters {
    nonce: Option<u64>,
    timestamp: Option<u64>,
}

impl OAuthParameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_nonce value
    pub fn nonce(self, nonce: u64) -> Self {
        OAuthParameters {
            nonce: Some(nonce),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp(self, timestamp: u64) -> Self {
        OAuthParameters {
            timestamp: Some(timestamp),
            ..self
        }
    }
}

/// Builds signed request URLs for one consumer and one endpoint.
#[derive(Clone)]
pub struct RequestBuilder {
    consumer_key: String,
    api_url: String,
    escaped_api_url: String,
    signer: Arc<dyn Signer>,
    nonce_source: Arc<dyn NonceSource>,
    clock: Arc<dyn Clock>,
}

impl RequestBuilder {
    /// Creates a builder for the public FatSecret endpoint, signing with
    /// `HMAC-SHA1`.
    pub fn new<T: SecretsProvider>(secrets: &T) -> Self {
        let (consumer_key, consumer_secret) = secrets.get_consumer_key_pair();
        RequestBuilder {
            consumer_key: consumer_key.to_string(),
            api_url: FATSECRET_API_URL.to_string(),
            escaped_api_url: sig_escape(FATSECRET_API_URL),
            signer: Arc::new(HmacSha1Signer::new(consumer_secret)),
            nonce_source: Arc::new(RandomNonce::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Signs and sends against `endpoint` instead of the public one.
    ///
    /// The endpoint is signed in its `Url` serialization, so a path-less
    /// `http://example.com` becomes `http://example.com/`.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint already has a query string or a fragment;
    /// the signed parameters must be the whole query.
    pub fn endpoint(self, endpoint: Url) -> Result<Self> {
        if endpoint.query().is_some() || endpoint.fragment().is_some() {
            return Err(Error::EndpointWithQuery(endpoint.into()));
        }
        let api_url = String::from(endpoint);
        Ok(RequestBuilder {
            escaped_api_url: sig_escape(&api_url),
            api_url,
            ..self
        })
    }

    pub fn signer<S: Signer + 'static>(self, signer: S) -> Self {
        RequestBuilder {
            signer: Arc::new(signer),
            ..self
        }
    }

    pub fn nonce_source<N: NonceSource + 'static>(self, nonce_source: N) -> Self {
        RequestBuilder {
            nonce_source: Arc::new(nonce_source),
            ..self
        }
    }

    pub fn clock<C: Clock + 'static>(self, clock: C) -> Self {
        RequestBuilder {
            clock: Arc::new(clock),
            ..self
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Builds the signed GET URL for `api_method` with a fresh nonce and the
    /// current time.
    pub fn build_url(&self, api_method: &str, params: &Params) -> String {
        self.build_url_with(api_method, params, OAuthParameters::new())
    }

    /// Builds the signed GET URL using the given per-request OAuth values.
    ///
    /// Caller parameters named like a protocol parameter are dropped; the
    /// protocol value is always the one signed and sent.
    pub fn build_url_with(
        &self,
        api_method: &str,
        params: &Params,
        oauth: OAuthParameters,
    ) -> String {
        let nonce = oauth
            .nonce
            .unwrap_or_else(|| self.nonce_source.next_nonce())
            .to_string();
        let timestamp = oauth
            .timestamp
            .unwrap_or_else(|| self.clock.unix_timestamp())
            .to_string();

        let mut message = Params::from([
            (METHOD_KEY, api_method),
            (OAUTH_CONSUMER_KEY, self.consumer_key.as_str()),
            (OAUTH_NONCE_KEY, nonce.as_str()),
            (OAUTH_SIGNATURE_METHOD_KEY, self.signer.name()),
            (OAUTH_TIMESTAMP_KEY, timestamp.as_str()),
            (OAUTH_VERSION_KEY, OAUTH_VERSION),
            (FORMAT_KEY, RESPONSE_FORMAT),
        ]);
        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "ignoring caller parameter reserved for the protocol");
                continue;
            }
            message.insert(key.as_str(), value.as_str());
        }

        let base_string = self.signature_base_string(&message);
        tracing::trace!(base_string = %base_string, "signature base string");

        // two-legged: no token, so the token secret is empty
        let signature = self.signer.sign("", &base_string);
        message.insert(OAUTH_SIGNATURE_KEY, signature);

        let query = message
            .iter()
            .map(|(key, value)| format!("{}={}", key, sig_escape(value)))
            .collect::<Vec<String>>()
            .join("&");
        tracing::debug!(
            api_method,
            nonce = %nonce,
            timestamp = %timestamp,
            signature_method = self.signer.name(),
            "built signed request url"
        );
        format!("{}?{}", self.api_url, query)
    }

    /// `GET&<encoded endpoint>&<encoded sorted key=value string>`.
    ///
    /// Values are joined raw and the whole joined string is encoded once.
    pub fn signature_base_string(&self, message: &Params) -> String {
        let param_str = message
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<String>>()
            .join("&");
        format!(
            "{}&{}&{}",
            Method::GET.as_str(),
            self.escaped_api_url,
            sig_escape(&param_str)
        )
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("consumer_key", &self.consumer_key)
            .field("api_url", &self.api_url)
            .field("signature_method", &self.signer.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::nonce::{FixedClock, FixedNonce};
    use crate::Secrets;

    const TIMESTAMP: u64 = 1_700_000_000;

    fn builder() -> RequestBuilder {
        let secrets = Secrets::new("key", "secret").unwrap();
        RequestBuilder::new(&secrets)
            .nonce_source(FixedNonce(1_234_567_890))
            .clock(FixedClock(TIMESTAMP))
    }

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        let query = url.splitn(2, '?').nth(1).unwrap();
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    struct Upper;

    impl Signer for Upper {
        fn name(&self) -> &str {
            "UPPER"
        }

        fn sign(&self, _token_secret: &str, base_string: &str) -> String {
            base_string.to_ascii_uppercase()
        }
    }

    struct Counter(AtomicU64);

    impl NonceSource for Counter {
        fn next_nonce(&self) -> u64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    #[test]
    fn food_categories_golden_url() {
        let url = builder().build_url("food_categories.get", &Params::new());
        assert_eq!(
            url,
            "http://platform.fatsecret.com/rest/server.api?format=json\
             &method=food_categories.get&oauth_consumer_key=key\
             &oauth_nonce=1234567890&oauth_signature=fGteEXFiCzhOWQXcGC7rhrdfFlg%3D\
             &oauth_signature_method=HMAC-SHA1&oauth_timestamp=1700000000&oauth_version=1.0"
        );
    }

    #[test]
    fn rebuilding_with_same_inputs_is_identical() {
        let builder = builder();
        let params = Params::from([("search_expression", "toast")]);
        assert_eq!(
            builder.build_url("foods.search", &params),
            builder.build_url("foods.search", &params)
        );
    }

    #[test]
    fn query_holds_exactly_the_protocol_parameters() {
        let url = builder().build_url("food_categories.get", &Params::new());
        let mut keys: Vec<String> = query_pairs(&url).into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "format",
                "method",
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_version",
            ]
        );
        let pairs: BTreeMap<String, String> = query_pairs(&url).into_iter().collect();
        assert_eq!(pairs["oauth_signature"], "fGteEXFiCzhOWQXcGC7rhrdfFlg=");
        assert_eq!(pairs["method"], "food_categories.get");
        assert_eq!(pairs["format"], "json");
    }

    #[test]
    fn different_nonces_give_different_signatures() {
        let builder = builder();
        let params = Params::new();
        let first = builder.build_url_with(
            "food_categories.get",
            &params,
            OAuthParameters::new().nonce(1_234_567_890),
        );
        let second = builder.build_url_with(
            "food_categories.get",
            &params,
            OAuthParameters::new().nonce(1_234_567_891),
        );
        assert!(first.contains("oauth_signature=fGteEXFiCzhOWQXcGC7rhrdfFlg%3D"));
        assert!(second.contains("oauth_signature=ItAu%2BptULsJ2jaFGsEHF6%2BotNEk%3D"));
    }

    #[test]
    fn explicit_oauth_parameters_override_sources() {
        let builder = builder().clock(FixedClock(1));
        let url = builder.build_url_with(
            "food_categories.get",
            &Params::new(),
            OAuthParameters::new().timestamp(TIMESTAMP),
        );
        assert!(url.contains("oauth_timestamp=1700000000"));
        assert!(url.contains("oauth_nonce=1234567890"));
    }

    #[test]
    fn values_with_special_characters() {
        let params = Params::from([("search_expression", "mac & cheese (large)*!")]);
        let url = builder().build_url_with(
            "foods.search",
            &params,
            OAuthParameters::new().nonce(42),
        );
        assert_eq!(
            url,
            "http://platform.fatsecret.com/rest/server.api?format=json&method=foods.search\
             &oauth_consumer_key=key&oauth_nonce=42&oauth_signature=0E%2BRT2koEw1WKtICDzsDZsO89jI%3D\
             &oauth_signature_method=HMAC-SHA1&oauth_timestamp=1700000000&oauth_version=1.0\
             &search_expression=mac%20%26%20cheese%20%28large%29%2A%21"
        );
    }

    #[test]
    fn base_string_sorts_keys() {
        let message = Params::from([("b", "2"), ("a", "1"), ("oauth_nonce", "9")]);
        assert_eq!(
            builder().signature_base_string(&message),
            "GET&http%3A%2F%2Fplatform.fatsecret.com%2Frest%2Fserver.api&a%3D1%26b%3D2%26oauth_nonce%3D9"
        );
    }

    #[test]
    fn sort_is_byte_wise() {
        let message = Params::from([("a", "1"), ("B", "2"), ("_", "3")]);
        assert!(builder()
            .signature_base_string(&message)
            .ends_with("&B%3D2%26_%3D3%26a%3D1"));
    }

    #[test]
    fn reserved_caller_parameters_are_ignored() {
        let params = Params::from([
            ("oauth_version", "2.0"),
            ("format", "xml"),
            ("oauth_signature", "forged"),
            ("page_number", "1"),
        ]);
        let url = builder().build_url("foods.search", &params);
        let pairs: BTreeMap<String, String> = query_pairs(&url).into_iter().collect();
        assert_eq!(pairs["oauth_version"], "1.0");
        assert_eq!(pairs["format"], "json");
        assert_ne!(pairs["oauth_signature"], "forged");
        assert_eq!(pairs["page_number"], "1");
        assert_eq!(pairs.len(), 9);
    }

    #[test]
    fn signature_method_comes_from_signer() {
        let url = builder()
            .signer(Upper)
            .build_url("food_categories.get", &Params::new());
        let pairs: BTreeMap<String, String> = query_pairs(&url).into_iter().collect();
        assert_eq!(pairs["oauth_signature_method"], "UPPER");
        assert!(pairs["oauth_signature"].starts_with("GET&HTTP%3A%2F%2F"));
        assert!(pairs["oauth_signature"].contains("OAUTH_SIGNATURE_METHOD%3DUPPER"));
    }

    #[test]
    fn each_build_draws_a_new_nonce() {
        let builder = builder().nonce_source(Counter(AtomicU64::new(10)));
        let params = Params::new();
        assert!(builder
            .build_url("food_categories.get", &params)
            .contains("oauth_nonce=10&"));
        assert!(builder
            .build_url("food_categories.get", &params)
            .contains("oauth_nonce=11&"));
    }

    #[test]
    fn endpoint_override() {
        let builder = builder()
            .endpoint(Url::parse("http://localhost:8080/server.api").unwrap())
            .unwrap();
        let url = builder.build_url("food_categories.get", &Params::new());
        assert!(url.starts_with("http://localhost:8080/server.api?format=json&"));
        assert!(builder
            .signature_base_string(&Params::new())
            .starts_with("GET&http%3A%2F%2Flocalhost%3A8080%2Fserver.api&"));
    }

    #[test]
    fn endpoint_with_query_or_fragment_is_rejected() {
        for endpoint in &["http://example.com/api?x=1", "http://example.com/api#top"] {
            let err = builder()
                .endpoint(Url::parse(endpoint).unwrap())
                .unwrap_err();
            assert!(matches!(err, Error::EndpointWithQuery(ref url) if url == *endpoint));
        }
    }

    #[test]
    fn pathless_endpoint_is_signed_with_trailing_slash() {
        let builder = builder()
            .endpoint(Url::parse("http://example.com").unwrap())
            .unwrap();
        assert_eq!(builder.api_url(), "http://example.com/");
        assert!(builder
            .build_url("food_categories.get", &Params::new())
            .starts_with("http://example.com/?format=json&"));
        assert!(builder
            .signature_base_string(&Params::new())
            .starts_with("GET&http%3A%2F%2Fexample.com%2F&"));
    }

    #[test]
    fn params_from_serialize() {
        #[derive(Serialize)]
        struct Search<'a> {
            search_expression: &'a str,
            max_results: u32,
        }
        let params = Params::from_serialize(&Search {
            search_expression: "baked beans",
            max_results: 20,
        })
        .unwrap();
        assert_eq!(params.get("search_expression"), Some("baked beans"));
        assert_eq!(params.get("max_results"), Some("20"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn params_from_serialize_rejects_nested_values() {
        #[derive(Serialize)]
        struct Nested {
            inner: Vec<u32>,
        }
        assert!(Params::from_serialize(&Nested { inner: vec![1, 2] }).is_err());
    }

    #[test]
    fn params_from_hash_map() {
        let mut map = HashMap::new();
        map.insert("brand_type", "restaurant");
        let params = Params::from(map);
        assert!(params.contains_key("brand_type"));
        assert!(!params.is_empty());
    }
}
