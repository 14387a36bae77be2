/*!
fatsecret-oauth1: a FatSecret Platform client that signs every call with
two-legged OAuth 1.0.

# Overview

Every FatSecret REST call is a GET against a single endpoint, where the API
method name travels in the `method` query parameter next to the OAuth
protocol parameters and an `HMAC-SHA1` signature. This crate builds those
signed URLs and fetches them with [reqwest](https://crates.io/crates/reqwest).
Response bodies are handed back untouched.

# How to use

## Basic usecase 1 - raw API call

```no_run
# async fn run() -> fatsecret_oauth1::Result<()> {
use fatsecret_oauth1::{Client, Params};

let client = Client::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;

let body = client
    .invoke("foods.search", &Params::from([("search_expression", "toast")]))
    .await?;
println!("{}", String::from_utf8_lossy(&body));
# Ok(())
# }
```

## Basic usecase 2 - reproducible URLs

```
use fatsecret_oauth1::{FixedClock, FixedNonce, Params, RequestBuilder, Secrets};

let secrets = Secrets::new("key", "secret")?;
let builder = RequestBuilder::new(&secrets)
    .nonce_source(FixedNonce(1234567890))
    .clock(FixedClock(1700000000));

let url = builder.build_url("food_categories.get", &Params::new());
assert!(url.contains("oauth_signature=fGteEXFiCzhOWQXcGC7rhrdfFlg%3D"));
# Ok::<(), fatsecret_oauth1::Error>(())
```
*/
#[cfg(feature = "blocking")]
pub mod blocking;
mod client;
mod encode;
mod error;
mod nonce;
mod request;
mod secrets;
mod signer;

// exposed to external program
pub use client::{ApiInvoker, Client, ClientBuilder};
pub use encode::sig_escape;
pub use error::{Error, Result};
pub use nonce::{Clock, FixedClock, FixedNonce, NonceSource, RandomNonce, SystemClock};
pub use request::{OAuthParameters, Params, RequestBuilder};
pub use secrets::{Secrets, SecretsProvider};
pub use signer::{HmacSha1Signer, PlaintextSigner, Signer};

/// The public FatSecret REST endpoint.
pub const FATSECRET_API_URL: &str = "http://platform.fatsecret.com/rest/server.api";

// exposed constant variables
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `format`.
pub const FORMAT_KEY: &str = "format";
/// Represents `method`.
pub const METHOD_KEY: &str = "method";

/// Parameter names a caller cannot set; the client always supplies them.
pub const RESERVED_KEYS: [&str; 8] = [
    FORMAT_KEY,
    METHOD_KEY,
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY,
    OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY,
    OAUTH_VERSION_KEY,
];
