#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod error;
#[cfg(feature = "ledger")]
pub mod ledger;
#[cfg(feature = "rfq")]
pub mod rfq;
pub(crate) mod serde_helpers;
#[cfg(feature = "storage")]
pub mod storage;
pub mod types;

use std::fmt::{self, Write as _};
use std::str::FromStr;

use phf::phf_map;
#[cfg(any(feature = "rfq", feature = "ledger"))]
use reqwest::{Request, StatusCode};
use serde::Serialize;
#[cfg(any(feature = "rfq", feature = "ledger"))]
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable conventionally used to pick the [`Network`] (`main` or `test`).
pub const NETWORK_VAR: &str = "KEETA_NETWORK";

/// The Keeta network a client talks to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Network {
    #[default]
    Main,
    Test,
}

/// Static per-network settings.
#[non_exhaustive]
#[derive(Debug)]
pub struct NetworkConfig {
    pub network: Network,
    /// Canonical name, also accepted by [`Network::from_str`]
    pub name: &'static str,
    /// Every account address on this network starts with this prefix.
    pub address_prefix: &'static str,
}

static NETWORKS: phf::Map<&'static str, NetworkConfig> = phf_map! {
    "main" => NetworkConfig {
        network: Network::Main,
        name: "main",
        address_prefix: "keeta_",
    },
    "test" => NetworkConfig {
        network: Network::Test,
        name: "test",
        address_prefix: "keeta_",
    },
};

impl Network {
    #[must_use]
    pub fn config(self) -> &'static NetworkConfig {
        let name = match self {
            Network::Main => "main",
            Network::Test => "test",
        };
        // Both keys are present in the static map.
        &NETWORKS[name]
    }

    #[must_use]
    pub fn address_prefix(self) -> &'static str {
        self.config().address_prefix
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config().name)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NETWORKS
            .get(s.trim().to_ascii_lowercase().as_str())
            .map(|config| config.network)
            .ok_or_else(|| Error::validation(format!("unknown network {s:?}")))
    }
}

/// Checks that `address` is a well-formed account address for `network`: the network prefix
/// followed by a non-empty lowercase base32 body.
pub fn validate_address(address: &str, network: Network) -> Result<()> {
    let prefix = network.address_prefix();
    let Some(body) = address.strip_prefix(prefix) else {
        return Err(Error::validation(format!(
            "address {address:?} must start with {prefix:?}"
        )));
    };

    if body.is_empty() {
        return Err(Error::validation(format!("address {address:?} has no key")));
    }

    if let Some(bad) = body
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '2'..='7'))
    {
        return Err(Error::validation(format!(
            "address {address:?} contains invalid character {bad:?}"
        )));
    }

    Ok(())
}

/// Returns `true` for values wallet SDKs hand back in place of a real account, e.g. an empty
/// string, a literal placeholder, or a key made of one repeated character.
#[must_use]
pub fn is_placeholder_address(address: &str) -> bool {
    let lower = address.trim().to_ascii_lowercase();
    if lower.is_empty() || lower.contains("placeholder") || lower.contains("example") {
        return true;
    }

    let body = lower.split_once('_').map_or(lower.as_str(), |(_, key)| key);
    let mut chars = body.chars();
    match chars.next() {
        None => true,
        Some(first) => chars.all(|c| c == first),
    }
}

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
/// Arrays are serialized as repeated keys (`key=val1&key=val2`).
pub trait ToQueryParams: Serialize {
    /// Converts the request to a URL query string.
    ///
    /// Returns an empty string if no parameters are set, otherwise returns
    /// a string starting with `?` followed by URL-encoded key-value pairs.
    /// Also uses an optional cursor as a parameter, if provided.
    fn query_params(&self, next_cursor: Option<&str>) -> String {
        let mut params = serde_html_form::to_string(self)
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Unable to convert to URL-encoded string {e:?}");
                #[cfg(not(feature = "tracing"))]
                let _: &serde_html_form::ser::Error = e;
            })
            .unwrap_or_default();

        if let Some(cursor) = next_cursor {
            if !params.is_empty() {
                params.push('&');
            }
            let _ = write!(params, "next_cursor={cursor}");
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{params}")
        }
    }
}

impl<T: Serialize> ToQueryParams for T {}

#[cfg(any(feature = "rfq", feature = "ledger"))]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    let response_data: Option<Response> = serde_helpers::deserialize_with_warnings(json_value)?;

    if let Some(response) = response_data {
        Ok(response)
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(method = %method, path = %path, "API resource not found");
        Err(Error::status(
            StatusCode::NOT_FOUND,
            method,
            path,
            "Unable to find requested resource",
        ))
    }
}

/// Executes a request whose successful response body carries nothing of interest (plain text
/// "OK", an empty body, or a JSON acknowledgement).
#[cfg(feature = "rfq")]
async fn request_discarding_body(client: &reqwest::Client, request: Request) -> Result<()> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn network_from_str_should_succeed() {
        assert_eq!("main".parse::<Network>().unwrap(), Network::Main);
        assert_eq!(" TEST ".parse::<Network>().unwrap(), Network::Test);
    }

    #[test]
    fn network_from_str_unknown_should_fail() {
        let err = "staging".parse::<Network>().unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn network_display_round_trips_through_config() {
        assert_eq!(Network::Main.to_string(), "main");
        assert_eq!(Network::Test.config().address_prefix, "keeta_");
    }

    #[test]
    fn validate_address_should_succeed() {
        validate_address(
            "keeta_aabz4ysh6nm3xv5qltwgcpdj7rkfe2uo",
            Network::Main,
        )
        .unwrap();
    }

    #[test]
    fn validate_address_wrong_prefix_should_fail() {
        let err = validate_address("0x56687bf447db6ffa42ffe2204a05edaa20f55839", Network::Main)
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn validate_address_bad_characters_should_fail() {
        validate_address("keeta_ABC", Network::Main).unwrap_err();
        validate_address("keeta_abc018", Network::Main).unwrap_err();
        validate_address("keeta_", Network::Main).unwrap_err();
    }

    #[test]
    fn placeholder_addresses_are_detected() {
        assert!(is_placeholder_address(""), "empty");
        assert!(is_placeholder_address("keeta_aaaaaaaaaaaaaaaa"), "repeated");
        assert!(is_placeholder_address("PLACEHOLDER_STORAGE"), "literal");
        assert!(
            !is_placeholder_address("keeta_aabz4ysh6nm3xv5qltwgcpdj7rkfe2uo"),
            "real key"
        );
    }
}
