//! Serde helpers shared by the HTTP clients.
//!
//! With the `tracing` feature, responses are checked for fields the DTOs do not capture, so
//! backend schema drift shows up in the logs instead of being silently dropped.

#[cfg(any(feature = "rfq", feature = "ledger"))]
use {serde::de::DeserializeOwned, serde_json::Value};

/// A `serde_as` adapter that accepts identifiers sent either as JSON strings or as integers.
///
/// Use with `#[serde_as(as = "IdString")]` on `String` fields.
#[cfg(feature = "rfq")]
pub struct IdString;

#[cfg(feature = "rfq")]
impl<'de> serde_with::DeserializeAs<'de, String> for IdString {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::Deserialize as _;

        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Signed(n) => n.to_string(),
            Raw::Unsigned(n) => n.to_string(),
        })
    }
}

#[cfg(feature = "rfq")]
impl serde_with::SerializeAs<String> for IdString {
    fn serialize_as<S>(source: &String, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(source)
    }
}

/// Deserializes `value` into `T`, logging (but tolerating) fields `T` does not know about.
///
/// On failure the offending path and the value found there are logged before the error is
/// returned.
#[cfg(all(feature = "tracing", any(feature = "rfq", feature = "ledger")))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(type_name = %type_name::<T>(), json = %value, "deserializing JSON");

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        let json = original.to_string();
        let deserializer = &mut serde_json::Deserializer::from_str(&json);
        if let Err(e) = serde_path_to_error::deserialize::<_, T>(deserializer) {
            let path = e.path().to_string();
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %describe(lookup_value(&original, &path)),
                error = %e.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %describe(lookup_value(&original, &path)),
            "unknown field in API response"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(all(not(feature = "tracing"), any(feature = "rfq", feature = "ledger")))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Converts a `serde_ignored` / `serde_path_to_error` path (`orders[3].maker_id`,
/// `?.orders.3.price`) into an RFC 6901 JSON pointer.
#[cfg(all(feature = "tracing", any(feature = "rfq", feature = "ledger")))]
fn to_json_pointer(path: &str) -> String {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .fold(String::new(), |mut pointer, segment| {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
            pointer
        })
}

#[cfg(all(feature = "tracing", any(feature = "rfq", feature = "ledger")))]
fn lookup_value<'value>(value: &'value serde_json::Value, path: &str) -> Option<&'value serde_json::Value> {
    value.pointer(&to_json_pointer(path))
}

#[cfg(all(feature = "tracing", any(feature = "rfq", feature = "ledger")))]
fn describe(value: Option<&serde_json::Value>) -> String {
    value.map_or_else(|| "<unable to retrieve>".to_owned(), ToString::to_string)
}
