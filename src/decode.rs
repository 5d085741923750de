//! JSON decoding with path-aware errors.

use serde_json::Value;

use crate::error::Error;

/// Parse JSON text, reporting the path to the offending node on failure.
/// Key order is preserved by the `serde_json` feature flags, which the rest
/// of the pipeline depends on for deterministic field order.
pub fn value_from_str(src: &str) -> Result<Value, Error> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        Error::JsonDecode {
            path,
            source: err.into_inner(),
        }
    })
}
