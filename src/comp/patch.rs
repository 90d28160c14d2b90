//! Writes component values key by key.

use serde::de::DeserializeOwned;

use super::Component;

/// The entries of an object patch.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// The result of a patch.
pub type Result<T = ()> = std::result::Result<T, serde_json::Error>;

/// A component whose value can be written from a serialized value.
///
/// Use `#[comp(patch)]` to implement this trait.
/// For structs with named fields, the generated [`patch`](Self::patch)
/// only writes the fields named in the patch and rejects unknown keys,
/// so fields the patch does not name keep their value,
/// including fields that do not survive serialization.
pub trait Patch: Component + DeserializeOwned {
    /// Overwrites the fields named in `fields`.
    ///
    /// Implementations must leave `self` unchanged if this returns an error.
    /// The default implementation deserializes `fields` as a whole new value.
    fn patch(&mut self, fields: Fields) -> Result {
        *self = serde_json::from_value(serde_json::Value::Object(fields))?;
        Ok(())
    }
}

#[doc(hidden)]
pub fn field<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
}

#[doc(hidden)]
pub fn unknown_field(key: &str, expected: &'static [&'static str]) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::unknown_field(key, expected)
}
