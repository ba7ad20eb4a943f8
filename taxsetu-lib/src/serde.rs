use serde::de;
use serde::Deserialize;

/// distinguishes an absent field from an explicit null when deserializing
/// into `Option<Option<T>>`
pub fn nested_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: de::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Deserialize::deserialize(deserializer)?))
}
