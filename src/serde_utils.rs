/// Serde helpers for PipeCD's canonical JSON (protojson) encoding.
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

/// Encode/decode a protobuf `int64` field.
///
/// protojson writes 64-bit integers as JSON strings, but servers and
/// hand-written fixtures also send plain numbers. Both are accepted;
/// `null` and a missing field decode to `0`. Values are always written
/// back as strings.
///
/// Usage:
/// ```ignore
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Example {
///     #[serde(default, with = "crate::serde_utils::int64")]
///     created_at: i64,
/// }
/// ```
pub mod int64 {
    use super::*;

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(de: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Int64Visitor;

        impl<'de> serde::de::Visitor<'de> for Int64Visitor {
            type Value = i64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer or a decimal string")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(v)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v).map_err(|_| E::custom(format!("int64 out of range: {v}")))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.is_empty() {
                    return Ok(0);
                }
                v.parse()
                    .map_err(|_| E::custom(format!("invalid int64 string: {v:?}")))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(0)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(0)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }
        }

        de.deserialize_any(Int64Visitor)
    }
}

/// Decode a field that the server may send as `null`, falling back to the
/// type's default (protojson's zero value).
pub fn null_as_default<'de, T, D>(de: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// `skip_serializing_if` predicate: protojson leaves out fields holding their
/// zero value.
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Stamp {
        #[serde(default, with = "super::int64")]
        created_at: i64,
        #[serde(default, deserialize_with = "super::null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn test_int64_accepts_string_and_number() {
        let from_str: Stamp = serde_json::from_str(r#"{"created_at":"1700000000"}"#).unwrap();
        assert_eq!(from_str.created_at, 1_700_000_000);

        let from_num: Stamp = serde_json::from_str(r#"{"created_at":42}"#).unwrap();
        assert_eq!(from_num.created_at, 42);
    }

    #[test]
    fn test_int64_missing_or_null_is_zero() {
        let missing: Stamp = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.created_at, 0);

        let null: Stamp = serde_json::from_str(r#"{"created_at":null}"#).unwrap();
        assert_eq!(null.created_at, 0);
    }

    #[test]
    fn test_int64_serializes_as_string() {
        let stamp = Stamp {
            created_at: 7,
            tags: vec![],
        };
        let json = serde_json::to_value(&stamp).unwrap();
        assert_eq!(json["created_at"], "7");
    }

    #[test]
    fn test_int64_rejects_garbage() {
        let result: Result<Stamp, _> = serde_json::from_str(r#"{"created_at":"soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_list_is_empty() {
        let stamp: Stamp = serde_json::from_str(r#"{"tags":null}"#).unwrap();
        assert!(stamp.tags.is_empty());
    }
}
