//! Strongly-typed identifiers.
//!
//! Bounded contexts declare their own UUID newtypes and derive the shared
//! behavior with [`impl_uuid_newtype!`](crate::impl_uuid_newtype):
//!
//! ```ignore
//! #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
//! #[serde(transparent)]
//! pub struct RecordId(Uuid);
//!
//! aqua_core::impl_uuid_newtype!(RecordId, "RecordId");
//! ```

/// Implements construction, conversion, `Display` and `FromStr` for a
/// single-field UUID newtype.
#[macro_export]
macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self($crate::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::Uuid> for $t {
            fn from(value: $crate::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <$crate::Uuid as core::str::FromStr>::from_str(s)
                    .map_err(|e| $crate::IdError::new($name, e.to_string()))?;
                Ok(Self(uuid))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    struct SampleId(Uuid);

    crate::impl_uuid_newtype!(SampleId, "SampleId");

    #[test]
    fn parses_and_displays_round_trip() {
        let id = SampleId::new();
        let parsed = SampleId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_failure_names_the_id_type() {
        let err = SampleId::from_str("not-a-uuid").unwrap_err();
        assert_eq!(err.id_type(), "SampleId");
        assert!(err.to_string().contains("SampleId"));
    }
}
