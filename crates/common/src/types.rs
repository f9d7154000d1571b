use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a UUID-backed identifier newtype.
///
/// Wrapping the UUID provides type safety: a supplier id cannot be
/// passed where a deal id is expected, even though both are UUIDs on
/// the wire.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a supplier offer ("deal").
    DealId
}

define_id! {
    /// Unique identifier for a committed order.
    OrderId
}

define_id! {
    /// Unique identifier for a supplier account.
    SupplierId
}

define_id! {
    /// Unique identifier for a vendor (buyer) account.
    VendorId
}

define_id! {
    /// Unique identifier for a buying group of vendors.
    GroupId
}

define_id! {
    /// Unique identifier for a rating row.
    RatingId
}

/// Postal pincode used to scope catalog visibility.
///
/// Kept as an opaque string: deals declare the pincodes they target and
/// buyers see the deals targeting theirs. No format validation is done
/// here; an unknown pincode simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Creates a pincode from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the pincode as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the pincode is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Pincode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Pincode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Pincode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_id_new_creates_unique_ids() {
        let id1 = DealId::new();
        let id2 = DealId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn deal_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = DealId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn ids_are_distinct_types_with_same_wire_shape() {
        let uuid = Uuid::new_v4();
        let supplier = SupplierId::from_uuid(uuid);
        let vendor = VendorId::from_uuid(uuid);

        let s = serde_json::to_string(&supplier).unwrap();
        let v = serde_json::to_string(&vendor).unwrap();
        assert_eq!(s, v);
    }

    #[test]
    fn id_serialization_roundtrip() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn pincode_string_conversion() {
        let pin = Pincode::new("110001");
        assert_eq!(pin.as_str(), "110001");

        let pin2: Pincode = "400050".into();
        assert_eq!(pin2.as_str(), "400050");
    }

    #[test]
    fn pincode_blankness() {
        assert!(Pincode::new("   ").is_blank());
        assert!(Pincode::new("").is_blank());
        assert!(!Pincode::new("560034").is_blank());
    }

    #[test]
    fn pincode_serializes_as_bare_string() {
        let pin = Pincode::new("700019");
        assert_eq!(serde_json::to_string(&pin).unwrap(), "\"700019\"");
    }
}
