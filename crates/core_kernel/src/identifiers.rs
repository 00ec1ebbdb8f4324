//! Typed identifiers for vouchers, orders, accounts and payments
//!
//! Each identifier is a UUID newtype rendered with a short prefix
//! (`VCH-…`, `ORD-…`). Parsing accepts both the prefixed and the bare form,
//! since the console passes raw UUIDs in query strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// Parses a comma-separated list, ignoring empty segments
            pub fn parse_list(s: &str) -> Result<Vec<Self>, uuid::Error> {
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(Self::from_str)
                    .collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Voucher domain identifiers
define_id!(VoucherId, "VCH");

// Billing domain identifiers
define_id!(OrderId, "ORD");
define_id!(AccountId, "ACC");
define_id!(PaymentId, "PAY");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_id_display() {
        let id = VoucherId::new();
        let display = id.to_string();
        assert!(display.starts_with("VCH-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = OrderId::new_v7();
        let parsed: OrderId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let account_id = AccountId::from(uuid);
        let back: Uuid = account_id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_parse_list_accepts_mixed_forms() {
        let a = VoucherId::new();
        let b = VoucherId::new();
        let input = format!("{}, {},", a, b.as_uuid());
        let parsed = VoucherId::parse_list(&input).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn test_ids_serialize_as_bare_uuid() {
        let id = PaymentId::new_v7();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: PaymentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
