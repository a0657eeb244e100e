//! Newtype IDs for type-safe entity references.
//!
//! Directory ids are opaque strings such as `salon-001` or
//! `staff-3f2a9c1e`. The `define_id!` macro keeps salon, account and staff
//! ids from being mixed up at call sites.

use uuid::Uuid;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `into_inner()` and `Display`
/// - `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use barberdesk_core::define_id;
/// define_id!(ChairId);
/// define_id!(BookingId);
///
/// let chair = ChairId::new("chair-1");
/// assert_eq!(chair.as_str(), "chair-1");
///
/// // These are different types, so this won't compile:
/// // let _: BookingId = chair;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(SalonId);
define_id!(AccountId);
define_id!(StaffId);

impl StaffId {
    /// Generate a fresh staff id of the form `staff-<8 hex chars>`.
    ///
    /// Uniqueness against existing rows is the directory's job; this only
    /// makes collisions unlikely.
    #[must_use]
    pub fn generate() -> Self {
        let short: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        Self(format!("staff-{short}"))
    }

    /// The id of the auth account paired with this staff member.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId(self.0.clone())
    }
}

impl From<StaffId> for AccountId {
    fn from(id: StaffId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_staff_ids_have_prefix() {
        let id = StaffId::generate();
        assert!(id.as_str().starts_with("staff-"));
        assert_eq!(id.as_str().len(), "staff-".len() + 8);
    }

    #[test]
    fn test_generated_staff_ids_differ() {
        assert_ne!(StaffId::generate(), StaffId::generate());
    }

    #[test]
    fn test_staff_id_pairs_with_account_id() {
        let staff = StaffId::new("staff-001");
        assert_eq!(staff.account_id(), AccountId::new("staff-001"));
        assert_eq!(AccountId::from(staff), AccountId::new("staff-001"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = SalonId::new("salon-001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"salon-001\"");
    }
}
