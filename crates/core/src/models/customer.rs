use serde::{Deserialize, Serialize};

/// Display name used when the verified identity carries no usable name parts.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Verified caller identity handed over by the authentication layer.
/// The email is the ownership key for vehicles and bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CustomerIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// Resolves the customer display name through the ordered preference
    /// chain: full name, first name only, surname only, [`UNKNOWN_CUSTOMER`].
    /// Whitespace-only name parts count as absent.
    pub fn display_name(&self) -> String {
        let first = self
            .first_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let last = self
            .last_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => UNKNOWN_CUSTOMER.to_string(),
        }
    }
}
