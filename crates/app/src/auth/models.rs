//! Auth data models.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::catalog::models::BusinessUuid, uuids::TypedUuid};

/// Type-safe UUID for authenticated callers.
pub type CallerUuid = TypedUuid<Caller>;

/// Marker for customer identities. A customer is a caller acting on their
/// own carts and orders.
#[derive(Debug)]
pub enum Customer {}

/// Type-safe UUID for customers.
pub type CustomerUuid = TypedUuid<Customer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Owner,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub uuid: CallerUuid,
    pub role: Role,

    /// Business the caller works for, when staff or owner.
    #[serde(default)]
    pub business_uuid: Option<BusinessUuid>,
}

impl Caller {
    /// The caller's identity when acting as a customer.
    #[must_use]
    pub const fn customer_uuid(&self) -> CustomerUuid {
        CustomerUuid::from_uuid(self.uuid.into_uuid())
    }

    /// Whether the caller may act as stall staff for the given business.
    #[must_use]
    pub fn is_staff_of(&self, business: BusinessUuid) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Staff | Role::Owner => self.business_uuid == Some(business),
            Role::Customer => false,
        }
    }
}

/// Stored API token, keyed by the token digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiTokenRecord {
    pub caller: Caller,
    pub created_at: Timestamp,
}
