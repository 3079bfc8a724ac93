use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, DomainError, DomainResult, Entity, ValueObject};

storefront_core::define_id!(
    /// Member identifier.
    MemberId
);

/// Postal address (free-form fields, no format validation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            zipcode: zipcode.into(),
        }
    }
}

impl ValueObject for Address {}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} ({})", self.city, self.street, self.zipcode)
    }
}

/// Aggregate root: Member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
    address: Address,
}

impl Member {
    /// Register a member. The name is trimmed and must not be blank.
    pub fn register(id: MemberId, name: impl Into<String>, address: Address) -> DomainResult<Self> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("member name cannot be empty"));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            address,
        })
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current address; orders copy it into their delivery snapshot.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Member {
    const AGGREGATE_TYPE: &'static str = "members.member";
}
