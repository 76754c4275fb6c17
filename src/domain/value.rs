use std::fmt;

use serde::Serialize;

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Panel API key (`key`).
///
/// Invariant: non-empty after trimming. `Debug` output never includes the secret.
pub struct ApiKey(String);

impl ApiKey {
    /// Form field name used by the panel (`key`).
    pub const FIELD: &'static str = "key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Panel service id (`service`).
///
/// Stored as returned by the panel; [`crate::domain::AddOrder`] additionally requires it to be positive.
pub struct ServiceId(u64);

impl ServiceId {
    /// Form field name used by the panel (`service`).
    pub const FIELD: &'static str = "service";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Panel order id (`order`).
pub struct OrderId(u64);

impl OrderId {
    /// Form field name for a single order (`order`).
    pub const FIELD: &'static str = "order";
    /// Form field name for a comma-joined batch of orders (`orders`).
    pub const BATCH_FIELD: &'static str = "orders";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Order destination (`link`): a URL, username, video, etc. depending on the service.
///
/// Invariant: non-empty after trimming.
pub struct Link(String);

impl Link {
    /// Form field name used by the panel (`link`).
    pub const FIELD: &'static str = "link";

    /// Create a validated [`Link`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
