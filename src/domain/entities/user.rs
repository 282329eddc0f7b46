use serde::{Deserialize, Serialize};

/// External identity of a dashboard user, taken from the session token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated caller, resolved once at the request boundary.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
}
