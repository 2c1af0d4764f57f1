//! User identity values consumed from the auth layer

use serde::{Deserialize, Serialize};

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Listener,
    Moderator,
}

/// The signed-in user, as handed to the station by the auth layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub role: UserRole,
}

impl UserIdentity {
    pub fn moderator(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::Moderator,
        }
    }

    pub fn listener(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::Listener,
        }
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self.role, UserRole::Moderator)
    }
}

/// Moderator summary attached to the resolved playback record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderator {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,
}

impl From<&UserIdentity> for Moderator {
    fn from(user: &UserIdentity) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}
