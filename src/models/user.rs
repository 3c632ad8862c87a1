//! User identity models.

use serde::{Deserialize, Serialize};

/// Google account identity asserted by a verified ID token.
#[derive(Debug, Clone)]
pub struct GoogleUser {
    /// Google account subject (stable user ID)
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// User payload echoed by login and verify-token responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    /// Profile picture URL (the frontend calls this `image`)
    pub image: Option<String>,
}

impl From<&GoogleUser> for SessionUser {
    fn from(user: &GoogleUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            image: user.picture.clone(),
        }
    }
}
