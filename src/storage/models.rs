use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One secret-sharing capability
///
/// `expires_at` and `max_views` never change after creation; `views` only
/// grows, and only through retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Ciphertext of the secret, never the plaintext
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    pub max_views: u32,
    #[serde(default)]
    pub views: u32,
}

impl Link {
    pub fn new(secret: String, expires_at: DateTime<Utc>, max_views: u32) -> Self {
        Self {
            secret,
            expires_at,
            max_views,
            views: 0,
        }
    }

    /// Copy of this link with one more view recorded
    pub fn viewed(&self) -> Self {
        Self {
            views: self.views.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn remaining_views(&self) -> u32 {
        self.max_views.saturating_sub(self.views)
    }
}
