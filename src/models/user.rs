//! Session user model.

use serde::{Deserialize, Serialize};

/// The signed-in user. No credentials are stored or checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name.
    pub username: String,
    /// Whether the user may edit listings.
    pub is_admin: bool,
    /// Loyalty level, starting at 1.
    pub level: u32,
    /// Experience points.
    pub xp: u64,
}
