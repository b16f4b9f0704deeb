//! Session/Identity Store.
//!
//! Sign-in is a local state write: no credentials exist and nothing is
//! checked beyond a non-empty username.

use crate::error::{Result, StorefrontError};
use crate::models::User;

/// Holds the optional signed-in user.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    /// Usernames granted admin rights on sign-in.
    admins: Vec<String>,
    /// The signed-in user.
    current: Option<User>,
}

impl SessionStore {
    /// Creates a signed-out store that grants admin rights to `admins`.
    #[inline]
    #[must_use]
    pub const fn new(admins: Vec<String>) -> Self {
        Self {
            admins,
            current: None,
        }
    }

    /// Signs in an existing user at level 1 with 100 xp.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidUsername`] for a blank username.
    #[inline]
    pub fn login(&mut self, username: &str) -> Result<&User> {
        self.start(username, 100)
    }

    /// Registers and signs in a new user at level 1 with no xp.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidUsername`] for a blank username.
    #[inline]
    pub fn register(&mut self, username: &str) -> Result<&User> {
        self.start(username, 0)
    }

    /// Signs out. Returns the user that was signed in, if any.
    #[inline]
    pub fn logout(&mut self) -> Option<User> {
        let user = self.current.take();
        if let Some(ref signed_out) = user {
            tracing::debug!(user = %signed_out.username, "signed out");
        }
        user
    }

    /// The signed-in user.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Returns `true` if an admin is signed in.
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(|user| user.is_admin)
    }

    /// Replaces the current user.
    fn start(&mut self, username: &str, xp: u64) -> Result<&User> {
        let name = username.trim();
        if name.is_empty() {
            return Err(StorefrontError::InvalidUsername);
        }
        let is_admin = self.admins.iter().any(|admin| admin == name);
        tracing::debug!(user = name, is_admin, "signed in");
        let user = self.current.insert(User {
            username: name.to_owned(),
            is_admin,
            level: 1,
            xp,
        });
        Ok(&*user)
    }
}
