//! Session boundary for the external auth provider.
//!
//! # Responsibility
//! - Expose the current identity (or none) plus sign-in/sign-out
//!   transitions behind a trait, so the store receives identity by explicit
//!   injection rather than ambient global state.
//!
//! The OAuth flow itself lives outside this crate; implementations here
//! only hold the resolved identity.

use crate::model::user::User;

/// Identity source injected into store callers.
pub trait SessionProvider {
    /// Current signed-in identity, or `None` when signed out.
    fn current_user(&self) -> Option<&User>;

    /// Records a completed sign-in.
    fn sign_in(&mut self, user: User);

    /// Drops the current identity.
    fn sign_out(&mut self);
}

/// In-process session holder for CLI and test runs.
#[derive(Default)]
pub struct LocalSession {
    user: Option<User>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionProvider for LocalSession {
    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    fn sign_out(&mut self) {
        self.user = None;
    }
}
