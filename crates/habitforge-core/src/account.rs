//! User accounts, as far as habits need them.
//!
//! Credential material and verification workflows are handled by the host
//! platform's auth stack; this module only carries the ownership anchor
//! and the reminder recipient address.

use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Row id, assigned by storage.
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Contact address for reminders. Users without one are silently
    /// skipped by the scheduler.
    pub email: Option<String>,
}

impl User {
    /// The deliverable address, if the user has a non-empty one.
    pub fn contact_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_email_is_not_deliverable() {
        let user = User {
            id: 1,
            username: "ana".into(),
            email: Some(String::new()),
        };
        assert_eq!(user.contact_email(), None);

        let user = User {
            email: Some("ana@example.com".into()),
            ..user
        };
        assert_eq!(user.contact_email(), Some("ana@example.com"));
    }
}
