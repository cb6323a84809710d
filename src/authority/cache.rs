//! Node-local snapshots of users and roles.

use std::sync::Arc;

use dashmap::DashMap;

use crate::types::{Principal, Role, User};

/// Concurrent `name -> snapshot` maps for users and roles.
///
/// Values are published as whole `Arc`s, so a reader holding a snapshot sees
/// one consistent principal no matter what writers do afterwards.
#[derive(Debug, Default)]
pub struct AuthorityCache {
    users: DashMap<String, Arc<User>>,
    roles: DashMap<String, Arc<Role>>,
}

impl AuthorityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_user(&self, user: User) {
        self.users.insert(user.name().to_string(), Arc::new(user));
    }

    pub fn put_role(&self, role: Role) {
        self.roles.insert(role.name().to_string(), Arc::new(role));
    }

    #[must_use]
    pub fn get_user(&self, name: &str) -> Option<Arc<User>> {
        self.users.get(name).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn get_role(&self, name: &str) -> Option<Arc<Role>> {
        self.roles.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Drops `username` and, when `rolename` is non-empty, that role too.
    /// Returns whether anything was removed.
    pub fn invalidate(&self, username: &str, rolename: &str) -> bool {
        let mut removed = self.users.remove(username).is_some();
        if !rolename.is_empty() {
            removed |= self.roles.remove(rolename).is_some();
        }
        removed
    }

    pub fn invalidate_all(&self) {
        self.users.clear();
        self.roles.clear();
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
