//! Session: the signed-in user, their credential and role-based access
//!
//! The session is persisted as JSON under [`SESSION_STORAGE_KEY`] so that a
//! reload restores it before the profile check confirms the credential.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::KeyValueStore;
use crate::{Error, Result};

/// Local storage key of the persisted session
pub const SESSION_STORAGE_KEY: &str = "libris-session";

// ============================================================================
// Roles
// ============================================================================

/// User role as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(alias = "super_admin", alias = "superadmin", alias = "SUPERADMIN")]
    SuperAdmin,
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "student", alias = "USER", alias = "user")]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    /// Staff roles manage the catalog
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Route guard
    pub fn can_access(&self, area: Area) -> bool {
        match area {
            Area::Catalog | Area::Profile => true,
            Area::Administrators => *self == Role::SuperAdmin,
            Area::Dashboard
            | Area::Books
            | Area::Categories
            | Area::Bookings
            | Area::Students
            | Area::Notifications => self.is_staff(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "student" | "user" => Ok(Role::Student),
            other => Err(Error::Other(format!("unknown role: {}", other))),
        }
    }
}

/// Guarded areas of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Dashboard,
    Books,
    Categories,
    Bookings,
    Students,
    Administrators,
    Notifications,
    Profile,
    Catalog,
}

impl Area {
    /// Path segment after the locale
    pub fn path(&self) -> &'static str {
        match self {
            Area::Dashboard => "dashboard",
            Area::Books => "books",
            Area::Categories => "categories",
            Area::Bookings => "bookings",
            Area::Students => "students",
            Area::Administrators => "admins",
            Area::Notifications => "notifications",
            Area::Profile => "profile",
            Area::Catalog => "catalog",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        [
            Area::Dashboard,
            Area::Books,
            Area::Categories,
            Area::Bookings,
            Area::Students,
            Area::Administrators,
            Area::Notifications,
            Area::Profile,
            Area::Catalog,
        ]
        .into_iter()
        .find(|a| a.path() == segment)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: u64,
    #[serde(alias = "name")]
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl SessionUser {
    /// Up to two initials for the avatar placeholder
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Persisted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
}

/// Session lifecycle over a key-value store
#[derive(Debug)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    current: Option<Session>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Load the persisted session, if any
    pub fn restore(&mut self) -> Option<&Session> {
        self.current = self.store.get_json::<Session>(SESSION_STORAGE_KEY);
        if let Some(session) = &self.current {
            debug!(user_id = session.user.id, "Restored session");
        }
        self.current.as_ref()
    }

    pub fn sign_in(&mut self, user: SessionUser, token: impl Into<String>) -> Result<()> {
        let session = Session {
            user,
            token: token.into(),
        };
        self.store.set_json(SESSION_STORAGE_KEY, &session)?;
        info!(user_id = session.user.id, role = %session.user.role, "Signed in");
        self.current = Some(session);
        Ok(())
    }

    /// Replace the user after a profile refresh or edit
    pub fn update_user(&mut self, user: SessionUser) -> Result<()> {
        let session = self.current.as_mut().ok_or(Error::NotAuthenticated)?;
        session.user = user;
        self.store.set_json(SESSION_STORAGE_KEY, &*session)?;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.current.take() {
            info!(user_id = session.user.id, "Signed out");
        }
        self.store.remove(SESSION_STORAGE_KEY)
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_access(&self, area: Area) -> bool {
        self.user().map(|u| u.role.can_access(area)).unwrap_or(false)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn admin() -> SessionUser {
        SessionUser {
            id: 7,
            full_name: "Dilnoza Karimova".into(),
            role: Role::Admin,
            phone: Some("+998901234567".into()),
            avatar: None,
        }
    }

    #[test]
    fn test_role_decoding() {
        let role: Role = serde_json::from_str("\"SUPER_ADMIN\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_guards() {
        assert!(Role::SuperAdmin.can_access(Area::Administrators));
        assert!(!Role::Admin.can_access(Area::Administrators));
        assert!(Role::Admin.can_access(Area::Books));
        assert!(!Role::Student.can_access(Area::Books));
        assert!(Role::Student.can_access(Area::Catalog));
        assert_eq!(Area::from_path("admins"), Some(Area::Administrators));
        assert_eq!(Area::from_path("nope"), None);
    }

    #[test]
    fn test_user_decodes_name_alias() {
        let user: SessionUser =
            serde_json::from_str(r#"{"id":1,"name":"Ali Valiyev","role":"STUDENT"}"#).unwrap();
        assert_eq!(user.full_name, "Ali Valiyev");
        assert_eq!(user.initials(), "AV");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_session_lifecycle() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert!(sessions.restore().is_none());
        assert!(!sessions.can_access(Area::Catalog));

        sessions.sign_in(admin(), "jwt-token").unwrap();
        assert!(sessions.is_authenticated());
        assert_eq!(sessions.token(), Some("jwt-token"));

        let mut reloaded = SessionStore::new(MemoryStore::new());
        reloaded
            .store()
            .set(SESSION_STORAGE_KEY, &sessions.store().get(SESSION_STORAGE_KEY).unwrap())
            .unwrap();
        assert_eq!(reloaded.restore().map(|s| s.user.id), Some(7));

        sessions.logout().unwrap();
        assert!(!sessions.is_authenticated());
        assert!(sessions.store().get(SESSION_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_update_user_requires_session() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert!(matches!(
            sessions.update_user(admin()),
            Err(Error::NotAuthenticated)
        ));

        sessions.sign_in(admin(), "t").unwrap();
        let mut user = admin();
        user.full_name = "Dilnoza K.".into();
        sessions.update_user(user).unwrap();
        assert_eq!(sessions.user().unwrap().full_name, "Dilnoza K.");
        assert!(sessions
            .store()
            .get(SESSION_STORAGE_KEY)
            .unwrap()
            .contains("Dilnoza K."));
    }
}
