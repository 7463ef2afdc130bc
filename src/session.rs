//! Session context: the bearer credential and the signed-in user's profile.
//!
//! The client never reaches for ambient global state. It reads the credential
//! through an injected [`SessionStore`] once per call and clears it when the
//! backend rejects the session.

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque bearer token. Never inspected, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Creator,
    Editor,
    Viewer,
    /// Any role name the dashboard does not know; grants nothing.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Dashboard modules the role may open. `"all"` grants everything.
    pub fn modules(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &["all"],
            Role::Manager => &["scripts", "production", "scheduling", "analytics", "team"],
            Role::Creator => &["scripts", "production", "scheduling"],
            Role::Editor => &["production", "scheduling"],
            Role::Viewer => &["analytics"],
            Role::Unknown => &[],
        }
    }

    pub fn can_access(&self, module: &str) -> bool {
        self.modules().iter().any(|m| *m == "all" || *m == module)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub role: Role,
}

impl UserProfile {
    pub fn has_permission(&self, module: &str) -> bool {
        self.role.can_access(module)
    }
}

/// Read/set/clear access to the session slot.
///
/// Implementations must make `clear` a single atomic step: a call that reads
/// the credential after a clear observes no credential.
pub trait SessionStore: Send + Sync {
    fn credential(&self) -> Option<Credential>;
    fn profile(&self) -> Option<UserProfile>;
    fn sign_in(&self, credential: Credential, profile: Option<UserProfile>);
    fn clear(&self);

    fn is_signed_in(&self) -> bool {
        self.credential().is_some()
    }

    /// `false` when signed out or when the role lacks access to `module`.
    fn has_permission(&self, module: &str) -> bool {
        self.profile()
            .map(|p| p.has_permission(module))
            .unwrap_or(false)
    }
}

#[derive(Debug)]
struct SessionState {
    credential: Credential,
    profile: Option<UserProfile>,
}

/// In-process session backed by an atomically swapped snapshot.
#[derive(Default)]
pub struct MemorySession {
    state: ArcSwapOption<SessionState>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(credential: impl Into<Credential>, profile: Option<UserProfile>) -> Self {
        let session = Self::new();
        session.sign_in(credential.into(), profile);
        session
    }
}

impl SessionStore for MemorySession {
    fn credential(&self) -> Option<Credential> {
        self.state.load_full().map(|s| s.credential.clone())
    }

    fn profile(&self) -> Option<UserProfile> {
        self.state.load_full().and_then(|s| s.profile.clone())
    }

    fn sign_in(&self, credential: Credential, profile: Option<UserProfile>) {
        self.state.store(Some(Arc::new(SessionState {
            credential,
            profile,
        })));
    }

    fn clear(&self) {
        self.state.store(None);
    }
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

/// Durable home of the credential across process runs (an OS keyring, a
/// file). Failures are the implementation's to log; the session keeps going.
pub trait CredentialVault: Send + Sync {
    fn load(&self) -> Option<Credential>;
    fn save(&self, credential: &Credential);
    fn remove(&self);
}

/// A [`MemorySession`] mirrored into a [`CredentialVault`].
///
/// Seeded from the vault on open. `sign_in` writes through and `clear`
/// removes the stored credential, so a rejected session is not resent by the
/// next process.
pub struct PersistedSession<V> {
    memory: MemorySession,
    vault: V,
}

impl<V: CredentialVault> PersistedSession<V> {
    pub fn open(vault: V) -> Self {
        let memory = match vault.load() {
            Some(credential) => MemorySession::signed_in(credential, None),
            None => MemorySession::new(),
        };
        Self { memory, vault }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }
}

impl<V: CredentialVault> SessionStore for PersistedSession<V> {
    fn credential(&self) -> Option<Credential> {
        self.memory.credential()
    }

    fn profile(&self) -> Option<UserProfile> {
        self.memory.profile()
    }

    fn sign_in(&self, credential: Credential, profile: Option<UserProfile>) {
        self.vault.save(&credential);
        self.memory.sign_in(credential, profile);
    }

    fn clear(&self) {
        self.memory.clear();
        self.vault.remove();
    }
}

impl<V> fmt::Debug for PersistedSession<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("memory", &self.memory)
            .finish()
    }
}
