//! 动作描述表：每个远程动作的方法、鉴权与重试策略。
//!
//! # Action Catalog
//!
//! Every remote operation is multiplexed through one endpoint and selected by
//! its action name. Instead of matching names in conditionals, the client
//! looks up an [`ActionDescriptor`] per action:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `method` | `GET` (payload in the query string) or `POST` (payload in a JSON body) |
//! | `requires_auth` | Fail fast with `AuthMissing` when no credential is present |
//! | `retryable` | Whether transient failures of this action may be retried |
//!
//! Actions missing from the catalog are treated as authenticated, retryable reads.
//!
//! ```rust
//! use studio_rpc::actions::ActionCatalog;
//! use studio_rpc::HttpMethod;
//!
//! let catalog = ActionCatalog::dashboard_default();
//! assert_eq!(catalog.resolve("createTask").method, HttpMethod::Post);
//! assert_eq!(catalog.resolve("getTasks").method, HttpMethod::Get);
//! assert_eq!(catalog.resolve("somethingNew").method, HttpMethod::Get);
//! ```

use crate::transport::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transport and resilience policy for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub method: HttpMethod,
    #[serde(default = "default_true")]
    pub requires_auth: bool,
    #[serde(default = "default_true")]
    pub retryable: bool,
}

fn default_true() -> bool {
    true
}

impl ActionDescriptor {
    /// Authenticated, retryable GET.
    pub const fn read() -> Self {
        Self {
            method: HttpMethod::Get,
            requires_auth: true,
            retryable: true,
        }
    }

    /// Authenticated POST that must not be repeated blindly (creates, uploads).
    pub const fn mutation() -> Self {
        Self {
            method: HttpMethod::Post,
            requires_auth: true,
            retryable: false,
        }
    }

    /// Authenticated POST that is safe to repeat (updates, deletes, marks).
    pub const fn idempotent_mutation() -> Self {
        Self {
            method: HttpMethod::Post,
            requires_auth: true,
            retryable: true,
        }
    }

    /// POST used by the sign-in flow, before any credential exists.
    pub const fn sign_in() -> Self {
        Self {
            method: HttpMethod::Post,
            requires_auth: false,
            retryable: false,
        }
    }

    pub const fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub const fn with_requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }
}

impl Default for ActionDescriptor {
    fn default() -> Self {
        Self::read()
    }
}

const DEFAULT_ACTIONS: &[(&str, ActionDescriptor)] = &[
    // auth
    ("sendVerificationCode", ActionDescriptor::sign_in()),
    ("verifyCode", ActionDescriptor::sign_in()),
    ("verifyUser", ActionDescriptor::mutation()),
    ("logout", ActionDescriptor::idempotent_mutation()),
    // dashboard
    ("getDashboardStats", ActionDescriptor::read()),
    ("getDashboardData", ActionDescriptor::read()),
    // tasks
    ("getTasks", ActionDescriptor::read()),
    ("createTask", ActionDescriptor::mutation()),
    ("updateTask", ActionDescriptor::idempotent_mutation()),
    ("deleteTask", ActionDescriptor::idempotent_mutation()),
    // scripts
    ("getScripts", ActionDescriptor::read()),
    ("createScript", ActionDescriptor::mutation()),
    ("updateScript", ActionDescriptor::idempotent_mutation()),
    ("deleteScript", ActionDescriptor::idempotent_mutation()),
    ("approveScript", ActionDescriptor::idempotent_mutation()),
    // production
    ("getProduction", ActionDescriptor::read()),
    ("createProduction", ActionDescriptor::mutation()),
    ("updateProduction", ActionDescriptor::idempotent_mutation()),
    // scheduling
    ("getSchedules", ActionDescriptor::read()),
    ("createSchedule", ActionDescriptor::mutation()),
    ("updateSchedule", ActionDescriptor::idempotent_mutation()),
    ("deleteSchedule", ActionDescriptor::idempotent_mutation()),
    // analytics
    ("getPerformance", ActionDescriptor::read()),
    ("getPerformanceData", ActionDescriptor::read()),
    ("addPerformance", ActionDescriptor::mutation()),
    ("importPerformanceCSV", ActionDescriptor::mutation()),
    // team
    ("getTeamMembers", ActionDescriptor::read()),
    ("createTeamMember", ActionDescriptor::mutation()),
    ("updateTeamMember", ActionDescriptor::idempotent_mutation()),
    ("deleteTeamMember", ActionDescriptor::idempotent_mutation()),
    // notifications
    ("getNotifications", ActionDescriptor::read()),
    ("markNotificationRead", ActionDescriptor::idempotent_mutation()),
    // files
    ("uploadFile", ActionDescriptor::mutation()),
];

/// Lookup table from action name to [`ActionDescriptor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionCatalog {
    entries: HashMap<String, ActionDescriptor>,
}

impl ActionCatalog {
    /// An empty catalog: every action resolves to [`ActionDescriptor::read`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The production dashboard's action set.
    pub fn dashboard_default() -> Self {
        let entries = DEFAULT_ACTIONS
            .iter()
            .map(|(name, d)| ((*name).to_string(), *d))
            .collect();
        Self { entries }
    }

    pub fn with(mut self, action: impl Into<String>, descriptor: ActionDescriptor) -> Self {
        self.insert(action, descriptor);
        self
    }

    pub fn insert(&mut self, action: impl Into<String>, descriptor: ActionDescriptor) {
        self.entries.insert(action.into(), descriptor);
    }

    /// Override or add descriptors, e.g. from configuration.
    pub fn extend(&mut self, overrides: impl IntoIterator<Item = (String, ActionDescriptor)>) {
        self.entries.extend(overrides);
    }

    pub fn get(&self, action: &str) -> Option<&ActionDescriptor> {
        self.entries.get(action)
    }

    /// Descriptor for `action`, falling back to an authenticated read.
    pub fn resolve(&self, action: &str) -> ActionDescriptor {
        self.get(action).copied().unwrap_or_default()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.entries.contains_key(action)
    }

    /// Entries sorted by action name.
    pub fn sorted(&self) -> Vec<(&str, &ActionDescriptor)> {
        let mut v: Vec<_> = self.entries.iter().map(|(k, d)| (k.as_str(), d)).collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
