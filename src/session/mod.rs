//! Auth collaborator
//!
//! The shell does not authenticate anyone. It reads a status, gates
//! rendering on it and forwards logout.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

/// Snapshot of the auth collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthStatus {
    pub fn loading() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn authenticated() -> Self {
        Self {
            is_authenticated: true,
            is_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

pub trait AuthProvider: Send + Sync {
    fn status(&self) -> AuthStatus;
    fn logout(&self);
}

/// What the shell should render for an auth status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum GateDecision {
    /// Auth still resolving: spinner only
    Loading,
    /// Signed out: send the user to the login surface
    Redirect(String),
    /// Render the full shell
    Render,
}

impl GateDecision {
    pub fn evaluate(status: AuthStatus, login_path: &str) -> Self {
        if status.is_loading {
            GateDecision::Loading
        } else if !status.is_authenticated {
            GateDecision::Redirect(login_path.to_string())
        } else {
            GateDecision::Render
        }
    }
}

/// Auth provider whose status is set by the host (or by tests)
#[derive(Debug, Default)]
pub struct StaticAuth {
    status: RwLock<AuthStatus>,
}

impl StaticAuth {
    pub fn new(status: AuthStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    pub fn set_status(&self, status: AuthStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

impl AuthProvider for StaticAuth {
    fn status(&self) -> AuthStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn logout(&self) {
        self.set_status(AuthStatus::signed_out());
    }
}
