//! The client handle and the contract every operation follows.
//!
//! Each public operation runs the same five steps:
//! 1. ensure a live session (fast path or serialized handshake),
//! 2. resolve identity parameters: an explicit id wins over a name; a
//!    name resolves case-sensitively against a fresh full listing
//!    (including delete-pending entries) on every call, never a cache;
//!    an empty-string name short-circuits to "no match" with zero
//!    network traffic,
//! 3. issue the action call(s),
//! 4. validate the response shape (missing field -> `DataIntegrity`),
//! 5. normalize into typed models.
//!
//! A reference that resolves to nothing is an expected outcome, so the
//! operation returns its documented empty value instead of an error.

mod activities;
mod backups;
mod logs;
mod manage;
mod settings;
mod status;

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::auth::Authenticator;
use crate::error::{ApiError, Result};
use crate::models::ClientEntry;
use crate::params::{ClientRef, GroupRef};
use crate::transport::Transport;

pub use activities::ActivityList;
pub use settings::SettingsMap;

/// Handle to one UrBackup server.
///
/// Cheap to share behind an `Arc`; all operations take `&self` and may
/// run concurrently. Only the session and the live-log cursor are
/// mutable, each behind its own lock.
pub struct UrbackupClient {
    transport: Transport,
    auth: Authenticator,
    /// client id -> id of the last delivered live-log line.
    log_cursor: Mutex<HashMap<i64, i64>>,
}

impl UrbackupClient {
    /// Connect to `endpoint` (e.g. `http://backup.example:55414/x`).
    ///
    /// An empty `username` selects anonymous login. No network traffic
    /// happens until the first operation.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(endpoint)?,
            auth: Authenticator::new(username, password),
            log_cursor: Mutex::new(HashMap::new()),
        })
    }

    /// Drop the current session token; the next operation logs in again.
    pub async fn invalidate_session(&self) {
        self.auth.invalidate().await;
    }

    /// Steps 1 and 3 of the contract: authenticate, then call.
    pub(crate) async fn fetch(&self, action: &str, params: &[(&str, String)]) -> Result<Value> {
        let token = self.auth.ensure_logged_in(&self.transport).await?;
        self.transport.call(action, params, Some(&token)).await
    }

    // ── Identity resolution ─────────────────────────────────────────

    /// Resolve a client reference to its listing entry.
    ///
    /// `Ok(None)` is the soft "no such client" outcome. Neither id nor
    /// name supplied is a caller bug and fails validation up front.
    pub(crate) async fn resolve_client(&self, r: &ClientRef) -> Result<Option<ClientEntry>> {
        if r.is_unspecified() {
            return Err(ApiError::Validation(
                "a client id or name is required".into(),
            ));
        }
        if let Some(name) = r.name.as_deref() {
            if r.id.is_none() && name.is_empty() {
                return Ok(None);
            }
        }

        // Always against the current listing, pending-removal included.
        let listing = self.get_clients(None, true).await?;
        if let Some(id) = r.id {
            return Ok(listing.into_iter().find(|c| c.id == id));
        }
        let name = r.name.as_deref().unwrap_or_default();
        Ok(listing.into_iter().find(|c| c.name == name))
    }

    /// Resolve a client reference to an id, skipping the listing call
    /// when an explicit id was given.
    pub(crate) async fn resolve_client_id(&self, r: &ClientRef) -> Result<Option<i64>> {
        if let Some(id) = r.id {
            return Ok(Some(id));
        }
        Ok(self.resolve_client(r).await?.map(|c| c.id))
    }

    /// Resolve a group reference to an id against a fresh group listing.
    pub(crate) async fn resolve_group_id(&self, r: &GroupRef) -> Result<Option<i64>> {
        if let Some(id) = r.id {
            return Ok(Some(id));
        }
        if r.is_unspecified() {
            return Err(ApiError::Validation("a group id or name is required".into()));
        }
        let name = r.name.as_deref().unwrap_or_default();
        if name.is_empty() {
            return Ok(None);
        }
        let groups = self.get_groups().await?;
        Ok(groups.into_iter().find(|g| g.name == name).map(|g| g.id))
    }
}
