//! Async client for the UrBackup server web control API.
//!
//! The server exposes one HTTP endpoint where every operation is a POST
//! selected by an `a=<action>` query parameter, authenticated by an
//! opaque session token obtained through a challenge-response login
//! (anonymous or salted/iterated password hash). This crate wraps that
//! surface behind typed operations:
//!
//! - status, client and group listings, server identity
//! - storage usage, running and past activities
//! - stored backups and backup triggering
//! - live log retrieval with a recent-only cursor
//! - client lifecycle: add, mark for removal, cancel removal
//! - settings read/write (general, LDAP, mail, users, per-client)
//!
//! ## Sessions
//!
//! The first operation logs in; later operations reuse the token. The
//! handshake is serialized per client instance, so a burst of first
//! calls produces exactly one login exchange. On an authentication
//! failure the session is cleared and the error propagates; re-issuing
//! the operation retries from scratch.
//!
//! ```no_run
//! use urbackup_api::{ClientRef, UrbackupClient};
//!
//! # async fn demo() -> urbackup_api::Result<()> {
//! let api = UrbackupClient::new("http://127.0.0.1:55414/x", "admin", "secret")?;
//! for client in api.get_status(Default::default()).await? {
//!     println!("{} online={}", client.name, client.online);
//! }
//! let backups = api.get_backups(&ClientRef::by_name("web01")).await?;
//! println!("{} file backups", backups.file_backups.len());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod error;
mod hash;
mod json;
mod models;
mod params;
mod transport;

pub use client::{ActivityList, SettingsMap, UrbackupClient};
pub use error::{ApiError, Result};
pub use hash::session_login_hash;
pub use models::{
    Activity, BackupList, ClientEntry, ClientStatus, FileBackup, GroupEntry, ImageBackup,
    LogEntry, PastActivity, ServerIdentity, StartResult, UsageRow, UserEntry,
};
pub use params::{
    ActivityOptions, BackupType, ClientRef, GroupRef, LiveLogOptions, StatusOptions,
};
