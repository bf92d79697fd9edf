//! Normalized domain rows.
//!
//! The server's field names are terse and occasionally renamed between
//! releases (`pcdone`, `lastbackup`, `groupname`, ...). Each model here
//! owns the mapping from the wire shape to stable, typed fields; numbers
//! and booleans come out typed even when the server sends them as
//! strings. Parsers raise `DataIntegrity` only for fields an entry is
//! useless without; cosmetic fields default.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::json::{opt_bool, opt_f64, opt_i64, opt_str, req_i64, req_str};

/// Server identity and version, from the `status` action.
#[derive(Debug, Clone, Serialize)]
pub struct ServerIdentity {
    /// Opaque server identity string clients authenticate against.
    pub identity: String,
    /// Human-readable version, e.g. `2.5.33`.
    pub version_string: String,
    /// Numeric version for comparisons.
    pub version_number: i64,
}

impl ServerIdentity {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            identity: req_str(v, "server_identity")?.to_string(),
            version_string: opt_str(v, "curr_version_str").unwrap_or_default().to_string(),
            version_number: opt_i64(v, "curr_version_num").unwrap_or(0),
        })
    }
}

/// One row of the `status` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStatus {
    pub id: i64,
    pub name: String,
    pub group_name: String,
    pub online: bool,
    /// Last seen address, empty when the client was never online.
    pub ip: String,
    pub client_version: String,
    pub os: String,
    /// Epoch seconds of the last file backup; `None` when never run.
    pub last_file_backup: Option<i64>,
    /// Epoch seconds of the last image backup; `None` when never run.
    pub last_image_backup: Option<i64>,
    pub file_backup_ok: bool,
    pub image_backup_ok: bool,
    /// Marked for removal but not yet purged.
    pub delete_pending: bool,
}

impl ClientStatus {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        // lastbackup == 0 means "never ran", not 1970.
        let last_file = opt_i64(v, "lastbackup").filter(|t| *t > 0);
        let last_image = opt_i64(v, "lastbackup_image").filter(|t| *t > 0);
        Ok(Self {
            id: req_i64(v, "id")?,
            name: req_str(v, "name")?.to_string(),
            group_name: opt_str(v, "groupname").unwrap_or_default().to_string(),
            online: opt_bool(v, "online", false),
            ip: opt_str(v, "ip").unwrap_or_default().to_string(),
            client_version: opt_str(v, "client_version_string")
                .unwrap_or_default()
                .to_string(),
            os: opt_str(v, "os_version_string").unwrap_or_default().to_string(),
            last_file_backup: last_file,
            last_image_backup: last_image,
            file_backup_ok: opt_bool(v, "file_ok", false),
            image_backup_ok: opt_bool(v, "image_ok", false),
            delete_pending: opt_bool(v, "delete_pending", false),
        })
    }
}

/// Slim listing entry (id/name/group), from `status` plus
/// `extra_clients`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientEntry {
    pub id: i64,
    pub name: String,
    pub group_name: String,
    pub delete_pending: bool,
}

impl ClientEntry {
    pub(crate) fn from_status_row(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            name: req_str(v, "name")?.to_string(),
            group_name: opt_str(v, "groupname").unwrap_or_default().to_string(),
            delete_pending: opt_bool(v, "delete_pending", false),
        })
    }

    /// `extra_clients` rows carry a hostname instead of a name and no
    /// group membership yet.
    pub(crate) fn from_extra_row(v: &Value) -> Result<Self> {
        Ok(Self {
            id: opt_i64(v, "id").unwrap_or(0),
            name: req_str(v, "hostname")?.to_string(),
            group_name: String::new(),
            delete_pending: false,
        })
    }
}

/// Per-client storage usage, from the `usage` action.
#[derive(Debug, Clone, Serialize)]
pub struct UsageRow {
    pub client_name: String,
    /// Bytes used by file backups.
    pub file_bytes: f64,
    /// Bytes used by image backups.
    pub image_bytes: f64,
    /// Total bytes used.
    pub total_bytes: f64,
}

impl UsageRow {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            client_name: req_str(v, "name")?.to_string(),
            file_bytes: opt_f64(v, "files"),
            image_bytes: opt_f64(v, "images"),
            total_bytes: opt_f64(v, "used"),
        })
    }
}

/// A running activity, from the `progress` action.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    /// Activity id, needed to stop it.
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    /// What is running, e.g. `incr_file`.
    pub action: String,
    /// Percent done, -1 while still indexing.
    pub percent_done: i64,
    pub queued_files: i64,
    pub done_bytes: f64,
    pub total_bytes: f64,
    pub paused: bool,
}

impl Activity {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: opt_i64(v, "id").unwrap_or(0),
            client_id: req_i64(v, "clientid")?,
            client_name: opt_str(v, "name").unwrap_or_default().to_string(),
            action: opt_str(v, "action").unwrap_or_default().to_string(),
            percent_done: opt_i64(v, "pcdone").unwrap_or(-1),
            queued_files: opt_i64(v, "queue").unwrap_or(0),
            done_bytes: opt_f64(v, "done_bytes"),
            total_bytes: opt_f64(v, "total_bytes"),
            paused: opt_bool(v, "paused", false),
        })
    }
}

/// A finished activity, from the `lastacts` array of `progress`.
#[derive(Debug, Clone, Serialize)]
pub struct PastActivity {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    /// Wall-clock duration in seconds.
    pub duration_secs: i64,
    pub size_bytes: f64,
    /// Epoch seconds the backup started.
    pub backup_time: i64,
    pub incremental: bool,
    /// Image backup as opposed to file backup.
    pub image: bool,
    pub restore: bool,
    /// The activity deleted data (e.g. nightly cleanup).
    pub deletion: bool,
}

impl PastActivity {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            client_id: req_i64(v, "clientid")?,
            client_name: opt_str(v, "name").unwrap_or_default().to_string(),
            duration_secs: opt_i64(v, "duration").unwrap_or(0),
            size_bytes: opt_f64(v, "size_bytes"),
            backup_time: opt_i64(v, "backuptime").unwrap_or(0),
            incremental: opt_i64(v, "incremental").unwrap_or(0) > 0,
            image: opt_bool(v, "image", false),
            restore: opt_bool(v, "restore", false),
            deletion: opt_bool(v, "del", false),
        })
    }
}

/// A stored file backup, from the `backups` action.
#[derive(Debug, Clone, Serialize)]
pub struct FileBackup {
    pub id: i64,
    /// Epoch seconds.
    pub backup_time: i64,
    pub incremental: bool,
    pub size_bytes: f64,
    pub archived: bool,
}

impl FileBackup {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            backup_time: opt_i64(v, "backuptime").unwrap_or(0),
            incremental: opt_i64(v, "incremental").unwrap_or(0) > 0,
            size_bytes: opt_f64(v, "size_bytes"),
            archived: opt_bool(v, "archived", false),
        })
    }
}

/// A stored image backup, from the `backups` action.
#[derive(Debug, Clone, Serialize)]
pub struct ImageBackup {
    pub id: i64,
    /// Epoch seconds.
    pub backup_time: i64,
    pub incremental: bool,
    pub size_bytes: f64,
    /// Imaged volume, e.g. `C:`.
    pub volume: String,
    pub archived: bool,
}

impl ImageBackup {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            backup_time: opt_i64(v, "backuptime").unwrap_or(0),
            incremental: opt_i64(v, "incremental").unwrap_or(0) > 0,
            size_bytes: opt_f64(v, "size_bytes"),
            volume: opt_str(v, "letter").unwrap_or_default().to_string(),
            archived: opt_bool(v, "archived", false),
        })
    }
}

/// Both backup lists for one client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupList {
    pub file_backups: Vec<FileBackup>,
    pub image_backups: Vec<ImageBackup>,
}

/// Outcome of a `start_backup` request, one row per addressed client.
#[derive(Debug, Clone, Serialize)]
pub struct StartResult {
    pub client_id: i64,
    pub started: bool,
}

impl StartResult {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            client_id: req_i64(v, "clientid")?,
            started: opt_bool(v, "start_ok", false),
        })
    }
}

/// One live-log line, from the `livelog` action.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Monotonically increasing per client; drives recent-only fetches.
    pub id: i64,
    /// Epoch seconds.
    pub time: i64,
    /// 0 = info, 1 = warning, 2 = error.
    pub level: i64,
    pub message: String,
}

impl LogEntry {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            time: opt_i64(v, "time").unwrap_or(0),
            level: opt_i64(v, "level")
                .or_else(|| opt_i64(v, "loglevel"))
                .unwrap_or(0),
            message: opt_str(v, "msg")
                .or_else(|| opt_str(v, "message"))
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// An admin account, from `settings` sa=listusers.
#[derive(Debug, Clone, Serialize)]
pub struct UserEntry {
    pub id: i64,
    pub name: String,
}

impl UserEntry {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            name: req_str(v, "name")?.to_string(),
        })
    }
}

/// A client group, from the settings navigation payload.
#[derive(Debug, Clone, Serialize)]
pub struct GroupEntry {
    pub id: i64,
    pub name: String,
}

impl GroupEntry {
    pub(crate) fn from_value(v: &Value) -> Result<Self> {
        Ok(Self {
            id: req_i64(v, "id")?,
            name: req_str(v, "name")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_status_normalizes_loose_encodings() {
        let v = json!({
            "id": "7",
            "name": "web01",
            "groupname": "prod",
            "online": 1,
            "ip": "10.0.0.5",
            "lastbackup": 1700000000i64,
            "lastbackup_image": 0,
            "file_ok": "true",
            "image_ok": false,
            "delete_pending": "1",
        });
        let c = ClientStatus::from_value(&v).unwrap();
        assert_eq!(c.id, 7);
        assert!(c.online);
        assert_eq!(c.last_file_backup, Some(1700000000));
        assert_eq!(c.last_image_backup, None);
        assert!(c.file_backup_ok);
        assert!(!c.image_backup_ok);
        assert!(c.delete_pending);
    }

    #[test]
    fn client_status_requires_id_and_name() {
        let err = ClientStatus::from_value(&json!({"name": "x"})).unwrap_err();
        assert!(err.to_string().contains("`id`"));
        let err = ClientStatus::from_value(&json!({"id": 1})).unwrap_err();
        assert!(err.to_string().contains("`name`"));
    }

    #[test]
    fn extra_client_rows_use_hostname() {
        let e = ClientEntry::from_extra_row(&json!({"hostname": "new-box"})).unwrap();
        assert_eq!(e.id, 0);
        assert_eq!(e.name, "new-box");
        assert!(!e.delete_pending);
    }

    #[test]
    fn past_activity_decodes_flags() {
        let v = json!({
            "id": 12, "clientid": 3, "name": "db01",
            "duration": 120, "size_bytes": "4096.0",
            "backuptime": 1700000100i64,
            "incremental": 1, "image": 0, "restore": 0, "del": true,
        });
        let a = PastActivity::from_value(&v).unwrap();
        assert!(a.incremental);
        assert!(!a.image);
        assert!(a.deletion);
        assert_eq!(a.size_bytes, 4096.0);
    }

    #[test]
    fn log_entry_accepts_either_field_spelling() {
        let a = LogEntry::from_value(&json!({"id": 1, "loglevel": 2, "msg": "boom"})).unwrap();
        assert_eq!(a.level, 2);
        assert_eq!(a.message, "boom");
        let b = LogEntry::from_value(&json!({"id": 2, "level": 1, "message": "warn"})).unwrap();
        assert_eq!(b.level, 1);
        assert_eq!(b.message, "warn");
    }

    #[test]
    fn start_result_defaults_to_not_started() {
        let r = StartResult::from_value(&json!({"clientid": 4})).unwrap();
        assert!(!r.started);
    }
}
