//! Typed parameter structs for the public operations.
//!
//! The server addresses clients and groups either by numeric id or by
//! case-sensitive name. Every reference type here follows one rule:
//! **id wins** when both are set, and an explicitly empty name is a
//! deliberate "match nothing" sentinel, not "unspecified".

/// Reference to a backup client by id or by case-sensitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRef {
    /// Numeric client id. Takes precedence over `name` when both are set.
    pub id: Option<i64>,
    /// Case-sensitive client name. `Some("")` matches nothing.
    pub name: Option<String>,
}

impl ClientRef {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// True when neither id nor name was supplied.
    pub(crate) fn is_unspecified(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }
}

/// Reference to a client group by id or by case-sensitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRef {
    /// Numeric group id. Takes precedence over `name` when both are set.
    pub id: Option<i64>,
    /// Case-sensitive group name. `Some("")` matches nothing.
    pub name: Option<String>,
}

impl GroupRef {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    pub(crate) fn is_unspecified(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }
}

/// Options for [`crate::UrbackupClient::get_status`].
#[derive(Debug, Clone)]
pub struct StatusOptions {
    /// Restrict to one client; `None` lists all.
    pub client: Option<ClientRef>,
    /// Keep clients marked for removal in the listing. On by default;
    /// name resolution relies on seeing pending-removal entries.
    pub include_removed: bool,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            client: None,
            include_removed: true,
        }
    }
}

/// Options for [`crate::UrbackupClient::get_activities`].
#[derive(Debug, Clone)]
pub struct ActivityOptions {
    /// Restrict to one client; `None` covers all clients.
    pub client: Option<ClientRef>,
    /// Include activities currently running.
    pub include_current: bool,
    /// Include finished (past) activities.
    pub include_past: bool,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            client: None,
            include_current: true,
            include_past: true,
        }
    }
}

/// Options for [`crate::UrbackupClient::get_live_log`].
#[derive(Debug, Clone)]
pub struct LiveLogOptions {
    /// Which client's log to read. Required.
    pub client: ClientRef,
    /// Only lines newer than the last successful fetch for this client.
    /// When false the log is read from the beginning.
    pub recent_only: bool,
}

impl LiveLogOptions {
    pub fn new(client: ClientRef) -> Self {
        Self {
            client,
            recent_only: false,
        }
    }

    pub fn recent(client: ClientRef) -> Self {
        Self {
            client,
            recent_only: true,
        }
    }
}

/// Which kind of backup to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupType {
    FullFile,
    IncrFile,
    FullImage,
    IncrImage,
}

impl BackupType {
    /// Server-side `start_type` value.
    pub(crate) fn as_start_type(self) -> &'static str {
        match self {
            Self::FullFile => "full_file",
            Self::IncrFile => "incr_file",
            Self::FullImage => "full_image",
            Self::IncrImage => "incr_image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_one_side() {
        let r = ClientRef::by_id(5);
        assert_eq!(r.id, Some(5));
        assert!(r.name.is_none());

        let r = ClientRef::by_name("web01");
        assert!(r.id.is_none());
        assert_eq!(r.name.as_deref(), Some("web01"));
        assert!(!r.is_unspecified());
        assert!(ClientRef::default().is_unspecified());
    }

    #[test]
    fn defaults_match_documented_policy() {
        assert!(StatusOptions::default().include_removed);
        let acts = ActivityOptions::default();
        assert!(acts.include_current && acts.include_past);
        assert!(!LiveLogOptions::new(ClientRef::by_id(1)).recent_only);
        assert!(LiveLogOptions::recent(ClientRef::by_id(1)).recent_only);
    }

    #[test]
    fn start_types_match_the_wire_names() {
        assert_eq!(BackupType::FullFile.as_start_type(), "full_file");
        assert_eq!(BackupType::IncrFile.as_start_type(), "incr_file");
        assert_eq!(BackupType::FullImage.as_start_type(), "full_image");
        assert_eq!(BackupType::IncrImage.as_start_type(), "incr_image");
    }
}
