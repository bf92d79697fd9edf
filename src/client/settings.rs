//! Settings read/write, admin users and client groups
//! (`settings` action with its `sa` sub-actions).
//!
//! Writes follow a snapshot-merge discipline: fetch the current
//! settings, refuse keys the snapshot does not already contain (a no-op
//! `false`, no save request), overwrite the one key, and post the whole
//! snapshot back. The server expects complete saves; partial posts
//! reset omitted keys to defaults.

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::json::{opt_bool, req_array};
use crate::models::{GroupEntry, UserEntry};
use crate::params::{ClientRef, GroupRef};

use super::UrbackupClient;

/// A settings snapshot as the server sends it: key -> loosely typed
/// value.
pub type SettingsMap = serde_json::Map<String, Value>;

/// Flatten a settings value into its form-encoded representation.
fn form_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

impl UrbackupClient {
    async fn settings_snapshot(&self, params: &[(&str, String)]) -> Result<SettingsMap> {
        let resp = self.fetch("settings", params).await?;
        resp.get("settings")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ApiError::shape("settings: missing `settings` object"))
    }

    /// Post a full snapshot back under the given save sub-action.
    async fn save_snapshot(
        &self,
        snapshot: &SettingsMap,
        extra: &[(&str, String)],
    ) -> Result<bool> {
        let mut form: Vec<(&str, String)> = snapshot
            .iter()
            .map(|(k, v)| (k.as_str(), form_value(v)))
            .collect();
        form.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        let resp = self.fetch("settings", &form).await?;
        Ok(opt_bool(&resp, "saved_ok", true))
    }

    // ── Server-wide settings ────────────────────────────────────────

    /// Current general (server-wide) settings.
    pub async fn get_general_settings(&self) -> Result<SettingsMap> {
        self.settings_snapshot(&[("sa", "general".into())]).await
    }

    /// Overwrite one general setting. Returns false without issuing a
    /// save when `key` is not part of the current snapshot.
    pub async fn set_general_setting(&self, key: &str, value: &str) -> Result<bool> {
        let mut snapshot = self.get_general_settings().await?;
        if !snapshot.contains_key(key) {
            return Ok(false);
        }
        snapshot.insert(key.to_string(), Value::String(value.to_string()));
        self.save_snapshot(&snapshot, &[("sa", "general_save".into())])
            .await
    }

    /// LDAP integration settings.
    pub async fn get_ldap_settings(&self) -> Result<SettingsMap> {
        self.settings_snapshot(&[("sa", "ldap".into())]).await
    }

    /// Mail/notification settings.
    pub async fn get_mail_settings(&self) -> Result<SettingsMap> {
        self.settings_snapshot(&[("sa", "mail".into())]).await
    }

    /// Admin accounts known to the server.
    pub async fn get_users(&self) -> Result<Vec<UserEntry>> {
        let resp = self
            .fetch("settings", &[("sa", "listusers".into())])
            .await?;
        let mut out = Vec::new();
        for row in req_array(&resp, "users")? {
            out.push(UserEntry::from_value(row)?);
        }
        Ok(out)
    }

    // ── Per-client settings ─────────────────────────────────────────

    /// Settings snapshot for one client; `None` when the reference
    /// matches nothing.
    pub async fn get_client_settings(&self, client: &ClientRef) -> Result<Option<SettingsMap>> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(None);
        };
        let snapshot = self
            .settings_snapshot(&[
                ("sa", "clientsettings".into()),
                ("t_clientid", id.to_string()),
            ])
            .await?;
        Ok(Some(snapshot))
    }

    /// Overwrite one client setting, with the same unknown-key no-op
    /// rule as [`Self::set_general_setting`]. Returns false when the
    /// reference matches nothing.
    pub async fn set_client_setting(
        &self,
        client: &ClientRef,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(false);
        };
        let mut snapshot = self
            .settings_snapshot(&[
                ("sa", "clientsettings".into()),
                ("t_clientid", id.to_string()),
            ])
            .await?;
        if !snapshot.contains_key(key) {
            return Ok(false);
        }
        snapshot.insert(key.to_string(), Value::String(value.to_string()));
        self.save_snapshot(
            &snapshot,
            &[
                ("sa", "clientsettings_save".into()),
                ("t_clientid", id.to_string()),
            ],
        )
        .await
    }

    /// The internet authentication key a client needs to connect;
    /// `None` when the reference matches nothing.
    pub async fn get_client_authkey(&self, client: &ClientRef) -> Result<Option<String>> {
        let Some(snapshot) = self.get_client_settings(client).await? else {
            return Ok(None);
        };
        let key = snapshot
            .get("internet_authkey")
            .map(form_value)
            .ok_or_else(|| ApiError::shape("clientsettings: missing `internet_authkey`"))?;
        Ok(Some(key))
    }

    // ── Groups ──────────────────────────────────────────────────────

    /// Client groups defined on the server.
    pub async fn get_groups(&self) -> Result<Vec<GroupEntry>> {
        let resp = self.fetch("settings", &[]).await?;
        let rows = resp
            .get("navitems")
            .and_then(|n| n.get("groups"))
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::shape("settings: missing `navitems.groups`"))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(GroupEntry::from_value(row)?);
        }
        Ok(out)
    }

    /// Look up a group id by exact name. Soft not-found; an empty name
    /// never touches the network.
    pub async fn get_group_id(&self, name: &str) -> Result<Option<i64>> {
        if name.is_empty() {
            return Ok(None);
        }
        let groups = self.get_groups().await?;
        Ok(groups.into_iter().find(|g| g.name == name).map(|g| g.id))
    }

    /// Create a group. Returns false when a group of that name already
    /// exists.
    pub async fn add_group(&self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Err(ApiError::Validation("group name must not be empty".into()));
        }
        let resp = self
            .fetch(
                "settings",
                &[("sa", "groupadd".into()), ("name", name.to_string())],
            )
            .await?;
        Ok(opt_bool(&resp, "add_ok", false))
    }

    /// Delete a group; its members fall back to the default group.
    /// Returns false when the reference matches nothing.
    pub async fn remove_group(&self, group: &GroupRef) -> Result<bool> {
        let Some(id) = self.resolve_group_id(group).await? else {
            return Ok(false);
        };
        let resp = self
            .fetch(
                "settings",
                &[("sa", "groupremove".into()), ("id", id.to_string())],
            )
            .await?;
        Ok(opt_bool(&resp, "delete_ok", false))
    }
}
