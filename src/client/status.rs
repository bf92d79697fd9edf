//! Status and listing operations (`status` action).

use crate::error::Result;
use crate::json::req_array;
use crate::models::{ClientEntry, ClientStatus, ServerIdentity};
use crate::params::StatusOptions;

use super::UrbackupClient;

impl UrbackupClient {
    /// Server identity string and version.
    pub async fn get_server_identity(&self) -> Result<ServerIdentity> {
        let resp = self.fetch("status", &[]).await?;
        ServerIdentity::from_value(&resp)
    }

    /// Full status rows, optionally restricted to one client.
    ///
    /// With `include_removed` false (non-default), clients marked for
    /// removal are filtered out. A client reference that matches nothing
    /// returns an empty vec.
    pub async fn get_status(&self, opts: StatusOptions) -> Result<Vec<ClientStatus>> {
        let only_id = match &opts.client {
            Some(r) => match self.resolve_client_id(r).await? {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let resp = self.fetch("status", &[]).await?;
        let rows = req_array(&resp, "status")?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let status = ClientStatus::from_value(row)?;
            if let Some(id) = only_id {
                if status.id != id {
                    continue;
                }
            }
            if !opts.include_removed && status.delete_pending {
                continue;
            }
            out.push(status);
        }
        Ok(out)
    }

    /// Slim client listing: registered clients plus the names queued for
    /// registration (`extra_clients`).
    ///
    /// `group_name` filters case-sensitively; queued names carry no group
    /// yet and only appear in the unfiltered listing.
    pub async fn get_clients(
        &self,
        group_name: Option<&str>,
        include_removed: bool,
    ) -> Result<Vec<ClientEntry>> {
        let resp = self.fetch("status", &[]).await?;
        let rows = req_array(&resp, "status")?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = ClientEntry::from_status_row(row)?;
            if let Some(group) = group_name {
                if entry.group_name != group {
                    continue;
                }
            }
            if !include_removed && entry.delete_pending {
                continue;
            }
            out.push(entry);
        }

        if group_name.is_none() {
            if let Some(extra) = resp.get("extra_clients").and_then(|v| v.as_array()) {
                for row in extra {
                    out.push(ClientEntry::from_extra_row(row)?);
                }
            }
        }
        Ok(out)
    }

    /// Look up a client id by exact name. Soft not-found; an empty name
    /// never touches the network.
    pub async fn get_client_id(&self, name: &str) -> Result<Option<i64>> {
        if name.is_empty() {
            return Ok(None);
        }
        let listing = self.get_clients(None, true).await?;
        Ok(listing.into_iter().find(|c| c.name == name).map(|c| c.id))
    }
}
