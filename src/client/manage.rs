//! Client lifecycle: add, mark for removal, cancel removal
//! (`add_client` action and the removal parameters of `status`).

use crate::error::{ApiError, Result};
use crate::json::{opt_bool, req_array, req_i64};
use crate::params::ClientRef;

use super::UrbackupClient;

impl UrbackupClient {
    /// Register a new client name. Returns its id, or `None` when a
    /// client of that name already exists (an expected outcome, not an
    /// error).
    pub async fn add_client(&self, name: &str) -> Result<Option<i64>> {
        if name.is_empty() {
            return Err(ApiError::Validation("client name must not be empty".into()));
        }

        let resp = self
            .fetch("add_client", &[("clientname", name.to_string())])
            .await?;

        if opt_bool(&resp, "already_exists", false) {
            return Ok(None);
        }
        if !opt_bool(&resp, "added_new_client", false) {
            return Err(ApiError::shape(
                "add_client: neither `added_new_client` nor `already_exists`",
            ));
        }
        Ok(Some(req_i64(&resp, "new_clientid")?))
    }

    /// Mark a client for removal. The client stays in listings with
    /// `delete_pending` set until the server purges it. Returns false
    /// when the reference matches nothing.
    pub async fn remove_client(&self, client: &ClientRef) -> Result<bool> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(false);
        };
        let resp = self
            .fetch("status", &[("remove_client", id.to_string())])
            .await?;
        req_array(&resp, "status")?;
        Ok(true)
    }

    /// Undo a pending removal. Returns false when the reference matches
    /// nothing.
    pub async fn cancel_remove_client(&self, client: &ClientRef) -> Result<bool> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(false);
        };
        let resp = self
            .fetch(
                "status",
                &[
                    ("remove_client", id.to_string()),
                    ("stop_remove_client", "true".to_string()),
                ],
            )
            .await?;
        req_array(&resp, "status")?;
        Ok(true)
    }
}
