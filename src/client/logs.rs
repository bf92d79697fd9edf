//! Live-log retrieval (`livelog` action) with a per-client recency
//! cursor.
//!
//! `recent_only` fetches resume from the highest log-line id delivered
//! by the previous successful recent fetch for that client. The cursor
//! lock is held across the wire call so two concurrent fetches for the
//! same client cannot interleave their read-modify-write and re-deliver
//! or skip lines.

use crate::error::Result;
use crate::json::req_array;
use crate::models::LogEntry;
use crate::params::LiveLogOptions;

use super::UrbackupClient;

impl UrbackupClient {
    /// Read a client's live log. A reference that matches nothing
    /// returns an empty vec.
    pub async fn get_live_log(&self, opts: LiveLogOptions) -> Result<Vec<LogEntry>> {
        let Some(id) = self.resolve_client_id(&opts.client).await? else {
            return Ok(Vec::new());
        };

        let mut cursor = self.log_cursor.lock().await;
        let last_id = if opts.recent_only {
            cursor.get(&id).copied().unwrap_or(0)
        } else {
            0
        };

        let resp = self
            .fetch(
                "livelog",
                &[("clientid", id.to_string()), ("lastid", last_id.to_string())],
            )
            .await?;

        let mut entries = Vec::new();
        for row in req_array(&resp, "logdata")? {
            entries.push(LogEntry::from_value(row)?);
        }

        // The cursor only advances on a successful recent-only fetch.
        if opts.recent_only {
            if let Some(max_id) = entries.iter().map(|e| e.id).max() {
                cursor.insert(id, max_id);
            }
        }
        Ok(entries)
    }
}
