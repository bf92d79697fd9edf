//! Usage and activity operations (`usage` and `progress` actions).

use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::json::req_array;
use crate::models::{Activity, PastActivity, UsageRow};
use crate::params::{ActivityOptions, ClientRef};

use super::UrbackupClient;

/// Current and finished activities, as requested via [`ActivityOptions`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityList {
    pub current: Vec<Activity>,
    pub past: Vec<PastActivity>,
}

impl UrbackupClient {
    /// Storage usage per client, optionally restricted to one client.
    ///
    /// Usage rows are keyed by client name on the wire, so a restriction
    /// resolves through the listing either way; an id still wins over a
    /// supplied name.
    pub async fn get_usage(&self, client: Option<&ClientRef>) -> Result<Vec<UsageRow>> {
        let only_name = match client {
            Some(r) => match self.resolve_client(r).await? {
                Some(entry) => Some(entry.name),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let resp = self.fetch("usage", &[]).await?;
        let rows = req_array(&resp, "usage")?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let usage = UsageRow::from_value(row)?;
            if let Some(name) = &only_name {
                if usage.client_name != *name {
                    continue;
                }
            }
            out.push(usage);
        }
        Ok(out)
    }

    /// Running and/or finished activities.
    ///
    /// Both kinds are included by default; a client restriction that
    /// matches nothing returns an empty list.
    pub async fn get_activities(&self, opts: ActivityOptions) -> Result<ActivityList> {
        let only_id = match &opts.client {
            Some(r) => match self.resolve_client_id(r).await? {
                Some(id) => Some(id),
                None => return Ok(ActivityList::default()),
            },
            None => None,
        };

        let mut params = Vec::new();
        if opts.include_past {
            params.push(("with_lastacts", "1".to_string()));
        }
        let resp = self.fetch("progress", &params).await?;

        let mut list = ActivityList::default();
        if opts.include_current {
            for row in req_array(&resp, "progress")? {
                let act = Activity::from_value(row)?;
                if only_id.is_some_and(|id| act.client_id != id) {
                    continue;
                }
                list.current.push(act);
            }
        }
        if opts.include_past {
            for row in req_array(&resp, "lastacts")? {
                let act = PastActivity::from_value(row)?;
                if only_id.is_some_and(|id| act.client_id != id) {
                    continue;
                }
                list.past.push(act);
            }
        }
        Ok(list)
    }

    /// Stop a running activity. Returns false when the client reference
    /// matches nothing; a non-positive activity id fails validation
    /// before any network call.
    pub async fn stop_activity(&self, client: &ClientRef, activity_id: i64) -> Result<bool> {
        if activity_id <= 0 {
            return Err(ApiError::Validation(
                "activity id must be a positive integer".into(),
            ));
        }
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(false);
        };

        let resp = self
            .fetch(
                "progress",
                &[
                    ("stop_clientid", id.to_string()),
                    ("stop_id", activity_id.to_string()),
                ],
            )
            .await?;
        // The server answers with the refreshed progress listing.
        req_array(&resp, "progress")?;
        Ok(true)
    }
}
