//! Stored-backup listing and backup triggering
//! (`backups` and `start_backup` actions).

use crate::error::Result;
use crate::json::req_array;
use crate::models::{BackupList, FileBackup, ImageBackup, StartResult};
use crate::params::{BackupType, ClientRef};

use super::UrbackupClient;

impl UrbackupClient {
    /// File and image backups stored for one client. A reference that
    /// matches nothing returns empty lists.
    pub async fn get_backups(&self, client: &ClientRef) -> Result<BackupList> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(BackupList::default());
        };

        let resp = self
            .fetch("backups", &[("sa", "backups".into()), ("clientid", id.to_string())])
            .await?;

        let mut list = BackupList::default();
        for row in req_array(&resp, "backups")? {
            list.file_backups.push(FileBackup::from_value(row)?);
        }
        // Servers without any image backups omit the array entirely.
        if let Some(rows) = resp.get("backup_images").and_then(|v| v.as_array()) {
            for row in rows {
                list.image_backups.push(ImageBackup::from_value(row)?);
            }
        }
        Ok(list)
    }

    /// Queue a backup of the given type. Returns one result row per
    /// addressed client, or empty when the reference matches nothing.
    pub async fn start_backup(
        &self,
        client: &ClientRef,
        backup_type: BackupType,
    ) -> Result<Vec<StartResult>> {
        let Some(id) = self.resolve_client_id(client).await? else {
            return Ok(Vec::new());
        };

        let resp = self
            .fetch(
                "start_backup",
                &[
                    ("start_client", id.to_string()),
                    ("start_type", backup_type.as_start_type().to_string()),
                ],
            )
            .await?;

        let mut out = Vec::new();
        for row in req_array(&resp, "result")? {
            out.push(StartResult::from_value(row)?);
        }
        Ok(out)
    }
}
