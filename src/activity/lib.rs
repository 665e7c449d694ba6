use anyhow::Result;
use libsql::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i32,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<JsonValue>,
    pub created_at: String,
}

pub struct ActivityLog<'a> {
    conn: &'a Connection,
}

impl<'a> ActivityLog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn log(
        &self,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Result<()> {
        let details_json = details.as_ref().map(|d| serde_json::to_string(d)).transpose()?;

        let query = r#"
            INSERT INTO activity_log (action, entity_type, entity_id, details)
            VALUES (?, ?, ?, ?)
        "#;

        self.conn
            .execute(
                query,
                libsql::params![action, entity_type, entity_id, details_json],
            )
            .await?;

        Ok(())
    }

    pub async fn recent(&self, limit: i32) -> Result<Vec<Activity>> {
        let query = r#"
            SELECT id, action, entity_type, entity_id, details, created_at
            FROM activity_log
            ORDER BY created_at DESC, id DESC
            LIMIT ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![limit]).await?;
        let mut activities = Vec::new();

        while let Some(row) = rows.next().await? {
            activities.push(self.row_to_activity(&row)?);
        }

        Ok(activities)
    }

    fn row_to_activity(&self, row: &libsql::Row) -> Result<Activity> {
        let details_str: Option<String> = row.get(4)?;
        let details = details_str.map(|s| serde_json::from_str(&s)).transpose()?;

        Ok(Activity {
            id: row.get(0)?,
            action: row.get(1)?,
            entity_type: row.get(2)?,
            entity_id: row.get(3)?,
            details,
            created_at: row.get(5)?,
        })
    }
}
