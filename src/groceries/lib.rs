use anyhow::Result;
use libsql::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: i32,
    pub item_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrocery {
    pub item_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

pub struct Groceries<'a> {
    conn: &'a Connection,
}

impl<'a> Groceries<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn get_all(&self) -> Result<Vec<GroceryItem>> {
        let query = r#"
            SELECT id, item_name, quantity, notes, created_at
            FROM grocery_items
            ORDER BY created_at DESC
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut items = Vec::new();

        while let Some(row) = rows.next().await? {
            items.push(self.row_to_item(&row)?);
        }

        Ok(items)
    }

    pub async fn create(&self, input: CreateGrocery) -> Result<GroceryItem> {
        let query = r#"
            INSERT INTO grocery_items (item_name, quantity, notes)
            VALUES (?, ?, ?)
            RETURNING id, item_name, quantity, notes, created_at
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![input.item_name, input.quantity, input.notes],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_item(&row)?)
        } else {
            anyhow::bail!("Failed to create grocery item")
        }
    }

    /// Idempotent at this layer: deleting an id that does not exist is a no-op.
    pub async fn delete(&self, id: i32) -> Result<()> {
        self.conn
            .execute("DELETE FROM grocery_items WHERE id = ?", libsql::params![id])
            .await?;
        Ok(())
    }

    fn row_to_item(&self, row: &libsql::Row) -> Result<GroceryItem> {
        Ok(GroceryItem {
            id: row.get(0)?,
            item_name: row.get(1)?,
            quantity: row.get(2)?,
            notes: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
