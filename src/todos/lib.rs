use anyhow::Result;
use libsql::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub text: String,
    pub priority: i64,
    pub completed: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
    pub priority: i64,
}

pub struct Todos<'a> {
    conn: &'a Connection,
}

impl<'a> Todos<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn get_all(&self) -> Result<Vec<Todo>> {
        let query = r#"
            SELECT id, text, priority, completed, created_at, completed_at
            FROM todos
            ORDER BY priority DESC, created_at DESC
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next().await? {
            todos.push(self.row_to_todo(&row)?);
        }

        Ok(todos)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Todo>> {
        let query = r#"
            SELECT id, text, priority, completed, created_at, completed_at
            FROM todos WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_todo(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let query = r#"
            INSERT INTO todos (text, priority)
            VALUES (?, ?)
            RETURNING id, text, priority, completed, created_at, completed_at
        "#;

        let mut rows = self
            .conn
            .query(query, libsql::params![input.text, input.priority])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_todo(&row)?)
        } else {
            anyhow::bail!("Failed to create todo")
        }
    }

    /// Marks a todo completed and returns the updated row. A missing id is
    /// an error here, not a not-found: callers report it as an operational
    /// failure.
    pub async fn complete(&self, id: i32) -> Result<Todo> {
        let query = r#"
            UPDATE todos
            SET completed = 1, completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
        "#;

        let affected = self.conn.execute(query, libsql::params![id]).await?;
        if affected == 0 {
            anyhow::bail!("todo {} not found", id);
        }

        match self.get(id).await? {
            Some(todo) => Ok(todo),
            None => anyhow::bail!("todo {} vanished after completion", id),
        }
    }

    /// Idempotent at this layer: deleting an id that does not exist is a no-op.
    pub async fn delete(&self, id: i32) -> Result<()> {
        self.conn
            .execute("DELETE FROM todos WHERE id = ?", libsql::params![id])
            .await?;
        Ok(())
    }

    fn row_to_todo(&self, row: &libsql::Row) -> Result<Todo> {
        let completed: i32 = row.get(3)?;

        Ok(Todo {
            id: row.get(0)?,
            text: row.get(1)?,
            priority: row.get(2)?,
            completed: completed != 0,
            created_at: row.get(4)?,
            completed_at: row.get(5)?,
        })
    }
}
