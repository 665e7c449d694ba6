use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use libsql::Connection;
use pulldown_cmark::{Options, Parser, html::push_html};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::PostError;
use crate::sync::{SyncResult, SyncStats, is_unchanged};

/// Metadata block at the top of a markdown post, delimited by `---` lines.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published_at: Option<String>,
    pub is_draft: bool,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
}

/// Splits a raw markdown file into its front matter and body.
///
/// A file without an opening `---` line (or without a closing one) is all
/// body with default metadata, which leaves `published` false and the file
/// skipped by the sync scan.
pub fn parse_front_matter<'a>(raw: &'a str, path: &Path) -> Result<(FrontMatter, &'a str), PostError> {
    let Some(stripped) = raw.strip_prefix("---") else {
        return Ok((FrontMatter::default(), raw));
    };
    let Some(stripped) = stripped.strip_prefix("\r\n").or_else(|| stripped.strip_prefix('\n'))
    else {
        return Ok((FrontMatter::default(), raw));
    };
    let Some(end) = stripped.find("\n---") else {
        return Ok((FrontMatter::default(), raw));
    };

    let yaml = &stripped[..end + 1];
    let body = &stripped[end + 4..];
    let body = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')).unwrap_or(body);

    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let matter = serde_yaml::from_str(yaml).map_err(|source| PostError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((matter, body))
}

/// Renders a markdown body to HTML with the tables, strikethrough and
/// task-list extensions enabled.
pub fn render_markdown(text: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(text, options);
    let mut html = String::new();
    push_html(&mut html, parser);
    html
}

pub fn compute_content_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

pub struct Blog<'a> {
    conn: &'a Connection,
    posts_dir: &'a Path,
}

impl<'a> Blog<'a> {
    pub fn new(conn: &'a Connection, posts_dir: &'a Path) -> Self {
        Self { conn, posts_dir }
    }

    /// Walks the posts directory and reconciles every published markdown
    /// file into the store, keyed by slug. Files that fail to read or parse
    /// are logged and skipped; the scan never aborts part-way.
    pub async fn scan_and_sync(&self) -> Result<SyncStats> {
        let mut stats = SyncStats::default();

        if !self.posts_dir.exists() {
            tracing::warn!("posts directory {:?} does not exist, nothing to sync", self.posts_dir);
            return Ok(stats);
        }

        for entry in fs::read_dir(self.posts_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };
            if file_name == "README.md" {
                continue;
            }

            match self.sync_file(&path, &file_name).await {
                Ok(Some(result)) => result.record(&mut stats),
                Ok(None) => {
                    tracing::debug!("skipping draft {}", file_name);
                }
                Err(e) => {
                    tracing::error!("Failed to sync {}: {}", file_name, e);
                    SyncResult::Error.record(&mut stats);
                }
            }
        }

        tracing::info!(
            created = stats.created,
            updated = stats.updated,
            unchanged = stats.unchanged,
            failed = stats.failed,
            "post sync finished"
        );

        Ok(stats)
    }

    async fn sync_file(&self, path: &Path, file_name: &str) -> Result<Option<SyncResult>> {
        let raw = fs::read_to_string(path).map_err(|source| PostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (matter, _body) = parse_front_matter(&raw, path)?;

        if !matter.published {
            return Ok(None);
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_string();
        let slug = matter.slug.unwrap_or(stem);
        let title = matter.title.unwrap_or_else(|| slug.clone());
        let excerpt = matter.excerpt.unwrap_or_default();
        let tags_json = serde_json::to_string(&matter.tags)?;
        let published_at = matter
            .date
            .as_deref()
            .and_then(parse_publish_date)
            .unwrap_or_else(Utc::now)
            .to_rfc3339();
        let hash = compute_content_hash(&raw);

        match self.find_sync_state(&slug).await? {
            None => {
                let query = r#"
                    INSERT INTO blog_posts (slug, title, excerpt, file_path, published_at, is_draft, tags, content_hash)
                    VALUES (?, ?, ?, ?, ?, 0, ?, ?)
                "#;
                self.conn
                    .execute(
                        query,
                        libsql::params![slug, title, excerpt, file_name, published_at, tags_json, hash],
                    )
                    .await?;
                Ok(Some(SyncResult::Created))
            }
            Some((_, existing_hash)) if is_unchanged(existing_hash.as_deref(), &hash) => {
                Ok(Some(SyncResult::Unchanged))
            }
            Some((id, _)) => {
                let query = r#"
                    UPDATE blog_posts
                    SET title = ?, excerpt = ?, file_path = ?, published_at = ?, is_draft = 0,
                        tags = ?, content_hash = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                    WHERE id = ?
                "#;
                self.conn
                    .execute(
                        query,
                        libsql::params![title, excerpt, file_name, published_at, tags_json, hash, id],
                    )
                    .await?;
                Ok(Some(SyncResult::Updated))
            }
        }
    }

    async fn find_sync_state(&self, slug: &str) -> Result<Option<(i32, Option<String>)>> {
        let query = "SELECT id, content_hash FROM blog_posts WHERE slug = ?";
        let mut rows = self.conn.query(query, libsql::params![slug]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some((row.get(0)?, row.get(1)?)))
        } else {
            Ok(None)
        }
    }

    /// All non-draft posts, newest publish date first. An optional tag
    /// narrows the listing.
    pub async fn get_all(&self, tag: Option<&str>) -> Result<Vec<PostSummary>> {
        let query = r#"
            SELECT id, slug, title, excerpt, published_at, is_draft, tags, created_at, updated_at
            FROM blog_posts
            WHERE is_draft = 0
            ORDER BY published_at DESC
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut posts = Vec::new();

        while let Some(row) = rows.next().await? {
            let post = self.row_to_summary(&row)?;
            if let Some(tag) = tag {
                if !post.tags.iter().any(|t| t == tag) {
                    continue;
                }
            }
            posts.push(post);
        }

        Ok(posts)
    }

    /// Looks up a post record by slug and re-reads its markdown file,
    /// rendering the body to HTML. A record whose file has disappeared
    /// resolves to `None` rather than an error.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let query = r#"
            SELECT id, slug, title, excerpt, published_at, is_draft, tags, created_at, updated_at, file_path
            FROM blog_posts
            WHERE slug = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![slug]).await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let summary = self.row_to_summary(&row)?;
        let file_path: String = row.get(9)?;
        let path = self.posts_dir.join(&file_path);

        if !path.exists() {
            tracing::warn!("post {} references missing file {:?}", slug, path);
            return Ok(None);
        }

        let raw = fs::read_to_string(&path).map_err(|source| PostError::Io {
            path: path.clone(),
            source,
        })?;
        let (_matter, body) = parse_front_matter(&raw, &path)?;

        Ok(Some(Post {
            summary,
            content: render_markdown(body),
        }))
    }

    fn row_to_summary(&self, row: &libsql::Row) -> Result<PostSummary> {
        let is_draft: i32 = row.get(5)?;
        let tags_json: String = row.get(6)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)?;

        Ok(PostSummary {
            id: row.get(0)?,
            slug: row.get(1)?,
            title: row.get(2)?,
            excerpt: row.get(3)?,
            published_at: row.get(4)?,
            is_draft: is_draft != 0,
            tags,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_front_matter_from_body() {
        let raw = "---\ntitle: Hello\npublished: true\ntags: [a, b]\n---\n# Heading\n";
        let (matter, body) = parse_front_matter(raw, Path::new("hello.md")).unwrap();
        assert_eq!(matter.title.as_deref(), Some("Hello"));
        assert!(matter.published);
        assert_eq!(matter.tags, vec!["a", "b"]);
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn file_without_front_matter_is_a_draft() {
        let raw = "just some markdown\n";
        let (matter, body) = parse_front_matter(raw, Path::new("plain.md")).unwrap();
        assert!(!matter.published);
        assert_eq!(body, raw);
    }

    #[test]
    fn unterminated_front_matter_is_a_draft() {
        let raw = "---\ntitle: Broken\n";
        let (matter, body) = parse_front_matter(raw, Path::new("broken.md")).unwrap();
        assert!(!matter.published);
        assert_eq!(body, raw);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let raw = "---\ntitle: [unclosed\n---\nbody\n";
        assert!(parse_front_matter(raw, Path::new("bad.md")).is_err());
    }

    #[test]
    fn publish_date_accepts_both_formats() {
        assert!(parse_publish_date("2025-06-01").is_some());
        assert!(parse_publish_date("2025-06-01T10:30:00Z").is_some());
        assert!(parse_publish_date("June 1st").is_none());
    }

    #[test]
    fn content_hash_tracks_content() {
        let a = compute_content_hash("one");
        let b = compute_content_hash("one");
        let c = compute_content_hash("two");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn renders_markdown_extensions() {
        let html = render_markdown("# Title\n\n~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
    }
}
