//! Post and term storage.
//!
//! Write helpers used for seeding and administration, plus the
//! [`PostStore`] implementation the feed provider reads through.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, params_from_iter, types::Value};

use super::connection::Db;
use crate::Error;
use crate::feed::{Post, PostPage, PostStamp, PostStore, STATUS_PUBLISH, Term, TermFilter};

const POST_COLUMNS: &str = "p.id, p.title, p.excerpt, p.permalink, p.author, p.published_at, p.modified_at, p.status";

/// Fields of a post to be created.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
    pub author: String,
    /// RFC 3339, UTC.
    pub published_at: String,
}

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        excerpt: row.get(2)?,
        permalink: row.get(3)?,
        author: row.get(4)?,
        published_at: row.get(5)?,
        modified_at: row.get(6)?,
        status: row.get(7)?,
    })
}

impl Db {
    /// Register a taxonomy. Idempotent.
    pub async fn register_taxonomy(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("INSERT OR IGNORE INTO taxonomies (name) VALUES (?1)", params![name])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Create a term, or return the existing one with the same slug.
    pub async fn upsert_term(&self, taxonomy: &str, slug: &str, name: &str) -> Result<Term, Error> {
        if slug.trim().is_empty() {
            return Err(Error::InvalidInput("term slug cannot be empty".into()));
        }
        let (taxonomy, slug, name) = (taxonomy.to_string(), slug.to_string(), name.to_string());
        self.conn
            .call(move |conn| -> Result<Term, Error> {
                let known: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM taxonomies WHERE name = ?1)",
                    params![taxonomy],
                    |row| row.get(0),
                )?;
                if !known {
                    return Err(Error::NotFound(format!("taxonomy {taxonomy}")));
                }

                conn.execute(
                    "INSERT INTO terms (taxonomy, slug, name) VALUES (?1, ?2, ?3)
                     ON CONFLICT(taxonomy, slug) DO NOTHING",
                    params![taxonomy, slug, name],
                )?;
                let term = conn.query_row(
                    "SELECT id, taxonomy, slug, name FROM terms WHERE taxonomy = ?1 AND slug = ?2",
                    params![taxonomy, slug],
                    |row| Ok(Term { id: row.get(0)?, taxonomy: row.get(1)?, slug: row.get(2)?, name: row.get(3)? }),
                )?;
                Ok(term)
            })
            .await
            .map_err(Error::from)
    }

    /// Create a published post assigned to `term_ids`.
    pub async fn insert_post(&self, post: &NewPost, term_ids: &[i64]) -> Result<Post, Error> {
        let post = post.clone();
        let term_ids = term_ids.to_vec();
        self.conn
            .call(move |conn| -> Result<Post, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO posts (title, excerpt, permalink, author, published_at, modified_at, status)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)",
                    params![post.title, post.excerpt, post.permalink, post.author, post.published_at, STATUS_PUBLISH],
                )?;
                let id = tx.last_insert_rowid();
                for term_id in &term_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO post_terms (post_id, term_id) VALUES (?1, ?2)",
                        params![id, term_id],
                    )?;
                }
                let stored = tx.query_row(
                    &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?1"),
                    params![id],
                    row_to_post,
                )?;
                tx.commit()?;
                Ok(stored)
            })
            .await
            .map_err(Error::from)
    }

    /// Record an edit of a post.
    pub async fn touch_post(&self, post_id: i64, modified_at: &str) -> Result<(), Error> {
        let modified_at = modified_at.to_string();
        self.update_post(post_id, "UPDATE posts SET modified_at = ?2 WHERE id = ?1", modified_at)
            .await
    }

    /// Change a post's status (e.g. `draft`, `trash`).
    pub async fn set_post_status(&self, post_id: i64, status: &str) -> Result<(), Error> {
        let status = status.to_string();
        self.update_post(post_id, "UPDATE posts SET status = ?2 WHERE id = ?1", status)
            .await
    }

    async fn update_post(&self, post_id: i64, sql: &'static str, value: String) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let changed = conn.execute(sql, params![post_id, value])?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("post {post_id}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl PostStore for Db {
    async fn taxonomy_exists(&self, taxonomy: &str) -> Result<bool, Error> {
        let taxonomy = taxonomy.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM taxonomies WHERE name = ?1)",
                    params![taxonomy],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn query_posts(&self, filter: Option<&TermFilter>, page: u32, per_page: u32) -> Result<PostPage, Error> {
        let mut clause = String::from("p.status = ?1");
        let mut args: Vec<Value> = vec![Value::Text(STATUS_PUBLISH.to_string())];

        if let Some(filter) = filter
            && !filter.term_ids.is_empty()
        {
            args.push(Value::Text(filter.taxonomy.clone()));
            let taxonomy_idx = args.len();
            let mut placeholders = Vec::with_capacity(filter.term_ids.len());
            for id in &filter.term_ids {
                args.push(Value::Integer(*id));
                placeholders.push(format!("?{}", args.len()));
            }
            clause.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM post_terms pt JOIN terms t ON t.id = pt.term_id
                   WHERE pt.post_id = p.id AND t.taxonomy = ?{taxonomy_idx} AND t.id IN ({}))",
                placeholders.join(", ")
            ));
        }

        let per_page = per_page.max(1);
        let offset = i64::from(page.max(1) - 1).checked_mul(i64::from(per_page));

        self.conn
            .call(move |conn| -> Result<PostPage, Error> {
                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM posts p WHERE {clause}"),
                    params_from_iter(args.iter()),
                    |row| row.get(0),
                )?;

                let total = u64::try_from(total).unwrap_or(0);
                let Some(offset) = offset.filter(|o| u64::try_from(*o).is_ok_and(|o| o < total)) else {
                    return Ok(PostPage { posts: Vec::new(), total });
                };

                let limit_idx = args.len() + 1;
                let offset_idx = args.len() + 2;
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts p WHERE {clause}
                     ORDER BY p.published_at DESC, p.id DESC
                     LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
                );
                let mut page_args = args;
                page_args.push(Value::Integer(i64::from(per_page)));
                page_args.push(Value::Integer(offset));

                let mut stmt = conn.prepare(&sql)?;
                let posts = stmt
                    .query_map(params_from_iter(page_args.iter()), row_to_post)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(PostPage { posts, total })
            })
            .await
            .map_err(Error::from)
    }

    async fn newest_in_term(&self, term_id: i64) -> Result<Option<PostStamp>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<PostStamp>, Error> {
                let result = conn.query_row(
                    "SELECT p.id, p.modified_at FROM posts p
                     JOIN post_terms pt ON pt.post_id = p.id
                     WHERE pt.term_id = ?1 AND p.status = ?2
                     ORDER BY p.published_at DESC, p.id DESC LIMIT 1",
                    params![term_id, STATUS_PUBLISH],
                    |row| Ok(PostStamp { post_id: row.get(0)?, modified_at: row.get(1)? }),
                );

                match result {
                    Ok(stamp) => Ok(Some(stamp)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn term_by_slug(&self, taxonomy: &str, slug: &str) -> Result<Option<Term>, Error> {
        let (taxonomy, slug) = (taxonomy.to_string(), slug.to_string());
        self.conn
            .call(move |conn| -> Result<Option<Term>, Error> {
                let result = conn.query_row(
                    "SELECT id, taxonomy, slug, name FROM terms WHERE taxonomy = ?1 AND slug = ?2",
                    params![taxonomy, slug],
                    |row| Ok(Term { id: row.get(0)?, taxonomy: row.get(1)?, slug: row.get(2)?, name: row.get(3)? }),
                );

                match result {
                    Ok(term) => Ok(Some(term)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
