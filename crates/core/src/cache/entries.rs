//! Entry operations on a single named store.
//!
//! Entries map a request descriptor (method + URL) to a stored response.
//! Only complete (200) responses are accepted; the schema enforces the same
//! rule with a CHECK constraint.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::{Error, HttpResponse};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Handle to one named store.
///
/// Cheap to clone; clones share the underlying database connection.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

/// A request descriptor and the response to store for it.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub method: String,
    pub url: String,
    pub response: HttpResponse,
}

struct EntryRow {
    store: String,
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn encode(store: &str, method: &str, url: &str, response: &HttpResponse) -> Result<Self, Error> {
        if !response.is_complete() {
            return Err(Error::UncacheableResponse(response.status));
        }
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        Ok(Self {
            store: store.to_string(),
            key_hash: compute_cache_key(method, url),
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json,
            body: response.body.clone(),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, now: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
            params![&self.store, now],
        )?;
        conn.execute(
            "INSERT INTO entries (
                store, key_hash, method, url, status, status_text, headers_json, body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(store, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                status = excluded.status,
                status_text = excluded.status_text,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                &self.store,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status as i64,
                &self.status_text,
                &self.headers_json,
                &self.body,
                now,
            ],
        )?;
        Ok(())
    }
}

impl CacheStore {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for a request descriptor.
    ///
    /// Returns None on a miss, including when the store does not exist.
    pub async fn lookup(&self, method: &str, url: &str) -> Result<Option<HttpResponse>, Error> {
        let store = self.name.clone();
        let key_hash = compute_cache_key(method, url);
        self.db
            .conn
            .call(move |conn| -> Result<Option<HttpResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, headers_json, body
                     FROM entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                match result {
                    Ok((status, status_text, headers_json, body)) => {
                        let headers: BTreeMap<String, String> =
                            serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
                        Ok(Some(HttpResponse { status: status as u16, status_text, headers, body }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response, overwriting any previous entry for the same key.
    ///
    /// Creates the store if absent. Rejects anything but a 200 with
    /// `Error::UncacheableResponse`.
    pub async fn put(&self, method: &str, url: &str, response: &HttpResponse) -> Result<(), Error> {
        let row = EntryRow::encode(&self.name, method, url, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> { row.insert(conn, &now) })
            .await
            .map_err(Error::from)
    }

    /// Store several responses in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_all(&self, entries: Vec<PendingEntry>) -> Result<usize, Error> {
        let rows = entries
            .iter()
            .map(|e| EntryRow::encode(&self.name, &e.method, &e.url, &e.response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.insert(&tx, &now)?;
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// URLs stored under this store, sorted.
    pub async fn urls(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE store = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this store.
    pub async fn len(&self) -> Result<u64, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
