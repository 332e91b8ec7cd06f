//! One long-lived connection per process, and the work-unit lifecycle
//! built on top of it: lazily opened on first catalog or query call,
//! closed by `commit`/`rollback`, tracking the schema's meta-state version
//! so a drift caused by another process discards the in-memory `Meta`.
//!
//! Owns one `sqlx::PgConnection` for the whole process lifetime rather than
//! a pool shared across requests — one connection per worker process.

use patsak_catalog::Meta;
use sqlx::{PgConnection, Row};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};

pub struct DbAccess {
    conn: PgConnection,
    schema: String,
    cancel: CancelToken,
    work_open: bool,
    meta_state_version: Option<i64>,
    meta: Option<Meta>,
    meta_changed: bool,
}

impl DbAccess {
    pub fn new(conn: PgConnection, schema: impl Into<String>) -> Self {
        Self {
            conn,
            schema: schema.into(),
            cancel: CancelToken::new(),
            work_open: false,
            meta_state_version: None,
            meta: None,
            meta_changed: false,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub(crate) fn conn_mut(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    pub(crate) fn mark_changed(&mut self) {
        self.meta_changed = true;
    }

    /// Open the work unit if it isn't already, re-reading the schema's
    /// meta-state version on open and discarding `Meta` if it drifted.
    pub async fn get_work(&mut self) -> Result<()> {
        self.cancel.check()?;
        if self.work_open {
            return Ok(());
        }
        exec(&mut self.conn, "BEGIN").await.map_err(Error::db)?;
        self.work_open = true;
        let version = fetch_meta_state(&mut self.conn, &self.schema).await?;
        if self.meta_state_version != Some(version) {
            tracing::debug!(schema = %self.schema, old = ?self.meta_state_version, new = version, "meta state drifted, discarding cached Meta");
            self.meta = None;
        }
        self.meta_state_version = Some(version);
        Ok(())
    }

    pub(crate) async fn get_meta_mut(&mut self) -> Result<&mut Meta> {
        self.get_work().await?;
        if self.meta.is_none() {
            let meta = Meta::load(&self.schema, &mut self.conn).await?;
            self.meta = Some(meta);
        }
        Ok(self.meta.as_mut().expect("just populated"))
    }

    pub async fn get_meta(&mut self) -> Result<&Meta> {
        self.get_meta_mut().await.map(|m| &*m)
    }

    /// Split borrow used by the catalog/query façades: a mutation needs the
    /// connection and the in-memory `Meta` mutably at once.
    pub(crate) async fn conn_and_meta_mut(&mut self) -> Result<(&mut PgConnection, &mut Meta)> {
        self.get_meta_mut().await?;
        Ok((&mut self.conn, self.meta.as_mut().expect("just populated")))
    }

    pub async fn commit(&mut self) -> Result<()> {
        if !self.work_open {
            return Ok(());
        }
        if self.meta_changed {
            let next = self.meta_state_version.unwrap_or(0) + 1;
            set_meta_state(&mut self.conn, &self.schema, next).await?;
            self.meta_state_version = Some(next);
            self.meta_changed = false;
        }
        exec(&mut self.conn, "COMMIT").await.map_err(Error::db)?;
        self.work_open = false;
        tracing::info!(schema = %self.schema, "committed work unit");
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        if !self.work_open {
            return Ok(());
        }
        exec(&mut self.conn, "ROLLBACK").await.map_err(Error::db)?;
        self.work_open = false;
        if self.meta_changed {
            self.meta = None;
            self.meta_changed = false;
        }
        tracing::info!(schema = %self.schema, "rolled back work unit");
        Ok(())
    }
}

async fn exec(conn: &mut PgConnection, sql: &str) -> std::result::Result<(), sqlx::Error> {
    sqlx::raw_sql(sql).execute(conn).await?;
    Ok(())
}

async fn fetch_meta_state(conn: &mut PgConnection, schema: &str) -> Result<i64> {
    let sql = format!("SELECT * FROM get_meta_state({})", patsak_sql::quote_literal(schema));
    let row = sqlx::query(&sql).fetch_one(conn).await.map_err(Error::db)?;
    row.try_get::<i64, _>(0).map_err(Error::db)
}

async fn set_meta_state(conn: &mut PgConnection, schema: &str, version: i64) -> Result<()> {
    let sql = format!("SELECT set_meta_state({}, {version})", patsak_sql::quote_literal(schema));
    sqlx::query(&sql).execute(conn).await.map_err(Error::db)?;
    Ok(())
}
