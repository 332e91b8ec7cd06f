//! Wires a `Config` into a live `DbAccess`, the single owned connection
//! `patsak-db` requires.

use sqlx::{Connection, PgConnection};

use crate::config::Config;
use crate::error::Result;

pub struct Runtime {
    db: patsak_db::DbAccess,
}

impl Runtime {
    /// Connects to the backend named in `config.db_uri` and returns a
    /// `Runtime` ready to hand out `Catalog` facades against
    /// `config.schema`.
    pub async fn connect(config: &Config) -> Result<Self> {
        tracing::info!(schema = %config.schema, "connecting to backend");
        let conn = PgConnection::connect(&config.db_uri).await.map_err(patsak_db::Error::db)?;
        Ok(Self { db: patsak_db::DbAccess::new(conn, config.schema.clone()) })
    }

    /// Initializes the global `tracing` subscriber from `RUST_LOG`,
    /// defaulting to `patsak=info` when unset.
    pub fn init_tracing() {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "patsak=info".into())))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    pub fn db(&mut self) -> &mut patsak_db::DbAccess {
        &mut self.db
    }

    pub fn catalog(&mut self) -> patsak_db::Catalog<'_> {
        patsak_db::Catalog::new(&mut self.db)
    }

    pub fn cancel_token(&self) -> patsak_db::CancelToken {
        self.db.cancel_token()
    }
}
