//! The external face of catalog mutation (spec component G): each method
//! forwards through `DbAccess::get_work`/`get_meta_mut`, then delegates to
//! `patsak-catalog`'s pure mutation logic, then marks the work unit's
//! meta-state dirty on success.

use indexmap::IndexMap;
use patsak_catalog::ForeignKey;
use patsak_sql::Translator;
use patsak_types::{DefHeader, Header, NameSet, ValHeader, Value};
use sqlx::Row;

use crate::db_access::DbAccess;
use crate::error::{Error, Result};
use crate::query::{compose_insert, row_to_values};

pub struct Catalog<'a> {
    db: &'a mut DbAccess,
}

impl<'a> Catalog<'a> {
    pub fn new(db: &'a mut DbAccess) -> Self {
        Self { db }
    }

    pub async fn rel_var_names(&mut self) -> Result<Vec<String>> {
        let meta = self.db.get_meta().await?;
        Ok(meta.rel_var_names().map(str::to_string).collect())
    }

    pub async fn create_rel_var(
        &mut self,
        name: &str,
        def_header: DefHeader,
        unique_key_set: Vec<NameSet>,
        foreign_key_set: Vec<ForeignKey>,
        checks: &[String],
    ) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.create_rel_var(conn, name, def_header, unique_key_set, foreign_key_set, checks).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn drop_rel_vars(&mut self, names: &NameSet) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.drop_rel_vars(conn, names).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn add_attrs(&mut self, rel_var_name: &str, val_attr_set: &ValHeader) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.add_attrs(conn, rel_var_name, val_attr_set).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn drop_attrs(&mut self, rel_var_name: &str, attr_names: &NameSet) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.drop_attrs(conn, rel_var_name, attr_names).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn add_default(&mut self, rel_var_name: &str, drafts: &[(String, Value)]) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.add_default(conn, rel_var_name, drafts).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn drop_default(&mut self, rel_var_name: &str, attr_names: &NameSet) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.drop_default(conn, rel_var_name, attr_names).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn add_constrs(
        &mut self,
        rel_var_name: &str,
        unique_key_set: Vec<NameSet>,
        foreign_key_set: Vec<ForeignKey>,
        checks: &[String],
    ) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.add_constrs(conn, rel_var_name, unique_key_set, foreign_key_set, checks).await?;
        self.db.mark_changed();
        Ok(())
    }

    pub async fn drop_all_constrs(&mut self, rel_var_name: &str) -> Result<()> {
        let (conn, meta) = self.db.conn_and_meta_mut().await?;
        meta.drop_all_constrs(conn, rel_var_name).await?;
        self.db.mark_changed();
        Ok(())
    }

    /// Inserts one tuple. A RelVar with no attributes goes through the
    /// stored `insert_into_empty` helper; otherwise every omitted attribute
    /// must carry either a default or be the implicit serial key.
    pub async fn insert(&mut self, rel_var_name: &str, values: &IndexMap<String, Value>) -> Result<Vec<Value>> {
        self.db.get_work().await?;
        let (sql, header) = {
            let meta = self.db.get_meta().await?;
            compose_insert(meta.get(rel_var_name)?, values)?
        };
        let conn = self.db.conn_mut();
        let row = sqlx::query(&sql).fetch_one(conn).await.map_err(Error::db)?;
        row_to_values(&row, &header)
    }

    pub async fn query(
        &mut self,
        source: &str,
        params: &[Value],
        order_by: &[&str],
        order_by_params: &[Value],
        offset: u64,
        length: Option<u64>,
    ) -> Result<(Vec<Vec<Value>>, Header)> {
        self.db.get_work().await?;
        let (sql, header) = {
            let meta = self.db.get_meta().await?;
            let mut translator = Translator::new(meta);
            translator.translate_query(source, params, order_by, order_by_params, offset, length)?
        };
        let conn = self.db.conn_mut();
        let rows = sqlx::query(&sql).fetch_all(conn).await.map_err(Error::db)?;
        let values = rows.iter().map(|row| row_to_values(row, &header)).collect::<Result<Vec<_>>>()?;
        Ok((values, header))
    }

    pub async fn count(&mut self, source: &str, params: &[Value]) -> Result<i64> {
        self.db.get_work().await?;
        let sql = {
            let meta = self.db.get_meta().await?;
            let mut translator = Translator::new(meta);
            translator.translate_count(source, params)?
        };
        let conn = self.db.conn_mut();
        let row = sqlx::query(&sql).fetch_one(conn).await.map_err(Error::db)?;
        row.try_get::<i64, _>(0).map_err(Error::db)
    }

    pub async fn update(
        &mut self,
        rel_var_name: &str,
        where_source: Option<&str>,
        where_params: &[Value],
        expr_map: &IndexMap<String, String>,
        expr_params: &[Value],
    ) -> Result<u64> {
        self.db.get_work().await?;
        let sql = {
            let meta = self.db.get_meta().await?;
            let mut translator = Translator::new(meta);
            translator.translate_update(rel_var_name, where_source, where_params, expr_map, expr_params)?
        };
        let conn = self.db.conn_mut();
        let result = sqlx::query(&sql).execute(conn).await.map_err(Error::db)?;
        Ok(result_rows_affected(&result))
    }

    pub async fn delete(&mut self, rel_var_name: &str, where_source: &str, params: &[Value]) -> Result<u64> {
        self.db.get_work().await?;
        let sql = {
            let meta = self.db.get_meta().await?;
            let mut translator = Translator::new(meta);
            translator.translate_delete(rel_var_name, where_source, params)?
        };
        let conn = self.db.conn_mut();
        let result = sqlx::query(&sql).execute(conn).await.map_err(Error::db)?;
        Ok(result_rows_affected(&result))
    }
}

fn result_rows_affected(result: &sqlx::postgres::PgQueryResult) -> u64 {
    result.rows_affected()
}
