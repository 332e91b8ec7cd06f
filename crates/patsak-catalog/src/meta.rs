//! `Meta`: the in-memory set of RelVars for one schema, plus the mutation
//! API that drives the backend DDL and keeps the mirror in sync.

use patsak_types::{DefHeader, Header, NameSet, ValHeader, Value};
use sqlx::PgConnection;

use crate::compose::{
    self, check_rel_var_count, AddAttrsPlan, AddConstrsPlan, AddDefaultPlan, CreatePlan, DropAttrsPlan, DropDefaultPlan,
};
use crate::error::{Error, Result};
use crate::load;
use crate::types::ForeignKey;
use crate::RelVar;

#[derive(Clone, Debug, Default)]
pub struct Meta {
    rel_vars: Vec<RelVar>,
}

impl Meta {
    pub fn empty() -> Self {
        Self { rel_vars: Vec::new() }
    }

    pub async fn load(schema: &str, conn: &mut PgConnection) -> Result<Self> {
        let names = load::load_rel_var_names(schema, conn).await?;
        let mut rel_vars = Vec::with_capacity(names.len());
        for name in &names {
            rel_vars.push(load::load_rel_var(name, conn).await?);
        }
        let mut meta = Self { rel_vars };

        for i in 0..meta.rel_vars.len() {
            let mut rv = meta.rel_vars[i].clone();
            let siblings = &meta.rel_vars;
            load::load_constrs(&mut rv, conn, |ref_name| {
                siblings
                    .iter()
                    .find(|r| r.name() == ref_name)
                    .map(|r| r.header().names().map(|s| s.to_string()).collect())
                    .ok_or_else(|| Error::no_such_rel_var(ref_name))
            })
            .await?;
            meta.rel_vars[i] = rv;
        }
        Ok(meta)
    }

    pub fn all(&self) -> &[RelVar] {
        &self.rel_vars
    }

    pub fn get(&self, name: &str) -> Result<&RelVar> {
        self.rel_vars.iter().find(|r| r.name() == name).ok_or_else(|| Error::no_such_rel_var(name))
    }

    fn idx(&self, name: &str) -> Result<usize> {
        self.rel_vars.iter().position(|r| r.name() == name).ok_or_else(|| Error::no_such_rel_var(name))
    }

    pub fn rel_var_names(&self) -> impl Iterator<Item = &str> {
        self.rel_vars.iter().map(RelVar::name)
    }

    /// Looks up an existing RelVar's header and unique keys, for foreign
    /// key resolution during `create`/`add_constrs` of a *different* RelVar.
    fn lookup_for_fk(&self, name: &str) -> Result<(Header, Vec<NameSet>)> {
        let rv = self.get(name)?;
        Ok((rv.header().clone(), rv.unique_key_set().to_vec()))
    }

    pub async fn create_rel_var(
        &mut self,
        conn: &mut PgConnection,
        name: &str,
        def_header: DefHeader,
        unique_key_set: Vec<NameSet>,
        foreign_key_set: Vec<ForeignKey>,
        checks: &[String],
    ) -> Result<()> {
        check_rel_var_count(self.rel_vars.len())?;
        if self.rel_vars.iter().any(|r| r.name() == name) {
            return Err(Error::rel_var_exists(name));
        }
        let CreatePlan { rel_var, sql } =
            compose::compose_create(&*self, name, def_header, unique_key_set, foreign_key_set, checks, &|n| self.lookup_for_fk(n))?;
        exec(conn, &sql).await.map_err(Error::db)?;
        self.rel_vars.push(rel_var);
        Ok(())
    }

    /// Cross-RelVar integrity: reject if any *surviving* RelVar has an FK
    /// into a *dropped* one. Erase in reverse index order to keep the
    /// backing vector stable across removals.
    pub async fn drop_rel_vars(&mut self, conn: &mut PgConnection, names: &NameSet) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let mut indexes = Vec::with_capacity(names.len());
        for name in names {
            indexes.push(self.idx(name)?);
        }
        for rv in &self.rel_vars {
            if names.contains(rv.name()) {
                continue;
            }
            for fk in rv.foreign_key_set() {
                if names.contains(&fk.ref_rel_var_name) {
                    return Err(Error::dependency(format!(
                        "Attempt to delete a group of RelVars with a RelVar \"{}\" but without a RelVar \"{}\" it is dependent on",
                        fk.ref_rel_var_name,
                        rv.name(),
                    )));
                }
            }
        }

        let idents: Vec<String> = names.iter().map(|n| patsak_sql::escape_ident(n)).collect();
        let sql = format!("DROP TABLE {} CASCADE;", idents.join(", "));
        exec(conn, &sql).await.map_err(Error::db)?;

        indexes.sort_unstable();
        for idx in indexes.into_iter().rev() {
            self.rel_vars.remove(idx);
        }
        Ok(())
    }

    pub async fn add_attrs(&mut self, conn: &mut PgConnection, rel_var_name: &str, val_attr_set: &ValHeader) -> Result<()> {
        if val_attr_set.is_empty() {
            return Ok(());
        }
        let idx = self.idx(rel_var_name)?;
        let AddAttrsPlan { sql, implicit_unique } = compose::compose_add_attrs(&self.rel_vars[idx], val_attr_set)?;
        exec(conn, &sql).await.map_err(Error::db)?;

        let rv = &mut self.rel_vars[idx];
        for val_attr in val_attr_set.iter() {
            rv.def_header.add(patsak_types::DefAttr::new(val_attr.name.clone(), val_attr.ty, None));
            rv.header.add(val_attr.as_attr());
        }
        if let Some(key) = implicit_unique {
            rv.unique_key_set.push(key);
        }
        Ok(())
    }

    pub async fn drop_attrs(&mut self, conn: &mut PgConnection, rel_var_name: &str, attr_names: &NameSet) -> Result<()> {
        if attr_names.is_empty() {
            return Ok(());
        }
        let idx = self.idx(rel_var_name)?;
        let DropAttrsPlan { sql, new_def_header, new_unique_key_set, new_foreign_key_set } =
            compose::compose_drop_attrs(&self.rel_vars[idx], attr_names)?;

        exec_safely(conn, &sql).await.map_err(|e| classify_drop_attrs_error(&e))?;

        let rv = &mut self.rel_vars[idx];
        rv.def_header = new_def_header;
        rv.header = Header::from_def_header(&rv.def_header);
        rv.unique_key_set = new_unique_key_set;
        rv.foreign_key_set = new_foreign_key_set;
        Ok(())
    }

    pub async fn add_default(&mut self, conn: &mut PgConnection, rel_var_name: &str, drafts: &[(String, Value)]) -> Result<()> {
        if drafts.is_empty() {
            return Ok(());
        }
        let idx = self.idx(rel_var_name)?;
        let AddDefaultPlan { sql, new_def_header } = compose::compose_add_default(&self.rel_vars[idx], drafts)?;
        exec(conn, &sql).await.map_err(Error::db)?;
        self.rel_vars[idx].def_header = new_def_header;
        Ok(())
    }

    pub async fn drop_default(&mut self, conn: &mut PgConnection, rel_var_name: &str, attr_names: &NameSet) -> Result<()> {
        if attr_names.is_empty() {
            return Ok(());
        }
        let idx = self.idx(rel_var_name)?;
        let DropDefaultPlan { sql, new_def_header } = compose::compose_drop_default(&self.rel_vars[idx], attr_names)?;
        exec(conn, &sql).await.map_err(Error::db)?;
        self.rel_vars[idx].def_header = new_def_header;
        Ok(())
    }

    pub async fn add_constrs(
        &mut self,
        conn: &mut PgConnection,
        rel_var_name: &str,
        unique_key_set: Vec<NameSet>,
        foreign_key_set: Vec<ForeignKey>,
        checks: &[String],
    ) -> Result<()> {
        let idx = self.idx(rel_var_name)?;
        let plan = compose::compose_add_constrs(&*self, &self.rel_vars[idx], unique_key_set, foreign_key_set, checks, &|n| self.lookup_for_fk(n))?;
        let AddConstrsPlan { sql, unique_key_set, foreign_key_set } = plan;
        if sql.is_empty() {
            return Ok(());
        }
        exec_safely(conn, &sql).await.map_err(classify_add_constrs_error)?;

        let rv = &mut self.rel_vars[idx];
        for key in unique_key_set {
            if !rv.has_unique_key(&key) {
                rv.unique_key_set.push(key);
            }
        }
        for fk in foreign_key_set {
            if !rv.foreign_key_set.contains(&fk) {
                rv.foreign_key_set.push(fk);
            }
        }
        Ok(())
    }

    pub async fn drop_all_constrs(&mut self, conn: &mut PgConnection, rel_var_name: &str) -> Result<()> {
        let idx = self.idx(rel_var_name)?;
        let Some((sql, implicit_key)) = compose::compose_drop_all_constrs(&self.rel_vars[idx]) else {
            return Ok(());
        };
        exec_safely(conn, &sql).await.map_err(classify_drop_all_constrs_error)?;
        let rv = &mut self.rel_vars[idx];
        rv.unique_key_set = vec![implicit_key];
        rv.foreign_key_set.clear();
        Ok(())
    }
}

impl patsak_sql::CatalogView for Meta {
    fn get_header(&self, rel_var: &str) -> patsak_sql::Result<Header> {
        Ok(self.get(rel_var).map_err(|e| patsak_sql::Error::query(e.to_string()))?.header().clone())
    }

    fn follow_reference(&self, rel_var: &str, key_attrs: &[String]) -> patsak_sql::Result<(String, Vec<String>)> {
        let rv = self.get(rel_var).map_err(|e| patsak_sql::Error::query(e.to_string()))?;
        let key: NameSet = key_attrs.iter().cloned().collect();
        let matches: Vec<&ForeignKey> = rv.foreign_key_set().iter().filter(|fk| crate::types::same_key(&fk.key_attr_names, &key)).collect();
        match matches.as_slice() {
            [fk] => Ok((fk.ref_rel_var_name.clone(), fk.ref_attr_names.iter().cloned().collect())),
            [] => Err(patsak_sql::Error::query("Foreign key not found")),
            _ => Err(patsak_sql::Error::query("Multiple foreign keys")),
        }
    }
}

async fn exec(conn: &mut PgConnection, sql: &str) -> std::result::Result<(), sqlx::Error> {
    sqlx::raw_sql(sql).execute(conn).await?;
    Ok(())
}

/// Runs `sql` inside a savepoint (sqlx's nested transaction) so a failure
/// rolls back only this statement batch, not the enclosing work unit.
async fn exec_safely(conn: &mut PgConnection, sql: &str) -> std::result::Result<(), sqlx::Error> {
    let mut savepoint = sqlx::Acquire::begin(conn).await?;
    sqlx::raw_sql(sql).execute(&mut *savepoint).await?;
    savepoint.commit().await
}

fn db_error_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    db_error_code(e).as_deref() == Some("23505")
}

fn classify_drop_attrs_error(e: &sqlx::Error) -> Error {
    if is_unique_violation(e) {
        Error::constraint("Cannot drop attributes because remaining tuples have duplicates")
    } else {
        Error::dependency("Cannot drop attribute because it is referenced from other relation variable")
    }
}

fn classify_add_constrs_error(e: sqlx::Error) -> Error {
    match db_error_code(&e).as_deref() {
        Some("23505") => Error::constraint("Unique constraint cannot be added"),
        Some("23503") => Error::constraint("Foreign key constraint cannot be added"),
        Some("23514") => Error::constraint("Check constraint cannot be added"),
        _ => Error::db(e),
    }
}

/// Class 54 (`program_limit_exceeded`) covers index-entry-too-long — the
/// SQLSTATE-class check that replaces matching on the raw error message.
fn classify_drop_all_constrs_error(e: sqlx::Error) -> Error {
    match db_error_code(&e) {
        Some(code) if code.starts_with("54") => Error::quota("Unique string is too long"),
        _ => Error::dependency("Unique cannot be dropped because other RelVar references it"),
    }
}
