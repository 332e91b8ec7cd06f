//! Pure SQL-composition and validation logic for RelVar mutation. Kept
//! free of any backend I/O so it's exercised directly in tests; the async
//! orchestration in `meta.rs` executes the strings this module builds and
//! applies the returned in-memory deltas on success.

use patsak_sql::{escape_ident, quote_literal, CatalogView};
use patsak_types::{Attr, DefAttr, DefHeader, Header, NameSet, Type, ValHeader, Value};

use crate::error::{Error, Result};
use crate::types::{same_key, ForeignKey, RelVar, MAX_ATTR_COUNT, MAX_NAME_LEN, MAX_REL_VAR_COUNT};

pub fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::value("Identifier can't be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::quota(format!("RelVar and attribute name length must be no more than {MAX_NAME_LEN} characters")));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if first != '_' && !first.is_ascii_alphabetic() {
        return Err(Error::value("First identifier character must be a letter or underscore"));
    }
    if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        return Err(Error::value("Identifier must consist only of letters, digits or underscores"));
    }
    Ok(())
}

pub fn check_attr_count(count: usize) -> Result<()> {
    if count > MAX_ATTR_COUNT {
        return Err(Error::quota(format!("Maximum attribute count is {MAX_ATTR_COUNT}")));
    }
    Ok(())
}

pub fn check_rel_var_count(count: usize) -> Result<()> {
    if count >= MAX_REL_VAR_COUNT {
        return Err(Error::quota(format!("Maximum RelVar count is {MAX_REL_VAR_COUNT}")));
    }
    Ok(())
}

fn seq_name(rel_var: &str, attr: &str) -> String {
    escape_ident(&format!("{rel_var}@{attr}"))
}

fn print_unique_key(header: &Header, key: &NameSet) -> Result<String> {
    if key.is_empty() {
        return Err(Error::value("Empty unique attribute set"));
    }
    for name in key {
        header.find(name).ok_or_else(|| Error::no_such_attr(name.clone()))?;
    }
    let names: Vec<String> = key.iter().map(|n| escape_ident(n)).collect();
    Ok(format!("UNIQUE ({})", names.join(", ")))
}

/// `ref_header`/`ref_unique_keys` must already be resolved by the caller —
/// either the RelVar under construction itself (self-referential FK) or an
/// existing RelVar fetched from `Meta`.
fn print_foreign_key(self_header: &Header, fk: &ForeignKey, ref_header: &Header, ref_unique_keys: &[NameSet]) -> Result<String> {
    if fk.key_attr_names.len() != fk.ref_attr_names.len() {
        return Err(Error::value("Ref-key attribute set size mismatch"));
    }
    if fk.key_attr_names.is_empty() {
        return Err(Error::value("Foreign key with empty attribute set"));
    }
    for (key_name, ref_name) in fk.key_attr_names.iter().zip(fk.ref_attr_names.iter()) {
        let key_attr = self_header.find(key_name).ok_or_else(|| Error::no_such_attr(key_name.clone()))?;
        let ref_attr = ref_header.find(ref_name).ok_or_else(|| Error::no_such_attr(ref_name.clone()))?;
        let compatible = key_attr.ty == ref_attr.ty
            || (key_attr.ty == Type::Integer && ref_attr.ty == Type::Serial)
            || (key_attr.ty == Type::Serial && ref_attr.ty == Type::Integer);
        if !compatible {
            return Err(Error::constraint(format!(
                "Foreign key attribute type mismatch: \"{key_name}\" is {}, \"{}.{ref_name}\" is {}",
                key_attr.ty.ql_name(),
                fk.ref_rel_var_name,
                ref_attr.ty.ql_name(),
            )));
        }
    }
    if !ref_unique_keys.iter().any(|k| same_key(k, &fk.ref_attr_names)) {
        return Err(Error::constraint("Foreign key ref attributes must be unique"));
    }
    let key_names: Vec<String> = fk.key_attr_names.iter().map(|n| escape_ident(n)).collect();
    let ref_names: Vec<String> = fk.ref_attr_names.iter().map(|n| escape_ident(n)).collect();
    Ok(format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        key_names.join(", "),
        escape_ident(&fk.ref_rel_var_name),
        ref_names.join(", "),
    ))
}

pub struct CreatePlan {
    pub rel_var: RelVar,
    pub sql: String,
}

/// Compose the full `CREATE SEQUENCE ... ; CREATE TABLE ... ; ALTER SEQUENCE
/// ... OWNED BY ...` batch for a new RelVar. `lookup_ref` resolves a
/// non-self foreign key's referenced RelVar (header + unique keys).
pub fn compose_create(
    catalog: &dyn CatalogView,
    name: &str,
    def_header: DefHeader,
    mut unique_key_set: Vec<NameSet>,
    foreign_key_set: Vec<ForeignKey>,
    checks: &[String],
    lookup_ref: &dyn Fn(&str) -> Result<(Header, Vec<NameSet>)>,
) -> Result<CreatePlan> {
    check_name(name)?;
    check_attr_count(def_header.len())?;
    for attr in def_header.iter() {
        check_name(&attr.name)?;
    }
    let header = Header::from_def_header(&def_header);

    if unique_key_set.is_empty() && !def_header.is_empty() {
        let key: NameSet = def_header.iter().map(|a| a.name.clone()).collect();
        unique_key_set.push(key);
    }

    let mut sql = String::new();
    for attr in header.iter() {
        if attr.ty == Type::Serial {
            sql.push_str(&format!("CREATE SEQUENCE {} MINVALUE 0 START 0; ", seq_name(name, &attr.name)));
        }
    }

    let mut parts = Vec::new();
    for def_attr in def_header.iter() {
        let mut part = format!("{} {} NOT NULL", escape_ident(&def_attr.name), def_attr.ty.backend_name());
        if let Some(default) = &def_attr.default {
            part.push_str(&format!(" DEFAULT {}", default.render(&quote_literal)));
        } else if def_attr.ty == Type::Serial {
            part.push_str(&format!(" DEFAULT nextval({})", quote_literal(&seq_name(name, &def_attr.name))));
        }
        parts.push(part);
    }
    for key in &unique_key_set {
        parts.push(print_unique_key(&header, key)?);
    }
    for fk in &foreign_key_set {
        let (ref_header, ref_keys) = if fk.ref_rel_var_name == name {
            (header.clone(), unique_key_set.clone())
        } else {
            lookup_ref(&fk.ref_rel_var_name)?
        };
        parts.push(print_foreign_key(&header, fk, &ref_header, &ref_keys)?);
    }
    for check in checks {
        let mut translator = patsak_sql::Translator::new(catalog);
        let rendered = translator.translate_expr(check, name, &header)?;
        parts.push(format!("CHECK ({rendered})"));
    }

    sql.push_str(&format!("CREATE TABLE {} ({});", escape_ident(name), parts.join(", ")));

    for attr in header.iter() {
        if attr.ty == Type::Serial {
            sql.push_str(&format!(
                " ALTER SEQUENCE {} OWNED BY {}.{};",
                seq_name(name, &attr.name),
                escape_ident(name),
                escape_ident(&attr.name),
            ));
        }
    }

    Ok(CreatePlan {
        rel_var: RelVar { name: name.to_string(), def_header, header, unique_key_set, foreign_key_set },
        sql,
    })
}

pub struct AddAttrsPlan {
    pub sql: String,
    pub implicit_unique: Option<NameSet>,
}

/// `ADD` + `UPDATE ... SET` + `SET NOT NULL`, conditionally `ADD UNIQUE(<all>)`
/// when the RelVar was previously empty.
pub fn compose_add_attrs(rel_var: &RelVar, val_attr_set: &ValHeader) -> Result<AddAttrsPlan> {
    check_attr_count(rel_var.header.len() + val_attr_set.len())?;
    for val_attr in val_attr_set.iter() {
        check_name(&val_attr.name)?;
        if rel_var.header.find(&val_attr.name).is_some() {
            return Err(Error::attr_exists(val_attr.name.clone()));
        }
        if val_attr.ty == Type::Serial {
            return Err(Error::not_implemented("Adding a serial attribute is not supported"));
        }
    }

    let mut sql = format!("ALTER TABLE {} ", escape_ident(&rel_var.name));
    let adds: Vec<String> = val_attr_set.iter().map(|a| format!("ADD {} {}", escape_ident(&a.name), a.ty.backend_name())).collect();
    sql.push_str(&adds.join(", "));
    sql.push_str(&format!("; UPDATE {} SET ", escape_ident(&rel_var.name)));
    let sets: Vec<String> = val_attr_set.iter().map(|a| format!("{} = {}", escape_ident(&a.name), a.value.render(&quote_literal))).collect();
    sql.push_str(&sets.join(", "));
    sql.push_str(&format!("; ALTER TABLE {} ", escape_ident(&rel_var.name)));
    let not_nulls: Vec<String> = val_attr_set.iter().map(|a| format!("ALTER {} SET NOT NULL", escape_ident(&a.name))).collect();
    sql.push_str(&not_nulls.join(", "));

    let mut implicit_unique = None;
    if rel_var.header.is_empty() {
        let key: NameSet = val_attr_set.iter().map(|a| a.name.clone()).collect();
        let names: Vec<String> = key.iter().map(|n| escape_ident(n)).collect();
        sql.push_str(&format!(", ADD UNIQUE ({})", names.join(", ")));
        implicit_unique = Some(key);
    }
    sql.push(';');

    Ok(AddAttrsPlan { sql, implicit_unique })
}

pub struct DropAttrsPlan {
    pub sql: String,
    pub new_def_header: DefHeader,
    pub new_unique_key_set: Vec<NameSet>,
    pub new_foreign_key_set: Vec<ForeignKey>,
}

pub fn compose_drop_attrs(rel_var: &RelVar, attr_names: &NameSet) -> Result<DropAttrsPlan> {
    for name in attr_names {
        if rel_var.header.find(name).is_none() {
            return Err(Error::no_such_attr(name.clone()));
        }
    }
    let new_def_header: DefHeader = rel_var.def_header.iter().filter(|a| !attr_names.contains(&a.name)).cloned().collect();
    let (mut new_unique_key_set, new_foreign_key_set) = rel_var.keys_surviving_drop(attr_names);

    let mut sql = format!("ALTER TABLE {} ", escape_ident(&rel_var.name));
    let drops: Vec<String> = attr_names.iter().map(|n| format!("DROP {}", escape_ident(n))).collect();
    sql.push_str(&drops.join(", "));

    if new_unique_key_set.is_empty() && !new_def_header.is_empty() {
        let key: NameSet = new_def_header.iter().map(|a| a.name.clone()).collect();
        let names: Vec<String> = key.iter().map(|n| escape_ident(n)).collect();
        sql.push_str(&format!(", ADD UNIQUE ({})", names.join(", ")));
        new_unique_key_set.push(key);
    }
    sql.push(';');

    Ok(DropAttrsPlan { sql, new_def_header, new_unique_key_set, new_foreign_key_set })
}

pub struct AddDefaultPlan {
    pub sql: String,
    pub new_def_header: DefHeader,
}

pub fn compose_add_default(rel_var: &RelVar, drafts: &[(String, Value)]) -> Result<AddDefaultPlan> {
    let mut sql = format!("ALTER TABLE {} ", escape_ident(&rel_var.name));
    let mut parts = Vec::with_capacity(drafts.len());
    for (name, _) in drafts {
        rel_var.def_header.find(name).ok_or_else(|| Error::no_such_attr(name.clone()))?;
    }
    for (name, value) in drafts {
        parts.push(format!("ALTER {} SET DEFAULT {}", escape_ident(name), value.render(&quote_literal)));
    }
    sql.push_str(&parts.join(", "));
    sql.push(';');

    // Rebuild in original attribute order, swapping in the new defaults.
    let new_def_header: DefHeader = rel_var
        .def_header
        .iter()
        .map(|a| match drafts.iter().find(|(n, _)| n == &a.name) {
            Some((_, v)) => DefAttr::new(a.name.clone(), a.ty, Some(v.clone())),
            None => a.clone(),
        })
        .collect();
    Ok(AddDefaultPlan { sql, new_def_header })
}

pub struct DropDefaultPlan {
    pub sql: String,
    pub new_def_header: DefHeader,
}

pub fn compose_drop_default(rel_var: &RelVar, attr_names: &NameSet) -> Result<DropDefaultPlan> {
    let mut sql = format!("ALTER TABLE {} ", escape_ident(&rel_var.name));
    let mut parts = Vec::with_capacity(attr_names.len());
    for name in attr_names {
        let def_attr = rel_var.def_header.find(name).ok_or_else(|| Error::no_such_attr(name.clone()))?;
        if def_attr.default.is_none() {
            return Err(Error::db(format!("Attribute \"{name}\" has no default value")));
        }
        parts.push(format!("ALTER {} DROP DEFAULT", escape_ident(name)));
    }
    sql.push_str(&parts.join(", "));
    sql.push(';');

    let new_def_header: DefHeader = rel_var
        .def_header
        .iter()
        .map(|a| if attr_names.contains(&a.name) { DefAttr::new(a.name.clone(), a.ty, None) } else { a.clone() })
        .collect();
    Ok(DropDefaultPlan { sql, new_def_header })
}

pub struct AddConstrsPlan {
    pub sql: String,
    pub unique_key_set: Vec<NameSet>,
    pub foreign_key_set: Vec<ForeignKey>,
}

pub fn compose_add_constrs(
    catalog: &dyn CatalogView,
    rel_var: &RelVar,
    unique_key_set: Vec<NameSet>,
    foreign_key_set: Vec<ForeignKey>,
    checks: &[String],
    lookup_ref: &dyn Fn(&str) -> Result<(Header, Vec<NameSet>)>,
) -> Result<AddConstrsPlan> {
    if unique_key_set.is_empty() && foreign_key_set.is_empty() && checks.is_empty() {
        return Ok(AddConstrsPlan { sql: String::new(), unique_key_set, foreign_key_set });
    }
    let mut parts = Vec::new();
    for key in &unique_key_set {
        parts.push(format!("ADD {}", print_unique_key(&rel_var.header, key)?));
    }
    for fk in &foreign_key_set {
        let (ref_header, ref_keys) = if fk.ref_rel_var_name == rel_var.name {
            (rel_var.header.clone(), rel_var.unique_key_set.clone())
        } else {
            lookup_ref(&fk.ref_rel_var_name)?
        };
        parts.push(format!("ADD {}", print_foreign_key(&rel_var.header, fk, &ref_header, &ref_keys)?));
    }
    for check in checks {
        let mut translator = patsak_sql::Translator::new(catalog);
        let rendered = translator.translate_expr(check, &rel_var.name, &rel_var.header)?;
        parts.push(format!("ADD CHECK ({rendered})"));
    }
    let sql = format!("ALTER TABLE {} {};", escape_ident(&rel_var.name), parts.join(", "));
    Ok(AddConstrsPlan { sql, unique_key_set, foreign_key_set })
}

/// `drop_all_constrs(name)` then re-add the implicit all-attrs unique key.
pub fn compose_drop_all_constrs(rel_var: &RelVar) -> Option<(String, NameSet)> {
    if rel_var.header.is_empty() {
        return None;
    }
    let key: NameSet = rel_var.header.iter().map(|a: &Attr| a.name.clone()).collect();
    let names: Vec<String> = key.iter().map(|n| escape_ident(n)).collect();
    let sql = format!(
        "SELECT drop_all_constrs({}); ALTER TABLE {} ADD UNIQUE ({});",
        quote_literal(&rel_var.name),
        escape_ident(&rel_var.name),
        names.join(", "),
    );
    Some((sql, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct NoopCatalog;
    impl CatalogView for NoopCatalog {
        fn get_header(&self, rel_var: &str) -> patsak_sql::Result<Header> {
            Err(patsak_sql::Error::query(format!("no such rel var: {rel_var}")))
        }
        fn follow_reference(&self, _rel_var: &str, _key_attrs: &[String]) -> patsak_sql::Result<(String, Vec<String>)> {
            Err(patsak_sql::Error::query("not implemented"))
        }
    }

    fn no_lookup() -> impl Fn(&str) -> Result<(Header, Vec<NameSet>)> {
        |name: &str| Err(Error::no_such_rel_var(name))
    }

    fn user_def_header() -> DefHeader {
        vec![
            DefAttr::new("id", Type::Serial, None),
            DefAttr::new("name", Type::String, None),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn check_name_rejects_empty_and_leading_digit() {
        assert!(check_name("").is_err());
        assert!(check_name("1abc").is_err());
        assert!(check_name("_ok").is_ok());
        assert!(check_name("Ok_2").is_ok());
    }

    #[test]
    fn check_name_rejects_punctuation() {
        assert!(check_name("a-b").is_err());
        assert!(check_name("a b").is_err());
    }

    #[test]
    fn check_name_rejects_over_max_len() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(check_name(&long).is_err());
        let max = "a".repeat(MAX_NAME_LEN);
        assert!(check_name(&max).is_ok());
    }

    #[test]
    fn compose_create_emits_sequence_and_implicit_unique() {
        let plan = compose_create(&NoopCatalog, "User", user_def_header(), Vec::new(), Vec::new(), &[], &no_lookup()).unwrap();
        assert!(plan.sql.contains(r#"CREATE SEQUENCE "User@id" MINVALUE 0 START 0;"#));
        assert!(plan.sql.contains(r#"CREATE TABLE "User" ("id" int4 NOT NULL DEFAULT nextval('"User@id"'), "name" text NOT NULL, UNIQUE ("id", "name"))"#));
        assert!(plan.sql.contains(r#"ALTER SEQUENCE "User@id" OWNED BY "User"."id";"#));
        assert_eq!(plan.rel_var.unique_key_set().len(), 1);
    }

    #[test]
    fn compose_create_rejects_bad_attr_name() {
        let header: DefHeader = vec![DefAttr::new("1bad", Type::String, None)].into_iter().collect();
        let err = compose_create(&NoopCatalog, "T", header, Vec::new(), Vec::new(), &[], &no_lookup()).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
    }

    #[test]
    fn compose_create_rejects_too_many_attrs() {
        let header: DefHeader = (0..MAX_ATTR_COUNT + 1).map(|i| DefAttr::new(format!("a{i}"), Type::String, None)).collect();
        let err = compose_create(&NoopCatalog, "T", header, Vec::new(), Vec::new(), &[], &no_lookup()).unwrap_err();
        assert!(matches!(err, Error::Quota(_)));
    }

    #[test]
    fn compose_create_self_referential_fk_resolves_against_itself() {
        let header: DefHeader = vec![
            DefAttr::new("id", Type::Integer, None),
            DefAttr::new("parent_id", Type::Integer, None),
        ]
        .into_iter()
        .collect();
        let unique_key_set = vec![vec!["id".to_string()].into_iter().collect()];
        let fk = ForeignKey::new(vec!["parent_id".to_string()].into_iter().collect(), "Node", vec!["id".to_string()].into_iter().collect());
        let plan = compose_create(&NoopCatalog, "Node", header, unique_key_set, vec![fk], &[], &no_lookup()).unwrap();
        assert!(plan.sql.contains(r#"FOREIGN KEY ("parent_id") REFERENCES "Node" ("id")"#));
    }

    #[test]
    fn compose_add_attrs_marks_new_attr_as_unique_when_rel_var_was_empty() {
        let rel_var = RelVar::from_def_header("Empty".to_string(), DefHeader::new());
        let val_attr_set: ValHeader = vec![patsak_types::ValAttr::new("id", Type::Integer, Value::integer(0))].into_iter().collect();
        let plan = compose_add_attrs(&rel_var, &val_attr_set).unwrap();
        assert!(plan.sql.contains("ADD UNIQUE"));
        assert_eq!(plan.implicit_unique.unwrap().len(), 1);
    }

    #[test]
    fn compose_add_attrs_rejects_duplicate_name() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let val_attr_set: ValHeader = vec![patsak_types::ValAttr::new("name", Type::String, Value::string("x"))].into_iter().collect();
        let err = compose_add_attrs(&rel_var, &val_attr_set).unwrap_err();
        assert!(matches!(err, Error::AttrExists(_)));
    }

    #[test]
    fn compose_add_attrs_rejects_serial() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let val_attr_set: ValHeader = vec![patsak_types::ValAttr::new("rank", Type::Serial, Value::serial(1))].into_iter().collect();
        let err = compose_add_attrs(&rel_var, &val_attr_set).unwrap_err();
        assert!(matches!(err, Error::NotImplemented(_)));
    }

    #[test]
    fn compose_drop_attrs_drops_dependent_keys_and_readds_implicit_unique() {
        let mut rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        rel_var.unique_key_set.push(vec!["id".to_string()].into_iter().collect());
        rel_var.unique_key_set.push(vec!["name".to_string()].into_iter().collect());
        let dropped: NameSet = vec!["name".to_string()].into_iter().collect();
        let plan = compose_drop_attrs(&rel_var, &dropped).unwrap();
        assert!(plan.sql.contains(r#"DROP "name""#));
        assert_eq!(plan.new_def_header.len(), 1);
        // the dropped name's own key vanished, but nothing re-added it since
        // the surviving id-only key already exists.
        assert_eq!(plan.new_unique_key_set.len(), 1);
    }

    #[test]
    fn compose_drop_attrs_rejects_unknown_attr() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let bad: NameSet = vec!["nope".to_string()].into_iter().collect();
        let err = compose_drop_attrs(&rel_var, &bad).unwrap_err();
        assert!(matches!(err, Error::NoSuchAttr(_)));
    }

    #[test]
    fn compose_add_default_preserves_attribute_order() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let drafts = vec![("id".to_string(), Value::integer(7))];
        let plan = compose_add_default(&rel_var, &drafts).unwrap();
        let names: Vec<&str> = plan.new_def_header.names().collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(plan.new_def_header.find("id").unwrap().default, Some(Value::integer(7)));
        assert!(plan.sql.contains(r#"ALTER "id" SET DEFAULT 7"#));
    }

    #[test]
    fn compose_drop_default_rejects_attr_without_default() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let names: NameSet = vec!["id".to_string()].into_iter().collect();
        let err = compose_drop_default(&rel_var, &names).unwrap_err();
        assert!(matches!(err, Error::Db(_)));
    }

    #[test]
    fn compose_drop_default_clears_only_named_attrs() {
        let mut def_header = user_def_header();
        def_header = def_header
            .iter()
            .map(|a| if a.name == "id" { DefAttr::new(a.name.clone(), a.ty, Some(Value::integer(0))) } else { a.clone() })
            .collect();
        let rel_var = RelVar::from_def_header("User".to_string(), def_header);
        let names: NameSet = vec!["id".to_string()].into_iter().collect();
        let plan = compose_drop_default(&rel_var, &names).unwrap();
        assert_eq!(plan.new_def_header.find("id").unwrap().default, None);
        assert_eq!(plan.new_def_header.find("name").unwrap().default, None);
    }

    #[test]
    fn compose_add_constrs_is_noop_for_empty_request() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let plan = compose_add_constrs(&NoopCatalog, &rel_var, Vec::new(), Vec::new(), &[], &no_lookup()).unwrap();
        assert!(plan.sql.is_empty());
    }

    #[test]
    fn compose_add_constrs_rejects_unknown_attr_in_unique_key() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let key: NameSet = vec!["nope".to_string()].into_iter().collect();
        let err = compose_add_constrs(&NoopCatalog, &rel_var, vec![key], Vec::new(), &[], &no_lookup()).unwrap_err();
        assert!(matches!(err, Error::NoSuchAttr(_)));
    }

    #[test]
    fn compose_drop_all_constrs_readds_all_attrs_unique() {
        let rel_var = RelVar::from_def_header("User".to_string(), user_def_header());
        let (sql, key) = compose_drop_all_constrs(&rel_var).unwrap();
        assert!(sql.contains("SELECT drop_all_constrs('User')"));
        assert!(sql.contains(r#"ADD UNIQUE ("id", "name")"#));
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn compose_drop_all_constrs_is_none_for_zero_attr_rel_var() {
        let rel_var = RelVar::from_def_header("Empty".to_string(), DefHeader::new());
        assert!(compose_drop_all_constrs(&rel_var).is_none());
    }
}
