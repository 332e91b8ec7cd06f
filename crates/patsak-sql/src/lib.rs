mod catalog_view;
mod error;
mod identifier;
mod rvset;
mod translator;

pub use catalog_view::CatalogView;
pub use error::{Error, Result};
pub use identifier::{escape_ident, quote_literal};
pub use translator::Translator;

pub mod prelude {
    pub use crate::{escape_ident, quote_literal, CatalogView, Error, Result, Translator};
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use patsak_types::{Attr, Header, Type, Value};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct MockCatalog {
        headers: HashMap<String, Header>,
        // rel_var -> (key attrs, referenced rel_var, referenced attrs)
        refs: HashMap<(String, Vec<String>), (String, Vec<String>)>,
    }

    impl MockCatalog {
        fn new() -> Self {
            Self {
                headers: HashMap::new(),
                refs: HashMap::new(),
            }
        }

        fn with_header(mut self, rel_var: &str, attrs: Vec<(&str, Type)>) -> Self {
            let header: Header = attrs.into_iter().map(|(n, t)| Attr::new(n, t)).collect();
            self.headers.insert(rel_var.to_string(), header);
            self
        }

        fn with_reference(mut self, rel_var: &str, key: &[&str], ref_rel_var: &str, ref_key: &[&str]) -> Self {
            self.refs.insert(
                (rel_var.to_string(), key.iter().map(|s| s.to_string()).collect()),
                (ref_rel_var.to_string(), ref_key.iter().map(|s| s.to_string()).collect()),
            );
            self
        }
    }

    impl CatalogView for MockCatalog {
        fn get_header(&self, rel_var: &str) -> Result<Header> {
            self.headers
                .get(rel_var)
                .cloned()
                .ok_or_else(|| Error::query(format!("No such RelVar: {rel_var}")))
        }

        fn follow_reference(&self, rel_var: &str, key_attrs: &[String]) -> Result<(String, Vec<String>)> {
            self.refs
                .get(&(rel_var.to_string(), key_attrs.to_vec()))
                .cloned()
                .ok_or_else(|| Error::query(format!("No such reference from {rel_var}")))
        }
    }

    fn user_catalog() -> MockCatalog {
        MockCatalog::new().with_header(
            "User",
            vec![
                ("id", Type::Serial),
                ("name", Type::String),
                ("flooder", Type::Boolean),
                ("age", Type::Number),
            ],
        )
    }

    #[test]
    fn translates_header_of_positional_literals() {
        let catalog = MockCatalog::new();
        let mut t = Translator::new(&catalog);
        let (sql, header) = t
            .translate_query("{name: $1, age: $2}", &[Value::string("anton"), Value::number(23.0)], &[], &[], 0, None)
            .unwrap();
        assert_eq!(sql, r#"SELECT DISTINCT 'anton' AS "name", 23 AS "age""#);
        assert_eq!(header.attr_type("name"), Some(Type::String));
        assert_eq!(header.attr_type("age"), Some(Type::Number));
    }

    #[test]
    fn translates_bare_rangevar_select() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let (sql, _) = t.translate_query("User", &[], &[], &[], 0, None).unwrap();
        assert_eq!(sql, r#"SELECT DISTINCT "User".* FROM "User""#);
    }

    #[test]
    fn translates_order_by_with_params_limit_and_offset() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let (sql, _) = t
            .translate_query(
                "User",
                &[],
                &["id % $1", "name + $2"],
                &[Value::number(42.0), Value::string("abc")],
                3,
                Some(4),
            )
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT * FROM (SELECT DISTINCT "User".* FROM "User") AS "@" ORDER BY ("@"."id" % 42), ("@"."name" || 'abc') LIMIT 4 OFFSET 3"#
        );
    }

    #[test]
    fn translates_count_of_filtered_select() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let sql = t.translate_count("User where id % $ == 0", &[Value::number(2.0)]).unwrap();
        assert_eq!(
            sql,
            r#"SELECT COUNT(*) FROM (SELECT DISTINCT "User".* FROM "User" WHERE (("User"."id" % 2) = 0)) AS "@""#
        );
    }

    #[test]
    fn translates_delete_with_where() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let sql = t.translate_delete("User", "id % $ == 0", &[Value::number(2.0)]).unwrap();
        assert_eq!(sql, r#"DELETE FROM "User" WHERE (("User"."id" % 2) = 0)"#);
    }

    #[test]
    fn translates_update_with_multiple_set_clauses() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let mut expr_map = IndexMap::new();
        expr_map.insert("flooder".to_string(), "id==0 || !flooder".to_string());
        expr_map.insert("name".to_string(), "name+id+$".to_string());
        let sql = t
            .translate_update("User", None, &[], &expr_map, &[Value::string("abc")])
            .unwrap();
        assert!(sql.starts_with(r#"UPDATE "User" SET "flooder" = "#));
        assert!(sql.contains(r#""name" = (("User"."name" || to_string("User"."id")) || 'abc')"#));
    }

    #[test]
    fn translates_foreign_key_dereference() {
        let catalog = MockCatalog::new()
            .with_header("s", vec![("sid", Type::Integer), ("sname", Type::String)])
            .with_header("sp", vec![("sid", Type::Integer), ("pid", Type::Integer)])
            .with_reference("sp", &["sid"], "s", &["sid"]);
        let mut t = Translator::new(&catalog);
        let (sql, _) = t.translate_query("sp.sid->sname", &[], &[], &[], 0, None).unwrap();
        assert_eq!(
            sql,
            r#"SELECT DISTINCT (SELECT "s"."sname" FROM "s" WHERE "sp"."sid" = "s"."sid") AS "sname" FROM "sp""#
        );
    }

    #[test]
    fn translates_universal_quantifier() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let header = catalog.get_header("User").unwrap();
        let sql = t.translate_expr("forall (x in User) x.age > 18", "User", &header).unwrap();
        assert_eq!(sql, r#"(NOT EXISTS (SELECT 1 FROM "User" WHERE NOT ("User"."age" > 18)))"#);
    }

    #[test]
    fn union_of_mismatched_headers_fails() {
        let catalog = MockCatalog::new()
            .with_header("A", vec![("x", Type::Number)])
            .with_header("B", vec![("x", Type::String)]);
        let mut t = Translator::new(&catalog);
        let err = t.translate_query("union(A, B)", &[], &[], &[], 0, None).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn where_clause_referencing_an_unbound_rangevar_fails() {
        let catalog = MockCatalog::new()
            .with_header("User", vec![("id", Type::Serial)])
            .with_header("Post", vec![("id", Type::Serial)]);
        let mut t = Translator::new(&catalog);
        let err = t.translate_query("User where Post.id", &[], &[], &[], 0, None).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn empty_update_field_set_fails() {
        let catalog = user_catalog();
        let mut t = Translator::new(&catalog);
        let expr_map = IndexMap::new();
        let err = t.translate_update("User", None, &[], &expr_map, &[]).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
    }
}
