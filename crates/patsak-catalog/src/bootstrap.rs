//! SQL text to install the stored-procedure contract this crate's loader and
//! mutation layer assume are already present in a schema: the introspection
//! helpers `get_schema_tables`/`describe_table`/`describe_constrs`, the
//! meta-state counter `get_meta_state`/`set_meta_state`, `insert_into_empty`
//! for zero-attribute RelVars, and the `to_number`/`to_string`/`to_boolean`
//! cast functions the translator splices into generated SQL.
//!
//! Exercising this crate against a real database (rather than just its pure
//! `compose` unit tests) means running this against a throwaway schema
//! first; see the `#[ignore]`d integration tests in `patsak-db`.

/// Installs the full contract in whatever schema is `search_path`-first when
/// executed. Idempotent: safe to run against an already-bootstrapped schema.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS __patsak_meta_state (
    schema_name text PRIMARY KEY,
    version bigint NOT NULL DEFAULT 0
);

CREATE OR REPLACE FUNCTION get_meta_state(p_schema text) RETURNS bigint AS $$
DECLARE
    v bigint;
BEGIN
    SELECT version INTO v FROM __patsak_meta_state WHERE schema_name = p_schema;
    IF NOT FOUND THEN
        INSERT INTO __patsak_meta_state (schema_name, version) VALUES (p_schema, 0);
        RETURN 0;
    END IF;
    RETURN v;
END;
$$ LANGUAGE plpgsql;

CREATE OR REPLACE FUNCTION set_meta_state(p_schema text, p_version bigint) RETURNS void AS $$
BEGIN
    INSERT INTO __patsak_meta_state (schema_name, version) VALUES (p_schema, p_version)
    ON CONFLICT (schema_name) DO UPDATE SET version = excluded.version;
END;
$$ LANGUAGE plpgsql;

CREATE OR REPLACE FUNCTION get_schema_tables(p_schema text) RETURNS TABLE(name text) AS $$
    SELECT tablename::text FROM pg_tables
    WHERE schemaname = p_schema AND tablename <> '__patsak_meta_state'
    ORDER BY tablename;
$$ LANGUAGE sql STABLE;

CREATE OR REPLACE FUNCTION describe_table(p_table text) RETURNS TABLE(
    attr_name text,
    storage_type text,
    default_text text
) AS $$
    SELECT a.attname::text,
           format_type(a.atttypid, a.atttypmod),
           pg_get_expr(d.adbin, d.adrelid)
    FROM pg_attribute a
    LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
    WHERE a.attrelid = p_table::regclass AND a.attnum > 0 AND NOT a.attisdropped
    ORDER BY a.attnum;
$$ LANGUAGE sql STABLE;

CREATE OR REPLACE FUNCTION describe_constrs(p_table text) RETURNS TABLE(
    kind text,
    attr_idx integer[],
    ref_rel_var_name text,
    ref_idx integer[]
) AS $$
    SELECT c.contype::text,
           c.conkey::integer[],
           confrel.relname::text,
           c.confkey::integer[]
    FROM pg_constraint c
    LEFT JOIN pg_class confrel ON confrel.oid = c.confrelid
    WHERE c.conrelid = p_table::regclass AND c.contype IN ('p', 'u', 'f');
$$ LANGUAGE sql STABLE;

CREATE OR REPLACE FUNCTION insert_into_empty(p_table text) RETURNS SETOF record AS $$
BEGIN
    RETURN QUERY EXECUTE format('INSERT INTO %I DEFAULT VALUES RETURNING *', p_table);
END;
$$ LANGUAGE plpgsql;

CREATE OR REPLACE FUNCTION to_number(v anyelement) RETURNS double precision AS $$
    SELECT CASE
        WHEN pg_typeof(v) = 'boolean'::regtype THEN (CASE WHEN v::boolean THEN 1.0 ELSE 0.0 END)
        ELSE v::text::double precision
    END;
$$ LANGUAGE sql IMMUTABLE;

CREATE OR REPLACE FUNCTION to_string(v anyelement) RETURNS text AS $$
    SELECT v::text;
$$ LANGUAGE sql IMMUTABLE;

CREATE OR REPLACE FUNCTION to_boolean(v anyelement) RETURNS boolean AS $$
    SELECT CASE
        WHEN pg_typeof(v) IN ('double precision'::regtype, 'integer'::regtype, 'bigint'::regtype)
            THEN v::text::double precision <> 0
        ELSE v::text::boolean
    END;
$$ LANGUAGE sql IMMUTABLE;
"#;
