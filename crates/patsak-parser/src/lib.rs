//! Recursive-descent parser turning QL source text into a [`patsak_ast`]
//! tree, resolving rangevar names along the way.

mod display;
mod error;
mod grammar;
mod lexer;
mod scope;

use patsak_ast::{Expr, Rel};

pub use error::{Error, Result};

pub use display::{print_expr, print_rel};

/// Parse a full relational expression (`for`/`union`/`select`).
pub fn parse_rel(input: &str) -> Result<Rel> {
    let mut parser = grammar::Parser::new(input);
    let rel = parser.rel()?;
    parser.finish()?;
    Ok(rel)
}

/// Parse a standalone scalar expression — used for CHECK-constraint bodies,
/// where there is no enclosing rangevar scope and field references resolve
/// against a header supplied directly by the caller.
pub fn parse_expr(input: &str) -> Result<Expr> {
    let mut parser = grammar::Parser::new(input);
    let expr = parser.expr()?;
    parser.finish()?;
    Ok(expr)
}

pub mod prelude {
    pub use crate::{parse_expr, parse_rel, print_expr, print_rel, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_rangevar_select() {
        let rel = parse_rel("User").unwrap();
        assert_eq!(print_rel(&rel), "User");
    }

    #[test]
    fn parses_where_clause() {
        let rel = parse_rel("User where flooder").unwrap();
        assert_eq!(print_rel(&rel), "User where flooder");
    }

    #[test]
    fn parses_for_with_dotted_field() {
        // The `for` scaffolding disappears; only the inner select survives,
        // with `x` already resolved to the `r` rangevar it was bound to.
        let rel = parse_rel("for (x in r) x.name").unwrap();
        assert_eq!(print_rel(&rel), "x.name");
    }

    #[test]
    fn parses_named_header() {
        // x/y resolve to implicit top-level rangevars; undeclared names are
        // a translate-time concern (missing RelVar), not a parse-time one.
        let rel = parse_rel("{name: x, age: y}").unwrap();
        assert_eq!(print_rel(&rel), "{name: x, age: y}");
    }

    #[test]
    fn parses_union_of_two() {
        let rel = parse_rel("union(A, B)").unwrap();
        assert_eq!(print_rel(&rel), "union(A, B)");
    }

    #[test]
    fn rejects_dollar_space_digit() {
        // The digit must be adjacent to `$`; with whitespace between them
        // "$" parses as a bare positional arg and " 1" is left as trailing
        // garbage, which `finish` rejects.
        assert!(parse_expr("$ 1").is_err());
    }

    #[test]
    fn bare_dollar_is_always_positional_arg_one() {
        let expr = parse_expr("$ + $").unwrap();
        assert_eq!(print_expr(&expr), "($1 + $1)");
    }

    #[test]
    fn dollar_digit_is_explicit_positional_arg() {
        let expr = parse_expr("$2 + $1").unwrap();
        assert_eq!(print_expr(&expr), "($2 + $1)");
    }

    #[test]
    fn rejects_bare_number_as_rel() {
        assert!(parse_rel("1").is_err());
    }

    #[test]
    fn rejects_duplicate_rvdef_name() {
        let err = parse_rel("for (x, x in r) x").unwrap_err();
        assert_eq!(err, Error::Query("Duplicating items in a list".to_string()));
    }

    #[test]
    fn rejects_unknown_quantifier_keyword() {
        assert!(parse_rel("foreach (a, a) true").is_err());
    }

    #[test]
    fn rejects_duplicate_quantifier_ids() {
        let err = parse_expr("forsome (a, a) true").unwrap_err();
        assert_eq!(err, Error::Query("Duplicating items in a list".to_string()));
    }

    #[test]
    fn parses_quant_over_existing_rangevars() {
        // The bracket form of `quant` reuses `x` as already bound by the
        // enclosing `for`, rather than introducing a fresh rangevar.
        let rel = parse_rel("for (x in r) x where forall (x) true").unwrap();
        assert_eq!(print_rel(&rel), "x where forall (x) true");
    }

    #[test]
    fn parses_binary_arithmetic_precedence() {
        let e = parse_expr("1 + 2 * 3").unwrap();
        assert_eq!(print_expr(&e), "(1 + (2 * 3))");
    }
}
