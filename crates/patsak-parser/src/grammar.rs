//! Recursive-descent grammar. Each method consumes a prefix of
//! `self.rest` and leaves the remainder for the next call; failures carry
//! the *original* full input text, per the "Wrong syntax" message shape.

use patsak_ast::{Expr, MultiField, Proto, RangeVar, Rel};
use patsak_types::{BinaryOp, UnaryOp, Value};

use crate::error::{Error, Result};
use crate::lexer::{self, is_ident_continue, skip_ws};
use crate::scope::ScopeStack;

pub struct Parser<'a> {
    original: &'a str,
    rest: &'a str,
    scopes: ScopeStack,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            original: input,
            rest: input,
            scopes: ScopeStack::new(),
        }
    }

    fn fail(&self) -> Error {
        Error::Syntax(self.original.to_string())
    }

    /// Call after the top-level production to reject trailing garbage.
    pub fn finish(&self) -> Result<()> {
        if skip_ws(self.rest).is_empty() {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    // --- token-level helpers -------------------------------------------------

    fn peek_char(&self, c: char) -> bool {
        skip_ws(self.rest).starts_with(c)
    }

    fn try_char(&mut self, c: char) -> bool {
        let trimmed = skip_ws(self.rest);
        if trimmed.starts_with(c) {
            self.rest = &trimmed[c.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: char) -> Result<()> {
        if self.try_char(c) {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    fn try_str(&mut self, s: &str) -> bool {
        let trimmed = skip_ws(self.rest);
        if trimmed.starts_with(s) {
            self.rest = &trimmed[s.len()..];
            true
        } else {
            false
        }
    }

    fn try_keyword(&mut self, kw: &str) -> bool {
        let trimmed = skip_ws(self.rest);
        if let Some(after) = trimmed.strip_prefix(kw) {
            let boundary_ok = after.chars().next().map(|c| !is_ident_continue(c)).unwrap_or(true);
            if boundary_ok {
                self.rest = after;
                return true;
            }
        }
        false
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.try_keyword(kw) {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    fn peek_keyword(&self, kw: &str) -> bool {
        let trimmed = skip_ws(self.rest);
        if let Some(after) = trimmed.strip_prefix(kw) {
            after.chars().next().map(|c| !is_ident_continue(c)).unwrap_or(true)
        } else {
            false
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        let trimmed = skip_ws(self.rest);
        match lexer::ident(trimmed) {
            Ok((rest, text)) if !lexer::is_keyword(text) => {
                self.rest = rest;
                Ok(text.to_string())
            }
            _ => Err(self.fail()),
        }
    }

    fn try_number(&mut self) -> Option<f64> {
        let trimmed = skip_ws(self.rest);
        if let Ok((rest, n)) = lexer::number(trimmed) {
            self.rest = rest;
            Some(n)
        } else {
            None
        }
    }

    fn try_string(&mut self) -> Option<String> {
        let trimmed = skip_ws(self.rest);
        if let Ok((rest, s)) = lexer::string_lit(trimmed) {
            self.rest = rest;
            Some(s)
        } else {
            None
        }
    }

    /// `id ("," id)*`, duplicate names fail `QUERY`.
    fn parse_id_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.parse_ident()?];
        while self.try_char(',') {
            names.push(self.parse_ident()?);
        }
        let mut seen = std::collections::HashSet::new();
        for n in &names {
            if !seen.insert(n.as_str()) {
                return Err(Error::Query("Duplicating items in a list".to_string()));
            }
        }
        Ok(names)
    }

    // --- rel := "for" rvdef rel | "union" "(" rel ("," rel)+ ")" | select ---

    pub fn rel(&mut self) -> Result<Rel> {
        if self.try_keyword("for") {
            let bindings = self.rvdef()?;
            self.scopes.enter_scope(bindings)?;
            let body = self.rel();
            self.scopes.exit_scope();
            return body;
        }
        if self.try_keyword("union") {
            self.expect_char('(')?;
            let mut rels = vec![self.rel()?];
            while self.try_char(',') {
                rels.push(self.rel()?);
            }
            self.expect_char(')')?;
            if rels.len() < 2 {
                return Err(self.fail());
            }
            let mut iter = rels.into_iter();
            let mut acc = iter.next().unwrap();
            for r in iter {
                acc = Rel::union(acc, r);
            }
            return Ok(acc);
        }
        self.select()
    }

    /// `"(" id ("," id)* "in" rel ")"`, returns one `(name, rel)` pair per id
    /// (all sharing the same parsed `rel`, cloned).
    fn rvdef(&mut self) -> Result<Vec<(String, Rel)>> {
        self.expect_char('(')?;
        let names = self.parse_id_list()?;
        self.expect_keyword("in")?;
        let rel = normalize_rel(self.rel()?);
        self.expect_char(')')?;
        Ok(names.into_iter().map(|n| (n, rel.clone())).collect())
    }

    fn select(&mut self) -> Result<Rel> {
        let protos = self.header()?;
        let where_ = if self.try_keyword("where") {
            Some(self.expr()?)
        } else {
            None
        };
        Ok(Rel::select(protos, where_))
    }

    fn header(&mut self) -> Result<Vec<Proto>> {
        if self.try_char('{') {
            let mut protos = vec![self.proto()?];
            while self.try_char(',') {
                protos.push(self.proto()?);
            }
            self.expect_char('}')?;
            Ok(protos)
        } else {
            Ok(vec![self.proto()?])
        }
    }

    /// `id ":" expr | id ("." pathTail | "[" pathTail) | id`
    fn proto(&mut self) -> Result<Proto> {
        let id = self.parse_ident()?;
        if self.try_char(':') {
            let e = self.expr()?;
            return Ok(Proto::named(id, e));
        }
        if self.peek_char('.') || self.peek_char('[') {
            let rv = self.scopes.resolve(&id);
            let path = self.path_after_rv()?;
            return Ok(Proto::MultiField(MultiField::new(rv, path)));
        }
        Ok(Proto::RangeVar(self.scopes.resolve(&id)))
    }

    /// Consumes `"." entry` or an immediate `"[" ... "]"` as the first path
    /// segment, then any number of `"->" entry` continuations. Assumes the
    /// rangevar identifier itself has already been consumed.
    fn path_after_rv(&mut self) -> Result<Vec<Vec<String>>> {
        let mut path = Vec::new();
        if self.try_char('.') {
            path.push(self.entry()?);
        } else if self.peek_char('[') {
            path.push(self.entry()?);
        } else {
            return Err(self.fail());
        }
        while self.try_str("->") {
            path.push(self.entry()?);
        }
        Ok(path)
    }

    /// `id | "[" id ("," id)* "]"`
    fn entry(&mut self) -> Result<Vec<String>> {
        if self.try_char('[') {
            let names = self.parse_id_list()?;
            self.expect_char(']')?;
            Ok(names)
        } else {
            Ok(vec![self.parse_ident()?])
        }
    }

    // --- expr := quant | cond -------------------------------------------

    pub fn expr(&mut self) -> Result<Expr> {
        if self.peek_keyword("forall") || self.peek_keyword("forsome") {
            self.quant()
        } else {
            self.cond()
        }
    }

    /// `("forsome"|"forall") ( rvdef | "(" id ("," id)* ")" ) expr`
    fn quant(&mut self) -> Result<Expr> {
        let universal = if self.try_keyword("forall") {
            true
        } else if self.try_keyword("forsome") {
            false
        } else {
            return Err(self.fail());
        };
        self.expect_char('(')?;
        let names = self.parse_id_list()?;
        if self.try_keyword("in") {
            let rel = normalize_rel(self.rel()?);
            self.expect_char(')')?;
            let rvs = self
                .scopes
                .enter_scope(names.into_iter().map(|n| (n, rel.clone())).collect())?;
            let pred = self.expr();
            self.scopes.exit_scope();
            Ok(Expr::quant(universal, rvs, pred?))
        } else {
            self.expect_char(')')?;
            let rvs: Vec<RangeVar> = names.iter().map(|n| self.scopes.resolve(n)).collect();
            let pred = self.expr()?;
            Ok(Expr::quant(universal, rvs, pred))
        }
    }

    fn cond(&mut self) -> Result<Expr> {
        let t = self.or()?;
        if self.try_char('?') {
            let yes = self.expr()?;
            self.expect_char(':')?;
            let no = self.cond()?;
            Ok(Expr::cond(t, yes, no))
        } else {
            Ok(t)
        }
    }

    fn or(&mut self) -> Result<Expr> {
        let mut l = self.and()?;
        while self.try_str("||") {
            let r = self.and()?;
            l = Expr::binary(BinaryOp::Or, l, r);
        }
        Ok(l)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut l = self.eq()?;
        while self.try_str("&&") {
            let r = self.eq()?;
            l = Expr::binary(BinaryOp::And, l, r);
        }
        Ok(l)
    }

    fn eq(&mut self) -> Result<Expr> {
        let mut l = self.cmp()?;
        loop {
            let op = if self.try_str("==") {
                BinaryOp::Eq
            } else if self.try_str("!=") {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.cmp()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn cmp(&mut self) -> Result<Expr> {
        let mut l = self.add()?;
        loop {
            let op = if self.try_str("<=") {
                BinaryOp::Le
            } else if self.try_str(">=") {
                BinaryOp::Ge
            } else if self.try_str("<") {
                BinaryOp::Lt
            } else if self.try_str(">") {
                BinaryOp::Gt
            } else {
                break;
            };
            let r = self.add()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn add(&mut self) -> Result<Expr> {
        let mut l = self.mul()?;
        loop {
            let op = if self.try_char('+') {
                BinaryOp::Add
            } else if self.try_char('-') {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.mul()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn mul(&mut self) -> Result<Expr> {
        let mut l = self.unary()?;
        loop {
            let op = if self.try_char('*') {
                BinaryOp::Mul
            } else if self.try_char('/') {
                BinaryOp::Div
            } else if self.try_char('%') {
                BinaryOp::Mod
            } else {
                break;
            };
            let r = self.unary()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.try_char('!') {
            Ok(Expr::unary(UnaryOp::Not, self.primary()?))
        } else if self.try_char('+') {
            Ok(Expr::unary(UnaryOp::Plus, self.primary()?))
        } else if self.try_char('-') {
            Ok(Expr::unary(UnaryOp::Minus, self.primary()?))
        } else {
            self.primary()
        }
    }

    /// `number | string | bool | "(" expr ")" | "$"uint? | fieldExpr`
    fn primary(&mut self) -> Result<Expr> {
        if let Some(n) = self.try_number() {
            return Ok(Expr::Literal(Value::number(n)));
        }
        if let Some(s) = self.try_string() {
            return Ok(Expr::Literal(Value::string(s)));
        }
        if self.try_keyword("true") {
            return Ok(Expr::Literal(Value::boolean(true)));
        }
        if self.try_keyword("false") {
            return Ok(Expr::Literal(Value::boolean(false)));
        }
        if self.try_char('(') {
            let e = self.expr()?;
            self.expect_char(')')?;
            return Ok(e);
        }
        if self.try_char('$') {
            // The digits must be adjacent to `$` — no whitespace allowed
            // between them, unlike every other numeric literal production.
            if let Ok((rest, n)) = lexer::uint(self.rest) {
                self.rest = rest;
                return Ok(Expr::PosArg(n));
            }
            return Ok(Expr::PosArg(1));
        }
        self.field_expr()
    }

    fn field_expr(&mut self) -> Result<Expr> {
        if self.peek_char('[') {
            let rv = self.scopes.resolve("");
            let mut path = vec![self.entry()?];
            while self.try_str("->") {
                path.push(self.entry()?);
            }
            return Ok(Expr::MultiField(MultiField::new(rv, path)));
        }
        let id = self.parse_ident()?;
        if self.peek_char('.') || self.peek_char('[') {
            let rv = self.scopes.resolve(&id);
            let path = self.path_after_rv()?;
            return Ok(Expr::MultiField(MultiField::new(rv, path)));
        }
        let rv = self.scopes.resolve("");
        Ok(Expr::MultiField(MultiField::new(rv, vec![vec![id]])))
    }
}

/// Collapse the trivial `Select([RangeVar(rv)], None)` shape — what parsing
/// a bare RelVar name produces — back down to the `Rel` that `rv` is itself
/// bound to. Without this, `(x in r)` would bind `x` to a select wrapping a
/// second, distinct rangevar over `r` instead of sharing `r`'s definition
/// directly, and the translator would emit a needless subselect in FROM
/// instead of the bare relvar name.
fn normalize_rel(rel: Rel) -> Rel {
    if let Rel::Select(ref protos, None) = rel {
        if let [Proto::RangeVar(rv)] = protos.as_slice() {
            return rv.rel().clone();
        }
    }
    rel
}
