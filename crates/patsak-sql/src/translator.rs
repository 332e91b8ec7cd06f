//! AST (or raw QL source text) to SQL translation.
//!
//! Each node-translation method returns the text it rendered directly
//! rather than writing into a shared output stream: recursion plays the
//! role an explicit buffer-stack would otherwise need — a sub-expression's
//! rendered text is simply the `String` its call returns, and the caller
//! decides whether to wrap it in a cast before splicing it into its own
//! output.

use indexmap::IndexMap;

use patsak_ast::{Expr, MultiField, Proto, RangeVar, Rel};
use patsak_types::{Attr, BinaryOp, Header, Type, UnaryOp, Value};

use crate::catalog_view::CatalogView;
use crate::error::{Error, Result};
use crate::identifier::{escape_ident, quote_literal};
use crate::rvset::collect_proto_rvs;

pub struct Translator<'c> {
    catalog: &'c dyn CatalogView,
    binds: Vec<(RangeVar, Header)>,
    this_stack: Vec<Option<RangeVar>>,
    params: Vec<Value>,
}

impl<'c> Translator<'c> {
    pub fn new(catalog: &'c dyn CatalogView) -> Self {
        Self {
            catalog,
            binds: Vec::new(),
            this_stack: Vec::new(),
            params: Vec::new(),
        }
    }

    // --- top-level entry points ------------------------------------------

    pub fn translate_query(
        &mut self,
        source: &str,
        params: &[Value],
        order_by: &[&str],
        order_by_params: &[Value],
        offset: u64,
        length: Option<u64>,
    ) -> Result<(String, Header)> {
        let ast = patsak_parser::parse_rel(source)?;
        self.params = params.to_vec();
        let (inner_sql, header) = self.translate_rel(&ast)?;

        if order_by.is_empty() {
            let mut sql = inner_sql;
            append_limit_offset(&mut sql, offset, length);
            return Ok((sql, header));
        }

        let order_by_exprs: std::result::Result<Vec<Expr>, patsak_parser::Error> =
            order_by.iter().map(|s| patsak_parser::parse_expr(s)).collect();
        let order_by_exprs = order_by_exprs?;

        let at_rv = RangeVar::new("@", Rel::Base(String::new()));
        self.binds.push((at_rv.clone(), header.clone()));
        self.this_stack.push(Some(at_rv));
        self.params = order_by_params.to_vec();

        let mut parts = Vec::with_capacity(order_by_exprs.len());
        let mut failure = None;
        for e in &order_by_exprs {
            match self.translate_scalar(e, None) {
                Ok((sql, _)) => parts.push(sql),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        self.this_stack.pop();
        self.binds.pop();
        if let Some(err) = failure {
            return Err(err);
        }

        let mut sql = format!(
            "SELECT * FROM ({inner_sql}) AS \"@\" ORDER BY {}",
            parts.join(", ")
        );
        append_limit_offset(&mut sql, offset, length);
        Ok((sql, header))
    }

    pub fn translate_count(&mut self, source: &str, params: &[Value]) -> Result<String> {
        let ast = patsak_parser::parse_rel(source)?;
        self.params = params.to_vec();
        let (inner_sql, _) = self.translate_rel(&ast)?;
        Ok(format!("SELECT COUNT(*) FROM ({inner_sql}) AS \"@\""))
    }

    pub fn translate_update(
        &mut self,
        rel_var: &str,
        where_source: Option<&str>,
        where_params: &[Value],
        expr_map_source: &IndexMap<String, String>,
        expr_params: &[Value],
    ) -> Result<String> {
        if expr_map_source.is_empty() {
            return Err(Error::value("Empty update field set"));
        }
        let mut expr_map = IndexMap::with_capacity(expr_map_source.len());
        for (attr, src) in expr_map_source {
            expr_map.insert(attr.clone(), patsak_parser::parse_expr(src)?);
        }
        let where_expr = where_source.map(patsak_parser::parse_expr).transpose()?;

        let header = self.catalog.get_header(rel_var)?;
        let rv = RangeVar::new(rel_var.to_string(), Rel::Base(rel_var.to_string()));
        self.binds.push((rv.clone(), header.clone()));
        self.this_stack.push(Some(rv));

        let result = (|| {
            self.params = expr_params.to_vec();
            let mut sets = Vec::with_capacity(expr_map.len());
            for (attr, expr) in &expr_map {
                let ty = header
                    .attr_type(attr)
                    .ok_or_else(|| Error::query(format!("No such attribute: {attr}")))?;
                let (sql, _) = self.translate_scalar(expr, Some(ty))?;
                sets.push(format!("{} = {sql}", escape_ident(attr)));
            }

            self.params = where_params.to_vec();
            let where_sql = match &where_expr {
                Some(w) => Some(self.translate_scalar(w, Some(Type::Boolean))?.0),
                None => None,
            };

            let mut sql = format!("UPDATE {} SET {}", escape_ident(rel_var), sets.join(", "));
            if let Some(w) = where_sql {
                sql.push_str(&format!(" WHERE {w}"));
            }
            Ok(sql)
        })();

        self.this_stack.pop();
        self.binds.pop();
        result
    }

    pub fn translate_delete(&mut self, rel_var: &str, where_source: &str, params: &[Value]) -> Result<String> {
        let where_expr = patsak_parser::parse_expr(where_source)?;
        let header = self.catalog.get_header(rel_var)?;
        let rv = RangeVar::new(rel_var.to_string(), Rel::Base(rel_var.to_string()));
        self.binds.push((rv.clone(), header));
        self.this_stack.push(Some(rv));
        self.params = params.to_vec();
        let result = self.translate_scalar(&where_expr, Some(Type::Boolean));
        self.this_stack.pop();
        self.binds.pop();
        let (where_sql, _) = result?;
        Ok(format!("DELETE FROM {} WHERE {where_sql}", escape_ident(rel_var)))
    }

    /// Used for CHECK-constraint bodies: `header` is supplied directly by
    /// the caller rather than looked up, since the owning RelVar may still
    /// be under construction in the catalog.
    pub fn translate_expr(&mut self, expr_source: &str, rel_var: &str, header: &Header) -> Result<String> {
        let expr = patsak_parser::parse_expr(expr_source)?;
        let rv = RangeVar::new(rel_var.to_string(), Rel::Base(rel_var.to_string()));
        self.binds.push((rv.clone(), header.clone()));
        self.this_stack.push(Some(rv));
        self.params = Vec::new();
        let result = self.translate_scalar(&expr, Some(Type::Boolean));
        self.this_stack.pop();
        self.binds.pop();
        Ok(result?.0)
    }

    // --- Rel dispatch ------------------------------------------------------

    fn translate_rel(&mut self, rel: &Rel) -> Result<(String, Header)> {
        match rel {
            Rel::Base(name) => {
                let header = self.catalog.get_header(name)?;
                Ok((escape_ident(name), header))
            }
            Rel::Union(l, r) => self.translate_union(l, r),
            Rel::Select(protos, where_) => self.translate_select(protos, where_.as_deref()),
        }
    }

    fn translate_union(&mut self, l: &Rel, r: &Rel) -> Result<(String, Header)> {
        let (l_sql, l_header) = self.translate_rel(l)?;
        let (r_sql, r_header) = self.translate_rel(r)?;
        if l_header.len() != r_header.len() {
            return Err(Error::query("Union headers don't match"));
        }
        for attr in l_header.iter() {
            match r_header.find(&attr.name) {
                Some(other) if other.ty == attr.ty || (other.ty.is_numeric() && attr.ty.is_numeric()) => {}
                _ => return Err(Error::query("Union headers don't match")),
            }
        }
        Ok((format!("{l_sql} UNION {r_sql}"), l_header))
    }

    fn translate_select(&mut self, protos: &[Proto], where_: Option<&Expr>) -> Result<(String, Header)> {
        let mut rvs = Vec::new();
        collect_proto_rvs(protos, &self.binds, &mut rvs);

        let mut from_parts = Vec::with_capacity(rvs.len());
        let mut rv_headers = Vec::with_capacity(rvs.len());
        for rv in &rvs {
            let header = match rv.rel() {
                Rel::Base(name) => {
                    let h = self.catalog.get_header(name)?;
                    from_parts.push(escape_ident(name));
                    h
                }
                other => {
                    let (sql, h) = self.translate_rel(other)?;
                    from_parts.push(format!("({sql}) AS {}", escape_ident(rv.name())));
                    h
                }
            };
            rv_headers.push(header);
        }
        for (rv, header) in rvs.iter().zip(rv_headers.into_iter()) {
            self.binds.push((rv.clone(), header));
        }

        let this_rv = if protos.len() == 1 {
            match &protos[0] {
                Proto::RangeVar(rv) => Some(rv.clone()),
                Proto::MultiField(mf) => Some(mf.rv.clone()),
                Proto::NamedExpr(..) => None,
            }
        } else {
            None
        };

        let outcome = (|| {
            let mut columns = Vec::new();
            let mut out_header = Header::new();
            for proto in protos {
                self.emit_proto(proto, &mut columns, &mut out_header)?;
            }

            let mut sql = if from_parts.is_empty() {
                format!("SELECT DISTINCT {}", columns.join(", "))
            } else {
                format!("SELECT DISTINCT {} FROM {}", columns.join(", "), from_parts.join(", "))
            };

            if let Some(w) = where_ {
                if !is_trivially_true(w) {
                    self.this_stack.push(this_rv.clone());
                    let where_result = self.translate_scalar(w, Some(Type::Boolean));
                    self.this_stack.pop();
                    let (where_sql, _) = where_result?;
                    sql.push_str(&format!(" WHERE {where_sql}"));
                }
            }

            Ok((sql, out_header))
        })();

        for _ in &rvs {
            self.binds.pop();
        }

        outcome
    }

    fn emit_proto(&mut self, proto: &Proto, columns: &mut Vec<String>, out_header: &mut Header) -> Result<()> {
        match proto {
            Proto::RangeVar(rv) => {
                columns.push(format!("{}.*", escape_ident(rv.name())));
                let header = self.lookup_header(rv)?;
                for attr in header.iter() {
                    self.add_output_attr(out_header, attr.clone())?;
                }
            }
            Proto::MultiField(mf) if mf.is_foreign() => {
                let base_path = &mf.path[..mf.path.len() - 1];
                for name in mf.path.last().unwrap() {
                    let mut path = base_path.to_vec();
                    path.push(vec![name.clone()]);
                    let synthetic = Expr::MultiField(MultiField::new(mf.rv.clone(), path));
                    self.emit_named_expr(name, &synthetic, columns, out_header)?;
                }
            }
            Proto::MultiField(mf) => {
                let header = self.lookup_header(&mf.rv)?;
                for name in mf.path.last().unwrap() {
                    let ty = header
                        .attr_type(name)
                        .ok_or_else(|| Error::query(format!("No such attribute: {name}")))?;
                    columns.push(format!("{}.{}", escape_ident(mf.rv.name()), escape_ident(name)));
                    self.add_output_attr(out_header, Attr::new(name.clone(), ty))?;
                }
            }
            Proto::NamedExpr(name, e) => {
                self.emit_named_expr(name, e, columns, out_header)?;
            }
        }
        Ok(())
    }

    fn emit_named_expr(
        &mut self,
        name: &str,
        e: &Expr,
        columns: &mut Vec<String>,
        out_header: &mut Header,
    ) -> Result<()> {
        let (sql, ty) = self.translate_scalar(e, None)?;
        columns.push(format!("{sql} AS {}", escape_ident(name)));
        self.add_output_attr(out_header, Attr::new(name.to_string(), ty))
    }

    fn add_output_attr(&self, out_header: &mut Header, attr: Attr) -> Result<()> {
        let name = attr.name.clone();
        out_header
            .add_or_fail(attr)
            .map_err(|_| Error::query(format!("Duplicate output attribute: {name}")))
    }

    fn lookup_header(&self, rv: &RangeVar) -> Result<Header> {
        self.binds
            .iter()
            .rev()
            .find(|(b, _)| b == rv)
            .map(|(_, h)| h.clone())
            .ok_or_else(|| Error::query(format!("Rangevar \"{}\" is unbound", rv.name())))
    }

    // --- Expr dispatch -----------------------------------------------------

    fn translate_scalar(&mut self, expr: &Expr, target: Option<Type>) -> Result<(String, Type)> {
        match expr {
            Expr::Literal(v) => {
                let sql = v.render(&quote_literal);
                self.coerce(sql, v.get_type(), target)
            }
            Expr::PosArg(i) => {
                let i = *i;
                if i == 0 || i > self.params.len() {
                    return Err(Error::query(format!("No such parameter: ${i}")));
                }
                let v = self.params[i - 1].clone();
                let sql = v.render(&quote_literal);
                self.coerce(sql, v.get_type(), target)
            }
            Expr::MultiField(mf) => self.translate_multi_field(mf, target),
            Expr::Quant { universal, rvs, pred } => self.translate_quant(*universal, rvs, pred, target),
            Expr::Binary { op, l, r } => self.translate_binary(*op, l, r, target),
            Expr::Unary { op, x } => self.translate_unary(*op, x, target),
            Expr::Cond { t, yes, no } => self.translate_cond(t, yes, no, target),
        }
    }

    fn translate_multi_field(&mut self, mf: &MultiField, target: Option<Type>) -> Result<(String, Type)> {
        if mf.is_foreign() {
            return self.translate_foreign_field(mf, target);
        }
        let rv = if mf.rv.name().is_empty() {
            self.this_stack
                .last()
                .cloned()
                .flatten()
                .ok_or_else(|| Error::query("No 'this' rangevar in this context"))?
        } else {
            mf.rv.clone()
        };
        if mf.is_multi() {
            return Err(Error::query("Multifield used as an expression"));
        }
        let field = &mf.path[0][0];
        let header = self.lookup_header(&rv)?;
        let ty = header
            .attr_type(field)
            .ok_or_else(|| Error::query(format!("No such attribute: {field}")))?;
        let sql = format!("{}.{}", escape_ident(rv.name()), escape_ident(field));
        self.coerce(sql, ty, target)
    }

    fn translate_foreign_field(&mut self, mf: &MultiField, target: Option<Type>) -> Result<(String, Type)> {
        if mf.rv.name() == "@" {
            return Err(Error::query("Operator -> used on non-RelVar rangevar"));
        }
        let base_name = match mf.rv.rel() {
            Rel::Base(name) if !name.is_empty() => name.clone(),
            _ => return Err(Error::query("Operator -> used on non-RelVar rangevar")),
        };

        let mut used = std::collections::HashSet::new();
        used.insert(base_name.clone());
        let mut current_rel_var = base_name;
        let mut current_alias = mf.rv.name().to_string();
        let mut from_parts = Vec::new();
        let mut where_parts = Vec::new();
        let mut alias_counter = 0usize;

        for segment in &mf.path[..mf.path.len() - 1] {
            let (ref_rel_var, ref_attrs) = self.catalog.follow_reference(&current_rel_var, segment)?;
            let next_alias = if used.contains(&ref_rel_var) {
                alias_counter += 1;
                format!("@{alias_counter}")
            } else {
                ref_rel_var.clone()
            };
            used.insert(ref_rel_var.clone());
            if next_alias == ref_rel_var {
                from_parts.push(escape_ident(&ref_rel_var));
            } else {
                from_parts.push(format!("{} AS {}", escape_ident(&ref_rel_var), escape_ident(&next_alias)));
            }
            for (local_attr, ref_attr) in segment.iter().zip(ref_attrs.iter()) {
                where_parts.push(format!(
                    "{}.{} = {}.{}",
                    escape_ident(&current_alias),
                    escape_ident(local_attr),
                    escape_ident(&next_alias),
                    escape_ident(ref_attr)
                ));
            }
            current_rel_var = ref_rel_var;
            current_alias = next_alias;
        }

        let last_segment = mf.path.last().unwrap();
        if last_segment.len() > 1 {
            return Err(Error::query("Multifield used as an expression"));
        }
        let field = &last_segment[0];
        let header = self.catalog.get_header(&current_rel_var)?;
        let ty = header
            .attr_type(field)
            .ok_or_else(|| Error::query(format!("No such attribute: {field}")))?;

        let select_expr = format!("{}.{}", escape_ident(&current_alias), escape_ident(field));
        let from_sql = from_parts.join(", ");
        let sub = if where_parts.is_empty() {
            format!("(SELECT {select_expr} FROM {from_sql})")
        } else {
            format!("(SELECT {select_expr} FROM {from_sql} WHERE {})", where_parts.join(" AND "))
        };
        self.coerce(sub, ty, target)
    }

    fn translate_quant(
        &mut self,
        universal: bool,
        rvs: &[RangeVar],
        pred: &Expr,
        target: Option<Type>,
    ) -> Result<(String, Type)> {
        let mut from_parts = Vec::with_capacity(rvs.len());
        let mut pushed = 0;
        for rv in rvs {
            let header = match rv.rel() {
                Rel::Base(name) => {
                    let h = self.catalog.get_header(name)?;
                    from_parts.push(escape_ident(name));
                    h
                }
                other => {
                    let (sql, h) = self.translate_rel(other)?;
                    from_parts.push(format!("({sql}) AS {}", escape_ident(rv.name())));
                    h
                }
            };
            self.binds.push((rv.clone(), header));
            pushed += 1;
        }

        let this_rv = if rvs.len() == 1 { Some(rvs[0].clone()) } else { None };
        self.this_stack.push(this_rv);
        let pred_result = self.translate_scalar(pred, Some(Type::Boolean));
        self.this_stack.pop();
        for _ in 0..pushed {
            self.binds.pop();
        }
        let (pred_sql, _) = pred_result?;

        let from_sql = from_parts.join(", ");
        let sql = if universal {
            format!("(NOT EXISTS (SELECT 1 FROM {from_sql} WHERE NOT {pred_sql}))")
        } else {
            format!("(EXISTS (SELECT 1 FROM {from_sql} WHERE {pred_sql}))")
        };
        self.coerce(sql, Type::Boolean, target)
    }

    fn translate_binary(&mut self, op: BinaryOp, l: &Expr, r: &Expr, target: Option<Type>) -> Result<(String, Type)> {
        let (l_sql, l_ty) = self.translate_scalar(l, None)?;
        let (r_sql, r_ty) = self.translate_scalar(r, None)?;
        let has_binary = l_ty == Type::Binary || r_ty == Type::Binary;
        let common = op.common_type(l_ty, r_ty, has_binary)?;
        let (l_cast, _) = self.coerce(l_sql, l_ty, Some(common))?;
        let (r_cast, _) = self.coerce(r_sql, r_ty, Some(common))?;
        let sql = format!("({l_cast} {} {r_cast})", op.backend_op(common));
        self.coerce(sql, op.result_type(common), target)
    }

    fn translate_unary(&mut self, op: UnaryOp, x: &Expr, target: Option<Type>) -> Result<(String, Type)> {
        let (x_sql, _) = self.translate_scalar(x, Some(op.op_type()))?;
        let sql = format!("{} ({x_sql})", op.backend_op().trim());
        self.coerce(sql, op.result_type(), target)
    }

    fn translate_cond(&mut self, t: &Expr, yes: &Expr, no: &Expr, target: Option<Type>) -> Result<(String, Type)> {
        let (t_sql, _) = self.translate_scalar(t, Some(Type::Boolean))?;
        let (yes_sql, yes_ty) = self.translate_scalar(yes, None)?;
        let (no_sql, no_ty) = self.translate_scalar(no, None)?;
        let common = if yes_ty == no_ty {
            yes_ty
        } else if yes_ty == Type::String || no_ty == Type::String {
            Type::String
        } else {
            Type::Number
        };
        let (yes_cast, _) = self.coerce(yes_sql, yes_ty, Some(common))?;
        let (no_cast, _) = self.coerce(no_sql, no_ty, Some(common))?;
        let sql = format!("(CASE WHEN {t_sql} THEN {yes_cast} ELSE {no_cast} END)");
        self.coerce(sql, common, target)
    }

    fn coerce(&self, sql: String, from: Type, to: Option<Type>) -> Result<(String, Type)> {
        match to {
            None => Ok((sql, from)),
            Some(t) => match patsak_types::cast_function(from, t)? {
                None => Ok((sql, t)),
                Some(f) => Ok((format!("{f}({sql})"), t)),
            },
        }
    }
}

fn append_limit_offset(sql: &mut String, offset: u64, length: Option<u64>) {
    if let Some(len) = length {
        sql.push_str(&format!(" LIMIT {len}"));
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
}

fn is_trivially_true(e: &Expr) -> bool {
    match e {
        Expr::Literal(v) => match v.get_type() {
            Type::Boolean => v.as_bool(),
            Type::Number | Type::Integer | Type::Serial => v.as_double() != 0.0,
            Type::String | Type::Json => !v.as_str().is_empty(),
            Type::Date | Type::Binary => false,
        },
        _ => false,
    }
}
