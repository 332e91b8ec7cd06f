//! Renders AST back to QL source text. Used by the idempotence tests
//! (`print(parse(x)) == expected`) and handy for error messages that want
//! to echo back a normalized query.

use patsak_ast::{Expr, MultiField, Proto, Rel};
use patsak_types::{BinaryOp, UnaryOp};

pub fn print_rel(rel: &Rel) -> String {
    match rel {
        Rel::Base(name) => name.clone(),
        Rel::Union(l, r) => format!("union({}, {})", print_rel(l), print_rel(r)),
        Rel::Select(protos, where_) => {
            let header = print_header(protos);
            match where_ {
                Some(w) => format!("{header} where {}", print_expr(w)),
                None => header,
            }
        }
    }
}

fn print_header(protos: &[Proto]) -> String {
    if protos.len() == 1 {
        print_proto(&protos[0])
    } else {
        let items: Vec<String> = protos.iter().map(print_proto).collect();
        format!("{{{}}}", items.join(", "))
    }
}

fn print_proto(proto: &Proto) -> String {
    match proto {
        Proto::RangeVar(rv) => rv.name().to_string(),
        Proto::MultiField(mf) => print_multi_field(mf),
        Proto::NamedExpr(name, e) => format!("{name}: {}", print_expr(e)),
    }
}

fn print_multi_field(mf: &MultiField) -> String {
    let rv_name = mf.rv.name();
    let mut out = String::new();
    if !rv_name.is_empty() {
        out.push_str(rv_name);
    }
    for (i, segment) in mf.path.iter().enumerate() {
        if i > 0 {
            out.push_str("->");
        } else if !rv_name.is_empty() {
            if segment.len() > 1 {
                // bracket form attaches directly, no leading dot
            } else {
                out.push('.');
            }
        }
        out.push_str(&print_segment(segment));
    }
    out
}

fn print_segment(segment: &[String]) -> String {
    if segment.len() == 1 {
        segment[0].clone()
    } else {
        format!("[{}]", segment.join(", "))
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(v) => print_literal(v),
        Expr::MultiField(mf) => print_multi_field(mf),
        Expr::PosArg(i) => format!("${i}"),
        Expr::Quant { universal, rvs, pred } => {
            let kw = if *universal { "forall" } else { "forsome" };
            let names: Vec<&str> = rvs.iter().map(|rv| rv.name()).collect();
            format!("{kw} ({}) {}", names.join(", "), print_expr(pred))
        }
        Expr::Binary { op, l, r } => {
            format!("({} {} {})", print_expr(l), binary_symbol(*op), print_expr(r))
        }
        Expr::Unary { op, x } => format!("{}{}", unary_symbol(*op), print_expr(x)),
        Expr::Cond { t, yes, no } => {
            format!("({} ? {} : {})", print_expr(t), print_expr(yes), print_expr(no))
        }
    }
}

fn print_literal(v: &patsak_types::Value) -> String {
    use patsak_types::Type;
    match v.get_type() {
        Type::String | Type::Json => format!("\"{}\"", v.as_str()),
        Type::Boolean => v.as_bool().to_string(),
        _ => format!("{}", v.as_double()),
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Lt => "<",
        BinaryOp::Gt => ">",
        BinaryOp::Le => "<=",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Minus => "-",
        UnaryOp::Not => "!",
    }
}
