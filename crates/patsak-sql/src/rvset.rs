//! Collecting the rangevars a `Select` needs to introduce into its own
//! `FROM` clause: every rangevar reachable from its protos (including
//! named-expression protos) that isn't already bound by an enclosing
//! select/quant. A rangevar mentioned only in `where` is deliberately never
//! collected here — it must already be bound by a proto or an ancestor
//! scope, or `Translator::lookup_header` raises an unbound-rangevar error.

use patsak_ast::{Expr, Proto, RangeVar};

/// Rangevars already bound by an ancestor scope (correlated references,
/// not to be reintroduced in this select's own FROM).
pub type Binds = [(RangeVar, patsak_types::Header)];

pub fn collect_proto_rvs(protos: &[Proto], binds: &Binds, out: &mut Vec<RangeVar>) {
    for proto in protos {
        match proto {
            Proto::RangeVar(rv) => push_new(rv, binds, &[], out),
            Proto::MultiField(mf) => push_new(&mf.rv, binds, &[], out),
            Proto::NamedExpr(_, e) => collect_expr_rvs(e, binds, &mut Vec::new(), out),
        }
    }
}

pub fn collect_expr_rvs(expr: &Expr, binds: &Binds, local_excl: &mut Vec<RangeVar>, out: &mut Vec<RangeVar>) {
    match expr {
        Expr::Literal(_) | Expr::PosArg(_) => {}
        Expr::MultiField(mf) => push_new(&mf.rv, binds, local_excl, out),
        Expr::Quant { rvs, pred, .. } => {
            let mark = local_excl.len();
            local_excl.extend(rvs.iter().cloned());
            collect_expr_rvs(pred, binds, local_excl, out);
            local_excl.truncate(mark);
        }
        Expr::Binary { l, r, .. } => {
            collect_expr_rvs(l, binds, local_excl, out);
            collect_expr_rvs(r, binds, local_excl, out);
        }
        Expr::Unary { x, .. } => collect_expr_rvs(x, binds, local_excl, out),
        Expr::Cond { t, yes, no } => {
            collect_expr_rvs(t, binds, local_excl, out);
            collect_expr_rvs(yes, binds, local_excl, out);
            collect_expr_rvs(no, binds, local_excl, out);
        }
    }
}

fn push_new(rv: &RangeVar, binds: &Binds, local_excl: &[RangeVar], out: &mut Vec<RangeVar>) {
    if rv.name().is_empty() {
        return; // the "this" sentinel; resolved contextually, never bound
    }
    if binds.iter().any(|(b, _)| b == rv) {
        return;
    }
    if local_excl.contains(rv) || out.contains(rv) {
        return;
    }
    out.push(rv.clone());
}
