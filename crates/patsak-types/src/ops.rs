//! Binary/unary operator type algebra (spec §4.A).

use crate::error::{Error, Result};
use crate::ty::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    /// The backend infix operator text for a given common type.
    pub fn backend_op(self, common: Type) -> &'static str {
        match self {
            BinaryOp::Add if common == Type::String => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    /// The common type both operands are coerced to before the operator is
    /// applied. Per the table in spec §4.A.
    pub fn common_type(self, l: Type, r: Type, has_binary_operand: bool) -> Result<Type> {
        if has_binary_operand {
            return Err(Error::Uncoercible {
                from: "binary",
                to: "<operator operand>",
            });
        }
        if self.is_logical() {
            return Ok(Type::Boolean);
        }
        if self.is_comparison() {
            if l == r {
                return Ok(l);
            }
            if (l == Type::Json && r == Type::String) || (l == Type::String && r == Type::Json) {
                return Ok(Type::String);
            }
            return Ok(Type::Number);
        }
        // Arithmetic.
        if self == BinaryOp::Add && (l == Type::String || r == Type::String) {
            return Ok(Type::String);
        }
        Ok(Type::Number)
    }

    /// The result type of the operator, given the already-computed common
    /// type of its operands.
    pub fn result_type(self, common: Type) -> Type {
        if self.is_logical() || self.is_comparison() {
            Type::Boolean
        } else if self == BinaryOp::Add && common == Type::String {
            Type::String
        } else {
            Type::Number
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

impl UnaryOp {
    /// The type the operand must be coerced to.
    pub fn op_type(self) -> Type {
        match self {
            UnaryOp::Plus | UnaryOp::Minus => Type::Number,
            UnaryOp::Not => Type::Boolean,
        }
    }

    /// The operator's result type (same as `op_type` for unary ops).
    pub fn result_type(self) -> Type {
        self.op_type()
    }

    pub fn backend_op(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "NOT ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operand_rejected() {
        assert!(BinaryOp::Add.common_type(Type::String, Type::Integer, true).is_err());
    }

    #[test]
    fn logical_forces_boolean() {
        assert_eq!(
            BinaryOp::And.common_type(Type::Integer, Type::String, false).unwrap(),
            Type::Boolean
        );
        assert_eq!(BinaryOp::And.result_type(Type::Boolean), Type::Boolean);
    }

    #[test]
    fn comparison_same_type() {
        assert_eq!(
            BinaryOp::Eq.common_type(Type::String, Type::String, false).unwrap(),
            Type::String
        );
        assert_eq!(BinaryOp::Eq.result_type(Type::String), Type::Boolean);
    }

    #[test]
    fn comparison_json_string_pair() {
        assert_eq!(
            BinaryOp::Eq.common_type(Type::Json, Type::String, false).unwrap(),
            Type::String
        );
    }

    #[test]
    fn comparison_falls_back_to_number() {
        assert_eq!(
            BinaryOp::Lt.common_type(Type::Boolean, Type::Date, false).unwrap(),
            Type::Number
        );
    }

    #[test]
    fn plus_with_string_operand_is_string() {
        assert_eq!(
            BinaryOp::Add.common_type(Type::Integer, Type::String, false).unwrap(),
            Type::String
        );
        assert_eq!(BinaryOp::Add.backend_op(Type::String), "||");
    }

    #[test]
    fn arithmetic_otherwise_is_number() {
        assert_eq!(
            BinaryOp::Mul.common_type(Type::Integer, Type::Serial, false).unwrap(),
            Type::Number
        );
    }

    #[test]
    fn unary_types() {
        assert_eq!(UnaryOp::Plus.op_type(), Type::Number);
        assert_eq!(UnaryOp::Not.op_type(), Type::Boolean);
    }
}
