//! Semantic values carried on the parser stack.

use crate::ast::NodeId;
use crate::lexer::{Token, TokenValue};

/// The value half of a parser stack cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Int(i64),
    Float(f64),
    Str(String),
    SubToken(i32),
    /// A handle into a sink-owned tree.
    Node(NodeId),
}

impl Value {
    /// The value a shifted token contributes by default.
    #[must_use]
    pub fn from_token(token: &Token) -> Self {
        match &token.value {
            TokenValue::None => Self::None,
            TokenValue::Int(n) => Self::Int(*n),
            TokenValue::Float(x) => Self::Float(*x),
            TokenValue::Str(s) => Self::Str(s.clone()),
            TokenValue::SubToken(n) => Self::SubToken(*n),
        }
    }

    #[must_use]
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }
}
