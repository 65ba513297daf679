use crate::ast::{Node, SyntaxTree};
use crate::lexer::Token;
use crate::parser::{ActionError, Value};

use super::{check_reduction, Reduction, Sink};

/// Builds a [`SyntaxTree`] with one node per shifted token and reduction.
#[derive(Debug, Default, Clone)]
pub struct TreeSink {
    tree: SyntaxTree,
    last: Option<Value>,
}

impl TreeSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }
}

impl Sink for TreeSink {
    fn shift(&mut self, token: &Token) -> Value {
        Value::Node(self.tree.push_token(token))
    }

    fn reduce(&mut self, reduction: &Reduction<'_>, values: Vec<Value>) -> Result<Value, ActionError> {
        check_reduction(reduction)?;
        let children = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value.as_node() {
                Some(id) => id,
                None => self
                    .tree
                    .push_placeholder(reduction.symbol_name(i).unwrap_or("?")),
            })
            .collect();
        let id = self.tree.push(Node::Rule {
            rule: reduction.rule_id(),
            name: reduction.lhs().to_string(),
            children,
        });
        let value = Value::Node(id);
        self.last = Some(value.clone());
        Ok(value)
    }

    fn accept(&mut self) {
        if let Some(id) = self.last.as_ref().and_then(Value::as_node) {
            self.tree.set_root(id);
        }
    }
}
