//! Syntax tree
//!
//! An arena of nodes built by [`TreeSink`](crate::sink::TreeSink). Leaves
//! are tokens; interior nodes are rule reductions named after their
//! left-hand side.

use std::fmt;

use crate::grammar::RuleId;
use crate::lexer::{Token, TokenKind};

/// Index of a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A shifted token, or `error` for a recovered span.
    Token { kind: Option<TokenKind>, text: String },
    /// A reduction.
    Rule {
        rule: RuleId,
        name: String,
        children: Vec<NodeId>,
    },
}

impl Node {
    /// The rule name for interior nodes, the terminal name for leaves.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Token { kind: Some(kind), .. } => kind.symbol_name().into_owned(),
            Self::Token { kind: None, text } => text.clone(),
            Self::Rule { name, .. } => name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Adds a leaf for a shifted token.
    pub fn push_token(&mut self, token: &Token) -> NodeId {
        let text = match token.kind {
            TokenKind::Keyword(_) | TokenKind::Punct(_) => String::new(),
            _ => token.lexeme.clone(),
        };
        self.push(Node::Token {
            kind: Some(token.kind),
            text,
        })
    }

    /// Adds a leaf standing for a symbol that carried no token, such as `error`.
    pub fn push_placeholder(&mut self, name: &str) -> NodeId {
        self.push(Node::Token {
            kind: None,
            text: name.to_string(),
        })
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(Node::Rule { children, .. }) => children,
            _ => &[],
        }
    }

    /// Number of nodes reachable from the root named `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut count = 0;
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.node(id) {
                if node.name() == name {
                    count += 1;
                }
            }
            pending.extend_from_slice(self.children(id));
        }
        count
    }

    /// The first node named `name`, in pre-order from the root.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let mut pending = vec![self.root?];
        while let Some(id) = pending.pop() {
            if self.node(id).is_some_and(|node| node.name() == name) {
                return Some(id);
            }
            pending.extend(self.children(id).iter().rev());
        }
        None
    }

    /// Renders the subtree under `id` as an s-expression.
    #[must_use]
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        match self.node(id) {
            None => out.push('?'),
            Some(Node::Token { kind: None, text }) => out.push_str(text),
            Some(Node::Token {
                kind: Some(kind @ (TokenKind::Keyword(_) | TokenKind::Punct(_))),
                ..
            }) => out.push_str(&kind.symbol_name()),
            Some(Node::Token {
                kind: Some(kind),
                text,
            }) => {
                out.push_str(&kind.symbol_name());
                out.push('(');
                out.push_str(text);
                out.push(')');
            }
            Some(Node::Rule { name, children, .. }) => {
                out.push('(');
                out.push_str(name);
                for &child in children {
                    out.push(' ');
                    self.write_node(out, child);
                }
                out.push(')');
            }
        }
    }
}

/// Renders the tree from the root as an s-expression, e.g.
/// `(select_core SELECT select_opts ...)`.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => f.write_str(&self.render(root)),
            None => f.write_str("()"),
        }
    }
}
