//! Expression tree for the liquex expression language.
//!
//! Every node carries a [`Span`]. A tree is built once by the parser and
//! is never mutated afterwards, so it can be shared between threads and
//! evaluated any number of times against different contexts.
//!
//! The [`Display`](std::fmt::Display) impl prints a fully parenthesised
//! form, which makes precedence visible in tests and logs.

use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A spanned name: a property, method or filter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => 0,
            ExprKind::Property { object, .. } => object.node_count(),
            ExprKind::Index { object, index } => object.node_count() + index.node_count(),
            ExprKind::MethodCall { object, args, .. } => {
                object.node_count() + args.iter().map(Expr::node_count).sum::<usize>()
            }
            ExprKind::Filter { input, args, .. } => {
                input.node_count() + args.iter().map(Expr::node_count).sum::<usize>()
            }
            ExprKind::Range { start, end } => start.node_count() + end.node_count(),
            ExprKind::Contains { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Compare { left, right, .. } => left.node_count() + right.node_count(),
        }
    }
}

/// Literal values folded at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// String contents exactly as written between the quotes.
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// `42`, `3.5`, `"text"`, `true`, `nil`
    Literal(Literal),
    /// `name`, resolved against the context
    Identifier(String),
    /// `object.name`
    Property { object: Box<Expr>, name: Ident },
    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `object.method(args...)`
    MethodCall {
        object: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
    /// `start..end`, integer bounds, inclusive
    Range { start: Box<Expr>, end: Box<Expr> },
    /// `left contains right` or `left in right`
    Contains {
        left: Box<Expr>,
        op: MembershipOp,
        right: Box<Expr>,
    },
    /// `input | name: args...`
    Filter {
        input: Box<Expr>,
        name: Ident,
        args: Vec<Expr>,
    },
    /// `left and right`, `left or right`
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// `left == right`, `left < right`, ...
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
}

/// Direction of a membership test. Both operands are always evaluated
/// left to right as written; only the roles differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipOp {
    /// `haystack contains needle`
    Contains,
    /// `needle in haystack`
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nil => f.write_str("nil"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::String(s) => write!(f, "\"{s}\""),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Property { object, name } => write!(f, "{object}.{}", name.name),
            ExprKind::Index { object, index } => write!(f, "{object}[{index}]"),
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => {
                write!(f, "{object}.{}(", method.name)?;
                write_args(f, args)?;
                f.write_str(")")
            }
            ExprKind::Range { start, end } => write!(f, "({start}..{end})"),
            ExprKind::Contains { left, op, right } => {
                let word = match op {
                    MembershipOp::Contains => "contains",
                    MembershipOp::In => "in",
                };
                write!(f, "({left} {word} {right})")
            }
            ExprKind::Filter { input, name, args } => {
                write!(f, "({input} | {}", name.name)?;
                if !args.is_empty() {
                    f.write_str(": ")?;
                    write_args(f, args)?;
                }
                f.write_str(")")
            }
            ExprKind::Logical { left, op, right } => {
                let word = match op {
                    LogicalOp::And => "and",
                    LogicalOp::Or => "or",
                };
                write!(f, "({left} {word} {right})")
            }
            ExprKind::Compare { left, op, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}
