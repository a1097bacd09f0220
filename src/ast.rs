//! Syntax tree produced by the parser

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// Constant value written directly in source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

/// Left-hand side of `:=`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignTarget {
    Variable { name: Token },
    SelfField { keyword: Token, name: Token },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub keyword: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// One `name := value;` entry of a struct body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub name: Token,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructDecl {
    pub keyword: Token,
    pub params: Vec<Token>,
    pub body: Vec<FieldInit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        value: LiteralValue,
    },
    Variable {
        name: Token,
    },
    Assign {
        target: AssignTarget,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Unary {
        op: Token,
        right: Box<Expr>,
    },
    Grouping {
        inner: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        bracket: Token,
        args: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    SelfRef {
        keyword: Token,
    },
    Func {
        decl: Rc<FuncDecl>,
    },
    Struct {
        decl: Rc<StructDecl>,
    },
}

/// One `[pattern -> statement]` arm of a match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCase {
    pub pattern: Expr,
    pub then: Stmt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Block {
        stmts: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        keyword: Token,
        condition: Expr,
        body: Box<Stmt>,
    },
    Match {
        keyword: Token,
        subject: Expr,
        cases: Vec<MatchCase>,
    },
    Import {
        module: Token,
        names: Vec<Token>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
}

impl Expr {
    pub fn literal(value: LiteralValue) -> Self {
        Expr::Literal { value }
    }

    /// True for the `_` wildcard used in match patterns
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Expr::Variable { name } if name.lexeme == "_")
    }
}
