
use std::fmt;

use gc::{Finalize, Gc, Trace};

#[derive(Debug, Finalize, PartialEq, Trace)]
pub enum ExprKind {
    Val(i64),
    Var(String),
    Add(Expr, Expr),
    /// `cond1`, `cond2`, then-branch, else-branch.
    If(Expr, Expr, Expr, Expr),
    /// Name, initializer, body. The initializer is bound while reading.
    Let(String, Expr, Expr),
    Function(String, Expr),
    Call(Expr, Expr),
}

/// A parsed expression. Clone-by-reference, so a function value can hold on
/// to the body of the literal it came from.
#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub struct Expr(Gc<ExprKind>);

impl Expr {
    fn from_kind(kind: ExprKind) -> Expr {
        Expr(Gc::new(kind))
    }

    pub fn kind(&self) -> &ExprKind {
        &*self.0
    }

    pub fn val(n: i64) -> Expr {
        Expr::from_kind(ExprKind::Val(n))
    }

    pub fn var<S: ToString>(name: S) -> Expr {
        Expr::from_kind(ExprKind::Var(name.to_string()))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::from_kind(ExprKind::Add(lhs, rhs))
    }

    pub fn if_greater(first: Expr, second: Expr, if_true: Expr, if_false: Expr)
        -> Expr {
        Expr::from_kind(ExprKind::If(first, second, if_true, if_false))
    }

    pub fn let_in<S: ToString>(name: S, value: Expr, body: Expr) -> Expr {
        Expr::from_kind(ExprKind::Let(name.to_string(), value, body))
    }

    pub fn function<S: ToString>(param: S, body: Expr) -> Expr {
        Expr::from_kind(ExprKind::Function(param.to_string(), body))
    }

    pub fn call(callee: Expr, argument: Expr) -> Expr {
        Expr::from_kind(ExprKind::Call(callee, argument))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ExprKind::Val(n) => write!(f, "(val {})", n),
            ExprKind::Var(name) => write!(f, "(var {})", name),
            ExprKind::Add(lhs, rhs) => write!(f, "(add {} {})", lhs, rhs),
            ExprKind::If(first, second, if_true, if_false) =>
                write!(f, "(if {} {} then {} else {})", first, second, if_true,
                    if_false),
            ExprKind::Let(name, value, body) =>
                write!(f, "(let {} = {} in {})", name, value, body),
            ExprKind::Function(param, body) =>
                write!(f, "(function {} {})", param, body),
            ExprKind::Call(callee, argument) =>
                write!(f, "(call {} {})", callee, argument),
        }
    }
}
