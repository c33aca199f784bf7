
use std::fmt;

use gc::{Finalize, Trace};

use crate::expr::Expr;

#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub enum Value {
    Int(i64),
    Function(Lambda),
}

/// A function value. The body is the same node as in the literal it was
/// evaluated from.
#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub struct Lambda {
    param: String,
    body: Expr,
}

/// Failure signal for every syntax, lookup and type error. Carries nothing:
/// all failures look the same from the outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Error;

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(n) = *self {
            Some(n)
        } else {
            None
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        if let Value::Function(ref lambda) = *self {
            Some(lambda)
        } else {
            None
        }
    }
}

impl Lambda {
    pub fn new<S: ToString>(param: S, body: Expr) -> Lambda {
        Lambda {
            param: param.to_string(),
            body,
        }
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Int(n) => write!(f, "(val {})", n),
            Value::Function(ref lambda) =>
                write!(f, "(function {} {})", lambda.param, lambda.body),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::expr::Expr;
    use super::{Lambda, Value};

    #[test]
    fn test_accessors() {
        let lambda = Lambda::new("x", Expr::var("x"));
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Int(3).as_lambda(), None);
        assert_eq!(Value::Function(lambda.clone()).as_int(), None);
        assert_eq!(Value::Function(lambda.clone()).as_lambda(), Some(&lambda));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-4).to_string(), "(val -4)");
        let lambda = Lambda::new("x", Expr::add(Expr::var("x"), Expr::val(1)));
        assert_eq!(Value::Function(lambda).to_string(),
            "(function x (add (var x) (val 1)))");
    }
}
