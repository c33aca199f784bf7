
use tracing::debug;

use crate::value::{Error, Value};

/// The one output for every failure, whatever its cause.
pub const ERROR_MARKER: &str = "ERROR";

pub fn render(outcome: &Result<Value, Error>) -> String {
    match *outcome {
        Ok(ref value @ Value::Int(_)) => value.to_string(),
        Ok(Value::Function(ref lambda)) => {
            debug!(param = lambda.param(), "a function is not a printable result");
            ERROR_MARKER.to_string()
        },
        Err(Error) => ERROR_MARKER.to_string(),
    }
}

#[cfg(test)]
mod test {
    use crate::expr::Expr;
    use crate::value::{Error, Lambda, Value};
    use super::{render, ERROR_MARKER};

    #[test]
    fn test_render_int() {
        assert_eq!(render(&Ok(Value::Int(5))), "(val 5)");
        assert_eq!(render(&Ok(Value::Int(-12))), "(val -12)");
    }

    #[test]
    fn test_render_function() {
        let lambda = Lambda::new("x", Expr::val(1));
        assert_eq!(render(&Ok(Value::Function(lambda))), ERROR_MARKER);
    }

    #[test]
    fn test_render_failure() {
        assert_eq!(render(&Err(Error)), "ERROR");
    }
}
