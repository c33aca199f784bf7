
use std::rc::Rc;

use either::{Either, Left, Right};
use gc::{Finalize, Gc, GcCell, Trace};
use tracing::{debug, trace};

use crate::expr::{Expr, ExprKind};
use crate::value::{Error, Lambda, Value};

// Clone-by-reference environment. Every clone sees every binding.
#[derive(Clone, Debug)]
pub struct Environment(Gc<GcCell<EnvironmentData>>);

#[derive(Debug, Default, Finalize, Trace)]
struct EnvironmentData {
    bindings: Vec<Binding>,
}

#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub struct Binding {
    name: String,
    value: Value,
}

#[derive(Debug, Clone)]
pub struct Continuation(Rc<ContinuationData>);

#[derive(Debug)]
enum ContinuationData {
    AddLhs {
        rhs: Expr,
        next_continuation: Continuation,
    },
    AddRhs {
        lhs: i64,
        next_continuation: Continuation,
    },
    IfFirst {
        second: Expr,
        if_true: Expr,
        if_false: Expr,
        next_continuation: Continuation,
    },
    IfSecond {
        first: i64,
        if_true: Expr,
        if_false: Expr,
        next_continuation: Continuation,
    },
    Callee {
        argument: Expr,
        next_continuation: Continuation,
    },
    Argument {
        lambda: Lambda,
        next_continuation: Continuation,
    },
    End,
}

#[derive(Clone, Debug)]
pub struct Task(TaskEnum);

#[derive(Clone, Debug)]
enum TaskEnum {
    Eval {
        expression: Expr,
        environment: Environment,
        continuation: Continuation,
    },
    Return {
        value: Value,
        environment: Environment,
        continuation: Continuation,
    },
    Done(Value),
}

impl Environment {
    pub fn new() -> Environment {
        Environment(Gc::new(GcCell::new(EnvironmentData::default())))
    }

    /// Appends a binding. Earlier bindings of the same name are kept and keep
    /// taking precedence in `lookup`.
    pub fn bind(&self, name: &str, value: Value) {
        trace!(name, %value, "bind");
        self.0.borrow_mut().bindings.push(Binding {
            name: name.to_string(),
            value,
        });
    }

    /// Resolves `name` to its earliest binding.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.0.borrow().bindings.iter()
            .find(|binding| binding.name == name)
            .map(|binding| binding.value.clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().bindings.len()
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

impl Continuation {
    fn from_data(data: ContinuationData) -> Continuation {
        Continuation(Rc::new(data))
    }

    pub fn pass_value(self, value: Value, environment: Environment) ->
        Result<Task, Error> {

        match *self.0 {
            ContinuationData::AddLhs {ref rhs, ref next_continuation} => {
                let lhs = expect_int(&value, "add")?;
                let new_continuation = Continuation::from_data(
                    ContinuationData::AddRhs {
                        lhs,
                        next_continuation: next_continuation.clone(),
                    });
                Ok(Task::eval(rhs.clone(), environment, new_continuation))
            },
            ContinuationData::AddRhs {lhs, ref next_continuation} => {
                let rhs = expect_int(&value, "add")?;
                let sum = lhs.checked_add(rhs).ok_or_else(|| {
                    debug!(lhs, rhs, "integer overflow in add");
                    Error
                })?;
                Ok(Task::ret(Value::Int(sum), environment,
                    next_continuation.clone()))
            },
            ContinuationData::IfFirst {ref second, ref if_true, ref if_false,
                ref next_continuation} => {

                let first = expect_int(&value, "if")?;
                let new_continuation = Continuation::from_data(
                    ContinuationData::IfSecond {
                        first,
                        if_true: if_true.clone(),
                        if_false: if_false.clone(),
                        next_continuation: next_continuation.clone(),
                    });
                Ok(Task::eval(second.clone(), environment, new_continuation))
            },
            ContinuationData::IfSecond {first, ref if_true, ref if_false,
                ref next_continuation} => {

                let second = expect_int(&value, "if")?;
                let branch = if first > second { if_true } else { if_false };
                Ok(Task::eval(branch.clone(), environment,
                    next_continuation.clone()))
            },
            ContinuationData::Callee {ref argument, ref next_continuation} => {
                let lambda = value.as_lambda().cloned().ok_or_else(|| {
                    debug!(callee = %value, "call of a non-function");
                    Error
                })?;
                let new_continuation = Continuation::from_data(
                    ContinuationData::Argument {
                        lambda,
                        next_continuation: next_continuation.clone(),
                    });
                Ok(Task::eval(argument.clone(), environment, new_continuation))
            },
            ContinuationData::Argument {ref lambda, ref next_continuation} => {
                environment.bind(lambda.param(), value);
                Ok(Task::eval(lambda.body().clone(), environment,
                    next_continuation.clone()))
            },
            ContinuationData::End => Ok(Task::done(value)),
        }
    }
}

impl Default for Continuation {
    fn default() -> Continuation {
        Continuation::from_data(ContinuationData::End)
    }
}

fn expect_int(value: &Value, construct: &'static str) -> Result<i64, Error> {
    value.as_int().ok_or_else(|| {
        debug!(construct, operand = %value, "expected an integer operand");
        Error
    })
}

impl Task {
    /// Construct the task for evaluating `expr` in environment `env` & passing
    /// the result to continuation `cont`. Does not do any work in evaluating
    /// `expr`.
    pub fn eval(expr: Expr, env: Environment, cont: Continuation) -> Task {
        Task(TaskEnum::Eval {
            expression: expr,
            environment: env,
            continuation: cont,
        })
    }

    /// Construct the task for handing an already computed value to `cont`.
    pub fn ret(val: Value, env: Environment, cont: Continuation) -> Task {
        Task(TaskEnum::Return {
            value: val,
            environment: env,
            continuation: cont,
        })
    }

    pub fn done(val: Value) -> Task {
        Task(TaskEnum::Done(val))
    }

    pub fn complete(self) -> Result<Value, Error> {
        let mut cur_task = self;
        loop {
            match cur_task.step()? {
                Left(next_task) => cur_task = next_task,
                Right(result) => return Ok(result),
            }
        }
    }

    pub fn step(self) -> Result<Either<Task, Value>, Error> {
        match self.0 {
            TaskEnum::Eval {expression: expr, environment: env, continuation:
                cont} => {

                match expr.kind() {
                    ExprKind::Val(n) => Ok(Left(Task::ret(Value::Int(*n), env,
                        cont))),
                    ExprKind::Var(name) => match env.lookup(name) {
                        Some(val) => Ok(Left(Task::ret(val, env, cont))),
                        None => {
                            debug!(name = name.as_str(), "unbound variable");
                            Err(Error)
                        },
                    },
                    ExprKind::Add(lhs, rhs) => {
                        let new_continuation = Continuation::from_data(
                            ContinuationData::AddLhs {
                                rhs: rhs.clone(),
                                next_continuation: cont,
                            });
                        Ok(Left(Task::eval(lhs.clone(), env, new_continuation)))
                    },
                    ExprKind::If(first, second, if_true, if_false) => {
                        let new_continuation = Continuation::from_data(
                            ContinuationData::IfFirst {
                                second: second.clone(),
                                if_true: if_true.clone(),
                                if_false: if_false.clone(),
                                next_continuation: cont,
                            });
                        Ok(Left(Task::eval(first.clone(), env,
                            new_continuation)))
                    },
                    // The initializer was bound when the node was read.
                    ExprKind::Let(_, _, body) =>
                        Ok(Left(Task::eval(body.clone(), env, cont))),
                    ExprKind::Function(param, body) => {
                        let lambda = Lambda::new(param, body.clone());
                        Ok(Left(Task::ret(Value::Function(lambda), env, cont)))
                    },
                    ExprKind::Call(callee, argument) => {
                        let new_continuation = Continuation::from_data(
                            ContinuationData::Callee {
                                argument: argument.clone(),
                                next_continuation: cont,
                            });
                        Ok(Left(Task::eval(callee.clone(), env,
                            new_continuation)))
                    },
                }
            },
            TaskEnum::Return {value, environment, continuation} =>
                Ok(Left(continuation.pass_value(value, environment)?)),
            TaskEnum::Done(val) => Ok(Right(val)),
        }
    }
}

impl Expr {
    pub fn eval(&self, env: &Environment) -> Result<Value, Error> {
        let continuation = Continuation::default();
        let task = Task::eval(self.clone(), env.clone(), continuation);
        task.complete()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::expr::Expr;
    use crate::value::{Error, Lambda, Value};
    use super::Environment;

    fn comparison(expr: Expr, output: Result<Value, Error>) {
        assert_eq!(expr.eval(&Environment::new()), output);
    }

    #[test]
    fn test_lookup_earliest_binding() {
        let env = Environment::new();
        env.bind("x", Value::Int(1));
        env.bind("y", Value::Int(2));
        env.bind("x", Value::Int(3));
        assert_eq!(env.lookup("x"), Some(Value::Int(1)));
        assert_eq!(env.lookup("y"), Some(Value::Int(2)));
        assert_eq!(env.lookup("z"), None);
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_clones_share_bindings() {
        let env = Environment::new();
        let other = env.clone();
        other.bind("x", Value::Int(7));
        assert_eq!(env.lookup("x"), Some(Value::Int(7)));
    }

    #[test]
    fn test_val() {
        comparison(Expr::val(5), Ok(Value::Int(5)));
    }

    #[test]
    fn test_add() {
        comparison(Expr::add(Expr::val(2), Expr::val(3)), Ok(Value::Int(5)));
    }

    #[test]
    fn test_add_overflow() {
        comparison(Expr::add(Expr::val(i64::max_value()), Expr::val(1)),
            Err(Error));
    }

    #[test]
    fn test_if_strictly_greater() {
        let pick = |a, b| Expr::if_greater(Expr::val(a), Expr::val(b),
            Expr::val(1), Expr::val(2));
        comparison(pick(5, 3), Ok(Value::Int(1)));
        comparison(pick(1, 3), Ok(Value::Int(2)));
        comparison(pick(3, 3), Ok(Value::Int(2)));
    }

    #[test]
    fn test_if_untaken_branch_not_evaluated() {
        comparison(Expr::if_greater(Expr::val(1), Expr::val(0), Expr::val(9),
            Expr::var("unbound")), Ok(Value::Int(9)));
    }

    #[test]
    fn test_unbound_variable() {
        comparison(Expr::var("x"), Err(Error));
        comparison(Expr::add(Expr::val(1), Expr::var("x")), Err(Error));
    }

    #[test]
    fn test_function_value() {
        let body = Expr::add(Expr::var("x"), Expr::val(1));
        comparison(Expr::function("x", body.clone()),
            Ok(Value::Function(Lambda::new("x", body))));
    }

    #[test]
    fn test_function_body_not_evaluated() {
        let expr = Expr::function("x", Expr::var("nowhere"));
        assert!(expr.eval(&Environment::new()).is_ok());
    }

    #[test]
    fn test_call() {
        let function = Expr::function("x", Expr::add(Expr::var("x"),
            Expr::val(1)));
        comparison(Expr::call(function, Expr::val(10)), Ok(Value::Int(11)));
    }

    #[test]
    fn test_call_binds_parameter_in_shared_environment() {
        let env = Environment::new();
        let expr = Expr::call(Expr::function("x", Expr::var("x")),
            Expr::val(4));
        assert_eq!(expr.eval(&env), Ok(Value::Int(4)));
        assert_eq!(env.lookup("x"), Some(Value::Int(4)));
    }

    #[test]
    fn test_call_parameter_keeps_first_argument() {
        let env = Environment::new();
        env.bind("f", Value::Function(Lambda::new("x", Expr::var("x"))));
        let expr = Expr::add(Expr::call(Expr::var("f"), Expr::val(1)),
            Expr::call(Expr::var("f"), Expr::val(2)));
        assert_eq!(expr.eval(&env), Ok(Value::Int(2)));
    }

    #[test]
    fn test_type_mismatches() {
        let function = || Expr::function("x", Expr::var("x"));
        comparison(Expr::add(function(), Expr::val(1)), Err(Error));
        comparison(Expr::if_greater(Expr::val(1), function(), Expr::val(1),
            Expr::val(2)), Err(Error));
        comparison(Expr::call(Expr::val(3), Expr::val(1)), Err(Error));
    }

    #[test]
    fn test_call_of_non_function_skips_argument() {
        let env = Environment::new();
        let expr = Expr::call(Expr::val(3),
            Expr::call(Expr::function("y", Expr::var("y")), Expr::val(1)));
        assert_eq!(expr.eval(&env), Err(Error));
        assert_eq!(env.len(), 0);
    }

    #[test]
    fn test_deep_nesting() {
        let mut expr = Expr::val(0);
        for _ in 0..1_000 {
            expr = Expr::add(Expr::val(1), expr);
        }
        comparison(expr, Ok(Value::Int(1_000)));
    }
}
