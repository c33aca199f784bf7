mod lexer;

use std::collections::HashMap;

use either::{Either, Left, Right};
use tracing::debug;

use crate::expr::Expr;
use crate::runtime::Environment;
use crate::value::Error;
use self::lexer::{Lexer, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Keyword {
    Val,
    Var,
    Add,
    If,
    Let,
    Function,
    Call,
}

/// A compound form waiting for its next operand.
#[derive(Debug)]
enum Frame {
    AddLhs,
    AddRhs {
        lhs: Expr,
    },
    IfFirst,
    IfSecond {
        first: Expr,
    },
    IfTrue {
        first: Expr,
        second: Expr,
    },
    IfFalse {
        first: Expr,
        second: Expr,
        if_true: Expr,
    },
    LetValue {
        name: String,
    },
    LetBody {
        name: String,
        value: Expr,
    },
    FunctionBody {
        param: String,
    },
    CallCallee,
    CallArgument {
        callee: Expr,
    },
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = hashmap! {
        "val" => Keyword::Val,
        "var" => Keyword::Var,
        "add" => Keyword::Add,
        "if" => Keyword::If,
        "let" => Keyword::Let,
        "function" => Keyword::Function,
        "call" => Keyword::Call,
    };
}

/// Reads one expression off the front of `input`. Anything after it is left
/// unread. `let` initializers are evaluated and bound into the returned
/// environment while reading.
pub fn read(input: &str) -> Result<(Expr, Environment), Error> {
    let mut reader = Reader::new(input);
    let expr = reader.read_expr()?;
    Ok((expr, reader.into_environment()))
}

pub struct Reader<'a> {
    lexer: Lexer<'a>,
    environment: Environment,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            lexer: Lexer::new(input),
            environment: Environment::new(),
        }
    }

    pub fn into_environment(self) -> Environment {
        self.environment
    }

    pub fn read_token(&mut self) -> Result<Option<Token>, Error> {
        self.lexer.next().transpose()
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), Error> {
        match self.read_token()? {
            Some(ref tok) if *tok == expected => Ok(()),
            found => {
                debug!(?expected, ?found, "syntax error");
                Err(Error)
            },
        }
    }

    /// Separator words (`then`, `else`, `=`, `in`) lex as identifiers.
    fn expect_word(&mut self, word: &'static str) -> Result<(), Error> {
        self.expect_token(Token::Identifier(word.to_string()))
    }

    fn read_identifier(&mut self) -> Result<String, Error> {
        match self.read_token()? {
            Some(Token::Identifier(ident)) => Ok(ident),
            found => {
                debug!(?found, "syntax error: expected an identifier");
                Err(Error)
            },
        }
    }

    fn read_number(&mut self) -> Result<i64, Error> {
        match self.read_token()? {
            Some(Token::Number(n)) => Ok(n),
            found => {
                debug!(?found, "syntax error: expected an integer");
                Err(Error)
            },
        }
    }

    fn read_keyword(&mut self) -> Result<Keyword, Error> {
        let word = self.read_identifier()?;
        KEYWORDS.get(word.as_str()).cloned().ok_or_else(|| {
            debug!(keyword = word.as_str(), "unknown keyword");
            Error
        })
    }

    /// Reads one expression. Pending forms are kept on an explicit stack of
    /// frames, so nesting depth costs heap, not Rust stack.
    pub fn read_expr(&mut self) -> Result<Expr, Error> {
        let mut frames: Vec<Frame> = Vec::new();
        loop {
            let mut done = match self.open_form()? {
                Left(frame) => {
                    frames.push(frame);
                    continue;
                },
                Right(expr) => expr,
            };
            loop {
                let frame = match frames.pop() {
                    Some(frame) => frame,
                    None => return Ok(done),
                };
                match self.resume(frame, done)? {
                    Left(frame) => {
                        frames.push(frame);
                        break;
                    },
                    Right(expr) => done = expr,
                }
            }
        }
    }

    /// Reads `(` and a keyword. Leaf forms are read to their closing `)`;
    /// compound forms come back as the frame awaiting their first operand.
    fn open_form(&mut self) -> Result<Either<Frame, Expr>, Error> {
        self.expect_token(Token::LeftParen)?;
        let frame = match self.read_keyword()? {
            Keyword::Val => {
                let n = self.read_number()?;
                self.expect_token(Token::RightParen)?;
                return Ok(Right(Expr::val(n)));
            },
            Keyword::Var => {
                let name = self.read_identifier()?;
                self.expect_token(Token::RightParen)?;
                return Ok(Right(Expr::var(name)));
            },
            Keyword::Add => Frame::AddLhs,
            Keyword::If => Frame::IfFirst,
            Keyword::Let => {
                let name = self.read_identifier()?;
                self.expect_word("=")?;
                Frame::LetValue {name}
            },
            Keyword::Function => Frame::FunctionBody {
                param: self.read_identifier()?,
            },
            Keyword::Call => Frame::CallCallee,
        };
        Ok(Left(frame))
    }

    /// Hands a finished operand to `frame`. Returns the frame's next stage,
    /// or the finished form once its closing `)` has been read.
    fn resume(&mut self, frame: Frame, expr: Expr) ->
        Result<Either<Frame, Expr>, Error> {

        let next = match frame {
            Frame::AddLhs => Frame::AddRhs {lhs: expr},
            Frame::AddRhs {lhs} => return self.close(Expr::add(lhs, expr)),
            Frame::IfFirst => Frame::IfSecond {first: expr},
            Frame::IfSecond {first} => {
                self.expect_word("then")?;
                Frame::IfTrue {first, second: expr}
            },
            Frame::IfTrue {first, second} => {
                self.expect_word("else")?;
                Frame::IfFalse {first, second, if_true: expr}
            },
            Frame::IfFalse {first, second, if_true} =>
                return self.close(Expr::if_greater(first, second, if_true,
                    expr)),
            // The binding is in place before the body is read, so it
            // precedes any binding the body introduces.
            Frame::LetValue {name} => {
                let bound = expr.eval(&self.environment)?;
                self.environment.bind(&name, bound);
                self.expect_word("in")?;
                Frame::LetBody {name, value: expr}
            },
            Frame::LetBody {name, value} =>
                return self.close(Expr::let_in(name, value, expr)),
            Frame::FunctionBody {param} =>
                return self.close(Expr::function(param, expr)),
            Frame::CallCallee => Frame::CallArgument {callee: expr},
            Frame::CallArgument {callee} =>
                return self.close(Expr::call(callee, expr)),
        };
        Ok(Left(next))
    }

    fn close(&mut self, expr: Expr) -> Result<Either<Frame, Expr>, Error> {
        self.expect_token(Token::RightParen)?;
        Ok(Right(expr))
    }
}
