
use std::collections::HashMap;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::value::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    LeftParen,
    RightParen,
    Identifier(String),
    Number(i64),
}

/// Pulls one token at a time off the front of the remaining input.
#[derive(Debug)]
pub struct Lexer<'a>(&'a str);

macro_rules! grammar {
    ($($key:ident -> $value:expr;)*) => {lazy_static! {
        static ref GRAMMAR: HashMap<&'static str, &'static str> = {
            let mut grammar = HashMap::new();
            $(
                grammar.insert(stringify!($key), $value);
            )*
            grammar
        };
    }}
}

// `<<class>>` splices in the expansion of another class.
grammar! {
    capture_token -> "^<<intertoken_space>><<token>>";

    token -> r"(?P<token><<number>>|<<identifier>>|\(|\))";
    intertoken_space -> r"<<whitespace>>*";
    whitespace -> r"\s";
    number -> r"(?P<number><<sign>>?<<digit>>+)";
    sign -> r"[+-]";
    digit -> r"[0-9]";
    identifier -> r"(?P<identifier><<constituent>>+)";
    constituent -> r"[^\s()]";
}

lazy_static! {
    static ref REGEX_STRINGS: HashMap<&'static str, String> =
        expand_grammar(&GRAMMAR);

    static ref TOKEN: Regex = regex_class("capture_token");
}

fn expand_grammar(grammar: &HashMap<&'static str, &'static str>) ->
    HashMap<&'static str, String> {

    let reference = Regex::new(r"<<([a-z_]*)>>").unwrap();
    let mut res: HashMap<&'static str, String> = HashMap::new();
    while res.len() < grammar.len() {
        let mut progress = false;
        for (&class, &expression) in grammar.iter() {
            if res.contains_key(class) {
                continue;
            }
            let mut resolved = true;
            let replacement = reference.replace_all(expression,
                |m: &Captures| match res.get(&m[1]) {
                    Some(value) => value.to_string(),
                    None => {
                        resolved = false;
                        String::new()
                    },
                }).into_owned();
            if resolved {
                res.insert(class, replacement);
                progress = true;
            }
        }
        assert!(progress, "grammar has an undefined or cyclic class");
    }
    res
}

fn regex_class(class: &'static str) -> Regex {
    Regex::new(&REGEX_STRINGS[class]).unwrap()
}

fn read_token(input: &str) -> Option<(Result<Token, Error>, &str)> {
    let captures = TOKEN.captures(input)?;
    let end = captures.get(0).map_or(0, |m| m.end());
    let token = captures_to_token(&captures);
    Some((token, &input[end..]))
}

fn captures_to_token(captures: &Captures) -> Result<Token, Error> {
    if let Some(m) = captures.name("number") {
        return m.as_str().parse().map(Token::Number).map_err(|_| {
            debug!(literal = m.as_str(), "integer literal out of range");
            Error
        });
    }
    if let Some(m) = captures.name("identifier") {
        return Ok(Token::Identifier(m.as_str().to_string()));
    }
    match &captures["token"] {
        "(" => Ok(Token::LeftParen),
        ")" => Ok(Token::RightParen),
        other => {
            debug!(token = other, "unclassified token");
            Err(Error)
        },
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer(input)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        read_token(self.0).map(|(token, rest)| {
            trace!(?token, "token");
            self.0 = rest;
            token
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_regex_strings_gen() {
        ::lazy_static::initialize(&REGEX_STRINGS);
    }

    #[test]
    fn test_valid_regex() {
        for class in GRAMMAR.keys() {
            let string = REGEX_STRINGS.get(class)
                            .expect(&format!("REGEX_STRINGS doesn't contain key \
                            {:?}", class));
            Regex::new(string).expect(
                &format!("Regex for {} doesn't compile (regex = {:?})", class,
                string));
        }
    }

    #[test]
    fn test_identifier() {
        let re = regex_class("identifier");
        let m = re.find("let x = (val 1)").unwrap();
        assert_eq!((m.start(), m.end()), (0, 3));
        let m = re.find("  =(").unwrap();
        assert_eq!((m.start(), m.end()), (2, 3));
    }

    #[test]
    fn test_number() {
        let re = regex_class("number");
        assert!(re.is_match("-12"));
        assert!(!re.is_match("x"));
    }

    #[test]
    fn test_token_0() {
        assert_eq!(read_token("("), Some((Ok(Token::LeftParen), "")));
    }

    #[test]
    fn test_token_1() {
        assert_eq!(read_token(" \n\t)"), Some((Ok(Token::RightParen), "")));
    }

    #[test]
    fn test_token_2() {
        assert_eq!(read_token("var x)"), Some((Ok(Token::Identifier(
            "var".to_string())), " x)")));
    }

    #[test]
    fn test_token_3() {
        assert_eq!(read_token("-42)"), Some((Ok(Token::Number(-42)), ")")));
        assert_eq!(read_token("+7 "), Some((Ok(Token::Number(7)), " ")));
    }

    #[test]
    fn test_token_4() {
        assert_eq!(read_token("   "), None);
        assert_eq!(read_token(""), None);
    }

    #[test]
    fn test_token_out_of_range() {
        assert_eq!(read_token("99999999999999999999)"),
            Some((Err(Error), ")")));
    }

    #[test]
    fn test_sign_alone_is_identifier() {
        assert_eq!(read_token("- 1"), Some((Ok(Token::Identifier(
            "-".to_string())), " 1")));
    }

    #[test]
    fn test_lexer() {
        assert_eq!(Lexer::new("(add (val 1)(var y))")
            .collect::<Result<Vec<_>, _>>(),
            Ok(vec![Token::LeftParen, Token::Identifier("add".to_string()),
            Token::LeftParen, Token::Identifier("val".to_string()),
            Token::Number(1), Token::RightParen, Token::LeftParen,
            Token::Identifier("var".to_string()),
            Token::Identifier("y".to_string()), Token::RightParen,
            Token::RightParen]));
    }
}
