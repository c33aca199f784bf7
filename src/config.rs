
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "input.txt";
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Stack for the interpreter thread. Reading and evaluating use a constant
/// amount of it; the collector's marking recurses once per nesting level of
/// the program, which bounds the nesting depth to roughly a hundred thousand.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Where the program is read from, where its result is written, and how much
/// stack the interpreter thread gets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stack_size: usize,
}

impl Config {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O) -> Self {
        Config {
            input: input.into(),
            output: output.into(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_INPUT, DEFAULT_OUTPUT)
    }
}

#[test]
fn test_default_paths() {
    let config = Config::default();
    assert_eq!(config.input, PathBuf::from("input.txt"));
    assert_eq!(config.output, PathBuf::from("output.txt"));
    assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
}
