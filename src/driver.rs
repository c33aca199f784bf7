
use std::io;
use std::thread;

use tracing::debug;

use crate::config::Config;
use crate::expr::Expr;
use crate::port::Port;
use crate::read::read;
use crate::render::render;
use crate::runtime::Environment;
use crate::value::{Error, Value};

fn evaluate(program: Result<(Expr, Environment), Error>) -> Result<Value, Error>
{
    let (expr, env) = program?;
    let outcome = expr.eval(&env);
    debug!(bindings = env.len(), succeeded = outcome.is_ok(), "evaluated");
    outcome
}

/// Reads the program from `config.input` and writes its rendered result to
/// `config.output`. Program errors end up in the output; only I/O errors are
/// returned. Nothing is written if the input cannot be opened.
pub fn run(config: &Config) -> io::Result<()> {
    let mut input = Port::open_input_file(&config.input)?;
    let source = input.read_to_string()?;
    let program = read(&source);

    let mut output = Port::open_output_file(&config.output)?;
    let rendered = render(&evaluate(program));
    debug!(input = %config.input.display(), output = %config.output.display(),
        result = rendered.as_str(), "run finished");
    output.write_str(&rendered)
}

/// Runs `run` on a thread with `config.stack_size` bytes of stack.
pub fn run_in_worker(config: &Config) -> io::Result<()> {
    let worker_config = config.clone();
    let worker = thread::Builder::new()
        .name("interp".to_string())
        .stack_size(config.stack_size)
        .spawn(move || run(&worker_config))?;
    worker.join().unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other,
        "interpreter thread panicked")))
}
