
extern crate either;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate maplit;
extern crate regex;

mod config;
mod driver;
mod expr;
mod port;
mod read;
mod render;
mod runtime;
mod value;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::default();
    if let Err(err) = driver::run_in_worker(&config) {
        tracing::error!(%err, "could not run program");
    }
}
