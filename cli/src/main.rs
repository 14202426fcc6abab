mod args;
mod commands;

use clap::Parser;

fn main() {
    env_logger::init();
    let args = args::Args::parse();
    if let Err(error) = commands::dispatch(args) {
        log::error!("{}", error);
        std::process::exit(1);
    }
}
