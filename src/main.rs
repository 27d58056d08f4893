use clap::Parser;
use mactrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
