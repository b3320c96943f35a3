use clap::Parser;

use fec_cli::options::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    logger::init();

    if let Err(err) = fec_cli::run(&cli) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
