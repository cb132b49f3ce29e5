use clap::Parser;

use cpgview::cli::{run, Cli, EXIT_NOT_READY};
use cpgview::observability::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("cpgview: {err}");
            if err.is_retryable() {
                EXIT_NOT_READY
            } else {
                1
            }
        }
    };
    std::process::exit(code);
}
