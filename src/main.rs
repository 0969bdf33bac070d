use clap::Parser;

use asn1gen::cli::Cli;
use asn1gen::error::exit_code;
use asn1gen::run;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}
