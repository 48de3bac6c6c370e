use std::process;

use clap::Parser;

use typescrub::cli::Args;

fn main() {
    let args = Args::parse();
    match typescrub::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
