use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "typescrub",
    version,
    about = "Hide or delete members of generated type declarations"
)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Log every change as it is made
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the progress bar and informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,
}
