use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::interpreter::DEFAULT_MAX_DEPTH;

#[derive(Parser, Debug)]
#[command(name = "aks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AkshayaLang interpreter", long_about = None)]
pub struct Args {
    /// Script to run. Starts a REPL when neither a script nor --eval is given.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    #[arg(short, long, value_name = "CODE", conflicts_with = "script")]
    pub eval: Option<String>,

    /// Print the token stream instead of running.
    #[arg(long = "tokens")]
    pub tokens: bool,

    /// Print the parsed program instead of running.
    #[arg(long = "ast")]
    pub ast: bool,

    #[arg(long = "max-depth", value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a shell completion script.
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
