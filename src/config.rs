use crate::cli::{Args, ColorChoice};

/// Settings resolved once from the command line.
pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    pub max_depth: usize,
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            max_depth: args.max_depth,
            dump_tokens: args.tokens,
            dump_ast: args.ast,
        }
    }

    /// Running is skipped when only a dump was asked for.
    pub fn dump_only(&self) -> bool {
        self.dump_tokens || self.dump_ast
    }
}
