//! Subcommand modules for the `charmat` binary.

pub mod build;
pub mod merge;
pub mod relabel;
pub mod singular;
pub mod stat;
pub mod subset;
pub mod to_rdf;

use charmat::libs::nexus::ParseOptions;

/// The `--strict` switch shared by every command reading a matrix.
pub fn arg_strict() -> clap::Arg {
    clap::Arg::new("strict")
        .long("strict")
        .action(clap::ArgAction::SetTrue)
        .help("Fail when the declared symbols differ from the observed ones")
}

pub fn parse_options(args: &clap::ArgMatches) -> ParseOptions {
    ParseOptions {
        strict_symbols: args.get_flag("strict"),
    }
}

pub fn arg_outfile() -> clap::Arg {
    clap::Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}
