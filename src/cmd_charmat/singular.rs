use clap::*;
use charmat::libs::nexus;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("singular")
        .about("Lists singular readings")
        .after_help(
            r###"
Lists every reading attested by exactly one taxon.

Output is tab-separated: <character> <taxon> <state>, characters numbered
from 1. Missing and gap codes are never reported.

Examples:
1. Singular readings of a matrix:
   charmat singular tests/nexus/small.nex

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(super::arg_strict())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut writer = charmat::writer(args.get_one::<String>("outfile").unwrap())?;
    let infile = args.get_one::<String>("infile").unwrap();

    //----------------------------
    // Ops
    //----------------------------
    let matrix = nexus::from_file(infile, &super::parse_options(args))?;
    let readings = nexus::informative::singular_readings(&matrix);
    tracing::info!("Found {} singular readings", readings.len());

    //----------------------------
    // Output
    //----------------------------
    for r in &readings {
        writer.write_all(
            format!("{}\t{}\t{}\n", r.column + 1, r.taxon, r.state as char).as_ref(),
        )?;
    }

    Ok(())
}
