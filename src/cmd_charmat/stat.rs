use clap::*;
use charmat::libs::nexus;
use itertools::Itertools;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("stat")
        .about("Counts informative and uninformative characters")
        .after_help(
            r###"
Reports the dimensions of a NEXUS character matrix and how many of its
characters are parsimony-informative.

A character is informative when, ignoring missing and gap codes, at least two
distinct states are each shared by more than one taxon.

Note:
- Inference programs (e.g. MrBayes' coding-bias exclusion) may report
  different counts; this command keeps the rule above.

Examples:
1. Summary of a matrix:
   charmat stat tests/nexus/small.nex

2. Also list the informative characters (1-based):
   charmat stat tests/nexus/small.nex --columns

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("columns")
                .long("columns")
                .action(ArgAction::SetTrue)
                .help("List the informative characters"),
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
    let is_columns = args.get_flag("columns");

    //----------------------------
    // Ops
    //----------------------------
    let matrix = nexus::from_file(infile, &super::parse_options(args))?;
    let report = nexus::analyse(&matrix);

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(report.to_string().as_ref())?;
    if is_columns {
        writer.write_all(
            format!(
                "  informative: {}\n",
                report.informative_columns.iter().map(|i| i + 1).join(",")
            )
            .as_ref(),
        )?;
    }

    Ok(())
}
