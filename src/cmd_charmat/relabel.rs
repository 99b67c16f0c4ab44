use clap::*;
use charmat::libs::nexus;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("relabel")
        .about("Restores taxon labels replaced by to-rdf")
        .after_help(
            r###"
Replaces every H_<n> placeholder in a text file (e.g. a network or tree
written by an external tool) with the label saved by `charmat to-rdf --labels`.

Examples:
1. Relabel a tree:
   charmat relabel network.nwk labels.json -o network.relabeled.nwk

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
            Arg::new("labels")
                .required(true)
                .num_args(1)
                .index(2)
                .help("JSON mapping written by to-rdf"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut writer = charmat::writer(args.get_one::<String>("outfile").unwrap())?;
    let infile = args.get_one::<String>("infile").unwrap();
    let labels = nexus::rdf::labels_from_json(&charmat::read_to_string(
        args.get_one::<String>("labels").unwrap(),
    )?)?;

    //----------------------------
    // Ops
    //----------------------------
    let text = charmat::read_to_string(infile)?;
    let out = nexus::relabel(&text, &labels);

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(out.as_ref())?;

    Ok(())
}
