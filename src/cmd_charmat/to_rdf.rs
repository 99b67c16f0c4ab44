use clap::*;
use charmat::libs::nexus;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("to-rdf")
        .about("Exports a matrix in the fixed-width RDF layout")
        .after_help(
            r###"
Writes the fixed-width layout read by median-joining network tools.

Taxa are renamed to H_1, H_2, ... in matrix order, as the format only allows
short identifiers. Use --labels to save the mapping and `charmat relabel` to
put the original names back into the tool's output.

Missing and gap cells are written as the placeholder.

Examples:
1. Export with the label mapping:
   charmat to-rdf tests/nexus/small.nex --labels labels.json -o small.rdf

2. Leave out characters no taxon attests:
   charmat to-rdf tests/nexus/small.nex --ignore-missing

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
            Arg::new("ignore_missing")
                .long("ignore-missing")
                .action(ArgAction::SetTrue)
                .help("Skip characters where every taxon reads missing or gap"),
        )
        .arg(
            Arg::new("placeholder")
                .long("placeholder")
                .num_args(1)
                .default_value("N")
                .value_parser(value_parser!(char))
                .help("State written for missing and gap cells"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .num_args(1)
                .help("Write the H_<n> to taxon mapping to this JSON file"),
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

    let placeholder = *args.get_one::<char>("placeholder").unwrap();
    if !placeholder.is_ascii_graphic() {
        anyhow::bail!("Placeholder must be a printable ASCII character");
    }
    let opts = nexus::RdfOptions {
        ignore_missing: args.get_flag("ignore_missing"),
        placeholder: placeholder as u8,
    };

    //----------------------------
    // Ops
    //----------------------------
    let matrix = nexus::from_file(infile, &super::parse_options(args))?;
    let export = nexus::to_rdf(&matrix, &opts);

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(export.text.as_ref())?;

    if let Some(path) = args.get_one::<String>("labels") {
        let mut label_writer = charmat::writer(path)?;
        label_writer.write_all(nexus::rdf::labels_to_json(&export.labels)?.as_ref())?;
        label_writer.write_all(b"\n")?;
    }

    Ok(())
}
