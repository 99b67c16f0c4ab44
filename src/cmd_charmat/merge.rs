use clap::*;
use charmat::libs::nexus;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("merge")
        .about("Combines several matrices into one")
        .after_help(
            r###"
Concatenates the characters of all input matrices over the union of their taxa.

Note:
- Taxa keep the order of the first file they appear in; new taxa are appended.
- A taxon absent from an input gets the missing code for all of that input's
  characters, never the gap code.
- --extant-pct removes, after merging, taxa attested in fewer than the given
  percentage of all characters.

Examples:
1. Combine two matrices:
   charmat merge tests/nexus/part1.nex tests/nexus/part2.nex

2. Keep only taxa attested in at least 50% of the characters:
   charmat merge tests/nexus/part1.nex tests/nexus/part2.nex -e 50 -o combined.nex

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Input matrices to combine"),
        )
        .arg(
            Arg::new("extant_pct")
                .long("extant-pct")
                .short('e')
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(f64))
                .help("Percentage of characters a taxon must attest to be included"),
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
    let extant_pct = *args.get_one::<f64>("extant_pct").unwrap();
    let opts = super::parse_options(args);

    //----------------------------
    // Ops
    //----------------------------
    let mut matrices = vec![];
    for infile in args.get_many::<String>("infiles").unwrap() {
        matrices.push(nexus::from_file(infile, &opts)?);
    }
    let mut merged = nexus::merge_all(&matrices)?;
    tracing::info!(
        "Merged {} matrices: {} taxa, {} characters",
        matrices.len(),
        merged.ntax(),
        merged.nchar()
    );

    if extant_pct > 0.0 {
        let (kept, _) = nexus::filter_extant(&merged, extant_pct)?;
        merged = kept;
    }

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(nexus::write_nexus(&merged).as_ref())?;

    Ok(())
}
