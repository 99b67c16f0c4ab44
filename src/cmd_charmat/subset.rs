use clap::*;
use charmat::libs::nexus;
use charmat::libs::nexus::subset::{named_alphabet, OverflowPolicy, TaxonSelection};
use itertools::Itertools;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("subset")
        .about("Extracts taxa and recodes states of a matrix")
        .after_help(
            r###"
Creates a subset of a NEXUS matrix for downstream inference tools.

Steps:
1. Keep the listed taxa (or `all`); output follows the matrix order.
2. Exclude taxa whose share of missing/gap codes exceeds --frag.
   The share is computed over all characters of the input.
3. Remove characters identical in every remaining taxon.
4. With --alphabet, recode every character: the first state met (taxa in
   matrix order) gets the first letter, and so on. Missing and gap codes are
   kept as they are.

Characters with more states than the alphabet has letters either abort the
run (--overflow abort) or are left out (--overflow skip).

Alphabets:
* dna:     ACTG
* protein: FSTKEYVQMCLAWPHDRIG
* none:    keep the states

Examples:
1. Three witnesses as DNA:
   charmat subset tests/nexus/small.nex 01 03 P46 --alphabet dna

2. All taxa at most 40% fragmentary, skipping characters that don't fit:
   charmat subset tests/nexus/small.nex all --frag 40 --alphabet dna --overflow skip

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
            Arg::new("taxa")
                .num_args(0..)
                .index(2)
                .help("Taxa to include, or `all` [default: all]"),
        )
        .arg(
            Arg::new("frag")
                .long("frag")
                .num_args(1)
                .default_value("100")
                .value_parser(value_parser!(f64))
                .help("Maximum percentage of missing/gap codes per taxon"),
        )
        .arg(
            Arg::new("alphabet")
                .long("alphabet")
                .action(ArgAction::Set)
                .value_parser([
                    builder::PossibleValue::new("dna"),
                    builder::PossibleValue::new("protein"),
                    builder::PossibleValue::new("none"),
                ])
                .default_value("none")
                .help("Target alphabet of the recoding"),
        )
        .arg(
            Arg::new("overflow")
                .long("overflow")
                .action(ArgAction::Set)
                .value_parser([
                    builder::PossibleValue::new("abort"),
                    builder::PossibleValue::new("skip"),
                ])
                .default_value("abort")
                .help("What to do with characters having too many states"),
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

    let names: Vec<String> = match args.get_many::<String>("taxa") {
        Some(values) => values.cloned().collect(),
        None => vec![],
    };
    let taxa = if names.is_empty() || (names.len() == 1 && names[0] == "all") {
        TaxonSelection::All
    } else {
        TaxonSelection::Named(names)
    };

    let opts = nexus::SubsetOptions {
        taxa,
        alphabet: named_alphabet(args.get_one::<String>("alphabet").unwrap())?,
        frag_threshold: *args.get_one::<f64>("frag").unwrap(),
        on_overflow: args
            .get_one::<String>("overflow")
            .unwrap()
            .parse::<OverflowPolicy>()?,
    };

    //----------------------------
    // Ops
    //----------------------------
    let matrix = nexus::from_file(infile, &super::parse_options(args))?;
    let result = nexus::subset(&matrix, &opts)?;

    if !result.skipped.is_empty() {
        tracing::warn!(
            "{} characters skipped: {}",
            result.skipped.len(),
            result.skipped.iter().map(|i| i + 1).join(",")
        );
    }

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(nexus::write_nexus(&result.matrix).as_ref())?;

    Ok(())
}
