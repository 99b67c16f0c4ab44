use clap::*;
use charmat::libs::nexus;
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Builds a matrix from attestation records")
        .after_help(
            r###"
Codes a tab-separated list of attestations into a NEXUS matrix.

Input format, one attestation per line:

    <witness>	<unit>	<ident>

* witnesses become taxa and units become characters, in order of first
  appearance
* every distinct ident gets a state code from A-Z, a-z, 0-9
* lacuna idents (default `zz`) are coded as gap
* unciteable idents (default `zw`) and units without a record are coded as
  missing
* lines starting with `#` are ignored

Note:
- With --symbols, an existing table is loaded first and the updated table is
  written back, so that several runs share one assignment of codes.

Examples:
1. Build a matrix:
   charmat build tests/nexus/attestations.tsv

2. Keep witnesses extant in at least half of the units, and keep the codes:
   charmat build tests/nexus/attestations.tsv -e 50 --symbols codes.json

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Attestation records. [stdin] for standard input"),
        )
        .arg(
            Arg::new("extant_pct")
                .long("extant-pct")
                .short('e')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Percentage of units a witness must attest to be included"),
        )
        .arg(
            Arg::new("symbols")
                .long("symbols")
                .num_args(1)
                .help("JSON file of ident-to-code assignments, resumed and updated"),
        )
        .arg(
            Arg::new("lacuna")
                .long("lacuna")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Idents coded as gap [default: zz]"),
        )
        .arg(
            Arg::new("unciteable")
                .long("unciteable")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Idents coded as missing [default: zw]"),
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
    let opt_symbols = args.get_one::<String>("symbols");

    let mut opts = nexus::BuildOptions {
        extant_pct: args.get_one::<f64>("extant_pct").copied(),
        ..Default::default()
    };
    if let Some(values) = args.get_many::<String>("lacuna") {
        opts.lacuna = values.cloned().collect();
    }
    if let Some(values) = args.get_many::<String>("unciteable") {
        opts.unciteable = values.cloned().collect();
    }

    let mut table = match opt_symbols {
        Some(path) if Path::new(path).is_file() => {
            let table = nexus::SymbolTable::from_json(&charmat::read_to_string(path)?)?;
            tracing::info!("Resuming {} with {} codes", path, table.len());
            table
        }
        _ => nexus::SymbolTable::new(),
    };

    //----------------------------
    // Ops
    //----------------------------
    let records = nexus::read_attestations(charmat::reader(infile)?)?;
    let (matrix, _) = nexus::build_matrix(&records, &mut table, &opts)?;

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(nexus::write_nexus(&matrix).as_ref())?;

    if let Some(path) = opt_symbols {
        let mut table_writer = charmat::writer(path)?;
        table_writer.write_all(table.to_json()?.as_ref())?;
        table_writer.write_all(b"\n")?;
    }

    Ok(())
}
