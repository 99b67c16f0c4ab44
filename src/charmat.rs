extern crate clap;
use clap::*;
use tracing_subscriber::EnvFilter;

mod cmd_charmat;

fn main() -> anyhow::Result<()> {
    // stdout carries data, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let app = Command::new("charmat")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`charmat` - Character-state matrix toolkit")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_charmat::stat::make_subcommand())
        .subcommand(cmd_charmat::singular::make_subcommand())
        .subcommand(cmd_charmat::merge::make_subcommand())
        .subcommand(cmd_charmat::subset::make_subcommand())
        .subcommand(cmd_charmat::build::make_subcommand())
        .subcommand(cmd_charmat::to_rdf::make_subcommand())
        .subcommand(cmd_charmat::relabel::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* info: stat / singular
* transform: merge / subset
* creation: build
* export: to-rdf / relabel

Log verbosity is controlled by RUST_LOG (default: info).

"###,
        );

    // Check which subcommand the user ran...
    match app.get_matches().subcommand() {
        // info
        Some(("stat", sub_matches)) => cmd_charmat::stat::execute(sub_matches),
        Some(("singular", sub_matches)) => cmd_charmat::singular::execute(sub_matches),
        // transform
        Some(("merge", sub_matches)) => cmd_charmat::merge::execute(sub_matches),
        Some(("subset", sub_matches)) => cmd_charmat::subset::execute(sub_matches),
        // creation
        Some(("build", sub_matches)) => cmd_charmat::build::execute(sub_matches),
        // export
        Some(("to-rdf", sub_matches)) => cmd_charmat::to_rdf::execute(sub_matches),
        Some(("relabel", sub_matches)) => cmd_charmat::relabel::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
