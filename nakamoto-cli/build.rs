use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const FORMATS: &[&str] = &["markdown", "html"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let format_arg = |name: &'static str| {
        Arg::new(name)
            .long(name)
            .value_parser(clap::builder::PossibleValuesParser::new(FORMATS))
            .value_hint(ValueHint::Other)
    };

    let mut cmd = Command::new("nakamoto")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Article tooling for Nakamoto League: Markdown/HTML conversion and reading progress")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a nakamoto.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(format_arg("from"))
                .arg(format_arg("to").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Show word count and estimated reading time")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(format_arg("from"))
                .arg(Arg::new("wpm").long("wpm"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay a recorded scroll trace through a reading tracker")
                .arg(
                    Arg::new("trace")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("article").long("article").required(true))
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .value_hint(ValueHint::Url),
                )
                .arg(Arg::new("token").long("token")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "nakamoto", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "nakamoto", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "nakamoto", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
