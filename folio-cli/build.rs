use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the format names in FormatRegistry::new, in registration order.
// Build scripts can't access the library, so the list is duplicated here.
const AVAILABLE_FORMATS: &[&str] = &["markdown", "html", "json", "sections"];

fn format_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS))
        .value_hint(ValueHint::Other)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let input = Arg::new("input")
        .help("Input file path")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath);

    let mut cmd = Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and section review articles")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a folio.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats")
                .arg(input.clone())
                .arg(format_arg("from", "Source format"))
                .arg(format_arg("to", "Target format").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("sections")
                .about("Split a review into typed sections")
                .arg(input)
                .arg(format_arg("from", "Source format")),
        );

    generate_to(Bash, &mut cmd, "folio", &outdir)?;
    generate_to(Zsh, &mut cmd, "folio", &outdir)?;
    generate_to(Fish, &mut cmd, "folio", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
