// Command-line interface for folio
//
// This binary converts review articles between the formats folio-babel knows and
// splits Markdown reviews into typed sections. All conversion goes through the
// node model in folio-babel; this crate only parses arguments, reads and writes files,
// and applies configuration.
//
// Usage:
//  folio <input> --to <format> [--from <format>] [--output <file>]          - Convert (default)
//  folio convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above
//  folio sections <input>                                                   - Sections and stats as JSON
//  folio --list-formats                                                     - List formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI strips the "extra-" prefix and passes them to the serializer, on top of
// what the configuration sets.
// Example:
//  folio review.md --to html --extra-theme serif

use clap::{Arg, ArgAction, Command, ValueHint};
use folio_babel::{parse_markdown_sections, to_markdown, FormatRegistry, ParserSettings};
use folio_config::{FolioConfig, Loader};
use std::collections::HashMap;
use std::fs;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "sections", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and section review articles")
        .long_about(
            "folio converts review articles between Markdown, HTML, the JSON node model\n\
            and the sectioned layout, and splits Markdown reviews into typed sections.\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            folio review.md --to html -o review.html     # Standalone HTML page\n  \
            folio review.html --to markdown              # Back to Markdown (stdout)\n  \
            folio sections review.md                     # Sections and reading stats",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
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
                .value_name("PATH")
                .help("Path to a folio.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between formats.\n\n\
                    Supported formats:\n  \
                    - markdown: CommonMark with GFM tables (.md)\n  \
                    - html:     HTML page with embedded CSS (.html)\n  \
                    - json:     The node model as JSON (.json)\n  \
                    - sections: Review sections as a JSON array\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("sections")
                .about("Split a review into typed sections and print them with reading stats")
                .arg(
                    Arg::new("input")
                        .help("Input file path (Markdown, or anything convertible to it)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file path means the convert subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let registry = config.format_registry();

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&registry);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                exit_with("input is required");
            };
            let Some(to) = sub_matches.get_one::<String>("to") else {
                exit_with("--to is required");
            };
            let from = source_format(&registry, input, sub_matches.get_one::<String>("from"));
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params, &config);
        }
        Some(("sections", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                exit_with("input is required");
            };
            let from = source_format(&registry, input, sub_matches.get_one::<String>("from"));
            handle_sections_command(&registry, input, &from, &config);
        }
        _ => exit_with("Unknown subcommand. Use --help for usage information."),
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// The explicit --from, or the format detected from the file extension.
fn source_format(registry: &FormatRegistry, input: &str, explicit: Option<&String>) -> String {
    if let Some(format) = explicit {
        return format.clone();
    }
    match registry.detect(input) {
        Some(detected) => {
            tracing::debug!(%input, format = detected.name(), "detected source format");
            detected.name().to_string()
        }
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn read_input(input: &str) -> String {
    fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    })
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &FolioConfig,
) {
    for format in [from, to] {
        if let Err(e) = registry.get(format) {
            exit_with(&e.to_string());
        }
    }

    let source = read_input(input);
    let doc = registry.import(from, &source).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let mut format_options = config.export.format_options(to);
    for (key, value) in extra_params {
        format_options.insert(key.clone(), value.clone());
    }

    let result = registry.export(&doc, to, &format_options).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the sections command
fn handle_sections_command(registry: &FormatRegistry, input: &str, from: &str, config: &FolioConfig) {
    let source = read_input(input);

    // The section parser reads Markdown; anything else is routed there first.
    let markdown = if from == "markdown" {
        source
    } else {
        let doc = registry.import(from, &source).unwrap_or_else(|e| {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        });
        to_markdown(&doc).unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        })
    };

    let settings = ParserSettings::from(&config.parser);
    let parsed = parse_markdown_sections(&markdown, &settings);
    tracing::debug!(%input, sections = parsed.sections.len(), "sectioned");

    let json = serde_json::to_string_pretty(&parsed).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry) {
    println!("Available formats:\n");
    for format in registry.iter() {
        let extensions = format
            .extensions()
            .iter()
            .map(|extension| format!(".{extension}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {:<10} {:<14} {}", format.name(), extensions, format.description());
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> FolioConfig {
    let loader = Loader::new().with_optional_file("folio.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
