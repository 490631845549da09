// Command-line interface for the Nakamoto League article tooling
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  nakamoto <input> --to <format> [--from <format>] [--output <file>]          - Convert between formats (default)
//  nakamoto convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  nakamoto stats <input> [--wpm <n>] [--json]                                 - Word count and reading time
//  nakamoto replay <trace> --article <id> [--endpoint <url>] [--token <t>]     - Feed a scroll trace through a reading tracker
//  nakamoto --list-formats                                                     - List available formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  nakamoto article.md --to html --extra-standalone --extra-title "Dojo notes"

mod replay;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use nakamoto_babel::stats::DEFAULT_WORDS_PER_MINUTE;
use nakamoto_babel::{
    ArticleStats, Format, FormatRegistry, HtmlFormat, HtmlOptions, MarkdownFormat, MarkdownOptions,
};
use nakamoto_config::{Loader, NakamotoConfig, LOCAL_CONFIG_FILE};
use nakamoto_reader::{EndpointSettings, HttpProgressReporter, ProgressReporter, TrackerSettings};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "stats", "replay", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
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
    Command::new("nakamoto")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Article tooling for Nakamoto League: Markdown/HTML conversion and reading progress")
        .long_about(
            "nakamoto converts articles between the editor's HTML and stored Markdown,\n\
            reports article statistics and replays reading sessions.\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            nakamoto article.md --to html                   # Convert to HTML (outputs to stdout)\n  \
            nakamoto draft.html --to markdown -o article.md # Convert to a Markdown file\n  \
            nakamoto stats article.md                       # Word count and reading time\n  \
            nakamoto replay trace.jsonl --article gm        # Dry-run a scroll trace",
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
                .help("Path to a nakamoto.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown dialect (.md)\n  \
                    - html:     HTML fragment or standalone page (.html)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    nakamoto convert article.md --to html                # Convert to HTML (stdout)\n  \
                    nakamoto convert draft.html --to markdown -o a.md    # HTML to Markdown file\n  \
                    nakamoto article.md --to html --extra-standalone     # Complete HTML page\n  \
                    nakamoto article.md --to html                        # 'convert' is optional",
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
            Command::new("stats")
                .about("Show word count and estimated reading time")
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
                    Arg::new("wpm")
                        .long("wpm")
                        .help(format!(
                            "Reading speed in words per minute [default: {DEFAULT_WORDS_PER_MINUTE}]"
                        ))
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the statistics as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay a recorded scroll trace through a reading tracker")
                .long_about(
                    "Feeds JSON-lines scroll samples through a reading tracker and prints\n\
                    a JSON summary of the session.\n\n\
                    Each line holds scroll_top, document_height and viewport_height, and\n\
                    optionally wait_ms to pause before the sample.\n\n\
                    Reports go to the progress API when --endpoint is given or a token is\n\
                    configured; otherwise a dry-run reporter logs them and awards XP\n\
                    for each milestone.",
                )
                .arg(
                    Arg::new("trace")
                        .help("JSON-lines trace file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("article")
                        .long("article")
                        .help("Article identifier sent with every report")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help("Base URL of the progress API")
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Bearer token for the progress API")
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    // If no subcommand is provided, inject "convert"
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
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

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let from = resolve_from(sub_matches, input);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("stats", sub_matches)) => {
            let input = required(sub_matches, "input");
            let from = resolve_from(sub_matches, input);
            let wpm = words_per_minute(sub_matches);
            handle_stats_command(input, &from, wpm, sub_matches.get_flag("json"));
        }
        Some(("replay", sub_matches)) => {
            let trace = required(sub_matches, "trace");
            let article = required(sub_matches, "article");
            let endpoint = sub_matches.get_one::<String>("endpoint").map(|s| s.as_str());
            let token = sub_matches.get_one::<String>("token").map(|s| s.as_str());
            handle_replay_command(trace, article, endpoint, token, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: missing required argument '{name}'");
            std::process::exit(1);
        }
    }
}

/// Explicit --from, or the format registered for the input's extension
fn resolve_from(matches: &ArgMatches, input: &str) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.to_string();
    }
    match FormatRegistry::default().detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &NakamotoConfig,
) {
    let registry = configured_registry(config);

    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_input(input);

    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let result = registry
        .serialize_with_options(&doc, to, extra_params)
        .unwrap_or_else(|e| {
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
        None => println!("{result}"),
    }
}

/// Built-in formats carrying the configured output options. `--extra-*` params go on top.
fn configured_registry(config: &NakamotoConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::default();
    registry.register(MarkdownFormat::new(MarkdownOptions::from(
        &config.convert.markdown,
    )));
    registry.register(HtmlFormat::new(HtmlOptions::from(&config.convert.html)));
    registry
}

fn words_per_minute(matches: &ArgMatches) -> u32 {
    matches
        .get_one::<u32>("wpm")
        .copied()
        .unwrap_or(DEFAULT_WORDS_PER_MINUTE)
}

/// Handle the stats command
fn handle_stats_command(input: &str, from: &str, wpm: u32, json: bool) {
    let registry = FormatRegistry::default();
    let source = read_input(input);
    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let stats = ArticleStats::from_document(&doc);
    let minutes = stats.reading_time_minutes(wpm);

    if json {
        let value = serde_json::json!({
            "words": stats.words,
            "headings": stats.headings,
            "images": stats.images,
            "code_blocks": stats.code_blocks,
            "reading_time_minutes": minutes,
        });
        println!("{value}");
    } else {
        println!("words:        {}", stats.words);
        println!("headings:     {}", stats.headings);
        println!("images:       {}", stats.images);
        println!("code blocks:  {}", stats.code_blocks);
        println!("reading time: {minutes} min");
    }
}

/// Handle the replay command
fn handle_replay_command(
    trace: &str,
    article: &str,
    endpoint: Option<&str>,
    token: Option<&str>,
    config: &NakamotoConfig,
) {
    let source = read_input(trace);
    let entries = replay::parse_trace(&source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let settings = TrackerSettings::from(&config.reading);
    let (reporter, reporter_name) = reporter_for(endpoint, token, config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: could not start the async runtime: {e}");
            std::process::exit(1);
        });

    let report = runtime.block_on(replay::replay(
        &entries,
        article,
        settings,
        reporter,
        reporter_name,
    ));

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// HTTP when an endpoint is given or a token is configured, dry run otherwise
fn reporter_for(
    endpoint: Option<&str>,
    token: Option<&str>,
    config: &NakamotoConfig,
) -> (Arc<dyn ProgressReporter>, &'static str) {
    let configured = &config.reading.endpoint;
    if endpoint.is_none() && token.is_none() && !configured.is_authenticated() {
        let reporter = replay::DryRunReporter::new(config.reading.milestone_step);
        return (Arc::new(reporter), "dry-run");
    }

    let mut settings = EndpointSettings::from(configured);
    if let Some(endpoint) = endpoint {
        settings.base_url = endpoint.to_string();
    }
    if let Some(token) = token {
        settings.token = Some(token.to_string()).filter(|t| !t.is_empty());
    }
    tracing::info!(url = %settings.url(), "reporting progress over http");
    (Arc::new(HttpProgressReporter::new(&settings)), "http")
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Available formats:\n");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        match registry.get(&format_name) {
            Ok(format) => println!(
                "  {:<10} {} (.{})",
                format_name,
                format.description(),
                format.file_extensions().join(", .")
            ),
            Err(_) => println!("  {format_name}"),
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> NakamotoConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
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
