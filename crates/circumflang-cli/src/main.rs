//! Circumflang CLI - Inspect and validate Circumflang documents
//!
//! Usage:
//!   cfcli [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   parse     Parse and display document structure (default)
//!   validate  Report dropped segments
//!   stats     Show document statistics

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use circumflang_core::{Diagnostic, DiagnosticKind, Document, Group, Parser};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    init_tracing(config.verbose);

    let input = read_input(&config.file)?;
    debug!(file = %config.file, bytes = input.len(), "read input");

    let mut parser = Parser::new();

    match config.command {
        Command::Parse => cmd_parse(&mut parser, &input, &config),
        Command::Validate => cmd_validate(&mut parser, &input, &config),
        Command::Stats => cmd_stats(&mut parser, &input, &config),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`, or `debug` with `-v`).
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        Ok(input)
    } else {
        fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {}", file, e))
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Parse,
    Validate,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut tag = None;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("cfcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-t" | "--tag" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a tag", arg))?;
                tag = Some(value.clone());
            }
            "parse" => command = Command::Parse,
            "validate" => command = Command::Validate,
            "stats" => command = Command::Stats,
            "-" => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    if tag.is_some() && command != Command::Parse {
        return Err("--tag is only supported by the parse command".to_string());
    }

    Ok(Config {
        command,
        file,
        format,
        verbose,
        tag,
    })
}

fn print_help() {
    eprintln!(
        r#"cfcli - Circumflang document parser and validator

USAGE:
    cfcli [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display document structure (default)
    validate    Report malformed pairs and duplicate tags
    stats       Show document statistics

OPTIONS:
    -v, --verbose      Show every pair of every group
    -j, --json         Output in JSON format
    -t, --tag <TAG>    Only show values of TAG (parse only)
    -h, --help         Print help information
    -V, --version      Print version information

Use - as FILE to read from stdin. RUST_LOG controls log output.

EXAMPLES:
    cfcli contacts.cf              Summarize a document
    cfcli -v contacts.cf           Print every group
    cfcli -j contacts.cf           Output groups as JSON
    cfcli -t email contacts.cf     Print the email of every group
    cfcli validate contacts.cf     Report dropped segments
    cfcli stats contacts.cf        Show document statistics
"#
    );
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(parser: &mut Parser, input: &str, config: &Config) -> Result<(), String> {
    let result = parser.parse_with_recovery(input);

    for diagnostic in result.diagnostics.iter() {
        eprintln!("warning: {}", diagnostic);
    }

    match (config.format, config.tag.as_deref()) {
        (OutputFormat::Json, Some(tag)) => print_json(&tag_values(&result.document, tag)),
        (OutputFormat::Json, None) => print_json(&convert_document(&result.document)),
        (OutputFormat::Text, Some(tag)) => print_tag(&result.document, tag),
        (OutputFormat::Text, None) => {
            if config.verbose {
                print_document_verbose(&result.document);
            } else {
                print_document_summary(&result.document);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(parser: &mut Parser, input: &str, config: &Config) -> Result<(), String> {
    let result = parser.parse_with_recovery(input);

    if result.is_ok() {
        if !matches!(config.format, OutputFormat::Json) {
            println!("Valid: no dropped segments");
        } else {
            println!(r#"{{"valid": true, "diagnostics": []}}"#);
        }
        Ok(())
    } else {
        if matches!(config.format, OutputFormat::Json) {
            let diagnostics: Vec<JsonDiagnostic> =
                result.diagnostics.iter().map(JsonDiagnostic::from).collect();
            println!(
                "{}",
                serde_json::json!({"valid": false, "diagnostics": diagnostics})
            );
        } else {
            eprintln!(
                "Invalid: {} dropped segment(s)",
                result.diagnostics.len()
            );
            for diagnostic in result.diagnostics.iter() {
                eprintln!("  - [{}] {}", diagnostic.kind, diagnostic);
            }
        }
        Err(format!(
            "{} dropped segment(s)",
            result.diagnostics.len()
        ))
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &mut Parser, input: &str, config: &Config) -> Result<(), String> {
    let result = parser.parse_with_recovery(input);
    let stats = DocumentStats::from_result(&result.document, input);
    let malformed = result.diagnostics.count_of(DiagnosticKind::MalformedPair);
    let duplicates = result.diagnostics.count_of(DiagnosticKind::DuplicateTag);

    if matches!(config.format, OutputFormat::Json) {
        print_json(&serde_json::json!({
            "groups": stats.groups,
            "empty_groups": stats.empty_groups,
            "pairs": stats.pairs,
            "values": stats.values,
            "distinct_tags": stats.tag_counts.len(),
            "malformed_pairs": malformed,
            "duplicate_tags": duplicates,
            "bytes": stats.bytes,
            "lines": stats.lines,
        }));
        return Ok(());
    }

    println!("Document Statistics");
    println!("-------------------");
    println!("Groups:         {}", stats.groups);
    println!("  Empty:        {}", stats.empty_groups);
    println!("Pairs:          {}", stats.pairs);
    println!("Values:         {}", stats.values);
    println!("Distinct tags:  {}", stats.tag_counts.len());
    println!();
    println!("Tags:");
    for (tag, count) in stats.sorted_tags() {
        println!("  {:<20} {}", display_tag(tag), count);
    }
    println!();
    println!("Size:");
    println!("  Bytes:          {}", stats.bytes);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Dropped:");
    println!("  Malformed:      {}", malformed);
    println!("  Duplicate tags: {}", duplicates);

    Ok(())
}

struct DocumentStats<'a> {
    groups: usize,
    empty_groups: usize,
    pairs: usize,
    values: usize,
    tag_counts: HashMap<&'a str, usize>,
    bytes: usize,
    lines: usize,
}

impl<'a> DocumentStats<'a> {
    fn from_result(doc: &'a Document, input: &str) -> Self {
        let mut stats = Self {
            groups: doc.len(),
            empty_groups: 0,
            pairs: 0,
            values: 0,
            tag_counts: HashMap::new(),
            bytes: input.len(),
            lines: input.lines().count(),
        };

        for group in doc {
            stats.count_group(group);
        }
        stats
    }

    fn count_group(&mut self, group: &'a Group) {
        if group.is_empty() {
            self.empty_groups += 1;
        }
        for pair in group {
            self.pairs += 1;
            self.values += pair.value().len();
            *self.tag_counts.entry(pair.tag()).or_insert(0) += 1;
        }
    }

    /// Most frequent first, ties in tag order.
    fn sorted_tags(&self) -> Vec<(&'a str, usize)> {
        let mut tags: Vec<(&'a str, usize)> =
            self.tag_counts.iter().map(|(t, c)| (*t, *c)).collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        tags
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn display_tag(tag: &str) -> &str {
    if tag.is_empty() {
        "(empty)"
    } else {
        tag
    }
}

fn format_values(values: &circumflang_core::ValueList) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_document_summary(doc: &Document) {
    println!("Groups: {}", doc.len());
    for (i, group) in doc.iter().enumerate() {
        let tags: Vec<&str> = group.tags().map(display_tag).collect();
        println!("  [{}] {} pair(s): {}", i + 1, group.len(), tags.join(", "));
    }
}

fn print_document_verbose(doc: &Document) {
    println!("=== Circumflang Document ===");
    println!();
    println!("Groups: {}", doc.len());
    println!("Pairs:  {}", doc.pairs_count());

    for (i, group) in doc.iter().enumerate() {
        println!();
        println!("[{}] Group ({} pairs)", i + 1, group.len());
        for pair in group {
            println!("  {}: [{}]", display_tag(pair.tag()), format_values(pair.value()));
        }
    }
}

fn print_tag(doc: &Document, tag: &str) {
    for (i, group) in doc.iter().enumerate() {
        if let Some(values) = group.get(tag) {
            println!("[{}] {}", i + 1, format_values(values));
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    groups: Vec<JsonGroup<'a>>,
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    pairs: Vec<JsonPair<'a>>,
}

#[derive(Serialize)]
struct JsonPair<'a> {
    tag: &'a str,
    values: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonTagValues<'a> {
    group: usize,
    values: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    kind: &'static str,
    message: &'a str,
    start: u32,
    end: u32,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(d: &'a Diagnostic) -> Self {
        JsonDiagnostic {
            kind: d.kind.as_str(),
            message: &d.message,
            start: d.span.start,
            end: d.span.end,
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: failed to serialize output: {}", e),
    }
}

fn convert_document(doc: &Document) -> JsonDocument<'_> {
    JsonDocument {
        groups: doc.iter().map(convert_group).collect(),
    }
}

fn convert_group(group: &Group) -> JsonGroup<'_> {
    JsonGroup {
        pairs: group
            .iter()
            .map(|pair| JsonPair {
                tag: pair.tag(),
                values: pair.value().iter().collect(),
            })
            .collect(),
    }
}

fn tag_values<'a>(doc: &'a Document, tag: &str) -> Vec<JsonTagValues<'a>> {
    doc.iter()
        .enumerate()
        .filter_map(|(i, group)| {
            group.get(tag).map(|values| JsonTagValues {
                group: i,
                values: values.iter().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("cfcli")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_args_defaults_to_parse_text() {
        let config = parse_args(&args(&["data.cf"])).unwrap();
        assert_eq!(config.command, Command::Parse);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.file, "data.cf");
        assert!(config.tag.is_none());
    }

    #[test]
    fn parse_args_reads_tag_and_stdin() {
        let config = parse_args(&args(&["-j", "--tag", "Email", "-"])).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.tag.as_deref(), Some("Email"));
        assert_eq!(config.file, "-");
    }

    #[test]
    fn parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.cf", "b.cf"])).is_err());
        assert!(parse_args(&args(&["--nope", "a.cf"])).is_err());
        assert!(parse_args(&args(&["a.cf", "--tag"])).is_err());
        assert!(parse_args(&args(&["validate", "-t", "x", "a.cf"])).is_err());
    }

    #[test]
    fn stats_count_tags_and_empty_groups() {
        let doc = Document::parse("a^^1^2^^^b^^x^^^^^^^^a^^3");
        let stats = DocumentStats::from_result(&doc, "");
        assert_eq!(stats.groups, 3);
        assert_eq!(stats.empty_groups, 1);
        assert_eq!(stats.pairs, 3);
        assert_eq!(stats.values, 4);
        assert_eq!(stats.sorted_tags(), vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn tag_values_skip_groups_without_tag() {
        let doc = Document::parse("a^^1^^^^b^^2^^^^A^^3^4");
        let found = tag_values(&doc, "a");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].group, 0);
        assert_eq!(found[1].group, 2);
        assert_eq!(found[1].values, vec!["3", "4"]);
    }
}
