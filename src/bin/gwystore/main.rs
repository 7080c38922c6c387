//! gwystore CLI - Tool for inspecting and converting store files.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use gwystore::{Settings, ValueStore};
use tracing_subscriber::EnvFilter;

/// Verbosity selected by global flags.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    // RUST_LOG wins over the command line flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gwystore={}", verbosity.directive())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    // Parse global flags
    let mut verbosity = Verbosity::Info;
    let mut config: Option<PathBuf> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Debug,
            "-vv" | "--trace" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            "-c" | "--config" => match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Error: --config needs a path");
                    return ExitCode::FAILURE;
                }
            },
            _ => filtered_args.push(arg),
        }
    }

    init_logging(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    match run(&filtered_args, config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("reading settings from {}", path.display())),
        None => Ok(Settings::load()),
    }
}

fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str> {
    match args.get(index) {
        Some(value) => Ok(*value),
        None => bail!("missing argument\nUsage: gwystore {usage}"),
    }
}

fn run(args: &[&str], config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;

    match args[0] {
        // Dump command - every entry, objects by type name
        "dump" | "d" => cmd_dump(arg(args, 1, "dump <file>")?, &settings),

        // Keys command - key names, optionally under a prefix
        "keys" | "k" => cmd_keys(arg(args, 1, "keys <file> [prefix]")?, args.get(2).copied(), &settings),

        // Text conversion
        "to-text" | "tt" => cmd_to_text(arg(args, 1, "to-text <file>")?, &settings),
        "from-text" | "ft" => cmd_from_text(
            arg(args, 1, "from-text <in.txt> <out>")?,
            arg(args, 2, "from-text <in.txt> <out>")?,
        ),

        // Copy command - decode and re-encode
        "copy" | "c" => cmd_copy(
            arg(args, 1, "copy <in> <out>")?,
            arg(args, 2, "copy <in> <out>")?,
            &settings,
        ),

        // Settings command - effective settings as JSON
        "settings" => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }

        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        // Default: if file exists, dump it
        other => {
            if Path::new(other).exists() {
                cmd_dump(other, &settings)
            } else {
                print_help();
                bail!("unknown command: {other}");
            }
        }
    }
}

fn print_help() {
    println!("gwystore - value store file toolkit");
    println!();
    println!("USAGE:");
    println!("    gwystore [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    d, dump       <file>            Dump all entries");
    println!("    k, keys       <file> [prefix]   List keys, optionally under a prefix");
    println!("    tt, to-text   <file>            Print scalar entries as text");
    println!("    ft, from-text <in.txt> <out>    Build a store file from text");
    println!("    c, copy       <in> <out>        Decode and re-encode a store file");
    println!("    settings                        Show effective settings");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!("    -c, --config <path>  Read settings from <path>");
    println!();
    println!("EXAMPLES:");
    println!("    gwystore dump scan.gwy");
    println!("    gwystore keys scan.gwy /0/data");
    println!("    gwystore to-text scan.gwy > scan.txt");
    println!("    gwystore from-text scan.txt rebuilt.gwy");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'dump'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn open(path: &str, settings: &Settings) -> Result<ValueStore> {
    ValueStore::load_with(path, settings).with_context(|| format!("failed to open {path}"))
}

fn cmd_dump(path: &str, settings: &Settings) -> Result<()> {
    let store = open(path, settings)?;
    println!("Store: {path} ({} entries)", store.len());
    print!("{}", store.dump(settings));
    Ok(())
}

fn cmd_keys(path: &str, prefix: Option<&str>, settings: &Settings) -> Result<()> {
    let store = open(path, settings)?;
    let keys = store.keys_with_prefix(Some(prefix.unwrap_or("")));
    tracing::debug!(count = keys.len(), prefix, "matched keys");
    for key in keys {
        let kind = store.value_kind(key).map_or("?", |k| k.name());
        println!("{key}\t{kind}");
    }
    Ok(())
}

fn cmd_to_text(path: &str, settings: &Settings) -> Result<()> {
    let store = open(path, settings)?;
    print!("{}", store.to_text());
    Ok(())
}

fn cmd_from_text(input: &str, output: &str) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;
    let store = ValueStore::from_text(&text).with_context(|| format!("failed to parse {input}"))?;
    store.save(output).with_context(|| format!("failed to write {output}"))?;
    println!("Wrote {} entries to {output}", store.len());
    Ok(())
}

fn cmd_copy(input: &str, output: &str, settings: &Settings) -> Result<()> {
    let store = open(input, settings)?;
    store.save(output).with_context(|| format!("failed to write {output}"))?;

    let in_size = std::fs::metadata(input)?.len();
    let out_size = std::fs::metadata(output)?.len();
    println!("Copied {} entries: {in_size} -> {out_size} bytes", store.len());
    if in_size != out_size {
        tracing::warn!("output size differs; input held entries that were skipped");
    }
    Ok(())
}
