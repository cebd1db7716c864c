mod change;
mod config;
mod context;
mod filter;
mod patch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use change::{resolve_file_changes, FileChange, RawFileChange};
use config::PkConfig;
use context::{expand_within_budget, BpeCounter, FileContext};
use filter::{apply_filter, parse_filter_expr};
use patch::{compute_patch_hash, modified_content_from_hunks, parse_patch, DiffHunk, LineType};

/// Patch parsing and reconstruction toolkit for code-review workflows
#[derive(Parser)]
#[command(name = "pk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a unified-diff patch body and list its hunks
    Hunks {
        /// Patch file to parse ('-' reads stdin)
        patch: PathBuf,

        /// Emit the parsed hunks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconstruct the modified file from an original and a patch
    Apply {
        /// Patch file to apply ('-' reads stdin)
        patch: PathBuf,

        /// Original (pre-image) file the patch was produced against
        #[arg(long)]
        original: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize provider file-change records (a JSON array)
    Changes {
        /// JSON file with raw provider change records ('-' reads stdin)
        changes: PathBuf,

        /// Base commit the change set applies to
        #[arg(long, default_value = "HEAD")]
        base: String,

        /// Directory holding a checkout of the base commit; used to probe
        /// for pre-images. Without it every pre-image is assumed available.
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Filter expression (e.g. '+*.rs,-deleted,>10')
        #[arg(long)]
        filter: Option<String>,

        /// Emit the normalized change set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assemble token-budgeted context blocks around file:line anchors
    Context {
        /// Anchors in file:line form (1-based line)
        #[arg(required = true)]
        anchors: Vec<String>,

        /// Token budget (defaults to [context].budget from config)
        #[arg(long)]
        budget: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = config::load_config(".");

    match cli.command {
        Command::Hunks { patch, json } => cmd_hunks(&patch, json, &config),
        Command::Apply { patch, original, output } => cmd_apply(&patch, &original, output.as_deref()),
        Command::Changes { changes, base, base_dir, filter, json } => {
            cmd_changes(&changes, &base, base_dir.as_deref(), filter.as_deref(), json, &config)
        }
        Command::Context { anchors, budget } => {
            cmd_context(&anchors, budget.unwrap_or(config.context.budget))
        }
    }
}

/// Read a file argument, treating '-' as stdin
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

// ── hunks ──

#[derive(Serialize)]
struct HunksOutput<'a> {
    patch_hash: String,
    hunks: &'a [DiffHunk],
}

fn cmd_hunks(path: &Path, json: bool, config: &PkConfig) -> Result<()> {
    let raw = read_input(path)?;
    let hunks = parse_patch(&raw);

    if json {
        let out = HunksOutput { patch_hash: compute_patch_hash(&raw), hunks: &hunks };
        return print_json(&out, config.output.pretty);
    }

    for hunk in &hunks {
        if let Some(header) = hunk.header() {
            println!("{header}");
        }
        for line in hunk.lines.iter().filter(|l| l.line_type != LineType::Control) {
            let old = line.old_line.map(|n| n.to_string()).unwrap_or_default();
            let new = line.new_line.map(|n| n.to_string()).unwrap_or_default();
            let marker = match line.line_type {
                LineType::Add => '+',
                LineType::Delete => '-',
                _ => ' ',
            };
            println!("{old:>5} {new:>5}  {marker}{}", line.text());
        }
    }

    let adds: usize = hunks.iter().map(|h| h.adds()).sum();
    let dels: usize = hunks.iter().map(|h| h.dels()).sum();
    println!(
        "{} hunk{}, +{adds} -{dels}",
        hunks.len(),
        if hunks.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

// ── apply ──

fn cmd_apply(patch: &Path, original: &Path, output: Option<&Path>) -> Result<()> {
    let patch_text = read_input(patch)?;
    let original_text = std::fs::read_to_string(original)
        .with_context(|| format!("Failed to read {}", original.display()))?;

    let hunks = parse_patch(&patch_text);
    let modified = modified_content_from_hunks(&original_text, &hunks)
        .with_context(|| format!("Failed to apply {} to {}", patch.display(), original.display()))?;

    match output {
        Some(path) => std::fs::write(path, modified)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{modified}"),
    }
    Ok(())
}

// ── changes ──

fn cmd_changes(
    path: &Path,
    base: &str,
    base_dir: Option<&Path>,
    filter: Option<&str>,
    json: bool,
    config: &PkConfig,
) -> Result<()> {
    let raw = read_input(path)?;
    let records: Vec<RawFileChange> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse change records from {}", path.display()))?;

    let base_has = |name: &str| match base_dir {
        Some(dir) => dir.join(name).exists(),
        None => true,
    };
    let mut resolved = resolve_file_changes(&records, base, base_has);

    if let Some(expr) = filter {
        let rules = parse_filter_expr(expr);
        resolved.retain(|change| apply_filter(&rules, change));
    }

    if json {
        return print_json(&resolved, config.output.pretty);
    }

    for change in &resolved {
        let renamed_from = change
            .previous_filename()
            .map(|name| format!(" (from {name})"))
            .unwrap_or_default();
        let partial = if change.is_partial() { " [partial]" } else { "" };
        let counts = match change {
            FileChange::InMemory(_) => format!(" +{} -{}", change.adds(), change.dels()),
            FileChange::Slim(_) => " (no patch)".to_string(),
        };
        println!(
            "{} {}{renamed_from}{counts}{partial}",
            change.status().symbol(),
            change.filename()
        );
    }
    Ok(())
}

// ── context ──

fn cmd_context(anchors: &[String], budget: usize) -> Result<()> {
    let mut files = Vec::new();
    for anchor in anchors {
        let (path, line) = anchor
            .rsplit_once(':')
            .and_then(|(path, line)| Some((path, line.parse::<usize>().ok()?)))
            .with_context(|| format!("Invalid anchor '{anchor}' (expected file:line)"))?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {path}"))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        files.push(FileContext::new(path, lines, line.saturating_sub(1)));
    }

    let counter = BpeCounter::new()?;
    let total = expand_within_budget(&mut files, budget, &counter);

    for file in &files {
        print!("{}", file.render());
    }
    eprintln!("{total} / {budget} tokens");
    Ok(())
}
