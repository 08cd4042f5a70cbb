use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use stripe_patcher::{load_from_path, migrations, runner, Document, Registry, RunReport};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "stripe-patcher")]
#[command(about = "Ordered text-patch engine for generated Stripe provisioning code", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply patch files to a target source file
    Apply {
        /// File to patch
        target: PathBuf,

        /// Patch file or directory of .toml patch files (default: ./patches)
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Dry run - report what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Write the run reports as JSON to this path
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// Run the built-in Express-to-Custom migration batches in order
    Migrate {
        /// Path to the provisioning module to migrate
        target: PathBuf,

        /// Dry run - report what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Write the run reports as JSON to this path
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// List the built-in migration batches and their specs
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            target,
            patches,
            dry_run,
            diff,
            report_json,
        } => {
            let registries = load_registries(patches)?;
            cmd_run(&target, &registries, dry_run, diff, report_json)
        }

        Commands::Migrate {
            target,
            dry_run,
            diff,
            report_json,
        } => {
            let registries = migrations::batches()?;
            cmd_run(&target, &registries, dry_run, diff, report_json)
        }

        Commands::List => cmd_list(),
    }
}

/// Load one registry per patch file, in file order.
fn load_registries(patches: Option<PathBuf>) -> Result<Vec<Registry>> {
    let patch_files = match patches {
        Some(path) if path.is_dir() => discover_patch_files(&path)?,
        Some(path) => vec![path],
        None => discover_patch_files(Path::new("patches"))?,
    };

    let mut registries = Vec::with_capacity(patch_files.len());
    for patch_file in &patch_files {
        println!("Loading patches from {}...", patch_file.display());
        registries.push(load_from_path(patch_file)?);
    }
    Ok(registries)
}

/// Discover all .toml patch files directly under `dir`, sorted by name.
fn discover_patch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        anyhow::bail!("patch directory {} does not exist", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();

    if files.is_empty() {
        anyhow::bail!("no .toml patch files found in {}", dir.display());
    }
    Ok(files)
}

/// Apply `registries` in sequence against `target` and report.
///
/// A dry run patches a copy of the buffer in memory and never writes; a
/// real run persists after each completed batch (so later batches see the
/// earlier batches' output on disk, exactly like the batch scripts this
/// replaces). The process exits non-zero when any batch aborts.
fn cmd_run(
    target: &Path,
    registries: &[Registry],
    dry_run: bool,
    show_diff: bool,
    report_json: Option<PathBuf>,
) -> Result<()> {
    println!("Target: {}", target.display());
    println!();

    let before = fs::read_to_string(target)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", target.display()))?;

    let reports = if dry_run {
        println!("{}", "  [DRY RUN - no files will be written]".cyan());
        let mut document = Document::from_text(target, before.clone());
        let mut reports = Vec::new();
        for registry in registries {
            let report = runner::run(&mut document, registry);
            let aborted = !report.completed();
            reports.push(report);
            if aborted {
                break;
            }
        }
        if show_diff && before != document.text() {
            display_diff(target, &before, document.text());
        }
        reports
    } else {
        let reports = runner::execute_chain(target, registries)?;
        if show_diff {
            let after = fs::read_to_string(target)?;
            if before != after {
                display_diff(target, &before, &after);
            }
        }
        reports
    };

    print_reports(&reports);

    if let Some(path) = report_json {
        fs::write(&path, serde_json::to_string_pretty(&reports)?)?;
        println!("Report written to {}", path.display());
    }

    if reports.iter().any(|r| !r.completed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn print_reports(reports: &[RunReport]) {
    let mut total_applied = 0;
    let mut total_skipped = 0;
    let mut failed: Vec<(&str, &str)> = Vec::new();

    for report in reports {
        println!("{}", format!("Batch '{}':", report.registry).bold());
        for result in &report.results {
            if result.applied {
                println!(
                    "{} {}: applied ({} matches)",
                    "✓".green(),
                    result.spec_id,
                    result.matches_found
                );
            } else if result.is_already_applied() {
                println!("{} {}: already applied", "⊙".yellow(), result.spec_id);
            } else if report.failed_spec_id.as_deref() == Some(result.spec_id.as_str()) {
                eprintln!(
                    "{} {}: required spec found 0 matches",
                    "✗".red(),
                    result.spec_id
                );
            } else {
                println!("{} {}: skipped (no matches)", "⊘".cyan(), result.spec_id);
            }
        }
        total_applied += report.applied_count();
        total_skipped += report.skipped_count();
        if let Some(spec_id) = &report.failed_spec_id {
            failed.push((&report.registry, spec_id));
        }
        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} specs applied", format!("{}", total_applied).green());
    println!("  {} specs skipped", format!("{}", total_skipped).yellow());
    for (registry, spec_id) in &failed {
        eprintln!(
            "  {}",
            format!("batch '{registry}' aborted at required spec '{spec_id}'").red()
        );
        eprintln!("  The target file was left untouched by that batch.");
    }
}

/// Show unified diff between original and modified content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    println!();
}

fn cmd_list() -> Result<()> {
    for registry in migrations::batches()? {
        println!("{}", registry.name().bold());
        for spec in registry.specs() {
            let policy = if spec.required { "required" } else { "optional" };
            println!("  - {} ({}, {})", spec.id, spec.matcher.kind(), policy);
        }
        println!();
    }
    Ok(())
}
