use crate::config::ImportConfig;
use crate::import::{ImportSummary, Importer};
use crate::input::{read_dump, read_dump_with, Compression};
use crate::store;
use anyhow::bail;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct ImportArgs {
    pub file: PathBuf,
    pub db: Option<PathBuf>,
    pub account: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub progress: bool,
    pub dry_run: bool,
}

pub fn run(args: ImportArgs) -> anyhow::Result<()> {
    if !args.file.exists() {
        bail!("input file does not exist: {}", args.file.display());
    }

    let config = match &args.config {
        Some(path) => ImportConfig::load(path)?,
        None => ImportConfig::default(),
    };

    let show_progress = args.progress && !args.json;
    if !args.json {
        let compression = Compression::from_path(&args.file);
        if compression != Compression::None {
            eprintln!("Detected compression: {}", compression);
        }
        eprintln!("Reading Monica export: {}", args.file.display());
    }

    let dump = if show_progress {
        read_with_progress(&args.file)?
    } else {
        read_dump(&args.file)?
    };

    let mut conn = match (&args.db, args.dry_run) {
        (_, true) => store::open_in_memory()?,
        (Some(db), false) => store::open_database(db)?,
        (None, false) => bail!("--db is required unless --dry-run is given"),
    };

    let spinner = if show_progress {
        Some(stage_spinner()?)
    } else {
        None
    };

    let result = {
        let mut importer = Importer::new(&mut conn, &config);
        if let Some(pb) = &spinner {
            importer = importer.with_observer(move |stage| {
                pb.set_message(format!("Importing: {}", stage));
                Ok(())
            });
        }
        importer.run(&dump, &args.account)
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let summary = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, args.dry_run);
    }

    Ok(())
}

fn read_with_progress(path: &Path) -> anyhow::Result<String> {
    let file_size = std::fs::metadata(path)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
        )?
        .progress_chars("█▓▒░  ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let pb_clone = pb.clone();
    let dump = read_dump_with(path, move |bytes| pb_clone.set_position(bytes));
    pb.finish_and_clear();
    dump
}

fn stage_spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Parsing export...");
    Ok(pb)
}

fn print_summary(summary: &ImportSummary, dry_run: bool) {
    let note = if dry_run { " (dry run, nothing written)" } else { "" };
    println!(
        "✓ Imported into account {} in {:.3}s{}",
        summary.account_id, summary.duration_secs, note
    );
    if summary.wiped_rows > 0 {
        println!("  Replaced {} existing rows", summary.wiped_rows);
    }
    println!();

    println!("{:<24} {:>10}", "Entity", "Rows");
    println!("{}", "─".repeat(35));
    for (label, count) in summary.counts.entries() {
        println!("{:<24} {:>10}", label, count);
    }
    println!("{}", "─".repeat(35));
    println!("{:<24} {:>10}", "TOTAL", summary.counts.total());

    if !summary.warnings.is_empty() {
        println!("\nWarnings ({}):", summary.warnings.len());
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
    }
    if !summary.errors.is_empty() {
        println!("\nErrors ({}):", summary.errors.len());
        for error in &summary.errors {
            println!("  - {}", error);
        }
    }
}
