use crate::input::{read_dump, Compression};
use crate::parser::{SqlDump, TableStats};
use crate::source::SourceTable;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Serialize)]
struct InspectJsonOutput {
    input_file: String,
    compression: String,
    statements: usize,
    tables: Vec<InspectTable>,
    missing_tables: Vec<&'static str>,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct InspectTable {
    #[serde(flatten)]
    stats: TableStats,
    imported: bool,
}

pub fn run(file: PathBuf, json: bool) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file does not exist: {}", file.display());
    }

    let compression = Compression::from_path(&file);
    let start_time = Instant::now();
    let text = read_dump(&file)?;
    let dump = SqlDump::parse(&text);

    let tables: Vec<InspectTable> = dump
        .tables()
        .into_iter()
        .map(|stats| InspectTable {
            imported: SourceTable::from_name(&stats.table).is_some(),
            stats,
        })
        .collect();
    let missing_tables: Vec<&'static str> = SourceTable::ALL
        .iter()
        .filter(|t| !dump.has_table(t.name()))
        .map(|t| t.name())
        .collect();
    let issues: Vec<String> = dump.issues().iter().map(|i| i.to_string()).collect();

    if json {
        let output = InspectJsonOutput {
            input_file: file.display().to_string(),
            compression: compression.to_string(),
            statements: dump.statement_count(),
            tables,
            missing_tables,
            issues,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let elapsed = start_time.elapsed();
    println!(
        "✓ Parsed {} statements from {} in {:.3?}\n",
        dump.statement_count(),
        file.display(),
        elapsed
    );

    if tables.is_empty() {
        println!("No INSERT statements found in export.");
        return Ok(());
    }

    println!(
        "{:<32} {:>10} {:>12} {:>10}",
        "Table Name", "INSERTs", "Rows", "Imported"
    );
    println!("{}", "─".repeat(67));

    let mut total_blocks = 0;
    let mut total_rows = 0;
    for table in &tables {
        println!(
            "{:<32} {:>10} {:>12} {:>10}",
            truncate_string(&table.stats.table, 32),
            table.stats.insert_blocks,
            table.stats.tuples,
            if table.imported { "yes" } else { "-" }
        );
        total_blocks += table.stats.insert_blocks;
        total_rows += table.stats.tuples;
    }

    println!("{}", "─".repeat(67));
    println!(
        "{:<32} {:>10} {:>12} {:>10}",
        "TOTAL", total_blocks, total_rows, "-"
    );

    if !missing_tables.is_empty() {
        println!("\nMonica tables without data: {}", missing_tables.join(", "));
    }
    if !issues.is_empty() {
        println!("\nIssues ({}):", issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
