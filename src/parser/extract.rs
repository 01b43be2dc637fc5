//! Table block extraction.
//!
//! [`SqlDump`] indexes every INSERT block of a dump by table name and turns
//! the tuples of one table into column-addressable [`Record`]s, merged across
//! blocks and de-duplicated by primary key.

use super::lexer::{lex_value, Scalar};
use super::tuple::{split_value_list, tokenize_row};
use super::{parse_insert_header, parse_statement, split_statements, StatementType};
use ahash::{AHashMap, AHashSet};
use chrono::{NaiveDate, NaiveDateTime};
use smallvec::SmallVec;
use std::sync::Arc;

/// One component of a primary key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Int(i64),
    Text(Box<str>),
}

/// Primary key tuple (composite keys of pivot tables have two columns)
pub type KeyTuple = SmallVec<[KeyValue; 2]>;

/// A statement the extractor could not use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub table: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}: {}", table, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Per-table statistics of a parsed dump
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TableStats {
    pub table: String,
    pub insert_blocks: usize,
    pub tuples: usize,
}

/// One row of a source table
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Scalar>,
}

impl Record {
    pub fn new(columns: Arc<[String]>, values: Vec<Scalar>) -> Self {
        Self { columns, values }
    }

    /// Value of a column. `None` when the column is not declared or the
    /// tuple was shorter than the column list.
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Scalar::as_i64)
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Scalar::as_f64)
    }

    /// Text value, trimmed. Blank strings count as absent.
    pub fn text(&self, column: &str) -> Option<String> {
        let text = self.get(column).and_then(Scalar::to_text)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == text.len() {
            Some(text)
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Free-text value exactly as stored. Blank strings count as absent.
    pub fn raw_text(&self, column: &str) -> Option<String> {
        self.get(column)
            .and_then(Scalar::to_text)
            .filter(|text| !text.trim().is_empty())
    }

    /// Boolean flag; absent or NULL reads as `false`
    pub fn flag(&self, column: &str) -> bool {
        self.opt_flag(column).unwrap_or(false)
    }

    pub fn opt_flag(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(Scalar::as_bool)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).and_then(Scalar::as_date)
    }

    pub fn datetime(&self, column: &str) -> Option<NaiveDateTime> {
        self.get(column).and_then(Scalar::as_datetime)
    }

    /// Key tuple for de-duplication; `None` if any key column is absent or NULL
    fn key(&self, key_columns: &[&str]) -> Option<KeyTuple> {
        if key_columns.is_empty() {
            return None;
        }
        let mut key = KeyTuple::new();
        for column in key_columns {
            let value = match self.get(column)? {
                Scalar::Null => return None,
                Scalar::Int(n) => KeyValue::Int(*n),
                other => match other.as_i64() {
                    Some(n) => KeyValue::Int(n),
                    None => KeyValue::Text(other.to_text()?.into_boxed_str()),
                },
            };
            key.push(value);
        }
        Some(key)
    }
}

/// One `INSERT INTO t (cols) VALUES ...` block
#[derive(Debug, Clone)]
struct InsertBlock<'a> {
    table: &'a str,
    columns: Arc<[String]>,
    values: &'a str,
}

/// Statement index over a full dump
#[derive(Debug, Default)]
pub struct SqlDump<'a> {
    blocks: Vec<InsertBlock<'a>>,
    by_table: AHashMap<String, Vec<usize>>,
    table_order: Vec<String>,
    issues: Vec<ParseIssue>,
    statement_count: usize,
}

impl<'a> SqlDump<'a> {
    /// Split the dump into statements and index its INSERT blocks
    pub fn parse(sql: &'a str) -> Self {
        let sql = sql.strip_prefix('\u{feff}').unwrap_or(sql);
        let mut dump = SqlDump::default();

        for stmt in split_statements(sql) {
            dump.statement_count += 1;

            let (typ, table) = parse_statement(stmt);
            if typ != StatementType::Insert {
                continue;
            }

            match parse_insert_header(stmt) {
                Some(header) if !header.columns.is_empty() => {
                    let idx = dump.blocks.len();
                    let key = header.table.to_ascii_lowercase();
                    if !dump.by_table.contains_key(&key) {
                        dump.table_order.push(header.table.to_string());
                    }
                    dump.by_table.entry(key).or_default().push(idx);
                    dump.blocks.push(InsertBlock {
                        table: header.table,
                        columns: header.columns.into(),
                        values: header.values,
                    });
                }
                _ => {
                    log::debug!("unrecognized INSERT header for table {}", table);
                    dump.issues.push(ParseIssue {
                        table: Some(table),
                        message: "INSERT statement without a column list was ignored".to_string(),
                    });
                }
            }
        }

        dump
    }

    /// Number of statements seen, of any type
    pub fn statement_count(&self) -> usize {
        self.statement_count
    }

    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Whether at least one INSERT block exists for `table`
    pub fn has_table(&self, table: &str) -> bool {
        self.by_table.contains_key(&table.to_ascii_lowercase())
    }

    /// Tables with INSERT blocks, in order of first appearance
    pub fn tables(&self) -> Vec<TableStats> {
        self.table_order
            .iter()
            .map(|name| {
                let blocks = self.blocks_for(name);
                TableStats {
                    table: name.clone(),
                    insert_blocks: blocks.len(),
                    tuples: blocks
                        .iter()
                        .map(|b| split_value_list(b.values).len())
                        .sum(),
                }
            })
            .collect()
    }

    /// All rows of `table` across every INSERT block.
    ///
    /// Rows are de-duplicated on `key_columns`; the first occurrence of a key
    /// wins. Rows with an absent or NULL key are always kept.
    pub fn rows(&self, table: &str, key_columns: &[&str]) -> Vec<Record> {
        let mut seen: AHashSet<KeyTuple> = AHashSet::new();
        let mut records = Vec::new();

        for block in self.blocks_for(table) {
            for tuple in split_value_list(block.values) {
                let values = tokenize_row(tuple).iter().map(|t| lex_value(t)).collect();
                let record = Record::new(Arc::clone(&block.columns), values);

                if let Some(key) = record.key(key_columns) {
                    if !seen.insert(key) {
                        log::debug!("{}: duplicate primary key ignored", block.table);
                        continue;
                    }
                }
                records.push(record);
            }
        }

        records
    }

    fn blocks_for(&self, table: &str) -> Vec<&InsertBlock<'a>> {
        self.by_table
            .get(&table.to_ascii_lowercase())
            .map(|idxs| idxs.iter().map(|&i| &self.blocks[i]).collect())
            .unwrap_or_default()
    }
}
