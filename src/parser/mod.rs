//! Statement-level parsing of Monica MySQL exports.
//!
//! The dump is split into statements once, up front; INSERT statements are
//! then recognized by their header and indexed per table by [`SqlDump`].

pub mod extract;
pub mod lexer;
pub mod tuple;


pub use extract::{ParseIssue, Record, SqlDump, TableStats};
pub use lexer::{lex_value, Scalar};
pub use tuple::{split_value_list, tokenize_row};

use memchr::{memchr, memmem};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Unknown,
    CreateTable,
    Insert,
    DropTable,
}

static INSERT_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*INSERT\s+(?:IGNORE\s+)?INTO\s+`?([^\s`(]+)`?\s*\(([^)]*)\)\s*VALUES\s*")
        .unwrap()
});

static INSERT_INTO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*INSERT\s+(?:IGNORE\s+)?INTO\s+`?([^\s`(]+)`?").unwrap());

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?`?([^\s`(]+)`?").unwrap()
});

static DROP_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?`?([^\s`;]+)`?").unwrap()
});

/// Header of an `INSERT INTO t (cols) VALUES ...` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertHeader<'a> {
    pub table: &'a str,
    /// Column names in declaration order, backticks stripped
    pub columns: Vec<String>,
    /// Everything after the `VALUES` keyword
    pub values: &'a str,
}

/// Split a dump into trimmed statements, without the trailing `;`.
///
/// Semicolons inside quoted strings or identifiers do not terminate a
/// statement. `--`/`#` line comments and `/* */` block comments are skipped
/// for quote tracking; line comments leading a statement are dropped.
pub fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' && q != b'`' {
                i += 2;
                continue;
            }
            if b == q {
                if bytes.get(i + 1) == Some(&q) {
                    i += 2;
                    continue;
                }
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'-' if is_dash_comment(bytes, i) => {
                let end = line_end(bytes, i);
                if sql[start..i].trim().is_empty() {
                    start = end;
                }
                i = end;
                continue;
            }
            b'#' => {
                let end = line_end(bytes, i);
                if sql[start..i].trim().is_empty() {
                    start = end;
                }
                i = end;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = memmem::find(&bytes[i + 2..], b"*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                continue;
            }
            b';' => {
                let stmt = sql[start..i].trim();
                if !stmt.is_empty() {
                    statements.push(stmt);
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < bytes.len() {
        let stmt = sql[start..].trim();
        if !stmt.is_empty() {
            statements.push(stmt);
        }
    }

    statements
}

/// Classify a statement and extract its table name
pub fn parse_statement(stmt: &str) -> (StatementType, String) {
    let patterns: [(&Lazy<Regex>, StatementType); 3] = [
        (&INSERT_INTO_RE, StatementType::Insert),
        (&CREATE_TABLE_RE, StatementType::CreateTable),
        (&DROP_TABLE_RE, StatementType::DropTable),
    ];

    for (re, typ) in patterns {
        if let Some(m) = re.captures(stmt).and_then(|c| c.get(1)) {
            return (typ, m.as_str().to_string());
        }
    }

    (StatementType::Unknown, String::new())
}

/// Parse the header of an INSERT statement that carries an explicit column list.
///
/// Returns `None` for anything else, including `INSERT INTO t VALUES (...)`.
pub fn parse_insert_header(stmt: &str) -> Option<InsertHeader<'_>> {
    let caps = INSERT_HEADER_RE.captures(stmt)?;
    let whole = caps.get(0)?;
    let table = caps.get(1)?.as_str();
    let columns = caps
        .get(2)?
        .as_str()
        .split(',')
        .map(|c| c.trim().trim_matches('`').trim_matches('"').to_string())
        .filter(|c| !c.is_empty())
        .collect();

    Some(InsertHeader {
        table,
        columns,
        values: &stmt[whole.end()..],
    })
}

#[inline]
fn is_dash_comment(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1) == Some(&b'-')
        && matches!(bytes.get(i + 2), None | Some(b' ' | b'\t' | b'\n' | b'\r'))
}

#[inline]
fn line_end(bytes: &[u8], from: usize) -> usize {
    memchr(b'\n', &bytes[from..])
        .map(|p| from + p + 1)
        .unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let (typ, name) = parse_statement("INSERT INTO `contacts` (`id`) VALUES (1)");
        assert_eq!(typ, StatementType::Insert);
        assert_eq!(name, "contacts");
    }

    #[test]
    fn test_parse_create_table() {
        let (typ, name) = parse_statement("CREATE TABLE IF NOT EXISTS `notes` (id INT)");
        assert_eq!(typ, StatementType::CreateTable);
        assert_eq!(name, "notes");
    }

    #[test]
    fn test_parse_drop_table() {
        let (typ, name) = parse_statement("DROP TABLE IF EXISTS `gifts`");
        assert_eq!(typ, StatementType::DropTable);
        assert_eq!(name, "gifts");
    }

    #[test]
    fn test_parse_unknown() {
        let (typ, _) = parse_statement("SET NAMES utf8mb4");
        assert_eq!(typ, StatementType::Unknown);
    }

    #[test]
    fn test_insert_header() {
        let header =
            parse_insert_header("INSERT INTO `tags` (`id`, `name`) VALUES (1,'family'),(2,'work')")
                .unwrap();
        assert_eq!(header.table, "tags");
        assert_eq!(header.columns, vec!["id", "name"]);
        assert_eq!(header.values, "(1,'family'),(2,'work')");
    }

    #[test]
    fn test_insert_header_requires_column_list() {
        assert!(parse_insert_header("INSERT INTO `tags` VALUES (1,'family')").is_none());
    }

    #[test]
    fn test_insert_ignore_header() {
        let header = parse_insert_header("insert ignore into tags (id) values (1)").unwrap();
        assert_eq!(header.table, "tags");
    }

    #[test]
    fn test_split_statements_basic() {
        let stmts = split_statements("SET a=1; INSERT INTO t (id) VALUES (1);\n");
        assert_eq!(stmts, vec!["SET a=1", "INSERT INTO t (id) VALUES (1)"]);
    }

    #[test]
    fn test_split_statements_semicolon_in_string() {
        let stmts = split_statements("INSERT INTO t (a) VALUES ('x;y'),('it\\'s;');SET b=2;");
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].ends_with("('it\\'s;')"));
    }

    #[test]
    fn test_split_statements_drops_leading_comments() {
        let sql = "-- Dumping data for table `notes`, it's here\nINSERT INTO notes (id) VALUES (1);";
        let stmts = split_statements(sql);
        assert_eq!(stmts, vec!["INSERT INTO notes (id) VALUES (1)"]);
    }

    #[test]
    fn test_split_statements_conditional_comment() {
        let sql = "/*!40101 SET NAMES utf8 */;\nINSERT INTO t (id) VALUES (1);";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "/*!40101 SET NAMES utf8 */");
    }
}
