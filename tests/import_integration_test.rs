//! End-to-end import tests: Monica dump text in, rows in the contact store out.

use monica_import::import::{import_dump, ImportCounts, Importer, Stage};
use monica_import::store;
use monica_import::ImportConfig;
use rusqlite::{params, Connection, OptionalExtension};
use tempfile::TempDir;

const EXPORT: &str = include_str!("fixtures/monica_export.sql");

fn memory_db() -> Connection {
    store::open_in_memory().unwrap()
}

fn count(conn: &Connection, table: &str, account: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE account_id = ?1", table),
        params![account],
        |row| row.get(0),
    )
    .unwrap()
}

fn total_rows(conn: &Connection, account: &str) -> i64 {
    store::account_row_counts(conn, account)
        .unwrap()
        .iter()
        .map(|(_, n)| n)
        .sum()
}

fn contact_id(conn: &Connection, account: &str, first_name: &str) -> Option<String> {
    conn.query_row(
        "SELECT id FROM contacts WHERE account_id = ?1 AND first_name = ?2",
        params![account, first_name],
        |row| row.get(0),
    )
    .optional()
    .unwrap()
}

// =============================================================================
// Full export
// =============================================================================

#[test]
fn test_full_export_counts() {
    let mut conn = memory_db();
    let summary = import_dump(&mut conn, EXPORT, "acct").unwrap();

    assert_eq!(
        summary.counts,
        ImportCounts {
            contacts: 4,
            tags: 2,
            contact_methods: 3,
            notes: 2,
            activities: 2,
            relationships: 2,
            addresses: 1,
            life_events: 2,
            gifts: 2,
            reminders: 3,
            calls_as_notes: 2,
        }
    );
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert_eq!(summary.account_id, "acct");

    assert_eq!(count(&conn, "contacts", "acct"), 4);
    assert_eq!(count(&conn, "notes", "acct"), 4);
    assert_eq!(count(&conn, "contact_tags", "acct"), 3);
    assert_eq!(count(&conn, "activity_participants", "acct"), 3);
}

#[test]
fn test_full_export_warnings() {
    let mut conn = memory_db();
    let summary = import_dump(&mut conn, EXPORT, "acct").unwrap();

    let expected = [
        "parse: migrations: INSERT statement without a column list was ignored",
        "entries: 1 row not imported (journal entries have no destination)",
        "contacts: 1 row skipped (partial contact)",
        "contact_tag: 1 row skipped (unresolved contact)",
        "contact_fields: 1 row skipped (unresolved contact)",
        "notes: 1 row skipped (unresolved contact)",
        "activity_contact: 1 row skipped (unresolved contact)",
        "activities: 1 row skipped (no imported participant)",
        "relationships: 2 rows skipped (unresolved contact)",
        "addresses: 1 row skipped (missing lookup row)",
        "gifts: 1 row skipped (unresolved contact)",
    ];
    assert_eq!(summary.warnings, expected);
}

#[test]
fn test_contact_fields_are_translated() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let (gender, birthday, month, day, status, favorite, how_we_met, job): (
        String,
        String,
        i64,
        i64,
        String,
        bool,
        String,
        String,
    ) = conn
        .query_row(
            "SELECT gender, birthday, birthday_month, birthday_day, status, is_favorite,
                    how_we_met, job_title
             FROM contacts WHERE first_name = 'Sarah'",
            [],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(gender, "female");
    assert_eq!(birthday, "1990-04-12");
    assert_eq!((month, day), (4, 12));
    assert_eq!(status, "active");
    assert!(favorite);
    assert_eq!(how_we_met, "University — Chemistry lab");
    assert_eq!(job, "Engineer");

    // Year-unknown birthday keeps only month and day
    let (birthday, month, day, nickname): (Option<String>, i64, i64, String) = conn
        .query_row(
            "SELECT birthday, birthday_month, birthday_day, nickname FROM contacts WHERE first_name = 'Tom'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(birthday, None);
    assert_eq!((month, day), (7, 4));
    assert_eq!(nickname, "Tommy");

    // Age-based birthday keeps only the approximate year; death wins over active
    let (birthday, approx, deceased_on, status): (Option<String>, i64, String, String) = conn
        .query_row(
            "SELECT birthday, birth_year_approx, deceased_on, status FROM contacts WHERE first_name = 'Rose'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(birthday, None);
    assert_eq!(approx, 1935);
    assert_eq!(deceased_on, "2019-11-02");
    assert_eq!(status, "deceased");

    let status: String = conn
        .query_row(
            "SELECT status FROM contacts WHERE first_name = 'Alex'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(status, "archived");
}

#[test]
fn test_duplicate_primary_key_across_blocks_keeps_first() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    assert!(contact_id(&conn, "acct", "Sarah").is_some());
    assert!(contact_id(&conn, "acct", "Sarah DUPLICATE").is_none());
    assert!(contact_id(&conn, "acct", "Alex").is_some());
}

#[test]
fn test_partial_contact_is_never_materialized() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    assert!(contact_id(&conn, "acct", "Ghost").is_none());
    let ghost_rows: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM contact_methods WHERE value = 'ghost@example.com')
                  + (SELECT COUNT(*) FROM notes WHERE body = 'ghost note')
                  + (SELECT COUNT(*) FROM gifts WHERE name = 'Ghost gift')
                  + (SELECT COUNT(*) FROM activities WHERE title = 'Ghost hangout')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(ghost_rows, 0);
}

#[test]
fn test_relationship_pairs_are_stored_once() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let rose = contact_id(&conn, "acct", "Rose").unwrap();
    let sarah = contact_id(&conn, "acct", "Sarah").unwrap();

    let parents: Vec<(String, String)> = conn
        .prepare(
            "SELECT contact_id, related_contact_id FROM relationships
             WHERE relationship_type = 'parent'",
        )
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(parents, vec![(rose, sarah)]);

    // friend rows in both directions collapse to one
    assert_eq!(count(&conn, "relationships", "acct"), 2);
}

#[test]
fn test_notes_calls_and_escapes() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let bodies: Vec<(Option<String>, String)> = conn
        .prepare("SELECT title, body FROM notes ORDER BY created_at")
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        bodies,
        vec![
            (None, "Loves hiking; hates rain. It's true.".to_string()),
            (
                None,
                "Recipe: 'apple pie' (the good one), 2 eggs\nbake 40 min".to_string()
            ),
            (
                Some("Phone call".to_string()),
                "Talked about the trip".to_string()
            ),
            (Some("Phone call (they called)".to_string()), String::new()),
        ]
    );
}

#[test]
fn test_free_text_is_stored_verbatim() {
    let dump = "INSERT INTO `contacts` (`id`,`first_name`,`description`) VALUES (1,'  Sarah ',' likes tea\\n');\n\
                INSERT INTO `notes` (`id`,`contact_id`,`body`) VALUES (1,1,'    indented code\\n'),(2,1,'   ');";
    let mut conn = memory_db();
    let summary = import_dump(&mut conn, dump, "acct").unwrap();

    assert_eq!(summary.counts.notes, 1);
    assert_eq!(summary.warnings, vec!["notes: 1 row skipped (no content)"]);

    let body: String = conn
        .query_row("SELECT body FROM notes WHERE account_id = 'acct'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(body, "    indented code\n");

    let (first_name, description): (String, String) = conn
        .query_row(
            "SELECT first_name, description FROM contacts WHERE account_id = 'acct'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(first_name, "Sarah");
    assert_eq!(description, " likes tea\n");
}

#[test]
fn test_activity_title_falls_back_to_type() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let titles: Vec<String> = conn
        .prepare("SELECT title FROM activities ORDER BY happened_on")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(titles, vec!["Dinner at Luigi's", "Dinner"]);
}

#[test]
fn test_gifts_reminders_and_life_events() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let (status, amount): (String, f64) = conn
        .query_row(
            "SELECT status, amount FROM gifts WHERE name = 'Hiking boots'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(status, "given");
    assert!((amount - 120.5).abs() < f64::EPSILON);

    let reminders: Vec<(String, String, i64)> = conn
        .prepare("SELECT title, recurrence, recurrence_interval FROM reminders ORDER BY next_due")
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        reminders,
        vec![
            ("Sarah's birthday".to_string(), "yearly".to_string(), 1),
            ("Call Tom".to_string(), "weekly".to_string(), 2),
            ("Check in".to_string(), "one_time".to_string(), 1),
        ]
    );

    let events: Vec<(String, String, String)> = conn
        .prepare("SELECT title, category, event_type FROM life_events ORDER BY happened_on")
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        events,
        vec![
            (
                "New job".to_string(),
                "work_and_education".to_string(),
                "new_job".to_string()
            ),
            (
                "Boston marathon".to_string(),
                "other".to_string(),
                "custom".to_string()
            ),
        ]
    );

    let city: String = conn
        .query_row("SELECT city FROM addresses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(city, "Springfield");
}

// =============================================================================
// Replace semantics
// =============================================================================

#[test]
fn test_reimport_is_idempotent() {
    let mut conn = memory_db();
    let first = import_dump(&mut conn, EXPORT, "acct").unwrap();
    let rows_after_first = total_rows(&conn, "acct");

    let second = import_dump(&mut conn, EXPORT, "acct").unwrap();

    assert_eq!(first.counts, second.counts);
    assert_eq!(second.wiped_rows as i64, rows_after_first);
    assert_eq!(total_rows(&conn, "acct"), rows_after_first);
    assert_eq!(count(&conn, "contacts", "acct"), 4);
}

#[test]
fn test_other_accounts_are_untouched() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "alice").unwrap();
    let bob_dump = "INSERT INTO `contacts` (`id`,`first_name`) VALUES (1,'Bob');";
    import_dump(&mut conn, bob_dump, "bob").unwrap();

    import_dump(&mut conn, EXPORT, "alice").unwrap();

    assert_eq!(count(&conn, "contacts", "bob"), 1);
    assert_eq!(count(&conn, "contacts", "alice"), 4);
}

#[test]
fn test_empty_dump_clears_account() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();

    let summary = import_dump(&mut conn, "", "acct").unwrap();
    assert_eq!(summary.counts.total(), 0);
    assert_eq!(total_rows(&conn, "acct"), 0);
    assert_eq!(summary.warnings, vec!["contacts: no rows found in dump"]);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn test_partial_contact_relationship_scenario() {
    let dump = "\
INSERT INTO `contacts` (`id`,`first_name`,`is_partial`) VALUES (1,'Sarah',0),(2,'Ghost',1);
INSERT INTO `relationship_types` (`id`,`name`,`name_reverse_relationship`) VALUES (1,'parent','child'),(2,'child','parent');
INSERT INTO `relationships` (`id`,`relationship_type_id`,`contact_is`,`of_contact`) VALUES (1,1,1,2),(2,2,2,1);
";
    let mut conn = memory_db();
    let summary = import_dump(&mut conn, dump, "acct").unwrap();

    assert_eq!(summary.counts.contacts, 1);
    assert_eq!(summary.counts.relationships, 0);
    assert!(summary.errors.is_empty());
    assert_eq!(count(&conn, "relationships", "acct"), 0);
}

#[test]
fn test_rejected_row_is_recorded_and_import_continues() {
    let dump = "\
INSERT INTO `contacts` (`id`,`first_name`) VALUES (1,'Sarah');
INSERT INTO `tags` (`id`,`name`) VALUES (1,'friends'),(2,'friends'),(3,'work');
INSERT INTO `contact_tag` (`contact_id`,`tag_id`) VALUES (1,1),(1,2),(1,3);
INSERT INTO `notes` (`id`,`contact_id`,`body`) VALUES (1,1,'after the failure');
";
    let mut conn = memory_db();
    let summary = import_dump(&mut conn, dump, "acct").unwrap();

    assert_eq!(summary.counts.tags, 2);
    assert_eq!(summary.counts.notes, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(
        summary.errors[0].starts_with("tag #2: "),
        "{}",
        summary.errors[0]
    );
    assert!(summary
        .warnings
        .contains(&"contact_tag: 1 row skipped (unresolved tag)".to_string()));
    assert_eq!(count(&conn, "contact_tags", "acct"), 2);
}

#[test]
fn test_aborted_import_keeps_previous_data() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();
    let before = total_rows(&conn, "acct");

    let replacement = "INSERT INTO `contacts` (`id`,`first_name`) VALUES (1,'Replacement');";
    let result = Importer::new(&mut conn, &ImportConfig::default())
        .with_observer(|stage| {
            if stage == Stage::Relationships {
                anyhow::bail!("import cancelled");
            }
            Ok(())
        })
        .run(replacement, "acct");

    let err = result.unwrap_err();
    assert!(err.to_string().contains("cancelled"));
    assert_eq!(total_rows(&conn, "acct"), before);
    assert!(contact_id(&conn, "acct", "Replacement").is_none());
    assert!(contact_id(&conn, "acct", "Sarah").is_some());
}

#[test]
fn test_database_failure_rolls_back() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "acct").unwrap();
    conn.execute_batch("DROP TABLE gifts;").unwrap();

    let err = import_dump(&mut conn, EXPORT, "acct").unwrap_err();
    assert!(format!("{:#}", err).contains("gifts"), "{:#}", err);
    assert_eq!(count(&conn, "contacts", "acct"), 4);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_skip_tables() {
    let mut conn = memory_db();
    let config = ImportConfig {
        skip_tables: vec!["calls".to_string(), "entries".to_string()],
        ..Default::default()
    };
    let summary = Importer::new(&mut conn, &config).run(EXPORT, "acct").unwrap();

    assert_eq!(summary.counts.calls_as_notes, 0);
    assert_eq!(summary.counts.notes, 2);
    assert!(!summary.warnings.iter().any(|w| w.starts_with("entries")));
}

#[test]
fn test_custom_contact_field_kind() {
    let mut conn = memory_db();
    import_dump(&mut conn, EXPORT, "default").unwrap();
    let (kind, label): (String, Option<String>) = conn
        .query_row(
            "SELECT kind, label FROM contact_methods WHERE value = '+1 555 0101'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "other");
    assert_eq!(label.as_deref(), Some("Signal"));

    let config: ImportConfig =
        serde_yaml_ng::from_str("contact_field_kinds:\n  Signal: phone\n").unwrap();
    let mut conn = memory_db();
    Importer::new(&mut conn, &config).run(EXPORT, "acct").unwrap();
    let (kind, label): (String, Option<String>) = conn
        .query_row(
            "SELECT kind, label FROM contact_methods WHERE value = '+1 555 0101'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "phone");
    assert_eq!(label, None);
}

#[test]
fn test_import_into_database_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.db");

    {
        let mut conn = store::open_database(&path).unwrap();
        import_dump(&mut conn, EXPORT, "acct").unwrap();
    }

    let conn = store::open_database(&path).unwrap();
    assert_eq!(count(&conn, "contacts", "acct"), 4);
}
