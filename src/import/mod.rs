//! Import orchestration.
//!
//! One run replaces everything an account owns with the contents of a
//! Monica export. The wipe and every insert share a single transaction:
//! either the whole import commits or nothing changes.
//!
//! Rows fail in two ways. A row the database rejects (constraint, type or
//! size violation) is recorded in [`ImportSummary::errors`] and the run
//! continues. Any other error aborts the run and rolls the transaction back.

mod summary;

pub use summary::{ImportCounts, ImportSummary};

use crate::config::ImportConfig;
use crate::parser::SqlDump;
use crate::remap::{IdRemapper, RelationshipDedup};
use crate::source::{SourceData, SourceTable};
use crate::store;
use crate::translate::{
    self, Lookups, NewAddress, NewContactMethod, NewGift, NewLifeEvent, NewNote, NewReminder,
    Skip,
};
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use rusqlite::Connection;
use std::fmt;
use std::time::Instant;

/// Import stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Wipe,
    Contacts,
    Tags,
    TagLinks,
    ContactMethods,
    Notes,
    CallsAsNotes,
    Activities,
    Relationships,
    Addresses,
    LifeEvents,
    Gifts,
    Reminders,
    Commit,
}

impl Stage {
    pub const ALL: [Stage; 14] = [
        Stage::Wipe,
        Stage::Contacts,
        Stage::Tags,
        Stage::TagLinks,
        Stage::ContactMethods,
        Stage::Notes,
        Stage::CallsAsNotes,
        Stage::Activities,
        Stage::Relationships,
        Stage::Addresses,
        Stage::LifeEvents,
        Stage::Gifts,
        Stage::Reminders,
        Stage::Commit,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Wipe => "removing previous data",
            Stage::Contacts => "contacts",
            Stage::Tags => "tags",
            Stage::TagLinks => "tag links",
            Stage::ContactMethods => "contact methods",
            Stage::Notes => "notes",
            Stage::CallsAsNotes => "calls",
            Stage::Activities => "activities",
            Stage::Relationships => "relationships",
            Stage::Addresses => "addresses",
            Stage::LifeEvents => "life events",
            Stage::Gifts => "gifts",
            Stage::Reminders => "reminders",
            Stage::Commit => "committing",
        };
        f.write_str(label)
    }
}

/// Called before each stage starts. Returning an error aborts the import.
pub type StageObserver<'o> = Box<dyn FnMut(Stage) -> Result<()> + 'o>;

/// Result of writing one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome<T> {
    Inserted(T),
    /// The database rejected the row; the message is already recorded
    Failed(String),
}

impl<T> RowOutcome<T> {
    pub fn inserted(self) -> Option<T> {
        match self {
            RowOutcome::Inserted(value) => Some(value),
            RowOutcome::Failed(_) => None,
        }
    }
}

/// Replaces one account's data with a Monica export
pub struct Importer<'c> {
    conn: &'c mut Connection,
    config: ImportConfig,
    lookups: Lookups,
    observer: Option<StageObserver<'c>>,
}

impl<'c> Importer<'c> {
    pub fn new(conn: &'c mut Connection, config: &ImportConfig) -> Self {
        Self {
            conn,
            lookups: config.lookups(),
            config: config.clone(),
            observer: None,
        }
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(Stage) -> Result<()> + 'c,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Parse `dump` and replace every row of `account_id` with its contents
    pub fn run(&mut self, dump: &str, account_id: &str) -> Result<ImportSummary> {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            bail!("Account id must not be empty");
        }

        let start = Instant::now();
        let parsed = SqlDump::parse(dump);
        debug!(
            "parsed {} statements, {} tables with data",
            parsed.statement_count(),
            parsed.tables().len()
        );

        let config = &self.config;
        let source = SourceData::from_dump(&parsed, |table| config.skips_table(table));

        let tx = self
            .conn
            .transaction()
            .context("Failed to start import transaction")?;
        let observer = &mut self.observer;
        let mut notify = |stage: Stage| -> Result<()> {
            debug!("stage: {}", stage);
            match observer.as_deref_mut() {
                Some(observer) => observer(stage),
                None => Ok(()),
            }
        };

        let mut run = ImportRun::new(&tx, account_id, &self.lookups, &source);
        for stage in Stage::ALL {
            notify(stage)?;
            run.stage(stage)?;
        }

        let mut summary = run.finish(config.report_skips);
        let mut warnings = source_warnings(&parsed, &source, config);
        warnings.append(&mut summary.warnings);
        summary.warnings = warnings;

        tx.commit().context("Failed to commit import")?;

        summary.duration_secs = start.elapsed().as_secs_f64();
        debug!("{}", summary);
        Ok(summary)
    }
}

/// Import with the default configuration
pub fn import_dump(conn: &mut Connection, dump: &str, account_id: &str) -> Result<ImportSummary> {
    Importer::new(conn, &ImportConfig::default()).run(dump, account_id)
}

/// Warnings about the dump itself, independent of what was written
fn source_warnings(parsed: &SqlDump<'_>, source: &SourceData, config: &ImportConfig) -> Vec<String> {
    let mut warnings: Vec<String> = parsed
        .issues()
        .iter()
        .map(|issue| format!("parse: {}", issue))
        .collect();

    if !parsed.has_table(SourceTable::Contacts.name()) && !config.skips_table(SourceTable::Contacts)
    {
        warnings.push("contacts: no rows found in dump".to_string());
    }
    for (table, count) in &source.rejected {
        warnings.push(format!(
            "{}: {} dropped (missing id)",
            table,
            rows(*count)
        ));
    }
    if !source.entries.is_empty() {
        warnings.push(format!(
            "entries: {} not imported (journal entries have no destination)",
            rows(source.entries.len())
        ));
    }
    for name in config.unknown_skip_tables() {
        warnings.push(format!("config: unknown table in skip_tables: {}", name));
    }
    warnings
}

fn rows(n: usize) -> String {
    if n == 1 {
        "1 row".to_string()
    } else {
        format!("{} rows", n)
    }
}

/// Singular entity name used in row error messages
fn entity(table: SourceTable) -> &'static str {
    match table {
        SourceTable::Contacts => "contact",
        SourceTable::Tags => "tag",
        SourceTable::ContactTags => "contact_tag",
        SourceTable::ContactFields => "contact_field",
        SourceTable::Notes => "note",
        SourceTable::Calls => "call",
        SourceTable::Activities => "activity",
        SourceTable::ActivityContacts => "activity_contact",
        SourceTable::Relationships => "relationship",
        SourceTable::Addresses => "address",
        SourceTable::LifeEvents => "life_event",
        SourceTable::Gifts => "gift",
        SourceTable::Reminders => "reminder",
        other => other.name(),
    }
}

/// Rows that belong to a single contact
trait ContactOwned {
    fn contact(&self) -> Option<i64>;
}

macro_rules! contact_owned {
    ($($ty:ty),*) => {
        $(impl ContactOwned for $ty {
            fn contact(&self) -> Option<i64> {
                self.contact
            }
        })*
    };
}

contact_owned!(NewContactMethod, NewNote, NewAddress, NewLifeEvent, NewGift, NewReminder);

/// Per-run state: remapped ids, counters and the failure ledgers
struct ImportRun<'r> {
    conn: &'r Connection,
    account_id: &'r str,
    lookups: &'r Lookups,
    source: &'r SourceData,
    ids: IdRemapper,
    relationships: RelationshipDedup,
    counts: ImportCounts,
    errors: Vec<String>,
    skips: Vec<(SourceTable, Skip, usize)>,
    wiped_rows: usize,
}

impl<'r> ImportRun<'r> {
    fn new(
        conn: &'r Connection,
        account_id: &'r str,
        lookups: &'r Lookups,
        source: &'r SourceData,
    ) -> Self {
        Self {
            conn,
            account_id,
            lookups,
            source,
            ids: IdRemapper::default(),
            relationships: RelationshipDedup::default(),
            counts: ImportCounts::default(),
            errors: Vec::new(),
            skips: Vec::new(),
            wiped_rows: 0,
        }
    }

    fn stage(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::Wipe => self.wipe(),
            Stage::Contacts => self.contacts(),
            Stage::Tags => self.tags(),
            Stage::TagLinks => self.tag_links(),
            Stage::ContactMethods => self.contact_methods(),
            Stage::Notes => self.notes(),
            Stage::CallsAsNotes => self.calls(),
            Stage::Activities => self.activities(),
            Stage::Relationships => self.import_relationships(),
            Stage::Addresses => self.addresses(),
            Stage::LifeEvents => self.life_events(),
            Stage::Gifts => self.gifts(),
            Stage::Reminders => self.reminders(),
            Stage::Commit => Ok(()),
        }
    }

    fn finish(self, report_skips: bool) -> ImportSummary {
        let mut warnings = Vec::new();
        if report_skips {
            for (table, skip, count) in &self.skips {
                warnings.push(format!(
                    "{}: {} skipped ({})",
                    table,
                    rows(*count),
                    skip.describe()
                ));
            }
        }

        ImportSummary {
            account_id: self.account_id.to_string(),
            counts: self.counts,
            errors: self.errors,
            warnings,
            wiped_rows: self.wiped_rows,
            duration_secs: 0.0,
        }
    }

    fn skip(&mut self, table: SourceTable, reason: Skip) {
        match self
            .skips
            .iter_mut()
            .find(|(t, s, _)| *t == table && *s == reason)
        {
            Some((_, _, count)) => *count += 1,
            None => self.skips.push((table, reason, 1)),
        }
    }

    /// Classify a write result: row errors are recorded, the rest propagate
    fn guard<T>(
        &mut self,
        table: SourceTable,
        source_id: impl fmt::Display,
        result: rusqlite::Result<T>,
    ) -> Result<RowOutcome<T>> {
        match result {
            Ok(value) => Ok(RowOutcome::Inserted(value)),
            Err(e) if store::is_row_error(&e) => {
                let message = format!("{} #{}: {}", entity(table), source_id, e);
                warn!("{}", message);
                self.errors.push(message.clone());
                Ok(RowOutcome::Failed(message))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to write {} #{}", entity(table), source_id))),
        }
    }

    /// Resolve the owning contact and insert; `true` when a row was created
    fn import_owned<N, F>(
        &mut self,
        table: SourceTable,
        source_id: i64,
        translated: std::result::Result<N, Skip>,
        insert: F,
    ) -> Result<bool>
    where
        N: ContactOwned,
        F: FnOnce(&Connection, &str, &str, &N) -> rusqlite::Result<String>,
    {
        let row = match translated {
            Ok(row) => row,
            Err(skip) => {
                self.skip(table, skip);
                return Ok(false);
            }
        };
        let Some(contact_id) = self.ids.contacts.resolve(row.contact()) else {
            self.skip(table, Skip::UnresolvedContact);
            return Ok(false);
        };

        let result = insert(self.conn, self.account_id, contact_id, &row);
        Ok(self.guard(table, source_id, result)?.inserted().is_some())
    }

    fn wipe(&mut self) -> Result<()> {
        self.wiped_rows = store::wipe_account(self.conn, self.account_id)
            .with_context(|| format!("Failed to remove data of account {}", self.account_id))?;
        debug!("removed {} prior rows", self.wiped_rows);
        Ok(())
    }

    fn contacts(&mut self) -> Result<()> {
        let source = self.source;
        let lookups = self.lookups;
        for contact in &source.contacts {
            let new = match translate::translate_contact(contact, source, lookups) {
                Ok(new) => new,
                Err(skip) => {
                    self.skip(SourceTable::Contacts, skip);
                    continue;
                }
            };
            let result = store::insert_contact(self.conn, self.account_id, &new);
            if let Some(id) = self.guard(SourceTable::Contacts, contact.id, result)?.inserted() {
                self.ids.contacts.insert(contact.id, id);
                self.counts.contacts += 1;
            }
        }
        Ok(())
    }

    fn tags(&mut self) -> Result<()> {
        let source = self.source;
        for tag in &source.tags {
            let new = match translate::translate_tag(tag) {
                Ok(new) => new,
                Err(skip) => {
                    self.skip(SourceTable::Tags, skip);
                    continue;
                }
            };
            let result = store::insert_tag(self.conn, self.account_id, &new);
            if let Some(id) = self.guard(SourceTable::Tags, tag.id, result)?.inserted() {
                self.ids.tags.insert(tag.id, id);
                self.counts.tags += 1;
            }
        }
        Ok(())
    }

    fn tag_links(&mut self) -> Result<()> {
        let source = self.source;
        for link in &source.contact_tags {
            let Some(contact_id) = self.ids.contacts.resolve(Some(link.contact_id)) else {
                self.skip(SourceTable::ContactTags, Skip::UnresolvedContact);
                continue;
            };
            let Some(tag_id) = self.ids.tags.resolve(Some(link.tag_id)) else {
                self.skip(SourceTable::ContactTags, Skip::UnresolvedTag);
                continue;
            };
            let result = store::link_tag(self.conn, self.account_id, contact_id, tag_id);
            let key = format!("{}/{}", link.contact_id, link.tag_id);
            self.guard(SourceTable::ContactTags, key, result)?;
        }
        Ok(())
    }

    fn contact_methods(&mut self) -> Result<()> {
        let source = self.source;
        let lookups = self.lookups;
        for field in &source.contact_fields {
            let translated =
                translate::translate_contact_field(field, &source.contact_field_types, lookups);
            if self.import_owned(
                SourceTable::ContactFields,
                field.id,
                translated,
                store::insert_contact_method,
            )? {
                self.counts.contact_methods += 1;
            }
        }
        Ok(())
    }

    fn notes(&mut self) -> Result<()> {
        let source = self.source;
        for note in &source.notes {
            let translated = translate::translate_note(note);
            if self.import_owned(SourceTable::Notes, note.id, translated, store::insert_note)? {
                self.counts.notes += 1;
            }
        }
        Ok(())
    }

    fn calls(&mut self) -> Result<()> {
        let source = self.source;
        for call in &source.calls {
            let translated = translate::translate_call(call);
            if self.import_owned(SourceTable::Calls, call.id, translated, store::insert_note)? {
                self.counts.calls_as_notes += 1;
            }
        }
        Ok(())
    }

    fn activities(&mut self) -> Result<()> {
        let source = self.source;
        let participants = source.activity_participants();

        for activity in &source.activities {
            let new = match translate::translate_activity(activity, &source.activity_types) {
                Ok(new) => new,
                Err(skip) => {
                    self.skip(SourceTable::Activities, skip);
                    continue;
                }
            };

            let linked = participants.get(&activity.id).map(Vec::as_slice).unwrap_or(&[]);
            let mut contacts = Vec::with_capacity(linked.len());
            for contact in linked {
                match self.ids.contacts.resolve(Some(*contact)) {
                    Some(id) => contacts.push((*contact, id.to_string())),
                    None => self.skip(SourceTable::ActivityContacts, Skip::UnresolvedContact),
                }
            }
            if contacts.is_empty() {
                self.skip(SourceTable::Activities, Skip::NoParticipants);
                continue;
            }

            let result = store::insert_activity(self.conn, self.account_id, &new);
            let Some(activity_id) = self
                .guard(SourceTable::Activities, activity.id, result)?
                .inserted()
            else {
                continue;
            };
            self.counts.activities += 1;

            for (source_contact, contact_id) in &contacts {
                let result =
                    store::add_participant(self.conn, self.account_id, &activity_id, contact_id);
                let key = format!("{}/{}", activity.id, source_contact);
                self.guard(SourceTable::ActivityContacts, key, result)?;
            }
        }
        Ok(())
    }

    fn import_relationships(&mut self) -> Result<()> {
        let source = self.source;
        let lookups = self.lookups;
        for relationship in &source.relationships {
            let new = match translate::translate_relationship(
                relationship,
                &source.relationship_types,
                lookups,
            ) {
                Ok(new) => new,
                Err(skip) => {
                    self.skip(SourceTable::Relationships, skip);
                    continue;
                }
            };

            let (Some(contact_id), Some(related_id)) = (
                self.ids.contacts.resolve(Some(new.contact)),
                self.ids.contacts.resolve(Some(new.related)),
            ) else {
                self.skip(SourceTable::Relationships, Skip::UnresolvedContact);
                continue;
            };

            if !self.relationships.insert(new.contact, new.related, &new.kind) {
                continue;
            }

            let result = store::insert_relationship(
                self.conn,
                self.account_id,
                contact_id,
                related_id,
                &new.kind,
            );
            if self
                .guard(SourceTable::Relationships, relationship.id, result)?
                .inserted()
                .is_some()
            {
                self.counts.relationships += 1;
            }
        }
        Ok(())
    }

    fn addresses(&mut self) -> Result<()> {
        let source = self.source;
        for address in &source.addresses {
            let translated = translate::translate_address(address, &source.places);
            if self.import_owned(
                SourceTable::Addresses,
                address.id,
                translated,
                store::insert_address,
            )? {
                self.counts.addresses += 1;
            }
        }
        Ok(())
    }

    fn life_events(&mut self) -> Result<()> {
        let source = self.source;
        let lookups = self.lookups;
        for event in &source.life_events {
            let translated = translate::translate_life_event(
                event,
                &source.life_event_types,
                &source.life_event_categories,
                lookups,
            );
            if self.import_owned(
                SourceTable::LifeEvents,
                event.id,
                translated,
                store::insert_life_event,
            )? {
                self.counts.life_events += 1;
            }
        }
        Ok(())
    }

    fn gifts(&mut self) -> Result<()> {
        let source = self.source;
        for gift in &source.gifts {
            let translated = translate::translate_gift(gift);
            if self.import_owned(SourceTable::Gifts, gift.id, translated, store::insert_gift)? {
                self.counts.gifts += 1;
            }
        }
        Ok(())
    }

    fn reminders(&mut self) -> Result<()> {
        let source = self.source;
        for reminder in &source.reminders {
            let translated = translate::translate_reminder(reminder);
            if self.import_owned(
                SourceTable::Reminders,
                reminder.id,
                translated,
                store::insert_reminder,
            )? {
                self.counts.reminders += 1;
            }
        }
        Ok(())
    }
}
