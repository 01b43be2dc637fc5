use serde::Serialize;
use std::fmt;

/// Destination rows created, per entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub contacts: usize,
    pub tags: usize,
    pub contact_methods: usize,
    pub notes: usize,
    pub activities: usize,
    pub relationships: usize,
    pub addresses: usize,
    pub life_events: usize,
    pub gifts: usize,
    pub reminders: usize,
    pub calls_as_notes: usize,
}

impl ImportCounts {
    pub fn total(&self) -> usize {
        self.contacts
            + self.tags
            + self.contact_methods
            + self.notes
            + self.activities
            + self.relationships
            + self.addresses
            + self.life_events
            + self.gifts
            + self.reminders
            + self.calls_as_notes
    }

    /// Label/count pairs in import order
    pub fn entries(&self) -> [(&'static str, usize); 11] {
        [
            ("contacts", self.contacts),
            ("tags", self.tags),
            ("contact_methods", self.contact_methods),
            ("notes", self.notes),
            ("calls_as_notes", self.calls_as_notes),
            ("activities", self.activities),
            ("relationships", self.relationships),
            ("addresses", self.addresses),
            ("life_events", self.life_events),
            ("gifts", self.gifts),
            ("reminders", self.reminders),
        ]
    }
}

/// Outcome of one committed import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub account_id: String,
    pub counts: ImportCounts,
    /// Rows the database rejected, in import order
    pub errors: Vec<String>,
    /// Parse issues, skipped rows and unsupported data
    pub warnings: Vec<String>,
    /// Prior rows of the account removed before importing
    pub wiped_rows: usize,
    pub duration_secs: f64,
}

impl ImportSummary {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        write!(
            f,
            "Imported {} contacts, {} tags, {} contact methods, {} notes ({} from calls), \
             {} activities, {} relationships, {} addresses, {} life events, {} gifts, \
             {} reminders with {} errors and {} warnings in {:.3}s",
            c.contacts,
            c.tags,
            c.contact_methods,
            c.notes + c.calls_as_notes,
            c.calls_as_notes,
            c.activities,
            c.relationships,
            c.addresses,
            c.life_events,
            c.gifts,
            c.reminders,
            self.errors.len(),
            self.warnings.len(),
            self.duration_secs
        )
    }
}
