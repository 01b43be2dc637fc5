//! Typed view of a parsed Monica export.
//!
//! [`SourceData`] holds one collection per source table. Lookup tables
//! (genders, special dates, relationship types, ...) are indexed by id;
//! entity tables keep dump order.

mod records;

pub use records::*;

use crate::parser::{Record, SqlDump};
use ahash::AHashMap;

/// The Monica tables the importer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Contacts,
    Genders,
    SpecialDates,
    ContactFieldTypes,
    ContactFields,
    Tags,
    ContactTags,
    Notes,
    Calls,
    ActivityTypes,
    Activities,
    ActivityContacts,
    RelationshipTypes,
    Relationships,
    Places,
    Addresses,
    LifeEventCategories,
    LifeEventTypes,
    LifeEvents,
    Gifts,
    Reminders,
    Entries,
}

impl SourceTable {
    pub const ALL: [SourceTable; 22] = [
        SourceTable::Contacts,
        SourceTable::Genders,
        SourceTable::SpecialDates,
        SourceTable::ContactFieldTypes,
        SourceTable::ContactFields,
        SourceTable::Tags,
        SourceTable::ContactTags,
        SourceTable::Notes,
        SourceTable::Calls,
        SourceTable::ActivityTypes,
        SourceTable::Activities,
        SourceTable::ActivityContacts,
        SourceTable::RelationshipTypes,
        SourceTable::Relationships,
        SourceTable::Places,
        SourceTable::Addresses,
        SourceTable::LifeEventCategories,
        SourceTable::LifeEventTypes,
        SourceTable::LifeEvents,
        SourceTable::Gifts,
        SourceTable::Reminders,
        SourceTable::Entries,
    ];

    /// Table name in the export
    pub fn name(&self) -> &'static str {
        match self {
            SourceTable::Contacts => "contacts",
            SourceTable::Genders => "genders",
            SourceTable::SpecialDates => "special_dates",
            SourceTable::ContactFieldTypes => "contact_field_types",
            SourceTable::ContactFields => "contact_fields",
            SourceTable::Tags => "tags",
            SourceTable::ContactTags => "contact_tag",
            SourceTable::Notes => "notes",
            SourceTable::Calls => "calls",
            SourceTable::ActivityTypes => "activity_types",
            SourceTable::Activities => "activities",
            SourceTable::ActivityContacts => "activity_contact",
            SourceTable::RelationshipTypes => "relationship_types",
            SourceTable::Relationships => "relationships",
            SourceTable::Places => "places",
            SourceTable::Addresses => "addresses",
            SourceTable::LifeEventCategories => "life_event_categories",
            SourceTable::LifeEventTypes => "life_event_types",
            SourceTable::LifeEvents => "life_events",
            SourceTable::Gifts => "gifts",
            SourceTable::Reminders => "reminders",
            SourceTable::Entries => "entries",
        }
    }

    /// Primary key columns used for de-duplication
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            SourceTable::ContactTags => &["contact_id", "tag_id"],
            SourceTable::ActivityContacts => &["activity_id", "contact_id"],
            _ => &["id"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Conversion from an untyped dump row into a typed source record
pub trait FromRecord: Sized {
    const TABLE: SourceTable;

    /// `None` when the row lacks the columns that identify it
    fn from_record(record: &Record) -> Option<Self>;
}

/// Every source table of one export, typed
#[derive(Debug, Default)]
pub struct SourceData {
    pub contacts: Vec<Contact>,
    pub genders: AHashMap<i64, Gender>,
    pub special_dates: AHashMap<i64, SpecialDate>,
    pub contact_field_types: AHashMap<i64, ContactFieldType>,
    pub contact_fields: Vec<ContactField>,
    pub tags: Vec<Tag>,
    pub contact_tags: Vec<ContactTag>,
    pub notes: Vec<Note>,
    pub calls: Vec<Call>,
    pub activity_types: AHashMap<i64, ActivityType>,
    pub activities: Vec<Activity>,
    pub activity_contacts: Vec<ActivityContact>,
    pub relationship_types: AHashMap<i64, RelationshipType>,
    pub relationships: Vec<Relationship>,
    pub places: AHashMap<i64, Place>,
    pub addresses: Vec<Address>,
    pub life_event_categories: AHashMap<i64, LifeEventCategory>,
    pub life_event_types: AHashMap<i64, LifeEventType>,
    pub life_events: Vec<LifeEvent>,
    pub gifts: Vec<Gift>,
    pub reminders: Vec<Reminder>,
    pub entries: Vec<Entry>,
    /// Rows dropped because they lacked identifying columns, per table
    pub rejected: Vec<(SourceTable, usize)>,
}

impl SourceData {
    /// Type every table of a parsed dump. Tables for which `skip` returns
    /// true are left empty.
    pub fn from_dump<F>(dump: &SqlDump<'_>, skip: F) -> Self
    where
        F: Fn(SourceTable) -> bool,
    {
        let mut data = SourceData::default();
        let mut loader = Loader {
            dump,
            skip: &skip,
            rejected: &mut data.rejected,
        };

        data.contacts = loader.load();
        data.genders = index(loader.load(), |g: &Gender| g.id);
        data.special_dates = index(loader.load(), |d: &SpecialDate| d.id);
        data.contact_field_types = index(loader.load(), |t: &ContactFieldType| t.id);
        data.contact_fields = loader.load();
        data.tags = loader.load();
        data.contact_tags = loader.load();
        data.notes = loader.load();
        data.calls = loader.load();
        data.activity_types = index(loader.load(), |t: &ActivityType| t.id);
        data.activities = loader.load();
        data.activity_contacts = loader.load();
        data.relationship_types = index(loader.load(), |t: &RelationshipType| t.id);
        data.relationships = loader.load();
        data.places = index(loader.load(), |p: &Place| p.id);
        data.addresses = loader.load();
        data.life_event_categories = index(loader.load(), |c: &LifeEventCategory| c.id);
        data.life_event_types = index(loader.load(), |t: &LifeEventType| t.id);
        data.life_events = loader.load();
        data.gifts = loader.load();
        data.reminders = loader.load();
        data.entries = loader.load();

        data
    }

    /// Participants of each activity, in dump order
    pub fn activity_participants(&self) -> AHashMap<i64, Vec<i64>> {
        let mut map: AHashMap<i64, Vec<i64>> = AHashMap::new();
        for link in &self.activity_contacts {
            map.entry(link.activity_id).or_default().push(link.contact_id);
        }
        map
    }
}

struct Loader<'d, 'a, 's> {
    dump: &'d SqlDump<'a>,
    skip: &'s dyn Fn(SourceTable) -> bool,
    rejected: &'s mut Vec<(SourceTable, usize)>,
}

impl Loader<'_, '_, '_> {
    fn load<T: FromRecord>(&mut self) -> Vec<T> {
        let table = T::TABLE;
        if (self.skip)(table) {
            log::debug!("{}: skipped by configuration", table);
            return Vec::new();
        }

        let records = self.dump.rows(table.name(), table.key_columns());
        let total = records.len();
        let typed: Vec<T> = records.iter().filter_map(T::from_record).collect();

        if typed.len() < total {
            self.rejected.push((table, total - typed.len()));
        }
        log::debug!("{}: {} rows", table, typed.len());
        typed
    }
}

fn index<T, F>(rows: Vec<T>, key: F) -> AHashMap<i64, T>
where
    F: Fn(&T) -> i64,
{
    rows.into_iter().map(|row| (key(&row), row)).collect()
}
