//! Typed rows of the Monica tables the importer reads.
//!
//! All foreign keys are source ids. Rows without an `id` (or, for pivot
//! tables, without both sides of the link) are rejected by `from_record`.

use super::{FromRecord, SourceTable};
use crate::parser::Record;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender_id: Option<i64>,
    pub description: Option<String>,
    pub is_starred: bool,
    pub is_partial: bool,
    pub is_active: bool,
    pub is_dead: bool,
    pub birthday_special_date_id: Option<i64>,
    pub deceased_special_date_id: Option<i64>,
    pub first_met_where: Option<String>,
    pub first_met_additional_info: Option<String>,
    pub job: Option<String>,
    pub company: Option<String>,
    pub food_preferences: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl FromRecord for Contact {
    const TABLE: SourceTable = SourceTable::Contacts;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            first_name: r.text("first_name"),
            middle_name: r.text("middle_name"),
            last_name: r.text("last_name"),
            nickname: r.text("nickname"),
            gender_id: r.int("gender_id"),
            description: r.raw_text("description"),
            is_starred: r.flag("is_starred"),
            is_partial: r.flag("is_partial"),
            // Exports predating the column have every contact active
            is_active: r.opt_flag("is_active").unwrap_or(true),
            is_dead: r.flag("is_dead"),
            birthday_special_date_id: r.int("birthday_special_date_id"),
            deceased_special_date_id: r.int("deceased_special_date_id"),
            first_met_where: r.text("first_met_where"),
            first_met_additional_info: r.text("first_met_additional_info"),
            job: r.text("job"),
            company: r.text("company"),
            food_preferences: r.text("food_preferences"),
            created_at: r.datetime("created_at"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gender {
    pub id: i64,
    pub name: Option<String>,
    /// Single-letter code (`M`, `F`, `O`, ...)
    pub code: Option<String>,
}

impl FromRecord for Gender {
    const TABLE: SourceTable = SourceTable::Genders;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
            code: r.text("type"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecialDate {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub is_age_based: bool,
    pub is_year_unknown: bool,
    pub date: Option<NaiveDate>,
}

impl FromRecord for SpecialDate {
    const TABLE: SourceTable = SourceTable::SpecialDates;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            is_age_based: r.flag("is_age_based"),
            is_year_unknown: r.flag("is_year_unknown"),
            date: r.date("date"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactFieldType {
    pub id: i64,
    pub name: Option<String>,
    pub protocol: Option<String>,
    /// Secondary type hint (`email`, `phone`, ...)
    pub kind: Option<String>,
}

impl FromRecord for ContactFieldType {
    const TABLE: SourceTable = SourceTable::ContactFieldTypes;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
            protocol: r.text("protocol"),
            kind: r.text("type"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactField {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub contact_field_type_id: Option<i64>,
    pub data: Option<String>,
}

impl FromRecord for ContactField {
    const TABLE: SourceTable = SourceTable::ContactFields;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            contact_field_type_id: r.int("contact_field_type_id"),
            data: r.raw_text("data"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: Option<String>,
}

impl FromRecord for Tag {
    const TABLE: SourceTable = SourceTable::Tags;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactTag {
    pub contact_id: i64,
    pub tag_id: i64,
}

impl FromRecord for ContactTag {
    const TABLE: SourceTable = SourceTable::ContactTags;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            contact_id: r.int("contact_id")?,
            tag_id: r.int("tag_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub body: Option<String>,
    pub is_favorited: bool,
    pub created_at: Option<NaiveDateTime>,
}

impl FromRecord for Note {
    const TABLE: SourceTable = SourceTable::Notes;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            body: r.raw_text("body"),
            is_favorited: r.flag("is_favorited"),
            created_at: r.datetime("created_at"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub called_at: Option<NaiveDateTime>,
    pub content: Option<String>,
    /// The contact initiated the call
    pub contact_called: bool,
}

impl FromRecord for Call {
    const TABLE: SourceTable = SourceTable::Calls;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            called_at: r.datetime("called_at"),
            content: r.raw_text("content"),
            contact_called: r.flag("contact_called"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityType {
    pub id: i64,
    pub name: Option<String>,
}

impl FromRecord for ActivityType {
    const TABLE: SourceTable = SourceTable::ActivityTypes;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub activity_type_id: Option<i64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub happened_at: Option<NaiveDate>,
}

impl FromRecord for Activity {
    const TABLE: SourceTable = SourceTable::Activities;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            activity_type_id: r.int("activity_type_id"),
            summary: r.text("summary"),
            description: r.raw_text("description"),
            happened_at: r.date("happened_at"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityContact {
    pub activity_id: i64,
    pub contact_id: i64,
}

impl FromRecord for ActivityContact {
    const TABLE: SourceTable = SourceTable::ActivityContacts;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            activity_id: r.int("activity_id")?,
            contact_id: r.int("contact_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipType {
    pub id: i64,
    pub name: Option<String>,
    pub name_reverse: Option<String>,
}

impl FromRecord for RelationshipType {
    const TABLE: SourceTable = SourceTable::RelationshipTypes;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
            name_reverse: r.text("name_reverse_relationship"),
        })
    }
}

/// `contact_is` is the <type> of `of_contact`
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: i64,
    pub relationship_type_id: Option<i64>,
    pub contact_is: Option<i64>,
    pub of_contact: Option<i64>,
}

impl FromRecord for Relationship {
    const TABLE: SourceTable = SourceTable::Relationships;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            relationship_type_id: r.int("relationship_type_id"),
            contact_is: r.int("contact_is"),
            of_contact: r.int("of_contact"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: i64,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl FromRecord for Place {
    const TABLE: SourceTable = SourceTable::Places;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            street: r.text("street"),
            city: r.text("city"),
            province: r.text("province"),
            postal_code: r.text("postal_code"),
            country: r.text("country"),
            latitude: r.float("latitude"),
            longitude: r.float("longitude"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: i64,
    pub place_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub name: Option<String>,
}

impl FromRecord for Address {
    const TABLE: SourceTable = SourceTable::Addresses;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            place_id: r.int("place_id"),
            contact_id: r.int("contact_id"),
            name: r.text("name"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifeEventCategory {
    pub id: i64,
    pub name: Option<String>,
    pub key: Option<String>,
}

impl FromRecord for LifeEventCategory {
    const TABLE: SourceTable = SourceTable::LifeEventCategories;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
            key: r.text("default_life_event_category_key"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifeEventType {
    pub id: i64,
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub key: Option<String>,
}

impl FromRecord for LifeEventType {
    const TABLE: SourceTable = SourceTable::LifeEventTypes;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            name: r.text("name"),
            category_id: r.int("life_event_category_id"),
            key: r.text("default_life_event_type_key"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifeEvent {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub life_event_type_id: Option<i64>,
    pub name: Option<String>,
    pub note: Option<String>,
    pub happened_at: Option<NaiveDate>,
}

impl FromRecord for LifeEvent {
    const TABLE: SourceTable = SourceTable::LifeEvents;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            life_event_type_id: r.int("life_event_type_id"),
            name: r.text("name"),
            note: r.raw_text("note"),
            happened_at: r.date("happened_at"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gift {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub url: Option<String>,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
}

impl FromRecord for Gift {
    const TABLE: SourceTable = SourceTable::Gifts;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            name: r.text("name"),
            comment: r.raw_text("comment"),
            url: r.text("url"),
            value: r.float("value"),
            status: r.text("status"),
            date: r.date("date"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub initial_date: Option<NaiveDate>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency_type: Option<String>,
    pub frequency_number: Option<i64>,
}

impl FromRecord for Reminder {
    const TABLE: SourceTable = SourceTable::Reminders;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            contact_id: r.int("contact_id"),
            initial_date: r.date("initial_date"),
            title: r.text("title"),
            description: r.raw_text("description"),
            frequency_type: r.text("frequency_type"),
            frequency_number: r.int("frequency_number"),
        })
    }
}

/// Journal entry. Parsed for reporting only.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub title: Option<String>,
    pub post: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl FromRecord for Entry {
    const TABLE: SourceTable = SourceTable::Entries;

    fn from_record(r: &Record) -> Option<Self> {
        Some(Self {
            id: r.int("id")?,
            title: r.text("title"),
            post: r.raw_text("post"),
            created_at: r.datetime("created_at"),
        })
    }
}
