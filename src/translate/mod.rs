//! Mapping from typed Monica rows to destination-shaped records.
//!
//! Every translator is a pure function over source records plus an
//! explicit [`Lookups`]. Foreign keys in the `New*` records are still
//! source ids; the importer resolves them through the identifier remapper.
//! A translator that decides a row must not be imported returns a [`Skip`].

mod lookups;
mod relationship;

pub use lookups::{Lookups, CUSTOM_LIFE_EVENT_TYPE, OTHER_LIFE_EVENT_CATEGORY};
pub use relationship::translate_relationship;

use crate::source::{
    Activity, ActivityType, Address, Call, Contact, ContactField, ContactFieldType, Gift,
    LifeEvent, LifeEventCategory, LifeEventType, Note, Place, Reminder, SourceData, SpecialDate,
    Tag,
};
use ahash::AHashMap;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Separator between the two "how we met" source fields
pub const HOW_WE_MET_SEPARATOR: &str = " — ";

/// Why a source row produced no destination row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Skip {
    /// Placeholder contact that only anchors relationships
    PartialContact,
    /// Nothing worth importing (no body, no value, no name)
    Empty,
    /// A lookup row (place, type) the record points to is missing
    MissingLookup,
    /// Referenced contact was not imported
    UnresolvedContact,
    /// Referenced tag was not imported
    UnresolvedTag,
    /// Activity with no imported participant
    NoParticipants,
}

impl Skip {
    pub fn describe(&self) -> &'static str {
        match self {
            Skip::PartialContact => "partial contact",
            Skip::Empty => "no content",
            Skip::MissingLookup => "missing lookup row",
            Skip::UnresolvedContact => "unresolved contact",
            Skip::UnresolvedTag => "unresolved tag",
            Skip::NoParticipants => "no imported participant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::PreferNotToSay => "prefer_not_to_say",
            Gender::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStatus {
    Active,
    Archived,
    Deceased,
}

impl ContactStatus {
    /// Death overrides the active flag
    pub fn derive(is_dead: bool, is_active: bool) -> Self {
        if is_dead {
            ContactStatus::Deceased
        } else if !is_active {
            ContactStatus::Archived
        } else {
            ContactStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Active => "active",
            ContactStatus::Archived => "archived",
            ContactStatus::Deceased => "deceased",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethodKind {
    Email,
    Phone,
    Website,
    Facebook,
    Twitter,
    Instagram,
    Linkedin,
    Whatsapp,
    Telegram,
    Other,
}

impl ContactMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMethodKind::Email => "email",
            ContactMethodKind::Phone => "phone",
            ContactMethodKind::Website => "website",
            ContactMethodKind::Facebook => "facebook",
            ContactMethodKind::Twitter => "twitter",
            ContactMethodKind::Instagram => "instagram",
            ContactMethodKind::Linkedin => "linkedin",
            ContactMethodKind::Whatsapp => "whatsapp",
            ContactMethodKind::Telegram => "telegram",
            ContactMethodKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftStatus {
    Idea,
    Given,
    Received,
}

impl GiftStatus {
    /// Monica's `offered` is our `given`; anything unknown is an idea
    pub fn from_monica(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("offered") => GiftStatus::Given,
            Some("received") => GiftStatus::Received,
            _ => GiftStatus::Idea,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GiftStatus::Idea => "idea",
            GiftStatus::Given => "given",
            GiftStatus::Received => "received",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    OneTime,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// From Monica's `frequency_type` unit
    pub fn from_unit(unit: Option<&str>) -> Self {
        match unit.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("year") => Recurrence::Yearly,
            Some("month") => Recurrence::Monthly,
            Some("week") => Recurrence::Weekly,
            _ => Recurrence::OneTime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::OneTime => "one_time",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        }
    }
}

/// Birthday at the precision the export recorded it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Birthday {
    Exact(NaiveDate),
    MonthDay { month: u32, day: u32 },
    /// Only an age was known
    ApproximateYear(i32),
}

impl Birthday {
    pub fn from_special_date(special: &SpecialDate) -> Option<Self> {
        let date = special.date?;
        Some(if special.is_age_based {
            Birthday::ApproximateYear(date.year())
        } else if special.is_year_unknown {
            Birthday::MonthDay {
                month: date.month(),
                day: date.day(),
            }
        } else {
            Birthday::Exact(date)
        })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Birthday::Exact(d) => Some(*d),
            _ => None,
        }
    }

    pub fn month_day(&self) -> Option<(u32, u32)> {
        match self {
            Birthday::Exact(d) => Some((d.month(), d.day())),
            Birthday::MonthDay { month, day } => Some((*month, *day)),
            Birthday::ApproximateYear(_) => None,
        }
    }

    pub fn approximate_year(&self) -> Option<i32> {
        match self {
            Birthday::ApproximateYear(y) => Some(*y),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub source_id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<Birthday>,
    pub deceased_on: Option<NaiveDate>,
    pub status: ContactStatus,
    pub is_favorite: bool,
    pub how_we_met: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub food_preferences: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTag {
    pub source_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMethod {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub kind: ContactMethodKind,
    pub value: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub title: Option<String>,
    pub body: String,
    pub is_favorite: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub source_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub happened_on: Option<NaiveDate>,
}

/// `contact` is the `kind` of `related`
#[derive(Debug, Clone, PartialEq)]
pub struct NewRelationship {
    pub source_id: i64,
    pub contact: i64,
    pub related: i64,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLifeEvent {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub category: &'static str,
    pub event_type: &'static str,
    pub title: String,
    pub note: Option<String>,
    pub happened_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGift {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub amount: Option<f64>,
    pub status: GiftStatus,
    pub occurred_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub source_id: i64,
    pub contact: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub next_due: Option<NaiveDate>,
    pub recurrence: Recurrence,
    pub interval: i64,
}

/// Join the two free-text "how we met" fields
pub fn how_we_met(where_: Option<&str>, info: Option<&str>) -> Option<String> {
    match (where_, info) {
        (Some(w), Some(i)) => Some(format!("{}{}{}", w, HOW_WE_MET_SEPARATOR, i)),
        (Some(w), None) => Some(w.to_string()),
        (None, Some(i)) => Some(i.to_string()),
        (None, None) => None,
    }
}

pub fn translate_contact(
    contact: &Contact,
    source: &SourceData,
    lookups: &Lookups,
) -> Result<NewContact, Skip> {
    if contact.is_partial {
        return Err(Skip::PartialContact);
    }

    let gender = contact
        .gender_id
        .and_then(|id| source.genders.get(&id))
        .map(|g| lookups.gender(g.code.as_deref(), g.name.as_deref()));

    let birthday = contact
        .birthday_special_date_id
        .and_then(|id| source.special_dates.get(&id))
        .and_then(Birthday::from_special_date);

    let deceased_on = contact
        .deceased_special_date_id
        .and_then(|id| source.special_dates.get(&id))
        .filter(|d| !d.is_age_based && !d.is_year_unknown)
        .and_then(|d| d.date);

    let first_name = contact
        .first_name
        .clone()
        .or_else(|| contact.nickname.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(NewContact {
        source_id: contact.id,
        first_name,
        middle_name: contact.middle_name.clone(),
        last_name: contact.last_name.clone(),
        nickname: contact.nickname.clone(),
        gender,
        birthday,
        deceased_on,
        status: ContactStatus::derive(contact.is_dead, contact.is_active),
        is_favorite: contact.is_starred,
        how_we_met: how_we_met(
            contact.first_met_where.as_deref(),
            contact.first_met_additional_info.as_deref(),
        ),
        job_title: contact.job.clone(),
        company: contact.company.clone(),
        food_preferences: contact.food_preferences.clone(),
        description: contact.description.clone(),
        created_at: contact.created_at,
    })
}

pub fn translate_tag(tag: &Tag) -> Result<NewTag, Skip> {
    let name = tag.name.clone().ok_or(Skip::Empty)?;
    Ok(NewTag {
        source_id: tag.id,
        name,
    })
}

/// Kind and label for a contact field type: known name, then the type hint
/// and protocol, then `other` labelled with the type name.
pub fn contact_method_kind(
    field_type: Option<&ContactFieldType>,
    lookups: &Lookups,
) -> (ContactMethodKind, Option<String>) {
    let Some(field_type) = field_type else {
        return (ContactMethodKind::Other, None);
    };

    let by_name = field_type
        .name
        .as_deref()
        .and_then(|n| lookups.contact_method_kind(n));
    let by_hint = || {
        field_type
            .kind
            .as_deref()
            .and_then(|k| lookups.contact_method_kind(k))
    };
    let by_protocol = || match field_type.protocol.as_deref().map(str::trim) {
        Some("mailto:") => Some(ContactMethodKind::Email),
        Some("tel:") => Some(ContactMethodKind::Phone),
        _ => None,
    };

    match by_name.or_else(by_hint).or_else(by_protocol) {
        Some(kind) => (kind, None),
        None => (ContactMethodKind::Other, field_type.name.clone()),
    }
}

pub fn translate_contact_field(
    field: &ContactField,
    types: &AHashMap<i64, ContactFieldType>,
    lookups: &Lookups,
) -> Result<NewContactMethod, Skip> {
    let value = field.data.clone().ok_or(Skip::Empty)?;
    let field_type = field.contact_field_type_id.and_then(|id| types.get(&id));
    let (kind, label) = contact_method_kind(field_type, lookups);

    Ok(NewContactMethod {
        source_id: field.id,
        contact: field.contact_id,
        kind,
        value,
        label,
    })
}

pub fn translate_note(note: &Note) -> Result<NewNote, Skip> {
    let body = note.body.clone().ok_or(Skip::Empty)?;
    Ok(NewNote {
        source_id: note.id,
        contact: note.contact_id,
        title: None,
        body,
        is_favorite: note.is_favorited,
        created_at: note.created_at,
    })
}

/// Calls have no destination of their own and become notes
pub fn translate_call(call: &Call) -> Result<NewNote, Skip> {
    let title = if call.contact_called {
        "Phone call (they called)"
    } else {
        "Phone call"
    };
    Ok(NewNote {
        source_id: call.id,
        contact: call.contact_id,
        title: Some(title.to_string()),
        body: call.content.clone().unwrap_or_default(),
        is_favorite: false,
        created_at: call.called_at,
    })
}

pub fn translate_activity(
    activity: &Activity,
    types: &AHashMap<i64, ActivityType>,
) -> Result<NewActivity, Skip> {
    let activity_type = activity
        .activity_type_id
        .and_then(|id| types.get(&id))
        .and_then(|t| t.name.clone());
    let title = activity
        .summary
        .clone()
        .or_else(|| activity_type.clone())
        .ok_or(Skip::Empty)?;

    Ok(NewActivity {
        source_id: activity.id,
        title,
        description: activity.description.clone(),
        activity_type,
        happened_on: activity.happened_at,
    })
}

pub fn translate_address(
    address: &Address,
    places: &AHashMap<i64, Place>,
) -> Result<NewAddress, Skip> {
    let place = address
        .place_id
        .and_then(|id| places.get(&id))
        .ok_or(Skip::MissingLookup)?;

    Ok(NewAddress {
        source_id: address.id,
        contact: address.contact_id,
        label: address.name.clone(),
        street: place.street.clone(),
        city: place.city.clone(),
        province: place.province.clone(),
        postal_code: place.postal_code.clone(),
        country: place.country.clone(),
        latitude: place.latitude,
        longitude: place.longitude,
    })
}

pub fn translate_life_event(
    event: &LifeEvent,
    types: &AHashMap<i64, LifeEventType>,
    categories: &AHashMap<i64, LifeEventCategory>,
    lookups: &Lookups,
) -> Result<NewLifeEvent, Skip> {
    let event_type = event.life_event_type_id.and_then(|id| types.get(&id));
    let category = event_type
        .and_then(|t| t.category_id)
        .and_then(|id| categories.get(&id));

    let title = event
        .name
        .clone()
        .or_else(|| event_type.and_then(|t| t.name.clone()))
        .ok_or(Skip::Empty)?;

    Ok(NewLifeEvent {
        source_id: event.id,
        contact: event.contact_id,
        category: lookups.life_event_category(category.and_then(|c| c.key.as_deref())),
        event_type: lookups.life_event_type(event_type.and_then(|t| t.key.as_deref())),
        title,
        note: event.note.clone(),
        happened_on: event.happened_at,
    })
}

pub fn translate_gift(gift: &Gift) -> Result<NewGift, Skip> {
    let name = gift.name.clone().ok_or(Skip::Empty)?;
    Ok(NewGift {
        source_id: gift.id,
        contact: gift.contact_id,
        name,
        description: gift.comment.clone(),
        url: gift.url.clone(),
        amount: gift.value,
        status: GiftStatus::from_monica(gift.status.as_deref()),
        occurred_on: gift.date,
    })
}

pub fn translate_reminder(reminder: &Reminder) -> Result<NewReminder, Skip> {
    let title = reminder.title.clone().ok_or(Skip::Empty)?;
    let recurrence = Recurrence::from_unit(reminder.frequency_type.as_deref());
    let interval = match recurrence {
        Recurrence::OneTime => 1,
        _ => reminder.frequency_number.filter(|n| *n > 0).unwrap_or(1),
    };

    Ok(NewReminder {
        source_id: reminder.id,
        contact: reminder.contact_id,
        title,
        description: reminder.description.clone(),
        next_due: reminder.initial_date,
        recurrence,
        interval,
    })
}
