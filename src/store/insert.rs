//! Row writers. Each takes already-resolved destination ids and returns the
//! id of the row it created.

use crate::translate::{
    NewActivity, NewAddress, NewContact, NewContactMethod, NewGift, NewLifeEvent, NewNote,
    NewReminder, NewTag,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn fmt_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn fmt_created(at: Option<NaiveDateTime>) -> String {
    at.unwrap_or_else(|| Utc::now().naive_utc())
        .format(DATETIME_FORMAT)
        .to_string()
}

pub fn insert_contact(conn: &Connection, account_id: &str, contact: &NewContact) -> Result<String> {
    let id = new_id();
    let birthday = contact.birthday.as_ref();
    let month_day = birthday.and_then(|b| b.month_day());

    conn.execute(
        "INSERT INTO contacts (
            id, account_id, first_name, middle_name, last_name, nickname, gender,
            birthday, birthday_month, birthday_day, birth_year_approx, deceased_on,
            status, is_favorite, how_we_met, job_title, company, food_preferences,
            description, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            id,
            account_id,
            contact.first_name,
            contact.middle_name,
            contact.last_name,
            contact.nickname,
            contact.gender.map(|g| g.as_str()),
            fmt_date(birthday.and_then(|b| b.date())),
            month_day.map(|(m, _)| m),
            month_day.map(|(_, d)| d),
            birthday.and_then(|b| b.approximate_year()),
            fmt_date(contact.deceased_on),
            contact.status.as_str(),
            contact.is_favorite,
            contact.how_we_met,
            contact.job_title,
            contact.company,
            contact.food_preferences,
            contact.description,
            fmt_created(contact.created_at),
        ],
    )?;
    Ok(id)
}

pub fn insert_tag(conn: &Connection, account_id: &str, tag: &NewTag) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO tags (id, account_id, name) VALUES (?1, ?2, ?3)",
        params![id, account_id, tag.name],
    )?;
    Ok(id)
}

pub fn link_tag(conn: &Connection, account_id: &str, contact_id: &str, tag_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO contact_tags (account_id, contact_id, tag_id) VALUES (?1, ?2, ?3)",
        params![account_id, contact_id, tag_id],
    )?;
    Ok(())
}

pub fn insert_contact_method(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    method: &NewContactMethod,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO contact_methods (id, account_id, contact_id, kind, value, label)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            account_id,
            contact_id,
            method.kind.as_str(),
            method.value,
            method.label
        ],
    )?;
    Ok(id)
}

pub fn insert_note(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    note: &NewNote,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO notes (id, account_id, contact_id, title, body, is_favorite, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            account_id,
            contact_id,
            note.title,
            note.body,
            note.is_favorite,
            fmt_created(note.created_at),
        ],
    )?;
    Ok(id)
}

pub fn insert_activity(conn: &Connection, account_id: &str, activity: &NewActivity) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO activities (id, account_id, title, description, activity_type, happened_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            account_id,
            activity.title,
            activity.description,
            activity.activity_type,
            fmt_date(activity.happened_on),
        ],
    )?;
    Ok(id)
}

pub fn add_participant(
    conn: &Connection,
    account_id: &str,
    activity_id: &str,
    contact_id: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity_participants (account_id, activity_id, contact_id) VALUES (?1, ?2, ?3)",
        params![account_id, activity_id, contact_id],
    )?;
    Ok(())
}

pub fn insert_relationship(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    related_contact_id: &str,
    kind: &str,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO relationships (id, account_id, contact_id, related_contact_id, relationship_type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, account_id, contact_id, related_contact_id, kind],
    )?;
    Ok(id)
}

pub fn insert_address(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    address: &NewAddress,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO addresses (
            id, account_id, contact_id, label, street, city, province, postal_code,
            country, latitude, longitude
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id,
            account_id,
            contact_id,
            address.label,
            address.street,
            address.city,
            address.province,
            address.postal_code,
            address.country,
            address.latitude,
            address.longitude,
        ],
    )?;
    Ok(id)
}

pub fn insert_life_event(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    event: &NewLifeEvent,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO life_events (id, account_id, contact_id, category, event_type, title, note, happened_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            account_id,
            contact_id,
            event.category,
            event.event_type,
            event.title,
            event.note,
            fmt_date(event.happened_on),
        ],
    )?;
    Ok(id)
}

pub fn insert_gift(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    gift: &NewGift,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO gifts (id, account_id, contact_id, name, description, url, amount, status, occurred_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            account_id,
            contact_id,
            gift.name,
            gift.description,
            gift.url,
            gift.amount,
            gift.status.as_str(),
            fmt_date(gift.occurred_on),
        ],
    )?;
    Ok(id)
}

pub fn insert_reminder(
    conn: &Connection,
    account_id: &str,
    contact_id: &str,
    reminder: &NewReminder,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO reminders (
            id, account_id, contact_id, title, description, next_due, recurrence, recurrence_interval
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            account_id,
            contact_id,
            reminder.title,
            reminder.description,
            fmt_date(reminder.next_due),
            reminder.recurrence.as_str(),
            reminder.interval,
        ],
    )?;
    Ok(id)
}
