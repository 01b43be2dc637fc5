//! Translation dictionaries between Monica vocabularies and ours.
//!
//! A [`Lookups`] value is built once per import and handed to every
//! translator; nothing here is consulted through globals.

use super::{ContactMethodKind, Gender};
use ahash::AHashMap;

/// Contact field type names Monica ships with, lowercased
const CONTACT_FIELD_KINDS: &[(&str, ContactMethodKind)] = &[
    ("email", ContactMethodKind::Email),
    ("e-mail", ContactMethodKind::Email),
    ("mail", ContactMethodKind::Email),
    ("phone", ContactMethodKind::Phone),
    ("mobile", ContactMethodKind::Phone),
    ("telephone", ContactMethodKind::Phone),
    ("website", ContactMethodKind::Website),
    ("url", ContactMethodKind::Website),
    ("facebook", ContactMethodKind::Facebook),
    ("twitter", ContactMethodKind::Twitter),
    ("instagram", ContactMethodKind::Instagram),
    ("linkedin", ContactMethodKind::Linkedin),
    ("whatsapp", ContactMethodKind::Whatsapp),
    ("telegram", ContactMethodKind::Telegram),
];

/// Directed relationship types as (forward, reverse). A relationship
/// typed with the reverse name is stored as the forward one, contacts swapped.
const RELATIONSHIP_PAIRS: &[(&str, &str)] = &[
    ("parent", "child"),
    ("grandparent", "grandchild"),
    ("stepparent", "stepchild"),
    ("uncle", "nephew"),
    ("godfather", "godson"),
    ("boss", "subordinate"),
    ("mentor", "protege"),
    ("inlovewith", "lovedby"),
];

const LIFE_EVENT_CATEGORIES: &[(&str, &str)] = &[
    ("work_education", "work_and_education"),
    ("family_relationships", "family_and_relationships"),
    ("home_living", "home_and_living"),
    ("health_wellness", "health_and_wellness"),
    ("travel_experiences", "travel_and_experiences"),
];

const LIFE_EVENT_TYPES: &[&str] = &[
    "new_job",
    "retirement",
    "new_school",
    "study_abroad",
    "volunteer_work",
    "published_book_or_paper",
    "military_service",
    "new_relationship",
    "engagement",
    "marriage",
    "anniversary",
    "expecting_a_baby",
    "new_child",
    "new_family_member",
    "new_pet",
    "end_of_relationship",
    "loss_of_a_loved_one",
    "moved",
    "bought_a_home",
    "home_improvement",
    "holidays",
    "new_vehicle",
    "new_roommate",
    "overcame_an_illness",
    "quit_a_habit",
    "new_eating_habits",
    "weight_loss",
    "wear_glass_or_contact",
    "broken_bone",
    "removed_braces",
    "surgery",
    "dentist",
    "new_sport",
    "new_hobby",
    "new_instrument",
    "new_language",
    "tattoo_or_piercing",
    "new_license",
    "travel",
    "achievement_or_award",
    "changed_beliefs",
    "first_word",
    "first_kiss",
];

const GENDER_CODES: &[(&str, Gender)] = &[
    ("m", Gender::Male),
    ("f", Gender::Female),
    ("n", Gender::NonBinary),
    ("u", Gender::PreferNotToSay),
    ("o", Gender::Other),
];

const GENDER_NAMES: &[(&str, Gender)] = &[
    ("man", Gender::Male),
    ("male", Gender::Male),
    ("woman", Gender::Female),
    ("female", Gender::Female),
    ("non-binary", Gender::NonBinary),
    ("nonbinary", Gender::NonBinary),
    ("rather not say", Gender::PreferNotToSay),
    ("prefer not to say", Gender::PreferNotToSay),
];

/// Fallback category for unknown life event category keys
pub const OTHER_LIFE_EVENT_CATEGORY: &str = "other";

/// Event type used when the Monica type key is not one we know
pub const CUSTOM_LIFE_EVENT_TYPE: &str = "custom";

#[derive(Debug, Clone)]
pub struct Lookups {
    contact_field_kinds: AHashMap<String, ContactMethodKind>,
    relationship_pairs: &'static [(&'static str, &'static str)],
    life_event_categories: &'static [(&'static str, &'static str)],
    life_event_types: &'static [&'static str],
    gender_codes: &'static [(&'static str, Gender)],
    gender_names: &'static [(&'static str, Gender)],
}

impl Default for Lookups {
    fn default() -> Self {
        Self {
            contact_field_kinds: CONTACT_FIELD_KINDS
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
            relationship_pairs: RELATIONSHIP_PAIRS,
            life_event_categories: LIFE_EVENT_CATEGORIES,
            life_event_types: LIFE_EVENT_TYPES,
            gender_codes: GENDER_CODES,
            gender_names: GENDER_NAMES,
        }
    }
}

impl Lookups {
    /// Extend (or override) the contact field name dictionary
    pub fn with_contact_field_kinds<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (S, ContactMethodKind)>,
        S: AsRef<str>,
    {
        for (name, kind) in extra {
            self.contact_field_kinds
                .insert(name.as_ref().trim().to_lowercase(), kind);
        }
        self
    }

    /// Contact method kind for a field type name or type hint
    pub fn contact_method_kind(&self, name: &str) -> Option<ContactMethodKind> {
        self.contact_field_kinds
            .get(&name.trim().to_lowercase())
            .copied()
    }

    /// Canonical name of a relationship type and whether the two contacts
    /// must be swapped to read it in the canonical direction.
    ///
    /// Types outside the dictionary fall back to the reverse name from the
    /// export: the lexicographically smaller of the pair is canonical.
    pub fn canonical_relationship(&self, name: &str, reverse: Option<&str>) -> (String, bool) {
        let name = name.trim().to_lowercase();

        for (forward, backward) in self.relationship_pairs {
            if name == *forward {
                return (name, false);
            }
            if name == *backward {
                return (forward.to_string(), true);
            }
        }

        match reverse.map(|r| r.trim().to_lowercase()) {
            Some(reverse) if !reverse.is_empty() && reverse < name => (reverse, true),
            _ => (name, false),
        }
    }

    /// Destination category for a Monica life event category key
    pub fn life_event_category(&self, key: Option<&str>) -> &'static str {
        key.and_then(|k| {
            self.life_event_categories
                .iter()
                .find(|(monica, _)| *monica == k)
                .map(|(_, ours)| *ours)
        })
        .unwrap_or(OTHER_LIFE_EVENT_CATEGORY)
    }

    /// Destination event type for a Monica life event type key
    pub fn life_event_type(&self, key: Option<&str>) -> &'static str {
        key.and_then(|k| self.life_event_types.iter().find(|t| **t == k).copied())
            .unwrap_or(CUSTOM_LIFE_EVENT_TYPE)
    }

    /// Gender from a Monica gender row: code first, then name
    pub fn gender(&self, code: Option<&str>, name: Option<&str>) -> Gender {
        let by_code = code.and_then(|c| {
            let c = c.trim().to_lowercase();
            self.gender_codes
                .iter()
                .find(|(k, _)| *k == c)
                .map(|(_, g)| *g)
        });
        let by_name = || {
            name.and_then(|n| {
                let n = n.trim().to_lowercase();
                self.gender_names
                    .iter()
                    .find(|(k, _)| *k == n)
                    .map(|(_, g)| *g)
            })
        };

        by_code.or_else(by_name).unwrap_or(Gender::Other)
    }
}
