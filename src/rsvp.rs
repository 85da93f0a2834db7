//! Decoding of RSVP form posts into per-event answers and the update they
//! make to the guest's record.
//!
//! A post is a flat list of key/value pairs:
//!
//! - `recordId`: the guest's record, required
//! - `dietary`, `guestNames`: free text
//! - `rsvp_<event>`: `Attending` or `Declined`
//! - `count_adults_<event>`, `count_kids_<event>`: headcounts when attending
//!
//! Only events in the catalog are read, and only those the guest is invited
//! to are written. Each answer is folded into a single status string such as
//! `Attending (2 Adults, 1 Kids)` stored in the event's column.

use {
    crate::{
        error::SubmitError,
        events::{self, Event, EVENTS},
        guests::GuestResolver,
        model::Guest,
        schema,
        store::{Fields, RecordStore},
    },
    log::{error, info, warn},
    serde_json::Value,
    std::{fmt, str::FromStr},
};

pub const RECORD_ID: &str = "recordId";
pub const DIETARY: &str = "dietary";
pub const GUEST_NAMES: &str = "guestNames";
pub const RSVP_PREFIX: &str = "rsvp_";
pub const ADULTS_PREFIX: &str = "count_adults_";
pub const KIDS_PREFIX: &str = "count_kids_";

pub fn rsvp_key(event: &str) -> String {
    format!("{}{}", RSVP_PREFIX, event)
}

pub fn adults_key(event: &str) -> String {
    format!("{}{}", ADULTS_PREFIX, event)
}

pub fn kids_key(event: &str) -> String {
    format!("{}{}", KIDS_PREFIX, event)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Attending,
    Declined,
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attending => write!(f, "Attending"),
            Self::Declined => write!(f, "Declined"),
        }
    }
}

impl FromStr for Attendance {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Attending" => Ok(Self::Attending),
            "Declined" => Ok(Self::Declined),
            _ => Err(()),
        }
    }
}

/// The value stored for one event: `Declined`, `Attending`, or
/// `Attending (N Adults[, M Kids])`. The kids clause only appears for a
/// positive count.
pub fn compose_status(attendance: Attendance, adults: Option<u32>, kids: Option<u32>) -> String {
    match (attendance, adults) {
        (Attendance::Attending, Some(adults)) => match kids {
            Some(kids) if kids > 0 => format!("{} ({} Adults, {} Kids)", attendance, adults, kids),
            _ => format!("{} ({} Adults)", attendance, adults),
        },
        _ => attendance.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAnswer {
    pub event: &'static Event,
    pub attendance: Attendance,
    pub adults: Option<u32>,
    pub kids: Option<u32>,
}

impl EventAnswer {
    pub fn status(&self) -> String {
        compose_status(self.attendance, self.adults, self.kids)
    }

    /// Hold the headcounts to what the invitation allows.
    fn clamp(mut self, guest: &Guest) -> Self {
        self.adults = self.adults.map(|n| n.clamp(1, guest.max_adults.max(1)));
        self.kids = if self.event.kids_allowed && guest.max_kids > 0 {
            self.kids.map(|n| n.min(guest.max_kids))
        } else {
            None
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpSubmission {
    pub record_id: String,
    pub dietary: String,
    pub guest_names: Option<String>,
    pub answers: Vec<EventAnswer>,
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.as_str())
}

fn count(pairs: &[(String, String)], key: &str) -> Result<Option<u32>, SubmitError> {
    match first(pairs, key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| SubmitError::Validation(format!("Invalid headcount for {}", key))),
    }
}

impl RsvpSubmission {
    /// Read a form post. Fails before any I/O when `recordId` is missing or
    /// an answer can't be read.
    pub fn decode(pairs: &[(String, String)]) -> Result<Self, SubmitError> {
        let record_id = first(pairs, RECORD_ID).map(str::trim).unwrap_or_default();
        if record_id.is_empty() {
            return Err(SubmitError::Validation("Missing Record ID".to_string()));
        }
        if !schema::is_record_id(record_id) {
            warn!("Refusing RSVP for malformed record id {:?}", record_id);
            return Err(SubmitError::Validation("Invalid Record ID".to_string()));
        }

        for (key, _) in pairs {
            if let Some(name) = key.strip_prefix(RSVP_PREFIX) {
                if events::find(name).is_none() {
                    warn!("No column mapped for event: {:?}", name);
                }
            }
        }

        let mut answers = vec![];
        for event in EVENTS {
            let value = match first(pairs, &rsvp_key(event.name)) {
                Some(value) => value,
                None => continue,
            };
            let attendance: Attendance = value.parse().map_err(|_| {
                SubmitError::Validation(format!("Invalid RSVP for {}", event.name))
            })?;
            let (adults, kids) = match attendance {
                Attendance::Attending => (
                    count(pairs, &adults_key(event.name))?,
                    if event.kids_allowed {
                        count(pairs, &kids_key(event.name))?
                    } else {
                        None
                    },
                ),
                Attendance::Declined => (None, None),
            };
            answers.push(EventAnswer {
                event,
                attendance,
                adults,
                kids,
            });
        }

        Ok(Self {
            record_id: record_id.to_string(),
            dietary: first(pairs, DIETARY).unwrap_or_default().to_string(),
            guest_names: first(pairs, GUEST_NAMES)
                .map(str::trim)
                .filter(|names| !names.is_empty())
                .map(str::to_string),
            answers,
        })
    }

    /// Drop answers for events the guest isn't invited to and clamp counts.
    pub fn restrict_to(mut self, guest: &Guest) -> Self {
        self.answers = self
            .answers
            .into_iter()
            .filter(|answer| {
                let invited = guest.invited_to(answer.event.name);
                if !invited {
                    warn!(
                        "Ignoring answer for {} from {}, not invited",
                        answer.event.name, guest.record_id
                    );
                }
                invited
            })
            .map(|answer| answer.clamp(guest))
            .collect();
        self
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            schema::RSVP_STATUS.to_string(),
            Value::String(schema::STATUS_RESPONDED.to_string()),
        );
        fields.insert(
            schema::DIETARY.to_string(),
            Value::String(self.dietary.clone()),
        );
        if let Some(names) = &self.guest_names {
            fields.insert(schema::GUEST_NAMES.to_string(), Value::String(names.clone()));
        }
        for answer in &self.answers {
            fields.insert(answer.event.column.to_string(), Value::String(answer.status()));
        }
        fields
    }
}

/// Decode `pairs`, check them against the guest's invitation, and write the
/// result to the guest's record in one update.
pub async fn submit(
    store: &dyn RecordStore,
    guests: &GuestResolver,
    pairs: &[(String, String)],
) -> Result<(Guest, RsvpSubmission), SubmitError> {
    let submission = RsvpSubmission::decode(pairs)?;
    let guest = match store.get(&submission.record_id).await {
        Ok(Some(record)) => Guest::from(&record),
        Ok(None) => {
            warn!("RSVP for unknown record {}", submission.record_id);
            return Err(SubmitError::Validation("Guest not found".to_string()));
        }
        Err(error) => {
            error!("Guest fetch failed for {}: {}", submission.record_id, error);
            return Err(error.into());
        }
    };
    let submission = submission.restrict_to(&guest);
    let fields = submission.fields();
    info!("New RSVP! {} {:?}", submission.record_id, fields);
    if let Err(error) = store.update(&submission.record_id, fields).await {
        error!("RSVP update failed for {}: {}", submission.record_id, error);
        return Err(error.into());
    }
    guests.invalidate(&submission.record_id).await;
    Ok((guest, submission))
}
