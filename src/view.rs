use {
    crate::{
        events::Event,
        model::{Guest, Wish},
        rsvp, schema,
        visibility::{kids_allowed, Faq, Section, Visibility},
    },
    serde::Serialize,
};

pub static COUPLE: &str = "Daniel & Alicia";
pub static WEDDING_DATE: &str = "Saturday, September 19th, 2026";
/// Local start of the ceremony, counted down to on the intro section.
pub static COUNTDOWN_TARGET: &str = "2026-09-19T11:00:00";
static ANONYMOUS_GUEST: &str = "The Guest";

/// One event card of the RSVP form with the input names it posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RsvpCard {
    pub event: &'static str,
    pub rsvp_field: String,
    pub adults_field: String,
    /// Absent for adults-only events and for invitations without kids.
    pub kids_field: Option<String>,
    pub max_adults: u32,
    pub max_kids: u32,
}

impl RsvpCard {
    fn new(event: &'static Event, guest: &Guest) -> Self {
        let kids = kids_allowed(event, guest);
        Self {
            event: event.name,
            rsvp_field: rsvp::rsvp_key(event.name),
            adults_field: rsvp::adults_key(event.name),
            kids_field: kids.then(|| rsvp::kids_key(event.name)),
            max_adults: guest.max_adults.max(1),
            max_kids: if kids { guest.max_kids } else { 0 },
        }
    }
}

/// RSVP form cards for the events `guest` is invited to.
pub fn rsvp_cards(visibility: &Visibility, guest: &Guest) -> Vec<RsvpCard> {
    visibility
        .events(guest)
        .into_iter()
        .map(|event| RsvpCard::new(event, guest))
        .collect()
}

#[derive(Debug, Default, Serialize)]
pub struct Flags {
    pub schedule: bool,
    pub faq: bool,
    pub rsvp: bool,
    /// The guestbook form needs a guest to attach the wish to.
    pub wish_form: bool,
}

/// Everything `index.html` renders.
#[derive(Debug, Serialize)]
pub struct Page {
    pub couple: &'static str,
    pub wedding_date: &'static str,
    pub countdown_target: &'static str,
    pub has_guest: bool,
    pub guest_name: String,
    pub record_id: String,
    pub rsvp_status: String,
    pub responded: bool,
    pub wish: String,
    pub show: Flags,
    pub schedule: Vec<&'static Event>,
    pub faqs: Vec<Faq>,
    pub rsvp: Vec<RsvpCard>,
    pub wishes: Vec<Wish>,
}

impl Page {
    pub fn new(visibility: &Visibility, guest: Option<&Guest>, wishes: Vec<Wish>) -> Self {
        let sections = visibility.sections(guest);
        let show = Flags {
            schedule: sections.contains(&Section::Schedule),
            faq: sections.contains(&Section::Faq),
            rsvp: sections.contains(&Section::Rsvp),
            wish_form: guest.is_some(),
        };
        let schedule = match guest {
            Some(guest) if show.schedule => visibility.events(guest),
            _ => vec![],
        };
        let rsvp = match guest {
            Some(guest) if show.rsvp => rsvp_cards(visibility, guest),
            _ => vec![],
        };
        Self {
            couple: COUPLE,
            wedding_date: WEDDING_DATE,
            countdown_target: COUNTDOWN_TARGET,
            has_guest: guest.is_some(),
            guest_name: guest.map_or(ANONYMOUS_GUEST.to_string(), |g| g.name.clone()),
            record_id: guest.map(|g| g.record_id.clone()).unwrap_or_default(),
            rsvp_status: guest.map(|g| g.rsvp_status.clone()).unwrap_or_default(),
            responded: guest.map_or(false, |g| g.rsvp_status == schema::STATUS_RESPONDED),
            wish: guest.map(|g| g.wish.clone()).unwrap_or_default(),
            show,
            schedule,
            faqs: visibility.faqs(guest),
            rsvp,
            wishes,
        }
    }
}
