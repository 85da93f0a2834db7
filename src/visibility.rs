use {
    crate::{
        events::{self, Event, DINNER_RECEPTION, HOLY_MATRIMONY, INDONESIA_CELEBRATION},
        model::Guest,
    },
    serde::Serialize,
};

/// Sections of the page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Intro,
    Bios,
    Schedule,
    Faq,
    Rsvp,
    Guestbook,
    Livestream,
    Thanks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Everyone,
    /// Guests whose invitation includes children.
    WithKids,
    WeddingParty,
    NotWeddingParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

struct FaqEntry {
    faq: Faq,
    event: Option<&'static str>,
    audience: Audience,
}

const fn entry(
    question: &'static str,
    answer: &'static str,
    event: Option<&'static str>,
    audience: Audience,
) -> FaqEntry {
    FaqEntry {
        faq: Faq { question, answer },
        event,
        audience,
    }
}

static FAQS: &[FaqEntry] = &[
    entry(
        "Is there a dress code?",
        "Yes, strictly Black Tie. Please dress to impress!",
        None,
        Audience::NotWeddingParty,
    ),
    entry(
        "Is there a dress code?",
        "As part of the wedding party, please wear the outfit fitted for you. \
         Hair and makeup start at 7:30 AM on the day.",
        None,
        Audience::WeddingParty,
    ),
    entry(
        "Where do I park for the Ceremony?",
        "Limited parking is available at the venue. We recommend arriving 15 minutes early.",
        Some(HOLY_MATRIMONY),
        Audience::Everyone,
    ),
    entry(
        "Can I bring my children to the Ceremony?",
        "Of course! Little ones are welcome at the Ceremony.",
        Some(HOLY_MATRIMONY),
        Audience::WithKids,
    ),
    entry(
        "Where do I park for the Reception?",
        "Valet parking is available at the entrance.",
        Some(DINNER_RECEPTION),
        Audience::Everyone,
    ),
    entry(
        "Are kids invited to the Dinner?",
        "We love your little ones, but the Dinner Reception is an adults-only affair.",
        Some(DINNER_RECEPTION),
        Audience::WithKids,
    ),
    entry(
        "Do I need a Visa for Jakarta?",
        "Please check your local embassy requirements. Most guests can get a Visa on Arrival.",
        Some(INDONESIA_CELEBRATION),
        Audience::Everyone,
    ),
];

/// Whether `guest` gets kid inputs and copy for `event`.
pub fn kids_allowed(event: &Event, guest: &Guest) -> bool {
    event.kids_allowed && guest.max_kids > 0
}

/// Rules deciding which parts of the page a guest sees.
#[derive(Debug, Clone)]
pub struct Visibility {
    /// Relationships or groups that don't need to RSVP.
    pub rsvp_exempt: Vec<String>,
    /// Relationships or groups that get wedding party copy.
    pub wedding_party: Vec<String>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            rsvp_exempt: vec!["Immediate Family".to_string()],
            wedding_party: vec!["Wedding Party".to_string()],
        }
    }
}

fn in_category(guest: &Guest, categories: &[String]) -> bool {
    categories.iter().filter(|c| !c.is_empty()).any(|category| {
        category.eq_ignore_ascii_case(guest.relationship.trim())
            || category.eq_ignore_ascii_case(guest.group.trim())
    })
}

impl Visibility {
    pub fn new(rsvp_exempt: Vec<String>, wedding_party: Vec<String>) -> Self {
        Self {
            rsvp_exempt,
            wedding_party,
        }
    }

    pub fn rsvp_exempt(&self, guest: &Guest) -> bool {
        in_category(guest, &self.rsvp_exempt)
    }

    pub fn wedding_party(&self, guest: &Guest) -> bool {
        in_category(guest, &self.wedding_party)
    }

    /// Events from the catalog the guest is invited to.
    pub fn events(&self, guest: &Guest) -> Vec<&'static Event> {
        events::resolve(&guest.allowed_events)
    }

    pub fn sections(&self, guest: Option<&Guest>) -> Vec<Section> {
        let mut sections = vec![Section::Intro, Section::Bios];
        if let Some(guest) = guest {
            let has_events = !self.events(guest).is_empty();
            if has_events {
                sections.push(Section::Schedule);
            }
            sections.push(Section::Faq);
            if has_events && !self.rsvp_exempt(guest) {
                sections.push(Section::Rsvp);
            }
        } else {
            sections.push(Section::Faq);
        }
        sections.extend([Section::Guestbook, Section::Livestream, Section::Thanks]);
        sections
    }

    /// FAQ entries for `guest`. Without a guest only the general entries are
    /// shown.
    pub fn faqs(&self, guest: Option<&Guest>) -> Vec<Faq> {
        FAQS.iter()
            .filter(|entry| match guest {
                None => entry.event.is_none() && entry.audience != Audience::WeddingParty,
                Some(guest) => {
                    entry.event.map_or(true, |event| guest.invited_to(event))
                        && match entry.audience {
                            Audience::Everyone => true,
                            Audience::WithKids => guest.max_kids > 0,
                            Audience::WeddingParty => self.wedding_party(guest),
                            Audience::NotWeddingParty => !self.wedding_party(guest),
                        }
                }
            })
            .map(|entry| entry.faq)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(events: &[&str], max_kids: u32, relationship: &str, group: &str) -> Guest {
        Guest {
            record_id: "rec1".to_string(),
            code: "abc".to_string(),
            name: "Test".to_string(),
            relationship: relationship.to_string(),
            group: group.to_string(),
            allowed_events: events.iter().map(|e| e.to_string()).collect(),
            max_adults: 2,
            max_kids,
            rsvp_status: "Pending".to_string(),
            wish: String::new(),
        }
    }

    fn questions(faqs: &[Faq]) -> Vec<&'static str> {
        faqs.iter().map(|faq| faq.question).collect()
    }

    #[test]
    fn sections_without_guest() {
        let sections = Visibility::default().sections(None);
        assert!(!sections.contains(&Section::Rsvp));
        assert!(!sections.contains(&Section::Schedule));
        assert_eq!(sections.first(), Some(&Section::Intro));
        assert_eq!(sections.last(), Some(&Section::Thanks));
    }

    #[test]
    fn sections_for_guest() {
        let visibility = Visibility::default();
        let sections = visibility.sections(Some(&guest(&[HOLY_MATRIMONY], 0, "Friend", "")));
        assert_eq!(
            sections,
            vec![
                Section::Intro,
                Section::Bios,
                Section::Schedule,
                Section::Faq,
                Section::Rsvp,
                Section::Guestbook,
                Section::Livestream,
                Section::Thanks
            ]
        );

        let family = guest(&[HOLY_MATRIMONY], 0, "Grandmother", "immediate family");
        let sections = visibility.sections(Some(&family));
        assert!(sections.contains(&Section::Schedule));
        assert!(!sections.contains(&Section::Rsvp));

        let nothing = guest(&["Afterparty"], 0, "Friend", "");
        assert!(!visibility.sections(Some(&nothing)).contains(&Section::Rsvp));
    }

    #[test]
    fn event_faqs_follow_invitation() {
        let visibility = Visibility::default();
        let faqs = visibility.faqs(Some(&guest(&[INDONESIA_CELEBRATION], 0, "", "")));
        assert_eq!(
            questions(&faqs),
            vec!["Is there a dress code?", "Do I need a Visa for Jakarta?"]
        );
    }

    #[test]
    fn kid_faqs_need_kids() {
        let visibility = Visibility::default();
        let events = [HOLY_MATRIMONY, DINNER_RECEPTION];
        let without = questions(&visibility.faqs(Some(&guest(&events, 0, "", ""))));
        assert!(!without.contains(&"Are kids invited to the Dinner?"));
        assert!(!without.contains(&"Can I bring my children to the Ceremony?"));

        let with = questions(&visibility.faqs(Some(&guest(&events, 2, "", ""))));
        assert!(with.contains(&"Are kids invited to the Dinner?"));
        assert!(with.contains(&"Can I bring my children to the Ceremony?"));
    }

    #[test]
    fn wedding_party_gets_own_dress_code() {
        let visibility = Visibility::default();
        let general = visibility.faqs(None);
        assert_eq!(general.len(), 1);
        assert!(general[0].answer.contains("Black Tie"));

        let party = visibility.faqs(Some(&guest(&[HOLY_MATRIMONY], 0, "Friend", "Wedding Party")));
        let dress: Vec<_> = party
            .iter()
            .filter(|faq| faq.question == "Is there a dress code?")
            .collect();
        assert_eq!(dress.len(), 1);
        assert!(dress[0].answer.contains("wedding party"));
    }

    #[test]
    fn kid_inputs_need_kid_event_and_allowance() {
        let holy = events::find(HOLY_MATRIMONY).unwrap();
        let dinner = events::find(DINNER_RECEPTION).unwrap();
        let family = guest(&[HOLY_MATRIMONY, DINNER_RECEPTION], 2, "", "");
        assert!(kids_allowed(holy, &family));
        assert!(!kids_allowed(dinner, &family));
        let couple = guest(&[HOLY_MATRIMONY], 0, "", "");
        assert!(!kids_allowed(holy, &couple));
    }
}
