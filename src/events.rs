use serde::Serialize;

/// One occasion guests can be invited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: &'static str,
    /// Column holding this event's answer in the guests table.
    #[serde(skip)]
    pub column: &'static str,
    pub kids_allowed: bool,
    /// Only set for events that don't fall on the wedding day.
    pub date: Option<&'static str>,
    pub time: &'static str,
    pub location: &'static str,
    pub address: &'static str,
    pub map_url: &'static str,
}

pub static EVENTS: &[Event] = &[
    Event {
        name: "Holy Matrimony",
        column: "RSVP - Ceremony",
        kids_allowed: true,
        date: None,
        time: "11:00 AM",
        location: "IREC Sydney",
        address: "556-558 Botany Rd, Alexandria NSW 2015",
        map_url: "https://maps.app.goo.gl/PHMmpWTMZLxdkQ1fA",
    },
    Event {
        name: "Dinner Reception",
        column: "RSVP - Reception",
        kids_allowed: false,
        date: None,
        time: "5:30 PM",
        location: "Cropley House",
        address: "84 Watkins Rd, Baulkham Hills NSW 2153",
        map_url: "https://maps.app.goo.gl/pd7xcEoEzRDJL7Lv6",
    },
    Event {
        name: "Indonesia Celebration",
        column: "RSVP - Indo Celebration",
        kids_allowed: true,
        date: Some("Saturday, November 7, 2026"),
        time: "7:00 PM",
        location: "Jakarta Garden Venue",
        address: "Jl. Garden No. 5, Jakarta",
        map_url: "https://goo.gl/maps/example3",
    },
];

pub const HOLY_MATRIMONY: &str = "Holy Matrimony";
pub const DINNER_RECEPTION: &str = "Dinner Reception";
pub const INDONESIA_CELEBRATION: &str = "Indonesia Celebration";

pub fn find(name: &str) -> Option<&'static Event> {
    EVENTS.iter().find(|event| event.name == name)
}

/// Known events from `names`, in the order given. Unknown names are dropped.
pub fn resolve<'a, I>(names: I) -> Vec<&'static Event>
where
    I: IntoIterator<Item = &'a String>,
{
    names.into_iter().filter_map(|name| find(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_unique() {
        for (i, a) in EVENTS.iter().enumerate() {
            for b in &EVENTS[i + 1..] {
                assert_ne!(a.column, b.column);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn resolve_keeps_order_and_drops_unknown() {
        let names = vec![
            DINNER_RECEPTION.to_string(),
            "Afterparty".to_string(),
            HOLY_MATRIMONY.to_string(),
        ];
        let events = resolve(&names);
        assert_eq!(
            events.iter().map(|e| e.name).collect::<Vec<_>>(),
            vec![DINNER_RECEPTION, HOLY_MATRIMONY]
        );
    }

    #[test]
    fn dinner_is_adults_only() {
        assert!(!find(DINNER_RECEPTION).unwrap().kids_allowed);
        assert!(find(HOLY_MATRIMONY).unwrap().kids_allowed);
        assert!(find(INDONESIA_CELEBRATION).unwrap().kids_allowed);
    }
}
