use {
    crate::{schema, store::Record},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub record_id: String,
    pub code: String,
    pub name: String,
    pub relationship: String,
    pub group: String,
    pub allowed_events: Vec<String>,
    pub max_adults: u32,
    pub max_kids: u32,
    pub rsvp_status: String,
    pub wish: String,
}

impl Guest {
    pub fn invited_to(&self, event: &str) -> bool {
        self.allowed_events.iter().any(|name| name == event)
    }
}

/// Greeting name when set, otherwise the formal guest name.
pub fn display_name(record: &Record) -> String {
    record
        .str_field(schema::GREETING_NAME)
        .or_else(|| record.str_field(schema::GUEST_NAME))
        .unwrap_or_default()
        .to_string()
}

impl From<&Record> for Guest {
    fn from(record: &Record) -> Self {
        let text = |name: &str| record.str_field(name).unwrap_or_default().to_string();
        Self {
            record_id: record.id.clone(),
            code: text(schema::GUEST_CODE),
            name: display_name(record),
            relationship: text(schema::RELATIONSHIP),
            group: text(schema::GROUP),
            allowed_events: record.list_field(schema::ALLOWED_EVENTS),
            // A stored zero also means "not set" for adults.
            max_adults: record
                .u32_field(schema::MAX_ADULTS)
                .filter(|max| *max > 0)
                .unwrap_or(1),
            max_kids: record.u32_field(schema::MAX_KIDS).unwrap_or(0),
            rsvp_status: record
                .str_field(schema::RSVP_STATUS)
                .unwrap_or(schema::STATUS_PENDING)
                .to_string(),
            wish: text(schema::WISH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub name: String,
    pub message: String,
}

impl From<&Record> for Wish {
    fn from(record: &Record) -> Self {
        Self {
            name: display_name(record),
            message: record.str_field(schema::WISH).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// Invitation code.
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WishParams {
    #[serde(rename = "recordId", default)]
    pub record_id: String,
    #[serde(default)]
    pub wish: String,
}

/// Reply to a form post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::store::Fields, serde_json::json};

    fn record(fields: serde_json::Value) -> Record {
        Record {
            id: "rec1".to_string(),
            fields: serde_json::from_value::<Fields>(fields).unwrap(),
        }
    }

    #[test]
    fn guest_defaults() {
        let guest = Guest::from(&record(json!({ "Guest": "John Smith", "Guest ID": "js01" })));
        assert_eq!(guest.record_id, "rec1");
        assert_eq!(guest.code, "js01");
        assert_eq!(guest.name, "John Smith");
        assert_eq!(guest.max_adults, 1);
        assert_eq!(guest.max_kids, 0);
        assert_eq!(guest.rsvp_status, "Pending");
        assert!(guest.allowed_events.is_empty());
        assert_eq!(guest.wish, "");
    }

    #[test]
    fn greeting_name_preferred() {
        let guest = Guest::from(&record(json!({
            "Guest": "John Smith",
            "Greeting Name": "Johnny",
            "Adult Count": 0,
            "Kids Count": 3,
            "RSVP Status": "Responded",
        })));
        assert_eq!(guest.name, "Johnny");
        assert_eq!(guest.max_adults, 1);
        assert_eq!(guest.max_kids, 3);
        assert_eq!(guest.rsvp_status, "Responded");
    }

    #[test]
    fn wish_projection() {
        let wish = Wish::from(&record(json!({ "Guest": "John Smith", "Wish": "Congrats" })));
        assert_eq!(
            wish,
            Wish {
                name: "John Smith".to_string(),
                message: "Congrats".to_string()
            }
        );
    }

    #[test]
    fn outcome_json() {
        assert_eq!(
            serde_json::to_string(&Outcome::ok()).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Outcome::failed("Database Error")).unwrap(),
            r#"{"success":false,"message":"Database Error"}"#
        );
    }
}
