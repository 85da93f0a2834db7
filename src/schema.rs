//! Column names of the `Guests` table. These must match the hosted table's
//! field names exactly; a mismatch only shows up as an upstream error.

pub const GUEST_CODE: &str = "Guest ID";
pub const GUEST_NAME: &str = "Guest";
pub const GREETING_NAME: &str = "Greeting Name";
pub const RELATIONSHIP: &str = "Relationship";
pub const GROUP: &str = "Group";
pub const ALLOWED_EVENTS: &str = "Allowed Events";
pub const MAX_ADULTS: &str = "Adult Count";
pub const MAX_KIDS: &str = "Kids Count";
pub const RSVP_STATUS: &str = "RSVP Status";
pub const DIETARY: &str = "Dietary Restrictions";
pub const GUEST_NAMES: &str = "Guest Names";
pub const WISH: &str = "Wish";
/// Last-modified time of the `Wish` column.
pub const WISH_TIME: &str = "Wish Time";

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_RESPONDED: &str = "Responded";

/// Record ids look like `recXXXXXXXXXXXXXX`. Anything else is refused before
/// it reaches a request path.
pub fn is_record_id(id: &str) -> bool {
    id.strip_prefix("rec")
        .map_or(false, |rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}
