//! Access to the hosted guests table.

mod airtable;
mod memory;

pub use {airtable::AirtableStore, memory::MemoryStore};

#[cfg(test)]
pub(crate) use memory::test::{test_store, SEED};

use {
    async_trait::async_trait,
    awc::error::{JsonPayloadError, PayloadError, SendRequestError},
    csv::Error as CsvError,
    derive_more::Display,
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    std::io::Error as IoError,
};

pub type Fields = Map<String, Value>;

/// One row of the guests table, as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn u32_field(&self, name: &str) -> Option<u32> {
        self.fields
            .get(name)
            .and_then(|value| {
                value
                    .as_u64()
                    .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            })
            .and_then(|value| u32::try_from(value).ok())
    }

    pub fn list_field(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => vec![],
        }
    }
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "Error sending request: {}", _0)]
    Http(String),
    #[display(fmt = "Error building query: {}", _0)]
    Query(String),
    #[display(fmt = "Upstream returned {}: {}", _0, _1)]
    Status(u16, String),
    #[display(fmt = "Error decoding response: {}", _0)]
    Decode(String),
    #[display(fmt = "Not a record id: {:?}", _0)]
    RecordId(String),
    #[display(fmt = "Invalid store url: {}", _0)]
    Url(url::ParseError),
    #[display(fmt = "Store credentials are not configured")]
    MissingCredentials,
    #[display(fmt = "Error with csv")]
    Csv(CsvError),
    #[display(fmt = "Error with io")]
    Io(IoError),
}

impl std::error::Error for StoreError {}

impl From<SendRequestError> for StoreError {
    fn from(error: SendRequestError) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<JsonPayloadError> for StoreError {
    fn from(error: JsonPayloadError) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<PayloadError> for StoreError {
    fn from(error: PayloadError) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(error: url::ParseError) -> Self {
        Self::Url(error)
    }
}

impl From<CsvError> for StoreError {
    fn from(error: CsvError) -> Self {
        Self::Csv(error)
    }
}

impl From<IoError> for StoreError {
    fn from(error: IoError) -> Self {
        Self::Io(error)
    }
}

/// The operations the site needs from the guests table. Every call is a
/// single attempt; callers decide how to degrade on failure.
#[async_trait(?Send)]
pub trait RecordStore {
    /// Look up the record whose invitation code equals `code`.
    async fn find_by_code(&self, code: &str) -> Result<Option<Record>, StoreError>;

    async fn get(&self, record_id: &str) -> Result<Option<Record>, StoreError>;

    /// Apply `fields` to one record in a single batched update.
    async fn update(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Every record with a non-empty wish, newest wish first.
    async fn list_wishes(&self) -> Result<Vec<Record>, StoreError>;
}
