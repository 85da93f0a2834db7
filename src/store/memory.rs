use {
    super::{Fields, Record, RecordStore, StoreError},
    crate::schema,
    async_trait::async_trait,
    chrono::{DateTime, SecondsFormat, Utc},
    csv::ReaderBuilder,
    serde::Deserialize,
    serde_json::Value,
    std::{
        fs::File,
        io::Read,
        path::Path,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    },
    tokio::sync::RwLock,
};

/// One guest row of a seed file. `allowed_events` is `;`-separated.
#[derive(Debug, Deserialize)]
struct GuestRow {
    record_id: String,
    code: String,
    guest: String,
    #[serde(default)]
    greeting_name: String,
    #[serde(default)]
    relationship: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    allowed_events: String,
    #[serde(default)]
    max_adults: Option<u32>,
    #[serde(default)]
    max_kids: Option<u32>,
    #[serde(default)]
    rsvp_status: String,
    #[serde(default)]
    wish: String,
}

impl From<GuestRow> for Record {
    fn from(row: GuestRow) -> Self {
        let mut fields = Fields::new();
        let mut text = |name: &str, value: String| {
            if !value.is_empty() {
                fields.insert(name.to_string(), Value::String(value));
            }
        };
        text(schema::GUEST_CODE, row.code);
        text(schema::GUEST_NAME, row.guest);
        text(schema::GREETING_NAME, row.greeting_name);
        text(schema::RELATIONSHIP, row.relationship);
        text(schema::GROUP, row.group);
        text(schema::RSVP_STATUS, row.rsvp_status);
        let has_wish = !row.wish.is_empty();
        text(schema::WISH, row.wish);
        let events: Vec<Value> = row
            .allowed_events
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Value::String(name.to_string()))
            .collect();
        if !events.is_empty() {
            fields.insert(schema::ALLOWED_EVENTS.to_string(), Value::Array(events));
        }
        if let Some(max) = row.max_adults {
            fields.insert(schema::MAX_ADULTS.to_string(), max.into());
        }
        if let Some(max) = row.max_kids {
            fields.insert(schema::MAX_KIDS.to_string(), max.into());
        }
        if has_wish {
            fields.insert(schema::WISH_TIME.to_string(), Value::String(now()));
        }
        Record { id: row.record_id, fields }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn wish_time(record: &Record) -> Option<DateTime<Utc>> {
    record
        .str_field(schema::WISH_TIME)
        .and_then(|time| DateTime::parse_from_rfc3339(time).ok())
        .map(|time| time.with_timezone(&Utc))
}

/// In-process guests table seeded from a CSV file, used instead of the
/// hosted table when running with mock data. Clones share the same rows.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<Record>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            calls: Arc::default(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = vec![];
        for result in reader.deserialize() {
            let row: GuestRow = result?;
            records.push(Record::from(row));
        }
        Ok(Self::new(records))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_reader(File::open(path)?)
    }

    /// Number of store operations served so far.
    #[cfg(test)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Record>, StoreError> {
        self.record_call();
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|record| record.str_field(schema::GUEST_CODE) == Some(code))
            .cloned())
    }

    async fn get(&self, record_id: &str) -> Result<Option<Record>, StoreError> {
        self.record_call();
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == record_id).cloned())
    }

    async fn update(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError> {
        self.record_call();
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record.id == record_id)
            .ok_or_else(|| {
                StoreError::Status(404, format!("Could not find record {}", record_id))
            })?;
        let touches_wish = fields.contains_key(schema::WISH);
        record.fields.extend(fields);
        if touches_wish {
            record
                .fields
                .insert(schema::WISH_TIME.to_string(), Value::String(now()));
        }
        Ok(record.clone())
    }

    async fn list_wishes(&self) -> Result<Vec<Record>, StoreError> {
        self.record_call();
        let records = self.records.read().await;
        let mut wishes: Vec<Record> = records
            .iter()
            .filter(|record| record.str_field(schema::WISH).is_some())
            .cloned()
            .collect();
        wishes.sort_by(|a, b| wish_time(b).cmp(&wish_time(a)));
        Ok(wishes)
    }
}

#[cfg(test)]
pub mod test {
    use {super::*, std::io::Write, tempfile::NamedTempFile};

    pub static SEED: &str = "\
record_id,code,guest,greeting_name,relationship,group,allowed_events,max_adults,max_kids,rsvp_status,wish
rec001,agk77,Andrew Gunawan Kusuma,Andrew & Kim,Friend,,Holy Matrimony;Dinner Reception,2,0,,
rec002,fam01,The Tan Family,,Cousin,,Holy Matrimony;Indonesia Celebration,2,2,Pending,
rec003,imm01,Oma Lestari,Oma,Grandmother,Immediate Family,Holy Matrimony;Dinner Reception;Indonesia Celebration,1,0,,Selamat!
rec004,wp001,Jessica Lee,Jess,Friend,Wedding Party,Holy Matrimony;Dinner Reception,1,0,,
";

    pub fn test_store() -> MemoryStore {
        MemoryStore::from_reader(SEED.as_bytes()).unwrap()
    }

    #[actix_rt::test]
    async fn open_seed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let store = MemoryStore::open(file.path()).unwrap();

        let record = store.find_by_code("agk77").await.unwrap().unwrap();
        assert_eq!(record.id, "rec001");
        assert_eq!(record.str_field(schema::GREETING_NAME), Some("Andrew & Kim"));
        assert_eq!(
            record.list_field(schema::ALLOWED_EVENTS),
            vec!["Holy Matrimony", "Dinner Reception"]
        );
        assert_eq!(record.u32_field(schema::MAX_ADULTS), Some(2));
        assert_eq!(record.str_field(schema::RSVP_STATUS), None);
        assert!(store.find_by_code("nobody").await.unwrap().is_none());
        assert_eq!(store.calls(), 2);
    }

    #[actix_rt::test]
    async fn update_merges_fields() {
        let store = test_store();
        let mut fields = Fields::new();
        fields.insert(schema::RSVP_STATUS.to_string(), "Responded".into());
        let record = store.update("rec002", fields).await.unwrap();
        assert_eq!(record.str_field(schema::RSVP_STATUS), Some("Responded"));
        assert_eq!(record.str_field(schema::GUEST_NAME), Some("The Tan Family"));

        let fetched = store.get("rec002").await.unwrap().unwrap();
        assert_eq!(fetched, record);
        assert!(store.update("rec999", Fields::new()).await.is_err());
    }

    #[actix_rt::test]
    async fn newest_wish_first() {
        let store = test_store();
        assert_eq!(store.list_wishes().await.unwrap().len(), 1);

        // Millisecond timestamps; keep the two writes apart.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut fields = Fields::new();
        fields.insert(schema::WISH.to_string(), "Congratulations!".into());
        store.update("rec001", fields).await.unwrap();

        let wishes = store.list_wishes().await.unwrap();
        assert_eq!(
            wishes.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["rec001", "rec003"]
        );
    }
}
