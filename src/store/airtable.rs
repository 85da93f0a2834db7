use {
    super::{Fields, Record, RecordStore, StoreError},
    crate::schema,
    async_trait::async_trait,
    awc::{http::Method, Client, ClientRequest},
    log::debug,
    serde::{de::DeserializeOwned, Deserialize},
    serde_json::{json, Value},
    url::Url,
};

static DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
const JSON_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct Page {
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

/// Guests table hosted on Airtable, reached over its REST API.
pub struct AirtableStore {
    client: Client,
    table_url: Option<Url>,
    token: Option<String>,
}

impl AirtableStore {
    pub fn new(
        api_url: Option<&Url>,
        base_id: Option<&str>,
        table: &str,
        token: Option<&str>,
    ) -> Self {
        let api_url = api_url
            .cloned()
            .or_else(|| Url::parse(DEFAULT_API_URL).ok());
        Self {
            client: Client::default(),
            table_url: match (api_url, base_id.filter(|id| !id.is_empty())) {
                (Some(api_url), Some(base_id)) => table_url(api_url, base_id, table),
                _ => None,
            },
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    fn request(&self, method: Method, record_id: Option<&str>) -> Result<ClientRequest, StoreError> {
        if let Some(id) = record_id.filter(|id| !schema::is_record_id(id)) {
            return Err(StoreError::RecordId(id.to_string()));
        }
        let (mut url, token) = match (&self.table_url, &self.token) {
            (Some(url), Some(token)) => (url.clone(), token),
            _ => return Err(StoreError::MissingCredentials),
        };
        if let Some(id) = record_id {
            url.path_segments_mut()
                .map_err(|_| StoreError::Query("table url has no path".to_string()))?
                .push(id);
        }
        Ok(self.client.request(method, url.as_str()).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        request: ClientRequest,
        body: Option<&Value>,
    ) -> Result<T, StoreError> {
        let mut response = match body {
            Some(body) => request.send_json(body).await?,
            None => request.send().await?,
        };
        let status = response.status();
        if !status.is_success() {
            let body = response
                .body()
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }
        response
            .json::<T>()
            .limit(JSON_LIMIT)
            .await
            .map_err(StoreError::from)
    }
}

/// `<api>/<base>/<table>`, each segment percent-encoded.
fn table_url(mut url: Url, base_id: &str, table: &str) -> Option<Url> {
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(base_id)
        .push(table);
    Some(url)
}

/// Quote `value` for use inside a single-quoted formula string.
fn escape_formula(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn code_formula(code: &str) -> String {
    format!("{{{}}} = '{}'", schema::GUEST_CODE, escape_formula(code))
}

fn wishes_query(offset: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![(
        "filterByFormula",
        format!("NOT({{{}}} = '')", schema::WISH),
    )];
    for field in [
        schema::GUEST_NAME,
        schema::GREETING_NAME,
        schema::WISH,
        schema::WISH_TIME,
    ] {
        query.push(("fields[]", field.to_string()));
    }
    query.push(("sort[0][field]", schema::WISH_TIME.to_string()));
    query.push(("sort[0][direction]", "desc".to_string()));
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
    query
}

#[async_trait(?Send)]
impl RecordStore for AirtableStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Record>, StoreError> {
        let formula = code_formula(code);
        debug!("Looking up guest with {}", formula);
        let request = self
            .request(Method::GET, None)?
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let page: Page = Self::send(request, None).await?;
        Ok(page.records.into_iter().next())
    }

    async fn get(&self, record_id: &str) -> Result<Option<Record>, StoreError> {
        let request = self.request(Method::GET, Some(record_id))?;
        match Self::send(request, None).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::Status(404, _)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn update(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError> {
        if !schema::is_record_id(record_id) {
            return Err(StoreError::RecordId(record_id.to_string()));
        }
        let body = json!({ "records": [{ "id": record_id, "fields": fields }] });
        let request = self.request(Method::PATCH, None)?;
        let page: Page = Self::send(request, Some(&body)).await?;
        page.records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("update returned no records".to_string()))
    }

    async fn list_wishes(&self) -> Result<Vec<Record>, StoreError> {
        let mut records = vec![];
        let mut offset: Option<String> = None;
        loop {
            let request = self
                .request(Method::GET, None)?
                .query(&wishes_query(offset.as_deref()))
                .map_err(|e| StoreError::Query(e.to_string()))?;
            let page: Page = Self::send(request, None).await?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_formula_escapes_quotes() {
        assert_eq!(code_formula("agk77"), "{Guest ID} = 'agk77'");
        assert_eq!(
            code_formula("x' OR TRUE() OR '"),
            "{Guest ID} = 'x\\' OR TRUE() OR \\''"
        );
    }

    #[test]
    fn wishes_query_pages() {
        let first = wishes_query(None);
        assert_eq!(first[0], ("filterByFormula", "NOT({Wish} = '')".to_string()));
        assert!(first.iter().all(|(key, _)| *key != "offset"));
        assert!(first.contains(&("sort[0][direction]", "desc".to_string())));
        let next = wishes_query(Some("itr123"));
        assert_eq!(next.last(), Some(&("offset", "itr123".to_string())));
    }

    fn configured() -> AirtableStore {
        AirtableStore::new(None, Some("appX"), "Guests", Some("token"))
    }

    #[actix_rt::test]
    async fn path_segments_are_encoded() {
        let store = AirtableStore::new(None, Some("appX"), "Guest List/2026?", Some("token"));
        assert_eq!(
            store.table_url.unwrap().as_str(),
            "https://api.airtable.com/v0/appX/Guest%20List%2F2026%3F"
        );
        let api_url = Url::parse("http://localhost:8000/v0/").unwrap();
        let store = AirtableStore::new(Some(&api_url), Some("appX"), "Guests", Some("token"));
        assert_eq!(
            store.table_url.unwrap().as_str(),
            "http://localhost:8000/v0/appX/Guests"
        );
    }

    #[actix_rt::test]
    async fn malformed_record_id_never_sent() {
        let store = configured();
        for id in ["../../meta/bases?x=", "rec001/../../meta", "tbl001"] {
            assert!(matches!(store.get(id).await, Err(StoreError::RecordId(_))));
            assert!(matches!(
                store.update(id, Fields::new()).await,
                Err(StoreError::RecordId(_))
            ));
        }
        assert!(configured().request(Method::GET, Some("rec001")).is_ok());
    }

    #[actix_rt::test]
    async fn missing_credentials_fail_every_call() {
        let store = AirtableStore::new(None, None, "Guests", None);
        assert!(matches!(
            store.find_by_code("agk77").await,
            Err(StoreError::MissingCredentials)
        ));
        assert!(matches!(
            store.update("rec1", Fields::new()).await,
            Err(StoreError::MissingCredentials)
        ));
        assert!(matches!(
            store.list_wishes().await,
            Err(StoreError::MissingCredentials)
        ));
    }
}
