use {
    crate::store::{AirtableStore, MemoryStore, RecordStore, StoreError},
    clap::Parser,
    log::{info, warn},
    std::path::PathBuf,
    url::Url,
};

/// Web server for a personalised wedding invitation
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value_t = String::from("127.0.0.1:8080"))]
    pub bind: String,

    /// Serve guests from a CSV file kept in memory instead of Airtable
    #[arg(long, value_name = "CSV_FILE")]
    pub mock: Option<PathBuf>,

    /// Airtable personal access token
    #[arg(long, env = "AIRTABLE_API_TOKEN", hide_env_values = true)]
    pub airtable_token: Option<String>,

    /// Airtable base identifier
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    pub airtable_base: Option<String>,

    /// Table holding the guest list
    #[arg(long, env = "AIRTABLE_TABLE", default_value_t = String::from("Guests"))]
    pub airtable_table: String,

    /// Airtable API root
    #[arg(long, env = "AIRTABLE_URL")]
    pub airtable_url: Option<String>,

    /// Seconds a guest lookup or the wish list stays cached
    #[arg(long, default_value_t = 60)]
    pub cache_ttl: u64,

    /// Relationship or group that doesn't need to RSVP
    #[arg(long = "rsvp-exempt", value_name = "CATEGORY", default_value = "Immediate Family")]
    pub rsvp_exempt: Vec<String>,

    /// Relationship or group that gets wedding party copy
    #[arg(long = "wedding-party", value_name = "CATEGORY", default_value = "Wedding Party")]
    pub wedding_party: Vec<String>,

    /// Sets the "from" email address of RSVP notifications
    #[arg(long, value_name = "FROM_EMAIL")]
    pub from: Option<String>,

    /// Receives a message on every RSVP
    #[arg(long, value_name = "ADMIN_EMAIL")]
    pub admin: Option<String>,

    /// Test mode, doesn't actually send emails
    #[arg(short, long)]
    pub test: bool,
}

/// Where guest records live. Picked once at startup.
#[derive(Clone)]
pub enum Backend {
    Memory(MemoryStore),
    Airtable {
        api_url: Option<Url>,
        base_id: Option<String>,
        table: String,
        token: Option<String>,
    },
}

impl Backend {
    pub fn from_args(args: &Args) -> Result<Self, StoreError> {
        match &args.mock {
            Some(path) => {
                info!("Using mock guest data from {}", path.display());
                Ok(Self::Memory(MemoryStore::open(path)?))
            }
            None => {
                if args.airtable_token.is_none() || args.airtable_base.is_none() {
                    warn!("AIRTABLE_API_TOKEN or AIRTABLE_BASE_ID not set, every guest lookup will fail");
                }
                let api_url = args.airtable_url.as_deref().map(Url::parse).transpose()?;
                Ok(Self::Airtable {
                    api_url,
                    base_id: args.airtable_base.clone(),
                    table: args.airtable_table.clone(),
                    token: args.airtable_token.clone(),
                })
            }
        }
    }

    /// A store handle for one worker.
    pub fn connect(&self) -> Box<dyn RecordStore> {
        match self {
            Self::Memory(store) => Box::new(store.clone()),
            Self::Airtable {
                api_url,
                base_id,
                table,
                token,
            } => Box::new(AirtableStore::new(
                api_url.as_ref(),
                base_id.as_deref(),
                table,
                token.as_deref(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::store::SEED, std::io::Write, tempfile::NamedTempFile};

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["wedding-invite"]).unwrap();
        assert_eq!(args.bind, "127.0.0.1:8080");
        assert_eq!(args.cache_ttl, 60);
        assert_eq!(args.rsvp_exempt, vec!["Immediate Family"]);
        assert_eq!(args.wedding_party, vec!["Wedding Party"]);
        assert!(args.mock.is_none());
        assert!(!args.test);
    }

    #[test]
    fn repeated_categories() {
        let args = Args::try_parse_from([
            "wedding-invite",
            "--rsvp-exempt",
            "Parents",
            "--rsvp-exempt",
            "Siblings",
            "--cache-ttl",
            "5",
        ])
        .unwrap();
        assert_eq!(args.rsvp_exempt, vec!["Parents", "Siblings"]);
        assert_eq!(args.cache_ttl, 5);
    }

    #[actix_rt::test]
    async fn mock_backend_is_shared() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let args = Args::try_parse_from([
            "wedding-invite",
            "--mock",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let backend = Backend::from_args(&args).unwrap();
        let one = backend.connect();
        let two = backend.connect();
        let mut fields = crate::store::Fields::new();
        fields.insert("Wish".to_string(), "Hello".into());
        one.update("rec001", fields).await.unwrap();
        let record = two.get("rec001").await.unwrap().unwrap();
        assert_eq!(record.str_field("Wish"), Some("Hello"));
    }

    #[test]
    fn bad_airtable_url() {
        let args = Args::try_parse_from(["wedding-invite", "--airtable-url", "not a url"]).unwrap();
        assert!(matches!(Backend::from_args(&args), Err(StoreError::Url(_))));
    }

    #[test]
    fn missing_mock_file() {
        let args = Args::try_parse_from(["wedding-invite", "--mock", "/nonexistent/guests.csv"])
            .unwrap();
        assert!(matches!(Backend::from_args(&args), Err(StoreError::Io(_))));
    }
}
