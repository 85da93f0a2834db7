use {
    crate::{
        config::Backend,
        email::Email,
        guests::GuestResolver,
        store::RecordStore,
        visibility::Visibility,
        wishes::WishBook,
    },
    tinytemplate::TinyTemplate,
};

static ERROR: &str = include_str!("../templates/error.html");
static INDEX: &str = include_str!("../templates/index.html");

/// Per-worker application state. The caches and the in-memory store are
/// shared between workers; the HTTP client of the hosted store is not.
pub struct AppState {
    pub test: bool,
    pub store: Box<dyn RecordStore>,
    pub guests: GuestResolver,
    pub wishes: WishBook,
    pub visibility: Visibility,
    pub tt: TinyTemplate<'static>,
    pub email: Email,
}

impl AppState {
    pub fn new(
        backend: &Backend,
        guests: GuestResolver,
        wishes: WishBook,
        visibility: Visibility,
        email: Email,
        test: bool,
    ) -> Self {
        Self {
            test,
            store: backend.connect(),
            guests,
            wishes,
            visibility,
            tt: templates(),
            email,
        }
    }

    #[cfg(test)]
    pub fn new_with_store(store: Box<dyn RecordStore>) -> Self {
        let ttl = std::time::Duration::from_secs(60);
        Self {
            test: true,
            store,
            guests: GuestResolver::new(ttl),
            wishes: WishBook::new(ttl),
            visibility: Visibility::default(),
            tt: templates(),
            email: Email::default(),
        }
    }
}

fn templates() -> TinyTemplate<'static> {
    let mut tt = TinyTemplate::new();
    tt.add_template("index.html", INDEX).unwrap();
    tt.add_template("error.html", ERROR).unwrap();
    tt
}
