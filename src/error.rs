use {
    crate::{model::Outcome, state::AppState, store::StoreError},
    actix_web::{
        body::BoxBody,
        dev::ServiceResponse,
        http::{
            header::{HeaderValue, CONTENT_TYPE},
            StatusCode,
        },
        middleware::{ErrorHandlerResponse, ErrorHandlers},
        web, HttpResponse, ResponseError,
    },
    derive_more::Display,
    lettre::{
        address::AddressError,
        error::Error as MessageError,
        transport::{sendmail::Error as SendmailError, stub::Error as StubError},
    },
    log::error,
    serde_json::json,
    tinytemplate::error::Error as TemplateError,
};

static GENERIC_ERROR: &str = "Something went wrong, please try again later.";
pub static DATABASE_ERROR: &str = "Database Error";

#[derive(Debug, Display)]
pub enum Error {
    #[display(fmt = "Error with store: {}", _0)]
    Store(StoreError),
    #[display(fmt = "Error rendering template: {}", _0)]
    Template(TemplateError),
    #[display(fmt = "Error building email: {}", _0)]
    Message(MessageError),
    #[display(fmt = "Error with email address: {}", _0)]
    Address(AddressError),
    #[display(fmt = "Error sending email: {}", _0)]
    Sendmail(SendmailError),
    #[display(fmt = "Error sending email")]
    Stub,
    #[display(fmt = "Error with json: {}", _0)]
    Json(serde_json::Error),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<TemplateError> for Error {
    fn from(error: TemplateError) -> Self {
        Self::Template(error)
    }
}

impl From<MessageError> for Error {
    fn from(error: MessageError) -> Self {
        Self::Message(error)
    }
}

impl From<AddressError> for Error {
    fn from(error: AddressError) -> Self {
        Self::Address(error)
    }
}

impl From<SendmailError> for Error {
    fn from(error: SendmailError) -> Self {
        Self::Sendmail(error)
    }
}

impl From<StubError> for Error {
    fn from(_: StubError) -> Self {
        Self::Stub
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        error!("{}", self);
        HttpResponse::InternalServerError().finish()
    }
}

/// Failure of a form submission: either rejected before any store call, or
/// the store call itself failed.
#[derive(Debug, Display)]
pub enum SubmitError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Upstream(StoreError),
}

impl From<StoreError> for SubmitError {
    fn from(error: StoreError) -> Self {
        Self::Upstream(error)
    }
}

impl From<&SubmitError> for Outcome {
    fn from(error: &SubmitError) -> Self {
        match error {
            SubmitError::Validation(message) => Outcome::failed(message),
            SubmitError::Upstream(_) => Outcome::failed(DATABASE_ERROR),
        }
    }
}

pub fn error_handlers() -> ErrorHandlers<BoxBody> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, internal_error)
}

fn internal_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let body = res
        .request()
        .app_data::<web::Data<AppState>>()
        .and_then(|state| {
            state
                .tt
                .render("error.html", &json!({ "message": GENERIC_ERROR }))
                .ok()
        })
        .unwrap_or_else(|| GENERIC_ERROR.to_string());
    let (req, res) = res.into_parts();
    let mut res = res.set_body(body);
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
