use {
    crate::{error::Error, rsvp::RsvpSubmission},
    lettre::{
        message::{header::ContentType, Message},
        transport::stub::AsyncStubTransport,
        AsyncSendmailTransport, AsyncTransport, Tokio1Executor,
    },
    log::info,
};

/// Notifies the couple of new RSVPs. Disabled unless both addresses are set.
#[derive(Debug, Clone, Default)]
pub struct Email {
    pub from: String,
    pub admin: String,
}

impl Email {
    pub fn new(from: &str, admin: &str) -> Self {
        Self {
            from: from.to_string(),
            admin: admin.to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.from.is_empty() && !self.admin.is_empty()
    }

    async fn send_message(&self, message: Message, test: bool) -> Result<(), Error> {
        if test {
            info!("Sending message: {:?}", message);
            let sender = AsyncStubTransport::new_ok();
            sender.send(message).await.map_err(Error::from)
        } else {
            let sender = AsyncSendmailTransport::<Tokio1Executor>::new();
            sender.send(message).await.map(|_| ()).map_err(Error::from)
        }
    }

    fn message(&self, subject: &str, body: String) -> Result<Message, Error> {
        Message::builder()
            .from(self.from.parse()?)
            .reply_to(self.from.parse()?)
            .to(self.admin.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(Error::from)
    }

    fn rsvp_email(&self, guest_name: &str, rsvp: &RsvpSubmission) -> Result<Message, Error> {
        let mut body = format!("{} has responded to the invitation.\n\n", guest_name);
        for answer in &rsvp.answers {
            body.push_str(&format!("{}: {}\n", answer.event.name, answer.status()));
        }
        if let Some(names) = &rsvp.guest_names {
            body.push_str(&format!("Guests: {}\n", names));
        }
        if !rsvp.dietary.is_empty() {
            body.push_str(&format!("Dietary requirements: {}\n", rsvp.dietary));
        }
        self.message(&format!("New RSVP from {}", guest_name), body)
    }

    fn error_email(&self, error: &str, form: &[(String, String)]) -> Result<Message, Error> {
        self.message(
            "Error on RSVP",
            format!(
                "Error on new RSVP, try to get in touch with them or put it in yourself.\nError: {}\nRSVP: {}",
                error,
                serde_json::to_string(form)?
            ),
        )
    }

    pub async fn send_rsvp(
        &self,
        guest_name: &str,
        rsvp: &RsvpSubmission,
        test: bool,
    ) -> Result<(), Error> {
        if !self.enabled() {
            return Ok(());
        }
        let message = self.rsvp_email(guest_name, rsvp)?;
        self.send_message(message, test).await
    }

    pub async fn send_rsvp_error(
        &self,
        error: &str,
        form: &[(String, String)],
        test: bool,
    ) -> Result<(), Error> {
        if !self.enabled() {
            return Ok(());
        }
        let message = self.error_email(error, form)?;
        self.send_message(message, test).await
    }
}
