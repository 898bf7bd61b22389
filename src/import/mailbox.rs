use super::ImportSource;
use crate::email::{EmailClient, EmailMessage};
use crate::error::Result;
use crate::models::Application;
use crate::util::{Clock, SystemClock};

/// Turns mailbox messages into application templates.
///
/// Company and position are left empty; extracting them from the subject or
/// body is not done yet, so imported rows carry only the subject in `notes`.
pub struct ImapImportSource<E: EmailClient> {
    client: E,
    search_expression: String,
    clock: Box<dyn Clock>,
}

impl<E: EmailClient> ImapImportSource<E> {
    pub fn new(client: E, search_expression: impl Into<String>) -> Self {
        Self {
            client,
            search_expression: search_expression.into(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn to_application(&self, message: &EmailMessage) -> Application {
        let today = self.clock.today();
        Application {
            source: "email".to_string(),
            status: "applied".to_string(),
            notes: format!("Imported from email: {}", message.subject),
            applied_date: today.clone(),
            last_update: today,
            ..Default::default()
        }
    }
}

impl<E: EmailClient> ImportSource for ImapImportSource<E> {
    fn fetch_applications(&mut self) -> Result<Vec<Application>> {
        self.client.connect()?;
        let fetched = self.client.fetch_messages(&self.search_expression);
        // Always hang up, even when the search failed.
        let disconnected = self.client.disconnect();
        let messages = fetched?;
        disconnected?;

        Ok(messages.iter().map(|m| self.to_application(m)).collect())
    }
}
