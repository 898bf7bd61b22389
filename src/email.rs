use mailparse::{MailHeaderMap, ParsedMail, parse_mail};
use std::fs;
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A mail message reduced to the fields import sources look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub body_text: String,
    pub date: String,
}

/// Connect, search-and-fetch, disconnect. All calls block.
pub trait EmailClient {
    fn connect(&mut self) -> Result<()>;
    fn disconnect(&mut self) -> Result<()>;
    /// `search_expression` is provider specific (IMAP SEARCH syntax for IMAP).
    fn fetch_messages(&mut self, search_expression: &str) -> Result<Vec<EmailMessage>>;
}

pub struct ImapConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub mailbox: String,
}

impl ImapConfig {
    pub fn gmail(username: &str, app_password: &str) -> Self {
        Self {
            server: "imap.gmail.com".to_string(),
            port: 993,
            username: username.to_string(),
            password: app_password.trim().to_string(),
            mailbox: "INBOX".to_string(),
        }
    }

    pub fn from_password_file(
        server: &str,
        port: u16,
        username: &str,
        password_file: &Path,
        mailbox: &str,
    ) -> Result<Self> {
        let password = fs::read_to_string(password_file).map_err(|e| Error::io(password_file, e))?;
        Ok(Self {
            server: server.to_string(),
            port,
            mailbox: mailbox.to_string(),
            ..Self::gmail(username, &password)
        })
    }
}

type ImapSession = imap::Session<native_tls::TlsStream<TcpStream>>;

/// IMAP over TLS.
pub struct ImapEmailClient {
    config: ImapConfig,
    session: Option<ImapSession>,
}

impl ImapEmailClient {
    pub fn new(config: ImapConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }
}

fn mailbox_err(context: &str) -> impl FnOnce(imap::error::Error) -> Error + '_ {
    move |e| Error::Mailbox(format!("{context}: {e}"))
}

impl EmailClient for ImapEmailClient {
    fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let tls = native_tls::TlsConnector::builder()
            .build()
            .map_err(|e| Error::Mailbox(format!("TLS setup failed: {e}")))?;

        let addr = (self.config.server.as_str(), self.config.port);
        let tcp = TcpStream::connect(addr)
            .map_err(|e| Error::Mailbox(format!("Failed to connect to IMAP server: {e}")))?;
        tcp.set_read_timeout(Some(Duration::from_secs(30)))
            .and_then(|_| tcp.set_write_timeout(Some(Duration::from_secs(30))))
            .map_err(|e| Error::Mailbox(format!("Failed to configure socket: {e}")))?;
        let tls_stream = tls
            .connect(&self.config.server, tcp)
            .map_err(|e| Error::Mailbox(format!("TLS handshake failed: {e}")))?;

        let mut client = imap::Client::new(tls_stream);
        client
            .read_greeting()
            .map_err(mailbox_err("No greeting from IMAP server"))?;
        let mut session = client
            .login(&self.config.username, &self.config.password)
            .map_err(|e| Error::Mailbox(format!("Login failed: {}", e.0)))?;

        session
            .select(&self.config.mailbox)
            .map_err(mailbox_err("Failed to select mailbox"))?;
        debug!(server = %self.config.server, mailbox = %self.config.mailbox, "IMAP session open");

        self.session = Some(session);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            session.logout().map_err(mailbox_err("Logout failed"))?;
        }
        Ok(())
    }

    fn fetch_messages(&mut self, search_expression: &str) -> Result<Vec<EmailMessage>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Mailbox("Not connected".to_string()))?;

        let mut ids: Vec<u32> = session
            .search(search_expression)
            .map_err(mailbox_err("Search failed"))?
            .into_iter()
            .collect();
        ids.sort_unstable();

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            let fetched = session
                .fetch(id.to_string(), "RFC822")
                .map_err(mailbox_err("Fetch failed"))?;
            for message in fetched.iter() {
                let Some(body) = message.body() else {
                    continue;
                };
                match parse_message(&id.to_string(), body) {
                    Ok(parsed) => messages.push(parsed),
                    Err(e) => warn!(id, error = %e, "skipping unparseable message"),
                }
            }
        }
        Ok(messages)
    }
}

/// Parses a raw RFC 822 message.
pub fn parse_message(fallback_id: &str, raw: &[u8]) -> Result<EmailMessage> {
    let parsed = parse_mail(raw).map_err(|e| Error::Mailbox(e.to_string()))?;
    let header = |name: &str| parsed.headers.get_first_value(name).unwrap_or_default();

    let id = match header("Message-ID") {
        id if id.is_empty() => fallback_id.to_string(),
        id => id,
    };

    Ok(EmailMessage {
        id,
        subject: header("Subject"),
        from: header("From"),
        to: header("To"),
        date: header("Date"),
        body_text: get_email_body(&parsed).map_err(|e| Error::Mailbox(e.to_string()))?,
    })
}

fn get_email_body(parsed: &ParsedMail) -> std::result::Result<String, mailparse::MailParseError> {
    if parsed.subparts.is_empty() {
        return parsed.get_body();
    }

    // Prefer plain text, then HTML, then whatever comes first
    for wanted in ["text/plain", "text/html"] {
        for part in &parsed.subparts {
            if part.ctype.mimetype.eq_ignore_ascii_case(wanted) {
                return part.get_body();
            }
        }
    }

    match parsed.subparts.first() {
        Some(part) => get_email_body(part),
        None => Ok(String::new()),
    }
}
