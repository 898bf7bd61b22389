//! Test doubles for every seam: repository, clock, import source, HTTP and mail.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::email::{EmailClient, EmailMessage};
use crate::error::{Error, Result};
use crate::import::ImportSource;
use crate::import::remote::{HttpClient, HttpResponse};
use crate::models::{Application, Statistics};
use crate::repository::ApplicationRepository;
use crate::util::Clock;

pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.0.to_string()
    }
}

/// In-memory repository. Insert calls listed in `fail_inserts` (1-based) fail
/// with a storage error.
#[derive(Default)]
pub struct MemoryRepository {
    rows: RefCell<Vec<Application>>,
    next_id: Cell<i64>,
    insert_calls: Cell<usize>,
    fail_inserts: HashSet<usize>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_insert(calls: &[usize]) -> Self {
        Self {
            fail_inserts: calls.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, application: &Application) -> Result<Application> {
        let call = self.insert_calls.get() + 1;
        self.insert_calls.set(call);
        if self.fail_inserts.contains(&call) {
            return Err(Error::storage("insert", "simulated write failure"));
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let stored = Application {
            id,
            ..application.clone()
        };
        self.rows.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    fn update(&self, application: &Application) -> Result<bool> {
        let mut rows = self.rows.borrow_mut();
        match rows.iter_mut().find(|row| row.id == application.id) {
            Some(row) => {
                *row = application.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, id: i64) -> Result<bool> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    fn find_all(&self) -> Result<Vec<Application>> {
        Ok(self.rows.borrow().clone())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Application>> {
        Ok(self.rows.borrow().iter().find(|row| row.id == id).cloned())
    }

    fn find_by_status(&self, status: &str) -> Result<Vec<Application>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.status == status)
            .cloned()
            .collect())
    }

    fn compute_statistics(&self) -> Result<Statistics> {
        let mut count_by_status = BTreeMap::new();
        for row in self.rows.borrow().iter() {
            *count_by_status.entry(row.status.clone()).or_insert(0) += 1;
        }
        Ok(Statistics { count_by_status })
    }
}

/// Import source that hands back a fixed list of templates, or an error.
pub struct FakeImportSource {
    templates: Vec<Application>,
    fail: bool,
}

impl FakeImportSource {
    pub fn new(templates: Vec<Application>) -> Self {
        Self {
            templates,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            templates: Vec::new(),
            fail: true,
        }
    }
}

impl ImportSource for FakeImportSource {
    fn fetch_applications(&mut self) -> Result<Vec<Application>> {
        if self.fail {
            return Err(Error::io(
                "fake.csv",
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            ));
        }
        Ok(self.templates.clone())
    }
}

/// HTTP client with canned responses per URL. Unknown URLs fail at the transport level.
#[derive(Default)]
pub struct FakeHttpClient {
    responses: HashMap<String, HttpResponse>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeHttpClient {
    pub fn with_response(url: &str, status_code: u16, body: &str) -> Self {
        let mut client = Self::default();
        client.responses.insert(
            url.to_string(),
            HttpResponse {
                status_code,
                body: body.to_string(),
            },
        );
        client
    }
}

impl HttpClient for FakeHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("connection refused: {url}")))
    }
}

/// Mail client that records the calls it receives.
#[derive(Default)]
pub struct FakeEmailClient {
    pub messages: Vec<EmailMessage>,
    pub calls: Vec<String>,
    pub fail_connect: bool,
}

impl EmailClient for FakeEmailClient {
    fn connect(&mut self) -> Result<()> {
        self.calls.push("connect".to_string());
        if self.fail_connect {
            return Err(Error::Mailbox("login failed".to_string()));
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.calls.push("disconnect".to_string());
        Ok(())
    }

    fn fetch_messages(&mut self, search_expression: &str) -> Result<Vec<EmailMessage>> {
        self.calls.push(format!("fetch:{search_expression}"));
        Ok(self.messages.clone())
    }
}
