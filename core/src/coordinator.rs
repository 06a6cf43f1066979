//! The query coordinator: one result slot shared by three fetch modes.
//!
//! # Design
//! Every command is a single fetch-and-replace cycle split in two halves,
//! mirroring the gateway's build/parse split:
//!
//! - `begin_*` records that a fetch is outstanding and hands back a
//!   `PendingFetch` carrying the request to execute.
//! - `complete` parses the response and replaces the committed outcome in one
//!   step. Results and error live in the same `Outcome` enum, so they can never
//!   both be set.
//!
//! The `run_*` methods drive both halves over a `Transport`. State sits in a
//! `RefCell` that is never borrowed across an await, so several commands may
//! be in flight on one task; which completion wins is governed by the
//! configured `CompletionPolicy`.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::config::{CompletionPolicy, CoordinatorConfig};
use crate::error::{CommandError, ConfigError, FetchError};
use crate::gateway::CatalogClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Category, DrinkRecord};

/// Shown when a fetch succeeded but matched nothing.
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Which command a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Initial,
    Search,
    Category,
}

impl FetchMode {
    pub fn error_message(self) -> &'static str {
        match self {
            FetchMode::Initial => "Error fetching initial results. Please try again later.",
            FetchMode::Search => "Error fetching search results. Please try again later.",
            FetchMode::Category => "Error fetching category results. Please try again later.",
        }
    }

    fn label(self) -> &'static str {
        match self {
            FetchMode::Initial => "initial",
            FetchMode::Search => "search",
            FetchMode::Category => "category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Loaded,
    Failed,
}

/// The last committed result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded(Vec<DrinkRecord>),
    Failed(String),
}

/// A snapshot of what the coordinator currently holds.
///
/// While a fetch is outstanding the phase is `Loading`, but the previously
/// committed outcome stays readable so the presentation keeps showing it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryState {
    outcome: Option<Outcome>,
    loading: bool,
}

impl QueryState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            return Phase::Loading;
        }
        match self.outcome {
            None => Phase::Uninitialized,
            Some(Outcome::Loaded(_)) => Phase::Loaded,
            Some(Outcome::Failed(_)) => Phase::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The visible result set; empty when nothing loaded or the last fetch failed.
    pub fn results(&self) -> &[DrinkRecord] {
        match &self.outcome {
            Some(Outcome::Loaded(records)) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed(message)) => Some(message.as_str()),
            _ => None,
        }
    }

    /// What the presentation should render for this snapshot.
    pub fn view(&self) -> View<'_> {
        match &self.outcome {
            None => View::Pending,
            Some(Outcome::Failed(message)) => View::Error(message.as_str()),
            Some(Outcome::Loaded(records)) if records.is_empty() => View::NoResults,
            Some(Outcome::Loaded(records)) => View::Results(records.iter().map(Card::new).collect()),
        }
    }
}

/// Presentation state derived from a `QueryState`.
#[derive(Debug, PartialEq, Eq)]
pub enum View<'a> {
    /// Nothing has been committed yet.
    Pending,
    Results(Vec<Card<'a>>),
    /// A successful fetch with no matches; render [`NO_RESULTS_MESSAGE`].
    NoResults,
    Error(&'a str),
}

/// One rendered result.
#[derive(Debug, PartialEq, Eq)]
pub struct Card<'a> {
    pub name: Option<&'a str>,
    pub image_url: Option<String>,
    /// Clicking it issues a category filter. Absent for filter results,
    /// which the catalog returns without a category.
    pub category: Option<Category>,
    pub record: &'a DrinkRecord,
}

impl<'a> Card<'a> {
    fn new(record: &'a DrinkRecord) -> Self {
        Self {
            name: record.name(),
            image_url: record.preview_url(),
            category: record.category(),
            record,
        }
    }
}

/// An issued fetch waiting for its response.
///
/// Execute `request()` and pass the result to [`Coordinator::complete`].
/// Dropping it without completing leaves the coordinator `Loading`.
#[derive(Debug)]
#[must_use = "a pending fetch does nothing until it is completed"]
pub struct PendingFetch {
    ticket: u64,
    mode: FetchMode,
    request: HttpRequest,
}

impl PendingFetch {
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Issue order; later commands carry larger tickets.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

#[derive(Debug, Default)]
struct Inner {
    outcome: Option<Outcome>,
    in_flight: usize,
    default_load_issued: bool,
    next_ticket: u64,
    newest_committed: u64,
    input: String,
    /// Every category of every record committed so far.
    displayed_categories: HashSet<Category>,
}

impl Inner {
    fn issue(&mut self, mode: FetchMode, request: HttpRequest) -> PendingFetch {
        self.next_ticket += 1;
        self.in_flight += 1;
        tracing::debug!(mode = mode.label(), ticket = self.next_ticket, url = %request.url, "fetch issued");
        PendingFetch {
            ticket: self.next_ticket,
            mode,
            request,
        }
    }

    fn snapshot(&self) -> QueryState {
        QueryState {
            outcome: self.outcome.clone(),
            loading: self.in_flight > 0,
        }
    }
}

/// Owns the query state for one mounted search view.
#[derive(Debug)]
pub struct Coordinator {
    client: CatalogClient,
    policy: CompletionPolicy,
    inner: RefCell<Inner>,
}

impl Coordinator {
    pub fn new(client: CatalogClient, policy: CompletionPolicy) -> Self {
        Self {
            client,
            policy,
            inner: RefCell::new(Inner::default()),
        }
    }

    pub fn from_config(config: &CoordinatorConfig) -> Result<Self, ConfigError> {
        let client = CatalogClient::new(&config.base_url)?;
        Ok(Self::new(client, config.completion_policy))
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// The latest committed state.
    pub fn snapshot(&self) -> QueryState {
        self.inner.borrow().snapshot()
    }

    // -- pending input ------------------------------------------------------

    /// Replace the search box contents. Never issues a fetch.
    pub fn update_input(&self, text: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.input.clear();
        inner.input.push_str(text);
        tracing::trace!(input = %inner.input, "input updated");
    }

    pub fn input(&self) -> String {
        self.inner.borrow().input.clone()
    }

    // -- issuing ------------------------------------------------------------

    /// Issue the initial listing, at most once per coordinator.
    ///
    /// Returns `None` on every later call, whether the first load succeeded,
    /// failed, came back empty, or is still running.
    pub fn begin_default_load(&self) -> Option<PendingFetch> {
        let mut inner = self.inner.borrow_mut();
        if inner.default_load_issued {
            tracing::debug!("initial load already issued");
            return None;
        }
        inner.default_load_issued = true;
        Some(inner.issue(FetchMode::Initial, self.client.build_default_listing()))
    }

    pub fn begin_text_search(&self, term: &str) -> PendingFetch {
        let request = self.client.build_search(term);
        self.inner.borrow_mut().issue(FetchMode::Search, request)
    }

    /// Search for whatever the input buffer currently holds.
    pub fn begin_submit(&self) -> PendingFetch {
        let term = self.input();
        self.begin_text_search(&term)
    }

    /// Filter by a category some displayed record carried.
    ///
    /// Categories that never appeared in a committed result set are refused
    /// without issuing a fetch.
    pub fn begin_category_filter(&self, category: &Category) -> Result<PendingFetch, CommandError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.displayed_categories.contains(category) {
            tracing::warn!(%category, "refusing filter on a category that was never displayed");
            return Err(CommandError::CategoryNotDisplayed(category.to_string()));
        }
        let request = self.client.build_filter_by_category(category);
        Ok(inner.issue(FetchMode::Category, request))
    }

    /// Whether `category` has appeared in any committed result set.
    pub fn was_displayed(&self, category: &Category) -> bool {
        self.inner.borrow().displayed_categories.contains(category)
    }

    // -- completing ---------------------------------------------------------

    /// Resolve a pending fetch and commit its outcome.
    ///
    /// Failures of any kind replace the results with the mode's error
    /// message. Returns the state after the commit.
    pub fn complete(
        &self,
        pending: PendingFetch,
        response: Result<HttpResponse, FetchError>,
    ) -> QueryState {
        let PendingFetch { ticket, mode, .. } = pending;
        let result = response.and_then(|r| self.client.parse_drinks(r));

        let mut inner = self.inner.borrow_mut();
        inner.in_flight = inner.in_flight.saturating_sub(1);

        if self.policy == CompletionPolicy::LatestIssued && ticket < inner.newest_committed {
            tracing::debug!(
                mode = mode.label(),
                ticket,
                newest = inner.newest_committed,
                "discarding stale completion"
            );
            return inner.snapshot();
        }
        inner.newest_committed = inner.newest_committed.max(ticket);

        let outcome = match result {
            Ok(records) => {
                tracing::debug!(mode = mode.label(), count = records.len(), "results loaded");
                inner
                    .displayed_categories
                    .extend(records.iter().filter_map(DrinkRecord::category));
                Outcome::Loaded(records)
            }
            Err(error) => {
                tracing::warn!(mode = mode.label(), %error, "error fetching results");
                Outcome::Failed(mode.error_message().to_string())
            }
        };
        inner.outcome = Some(outcome);
        inner.snapshot()
    }

    // -- async commands -----------------------------------------------------

    /// Mount-time listing. A no-op returning the current state once issued.
    pub async fn run_default_load<T: Transport>(&self, transport: &T) -> QueryState {
        match self.begin_default_load() {
            Some(pending) => self.drive(transport, pending).await,
            None => self.snapshot(),
        }
    }

    pub async fn run_text_search<T: Transport>(&self, transport: &T, term: &str) -> QueryState {
        let pending = self.begin_text_search(term);
        self.drive(transport, pending).await
    }

    /// Submit the search box.
    pub async fn submit<T: Transport>(&self, transport: &T) -> QueryState {
        let pending = self.begin_submit();
        self.drive(transport, pending).await
    }

    pub async fn run_category_filter<T: Transport>(
        &self,
        transport: &T,
        category: &Category,
    ) -> Result<QueryState, CommandError> {
        let pending = self.begin_category_filter(category)?;
        Ok(self.drive(transport, pending).await)
    }

    /// A click on a card's category label.
    pub async fn on_category_click<T: Transport>(
        &self,
        transport: &T,
        card: &Card<'_>,
    ) -> Result<QueryState, CommandError> {
        let category = card.category.as_ref().ok_or(CommandError::NoCategory)?;
        self.run_category_filter(transport, category).await
    }

    async fn drive<T: Transport>(&self, transport: &T, pending: PendingFetch) -> QueryState {
        let response = transport.execute(pending.request()).await;
        self.complete(pending, response)
    }
}
