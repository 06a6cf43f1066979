//! Async command flows: the coordinator over `ReqwestTransport` against the
//! mock catalog, and overlapping commands over a scripted transport with
//! paused time.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use cocktail_core::{
    CatalogClient, CommandError, CompletionPolicy, Coordinator, DrinkRecord, FetchError, HttpRequest,
    HttpResponse, Phase, QueryState, ReqwestTransport, Transport, View,
};
use mock_catalog::{seed, Catalog, Db, API_PREFIX};
use tokio::sync::RwLock;

/// Counts calls before delegating.
struct Counting<T> {
    inner: T,
    calls: Cell<usize>,
}

impl<T> Counting<T> {
    fn new(inner: T) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl<T: Transport> Transport for Counting<T> {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.execute(request).await
    }
}

/// Answers by URL substring after a fixed delay.
struct Scripted {
    routes: Vec<(&'static str, Duration, u16, String)>,
}

impl Transport for Scripted {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let (_, delay, status, body) = self
            .routes
            .iter()
            .find(|(needle, ..)| request.url.contains(needle))
            .unwrap_or_else(|| panic!("no scripted route for {}", request.url));
        tokio::time::sleep(*delay).await;
        Ok(HttpResponse {
            status: *status,
            headers: Vec::new(),
            body: body.clone(),
        })
    }
}

async fn start_server(db: Db) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_catalog::run_with(listener, db));
    format!("http://{addr}{API_PREFIX}")
}

fn seeded() -> Db {
    Arc::new(RwLock::new(Catalog {
        drinks: seed(),
        outage: false,
    }))
}

fn coordinator(base: &str, policy: CompletionPolicy) -> Coordinator {
    Coordinator::new(CatalogClient::new(base).unwrap(), policy)
}

fn names(state: &QueryState) -> Vec<&str> {
    state.results().iter().filter_map(DrinkRecord::name).collect()
}

#[tokio::test]
async fn search_session_against_mock_catalog() {
    let db = seeded();
    let base = start_server(db.clone()).await;
    let transport = Counting::new(ReqwestTransport::new());
    let c = coordinator(&base, CompletionPolicy::LastResolved);

    // Mount: the alphabetical listing.
    let state = c.run_default_load(&transport).await;
    assert_eq!(state.phase(), Phase::Loaded);
    assert_eq!(names(&state), vec!["A1", "ABC", "Ace", "Adam", "AT&T"]);

    // Re-renders do not refetch.
    for _ in 0..3 {
        c.run_default_load(&transport).await;
    }
    assert_eq!(transport.calls.get(), 1);

    // Typing alone fetches nothing; submitting replaces the five records.
    c.update_input("mojito");
    assert_eq!(transport.calls.get(), 1);
    let state = c.submit(&transport).await;
    assert_eq!(names(&state), vec!["Mojito"]);
    assert!(state.error().is_none());

    // Clicking the category of a shown card.
    let View::Results(cards) = state.view() else {
        panic!("expected results");
    };
    let category = cards[0].category.clone().unwrap();
    let state = c.on_category_click(&transport, &cards[0]).await.unwrap();
    assert_eq!(names(&state), vec!["A1", "Ace", "Mojito"]);

    // Filter results carry no category, so their cards are not clickable.
    let View::Results(cards) = state.view() else {
        panic!("expected results");
    };
    let err = c.on_category_click(&transport, &cards[0]).await.unwrap_err();
    assert_eq!(err, CommandError::NoCategory);

    // No matches.
    let state = c.run_text_search(&transport, "zzz_nonexistent").await;
    assert_eq!(state.view(), View::NoResults);
    assert!(state.error().is_none());

    // Catalog outage on a category filter.
    db.write().await.outage = true;
    let state = c.run_category_filter(&transport, &category).await.unwrap();
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        state.error(),
        Some("Error fetching category results. Please try again later.")
    );
    assert!(state.results().is_empty());
    assert_eq!(transport.calls.get(), 5);
}

#[tokio::test]
async fn undisplayed_category_is_refused_without_a_fetch() {
    let base = start_server(seeded()).await;
    let transport = Counting::new(ReqwestTransport::new());
    let c = coordinator(&base, CompletionPolicy::LastResolved);
    c.run_default_load(&transport).await;

    let forged: DrinkRecord =
        serde_json::from_value(serde_json::json!({ "strCategory": "Punch / Party Drink" })).unwrap();
    let err = c
        .run_category_filter(&transport, &forged.category().unwrap())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::CategoryNotDisplayed("Punch / Party Drink".to_string())
    );
    assert_eq!(transport.calls.get(), 1);
    assert_eq!(c.snapshot().results().len(), 5);
}

#[tokio::test]
async fn unreachable_catalog_fails_the_initial_load() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = coordinator(&format!("http://{addr}{API_PREFIX}"), CompletionPolicy::LastResolved);
    let state = c.run_default_load(&ReqwestTransport::new()).await;
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        state.error(),
        Some("Error fetching initial results. Please try again later.")
    );
    assert!(c.begin_default_load().is_none());
}

fn race_transport() -> Scripted {
    Scripted {
        routes: vec![
            (
                "f=a",
                Duration::from_millis(500),
                200,
                r#"{"drinks":[{"strDrink":"A1"},{"strDrink":"ABC"}]}"#.to_string(),
            ),
            (
                "s=mojito",
                Duration::from_millis(50),
                200,
                r#"{"drinks":[{"strDrink":"Mojito"}]}"#.to_string(),
            ),
        ],
    }
}

#[tokio::test(start_paused = true)]
async fn slow_default_load_overwrites_faster_search() {
    let transport = race_transport();
    let c = coordinator("http://catalog.test/api", CompletionPolicy::LastResolved);

    let (_, search_state) = tokio::join!(c.run_default_load(&transport), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        c.run_text_search(&transport, "mojito").await
    });

    // The search resolved first, while the default load was still loading.
    assert_eq!(search_state.phase(), Phase::Loading);
    assert_eq!(names(&search_state), vec!["Mojito"]);

    let state = c.snapshot();
    assert_eq!(state.phase(), Phase::Loaded);
    assert_eq!(names(&state), vec!["A1", "ABC"]);
}

#[tokio::test(start_paused = true)]
async fn latest_issued_keeps_the_search() {
    let transport = race_transport();
    let c = coordinator("http://catalog.test/api", CompletionPolicy::LatestIssued);

    tokio::join!(c.run_default_load(&transport), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        c.run_text_search(&transport, "mojito").await
    });

    let state = c.snapshot();
    assert_eq!(state.phase(), Phase::Loaded);
    assert_eq!(names(&state), vec!["Mojito"]);
}
