//! Request builder and response parser for the remote cocktail catalog.
//!
//! # Design
//! `CatalogClient` holds only the validated base URL. Each catalog query is a
//! `build_*` method producing an `HttpRequest`; every endpoint answers with the
//! same `{"drinks": [...] | null}` envelope, so a single `parse_drinks` covers
//! them all. The async helpers at the bottom chain build, execute and parse
//! for callers that do not need the split.

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, FetchError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Category, DrinkRecord};

pub const DEFAULT_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";

/// First letter requested by the default listing.
pub const DEFAULT_LISTING_LETTER: &str = "a";

const SEARCH_SCRIPT: &str = "search.php";
const FILTER_SCRIPT: &str = "filter.php";

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    drinks: Option<Vec<DrinkRecord>>,
}

/// Stateless client for the catalog's read endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.query().is_some() {
            return Err(invalid("base URL must not carry a query".to_string()));
        }
        Ok(Self { base_url: url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn build_search(&self, term: &str) -> HttpRequest {
        self.endpoint(SEARCH_SCRIPT, "s", term)
    }

    pub fn build_filter_by_category(&self, category: &Category) -> HttpRequest {
        self.endpoint(FILTER_SCRIPT, "c", category.as_str())
    }

    pub fn build_default_listing(&self) -> HttpRequest {
        self.endpoint(SEARCH_SCRIPT, "f", DEFAULT_LISTING_LETTER)
    }

    /// Turn any catalog response into the list of records it carries.
    ///
    /// A missing or `null` `drinks` field is an empty result, not an error.
    pub fn parse_drinks(&self, response: HttpResponse) -> Result<Vec<DrinkRecord>, FetchError> {
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                body: response.body,
            });
        }
        let envelope: Envelope =
            serde_json::from_str(&response.body).map_err(|e| FetchError::Parse(e.to_string()))?;
        Ok(envelope.drinks.unwrap_or_default())
    }

    pub async fn search<T: Transport>(
        &self,
        transport: &T,
        term: &str,
    ) -> Result<Vec<DrinkRecord>, FetchError> {
        self.fetch(transport, self.build_search(term)).await
    }

    pub async fn filter_by_category<T: Transport>(
        &self,
        transport: &T,
        category: &Category,
    ) -> Result<Vec<DrinkRecord>, FetchError> {
        self.fetch(transport, self.build_filter_by_category(category))
            .await
    }

    pub async fn load_default<T: Transport>(
        &self,
        transport: &T,
    ) -> Result<Vec<DrinkRecord>, FetchError> {
        self.fetch(transport, self.build_default_listing()).await
    }

    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        request: HttpRequest,
    ) -> Result<Vec<DrinkRecord>, FetchError> {
        let response = transport.execute(&request).await?;
        self.parse_drinks(response)
    }

    fn endpoint(&self, script: &str, key: &str, value: &str) -> HttpRequest {
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, which `new` rejects via the scheme check.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(script);
        }
        url.query_pairs_mut().append_pair(key, value);
        HttpRequest::get(url.into())
    }
}
