//! Search orchestration core for a cocktail catalog lookup view.
//!
//! # Overview
//! Three retrieval modes (initial listing, free-text search, category filter)
//! share one result slot. The `Coordinator` owns that slot and guarantees that
//! it holds either a result set or an error message, never both.
//!
//! # Design
//! - `CatalogClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network (host-does-IO).
//! - `Transport` is the only I/O seam. `ReqwestTransport` is the bundled
//!   implementation; hosts with their own fetch can drive the
//!   `begin_*`/`complete` halves directly instead.
//! - Records are loose string maps; the core only insists on the `drinks`
//!   list envelope.
//! - DTOs are defined independently from the mock-catalog crate; integration
//!   tests catch schema drift.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod http;
pub mod transport;
pub mod types;

pub use config::{CompletionPolicy, CoordinatorConfig};
pub use coordinator::{
    Card, Coordinator, FetchMode, Outcome, PendingFetch, Phase, QueryState, View,
    NO_RESULTS_MESSAGE,
};
pub use error::{CommandError, ConfigError, FetchError};
pub use gateway::{CatalogClient, DEFAULT_BASE_URL};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Category, DrinkRecord};
