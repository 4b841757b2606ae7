//! # vizinha-link: Vizinha Client Library
//!
//! Client library for the Vizinha community platform: a typed data-access
//! layer over the hosted relational backend plus the session manager the
//! app's screens observe.
//!
//! ## Features
//!
//! - **Generic table access**: declarative [`Query`] descriptors (filters,
//!   ordering, pagination, row counts) executed against any table, every
//!   outcome normalized into a `Result`
//! - **Session management**: observable authentication state with bounded
//!   timeouts, silent bootstrap and explicit sign-in/sign-up flows
//! - **Feature services**: one thin service per community table (bulletin
//!   board, packages, scheduling, messaging, groups, lost-and-found, map,
//!   mutual aid) with relation embeds and degraded retries built in
//! - **File storage**: bucket uploads with client-side validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vizinha_link::{Filter, Order, Query, VizinhaLinkClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VizinhaLinkClient::builder()
//!         .base_url("https://example.supabase.co")
//!         .api_key("public-anon-key")
//!         .build()?;
//!
//!     // Restore a persisted session in the background
//!     client.spawn_bootstrap();
//!
//!     // Sign in explicitly
//!     client.session().sign_in("ana@example.com", "secret").await?;
//!
//!     // Feature services wrap the generic table layer
//!     let avisos = client.avisos().find_by_condominio(7).await?;
//!     println!("{} posts on the board", avisos.len());
//!
//!     // Or query any table directly
//!     let page = client
//!         .tables()
//!         .find_all::<serde_json::Value>(
//!             "aviso",
//!             &Query::new()
//!                 .with_filter(Filter::eq("id_condominio", 7))
//!                 .with_order(Order::desc("data_criacao")),
//!         )
//!         .await?;
//!     println!("{} rows", page.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//!
//! Nothing here panics on a backend failure: every operation returns
//! [`Result`](crate::error::Result), with backend messages preserved and
//! classified into [`VizinhaLinkError`] kinds. The session manager's
//! `bootstrap` is the one deliberate exception in the other direction — it
//! absorbs all failures and settles to anonymous.

pub mod auth;
pub mod client;
pub mod error;
pub mod guard;
pub mod models;
pub mod query;
pub mod services;
pub mod session;
pub mod storage;
pub mod table;
pub mod timeouts;

// Re-export main types for convenience
pub use auth::{ApiAuth, AuthClient, AuthSession, AuthUser};
pub use client::{VizinhaLinkClient, VizinhaLinkClientBuilder};
pub use error::{Result, VizinhaLinkError};
pub use guard::{evaluate_auth, evaluate_verification, GuardContext, GuardDecision};
pub use query::{CountMode, Filter, FilterOperator, Order, Pagination, Query};
pub use session::{
    MemorySessionStore, SessionManager, SessionState, SessionStore, StoredSession,
};
pub use storage::{StorageClient, UploadedObject};
pub use table::{Page, RowId, TableExecutor};
pub use timeouts::VizinhaLinkTimeouts;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
