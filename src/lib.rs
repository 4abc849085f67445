//! In-memory surgical instrument inventory with search, lookup, add, and
//! update, plus a cached picture lookup per instrument.
//!
//! # Examples
//!
//! Direct use of [`core::store::InstrumentStore`]:
//! ```
//! use instrument_locator::{
//!     core::store::InstrumentStore,
//!     instrument::{InstrumentDraft, InstrumentPatch},
//! };
//!
//! let mut store = InstrumentStore::seeded();
//! let hits = store.search("for");
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].name, "Forceps");
//!
//! let id = store
//!     .insert(InstrumentDraft {
//!         quantity: 2,
//!         ..InstrumentDraft::new("Retractor", "Holding", "D4")
//!     })
//!     .expect("insert");
//! store
//!     .update(id, InstrumentPatch { quantity: Some(10), ..InstrumentPatch::default() })
//!     .expect("update");
//! assert_eq!(store.get_by_name("Retractor").expect("lookup").quantity, 10);
//! ```
//!
//! Session runtime owning the store:
//! ```no_run
//! use std::sync::Arc;
//!
//! use instrument_locator::{
//!     core::store::InstrumentStore,
//!     image::NoImageLookup,
//!     runtime::handle::{spawn_session, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let session = spawn_session(InstrumentStore::seeded(), Arc::new(NoImageLookup), RuntimeConfig::default());
//! let forceps = session.get_by_name("Forceps").await.expect("lookup");
//! let image = session.fetch_image(forceps.id).await.expect("image");
//! assert!(image.is_placeholder());
//! session.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Command-line interface and interactive shell.
pub mod cli;
/// Configuration loading and validation.
pub mod config;
/// Instrument store and index helpers.
pub mod core;
/// Application-level error type.
pub mod error;
/// External image lookup.
pub mod image;
/// Instrument records, drafts, and patches.
pub mod instrument;
/// Logging setup.
pub mod logging;
/// Single-writer session runtime and events.
pub mod runtime;
/// Shared primitive types.
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
