//! Declarative widgets for server-rendered pages that survive partial reloads.
//!
//! Markup declares behaviour through `data-*` attributes (see [`Config`]).
//! A [`Session`] attaches one click listener per element and behaviour, and re-runs that registration whenever
//! the [fragment loader](`loader`) swaps new HTML into the page, so injected widgets are live without manual re-initialization.

#![doc(html_root_url = "https://docs.rs/rehydrate-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod chart;
pub mod config;
pub mod disclosure;
mod error;
pub mod loader;
pub mod modal;
pub mod registry;
mod session;
pub mod toggle;
pub mod transport;
pub mod trigger;
pub mod watcher;

pub use config::Config;
pub use error::{Error, Reporter, Result, TracingReporter};
pub use session::Session;
