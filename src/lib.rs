//! `dictlookup` — dictionary lookups driven by a cascading search configuration.
//!
//! The [`lookup`] module holds the core: a [`SearchConfiguration`] whose
//! search mode, dictionary, field and parameter availability follow from each
//! other, a synchronous [`SearchEngine`] and a single-flight
//! [`AsyncSearchEngine`], result fan-out and replay, and a bounded lookup
//! history. [`wordlist`] provides a plain-text dictionary implementation.
//!
//! [`SearchConfiguration`]: lookup::SearchConfiguration
//! [`SearchEngine`]: lookup::SearchEngine
//! [`AsyncSearchEngine`]: lookup::AsyncSearchEngine

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod wordlist;
