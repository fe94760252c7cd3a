//! # Themekit
//! Themekit is the engine of a visual theme settings editor. A session edits
//! one settings document through form controls and keeps three views of it
//! current: a JSON preview, a shareable link and a filtered list of fields.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//!
//! use themekit::{MemoryAddress, StudioConfig, ThemeStudio, tokens::paths};
//!
//! let address = MemoryAddress::new("");
//! let studio = ThemeStudio::new(StudioConfig::default(), Rc::new(address.clone()));
//! assert!(!studio.has_change());
//!
//! studio.set(&paths::link_color(), true);
//! studio.add_palette_color();
//!
//! // The edit is now carried by the link, without growing history.
//! assert_eq!(address.history_len(), 1);
//! let reopened = ThemeStudio::new(
//!     StudioConfig::default(),
//!     Rc::new(MemoryAddress::new(studio.share_query())),
//! );
//! assert!(reopened.has_change());
//! assert_eq!(reopened.get(&paths::link_color()), studio.get(&paths::link_color()));
//! ```
//!
//! ## Documents
//! The document itself, with paths, selectors and list operations, lives in
//! [`themekit_store`] and is re-exported as [`store`]. This crate adds the
//! theme schema ([`tokens`]), address synchronization ([`url_sync`]), form
//! controls ([`field`]), search ([`search`]) and preview derivation
//! ([`preview`]).
//!
//! ## Timers
//! Delayed commits run on a [`Scheduler`] with a virtual clock. Hosts call
//! [`Scheduler::advance`] from their event loop.

pub mod config;
pub mod field;
pub mod preview;
pub mod search;
mod studio;
pub mod timer;
pub mod tokens;
pub mod url_sync;

pub use config::StudioConfig;
pub use field::{FieldError, FieldKind, TextControl, Toggle, Validation};
pub use search::{SearchQuery, is_visible};
pub use studio::ThemeStudio;
pub use themekit_store as store;
pub use themekit_store::{ConfigDocument, Path, Selector, Subscription, Value, path};
pub use timer::{Scheduler, TimerToken};
pub use url_sync::{Address, DecodeError, MemoryAddress, UrlSync};
