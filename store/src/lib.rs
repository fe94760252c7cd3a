//! # themekit_store
//!
//! The state engine behind the theme editor: one mutable JSON-like document
//! addressed by paths, with derived subscriptions, list operations, change
//! tracking and reset-to-default.
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use themekit_store::{path, ConfigDocument, Selector, Value};
//!
//! let default: Value = serde_json::json!({
//!     "settings": { "color": { "link": false, "palette": [] } }
//! })
//! .into();
//! let doc = ConfigDocument::new(default);
//!
//! let renders = Rc::new(Cell::new(0));
//! let link = doc.subscribe(Selector::at(path!["settings", "color", "link"]), {
//!     let renders = renders.clone();
//!     move |_| renders.set(renders.get() + 1)
//! });
//!
//! // Unrelated writes do not reach the `link` subscriber.
//! doc.add(&path!["settings", "color", "palette"], || {
//!     serde_json::json!({ "slug": "red", "color": "#ff0000" }).into()
//! });
//! assert_eq!(renders.get(), 0);
//!
//! doc.set(&path!["settings", "color", "link"], true);
//! assert_eq!(renders.get(), 1);
//! assert_eq!(link.get(), Some(Value::Bool(true)));
//! ```

mod document;
mod entry;
mod error;
mod list;
pub mod path;
pub mod resolve;
mod selector;
mod value;

pub use document::{Change, ChangeEvent, ConfigDocument, SubscriptionId};
pub use entry::EntryId;
pub use error::PathError;
pub use list::{appended, merge_shallow, merged_at, without};
pub use path::{Path, Seg};
pub use selector::{Selector, Subscription, SubscriptionHandle};
pub use value::{Map, ShallowEq, Value};
