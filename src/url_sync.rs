//! Keeps the navigable address in step with the document.
//!
//! A modified document travels in one query parameter as
//! `percent(base64(json))`. An unmodified document is written as the bare
//! parameter with no payload, so a pristine session always has the same URL.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use themekit_store::{ConfigDocument, SubscriptionHandle, Value};

use crate::config::StudioConfig;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed percent-encoding at byte {0}")]
    Percent(usize),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is JSON but not an object")]
    NotAnObject,
}

/// Standard alphabet. Encodes with padding and decodes with or without it,
/// since shared links often lose a trailing `%3D`.
const LINK_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Serialize a tree for the address bar. Map keys keep document order.
pub fn encode(tree: &Value) -> String {
    let json = tree.to_json().to_string();
    encode_uri_component(&LINK_ENGINE.encode(json))
}

/// Inverse of [`encode`]. Only JSON objects are accepted.
pub fn decode(payload: &str) -> Result<Value, DecodeError> {
    let base64 = decode_uri_component(payload)?;
    let json = LINK_ENGINE.decode(base64)?;
    let parsed: serde_json::Value = serde_json::from_slice(&json)?;
    if !parsed.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    Ok(parsed.into())
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// Percent-encode everything outside the URI component unreserved set.
pub fn encode_uri_component(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0xf) as usize] as char);
        }
    }
    out
}

/// Decode `%XX` escapes. Anything else passes through untouched.
pub fn decode_uri_component(input: &str) -> Result<Vec<u8>, DecodeError> {
    fn hex(digit: u8) -> Option<u8> {
        (digit as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let high = bytes.get(i + 1).copied().and_then(hex);
            let low = bytes.get(i + 2).copied().and_then(hex);
            let (Some(high), Some(low)) = (high, low) else {
                return Err(DecodeError::Percent(i));
            };
            out.push(high << 4 | low);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// The value of `name` in `query` (with or without the leading `?`).
///
/// A parameter that appears without `=` has an empty value.
pub fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .strip_prefix('?')
        .unwrap_or(query)
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// The query string that represents a document in the given state.
pub fn query_for(param: &str, tree: &Value, dirty: bool) -> String {
    if dirty {
        format!("?{param}={}", encode(tree))
    } else {
        format!("?{param}")
    }
}

/// Where the shareable snapshot lives, typically the browser location.
pub trait Address {
    /// The current query string, including the leading `?` when non-empty.
    fn query(&self) -> String;

    /// Replace the query in place, without adding a history entry.
    fn replace_query(&self, query: &str);
}

/// An in-process [`Address`]. Clones share the same location.
#[derive(Clone, Default)]
pub struct MemoryAddress {
    inner: Rc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    query: RefCell<String>,
    history_len: Cell<usize>,
    replacements: Cell<usize>,
}

impl MemoryAddress {
    pub fn new(query: impl Into<String>) -> Self {
        let address = Self::default();
        *address.inner.query.borrow_mut() = query.into();
        address.inner.history_len.set(1);
        address
    }

    /// Navigate to `query`, adding a history entry.
    pub fn push_query(&self, query: impl Into<String>) {
        *self.inner.query.borrow_mut() = query.into();
        self.inner.history_len.set(self.inner.history_len.get() + 1);
    }

    pub fn history_len(&self) -> usize {
        self.inner.history_len.get()
    }

    /// How many in-place replacements have happened.
    pub fn replacements(&self) -> usize {
        self.inner.replacements.get()
    }
}

impl Address for MemoryAddress {
    fn query(&self) -> String {
        self.inner.query.borrow().clone()
    }

    fn replace_query(&self, query: &str) {
        *self.inner.query.borrow_mut() = query.to_string();
        self.inner.replacements.set(self.inner.replacements.get() + 1);
    }
}

impl fmt::Debug for MemoryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAddress")
            .field("query", &*self.inner.query.borrow())
            .field("history_len", &self.history_len())
            .finish()
    }
}

/// A running synchronization between a document and an address.
///
/// Synchronization stops when this is dropped.
pub struct UrlSync {
    address: Rc<dyn Address>,
    param: String,
    _observer: SubscriptionHandle,
}

impl UrlSync {
    /// Seed `document` from the address, then keep the address current.
    ///
    /// Call this before anything else subscribes to `document`, so no
    /// subscriber observes the default tree only to see it replaced.
    pub fn start(document: &ConfigDocument, address: Rc<dyn Address>, config: &StudioConfig) -> Self {
        let param = config.query_param.clone();
        Self::load(document, &*address, &param);

        let observer = {
            let address = address.clone();
            let param = param.clone();
            document.observe(move |tree, event| {
                tracing::debug!(change = %event.change, dirty = event.dirty, "rewriting address");
                address.replace_query(&query_for(&param, tree, event.dirty));
            })
        };

        let sync = Self {
            address,
            param,
            _observer: observer,
        };
        sync.write(document);
        sync
    }

    fn load(document: &ConfigDocument, address: &dyn Address, param: &str) {
        let query = address.query();
        let Some(payload) = query_param(&query, param).filter(|payload| !payload.is_empty()) else {
            return;
        };
        match decode(payload) {
            Ok(tree) => {
                tracing::debug!("document loaded from address");
                document.load_from(tree);
            }
            Err(err) => tracing::warn!(%err, "ignoring malformed shared configuration"),
        }
    }

    /// Write the current document state to the address.
    pub fn write(&self, document: &ConfigDocument) {
        let query = document.with(|tree| query_for(&self.param, tree, document.is_dirty()));
        self.address.replace_query(&query);
    }

    pub fn param(&self) -> &str {
        &self.param
    }
}
