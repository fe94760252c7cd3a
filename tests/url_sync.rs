//! Tests for keeping the address in step with the document.
//!
//! These tests verify that:
//! 1. A shared link seeds the document before anything subscribes
//! 2. Malformed links fall back to the default document without failing
//! 3. Every change rewrites the address in place, never adding history
//! 4. A clean document is always written as the bare parameter

use std::rc::Rc;

use serde_json::json;
use themekit::{
    Address, ConfigDocument, MemoryAddress, StudioConfig, UrlSync, Value,
    tokens::{self, paths},
    url_sync::{decode, encode, query_param},
};

fn document() -> ConfigDocument {
    ConfigDocument::new(tokens::default_document())
}

fn start(query: &str) -> (ConfigDocument, MemoryAddress, UrlSync) {
    let doc = document();
    let address = MemoryAddress::new(query);
    let sync = UrlSync::start(&doc, Rc::new(address.clone()), &StudioConfig::default());
    (doc, address, sync)
}

fn payload(address: &MemoryAddress) -> String {
    let query = address.query();
    query_param(&query, "config").unwrap_or_default().to_string()
}

// =============================================================================
// Load
// =============================================================================

/// A link produced by one session restores the same document in another.
#[test]
fn test_shared_link_restores_document() {
    let (doc, address, _sync) = start("");
    doc.set(&paths::link_color(), true);
    doc.add(&paths::palette(), || json!({ "slug": "plum", "color": "#dda0dd" }).into());

    let (restored, _, _sync2) = start(&address.query());
    assert_eq!(restored.snapshot(), doc.snapshot());
    assert!(restored.is_dirty());
}

/// A link carrying exactly the default document loads as clean.
#[test]
fn test_link_with_default_tree_is_clean() {
    let query = format!("?config={}", encode(&tokens::default_document()));
    let (doc, address, _sync) = start(&query);
    assert!(!doc.is_dirty());
    assert_eq!(address.query(), "?config");
}

/// Invalid JSON behind valid encodings leaves the default document in place.
#[test]
fn test_invalid_json_falls_back_to_default() {
    let broken = themekit::url_sync::encode_uri_component("e2JhZA==");
    let (doc, address, _sync) = start(&format!("?config={broken}"));
    assert_eq!(doc.snapshot(), tokens::default_document());
    assert!(!doc.is_dirty());
    assert_eq!(address.query(), "?config");
}

#[test]
fn test_malformed_links_are_ignored() {
    for query in ["?config=%zz", "?config=@@@", "?config=WzEsMl0%3D", "?config", "?other=1"] {
        let (doc, _, _sync) = start(query);
        assert_eq!(doc.snapshot(), tokens::default_document(), "{query}");
        assert!(!doc.is_dirty(), "{query}");
    }
}

#[test]
fn test_custom_parameter_name() {
    let doc = document();
    let address = MemoryAddress::new("");
    let config = StudioConfig::default().with_query_param("theme");
    let _sync = UrlSync::start(&doc, Rc::new(address.clone()), &config);
    doc.set(&paths::drop_cap(), false);
    assert!(address.query().starts_with("?theme="));
}

// =============================================================================
// Change
// =============================================================================

/// Typing into a field rewrites the address many times but history stays put.
#[test]
fn test_changes_replace_without_history() {
    let (doc, address, _sync) = start("");
    let before = address.replacements();
    for slug in ["p", "pl", "plu", "plum"] {
        doc.set(&paths::color().key("slugDraft"), slug);
    }
    assert_eq!(address.history_len(), 1);
    assert_eq!(address.replacements(), before + 4);
}

#[test]
fn test_address_tracks_dirty_state() {
    let (doc, address, _sync) = start("");
    assert_eq!(address.query(), "?config");

    doc.set(&paths::custom_padding(), true);
    let decoded = decode(&payload(&address)).unwrap();
    assert_eq!(decoded, doc.snapshot());

    doc.reset();
    assert_eq!(address.query(), "?config");
}

/// Setting a value back to its default still counts as a change.
#[test]
fn test_reverting_by_hand_stays_dirty() {
    let (doc, address, _sync) = start("");
    doc.set(&paths::drop_cap(), false);
    doc.set(&paths::drop_cap(), true);
    assert!(doc.is_dirty());
    assert_ne!(address.query(), "?config");
}

#[test]
fn test_dropping_sync_stops_rewrites() {
    let (doc, address, sync) = start("");
    drop(sync);
    let before = address.replacements();
    doc.set(&paths::link_color(), true);
    assert_eq!(address.replacements(), before);
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_encoding_round_trips_unicode_and_numbers() {
    let tree: Value = json!({
        "settings": {
            "typography": { "fontSizes": [{ "slug": "größe", "size": 16 }] },
            "ratio": 1.25,
            "nested": { "empty": {}, "list": [] }
        }
    })
    .into();
    let encoded = encode(&tree);
    assert!(encoded.bytes().all(|b| b.is_ascii_alphanumeric() || b"%-_.!~*'()".contains(&b)));
    assert_eq!(decode(&encoded).unwrap(), tree);
}
