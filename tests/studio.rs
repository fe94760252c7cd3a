//! End-to-end tests for an editing session.

use std::{cell::Cell, rc::Rc};

use serde_json::json;
use themekit::{
    Address, MemoryAddress, Selector, StudioConfig, ThemeStudio, Value,
    tokens::{Collection, FixedEntry, paths},
    url_sync::encode_uri_component,
};

fn studio_at(query: &str) -> (ThemeStudio, MemoryAddress) {
    let address = MemoryAddress::new(query);
    let studio = ThemeStudio::new(StudioConfig::default().with_seed(11), Rc::new(address.clone()));
    (studio, address)
}

fn entry(slug: &str, color: &str) -> Value {
    json!({ "slug": slug, "color": color }).into()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_set_link_marks_change() {
    let (studio, address) = studio_at("");
    studio.set(&paths::link_color(), true);
    assert_eq!(studio.get(&paths::link_color()), Some(Value::Bool(true)));
    assert!(studio.has_change());
    assert!(address.query().starts_with("?config="));
}

#[test]
fn test_add_to_empty_palette() {
    let (studio, _) = studio_at("");
    studio.add(&paths::palette(), FixedEntry(entry("red", "#ff0000")));
    let expected: Value = json!([{ "slug": "red", "color": "#ff0000" }]).into();
    assert_eq!(studio.get(&paths::palette()), Some(expected));
}

#[test]
fn test_remove_middle_palette_entry() {
    let (studio, _) = studio_at("");
    for (slug, color) in [("red", "#ff0000"), ("green", "#008000"), ("blue", "#0000ff")] {
        studio.add(&paths::palette(), FixedEntry(entry(slug, color)));
    }
    studio.remove(&paths::palette(), 1);

    let expected: Value = json!([
        { "slug": "red", "color": "#ff0000" },
        { "slug": "blue", "color": "#0000ff" }
    ])
    .into();
    assert_eq!(studio.get(&paths::palette()), Some(expected));
}

#[test]
fn test_invalid_json_link_loads_default() {
    let payload = encode_uri_component("bm90IGpzb24=");
    let (studio, address) = studio_at(&format!("?config={payload}"));
    assert!(!studio.has_change());
    assert_eq!(studio.document().snapshot(), themekit::tokens::default_document());
    assert_eq!(address.query(), "?config");
}

// =============================================================================
// Session behavior
// =============================================================================

/// Subscribers created after start see the loaded document, not the default.
#[test]
fn test_subscribers_start_from_loaded_document() {
    let (source, _) = studio_at("");
    source.set(&paths::custom_line_height(), true);

    let (studio, _) = studio_at(&source.share_query());
    let renders = Rc::new(Cell::new(0));
    let line_height = studio.subscribe(Selector::at(paths::custom_line_height()), {
        let renders = renders.clone();
        move |_| renders.set(renders.get() + 1)
    });
    assert_eq!(line_height.get(), Some(Value::Bool(true)));

    studio.set(&paths::drop_cap(), false);
    assert_eq!(renders.get(), 0);
}

/// An entry removed while another control still holds its id is not
/// mistaken for its neighbour.
#[test]
fn test_entry_ids_survive_concurrent_removal() {
    let (studio, _) = studio_at("");
    for slug in ["a", "b", "c"] {
        studio.add(&paths::palette(), FixedEntry(entry(slug, "#000000")));
    }
    let ids = studio.document().entries(&paths::palette());

    studio.remove(&paths::palette(), 0);
    studio.document().update_entry(&paths::palette(), ids[2], json!({ "color": "#ffffff" }));
    studio.remove_entry(&paths::palette(), ids[0]);

    let expected: Value = json!([
        { "slug": "b", "color": "#000000" },
        { "slug": "c", "color": "#ffffff" }
    ])
    .into();
    assert_eq!(studio.get(&paths::palette()), Some(expected));
}

#[test]
fn test_random_entries_are_distinct_per_add() {
    let (studio, _) = studio_at("");
    for _ in 0..8 {
        studio.add_random(Collection::Gradients);
    }
    let gradients = studio.get(&paths::gradients()).unwrap();
    let items = gradients.as_list().unwrap();
    assert_eq!(items.len(), 8);
    assert!(items.iter().any(|item| item != &items[0]));
}

#[test]
fn test_reset_restores_defaults_and_link() {
    let (studio, address) = studio_at("");
    studio.add_palette_color();
    studio.set(&paths::custom_padding(), true);
    studio.reset();
    studio.reset();

    assert!(!studio.has_change());
    assert_eq!(studio.document().snapshot(), themekit::tokens::default_document());
    assert_eq!(address.query(), "?config");
    assert_eq!(address.history_len(), 1);
}

#[test]
fn test_previews_follow_document() {
    let (studio, _) = studio_at("");
    assert_eq!(studio.preview_styles(), "");
    studio.add(&paths::palette(), FixedEntry(entry("ink", "#111111")));
    studio.update_at(&paths::palette(), 0, json!({ "color": "#222222" }));

    assert!(studio.preview_styles().contains("color: #222222;"));
    assert!(studio.json_preview().contains("\"slug\": \"ink\""));
}

#[test]
fn test_search_query_round_trip() {
    let (studio, _) = studio_at("");
    assert_eq!(studio.search_query().get(), "");
    studio.set_search_query("gradient");
    assert_eq!(studio.search_query().get(), "gradient");
    let keys: Vec<_> = studio.visible_fields().iter().map(|field| field.key).collect();
    assert_eq!(keys, ["settings.color.customGradient", "settings.color.gradients"]);
}
