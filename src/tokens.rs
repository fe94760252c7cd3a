//! The theme token schema: default document, typed paths, the field catalog
//! and the factories that fabricate new list entries.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::json;
use themekit_store::{Path, Seg, Value, path};

use crate::field::FieldKind;

/// The document a fresh session starts from.
pub fn default_document() -> Value {
    json!({
        "settings": {
            "color": {
                "custom": true,
                "customGradient": true,
                "link": false,
                "palette": [],
                "gradients": []
            },
            "spacing": {
                "customPadding": false,
                "units": ["px", "em", "rem", "vh", "vw"]
            },
            "typography": {
                "customFontSize": true,
                "customLineHeight": false,
                "dropCap": true,
                "fontSizes": []
            }
        }
    })
    .into()
}

/// Typed paths for every known field.
pub mod paths {
    use super::*;

    pub fn color() -> Path {
        path!["settings", "color"]
    }

    pub fn custom_color() -> Path {
        color().key("custom")
    }

    pub fn custom_gradient() -> Path {
        color().key("customGradient")
    }

    pub fn link_color() -> Path {
        color().key("link")
    }

    pub fn palette() -> Path {
        color().key("palette")
    }

    pub fn palette_entry(index: usize) -> Path {
        palette().index(index)
    }

    pub fn gradients() -> Path {
        color().key("gradients")
    }

    pub fn gradient_entry(index: usize) -> Path {
        gradients().index(index)
    }

    pub fn spacing() -> Path {
        path!["settings", "spacing"]
    }

    pub fn custom_padding() -> Path {
        spacing().key("customPadding")
    }

    pub fn units() -> Path {
        spacing().key("units")
    }

    pub fn typography() -> Path {
        path!["settings", "typography"]
    }

    pub fn custom_font_size() -> Path {
        typography().key("customFontSize")
    }

    pub fn custom_line_height() -> Path {
        typography().key("customLineHeight")
    }

    pub fn drop_cap() -> Path {
        typography().key("dropCap")
    }

    pub fn font_sizes() -> Path {
        typography().key("fontSizes")
    }

    pub fn font_size_entry(index: usize) -> Path {
        font_sizes().index(index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Color,
    Spacing,
    Typography,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Color, Category::Spacing, Category::Typography];

    pub fn label(self) -> &'static str {
        match self {
            Category::Color => "Color",
            Category::Spacing => "Spacing",
            Category::Typography => "Typography",
        }
    }

    pub fn path(self) -> Path {
        match self {
            Category::Color => paths::color(),
            Category::Spacing => paths::spacing(),
            Category::Typography => paths::typography(),
        }
    }

    pub fn fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(move |field| field.category == self)
    }
}

/// A settings field as the editor presents it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Dotted key path. Catalog paths contain key steps only.
    pub key: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
    pub category: Category,
}

impl FieldSpec {
    pub fn path(&self) -> Path {
        Path::from_segments(self.key.split('.').map(Seg::from))
    }

    /// The text the search filter matches against.
    pub fn tag(&self) -> &'static str {
        self.key
    }

    /// The collection this field edits, for list fields.
    pub fn collection(&self) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.key() == self.key)
    }
}

pub static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "settings.color.custom",
        label: "Custom",
        help: "Enable custom colors",
        kind: FieldKind::Toggle,
        category: Category::Color,
    },
    FieldSpec {
        key: "settings.color.customGradient",
        label: "Custom Gradient",
        help: "Enable custom gradients",
        kind: FieldKind::Toggle,
        category: Category::Color,
    },
    FieldSpec {
        key: "settings.color.link",
        label: "Link",
        help: "Enables custom link color controls",
        kind: FieldKind::Toggle,
        category: Category::Color,
    },
    FieldSpec {
        key: "settings.color.palette",
        label: "Palette",
        help: "Add custom color presets",
        kind: FieldKind::Entries,
        category: Category::Color,
    },
    FieldSpec {
        key: "settings.color.gradients",
        label: "Gradients",
        help: "Add custom gradient presets",
        kind: FieldKind::Entries,
        category: Category::Color,
    },
    FieldSpec {
        key: "settings.spacing.customPadding",
        label: "Custom Padding",
        help: "Enable padding controls",
        kind: FieldKind::Toggle,
        category: Category::Spacing,
    },
    FieldSpec {
        key: "settings.spacing.units",
        label: "Units",
        help: "Filters unit values",
        kind: FieldKind::TextList,
        category: Category::Spacing,
    },
    FieldSpec {
        key: "settings.typography.customFontSize",
        label: "Custom Font Sizes",
        help: "Enable custom font sizes",
        kind: FieldKind::Toggle,
        category: Category::Typography,
    },
    FieldSpec {
        key: "settings.typography.customLineHeight",
        label: "Custom Line Height",
        help: "Enable line height controls",
        kind: FieldKind::Toggle,
        category: Category::Typography,
    },
    FieldSpec {
        key: "settings.typography.dropCap",
        label: "Dropcap",
        help: "Enable drop cap controls",
        kind: FieldKind::Toggle,
        category: Category::Typography,
    },
    FieldSpec {
        key: "settings.typography.fontSizes",
        label: "Font Sizes",
        help: "Add custom font sizes",
        kind: FieldKind::Entries,
        category: Category::Typography,
    },
];

/// Look up a catalog field by its dotted key.
pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|field| field.key == key)
}

/// The preset collections the editor can grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Palette,
    Gradients,
    FontSizes,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Palette, Collection::Gradients, Collection::FontSizes];

    fn key(self) -> &'static str {
        match self {
            Collection::Palette => "settings.color.palette",
            Collection::Gradients => "settings.color.gradients",
            Collection::FontSizes => "settings.typography.fontSizes",
        }
    }

    pub fn path(self) -> Path {
        match self {
            Collection::Palette => paths::palette(),
            Collection::Gradients => paths::gradients(),
            Collection::FontSizes => paths::font_sizes(),
        }
    }

    /// Entry fields, in display order.
    pub fn entry_fields(self) -> &'static [&'static str] {
        match self {
            Collection::Palette => &["slug", "color"],
            Collection::Gradients => &["slug", "gradient"],
            Collection::FontSizes => &["slug", "size"],
        }
    }
}

/// Produces the value for a new list entry.
///
/// Invoked once per insertion and never memoized.
pub trait EntryFactory {
    fn create(&mut self) -> Value;
}

impl<F: FnMut() -> Value> EntryFactory for F {
    fn create(&mut self) -> Value {
        self()
    }
}

/// A factory that always yields the same entry.
#[derive(Clone, Debug)]
pub struct FixedEntry(pub Value);

impl EntryFactory for FixedEntry {
    fn create(&mut self) -> Value {
        self.0.clone()
    }
}

const NAMED_COLORS: &[(&str, &str)] = &[
    ("azure", "#f0ffff"),
    ("black", "#000000"),
    ("blue", "#0000ff"),
    ("cyan", "#00ffff"),
    ("fuchsia", "#ff00ff"),
    ("gold", "#ffd700"),
    ("green", "#008000"),
    ("indigo", "#4b0082"),
    ("lavender", "#e6e6fa"),
    ("lime", "#00ff00"),
    ("magenta", "#ff00ff"),
    ("maroon", "#800000"),
    ("mint", "#98ff98"),
    ("olive", "#808000"),
    ("orange", "#ffa500"),
    ("orchid", "#da70d6"),
    ("pink", "#ffc0cb"),
    ("plum", "#dda0dd"),
    ("purple", "#800080"),
    ("red", "#ff0000"),
    ("salmon", "#fa8072"),
    ("silver", "#c0c0c0"),
    ("tan", "#d2b48c"),
    ("teal", "#008080"),
    ("turquoise", "#40e0d0"),
    ("violet", "#ee82ee"),
    ("white", "#ffffff"),
    ("yellow", "#ffff00"),
];

const FONT_SIZE_PRESETS: &[(&str, i64)] = &[
    ("x-small", 10),
    ("small", 14),
    ("medium", 16),
    ("large", 20),
    ("x-large", 32),
];

/// Random demo entries for each collection.
pub struct RandomEntries {
    rng: StdRng,
}

impl RandomEntries {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn entry(&mut self, collection: Collection) -> Value {
        match collection {
            Collection::Palette => self.palette_color(),
            Collection::Gradients => self.gradient(),
            Collection::FontSizes => self.font_size(),
        }
    }

    /// `{ slug, color }` from a named color.
    pub fn palette_color(&mut self) -> Value {
        let (name, hex) = self.named_color();
        json!({ "slug": name, "color": hex }).into()
    }

    /// `{ slug, gradient }` blending two named colors.
    pub fn gradient(&mut self) -> Value {
        let (first, first_hex) = self.named_color();
        let (second, second_hex) = self.named_color();
        json!({
            "slug": format!("{first}-{second}"),
            "gradient": format!("linear-gradient({first_hex} 0%, {second_hex} 100%)"),
        })
        .into()
    }

    /// `{ slug, size }` from the preset scale.
    pub fn font_size(&mut self) -> Value {
        let (slug, size) = FONT_SIZE_PRESETS[self.rng.gen_range(0..FONT_SIZE_PRESETS.len())];
        json!({ "slug": slug, "size": size }).into()
    }

    fn named_color(&mut self) -> (&'static str, &'static str) {
        NAMED_COLORS[self.rng.gen_range(0..NAMED_COLORS.len())]
    }
}
