//! Derived views of the document for the preview pane.

use themekit_store::{Value, resolve};

use crate::tokens::paths;

/// The document as indented JSON, ready to copy into a theme file.
pub fn json_preview(tree: &Value) -> String {
    format!("{:#}", tree.to_json())
}

/// Style snippets driven by the first three palette entries.
///
/// Entry 0 colors body text, entry 1 the page background, entry 2 the
/// separator. A snippet exists only when its entry does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewStyles {
    pub text: Option<String>,
    pub background: Option<String>,
    pub separator: Option<String>,
}

impl PreviewStyles {
    pub fn from_tree(tree: &Value) -> Self {
        let palette = resolve::read(tree, &paths::palette())
            .and_then(Value::as_list)
            .unwrap_or_default();
        let color = |index: usize| {
            palette.get(index).map(|entry| {
                entry
                    .get("color")
                    .and_then(Value::as_str)
                    .filter(|color| !color.is_empty())
                    .unwrap_or("initial")
                    .to_string()
            })
        };

        Self {
            text: color(0).map(|color| {
                format!(
                    "body {{\n\tcolor: {color};\n}}\n\n.wp-block-pullquote::before {{\n\tcolor: {color};\n}}\n"
                )
            }),
            background: color(1)
                .map(|color| format!("body {{\n\tbackground-color: {color};\n}}\n")),
            separator: color(2)
                .map(|color| format!("hr.wp-block-separator {{\n\tcolor: {color};\n}}\n")),
        }
    }

    pub fn to_css(&self) -> String {
        [&self.text, &self.background, &self.separator]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn preview_styles(tree: &Value) -> String {
    PreviewStyles::from_tree(tree).to_css()
}
