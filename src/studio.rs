use std::{cell::RefCell, rc::Rc};

use themekit_store::{ConfigDocument, EntryId, Path, Selector, Subscription, Value};

use crate::{
    config::StudioConfig,
    field::{FieldKind, TextControl, Toggle},
    search::SearchQuery,
    timer::Scheduler,
    tokens::{self, Collection, EntryFactory, FieldSpec, RandomEntries},
    url_sync::{Address, UrlSync},
};

/// One editing session: the document, its address synchronization, the
/// search box and the timers that drive delayed commits.
pub struct ThemeStudio {
    config: StudioConfig,
    document: ConfigDocument,
    url_sync: UrlSync,
    search: SearchQuery,
    scheduler: Scheduler,
    entries: RefCell<RandomEntries>,
}

impl ThemeStudio {
    /// Start a session. A configuration carried by `address` replaces the
    /// default document before anything else can subscribe.
    pub fn new(config: StudioConfig, address: Rc<dyn Address>) -> Self {
        let document = ConfigDocument::new(tokens::default_document());
        let url_sync = UrlSync::start(&document, address, &config);
        let entries = RefCell::new(RandomEntries::new(config.seed));
        tracing::debug!(dirty = document.is_dirty(), "theme studio started");
        Self {
            config,
            document,
            url_sync,
            search: SearchQuery::new(),
            scheduler: Scheduler::new(),
            entries,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn get(&self, path: &Path) -> Option<Value> {
        self.document.get(path)
    }

    pub fn set(&self, path: &Path, value: impl Into<Value>) {
        self.document.set(path, value);
    }

    pub fn subscribe<T: Clone + 'static>(
        &self,
        selector: Selector<T>,
        on_change: impl Fn(&T) + 'static,
    ) -> Subscription<T> {
        self.document.subscribe(selector, on_change)
    }

    pub fn add(&self, path: &Path, mut factory: impl EntryFactory) {
        self.document.add(path, || factory.create());
    }

    pub fn remove(&self, path: &Path, index: usize) {
        self.document.remove(path, index);
    }

    pub fn remove_entry(&self, path: &Path, id: EntryId) {
        self.document.remove_entry(path, id);
    }

    pub fn update_at(&self, path: &Path, index: usize, value: impl Into<Value>) {
        self.document.update_at(path, index, value);
    }

    pub fn reset(&self) {
        self.document.reset();
    }

    /// Whether anything was edited since the session started or was reset.
    pub fn has_change(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn search_query(&self) -> &SearchQuery {
        &self.search
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.search.set(query);
    }

    /// Catalog fields that match the current search.
    pub fn visible_fields(&self) -> Vec<&'static FieldSpec> {
        tokens::FIELDS
            .iter()
            .filter(|field| self.search.is_visible(field.tag()))
            .collect()
    }

    /// Append a random entry to `collection`.
    pub fn add_random(&self, collection: Collection) {
        let entry = self.entries.borrow_mut().entry(collection);
        self.document.add(&collection.path(), || entry);
    }

    pub fn add_palette_color(&self) {
        self.add_random(Collection::Palette);
    }

    pub fn add_gradient(&self) {
        self.add_random(Collection::Gradients);
    }

    pub fn add_font_size(&self) {
        self.add_random(Collection::FontSizes);
    }

    /// A text control for `path`, sharing this session's scheduler.
    pub fn text_control(&self, path: Path, kind: FieldKind) -> TextControl {
        TextControl::new(&self.document, path, kind, &self.scheduler)
    }

    pub fn toggle(&self, path: Path) -> Toggle {
        Toggle::new(&self.document, path)
    }

    /// The address query for the current state.
    pub fn share_query(&self) -> String {
        self.document.with(|tree| {
            crate::url_sync::query_for(self.url_sync.param(), tree, self.document.is_dirty())
        })
    }

    pub fn json_preview(&self) -> String {
        self.document.with(crate::preview::json_preview)
    }

    pub fn preview_styles(&self) -> String {
        self.document.with(crate::preview::preview_styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tokens::paths, url_sync::MemoryAddress};

    fn studio() -> (ThemeStudio, MemoryAddress) {
        let address = MemoryAddress::new("");
        let studio = ThemeStudio::new(StudioConfig::default().with_seed(3), Rc::new(address.clone()));
        (studio, address)
    }

    #[test]
    fn fresh_session_is_clean() {
        let (studio, address) = studio();
        assert!(!studio.has_change());
        assert_eq!(address.query(), "?config");
        assert_eq!(studio.share_query(), "?config");
        assert_eq!(studio.get(&paths::drop_cap()), Some(Value::Bool(true)));
    }

    #[test]
    fn collection_helpers_grow_lists() {
        let (studio, _address) = studio();
        studio.add_palette_color();
        studio.add_palette_color();
        studio.add_gradient();
        studio.add_font_size();

        let len = |path: Path| studio.get(&path).map_or(0, |list| list.len());
        assert_eq!(len(paths::palette()), 2);
        assert_eq!(len(paths::gradients()), 1);
        assert_eq!(len(paths::font_sizes()), 1);
        assert!(studio.has_change());
        assert!(studio.preview_styles().contains("body {"));
    }

    #[test]
    fn search_narrows_catalog() {
        let (studio, _address) = studio();
        assert_eq!(studio.visible_fields().len(), tokens::FIELDS.len());
        studio.set_search_query("TYPOGRAPHY");
        let visible = studio.visible_fields();
        assert_eq!(visible.len(), 4);
        assert!(visible.iter().all(|field| field.key.starts_with("settings.typography")));
    }
}
