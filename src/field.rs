//! Form controls bound to document paths.
//!
//! A control reads its value through a path subscription, so edits made
//! elsewhere (a reset, a loaded link, another control) show up in it, and
//! writes its value back with [`ConfigDocument::try_set`].

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
    time::Duration,
};

use themekit_store::{ConfigDocument, Path, Selector, Subscription, Value};

use crate::timer::{Scheduler, TimerToken};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{text:?} was rejected by the field's validation")]
    Rejected { text: String },
    #[error("{0:?} is not a boolean")]
    NotABool(String),
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("{0:?} fields are not edited as text")]
    NotText(FieldKind),
    #[error("`{path}` no longer addresses an existing entry")]
    Detached { path: String },
}

/// How a field's value is shown and typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Toggle,
    Text,
    Number,
    /// Comma separated strings, like a list of CSS units.
    TextList,
    /// A collection of records edited entry by entry.
    Entries,
}

impl FieldKind {
    /// Convert typed text into a document value.
    pub fn parse(self, text: &str) -> Result<Value, FieldError> {
        match self {
            FieldKind::Toggle => match text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(FieldError::NotABool(other.to_string())),
            },
            FieldKind::Text => Ok(Value::from(text)),
            FieldKind::Number => {
                let trimmed = text.trim();
                if let Ok(int) = trimmed.parse::<i64>() {
                    return Ok(Value::from(int));
                }
                match trimmed.parse::<f64>() {
                    Ok(float) if float.is_finite() => Ok(Value::from(float)),
                    _ => Err(FieldError::NotANumber(trimmed.to_string())),
                }
            }
            FieldKind::TextList => Ok(text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(Value::from)
                .collect()),
            FieldKind::Entries => Err(FieldError::NotText(self)),
        }
    }

    /// Render a document value as editable text. Absent values render empty.
    pub fn format(self, value: Option<&Value>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match (self, value) {
            (_, Value::Null) => String::new(),
            (_, Value::String(text)) => text.to_string(),
            (FieldKind::TextList, Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.to_string(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            (_, other) => other.to_string(),
        }
    }
}

/// Advisory, field-local validation of typed text.
#[derive(Clone)]
pub enum Validation {
    /// The text must match the pattern somewhere.
    Pattern(regex_lite::Regex),
    Predicate(Rc<dyn Fn(&str) -> bool>),
}

impl Validation {
    pub fn pattern(pattern: &str) -> Result<Self, regex_lite::Error> {
        regex_lite::Regex::new(pattern).map(Validation::Pattern)
    }

    pub fn predicate(accepts: impl Fn(&str) -> bool + 'static) -> Self {
        Validation::Predicate(Rc::new(accepts))
    }

    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Validation::Pattern(regex) => regex.is_match(text),
            Validation::Predicate(accepts) => accepts(text),
        }
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Validation::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

struct TextState {
    document: ConfigDocument,
    path: Path,
    kind: FieldKind,
    validation: RefCell<Option<Validation>>,
    draft: RefCell<String>,
    committed: RefCell<String>,
    scheduler: Scheduler,
    timer: Cell<TimerToken>,
}

impl TextState {
    fn cancel_timer(&self) {
        let token = self.timer.replace(TimerToken::INVALID);
        if token != TimerToken::INVALID {
            self.scheduler.cancel(token);
        }
    }

    fn revert(&self) {
        let committed = self.committed.borrow().clone();
        *self.draft.borrow_mut() = committed;
    }

    fn commit(&self) -> Result<(), FieldError> {
        self.cancel_timer();
        let text = self.draft.borrow().clone();

        let accepted = self
            .validation
            .borrow()
            .as_ref()
            .is_none_or(|validation| validation.accepts(&text));
        if !accepted {
            tracing::debug!(path = %self.path, %text, "draft rejected, reverting");
            self.revert();
            return Err(FieldError::Rejected { text });
        }

        let value = match self.kind.parse(&text) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(path = %self.path, %err, "draft unparseable, reverting");
                self.revert();
                return Err(err);
            }
        };

        let shown = self.kind.format(Some(&value));
        if !self.document.try_set(&self.path, value) {
            tracing::debug!(path = %self.path, "field path is gone, reverting");
            self.revert();
            return Err(FieldError::Detached {
                path: self.path.to_string(),
            });
        }
        *self.draft.borrow_mut() = shown.clone();
        *self.committed.borrow_mut() = shown;
        Ok(())
    }
}

/// A text input bound to a path.
///
/// Typing edits a draft. The draft reaches the document on
/// [`commit`](Self::commit), or after a delay with
/// [`commit_after`](Self::commit_after). A draft that fails validation is
/// discarded in favour of the last committed text.
pub struct TextControl {
    state: Rc<TextState>,
    _subscription: Subscription<Option<Value>>,
}

impl TextControl {
    pub fn new(document: &ConfigDocument, path: Path, kind: FieldKind, scheduler: &Scheduler) -> Self {
        let text = kind.format(document.get(&path).as_ref());
        let state = Rc::new(TextState {
            document: document.clone(),
            path: path.clone(),
            kind,
            validation: RefCell::new(None),
            draft: RefCell::new(text.clone()),
            committed: RefCell::new(text),
            scheduler: scheduler.clone(),
            timer: Cell::new(TimerToken::INVALID),
        });

        let subscription = {
            let state = Rc::downgrade(&state);
            document.subscribe(Selector::at(path), move |value| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let text = state.kind.format(value.as_ref());
                *state.draft.borrow_mut() = text.clone();
                *state.committed.borrow_mut() = text;
            })
        };

        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn validate(self, validation: Validation) -> Self {
        *self.state.validation.borrow_mut() = Some(validation);
        self
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn kind(&self) -> FieldKind {
        self.state.kind
    }

    /// The text currently in the input.
    pub fn draft(&self) -> String {
        self.state.draft.borrow().clone()
    }

    /// The text as of the last accepted commit or external change.
    pub fn committed(&self) -> String {
        self.state.committed.borrow().clone()
    }

    /// Replace the draft. A pending delayed commit is cancelled.
    pub fn input(&self, text: impl Into<String>) {
        self.state.cancel_timer();
        *self.state.draft.borrow_mut() = text.into();
    }

    /// Validate and write the draft.
    pub fn commit(&self) -> Result<(), FieldError> {
        self.state.commit()
    }

    /// Commit the draft once `delay` has elapsed on the scheduler, replacing
    /// any delayed commit already pending.
    pub fn commit_after(&self, delay: Duration) -> TimerToken {
        self.state.cancel_timer();
        let state: Weak<TextState> = Rc::downgrade(&self.state);
        let token = self.state.scheduler.exec_after(delay, move |token| {
            let Some(state) = state.upgrade() else {
                return;
            };
            if state.timer.get() != token {
                return;
            }
            state.timer.set(TimerToken::INVALID);
            if let Err(err) = state.commit() {
                tracing::debug!(path = %state.path, %err, "delayed commit rejected");
            }
        });
        self.state.timer.set(token);
        token
    }

    pub fn has_pending_commit(&self) -> bool {
        self.state.timer.get() != TimerToken::INVALID
    }
}

impl Drop for TextControl {
    fn drop(&mut self) {
        self.state.cancel_timer();
    }
}

impl fmt::Debug for TextControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextControl")
            .field("path", &self.state.path)
            .field("kind", &self.state.kind)
            .field("draft", &*self.state.draft.borrow())
            .finish_non_exhaustive()
    }
}

/// A switch bound to a boolean at a path. Anything but `true` reads as off.
pub struct Toggle {
    document: ConfigDocument,
    path: Path,
    subscription: Subscription<Option<Value>>,
}

impl Toggle {
    pub fn new(document: &ConfigDocument, path: Path) -> Self {
        let subscription = document.subscribe(Selector::at(path.clone()), |_| {});
        Self {
            document: document.clone(),
            path,
            subscription,
        }
    }

    pub fn is_on(&self) -> bool {
        self.subscription
            .with(|value| value.as_ref().and_then(Value::as_bool).unwrap_or(false))
    }

    pub fn set(&self, on: bool) {
        self.document.set(&self.path, on);
    }

    pub fn toggle(&self) {
        self.set(!self.is_on());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_list_splits_and_trims() {
        let value = FieldKind::TextList.parse(" px, em ,, rem ,").unwrap();
        let expected: Value = ["px", "em", "rem"].into_iter().map(Value::from).collect();
        assert_eq!(value, expected);
        assert_eq!(FieldKind::TextList.format(Some(&value)), "px,em,rem");
        assert_eq!(FieldKind::TextList.parse("  ").unwrap(), Value::empty_list());
    }

    #[test]
    fn numbers_and_bools() {
        assert_eq!(FieldKind::Number.parse(" 16 ").unwrap(), Value::from(16i64));
        assert_eq!(FieldKind::Number.parse("1.5").unwrap(), Value::from(1.5));
        assert!(matches!(FieldKind::Number.parse("big"), Err(FieldError::NotANumber(_))));
        assert!(matches!(FieldKind::Number.parse("NaN"), Err(FieldError::NotANumber(_))));
        assert_eq!(FieldKind::Toggle.parse("true").unwrap(), Value::Bool(true));
        assert!(matches!(FieldKind::Toggle.parse("yes"), Err(FieldError::NotABool(_))));
        assert_eq!(
            FieldKind::Entries.parse("[]"),
            Err(FieldError::NotText(FieldKind::Entries))
        );
    }

    #[test]
    fn format_absent_and_scalars() {
        assert_eq!(FieldKind::Text.format(None), "");
        assert_eq!(FieldKind::Text.format(Some(&Value::Null)), "");
        assert_eq!(FieldKind::Text.format(Some(&Value::from("plum"))), "plum");
        assert_eq!(FieldKind::Number.format(Some(&Value::from(32i64))), "32");
    }

    #[test]
    fn validation_kinds() {
        let hex = Validation::pattern("^#[0-9a-fA-F]{6}$").unwrap();
        assert!(hex.accepts("#dda0dd"));
        assert!(!hex.accepts("plum"));
        let short = Validation::predicate(|text| text.len() <= 3);
        assert!(short.accepts("px"));
        assert!(!short.accepts("pixels"));
        assert!(Validation::pattern("(").is_err());
    }
}
