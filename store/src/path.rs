//! Paths into the document tree.
//!
//! A path is a sequence of steps, each either a map key or a list index, and
//! is written `settings.color.palette[2].slug`. Paths are the only way the
//! engine addresses a location; no component hands out references into the
//! tree.
//!
//! Prefer the builder (`Path::root().key("settings").index(2)`) or the typed
//! constructors the application defines for its known fields. String parsing
//! exists for paths that arrive as data.

use std::{fmt, str::FromStr};

use smallvec::SmallVec;

use crate::error::PathError;

/// A single step in a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seg {
    /// Map key access: `.key`
    Key(String),
    /// List index access: `[index]`
    Index(usize),
}

impl Seg {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            Seg::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Key(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A location in the document tree. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(SmallVec<[Seg; 6]>);

impl Path {
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Seg>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// Append a key step (builder style).
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index step (builder style).
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// A new path extended by one step.
    pub fn join(&self, seg: impl Into<Seg>) -> Self {
        let mut next = self.clone();
        next.0.push(seg.into());
        next
    }

    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// The path with its last step removed, or `None` at the root.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.0.pop();
        Some(parent)
    }

    /// True when `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True when the two paths are equal or one contains the other.
    ///
    /// A change at `a.b` is relevant to watchers of `a`, `a.b` and `a.b.c`,
    /// but not to watchers of `a.x`.
    pub fn is_related(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Parse a path string.
    ///
    /// Grammar: `step ( '.' key | '[' digits ']' )*` where the first step is a
    /// key or an index. Keys are non-empty and may not contain `.`, `[` or
    /// `]`. The empty string parses to the root path.
    pub fn parse(input: &str) -> Result<Path, PathError> {
        let bytes = input.as_bytes();
        let mut segments = SmallVec::new();
        let mut pos = 0;

        if bytes.is_empty() {
            return Ok(Path(segments));
        }

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let start = pos + 1;
                    let Some(len) = bytes[start..].iter().position(|b| *b == b']') else {
                        return Err(PathError::invalid(input, pos, "unclosed `[`"));
                    };
                    let digits = &input[start..start + len];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(PathError::invalid(input, start, "index must be a non-negative integer"));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| PathError::invalid(input, start, "index out of range"))?;
                    segments.push(Seg::Index(index));
                    pos = start + len + 1;
                }
                b'.' => {
                    if segments.is_empty() {
                        return Err(PathError::invalid(input, pos, "path cannot start with `.`"));
                    }
                    pos += 1;
                    if pos == bytes.len() {
                        return Err(PathError::invalid(input, pos, "path cannot end with `.`"));
                    }
                    if matches!(bytes[pos], b'.' | b'[') {
                        return Err(PathError::invalid(input, pos, "expected a key after `.`"));
                    }
                    pos = Self::parse_key(input, pos, &mut segments)?;
                }
                b']' => return Err(PathError::invalid(input, pos, "unexpected `]`")),
                _ => {
                    if !segments.is_empty() {
                        return Err(PathError::invalid(input, pos, "expected `.` or `[`"));
                    }
                    pos = Self::parse_key(input, pos, &mut segments)?;
                }
            }
        }

        Ok(Path(segments))
    }

    fn parse_key(
        input: &str,
        start: usize,
        segments: &mut SmallVec<[Seg; 6]>,
    ) -> Result<usize, PathError> {
        let bytes = input.as_bytes();
        let end = bytes[start..]
            .iter()
            .position(|b| matches!(b, b'.' | b'[' | b']'))
            .map_or(bytes.len(), |len| start + len);
        if bytes.get(end) == Some(&b']') {
            return Err(PathError::invalid(input, end, "unexpected `]`"));
        }
        segments.push(Seg::Key(input[start..end].to_string()));
        Ok(end)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Seg::Key(k) if i == 0 => f.write_str(k)?,
                Seg::Key(k) => write!(f, ".{k}")?,
                Seg::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Build a [`Path`] from literal steps: `path!["settings", "color", "palette", 2]`.
#[macro_export]
macro_rules! path {
    () => { $crate::Path::root() };
    ($($seg:expr),+ $(,)?) => {
        $crate::Path::from_segments([$($crate::Seg::from($seg)),+])
    };
}
