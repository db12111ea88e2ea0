//! Content-addressed validator for any pipeline stage's inputs and outputs.
//!
//! A [`FingerprintKey`] is an insertion-ordered label -> value mapping. Each
//! pipeline stage (mapping merge, jar merge/remap, library acquisition,
//! decompilation) builds one from its own inputs, writes it alongside its
//! output artifact, and on the next run recomputes an equivalent key from
//! freshly-gathered inputs to decide whether the stage can be skipped.
//!
//! The serialized form is a line-oriented `label=value` text file with
//! `#`-comment support, matching spec §6's fingerprint file format.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

use dvh_util::errors::DvhError;
use dvh_util::hash::sha1_file;

/// A single fingerprint label's value. Hashing is delegated per variant —
/// no shared trait object is needed since the set of kinds is closed.
#[derive(Debug, Clone)]
pub enum FingerprintValue {
    /// An already-computed 40-char hex SHA-1 hash.
    Hash(String),
    /// An opaque literal token (e.g. a tool argument list joined by space).
    Literal(String),
    /// A filesystem path whose SHA-1 is computed lazily, once, on first use,
    /// then memoized (invariant (b): "path values are hashed exactly once
    /// per key"). The memo is shared through `clone()` via the `Rc`, so a
    /// cloned `FingerprintKey` doesn't pay for a second hash either.
    Path(PathBuf, Rc<OnceCell<String>>),
    /// A named dependency whose hash is looked up from the frozen
    /// `dependency_hashes.txt` table embedded at build time.
    Dependency(String),
}

impl FingerprintValue {
    fn path(path: PathBuf) -> Self {
        FingerprintValue::Path(path, Rc::new(OnceCell::new()))
    }

    /// Resolve this value to its final serialized string, hashing path and
    /// dependency values as needed. `lookup_dependency` is supplied by the
    /// caller (normally `dvh_toolchain::dependency_hashes::lookup`) so this
    /// crate stays free of a circular dependency on `dvh-toolchain`.
    fn resolve(
        &self,
        lookup_dependency: &dyn Fn(&str) -> Option<String>,
    ) -> Result<String, DvhError> {
        match self {
            FingerprintValue::Hash(h) => Ok(h.clone()),
            FingerprintValue::Literal(s) => Ok(s.clone()),
            FingerprintValue::Path(p, memo) => match memo.get() {
                Some(hash) => Ok(hash.clone()),
                None => {
                    let hash = sha1_file(p).map_err(DvhError::Io)?;
                    let _ = memo.set(hash.clone());
                    Ok(hash)
                }
            },
            FingerprintValue::Dependency(name) => lookup_dependency(name).ok_or_else(|| {
                DvhError::Generic {
                    message: format!("No declared hash for dependency '{name}'"),
                }
            }),
        }
    }
}

/// An insertion-ordered mapping from string labels to [`FingerprintValue`]s.
///
/// Labels are unique: re-[`put`](FingerprintKey::put)ting a label overwrites
/// its prior value in place, preserving its original insertion position.
#[derive(Debug, Clone, Default)]
pub struct FingerprintKey {
    values: IndexMap<String, FingerprintValue>,
}

impl FingerprintKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label = value`, overwriting any prior value for `label`.
    pub fn put(&mut self, label: impl Into<String>, value: FingerprintValue) -> &mut Self {
        let label = label.into();
        if let Some(slot) = self.values.get_mut(&label) {
            *slot = value;
        } else {
            self.values.insert(label, value);
        }
        self
    }

    pub fn put_hash(&mut self, label: impl Into<String>, hash: impl Into<String>) -> &mut Self {
        self.put(label, FingerprintValue::Hash(hash.into()))
    }

    pub fn put_literal(
        &mut self,
        label: impl Into<String>,
        literal: impl Into<String>,
    ) -> &mut Self {
        self.put(label, FingerprintValue::Literal(literal.into()))
    }

    pub fn put_path(&mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.put(label, FingerprintValue::path(path.into()))
    }

    pub fn put_dependency(
        &mut self,
        label: impl Into<String>,
        dependency_name: impl Into<String>,
    ) -> &mut Self {
        self.put(label, FingerprintValue::Dependency(dependency_name.into()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Serialize to the deterministic `label=value` text form, in insertion
    /// order, resolving path/dependency values along the way.
    pub fn to_text(
        &self,
        lookup_dependency: &dyn Fn(&str) -> Option<String>,
    ) -> Result<String, DvhError> {
        let mut out = String::new();
        for (label, value) in &self.values {
            let resolved = value.resolve(lookup_dependency)?;
            out.push_str(label);
            out.push('=');
            out.push_str(&resolved);
            out.push('\n');
        }
        Ok(out)
    }

    /// Atomically serialize and write this key to `path`.
    pub fn write(
        &self,
        path: &Path,
        lookup_dependency: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), DvhError> {
        let text = self.to_text(lookup_dependency)?;
        dvh_util::fs::write_atomic(path, text.as_bytes()).map_err(DvhError::Io)
    }

    /// Check whether this (freshly computed) key matches the key stored at
    /// `stored_file`, restricted to `allowed_labels` if given (default: the
    /// intersection of labels present in both keys). A missing file is
    /// always invalid.
    pub fn is_valid(
        &self,
        stored_file: &Path,
        allowed_labels: Option<&[&str]>,
        lookup_dependency: &dyn Fn(&str) -> Option<String>,
    ) -> Result<bool, DvhError> {
        if !stored_file.is_file() {
            return Ok(false);
        }
        let stored_text = std::fs::read_to_string(stored_file).map_err(DvhError::Io)?;
        let stored = parse_text(&stored_text);
        let current = self.to_resolved_map(lookup_dependency)?;

        let labels: BTreeSet<&str> = match allowed_labels {
            Some(subset) => subset.iter().copied().collect(),
            None => current
                .keys()
                .map(String::as_str)
                .filter(|l| stored.contains_key(*l))
                .collect(),
        };

        if labels.is_empty() {
            return Ok(false);
        }

        for label in labels {
            match (current.get(label), stored.get(label)) {
                (Some(a), Some(b)) if a == b => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    fn to_resolved_map(
        &self,
        lookup_dependency: &dyn Fn(&str) -> Option<String>,
    ) -> Result<IndexMap<String, String>, DvhError> {
        let mut map = IndexMap::new();
        for (label, value) in &self.values {
            map.insert(label.clone(), value.resolve(lookup_dependency)?);
        }
        Ok(map)
    }
}

/// Parse the line-oriented `label=value` form, skipping blank lines and
/// lines beginning with `#`.
fn parse_text(text: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((label, value)) = line.split_once('=') {
            map.insert(label.to_string(), value.to_string());
        }
    }
    map
}
