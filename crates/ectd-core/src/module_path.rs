//! # CTD Module Paths
//!
//! Defines `ModulePath`, the dotted hierarchical identifier (`m1.3`,
//! `m2.7.1`) that places a document inside the CTD taxonomy.
//!
//! ## Invariants
//!
//! - Paths are normalized at construction: trimmed, lowercased, `/` and `\`
//!   separators folded to `.`. Two spellings of the same path always compare
//!   equal after construction.
//! - The first segment must name a CTD module `m1`..`m5`; the remaining
//!   segments are lowercase alphanumerics (`3`, `14`, `s`, `p1`).
//! - `rel_dir()` is the single dotted-path → directory mapping in the stack
//!   (`m1.3` → `m1/3`). Both the placement engine and the manifest writer
//!   resolve through it, so the on-disk layout and the backbone index cannot
//!   diverge.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ModulePathError;

/// A validated, normalized CTD module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath {
    normalized: String,
}

impl ModulePath {
    /// Parse and normalize a module path.
    ///
    /// # Errors
    ///
    /// Returns [`ModulePathError`] if the path is empty, does not start with
    /// a CTD module segment `m1`..`m5`, or contains an invalid segment.
    pub fn parse(input: &str) -> Result<Self, ModulePathError> {
        let folded = input
            .trim()
            .to_ascii_lowercase()
            .replace(['/', '\\'], ".");

        if folded.is_empty() {
            return Err(ModulePathError::Empty);
        }

        let segments: Vec<&str> = folded.split('.').collect();

        let root = segments[0];
        let is_ctd_root = root.len() == 2
            && root.starts_with('m')
            && matches!(root.as_bytes()[1], b'1'..=b'5');
        if !is_ctd_root {
            return Err(ModulePathError::BadRoot {
                path: input.to_string(),
                segment: root.to_string(),
            });
        }

        for segment in &segments[1..] {
            let valid = !segment.is_empty()
                && segment.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
            if !valid {
                return Err(ModulePathError::BadSegment {
                    path: input.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self { normalized: folded })
    }

    /// The normalized dotted form (`m1.3`).
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The path segments (`["m1", "3"]`).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.normalized.split('.')
    }

    /// The top-level CTD module (`m1`..`m5`).
    pub fn top_level(&self) -> &str {
        self.normalized.split('.').next().unwrap_or(&self.normalized)
    }

    /// The relative directory for this path under a sequence root.
    ///
    /// Each dotted level nests one directory: `m1.3` → `m1/3`,
    /// `m2.7.1` → `m2/7/1`. Downstream schema validators depend on this
    /// layout, so it is defined exactly once, here.
    pub fn rel_dir(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Whether `self` equals `ancestor` or lies below it in the taxonomy.
    ///
    /// A slot at `m1.3.1` satisfies a requirement at `m1.3`; a slot at
    /// `m1.30` does not (segment-wise comparison, not string prefix).
    pub fn is_within(&self, ancestor: &ModulePath) -> bool {
        let mut own = self.segments();
        for required in ancestor.segments() {
            match own.next() {
                Some(segment) if segment == required => {}
                _ => return false,
            }
        }
        true
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl FromStr for ModulePath {
    type Err = ModulePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ModulePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.normalized)
    }
}

impl<'de> Deserialize<'de> for ModulePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ModulePath::parse(&raw).map_err(de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn valid_path_strategy() -> impl Strategy<Value = String> {
        (
            1u8..=5,
            prop::collection::vec("[0-9a-z]{1,3}", 0..4),
        )
            .prop_map(|(root, tail)| {
                let mut s = format!("m{root}");
                for seg in tail {
                    s.push('.');
                    s.push_str(&seg);
                }
                s
            })
    }

    proptest! {
        /// Normalization is idempotent: parsing the normalized form yields
        /// the same path.
        #[test]
        fn parse_is_idempotent(raw in valid_path_strategy()) {
            let first = ModulePath::parse(&raw).unwrap();
            let second = ModulePath::parse(first.as_str()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Case and separator variants of the same path compare equal.
        #[test]
        fn case_variants_equal(raw in valid_path_strategy()) {
            let upper = raw.to_ascii_uppercase();
            let slashed = raw.replace('.', "/");
            let a = ModulePath::parse(&raw).unwrap();
            prop_assert_eq!(a.clone(), ModulePath::parse(&upper).unwrap());
            prop_assert_eq!(a, ModulePath::parse(&slashed).unwrap());
        }

        /// Every path is within itself.
        #[test]
        fn path_is_within_itself(raw in valid_path_strategy()) {
            let p = ModulePath::parse(&raw).unwrap();
            prop_assert!(p.is_within(&p));
        }

        /// rel_dir has exactly one component per dotted segment.
        #[test]
        fn rel_dir_component_count(raw in valid_path_strategy()) {
            let p = ModulePath::parse(&raw).unwrap();
            prop_assert_eq!(p.rel_dir().components().count(), p.segments().count());
        }
    }
}
