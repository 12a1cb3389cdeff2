//! Immutable lookup tables derived from the ENSIP-15 `spec.json`.
//!
//! The tables are loaded once, validated, and never mutated afterwards;
//! the whole engine is a pure function over them. Loader faults are fatal
//! [`SpecDataError`]s and are strictly separate from user diagnostics.

use crate::code_points::{nfd_cps, CodePoint, CP_FE0F};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecDataError {
    #[error("failed to read spec data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed spec data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("whole-map key `{0}` is not a code point")]
    BadWholeKey(String),
    #[error("spec data references unknown script group `{0}`")]
    UnknownGroup(String),
    #[error("{0:#06X} is not a Unicode scalar value")]
    InvalidCodePoint(u32),
    #[error("{0:#06X} appears in more than one of mapped/ignored/valid")]
    OverlappingClass(u32),
    #[error("mapping for {0:#06X} is empty or contains an invalid code point")]
    InvalidMapping(u32),
    #[error("emoji sequence {0} is empty or malformed")]
    InvalidEmoji(usize),
    #[error("whole-map entry {0:#06X} covers code point {1:#06X} which is in no script group")]
    InconsistentWholeMap(u32, u32),
    #[error("script group list is empty")]
    NoGroups,
}

/// A coherent script, e.g. Latin, Greek or Han.
///
/// A code point belongs to the group iff it is in `primary` or `secondary`.
#[derive(Debug, Clone)]
pub struct ScriptGroup {
    pub name: String,
    /// Whether the group carries its own combining-mark allowance. Groups
    /// without one are subject to the non-spacing-mark repetition and count
    /// limits.
    pub cm_allowed: bool,
    pub primary: FxHashSet<CodePoint>,
    pub secondary: FxHashSet<CodePoint>,
}

impl ScriptGroup {
    #[inline]
    pub fn contains(&self, cp: CodePoint) -> bool {
        self.primary.contains(&cp) || self.secondary.contains(&cp)
    }
}

/// Confusable data attached to a single code point.
#[derive(Debug, Clone)]
pub enum WholeValue {
    /// Sentinel: the code point is unique to its script, so a label that
    /// contains it can never be a whole-script confusable.
    Unique,
    Entry(WholeEntry),
}

#[derive(Debug, Clone, Default)]
pub struct WholeEntry {
    /// The confusable extent: every code point participating in this
    /// confusable cluster across scripts.
    pub extent: FxHashSet<CodePoint>,
    /// For each code point, the indices of the groups containing its
    /// look-alikes in other scripts.
    pub lookalike_groups: FxHashMap<CodePoint, Vec<usize>>,
}

/// The complete table set consumed by the engine.
#[derive(Debug, Clone)]
pub struct SpecData {
    pub mapped: FxHashMap<CodePoint, Vec<CodePoint>>,
    pub ignored: FxHashSet<CodePoint>,
    /// Derived at load: the union of all group code points, closed under
    /// NFD so decomposed spellings of valid text stay valid.
    pub valid: FxHashSet<CodePoint>,
    pub cm: FxHashSet<CodePoint>,
    pub nsm: FxHashSet<CodePoint>,
    pub nsm_max: usize,
    pub fenced: FxHashMap<CodePoint, String>,
    /// Code points rendered as escapes when a sequence is shown to a human.
    /// Never consulted by any decision.
    pub escape: FxHashSet<CodePoint>,
    pub nfc_check: FxHashSet<CodePoint>,
    /// Fully-qualified emoji sequences; the matcher trie is built from them.
    pub emoji: Vec<Vec<CodePoint>>,
    pub groups: Vec<ScriptGroup>,
    pub whole_map: FxHashMap<CodePoint, WholeValue>,
}

// Wire shape of spec.json. Every field is required; a missing one fails
// deserialization and therefore the load.
#[derive(Deserialize)]
struct RawSpec {
    ignored: Vec<u32>,
    mapped: Vec<(u32, Vec<u32>)>,
    cm: Vec<u32>,
    emoji: Vec<Vec<u32>>,
    nfc_check: Vec<u32>,
    fenced: Vec<(u32, String)>,
    escape: Vec<u32>,
    nsm: Vec<u32>,
    nsm_max: usize,
    groups: Vec<RawGroup>,
    whole_map: BTreeMap<String, RawWhole>,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    cm: bool,
    primary: Vec<u32>,
    secondary: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWhole {
    Unique(u8),
    Entry {
        #[serde(rename = "V")]
        v: Vec<u32>,
        #[serde(rename = "M")]
        m: BTreeMap<String, Vec<String>>,
    },
}

impl SpecData {
    pub fn from_json_str(text: &str) -> Result<Self, SpecDataError> {
        let raw: RawSpec = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SpecDataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn from_raw(raw: RawSpec) -> Result<Self, SpecDataError> {
        let groups = raw
            .groups
            .into_iter()
            .map(|g| -> Result<ScriptGroup, SpecDataError> {
                Ok(ScriptGroup {
                    name: g.name,
                    cm_allowed: g.cm,
                    primary: to_set(g.primary)?,
                    secondary: to_set(g.secondary)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut mapped = FxHashMap::default();
        for (cp, image) in raw.mapped {
            scalar(cp)?;
            if image.is_empty() || image.iter().any(|&c| char::from_u32(c).is_none()) {
                return Err(SpecDataError::InvalidMapping(cp));
            }
            mapped.insert(cp, image);
        }

        // U+FE0F lives in the emoji machine, not the combining-mark rules.
        let mut cm = to_set(raw.cm)?;
        cm.remove(&CP_FE0F);

        let mut fenced = FxHashMap::default();
        for (cp, name) in raw.fenced {
            scalar(cp)?;
            fenced.insert(cp, name);
        }

        let mut whole_map = FxHashMap::default();
        for (key, value) in raw.whole_map {
            let cp: CodePoint = key
                .parse()
                .map_err(|_| SpecDataError::BadWholeKey(key.clone()))?;
            scalar(cp)?;
            let value = match value {
                RawWhole::Unique(_) => WholeValue::Unique,
                RawWhole::Entry { v, m } => {
                    let mut entry = WholeEntry {
                        extent: to_set(v)?,
                        ..WholeEntry::default()
                    };
                    for (inner, names) in m {
                        let inner: CodePoint = inner
                            .parse()
                            .map_err(|_| SpecDataError::BadWholeKey(inner.clone()))?;
                        scalar(inner)?;
                        let ids = names
                            .into_iter()
                            .map(|name| {
                                groups
                                    .iter()
                                    .position(|g| g.name == name)
                                    .ok_or(SpecDataError::UnknownGroup(name))
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        entry.lookalike_groups.insert(inner, ids);
                    }
                    WholeValue::Entry(entry)
                }
            };
            whole_map.insert(cp, value);
        }

        let valid = compute_valid(&groups);

        let spec = SpecData {
            mapped,
            ignored: to_set(raw.ignored)?,
            valid,
            cm,
            nsm: to_set(raw.nsm)?,
            nsm_max: raw.nsm_max,
            fenced,
            escape: to_set(raw.escape)?,
            nfc_check: to_set(raw.nfc_check)?,
            emoji: raw.emoji,
            groups,
            whole_map,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the structural invariants of the tables. Called by the loader;
    /// hand-assembled tables should call it too.
    pub fn validate(&self) -> Result<(), SpecDataError> {
        if self.groups.is_empty() {
            return Err(SpecDataError::NoGroups);
        }
        for (&cp, image) in &self.mapped {
            if self.ignored.contains(&cp) || self.valid.contains(&cp) {
                return Err(SpecDataError::OverlappingClass(cp));
            }
            if image.is_empty() || image.iter().any(|c| !self.valid.contains(c)) {
                return Err(SpecDataError::InvalidMapping(cp));
            }
        }
        for &cp in &self.ignored {
            if self.valid.contains(&cp) {
                return Err(SpecDataError::OverlappingClass(cp));
            }
        }
        for (i, seq) in self.emoji.iter().enumerate() {
            let degenerate =
                seq.is_empty() || seq.iter().all(|&cp| cp == CP_FE0F);
            if degenerate || seq.iter().any(|&cp| char::from_u32(cp).is_none()) {
                return Err(SpecDataError::InvalidEmoji(i));
            }
        }
        for (&cp, value) in &self.whole_map {
            if let WholeValue::Entry(entry) = value {
                for &covered in &entry.extent {
                    if !self.groups.iter().any(|g| g.contains(covered)) {
                        return Err(SpecDataError::InconsistentWholeMap(cp, covered));
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn requires_nfc_check(&self, cps: &[CodePoint]) -> bool {
        cps.iter().any(|cp| self.nfc_check.contains(cp))
    }
}

fn scalar(cp: u32) -> Result<CodePoint, SpecDataError> {
    char::from_u32(cp)
        .map(|_| cp)
        .ok_or(SpecDataError::InvalidCodePoint(cp))
}

fn to_set(cps: Vec<u32>) -> Result<FxHashSet<CodePoint>, SpecDataError> {
    cps.into_iter().map(scalar).collect()
}

fn compute_valid(groups: &[ScriptGroup]) -> FxHashSet<CodePoint> {
    let mut valid: FxHashSet<CodePoint> = FxHashSet::default();
    for g in groups {
        valid.extend(g.primary.iter().copied());
        valid.extend(g.secondary.iter().copied());
    }
    let everything: Vec<CodePoint> = valid.iter().copied().collect();
    valid.extend(nfd_cps(&everything));
    valid
}
