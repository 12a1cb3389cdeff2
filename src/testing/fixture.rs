//! A compact, hand-assembled table set exercising every rule of the engine:
//! four script groups, case and fraction mappings, fenced punctuation,
//! keycap and ZWJ emoji, Arabic non-spacing marks, and the x / χ / х
//! whole-script confusable triangle. Small enough to reason about in tests,
//! rich enough to hit every code path.

use crate::code_points::{nfd_cps, CodePoint};
use crate::normalizer::EnsNormalizer;
use crate::spec_data::{ScriptGroup, SpecData, WholeEntry, WholeValue};
use rustc_hash::{FxHashMap, FxHashSet};

fn set(cps: impl IntoIterator<Item = CodePoint>) -> FxHashSet<CodePoint> {
    cps.into_iter().collect()
}

/// Digits plus the punctuation every script may use.
fn common_secondary() -> FxHashSet<CodePoint> {
    let mut s = set(0x30..=0x39);
    s.extend([0x2D, 0x5F, 0x2019, 0x2044]);
    s
}

fn groups() -> Vec<ScriptGroup> {
    let mut latin_primary = set(0x61..=0x7A);
    latin_primary.extend([0xE0, 0xE7, 0xE8, 0xE9]); // à ç è é
    let mut latin_secondary = common_secondary();
    latin_secondary.insert(0x3BE); // ξ is tolerated in Latin labels

    let mut arabic_primary = set([0x622, 0x627, 0x643, 0x645]); // آ ا ك م
    arabic_primary.extend(0x64B..=0x652); // harakat

    vec![
        ScriptGroup {
            name: "Latin".into(),
            cm_allowed: false,
            primary: latin_primary,
            secondary: latin_secondary,
        },
        ScriptGroup {
            name: "Greek".into(),
            cm_allowed: false,
            primary: set([0x3B1, 0x3B2, 0x3BB, 0x3BE, 0x3C6, 0x3C7]), // α β λ ξ φ χ
            secondary: common_secondary(),
        },
        ScriptGroup {
            name: "Cyrillic".into(),
            cm_allowed: false,
            primary: set([0x430, 0x432, 0x438, 0x43A, 0x43E, 0x445]), // а в и к о х
            secondary: common_secondary(),
        },
        ScriptGroup {
            name: "Arabic".into(),
            cm_allowed: false,
            primary: arabic_primary,
            secondary: common_secondary(),
        },
    ]
}

fn mapped() -> FxHashMap<CodePoint, Vec<CodePoint>> {
    let mut m = FxHashMap::default();
    for cp in 0x41..=0x5A {
        m.insert(cp, vec![cp + 0x20]); // A-Z fold to a-z
    }
    m.insert(0xC0, vec![0xE0]); // À
    m.insert(0xC7, vec![0xE7]); // Ç
    m.insert(0xC8, vec![0xE8]); // È
    m.insert(0xC9, vec![0xE9]); // É
    m.insert(0x27, vec![0x2019]); // ' to right single quote
    m.insert(0xBD, vec![0x31, 0x2044, 0x32]); // ½ to 1⁄2
    m.insert(0x39B, vec![0x3BB]); // Λ
    m.insert(0x39E, vec![0x3BE]); // Ξ
    m.insert(0x3A7, vec![0x3C7]); // Χ
    m.insert(0x425, vec![0x445]); // Х
    m
}

fn emoji() -> Vec<Vec<CodePoint>> {
    vec![
        vec![0x1F44D],                                  // 👍
        vec![0x2764, 0xFE0F],                           // ❤️
        vec![0x31, 0xFE0F, 0x20E3],                     // 1️⃣
        vec![0x32, 0xFE0F, 0x20E3],                     // 2️⃣
        vec![0x1F9D9, 0x200D, 0x2642, 0xFE0F],          // 🧙‍♂️
        vec![0x1F6B4, 0x200D, 0x2642, 0xFE0F],          // 🚴‍♂️
        vec![0x1F469, 0x1F3FF, 0x200D, 0x1F9B2],        // 👩🏿‍🦲
    ]
}

fn whole_map() -> FxHashMap<CodePoint, WholeValue> {
    let mut wm = FxHashMap::default();
    // Latin x is the canonical spelling of its confusable cluster.
    wm.insert(0x78, WholeValue::Unique);
    for cp in [0x3C7, 0x445] {
        // χ and х read as Latin x
        let mut entry = WholeEntry {
            extent: set([cp]),
            ..WholeEntry::default()
        };
        entry.lookalike_groups.insert(cp, vec![0]);
        wm.insert(cp, WholeValue::Entry(entry));
    }
    wm
}

/// Build the fixture tables. The result passes [`SpecData::validate`].
pub fn tiny_spec() -> SpecData {
    let groups = groups();

    let mut valid: FxHashSet<CodePoint> = FxHashSet::default();
    for g in &groups {
        valid.extend(g.primary.iter().copied());
        valid.extend(g.secondary.iter().copied());
    }
    let everything: Vec<CodePoint> = valid.iter().copied().collect();
    valid.extend(nfd_cps(&everything));

    let mut cm = set([0x300, 0x301, 0x327]);
    cm.extend(0x64B..=0x652);
    let nsm = cm.clone();

    let mut nfc_check = set([0x300, 0x301, 0x327, 0x653]);
    nfc_check.extend(0x64B..=0x652);

    let mut fenced = FxHashMap::default();
    fenced.insert(0x2019, "apostrophe".to_owned());
    fenced.insert(0x2044, "fraction slash".to_owned());

    let spec = SpecData {
        mapped: mapped(),
        ignored: set([0xAD, 0xFEFF]),
        valid,
        cm,
        nsm,
        nsm_max: 4,
        fenced,
        escape: set([0x200C, 0x200D, 0xAD, 0xFEFF]),
        nfc_check,
        emoji: emoji(),
        groups,
        whole_map: whole_map(),
    };
    spec.validate().expect("fixture tables are consistent");
    spec
}

pub fn tiny_normalizer() -> EnsNormalizer {
    EnsNormalizer::new(tiny_spec())
}
