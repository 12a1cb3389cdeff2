//! Code point constants and conversion helpers shared by the whole pipeline.
//!
//! Everything downstream works on `u32` scalar values rather than `char`:
//! tokens, spec tables and diagnostics all index the input in code point
//! units, and `u32` keeps the table lookups branch-free.

use phf::phf_set;
use unicode_normalization::UnicodeNormalization;

/// A Unicode scalar value.
pub type CodePoint = u32;

/// Label separator, the only permitted stop character.
pub const CP_STOP: CodePoint = 0x2E;
/// Emoji variation selector, optional inside emoji sequences.
pub const CP_FE0F: CodePoint = 0xFE0F;
pub const CP_UNDERSCORE: CodePoint = 0x5F;
pub const CP_HYPHEN: CodePoint = 0x2D;
/// Greek small letter xi, re-rendered by the beautifier outside Greek labels.
pub const CP_XI_SMALL: CodePoint = 0x3BE;
pub const CP_XI_CAPITAL: CodePoint = 0x39E;

/// Zero-width joiner controls. Disallowed occurrences outside an emoji
/// sequence are reported as `INVISIBLE` instead of plain `DISALLOWED`.
static INVISIBLE: phf::Set<char> = phf_set! {
    '\u{200C}', // Zero-width non-joiner
    '\u{200D}', // Zero-width joiner
};

#[inline(always)]
pub fn is_invisible(cp: CodePoint) -> bool {
    char::from_u32(cp).is_some_and(|c| INVISIBLE.contains(&c))
}

pub fn str2cps(text: &str) -> Vec<CodePoint> {
    text.chars().map(|c| c as CodePoint).collect()
}

pub fn cps2str(cps: &[CodePoint]) -> String {
    cps.iter().copied().filter_map(char::from_u32).collect()
}

pub fn cp2str(cp: CodePoint) -> String {
    char::from_u32(cp).map(String::from).unwrap_or_default()
}

/// NFC over raw code points. Full composition is delegated to
/// `unicode-normalization`; only the quick-check set lives in the spec data.
pub fn nfc_cps(cps: &[CodePoint]) -> Vec<CodePoint> {
    cps.iter()
        .copied()
        .filter_map(char::from_u32)
        .nfc()
        .map(|c| c as CodePoint)
        .collect()
}

/// NFD over raw code points, used by the non-spacing-mark rules.
pub fn nfd_cps(cps: &[CodePoint]) -> Vec<CodePoint> {
    cps.iter()
        .copied()
        .filter_map(char::from_u32)
        .nfd()
        .map(|c| c as CodePoint)
        .collect()
}
