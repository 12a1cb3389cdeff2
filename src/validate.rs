//! Per-label validation.
//!
//! The stream is split at stop tokens, then every label runs through the
//! rule pipeline in priority order; the first failing rule wins and labels
//! are checked left to right. All reported indices are code point offsets
//! into the original input, recovered from the tokens' input widths.
//!
//! Positional rules operate on a per-label "scan view": every non-ignored
//! token contributes its output code points, except an emoji which
//! contributes a single U+FE0F marker. A parallel attribution array maps
//! each scan position back to the input offset of its originating token.

use crate::code_points::{
    cp2str, cps2str, nfd_cps, CodePoint, CP_FE0F, CP_HYPHEN, CP_UNDERSCORE, is_invisible,
};
use crate::error::{
    CurableKind, CurableSequence, DisallowedKind, DisallowedSequence, ProcessError,
};
use crate::spec_data::{SpecData, WholeValue};
use crate::token::Token;
use rustc_hash::FxHashSet;

/// What validation learned about each label, in label order. The beautifier
/// needs to know which labels resolved to the Greek script.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameInfo {
    pub greek_labels: Vec<bool>,
}

struct LabelView<'a> {
    tokens: &'a [Token],
    /// Input offset of each token in `tokens`.
    token_offsets: &'a [usize],
    /// Input offset of the label's first code point.
    input_start: usize,
    /// Scan view code points; emoji appear as a single U+FE0F.
    cps: Vec<CodePoint>,
    /// Input offset for every scan position.
    attribution: Vec<usize>,
}

impl<'a> LabelView<'a> {
    fn build(tokens: &'a [Token], token_offsets: &'a [usize], input_start: usize) -> Self {
        let mut cps = Vec::new();
        let mut attribution = Vec::new();
        for (tok, &off) in tokens.iter().zip(token_offsets) {
            match tok {
                Token::Emoji(_) => {
                    cps.push(CP_FE0F);
                    attribution.push(off);
                }
                Token::Ignored(_) | Token::Disallowed(_) => {}
                Token::Valid(t) => {
                    for (k, &cp) in t.cps.iter().enumerate() {
                        cps.push(cp);
                        attribution.push(off + k);
                    }
                }
                _ => {
                    // Mapped and NFC output attributes to the token start.
                    for &cp in tok.output_cps() {
                        cps.push(cp);
                        attribution.push(off);
                    }
                }
            }
        }
        Self { tokens, token_offsets, input_start, cps, attribution }
    }

    fn char_at(&self, scan_idx: usize) -> String {
        cp2str(self.cps[scan_idx])
    }
}

pub(crate) fn validate_name(spec: &SpecData, tokens: &[Token]) -> Result<NameInfo, ProcessError> {
    let mut info = NameInfo::default();
    if tokens.is_empty() {
        // The empty input is the normalized empty name.
        return Ok(info);
    }

    let mut offsets = Vec::with_capacity(tokens.len());
    let mut acc = 0usize;
    for tok in tokens {
        offsets.push(acc);
        acc += tok.input_len();
    }

    let mut label_start = 0usize;
    let mut label_input_start = 0usize;
    for idx in 0..=tokens.len() {
        let at_stop = idx < tokens.len() && matches!(tokens[idx], Token::Stop(_));
        if idx == tokens.len() || at_stop {
            let view = LabelView::build(
                &tokens[label_start..idx],
                &offsets[label_start..idx],
                label_input_start,
            );
            info.greek_labels.push(check_label(spec, &view)?);
            label_start = idx + 1;
            if at_stop {
                label_input_start = offsets[idx] + 1;
            }
        }
    }
    Ok(info)
}

/// Run the rule pipeline on one label. Returns whether the label resolved
/// to the Greek script group.
fn check_label(spec: &SpecData, label: &LabelView<'_>) -> Result<bool, ProcessError> {
    check_disallowed(label)?;
    check_empty(label)?;

    if label.tokens.iter().all(|t| t.is_emoji() || t.is_ignored()) {
        // Emoji-only labels skip the script rules entirely.
        return Ok(false);
    }

    check_underscore(label)?;
    check_hyphen(label)?;
    check_fenced(spec, label)?;
    check_cm(spec, label)?;

    let unique = unique_text_cps(label);
    let group = resolve_group(spec, label, &unique)?;
    check_group_membership(spec, label, group)?;
    if !spec.groups[group].cm_allowed {
        check_nsm(spec, label)?;
    }
    check_whole(spec, &unique)?;

    Ok(spec.groups[group].name == "Greek")
}

fn check_disallowed(label: &LabelView<'_>) -> Result<(), ProcessError> {
    for (tok, &off) in label.tokens.iter().zip(label.token_offsets) {
        if let Token::Disallowed(t) = tok {
            let kind = if is_invisible(t.cp) {
                CurableKind::Invisible
            } else {
                CurableKind::Disallowed
            };
            return Err(CurableSequence::new(kind, off, cp2str(t.cp), "").into());
        }
    }
    Ok(())
}

fn check_empty(label: &LabelView<'_>) -> Result<(), ProcessError> {
    if !label.cps.is_empty() {
        return Ok(());
    }
    if label.tokens.is_empty() {
        // Delimited by dots; the cure drops one of them. A leading empty
        // label owns the dot right after it, any other the dot before it.
        let index = if label.input_start == 0 {
            0
        } else {
            label.input_start - 1
        };
        return Err(CurableSequence::new(CurableKind::EmptyLabel, index, ".", "").into());
    }
    // Only ignored code points; the cure removes the whole span.
    let sequence: Vec<CodePoint> = label.tokens.iter().flat_map(Token::input_cps).collect();
    Err(CurableSequence::new(
        CurableKind::EmptyLabel,
        label.input_start,
        cps2str(&sequence),
        "",
    )
    .into())
}

fn check_underscore(label: &LabelView<'_>) -> Result<(), ProcessError> {
    let mut past_prefix = false;
    let mut i = 0usize;
    while i < label.cps.len() {
        if label.cps[i] == CP_UNDERSCORE {
            if past_prefix {
                let mut j = i;
                while j < label.cps.len() && label.cps[j] == CP_UNDERSCORE {
                    j += 1;
                }
                return Err(CurableSequence::new(
                    CurableKind::Underscore,
                    label.attribution[i],
                    cps2str(&label.cps[i..j]),
                    "",
                )
                .into());
            }
        } else {
            past_prefix = true;
        }
        i += 1;
    }
    Ok(())
}

fn check_hyphen(label: &LabelView<'_>) -> Result<(), ProcessError> {
    let cps = &label.cps;
    let all_ascii = cps.iter().all(|&cp| cp < 0x80);
    if cps.len() >= 4 && all_ascii && cps[2] == CP_HYPHEN && cps[3] == CP_HYPHEN {
        return Err(
            CurableSequence::new(CurableKind::Hyphen, label.attribution[2], "--", "").into(),
        );
    }
    Ok(())
}

fn fenced_error(label: &LabelView<'_>, start: usize, end: usize) -> ProcessError {
    let kind = if start == 0 {
        CurableKind::FencedLeading
    } else if end == label.cps.len() {
        CurableKind::FencedTrailing
    } else {
        CurableKind::FencedMulti
    };
    let suggested = if kind == CurableKind::FencedMulti {
        label.char_at(start)
    } else {
        String::new()
    };
    CurableSequence::new(
        kind,
        label.attribution[start],
        cps2str(&label.cps[start..end]),
        suggested,
    )
    .into()
}

fn check_fenced(spec: &SpecData, label: &LabelView<'_>) -> Result<(), ProcessError> {
    let cps = &label.cps;
    if spec.fenced.contains_key(&cps[0]) {
        return Err(fenced_error(label, 0, 1));
    }
    let n = cps.len();
    let mut last = None;
    for i in 1..n {
        if spec.fenced.contains_key(&cps[i]) {
            if last == Some(i) {
                return Err(fenced_error(label, i - 1, i + 1));
            }
            last = Some(i + 1);
        }
    }
    if last == Some(n) {
        return Err(fenced_error(label, n - 1, n));
    }
    Ok(())
}

fn check_cm(spec: &SpecData, label: &LabelView<'_>) -> Result<(), ProcessError> {
    for (i, &cp) in label.cps.iter().enumerate() {
        if spec.cm.contains(&cp) {
            if i == 0 {
                return Err(CurableSequence::new(
                    CurableKind::CmStart,
                    label.attribution[0],
                    label.char_at(0),
                    "",
                )
                .into());
            }
            if label.cps[i - 1] == CP_FE0F {
                return Err(CurableSequence::new(
                    CurableKind::CmEmoji,
                    label.attribution[i],
                    label.char_at(i),
                    "",
                )
                .into());
            }
        }
    }
    Ok(())
}

/// Unique non-emoji code points of the label in first-appearance order.
fn unique_text_cps(label: &LabelView<'_>) -> Vec<CodePoint> {
    let mut seen = FxHashSet::default();
    let mut unique = Vec::new();
    for &cp in &label.cps {
        if cp != CP_FE0F && seen.insert(cp) {
            unique.push(cp);
        }
    }
    unique
}

fn conf_mixed(spec: &SpecData, label: &LabelView<'_>, cp: CodePoint, resolved: &str) -> ProcessError {
    let scan_idx = label
        .cps
        .iter()
        .position(|&c| c == cp)
        .unwrap_or_default();
    let info = match spec.groups.iter().find(|g| g.contains(cp)) {
        Some(other) => format!(
            "{} characters cannot be mixed with the {} script",
            other.name, resolved
        ),
        None => format!("This character cannot be used with the {resolved} script"),
    };
    CurableSequence::with_info(
        CurableKind::ConfMixed,
        label.attribution[scan_idx],
        cp2str(cp),
        "",
        info,
    )
    .into()
}

/// Narrow the candidate groups by each unique code point in turn. The first
/// code point that empties the candidate set is the culprit: a disallowed
/// stray when nothing had narrowed yet, a mixed-script conflict otherwise.
fn resolve_group(
    spec: &SpecData,
    label: &LabelView<'_>,
    unique: &[CodePoint],
) -> Result<usize, ProcessError> {
    let mut candidates: Vec<usize> = (0..spec.groups.len()).collect();
    for &cp in unique {
        let narrowed: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&g| spec.groups[g].contains(cp))
            .collect();
        if narrowed.is_empty() {
            if candidates.len() == spec.groups.len() {
                let scan_idx = label
                    .cps
                    .iter()
                    .position(|&c| c == cp)
                    .unwrap_or_default();
                return Err(CurableSequence::new(
                    CurableKind::Disallowed,
                    label.attribution[scan_idx],
                    cp2str(cp),
                    "",
                )
                .into());
            }
            return Err(conf_mixed(spec, label, cp, &spec.groups[candidates[0]].name));
        }
        candidates = narrowed;
        if candidates.len() == 1 {
            break;
        }
    }
    Ok(candidates[0])
}

fn check_group_membership(
    spec: &SpecData,
    label: &LabelView<'_>,
    group: usize,
) -> Result<(), ProcessError> {
    let g = &spec.groups[group];
    for &cp in &label.cps {
        if cp != CP_FE0F && !g.contains(cp) {
            return Err(conf_mixed(spec, label, cp, &g.name));
        }
    }
    Ok(())
}

/// Non-spacing-mark limits over the NFD form of the label text: within a
/// run of consecutive marks, no duplicates and no more than `nsm_max`.
fn check_nsm(spec: &SpecData, label: &LabelView<'_>) -> Result<(), ProcessError> {
    let text: Vec<CodePoint> = label
        .cps
        .iter()
        .copied()
        .filter(|&cp| cp != CP_FE0F)
        .collect();
    let decomposed = nfd_cps(&text);
    let mut i = 1usize;
    while i < decomposed.len() {
        if spec.nsm.contains(&decomposed[i]) {
            let mut j = i + 1;
            while j < decomposed.len() && spec.nsm.contains(&decomposed[j]) {
                for k in i..j {
                    if decomposed[k] == decomposed[j] {
                        return Err(
                            DisallowedSequence::new(DisallowedKind::NsmRepeated).into()
                        );
                    }
                }
                j += 1;
            }
            if j - i > spec.nsm_max {
                return Err(DisallowedSequence::new(DisallowedKind::NsmTooMany).into());
            }
            i = j;
        }
        i += 1;
    }
    Ok(())
}

/// Whole-script confusable detection. A code point marked unique aborts the
/// check; otherwise the look-alike group lists are intersected across the
/// label, and if some surviving group also contains every unlisted code
/// point, the label as a whole reads as that other script.
fn check_whole(spec: &SpecData, unique: &[CodePoint]) -> Result<(), ProcessError> {
    let mut maker: Option<Vec<usize>> = None;
    let mut shared: Vec<CodePoint> = Vec::new();
    for &cp in unique {
        match spec.whole_map.get(&cp) {
            Some(WholeValue::Unique) => return Ok(()),
            Some(WholeValue::Entry(entry)) => {
                let set = entry
                    .lookalike_groups
                    .get(&cp)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let next = match maker {
                    Some(prev) => prev.into_iter().filter(|g| set.contains(g)).collect(),
                    None => set.to_vec(),
                };
                if next.is_empty() {
                    return Ok(());
                }
                maker = Some(next);
            }
            None => shared.push(cp),
        }
    }
    if let Some(groups) = maker {
        for g in groups {
            if shared.iter().all(|&cp| spec.groups[g].contains(cp)) {
                return Err(DisallowedSequence::new(DisallowedKind::ConfWhole).into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emoji::EmojiTrie;
    use crate::testing::fixture::tiny_spec;
    use crate::tokenizer::tokenize;

    fn validate(input: &str) -> Result<NameInfo, ProcessError> {
        let spec = tiny_spec();
        let trie = EmojiTrie::new(&spec.emoji);
        let tokens = tokenize(&spec, &trie, input);
        validate_name(&spec, &tokens)
    }

    fn curable(input: &str) -> CurableSequence {
        match validate(input) {
            Err(ProcessError::Curable(e)) => e,
            other => panic!("expected curable error for {input:?}, got {other:?}"),
        }
    }

    fn terminal(input: &str) -> DisallowedSequence {
        match validate(input) {
            Err(ProcessError::Disallowed(e)) => e,
            other => panic!("expected non-curable error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_names_pass() {
        for input in ["", "nick.eth", "abc", "__ab", "_👍", "àa--b", "a½b"] {
            assert!(validate(input).is_ok(), "{input:?} should validate");
        }
    }

    #[test]
    fn first_failing_label_wins() {
        // the underscore in the first label shadows the '?' in the second
        let e = curable("a_b.x?y");
        assert_eq!(e.kind, CurableKind::Underscore);
        assert_eq!(e.index, 1);
    }

    #[test]
    fn underscore_reports_the_whole_run() {
        let e = curable("ab__c");
        assert_eq!(e.kind, CurableKind::Underscore);
        assert_eq!(e.index, 2);
        assert_eq!(e.sequence, "__");
        assert_eq!(e.suggested, "");
    }

    #[test]
    fn hyphen_rule_is_ascii_only() {
        let e = curable("aa--a");
        assert_eq!(e.kind, CurableKind::Hyphen);
        assert_eq!(e.index, 2);
        assert_eq!(e.sequence, "--");
        assert!(validate("àa--a").is_ok());
    }

    #[test]
    fn empty_label_variants() {
        let e = curable(".");
        assert_eq!((e.kind, e.index, e.sequence.as_str()), (CurableKind::EmptyLabel, 0, "."));

        let e = curable("a..b");
        assert_eq!((e.index, e.sequence.as_str()), (1, "."));

        let e = curable("ab.");
        assert_eq!((e.index, e.sequence.as_str()), (2, "."));

        // a label of nothing but ignored code points is also empty
        let e = curable("a.\u{AD}.b");
        assert_eq!((e.index, e.sequence.as_str()), (2, "\u{AD}"));
    }

    #[test]
    fn invisible_vs_disallowed() {
        let e = curable("Ni\u{200D}ck.ETH");
        assert_eq!(e.kind, CurableKind::Invisible);
        assert_eq!(e.index, 2);
        assert_eq!(e.sequence, "\u{200D}");

        let e = curable("a?b");
        assert_eq!(e.kind, CurableKind::Disallowed);
        assert_eq!(e.index, 1);
        assert_eq!(e.sequence, "?");
    }

    #[test]
    fn fenced_positions() {
        // ASCII apostrophe maps onto the fenced right single quote
        let e = curable("'ab");
        assert_eq!((e.kind, e.index, e.sequence.as_str()), (CurableKind::FencedLeading, 0, "\u{2019}"));

        let e = curable("a''b");
        assert_eq!(
            (e.kind, e.index, e.sequence.as_str(), e.suggested.as_str()),
            (CurableKind::FencedMulti, 1, "\u{2019}\u{2019}", "\u{2019}")
        );

        let e = curable("ab'");
        assert_eq!((e.kind, e.index, e.sequence.as_str()), (CurableKind::FencedTrailing, 2, "\u{2019}"));

        // a trailing adjacent pair reads as a trailing violation
        let e = curable("ab''");
        assert_eq!(e.kind, CurableKind::FencedTrailing);
        assert_eq!(e.sequence, "\u{2019}\u{2019}");
    }

    #[test]
    fn combining_mark_positions() {
        let e = curable("\u{327}a");
        assert_eq!((e.kind, e.index), (CurableKind::CmStart, 0));

        let e = curable("a👩🏿‍🦲\u{327}");
        assert_eq!((e.kind, e.index), (CurableKind::CmEmoji, 5));
    }

    #[test]
    fn mixed_scripts_are_rejected() {
        let e = curable("aχb");
        assert_eq!(e.kind, CurableKind::ConfMixed);
        assert_eq!(e.index, 1);
        assert_eq!(e.sequence, "χ");
        assert!(e.sequence_info.contains("Greek") || e.sequence_info.contains("Latin"));
    }

    #[test]
    fn stray_valid_code_point_without_a_group() {
        // U+0653 is valid through decomposition but belongs to no group
        let e = curable("\u{653}a");
        assert_eq!(e.kind, CurableKind::Disallowed);
        assert_eq!(e.index, 0);
    }

    #[test]
    fn nsm_limits() {
        assert_eq!(terminal("ك\u{64D}\u{64D}").kind, DisallowedKind::NsmRepeated);
        assert_eq!(
            terminal("ك\u{64B}\u{64C}\u{64D}\u{64E}\u{64F}").kind,
            DisallowedKind::NsmTooMany
        );
        // four distinct marks are still fine
        assert!(validate("ك\u{64B}\u{64C}\u{64D}\u{64E}").is_ok());
    }

    #[test]
    fn whole_script_confusables() {
        assert_eq!(terminal("0х").kind, DisallowedKind::ConfWhole);
        assert_eq!(terminal("0x.0χ").kind, DisallowedKind::ConfWhole);
        // the unique sentinel on Latin x aborts the check
        assert!(validate("0x").is_ok());
    }

    #[test]
    fn greek_labels_are_flagged() {
        let info = validate("ξλφα.abc").unwrap();
        assert_eq!(info.greek_labels, vec![true, false]);

        // xi alone resolves to Latin, which lists it as secondary
        let info = validate("ξabc").unwrap();
        assert_eq!(info.greek_labels, vec![false]);
    }

    #[test]
    fn emoji_only_labels_skip_script_rules() {
        let info = validate("👍❤.👩🏿‍🦲").unwrap();
        assert_eq!(info.greek_labels, vec![false, false]);
    }
}
