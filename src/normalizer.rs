//! The driver tying the pipeline together, plus the beautifier and the
//! iterative curer built on top of it.

use crate::code_points::{
    cp2str, cps2str, str2cps, CodePoint, CP_XI_CAPITAL, CP_XI_SMALL,
};
use crate::emoji::EmojiTrie;
use crate::error::{
    CurableSequence, DisallowedKind, DisallowedSequence, NormalizableKind,
    NormalizableSequence, ProcessError,
};
use crate::spec_data::{SpecData, SpecDataError};
use crate::token::Token;
use crate::tokenizer;
use crate::validate::{self, NameInfo};
use std::path::Path;

/// Which artifacts [`EnsNormalizer::process`] should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub normalize: bool,
    pub beautify: bool,
    pub tokenize: bool,
    pub normalizations: bool,
    pub cure: bool,
}

impl ProcessOptions {
    pub fn all() -> Self {
        Self {
            normalize: true,
            beautify: true,
            tokenize: true,
            normalizations: true,
            cure: true,
        }
    }
}

/// The combined result of a single [`EnsNormalizer::process`] pass.
/// A failed normalization lands in `error` instead of being raised.
#[derive(Debug, Clone, Default)]
pub struct ProcessedName {
    pub normalized: Option<String>,
    pub beautified: Option<String>,
    pub tokens: Option<Vec<Token>>,
    pub normalizations: Option<Vec<NormalizableSequence>>,
    pub cured: Option<String>,
    pub cures: Option<Vec<CurableSequence>>,
    pub error: Option<ProcessError>,
}

/// A cured name together with the repairs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuredName {
    pub cured: String,
    pub cures: Vec<CurableSequence>,
}

/// The normalization engine. Construct once from loaded [`SpecData`] and
/// share freely; every operation is a pure function over the tables.
pub struct EnsNormalizer {
    spec: SpecData,
    trie: EmojiTrie,
}

impl EnsNormalizer {
    pub fn new(spec: SpecData) -> Self {
        let trie = EmojiTrie::new(&spec.emoji);
        Self { spec, trie }
    }

    pub fn from_json_str(text: &str) -> Result<Self, SpecDataError> {
        Ok(Self::new(SpecData::from_json_str(text)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SpecDataError> {
        Ok(Self::new(SpecData::from_json_file(path)?))
    }

    pub fn spec(&self) -> &SpecData {
        &self.spec
    }

    /// Tokenize without judging. Total: every input has a token stream, and
    /// the stream reproduces the input code point for code point.
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        tokenizer::tokenize(&self.spec, &self.trie, input)
    }

    /// Normalize a name to its canonical form.
    pub fn normalize(&self, input: &str) -> Result<String, ProcessError> {
        let tokens = self.tokenize(input);
        validate::validate_name(&self.spec, &tokens)?;
        Ok(render_normalized(&tokens))
    }

    /// Normalize, then re-render emoji fully qualified and capitalize a
    /// lone Greek xi in non-Greek labels.
    pub fn beautify(&self, input: &str) -> Result<String, ProcessError> {
        let tokens = self.tokenize(input);
        let info = validate::validate_name(&self.spec, &tokens)?;
        Ok(render_beautified(&tokens, &info))
    }

    /// Every place tokenization changed the input, in input order.
    pub fn normalizations(&self, input: &str) -> Vec<NormalizableSequence> {
        normalizations_of(&self.tokenize(input))
    }

    /// Whether the input is already in canonical form.
    pub fn is_normalized(&self, input: &str) -> bool {
        self.normalize(input).is_ok_and(|normalized| normalized == input)
    }

    /// Whether the input can be normalized at all.
    pub fn is_normalizable(&self, input: &str) -> bool {
        self.normalize(input).is_ok()
    }

    /// Repeatedly normalize and strip the reported sequence until the name
    /// normalizes or a non-curable diagnostic surfaces.
    pub fn cure(&self, input: &str) -> Result<String, ProcessError> {
        self.cure_details(input).map(|c| c.cured)
    }

    pub fn cure_details(&self, input: &str) -> Result<CuredName, ProcessError> {
        let mut text = input.to_owned();
        let mut cures = Vec::new();
        // Every cure removes at least one code point, so the input length
        // bounds the loop.
        let limit = input.chars().count();
        loop {
            match self.normalize(&text) {
                Ok(cured) => return Ok(CuredName { cured, cures }),
                Err(ProcessError::Curable(cure)) => {
                    if cures.len() >= limit {
                        return Err(cure.into());
                    }
                    text = apply_cure(&text, &cure);
                    cures.push(cure);
                    if text.is_empty() {
                        return Err(DisallowedSequence::new(DisallowedKind::EmptyName).into());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One pass producing any subset of the artifacts. Errors are captured
    /// in the result instead of raised; when curing is requested but fails,
    /// the original diagnostic is kept and `cured` stays empty.
    pub fn process(&self, input: &str, options: ProcessOptions) -> ProcessedName {
        let tokens = self.tokenize(input);
        let mut out = ProcessedName::default();

        if options.normalizations {
            out.normalizations = Some(normalizations_of(&tokens));
        }

        match validate::validate_name(&self.spec, &tokens) {
            Ok(info) => {
                if options.normalize || options.cure {
                    let normalized = render_normalized(&tokens);
                    if options.cure {
                        out.cured = Some(normalized.clone());
                        out.cures = Some(Vec::new());
                    }
                    if options.normalize {
                        out.normalized = Some(normalized);
                    }
                }
                if options.beautify {
                    out.beautified = Some(render_beautified(&tokens, &info));
                }
            }
            Err(error) => {
                if options.cure {
                    if let Ok(cured) = self.cure_details(input) {
                        out.cured = Some(cured.cured);
                        out.cures = Some(cured.cures);
                    }
                }
                out.error = Some(error);
            }
        }

        if options.tokenize {
            out.tokens = Some(tokens);
        }
        out
    }

    /// Render a sequence for human eyes, escaping invisible code points as
    /// `{XXXX}` according to the loaded escape set.
    pub fn debug_sequence(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            let cp = c as CodePoint;
            if self.spec.escape.contains(&cp) || c.is_control() {
                out.push_str(&format!("{{{cp:04X}}}"));
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn render_normalized(tokens: &[Token]) -> String {
    let cps: Vec<CodePoint> = tokens
        .iter()
        .flat_map(|t| t.output_cps().iter().copied())
        .collect();
    cps2str(&cps)
}

fn render_beautified(tokens: &[Token], info: &NameInfo) -> String {
    let mut cps: Vec<CodePoint> = Vec::new();
    let mut label = 0usize;
    for tok in tokens {
        match tok {
            Token::Stop(t) => {
                cps.push(t.cp);
                label += 1;
            }
            Token::Emoji(t) => cps.extend_from_slice(&t.emoji),
            Token::Ignored(_) | Token::Disallowed(_) => {}
            _ => {
                let greek = info.greek_labels.get(label).copied().unwrap_or(false);
                for &cp in tok.output_cps() {
                    cps.push(if !greek && cp == CP_XI_SMALL { CP_XI_CAPITAL } else { cp });
                }
            }
        }
    }
    cps2str(&cps)
}

fn normalizations_of(tokens: &[Token]) -> Vec<NormalizableSequence> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    for tok in tokens {
        match tok {
            Token::Mapped(t) => out.push(NormalizableSequence::new(
                NormalizableKind::Mapped,
                offset,
                cp2str(t.cp),
                cps2str(&t.cps),
            )),
            Token::Ignored(t) => out.push(NormalizableSequence::new(
                NormalizableKind::Ignored,
                offset,
                cp2str(t.cp),
                String::new(),
            )),
            Token::Nfc(t) => out.push(NormalizableSequence::new(
                NormalizableKind::Nfc,
                offset,
                cps2str(&t.input),
                cps2str(&t.cps),
            )),
            Token::Emoji(t) if t.input != t.cps => out.push(NormalizableSequence::new(
                NormalizableKind::Fe0f,
                offset,
                cps2str(&t.input),
                cps2str(&t.cps),
            )),
            _ => {}
        }
        offset += tok.input_len();
    }
    out
}

/// Splice `suggested` over the reported sequence, in code point units.
fn apply_cure(text: &str, cure: &CurableSequence) -> String {
    let cps = str2cps(text);
    let start = cure.index.min(cps.len());
    let end = (cure.index + cure.sequence.chars().count()).min(cps.len());
    let mut out: Vec<CodePoint> = Vec::with_capacity(cps.len());
    out.extend_from_slice(&cps[..start]);
    out.extend(str2cps(&cure.suggested));
    out.extend_from_slice(&cps[end..]);
    cps2str(&out)
}
