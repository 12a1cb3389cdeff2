//! The token stream is a lossless structural view of an input name.
//!
//! Every input code point is covered by exactly one token, so concatenating
//! the input projection of a stream reproduces the original string. The
//! output projection (`output_cps`) is what normalization emits.

use crate::code_points::{CodePoint, CP_STOP};

/// One or more consecutive code points that are valid as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValid {
    pub cps: Vec<CodePoint>,
}

/// A single code point replaced by its mapping image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMapped {
    pub cp: CodePoint,
    pub cps: Vec<CodePoint>,
}

/// A single code point that contributes nothing to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIgnored {
    pub cp: CodePoint,
}

/// A single code point rejected by the classifier. Tokenization keeps it;
/// validation turns it into a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDisallowed {
    pub cp: CodePoint,
}

/// A sub-run whose text changed under NFC recomposition.
///
/// `input` is the exact consumed input span (ignored code points inside the
/// span included, so the stream stays lossless); `cps` is the NFC form of
/// the span's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNfc {
    pub input: Vec<CodePoint>,
    pub cps: Vec<CodePoint>,
}

/// A matched emoji sequence.
///
/// `emoji` is the fully-qualified form stored at the trie terminal, `input`
/// the code points as seen, `cps` the input with every U+FE0F removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEmoji {
    pub emoji: Vec<CodePoint>,
    pub input: Vec<CodePoint>,
    pub cps: Vec<CodePoint>,
}

/// The label separator U+002E.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStop {
    pub cp: CodePoint,
}

impl Default for TokenStop {
    fn default() -> Self {
        Self { cp: CP_STOP }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Valid(TokenValid),
    Mapped(TokenMapped),
    Ignored(TokenIgnored),
    Disallowed(TokenDisallowed),
    Nfc(TokenNfc),
    Emoji(TokenEmoji),
    Stop(TokenStop),
}

impl Token {
    /// Number of input code points this token covers.
    pub fn input_len(&self) -> usize {
        match self {
            Token::Valid(t) => t.cps.len(),
            Token::Mapped(_) | Token::Ignored(_) | Token::Disallowed(_) | Token::Stop(_) => 1,
            Token::Nfc(t) => t.input.len(),
            Token::Emoji(t) => t.input.len(),
        }
    }

    /// The input code points this token covers, in input order.
    pub fn input_cps(&self) -> Vec<CodePoint> {
        match self {
            Token::Valid(t) => t.cps.clone(),
            Token::Mapped(t) => vec![t.cp],
            Token::Ignored(t) => vec![t.cp],
            Token::Disallowed(t) => vec![t.cp],
            Token::Nfc(t) => t.input.clone(),
            Token::Emoji(t) => t.input.clone(),
            Token::Stop(t) => vec![t.cp],
        }
    }

    /// The code points this token contributes to normalized output.
    /// Ignored and disallowed tokens contribute nothing.
    pub fn output_cps(&self) -> &[CodePoint] {
        match self {
            Token::Valid(t) => &t.cps,
            Token::Mapped(t) => &t.cps,
            Token::Ignored(_) | Token::Disallowed(_) => &[],
            Token::Nfc(t) => &t.cps,
            Token::Emoji(t) => &t.cps,
            Token::Stop(t) => std::slice::from_ref(&t.cp),
        }
    }

    pub fn is_emoji(&self) -> bool {
        matches!(self, Token::Emoji(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Token::Ignored(_))
    }
}
