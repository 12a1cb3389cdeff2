//! Diagnostic taxonomy.
//!
//! Two tiers: `CurableSequence` carries an `(index, sequence, suggested)`
//! triple that allows mechanical repair, `DisallowedSequence` does not.
//! Both project to a wire-stable `code` plus a human `general_info` line.
//! `NormalizableSequence` is not an error at all: it records a place where
//! tokenization changed the input on the way to the normalized form.

use thiserror::Error;

/// Conditions that can be repaired by replacing a localized sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurableKind {
    Underscore,
    Hyphen,
    EmptyLabel,
    CmStart,
    CmEmoji,
    Disallowed,
    Invisible,
    FencedLeading,
    FencedMulti,
    FencedTrailing,
    ConfMixed,
}

impl CurableKind {
    pub fn code(&self) -> &'static str {
        match self {
            CurableKind::Underscore => "UNDERSCORE",
            CurableKind::Hyphen => "HYPHEN",
            CurableKind::EmptyLabel => "EMPTY_LABEL",
            CurableKind::CmStart => "CM_START",
            CurableKind::CmEmoji => "CM_EMOJI",
            CurableKind::Disallowed => "DISALLOWED",
            CurableKind::Invisible => "INVISIBLE",
            CurableKind::FencedLeading => "FENCED_LEADING",
            CurableKind::FencedMulti => "FENCED_MULTI",
            CurableKind::FencedTrailing => "FENCED_TRAILING",
            CurableKind::ConfMixed => "CONF_MIXED",
        }
    }

    pub fn general_info(&self) -> &'static str {
        match self {
            CurableKind::Underscore => "Contains an underscore in a disallowed position",
            CurableKind::Hyphen => "Contains the sequence '--' in a disallowed position",
            CurableKind::EmptyLabel => "Contains a disallowed empty label",
            CurableKind::CmStart => "Contains a combining mark at the start of a label",
            CurableKind::CmEmoji => "Contains a combining mark directly after an emoji",
            CurableKind::Disallowed => "Contains a disallowed character",
            CurableKind::Invisible => "Contains a disallowed invisible character",
            CurableKind::FencedLeading => "Contains a disallowed character at the start of a label",
            CurableKind::FencedMulti => "Contains a disallowed sequence of adjacent characters",
            CurableKind::FencedTrailing => "Contains a disallowed character at the end of a label",
            CurableKind::ConfMixed => "Contains visually confusing characters from multiple scripts",
        }
    }

    /// Default explanation of the offending sequence. Some diagnostics
    /// replace this with a message naming the scripts involved.
    pub fn sequence_info(&self) -> &'static str {
        match self {
            CurableKind::Underscore => "An underscore is only allowed at the start of a label",
            CurableKind::Hyphen => "Hyphens are disallowed at the third and fourth place of a label",
            CurableKind::EmptyLabel => "Empty labels are not allowed, e.g. abc..eth",
            CurableKind::CmStart => "A combining mark is disallowed at the start of a label",
            CurableKind::CmEmoji => "A combining mark is disallowed after an emoji",
            CurableKind::Disallowed => "This character is disallowed",
            CurableKind::Invisible => "This invisible character is disallowed",
            CurableKind::FencedLeading => "This character is disallowed at the start of a label",
            CurableKind::FencedMulti => "These characters are disallowed when directly adjacent",
            CurableKind::FencedTrailing => "This character is disallowed at the end of a label",
            CurableKind::ConfMixed => "This character is confusable with characters from another script",
        }
    }
}

/// Conditions with no localized repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisallowedKind {
    EmptyName,
    NsmRepeated,
    NsmTooMany,
    ConfWhole,
}

impl DisallowedKind {
    pub fn code(&self) -> &'static str {
        match self {
            DisallowedKind::EmptyName => "EMPTY_NAME",
            DisallowedKind::NsmRepeated => "NSM_REPEATED",
            DisallowedKind::NsmTooMany => "NSM_TOO_MANY",
            DisallowedKind::ConfWhole => "CONF_WHOLE",
        }
    }

    pub fn general_info(&self) -> &'static str {
        match self {
            DisallowedKind::EmptyName => "The name is empty",
            DisallowedKind::NsmRepeated => "Contains a repeated non-spacing mark",
            DisallowedKind::NsmTooMany => "Contains too many consecutive non-spacing marks",
            DisallowedKind::ConfWhole => {
                "Contains characters that are confusable as a whole with another script"
            }
        }
    }
}

/// A repairable rejection: replacing `sequence` (a span of `sequence` code
/// points starting at the `index`-th code point of the original input) with
/// `suggested` removes this particular defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} at code point {}: {}", .kind.code(), .index, .sequence_info)]
pub struct CurableSequence {
    pub kind: CurableKind,
    /// Offset into the original input, in code point units.
    pub index: usize,
    /// The offending sequence, rendered in its normalized form.
    pub sequence: String,
    /// Replacement that repairs the defect, usually empty.
    pub suggested: String,
    pub sequence_info: String,
}

impl CurableSequence {
    pub fn new(
        kind: CurableKind,
        index: usize,
        sequence: impl Into<String>,
        suggested: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            index,
            sequence: sequence.into(),
            suggested: suggested.into(),
            sequence_info: kind.sequence_info().to_owned(),
        }
    }

    /// Same as [`CurableSequence::new`] with a diagnostic-specific
    /// explanation, e.g. naming the two scripts of a mixed-script conflict.
    pub fn with_info(
        kind: CurableKind,
        index: usize,
        sequence: impl Into<String>,
        suggested: impl Into<String>,
        sequence_info: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            index,
            sequence: sequence.into(),
            suggested: suggested.into(),
            sequence_info: sequence_info.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn general_info(&self) -> &'static str {
        self.kind.general_info()
    }
}

/// A terminal rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .kind.code(), .kind.general_info())]
pub struct DisallowedSequence {
    pub kind: DisallowedKind,
}

impl DisallowedSequence {
    pub fn new(kind: DisallowedKind) -> Self {
        Self { kind }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn general_info(&self) -> &'static str {
        self.kind.general_info()
    }
}

/// The failure type of the normalization entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Curable(#[from] CurableSequence),
    #[error(transparent)]
    Disallowed(#[from] DisallowedSequence),
}

impl ProcessError {
    pub fn code(&self) -> &'static str {
        match self {
            ProcessError::Curable(e) => e.code(),
            ProcessError::Disallowed(e) => e.code(),
        }
    }

    pub fn general_info(&self) -> &'static str {
        match self {
            ProcessError::Curable(e) => e.general_info(),
            ProcessError::Disallowed(e) => e.general_info(),
        }
    }

    pub fn is_curable(&self) -> bool {
        matches!(self, ProcessError::Curable(_))
    }
}

/// Kinds of input-changing transformations performed by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizableKind {
    Ignored,
    Mapped,
    Fe0f,
    Nfc,
}

impl NormalizableKind {
    pub fn code(&self) -> &'static str {
        match self {
            NormalizableKind::Ignored => "IGNORED",
            NormalizableKind::Mapped => "MAPPED",
            NormalizableKind::Fe0f => "FE0F",
            NormalizableKind::Nfc => "NFC",
        }
    }
}

/// One place where tokenization changed the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizableSequence {
    pub kind: NormalizableKind,
    /// Offset into the original input, in code point units.
    pub index: usize,
    /// The input sequence before normalization.
    pub sequence: String,
    /// What normalization replaces it with, possibly empty.
    pub suggested: String,
}

impl NormalizableSequence {
    pub(crate) fn new(
        kind: NormalizableKind,
        index: usize,
        sequence: String,
        suggested: String,
    ) -> Self {
        Self { kind, index, sequence, suggested }
    }

    /// Length of the input sequence in code point units.
    pub fn input_len(&self) -> usize {
        self.sequence.chars().count()
    }
}
