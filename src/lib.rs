#![forbid(unsafe_code)]

//! ENSIP-15 name normalization.
//!
//! Given an arbitrary Unicode string purporting to be an ENS name, the
//! engine transforms normalizable inputs into canonical form. When it
//! cannot, it produces a diagnostic that pins the rejection to a concrete
//! input offset, with a suggested repair where one exists. On top of the
//! normalizer sit the beautifier (fully-qualified emoji rendering) and the
//! curer (iterative repair loop).
//!
//! The engine is a pure function over immutable tables loaded from the
//! ENSIP-15 `spec.json`; build one [`EnsNormalizer`] and share it across
//! threads.

pub mod code_points;
pub mod error;
pub mod normalizer;
pub mod spec_data;
pub mod testing;
pub mod token;

pub use code_points::CodePoint;
pub use error::{
    CurableKind, CurableSequence, DisallowedKind, DisallowedSequence, NormalizableKind,
    NormalizableSequence, ProcessError,
};
pub use normalizer::{CuredName, EnsNormalizer, ProcessOptions, ProcessedName};
pub use spec_data::{ScriptGroup, SpecData, SpecDataError, WholeEntry, WholeValue};
pub use token::{
    Token, TokenDisallowed, TokenEmoji, TokenIgnored, TokenMapped, TokenNfc, TokenStop,
    TokenValid,
};

// Internal only
mod emoji;
mod tokenizer;
mod validate;

#[cfg(test)]
mod tests {
    include!("tests/unit.rs");
    include!("tests/integration.rs");
    include!("tests/proptest.rs");
}
