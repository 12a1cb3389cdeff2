//! Input string to token stream.
//!
//! Three passes: the emoji machine plus per-code-point classifier, the NFC
//! interleave over runs flagged by the quick-check set, and a final coalesce
//! of adjacent valid tokens. Tokenization is total; disallowed code points
//! survive as tokens and are rejected later by validation.

use crate::code_points::{nfc_cps, str2cps, CodePoint, CP_FE0F, CP_STOP};
use crate::emoji::EmojiTrie;
use crate::spec_data::SpecData;
use crate::token::{
    Token, TokenDisallowed, TokenEmoji, TokenIgnored, TokenMapped, TokenNfc, TokenStop, TokenValid,
};

pub(crate) fn tokenize(spec: &SpecData, trie: &EmojiTrie, input: &str) -> Vec<Token> {
    let cps = str2cps(input);
    let mut tokens: Vec<Token> = Vec::with_capacity(cps.len());
    let mut i = 0usize;

    while i < cps.len() {
        if let Some(m) = trie.match_at(&cps[i..]) {
            let consumed = &cps[i..i + m.len];
            tokens.push(Token::Emoji(TokenEmoji {
                emoji: m.emoji.to_vec(),
                input: consumed.to_vec(),
                cps: consumed.iter().copied().filter(|&cp| cp != CP_FE0F).collect(),
            }));
            i += m.len;
            continue;
        }

        let cp = cps[i];
        i += 1;

        if cp == CP_STOP {
            tokens.push(Token::Stop(TokenStop::default()));
        } else if spec.valid.contains(&cp) {
            tokens.push(Token::Valid(TokenValid { cps: vec![cp] }));
        } else if spec.ignored.contains(&cp) {
            tokens.push(Token::Ignored(TokenIgnored { cp }));
        } else if let Some(image) = spec.mapped.get(&cp) {
            tokens.push(Token::Mapped(TokenMapped { cp, cps: image.clone() }));
        } else {
            tokens.push(Token::Disallowed(TokenDisallowed { cp }));
        }
    }

    collapse_valid(apply_nfc(spec, tokens))
}

fn is_text(token: &Token) -> bool {
    matches!(token, Token::Valid(_) | Token::Mapped(_))
}

/// Replace every maximal text run whose NFC form differs from its raw form
/// with a single [`TokenNfc`]. Ignored tokens do not break a run; when a run
/// is replaced, the ignored code points inside it are folded into the NFC
/// token's `input` so the stream stays lossless.
fn apply_nfc(spec: &SpecData, mut tokens: Vec<Token>) -> Vec<Token> {
    let mut i = 0usize;
    // The most recent text token that could serve as a composition base.
    let mut start: Option<usize> = None;

    while i < tokens.len() {
        if is_text(&tokens[i]) {
            if spec.requires_nfc_check(tokens[i].output_cps()) {
                let mut end = i + 1;
                for pos in (i + 1)..tokens.len() {
                    if is_text(&tokens[pos]) {
                        if !spec.requires_nfc_check(tokens[pos].output_cps()) {
                            break;
                        }
                        end = pos + 1;
                    } else if !tokens[pos].is_ignored() {
                        break;
                    }
                }
                let s = start.unwrap_or(i);
                let text: Vec<CodePoint> = tokens[s..end]
                    .iter()
                    .filter(|t| is_text(t))
                    .flat_map(|t| t.output_cps().iter().copied())
                    .collect();
                let normalized = nfc_cps(&text);
                if normalized == text {
                    i = end - 1;
                } else {
                    let input: Vec<CodePoint> =
                        tokens[s..end].iter().flat_map(Token::input_cps).collect();
                    tokens.splice(
                        s..end,
                        std::iter::once(Token::Nfc(TokenNfc { input, cps: normalized })),
                    );
                    i = s;
                }
                start = None;
            } else {
                start = Some(i);
            }
        } else if !tokens[i].is_ignored() {
            start = None;
        }
        i += 1;
    }
    tokens
}

fn collapse_valid(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if let Token::Valid(cur) = &tok {
            if let Some(Token::Valid(prev)) = out.last_mut() {
                prev.cps.extend_from_slice(&cur.cps);
                continue;
            }
        }
        out.push(tok);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture::tiny_spec;

    fn run(input: &str) -> Vec<Token> {
        let spec = tiny_spec();
        let trie = EmojiTrie::new(&spec.emoji);
        tokenize(&spec, &trie, input)
    }

    #[test]
    fn streams_are_lossless() {
        for input in [
            "",
            "nick.eth",
            "Nick.ETH",
            "a\u{AD}b",
            "a\u{300}me",
            "1\u{FE0F}\u{20E3}x",
            "bad?char",
            "..",
        ] {
            let cps: Vec<CodePoint> = run(input).iter().flat_map(|t| t.input_cps()).collect();
            assert_eq!(cps, str2cps(input), "lossless projection for {input:?}");
        }
    }

    #[test]
    fn adjacent_valid_tokens_coalesce() {
        let tokens = run("abc");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0], Token::Valid(t) if t.cps == str2cps("abc")));
    }

    #[test]
    fn classifier_covers_every_kind() {
        let tokens = run("A\u{AD}?.👍");
        assert!(matches!(tokens[0], Token::Mapped(_)));
        assert!(matches!(tokens[1], Token::Ignored(_)));
        assert!(matches!(tokens[2], Token::Disallowed(_)));
        assert!(matches!(tokens[3], Token::Stop(_)));
        assert!(matches!(tokens[4], Token::Emoji(_)));
    }

    #[test]
    fn nfc_run_is_recomposed() {
        let tokens = run("xa\u{300}y");
        // x and y survive, the middle pair becomes one NFC token
        let nfc: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Nfc(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(nfc.len(), 1);
        assert_eq!(nfc[0].input, vec![0x61, 0x300]);
        assert_eq!(nfc[0].cps, vec![0xE0]);
    }

    #[test]
    fn already_composed_text_is_untouched() {
        let tokens = run("\u{E0}me");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0], Token::Valid(t) if t.cps == vec![0xE0, 0x6D, 0x65]));
    }

    #[test]
    fn ignored_inside_an_nfc_run_folds_into_it() {
        let tokens = run("a\u{AD}\u{300}");
        assert_eq!(tokens.len(), 1);
        assert!(
            matches!(&tokens[0], Token::Nfc(t) if t.input == vec![0x61, 0xAD, 0x300] && t.cps == vec![0xE0])
        );
    }

    #[test]
    fn emoji_tokens_strip_fe0f_from_output() {
        let tokens = run("1\u{FE0F}\u{20E3}");
        match &tokens[0] {
            Token::Emoji(t) => {
                assert_eq!(t.input, vec![0x31, 0xFE0F, 0x20E3]);
                assert_eq!(t.cps, vec![0x31, 0x20E3]);
                assert_eq!(t.emoji, vec![0x31, 0xFE0F, 0x20E3]);
            }
            other => panic!("expected emoji token, got {other:?}"),
        }
    }
}
