#[cfg(test)]
mod unit_tests {
    use crate::testing::fixture::tiny_normalizer;
    use crate::{
        CurableKind, DisallowedKind, EnsNormalizer, NormalizableKind, ProcessError,
        ProcessOptions,
    };

    #[test]
    fn folds_case_through_the_mapping_table() {
        let n = tiny_normalizer();
        assert_eq!(n.normalize("Nick.ETH").unwrap(), "nick.eth");
        assert_eq!(n.normalize("nick.eth").unwrap(), "nick.eth");
    }

    #[test]
    fn empty_input_is_the_normalized_empty_name() {
        let n = tiny_normalizer();
        assert_eq!(n.normalize("").unwrap(), "");
        assert!(n.is_normalized(""));
        assert!(n.is_normalizable(""));
    }

    #[test]
    fn multi_code_point_mappings_expand() {
        let n = tiny_normalizer();
        assert_eq!(n.normalize("a\u{BD}b").unwrap(), "a1\u{2044}2b");
    }

    #[test]
    fn ignored_code_points_contribute_nothing() {
        let n = tiny_normalizer();
        assert_eq!(n.normalize("a\u{AD}b\u{FEFF}").unwrap(), "ab");
    }

    #[test]
    fn nfc_mapping_and_fe0f_combine() {
        let n = tiny_normalizer();
        let input = "a\u{300}me\u{1F9D9}\u{200D}\u{2642}\u{FE0F}.eth";
        assert_eq!(
            n.normalize(input).unwrap(),
            "\u{E0}me\u{1F9D9}\u{200D}\u{2642}.eth"
        );
    }

    #[test]
    fn keycap_loses_its_selector_under_normalization() {
        let n = tiny_normalizer();
        assert_eq!(n.normalize("1\u{FE0F}\u{20E3}.eth").unwrap(), "1\u{20E3}.eth");
    }

    #[test]
    fn beautify_requalifies_emoji() {
        let n = tiny_normalizer();
        assert_eq!(
            n.beautify("1\u{20E3}2\u{20E3}.eth").unwrap(),
            "1\u{FE0F}\u{20E3}2\u{FE0F}\u{20E3}.eth"
        );
    }

    #[test]
    fn beautify_capitalizes_xi_outside_greek_labels() {
        let n = tiny_normalizer();
        assert_eq!(n.beautify("ξabc").unwrap(), "Ξabc");
        assert_eq!(n.beautify("ξλφα").unwrap(), "ξλφα");
        assert_eq!(
            n.beautify("ξabc.ξλφα.ξabc.ξλφα").unwrap(),
            "Ξabc.ξλφα.Ξabc.ξλφα"
        );
    }

    #[test]
    fn beautified_names_still_normalize_to_the_same_form() {
        let n = tiny_normalizer();
        for input in [
            "Nick.ETH",
            "1\u{20E3}.eth",
            "ξabc.ξλφα",
            "a\u{300}me.eth",
            "👍❤.eth",
        ] {
            let beautified = n.beautify(input).unwrap();
            assert_eq!(
                n.normalize(&beautified).unwrap(),
                n.normalize(input).unwrap(),
                "beautify changed the normalization of {input:?}"
            );
        }
    }

    #[test]
    fn normalize_is_idempotent_on_samples() {
        let n = tiny_normalizer();
        for input in ["Nick.ETH", "a\u{300}me", "'ab"] {
            if let Ok(once) = n.normalize(input) {
                assert_eq!(n.normalize(&once).unwrap(), once);
            }
        }
    }

    #[test]
    fn normalizations_report_every_mapping() {
        let n = tiny_normalizer();
        let seqs = n.normalizations("Nick.ETH");
        assert_eq!(seqs.len(), 4);
        assert!(seqs.iter().all(|s| s.kind == NormalizableKind::Mapped));
        assert_eq!(
            seqs.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 5, 6, 7]
        );
        assert_eq!(seqs[0].sequence, "N");
        assert_eq!(seqs[0].suggested, "n");
    }

    #[test]
    fn normalizations_attribute_input_offsets() {
        let n = tiny_normalizer();
        // ignored, mapped, emoji with FE0F, and an NFC pair in one name
        let input = "a\u{AD}aA.a\u{1F6B4}\u{200D}\u{2642}\u{FE0F}aa\u{300}b";
        let seqs = n.normalizations(input);
        assert_eq!(seqs.len(), 4);

        assert_eq!(seqs[0].kind, NormalizableKind::Ignored);
        assert_eq!(seqs[0].index, 1);
        assert_eq!(seqs[0].sequence, "\u{AD}");
        assert_eq!(seqs[0].suggested, "");

        assert_eq!(seqs[1].kind, NormalizableKind::Mapped);
        assert_eq!(seqs[1].index, 3);
        assert_eq!(seqs[1].sequence, "A");
        assert_eq!(seqs[1].suggested, "a");

        assert_eq!(seqs[2].kind, NormalizableKind::Fe0f);
        assert_eq!(seqs[2].index, 6);
        assert_eq!(seqs[2].sequence, "\u{1F6B4}\u{200D}\u{2642}\u{FE0F}");
        assert_eq!(seqs[2].suggested, "\u{1F6B4}\u{200D}\u{2642}");

        assert_eq!(seqs[3].kind, NormalizableKind::Nfc);
        assert_eq!(seqs[3].index, 11);
        assert_eq!(seqs[3].sequence, "a\u{300}");
        assert_eq!(seqs[3].suggested, "\u{E0}");
    }

    #[test]
    fn an_already_normalized_emoji_reports_no_fe0f_entry() {
        let n = tiny_normalizer();
        assert!(n.normalizations("1\u{20E3}").is_empty());
    }

    #[test]
    fn cure_strips_disallowed_characters() {
        let n = tiny_normalizer();
        let cured = n.cure_details("Nick?.ETH").unwrap();
        assert_eq!(cured.cured, "nick.eth");
        assert_eq!(cured.cures.len(), 1);
        assert_eq!(cured.cures[0].kind, CurableKind::Disallowed);
        assert_eq!(cured.cures[0].index, 4);
    }

    #[test]
    fn cure_iterates_until_clean() {
        let n = tiny_normalizer();
        let cured = n.cure_details("a_b_c").unwrap();
        assert_eq!(cured.cured, "abc");
        assert_eq!(cured.cures.len(), 2);
    }

    #[test]
    fn cure_collapses_empty_labels() {
        let n = tiny_normalizer();
        assert_eq!(n.cure("a..b").unwrap(), "a.b");
        assert_eq!(n.cure(".a.").unwrap(), "a");
    }

    #[test]
    fn curing_everything_away_is_an_empty_name() {
        let n = tiny_normalizer();
        match n.cure("?") {
            Err(ProcessError::Disallowed(e)) => assert_eq!(e.kind, DisallowedKind::EmptyName),
            other => panic!("expected EMPTY_NAME, got {other:?}"),
        }
    }

    #[test]
    fn cure_reraises_whole_script_confusables() {
        let n = tiny_normalizer();
        match n.cure("0χх0.eth") {
            Err(ProcessError::Disallowed(e)) => assert_eq!(e.kind, DisallowedKind::ConfWhole),
            other => panic!("expected CONF_WHOLE, got {other:?}"),
        }
    }

    #[test]
    fn cured_names_are_fixed_points() {
        let n = tiny_normalizer();
        for input in ["Nick?.ETH", "a_b_c", "a..b", "'ab", "aa--a"] {
            if let Ok(cured) = n.cure(input) {
                assert_eq!(n.normalize(&cured).unwrap(), cured);
                assert_eq!(n.cure(&cured).unwrap(), cured);
            }
        }
    }

    #[test]
    fn process_produces_only_what_was_asked() {
        let n = tiny_normalizer();
        let res = n.process("Nick.ETH", ProcessOptions::default());
        assert!(res.normalized.is_none());
        assert!(res.beautified.is_none());
        assert!(res.tokens.is_none());
        assert!(res.normalizations.is_none());
        assert!(res.cured.is_none());
        assert!(res.error.is_none());

        let res = n.process("Nick.ETH", ProcessOptions::all());
        assert_eq!(res.normalized.as_deref(), Some("nick.eth"));
        assert!(res.beautified.is_some());
        assert!(res.tokens.is_some());
        assert_eq!(res.normalizations.map(|s| s.len()), Some(4));
        assert_eq!(res.cured.as_deref(), Some("nick.eth"));
        assert_eq!(res.cures.map(|c| c.len()), Some(0));
        assert!(res.error.is_none());
    }

    #[test]
    fn process_captures_errors_instead_of_raising() {
        let n = tiny_normalizer();
        let res = n.process("a_b", ProcessOptions::all());
        assert!(res.normalized.is_none());
        assert!(res.beautified.is_none());
        match res.error {
            Some(ProcessError::Curable(e)) => assert_eq!(e.kind, CurableKind::Underscore),
            other => panic!("expected UNDERSCORE, got {other:?}"),
        }
        // the cure still ran
        assert_eq!(res.cured.as_deref(), Some("ab"));
        assert_eq!(res.cures.map(|c| c.len()), Some(1));
    }

    #[test]
    fn process_keeps_the_original_error_when_curing_fails() {
        let n = tiny_normalizer();
        let res = n.process("0χх0", ProcessOptions::all());
        assert!(res.cured.is_none());
        match res.error {
            Some(ProcessError::Curable(e)) => assert_eq!(e.kind, CurableKind::ConfMixed),
            other => panic!("expected CONF_MIXED, got {other:?}"),
        }
    }

    #[test]
    fn hyphen_reservation_is_rejected() {
        let n = tiny_normalizer();
        match n.normalize("xn--a.eth") {
            Err(ProcessError::Curable(e)) => {
                assert_eq!(e.kind, CurableKind::Hyphen);
                assert_eq!(e.index, 2);
            }
            other => panic!("expected HYPHEN, got {other:?}"),
        }
    }

    #[test]
    fn separators_survive_normalization_one_to_one() {
        let n = tiny_normalizer();
        let input = "a\u{AD}.b.c";
        let normalized = n.normalize(input).unwrap();
        assert_eq!(
            normalized.matches('.').count(),
            input.matches('.').count()
        );
    }

    #[test]
    fn debug_sequence_escapes_invisibles() {
        let n = tiny_normalizer();
        assert_eq!(n.debug_sequence("a\u{200D}b"), "a{200D}b");
        assert_eq!(n.debug_sequence("plain"), "plain");
    }

    #[test]
    fn the_normalizer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnsNormalizer>();

        let n = std::sync::Arc::new(tiny_normalizer());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let n = n.clone();
                std::thread::spawn(move || n.normalize("Nick.ETH").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "nick.eth");
        }
    }
}
