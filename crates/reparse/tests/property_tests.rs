//! Property-based tests for the incremental engine
//!
//! Random subjects and random edit sequences; after every edit the
//! incrementally maintained chart must give exactly what a fresh parse of
//! the same text gives.

mod common;

use common::calc_grammar;
use proptest::prelude::*;
use reparse::testing::{EditMutation, GeneratorConfig, SubjectGenerator};
use reparse::{Grammar, MatchResult, ParseError, Parsing, ParsingConfig};
use std::sync::Arc;

const STATEMENTS: &str = r#"
start  = stmt*.
stmt   = "if" ' ' word ';' | word ';'.
word   = !"if" letter+.
letter = 'a'..'z'.
"#;

fn statements_grammar() -> Arc<Grammar> {
    Grammar::compile(STATEMENTS).expect("statement grammar compiles")
}

fn result_of(parsing: &mut Parsing) -> Result<MatchResult, ParseError> {
    parsing.parse("start").map(|outcome| outcome.result().clone())
}

fn fresh_result(grammar: &Arc<Grammar>, subject: &str) -> Result<MatchResult, ParseError> {
    result_of(&mut grammar.parsing(subject))
}

type Edit = (usize, usize, String);

fn edits(alphabet: &'static str) -> impl Strategy<Value = Vec<Edit>> {
    prop::collection::vec((any::<usize>(), 0usize..4, alphabet), 1..8)
}

/// Clamp a raw edit into a subject of `len` chars.
fn place(edit: &Edit, len: usize) -> EditMutation {
    let lo = edit.0 % (len + 1);
    let hi = (lo + edit.1).min(len);
    EditMutation::Replace {
        lo,
        hi,
        text: edit.2.clone(),
    }
}

/// Apply `edits` one at a time, checking the chart against a fresh parse
/// and the subject against a plain string after each.
fn check_mutations(
    grammar: &Arc<Grammar>,
    subject: &str,
    edits: impl IntoIterator<Item = EditMutation>,
) {
    let mut parsing = grammar.parsing(subject);
    let mut expected = subject.to_owned();
    assert_eq!(result_of(&mut parsing), fresh_result(grammar, subject));

    for edit in edits {
        edit.apply(&mut parsing).expect("edit in bounds");
        expected = edit.apply_to_str(&expected);
        assert_eq!(parsing.subject(), expected);
        assert_eq!(
            result_of(&mut parsing),
            fresh_result(grammar, &expected),
            "after {edit:?}, subject {expected:?}"
        );
    }
}

fn check_incremental(grammar: &Arc<Grammar>, subject: &str, edits: &[Edit]) {
    let mut len = subject.chars().count();
    let placed: Vec<EditMutation> = edits
        .iter()
        .map(|edit| {
            let placed = place(edit, len);
            len = len - placed.removed() + placed.inserted();
            placed
        })
        .collect();
    check_mutations(grammar, subject, placed);
}

proptest! {
    #[test]
    fn incremental_equals_fresh_calculator(
        subject in "[0-9+*/()-]{0,14}",
        edit_list in edits("[0-9+*/()-]{0,3}"),
    ) {
        check_incremental(&calc_grammar(), &subject, &edit_list);
    }

    #[test]
    fn incremental_equals_fresh_with_lookahead(
        subject in "(if |[a-z]{1,3}|;){0,10}",
        edit_list in edits("(if|[a-f ;]){0,3}"),
    ) {
        check_incremental(&statements_grammar(), &subject, &edit_list);
    }

    #[test]
    fn generated_subjects_survive_generated_edits(seed in any::<u64>(), count in 1usize..12) {
        let grammar = calc_grammar();
        let generator = SubjectGenerator::new(
            Arc::clone(&grammar),
            GeneratorConfig {
                seed: Some(seed),
                max_depth: 4,
                ..GeneratorConfig::default()
            },
        );
        let subject = generator.generate("start").expect("calculator has a start rule");
        check_mutations(&grammar, &subject, generator.mutations(&subject, count));
    }

    #[test]
    fn memoized_equals_naive(subject in "[0-9+*/()-]{0,12}") {
        let grammar = calc_grammar();
        let mut memo = grammar.parsing(&subject);
        let mut naive = grammar
            .parsing_with_config(&subject, ParsingConfig::default().with_memoize(false));
        prop_assert_eq!(result_of(&mut memo), result_of(&mut naive));
    }

    #[test]
    fn no_op_edit_is_idempotent(
        subject in "[0-9+*()-]{1,14}",
        raw_lo in any::<usize>(),
        span in 0usize..4,
    ) {
        let grammar = calc_grammar();
        let mut parsing = grammar.parsing(&subject);
        let before = result_of(&mut parsing);

        let (lo, hi, _) = place(&(raw_lo, span, String::new()), parsing.len()).as_replace();
        let same = parsing.text(lo, hi);
        parsing.replace(lo, hi, &same).expect("edit in bounds");

        prop_assert_eq!(parsing.subject(), subject);
        prop_assert_eq!(result_of(&mut parsing), before);
    }
}
