mod common;

use common::calc_grammar;
use reparse::{Grammar, InvalidationStrategy, ParseError, ParsingConfig};

#[test]
fn test_entries_before_the_edit_that_did_not_look_at_it_survive() {
    let grammar = Grammar::compile(
        "start = item*.
         item  = 'a'..'z' ';'.",
    )
    .unwrap();
    let mut parsing = grammar.parsing("a;b;c;d;");
    parsing.parse("start").unwrap();
    for pos in [0, 2, 4, 6] {
        assert_eq!(parsing.memo(pos, "item").map(|m| m.far), Some(2));
    }

    let report = parsing.replace(4, 5, "x").unwrap();

    // `item` at 0 and 2 inspected [0, 2) and [2, 4): untouched.
    assert!(parsing.memo(0, "item").is_some());
    assert!(parsing.memo(2, "item").is_some());
    // `item` at 4 lived in the replaced column; `start` at 0 looked at everything.
    assert!(parsing.memo(4, "item").is_none());
    assert!(parsing.memo(0, "start").is_none());
    // `item` at 6 moved with its column and is still valid.
    assert!(parsing.memo(6, "item").is_some());
    assert_eq!(report.invalidated, 1);
    assert_eq!(report.discarded, 1);

    parsing.reset_stats();
    assert!(parsing.parse("start").unwrap().is_full());
    let stats = parsing.stats();
    // Only `start` and the item at 4 are evaluated again.
    assert_eq!(stats.evaluations, 2);
    assert_eq!(stats.hits, 4);
}

#[test]
fn test_entry_ending_exactly_at_the_edit_survives() {
    let grammar = Grammar::compile("start = 'ab' %any. ab = 'ab'.").unwrap();
    let mut parsing = grammar.parsing("abc");
    assert!(parsing.parse("ab").unwrap().is_success());
    assert_eq!(parsing.memo(0, "ab").map(|m| m.far), Some(2));

    parsing.replace(2, 3, "z").unwrap();
    assert!(parsing.memo(0, "ab").is_some());

    // Even an empty insertion inside [0, 2) invalidates the entry.
    parsing.replace(1, 1, "").unwrap();
    assert!(parsing.memo(0, "ab").is_none());
}

#[test]
fn test_insertion_at_the_end_invalidates_end_lookups() {
    let grammar = Grammar::compile("start = digit+. digit = '0'..'9'.").unwrap();
    let mut parsing = grammar.parsing("12");
    assert!(parsing.parse("start").unwrap().is_full());
    // The failed lookup at the end counts as inspecting it.
    assert_eq!(parsing.memo(2, "digit").map(|m| (m.advance, m.far)), Some((None, 1)));

    parsing.insert(2, "3").unwrap();
    let outcome = parsing.parse("start").unwrap();
    assert!(outcome.is_full());
    assert_eq!(outcome.prefix(), Some(3));
}

#[test]
fn test_no_op_edit_changes_nothing() {
    let grammar = calc_grammar();
    let mut parsing = grammar.parsing("1+2*3");
    let before = parsing.parse("start").unwrap().result().clone();
    let entries = parsing.stats().entries;

    let text = parsing.text(2, 3);
    parsing.replace(2, 3, &text).unwrap();
    parsing.reset_stats();
    let after = parsing.parse("start").unwrap().result().clone();

    assert_eq!(before, after);
    assert_eq!(parsing.stats().entries, entries);
    assert_eq!(parsing.subject(), "1+2*3");
}

#[test]
fn test_rebuild_strategy_agrees_with_incremental() {
    let grammar = calc_grammar();
    let edits = [(0, 1, "12"), (3, 3, "+4"), (1, 4, ""), (0, 0, "(")];

    let mut incremental = grammar.parsing("1*(2-3)");
    let mut rebuild = grammar.parsing_with_config(
        "1*(2-3)",
        ParsingConfig::default().with_invalidation(InvalidationStrategy::Rebuild),
    );
    for (lo, hi, text) in edits {
        incremental.replace(lo, hi, text).unwrap();
        rebuild.replace(lo, hi, text).unwrap();
        let a = incremental.parse("start").unwrap().result().clone();
        let b = rebuild.parse("start").unwrap().result().clone();
        assert_eq!(a, b, "after replacing {lo}..{hi} with {text:?}");
    }
    assert_eq!(incremental.subject(), rebuild.subject());
}

#[test]
fn test_edits_past_the_end_are_rejected() {
    let grammar = calc_grammar();
    let mut parsing = grammar.parsing("1");
    assert_eq!(
        parsing.replace(0, 2, "x"),
        Err(ParseError::EditOutOfBounds { lo: 0, hi: 2, len: 1 })
    );
    assert_eq!(parsing.subject(), "1");
    assert!(parsing.parse("start").unwrap().is_full());
}
