mod common;

use common::{calc_grammar, CALC};
use reparse::grammar::compile_rules;
use reparse::{Expr, Grammar, GrammarBuilder, GrammarError};
use std::sync::Arc;

#[test]
fn test_calculator_grammar_compiles() {
    let grammar = calc_grammar();
    assert_eq!(grammar.len(), 6);
    assert_eq!(
        grammar.rule_names().collect::<Vec<_>>(),
        ["start", "exp0", "exp1", "exp2", "exp3", "digit"]
    );
    let exp3 = grammar.rule_id("exp3").unwrap();
    assert!(matches!(grammar.expr(exp3), Expr::Seclude(_)));
}

#[test]
fn test_printed_grammar_compiles_to_the_same_rules() {
    let rules = compile_rules(CALC).unwrap();
    let printed = calc_grammar().to_string();
    assert_eq!(compile_rules(&printed).unwrap(), rules);
    assert_eq!(calc_grammar().rules(), rules);
}

#[test]
fn test_printing_fail_and_nested_sequences_keeps_behaviour() {
    let built = GrammarBuilder::new()
        .rule(
            "start",
            Expr::choice(vec![
                Expr::seq(vec![
                    Expr::seq(vec![Expr::lit("a"), Expr::lit("b")]),
                    Expr::seq(vec![Expr::rule("tail")]),
                ]),
                Expr::seq(vec![Expr::Fail, Expr::lit("c")]),
                Expr::seq(vec![Expr::Seq(vec![]), Expr::lit("d")]),
            ]),
        )
        .rule("tail", Expr::choice(vec![Expr::Choice(vec![]), Expr::lit("e")]))
        .build()
        .map(Arc::new)
        .unwrap();

    let printed = built.to_string();
    let recompiled = Grammar::compile(&printed).unwrap();
    assert_eq!(recompiled.to_string(), printed);
    assert_ne!(recompiled.rules(), built.rules());

    for (subject, expected) in [("abe", true), ("d", true), ("c", false), ("ab", false), ("", false)] {
        assert_eq!(built.accepts(subject, "start"), Ok(expected), "{subject:?}");
        assert_eq!(recompiled.accepts(subject, "start"), Ok(expected), "{subject:?}");
    }
}

#[test]
fn test_builder_and_text_agree() {
    let built = GrammarBuilder::new()
        .rule(
            "list",
            Expr::rule("item").plus_sep(Expr::lit(",")).seclude(),
        )
        .rule("item", Expr::range('a', 'z').plus().grab())
        .build()
        .unwrap();
    let compiled = Grammar::compile("list : item ++ ','. item = {'a'..'z'+}.").unwrap();
    assert_eq!(built.to_string(), compiled.to_string());
}

#[test]
fn test_undefined_rule_suggests_a_near_miss() {
    let err = Grammar::compile("start = digits. digit = '0'..'9'.").unwrap_err();
    assert_eq!(
        err,
        GrammarError::UndefinedRule {
            name: "digits".into(),
            referenced_by: "start".into(),
            suggestion: Some("digit".into()),
        }
    );
    assert!(err.to_string().contains("did you mean `digit`"));
}

#[test]
fn test_duplicate_rules_and_empty_grammars() {
    assert_eq!(
        Grammar::compile("a = 'x'. a = 'y'.").unwrap_err(),
        GrammarError::DuplicateRule { name: "a".into() }
    );
    assert_eq!(Grammar::compile("# nothing here").unwrap_err(), GrammarError::Empty);
}

#[test]
fn test_syntax_errors_carry_positions() {
    let err = Grammar::compile("start = 'a'\n      | ).").unwrap_err();
    match err {
        GrammarError::Syntax { line, column, ref message, .. } => {
            assert_eq!((line, column), (2, 9));
            assert!(message.contains("expected `.`"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert!(matches!(
        Grammar::compile("r = 'z'..'a'.").unwrap_err(),
        GrammarError::InvalidRange { lo: 'z', hi: 'a' }
    ));
}

#[test]
fn test_left_recursive_grammar_still_builds() {
    // Left recursion is only detected when a parse runs into it.
    assert!(Grammar::compile("e = e '+' 'x' | 'x'.").is_ok());
}

#[test]
fn test_accepts() {
    let grammar = calc_grammar();
    assert_eq!(grammar.accepts("1+2", "start"), Ok(true));
    assert_eq!(grammar.accepts("1+", "start"), Ok(false));
    assert!(grammar.accepts("1", "nope").is_err());
}
