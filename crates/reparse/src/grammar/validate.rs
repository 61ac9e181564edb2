use crate::error::diagnostics::did_you_mean;
use crate::error::GrammarError;
use crate::grammar::Expr;
use hashbrown::HashSet;

/// Validate rule definitions before they are interned and lowered.
///
/// Left recursion is deliberately not checked here: whether a rule re-enters
/// itself without consuming input can depend on the subject, so the engine
/// reports it at parse time instead.
///
/// # Errors
///
/// Returns an error for an empty grammar, a rule defined twice, or a
/// reference to an undefined rule.
pub fn validate_rules(rules: &[(String, Expr)]) -> Result<(), GrammarError> {
    if rules.is_empty() {
        return Err(GrammarError::Empty);
    }

    let mut defined = HashSet::with_capacity(rules.len());
    for (name, _) in rules {
        if !defined.insert(name.as_str()) {
            return Err(GrammarError::DuplicateRule { name: name.clone() });
        }
    }

    for (lhs, expr) in rules {
        check_undefined_rules(lhs, expr, &defined)?;
    }

    Ok(())
}

fn check_undefined_rules(
    lhs: &str,
    expr: &Expr,
    defined: &HashSet<&str>,
) -> Result<(), GrammarError> {
    let mut missing = None;
    expr.for_each_rule(&mut |name| {
        if missing.is_none() && !defined.contains(name) {
            missing = Some(name);
        }
    });

    match missing {
        Some(name) => Err(GrammarError::UndefinedRule {
            name: name.to_owned(),
            referenced_by: lhs.to_owned(),
            suggestion: did_you_mean(name, defined.iter().copied()),
        }),
        None => Ok(()),
    }
}

/// Rules that can call themselves before consuming any input, following
/// direct leftmost calls only. Used for warnings; see [`validate_rules`].
#[must_use]
pub fn directly_left_recursive(rules: &[(String, Expr)]) -> Vec<String> {
    rules
        .iter()
        .filter(|(lhs, expr)| calls_leftmost(expr, lhs))
        .map(|(lhs, _)| lhs.clone())
        .collect()
}

fn calls_leftmost(expr: &Expr, lhs: &str) -> bool {
    match expr {
        Expr::Rule(name) => name == lhs,
        Expr::Seq(items) => {
            for item in items {
                if calls_leftmost(item, lhs) {
                    return true;
                }
                if !is_nullable_prefix(item) {
                    return false;
                }
            }
            false
        }
        Expr::Choice(items) => items.iter().any(|e| calls_leftmost(e, lhs)),
        Expr::Repeat(e) | Expr::Not(e) | Expr::Grab(e) | Expr::Seclude(e) => calls_leftmost(e, lhs),
        _ => false,
    }
}

/// Conservative: only expressions that can never consume input.
fn is_nullable_prefix(expr: &Expr) -> bool {
    match expr {
        Expr::Empty | Expr::Do(_) | Expr::Push(_) | Expr::Not(_) => true,
        Expr::Literal(s) => s.is_empty(),
        Expr::Seq(items) => items.iter().all(is_nullable_prefix),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(defs: &[(&str, Expr)]) -> Vec<(String, Expr)> {
        defs.iter()
            .map(|(name, expr)| ((*name).to_owned(), expr.clone()))
            .collect()
    }

    #[test]
    fn test_undefined_rule_with_suggestion() {
        let defs = rules(&[
            ("start", Expr::rule("digt")),
            ("digit", Expr::range('0', '9')),
        ]);
        assert_eq!(
            validate_rules(&defs),
            Err(GrammarError::UndefinedRule {
                name: "digt".into(),
                referenced_by: "start".into(),
                suggestion: Some("digit".into()),
            })
        );
    }

    #[test]
    fn test_duplicate_and_empty() {
        let defs = rules(&[("a", Expr::Any), ("a", Expr::Empty)]);
        assert_eq!(
            validate_rules(&defs),
            Err(GrammarError::DuplicateRule { name: "a".into() })
        );
        assert_eq!(validate_rules(&[]), Err(GrammarError::Empty));
    }

    #[test]
    fn test_left_recursion_is_only_reported_as_a_warning() {
        let defs = rules(&[
            (
                "e",
                Expr::choice(vec![
                    Expr::seq(vec![Expr::rule("e"), Expr::lit("+"), Expr::rule("t")]),
                    Expr::rule("t"),
                ]),
            ),
            ("t", Expr::seq(vec![Expr::action("x"), Expr::rule("t")])),
            ("u", Expr::seq(vec![Expr::lit("a"), Expr::rule("u")])),
        ]);
        assert_eq!(validate_rules(&defs), Ok(()));
        assert_eq!(directly_left_recursive(&defs), ["e", "t"]);
    }
}
