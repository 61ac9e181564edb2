//! Machine-readable and human-readable parse reports

use reparse::{ChartStats, Invalidation, ParseOutcome, Value};
use serde_json::json;

/// A JSON report of one parse.
///
/// `values` is present when the parse was interpreted, `edits` lists the
/// chart invalidations of the edits applied before the parse.
#[must_use]
pub fn outcome_json(
    outcome: &ParseOutcome<'_>,
    values: Option<&[Value]>,
    edits: &[Invalidation],
    stats: Option<&ChartStats>,
) -> serde_json::Value {
    json!({
        "rule": outcome.rule_name(),
        "subject": outcome.parsing().subject(),
        "full": outcome.is_full(),
        "advance": outcome.prefix(),
        "far": outcome.inspected(),
        "ops": outcome.ops().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "values": values,
        "edits": edits,
        "stats": stats,
    })
}

/// One-line summary of chart usage.
#[must_use]
pub fn format_stats(stats: &ChartStats) -> String {
    format!(
        "hits: {}, evaluations: {}, hit ratio: {:.1}%, entries: {}, invalidated: {}",
        stats.hits,
        stats.evaluations,
        stats.hit_ratio() * 100.0,
        stats.entries,
        stats.invalidations
    )
}

#[must_use]
pub fn format_invalidation(report: &Invalidation) -> String {
    format!(
        "replaced {}..{} with {} chars: scanned {} columns, discarded {}, invalidated {}",
        report.lo, report.hi, report.inserted, report.scanned, report.discarded, report.invalidated
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reparse::{AstSemantics, Grammar};

    #[test]
    fn test_outcome_json() {
        let grammar = Grammar::compile("start = {'0'..'9'+} :int.").unwrap();
        let mut parsing = grammar.parsing("12");
        parsing.parse_start().unwrap();
        let edit = parsing.replace(1, 2, "7").unwrap();
        let stats = parsing.stats();
        let outcome = parsing.parse_start().unwrap();
        let values = outcome.interpret(&AstSemantics).unwrap();

        let report = outcome_json(&outcome, Some(&values), &[edit], Some(&stats));
        assert_eq!(report["rule"], "start");
        assert_eq!(report["subject"], "17");
        assert_eq!(report["full"], true);
        assert_eq!(report["advance"], 2);
        assert_eq!(report["far"], 3);
        assert_eq!(report["values"], json!([["int", "17"]]));
        assert_eq!(report["edits"][0]["lo"], 1);
        assert_eq!(report["stats"]["evaluations"], 1);
    }

    #[test]
    fn test_failed_outcome_json() {
        let grammar = Grammar::compile("start = 'a'.").unwrap();
        let mut parsing = grammar.parsing("b");
        let outcome = parsing.parse_start().unwrap();
        let report = outcome_json(&outcome, None, &[], None);
        assert_eq!(report["full"], false);
        assert!(report["advance"].is_null());
        assert!(report["values"].is_null());
        assert_eq!(report["ops"], json!([]));
    }

    #[test]
    fn test_format_stats() {
        let stats = ChartStats {
            hits: 1,
            evaluations: 3,
            invalidations: 2,
            entries: 3,
        };
        assert_eq!(
            format_stats(&stats),
            "hits: 1, evaluations: 3, hit ratio: 25.0%, entries: 3, invalidated: 2"
        );
    }
}
