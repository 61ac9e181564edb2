//! Grammar visualization
//!
//! Renders a compiled grammar as a DOT/Graphviz rule dependency graph.

use reparse::grammar::validate::directly_left_recursive;
use reparse::{Expr, Grammar};
use std::collections::BTreeSet;
use std::fmt::{self, Write};

/// Generate a DOT/Graphviz representation of a grammar.
///
/// Rules become ellipses with an edge per referenced rule. Literals and
/// keywords become boxes joined to the rules that use them by dashed
/// edges. Directly left-recursive rules are drawn red.
///
/// ```rust
/// use reparse::Grammar;
/// use reparse_tools::visualize::generate_dot;
///
/// let grammar = Grammar::compile("start = item+. item = 'x'.")?;
/// let dot = generate_dot(&grammar);
/// assert!(dot.contains("\"start\" -> \"item\";"));
/// # Ok::<(), reparse::GrammarError>(())
/// ```
#[must_use]
pub fn generate_dot(grammar: &Grammar) -> String {
    Dot(grammar).to_string()
}

struct Dot<'a>(&'a Grammar);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dot(f, self.0)
    }
}

fn write_dot(output: &mut impl fmt::Write, grammar: &Grammar) -> fmt::Result {
    let rules: Vec<(String, Expr)> = grammar.rules();
    let recursive: BTreeSet<String> = directly_left_recursive(&rules).into_iter().collect();

    writeln!(output, "digraph Grammar {{")?;
    writeln!(output, "  rankdir=LR;")?;
    writeln!(output, "  node [shape=box];")?;
    writeln!(output)?;

    for (name, _) in &rules {
        if recursive.contains(name) {
            writeln!(output, "  \"{name}\" [label=\"{name}\", shape=ellipse, color=red];")?;
        } else {
            writeln!(output, "  \"{name}\" [label=\"{name}\", shape=ellipse];")?;
        }
    }
    writeln!(output)?;

    let mut token_nodes = BTreeSet::new();
    for (name, expr) in &rules {
        let mut refs = BTreeSet::new();
        expr.for_each_rule(&mut |callee| {
            refs.insert(callee);
        });
        for callee in refs {
            writeln!(output, "  \"{name}\" -> \"{callee}\";")?;
        }

        let mut tokens = BTreeSet::new();
        collect_tokens(expr, &mut tokens);
        for token in &tokens {
            writeln!(output, "  \"{name}\" -> \"{token}\" [style=dashed];")?;
        }
        token_nodes.extend(tokens);
    }

    if !token_nodes.is_empty() {
        writeln!(output)?;
        writeln!(output, "  // Tokens")?;
        for token in &token_nodes {
            writeln!(
                output,
                "  \"{token}\" [label=\"{token}\", shape=box, style=filled, fillcolor=lightblue];"
            )?;
        }
    }

    writeln!(output, "}}")
}

/// Token labels as they appear in grammar text, escaped for a DOT string.
fn collect_tokens(expr: &Expr, tokens: &mut BTreeSet<String>) {
    match expr {
        Expr::Literal(_) | Expr::Keyword(_) | Expr::Range(..) => {
            tokens.insert(escape(&expr.to_string()));
        }
        Expr::Seq(items) | Expr::Choice(items) => {
            for item in items {
                collect_tokens(item, tokens);
            }
        }
        Expr::Repeat(inner) | Expr::Not(inner) | Expr::Grab(inner) | Expr::Seclude(inner) => {
            collect_tokens(inner, tokens);
        }
        Expr::Empty | Expr::Fail | Expr::Any | Expr::Rule(_) | Expr::Do(_) | Expr::Push(_) => {}
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
