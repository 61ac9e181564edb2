use super::chart::{Chart, Entry};
use super::config::ParsingConfig;
use crate::error::ParseError;
use crate::grammar::{Grammar, Parser, RuleId};
use crate::ops::{MatchResult, Op, OpStream};

/// Everything a combinator needs while matching: the rules to call, the
/// subject, and the chart that memoizes the calls.
pub struct ParseContext<'a> {
    grammar: &'a Grammar,
    subject: &'a [char],
    chart: &'a mut Chart,
    memoize: bool,
    depth: usize,
    max_depth: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        grammar: &'a Grammar,
        subject: &'a [char],
        chart: &'a mut Chart,
        config: &ParsingConfig,
    ) -> Self {
        Self {
            grammar,
            subject,
            chart,
            memoize: config.memoize,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Match `rule` at `pos` through the chart.
    ///
    /// # Errors
    ///
    /// [`ParseError::LeftRecursion`] if `rule` is already being evaluated at
    /// `pos`, [`ParseError::DepthExceeded`] if evaluating it would nest too
    /// deeply, or any error raised while evaluating it. On error the
    /// in-progress mark is removed again.
    pub fn call(&mut self, rule: RuleId, pos: usize) -> Result<MatchResult, ParseError> {
        match self.chart.get(pos, rule) {
            Some(Entry::Done(result)) => {
                let result = result.clone();
                self.chart.record_hit();
                return Ok(result);
            }
            Some(Entry::InProgress) => {
                return Err(ParseError::LeftRecursion {
                    rule: self.grammar.rule_name(rule).to_owned(),
                    position: pos,
                });
            }
            None => {}
        }

        if self.depth >= self.max_depth {
            return Err(ParseError::DepthExceeded {
                position: pos,
                limit: self.max_depth,
            });
        }

        tracing::trace!(rule = self.grammar.rule_name(rule), pos, "chart miss");
        self.chart.begin(pos, rule);
        let grammar = self.grammar;
        self.depth += 1;
        let evaluated = grammar.parser(rule).match_at(self, pos);
        self.depth -= 1;
        let result = match evaluated {
            Ok(result) => result,
            Err(err) => {
                self.chart.abandon(pos, rule);
                return Err(err);
            }
        };

        if self.memoize {
            self.chart.finish(pos, rule, result.clone());
        } else {
            self.chart.abandon(pos, rule);
        }
        Ok(result)
    }
}

impl Parser {
    /// Match this combinator at subject position `pos`.
    ///
    /// # Errors
    ///
    /// [`ParseError::LeftRecursion`], [`ParseError::StuckOnRepeat`] and
    /// [`ParseError::DepthExceeded`]; a
    /// plain mismatch is a failed [`MatchResult`], not an error.
    pub fn match_at(&self, ctx: &mut ParseContext<'_>, pos: usize) -> Result<MatchResult, ParseError> {
        match self {
            Self::Empty => Ok(MatchResult::success(0, 0, OpStream::new())),
            Self::Fail => Ok(MatchResult::failure(0)),
            Self::Any => Ok(if pos < ctx.subject.len() {
                MatchResult::success(1, 1, OpStream::new())
            } else {
                MatchResult::failure(1)
            }),
            Self::Range(lo, hi) => Ok(match ctx.subject.get(pos) {
                Some(&ch) if (*lo..=*hi).contains(&ch) => MatchResult::success(1, 1, OpStream::new()),
                _ => MatchResult::failure(1),
            }),
            Self::Literal(chars) => {
                for (k, expected) in chars.iter().enumerate() {
                    if ctx.subject.get(pos + k) != Some(expected) {
                        return Ok(MatchResult::failure(k + 1));
                    }
                }
                Ok(MatchResult::success(chars.len(), chars.len(), OpStream::new()))
            }
            Self::Call(rule) => ctx.call(*rule, pos),
            Self::Chain(p, q) => {
                let first = p.match_at(ctx, pos)?;
                let Some(a1) = first.advance else {
                    return Ok(first);
                };
                let second = q.match_at(ctx, pos + a1)?;
                let far = first.far.max(a1 + second.far);
                Ok(match second.advance {
                    Some(a2) => MatchResult::success(a1 + a2, far, first.ops.concat(&second.ops)),
                    None => MatchResult::failure(far),
                })
            }
            Self::Either(p, q) => {
                let first = p.match_at(ctx, pos)?;
                if first.is_success() {
                    return Ok(first);
                }
                let mut second = q.match_at(ctx, pos)?;
                second.far = second.far.max(first.far);
                Ok(second)
            }
            Self::Repeat(p) => {
                let mut offset = 0;
                let mut far = 0;
                let mut ops = OpStream::new();
                loop {
                    let attempt = p.match_at(ctx, pos + offset)?;
                    far = far.max(offset + attempt.far);
                    match attempt.advance {
                        None => return Ok(MatchResult::success(offset, far, ops)),
                        Some(0) => {
                            return Err(ParseError::StuckOnRepeat {
                                position: pos + offset,
                            })
                        }
                        Some(advance) => {
                            offset += advance;
                            ops = ops.concat(&attempt.ops);
                        }
                    }
                }
            }
            Self::Nix(p) => {
                let inner = p.match_at(ctx, pos)?;
                Ok(if inner.is_success() {
                    MatchResult::failure(inner.far)
                } else {
                    MatchResult::success(0, inner.far, OpStream::new())
                })
            }
            Self::Grab(p) => {
                let mut inner = p.match_at(ctx, pos)?;
                if let Some(advance) = inner.advance {
                    let text: String = ctx.subject[pos..pos + advance].iter().collect();
                    inner.ops = inner.ops.push(Op::Grab(text.into()));
                }
                Ok(inner)
            }
            Self::Seclude(p) => {
                let mut inner = p.match_at(ctx, pos)?;
                if inner.is_success() {
                    inner.ops = inner.ops.bracketed();
                }
                Ok(inner)
            }
            Self::Do(name) => Ok(MatchResult::emit(Op::Do(name.clone()))),
            Self::Push(value) => Ok(MatchResult::emit(Op::Lit(value.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Expr, GrammarBuilder};

    fn grammar(body: Expr) -> Grammar {
        GrammarBuilder::new()
            .rule("start", body)
            .rule("digit", Expr::range('0', '9'))
            .build()
            .expect("valid grammar")
    }

    fn run(body: Expr, subject: &str) -> Result<MatchResult, ParseError> {
        let grammar = grammar(body);
        let subject: Vec<char> = subject.chars().collect();
        let mut chart = Chart::new(subject.len());
        let mut ctx = ParseContext::new(&grammar, &subject, &mut chart, &ParsingConfig::default());
        let start = grammar.rule_id("start").expect("start");
        ctx.call(start, 0)
    }

    fn shape(result: &MatchResult) -> (Option<usize>, usize) {
        (result.advance, result.far)
    }

    #[test]
    fn test_literal_far_counts_the_mismatching_char() {
        assert_eq!(shape(&run(Expr::lit("abc"), "abc").unwrap()), (Some(3), 3));
        assert_eq!(shape(&run(Expr::lit("abc"), "abx").unwrap()), (None, 3));
        assert_eq!(shape(&run(Expr::lit("abc"), "ab").unwrap()), (None, 3));
        assert_eq!(shape(&run(Expr::lit(""), "x").unwrap()), (Some(0), 0));
    }

    #[test]
    fn test_range_at_end_of_input_inspects_one() {
        assert_eq!(shape(&run(Expr::rule("digit"), "").unwrap()), (None, 1));
        assert_eq!(shape(&run(Expr::Any, "").unwrap()), (None, 1));
    }

    #[test]
    fn test_chain_and_either_far() {
        let chain = Expr::seq(vec![Expr::lit("a"), Expr::lit("bc")]);
        assert_eq!(shape(&run(chain, "abx").unwrap()), (None, 3));

        let either = Expr::choice(vec![Expr::lit("abc"), Expr::lit("a")]);
        assert_eq!(shape(&run(either, "abx").unwrap()), (Some(1), 3));
    }

    #[test]
    fn test_repeat_far_includes_final_failure() {
        let digits = Expr::rule("digit").star();
        assert_eq!(shape(&run(digits.clone(), "12x").unwrap()), (Some(2), 3));
        assert_eq!(shape(&run(digits, "12").unwrap()), (Some(2), 3));
    }

    #[test]
    fn test_nix_inverts_and_keeps_far() {
        let not_a = Expr::lit("ab").not();
        assert_eq!(shape(&run(not_a.clone(), "ab").unwrap()), (None, 2));
        assert_eq!(shape(&run(not_a, "ax").unwrap()), (Some(0), 2));
    }

    #[test]
    fn test_grab_and_seclude_ops() {
        let body = Expr::seq(vec![Expr::rule("digit").plus().grab(), Expr::action("int")]).seclude();
        let result = run(body, "42").unwrap();
        assert_eq!(result.ops.to_string(), "([ grab '42' :int ])");
    }

    #[test]
    fn test_zero_width_repeat_is_stuck() {
        let body = Expr::lit("").star();
        assert_eq!(
            run(body, "abc"),
            Err(ParseError::StuckOnRepeat { position: 0 })
        );
    }

    #[test]
    fn test_left_recursion_clears_in_progress_marks() {
        let grammar = GrammarBuilder::new()
            .rule("start", Expr::seq(vec![Expr::rule("start"), Expr::lit("a")]))
            .build()
            .expect("valid grammar");
        let subject: Vec<char> = "a".chars().collect();
        let mut chart = Chart::new(subject.len());
        let start = grammar.rule_id("start").expect("start");
        let err = ParseContext::new(&grammar, &subject, &mut chart, &ParsingConfig::default())
            .call(start, 0)
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::LeftRecursion {
                rule: "start".into(),
                position: 0
            }
        );
        assert!(chart.get(0, start).is_none());
    }

    #[test]
    fn test_memoized_calls_hit_the_chart() {
        let grammar = grammar(Expr::choice(vec![
            Expr::seq(vec![Expr::rule("digit"), Expr::lit("x")]),
            Expr::seq(vec![Expr::rule("digit"), Expr::lit("y")]),
        ]));
        let subject: Vec<char> = "1y".chars().collect();
        let mut chart = Chart::new(subject.len());
        let start = grammar.rule_id("start").expect("start");
        let result = ParseContext::new(&grammar, &subject, &mut chart, &ParsingConfig::default())
            .call(start, 0)
            .unwrap();
        assert_eq!(result.advance, Some(2));
        assert_eq!(chart.stats().hits, 1);
        assert_eq!(chart.stats().evaluations, 2);
    }

    #[test]
    fn test_nesting_past_max_depth_is_an_error() {
        let grammar = GrammarBuilder::new()
            .rule(
                "start",
                Expr::choice(vec![
                    Expr::seq(vec![Expr::lit("("), Expr::rule("start"), Expr::lit(")")]),
                    Expr::lit("x"),
                ]),
            )
            .build()
            .expect("valid grammar");
        let start = grammar.rule_id("start").expect("start");
        let config = ParsingConfig::default().with_max_depth(3);

        let subject: Vec<char> = "((x))".chars().collect();
        let mut chart = Chart::new(subject.len());
        let result = ParseContext::new(&grammar, &subject, &mut chart, &config)
            .call(start, 0)
            .unwrap();
        assert_eq!(result.advance, Some(5));

        let subject: Vec<char> = "(((x)))".chars().collect();
        let mut chart = Chart::new(subject.len());
        let err = ParseContext::new(&grammar, &subject, &mut chart, &config)
            .call(start, 0)
            .unwrap_err();
        assert_eq!(err, ParseError::DepthExceeded { position: 3, limit: 3 });
        assert_eq!(chart.entry_count(), 0);
    }
}
