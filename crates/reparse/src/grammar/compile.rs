//! Grammar text compiler
//!
//! ```text
//! grammar  := rule+
//! rule     := name ('=' pe | ':' pe) '.'
//! pe       := term ('|' term)*
//! term     := factor*
//! factor   := '!' factor
//!           | primary ('**' primary | '++' primary | '*' | '+' | '?')?
//! primary  := '(' pe ')' | '[' pe ']' | '{' pe '}'
//!           | 'lit' ('..' 'lit')? | "keyword" | /regex/ | '%any'
//!           | ':' name | ':' 'lit' | name
//! ```
//!
//! A rule defined with `:` has its body secluded, so the actions inside it
//! only see the values the rule itself produced. `#` starts a comment.
//!
//! A `/regex/` matches a fixed number of characters: plain characters,
//! `.`, classes such as `[a-z_]` or `[^"\\]`, and the escapes `\d`, `\w`,
//! `\s` and `\b` (a boundary after a word). It compiles to ordinary
//! expressions; groups, alternation and quantifiers are written with the
//! grammar's own operators instead.

use super::Expr;
use crate::error::GrammarError;
use crate::line_col::LineIndex;
use crate::semantics::Value;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Name(String),
    Str(String),
    Keyword(String),
    Regex(Expr),
    Directive(String),
    Eq,
    Colon,
    Dot,
    DotDot,
    Bar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Bang,
    Star,
    Plus,
    StarStar,
    PlusPlus,
    Question,
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Self::Name(n) => format!("name `{n}`"),
            Self::Str(s) => format!("string '{s}'"),
            Self::Keyword(s) => format!("keyword \"{s}\""),
            Self::Regex(_) => "regex".to_owned(),
            Self::Directive(d) => format!("`%{d}`"),
            Self::Eof => "end of grammar".to_owned(),
            other => format!("`{}`", other.symbol()),
        }
    }

    const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::Bar => "|",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Bang => "!",
            Self::Star => "*",
            Self::Plus => "+",
            Self::StarStar => "**",
            Self::PlusPlus => "++",
            Self::Question => "?",
            _ => "",
        }
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    index: &'a LineIndex,
}

impl<'a> Lexer<'a> {
    fn new(text: &str, index: &'a LineIndex) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            index,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> GrammarError {
        syntax_error(self.index, offset, message)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '#' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn quoted(&mut self, quote: char) -> Result<String, GrammarError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated string")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    let escaped = self
                        .peek_at(1)
                        .ok_or_else(|| self.error(start, "unterminated string"))?;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                    self.pos += 2;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// `/.../`, starting at the opening slash.
    fn regex(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        let mut literal = String::new();
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.error(start, "unterminated regex"));
            };
            let item = match ch {
                '/' => {
                    self.pos += 1;
                    break;
                }
                '\\' => self.regex_escape(start)?,
                '[' => self.regex_class(start)?,
                '.' => {
                    self.pos += 1;
                    Expr::Any
                }
                '(' | ')' | '*' | '+' | '?' | '{' | '}' | '|' | ']' => {
                    return Err(self.error(
                        self.pos,
                        format!("`{ch}` is not supported in a regex, only fixed-width patterns are"),
                    ));
                }
                c => {
                    self.pos += 1;
                    Expr::Literal(c.to_string())
                }
            };
            if let Expr::Literal(s) = &item {
                literal.push_str(s);
                continue;
            }
            if !literal.is_empty() {
                items.push(Expr::Literal(std::mem::take(&mut literal)));
            }
            items.push(item);
        }
        if !literal.is_empty() {
            items.push(Expr::Literal(literal));
        }
        Ok(match items.len() {
            0 => Expr::Empty,
            1 => items.remove(0),
            _ => Expr::Seq(items),
        })
    }

    fn regex_escape(&mut self, start: usize) -> Result<Expr, GrammarError> {
        let escaped = self
            .peek_at(1)
            .ok_or_else(|| self.error(start, "unterminated regex"))?;
        self.pos += 2;
        Ok(match escaped {
            'd' => Expr::Range('0', '9'),
            'w' => word_char(),
            's' => Expr::Choice([" ", "\t", "\n", "\r"].map(Expr::lit).to_vec()),
            'b' => word_char().not(),
            'n' => Expr::lit("\n"),
            't' => Expr::lit("\t"),
            'r' => Expr::lit("\r"),
            other => Expr::Literal(other.to_string()),
        })
    }

    /// `[...]` or `[^...]` inside a regex, starting at the `[`.
    fn regex_class(&mut self, start: usize) -> Result<Expr, GrammarError> {
        let open = self.pos;
        self.pos += 1;
        let negated = self.peek() == Some('^');
        if negated {
            self.pos += 1;
        }
        let mut members = Vec::new();
        loop {
            let lo = match self.peek() {
                None | Some('/') => return Err(self.error(open, "unterminated character class")),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => self.regex_escape(start)?,
                Some(c) => {
                    self.pos += 1;
                    Expr::Literal(c.to_string())
                }
            };
            let ranged = self.peek() == Some('-') && !matches!(self.peek_at(1), Some(']') | None);
            match lo {
                Expr::Literal(lo) if ranged => {
                    self.pos += 1;
                    let hi_offset = self.pos;
                    let hi = match self.peek() {
                        Some('\\') => self.regex_escape(start)?,
                        Some(c) => {
                            self.pos += 1;
                            Expr::Literal(c.to_string())
                        }
                        None => return Err(self.error(open, "unterminated character class")),
                    };
                    let (Some(lo), Expr::Literal(hi)) = (lo.chars().next(), hi) else {
                        return Err(self.error(hi_offset, "class range bounds must be characters"));
                    };
                    let hi = hi.chars().next().unwrap_or(lo);
                    if lo > hi {
                        return Err(GrammarError::InvalidRange { lo, hi });
                    }
                    members.push(Expr::Range(lo, hi));
                }
                other => members.push(other),
            }
        }
        let class = match members.len() {
            0 => Expr::Fail,
            1 => members.remove(0),
            _ => Expr::Choice(members),
        };
        Ok(if negated {
            Expr::Seq(vec![class.not(), Expr::Any])
        } else {
            class
        })
    }

    /// Next token and the `char` offset it starts at.
    fn next_token(&mut self) -> Result<(Tok, usize), GrammarError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok((Tok::Eof, start));
        };
        let doubled = self.peek_at(1) == Some(ch);
        let tok = match ch {
            c if c.is_ascii_alphabetic() || c == '_' => Tok::Name(self.name()),
            '\'' => Tok::Str(self.quoted('\'')?),
            '"' => Tok::Keyword(self.quoted('"')?),
            '/' => Tok::Regex(self.regex()?),
            '%' => {
                self.pos += 1;
                let directive = self.name();
                if directive.is_empty() {
                    return Err(self.error(start, "expected a directive name after `%`"));
                }
                Tok::Directive(directive)
            }
            _ => {
                let (tok, width) = match ch {
                    '.' if doubled => (Tok::DotDot, 2),
                    '*' if doubled => (Tok::StarStar, 2),
                    '+' if doubled => (Tok::PlusPlus, 2),
                    '=' => (Tok::Eq, 1),
                    ':' => (Tok::Colon, 1),
                    '.' => (Tok::Dot, 1),
                    '|' => (Tok::Bar, 1),
                    '(' => (Tok::LParen, 1),
                    ')' => (Tok::RParen, 1),
                    '[' => (Tok::LBracket, 1),
                    ']' => (Tok::RBracket, 1),
                    '{' => (Tok::LBrace, 1),
                    '}' => (Tok::RBrace, 1),
                    '!' => (Tok::Bang, 1),
                    '*' => (Tok::Star, 1),
                    '+' => (Tok::Plus, 1),
                    '?' => (Tok::Question, 1),
                    other => {
                        return Err(self.error(start, format!("unexpected character {other:?}")))
                    }
                };
                self.pos += width;
                tok
            }
        };
        Ok((tok, start))
    }
}

fn word_char() -> Expr {
    Expr::Choice(vec![
        Expr::Range('a', 'z'),
        Expr::Range('A', 'Z'),
        Expr::Range('0', '9'),
        Expr::lit("_"),
    ])
}

fn syntax_error(index: &LineIndex, offset: usize, message: impl Into<String>) -> GrammarError {
    let pos = index.line_col(offset);
    GrammarError::Syntax {
        offset,
        line: pos.line + 1,
        column: pos.column + 1,
        message: message.into(),
    }
}

struct RuleParser<'a> {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    index: &'a LineIndex,
}

impl RuleParser<'_> {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].0
    }

    fn peek_at(&self, ahead: usize) -> &Tok {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + ahead).min(last)].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].1
    }

    fn bump(&mut self) -> Tok {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, context: &str) -> Result<(), GrammarError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}` {context}", tok.symbol())))
        }
    }

    fn unexpected(&self, expected: &str) -> GrammarError {
        syntax_error(
            self.index,
            self.offset(),
            format!("expected {expected}, found {}", self.peek().describe()),
        )
    }

    fn grammar(&mut self) -> Result<Vec<(String, Expr)>, GrammarError> {
        let mut rules = Vec::new();
        while *self.peek() != Tok::Eof {
            rules.push(self.rule()?);
        }
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        Ok(rules)
    }

    fn rule(&mut self) -> Result<(String, Expr), GrammarError> {
        let Tok::Name(name) = self.peek().clone() else {
            return Err(self.unexpected("a rule name"));
        };
        self.bump();
        let body = if self.eat(&Tok::Eq) {
            self.pe()?
        } else if self.eat(&Tok::Colon) {
            self.pe()?.seclude()
        } else {
            return Err(self.unexpected(&format!("`=` or `:` after rule name `{name}`")));
        };
        self.expect(&Tok::Dot, &format!("to end rule `{name}`"))?;
        Ok((name, body))
    }

    fn pe(&mut self) -> Result<Expr, GrammarError> {
        let mut alternatives = vec![self.term()?];
        while self.eat(&Tok::Bar) {
            alternatives.push(self.term()?);
        }
        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Expr::Choice(alternatives)
        })
    }

    fn starts_factor(&self) -> bool {
        match self.peek() {
            Tok::Name(_)
            | Tok::Str(_)
            | Tok::Keyword(_)
            | Tok::Regex(_)
            | Tok::Directive(_)
            | Tok::LParen
            | Tok::LBracket
            | Tok::LBrace
            | Tok::Bang => true,
            Tok::Colon => matches!(self.peek_at(1), Tok::Name(_) | Tok::Str(_)),
            _ => false,
        }
    }

    fn term(&mut self) -> Result<Expr, GrammarError> {
        let mut items = Vec::new();
        while self.starts_factor() {
            items.push(self.factor()?);
        }
        Ok(match items.len() {
            0 => Expr::Empty,
            1 => items.remove(0),
            _ => Expr::Seq(items),
        })
    }

    fn factor(&mut self) -> Result<Expr, GrammarError> {
        if self.eat(&Tok::Bang) {
            return Ok(self.factor()?.not());
        }
        let primary = self.primary()?;
        Ok(match self.peek() {
            Tok::StarStar => {
                self.bump();
                primary.star_sep(self.primary()?)
            }
            Tok::PlusPlus => {
                self.bump();
                primary.plus_sep(self.primary()?)
            }
            Tok::Star => {
                self.bump();
                primary.star()
            }
            Tok::Plus => {
                self.bump();
                primary.plus()
            }
            Tok::Question => {
                self.bump();
                primary.maybe()
            }
            _ => primary,
        })
    }

    fn single_char(&self, s: &str, offset: usize) -> Result<char, GrammarError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(syntax_error(
                self.index,
                offset,
                format!("range bounds must be single characters, found '{s}'"),
            )),
        }
    }

    fn primary(&mut self) -> Result<Expr, GrammarError> {
        if !self.starts_factor() || *self.peek() == Tok::Bang {
            return Err(self.unexpected("an expression"));
        }
        let offset = self.offset();
        match self.bump() {
            Tok::LParen => {
                let inner = self.pe()?;
                self.expect(&Tok::RParen, "to close `(`")?;
                Ok(inner)
            }
            Tok::LBracket => {
                let inner = self.pe()?;
                self.expect(&Tok::RBracket, "to close `[`")?;
                Ok(inner.seclude())
            }
            Tok::LBrace => {
                let inner = self.pe()?;
                self.expect(&Tok::RBrace, "to close `{`")?;
                Ok(inner.grab())
            }
            Tok::Str(s) => {
                if !self.eat(&Tok::DotDot) {
                    return Ok(Expr::Literal(s));
                }
                let hi_offset = self.offset();
                let Tok::Str(hi) = self.bump() else {
                    return Err(syntax_error(
                        self.index,
                        hi_offset,
                        "expected a quoted character after `..`",
                    ));
                };
                let lo = self.single_char(&s, offset)?;
                let hi = self.single_char(&hi, hi_offset)?;
                if lo > hi {
                    return Err(GrammarError::InvalidRange { lo, hi });
                }
                Ok(Expr::Range(lo, hi))
            }
            Tok::Keyword(s) => Ok(Expr::Keyword(s)),
            Tok::Regex(expr) => Ok(expr),
            Tok::Directive(d) if d == "any" => Ok(Expr::Any),
            Tok::Directive(d) => Err(syntax_error(
                self.index,
                offset,
                format!("unknown directive `%{d}`"),
            )),
            Tok::Colon => match self.bump() {
                Tok::Name(name) => Ok(Expr::Do(name)),
                Tok::Str(s) => Ok(Expr::Push(Value::Str(s))),
                _ => Err(syntax_error(
                    self.index,
                    offset,
                    "expected an action name or a quoted value after `:`",
                )),
            },
            Tok::Name(name) => Ok(Expr::Rule(name)),
            other => Err(syntax_error(
                self.index,
                offset,
                format!("expected an expression, found {}", other.describe()),
            )),
        }
    }
}

/// Parse grammar text into `(name, expression)` pairs, in definition order.
///
/// # Errors
///
/// Returns [`GrammarError::Syntax`] with the line and column of the first
/// problem, or [`GrammarError::Empty`] when the text defines no rules.
pub fn compile_rules(text: &str) -> Result<Vec<(String, Expr)>, GrammarError> {
    let index = LineIndex::new(text);
    let mut lexer = Lexer::new(text, &index);
    let mut tokens = Vec::new();
    loop {
        let (tok, offset) = lexer.next_token()?;
        let done = tok == Tok::Eof;
        tokens.push((tok, offset));
        if done {
            break;
        }
    }

    RuleParser {
        tokens,
        pos: 0,
        index: &index,
    }
    .grammar()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_rule(text: &str) -> Expr {
        let mut rules = compile_rules(text).expect("compiles");
        assert_eq!(rules.len(), 1);
        rules.remove(0).1
    }

    #[test]
    fn test_secluded_rule_with_actions() {
        let expr = one_rule("exp0 : exp1 ('+' exp1 :add | '-' exp1 :sub)*.");
        assert_eq!(
            expr,
            Expr::seq(vec![
                Expr::rule("exp1"),
                Expr::choice(vec![
                    Expr::seq(vec![Expr::lit("+"), Expr::rule("exp1"), Expr::action("add")]),
                    Expr::seq(vec![Expr::lit("-"), Expr::rule("exp1"), Expr::action("sub")]),
                ])
                .star(),
            ])
            .seclude()
        );
    }

    #[test]
    fn test_range_grab_and_plus() {
        assert_eq!(one_rule("digit = '0'..'9'."), Expr::range('0', '9'));
        assert_eq!(
            one_rule("num = {digit+} :int."),
            Expr::seq(vec![Expr::rule("digit").plus().grab(), Expr::action("int")])
        );
    }

    #[test]
    fn test_separators_lookahead_and_push() {
        assert_eq!(
            one_rule("args = arg ** ','."),
            Expr::rule("arg").star_sep(Expr::lit(","))
        );
        assert_eq!(
            one_rule("x = !'a' %any :'seen'."),
            Expr::seq(vec![
                Expr::lit("a").not(),
                Expr::Any,
                Expr::push("seen"),
            ])
        );
        assert_eq!(one_rule("kw = \"if\"."), Expr::keyword("if"));
    }

    #[test]
    fn test_empty_alternative_and_comments() {
        let rules = compile_rules(
            "# leading comment\n\
             opt = 'a' |   # trailing comment\n\
             .\n\
             nothing = .",
        )
        .expect("compiles");
        assert_eq!(rules[0].1, Expr::choice(vec![Expr::lit("a"), Expr::Empty]));
        assert_eq!(rules[1].1, Expr::Empty);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(one_rule(r"nl = '\n' '\'' '\\'."), Expr::seq(vec![
            Expr::lit("\n"),
            Expr::lit("'"),
            Expr::lit("\\"),
        ]));
    }

    #[test]
    fn test_syntax_errors_report_line_and_column() {
        let err = compile_rules("a = 'x'.\nb = 'y'").expect_err("missing dot");
        assert!(matches!(
            err,
            GrammarError::Syntax { line: 2, column: 8, .. }
        ), "{err:?}");

        let err = compile_rules("a = 'x\n").expect_err("unterminated");
        assert!(matches!(err, GrammarError::Syntax { line: 1, column: 5, .. }));

        let err = compile_rules("a = 'ab'..'z'.").expect_err("bad range");
        assert!(matches!(err, GrammarError::Syntax { .. }));

        assert_eq!(compile_rules("  # nothing\n"), Err(GrammarError::Empty));
    }

    #[test]
    fn test_regex_lowers_to_fixed_width_expressions() {
        assert_eq!(one_rule(r"ab = /ab\/c/."), Expr::lit("ab/c"));
        assert_eq!(one_rule("nothing = //."), Expr::Empty);
        assert_eq!(
            one_rule(r"id = /[a-z_]\d./."),
            Expr::seq(vec![
                Expr::choice(vec![Expr::range('a', 'z'), Expr::lit("_")]),
                Expr::range('0', '9'),
                Expr::Any,
            ])
        );
        assert_eq!(
            one_rule(r#"plain = /[^"\\]/."#),
            Expr::seq(vec![
                Expr::choice(vec![Expr::lit("\""), Expr::lit("\\")]).not(),
                Expr::Any,
            ])
        );
        assert_eq!(
            one_rule(r"kw = /Nil\b/."),
            Expr::seq(vec![Expr::lit("Nil"), word_char().not()])
        );
    }

    #[test]
    fn test_regex_matching() {
        let grammar = crate::Grammar::compile(r"start = {/[A-Za-z_]\w/} /\s/.").expect("valid grammar");
        assert!(grammar.accepts("a1 ", "start").unwrap());
        assert!(grammar.accepts("Z_\t", "start").unwrap());
        assert!(!grammar.accepts("1a ", "start").unwrap());
        assert!(!grammar.accepts("ab", "start").unwrap());

        let grammar = crate::Grammar::compile(r"start = /Nil\b/ %any*.").expect("valid grammar");
        assert!(grammar.accepts("Nil", "start").unwrap());
        assert!(grammar.accepts("Nil+1", "start").unwrap());
        assert!(!grammar.accepts("Nils", "start").unwrap());
    }

    #[test]
    fn test_regex_errors() {
        let err = compile_rules(r"name = /[a-z]\w*/.").expect_err("quantifier");
        assert!(
            matches!(err, GrammarError::Syntax { line: 1, column: 16, ref message, .. } if message.contains('*')),
            "{err:?}"
        );
        let err = compile_rules("r = /ab").expect_err("unterminated");
        assert!(matches!(err, GrammarError::Syntax { column: 5, .. }), "{err:?}");
        let err = compile_rules("r = /[ab/.").expect_err("unterminated class");
        assert!(matches!(err, GrammarError::Syntax { column: 6, .. }), "{err:?}");
        assert_eq!(
            compile_rules("r = /[z-a]/."),
            Err(GrammarError::InvalidRange { lo: 'z', hi: 'a' })
        );
    }
}

