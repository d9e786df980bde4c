use thiserror::Error;

use super::expr::Formula;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty formula")]
    Empty,
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("expected {expected} at offset {pos}")]
    Expected { expected: &'static str, pos: usize },
    #[error("negation applies to variables only (offset {pos})")]
    NegatedGroup { pos: usize },
    #[error("trailing input at offset {pos}")]
    Trailing { pos: usize },
    #[error("parentheses nested deeper than {limit} at offset {pos}", limit = MAX_NESTING)]
    TooDeep { pos: usize },
}

/// Deepest parenthesis nesting the parser accepts.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

/// Parses the rendered syntax, e.g. `(a && (!b || c))`.
///
/// `&&` binds tighter than `||` and both associate to the left, so
/// `a || b && c` reads as `(a || (b && c))`.
pub fn parse_formula(s: &str) -> Result<Formula<String>, ParseError> {
    let tokens = tokenize(s)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut p = Parser {
        tokens,
        idx: 0,
        end: s.len(),
        nesting: 0,
    };
    let f = p.parse_or()?;
    if let Some(&(_, pos)) = p.tokens.get(p.idx) {
        return Err(ParseError::Trailing { pos });
    }
    Ok(f)
}

fn tokenize(s: &str) -> Result<Vec<(Tok, usize)>, ParseError> {
    let mut out = Vec::<(Tok, usize)>::new();
    let mut chars = s.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '(' => out.push((Tok::Open, pos)),
            ')' => out.push((Tok::Close, pos)),
            '!' => out.push((Tok::Not, pos)),
            '&' | '|' => {
                match chars.peek() {
                    Some(&(_, next)) if next == ch => {
                        chars.next();
                    }
                    _ => return Err(ParseError::UnexpectedChar { ch, pos }),
                }
                let tok = if ch == '&' { Tok::And } else { Tok::Or };
                out.push((tok, pos));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                name.push(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push((Tok::Ident(name), pos));
            }
            _ => return Err(ParseError::UnexpectedChar { ch, pos }),
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<(Tok, usize)>,
    idx: usize,
    end: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.idx).map(|(t, _)| t)
    }

    fn pos(&self) -> usize {
        self.tokens.get(self.idx).map(|&(_, p)| p).unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.idx).map(|(t, _)| t.clone());
        if tok.is_some() {
            self.idx += 1;
        }
        tok
    }

    fn parse_or(&mut self) -> Result<Formula<String>, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Tok::Or) {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Formula::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Formula<String>, ParseError> {
        let mut lhs = self.parse_atom()?;
        while self.peek() == Some(&Tok::And) {
            self.bump();
            let rhs = self.parse_atom()?;
            lhs = Formula::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Formula<String>, ParseError> {
        let pos = self.pos();
        match self.bump() {
            Some(Tok::Ident(name)) => Ok(Formula::pos(name)),
            Some(Tok::Not) => {
                let inner = self.pos();
                match self.bump() {
                    Some(Tok::Ident(name)) => Ok(Formula::neg(name)),
                    Some(Tok::Open) | Some(Tok::Not) => Err(ParseError::NegatedGroup { pos }),
                    _ => Err(ParseError::Expected {
                        expected: "variable after '!'",
                        pos: inner,
                    }),
                }
            }
            Some(Tok::Open) => {
                if self.nesting >= MAX_NESTING {
                    return Err(ParseError::TooDeep { pos });
                }
                self.nesting += 1;
                let f = self.parse_or()?;
                self.nesting -= 1;
                let close = self.pos();
                match self.bump() {
                    Some(Tok::Close) => Ok(f),
                    _ => Err(ParseError::Expected {
                        expected: "')'",
                        pos: close,
                    }),
                }
            }
            _ => Err(ParseError::Expected {
                expected: "variable, '!' or '('",
                pos,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_NESTING, ParseError, parse_formula};
    use crate::formula::Formula;

    #[test]
    fn parse_rendered_form() {
        let f = match parse_formula("(a && (!b || c))") {
            Ok(v) => v,
            Err(e) => panic!("parse failed: {e}"),
        };
        let expected = Formula::and(
            Formula::pos("a".to_string()),
            Formula::or(Formula::neg("b".to_string()), Formula::pos("c".to_string())),
        );
        assert_eq!(f, expected);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let f = match parse_formula("a || b && c || d") {
            Ok(v) => v,
            Err(e) => panic!("parse failed: {e}"),
        };
        assert_eq!(f.to_string(), "((a || (b && c)) || d)");
    }

    #[test]
    fn negated_group_is_rejected() {
        assert_eq!(
            parse_formula("!(a && b)"),
            Err(ParseError::NegatedGroup { pos: 0 })
        );
        assert_eq!(parse_formula("!!a"), Err(ParseError::NegatedGroup { pos: 0 }));
    }

    #[test]
    fn malformed_inputs_report_offsets() {
        assert_eq!(parse_formula("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_formula("a & b"),
            Err(ParseError::UnexpectedChar { ch: '&', pos: 2 })
        );
        assert_eq!(
            parse_formula("(a || b"),
            Err(ParseError::Expected {
                expected: "')'",
                pos: 7
            })
        );
        assert_eq!(parse_formula("a b"), Err(ParseError::Trailing { pos: 2 }));
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let deep = format!("{}a{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(
            parse_formula(&deep),
            Err(ParseError::TooDeep { pos: MAX_NESTING })
        );

        let ok = format!("{}a{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        match parse_formula(&ok) {
            Ok(f) => assert_eq!(f.to_string(), "a"),
            Err(e) => panic!("parse failed: {e}"),
        }
    }
}
