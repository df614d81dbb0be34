//! Java tokenizer
//!
//! Produces the token stream the structural parser works on. Line and block
//! comments are dropped; `/** ... */` doc comments are kept because they may
//! carry an `@deprecated` tag. Positions are zero-based with columns in
//! UTF-16 code units.

use deprecheck_core::{Position, Span};

/// Kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident,

    /// Numeric, string, char or text-block literal
    Literal,

    /// `/** ... */` comment, text includes the delimiters
    Doc,

    /// Operator or separator; `::`, `->` and `...` are single tokens
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// Identifier with exactly this text
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }
}

/// Tokenization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated block comment starting at {0}")]
    UnterminatedComment(Position),

    #[error("unterminated text block starting at {0}")]
    UnterminatedTextBlock(Position),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedComment(position) | Self::UnterminatedTextBlock(position) => *position,
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    position: Position,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
            position: Position::default(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.index += 1;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += c.len_utf16() as u32;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn text_since(&self, start: usize) -> String {
        self.chars[start..self.index].iter().collect()
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek(0) {
            let start = self.position;
            let start_index = self.index;

            let kind = if c.is_whitespace() {
                self.bump();
                continue;
            } else if self.starts_with("//") {
                while self.peek(0).is_some_and(|c| c != '\n') {
                    self.bump();
                }
                continue;
            } else if self.starts_with("/*") {
                let doc = self.starts_with("/**") && !self.starts_with("/**/");
                self.bump_n(2);
                loop {
                    if self.starts_with("*/") {
                        self.bump_n(2);
                        break;
                    }
                    if self.bump().is_none() {
                        return Err(LexError::UnterminatedComment(start));
                    }
                }
                if !doc {
                    continue;
                }
                TokenKind::Doc
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                while self.peek(0).is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$') {
                    self.bump();
                }
                TokenKind::Ident
            } else if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
                self.number();
                TokenKind::Literal
            } else if self.starts_with("\"\"\"") {
                self.bump_n(3);
                loop {
                    if self.starts_with("\\") {
                        self.bump_n(2);
                    } else if self.starts_with("\"\"\"") {
                        self.bump_n(3);
                        break;
                    } else if self.bump().is_none() {
                        return Err(LexError::UnterminatedTextBlock(start));
                    }
                }
                TokenKind::Literal
            } else if c == '"' || c == '\'' {
                self.quoted(c);
                TokenKind::Literal
            } else if self.starts_with("...") {
                self.bump_n(3);
                TokenKind::Punct
            } else if self.starts_with("::") || self.starts_with("->") {
                self.bump_n(2);
                TokenKind::Punct
            } else {
                self.bump();
                TokenKind::Punct
            };

            tokens.push(Token {
                kind,
                text: self.text_since(start_index),
                span: Span::new(start, self.position),
            });
        }

        Ok(tokens)
    }

    fn number(&mut self) {
        while let Some(c) = self.peek(0) {
            let exponent_sign = (c == '+' || c == '-')
                && matches!(self.chars.get(self.index.wrapping_sub(1)), Some('e' | 'E' | 'p' | 'P'));
            let fraction = c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
    }

    // Unterminated literals end at the line break; the parser copes with
    // the resulting token stream.
    fn quoted(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.peek(0) {
            match c {
                '\\' => self.bump_n(2),
                '\n' => break,
                c if c == quote => {
                    self.bump();
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
}

/// Split Java source text into tokens
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn member_call_tokens() {
        assert_eq!(texts("tab.navigateToDino();"), vec!["tab", ".", "navigateToDino", "(", ")", ";"]);
    }

    #[test]
    fn comments_are_dropped_but_doc_comments_kept() {
        let tokens = tokenize("// line\n/* block */ /** doc */ int x; /**/").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Doc);
        assert_eq!(tokens[0].text, "/** doc */");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn multi_char_punctuation() {
        assert_eq!(texts("Tab::close"), vec!["Tab", "::", "close"]);
        assert_eq!(texts("x -> x"), vec!["x", "->", "x"]);
        assert_eq!(texts("String... args"), vec!["String", "...", "args"]);
    }

    #[test]
    fn literals_do_not_leak_tokens() {
        assert_eq!(texts(r#"s = "a.b(c)";"#), vec!["s", "=", r#""a.b(c)""#, ";"]);
        assert_eq!(texts(r"c = '\'';"), vec!["c", "=", r"'\''", ";"]);
        assert_eq!(texts("d = 1.5e-3f + .5;"), vec!["d", "=", "1.5e-3f", "+", ".5", ";"]);
        assert_eq!(texts("t = \"\"\"\n  x.y()\n  \"\"\";"), vec!["t", "=", "\"\"\"\n  x.y()\n  \"\"\"", ";"]);
    }

    #[test]
    fn positions_track_lines_and_utf16_columns() {
        let tokens = tokenize("a\n  \"é😀\" b").unwrap();
        assert_eq!(tokens[1].span.start, Position::new(1, 2));
        // é is one UTF-16 unit, the emoji two, plus both quotes
        assert_eq!(tokens[1].span.end, Position::new(1, 7));
        assert_eq!(tokens[2].span.start, Position::new(1, 8));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert_eq!(
            tokenize("class A {}\n/* never closed"),
            Err(LexError::UnterminatedComment(Position::new(1, 0)))
        );
    }

    #[test]
    fn unterminated_string_stops_at_line_end() {
        assert_eq!(texts("s = \"open\nnext"), vec!["s", "=", "\"open", "next"]);
    }
}
