//! Tokenizer shared by both query dialects.
//!
//! Converts query text into a stream of tokens. Both dialects draw from one
//! token inventory; each parser simply rejects the tokens the other dialect
//! uses, which keeps every failure on the same uniform error.

use crate::{error::SyntaxError, op::CompareOp};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier: field names, index names, bare tags, keywords.
    Ident(String),

    /// Numeric literal, kept as its raw lexeme.
    ///
    /// Consumers parse it to the width they need: `f64` for comparison
    /// operands and range bounds, `usize` for limit operands.
    Num(String),

    /// Double-quoted string with escapes already resolved.
    Str(String),

    /// Comparison symbol, resolved through the operator table.
    Compare(CompareOp),

    /// Field sigil (`@`).
    At,

    /// Colon between a field and its bracket form.
    Colon,

    /// Comma separator.
    Comma,

    /// OR separator (`|`).
    Pipe,

    /// Negation prefix or numeric minus sign.
    Minus,

    /// Numeric plus sign.
    Plus,

    /// Wildcard or select-all (`*`).
    Star,

    /// Left parenthesis: grouping, or an exclusive-bound marker.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Left bracket opening a numeric range.
    LBracket,

    /// Right bracket.
    RBracket,

    /// Left brace opening a tag list.
    LBrace,

    /// Right brace.
    RBrace,
}

/// Tokenizes a query string.
struct Lexer {
    /// Input characters.
    input: Vec<char>,
    /// Current position in `input`.
    position: usize,
}

impl Lexer {
    /// Creates a new lexer for the given input.
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Returns the current character without consuming it.
    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Consumes the current character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Tokenizes the entire input, failing on the first violation.
    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.skip_whitespace();

        let Some(ch) = self.current() else {
            return Ok(None);
        };

        let token = match ch {
            '@' => self.punct(Token::At),
            ':' => self.punct(Token::Colon),
            ',' => self.punct(Token::Comma),
            '|' => self.punct(Token::Pipe),
            '-' => self.punct(Token::Minus),
            '+' => self.punct(Token::Plus),
            '*' => self.punct(Token::Star),
            '(' => self.punct(Token::LParen),
            ')' => self.punct(Token::RParen),
            '[' => self.punct(Token::LBracket),
            ']' => self.punct(Token::RBracket),
            '{' => self.punct(Token::LBrace),
            '}' => self.punct(Token::RBrace),
            '=' | '!' | '<' | '>' => self.read_compare(ch)?,
            '"' => self.read_string()?,
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_ident(),
            _ => return Err(SyntaxError),
        };

        Ok(Some(token))
    }

    /// Consumes one character and returns its token.
    fn punct(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Reads a comparison symbol and resolves it through the operator table.
    fn read_compare(&mut self, first: char) -> Result<Token, SyntaxError> {
        self.advance();

        let mut symbol = String::from(first);
        if self.current() == Some('=') {
            symbol.push('=');
            self.advance();
        }

        CompareOp::from_symbol(&symbol)
            .map(Token::Compare)
            .ok_or(SyntaxError)
    }

    /// Reads a double-quoted string, resolving escape sequences.
    fn read_string(&mut self) -> Result<Token, SyntaxError> {
        self.advance(); // consume opening quote

        let mut content = String::new();
        loop {
            let Some(ch) = self.current() else {
                // unterminated string
                return Err(SyntaxError);
            };
            self.advance();

            match ch {
                '"' => return Ok(Token::Str(content)),
                '\\' => {
                    let escaped = match self.current() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        _ => return Err(SyntaxError),
                    };
                    content.push(escaped);
                    self.advance();
                }
                _ => content.push(ch),
            }
        }
    }

    /// Reads a numeric lexeme: digits with optional fraction and exponent.
    ///
    /// The raw text is preserved; a lexeme that fails to parse downstream
    /// (for example a lone `.`) surfaces as the same syntax error there.
    fn read_number(&mut self) -> Token {
        let mut lexeme = String::new();

        self.read_digits(&mut lexeme);

        if self.current() == Some('.') {
            lexeme.push('.');
            self.advance();
            self.read_digits(&mut lexeme);
        }

        if matches!(self.current(), Some('e' | 'E')) {
            lexeme.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current() {
                lexeme.push(sign);
                self.advance();
            }
            self.read_digits(&mut lexeme);
        }

        Token::Num(lexeme)
    }

    /// Appends consecutive digits to `lexeme`.
    fn read_digits(&mut self, lexeme: &mut String) {
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads an identifier: a letter or underscore, then letters, digits,
    /// or underscores.
    fn read_ident(&mut self) -> Token {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::Ident(word)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

/// Tokenizes a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(input).tokenize()
}

/// Token cursor shared by the recursive-descent parsers.
pub(crate) struct Cursor {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in the stream.
    position: usize,
}

impl Cursor {
    /// Creates a cursor at the start of a token stream.
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Returns the current token without consuming it.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes the current token.
    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consumes and returns the current token.
    pub(crate) fn next_cloned(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// True when every token has been consumed.
    pub(crate) fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Consumes the current token if it equals `token`.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the current token, requiring it to equal `token`.
    pub(crate) fn expect(&mut self, token: &Token) -> Result<(), SyntaxError> {
        if self.eat(token) { Ok(()) } else { Err(SyntaxError) }
    }

    /// Consumes an identifier token, returning its text.
    pub(crate) fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        match self.next_cloned() {
            Some(Token::Ident(word)) => Ok(word),
            _ => Err(SyntaxError),
        }
    }

    /// Consumes `word` (case-insensitive) if it is the current token.
    pub(crate) fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(current)) if current.eq_ignore_ascii_case(word))
        {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `word` (case-insensitive), requiring it to be present.
    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<(), SyntaxError> {
        if self.eat_keyword(word) {
            Ok(())
        } else {
            Err(SyntaxError)
        }
    }

    /// Consumes an optional sign, returning `-1`, `1`, or `0` when absent.
    pub(crate) fn eat_sign(&mut self) -> i32 {
        if self.eat(&Token::Minus) {
            -1
        } else if self.eat(&Token::Plus) {
            1
        } else {
            0
        }
    }

    /// Consumes a numeric token, negated when `sign` is negative.
    pub(crate) fn number(&mut self, sign: i32) -> Result<f64, SyntaxError> {
        match self.peek() {
            Some(Token::Num(lexeme)) => {
                let val: f64 = lexeme.parse().map_err(|_| SyntaxError)?;
                self.advance();
                Ok(if sign < 0 { -val } else { val })
            }
            _ => Err(SyntaxError),
        }
    }

    /// Consumes an optionally signed numeric token.
    pub(crate) fn signed_number(&mut self) -> Result<f64, SyntaxError> {
        let sign = self.eat_sign();
        self.number(sign)
    }

    /// Consumes an unsigned integer token.
    pub(crate) fn unsigned_number(&mut self) -> Result<usize, SyntaxError> {
        match self.peek() {
            Some(Token::Num(lexeme)) => {
                let val: usize = lexeme.parse().map_err(|_| SyntaxError)?;
                self.advance();
                Ok(val)
            }
            _ => Err(SyntaxError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(word: &str) -> Token {
        Token::Ident(word.into())
    }

    fn num(lexeme: &str) -> Token {
        Token::Num(lexeme.into())
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn field_query_tokens() {
        assert_eq!(
            tokenize("@a:[1 2]").unwrap(),
            vec![
                Token::At,
                ident("a"),
                Token::Colon,
                Token::LBracket,
                num("1"),
                num("2"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn whitespace_around_colon() {
        assert_eq!(
            tokenize("@a : [1 2]").unwrap(),
            tokenize("@a:[1 2]").unwrap()
        );
    }

    #[test]
    fn tag_list_tokens() {
        assert_eq!(
            tokenize("@a:{x|\"y z\"}").unwrap(),
            vec![
                Token::At,
                ident("a"),
                Token::Colon,
                Token::LBrace,
                ident("x"),
                Token::Pipe,
                Token::Str("y z".into()),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn signed_range_tokens() {
        assert_eq!(
            tokenize("[-inf +inf]").unwrap(),
            vec![
                Token::LBracket,
                Token::Minus,
                ident("inf"),
                Token::Plus,
                ident("inf"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn number_lexemes() {
        assert_eq!(tokenize("2.5").unwrap(), vec![num("2.5")]);
        assert_eq!(tokenize("1e3").unwrap(), vec![num("1e3")]);
        assert_eq!(tokenize("1E-3").unwrap(), vec![num("1e-3")]);
    }

    #[test]
    fn comparison_symbols() {
        assert_eq!(
            tokenize("= != < <= > >=").unwrap(),
            vec![
                Token::Compare(CompareOp::Eq),
                Token::Compare(CompareOp::Ne),
                Token::Compare(CompareOp::Lt),
                Token::Compare(CompareOp::Le),
                Token::Compare(CompareOp::Gt),
                Token::Compare(CompareOp::Ge),
            ]
        );
    }

    #[test]
    fn bare_bang_is_an_error() {
        assert_eq!(tokenize("a ! b").unwrap_err(), SyntaxError);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            tokenize(r#""a\"b\\c\n""#).unwrap(),
            vec![Token::Str("a\"b\\c\n".into())]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(tokenize("\"abc").unwrap_err(), SyntaxError);
        assert_eq!(tokenize("\"abc\\").unwrap_err(), SyntaxError);
    }

    #[test]
    fn unknown_escape_is_an_error() {
        assert_eq!(tokenize(r#""a\qb""#).unwrap_err(), SyntaxError);
    }

    #[test]
    fn unknown_character_is_an_error() {
        assert_eq!(tokenize("@a:{x}#").unwrap_err(), SyntaxError);
    }

    #[test]
    fn statement_tokens() {
        assert_eq!(
            tokenize("select a, b from idx").unwrap(),
            vec![
                ident("select"),
                ident("a"),
                Token::Comma,
                ident("b"),
                ident("from"),
                ident("idx"),
            ]
        );
    }
}
