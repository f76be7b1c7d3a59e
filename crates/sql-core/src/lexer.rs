//! Byte-stream lexer: turns source text into an ordered [`Token`] sequence.
//!
//! See spec.md §4.3. The lexer is a single forward scan over UTF-8 source;
//! it never backtracks except for the bounded multi-word keyword lookahead.

use crate::token::{
    Position, Token, TokenKind, TokenValue, DATA_TYPE_WORDS, KEYWORDS, MULTI_WORD_KEYWORDS,
};

/// A lexical failure: unterminated string/comment or an unrecognized byte.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.offset)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Attempts to match a multi-word keyword starting at `start`. Returns
    /// the canonical (space-joined, upper-cased) text and the byte length
    /// consumed, on success.
    fn try_match_multiword(&self, start: usize) -> Option<(String, usize)> {
        'outer: for kw in MULTI_WORD_KEYWORDS {
            let words: Vec<&str> = kw.split(' ').collect();
            let mut pos = start;
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    let ws_start = pos;
                    while matches!(self.byte_at(pos), Some(b) if (b as char).is_whitespace()) {
                        pos += 1;
                    }
                    if pos == ws_start {
                        continue 'outer;
                    }
                }
                let word_len = word.len();
                let Some(candidate) = self.bytes.get(pos..pos + word_len) else {
                    continue 'outer;
                };
                if !candidate.eq_ignore_ascii_case(word.as_bytes()) {
                    continue 'outer;
                }
                pos += word_len;
                if matches!(self.byte_at(pos), Some(b) if b.is_ascii_alphanumeric() || b == b'_')
                {
                    continue 'outer;
                }
            }
            return Some((kw.to_string(), pos - start));
        }
        None
    }

    fn lex_comment(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        if self.current() == Some('-') {
            // line comment: "--" to end of line (exclusive)
            self.advance();
            self.advance();
            while let Some(c) = self.current() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
        } else {
            // block comment: "/*" ... "*/", nests to one level
            self.advance();
            self.advance();
            let mut depth = 1u32;
            loop {
                match self.current() {
                    None => {
                        return Err(LexError {
                            message: "unclosed block comment".to_string(),
                            offset: start,
                        });
                    }
                    Some('/') if self.peek_next() == Some('*') => {
                        self.advance();
                        self.advance();
                        depth += 1;
                    }
                    Some('*') if self.peek_next() == Some('/') => {
                        self.advance();
                        self.advance();
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    Some(_) => {
                        self.advance();
                    }
                }
            }
        }
        let length = self.pos - start;
        Ok(Token::new(
            TokenKind::Comment,
            TokenValue::Text(self.source[start..self.pos].to_string()),
            Position::new(start, length),
        ))
    }

    fn peek_next(&self) -> Option<char> {
        let c = self.current()?;
        self.source[self.pos + c.len_utf8()..].chars().next()
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let quote = self.advance().expect("caller checked quote present");
        loop {
            match self.current() {
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        offset: start,
                    });
                }
                Some(c) if c == '\\' && self.peek_next() == Some(quote) => {
                    self.advance();
                    self.advance();
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let length = self.pos - start;
        Ok(Token::new(
            TokenKind::Literal,
            TokenValue::Str(self.source[start..self.pos].to_string()),
            Position::new(start, length),
        ))
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.current() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        let length = self.pos - start;
        let value = if is_float {
            TokenValue::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenValue::UInt(text.parse().unwrap_or(0))
        };
        Token::new(TokenKind::Literal, value, Position::new(start, length))
    }

    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        if let Some((canonical, len)) = self.try_match_multiword(start) {
            self.pos = start + len;
            return Token::new(
                TokenKind::Keyword,
                TokenValue::Text(canonical),
                Position::new(start, len),
            );
        }

        while matches!(self.current(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let word = &self.source[start..self.pos];
        let length = self.pos - start;
        let position = Position::new(start, length);
        let upper = word.to_ascii_uppercase();
        let lower = word.to_ascii_lowercase();

        if upper == "TRUE" {
            return Token::new(TokenKind::Literal, TokenValue::Bool(true), position);
        }
        if upper == "FALSE" {
            return Token::new(TokenKind::Literal, TokenValue::Bool(false), position);
        }
        if DATA_TYPE_WORDS.contains(&lower.as_str()) {
            return Token::new(TokenKind::DataType, TokenValue::Text(lower), position);
        }
        if KEYWORDS.contains(&upper.as_str()) {
            return Token::new(TokenKind::Keyword, TokenValue::Text(upper), position);
        }
        if let Ok(n) = word.parse::<u64>() {
            return Token::new(TokenKind::Literal, TokenValue::UInt(n), position);
        }
        Token::new(TokenKind::Ident, TokenValue::Text(word.to_string()), position)
    }

    fn lex_operator(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let c = self.advance().expect("caller checked a char is present");
        let (kind, text): (TokenKind, String) = match c {
            '=' => (TokenKind::Comparison, "=".to_string()),
            '<' => match self.current() {
                Some('=') => {
                    self.advance();
                    (TokenKind::Comparison, "<=".to_string())
                }
                Some('>') => {
                    self.advance();
                    (TokenKind::Comparison, "<>".to_string())
                }
                _ => (TokenKind::Comparison, "<".to_string()),
            },
            '>' => match self.current() {
                Some('=') => {
                    self.advance();
                    (TokenKind::Comparison, ">=".to_string())
                }
                _ => (TokenKind::Comparison, ">".to_string()),
            },
            '+' => (TokenKind::Plus, "+".to_string()),
            '-' => (TokenKind::Minus, "-".to_string()),
            '*' => (TokenKind::Asterisk, "*".to_string()),
            '/' => (TokenKind::Divide, "/".to_string()),
            '%' => (TokenKind::Modulus, "%".to_string()),
            '(' => (TokenKind::LParen, "(".to_string()),
            ')' => (TokenKind::RParen, ")".to_string()),
            ',' => (TokenKind::Comma, ",".to_string()),
            ';' => (TokenKind::Semicolon, ";".to_string()),
            '@' => (TokenKind::At, "@".to_string()),
            '.' => (TokenKind::Dot, ".".to_string()),
            ':' => (TokenKind::Colon, ":".to_string()),
            other => {
                return Err(LexError {
                    message: format!("unrecognized character `{other}`"),
                    offset: start,
                });
            }
        };
        let length = self.pos - start;
        Ok(Token::new(kind, TokenValue::Text(text), Position::new(start, length)))
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();
        let Some(c) = self.current() else {
            return Ok(None);
        };
        if c == '-' && self.peek_next() == Some('-') {
            return Ok(Some(self.lex_comment()?));
        }
        if c == '/' && self.peek_next() == Some('*') {
            return Ok(Some(self.lex_comment()?));
        }
        if c == '\'' || c == '"' {
            return Ok(Some(self.lex_string()?));
        }
        if c.is_ascii_digit() {
            return Ok(Some(self.lex_number()));
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(Some(self.lex_word()));
        }
        Ok(Some(self.lex_operator()?))
    }
}

/// Tokenizes the full source, including `Comment` tokens, terminated by one
/// `Eof` token. This is the "raw" stream; see [`tokenize_for_parse`] for the
/// comment-stripped stream the parser consumes.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token()? {
        tokens.push(tok);
    }
    tokens.push(Token::eof(lexer.pos));
    Ok(tokens)
}

/// Tokenizes and strips `Comment` tokens, the stream the parser consumes.
pub fn tokenize_for_parse(source: &str) -> Result<Vec<Token>, LexError> {
    Ok(tokenize(source)?
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize_for_parse(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexeme_roundtrips_from_offsets() {
        let src = "SELECT id, name FROM orders;";
        let tokens = tokenize_for_parse(src).unwrap();
        for t in &tokens {
            if t.is_eof() {
                continue;
            }
            let slice = &src[t.position.offset..t.position.end()];
            match &t.value {
                TokenValue::Text(s) if t.kind == TokenKind::Keyword || t.kind == TokenKind::DataType => {
                    assert!(slice.eq_ignore_ascii_case(s) || slice.split_whitespace().collect::<Vec<_>>().join(" ").eq_ignore_ascii_case(s));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn multiword_keyword_if_not_exists() {
        let toks = tokenize_for_parse("CREATE TABLE IF NOT EXISTS t").unwrap();
        let texts: Vec<String> = toks
            .iter()
            .filter_map(|t| t.keyword_text().map(|s| s.to_string()))
            .collect();
        assert!(texts.contains(&"IF NOT EXISTS".to_string()));
    }

    #[test]
    fn string_literal_retains_quotes_and_escapes() {
        let toks = tokenize_for_parse(r#"'it''s'"#).unwrap();
        // single-quote doubling isn't our escape form; use backslash form instead
        let toks2 = tokenize_for_parse(r#"'it\'s'"#).unwrap();
        assert_eq!(toks2[0].kind, TokenKind::Literal);
        if let TokenValue::Str(s) = &toks2[0].value {
            assert_eq!(s, r#"'it\'s'"#);
        } else {
            panic!("expected string literal");
        }
        assert!(!toks.is_empty());
    }

    #[test]
    fn numeric_literal_classification() {
        let toks = tokenize_for_parse("42 3.14").unwrap();
        assert_eq!(toks[0].value, TokenValue::UInt(42));
        assert_eq!(toks[1].value, TokenValue::Float(3.14));
    }

    #[test]
    fn boolean_literals_case_insensitive() {
        let toks = tokenize_for_parse("true FALSE").unwrap();
        assert_eq!(toks[0].value, TokenValue::Bool(true));
        assert_eq!(toks[1].value, TokenValue::Bool(false));
    }

    #[test]
    fn line_and_block_comments_emitted_then_filterable() {
        let raw = tokenize("-- a comment\nSELECT 1;").unwrap();
        assert_eq!(raw[0].kind, TokenKind::Comment);
        let filtered = tokenize_for_parse("-- a comment\nSELECT 1;").unwrap();
        assert!(filtered.iter().all(|t| t.kind != TokenKind::Comment));
    }

    #[test]
    fn nested_block_comment_one_level() {
        let toks = tokenize_for_parse("/* outer /* inner */ still */ SELECT 1;").unwrap();
        assert_eq!(toks[0].keyword_text(), Some("SELECT"));
    }

    #[test]
    fn unterminated_string_is_lexical_error() {
        assert!(tokenize_for_parse("'abc").is_err());
    }

    #[test]
    fn unterminated_block_comment_is_lexical_error() {
        assert!(tokenize_for_parse("/* abc").is_err());
    }

    #[test]
    fn unrecognized_byte_is_lexical_error() {
        assert!(tokenize_for_parse("SELECT # FROM t").is_err());
    }

    #[test]
    fn multibyte_char_after_a_multiword_keyword_prefix_does_not_panic() {
        // "GROUP" matches the first word of "GROUP BY"; the multi-byte
        // codepoint that follows must not land the second-word probe
        // mid-char. It's alphabetic, so this lexes as GROUP + an ident,
        // not an error - the point of the test is the absence of a panic.
        let toks = tokenize_for_parse("GROUP 中").unwrap();
        assert_eq!(toks[0].keyword_text(), Some("GROUP"));
    }

    #[test]
    fn unrecognized_non_ascii_byte_after_a_multiword_keyword_prefix_is_lexical_error() {
        // A byte that is neither whitespace nor alphabetic must surface as
        // a lexical error rather than a panic, even mid multi-word probe.
        assert!(tokenize_for_parse("GROUP \u{feff}").is_err());
    }

    #[test]
    fn operators_classify_correctly() {
        let k = kinds("= <> < <= > >= + - * / %");
        assert_eq!(
            k,
            vec![
                TokenKind::Comparison,
                TokenKind::Comparison,
                TokenKind::Comparison,
                TokenKind::Comparison,
                TokenKind::Comparison,
                TokenKind::Comparison,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Asterisk,
                TokenKind::Divide,
                TokenKind::Modulus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn legacy_type_word_lexes_as_keyword_not_datatype() {
        let toks = tokenize_for_parse("int").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].value, TokenValue::Text("INT".to_string()));
    }

    #[test]
    fn iceberg_type_word_lexes_as_datatype() {
        let toks = tokenize_for_parse("int32").unwrap();
        assert_eq!(toks[0].kind, TokenKind::DataType);
    }
}
