//! Tokenizer shared by the Turtle and SPARQL Update parsers.

use crate::error::{RdfError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// `<...>`, unresolved.
    Iri(String),
    /// `prefix:local`.
    Prefixed(String, String),
    /// `_:label`.
    Blank(String),
    /// `?name` or `$name`.
    Var(String),
    /// Quoted string, escapes already processed.
    Str(String),
    /// `@word`: a directive or a language tag.
    At(String),
    /// `^^`.
    Carets,
    Number(String),
    /// Bare word: keywords, `a`, `true`/`false`.
    Word(String),
    Punct(char),
}

#[derive(Clone, Debug)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    Lexer {
        chars: input.chars().collect(),
        pos: 0,
        line: 1,
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn run(mut self) -> Result<Vec<Spanned>> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
                continue;
            }
            if ch == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            let line = self.line;
            let token = self.next_token(ch)?;
            tokens.push(Spanned { token, line });
        }
        Ok(tokens)
    }

    fn next_token(&mut self, ch: char) -> Result<Token> {
        match ch {
            '<' => self.iri(),
            '"' | '\'' => self.string(ch),
            '@' => {
                self.bump();
                let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
                if word.is_empty() {
                    return Err(RdfError::syntax(self.line, "expected a word after '@'"));
                }
                Ok(Token::At(word))
            }
            '^' => {
                self.bump();
                if self.bump() != Some('^') {
                    return Err(RdfError::syntax(self.line, "expected '^^'"));
                }
                Ok(Token::Carets)
            }
            '?' | '$' => {
                self.bump();
                let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
                if name.is_empty() {
                    return Err(RdfError::syntax(self.line, "empty variable name"));
                }
                Ok(Token::Var(name))
            }
            '_' if self.peek_at(1) == Some(':') => {
                self.bump();
                self.bump();
                let label = self.name_chars();
                if label.is_empty() {
                    return Err(RdfError::syntax(self.line, "empty blank node label"));
                }
                Ok(Token::Blank(label))
            }
            '.' | ';' | ',' | '{' | '}' | '[' | ']' | '(' | ')' => {
                if ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    return Ok(self.number());
                }
                self.bump();
                Ok(Token::Punct(ch))
            }
            c if c.is_ascii_digit()
                || ((c == '+' || c == '-') && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                Ok(self.number())
            }
            c if c.is_alphabetic() || c == ':' || c == '_' => {
                let word = self.name_chars();
                match word.split_once(':') {
                    Some((prefix, local)) => Ok(Token::Prefixed(prefix.into(), local.into())),
                    None => Ok(Token::Word(word)),
                }
            }
            other => Err(RdfError::syntax(
                self.line,
                format!("unexpected character {other:?}"),
            )),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Prefixed names and bare words. A trailing `.` ends the statement, it
    /// is not part of the name.
    fn name_chars(&mut self) -> String {
        let start = self.pos;
        let mut out =
            self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '%'));
        while out.ends_with('.') {
            out.pop();
        }
        self.pos = start + out.chars().count();
        out
    }

    fn iri(&mut self) -> Result<Token> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(Token::Iri(out)),
                Some(c) if c.is_whitespace() => {
                    return Err(RdfError::syntax(self.line, "whitespace inside IRI"))
                }
                Some(c) => out.push(c),
                None => return Err(RdfError::syntax(self.line, "unterminated IRI")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Token> {
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let opening = if long { 3 } else { 1 };
        for _ in 0..opening {
            self.bump();
        }
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| RdfError::syntax(self.line, "unterminated string"))?;
            match c {
                '\\' => out.push(self.escape()?),
                c if c == quote && !long => return Ok(Token::Str(out)),
                c if c == quote && self.peek() == Some(quote) && self.peek_at(1) == Some(quote) => {
                    self.bump();
                    self.bump();
                    return Ok(Token::Str(out));
                }
                '\n' if !long => {
                    return Err(RdfError::syntax(self.line, "newline in short string"))
                }
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        let line = self.line;
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.unicode(4),
            Some('U') => self.unicode(8),
            _ => Err(RdfError::syntax(line, "invalid escape sequence")),
        }
    }

    fn unicode(&mut self, digits: usize) -> Result<char> {
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            hex.push(
                self.bump()
                    .ok_or_else(|| RdfError::syntax(self.line, "truncated unicode escape"))?,
            );
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| RdfError::syntax(self.line, format!("invalid unicode escape {hex}")))
    }

    fn number(&mut self) -> Token {
        let mut out = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            out.push(sign);
            self.bump();
        }
        out.push_str(&self.take_while(|c| c.is_ascii_digit()));
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            out.push('.');
            out.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            out.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                out.push(sign);
                self.bump();
            }
            out.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        Token::Number(out)
    }
}
