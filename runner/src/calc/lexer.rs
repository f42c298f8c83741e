use super::CalcError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Str(String),
    True,
    False,
    Unit,

    Ident(String),
    Let,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Question,
    Colon,
    Comma,
    LParen,
    RParen,

    /// End of statement: a newline or `;`.
    Separator,
}

/// A token and the 1-based source line it starts on.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, CalcError> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < len {
        let c = chars[i];
        match c {
            '\n' => {
                push(&mut tokens, Token::Separator, line);
                line += 1;
                i += 1;
            }
            ';' => {
                push(&mut tokens, Token::Separator, line);
                i += 1;
            }
            ' ' | '\t' | '\r' => i += 1,

            // Comment to end of line
            '#' => {
                while i < len && chars[i] != '\n' {
                    i += 1;
                }
            }

            '"' => {
                let start_line = line;
                i += 1;
                let mut s = String::new();
                loop {
                    let Some(&ch) = chars.get(i) else {
                        return Err(CalcError::syntax(start_line, "unterminated string literal"));
                    };
                    i += 1;
                    match ch {
                        '"' => break,
                        '\\' => {
                            let escaped = chars.get(i).copied();
                            i += 1;
                            match escaped {
                                Some('n') => s.push('\n'),
                                Some('t') => s.push('\t'),
                                Some('"') => s.push('"'),
                                Some('\\') => s.push('\\'),
                                Some(other) => {
                                    return Err(CalcError::syntax(
                                        line,
                                        format!("unknown escape `\\{other}`"),
                                    ));
                                }
                                None => {
                                    return Err(CalcError::syntax(
                                        start_line,
                                        "unterminated string literal",
                                    ));
                                }
                            }
                        }
                        '\n' => {
                            return Err(CalcError::syntax(start_line, "unterminated string literal"));
                        }
                        _ => s.push(ch),
                    }
                }
                push(&mut tokens, Token::Str(s), start_line);
            }

            '0'..='9' => {
                let start = i;
                while i < len && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| CalcError::syntax(line, format!("invalid number `{text}`")))?;
                push(&mut tokens, Token::Number(n), line);
            }

            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < len && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let token = match ident.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "let" => Token::Let,
                    _ => Token::Ident(ident),
                };
                push(&mut tokens, token, line);
            }

            '=' | '!' | '>' | '<' => {
                i += 1;
                let followed_by_eq = chars.get(i) == Some(&'=');
                if followed_by_eq {
                    i += 1;
                }
                let token = match (c, followed_by_eq) {
                    ('=', true) => Token::EqEq,
                    ('=', false) => Token::Eq,
                    ('!', true) => Token::BangEq,
                    ('!', false) => Token::Bang,
                    ('>', true) => Token::GtEq,
                    ('>', false) => Token::Gt,
                    ('<', true) => Token::LtEq,
                    _ => Token::Lt,
                };
                push(&mut tokens, token, line);
            }
            '&' | '|' => {
                if chars.get(i + 1) != Some(&c) {
                    return Err(CalcError::syntax(line, format!("expected `{c}{c}`")));
                }
                i += 2;
                let token = if c == '&' { Token::AmpAmp } else { Token::PipePipe };
                push(&mut tokens, token, line);
            }

            '+' => { i += 1; push(&mut tokens, Token::Plus, line); }
            '-' => { i += 1; push(&mut tokens, Token::Minus, line); }
            '*' => { i += 1; push(&mut tokens, Token::Star, line); }
            '/' => { i += 1; push(&mut tokens, Token::Slash, line); }
            '%' => { i += 1; push(&mut tokens, Token::Percent, line); }
            '?' => { i += 1; push(&mut tokens, Token::Question, line); }
            ':' => { i += 1; push(&mut tokens, Token::Colon, line); }
            ',' => { i += 1; push(&mut tokens, Token::Comma, line); }
            '(' => {
                i += 1;
                if chars.get(i) == Some(&')') {
                    i += 1;
                    push(&mut tokens, Token::Unit, line);
                } else {
                    push(&mut tokens, Token::LParen, line);
                }
            }
            ')' => { i += 1; push(&mut tokens, Token::RParen, line); }

            other => {
                return Err(CalcError::syntax(line, format!("unexpected character `{other}`")));
            }
        }
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Spanned>, token: Token, line: usize) {
    tokens.push(Spanned { token, line });
}
