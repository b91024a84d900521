//! Tokenizer for the restricted literal grammar.

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Identifiers and word literals, distinguished in the parser
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal (sign included)
    Int(i64),
    /// Float literal, kept as text until the parser converts it
    Float(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,
    Eq,
    /// Bare minus, only valid before `inf` in this grammar
    Minus,
    // End of input
    Eof,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Str(_) => "a string literal".to_string(),
            Token::Int(n) => format!("'{n}'"),
            Token::Float(s) => format!("'{s}'"),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Spanned {
    pub token: Token,
    /// Character offset of the token's first character.
    pub pos: usize,
}

pub(crate) fn lex(src: &str) -> Result<Vec<Spanned>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let tok_pos = pos;

        // String literal
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(format!("offset {tok_pos}: unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == '"' {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(format!("offset {tok_pos}: unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        'r' => s.push('\r'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                if sc == '\n' {
                    return Err(format!("offset {tok_pos}: unterminated string literal"));
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                pos: tok_pos,
            });
            continue;
        }

        // Number (sign folded in when a digit follows)
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            let start = pos;
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let mut is_float = false;
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                is_float = true;
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut ahead = pos + 1;
                if ahead < chars.len() && (chars[ahead] == '+' || chars[ahead] == '-') {
                    ahead += 1;
                }
                if ahead < chars.len() && chars[ahead].is_ascii_digit() {
                    is_float = true;
                    pos = ahead;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let s: String = chars[start..pos].iter().collect();
            if is_float {
                tokens.push(Spanned {
                    token: Token::Float(s),
                    pos: tok_pos,
                });
            } else {
                let n: i64 = s
                    .parse()
                    .map_err(|_| format!("offset {tok_pos}: invalid integer '{s}'"))?;
                tokens.push(Spanned {
                    token: Token::Int(n),
                    pos: tok_pos,
                });
            }
            continue;
        }

        // Punctuation
        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '=' => Some(Token::Eq),
            '-' => Some(Token::Minus),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(Spanned {
                token,
                pos: tok_pos,
            });
            pos += 1;
            continue;
        }

        // Identifier / word literal
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                pos: tok_pos,
            });
            continue;
        }

        return Err(format!("offset {tok_pos}: unexpected character '{c}'"));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: chars.len(),
    });
    Ok(tokens)
}
