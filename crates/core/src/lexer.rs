use serde::{Deserialize, Serialize};

/// One whitespace-separated word of input and the 1-based line it sits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub line: u32,
}

impl Token {
    pub fn new(word: impl Into<String>, line: u32) -> Self {
        Token {
            word: word.into(),
            line,
        }
    }
}

/// Split `src` into line-numbered word tokens. Blank lines produce nothing.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (idx, line) in src.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        tokens.extend(line.split_whitespace().map(|w| Token::new(w, line_no)));
    }
    tokens
}
