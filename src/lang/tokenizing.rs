use crate::lang::source_buffer::{SourceBuffer, SourceLocation};
use std::fmt::{self, Debug, Display, Formatter};

/// A number token can be either an integer or a floating point literal.
#[derive(Clone, Copy, PartialEq)]
pub enum NumberType {
    /// We're holding an integer value.
    Int(i64),

    /// We're holding a floating point value.
    Float(f64),
}

/// Print the value of the held number.
impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NumberType::Int(num) => write!(f, "{}", num),
            NumberType::Float(num) => write!(f, "{:?}", num),
        }
    }
}

/// Print the value of the held number as well as an indicator of which variant we're holding for
/// debugging purposes.
impl Debug for NumberType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NumberType::Int(num) => write!(f, "{} i", num),
            NumberType::Float(num) => write!(f, "{:?} f", num),
        }
    }
}

/// What a token holds.  Words keep the case they were written in, the dictionary takes care of
/// normalizing names.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Can be either an integer or a floating point value.
    Number(NumberType),

    /// The body of a `."`, `S"` or `.(` string literal.
    String(String),

    /// A word in the language to be executed or compiled.
    Word(String),

    /// The text of a line or parenthetical comment.
    Comment(String),

    /// Always the last token in the list.
    EndOfInput,
}

/// A token is a simple unit of the language.  It holds the location in the original source code
/// where it was found along with the raw text it was read from.
#[derive(Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    location: SourceLocation,
    raw: String,
}

/// A list of tokens found in the source code.
pub type TokenList = Vec<Token>;

/// Make sure that the tokens are nicely printable for debugging purposes.
impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.kind {
            TokenKind::Number(num) => write!(f, "{}", num),
            TokenKind::String(text) => write!(f, "{}", text),
            TokenKind::Word(text) => write!(f, "{}", text),
            TokenKind::Comment(text) => write!(f, "{}", text),
            TokenKind::EndOfInput => write!(f, "<eof>"),
        }
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.kind {
            TokenKind::Number(num) => write!(f, "{}: {:?}", self.location, num),
            TokenKind::String(text) => write!(f, "{}: {:?}", self.location, text),
            TokenKind::Word(text) => write!(f, "{}: {}", self.location, text),
            TokenKind::Comment(text) => write!(f, "{}: comment {:?}", self.location, text),
            TokenKind::EndOfInput => write!(f, "{}: <eof>", self.location),
        }
    }
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, raw: String) -> Token {
        Token {
            kind,
            location,
            raw,
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Get the token's location in the original source text.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The source text the token was read from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Check if the token is a word.
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Word(_))
    }

    /// Get the word text, if this is a word token.
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Check if the token is a string literal.
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfInput)
    }
}

/// Check if the given character is considered whitespace.
fn is_whitespace(next: &char) -> bool {
    *next == ' ' || *next == '\t' || *next == '\r' || *next == '\n'
}

/// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the next
/// non-whitespace character.
fn skip_whitespace(buffer: &mut SourceBuffer) {
    while let Some(next) = buffer.peek_next() {
        if !is_whitespace(&next) {
            break;
        }

        let _ = buffer.next_char();
    }
}

/// Consume a `\` comment up to, but not including, the end of the line.
fn process_line_comment(buffer: &mut SourceBuffer) -> String {
    let mut text = String::new();

    while let Some(next) = buffer.peek_next() {
        if next == '\n' {
            break;
        }

        text.push(next);
        let _ = buffer.next_char();
    }

    text
}

/// Consume a `( ... )` comment.  Parentheses nest, so `( a ( b ) c )` is one comment.  An
/// unterminated comment runs to the end of the source.
fn process_paren_comment(buffer: &mut SourceBuffer) -> String {
    let mut text = String::new();
    let mut depth = 1;

    // Skip the opening paren.
    let _ = buffer.next_char();

    while let Some(next) = buffer.next_char() {
        match next {
            '(' => depth += 1,
            ')' => {
                depth -= 1;

                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }

        text.push(next);
    }

    text
}

/// Pull text out of the buffer until we hit a whitespace character.  This is used to process words.
/// Words can contain any character except whitespace.
fn process_until_whitespace(buffer: &mut SourceBuffer) -> String {
    let mut text = String::new();

    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            break;
        }

        text.push(next);
        let _ = buffer.next_char();
    }

    text
}

/// Scan a string body verbatim up to the terminator.  The terminator is consumed but not included.
/// Returns the location of the first character of the body along with the body itself.
fn process_string_until(buffer: &mut SourceBuffer, terminator: char) -> (SourceLocation, String) {
    let location = *buffer.location();
    let mut text = String::new();

    while let Some(next) = buffer.next_char() {
        if next == terminator {
            break;
        }

        text.push(next);
    }

    (location, text)
}

/// Attempt to convert the text into a numeric literal.  Hexadecimal can be written with either a
/// `$` or `0x` prefix.  Floating point literals need a decimal point.
fn to_numeric(text: &str) -> Option<NumberType> {
    if let Some(stripped) = text.strip_prefix('$') {
        i64::from_str_radix(stripped, 16).ok().map(NumberType::Int)
    } else if let Some(stripped) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        i64::from_str_radix(stripped, 16).ok().map(NumberType::Int)
    } else if let Ok(number) = text.parse::<i64>() {
        Some(NumberType::Int(number))
    } else if text.contains('.') {
        text.parse::<f64>().ok().map(NumberType::Float)
    } else {
        None
    }
}

/// Words that read the text following them as a string body, and the character that ends that
/// body.  The flag says whether exactly one separating space is skipped first.
fn string_word_terminator(word: &str) -> Option<(&'static str, char, bool)> {
    match word.to_uppercase().as_str() {
        ".\"" => Some((".\"", '"', true)),
        "S\"" => Some(("S\"", '"', true)),
        ".(" => Some((".(", ')', false)),
        _ => None,
    }
}

/// Tokenize the source code from a string.  The returned list always ends with a single
/// `EndOfInput` token.
pub fn tokenize(source: &str) -> TokenList {
    let mut buffer = SourceBuffer::new(source);
    let mut token_list = TokenList::new();

    loop {
        skip_whitespace(&mut buffer);

        let location = *buffer.location();

        let Some(next) = buffer.peek_next() else {
            token_list.push(Token::new(TokenKind::EndOfInput, location, String::new()));
            break;
        };

        // Comments come first, a paren only opens a comment when followed by whitespace.
        if next == '\\' {
            let text = process_line_comment(&mut buffer);
            token_list.push(Token::new(TokenKind::Comment(text.clone()), location, text));
            continue;
        }

        if next == '(' && matches!(buffer.peek_after(), Some(after) if is_whitespace(&after)) {
            let text = process_paren_comment(&mut buffer);
            let raw = format!("({})", text);
            token_list.push(Token::new(TokenKind::Comment(text), location, raw));
            continue;
        }

        let text = process_until_whitespace(&mut buffer);

        if let Some((word, terminator, skip_space)) = string_word_terminator(&text) {
            if skip_space && buffer.peek_next() == Some(' ') {
                let _ = buffer.next_char();
            }

            let (string_location, body) = process_string_until(&mut buffer, terminator);
            let raw = match terminator {
                ')' => format!("({})", body),
                _ => format!("\"{}\"", body),
            };

            token_list.push(Token::new(TokenKind::Word(word.to_string()), location, text));
            token_list.push(Token::new(TokenKind::String(body), string_location, raw));
            continue;
        }

        let kind = match to_numeric(&text) {
            Some(number) => TokenKind::Number(number),
            None => TokenKind::Word(text.clone()),
        };

        token_list.push(Token::new(kind, location, text));
    }

    token_list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn numbers_follow_parse_priority() {
        assert_eq!(
            kinds("42 -17 $FF 0x1a 3.5 1e5"),
            vec![
                TokenKind::Number(NumberType::Int(42)),
                TokenKind::Number(NumberType::Int(-17)),
                TokenKind::Number(NumberType::Int(255)),
                TokenKind::Number(NumberType::Int(26)),
                TokenKind::Number(NumberType::Float(3.5)),
                TokenKind::Word("1e5".to_string()),
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn paren_needs_trailing_whitespace() {
        let tokens = kinds("(foo) ( a ( nested ) b ) x");

        assert_eq!(tokens[0], TokenKind::Word("(foo)".to_string()));
        assert_eq!(tokens[1], TokenKind::Comment(" a ( nested ) b ".to_string()));
        assert_eq!(tokens[2], TokenKind::Word("x".to_string()));
    }

    #[test]
    fn dot_paren_keeps_leading_space() {
        let tokens = tokenize(".( hi)");

        assert_eq!(tokens[0].kind(), &TokenKind::Word(".(".to_string()));
        assert_eq!(tokens[1].kind(), &TokenKind::String(" hi".to_string()));
        assert_eq!(tokens[1].raw(), "( hi)");
    }

    #[test]
    fn end_of_input_sits_at_final_position() {
        let tokens = tokenize("1\n2 ");
        let end = tokens.last().map(|token| *token.location());

        assert_eq!(end, Some(SourceLocation::new_from_info(2, 3)));
    }
}
