use std::fmt::{ self,
                Display,
                Formatter };



/// Where a token starts in the text being tokenized.  Lines and columns both count from 1, a tab
/// is one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation
{
    line: usize,
    column: usize
}


impl Default for SourceLocation
{
    fn default() -> Self
    {
        SourceLocation::new()
    }
}


impl Display for SourceLocation
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result
    {
        write!(formatter, "line {}, column {}", self.line, self.column)
    }
}


impl SourceLocation
{
    pub fn new() -> SourceLocation
    {
        SourceLocation { line: 1, column: 1 }
    }

    pub fn new_from_info(line: usize, column: usize) -> SourceLocation
    {
        SourceLocation { line, column }
    }

    pub fn line(&self) -> usize
    {
        self.line
    }

    pub fn column(&self) -> usize
    {
        self.column
    }

    /// The location just past the given character.
    fn advanced_by(self, consumed: char) -> SourceLocation
    {
        match consumed
        {
            '\n' => SourceLocation { line: self.line + 1, column: 1 },
            _    => SourceLocation { line: self.line, column: self.column + 1 }
        }
    }
}



/// A forward only cursor over borrowed source text.  The tokenizer pulls characters from it one at
/// a time and asks it where it is whenever a token starts.
pub struct SourceBuffer<'a>
{
    source: &'a str,

    /// Byte offset of the next unconsumed character.
    offset: usize,

    location: SourceLocation
}


impl<'a> SourceBuffer<'a>
{
    pub fn new(source: &'a str) -> SourceBuffer<'a>
    {
        SourceBuffer { source, offset: 0, location: SourceLocation::new() }
    }

    /// The location of the next unconsumed character.
    pub fn location(&self) -> &SourceLocation
    {
        &self.location
    }

    fn remaining(&self) -> &'a str
    {
        &self.source[self.offset..]
    }

    /// The next character, left in place.
    pub fn peek_next(&self) -> Option<char>
    {
        self.remaining().chars().next()
    }

    /// The character after the next one.  Used to tell a `(` comment from a word starting with a
    /// paren.
    pub fn peek_after(&self) -> Option<char>
    {
        self.remaining().chars().nth(1)
    }

    pub fn next_char(&mut self) -> Option<char>
    {
        let next = self.peek_next()?;

        self.offset += next.len_utf8();
        self.location = self.location.advanced_by(next);

        Some(next)
    }
}


#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn newlines_reset_the_column()
    {
        let mut buffer = SourceBuffer::new("ab\nc");

        assert_eq!(buffer.next_char(), Some('a'));
        assert_eq!(buffer.location(), &SourceLocation::new_from_info(1, 2));

        let _ = buffer.next_char();
        let _ = buffer.next_char();

        assert_eq!(buffer.location(), &SourceLocation::new_from_info(2, 1));
        assert_eq!(buffer.peek_next(), Some('c'));
        assert_eq!(buffer.peek_after(), None);
    }

    #[test]
    fn multi_byte_characters_are_one_column()
    {
        let mut buffer = SourceBuffer::new("é✓x");

        let _ = buffer.next_char();
        let _ = buffer.next_char();

        assert_eq!(buffer.location().column(), 3);
        assert_eq!(buffer.next_char(), Some('x'));
        assert_eq!(buffer.next_char(), None);
    }
}
