use std::collections::HashMap;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::runtime::data_structures::value::Value;



pub type Result<T> = std::result::Result<T, ForthError>;



/// Everything that can go wrong while evaluating Forth source.  Every error is recoverable at the
/// `evaluate` boundary, the interpreter is left in whatever state it was in when the error was
/// raised so that the stack can be inspected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForthError
{
    /// A word needed more values than the stack holds.
    #[error("Stack underflow: '{word}' needs {needed} value{}, but the stack only has {available}.",
            plural(.needed))]
    StackUnderflow { word: String, needed: usize, available: usize },

    /// The word isn't in the dictionary.  Suggestions are the closest known names.
    #[error("Unknown word: '{word}'{}", did_you_mean(.suggestions))]
    UnknownWord { word: String, suggestions: Vec<String> },

    #[error("Division by zero: Cannot divide {dividend} by 0.")]
    DivisionByZero { dividend: Value },

    #[error("Type mismatch: '{word}' expects {expected}, but found {actual}.")]
    TypeMismatch { word: String, expected: String, actual: String },

    #[error("'{word}' is a compile-only word.")]
    CompileOnly { word: String },

    /// Unbalanced control structure, `missing` names the counterpart that wasn't found.
    #[error("Unmatched '{word}': missing '{missing}'.")]
    ControlStructureError { word: String, missing: String },

    #[error("'{text}' is not a valid number or known word.")]
    InvalidNumber { text: String },

    /// A parsing word like `SEE` or `FORGET` reached the end of the source without its operand.
    #[error("'{word}' needs a word name after it.")]
    MissingName { word: String },

    #[error("I/O error: {0}")]
    Io(String),

    /// Raised at a pause point when the host has asked execution to stop.  The interpreter turns
    /// this into a stopped outcome, it never reaches the host as an error.
    #[error("Execution stopped.")]
    Halted
}


fn plural(count: &usize) -> &'static str
{
    if *count == 1 { "" } else { "s" }
}


fn did_you_mean(suggestions: &[String]) -> String
{
    match suggestions
    {
        []         => String::new(),
        [ single ] => format!(". Did you mean '{}'?", single),
        many       =>
            {
                let names: Vec<&str> = many.iter().take(3).map(|name| name.as_str()).collect();
                format!(". Did you mean one of: {}?", names.join(", "))
            }
    }
}


lazy_static!
{
    /// Friendlier advice for the words a beginner is most likely to underflow.
    static ref UNDERFLOW_HINTS: HashMap<&'static str, &'static str> =
        {
            let mut hints = HashMap::new();

            hints.insert("+",    "The '+' word adds two numbers together. Try: 3 5 +");
            hints.insert("-",    "The '-' word subtracts (second - top). Try: 10 3 -");
            hints.insert("*",    "The '*' word multiplies two numbers. Try: 4 7 *");
            hints.insert("/",    "The '/' word divides (second / top). Try: 20 4 /");
            hints.insert("DUP",  "DUP duplicates the top value. Push a value first: 5 DUP");
            hints.insert("DROP", "DROP removes the top value. Push a value first: 5 DROP");
            hints.insert("SWAP", "SWAP exchanges top two values. Try: 1 2 SWAP");
            hints.insert("OVER", "OVER copies the second value to top. Try: 1 2 OVER");
            hints.insert("ROT",  "ROT rotates three values. Try: 1 2 3 ROT");
            hints.insert(".",    "The '.' word prints and removes top value. Try: 42 .");

            hints
        };
}


impl From<std::io::Error> for ForthError
{
    fn from(error: std::io::Error) -> Self
    {
        ForthError::Io(error.to_string())
    }
}


impl ForthError
{
    pub fn stack_underflow(word: &str, needed: usize, available: usize) -> ForthError
    {
        ForthError::StackUnderflow { word: word.to_string(), needed, available }
    }

    pub fn type_mismatch(word: &str, expected: &str, actual: &Value) -> ForthError
    {
        ForthError::TypeMismatch { word: word.to_string(),
                                   expected: expected.to_string(),
                                   actual: actual.type_name().to_string() }
    }

    pub fn control_structure(word: &str, missing: &str) -> ForthError
    {
        ForthError::ControlStructureError { word: word.to_string(), missing: missing.to_string() }
    }

    /// Advice on how to fix the error, if there is any to give.
    pub fn hint(&self) -> Option<String>
    {
        match self
        {
            ForthError::StackUnderflow { word, needed, available } =>
                {
                    let hint = match UNDERFLOW_HINTS.get(word.to_uppercase().as_str())
                        {
                            Some(hint) => hint.to_string(),
                            None => format!("Try pushing {} more value(s) before using '{}'.",
                                            needed.saturating_sub(*available),
                                            word)
                        };

                    Some(hint)
                },

            ForthError::UnknownWord { .. } =>
                Some("Forth words are case-insensitive. Use WORDS to list available words."
                     .to_string()),

            ForthError::DivisionByZero { .. } =>
                Some("Check the value on top of the stack before dividing.".to_string()),

            ForthError::CompileOnly { .. } =>
                Some("It can only be used inside a colon definition (: word ... ;).".to_string()),

            ForthError::ControlStructureError { word, missing } =>
                Some(format!("Every '{}' needs a matching '{}'. Check that your control \
                              structures are balanced.",
                             word,
                             missing)),

            ForthError::InvalidNumber { .. } =>
                Some("Numbers can be decimal (42), hex ($FF or 0xFF), or float (3.14).".to_string()),

            ForthError::MissingName { word } =>
                Some(format!("Write the word's name right after it, for example: {} SQUARE", word)),

            ForthError::TypeMismatch { .. } | ForthError::Io(_) | ForthError::Halted => None
        }
    }

    /// The message and hint, on separate lines, as shown to the learner.
    pub fn format_message(&self) -> String
    {
        match self.hint()
        {
            Some(hint) => format!("{}\n{}", self, hint),
            None       => self.to_string()
        }
    }
}
