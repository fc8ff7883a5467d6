use crate::{
    lang::{
        code::{ByteCode, Op},
        tokenizing::Token,
    },
    runtime::{
        config::Config,
        data_structures::{
            dictionary::{Dictionary, WordInfo, WordRuntime},
            value::Value,
        },
        error,
    },
};
use std::{collections::BTreeSet, path::PathBuf, rc::Rc};

pub mod control;
pub mod events;
pub mod forth_interpreter;

/// The data stack of values managed by the interpreter.
pub type ValueStack = Vec<Value>;

/// What kind of opening word left a position on the return stack while compiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    /// `IF`, `ELSE` or `WHILE`, a branch waiting for its target.
    Branch,

    /// `BEGIN`, the position a loop jumps back to.
    Begin,

    /// `DO`, the start of a counted loop body.
    Do,
}

impl ControlKind {
    pub fn tag(self) -> i64 {
        match self {
            ControlKind::Branch => 0,
            ControlKind::Begin => 1,
            ControlKind::Do => 2,
        }
    }

    pub fn from_tag(tag: i64) -> Option<ControlKind> {
        match tag {
            0 => Some(ControlKind::Branch),
            1 => Some(ControlKind::Begin),
            2 => Some(ControlKind::Do),
            _ => None,
        }
    }
}

/// Trait for managing the interpreter's data and return stacks.  Intended to be called by native
/// words.
pub trait InterpreterStack {
    /// Use to examine the full data stack when required.  One example is for the stack dump command
    /// `.S`.
    fn stack(&self) -> &ValueStack;

    /// Direct access for words that reorder deep in the stack, like `ROLL`.
    fn stack_mut(&mut self) -> &mut ValueStack;

    /// Push a value onto the stack.
    fn push(&mut self, value: Value);

    /// Pop a value from the stack.  If the stack is empty a stack underflow error is returned,
    /// naming the word currently executing.
    fn pop(&mut self) -> error::Result<Value>;

    /// Copy a value from the stack without removing it.  Index 0 is the top of the stack.
    fn peek(&self, index: usize) -> error::Result<Value>;

    /// Make sure the stack holds at least `count` values before a word starts taking them.
    fn require(&self, count: usize, word: &str) -> error::Result<()> {
        let available = self.stack().len();

        if available < count {
            return Err(error::ForthError::stack_underflow(word, count, available));
        }

        Ok(())
    }

    /// Pop the top value, which must be an integer.
    fn pop_as_int(&mut self) -> error::Result<i64>;

    /// Pop the top value, which must be a string.
    fn pop_as_string(&mut self) -> error::Result<String>;

    fn return_stack(&self) -> &ValueStack;

    fn rpush(&mut self, value: Value);

    fn rpop(&mut self) -> error::Result<Value>;

    fn rpeek(&self) -> error::Result<Value>;
}

/// Trait for building up colon definitions and reading the incoming token stream.
///
/// The compile functions are only meaningful while a definition is open, so they should only be
/// called from immediate words.
pub trait CodeManagement {
    /// Is a colon definition currently being compiled?
    fn is_compiling(&self) -> bool;

    /// Get the next non-comment token from the source being interpreted.  Fails at the end of the
    /// source.
    fn next_token(&mut self) -> error::Result<Token>;

    /// Get the next token, which must be a word.
    fn next_token_word(&mut self) -> error::Result<String>;

    /// Get the next token, which must be a string literal body.
    fn next_token_string(&mut self) -> error::Result<String>;

    /// The index the next compiled instruction will occupy.
    fn here(&self) -> usize;

    /// Append an instruction to the definition being compiled.
    fn insert_instruction(&mut self, op: Op);

    /// Access the instructions of the definition being compiled.
    fn definition_mut(&mut self) -> &mut ByteCode;

    /// Remember a compile time position on the return stack, tagged with the kind of word that
    /// opened it.
    fn push_control(&mut self, position: usize, kind: ControlKind);

    /// Take back a compile time position pushed by an opening control word.  `word` is the closing
    /// word asking and `missing` the opener it expects.  Fails if the innermost open structure is
    /// not of the given kind.
    fn pop_control(&mut self, kind: ControlKind, word: &str, missing: &str) -> error::Result<usize>;

    /// Queue a library's source to be evaluated as soon as the current native word returns.
    fn queue_source(&mut self, name: String, path: PathBuf, source: String);
}

/// Definition of a word handler function.  This is the function that is called when a native word
/// is to be executed.
pub type WordHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// Simplify registering a native regular word with the interpreter.
///
/// Required parameters are, the interpreter instance to register with.  The name of the word to
/// register.  The word function handler to execute for the word.  A simple description of the word.
/// As well as the word's stack signature.
#[macro_export]
macro_rules! add_native_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;
        use $crate::runtime::data_structures::dictionary::WordRuntime;

        $interpreter.add_word(
            $name.to_string(),
            Rc::new($function),
            $description.to_string(),
            $signature.to_string(),
            WordRuntime::Normal,
        );
    }};
}

/// Simplify registering a native immediate word with the interpreter.  That is, this word is
/// executed as soon as it is read, even inside a colon definition.
#[macro_export]
macro_rules! add_native_immediate_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;
        use $crate::runtime::data_structures::dictionary::WordRuntime;

        $interpreter.add_word(
            $name.to_string(),
            Rc::new($function),
            $description.to_string(),
            $signature.to_string(),
            WordRuntime::Immediate,
        );
    }};
}

/// Trait for managing the words known to the interpreter.
pub trait WordManagement {
    /// Add a new native word to the interpreter's dictionary.
    fn add_word(
        &mut self,
        name: String,
        handler: Rc<WordHandler>,
        description: String,
        signature: String,
        runtime: WordRuntime,
    );

    /// Find a word in the interpreter's dictionary by name.
    fn find_word(&self, word: &str) -> Option<Rc<WordInfo>>;

    fn dictionary(&self) -> &Dictionary;

    fn dictionary_mut(&mut self) -> &mut Dictionary;

    /// The name of the word being executed, used when reporting errors.
    fn current_word(&self) -> &str;

    /// The stack effect notation of a word, if the word is known.
    fn stack_effect(&self, word: &str) -> Option<String> {
        self.find_word(word).map(|info| info.signature.clone())
    }
}

/// Core interpreter trait.
///
/// This trait brings together the stack, code and word management traits along with the services
/// native words need from the host: output and the library system.
pub trait Interpreter: InterpreterStack + CodeManagement + WordManagement {
    /// Send printable text to the host.
    fn output(&mut self, text: &str);

    /// Empty the data stack and let the host know the state changed.
    fn clear_stack(&mut self);

    fn config(&self) -> &Config;

    /// The canonical paths of the libraries loaded so far.
    fn loaded_libraries(&self) -> &BTreeSet<PathBuf>;

    fn loaded_libraries_mut(&mut self) -> &mut BTreeSet<PathBuf>;
}
