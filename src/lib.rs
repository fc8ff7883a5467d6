//! FABLE's Forth core.  The lexer, dictionary, primitive catalog and the interpreter engine that
//! an IDE host drives one step at a time.

/// Module for managing the source code, its tokens and the threaded code compiled from them.
pub mod lang;

/// Module for the runtime and the data structures used by the interpreter.  As well as the
/// interpreter itself.
#[macro_use]
pub mod runtime;

pub use runtime::{
    config::Config,
    data_structures::value::{ToValue, Value},
    error::{ForthError, Result},
    interpreter::{
        control::{ExecutionControl, ExecutionMode},
        events::{EngineEvent, EventLog, Observer},
        forth_interpreter::{ForthInterpreter, Outcome},
        CodeManagement, ControlKind, Interpreter, InterpreterStack, WordManagement,
    },
};
