/// All of the core data structures used by the interpreter.
pub mod data_structures;

/// Module for defining the built-in native words that are available to the interpreter.
pub mod built_ins;

/// Module for defining the error reporting of the interpreter.
pub mod error;

/// Where libraries are found and how fast the interpreter runs by default.
pub mod config;

/// Module for defining the core functionality of the interpreter.  This includes tools for managing
/// and examining the interpreter's state.
#[macro_use]
pub mod interpreter;
