/// Module for tracking positions within the original source code.
pub mod source_buffer;

/// Module for managing the turning of the source code into a list of tokens for further processing.
pub mod tokenizing;

/// Module for defining the threaded code instructions that colon definitions are compiled into.
pub mod code;
