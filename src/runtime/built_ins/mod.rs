/// Words that manipulate the data and return stacks.
pub mod stack_words;

/// Arithmetic on integers and floats.
pub mod arithmetic_words;

/// Comparison, logic and bit manipulation words.
pub mod logic_words;

/// Words that print.
pub mod output_words;

/// Words that work with words.
pub mod word_words;

/// The immediate words that compile branches and loops.
pub mod control_words;

/// Words that load and save library files.
pub mod library_words;

use crate::runtime::{
    built_ins::{
        arithmetic_words::register_arithmetic_words, control_words::register_control_words,
        library_words::register_library_words, logic_words::register_logic_words,
        output_words::register_output_words, stack_words::register_stack_words,
        word_words::register_word_words,
    },
    interpreter::Interpreter,
};

/// Called to register all of the built in words of the language.
pub fn register_all(interpreter: &mut dyn Interpreter) {
    register_stack_words(interpreter);
    register_arithmetic_words(interpreter);
    register_logic_words(interpreter);
    register_output_words(interpreter);
    register_control_words(interpreter);
    register_word_words(interpreter);
    register_library_words(interpreter);
}
