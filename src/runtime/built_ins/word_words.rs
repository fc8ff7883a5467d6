use crate::{
    add_native_word,
    runtime::{
        error::{self, ForthError},
        interpreter::Interpreter,
    },
};
use tracing::debug;

const COLUMN_WIDTH: usize = 15;
const COLUMNS: usize = 5;

fn unknown_word(interpreter: &dyn Interpreter, name: &str) -> ForthError {
    ForthError::UnknownWord {
        word: name.to_string(),
        suggestions: interpreter.dictionary().find_similar(name, 3),
    }
}

/// List every known word in definition order, in columns.
///
/// Signature: ` -- `
fn word_words(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let mut text = String::new();

    for (index, name) in interpreter.dictionary().words(None).iter().enumerate() {
        text.push_str(&format!("{:<width$}", name, width = COLUMN_WIDTH));

        if (index + 1) % COLUMNS == 0 {
            text.push('\n');
        }
    }

    text.push('\n');
    interpreter.output(&text);

    Ok(())
}

/// Print the source of the word named next.
///
/// Signature: ` -- `
fn word_see(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let name = interpreter.next_token_word()?;

    match interpreter.dictionary().decompile(&name) {
        Some(text) => interpreter.output(&format!("{}\n", text)),
        None => return Err(unknown_word(interpreter, &name)),
    }

    Ok(())
}

/// Remove the word named next along with every word defined after it.
///
/// Signature: ` -- `
fn word_forget(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let name = interpreter.next_token_word()?;

    if !interpreter.dictionary_mut().forget(&name) {
        return Err(unknown_word(interpreter, &name));
    }

    debug!(word = %name.to_uppercase(), "forgot word and its successors");

    Ok(())
}

pub fn register_word_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, "WORDS", word_words, "List all words.", "( -- )");

    add_native_word!(interpreter, "SEE", word_see, "Show word definition.", "( -- )");

    add_native_word!(
        interpreter,
        "FORGET",
        word_forget,
        "Remove a word and every word defined after it.",
        "( -- )"
    );
}
