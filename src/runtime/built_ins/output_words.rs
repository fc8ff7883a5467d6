use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::Op,
    runtime::{
        data_structures::value::Value,
        error::{self, ForthError},
        interpreter::Interpreter,
    },
};

/// Print and remove the top of the stack, followed by a space.
///
/// Signature: `value -- `
fn word_print(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, ".")?;

    let value = interpreter.pop()?;
    interpreter.output(&format!("{} ", value));

    Ok(())
}

/// Print the whole stack without changing it, the depth first.
///
/// Signature: ` -- `
fn word_print_stack(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let text = if interpreter.stack().is_empty() {
        "<empty> ".to_string()
    } else {
        let items: Vec<String> = interpreter.stack().iter().map(Value::to_string).collect();

        format!("<{}> {} ", items.len(), items.join(" "))
    };

    interpreter.output(&text);

    Ok(())
}

fn word_cr(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.output("\n");
    Ok(())
}

fn word_space(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.output(" ");
    Ok(())
}

/// Longest run `SPACES` will print.
const MAX_SPACES: i64 = 65_536;

/// Signature: `n -- `
fn word_spaces(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "SPACES")?;

    let count = interpreter.pop_as_int()?;

    if count > MAX_SPACES {
        return Err(ForthError::type_mismatch(
            "SPACES",
            &format!("a count of at most {}", MAX_SPACES),
            &Value::Int(count),
        ));
    }

    if count > 0 {
        interpreter.output(&" ".repeat(count as usize));
    }

    Ok(())
}

/// Print the character with the given code point.
///
/// Signature: `char -- `
fn word_emit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "EMIT")?;

    let value = interpreter.pop()?;
    let character = match &value {
        Value::Int(code) => u32::try_from(*code).ok().and_then(char::from_u32),
        _ => None,
    };

    match character {
        Some(character) => interpreter.output(&character.to_string()),
        None => return Err(ForthError::type_mismatch("EMIT", "a character code", &value)),
    }

    Ok(())
}

/// Print the first n characters of a string.
///
/// Signature: `string n -- `
fn word_type(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "TYPE")?;

    let count = interpreter.pop_as_int()?;
    let text = interpreter.pop_as_string()?;
    let prefix: String = text.chars().take(count.max(0) as usize).collect();

    interpreter.output(&prefix);

    Ok(())
}

/// Print the string that follows, or compile it for printing when the word runs.
///
/// Signature: ` -- `
fn word_dot_quote(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let text = interpreter.next_token_string()?;

    if interpreter.is_compiling() {
        interpreter.insert_instruction(Op::PrintString(text));
    } else {
        interpreter.output(&text);
    }

    Ok(())
}

/// Print the text up to the closing paren right away, even inside a definition.
fn word_dot_paren(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let text = interpreter.next_token_string()?;

    interpreter.output(&text);

    Ok(())
}

/// The string itself follows as a literal token, pushed or compiled like a number would be.
fn word_s_quote(_interpreter: &mut dyn Interpreter) -> error::Result<()> {
    Ok(())
}

pub fn register_output_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, ".", word_print, "Print and remove top of stack.", "( n -- )");

    add_native_word!(
        interpreter,
        ".S",
        word_print_stack,
        "Print stack non-destructively.",
        "( -- )"
    );

    add_native_word!(interpreter, "CR", word_cr, "Print newline.", "( -- )");

    add_native_word!(interpreter, "SPACE", word_space, "Print a space.", "( -- )");

    add_native_word!(interpreter, "SPACES", word_spaces, "Print n spaces.", "( n -- )");

    add_native_word!(interpreter, "EMIT", word_emit, "Print character.", "( char -- )");

    add_native_word!(
        interpreter,
        "TYPE",
        word_type,
        "Print the first n characters of a string.",
        "( str n -- )"
    );

    add_native_immediate_word!(
        interpreter,
        ".\"",
        word_dot_quote,
        "Print string literal.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        ".(",
        word_dot_paren,
        "Print text immediately.",
        "( -- )"
    );

    add_native_immediate_word!(interpreter, "S\"", word_s_quote, "String literal.", "( -- str )");
}
