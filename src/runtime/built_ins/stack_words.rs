use crate::{
    add_native_word,
    runtime::{
        data_structures::value::{ToValue, Value},
        error::{self, ForthError},
        interpreter::Interpreter,
    },
};

/// Duplicate the top value on the data stack.
///
/// Signature: `a -- a a`
fn word_dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "DUP")?;

    let value = interpreter.pop()?;

    interpreter.push(value.clone());
    interpreter.push(value);

    Ok(())
}

/// Drop the top value on the data stack.
///
/// Signature: `a -- `
fn word_drop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "DROP")?;

    let _ = interpreter.pop()?;

    Ok(())
}

/// Swap the top 2 values on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "SWAP")?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b);
    interpreter.push(a);

    Ok(())
}

/// Copy the second value to the top.
///
/// Signature: `a b -- a b a`
fn word_over(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "OVER")?;

    let a = interpreter.peek(1)?;
    interpreter.push(a);

    Ok(())
}

/// Rotate the third value to the top.
///
/// Signature: `a b c -- b c a`
fn word_rot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(3, "ROT")?;

    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b);
    interpreter.push(c);
    interpreter.push(a);

    Ok(())
}

/// Rotate the top value down to third place.
///
/// Signature: `a b c -- c a b`
fn word_minus_rot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(3, "-ROT")?;

    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(c);
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Signature: `a b -- b`
fn word_nip(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "NIP")?;

    let b = interpreter.pop()?;
    let _ = interpreter.pop()?;

    interpreter.push(b);

    Ok(())
}

/// Signature: `a b -- b a b`
fn word_tuck(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "TUCK")?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b.clone());
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Signature: `a b -- a b a b`
fn word_two_dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "2DUP")?;

    let a = interpreter.peek(1)?;
    let b = interpreter.peek(0)?;

    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Signature: `a b -- `
fn word_two_drop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(2, "2DROP")?;

    let _ = interpreter.pop()?;
    let _ = interpreter.pop()?;

    Ok(())
}

/// Signature: `a b c d -- c d a b`
fn word_two_swap(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(4, "2SWAP")?;

    let d = interpreter.pop()?;
    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(c);
    interpreter.push(d);
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Signature: `a b c d -- a b c d a b`
fn word_two_over(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(4, "2OVER")?;

    let a = interpreter.peek(3)?;
    let b = interpreter.peek(2)?;

    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Push the number of values on the stack.
///
/// Signature: ` -- n`
fn word_depth(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interpreter.stack().len();

    interpreter.push(depth.to_value());

    Ok(())
}

/// Pop the index, as well as check that it can be used to reach that deep into the stack.
fn pop_depth_index(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<usize> {
    interpreter.require(1, word)?;

    let value = interpreter.pop()?;
    let index = match value {
        Value::Int(index) if index >= 0 => index as usize,
        other => return Err(ForthError::type_mismatch(word, "a non-negative integer", &other)),
    };

    interpreter.require(index + 1, word)?;

    Ok(index)
}

/// Copy the nth value to the top of the stack, 0 is the top itself.
///
/// Signature: `n -- value`
fn word_pick(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let index = pop_depth_index(interpreter, "PICK")?;
    let value = interpreter.peek(index)?;

    interpreter.push(value);

    Ok(())
}

/// Move the nth value to the top of the stack.
///
/// Signature: `n -- `
fn word_roll(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let index = pop_depth_index(interpreter, "ROLL")?;

    if index == 0 {
        return Ok(());
    }

    let stack = interpreter.stack_mut();
    let position = stack.len() - 1 - index;
    let value = stack.remove(position);

    stack.push(value);

    Ok(())
}

/// Signature: `... -- `
fn word_clear(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.clear_stack();

    Ok(())
}

/// Move the top value to the return stack.
///
/// Signature: `a -- ` `R: -- a`
fn word_to_r(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, ">R")?;

    let value = interpreter.pop()?;
    interpreter.rpush(value);

    Ok(())
}

/// Signature: ` -- a` `R: a -- `
fn word_r_from(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.rpop()?;

    interpreter.push(value);

    Ok(())
}

/// Signature: ` -- a` `R: a -- a`
fn word_r_fetch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.rpeek()?;

    interpreter.push(value);

    Ok(())
}

pub fn register_stack_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, "DUP", word_dup, "Duplicate top of stack.", "( a -- a a )");

    add_native_word!(interpreter, "DROP", word_drop, "Discard top of stack.", "( a -- )");

    add_native_word!(interpreter, "SWAP", word_swap, "Exchange top two items.", "( a b -- b a )");

    add_native_word!(interpreter, "OVER", word_over, "Copy second item to top.", "( a b -- a b a )");

    add_native_word!(
        interpreter,
        "ROT",
        word_rot,
        "Rotate third item to top.",
        "( a b c -- b c a )"
    );

    add_native_word!(
        interpreter,
        "-ROT",
        word_minus_rot,
        "Rotate top to third.",
        "( a b c -- c a b )"
    );

    add_native_word!(interpreter, "NIP", word_nip, "Drop second item.", "( a b -- b )");

    add_native_word!(interpreter, "TUCK", word_tuck, "Copy top below second.", "( a b -- b a b )");

    add_native_word!(
        interpreter,
        "2DUP",
        word_two_dup,
        "Duplicate top pair.",
        "( a b -- a b a b )"
    );

    add_native_word!(interpreter, "2DROP", word_two_drop, "Drop top pair.", "( a b -- )");

    add_native_word!(
        interpreter,
        "2SWAP",
        word_two_swap,
        "Swap pairs.",
        "( a b c d -- c d a b )"
    );

    add_native_word!(
        interpreter,
        "2OVER",
        word_two_over,
        "Copy second pair.",
        "( a b c d -- a b c d a b )"
    );

    add_native_word!(interpreter, "DEPTH", word_depth, "Push current stack depth.", "( -- n )");

    add_native_word!(
        interpreter,
        "PICK",
        word_pick,
        "Copy nth item to top, 0 is the top.",
        "( n -- a )"
    );

    add_native_word!(interpreter, "ROLL", word_roll, "Rotate nth item to top.", "( n -- )");

    add_native_word!(interpreter, "CLEAR", word_clear, "Clear the stack.", "( ... -- )");

    add_native_word!(
        interpreter,
        ">R",
        word_to_r,
        "Move to return stack.",
        "( a -- ) ( R: -- a )"
    );

    add_native_word!(
        interpreter,
        "R>",
        word_r_from,
        "Move from return stack.",
        "( -- a ) ( R: a -- )"
    );

    add_native_word!(
        interpreter,
        "R@",
        word_r_fetch,
        "Copy from return stack.",
        "( -- a ) ( R: a -- a )"
    );
}
