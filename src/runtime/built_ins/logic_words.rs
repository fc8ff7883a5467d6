use crate::{
    add_native_word,
    runtime::{
        data_structures::value::Value,
        error::{self, ForthError},
        interpreter::Interpreter,
    },
};
use std::cmp::Ordering;

fn pop_pair(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<(Value, Value)> {
    interpreter.require(2, word)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    Ok((a, b))
}

/// Order two numbers or two strings.  `None` when a float is NaN.
fn compare(word: &str, a: &Value, b: &Value) -> error::Result<Option<Ordering>> {
    if a.is_numeric() != b.is_numeric() {
        let actual = if a.is_numeric() { b } else { a };

        return Err(ForthError::type_mismatch(word, "two numbers or two strings", actual));
    }

    Ok(a.partial_cmp(b))
}

fn comparison(
    interpreter: &mut dyn Interpreter,
    word: &str,
    test: fn(Ordering) -> bool,
) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, word)?;
    let flag = compare(word, &a, &b)?.is_some_and(test);

    interpreter.push(Value::from_flag(flag));

    Ok(())
}

/// Signature: `a b -- flag`
fn word_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, "=")?;

    interpreter.push(Value::from_flag(a == b));

    Ok(())
}

/// Signature: `a b -- flag`
fn word_not_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, "<>")?;

    interpreter.push(Value::from_flag(a != b));

    Ok(())
}

fn word_less(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    comparison(interpreter, "<", Ordering::is_lt)
}

fn word_greater(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    comparison(interpreter, ">", Ordering::is_gt)
}

fn word_less_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    comparison(interpreter, "<=", Ordering::is_le)
}

fn word_greater_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    comparison(interpreter, ">=", Ordering::is_ge)
}

/// Compare a single number against zero.
fn zero_comparison(
    interpreter: &mut dyn Interpreter,
    word: &str,
    test: fn(Ordering) -> bool,
) -> error::Result<()> {
    interpreter.require(1, word)?;

    let value = interpreter.pop()?;

    if !value.is_numeric() {
        return Err(ForthError::type_mismatch(word, "a number", &value));
    }

    let flag = value.partial_cmp(&Value::Int(0)).is_some_and(test);

    interpreter.push(Value::from_flag(flag));

    Ok(())
}

fn word_zero_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    zero_comparison(interpreter, "0=", Ordering::is_eq)
}

fn word_zero_less(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    zero_comparison(interpreter, "0<", Ordering::is_lt)
}

fn word_zero_greater(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    zero_comparison(interpreter, "0>", Ordering::is_gt)
}

fn word_zero_not_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    zero_comparison(interpreter, "0<>", Ordering::is_ne)
}

fn pop_integer_pair(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<(i64, i64)> {
    let (a, b) = pop_pair(interpreter, word)?;

    match (&a, &b) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        (Value::Int(_), _) => Err(ForthError::type_mismatch(word, "an integer", &b)),
        _ => Err(ForthError::type_mismatch(word, "an integer", &a)),
    }
}

/// Apply a bitwise operation to two integers.
fn bitwise(
    interpreter: &mut dyn Interpreter,
    word: &str,
    operation: fn(i64, i64) -> i64,
) -> error::Result<()> {
    let (a, b) = pop_integer_pair(interpreter, word)?;

    interpreter.push(Value::Int(operation(a, b)));

    Ok(())
}

fn word_and(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    bitwise(interpreter, "AND", |a, b| a & b)
}

fn word_or(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    bitwise(interpreter, "OR", |a, b| a | b)
}

fn word_xor(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    bitwise(interpreter, "XOR", |a, b| a ^ b)
}

/// Shifting by 64 bits or more clears every bit, or fills them with the sign for a right shift.
fn word_lshift(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    bitwise(interpreter, "LSHIFT", |value, count| match u32::try_from(count) {
        Ok(count) if count < i64::BITS => value << count,
        _ => 0,
    })
}

fn word_rshift(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    bitwise(interpreter, "RSHIFT", |value, count| match u32::try_from(count) {
        Ok(count) if count < i64::BITS => value >> count,
        _ => value >> (i64::BITS - 1),
    })
}

/// Signature: `n -- ~n`
fn word_invert(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "INVERT")?;

    match interpreter.pop()? {
        Value::Int(value) => interpreter.push(Value::Int(!value)),
        other => return Err(ForthError::type_mismatch("INVERT", "an integer", &other)),
    }

    Ok(())
}

fn word_true(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.push(Value::from_flag(true));
    Ok(())
}

fn word_false(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.push(Value::from_flag(false));
    Ok(())
}

/// Logical not.  Any non-zero number is true.
///
/// Signature: `flag -- flag`
fn word_not(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "NOT")?;

    let value = interpreter.pop()?;
    let flag = value
        .as_flag()
        .ok_or_else(|| ForthError::type_mismatch("NOT", "a flag", &value))?;

    interpreter.push(Value::from_flag(!flag));

    Ok(())
}

pub fn register_logic_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, "=", word_equal, "Equal.", "( n1 n2 -- flag )");

    add_native_word!(interpreter, "<>", word_not_equal, "Not equal.", "( n1 n2 -- flag )");

    add_native_word!(interpreter, "<", word_less, "Less than.", "( n1 n2 -- flag )");

    add_native_word!(interpreter, ">", word_greater, "Greater than.", "( n1 n2 -- flag )");

    add_native_word!(
        interpreter,
        "<=",
        word_less_equal,
        "Less than or equal.",
        "( n1 n2 -- flag )"
    );

    add_native_word!(
        interpreter,
        ">=",
        word_greater_equal,
        "Greater than or equal.",
        "( n1 n2 -- flag )"
    );

    add_native_word!(interpreter, "0=", word_zero_equal, "Equal to zero.", "( n -- flag )");

    add_native_word!(interpreter, "0<", word_zero_less, "Less than zero.", "( n -- flag )");

    add_native_word!(interpreter, "0>", word_zero_greater, "Greater than zero.", "( n -- flag )");

    add_native_word!(
        interpreter,
        "0<>",
        word_zero_not_equal,
        "Not equal to zero.",
        "( n -- flag )"
    );

    add_native_word!(interpreter, "AND", word_and, "Bitwise AND.", "( n1 n2 -- n )");

    add_native_word!(interpreter, "OR", word_or, "Bitwise OR.", "( n1 n2 -- n )");

    add_native_word!(interpreter, "XOR", word_xor, "Bitwise XOR.", "( n1 n2 -- n )");

    add_native_word!(interpreter, "INVERT", word_invert, "Bitwise NOT.", "( n -- ~n )");

    add_native_word!(interpreter, "LSHIFT", word_lshift, "Left shift.", "( n1 n2 -- n )");

    add_native_word!(interpreter, "RSHIFT", word_rshift, "Right shift.", "( n1 n2 -- n )");

    add_native_word!(interpreter, "TRUE", word_true, "Push true flag.", "( -- -1 )");

    add_native_word!(interpreter, "FALSE", word_false, "Push false flag.", "( -- 0 )");

    add_native_word!(interpreter, "NOT", word_not, "Logical NOT.", "( flag -- flag )");
}
