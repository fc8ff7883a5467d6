use crate::{
    add_native_word,
    runtime::{
        data_structures::value::Value,
        error::{self, ForthError},
        interpreter::Interpreter,
    },
};
use std::cmp::Ordering;

/// Two numeric operands, promoted to float if either one is.
enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(value) => Some(*value as f64),
        Value::Float(value) => Some(*value),
        Value::String(_) => None,
    }
}

fn operands(word: &str, a: &Value, b: &Value) -> error::Result<Operands> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Operands::Ints(*a, *b)),

        _ => {
            let left = as_float(a).ok_or_else(|| ForthError::type_mismatch(word, "a number", a))?;
            let right = as_float(b).ok_or_else(|| ForthError::type_mismatch(word, "a number", b))?;

            Ok(Operands::Floats(left, right))
        }
    }
}

/// Pop the two operands of a binary word, `a` was pushed first.
fn pop_pair(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<(Value, Value)> {
    interpreter.require(2, word)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    Ok((a, b))
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Int(value) => *value == 0,
        Value::Float(value) => *value == 0.0,
        Value::String(_) => false,
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);

    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let remainder = a.wrapping_rem(b);

    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        remainder + b
    } else {
        remainder
    }
}

fn float_mod(a: f64, b: f64) -> f64 {
    let remainder = a % b;

    if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
        remainder + b
    } else {
        remainder
    }
}

fn add_values(word: &str, a: Value, b: Value) -> error::Result<Value> {
    if let (Value::String(a), Value::String(b)) = (&a, &b) {
        return Ok(Value::String(format!("{}{}", a, b)));
    }

    Ok(match operands(word, &a, &b)? {
        Operands::Ints(a, b) => Value::Int(a.wrapping_add(b)),
        Operands::Floats(a, b) => Value::Float(a + b),
    })
}

fn subtract_values(word: &str, a: Value, b: Value) -> error::Result<Value> {
    Ok(match operands(word, &a, &b)? {
        Operands::Ints(a, b) => Value::Int(a.wrapping_sub(b)),
        Operands::Floats(a, b) => Value::Float(a - b),
    })
}

/// Pop the divisor and dividend, failing if the divisor is zero.  Both are consumed either way.
fn pop_division(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<Operands> {
    let (a, b) = pop_pair(interpreter, word)?;
    let operands = operands(word, &a, &b)?;

    if is_zero(&b) {
        return Err(ForthError::DivisionByZero { dividend: a });
    }

    Ok(operands)
}

/// Signature: `a b -- a+b`
fn word_add(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, "+")?;

    interpreter.push(add_values("+", a, b)?);

    Ok(())
}

/// Signature: `a b -- a-b`
fn word_subtract(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, "-")?;

    interpreter.push(subtract_values("-", a, b)?);

    Ok(())
}

/// Signature: `a b -- a*b`
fn word_multiply(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, "*")?;

    let result = match operands("*", &a, &b)? {
        Operands::Ints(a, b) => Value::Int(a.wrapping_mul(b)),
        Operands::Floats(a, b) => Value::Float(a * b),
    };

    interpreter.push(result);

    Ok(())
}

/// Integer division rounds towards negative infinity.
///
/// Signature: `a b -- a/b`
fn word_divide(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_division(interpreter, "/")? {
        Operands::Ints(a, b) => Value::Int(floor_div(a, b)),
        Operands::Floats(a, b) => Value::Float(a / b),
    };

    interpreter.push(result);

    Ok(())
}

/// The remainder takes the sign of the divisor.
///
/// Signature: `a b -- remainder`
fn word_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_division(interpreter, "MOD")? {
        Operands::Ints(a, b) => Value::Int(floor_mod(a, b)),
        Operands::Floats(a, b) => Value::Float(float_mod(a, b)),
    };

    interpreter.push(result);

    Ok(())
}

/// Signature: `a b -- remainder quotient`
fn word_divide_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (remainder, quotient) = match pop_division(interpreter, "/MOD")? {
        Operands::Ints(a, b) => (Value::Int(floor_mod(a, b)), Value::Int(floor_div(a, b))),
        Operands::Floats(a, b) => (Value::Float(float_mod(a, b)), Value::Float((a / b).floor())),
    };

    interpreter.push(remainder);
    interpreter.push(quotient);

    Ok(())
}

fn pop_number(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<Value> {
    interpreter.require(1, word)?;

    let value = interpreter.pop()?;

    if !value.is_numeric() {
        return Err(ForthError::type_mismatch(word, "a number", &value));
    }

    Ok(value)
}

/// Signature: `n -- -n`
fn word_negate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_number(interpreter, "NEGATE")? {
        Value::Int(value) => Value::Int(value.wrapping_neg()),
        Value::Float(value) => Value::Float(-value),
        other => other,
    };

    interpreter.push(result);

    Ok(())
}

/// Signature: `n -- |n|`
fn word_abs(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let result = match pop_number(interpreter, "ABS")? {
        Value::Int(value) => Value::Int(value.wrapping_abs()),
        Value::Float(value) => Value::Float(value.abs()),
        other => other,
    };

    interpreter.push(result);

    Ok(())
}

/// Keep whichever of the two numbers `keep` picks, in its original type.
fn min_max(
    interpreter: &mut dyn Interpreter,
    word: &str,
    keep: Ordering,
) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter, word)?;

    let _ = operands(word, &a, &b)?;

    let result = if a.partial_cmp(&b) == Some(keep) { a } else { b };

    interpreter.push(result);

    Ok(())
}

/// Signature: `a b -- min`
fn word_min(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    min_max(interpreter, "MIN", Ordering::Less)
}

/// Signature: `a b -- max`
fn word_max(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    min_max(interpreter, "MAX", Ordering::Greater)
}

fn add_constant(interpreter: &mut dyn Interpreter, word: &str, amount: i64) -> error::Result<()> {
    let value = pop_number(interpreter, word)?;

    interpreter.push(add_values(word, value, Value::Int(amount))?);

    Ok(())
}

fn word_one_plus(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    add_constant(interpreter, "1+", 1)
}

fn word_one_minus(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    add_constant(interpreter, "1-", -1)
}

fn word_two_plus(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    add_constant(interpreter, "2+", 2)
}

fn word_two_minus(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    add_constant(interpreter, "2-", -2)
}

fn pop_integer(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<i64> {
    interpreter.require(1, word)?;

    match interpreter.pop()? {
        Value::Int(value) => Ok(value),
        other => Err(ForthError::type_mismatch(word, "an integer", &other)),
    }
}

/// Signature: `n -- n*2`
fn word_two_star(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = pop_integer(interpreter, "2*")?;

    interpreter.push(Value::Int(value.wrapping_shl(1)));

    Ok(())
}

/// Arithmetic shift, so negative numbers stay negative.
///
/// Signature: `n -- n/2`
fn word_two_slash(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = pop_integer(interpreter, "2/")?;

    interpreter.push(Value::Int(value >> 1));

    Ok(())
}

pub fn register_arithmetic_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, "+", word_add, "Addition.", "( n1 n2 -- sum )");

    add_native_word!(interpreter, "-", word_subtract, "Subtraction.", "( n1 n2 -- diff )");

    add_native_word!(interpreter, "*", word_multiply, "Multiplication.", "( n1 n2 -- prod )");

    add_native_word!(interpreter, "/", word_divide, "Division.", "( n1 n2 -- quot )");

    add_native_word!(interpreter, "MOD", word_mod, "Modulo.", "( n1 n2 -- rem )");

    add_native_word!(
        interpreter,
        "/MOD",
        word_divide_mod,
        "Division with remainder.",
        "( n1 n2 -- rem quot )"
    );

    add_native_word!(interpreter, "NEGATE", word_negate, "Negate.", "( n -- -n )");

    add_native_word!(interpreter, "ABS", word_abs, "Absolute value.", "( n -- |n| )");

    add_native_word!(interpreter, "MIN", word_min, "Minimum.", "( n1 n2 -- min )");

    add_native_word!(interpreter, "MAX", word_max, "Maximum.", "( n1 n2 -- max )");

    add_native_word!(interpreter, "1+", word_one_plus, "Increment.", "( n -- n+1 )");

    add_native_word!(interpreter, "1-", word_one_minus, "Decrement.", "( n -- n-1 )");

    add_native_word!(interpreter, "2+", word_two_plus, "Add two.", "( n -- n+2 )");

    add_native_word!(interpreter, "2-", word_two_minus, "Subtract two.", "( n -- n-2 )");

    add_native_word!(interpreter, "2*", word_two_star, "Double.", "( n -- n*2 )");

    add_native_word!(interpreter, "2/", word_two_slash, "Halve.", "( n -- n/2 )");
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(7, 2, 3, 1 ; "positive")]
    #[test_case(-7, 2, -4, 1 ; "negative dividend")]
    #[test_case(7, -2, -4, -1 ; "negative divisor")]
    #[test_case(-7, -2, 3, -1 ; "both negative")]
    fn floor_division(a: i64, b: i64, quotient: i64, remainder: i64) {
        assert_eq!(floor_div(a, b), quotient);
        assert_eq!(floor_mod(a, b), remainder);
    }

    #[test]
    fn minimum_overflow_wraps() {
        assert_eq!(floor_div(i64::MIN, -1), i64::MIN);
        assert_eq!(floor_mod(i64::MIN, -1), 0);
    }
}
