use crate::{
    add_native_immediate_word,
    lang::code::Op,
    runtime::{
        error::{self, ForthError},
        interpreter::{ControlKind, Interpreter},
    },
};

/// Take back a position pushed by an opening word, checking that it refers to an unpatched
/// branch that `accepts` allows.
fn pop_branch(
    interpreter: &mut dyn Interpreter,
    word: &str,
    missing: &str,
    accepts: fn(&Op) -> bool,
) -> error::Result<usize> {
    let position = interpreter.pop_control(ControlKind::Branch, word, missing)?;

    match interpreter.definition_mut().get(position) {
        Some(op) if op.is_unpatched() && accepts(op) => Ok(position),
        _ => Err(ForthError::control_structure(word, missing)),
    }
}

/// Take back the position a `BEGIN` left for its closing word.
fn pop_loop_start(interpreter: &mut dyn Interpreter, word: &str, missing: &str) -> error::Result<usize> {
    interpreter.pop_control(ControlKind::Begin, word, missing)
}

fn patch(interpreter: &mut dyn Interpreter, position: usize, op: Op) -> error::Result<()> {
    let word = interpreter.current_word().to_string();

    match interpreter.definition_mut().get_mut(position) {
        Some(slot) => {
            *slot = op;
            Ok(())
        }
        None => Err(ForthError::control_structure(&word, "IF")),
    }
}

fn is_conditional(op: &Op) -> bool {
    matches!(op, Op::JumpIfZero(_))
}

fn is_any_branch(op: &Op) -> bool {
    matches!(op, Op::JumpIfZero(_) | Op::Jump(_))
}

fn word_if(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let position = interpreter.here();

    interpreter.insert_instruction(Op::JumpIfZero(None));
    interpreter.push_control(position, ControlKind::Branch);

    Ok(())
}

/// The false branch of the `IF` now jumps past the new unconditional branch.
fn word_else(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let if_position = pop_branch(interpreter, "ELSE", "IF", is_conditional)?;
    let position = interpreter.here();

    interpreter.insert_instruction(Op::Jump(None));
    patch(interpreter, if_position, Op::JumpIfZero(Some(position + 1)))?;
    interpreter.push_control(position, ControlKind::Branch);

    Ok(())
}

fn word_then(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let position = pop_branch(interpreter, "THEN", "IF", is_any_branch)?;
    let here = interpreter.here();

    let resolved = match interpreter.definition_mut().get(position) {
        Some(Op::Jump(_)) => Op::Jump(Some(here)),
        _ => Op::JumpIfZero(Some(here)),
    };

    patch(interpreter, position, resolved)
}

fn word_begin(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let here = interpreter.here();
    interpreter.push_control(here, ControlKind::Begin);

    Ok(())
}

/// Loop back to the `BEGIN` while the flag is false.
fn word_until(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let begin = pop_loop_start(interpreter, "UNTIL", "BEGIN")?;

    interpreter.insert_instruction(Op::JumpIfZero(Some(begin)));

    Ok(())
}

/// The `BEGIN` position stays on the scratch stack under the `WHILE`.
fn word_while(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let begin = pop_loop_start(interpreter, "WHILE", "BEGIN")?;
    let position = interpreter.here();

    interpreter.push_control(begin, ControlKind::Begin);
    interpreter.insert_instruction(Op::JumpIfZero(None));
    interpreter.push_control(position, ControlKind::Branch);

    Ok(())
}

fn word_repeat(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let while_position = pop_branch(interpreter, "REPEAT", "WHILE", is_conditional)?;
    let begin = pop_loop_start(interpreter, "REPEAT", "BEGIN")?;

    interpreter.insert_instruction(Op::Jump(Some(begin)));

    let here = interpreter.here();
    patch(interpreter, while_position, Op::JumpIfZero(Some(here)))
}

/// The loop body starts right after the loop start instruction.
fn word_do(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    interpreter.insert_instruction(Op::LoopStart);

    let body = interpreter.here();
    interpreter.push_control(body, ControlKind::Do);

    Ok(())
}

fn word_loop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let body = interpreter.pop_control(ControlKind::Do, "LOOP", "DO")?;
    interpreter.insert_instruction(Op::LoopEnd(body));

    Ok(())
}

fn word_plus_loop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return Ok(());
    }

    let body = interpreter.pop_control(ControlKind::Do, "+LOOP", "DO")?;
    interpreter.insert_instruction(Op::PlusLoopEnd(body));

    Ok(())
}

/// Compile a marker instruction that needs no operand.
fn compile_marker(interpreter: &mut dyn Interpreter, op: Op) -> error::Result<()> {
    if interpreter.is_compiling() {
        interpreter.insert_instruction(op);
    }

    Ok(())
}

fn word_i(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_marker(interpreter, Op::LoopIndex)
}

fn word_j(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_marker(interpreter, Op::OuterLoopIndex)
}

fn word_leave(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_marker(interpreter, Op::Leave)
}

fn word_unloop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_marker(interpreter, Op::Unloop)
}

fn word_exit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_marker(interpreter, Op::Exit)
}

pub fn register_control_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        "IF",
        word_if,
        "Start conditional, runs the following code if the flag is true.",
        "( flag -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "ELSE",
        word_else,
        "Code to run when the IF flag was false.",
        "( -- )"
    );

    add_native_immediate_word!(interpreter, "THEN", word_then, "End conditional.", "( -- )");

    add_native_immediate_word!(
        interpreter,
        "BEGIN",
        word_begin,
        "Start indefinite loop.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "UNTIL",
        word_until,
        "End BEGIN loop, repeats until the flag is true.",
        "( flag -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "WHILE",
        word_while,
        "Mid-loop test, leaves the loop when the flag is false.",
        "( flag -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "REPEAT",
        word_repeat,
        "End BEGIN WHILE loop.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "DO",
        word_do,
        "Start counted loop.",
        "( limit index -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "LOOP",
        word_loop,
        "End DO loop, adding one to the index.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "+LOOP",
        word_plus_loop,
        "End DO loop with custom increment.",
        "( n -- )"
    );

    add_native_immediate_word!(interpreter, "I", word_i, "Push current loop index.", "( -- n )");

    add_native_immediate_word!(interpreter, "J", word_j, "Push outer loop index.", "( -- n )");

    add_native_immediate_word!(
        interpreter,
        "LEAVE",
        word_leave,
        "Exit loop immediately.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "UNLOOP",
        word_unloop,
        "Discard loop parameters.",
        "( -- )"
    );

    add_native_immediate_word!(
        interpreter,
        "EXIT",
        word_exit,
        "Exit the current word immediately.",
        "( -- )"
    );
}
