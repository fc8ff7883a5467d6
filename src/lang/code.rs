use crate::runtime::data_structures::value::Value;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

/// The instructions a compiled word's body is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Push a copy of the value onto the data stack.
    PushLiteral(Value),

    /// Send the text to the output, the compiled form of `."`.
    PrintString(String),

    /// Jump to an absolute index in the same body.  The target is `None` until the closing control
    /// word patches it.
    Jump(Option<usize>),

    /// Pop a flag and jump to the absolute index if it is zero.  Unpatched while `None`.
    JumpIfZero(Option<usize>),

    /// `DO`, pops the start index and then the limit and opens a new loop frame.
    LoopStart,

    /// `LOOP`, the value is the index of the first instruction of the loop body.
    LoopEnd(usize),

    /// `+LOOP`, like `LoopEnd` but the increment is popped from the data stack.
    PlusLoopEnd(usize),

    /// `I`, push the innermost loop's index.
    LoopIndex,

    /// `J`, push the next outer loop's index.
    OuterLoopIndex,

    /// Drop the innermost loop frame without leaving the loop.
    Unloop,

    /// Drop the innermost loop frame and continue after its loop end.
    Leave,

    /// Return from the word being executed.
    Exit,

    /// Call a word by name.  The name is looked up when the instruction runs, not when it was
    /// compiled.
    Execute(String),
}

/// Allow for pretty printing of the instruction and it's value.
impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fn target(value: &Option<usize>) -> String {
            match value {
                Some(index) => index.to_string(),
                None => "<unpatched>".to_string(),
            }
        }

        match self {
            Op::PushLiteral(value) => match value {
                Value::String(text) => write!(f, "PushLiteral  {:?}", text),
                _ => write!(f, "PushLiteral  {}", value),
            },
            Op::PrintString(text) => write!(f, "PrintString  {:?}", text),
            Op::Jump(index) => write!(f, "Jump         {}", target(index)),
            Op::JumpIfZero(index) => write!(f, "JumpIfZero   {}", target(index)),
            Op::LoopStart => write!(f, "LoopStart"),
            Op::LoopEnd(index) => write!(f, "LoopEnd      {}", index),
            Op::PlusLoopEnd(index) => write!(f, "PlusLoopEnd  {}", index),
            Op::LoopIndex => write!(f, "LoopIndex"),
            Op::OuterLoopIndex => write!(f, "OuterLoopIndex"),
            Op::Unloop => write!(f, "Unloop"),
            Op::Leave => write!(f, "Leave"),
            Op::Exit => write!(f, "Exit"),
            Op::Execute(name) => write!(f, "Execute      {}", name),
        }
    }
}

impl Op {
    /// Does this instruction still have a branch target waiting to be patched?
    pub fn is_unpatched(&self) -> bool {
        matches!(self, Op::Jump(None) | Op::JumpIfZero(None))
    }
}

/// The body of a compiled word.
pub type ByteCode = Vec<Op>;

/// Pretty print the byte code for debugging purposes.
pub fn pretty_print_code(code: &ByteCode) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(code.len() * 20);

    for (index, op) in code.iter().enumerate() {
        let _ = writeln!(&mut result, "{:4}: {}", index, op);
    }

    result
}

/// What role a conditional branch played in the source it was compiled from.
#[derive(Clone, Copy, PartialEq)]
enum BranchRole {
    IfElse,
    While,
}

/// Turn a compiled body back into Forth source that compiles to the same code.  Control words are
/// rebuilt from the branch targets: a forward `Jump` is an `ELSE` and a backward one a `REPEAT`, the
/// conditional branch those two close over is the innermost one that targets the instruction just
/// after them.  Backward conditional branches are `UNTIL`s.
pub fn decompile_code(code: &[Op]) -> String {
    // Pair each ELSE and REPEAT jump with the IF or WHILE it closes.
    let mut roles: HashMap<usize, BranchRole> = HashMap::new();

    for (index, op) in code.iter().enumerate() {
        if let Op::Jump(Some(target)) = op {
            let role = if *target > index {
                BranchRole::IfElse
            } else {
                BranchRole::While
            };

            let opener = (0..index).rev().find(|candidate| {
                !roles.contains_key(candidate)
                    && code[*candidate] == Op::JumpIfZero(Some(index + 1))
            });

            if let Some(opener) = opener {
                let _ = roles.insert(opener, role);
            }
        }
    }

    // Count the THEN and BEGIN markers that land before each instruction.
    let mut thens = vec![0usize; code.len() + 1];
    let mut begins = vec![0usize; code.len() + 1];

    for (index, op) in code.iter().enumerate() {
        match op {
            Op::JumpIfZero(Some(target)) if *target <= index => begins[*target] += 1,
            Op::JumpIfZero(Some(target)) if roles.get(&index).is_none() => {
                if *target <= code.len() {
                    thens[*target] += 1;
                }
            }
            Op::Jump(Some(target)) if *target <= index => begins[*target] += 1,
            Op::Jump(Some(target)) => {
                if *target <= code.len() {
                    thens[*target] += 1;
                }
            }
            _ => {}
        }
    }

    let mut words: Vec<String> = Vec::new();

    for index in 0..=code.len() {
        words.extend(std::iter::repeat_n("THEN".to_string(), thens[index]));
        words.extend(std::iter::repeat_n("BEGIN".to_string(), begins[index]));

        let Some(op) = code.get(index) else {
            break;
        };

        let word = match op {
            Op::PushLiteral(value) => value.to_source(),
            Op::PrintString(text) => format!(".\" {}\"", text),
            Op::JumpIfZero(Some(target)) if *target <= index => "UNTIL".to_string(),
            Op::JumpIfZero(_) => match roles.get(&index) {
                Some(BranchRole::While) => "WHILE".to_string(),
                _ => "IF".to_string(),
            },
            Op::Jump(Some(target)) if *target <= index => "REPEAT".to_string(),
            Op::Jump(_) => "ELSE".to_string(),
            Op::LoopStart => "DO".to_string(),
            Op::LoopEnd(_) => "LOOP".to_string(),
            Op::PlusLoopEnd(_) => "+LOOP".to_string(),
            Op::LoopIndex => "I".to_string(),
            Op::OuterLoopIndex => "J".to_string(),
            Op::Unloop => "UNLOOP".to_string(),
            Op::Leave => "LEAVE".to_string(),
            Op::Exit => "EXIT".to_string(),
            Op::Execute(name) => name.clone(),
        };

        words.push(word);
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(name: &str) -> Op {
        Op::Execute(name.to_string())
    }

    #[test]
    fn if_else_then() {
        let code = vec![
            Op::JumpIfZero(Some(3)),
            Op::PushLiteral(Value::Int(1)),
            Op::Jump(Some(4)),
            Op::PushLiteral(Value::Int(2)),
            exec("."),
        ];

        assert_eq!(decompile_code(&code), "IF 1 ELSE 2 THEN .");
    }

    #[test]
    fn begin_while_repeat() {
        let code = vec![
            exec("DUP"),
            Op::JumpIfZero(Some(5)),
            Op::PushLiteral(Value::Int(1)),
            exec("-"),
            Op::Jump(Some(0)),
        ];

        assert_eq!(decompile_code(&code), "BEGIN DUP WHILE 1 - REPEAT");
    }

    #[test]
    fn nested_if_sharing_a_target() {
        // IF IF 7 ELSE THEN THEN
        let code = vec![
            Op::JumpIfZero(Some(4)),
            Op::JumpIfZero(Some(4)),
            Op::PushLiteral(Value::Int(7)),
            Op::Jump(Some(4)),
        ];

        assert_eq!(decompile_code(&code), "IF IF 7 ELSE THEN THEN");
    }

    #[test]
    fn until_and_loops() {
        let code = vec![
            exec("1-"),
            exec("DUP"),
            Op::JumpIfZero(Some(0)),
            Op::LoopStart,
            Op::LoopIndex,
            Op::PrintString("x".to_string()),
            Op::LoopEnd(4),
        ];

        assert_eq!(decompile_code(&code), "BEGIN 1- DUP UNTIL DO I .\" x\" LOOP");
    }
}
