#![allow(dead_code)]

use fable::{Config, EventLog, ForthInterpreter, InterpreterStack, Value};
use std::path::{Path, PathBuf};

/// An interpreter using the bundled libraries, with a log recording its events.
pub fn interpreter() -> (ForthInterpreter, EventLog) {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    interpreter_with_user_libraries(&manifest.join("target").join("test-user-libraries"))
}

pub fn interpreter_with_user_libraries(user_libraries: &Path) -> (ForthInterpreter, EventLog) {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config::new(manifest.join("libraries"), user_libraries.to_path_buf());

    let mut interpreter = ForthInterpreter::with_config(config);
    let log = EventLog::new();

    interpreter.add_observer(Box::new(log.clone()));

    (interpreter, log)
}

/// Evaluate the source and return the resulting stack, panicking on an error.
pub async fn stack_after(source: &str) -> Vec<Value> {
    let (mut interpreter, _) = interpreter();

    interpreter.evaluate(source).await.expect("evaluation failed");
    interpreter.stack().clone()
}

/// Evaluate the source and return everything it printed.
pub async fn output_of(source: &str) -> String {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate(source).await.expect("evaluation failed");
    log.output()
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|value| Value::Int(*value)).collect()
}
