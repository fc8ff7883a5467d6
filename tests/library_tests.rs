mod common;

use common::{interpreter_with_user_libraries, ints};
use fable::{ForthError, Interpreter, InterpreterStack, Outcome, WordManagement};
use std::{env::current_dir, fs, path::PathBuf};
use tempfile::tempdir;
use test_case::test_case;

fn bundled_libraries() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("libraries")
}

#[tokio::test]
async fn include_loads_a_bundled_library() {
    let user = tempdir().unwrap();
    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    interpreter.evaluate("S\" math-extended.fth\" INCLUDE").await.unwrap();

    assert_eq!(
        log.output(),
        "Loading library: math-extended.fth\nLibrary 'math-extended.fth' loaded successfully.\n"
    );
    assert!(interpreter.dictionary().contains("SQUARE"));
    assert_eq!(interpreter.loaded_libraries().len(), 1);

    log.clear();
    interpreter.evaluate("S\" math-extended.fth\" INCLUDE").await.unwrap();

    assert_eq!(log.output(), "Library 'math-extended.fth' already loaded.\n");
}

#[tokio::test]
async fn include_reports_a_missing_file() {
    let user = tempdir().unwrap();
    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    interpreter.evaluate("S\" nowhere.fth\" INCLUDE").await.unwrap();

    let expected = format!(
        "Error: Library file 'nowhere.fth' not found in search paths:\n  - {}\n  - {}\n  - {}\n",
        current_dir().unwrap().display(),
        user.path().display(),
        bundled_libraries().display()
    );

    assert_eq!(log.output(), expected);
    assert!(interpreter.loaded_libraries().is_empty());
}

#[tokio::test]
async fn include_needs_a_string() {
    let user = tempdir().unwrap();
    let (mut interpreter, _) = interpreter_with_user_libraries(user.path());

    let result = interpreter.evaluate("5 INCLUDE").await;

    assert!(matches!(result, Err(ForthError::TypeMismatch { word, .. }) if word == "INCLUDE"));
}

#[test_case("5 FACTORIAL", &[120] ; "factorial")]
#[test_case("0 FACTORIAL", &[1] ; "factorial of zero")]
#[test_case("2 10 POWER", &[1024] ; "power")]
#[test_case("3 0 POWER", &[1] ; "power of zero")]
#[test_case("48 18 GCD", &[6] ; "gcd")]
#[test_case("-7 SIGN 0 SIGN 9 SIGN", &[-1, 0, 1] ; "sign")]
#[test_case("4 EVEN? 3 EVEN?", &[-1, 0] ; "even")]
#[test_case("3 ODD?", &[-1] ; "odd")]
#[test_case("3 CUBE", &[27] ; "cube")]
#[tokio::test]
async fn math_library_words(source: &str, expected: &[i64]) {
    let user = tempdir().unwrap();
    let (mut interpreter, _) = interpreter_with_user_libraries(user.path());

    interpreter.evaluate("S\" math-extended.fth\" INCLUDE").await.unwrap();
    interpreter.evaluate(source).await.unwrap();

    assert_eq!(interpreter.stack(), &ints(expected));
}

#[tokio::test]
async fn saved_library_can_be_included_again() {
    let user = tempdir().unwrap();
    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    interpreter
        .evaluate(": SQUARE ( n -- n*n ) DUP * ; : CUBE DUP SQUARE * ; S\" mine\" SAVE-LIBRARY")
        .await
        .unwrap();

    let path = user.path().join("mine.fth");

    assert_eq!(log.output(), format!("Saved 2 word(s) to: {}\n", path.display()));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "\\ Library: mine.fth\n\
         \\ Auto-generated by FABLE\n\
         \\ Contains 2 word(s)\n\
         \n\
         : SQUARE ( n -- n*n )\n  DUP * ;\n\
         \n\
         : CUBE\n  DUP SQUARE * ;\n"
    );

    let (mut fresh, _) = interpreter_with_user_libraries(user.path());

    fresh.evaluate("S\" mine.fth\" INCLUDE 3 CUBE").await.unwrap();

    assert_eq!(fresh.stack(), &ints(&[27]));
    assert_eq!(fresh.stack_effect("SQUARE").as_deref(), Some("( n -- n*n )"));
}

#[tokio::test]
async fn nothing_to_save() {
    let user = tempdir().unwrap();
    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    interpreter.evaluate("S\" empty\" SAVE-LIBRARY").await.unwrap();

    assert_eq!(log.output(), "No user-defined words to save.\n");
    assert!(!user.path().join("empty.fth").exists());
}

#[tokio::test]
async fn loaded_libraries_lists_names() {
    let user = tempdir().unwrap();
    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    interpreter.evaluate("LOADED-LIBRARIES").await.unwrap();
    assert_eq!(log.output(), "No libraries loaded.\n");

    interpreter.evaluate("S\" math-extended.fth\" INCLUDE").await.unwrap();
    log.clear();

    interpreter.evaluate("LOADED-LIBRARIES").await.unwrap();
    assert_eq!(log.output(), "Loaded libraries:\n  math-extended.fth\n");
}

#[tokio::test]
async fn library_path_shows_each_directory() {
    let user = tempdir().unwrap();
    let missing = user.path().join("not-yet");
    let (mut interpreter, log) = interpreter_with_user_libraries(&missing);

    interpreter.evaluate("LIBRARY-PATH").await.unwrap();

    let expected = format!(
        "Library search paths:\n  1. {}\n  2. {} (not created yet)\n  3. {} ✓\n",
        current_dir().unwrap().display(),
        missing.display(),
        bundled_libraries().display()
    );

    assert_eq!(log.output(), expected);
}

#[tokio::test]
async fn failing_library_can_be_loaded_again() {
    let user = tempdir().unwrap();
    fs::write(user.path().join("broken.fth"), ": GOOD 1 ;\nNOSUCHWORD\n").unwrap();

    let (mut interpreter, log) = interpreter_with_user_libraries(user.path());

    let result = interpreter.evaluate("S\" broken.fth\" INCLUDE").await;

    assert!(matches!(result, Err(ForthError::UnknownWord { word, .. }) if word == "NOSUCHWORD"));
    assert!(interpreter.loaded_libraries().is_empty());
    assert!(interpreter.dictionary().contains("GOOD"));
    assert_eq!(log.errors().len(), 1);
    assert!(!log.output().contains("loaded successfully"));

    fs::write(user.path().join("broken.fth"), ": GOOD 2 ;\n").unwrap();

    assert_eq!(
        interpreter.evaluate("S\" broken.fth\" INCLUDE GOOD").await,
        Ok(Outcome::Completed)
    );
    assert_eq!(interpreter.stack(), &ints(&[2]));
}
