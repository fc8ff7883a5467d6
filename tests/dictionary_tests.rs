mod common;

use common::{interpreter, ints};
use fable::{ForthError, InterpreterStack, WordManagement};

#[tokio::test]
async fn forget_removes_the_word_and_everything_after_it() {
    let (mut interpreter, _) = interpreter();

    interpreter.evaluate(": A 1 ; : B 2 ; : C 3 ; FORGET b").await.unwrap();

    let dictionary = interpreter.dictionary();

    assert!(dictionary.contains("A"));
    assert!(!dictionary.contains("B"));
    assert!(!dictionary.contains("C"));
    assert!(dictionary.contains("DUP"));
}

#[tokio::test]
async fn forget_unknown_word_fails() {
    let (mut interpreter, _) = interpreter();

    let result = interpreter.evaluate("FORGET NOWHERE").await;

    assert!(matches!(result, Err(ForthError::UnknownWord { word, .. }) if word == "NOWHERE"));
}

#[tokio::test]
async fn words_prints_five_columns() {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate("WORDS").await.unwrap();

    let output = log.output();
    let first_line = output.lines().next().unwrap_or_default();

    assert_eq!(first_line, format!("{:<15}{:<15}{:<15}{:<15}{:<15}", "DUP", "DROP", "SWAP", "OVER", "ROT"));
    assert!(output.ends_with('\n'));
    assert!(output.contains("SAVE-LIBRARY"));
}

#[tokio::test]
async fn new_words_are_listed_last() {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate(": ZEBRA ; WORDS").await.unwrap();

    let names: Vec<String> = log.output().split_whitespace().map(str::to_string).collect();

    assert_eq!(names.last().map(String::as_str), Some("ZEBRA"));
}

#[tokio::test]
async fn see_shows_a_compiled_word() {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate(": SQUARE DUP * ;").await.unwrap();
    log.clear();
    interpreter.evaluate("see square").await.unwrap();

    assert_eq!(log.output(), ": SQUARE\n  DUP * ;\n");
}

#[tokio::test]
async fn see_shows_a_primitive() {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate("SEE DUP").await.unwrap();

    assert_eq!(log.output(), ": DUP ( primitive ) ; ( a -- a a )\n");
}

#[tokio::test]
async fn compiled_see_reads_its_name_when_run() {
    let (mut interpreter, log) = interpreter();

    interpreter.evaluate(": SHOW SEE ;").await.unwrap();
    assert!(log.output().is_empty());

    interpreter.evaluate("SHOW DUP").await.unwrap();

    assert_eq!(log.output(), ": DUP ( primitive ) ; ( a -- a a )\n");
    assert!(interpreter.stack().is_empty());
}

#[tokio::test]
async fn see_unknown_word_fails_with_suggestions() {
    let (mut interpreter, _) = interpreter();

    match interpreter.evaluate("SEE SWAPP").await {
        Err(ForthError::UnknownWord { word, suggestions }) => {
            assert_eq!(word, "SWAPP");
            assert!(suggestions.contains(&"SWAP".to_string()));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn decompiled_source_compiles_to_the_same_word() {
    let source = ": MIX ( n -- ) DUP 0< IF DROP .\" negative\" ELSE \
                  BEGIN DUP 0> WHILE DUP . 1- REPEAT DROP THEN \
                  3 0 DO I . 2 +LOOP S\" end\" 3 TYPE ;";

    let (mut original, original_log) = interpreter();

    original.evaluate(source).await.unwrap();
    original.evaluate("SEE MIX").await.unwrap();

    let decompiled = original_log.output();

    let (mut copy, copy_log) = interpreter();

    copy.evaluate(&decompiled).await.unwrap();
    copy.evaluate("SEE MIX").await.unwrap();

    assert_eq!(copy_log.output(), decompiled);
    assert_eq!(copy.stack_effect("MIX").as_deref(), Some("( n -- )"));

    original_log.clear();
    copy_log.clear();

    original.evaluate("3 MIX -1 MIX").await.unwrap();
    copy.evaluate("3 MIX -1 MIX").await.unwrap();

    assert_eq!(original_log.output(), "3 2 1 0 2 endnegative0 2 end");
    assert_eq!(copy_log.output(), original_log.output());
    assert_eq!(copy.stack(), &ints(&[]));
}
