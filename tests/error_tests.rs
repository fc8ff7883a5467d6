mod common;

use common::{interpreter, ints};
use fable::{CodeManagement, ForthError, InterpreterStack, Value, WordManagement};
use test_case::test_case;

async fn error_of(source: &str) -> ForthError {
    let (mut interpreter, _) = interpreter();

    match interpreter.evaluate(source).await {
        Err(error) => error,
        Ok(outcome) => panic!("expected an error from {:?}, got {:?}", source, outcome),
    }
}

#[tokio::test]
async fn add_on_empty_stack_underflows() {
    assert_eq!(error_of("+").await, ForthError::stack_underflow("+", 2, 0));
}

#[tokio::test]
async fn underflow_names_the_word() {
    assert_eq!(error_of("1 ROT").await, ForthError::stack_underflow("ROT", 3, 1));
}

#[tokio::test]
async fn empty_return_stack_underflows() {
    assert_eq!(error_of("R>").await, ForthError::stack_underflow("R>", 1, 0));
}

#[tokio::test]
async fn division_by_zero_consumes_both_operands() {
    let (mut interpreter, _) = interpreter();

    let result = interpreter.evaluate("10 0 /").await;

    assert_eq!(result, Err(ForthError::DivisionByZero { dividend: Value::Int(10) }));
    assert!(interpreter.stack().is_empty());
}

#[test_case("7 0 MOD" ; "modulo")]
#[test_case("7 0 /MOD" ; "divide mod")]
#[test_case("7 0.0 /" ; "float zero")]
#[tokio::test]
async fn every_division_checks_for_zero(source: &str) {
    assert!(matches!(error_of(source).await, ForthError::DivisionByZero { .. }));
}

#[tokio::test]
async fn unknown_word_suggests_close_names() {
    match error_of("DUPP").await {
        ForthError::UnknownWord { word, suggestions } => {
            assert_eq!(word, "DUPP");
            assert!(suggestions.contains(&"DUP".to_string()));
            assert!(suggestions.len() <= 3);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn broken_number_is_invalid() {
    assert_eq!(
        error_of("12ab$").await,
        ForthError::InvalidNumber { text: "12ab$".to_string() }
    );
}

#[test_case("S\" x\" 1 +", "+" ; "string plus number")]
#[test_case("S\" x\" NEGATE", "NEGATE" ; "negate string")]
#[test_case("1.5 3 AND", "AND" ; "bitwise float")]
#[test_case("S\" x\" 1 <", "<" ; "ordering mixed kinds")]
#[test_case("-1 EMIT", "EMIT" ; "emit bad code")]
#[test_case(": T IF 1 THEN ; S\" x\" T", "IF" ; "string flag at run time")]
#[test_case(": T 10 S\" x\" DO LOOP ; T", "DO" ; "string loop index")]
#[tokio::test]
async fn type_mismatches(source: &str, word: &str) {
    match error_of(source).await {
        ForthError::TypeMismatch { word: found, .. } => assert_eq!(found, word),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn huge_space_count_is_refused() {
    let (mut interpreter, log) = interpreter();

    let result = interpreter.evaluate("9223372036854775807 SPACES").await;

    assert!(matches!(result, Err(ForthError::TypeMismatch { word, .. }) if word == "SPACES"));
    assert!(log.output().is_empty());

    interpreter.evaluate("3 SPACES").await.unwrap();
    assert_eq!(log.output(), "   ");
}

#[tokio::test]
async fn semicolon_outside_definition_is_compile_only() {
    assert_eq!(error_of(";").await, ForthError::CompileOnly { word: ";".to_string() });
}

#[test_case(": BAD 1 IF 2 ;", "IF", "THEN" ; "if without then")]
#[test_case(": BAD 1 IF 2 ELSE 3 ;", "ELSE", "THEN" ; "else without then")]
#[test_case(": BAD THEN ;", "THEN", "IF" ; "then without if")]
#[test_case(": BAD ELSE ;", "ELSE", "IF" ; "else without if")]
#[test_case(": BAD LOOP ;", "LOOP", "DO" ; "loop without do")]
#[test_case(": BAD 2 +LOOP ;", "+LOOP", "DO" ; "plus loop without do")]
#[test_case(": BAD 10 0 DO ;", "DO", "LOOP" ; "do without loop")]
#[test_case(": BAD BEGIN ;", "BEGIN", "UNTIL" ; "begin without until")]
#[test_case(": BAD UNTIL ;", "UNTIL", "BEGIN" ; "until without begin")]
#[test_case(": BAD BEGIN 1 REPEAT ;", "REPEAT", "WHILE" ; "repeat without while")]
#[test_case(": BAD 1 IF 10 0 DO THEN LOOP ;", "THEN", "IF" ; "crossed structures")]
#[test_case(": BAD 3 0 DO BEGIN LOOP UNTIL ;", "LOOP", "DO" ; "loop closing a begin")]
#[test_case(": BAD BEGIN 3 0 DO UNTIL LOOP ;", "UNTIL", "BEGIN" ; "until closing a do")]
#[test_case(": BAD 3 0 DO 1 WHILE LOOP ;", "WHILE", "BEGIN" ; "while inside a do")]
#[tokio::test]
async fn unbalanced_control_structures(source: &str, word: &str, missing: &str) {
    assert_eq!(error_of(source).await, ForthError::control_structure(word, missing));
}

#[tokio::test]
async fn rejected_definition_is_discarded() {
    let (mut interpreter, _) = interpreter();

    assert!(interpreter.evaluate(": BAD 1 IF 2 ;").await.is_err());

    assert!(!interpreter.is_compiling());
    assert!(interpreter.return_stack().is_empty());
    assert!(interpreter.dictionary().lookup("BAD").is_none());
}

#[test_case("SEE" ; "see")]
#[test_case("FORGET" ; "forget")]
#[test_case("SEE 42" ; "see a number")]
#[tokio::test]
async fn parsing_words_need_a_name(source: &str) {
    assert!(matches!(error_of(source).await, ForthError::MissingName { .. }));
}

#[tokio::test]
async fn stack_is_kept_after_an_error() {
    let (mut interpreter, _) = interpreter();

    assert!(interpreter.evaluate("1 2 DUPP 3").await.is_err());
    assert_eq!(interpreter.stack(), &ints(&[1, 2]));
}

#[tokio::test]
async fn errors_are_reported_once_with_their_hint() {
    let (mut interpreter, log) = interpreter();

    assert!(interpreter.evaluate("+").await.is_err());

    let errors = log.errors();

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        "Stack underflow: '+' needs 2 values, but the stack only has 0.\n\
         The '+' word adds two numbers together. Try: 3 5 +"
    );
}

#[tokio::test]
async fn reset_clears_partial_state() {
    let (mut interpreter, _) = interpreter();

    assert!(interpreter.evaluate("1 2 : HALF THEN").await.is_err());
    assert!(interpreter.is_compiling());

    interpreter.reset();

    assert!(!interpreter.is_compiling());
    assert!(interpreter.stack().is_empty());
    assert_eq!(interpreter.evaluate("3 4 +").await, Ok(fable::Outcome::Completed));
    assert_eq!(interpreter.stack(), &ints(&[7]));
}
