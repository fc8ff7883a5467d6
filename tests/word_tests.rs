mod common;

use common::{ints, output_of, stack_after};
use fable::Value;
use test_case::test_case;

#[test_case("1 2 DUP", &[1, 2, 2] ; "dup")]
#[test_case("1 2 DROP", &[1] ; "drop")]
#[test_case("1 2 SWAP", &[2, 1] ; "swap")]
#[test_case("1 2 SWAP SWAP", &[1, 2] ; "swap is its own inverse")]
#[test_case("1 2 OVER", &[1, 2, 1] ; "over")]
#[test_case("1 2 3 ROT", &[2, 3, 1] ; "rot")]
#[test_case("1 2 3 -ROT", &[3, 1, 2] ; "minus rot")]
#[test_case("1 2 NIP", &[2] ; "nip")]
#[test_case("1 2 TUCK", &[2, 1, 2] ; "tuck")]
#[test_case("1 2 2DUP", &[1, 2, 1, 2] ; "two dup")]
#[test_case("1 2 3 2DROP", &[1] ; "two drop")]
#[test_case("1 2 3 4 2SWAP", &[3, 4, 1, 2] ; "two swap")]
#[test_case("1 2 3 4 2OVER", &[1, 2, 3, 4, 1, 2] ; "two over")]
#[test_case("7 8 9 DEPTH", &[7, 8, 9, 3] ; "depth")]
#[test_case("10 20 30 2 PICK", &[10, 20, 30, 10] ; "pick deep")]
#[test_case("10 20 30 0 PICK", &[10, 20, 30, 30] ; "pick top")]
#[test_case("10 20 30 2 ROLL", &[20, 30, 10] ; "roll")]
#[test_case("10 20 0 ROLL", &[10, 20] ; "roll zero")]
#[test_case("1 2 CLEAR", &[] ; "clear")]
#[test_case("5 >R 6 R>", &[6, 5] ; "return stack round trip")]
#[test_case("5 >R R@ R>", &[5, 5] ; "return stack fetch")]
#[tokio::test]
async fn stack_words(source: &str, expected: &[i64]) {
    assert_eq!(stack_after(source).await, ints(expected));
}

#[test_case("3 4 +", 7 ; "add")]
#[test_case("10 3 -", 7 ; "subtract")]
#[test_case("6 7 *", 42 ; "multiply")]
#[test_case("20 4 /", 5 ; "divide")]
#[test_case("-7 2 /", -4 ; "divide floors")]
#[test_case("17 5 MOD", 2 ; "modulo")]
#[test_case("-7 2 MOD", 1 ; "modulo follows divisor sign")]
#[test_case("5 NEGATE", -5 ; "negate")]
#[test_case("-5 ABS", 5 ; "abs")]
#[test_case("3 9 MIN", 3 ; "min")]
#[test_case("3 9 MAX", 9 ; "max")]
#[test_case("5 1+", 6 ; "one plus")]
#[test_case("5 1-", 4 ; "one minus")]
#[test_case("5 2+", 7 ; "two plus")]
#[test_case("5 2-", 3 ; "two minus")]
#[test_case("5 2*", 10 ; "two star")]
#[test_case("-5 2/", -3 ; "two slash shifts")]
#[test_case("9223372036854775807 1 +", i64::MIN ; "add wraps")]
#[tokio::test]
async fn arithmetic_words(source: &str, expected: i64) {
    assert_eq!(stack_after(source).await, ints(&[expected]));
}

#[tokio::test]
async fn divide_mod_pushes_remainder_then_quotient() {
    assert_eq!(stack_after("17 5 /MOD").await, ints(&[2, 3]));
}

#[tokio::test]
async fn floats_promote() {
    let stack = stack_after("1.5 2 + 7 2.0 /").await;

    assert!(matches!(stack.as_slice(), [Value::Float(a), Value::Float(b)] if *a == 3.5 && *b == 3.5));
}

#[tokio::test]
async fn integers_stay_integers() {
    let stack = stack_after("7 2 /").await;

    assert!(matches!(stack.as_slice(), [Value::Int(3)]));
}

#[tokio::test]
async fn strings_concatenate() {
    let stack = stack_after("S\" ab\" S\" cd\" +").await;

    assert_eq!(stack, vec![Value::String("abcd".to_string())]);
}

#[test_case("3 3 =", -1 ; "equal")]
#[test_case("3 4 =", 0 ; "not equal")]
#[test_case("3 3.0 =", -1 ; "int equals float")]
#[test_case("S\" a\" 1 =", 0 ; "string never equals a number")]
#[test_case("3 4 <>", -1 ; "different")]
#[test_case("3 4 <", -1 ; "less")]
#[test_case("3 4 >", 0 ; "greater")]
#[test_case("4 4 <=", -1 ; "less or equal")]
#[test_case("3 4 >=", 0 ; "greater or equal")]
#[test_case("S\" b\" S\" a\" >", -1 ; "strings order lexically")]
#[test_case("0 0=", -1 ; "zero equal")]
#[test_case("-3 0<", -1 ; "zero less")]
#[test_case("3 0>", -1 ; "zero greater")]
#[test_case("0 0<>", 0 ; "zero not equal")]
#[test_case("12 10 AND", 8 ; "and")]
#[test_case("12 10 OR", 14 ; "or")]
#[test_case("12 10 XOR", 6 ; "xor")]
#[test_case("0 INVERT", -1 ; "invert")]
#[test_case("1 4 LSHIFT", 16 ; "left shift")]
#[test_case("-16 2 RSHIFT", -4 ; "right shift")]
#[test_case("TRUE", -1 ; "true")]
#[test_case("FALSE", 0 ; "false")]
#[test_case("0 NOT", -1 ; "not zero")]
#[test_case("7 NOT", 0 ; "not non zero")]
#[tokio::test]
async fn logic_words(source: &str, expected: i64) {
    assert_eq!(stack_after(source).await, ints(&[expected]));
}

#[test_case("42 .", "42 " ; "dot")]
#[test_case("2.5 .", "2.5 " ; "dot float")]
#[test_case("3.0 .", "3.0 " ; "dot whole float")]
#[test_case("1 2 .S", "<2> 1 2 " ; "dot s")]
#[test_case(".S", "<empty> " ; "dot s empty")]
#[test_case("CR", "\n" ; "cr")]
#[test_case("SPACE", " " ; "space")]
#[test_case("3 SPACES", "   " ; "spaces")]
#[test_case("-3 SPACES", "" ; "negative spaces")]
#[test_case("65 EMIT", "A" ; "emit")]
#[test_case("S\" hello\" 3 TYPE", "hel" ; "type")]
#[test_case(".\" Hello World\"", "Hello World" ; "dot quote")]
#[test_case(".( hi)", " hi" ; "dot paren")]
#[tokio::test]
async fn output_words(source: &str, expected: &str) {
    assert_eq!(output_of(source).await, expected);
}

#[tokio::test]
async fn dot_s_does_not_consume() {
    assert_eq!(stack_after("1 2 .S").await, ints(&[1, 2]));
}

#[tokio::test]
async fn dup_drop_is_a_no_op() {
    assert_eq!(stack_after("S\" x\" DUP DROP").await, vec![Value::String("x".to_string())]);
}

#[tokio::test]
async fn depth_counts_pushed_literals() {
    for count in 0..6 {
        let source = "1 ".repeat(count) + "DEPTH";
        let stack = stack_after(&source).await;

        assert_eq!(stack.last(), Some(&Value::Int(count as i64)));
    }
}

#[tokio::test]
async fn words_are_case_insensitive() {
    assert_eq!(stack_after("2 dup swap Drop").await, ints(&[2]));
}
