//! Expression semantics: operators, coercions, ranges, formatted strings.

use graveyard::{CollectStringPrint, ErrorKind, NoScan, RunError, Runner};
use pretty_assertions::assert_eq;

fn run(source: &str) -> String {
    let runner = Runner::new(source.to_owned()).expect("program should prepare");
    let mut print = CollectStringPrint::new();
    runner.execute(&mut print, &mut NoScan).expect("program should execute");
    print.into_output()
}

fn run_err(source: &str) -> RunError {
    let runner = Runner::new(source.to_owned()).expect("program should prepare");
    runner
        .execute(&mut CollectStringPrint::new(), &mut NoScan)
        .expect_err("program should fail")
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(run("::{ x = 1 + 2 * 3; >> x; }"), "7\n");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(run("::{ >> (1 + 2) * 3; }"), "9\n");
}

#[test]
fn division_always_produces_a_float() {
    assert_eq!(run("::{ >> 6 / 2; }"), "3.0\n");
    assert_eq!(run("::{ >> 1 / 2; }"), "0.5\n");
}

#[test]
fn exponentiation_is_left_associative() {
    // (2 ** 3) ** 2, not 2 ** (3 ** 2)
    assert_eq!(run("::{ >> 2 ** 3 ** 2; }"), "64\n");
}

#[test]
fn unary_minus_and_not() {
    assert_eq!(run("::{ >> -5 + 3; }"), "-2\n");
    assert_eq!(run("::{ >> !$; }"), "false\n");
    assert_eq!(run("::{ >> !0; }"), "true\n");
}

#[test]
fn negating_a_string_is_a_type_error() {
    let err = run_err("::{ x = -\"a\"; }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn string_concatenation_coerces_both_operands() {
    assert_eq!(run("::{ >> \"n=\" + 3; }"), "n=3\n");
    assert_eq!(run("::{ >> 1 + \"x\"; }"), "1x\n");
    assert_eq!(run("::{ >> \"a\" + \"b\"; }"), "ab\n");
}

#[test]
fn string_ordering_comparisons_are_rejected() {
    let err = run_err("::{ x = \"a\" < \"b\"; }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert_eq!(err.message(), "Unknown operator: <");
}

#[test]
fn string_equality_works() {
    assert_eq!(run("::{ >> \"a\" == \"a\", \"a\" != \"b\"; }"), "true true\n");
}

#[test]
fn comparisons_cross_numeric_types() {
    assert_eq!(run("::{ >> 1 == 1.0, 2 >= 1.5, $ == 1; }"), "true true true\n");
}

#[test]
fn logical_operators_select_an_operand_by_truthiness() {
    assert_eq!(run("::{ >> 0 || 5; }"), "5\n");
    assert_eq!(run("::{ >> 3 && 5; }"), "5\n");
    assert_eq!(run("::{ >> 0 && 5; }"), "0\n");
}

#[test]
fn logical_operators_evaluate_both_operands() {
    // no short-circuit: the call on the right runs even when the left decides
    let source = "::{ noisy &x { >> \"called\"; -> x; } y = % && noisy($); >> y; }";
    assert_eq!(run(source), "called\nfalse\n");
}

#[test]
fn ascending_range_is_inclusive() {
    assert_eq!(run("::{ >> 1...5; }"), "[1, 2, 3, 4, 5]\n");
}

#[test]
fn descending_and_singleton_ranges() {
    assert_eq!(run("::{ >> 5...1; }"), "[5, 4, 3, 2, 1]\n");
    assert_eq!(run("::{ >> 5...5; }"), "[5]\n");
}

#[test]
fn range_endpoints_truncate() {
    assert_eq!(run("::{ n = 3.9; >> 1...n; }"), "[1, 2, 3]\n");
}

#[test]
fn formatted_string_interleaves_text_and_expressions() {
    assert_eq!(run("::{ a = 2; >> 'a is {a}, twice {a * 2}!'; }"), "a is 2, twice 4!\n");
}

#[test]
fn empty_formatted_string_is_the_empty_string() {
    assert_eq!(run("::{ x = ''; >> x == \"\"; }"), "true\n");
}

#[test]
fn formatted_string_renders_any_value() {
    assert_eq!(run("::{ v = |; >> 'v={v}'; }"), "v=null\n");
    assert_eq!(run("::{ v = [1, 2]; >> 'v={v}'; }"), "v=[1, 2]\n");
}

#[test]
fn booleans_and_null_render_as_words() {
    assert_eq!(run("::{ >> $, %, |; }"), "true false null\n");
}

#[test]
fn integer_overflow_is_a_value_error() {
    let err = run_err("::{ x = 9223372036854775807 + 1; }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert_eq!(err.message(), "Integer overflow");
}

#[test]
fn division_by_zero_is_a_value_error() {
    let err = run_err("::{ x = 1 / 0; }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn undefined_variable_is_a_name_error() {
    let err = run_err("::{ >> ghost; }");
    assert_eq!(err.kind(), ErrorKind::NameError);
    assert_eq!(err.message(), "Variable 'ghost' is not defined");
}
