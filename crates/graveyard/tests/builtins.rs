//! The built-in function table: casts, helpers, random/time sources, and
//! file I/O.

use std::fs;

use graveyard::{CollectStringPrint, ErrorKind, NoScan, QueuedScan, RunError, Runner, ScanSource};
use pretty_assertions::assert_eq;

fn run(source: &str) -> String {
    run_with_scan(source, &mut NoScan)
}

fn run_with_scan(source: &str, scan: &mut impl ScanSource) -> String {
    let runner = Runner::new(source.to_owned()).expect("program should prepare");
    let mut print = CollectStringPrint::new();
    runner.execute(&mut print, scan).expect("program should execute");
    print.into_output()
}

fn run_err(source: &str) -> RunError {
    let runner = Runner::new(source.to_owned()).expect("program should prepare");
    runner
        .execute(&mut CollectStringPrint::new(), &mut NoScan)
        .expect_err("program should fail")
}

#[test]
fn boolean_cast_follows_truthiness() {
    assert_eq!(run("::{ >> b(0), b(3), b(\"\"), b(\"x\"), b(|); }"), "false true false true false\n");
}

#[test]
fn integer_cast_truncates_and_parses() {
    assert_eq!(run("::{ >> i(3.9), i(-3.9), i(\"42\"), i($); }"), "3 -3 42 1\n");
}

#[test]
fn integer_cast_rejects_bad_literals() {
    let err = run_err("::{ >> i(\"4.2\"); }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn float_cast_widens_and_parses() {
    assert_eq!(run("::{ >> f(2), f(\"0.5\"); }"), "2.0 0.5\n");
}

#[test]
fn string_cast_renders_values() {
    assert_eq!(run("::{ >> s(12) + s(3.5) + s($); }"), "123.5true\n");
}

#[test]
fn array_cast_collects_its_arguments() {
    assert_eq!(run("::{ >> a(1, \"two\", $); }"), "[1, \"two\", true]\n");
}

#[test]
fn hashtable_cast_uses_arguments_as_keys() {
    let source = "::{ h = h(\"x\", \"y\"); k @ h { >> k, h#k; } }";
    assert_eq!(run(source), "x null\ny null\n");
}

#[test]
fn stoa_and_reverse() {
    assert_eq!(run("::{ >> stoa(\"abc\"); }"), "[\"a\", \"b\", \"c\"]\n");
    assert_eq!(run("::{ >> reverse([1, 2, 3]); }"), "[3, 2, 1]\n");
    assert_eq!(run("::{ >> reverse(\"abc\"); }"), "cba\n");
}

#[test]
fn reverse_leaves_the_original_untouched() {
    assert_eq!(run("::{ a = [1, 2]; r = reverse(a); >> a, r; }"), "[1, 2] [2, 1]\n");
}

#[test]
fn type_reports_the_dynamic_type() {
    assert_eq!(
        run("::{ >> type(|), type($), type(1), type(1.5), type(\"s\"), type([1]), type({}); }"),
        "null boolean integer float string array hashtable\n"
    );
}

#[test]
fn type_with_several_arguments_gives_an_array() {
    assert_eq!(run("::{ >> type(1, \"x\"); }"), "[\"integer\", \"string\"]\n");
}

#[test]
fn mod_and_floordiv_follow_floored_semantics() {
    assert_eq!(run("::{ >> mod(7, 3), mod(-7, 3), floordiv(7, 2), floordiv(-7, 2); }"), "1 2 3 -4\n");
}

#[test]
fn print_builtin_aliases_the_operator() {
    assert_eq!(run("::{ print(1, \"two\"); }"), "1 two\n");
}

#[test]
fn scan_builtin_joins_prompt_arguments() {
    let mut scan = QueuedScan::new(["ok"]);
    let output = run_with_scan("::{ x = scan(\"a\", \"b\"); >> x; }", &mut scan);
    assert_eq!(output, "a bok\n");
}

#[test]
fn hello_prints_its_greeting() {
    assert_eq!(run("::{ hello(); }"), "hello world!\n");
}

#[test]
fn magic_number_is_eight_digits() {
    let output = run("::{ n = magic_number(); ! n >= 10000000; ! n <= 99999999; >> \"ok\"; }");
    assert_eq!(output, "ok\n");
}

#[test]
fn magic_weight_is_a_unit_float() {
    let output = run("::{ w = magic_weight(); ! type(w) == \"float\"; ! w >= 0; ! w <= 1; >> \"ok\"; }");
    assert_eq!(output, "ok\n");
}

#[test]
fn magic_sources_have_the_documented_shapes() {
    let source = "::{ ! type(magic_uid()) == \"string\"; ! type(magic_time()) == \"float\"; u = stoa(magic_string()); i = 0; k @ u { i++; } ! i == 16; >> \"ok\"; }";
    assert_eq!(run(source), "ok\n");
}

#[test]
fn fwrite_then_fread_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("note.txt");
    let path = path.to_str().expect("utf-8 path");
    let source = format!("::{{ fwrite(\"graveyard shift\", \"{path}\"); >> fread(\"{path}\"); }}");
    assert_eq!(run(&source), "graveyard shift\n");
    assert_eq!(fs::read_to_string(path).expect("file exists"), "graveyard shift");
}

#[test]
fn fread_of_a_missing_path_is_a_value_error() {
    let err = run_err("::{ >> fread(\"/nonexistent/really/not/here.txt\"); }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

#[test]
fn fwrite_requires_string_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.txt");
    let source = format!("::{{ fwrite(42, \"{}\"); }}", path.to_str().unwrap());
    let err = run_err(&source);
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn builtins_shadow_user_functions() {
    // the builtin table is consulted before the global scope
    let source = "::{ type &x { -> \"shadowed\"; } >> type(1); }";
    assert_eq!(run(source), "integer\n");
}
