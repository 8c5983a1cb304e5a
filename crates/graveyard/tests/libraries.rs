//! The loader's entry gate and the textual library import system.

use std::fs;
use std::path::Path;

use graveyard::{CollectStringPrint, ErrorKind, NoScan, Runner};
use pretty_assertions::assert_eq;

fn write_library(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(format!("{name}.graveyard"));
    fs::write(&path, body).expect("library should write");
    // the import token spells the path without the extension
    dir.join(name).to_str().expect("utf-8 path").to_owned()
}

fn run(source: &str) -> String {
    let runner = Runner::new(source.to_owned()).expect("program should prepare");
    let mut print = CollectStringPrint::new();
    runner.execute(&mut print, &mut NoScan).expect("program should execute");
    print.into_output()
}

#[test]
fn imported_functions_are_callable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = write_library(dir.path(), "mathlib", "::{ double &x { -> x * 2; } }");
    let source = format!("::{{ @{lib}; >> double(21); }}");
    assert_eq!(run(&source), "42\n");
}

#[test]
fn imports_resolve_nested_libraries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inner = write_library(dir.path(), "inner", "::{ base { -> 10; } }");
    let outer = write_library(
        dir.path(),
        "outer",
        &format!("::{{ @{inner}; tripled {{ -> base() * 3; }} }}"),
    );
    let source = format!("::{{ @{outer}; >> tripled(); }}");
    assert_eq!(run(&source), "30\n");
}

#[test]
fn repeated_imports_of_one_library_splice_once_each() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = write_library(dir.path(), "util", "::{ seven { -> 7; } }");
    let source = format!("::{{ @{lib}; @{lib}; >> seven(); }}");
    assert_eq!(run(&source), "7\n");
}

#[test]
fn resolved_source_contains_no_import_tokens() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = write_library(dir.path(), "clean", "::{ x = 1; }");
    let source = format!("::{{ @{lib}; >> x; }}");
    let runner = Runner::new(source).expect("program should prepare");
    assert!(
        !runner.resolved_source().contains('@'),
        "import tokens should be spliced away: {}",
        runner.resolved_source()
    );
    // resolving again is the identity
    let again = Runner::new(format!("::{{{}}}", runner.resolved_source())).expect("re-prepare");
    assert_eq!(again.resolved_source(), runner.resolved_source());
}

#[test]
fn missing_library_is_a_reference_error() {
    let err = Runner::new("::{ @/definitely/not/a/lib; }".to_owned()).expect_err("import should fail");
    assert_eq!(err.kind(), ErrorKind::ReferenceError);
    assert_eq!(err.message(), "Library not found: /definitely/not/a/lib.graveyard");
}

#[test]
fn library_without_the_global_wrapper_is_a_syntax_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = write_library(dir.path(), "bare", "x = 1;");
    let err = Runner::new(format!("::{{ @{lib}; }}")).expect_err("import should fail");
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
    assert_eq!(err.message(), "Global namespace not declared in library");
}

#[test]
fn circular_imports_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let name = dir.path().join("loop");
    let token = name.to_str().expect("utf-8 path");
    write_library(dir.path(), "loop", &format!("::{{ @{token}; }}"));
    let err = Runner::new(format!("::{{ @{token}; }}")).expect_err("import should fail");
    assert_eq!(err.kind(), ErrorKind::ReferenceError);
    assert!(
        err.message().starts_with("Circular library import"),
        "got: {}",
        err.message()
    );
}

#[test]
fn comments_are_stripped_before_lexing() {
    let source = "::{ // a line comment\n x = 1; /* a block\n comment */ >> x; }";
    assert_eq!(run(source), "1\n");
}

#[test]
fn comments_inside_libraries_are_stripped_too() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = write_library(dir.path(), "commented", "::{ // helper\n nine { -> 9; } }");
    let source = format!("::{{ @{lib}; >> nine(); }}");
    assert_eq!(run(&source), "9\n");
}

#[test]
fn from_file_runs_a_program_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("program.graveyard");
    fs::write(&path, "::{ >> 1 + 1; }").expect("program should write");
    let runner = Runner::from_file(&path).expect("program should load");
    let mut print = CollectStringPrint::new();
    runner.execute(&mut print, &mut NoScan).expect("program should execute");
    assert_eq!(print.output(), "2\n");
}

#[test]
fn from_file_rejects_other_extensions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("program.txt");
    fs::write(&path, "::{ }").expect("file should write");
    let err = Runner::from_file(&path).expect_err("extension should be rejected");
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert!(
        err.message().contains("is not graveyard source code"),
        "got: {}",
        err.message()
    );
}
