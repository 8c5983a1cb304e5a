//! User-defined types, inheritance, methods, and namespaces.

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
fn methods_mutate_the_instance_through_this() {
    let source = "::{ <Point> = { x: 0, y: 0, move: &dx &dy { this.x = this.x + dx; this.y = this.y + dy; } }; p = <Point>; p.move(3, 4); >> p.x, p.y; }";
    assert_eq!(run(source), "3 4\n");
}

#[test]
fn instances_start_from_the_template_defaults() {
    let source = "::{ <Counter> = { count: 10 }; c = <Counter>; >> c.count; }";
    assert_eq!(run(source), "10\n");
}

#[test]
fn default_values_evaluate_at_definition_time() {
    let source = "::{ base = 5; <Box> = { size: base * 2 }; base = 100; b = <Box>; >> b.size; }";
    assert_eq!(run(source), "10\n");
}

#[test]
fn instances_are_independent_copies_of_the_template() {
    let source = "::{ <P> = { x: 1 }; a = <P>; b = <P>; a.x = 9; >> a.x, b.x; }";
    assert_eq!(run(source), "9 1\n");
}

#[test]
fn assigning_an_instance_aliases_the_record() {
    let source = "::{ <P> = { x: 1 }; a = <P>; b = a; b.x = 7; >> a.x; }";
    assert_eq!(run(source), "7\n");
}

#[test]
fn methods_can_return_values() {
    let source = "::{ <Circle> = { r: 2, area: { -> this.r * this.r * 3; } }; c = <Circle>; >> c.area(); }";
    assert_eq!(run(source), "12\n");
}

#[test]
fn single_inheritance_copies_parent_members() {
    let source = "::{ <Animal> = { legs: 4, noise: \"?\" }; <Dog> &<Animal> = { noise: \"woof\" }; d = <Dog>; >> d.legs, d.noise; }";
    assert_eq!(run(source), "4 woof\n");
}

#[test]
fn later_parents_override_earlier_ones() {
    let source = "::{ <A> = { x: 1, y: 2 }; <B> = { y: 3, z: 4 }; <C> &<A> &<B> = { w: 5 }; c = <C>; >> c.x, c.y, c.z, c.w; }";
    assert_eq!(run(source), "1 3 4 5\n");
}

#[test]
fn own_members_override_inherited_ones() {
    let source = "::{ <A> = { x: 1 }; <B> &<A> = { x: 2 }; b = <B>; >> b.x; }";
    assert_eq!(run(source), "2\n");
}

#[test]
fn inheriting_from_a_non_type_is_a_type_error() {
    let err = run_err("::{ nope = 1; <T> &<nope> = { x: 1 }; }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.message(), "'nope' is not a valid type");
}

#[test]
fn instantiating_an_unknown_type_is_a_type_error() {
    let err = run_err("::{ p = <Ghost>; }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.message(), "'Ghost' is not a valid type");
}

#[test]
fn methods_cannot_be_reassigned() {
    let err = run_err("::{ <T> = { go: { -> 1; } }; t = <T>; t.go = 5; }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.message(), "Cannot re-assign method 'go'");
}

#[test]
fn unknown_member_is_a_name_error() {
    let err = run_err("::{ <T> = { x: 1 }; t = <T>; >> t.ghost; }");
    assert_eq!(err.kind(), ErrorKind::NameError);
    assert_eq!(err.message(), "'ghost' is not a member of 't'");
}

#[test]
fn member_access_on_a_non_instance_is_a_type_error() {
    let err = run_err("::{ x = 3; >> x.member; }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.message(), "'x' is not an instance");
}

#[test]
fn calling_a_data_member_is_a_type_error() {
    let err = run_err("::{ <T> = { x: 1 }; t = <T>; t.x(); }");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(err.message(), "'x' is not a method");
}

#[test]
fn method_arity_is_checked() {
    let err = run_err("::{ <T> = { go: &a { -> a; } }; t = <T>; t.go(); }");
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert_eq!(err.message(), "Incorrect number of arguments for method 'go'");
}

#[test]
fn namespace_members_resolve_through_the_access_form() {
    let source = "::{ :: Config { debug = $; level = 3; } >> ::Config#level; }";
    assert_eq!(run(source), "3\n");
}

#[test]
fn namespace_redefinition_extends_the_record() {
    let source = "::{ :: Config { a = 1; } :: Config { b = 2; } >> ::Config#a, ::Config#b; }";
    assert_eq!(run(source), "1 2\n");
}

#[test]
fn namespace_access_in_expressions() {
    let source = "::{ :: Math { pi = 3.14; } >> ::Math#pi * 2; }";
    assert_eq!(run(source), "6.28\n");
}

#[test]
fn missing_namespace_entry_is_a_name_error() {
    let err = run_err("::{ :: Config { a = 1; } >> ::Config#b; }");
    assert_eq!(err.kind(), ErrorKind::NameError);
    assert_eq!(err.message(), "'b' not found in namespace 'Config'");
}

#[test]
fn missing_namespace_is_a_name_error() {
    let err = run_err("::{ >> ::Ghost#x; }");
    assert_eq!(err.kind(), ErrorKind::NameError);
}

#[test]
fn functions_defined_inside_a_namespace_are_global() {
    let source = "::{ :: Util { helper { -> 7; } } >> helper(); }";
    assert_eq!(run(source), "7\n");
}
