use rstest::rstest;

use super::*;
use crate::diagram::build;
use crate::parser::parse;

fn validate(input: &str) -> Result<(), ValidationError> {
    let grammar = parse(input).unwrap_or_else(|e| panic!("Failed to parse {input:?}: {e}"));
    let diagrams = build(&grammar).unwrap_or_else(|e| panic!("Failed to build {input:?}: {e}"));
    JavaValidator.validate(&diagrams)
}

#[test]
fn test_identical_methods_conflict() {
    let err = validate("Foo: a(String s) | a(String t);").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Conflict: a(String s)#L1C6, a(String t)#L1C20"
    );
}

#[test]
fn test_type_parameters_erase_to_object() {
    assert!(validate("Foo[T]: a(T t) | a(Object o);").is_err());
    assert!(validate("Foo: a[S](S s) | a(Object o);").is_err());
}

#[rstest]
#[case::declaration_bound("Foo[T extends Number]: a(T t) | a(Number n);", true)]
#[case::declaration_bound_differs("Foo[T extends Number]: a(T t) | a(Object o);", false)]
#[case::method_bound("Foo: a[S extends Comparable](S s) | a(Comparable c);", true)]
#[case::method_bound_differs("Foo: a[S extends Comparable](S s) | a(Object o);", false)]
#[case::bound_through_parameter("Foo: a[T extends Number, U extends T](U u) | a(Number n);", true)]
#[case::bound_cycle("Foo: a[T extends U, U extends T](T t) | a(Object o);", true)]
#[case::bound_on_rule("Foo[T extends Bar]: a(T t) | a(Bar b); Bar: ;", true)]
fn test_type_parameters_erase_to_their_bound(#[case] input: &str, #[case] conflicts: bool) {
    assert_eq!(validate(input).is_err(), conflicts, "{input}");
}

#[test]
fn test_throws_is_not_part_of_the_signature() {
    let err = validate("Foo: a() throws java.io.IOException | a();").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Conflict: a() throws java.io.IOException#L1C6, a()#L1C39"
    );
}

#[test]
fn test_type_arguments_do_not_distinguish() {
    let input = "Foo: a(java.util.List<String> l) | a(java.util.List<Integer> l);";
    assert!(validate(input).is_err());
}

#[test]
fn test_varargs_and_arrays() {
    assert!(validate("Foo: a(String s) | a(String[] s);").is_ok());
    assert!(validate("Foo: a(String... s) | a(String[] s);").is_err());
}

#[test]
fn test_rule_parameter_uses_rule_name() {
    assert!(validate("Foo: a(Bar b) | a(x.Bar b); Bar: ;").is_ok());
    assert!(validate("Foo: a(Bar b) | a(Bar c); Bar: ;").is_err());
}

#[test]
fn test_distinct_signatures_pass() {
    assert!(validate("Foo: a() | a(int x) | b() | c(int x, int y);").is_ok());
}

#[test]
fn test_same_method_in_different_states_passes() {
    assert!(validate("Foo: a() a() a();").is_ok());
}

#[test]
fn test_two_delegations_conflict() {
    let err = validate("Foo: A | B; A: a(); B: b();").unwrap_err();
    assert_eq!(err.to_string(), "Conflict: A#L1C6, B#L1C10");
}

#[test]
fn test_delegation_and_method_conflict() {
    let err = validate("Foo: A | b(); A: a();").unwrap_err();
    assert_eq!(err.to_string(), "Conflict: A#L1C6, b()#L1C10");
}

#[test]
fn test_single_delegation_passes() {
    assert!(validate("Foo: x() A; A: a();").is_ok());
}

#[test]
fn test_spliced_conflict_lists_every_range() {
    let err = validate("Foo: (Bar | a()) z(); Bar: a();").unwrap_err();
    assert_eq!(err.to_string(), "Conflict: a()#L1C28,L1C7, a()#L1C13");
}

#[test]
fn test_first_conflicting_state_wins() {
    let err = validate("A: x() (b() | b()); B: c() | c();").unwrap_err();
    assert_eq!(err.labels.len(), 2);
    assert!(err.labels[0].starts_with("b()"));
}

#[test]
fn test_method_signature_format() {
    let grammar = parse("Foo: put[K](K key, String... values, Foo next);").unwrap();
    let diagrams = build(&grammar).unwrap();
    let label = diagrams.get("Foo").unwrap().start().transitions()[0].label();
    let signature = method_signature(label.as_method().unwrap(), |t| t.name.to_string());
    assert_eq!(signature, "put:K String[] Foo");
}
