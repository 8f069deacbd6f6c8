use rstest::rstest;

use super::*;
use crate::error::ResolveError;
use crate::parser::parse;

fn diagrams(input: &str) -> Diagrams {
    let grammar = parse(input).unwrap_or_else(|e| panic!("Failed to parse {input:?}: {e}"));
    build(&grammar).unwrap_or_else(|e| panic!("Failed to build {input:?}: {e}"))
}

fn diagram(input: &str, name: &str) -> Diagram {
    diagrams(input).get(name).cloned().expect("diagram")
}

/// `(source, label node, target)` for every transition
fn edges(diagram: &Diagram) -> Vec<(usize, String, usize)> {
    diagram
        .transitions()
        .map(|t| (t.source().0, t.label().node().to_string(), t.target().0))
        .collect()
}

fn finals(diagram: &Diagram) -> Vec<usize> {
    diagram.finals().map(|s| s.id().0).collect()
}

#[test]
fn test_method_then_return_type() {
    let foo = diagram("Foo: foo() Bar;", "Foo");
    assert_eq!(edges(&foo), [(0, "foo()".to_string(), 1)]);
    assert_eq!(finals(&foo), [1]);
    assert!(foo.state(StateId(1)).unwrap().is_terminal());
    assert_eq!(foo.return_type().map(|t| t.to_string()), Some("Bar".into()));
}

#[test]
fn test_empty_body_is_a_single_final_state() {
    let foo = diagram("Foo: ;", "Foo");
    assert_eq!(foo.states().len(), 1);
    assert!(foo.start().is_final());
    assert!(foo.return_type().is_none());
}

#[test]
fn test_sequence() {
    let foo = diagram("Foo: a() b();", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "a()".to_string(), 1), (1, "b()".to_string(), 2)]
    );
    assert_eq!(finals(&foo), [2]);
}

#[test]
fn test_alternation_merges_entries() {
    let foo = diagram("Foo: a() | b() c();", "Foo");
    assert_eq!(
        edges(&foo),
        [
            (0, "a()".to_string(), 1),
            (0, "b()".to_string(), 2),
            (2, "c()".to_string(), 3),
        ]
    );
    assert_eq!(finals(&foo), [1, 3]);
}

#[test]
fn test_optional_adds_bypass() {
    let foo = diagram("Foo: a()? b();", "Foo");
    assert_eq!(
        edges(&foo),
        [
            (0, "a()".to_string(), 1),
            (0, "b()".to_string(), 2),
            (1, "b()".to_string(), 2),
        ]
    );
    assert_eq!(finals(&foo), [2]);
}

#[test]
fn test_star_loops_and_bypasses() {
    let foo = diagram("Foo: a()*;", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "a()".to_string(), 1), (1, "a()".to_string(), 1)]
    );
    assert_eq!(finals(&foo), [0, 1]);
}

#[test]
fn test_plus_loops_without_bypass() {
    let foo = diagram("Foo: a()+;", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "a()".to_string(), 1), (1, "a()".to_string(), 1)]
    );
    assert_eq!(finals(&foo), [1]);
}

#[test]
fn test_group_star_followed_by_method() {
    let foo = diagram("Foo: (a() b())* c();", "Foo");
    assert_eq!(
        edges(&foo),
        [
            (0, "a()".to_string(), 1),
            (0, "c()".to_string(), 2),
            (1, "b()".to_string(), 3),
            (3, "a()".to_string(), 1),
            (3, "c()".to_string(), 2),
        ]
    );
    assert_eq!(finals(&foo), [2]);
}

#[test]
fn test_nested_star_does_not_duplicate_transitions() {
    let foo = diagram("Foo: (a()*)*;", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "a()".to_string(), 1), (1, "a()".to_string(), 1)]
    );
}

#[test]
fn test_trailing_rule_reference_delegates() {
    let foo = diagram("Foo: a() Bar; Bar: b();", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "a()".to_string(), 1), (1, "Bar".to_string(), 2)]
    );
    let delegation = foo.state(StateId(1)).unwrap().delegations().next().unwrap();
    assert_eq!(delegation.as_reference().unwrap().declaration().unwrap(), "Bar");
    assert_eq!(finals(&foo), [2]);
}

#[test]
fn test_delegation_may_recurse() {
    let list = diagram("List: item() List | end();", "List");
    assert_eq!(
        edges(&list),
        [
            (0, "item()".to_string(), 1),
            (0, "end()".to_string(), 2),
            (1, "List".to_string(), 3),
        ]
    );
}

#[test]
fn test_embedded_rule_reference_is_spliced() {
    let foo = diagram("Foo: Bar c(); Bar: b();", "Foo");
    assert_eq!(
        edges(&foo),
        [(0, "b()".to_string(), 1), (1, "c()".to_string(), 2)]
    );
    let spliced = foo.start().transitions()[0].label();
    assert_eq!(spliced.to_string(), "b()#L1C20,L1C6");
}

#[test]
fn test_spliced_rule_splices_its_own_trailing_reference() {
    let a = diagram("A: x() B y(); B: z() C; C: w();", "A");
    let labels: Vec<_> = edges(&a).into_iter().map(|(_, l, _)| l).collect();
    assert_eq!(labels, ["x()", "z()", "w()", "y()"]);
    // B itself still delegates to C
    let b = diagram("A: x() B y(); B: z() C; C: w();", "B");
    assert_eq!(b.start().transitions().len(), 1);
    assert!(b.state(StateId(1)).unwrap().delegations().next().is_some());
}

#[test]
fn test_splice_substitutes_type_arguments() {
    let foo = diagram("Foo[T]: Bar<T> done(); Bar[X]: put(X x, java.util.List<X> xs);", "Foo");
    let put = foo.start().transitions()[0].label().as_method().unwrap().clone();
    assert_eq!(put.to_string(), "put(T x, java.util.List<T> xs)");
}

#[test]
fn test_splice_substitutes_bounds_and_thrown_types() {
    let foo = diagram(
        "Foo[T]: Bar<T> done(); Bar[X]: put[S extends X](S s) throws X;",
        "Foo",
    );
    let put = foo.start().transitions()[0].label().as_method().unwrap().clone();
    assert_eq!(put.to_string(), "put[S extends T](S s) throws T");
}

#[rstest]
#[case::spliced_without_arguments("Foo: Bar x(); Bar[X]: put(X x);", 1, 0)]
#[case::spliced_with_extra_argument("Foo: Bar<String> x(); Bar: b();", 0, 1)]
#[case::delegated_without_arguments("Foo: x() Bar; Bar[X]: put(X x);", 1, 0)]
#[case::delegated_with_too_many("Foo: x() Bar<A, B>; Bar[X]: put(X x);", 1, 2)]
fn test_type_argument_count_must_match(
    #[case] input: &str,
    #[case] expected: usize,
    #[case] actual: usize,
) {
    let grammar = parse(input).unwrap();
    let err = build(&grammar).unwrap_err();
    assert!(
        matches!(
            err,
            ResolveError::TypeArgumentCount { expected: e, actual: a, .. } if e == expected && a == actual
        ),
        "{err:?}"
    );
    assert!(err.to_string().starts_with("Wrong number of type arguments for Bar"));
}

#[test]
fn test_type_argument_count_error_names_the_reference() {
    let grammar = parse("Foo: Bar x(); Bar[X]: put(X x);").unwrap();
    let err = build(&grammar).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Wrong number of type arguments for Bar: expected 1, found 0 (L1C6)"
    );
}

#[test]
fn test_matching_type_argument_counts_build() {
    assert_eq!(diagrams("Foo: Bar x(); Bar: b();").len(), 2);
    assert_eq!(diagrams("Foo: x() Bar<String>; Bar[X]: put(X x);").len(), 2);
}

#[test]
fn test_recursive_splice_fails() {
    let grammar = parse("Foo: Foo a();").unwrap();
    let err = build(&grammar).unwrap_err();
    assert!(matches!(err, ResolveError::Recursive { .. }));
    assert_eq!(err.to_string(), "Recursive rule: Foo (L1C6)");
}

#[test]
fn test_undefined_rule_in_chain_fails() {
    let grammar = parse("Foo: Baz a();").unwrap();
    let err = build(&grammar).unwrap_err();
    assert_eq!(err.to_string(), "Undefined rule: Baz (L1C6)");
}

#[test]
fn test_diagrams_keep_declaration_order() {
    let all = diagrams("C: A; A: a(); B: b();");
    let names: Vec<_> = all.iter().map(|d| d.name().to_string()).collect();
    assert_eq!(names, ["C", "A", "B"]);
}

#[test]
fn test_build_is_deterministic() {
    let input = "Foo[T]: (a(T t) | b())* c()? Bar<T>; Bar[U]: d(U u)+;";
    assert_eq!(diagrams(input), diagrams(input));
}

#[test]
fn test_every_state_is_reachable_from_start() {
    let foo = diagram("Foo: (a() | b()?)* (c() | d()+) e()?;", "Foo");
    let mut seen = vec![false; foo.states().len()];
    let mut stack = vec![StateId(0)];
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut seen[id.0], true) {
            continue;
        }
        for transition in foo.state(id).unwrap().transitions() {
            stack.push(transition.target());
        }
    }
    assert!(seen.into_iter().all(|s| s));
}
