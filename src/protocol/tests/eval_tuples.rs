/// eval_tuples.rs
///
/// Tests for constructing, printing and rebinding tuples.

use super::*;

#[test]
fn test_printing_tuples() {
    Tester::new_single_source_expect_ok("flat", "print (1, 2, 3); print ();")
        .assert_output(&["(1, 2, 3)", "()"]);

    Tester::new_single_source_expect_ok("mixed", "print (1, \"two\", int, (3, ()));")
        .assert_output(&["(1, two, <type int>, (3, ()))"]);

    Tester::new_single_source_expect_ok("source order", "let a = 1; let b = 2; print (b, a, b);")
        .assert_output(&["(2, 1, 2)"]);
}

#[test]
fn test_tuples_in_bindings() {
    Tester::new_single_source_expect_ok("nested", "
        let inner = (1, 2);
        let outer = (inner, inner, 3);
        print outer;
    ")
        .assert_output(&["((1, 2), (1, 2), 3)"])
        .assert_bound("inner", "(1, 2)");

    Tester::new_single_source_expect_ok("aliasing", "
        let a = (1, 2);
        let b = a;
        a = (3,);
        print a;
        print b;
    ").assert_output(&["(3)", "(1, 2)"]);
}

#[test]
fn test_tuple_reassignment_checks_type() {
    Tester::new_single_source_expect_ok("any tuple fits", "let t = (1, 2); t = (); t = (\"a\", \"b\", \"c\");")
        .assert_bound("t", "(a, b, c)");

    Tester::new_single_source_expect_err("int for tuple", "let t = (1, 2); t = 5;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("expected type 'tuple' and provided type 'int'")
        .assert_bound("t", "(1, 2)");
}

#[test]
fn test_printing_deeply_nested_tuple() {
    // Nested one statement at a time, so the parser never recurses deeply
    const DEPTH: usize = 10_000;
    let mut source = String::from("let t = (1,);\n");
    for _ in 0..DEPTH {
        source.push_str("t = (t,);\n");
    }
    source.push_str("print t;\n");

    let expected = format!("{}1{}", "(".repeat(DEPTH + 1), ")".repeat(DEPTH + 1));
    Tester::new_single_source_expect_ok("deep chain", source)
        .assert_output(&[expected.as_str()])
        .assert_registry_size(2 * (DEPTH + 1));
}
