/// eval_types.rs
///
/// Tests for `typeof`, type annotations and structural type validation.

use super::*;

#[test]
fn test_typeof() {
    Tester::new_single_source_expect_ok("primitives", "
        print typeof 5;
        print typeof 6;
        print typeof \"text\";
        print typeof int;
        print typeof typeof 1;
        print typeof (1, 2);
        print typeof ();
    ").assert_output(&[
        "<type int>", "<type int>", "<type string>", "<type type>",
        "<type type>", "<type tuple>", "<type tuple>",
    ]);

    Tester::new_single_source_expect_ok("structural", "
        let five = typeof 5;
        let six = typeof 6;
        let pair = typeof (1, 2);
    ")
        .assert_same_value("five", "six")
        .assert_bound("pair", "<type tuple>");
}

#[test]
fn test_builtin_types() {
    Tester::new_single_source_expect_ok("printing", "print int; print string; print type; print tuple;")
        .assert_output(&["<type int>", "<type string>", "<type type>", "<type tuple>"]);

    Tester::new_single_source_expect_ok("annotations", "
        let i: int = 1;
        let s: string = \"s\";
        let t: type = int;
        let u: tuple = (1, \"two\");
        let e: tuple = ();
    ")
        .assert_bound("t", "<type int>")
        .assert_bound("u", "(1, two)")
        .assert_bound("e", "()");
}

#[test]
fn test_annotation_mismatch() {
    Tester::new_single_source_expect_err("string for int", "let x: string = 5;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("expected type 'string' and provided type 'int'")
        .assert_occurs_at("string =")
        .assert_unbound("x");

    Tester::new_single_source_expect_err("tuple for int", "let x: int = (1,);")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("expected type 'int' and provided type 'tuple'")
        .assert_unbound("x");

    Tester::new_single_source_expect_err("int for tuple", "let x: tuple = 1;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_unbound("x");

    Tester::new_single_source_expect_err("type for int", "let x: int = int;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("provided type 'type'");
}

#[test]
fn test_annotation_is_not_a_type() {
    Tester::new_single_source_expect_err("integer", "let x: 5 = 5;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("annotation is not a type, it is a value of type 'int'")
        .assert_occurs_at("5 =")
        .assert_unbound("x");

    Tester::new_single_source_expect_err("variable holding a value", "let n = 1; let x: n = 2;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_unbound("x");
}

#[test]
fn test_computed_annotations() {
    Tester::new_single_source_expect_ok("typeof annotation", "
        let t = typeof 1;
        let x: t = 7;
        let y: typeof x = 8;
        let z: typeof t = string;
        print x;
        print y;
        print z;
    ").assert_output(&["7", "8", "<type string>"]);

    Tester::new_single_source_expect_err("typeof mismatch", "let x: typeof \"s\" = 7;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch);
}

#[test]
fn test_type_values_are_reassignable() {
    Tester::new_single_source_expect_ok("type to type", "let t: type = int; t = string; print t;")
        .assert_output(&["<type string>"]);

    Tester::new_single_source_expect_err("type to int", "let t: type = int; t = 5;")
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_msg_has("expected type 'type' and provided type 'int'")
        .assert_bound("t", "<type int>");
}
