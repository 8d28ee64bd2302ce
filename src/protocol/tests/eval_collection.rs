/// eval_collection.rs
///
/// Tests for the collection cycle that runs after every statement. Each tuple
/// takes two allocations: the tuple itself and its element buffer.

use super::*;

#[test]
fn test_discarded_tuples_are_collected() {
    Tester::new("discarded", "let t = (1, 2);\n(3, 4);")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&["Collected 0; from 2 to 2", "Collected 2; from 4 to 2"])
        .assert_registry_size(2)
        .assert_bound("t", "(1, 2)");

    Tester::new("printed", "print (1, 2, 3);")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&["(1, 2, 3)", "Collected 2; from 2 to 0"])
        .assert_registry_size(0);

    Tester::new_single_source_expect_ok("typeof", "let k = typeof ((1, 2), 3);")
        .assert_bound("k", "<type tuple>")
        .assert_registry_size(0);
}

#[test]
fn test_reachable_tuples_survive() {
    Tester::new("nested", "let t = ((1, 2), (3,));\nprint t;")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&[
            "Collected 0; from 6 to 6",
            "((1, 2), (3))",
            "Collected 0; from 6 to 6",
        ]);

    Tester::new("shared", "let a = (1,);\nlet b = (a, a);\na = 0;")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&[
            "Collected 0; from 2 to 2",
            "Collected 0; from 4 to 4",
            "Collected 0; from 4 to 4",
        ])
        .assert_bound("b", "((1), (1))");
}

#[test]
fn test_rebinding_releases_tuples() {
    Tester::new("reassigned", "let t = (1, 2);\nt = (3,);\nt = ();")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&[
            "Collected 0; from 2 to 2",
            "Collected 2; from 4 to 2",
            "Collected 2; from 4 to 2",
        ])
        .assert_bound("t", "()");

    Tester::new_single_source_expect_ok("deep chain released", "
        let t = (((((1,),),),),);
        t = 0;
    ")
        .assert_registry_size(0)
        .assert_bound_value("t", Value::Integer(0));
}

#[test]
fn test_statements_without_allocations() {
    Tester::new("no tuples", "let x = 1;\nprint x;")
        .with_collection_reports()
        .run()
        .expect_ok()
        .assert_output(&["Collected 0; from 0 to 0", "1", "Collected 0; from 0 to 0"]);
}

#[test]
fn test_failed_statement_skips_collection() {
    Tester::new("fails before collecting", "let t = (1, 2);\nlet u: int = (3, 4);")
        .with_collection_reports()
        .run()
        .expect_err()
        .assert_eval_kind(EvalErrorKind::TypeMismatch)
        .assert_output(&["Collected 0; from 2 to 2"])
        .assert_unbound("u");
}
