//! CLI integration tests for siq commands.
//!
//! These tests pin exit codes and the canonical output; the dot output is
//! checked loosely since its exact layout is a debugging aid.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a siq command.
fn siq() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("siq").unwrap()
}

mod query {
    use super::*;

    #[test]
    fn prints_canonical_form() {
        siq()
            .args(["query", "@a:[1 2]"])
            .assert()
            .success()
            .stdout("(and a >= 1, a <= 2)\n");
    }

    #[test]
    fn rejects_invalid_syntax() {
        siq()
            .args(["query", "@a:["])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid syntax"));
    }

    #[test]
    fn dot_output_renders_a_digraph() {
        siq()
            .args(["query", "--dot", "@a:{x|y}"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("digraph {"))
            .stdout(predicate::str::contains("OrExpr"));
    }
}

mod sql {
    use super::*;

    #[test]
    fn prints_canonical_form() {
        siq()
            .args(["sql", "select * from idx where 2 <= e limit 5"])
            .assert()
            .success()
            .stdout("select * from idx where e >= 2 limit 0, 5\n");
    }

    #[test]
    fn rejects_invalid_syntax() {
        siq()
            .args(["sql", "select * from idx where"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid syntax"));
    }

    #[test]
    fn dot_output_renders_a_digraph() {
        siq()
            .args(["sql", "--dot", "select a from b order by a desc"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("digraph {"))
            .stdout(predicate::str::contains("SearchStmt"))
            .stdout(predicate::str::contains("SortBy (desc)"));
    }
}
