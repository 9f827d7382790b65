mod common;

use aks::Value;
use common::{num, output_of, run, run_capturing};

// ==========================================
// If / else
// ==========================================

#[test]
fn test_if_true_branch() {
    assert_eq!(output_of("if 1 < 2 { mirror \"yes\" } else { mirror \"no\" }"), "yes\n");
}

#[test]
fn test_if_false_branch() {
    assert_eq!(output_of("if 1 > 2 { mirror \"yes\" } else { mirror \"no\" }"), "no\n");
}

#[test]
fn test_if_without_else_yields_null() {
    assert_eq!(run("if false { 1 }"), Value::Null);
}

#[test]
fn test_else_if_chain() {
    let source = r#"
fn grade(score) {
    if score >= 90 {
        return "A"
    } else if score >= 80 {
        return "B"
    } else {
        return "C"
    }
}
mirror grade(95)
mirror grade(85)
mirror grade(10)
"#;
    assert_eq!(output_of(source), "A\nB\nC\n");
}

#[test]
fn test_truthiness_of_conditions() {
    let source = r#"
if 0 { mirror "zero" }
if "" { mirror "empty" }
if [] { mirror "list" }
if "text" { mirror "text" }
"#;
    assert_eq!(output_of(source), "text\n");
}

#[test]
fn test_if_body_has_own_scope() {
    let source = "if true { bind inner to 1 }\ninner";
    let (result, _) = run_capturing(source, "");
    assert!(result.is_err());
}

#[test]
fn test_if_body_assigns_outer_variable() {
    assert_eq!(run("bind x to 1\nif true { x = 2 }\nx"), num(2.0));
}

#[test]
fn test_shadowing_inside_block() {
    let source = "bind x to 1\nif true { bind x to 99\nmirror x }\nmirror x";
    assert_eq!(output_of(source), "99\n1\n");
}

// ==========================================
// While
// ==========================================

#[test]
fn test_while_counts() {
    let source = "bind i to 0\nwhile i < 3 {\n    mirror i\n    i = i + 1\n}";
    assert_eq!(output_of(source), "0\n1\n2\n");
}

#[test]
fn test_while_never_runs() {
    assert_eq!(output_of("while false { mirror 1 }"), "");
}

#[test]
fn test_while_accumulates() {
    let source = r#"
bind total to 0
bind i to 1
while i <= 10 {
    total = total + i
    i = i + 1
}
total
"#;
    assert_eq!(run(source), num(55.0));
}

#[test]
fn test_while_body_scope_is_fresh_each_iteration() {
    let source = r#"
bind i to 0
while i < 2 {
    bind seen to i
    mirror seen
    i = i + 1
}
"#;
    assert_eq!(output_of(source), "0\n1\n");
}

// ==========================================
// Return
// ==========================================

#[test]
fn test_return_from_inside_loop() {
    let source = r#"
fn first_over(xs, limit) {
    bind i to 0
    while i < len(xs) {
        if xs[i] > limit { return xs[i] }
        i = i + 1
    }
    return null()
}
first_over([1, 5, 9, 12], 6)
"#;
    assert_eq!(run(source), num(9.0));
}

#[test]
fn test_top_level_return_ends_program() {
    let (result, output) = run_capturing("mirror \"before\"\nreturn 3\nmirror \"after\"", "");
    assert_eq!(result.unwrap(), num(3.0));
    assert_eq!(output, "before\n");
}

#[test]
fn test_bare_return() {
    assert_eq!(run("fn nothing() { return }\nnothing()"), Value::Null);
}
