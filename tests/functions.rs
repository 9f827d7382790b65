mod common;

use aks::Value;
use common::{num, output_of, run, string};

// ==========================================
// Declaration and calls
// ==========================================

#[test]
fn test_simple_call() {
    assert_eq!(run("fn add(a, b) { return a + b }\nadd(3, 4)"), num(7.0));
}

#[test]
fn test_declaration_yields_null() {
    assert_eq!(run("fn f() { return 1 }"), Value::Null);
}

#[test]
fn test_implicit_result_is_last_statement() {
    assert_eq!(run("fn double(x) { x * 2 }\ndouble(21)"), num(42.0));
    assert_eq!(run("fn empty() { }\nempty()"), Value::Null);
}

#[test]
fn test_missing_arguments_are_null() {
    assert_eq!(run("fn second(a, b) { return b }\nsecond(1)"), Value::Null);
}

#[test]
fn test_extra_arguments_are_ignored() {
    assert_eq!(run("fn first(a) { return a }\nfirst(1, 2, 3)"), num(1.0));
}

#[test]
fn test_functions_are_values() {
    let source = r#"
fn square(x) { return x * x }
fn apply(f, v) { return f(v) }
apply(square, 5)
"#;
    assert_eq!(run(source), num(25.0));
}

#[test]
fn test_line_break_before_arguments() {
    let source = "fn times_ten(n) { return n * 10 }\nbind r to times_ten\n(2)\nr";
    assert_eq!(run(source), num(20.0));
}

#[test]
fn test_line_break_inside_arguments() {
    let source = "fn add(a, b) { return a + b }\nadd(\n  1,\n  2\n)";
    assert_eq!(run(source), num(3.0));
}

#[test]
fn test_arguments_evaluated_left_to_right() {
    let source = r#"
fn show(label) { mirror label
    return label }
fn pair(a, b) { return [a, b] }
pair(show("left"), show("right"))
"#;
    assert_eq!(output_of(source), "left\nright\n");
}

// ==========================================
// Closures
// ==========================================

#[test]
fn test_closure_captures_defining_scope() {
    let source = r#"
fn make_adder(n) {
    fn add(x) { return x + n }
    return add
}
bind add5 to make_adder(5)
bind add10 to make_adder(10)
bind results to [add5(1), add10(1)]
results
"#;
    assert_eq!(run(source), Value::list(vec![num(6.0), num(11.0)]));
}

#[test]
fn test_counter_keeps_state() {
    let source = r#"
fn counter() {
    bind count to 0
    fn next() {
        count = count + 1
        return count
    }
    return next
}
bind tick to counter()
tick()
tick()
tick()
"#;
    assert_eq!(run(source), num(3.0));
}

#[test]
fn test_lexical_not_dynamic_scope() {
    let source = r#"
bind who to "global"
fn reveal() { return who }
fn caller() {
    bind who to "caller"
    return reveal()
}
caller()
"#;
    assert_eq!(run(source), string("global"));
}

#[test]
fn test_parameters_do_not_leak() {
    let source = "fn f(secret) { return secret }\nf(1)\nwhoami()";
    let names = run(source);
    assert!(!names.as_list().unwrap().contains(&string("secret")));
}

// ==========================================
// Recursion
// ==========================================

#[test]
fn test_factorial() {
    let source = r#"
fn fact(n) {
    if n <= 1 { return 1 }
    return n * fact(n - 1)
}
fact(10)
"#;
    assert_eq!(run(source), num(3628800.0));
}

#[test]
fn test_fibonacci() {
    let source = r#"
fn fib(n) {
    if n < 2 { return n }
    return fib(n - 1) + fib(n - 2)
}
fib(15)
"#;
    assert_eq!(run(source), num(610.0));
}

#[test]
fn test_mutual_recursion() {
    let source = r#"
fn is_even(n) { if n == 0 { return true } return is_odd(n - 1) }
fn is_odd(n) { if n == 0 { return false } return is_even(n - 1) }
[is_even(10), is_odd(7)]
"#;
    assert_eq!(run(source), Value::list(vec![Value::Bool(true), Value::Bool(true)]));
}
