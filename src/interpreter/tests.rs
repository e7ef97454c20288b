use indoc::indoc;

use super::*;
use crate::error::ErrorKind;
use crate::token::Position;

fn run_capturing(input: &str) -> (Result<Value, Error>, String) {
    let mut output = Vec::new();
    let result = Interpreter::with_output(Source::new(input), &mut output).run();
    (result, String::from_utf8(output).expect("utf-8 output"))
}

fn run(input: &str) -> Value {
    let (result, _) = run_capturing(input);
    result.expect("program should run")
}

fn printed(input: &str) -> String {
    let (result, output) = run_capturing(input);
    result.expect("program should run");
    output
}

fn failure(input: &str) -> Error {
    let (result, _) = run_capturing(input);
    result.expect_err("program should fail")
}

fn kind(input: &str) -> ErrorKind {
    failure(input).kind()
}

const TETRAHEDRON: &str = indoc! {"
    Polyhedron tetrahedron() {
        Point a = Point(0, 0, 0);
        Point b = Point(1, 0, 0);
        Point c = Point(0, 1, 0);
        Point d = Point(0, 0, 1);
        return Polyhedron(Line(a, b), Line(a, c), Line(a, d), Line(b, c), Line(b, d), Line(c, d));
    }
"};

#[test]
fn returns_literal_from_main() {
    assert_eq!(run("int main() { return 7; }"), Value::Int(7));
}

#[test]
fn assigns_and_reads_variables() {
    assert_eq!(
        run("int main() { int a = 2; a = a + 3; return a; }"),
        Value::Int(5)
    );
}

#[test]
fn takes_matching_if_branch() {
    assert_eq!(
        run("int main() { if (1 < 2) { return 1; } else { return 0; } }"),
        Value::Int(1)
    );
    assert_eq!(
        run("int main() { if (2 < 1) { return 1; } else { return 0; } }"),
        Value::Int(0)
    );
}

#[test]
fn runs_while_loop() {
    let input = indoc! {"
        int main() {
            int i = 0;
            int total = 0;
            while (i < 5) {
                i = i + 1;
                total = total + i;
            }
            return total;
        }
    "};
    assert_eq!(run(input), Value::Int(15));
}

#[test]
fn return_inside_while_ends_function() {
    let input = indoc! {"
        int main() {
            int i = 0;
            while (True) {
                i = i + 1;
                if (i == 3) { return i; }
            }
            return 0;
        }
    "};
    assert_eq!(run(input), Value::Int(3));
}

#[test]
fn return_skips_remaining_statements() {
    let input = indoc! {r#"
        int main() {
            print("before");
            return 1;
            print("after");
        }
    "#};
    assert_eq!(printed(input), "before\n");
}

#[test]
fn calls_functions_with_caller_arguments() {
    let input = indoc! {"
        int factorial(int n) {
            if (n <= 1) { return 1; }
            return n * factorial(n - 1);
        }

        int main() {
            int x = 5;
            return factorial(x);
        }
    "};
    assert_eq!(run(input), Value::Int(120));
}

#[test]
fn same_variable_name_in_different_functions() {
    let input = indoc! {"
        int helper() { int a = 10; return a; }
        int main() { int a = 1; return a + helper(); }
    "};
    assert_eq!(run(input), Value::Int(11));
}

#[test]
fn void_function_may_return_nothing() {
    let input = indoc! {r#"
        void greet(string name) { print("hi " + name); return; }
        void silent() { }
        int main() { greet("bob"); silent(); return 0; }
    "#};
    assert_eq!(printed(input), "hi bob\n");
}

#[test]
fn plus_coerces_strings_on_either_side() {
    let input = indoc! {r#"
        int main() {
            print("a" + 1);
            print(2.5 + "b");
            print("t" + True);
            return 0;
        }
    "#};
    assert_eq!(printed(input), "a1\n2.5b\ntTrue\n");
}

#[test]
fn arithmetic_rules() {
    let input = indoc! {r#"
        int main() {
            print(7 / 2);
            print(1 + 2.0);
            print(3 * 2);
            print("ab" * 3);
            print(2 * "c");
            print("x" * -1);
            print(-4 - 1);
            return 0;
        }
    "#};
    assert_eq!(printed(input), "3.5\n3.0\n6\nababab\ncc\n\n-5\n");
}

#[test]
fn rejects_invalid_operand_types() {
    assert_eq!(kind(r#"int main() { int a = 1 - "a"; return 0; }"#), ErrorKind::InvalidType);
    assert_eq!(kind(r#"int main() { string a = "a" * "b"; return 0; }"#), ErrorKind::InvalidType);
    assert_eq!(kind(r#"int main() { string a = "a" * 1.5; return 0; }"#), ErrorKind::InvalidType);
    assert_eq!(kind(r#"int main() { bool a = "a" < "b"; return 0; }"#), ErrorKind::InvalidType);
    assert_eq!(kind("int main() { bool a = True == False; return 0; }"), ErrorKind::InvalidType);
    assert_eq!(kind("int main() { bool a = !1; return 0; }"), ErrorKind::InvalidType);
    assert_eq!(kind(r#"int main() { int a = -"a"; return 0; }"#), ErrorKind::InvalidType);
}

#[test]
fn compares_numbers_and_strings() {
    let input = indoc! {r#"
        int main() {
            print(1 < 2.5);
            print(2 >= 2);
            print(1 == 1.0);
            print("a" == "a");
            print("a" != "a");
            return 0;
        }
    "#};
    assert_eq!(printed(input), "True\nTrue\nTrue\nTrue\nFalse\n");
}

#[test]
fn logical_operators_evaluate_both_sides() {
    assert_eq!(
        printed("int main() { print(True and False); print(False or True); return 0; }"),
        "False\nTrue\n"
    );
    assert_eq!(
        kind("int main() { bool a = False and 1; return 0; }"),
        ErrorKind::InvalidType
    );
}

#[test]
fn division_by_zero_is_checked_first() {
    let error = failure("int main() { return 4 / 0; }");
    assert_eq!(error.kind(), ErrorKind::DivisionByZero);
    assert_eq!(error.position(), Some(Position::new(21, 1)));
    assert_eq!(
        kind(r#"int main() { float a = "x" / 0.0; return 0; }"#),
        ErrorKind::DivisionByZero
    );
}

#[test]
fn integer_overflow_is_an_error() {
    assert_eq!(
        kind("int main() { return 999999999999999 * 999999999999999; }"),
        ErrorKind::IntegerOverflow
    );
}

#[test]
fn oversized_string_repetition_is_an_error() {
    let input = indoc! {r#"
        int main() {
            int n = 999999999999999 * 9000;
            string s = "ab" * n;
            return 0;
        }
    "#};
    let error = failure(input);
    assert_eq!(error.kind(), ErrorKind::IntegerOverflow);
    assert_eq!(error.position(), Some(Position::new(16, 3)));
    assert_eq!(
        kind(r#"int main() { string s = 2000000000 * "abc"; return 0; }"#),
        ErrorKind::IntegerOverflow
    );
}

#[test]
fn declarations_default_to_zero_values() {
    let input = indoc! {"
        int main() {
            int a;
            float b;
            string s;
            bool t;
            Point p;
            List l;
            print(a);
            print(b);
            print(s);
            print(t);
            print(p);
            print(l);
            return 0;
        }
    "};
    assert_eq!(printed(input), "0\n0.0\n\nFalse\nPoint(0, 0, 0)\n[]\n");
}

#[test]
fn builds_and_queries_polyhedron() {
    let input = format!(
        "{TETRAHEDRON}{}",
        indoc! {"
            int main() {
                Polyhedron t = tetrahedron();
                print(t.points().length());
                print(t.points().get(1));
                return t.lines().length();
            }
        "}
    );
    let (result, output) = run_capturing(&input);
    assert_eq!(result, Ok(Value::Int(6)));
    assert_eq!(output, "4\nPoint(1, 0, 0)\n");
}

#[test]
fn rejects_polyhedron_with_underconnected_point() {
    let input = indoc! {"
        int main() {
            Point a = Point(0, 0, 0);
            Point b = Point(1, 0, 0);
            Point c = Point(0, 1, 0);
            Polyhedron t = Polyhedron(Line(a, b), Line(b, c), Line(c, a));
            return 0;
        }
    "};
    assert_eq!(kind(input), ErrorKind::InvalidType);
}

#[test]
fn collections_hold_polyhedrons() {
    let input = format!(
        "{TETRAHEDRON}{}",
        indoc! {"
            int main() {
                Collection c = Collection(tetrahedron());
                c.append(tetrahedron());
                return c.length();
            }
        "}
    );
    assert_eq!(run(&input), Value::Int(2));
    assert_eq!(
        kind("int main() { Collection c = Collection(); c.append(1); return 0; }"),
        ErrorKind::InvalidType
    );
    assert_eq!(
        kind("int main() { Collection c = Collection(Point(0, 0, 0)); return 0; }"),
        ErrorKind::InvalidType
    );
}

#[test]
fn lists_are_shared_between_variables() {
    let input = indoc! {r#"
        int main() {
            List l = List(1, "two");
            List alias = l;
            alias.append(3.0);
            print(l);
            return l.length();
        }
    "#};
    let (result, output) = run_capturing(input);
    assert_eq!(result, Ok(Value::Int(3)));
    assert_eq!(output, "[1, two, 3.0]\n");
}

#[test]
fn appending_a_list_to_itself_is_rejected() {
    let (result, output) = run_capturing(indoc! {"
        int main() {
            List l = List(1);
            print(l);
            l.append(l);
            print(l);
            return 0;
        }
    "});
    assert_eq!(output, "[1]\n");
    let error = result.expect_err("self append should fail");
    assert_eq!(error.kind(), ErrorKind::InvalidType);
    assert_eq!(error.position(), Some(Position::new(7, 4)));

    let input = indoc! {"
        int main() {
            List a = List();
            List b = List(a);
            a.append(b);
            return 0;
        }
    "};
    assert_eq!(kind(input), ErrorKind::InvalidType);
}

#[test]
fn calls_methods_on_inline_values() {
    assert_eq!(run("int main() { return Point(1, 2, 3).y(); }"), Value::Int(2));
    assert_eq!(
        printed(indoc! {"
            int main() {
                Line l = Line(Point(0, 0, 0), Point(3, 4, 0));
                print(l.length());
                print(l.end().x());
                return 0;
            }
        "}),
        "5.0\n3\n"
    );
}

#[test]
fn method_errors() {
    assert_eq!(
        kind("int main() { Point p = Point(1, 2, 3); p.length(); return 0; }"),
        ErrorKind::InvalidMethodCall
    );
    assert_eq!(
        kind("int main() { int a = 1; a.x(); return 0; }"),
        ErrorKind::InvalidMethodCall
    );
    assert_eq!(
        kind("int main() { List l = List(); l.get(0); return 0; }"),
        ErrorKind::IndexOutOfBounds
    );
    assert_eq!(
        kind("int main() { List l = List(); l.append(); return 0; }"),
        ErrorKind::InvalidNumberOfArguments
    );
    assert_eq!(
        kind("int main() { missing.x(); return 0; }"),
        ErrorKind::UndeclaredVariable
    );
}

#[test]
fn constructor_argument_errors() {
    assert_eq!(
        kind("int main() { Point p = Point(1, 2); return 0; }"),
        ErrorKind::InvalidNumberOfArguments
    );
    assert_eq!(
        kind(r#"int main() { Point p = Point(1, 2, "3"); return 0; }"#),
        ErrorKind::InvalidType
    );
    assert_eq!(
        kind("int main() { Line l = Line(Point(0, 0, 0), 1); return 0; }"),
        ErrorKind::InvalidType
    );
    assert_eq!(
        kind("int main() { Polyhedron p = Polyhedron(); return 0; }"),
        ErrorKind::InvalidNumberOfArguments
    );
    assert_eq!(
        kind("int main() { print(1, 2); return 0; }"),
        ErrorKind::InvalidNumberOfArguments
    );
}

#[test]
fn program_validation() {
    assert_eq!(kind("int helper() { return 1; }"), ErrorKind::MainFunctionNotFound);
    assert_eq!(kind("int main(int a) { return a; }"), ErrorKind::MainFunctionNotFound);
    assert_eq!(kind("float main() { return 1.0; }"), ErrorKind::MainFunctionNotFound);
    assert_eq!(
        kind("int main() { return 1; } int main() { return 2; }"),
        ErrorKind::Redefinition
    );
    assert_eq!(
        kind("void main(int a) { } int main() { return 2; }"),
        ErrorKind::Redefinition
    );
    assert_eq!(
        kind("void print(int a) { } int main() { return 0; }"),
        ErrorKind::Redefinition
    );
    assert_eq!(
        kind("int f() { return 1; } int f() { return 2; } int main() { return 0; }"),
        ErrorKind::Redefinition
    );
}

#[test]
fn variable_redefinition_in_same_function() {
    let error = failure("int main() { int a = 1; float a = 2.0; return 0; }");
    assert_eq!(error.kind(), ErrorKind::Redefinition);
    assert_eq!(error.position(), Some(Position::new(25, 1)));

    let error = failure(r#"int main() { int a = 1; int a = "x"; return 0; }"#);
    assert_eq!(error.kind(), ErrorKind::Redefinition);
    assert_eq!(error.position(), Some(Position::new(25, 1)));
}

#[test]
fn undeclared_names() {
    let error = failure("int main() {\n    return y;\n}");
    assert_eq!(error.kind(), ErrorKind::UndeclaredVariable);
    assert_eq!(error.position(), Some(Position::new(12, 2)));

    assert_eq!(kind("int main() { y = 1; return 0; }"), ErrorKind::UndeclaredVariable);
    assert_eq!(kind("int main() { nope(); return 0; }"), ErrorKind::UndeclaredFunction);
    assert_eq!(
        kind("int f() { return 1; } int main() { int a = f; return 0; }"),
        ErrorKind::UndeclaredVariable
    );
    assert_eq!(
        kind("int main() { string a = print; return 0; }"),
        ErrorKind::UndeclaredVariable
    );
}

#[test]
fn conditions_must_be_bool() {
    assert_eq!(kind("int main() { if (1) { } return 0; }"), ErrorKind::InvalidCondition);
    assert_eq!(kind("int main() { while (\"a\") { } return 0; }"), ErrorKind::InvalidCondition);
}

#[test]
fn type_checks_assignments_parameters_and_returns() {
    assert_eq!(
        kind("int main() { int a = 1; a = 1.5; return 0; }"),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        kind(r#"int main() { int a = "s"; return 0; }"#),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        kind("int f(int a) { return a; } int main() { return f(1.0); }"),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        kind("int f(int a) { return a; } int main() { return f(1, 2); }"),
        ErrorKind::InvalidNumberOfArguments
    );
    assert_eq!(
        kind(r#"int f() { return "s"; } int main() { return f(); }"#),
        ErrorKind::InvalidReturnType
    );
    assert_eq!(
        kind("void f() { return 1; } int main() { f(); return 0; }"),
        ErrorKind::InvalidReturnType
    );
    assert_eq!(
        kind("int f() { int a = 1; } int main() { return f(); }"),
        ErrorKind::InvalidReturnType
    );
    assert_eq!(
        kind("Point f() { return Line(Point(0, 0, 0), Point(0, 0, 0)); } int main() { f(); return 0; }"),
        ErrorKind::InvalidReturnType
    );
}

#[test]
fn frontend_errors_are_classified() {
    assert_eq!(kind("int main() { return @; }"), ErrorKind::InvalidToken);
    assert_eq!(kind("int main() { return \"open; }"), ErrorKind::InvalidSyntax);
    assert_eq!(kind(r#"int main() { print("\q"); return 0; }"#), ErrorKind::UndefinedEscapeChar);
    assert_eq!(kind("int main() { return 1 }"), ErrorKind::InvalidSyntax);
}

#[test]
fn honours_lexer_config() {
    let mut output = Vec::new();
    let error = Interpreter::with_output(Source::new("int main() { return 1234; }"), &mut output)
        .with_config(LexerConfig::default().with_max_int_length(3))
        .run()
        .expect_err("integer should be too long");
    assert_eq!(error.kind(), ErrorKind::ExceedsMaxLength);
}
