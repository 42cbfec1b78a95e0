// Parser robustness tests for STAR
//
// Table-driven suites: every case is tokenized and parsed, and the outcome is
// compared with the expectation. Panics are caught and reported as crashes.

use star::error::StarError;
use star::parser::Parser;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite, returning one line per failed or crashed
    /// case.
    pub fn run(&self) -> Vec<String> {
        self.tests
            .iter()
            .filter_map(|test| match run_single_test(test) {
                TestResult::Pass => None,
                TestResult::Fail(msg) => Some(format!("{}/{}: {}", self.name, test.name, msg)),
                TestResult::Crash(msg) => {
                    Some(format!("{}/{}: crashed: {}", self.name, test.name, msg))
                }
            })
            .collect()
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    match result {
        Ok(parse_result) => match (parse_result, test.should_succeed) {
            (Ok(_), true) => TestResult::Pass,
            (Ok(_), false) => {
                TestResult::Fail("Expected parsing to fail, but it succeeded".to_string())
            }
            (Err(error), false) => match &test.expected_error_contains {
                Some(expected) if !error.message.contains(expected.as_str()) => {
                    TestResult::Fail(format!(
                        "Error message '{}' doesn't contain expected text '{}'",
                        error.message, expected
                    ))
                }
                _ => TestResult::Pass,
            },
            (Err(error), true) => TestResult::Fail(format!(
                "Expected parsing to succeed, but got error: {}",
                error
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Parse input and return result
fn parse_input(input: &str) -> Result<star::ast::Program, StarError> {
    Parser::from_source(input).parse()
}

impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_statement_shape_tests() -> TestSuite {
    let mut suite = TestSuite::new("Statement Shapes");

    suite.add_test(TestCase::should_succeed("declaration", "int x."));
    suite.add_test(TestCase::should_succeed("declaration_with_value", "int x is 5."));
    suite.add_test(TestCase::should_succeed("declaration_equals", "int x = 5."));
    suite.add_test(TestCase::should_succeed("text_declaration", "text s is \"hi\"."));
    suite.add_test(TestCase::should_succeed("declaration_list", "int a, b is 2, c."));
    suite.add_test(TestCase::should_succeed("assignment", "x is 1."));
    suite.add_test(TestCase::should_succeed("assignment_from_variable", "x is y."));
    suite.add_test(TestCase::should_succeed("arithmetic_add", "x is a + b."));
    suite.add_test(TestCase::should_succeed("arithmetic_subtract", "x = 1 - 2."));
    suite.add_test(TestCase::should_succeed("write_many", "write x, \"a\" y."));
    suite.add_test(TestCase::should_succeed("read", "read \"name\", who."));
    suite.add_test(TestCase::should_succeed("blank_line", "newLine."));
    suite.add_test(TestCase::should_succeed("comment", "/* note */ int x. /* another */"));

    suite.add_test(TestCase::should_fail_with_message(
        "missing_terminator",
        "int x is 5",
        "Expected '.' at the end of the statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "empty_statement",
        ".",
        "Parsing error!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_operator",
        "x 5.",
        "Parsing error!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "literal_target",
        "5 is x.",
        "Parsing error!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "paren_statement",
        "(x).",
        "Parsing error!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "tokens_before_blank_line",
        "write x newLine.",
        "Expected '.' at the end of the statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "times_outside_loop",
        "int x times",
        "'times' can only end a loop header!",
    ));

    suite
}

fn create_declaration_tests() -> TestSuite {
    let mut suite = TestSuite::new("Declarations");

    suite.add_test(TestCase::should_fail_with_message(
        "declaration_of_literal",
        "int 5.",
        "Invalid variable initialization",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "declaration_with_arithmetic",
        "int x is a + b.",
        "Invalid variable initialization",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "declaration_missing_value",
        "int x is.",
        "Invalid variable initialization",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "declaration_negative",
        "int x is -4.",
        "Negative values are not allowed!",
    ));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignments");

    suite.add_test(TestCase::should_fail_with_message(
        "negative_literal",
        "x is -5.",
        "Negative values are not allowed!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_value",
        "x is.",
        "Invalid assignment!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "keyword_value",
        "x is int.",
        "'int' is a keyword and cannot be used as a value!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "three_operands",
        "x is 1 + 2 + 3.",
        "Invalid arithmetic assignment!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "two_values_no_operator",
        "x is 1 2.",
        "Invalid arithmetic assignment!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_right_operand",
        "x is 1 +.",
        "Invalid arithmetic assignment!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unsupported_operator",
        "x is 1 * 2.",
        "Unrecognized character: '*'!",
    ));

    suite
}

fn create_io_statement_tests() -> TestSuite {
    let mut suite = TestSuite::new("Input and Output");

    suite.add_test(TestCase::should_fail_with_message(
        "empty_write",
        "write.",
        "Invalid output statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "write_integer_literal",
        "write 5.",
        "Invalid output statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "write_trailing_comma",
        "write x,.",
        "Invalid output statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "write_doubled_comma",
        "write x,, y.",
        "Invalid output statement!",
    ));
    suite.add_test(TestCase::should_succeed(
        "write_without_commas",
        "write \"a\" x y.",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "read_without_prompt",
        "read x.",
        "Invalid input!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "read_without_comma",
        "read \"p\" x.",
        "Invalid input!",
    ));

    suite
}

fn create_loop_tests() -> TestSuite {
    let mut suite = TestSuite::new("Loops");

    suite.add_test(TestCase::should_succeed("simple_loop", "loop 3 times { write x. }"));
    suite.add_test(TestCase::should_succeed("empty_body", "loop 3 times { }"));
    suite.add_test(TestCase::should_succeed("variable_count", "loop n times { x is x + 1. }"));
    suite.add_test(TestCase::should_succeed(
        "nested_loops",
        "loop 2 times { loop 3 times { write x. } write y. }",
    ));
    suite.add_test(TestCase::should_succeed(
        "compounded_headers",
        "loop 2 times loop 3 times { write x. }",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unclosed_body",
        "loop 3 times { write x.",
        "Expected '}' after loop body!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "stray_closing_brace",
        "}",
        "Unexpected '}' without a matching loop!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_times",
        "loop 3 { write x. }",
        "Unexpected '{'!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_body",
        "loop 3 times write x.",
        "Expected '{' after loop header!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "text_literal_count",
        "loop \"a\" times { }",
        "Invalid loop statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "header_ended_by_dot",
        "loop 3.",
        "Invalid loop statement!",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "statement_without_dot_in_body",
        "loop 3 times { write x }",
        "Expected '.' at the end of the statement!",
    ));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));
    suite.add_test(TestCase::should_succeed("only_comment", "/* nothing here */"));

    let deep = "loop 1 times { ".repeat(50) + "write x." + &" }".repeat(50);
    suite.add_test(TestCase::should_succeed("deeply_nested_loops", &deep));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    let suites = vec![
        create_statement_shape_tests(),
        create_declaration_tests(),
        create_assignment_tests(),
        create_io_statement_tests(),
        create_loop_tests(),
        create_edge_case_tests(),
    ];

    let failures: Vec<String> = suites.iter().flat_map(TestSuite::run).collect();

    assert!(
        failures.is_empty(),
        "{} parser cases failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
