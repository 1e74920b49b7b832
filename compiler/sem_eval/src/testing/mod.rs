//! `@Test` runner.
//!
//! Every `@Test([arguments...], expected)` annotation on a function of the
//! main module is one case: the literals are decoded with the function's
//! argument and return types, the function is interpreted, and the result
//! is compared structurally with the expected value.
//!
//! Cases share nothing but the interpreter, so they run on a rayon pool
//! when [`TestRunnerOptions::parallel`] is set.

use std::fmt;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use sem_ir::ast::AnnotationArgument;
use sem_ir::typed::ValidatedFunction;
use sem_ir::EntityId;

use crate::interpreter::Interpreter;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TestRunnerOptions {
    /// Run cases in parallel.
    pub parallel: bool,
}

impl Default for TestRunnerOptions {
    fn default() -> Self {
        TestRunnerOptions { parallel: true }
    }
}

/// Outcome of one `@Test` case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// The function returned something other than the expected value.
    Failed { expected: String, actual: String },
    /// A literal could not be decoded or evaluation failed.
    Error(String),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        !self.is_passed()
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Passed => f.write_str("passed"),
            TestOutcome::Failed { expected, actual } => {
                write!(f, "failed: expected {expected}, got {actual}")
            }
            TestOutcome::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TestCaseResult {
    pub function: EntityId,
    /// Position of the annotation among the function's `@Test` cases.
    pub case: usize,
    pub outcome: TestOutcome,
    pub duration: Duration,
}

/// Results of every case, ordered by function id then case.
#[derive(Clone, Debug, Default)]
pub struct TestReport {
    pub results: Vec<TestCaseResult>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_passed())
    }
}

struct TestCase<'a> {
    function: &'a ValidatedFunction,
    case: usize,
    arguments: Vec<&'a str>,
    expected: &'a str,
}

/// Run every `@Test` case of the interpreter's main module.
#[tracing::instrument(level = "debug", skip_all, fields(module = %interpreter.module().id))]
pub fn run_tests(interpreter: &Interpreter, options: &TestRunnerOptions) -> TestReport {
    let module = interpreter.module();
    let cases: Vec<TestCase<'_>> = module
        .test_functions()
        .into_iter()
        .flat_map(|function| test_cases(function))
        .collect();
    tracing::debug!(cases = cases.len(), parallel = options.parallel, "running tests");

    let results = if options.parallel {
        run_parallel(interpreter, &cases)
    } else {
        cases.iter().map(|case| run_case(interpreter, case)).collect()
    };
    let report = TestReport { results };
    tracing::debug!(passed = report.passed(), failed = report.failed(), "tests finished");
    report
}

/// Cases run on a scoped pool that is torn down before returning. Worker
/// stacks are sized for deep evaluation.
fn run_parallel(interpreter: &Interpreter, cases: &[TestCase<'_>]) -> Vec<TestCaseResult> {
    rayon::ThreadPoolBuilder::new()
        .stack_size(32 * 1024 * 1024)
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                cases
                    .par_iter()
                    .map(|case| run_case(interpreter, case))
                    .collect::<Vec<_>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            cases.iter().map(|case| run_case(interpreter, case)).collect()
        })
}

fn test_cases(function: &ValidatedFunction) -> Vec<TestCase<'_>> {
    function
        .annotations
        .iter()
        .filter(|annotation| annotation.name.single_segment() == Some("Test"))
        .enumerate()
        .filter_map(|(case, annotation)| match annotation.values.as_slice() {
            [AnnotationArgument::List(arguments), AnnotationArgument::Literal(expected)] => {
                let arguments = arguments
                    .iter()
                    .map(|argument| match argument {
                        AnnotationArgument::Literal(text) => Some(text.as_str()),
                        AnnotationArgument::List(_) => None,
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(TestCase {
                    function,
                    case,
                    arguments,
                    expected,
                })
            }
            _ => None,
        })
        .collect()
}

fn run_case(interpreter: &Interpreter, case: &TestCase<'_>) -> TestCaseResult {
    let start = Instant::now();
    let outcome = evaluate_case(interpreter, case);
    if let TestOutcome::Error(message) = &outcome {
        tracing::debug!(function = %case.function.id, case = case.case, %message, "test error");
    }
    TestCaseResult {
        function: case.function.id.clone(),
        case: case.case,
        outcome,
        duration: start.elapsed(),
    }
}

fn evaluate_case(interpreter: &Interpreter, case: &TestCase<'_>) -> TestOutcome {
    let function = case.function;
    let arguments = function
        .arguments
        .iter()
        .zip(&case.arguments)
        .map(|(argument, literal)| interpreter.evaluate_literal(&argument.ty, literal))
        .collect::<Result<Vec<_>, _>>();
    let expected = interpreter.evaluate_literal(&function.return_type, case.expected);
    let (arguments, expected) = match (arguments, expected) {
        (Ok(arguments), Ok(expected)) => (arguments, expected),
        (Err(error), _) | (_, Err(error)) => return TestOutcome::Error(error.message),
    };
    match interpreter.interpret(&function.id, arguments) {
        Ok(actual) if actual == expected => TestOutcome::Passed,
        Ok(actual) => TestOutcome::Failed {
            expected: expected.to_string(),
            actual: actual.to_string(),
        },
        Err(error) => TestOutcome::Error(error.to_string()),
    }
}
