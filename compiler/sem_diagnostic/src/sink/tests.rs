use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;

fn error(message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3003).with_message(message)
}

#[test]
fn test_errors_and_warnings_are_separate() {
    let mut sink = DiagnosticSink::new();
    assert!(sink.has_errors().is_none());

    sink.emit(Diagnostic::warning(ErrorCode::W1001).with_message("unknown annotation"));
    assert!(sink.has_errors().is_none());

    let _ = sink.emit_error(error("type mismatch"));
    assert!(sink.has_errors().is_some());

    let (errors, warnings) = sink.into_parts();
    assert_eq!(errors.len(), 1);
    assert_eq!(warnings.len(), 1);
    assert_eq!(errors[0].message, "type mismatch");
}

#[test]
fn test_identical_diagnostics_deduplicated() {
    let mut sink = DiagnosticSink::new();
    let _ = sink.emit_error(error("same"));
    let _ = sink.emit_error(error("same"));
    let _ = sink.emit_error(error("different"));

    assert_eq!(sink.errors().len(), 2);
    assert_eq!(sink.error_count(), 3);
}

#[test]
fn test_deduplication_can_be_disabled() {
    let mut sink = DiagnosticSink::with_config(DiagnosticConfig {
        error_limit: 0,
        deduplicate: false,
    });
    let _ = sink.emit_error(error("same"));
    let _ = sink.emit_error(error("same"));
    assert_eq!(sink.errors().len(), 2);
}

#[test]
fn test_error_limit_keeps_failure() {
    let mut sink = DiagnosticSink::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: true,
    });
    let _ = sink.emit_error(error("first"));
    assert!(sink.limit_reached());
    let _ = sink.emit_error(error("second"));

    assert_eq!(sink.errors().len(), 1);
    assert_eq!(sink.error_count(), 2);
    assert!(sink.has_errors().is_some());
}
