use super::*;
use pretty_assertions::assert_eq;
use sem_ir::Span;

fn at(start: u32, end: u32) -> Location {
    Location::new("main.sem", Span::new(start, end))
}

#[test]
fn test_builder_collects_labels_and_notes() {
    let diagnostic = Diagnostic::error(ErrorCode::E2001)
        .with_message("duplicate id `Foo`")
        .with_label(Some(&at(0, 3)), "first declared here")
        .with_secondary_label(Some(&at(10, 13)), "declared again here")
        .with_note("ids must be unique within a module");

    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.labels.len(), 2);
    assert_eq!(diagnostic.location(), Some(&at(0, 3)));
    assert_eq!(diagnostic.notes.len(), 1);
}

#[test]
fn test_missing_location_adds_no_label() {
    let diagnostic = Diagnostic::warning(ErrorCode::W1001)
        .with_message("unrecognized annotation")
        .with_label(None, "here");
    assert!(diagnostic.labels.is_empty());
    assert_eq!(diagnostic.location(), None);
    assert!(!diagnostic.is_error());
}

#[test]
fn test_display() {
    let diagnostic = Diagnostic::error(ErrorCode::E3001)
        .with_message("unknown variable `x`")
        .with_label(Some(&at(4, 5)), "not in scope")
        .with_note("variables must be assigned before use");

    assert_eq!(
        diagnostic.to_string(),
        "error [E3001]: unknown variable `x`\n  --> main.sem:4..5: not in scope\n  = note: variables must be assigned before use"
    );
}
