use super::*;

const SIMPLE: &str = r#"Intro text.

{{checktask dueDate="2025/01/01 09:00" responsible="alice,bob" reminderTimes="h1"}}
Review the draft
{{/checktask}}

Outro text."#;

#[test]
fn test_contains_directive() {
    assert!(contains_directive(SIMPLE));
    assert!(!contains_directive("plain text with {{othermacro}} blocks"));
}

#[test]
fn test_scan_single_block() {
    let directives = scan(SIMPLE);
    assert_eq!(directives.len(), 1);
    let d = &directives[0];
    assert_eq!(d.id, None);
    assert_eq!(d.due_date, "2025/01/01 09:00");
    assert_eq!(d.responsible, "alice,bob");
    assert_eq!(d.reminder_times, "h1");
    assert_eq!(d.content, "Review the draft");
}

#[test]
fn test_scan_multiple_blocks_in_order() {
    let text = "{{checktask id=\"a-1\"}}first{{/checktask}}\n\
                middle\n\
                {{checktask id=\"b-2\"}}second{{/checktask}}";
    let directives = scan(text);
    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].id.as_deref(), Some("a-1"));
    assert_eq!(directives[0].content, "first");
    assert_eq!(directives[1].id.as_deref(), Some("b-2"));
    assert_eq!(directives[1].content, "second");
}

#[test]
fn test_scan_no_params() {
    let directives = scan("{{checktask}}bare task{{/checktask}}");
    assert_eq!(directives.len(), 1);
    assert_eq!(directives[0].id, None);
    assert_eq!(directives[0].content, "bare task");
    assert!(directives[0].responsible.is_empty());
}

#[test]
fn test_scan_escaped_quote_in_value() {
    let text = r#"{{checktask responsible="al\"ice"}}body{{/checktask}}"#;
    let directives = scan(text);
    assert_eq!(directives[0].responsible, "al\"ice");
}

#[test]
fn test_scan_skips_unterminated_block() {
    let text = "{{checktask id=\"a-1\"}}first{{/checktask}}\n{{checktask id=\"b-2\"}}dangling";
    let directives = scan(text);
    assert_eq!(directives.len(), 1);
    assert_eq!(directives[0].id.as_deref(), Some("a-1"));
}

#[test]
fn test_scan_ignores_longer_marker_word() {
    let text = "{{checktasks}}not ours{{/checktasks}}";
    assert!(scan(text).is_empty());
}

#[test]
fn test_scan_blank_id_treated_as_absent() {
    let directives = scan("{{checktask id=\"  \"}}body{{/checktask}}");
    assert_eq!(directives[0].id, None);
}

#[test]
fn test_annotate_ids_inserts_only_new() {
    let text = "{{checktask dueDate=\"2025/01/01 09:00\"}}a{{/checktask}}\n\
                {{checktask id=\"keep-1\"}}b{{/checktask}}";
    let out = annotate_ids(text, &[Some("new-9".to_string()), None]);
    assert!(out.starts_with("{{checktask id=\"new-9\" dueDate="));
    assert!(out.contains("{{checktask id=\"keep-1\"}}"));

    // Rescanning the rewritten text yields the assigned id.
    let rescanned = scan(&out);
    assert_eq!(rescanned[0].id.as_deref(), Some("new-9"));
    assert_eq!(rescanned[1].id.as_deref(), Some("keep-1"));
}

#[test]
fn test_annotate_ids_no_assignments_is_identity() {
    let out = annotate_ids(SIMPLE, &[None]);
    assert_eq!(out, SIMPLE);
}

#[test]
fn test_annotate_ids_replaces_existing_value() {
    // A duplicate id that was re-assigned: the tag keeps a single id
    // parameter with the fresh value.
    let text = "{{checktask id=\"dup-1\" responsible=\"bob\"}}second{{/checktask}}";
    let out = annotate_ids(text, &[Some("fresh-7".to_string())]);
    assert_eq!(
        out,
        "{{checktask id=\"fresh-7\" responsible=\"bob\"}}second{{/checktask}}"
    );
}

#[test]
fn test_first_id_param_wins() {
    let directives = scan("{{checktask id=\"one\" id=\"two\"}}body{{/checktask}}");
    assert_eq!(directives[0].id.as_deref(), Some("one"));
}
