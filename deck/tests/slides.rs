use codespan_reporting::diagnostic::Severity;
use deck::parser::{CommonMark, Grammar, NodeKind, RowSpan, structure};
use deck::{ParseError, Parser, Presentation, Slide, Syntax};

fn parse_with(source: &str, syntax: Syntax) -> Vec<Slide> {
    Parser::new(source.to_string(), 0)
        .with_syntax(syntax)
        .parse()
        .expect("parse failed")
}

fn parse(source: &str) -> Vec<Slide> {
    parse_with(source, Syntax::plain())
}

fn stop_syntax() -> Syntax {
    Syntax::new(None, Some(r"<!--\s*stop\s*-->")).unwrap()
}

fn body(slide: &Slide) -> Vec<&str> {
    slide.body.iter().map(String::as_str).collect()
}

#[test]
fn single_section() {
    let slides = parse("# Title\n\nHello\n");
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].title, "# Title");
    assert_eq!(body(&slides[0]), ["Hello"]);
    assert!(slides[0].blocks.is_empty());
}

#[test]
fn one_slide_per_section() {
    let source = "# One\n\nfirst\n# Two\n\nsecond\nmore\n## Three\n\nthird\n";
    let slides = parse(source);
    let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["# One", "# Two", "## Three"]);
    assert_eq!(body(&slides[0]), ["first"]);
    assert_eq!(body(&slides[1]), ["second", "more"]);
    assert_eq!(body(&slides[2]), ["third"]);
}

#[test]
fn text_before_first_heading_is_ignored() {
    let slides = parse("preamble\n\n# Start\n\nbody\n");
    assert_eq!(slides.len(), 1);
    assert_eq!(body(&slides[0]), ["body"]);
}

#[test]
fn document_without_headings_has_no_slides() {
    assert!(parse("just text\n").is_empty());
    assert!(parse("").is_empty());
}

#[test]
fn heading_without_blank_line_keeps_first_line() {
    let slides = parse("# T\nfirst\nsecond\n");
    assert_eq!(body(&slides[0]), ["first", "second"]);
}

#[test]
fn heading_only_section() {
    let slides = parse("# A\n# B\n\nb\n");
    assert_eq!(slides.len(), 2);
    assert!(slides[0].body.is_empty());
    assert_eq!(body(&slides[1]), ["b"]);
}

#[test]
fn trailing_whitespace_is_stripped() {
    let slides = parse("# T\n\nline   \n\tindented\t\n");
    assert_eq!(body(&slides[0]), ["line", "\tindented"]);
}

#[test]
fn comment_lines_are_removed() {
    let syntax = Syntax::new(Some("%%"), None).unwrap();
    let slides = parse_with("# T\n\nkeep\n%% note\nalso keep\n", syntax);
    assert_eq!(body(&slides[0]), ["keep", "also keep"]);
}

#[test]
fn comment_prefix_must_start_the_line() {
    let syntax = Syntax::new(Some("%%"), None).unwrap();
    let slides = parse_with("# T\n\n  %% indented\n", syntax);
    assert_eq!(body(&slides[0]), ["  %% indented"]);
}

#[test]
fn empty_options_disable_filters() {
    let syntax = Syntax::new(Some(""), Some("")).unwrap();
    let slides = parse_with("# T\n\n%% kept\n<!-- stop -->\n", syntax);
    assert_eq!(slides.len(), 1);
    assert_eq!(body(&slides[0]), ["%% kept", "<!-- stop -->"]);
}

#[test]
fn stop_marker_splits_section() {
    let source = "# Reveal\n\nfirst\n<!-- stop -->\nsecond\n";
    let slides = parse_with(source, stop_syntax());
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0].title, "# Reveal");
    assert_eq!(slides[1].title, "# Reveal");
    assert_eq!(body(&slides[0]), ["first", ""]);
    assert_eq!(body(&slides[1]), ["first", "", "second"]);
}

#[test]
fn stop_marker_text_around_marker_is_kept() {
    let slides = parse_with("# T\n\npoint one <!-- stop -->  \nnext\n", stop_syntax());
    assert_eq!(body(&slides[0]), ["point one"]);
    assert_eq!(body(&slides[1]), ["point one", "next"]);
}

#[test]
fn stop_markers_are_cumulative() {
    let source = "# T\n\na\n<!-- stop -->\nb\n<!-- stop -->\nc\n<!-- stop -->\nd\n# Next\n\nz\n";
    let slides = parse_with(source, stop_syntax());
    assert_eq!(slides.len(), 5);

    let reveal = &slides[..4];
    for pair in reveal.windows(2) {
        assert!(pair[0].body.len() < pair[1].body.len());
        assert!(pair[1].body.starts_with(&pair[0].body));
    }
    assert_eq!(body(&slides[3]), ["a", "", "b", "", "c", "", "d"]);
    assert_eq!(body(&slides[4]), ["z"]);
}

#[test]
fn stop_and_comment_filters_are_independent() {
    let syntax = Syntax::new(Some("%%"), Some(r"<!--\s*stop\s*-->")).unwrap();
    let slides = parse_with("# T\n\n%% hidden\na\n<!-- stop -->\nb\n", syntax);
    assert_eq!(slides.len(), 2);
    assert_eq!(body(&slides[1]), ["a", "", "b"]);
}

#[test]
fn code_blocks_are_collected() {
    let source = "# Code\n\nintro\n```python\nprint(1 + 1)\nprint(2)\n```\noutro\n";
    let slides = parse(source);
    assert_eq!(slides.len(), 1);

    let block = slides[0].first_block().expect("block");
    assert_eq!(block.language, "python");
    assert_eq!(block.body, "print(1 + 1)\nprint(2)");
    assert_eq!(block.start_row, 3);
    assert_eq!(block.end_row, 6);
    assert_eq!(
        body(&slides[0]),
        ["intro", "```python", "print(1 + 1)", "print(2)", "```", "outro"]
    );
}

#[test]
fn code_block_lines_are_not_filtered() {
    let syntax = Syntax::new(Some("%%"), Some(r"<!--\s*stop\s*-->")).unwrap();
    let source = "# T\n\n```text\n%% not a comment\n<!-- stop -->\ntrailing   \n```\n";
    let slides = parse_with(source, syntax);
    assert_eq!(slides.len(), 1);
    assert_eq!(
        body(&slides[0]),
        ["```text", "%% not a comment", "<!-- stop -->", "trailing   ", "```"]
    );
}

#[test]
fn blocks_keep_document_order_across_sections() {
    let source = "# A\n\n```lua\nprint(1)\n```\n\n```sh\necho hi\n```\n# B\n\n```rust\nfn main() {}\n```\n";
    let slides = parse(source);
    let langs: Vec<Vec<&str>> = slides
        .iter()
        .map(|s| s.blocks.iter().map(|b| b.language.as_str()).collect())
        .collect();
    assert_eq!(langs, [vec!["lua", "sh"], vec!["rust"]]);
    for slide in &slides {
        for pair in slide.blocks.windows(2) {
            assert!(pair[0].end_row < pair[1].start_row);
        }
    }
}

#[test]
fn blocks_before_a_stop_are_carried_forward() {
    let source = "# T\n\n```calc\nprint(1)\n```\n<!-- stop -->\nafter\n";
    let slides = parse_with(source, stop_syntax());
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0].blocks.len(), 1);
    assert_eq!(slides[1].blocks, slides[0].blocks);
}

#[test]
fn fence_language_is_trimmed() {
    let slides = parse("# T\n\n```   python   \nx\n```\n\n~~~~\ny\n~~~~\n");
    let langs: Vec<&str> = slides[0].blocks.iter().map(|b| b.language.as_str()).collect();
    assert_eq!(langs, ["python", ""]);
}

#[test]
fn headings_inside_code_blocks_do_not_open_sections() {
    let slides = parse("# Shell\n\n```sh\n# a comment, not a heading\necho hi\n```\n");
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].blocks[0].body, "# a comment, not a heading\necho hi");
}

#[test]
fn front_matter_is_not_a_section() {
    let slides = parse("---\ntitle: talk\n---\n\n# First\n\nhi\n");
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].title, "# First");
}

#[test]
fn parsing_is_idempotent() {
    let source = "# A\n\n%% c\none\n<!-- stop -->\ntwo\n```py\nx = 1\n```\n# B\n\nend\n";
    let syntax = Syntax::new(Some("%%"), Some(r"<!--\s*stop\s*-->")).unwrap();
    let first = parse_with(source, syntax.clone());
    let second = parse_with(source, syntax);
    assert_eq!(first, second);
}

#[test]
fn unclosed_fence_runs_to_end_of_document() {
    let slides = parse("# T\n\ntext\n\n```sh\necho hi\n");
    assert_eq!(slides.len(), 1);
    assert_eq!(body(&slides[0]), ["text", "", "```sh", "echo hi"]);

    let block = slides[0].first_block().unwrap();
    assert_eq!(block.language, "sh");
    assert_eq!(block.body, "echo hi");
    assert_eq!((block.start_row, block.end_row), (4, 5));
}

#[test]
fn unclosed_fence_ends_with_its_container() {
    let slides = parse("# T\n\n> ```sh\n> echo hi\n\nafter\n");
    assert_eq!(slides.len(), 1);

    let block = slides[0].first_block().unwrap();
    assert_eq!(block.language, "sh");
    assert_eq!(block.start_row, 2);
    assert!(block.body.starts_with("> echo hi"), "{:?}", block.body);
    assert_eq!(slides[0].body.last().map(String::as_str), Some("after"));
}

#[test]
fn invalid_stop_pattern_is_rejected() {
    assert!(Syntax::new(None, Some("(unclosed")).is_err());
}

#[test]
fn grammar_queries_report_row_spans() {
    let source = "intro\n# A\n\n```x\ny\n```\n## B\ntext\n";
    let tree = CommonMark.parse(source, 0).unwrap();
    assert_eq!(
        CommonMark.query(&tree, NodeKind::Section),
        [RowSpan::new(1, 5), RowSpan::new(6, 7)]
    );
    assert_eq!(
        CommonMark.query(&tree, NodeKind::FencedCodeBlock),
        [RowSpan::new(3, 5)]
    );

    let extracted = structure::extract(&CommonMark, source, 0).unwrap();
    assert_eq!(extracted.sections.len(), 2);
    assert_eq!(extracted.fences.len(), 1);
}

#[test]
fn presentation_navigation_is_clamped() {
    let source = "# A\n\na\n# B\n\nb\n# C\n\nc\n";
    let mut deck = Presentation::load(source, 0, "talk.md", Syntax::plain()).unwrap();
    assert_eq!(deck.slide_count(), 3);
    assert_eq!(deck.current_index(), 0);
    assert_eq!(deck.title(), "talk.md");

    assert!(!deck.previous());
    assert_eq!(deck.current_index(), 0);

    assert!(deck.next());
    assert!(deck.next());
    assert!(!deck.next());
    assert_eq!(deck.current_index(), 2);
    assert_eq!(deck.current_slide().unwrap().title, "# C");

    assert!(deck.first());
    assert_eq!(deck.current_index(), 0);
    assert!(deck.go_to(99));
    assert_eq!(deck.current_index(), 2);
    assert!(deck.previous());
    assert_eq!(deck.current_index(), 1);
}

#[test]
fn presentation_query_surface() {
    let source = "# A\n\nno code\n# B\n\n```python\nprint(1+1)\n```\n";
    let deck = Presentation::load(source, 0, "demo", Syntax::plain()).unwrap();
    assert!(deck.first_block_of(0).is_none());
    assert_eq!(deck.first_block_of(1).unwrap().body, "print(1+1)");
    assert!(deck.first_block_of(5).is_none());
    assert!(deck.slide_at(2).is_none());
}

/// A grammar that refuses every document.
struct Rejecting;

impl Grammar for Rejecting {
    type Tree = ();

    fn parse(&self, _source: &str, file_id: usize) -> Result<(), Vec<ParseError>> {
        Err(vec![
            ParseError::new("unsupported document", 0..3, file_id).with_label("starts here"),
        ])
    }

    fn query(&self, _tree: &(), _kind: NodeKind) -> Vec<RowSpan> {
        Vec::new()
    }
}

#[test]
fn failed_reparse_keeps_previous_slides() {
    let mut deck = Presentation::load("# A\n\na\n# B\n\nb\n", 0, "t", Syntax::plain()).unwrap();
    deck.next();

    let errors = deck.reparse_with(&Rejecting, "# New\n", 3).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file_id, 3);
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(deck.current_index(), 1);

    deck.reparse("# Only\n\nx\n", 0).unwrap();
    assert_eq!(deck.slide_count(), 1);
    assert_eq!(deck.current_index(), 0);
}

#[test]
fn parse_errors_become_diagnostics() {
    let errors = Parser::new("# A\n".to_string(), 5)
        .parse_with(&Rejecting)
        .unwrap_err();
    let diagnostic = errors[0].clone().with_note("try again").to_diagnostic();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.message, "unsupported document");
    assert_eq!(diagnostic.labels[0].file_id, 5);
    assert_eq!(diagnostic.labels[0].range, 0..3);
    assert_eq!(diagnostic.labels[0].message, "starts here");
    assert_eq!(diagnostic.notes, ["try again"]);
    assert_eq!(errors[0].to_string(), "unsupported document (bytes 0..3)");
}

#[test]
fn empty_presentation_navigation() {
    let mut deck = Presentation::from_slides(Vec::new(), "empty");
    assert!(deck.is_empty());
    assert!(!deck.next());
    assert!(!deck.last());
    assert!(deck.current_slide().is_none());
}
