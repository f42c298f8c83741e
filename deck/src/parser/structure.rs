use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser as CmarkParser, Tag};

use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Grammar interface
// ---------------------------------------------------------------------------

/// An inclusive, 0-based row range in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub start: usize,
    pub end: usize,
}

impl RowSpan {
    pub fn new(start: usize, end: usize) -> Self {
        RowSpan { start, end }
    }

    pub fn contains(&self, other: &RowSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// The structural nodes the slide builder asks a grammar about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A heading and everything up to the next heading.
    Section,
    /// A fenced code block, opening fence to closing fence.
    FencedCodeBlock,
}

/// A markdown grammar able to parse a document and answer range queries.
pub trait Grammar {
    type Tree;

    fn parse(&self, source: &str, file_id: usize) -> Result<Self::Tree, Vec<ParseError>>;

    /// All nodes of `kind`, in document order.
    fn query(&self, tree: &Self::Tree, kind: NodeKind) -> Vec<RowSpan>;
}

/// The two range lists the slide builder consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
    pub sections: Vec<RowSpan>,
    pub fences: Vec<RowSpan>,
}

/// Parse `source` with `grammar` and collect its sections and fenced blocks.
pub fn extract<G: Grammar>(
    grammar: &G,
    source: &str,
    file_id: usize,
) -> Result<Structure, Vec<ParseError>> {
    let tree = grammar.parse(source, file_id)?;
    let structure = Structure {
        sections: grammar.query(&tree, NodeKind::Section),
        fences: grammar.query(&tree, NodeKind::FencedCodeBlock),
    };
    tracing::debug!(
        sections = structure.sections.len(),
        fences = structure.fences.len(),
        "extracted document structure"
    );
    Ok(structure)
}

// ---------------------------------------------------------------------------
// CommonMark grammar (pulldown-cmark)
// ---------------------------------------------------------------------------

/// CommonMark grammar backed by pulldown-cmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMark;

/// Parsed outline of a document: heading rows and fenced block spans.
#[derive(Debug, Clone)]
pub struct Outline {
    headings: Vec<usize>,
    fences: Vec<RowSpan>,
    row_count: usize,
}

impl Grammar for CommonMark {
    type Tree = Outline;

    /// Never fails: CommonMark gives every input a meaning. A fence without
    /// a closing line runs to the end of its container.
    fn parse(&self, source: &str, _file_id: usize) -> Result<Outline, Vec<ParseError>> {
        let options = Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TABLES
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        let index = LineIndex::new(source);

        let mut headings: Vec<usize> = Vec::new();
        let mut fences = Vec::new();

        for (event, range) in CmarkParser::new_ext(source, options).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    let row = index.row_of(range.start);
                    if headings.last() != Some(&row) {
                        headings.push(row);
                    }
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                    fences.push(index.span_of(&range));
                }
                _ => {}
            }
        }

        Ok(Outline {
            headings,
            fences,
            row_count: source.lines().count(),
        })
    }

    fn query(&self, tree: &Outline, kind: NodeKind) -> Vec<RowSpan> {
        match kind {
            NodeKind::Section => {
                let Some(last_row) = tree.row_count.checked_sub(1) else {
                    return Vec::new();
                };
                tree.headings
                    .iter()
                    .enumerate()
                    .map(|(i, &start)| {
                        let end = tree
                            .headings
                            .get(i + 1)
                            .map(|next| next - 1)
                            .unwrap_or(last_row);
                        RowSpan::new(start, end.max(start))
                    })
                    .collect()
            }
            NodeKind::FencedCodeBlock => tree.fences.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Byte offset to row mapping.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    fn row_of(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Rows covered by a byte range whose end is exclusive.
    fn span_of(&self, range: &Range<usize>) -> RowSpan {
        let start = self.row_of(range.start);
        let last_byte = range.end.saturating_sub(1).max(range.start);
        RowSpan::new(start, self.row_of(last_byte).max(start))
    }

}

/// Split a fence line into its marker character, marker length and info
/// string. Leading container markup (indentation, `>`, list bullets) is
/// skipped.
pub(crate) fn split_fence(line: &str) -> Option<(char, usize, &str)> {
    let pos = line.find(['`', '~'])?;
    let prefix = &line[..pos];
    if !prefix
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '>' | '-' | '*' | '+' | '.' | ')') || c.is_ascii_digit())
    {
        return None;
    }
    let rest = &line[pos..];
    let marker = rest.chars().next()?;
    let run = rest.chars().take_while(|&c| c == marker).count();
    if run < 3 {
        return None;
    }
    Some((marker, run, rest[run..].trim()))
}

/// Whether `line` closes a block opened by `opening`: same marker, a run
/// at least as long, and no info string.
pub(crate) fn is_closing_fence(opening: &str, line: &str) -> bool {
    let Some((marker, run, _)) = split_fence(opening) else {
        return false;
    };
    match split_fence(line) {
        Some((close, close_run, info)) => close == marker && close_run >= run && info.is_empty(),
        None => false,
    }
}
