/// A fenced code block discovered inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Fence info string with the fence marker stripped, e.g. `python`.
    /// Empty when the fence carries no language tag.
    pub language: String,
    /// Lines strictly between the fences, joined with `\n`. Without a
    /// closing fence the block runs to the end of its container.
    pub body: String,
    /// Row of the opening fence (0-based).
    pub start_row: usize,
    /// Row of the closing fence, or the last content row of an unclosed
    /// block (0-based, inclusive).
    pub end_row: usize,
}

impl CodeBlock {
    pub fn contains_row(&self, row: usize) -> bool {
        self.start_row <= row && row <= self.end_row
    }
}

/// One screen of a presentation.
///
/// Slides are plain values: a stop marker finalizes a clone of the slide
/// being built, so later lines never leak into an already emitted slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    /// The heading line that opened the section, verbatim.
    pub title: String,
    /// Rendered body lines. Code block lines are kept raw.
    pub body: Vec<String>,
    /// Code blocks in document order.
    pub blocks: Vec<CodeBlock>,
}

impl Slide {
    pub fn first_block(&self) -> Option<&CodeBlock> {
        self.blocks.first()
    }
}
