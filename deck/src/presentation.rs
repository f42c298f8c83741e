use crate::parser::{CommonMark, Grammar, ParseError, Parser};
use crate::slide::{CodeBlock, Slide};
use crate::syntax::Syntax;

/// A parsed deck of slides plus the navigation cursor.
#[derive(Debug, Clone)]
pub struct Presentation {
    slides: Vec<Slide>,
    /// 0-based; always `< slides.len()` when there are slides.
    current: usize,
    title: String,
    syntax: Syntax,
}

impl Presentation {
    /// Parse `source` into a presentation positioned on the first slide.
    pub fn load(
        source: &str,
        file_id: usize,
        title: impl Into<String>,
        syntax: Syntax,
    ) -> Result<Self, Vec<ParseError>> {
        let slides = Parser::new(source.to_string(), file_id)
            .with_syntax(syntax.clone())
            .parse()?;
        Ok(Presentation {
            slides,
            current: 0,
            title: title.into(),
            syntax,
        })
    }

    pub fn from_slides(slides: Vec<Slide>, title: impl Into<String>) -> Self {
        Presentation {
            slides,
            current: 0,
            title: title.into(),
            syntax: Syntax::plain(),
        }
    }

    /// Replace the slides with a fresh parse of `source`.
    ///
    /// On failure the presentation is left untouched. On success the cursor
    /// stays where it was, clamped to the new slide count.
    pub fn reparse(&mut self, source: &str, file_id: usize) -> Result<(), Vec<ParseError>> {
        self.reparse_with(&CommonMark, source, file_id)
    }

    /// [`Presentation::reparse`] with a caller-chosen grammar.
    pub fn reparse_with<G: Grammar>(
        &mut self,
        grammar: &G,
        source: &str,
        file_id: usize,
    ) -> Result<(), Vec<ParseError>> {
        let slides = Parser::new(source.to_string(), file_id)
            .with_syntax(self.syntax.clone())
            .parse_with(grammar)?;
        tracing::debug!(slides = slides.len(), title = %self.title, "reparsed presentation");
        self.slides = slides;
        self.current = self.current.min(self.slides.len().saturating_sub(1));
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide_at(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn first_block_of(&self, index: usize) -> Option<&CodeBlock> {
        self.slide_at(index).and_then(Slide::first_block)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slide_at(self.current)
    }

    /// Move to the next slide. Returns false when already on the last one.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    /// Move to the previous slide. Returns false when already on the first one.
    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.slides.len().saturating_sub(1))
    }

    /// Jump to `index`, clamped to the last slide. Returns whether the
    /// cursor moved.
    pub fn go_to(&mut self, index: usize) -> bool {
        let target = index.min(self.slides.len().saturating_sub(1));
        let moved = target != self.current;
        self.current = target;
        moved
    }
}
