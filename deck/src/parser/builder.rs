use crate::parser::structure::{RowSpan, Structure, is_closing_fence, split_fence};
use crate::slide::{CodeBlock, Slide};
use crate::syntax::Syntax;

/// Build slides from document lines and their extracted structure.
///
/// Every section yields one slide, plus one more per stop marker found
/// outside code blocks. A stop marker emits a snapshot of the slide built so
/// far and the following slide keeps accumulating on top of that snapshot.
pub fn build_slides(lines: &[&str], structure: &Structure, syntax: &Syntax) -> Vec<Slide> {
    let mut slides = Vec::new();
    let mut current = Slide::default();

    for section in &structure.sections {
        if !current.title.is_empty() {
            slides.push(std::mem::take(&mut current));
        }

        current.title = line(lines, section.start).to_string();

        let blocks = collect_blocks(lines, section, &structure.fences);

        for row in content_start(lines, section)..=section.end {
            let text = line(lines, row);

            if let Some(block) = blocks.iter().find(|b| b.contains_row(row)) {
                if block.start_row == row {
                    current.blocks.push(block.clone());
                }
                current.body.push(text.to_string());
                continue;
            }

            if syntax.is_comment(text) {
                continue;
            }

            if let Some(stripped) = syntax.strip_stop(text) {
                current.body.push(stripped.trim_end().to_string());
                tracing::debug!(
                    title = %current.title,
                    row,
                    lines = current.body.len(),
                    "stop marker splits slide"
                );
                let snapshot = current.clone();
                slides.push(snapshot);
                continue;
            }

            current.body.push(text.trim_end().to_string());
        }
    }

    if !structure.sections.is_empty() {
        slides.push(current);
    }

    slides
}

/// First row of a section's body: the heading is skipped, and so is a
/// blank line directly below it.
fn content_start(lines: &[&str], section: &RowSpan) -> usize {
    let next = section.start + 1;
    if next <= section.end && line(lines, next).trim().is_empty() {
        next + 1
    } else {
        next
    }
}

/// Fenced blocks lying inside `section`, in document order.
fn collect_blocks(lines: &[&str], section: &RowSpan, fences: &[RowSpan]) -> Vec<CodeBlock> {
    fences
        .iter()
        .filter(|fence| section.contains(fence))
        .map(|fence| {
            let opening = line(lines, fence.start);
            let language = split_fence(opening)
                .map(|(_, _, info)| info.to_string())
                .unwrap_or_default();
            // An unclosed block's last row is content.
            let closed =
                fence.end > fence.start && is_closing_fence(opening, line(lines, fence.end));
            let body_end = if closed { fence.end } else { fence.end + 1 };
            let body = (fence.start + 1..body_end)
                .map(|row| line(lines, row))
                .collect::<Vec<_>>()
                .join("\n");
            CodeBlock {
                language,
                body,
                start_row: fence.start,
                end_row: fence.end,
            }
        })
        .collect()
}

fn line<'a>(lines: &[&'a str], row: usize) -> &'a str {
    lines.get(row).copied().unwrap_or("")
}
