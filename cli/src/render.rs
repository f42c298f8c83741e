use deck::Presentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const DEFAULT_WIDTH: usize = 80;

/// Lines for the current slide: title, body, and a footer with the
/// position in the deck.
pub fn render_slide(presentation: &Presentation, width: usize) -> Vec<String> {
    let Some(slide) = presentation.current_slide() else {
        return vec!["(no slides)".to_string()];
    };

    let mut lines = Vec::with_capacity(slide.body.len() + 5);
    lines.push(center(&slide.title, width));
    lines.push("=".repeat(width));
    lines.extend(slide.body.iter().cloned());
    lines.push(String::new());
    lines.push(footer(presentation, width));
    lines
}

/// Executor output set off from the slide above it.
pub fn render_output(output: &[String], width: usize) -> Vec<String> {
    let mut lines = vec![rule(" output ", width)];
    lines.extend(output.iter().cloned());
    lines.push("-".repeat(width));
    lines
}

fn footer(presentation: &Presentation, width: usize) -> String {
    let text = format!(
        "  {} / {} | {}",
        presentation.current_index() + 1,
        presentation.slide_count(),
        presentation.title()
    );
    truncate(&text, width)
}

fn rule(label: &str, width: usize) -> String {
    let label = truncate(label, width);
    let fill = width.saturating_sub(label.width());
    let left = fill / 2;
    format!("{}{}{}", "-".repeat(left), label, "-".repeat(fill - left))
}

fn center(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(text.width()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Cut `text` to at most `width` columns, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if width > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck::{Presentation, Syntax};

    fn deck(source: &str) -> Presentation {
        Presentation::load(source, 0, "talk.md", Syntax::plain()).unwrap()
    }

    #[test]
    fn slide_has_title_body_and_footer() {
        let presentation = deck("# Hi\n\nbody line\n# Two\n");
        let lines = render_slide(&presentation, 20);
        assert_eq!(lines[0], "        # Hi");
        assert_eq!(lines[1], "=".repeat(20));
        assert_eq!(lines[2], "body line");
        assert_eq!(lines.last().unwrap(), "  1 / 2 | talk.md");
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate("# A very long heading", 8), "# A ver…");
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("wide 漢字", 7), "wide …");
    }

    #[test]
    fn empty_presentation_renders_placeholder() {
        let presentation = Presentation::from_slides(Vec::new(), "empty");
        assert_eq!(render_slide(&presentation, 40), ["(no slides)"]);
    }

    #[test]
    fn output_is_framed() {
        let lines = render_output(&["2".to_string()], 12);
        assert_eq!(lines, ["-- output --", "2", "------------"]);
    }
}
