//! Text and Markdown rendering of a [`ProgramDocument`].

use crate::format::format_number;
use crate::program::{ProgramDocument, ProgramLift};

/// Markup primitives used to lay out a program.
pub trait Renderer {
    fn heading(&self, text: &str, level: u8) -> String;
    fn list_item(&self, text: &str) -> String;
    fn bold(&self, text: &str) -> String;
    /// Line placed between two weeks.
    fn week_separator(&self) -> String;
}

/// Plain text for the terminal.
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    pub bullet: String,
}

impl Default for PlainRenderer {
    fn default() -> Self {
        Self {
            bullet: "• ".to_string(),
        }
    }
}

impl Renderer for PlainRenderer {
    fn heading(&self, text: &str, _level: u8) -> String {
        text.to_string()
    }

    fn list_item(&self, text: &str) -> String {
        format!("{}{text}", self.bullet)
    }

    fn bold(&self, text: &str) -> String {
        text.to_string()
    }

    fn week_separator(&self) -> String {
        "-".repeat(10)
    }
}

/// Markdown, optionally with LaTeX page breaks between weeks for PDF output.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    pub page_breaks: bool,
}

impl Renderer for MarkdownRenderer {
    fn heading(&self, text: &str, level: u8) -> String {
        let level = usize::from(level.clamp(1, 6));
        format!("{} {text}", "#".repeat(level))
    }

    fn list_item(&self, text: &str) -> String {
        format!("- {text}")
    }

    fn bold(&self, text: &str) -> String {
        format!("**{text}**")
    }

    fn week_separator(&self) -> String {
        if self.page_breaks {
            r"\pagebreak".to_string()
        } else {
            "---".to_string()
        }
    }
}

/// Lay out the whole document.
///
/// Each week gets a `WEEK n - p%` heading; each lift an upper-cased heading,
/// its 1RM line and one list item per set, with the top set in bold.
pub fn render_document(
    document: &ProgramDocument,
    renderer: &dyn Renderer,
    include_title: bool,
) -> String {
    let mut lines = Vec::new();

    if include_title {
        lines.push(renderer.heading(&document.title, 1));
        lines.push(String::new());
    }

    for (idx, week) in document.weeks.iter().enumerate() {
        if idx > 0 {
            lines.push(renderer.week_separator());
            lines.push(String::new());
        }

        lines.push(renderer.heading(
            &format!("WEEK {} - {}%", week.week, format_number(week.percent)),
            2,
        ));
        lines.push(String::new());

        for lift in &week.lifts {
            render_lift(lift, renderer, &mut lines);
            lines.push(String::new());
        }
    }

    let mut out = lines.join("\n").trim_end().to_string();
    out.push('\n');
    out
}

fn render_lift(lift: &ProgramLift, renderer: &dyn Renderer, lines: &mut Vec<String>) {
    lines.push(renderer.heading(&lift.name.to_uppercase(), 3));
    lines.push(String::new());
    lines.push(lift.summary.clone());
    lines.push(String::new());

    for set in &lift.sets {
        let line = set.line();
        if set.top_set {
            lines.push(renderer.list_item(&renderer.bold(&line)));
        } else {
            lines.push(renderer.list_item(&line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgramConfig;
    use crate::lift::{Lift, LiftInput};
    use crate::program::ProgramBuilder;
    use crate::week::WeekSelection;

    fn document(weeks: WeekSelection) -> ProgramDocument {
        let config = ProgramConfig::builtin();
        ProgramBuilder::new(&config)
            .build(&[LiftInput::new(Lift::Squat, 455.0)], weeks, "Test Sheet")
            .unwrap()
    }

    #[test]
    fn plain_week_one() {
        let text = render_document(
            &document(WeekSelection::Single(1)),
            &PlainRenderer::default(),
            true,
        );
        let expected = "\
Test Sheet

WEEK 1 - 70%

SQUAT

1RM: 455 lbs

• 2 x 5 - 45 lbs - Bar
• 1 x 5 - 135 lbs - 45
• 1 x 3 - 190 lbs - 45 25 2.5
• 1 x 2 - 255 lbs - (45 × 2) 15
• (3-5) x 5 - 320 lbs - (45 × 3) 2.5
";
        assert_eq!(text, expected);
    }

    #[test]
    fn markdown_bolds_top_set() {
        let text = render_document(
            &document(WeekSelection::Single(1)),
            &MarkdownRenderer::default(),
            false,
        );
        assert!(text.starts_with("## WEEK 1 - 70%\n"));
        assert!(text.contains("### SQUAT\n"));
        assert!(text.contains("- 1 x 5 - 135 lbs - 45\n"));
        assert!(text.contains("- **(3-5) x 5 - 320 lbs - (45 × 3) 2.5**\n"));
    }

    #[test]
    fn separators_only_between_weeks() {
        let doc = document(WeekSelection::All);

        let md = render_document(&doc, &MarkdownRenderer { page_breaks: true }, true);
        assert_eq!(md.matches(r"\pagebreak").count(), doc.weeks.len() - 1);
        assert!(md.starts_with("# Test Sheet\n"));
        assert!(!md.trim_end().ends_with(r"\pagebreak"));

        let plain = render_document(&doc, &PlainRenderer::default(), false);
        assert_eq!(plain.matches("----------").count(), doc.weeks.len() - 1);
        assert!(plain.contains("WEEK 6 - 95%"));
    }
}
