//! Terminal rendering of message bodies.
//!
//! Assistant replies are Markdown. When the transcript goes to a terminal the
//! text is walked with pulldown-cmark and painted with ANSI styles; fenced code
//! is highlighted with syntect.

use nu_ansi_term::{Color, Style};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

const THEME_NAME: &str = "base16-ocean.dark";
const HEADING_COLOR: Color = Color::Rgb(188, 205, 238);
const QUOTE_COLOR: Color = Color::Rgb(125, 132, 140);
const CODE_FG: Color = Color::Rgb(255, 224, 138);
const CODE_BG: Color = Color::Rgb(60, 63, 65);

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME: Lazy<Option<Theme>> = Lazy::new(|| {
    let mut themes = ThemeSet::load_defaults().themes;
    themes
        .remove(THEME_NAME)
        .or_else(|| themes.into_values().next())
});

/// Render Markdown `text` with ANSI styling.
pub fn render_markdown(text: &str) -> String {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH) {
        renderer.handle(event);
    }
    renderer.finish()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emphasis {
    Strong,
    Italic,
    Strike,
    Heading,
    Quote,
}

#[derive(Default)]
struct Renderer {
    out: String,
    emphasis: Vec<Emphasis>,
    /// Next number for each open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Language and buffered body of the code block being read.
    code: Option<(Option<String>, String)>,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some((_, body)) => body.push_str(&text),
                None => {
                    let painted = self.paint(&text);
                    self.out.push_str(&painted);
                }
            },
            Event::Code(code) => {
                let style = Style::new().fg(CODE_FG).on(CODE_BG);
                self.out.push_str(&style.paint(&*code).to_string());
            }
            Event::SoftBreak | Event::HardBreak => match self.code.as_mut() {
                Some((_, body)) => body.push('\n'),
                None => self.out.push('\n'),
            },
            Event::Rule => {
                self.line_break();
                self.out.push_str("────\n");
            }
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::Html(html) => self.out.push_str(&html),
            Event::FootnoteReference(name) => self.out.push_str(&format!("[^{name}]")),
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.line_break(),
            Tag::Heading(..) => {
                self.line_break();
                self.emphasis.push(Emphasis::Heading);
            }
            Tag::BlockQuote => {
                self.line_break();
                self.out.push_str("> ");
                self.emphasis.push(Emphasis::Quote);
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        Some(lang.trim().to_string()).filter(|lang| !lang.is_empty())
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => self.lists.push(start.map(|n| n.max(1))),
            Tag::Item => {
                self.line_break();
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        self.out.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    Some(None) => self.out.push_str("- "),
                    None => {}
                }
            }
            Tag::Strong => self.emphasis.push(Emphasis::Strong),
            Tag::Emphasis => self.emphasis.push(Emphasis::Italic),
            Tag::Strikethrough => self.emphasis.push(Emphasis::Strike),
            _ => {}
        }
    }

    fn close(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Item => self.end_line(),
            Tag::Heading(..) => {
                self.pop(Emphasis::Heading);
                self.end_line();
            }
            Tag::BlockQuote => {
                self.pop(Emphasis::Quote);
                self.end_line();
            }
            Tag::CodeBlock(_) => self.flush_code(),
            Tag::List(_) => {
                self.lists.pop();
                self.end_line();
            }
            Tag::Strong => self.pop(Emphasis::Strong),
            Tag::Emphasis => self.pop(Emphasis::Italic),
            Tag::Strikethrough => self.pop(Emphasis::Strike),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        self.flush_code();
        self.out.trim_end().to_string()
    }

    /// Start a new line unless already at the start of one.
    fn line_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn end_line(&mut self) {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn pop(&mut self, emphasis: Emphasis) {
        if let Some(index) = self.emphasis.iter().rposition(|open| *open == emphasis) {
            self.emphasis.remove(index);
        }
    }

    fn paint(&self, text: &str) -> String {
        if self.emphasis.is_empty() || text.is_empty() {
            return text.to_string();
        }
        let mut style = Style::new();
        for emphasis in &self.emphasis {
            style = match emphasis {
                Emphasis::Strong => style.bold(),
                Emphasis::Italic => style.italic(),
                Emphasis::Strike => style.strikethrough(),
                Emphasis::Heading => style.bold().fg(HEADING_COLOR),
                Emphasis::Quote => style.fg(QUOTE_COLOR),
            };
        }
        style.paint(text).to_string()
    }

    fn flush_code(&mut self) {
        let Some((language, body)) = self.code.take() else {
            return;
        };
        self.line_break();
        self.out.push_str(&highlight(&body, language.as_deref()));
        self.end_line();
    }
}

fn highlight(code: &str, language: Option<&str>) -> String {
    let Some(theme) = THEME.as_ref() else {
        return code.to_string();
    };
    let syntax = language
        .and_then(|token| SYNTAXES.find_syntax_by_token(token))
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut painted = String::new();
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAXES) {
            Ok(ranges) => painted.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(_) => painted.push_str(line),
        }
    }
    painted
}
