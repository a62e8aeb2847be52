//! Markdown → ratatui `Text` renderer.
//!
//! Thin wrapper around `pulldown_cmark` that converts markdown events into
//! styled `Line`/`Span` values: headings, emphasis, inline code, fenced code
//! blocks (with syntect highlighting), lists, blockquotes, links and tables.
//!
//! [`Renderer`] adds the render width: its output is pre-wrapped so one
//! `Line` is exactly one terminal row, which lets the viewport count rows
//! without measuring anything.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Left border repeated on every row of quotes and code blocks.
const GUTTER: &str = "│ ";

/// Widest horizontal rule, in cells.
const RULE_WIDTH: usize = 40;

/// Markdown renderer bound to the current render width.
///
/// The width is owned by the controller and pushed down on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    width: u16,
}

impl Renderer {
    pub fn new(width: u16) -> Self {
        Self { width }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    /// Render markdown and wrap it to the current width.
    pub fn render(&self, content: &str, base_fg: Color) -> Text<'static> {
        let rule_width = RULE_WIDTH.min(self.width.max(1) as usize);
        wrap(parse(content, base_fg, rule_width), self.width)
    }
}

/// Unwrapped rendering with the widest rule.
#[cfg(test)]
fn render(content: &str, base_fg: Color) -> Text<'static> {
    parse(content, base_fg, RULE_WIDTH)
}

/// Parse markdown content into styled `Text` using gpterm's color scheme.
///
/// Malformed markdown never fails; whatever pulldown-cmark can't structure,
/// raw HTML included, comes through as plain text.
fn parse(content: &str, base_fg: Color, rule_width: usize) -> Text<'static> {
    let opts =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;

    let mut writer = MarkdownWriter::new(Palette::new(base_fg), rule_width);
    for event in Parser::new_ext(content, opts) {
        writer.event(event);
    }
    writer.finish()
}

// ── Wrapping ────────────────────────────────────────────────────────────────

/// Wrap every line to `width` display cells, keeping span styles.
///
/// Breaks at whitespace where possible; words longer than the width are
/// split by character. A width of 0 leaves the text untouched.
pub fn wrap(text: Text<'static>, width: u16) -> Text<'static> {
    if width == 0 {
        return text;
    }
    let width = width as usize;
    let mut out = Text::default();
    out.style = text.style;
    out.alignment = text.alignment;
    for line in text.lines {
        out.lines.extend(wrap_line(line, width));
    }
    out
}

/// Wrap one line. Leading gutters are kept out of the wrap and repeated on
/// every continuation row.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line.width() <= width {
        return vec![line];
    }

    let gutters = line
        .spans
        .iter()
        .take_while(|span| span.content == GUTTER)
        .count();
    let gutter_width = gutters * GUTTER.width();
    if gutters == 0 || gutter_width >= width {
        return wrap_spans(line, width);
    }

    let mut body = line;
    let prefix: Vec<Span<'static>> = body.spans.drain(..gutters).collect();
    wrap_spans(body, width - gutter_width)
        .into_iter()
        .map(|mut row| {
            row.spans.splice(0..0, prefix.iter().cloned());
            row
        })
        .collect()
}

fn wrap_spans(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let (style, alignment) = (line.style, line.alignment);
    let new_line = |mut spans: Vec<Span<'static>>| {
        // A row never ends in the whitespace it was broken at
        while let Some(last) = spans.last_mut() {
            let trimmed = last.content.trim_end().len();
            if trimmed == 0 {
                spans.pop();
                continue;
            }
            last.content.to_mut().truncate(trimmed);
            break;
        }
        let mut l = Line::from(spans).style(style);
        l.alignment = alignment;
        l
    };

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for span in line.spans {
        for token in tokens(&span.content) {
            let token_width = token.width();
            let is_space = token.chars().all(char::is_whitespace);

            if used + token_width <= width {
                if !(is_space && used == 0 && !rows.is_empty()) {
                    push_piece(&mut current, token, span.style);
                    used += token_width;
                }
                continue;
            }

            // Doesn't fit: whitespace just ends the row
            if is_space {
                if used > 0 {
                    rows.push(new_line(std::mem::take(&mut current)));
                    used = 0;
                }
                continue;
            }

            if token_width <= width {
                if used > 0 {
                    rows.push(new_line(std::mem::take(&mut current)));
                }
                push_piece(&mut current, token, span.style);
                used = token_width;
                continue;
            }

            // Word wider than a row: split by character
            for ch in token.chars() {
                let mut buf = [0u8; 4];
                let piece: &str = ch.encode_utf8(&mut buf);
                let w = piece.width();
                if used + w > width && used > 0 {
                    rows.push(new_line(std::mem::take(&mut current)));
                    used = 0;
                }
                push_piece(&mut current, piece, span.style);
                used += w;
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(new_line(current));
    }
    rows
}

/// Split into alternating runs of whitespace and non-whitespace.
fn tokens(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut last_space: Option<bool> = None;
    for (i, ch) in s.char_indices() {
        let space = ch.is_whitespace();
        if last_space.is_some_and(|prev| prev != space) {
            out.push(&s[start..i]);
            start = i;
        }
        last_space = Some(space);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// Append text to the row, merging into the previous span when styles match.
fn push_piece(row: &mut Vec<Span<'static>>, piece: &str, style: Style) {
    if let Some(last) = row.last_mut()
        && last.style == style
    {
        last.content.to_mut().push_str(piece);
        return;
    }
    row.push(Span::styled(piece.to_owned(), style));
}

// ── Palette ─────────────────────────────────────────────────────────────────

/// Styles for one block, derived from its author color.
#[derive(Debug, Clone, Copy)]
struct Palette {
    base: Color,
}

impl Palette {
    fn new(base: Color) -> Self {
        Self { base }
    }

    fn body(self) -> Style {
        Style::default().fg(self.base)
    }

    fn heading(self, level: HeadingLevel) -> Style {
        let extra = match level {
            HeadingLevel::H1 => Modifier::UNDERLINED,
            HeadingLevel::H2 => Modifier::empty(),
            _ => Modifier::ITALIC,
        };
        self.body().add_modifier(Modifier::BOLD | extra)
    }

    fn quote(self) -> Style {
        self.body().add_modifier(Modifier::DIM | Modifier::ITALIC)
    }

    fn frame() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    fn link() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED)
    }

    fn code() -> Style {
        Style::default().fg(Color::White)
    }

    fn inline_code() -> Style {
        Self::code().bg(Color::DarkGray)
    }
}

// ── Writer ──────────────────────────────────────────────────────────────────

/// Fenced code block state.
enum Code {
    Off,
    Plain,
    Highlighted(Box<HighlightLines<'static>>),
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered(u64),
}

/// Cells collected while inside a table; laid out when the table closes.
#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    /// Rows belonging to the header, underlined by a separator.
    header_rows: usize,
}

struct MarkdownWriter {
    out: Text<'static>,
    palette: Palette,
    /// Inline styles, each one patched over its parent.
    styles: Vec<Style>,
    /// Spans repeated at the start of every line (quote and code gutters).
    gutters: Vec<Span<'static>>,
    lists: Vec<ListKind>,
    code: Code,
    table: Option<Table>,
    link: Option<String>,
    /// A blank line goes before the next block element.
    gap: bool,
    rule_width: usize,
}

impl MarkdownWriter {
    fn new(palette: Palette, rule_width: usize) -> Self {
        Self {
            out: Text::default(),
            palette,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            code: Code::Off,
            table: None,
            link: None,
            gap: false,
            rule_width,
        }
    }

    fn finish(self) -> Text<'static> {
        self.out
    }

    fn current_style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| self.palette.body())
    }

    fn enter_style(&mut self, overlay: Style) {
        let style = self.current_style().patch(overlay);
        self.styles.push(style);
    }

    fn leave_style(&mut self) {
        self.styles.pop();
    }

    fn new_line(&mut self, line: Line<'static>) {
        let mut spans = self.gutters.clone();
        spans.extend(line.spans);
        self.out.lines.push(Line::from(spans));
    }

    fn append(&mut self, span: Span<'static>) {
        match self.out.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn open_block(&mut self) {
        if std::mem::take(&mut self.gap) {
            self.new_line(Line::default());
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some(table) = self.table.as_mut() {
            match &event {
                Event::Text(t) | Event::Code(t) | Event::InlineHtml(t) => {
                    table.cell.push_str(t);
                    return;
                }
                Event::SoftBreak | Event::HardBreak => {
                    table.cell.push(' ');
                    return;
                }
                _ => {}
            }
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.text(&t),
            Event::Code(c) => {
                self.append(Span::styled(c.into_string(), Palette::inline_code()));
            }
            // HTML is not interpreted; the tags stay visible as text
            Event::InlineHtml(html) => self.text(&html),
            Event::Html(html) => {
                let style = self.current_style();
                for raw in html.lines() {
                    self.new_line(Line::from(Span::styled(raw.to_owned(), style)));
                }
            }
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.open_block();
                let rule = "─".repeat(self.rule_width);
                self.new_line(Line::from(Span::styled(rule, Palette::frame())));
                self.gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            // Footnotes and math are not enabled
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.open_block();
                self.new_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.open_block();
                let style = self.palette.heading(level);
                let marks = "#".repeat(level as usize);
                self.new_line(Line::from(Span::styled(format!("{marks} "), style)));
                self.enter_style(style);
            }
            Tag::BlockQuote(_) => {
                self.open_block();
                self.gutters.push(Span::styled(GUTTER, Palette::frame()));
                self.enter_style(self.palette.quote());
            }
            Tag::CodeBlock(kind) => self.start_code(kind),
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.open_block();
                }
                self.lists.push(first.map_or(ListKind::Bullet, ListKind::Numbered));
            }
            Tag::Item => {
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Bullet) => format!("{indent}- "),
                    Some(ListKind::Numbered(n)) => {
                        *n += 1;
                        format!("{indent}{}. ", *n - 1)
                    }
                    None => return,
                };
                self.append(Span::styled(marker, Palette::frame()));
            }
            Tag::HtmlBlock => self.open_block(),
            Tag::Table(_) => {
                self.open_block();
                self.table = Some(Table::default());
            }
            Tag::Emphasis => self.enter_style(Style::new().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.enter_style(Style::new().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.enter_style(Style::new().add_modifier(Modifier::CROSSED_OUT));
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.into_string());
                self.enter_style(Palette::link());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.gap = true,
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::Heading(_) => {
                self.leave_style();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.leave_style();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = Code::Off;
                self.gutters.pop();
                self.new_line(Line::from(Span::styled("╰──", Palette::frame())));
                self.gap = true;
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_owned());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    if matches!(tag, TagEnd::TableHead) {
                        table.header_rows = table.rows.len();
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.lay_out_table(table);
                }
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.leave_style(),
            TagEnd::Link => {
                self.leave_style();
                let url = self.link.take();
                if let (Some(url), Some(table)) = (&url, self.table.as_mut()) {
                    table.cell.push_str(&format!(" ({url})"));
                } else if let Some(url) = url {
                    self.append(Span::raw(" ("));
                    self.append(Span::styled(url, Palette::link()));
                    self.append(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn start_code(&mut self, kind: CodeBlockKind<'_>) {
        if !self.out.lines.is_empty() {
            self.new_line(Line::default());
        }
        self.gap = false;

        let lang = match &kind {
            CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or(""),
            CodeBlockKind::Indented => "",
        };

        let frame = Palette::frame();
        let top = if lang.is_empty() {
            Line::from(Span::styled("╭──", frame))
        } else {
            Line::from(vec![
                Span::styled("╭── ", frame),
                Span::styled(lang.to_owned(), frame.add_modifier(Modifier::BOLD)),
                Span::styled(" ──", frame),
            ])
        };
        self.new_line(top);
        self.gutters.push(Span::styled(GUTTER, frame));

        let syntax = Some(lang)
            .filter(|l| !l.is_empty())
            .and_then(|l| SYNTAX_SET.find_syntax_by_token(l));
        let theme = THEME_SET.themes.get("base16-ocean.dark");
        self.code = match (syntax, theme) {
            (Some(syntax), Some(theme)) => {
                Code::Highlighted(Box::new(HighlightLines::new(syntax, theme)))
            }
            _ => Code::Plain,
        };
    }

    fn text(&mut self, text: &str) {
        // ratatui draws tabs as zero-width
        let text = text.replace('\t', "    ");

        match std::mem::replace(&mut self.code, Code::Off) {
            Code::Highlighted(mut highlighter) => {
                for source_line in LinesWithEndings::from(&text) {
                    let Ok(ranges) = highlighter.highlight_line(source_line, &SYNTAX_SET) else {
                        self.new_line(Line::from(Span::styled(
                            source_line.trim_end_matches('\n').to_owned(),
                            Palette::code(),
                        )));
                        continue;
                    };
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .map(|(style, piece)| (style.foreground, piece.trim_end_matches('\n')))
                        .filter(|(_, piece)| !piece.is_empty())
                        .map(|(fg, piece)| {
                            let fg = Color::Rgb(fg.r, fg.g, fg.b);
                            Span::styled(piece.to_owned(), Style::default().fg(fg))
                        })
                        .collect();
                    self.new_line(Line::from(spans));
                }
                self.code = Code::Highlighted(highlighter);
            }
            Code::Plain => {
                for source_line in text.lines() {
                    let row = Span::styled(source_line.to_owned(), Palette::code());
                    self.new_line(Line::from(row));
                }
                self.code = Code::Plain;
            }
            Code::Off => {
                let style = self.current_style();
                self.append(Span::styled(text, style));
            }
        }
    }

    /// Pad every column to its widest cell; a rule goes under the header.
    fn lay_out_table(&mut self, table: Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let body = self.palette.body();
        let header = body.add_modifier(Modifier::BOLD);
        let frame = Palette::frame();

        for (r, row) in table.rows.iter().enumerate() {
            let style = if r < table.header_rows { header } else { body };
            let mut spans = Vec::with_capacity(columns * 2);
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", frame));
                }
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = width.saturating_sub(cell.width());
                spans.push(Span::styled(format!("{cell}{}", " ".repeat(pad)), style));
            }
            self.new_line(Line::from(spans));

            if r + 1 == table.header_rows {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                self.new_line(Line::from(Span::styled(rule, frame)));
            }
        }
    }
}
