//! Terminal capture to HTML fragment conversion.
//!
//! The renderer is a collaborator of the incremental pipeline: anything
//! implementing [`TerminalRenderer`] can be plugged in. [`AnsiRenderer`]
//! covers what build captures actually contain: SGR colours and text
//! attributes, carriage-return progress lines, backspaces and line erasure.
//! Cursor movement and other control sequences are dropped.

/// Pure transformation from raw capture bytes to an HTML fragment.
pub trait TerminalRenderer {
    /// Renderer name, for logs.
    fn name(&self) -> &str;

    /// Render a capture. Must be deterministic in its input.
    fn render(&self, capture: &[u8]) -> Vec<u8>;
}

/// HTML-escape characters onto `out`.
///
/// Escapes: & < > " '
fn push_escaped(out: &mut String, chars: impl IntoIterator<Item = char>) {
    for c in chars {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// 16-colour palette index (0-7 normal, 8-15 bright)
    Palette(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    fn from_xterm256(n: u8) -> Self {
        match n {
            0..=15 => Color::Palette(n),
            16..=231 => {
                const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
                let i = n - 16;
                Color::Rgb(
                    LEVELS[usize::from(i / 36)],
                    LEVELS[usize::from((i / 6) % 6)],
                    LEVELS[usize::from(i % 6)],
                )
            }
            232..=255 => {
                let v = 8 + (n - 232) * 10;
                Color::Rgb(v, v, v)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    faint: bool,
    italic: bool,
    underline: bool,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    fn apply_sgr(&mut self, params: &str) {
        let codes: Vec<u16> = params
            .split(';')
            .map(|p| p.parse::<u16>().unwrap_or(0))
            .collect();

        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 => *self = Style::default(),
                1 => self.bold = true,
                2 => self.faint = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => {
                    self.bold = false;
                    self.faint = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                c @ 30..=37 => self.fg = Some(Color::Palette((c - 30) as u8)),
                39 => self.fg = None,
                c @ 40..=47 => self.bg = Some(Color::Palette((c - 40) as u8)),
                49 => self.bg = None,
                c @ 90..=97 => self.fg = Some(Color::Palette((c - 90 + 8) as u8)),
                c @ 100..=107 => self.bg = Some(Color::Palette((c - 100 + 8) as u8)),
                38 | 48 => {
                    let target = codes[i];
                    let (color, used) = extended_color(&codes[i + 1..]);
                    if let Some(color) = color {
                        if target == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                    }
                    i += used;
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn open_tag(&self) -> String {
        let mut classes: Vec<String> = Vec::new();
        let mut inline: Vec<String> = Vec::new();

        if self.bold {
            classes.push("term-fg1".to_string());
        }
        if self.faint {
            classes.push("term-fg2".to_string());
        }
        if self.italic {
            classes.push("term-fg3".to_string());
        }
        if self.underline {
            classes.push("term-fg4".to_string());
        }
        match self.fg {
            Some(Color::Palette(n)) if n < 8 => classes.push(format!("term-fg3{n}")),
            Some(Color::Palette(n)) => classes.push(format!("term-fgi9{}", n - 8)),
            Some(Color::Rgb(r, g, b)) => inline.push(format!("color:rgb({r},{g},{b})")),
            None => {}
        }
        match self.bg {
            Some(Color::Palette(n)) if n < 8 => classes.push(format!("term-bg4{n}")),
            Some(Color::Palette(n)) => classes.push(format!("term-bgi10{}", n - 8)),
            Some(Color::Rgb(r, g, b)) => inline.push(format!("background-color:rgb({r},{g},{b})")),
            None => {}
        }

        let mut tag = String::from("<span");
        if !classes.is_empty() {
            tag.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        if !inline.is_empty() {
            tag.push_str(&format!(" style=\"{}\"", inline.join(";")));
        }
        tag.push('>');
        tag
    }
}

/// Decode the tail of a `38;…`/`48;…` sequence.
/// Returns the colour and how many codes were consumed.
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest {
        [5, n, ..] => (u8::try_from(*n).ok().map(Color::from_xterm256), 2),
        [2, r, g, b, ..] => {
            let channel = |v: u16| u8::try_from(v).unwrap_or(u8::MAX);
            (Some(Color::Rgb(channel(*r), channel(*g), channel(*b))), 4)
        }
        [5] => (None, 1),
        [2, ..] => (None, rest.len()),
        _ => (None, 0),
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    style: Style,
}

/// One screen line with an overwrite cursor.
#[derive(Debug, Default)]
struct Line {
    cells: Vec<Cell>,
    cursor: usize,
}

impl Line {
    fn put(&mut self, ch: char, style: Style) {
        let cell = Cell { ch, style };
        if self.cursor < self.cells.len() {
            self.cells[self.cursor] = cell;
        } else {
            self.cells.push(cell);
        }
        self.cursor += 1;
    }

    fn erase(&mut self, mode: &str) {
        match mode {
            "1" => {
                let end = (self.cursor + 1).min(self.cells.len());
                for cell in &mut self.cells[..end] {
                    *cell = Cell {
                        ch: ' ',
                        style: Style::default(),
                    };
                }
            }
            "2" => {
                self.cells.clear();
                self.cursor = 0;
            }
            _ => self.cells.truncate(self.cursor),
        }
    }

    fn write_html(&self, out: &mut String) {
        let mut current = Style::default();
        let mut open = false;
        for cell in &self.cells {
            if cell.style != current {
                if open {
                    out.push_str("</span>");
                    open = false;
                }
                if !cell.style.is_plain() {
                    out.push_str(&cell.style.open_tag());
                    open = true;
                }
                current = cell.style;
            }
            push_escaped(out, [cell.ch]);
        }
        if open {
            out.push_str("</span>");
        }
    }
}

/// Default renderer for ANSI/VT100 build captures.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiRenderer;

impl AnsiRenderer {
    pub fn new() -> Self {
        AnsiRenderer
    }

    fn render_str(&self, input: &str) -> String {
        let mut lines: Vec<Line> = Vec::new();
        let mut line = Line::default();
        let mut style = Style::default();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\n' => lines.push(std::mem::take(&mut line)),
                '\r' => line.cursor = 0,
                '\u{8}' => line.cursor = line.cursor.saturating_sub(1),
                '\t' => line.put('\t', style),
                '\u{1b}' => match chars.next() {
                    Some('[') => {
                        let mut params = String::new();
                        let mut fin = None;
                        for ch in chars.by_ref() {
                            if ('\u{40}'..='\u{7e}').contains(&ch) {
                                fin = Some(ch);
                                break;
                            }
                            params.push(ch);
                        }
                        match fin {
                            Some('m') if !params.starts_with('?') => style.apply_sgr(&params),
                            Some('K') => line.erase(&params),
                            _ => {}
                        }
                    }
                    Some(']') => {
                        // OSC, terminated by BEL or ST
                        while let Some(ch) = chars.next() {
                            if ch == '\u{7}' {
                                break;
                            }
                            if ch == '\u{1b}' && chars.peek() == Some(&'\\') {
                                chars.next();
                                break;
                            }
                        }
                    }
                    Some('(') | Some(')') => {
                        chars.next();
                    }
                    _ => {}
                },
                c if c.is_control() => {}
                c => line.put(c, style),
            }
        }
        if !line.cells.is_empty() {
            lines.push(line);
        }

        let mut out = String::with_capacity(input.len());
        for (i, l) in lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            l.write_html(&mut out);
        }
        out
    }
}

impl TerminalRenderer for AnsiRenderer {
    fn name(&self) -> &str {
        "ansi"
    }

    fn render(&self, capture: &[u8]) -> Vec<u8> {
        self.render_str(&String::from_utf8_lossy(capture)).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        String::from_utf8(AnsiRenderer::new().render(input.as_bytes())).unwrap()
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(render("a < b && c > 'd'"), "a &lt; b &amp;&amp; c &gt; &#x27;d&#x27;");
    }

    #[test]
    fn test_basic_colors() {
        assert_eq!(
            render("\x1b[31mred\x1b[0m plain"),
            "<span class=\"term-fg31\">red</span> plain"
        );
        assert_eq!(
            render("\x1b[1;92mok\x1b[m"),
            "<span class=\"term-fg1 term-fgi92\">ok</span>"
        );
        assert_eq!(
            render("\x1b[44mbg\x1b[49m"),
            "<span class=\"term-bg44\">bg</span>"
        );
    }

    #[test]
    fn test_extended_colors() {
        assert_eq!(
            render("\x1b[38;5;196mx"),
            "<span style=\"color:rgb(255,0,0)\">x</span>"
        );
        assert_eq!(
            render("\x1b[38;5;3mx"),
            "<span class=\"term-fg33\">x</span>"
        );
        assert_eq!(
            render("\x1b[48;2;1;2;3mx"),
            "<span style=\"background-color:rgb(1,2,3)\">x</span>"
        );
    }

    #[test]
    fn test_carriage_return_overwrites() {
        assert_eq!(render("downloading 10%\rdownloading 100%\ndone"), "downloading 100%\ndone");
        assert_eq!(render("abcdef\rxy"), "xycdef");
        assert_eq!(render("abcdef\rxy\x1b[K"), "xy");
    }

    #[test]
    fn test_backspace_and_erase_line() {
        assert_eq!(render("abc\x08\x08X"), "aXc");
        assert_eq!(render("abc\x1b[2Kz"), "z");
    }

    #[test]
    fn test_non_sgr_sequences_dropped() {
        assert_eq!(render("\x1b[?25lhidden cursor\x1b[?25h"), "hidden cursor");
        assert_eq!(render("\x1b]0;title\x07text"), "text");
        assert_eq!(render("\x1b(Bx\x07y"), "xy");
    }

    #[test]
    fn test_styles_spanning_lines() {
        assert_eq!(
            render("\x1b[32ma\nb\x1b[0m\n"),
            "<span class=\"term-fg32\">a</span>\n<span class=\"term-fg32\">b</span>"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let input = b"\x1b[1m==> Building\x1b[0m\r\n\x1b[33mwarning\x1b[0m: x\n";
        let r = AnsiRenderer::new();
        assert_eq!(r.render(input), r.render(input));
    }
}
