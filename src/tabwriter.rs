//! Column-aligning writer
//!
//! Text is treated as cells terminated by `'\t'`. Cells in the same column of
//! adjacent lines form a block that is padded to a common width, so the printer
//! only has to emit tabs where columns begin and never measures text itself.
//! The last cell of a line is not part of any column. A line that consists of a
//! single cell cannot influence later lines, so it flushes everything buffered
//! so far.
//!
//! With `'\t'` as padding character the column width is rounded up to a
//! multiple of the tab width and the padding is written as tabs. In HTML mode
//! markup does not count towards cell widths: `<...>` is zero wide and an
//! entity `&...;` is one character wide.

use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    /// Bytes of text in the buffer.
    size: usize,
    /// Display width.
    width: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Markup {
    Text,
    Tag,
    Entity,
}

pub struct TabWriter<W: Write> {
    out: W,
    min_width: usize,
    tab_width: usize,
    padding: usize,
    pad_char: u8,
    filter_html: bool,

    buf: Vec<u8>,
    cell: Cell,
    markup: Markup,
    lines: Vec<Vec<Cell>>,
    widths: Vec<usize>,
}

impl<W: Write> TabWriter<W> {
    pub fn new(
        out: W,
        min_width: usize,
        tab_width: usize,
        padding: usize,
        pad_char: u8,
        filter_html: bool,
    ) -> Self {
        Self {
            out,
            min_width,
            tab_width,
            padding,
            pad_char,
            filter_html,
            buf: Vec::new(),
            cell: Cell::default(),
            markup: Markup::Text,
            lines: vec![Vec::new()],
            widths: Vec::new(),
        }
    }

    /// Flushes pending text and hands back the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.out)
    }

    fn push(&mut self, ch: u8, visible: bool) {
        self.buf.push(ch);
        self.cell.size += 1;
        // count characters, not bytes
        if visible && ch & 0xC0 != 0x80 {
            self.cell.width += 1;
        }
    }

    fn terminate_cell(&mut self) -> usize {
        let cell = std::mem::take(&mut self.cell);
        match self.lines.last_mut() {
            Some(line) => {
                line.push(cell);
                line.len()
            }
            None => {
                self.lines.push(vec![cell]);
                1
            }
        }
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.cell = Cell::default();
        self.lines.clear();
        self.lines.push(Vec::new());
        self.widths.clear();
    }

    fn flush_lines(&mut self) -> io::Result<()> {
        if self.cell.size > 0 {
            self.markup = Markup::Text;
            self.terminate_cell();
        }
        let end = self.lines.len();
        self.format(0, 0, end)?;
        self.reset();
        Ok(())
    }

    fn format(&mut self, pos: usize, line0: usize, line1: usize) -> io::Result<usize> {
        let mut pos = pos;
        let mut line0 = line0;
        let column = self.widths.len();
        let mut this = line0;
        while this < line1 {
            if column + 1 >= self.lines[this].len() {
                this += 1;
                continue;
            }
            // a cell exists in this column: print the lines above the block
            pos = self.write_lines(pos, line0, this)?;
            line0 = this;

            let mut width = self.min_width;
            while this < line1 {
                let line = &self.lines[this];
                if column + 1 >= line.len() {
                    break;
                }
                width = width.max(line[column].width + self.padding);
                this += 1;
            }

            self.widths.push(width);
            pos = self.format(pos, line0, this)?;
            self.widths.pop();
            line0 = this;
        }
        self.write_lines(pos, line0, line1)
    }

    fn write_lines(&mut self, pos: usize, line0: usize, line1: usize) -> io::Result<usize> {
        let mut pos = pos;
        for i in line0..line1 {
            for (j, cell) in self.lines[i].iter().enumerate() {
                if cell.size > 0 {
                    self.out.write_all(&self.buf[pos..pos + cell.size])?;
                    pos += cell.size;
                }
                if let Some(&width) = self.widths.get(j) {
                    write_padding(
                        &mut self.out,
                        self.pad_char,
                        self.tab_width,
                        cell.width,
                        width,
                    )?;
                }
            }
            if i + 1 == self.lines.len() {
                // last buffered line: partial cell, no newline yet
                self.out.write_all(&self.buf[pos..pos + self.cell.size])?;
                pos += self.cell.size;
            } else {
                self.out.write_all(b"\n")?;
            }
        }
        Ok(pos)
    }
}

fn write_padding<W: Write>(
    out: &mut W,
    pad_char: u8,
    tab_width: usize,
    text_width: usize,
    cell_width: usize,
) -> io::Result<()> {
    if pad_char == b'\t' {
        if tab_width == 0 {
            return Ok(());
        }
        let cell_width = cell_width.div_ceil(tab_width) * tab_width;
        let n = cell_width.saturating_sub(text_width);
        for _ in 0..n.div_ceil(tab_width) {
            out.write_all(b"\t")?;
        }
        return Ok(());
    }
    for _ in text_width..cell_width {
        out.write_all(&[pad_char])?;
    }
    Ok(())
}

impl<W: Write> Write for TabWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        for &ch in data {
            match self.markup {
                Markup::Tag => {
                    self.push(ch, false);
                    if ch == b'>' {
                        self.markup = Markup::Text;
                    }
                }
                Markup::Entity => {
                    self.push(ch, false);
                    if ch == b';' {
                        self.cell.width += 1;
                        self.markup = Markup::Text;
                    }
                }
                Markup::Text => match ch {
                    b'\t' => {
                        self.terminate_cell();
                    }
                    b'\n' => {
                        let cells = self.terminate_cell();
                        self.lines.push(Vec::new());
                        if cells == 1 {
                            self.flush_lines()?;
                        }
                    }
                    b'<' if self.filter_html => {
                        self.markup = Markup::Tag;
                        self.push(ch, false);
                    }
                    b'&' if self.filter_html => {
                        self.markup = Markup::Entity;
                        self.push(ch, false);
                    }
                    _ => self.push(ch, true),
                },
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_lines()?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(text: &str, min_width: usize, pad_char: u8, html: bool) -> String {
        let mut tw = TabWriter::new(Vec::new(), min_width, 4, 1, pad_char, html);
        tw.write_all(text.as_bytes()).unwrap();
        String::from_utf8(tw.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn aligns_cells_of_adjacent_lines() {
        let out = align("a\tb\nccc\td\n", 0, b' ', false);
        assert_eq!(out, "a   b\nccc d\n");
    }

    #[test]
    fn single_cell_line_breaks_the_block() {
        let out = align("a\tx\n\nlonger\ty\n", 0, b' ', false);
        assert_eq!(out, "a x\n\nlonger y\n");
    }

    #[test]
    fn empty_leading_cells_indent_by_min_width() {
        let out = align("f {\n\tx;\n\t\ty\n}\n", 4, b' ', false);
        assert_eq!(out, "f {\n    x;\n        y\n}\n");
    }

    #[test]
    fn tab_padding_rounds_to_tab_stops() {
        let out = align("ab\tc\nabcdef\td\n", 4, b'\t', false);
        assert_eq!(out, "ab\t\tc\nabcdef\td\n");
    }

    #[test]
    fn markup_has_no_width() {
        let out = align("<b>a</b>\tx\n&lt;&lt;\ty\n", 0, b' ', true);
        assert_eq!(out, "<b>a</b>  x\n&lt;&lt; y\n");
    }

    #[test]
    fn multibyte_text_counts_characters() {
        let out = align("é\tx\nab\ty\n", 0, b' ', false);
        assert_eq!(out, "é  x\nab y\n");
    }

    #[test]
    fn unterminated_text_is_written_on_flush() {
        let out = align("a\tb", 0, b' ', false);
        assert_eq!(out, "a b");
    }
}
