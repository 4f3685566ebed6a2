//! Text rendering for raster backends from a built-in 5x7 bitmap font, so
//! figures come out the same on machines without any system fonts.

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    text_anchor::{HPos, VPos},
};

const CELL_ROWS: usize = 9;
const SPACE_WIDTH: i32 = 3;

#[derive(Debug, Clone, Copy)]
struct Glyph {
    width: u8,
    rows: [u8; CELL_ROWS],
}

const fn g(width: u8, r: [u8; 7]) -> Glyph {
    Glyph {
        width,
        rows: [r[0], r[1], r[2], r[3], r[4], r[5], r[6], 0, 0],
    }
}

const fn descender(r: [u8; CELL_ROWS]) -> Glyph {
    Glyph { width: 5, rows: r }
}

const UNKNOWN: Glyph = g(5, [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
]);

fn glyph(c: char) -> Option<Glyph> {
    Some(match c {
        '0' => g(5, [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => g(5, [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => g(5, [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => g(5, [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
        '4' => g(5, [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => g(5, [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => g(5, [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => g(5, [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => g(5, [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => g(5, [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        'A' => g(5, [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'B' => g(5, [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
        'C' => g(5, [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
        'D' => g(5, [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
        'E' => g(5, [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
        'F' => g(5, [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
        'G' => g(5, [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => g(5, [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'I' => g(3, [0b111, 0b010, 0b010, 0b010, 0b010, 0b010, 0b111]),
        'J' => g(5, [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'K' => g(5, [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
        'L' => g(5, [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
        'M' => g(5, [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
        'N' => g(5, [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
        'O' => g(5, [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'P' => g(5, [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'Q' => g(5, [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
        'R' => g(5, [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
        'S' => g(5, [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
        'T' => g(5, [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'U' => g(5, [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'V' => g(5, [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'W' => g(5, [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
        'X' => g(5, [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
        'Y' => g(5, [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
        'Z' => g(5, [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        'a' => g(5, [0, 0, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111]),
        'b' => g(5, [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110]),
        'c' => g(5, [0, 0, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110]),
        'd' => g(5, [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111]),
        'e' => g(5, [0, 0, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110]),
        'f' => g(4, [0b0011, 0b0100, 0b0100, 0b1110, 0b0100, 0b0100, 0b0100]),
        'g' => descender([0, 0, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b10001, 0b01110]),
        'h' => g(5, [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001]),
        'i' => g(3, [0b010, 0, 0b110, 0b010, 0b010, 0b010, 0b111]),
        'j' => descender([0b00010, 0, 0b00110, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'k' => g(4, [0b1000, 0b1000, 0b1001, 0b1010, 0b1100, 0b1010, 0b1001]),
        'l' => g(3, [0b110, 0b010, 0b010, 0b010, 0b010, 0b010, 0b111]),
        'm' => g(5, [0, 0, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001]),
        'n' => g(5, [0, 0, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001]),
        'o' => g(5, [0, 0, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110]),
        'p' => descender([0, 0, 0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'q' => descender([0, 0, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b00001]),
        'r' => g(5, [0, 0, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000]),
        's' => g(5, [0, 0, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110]),
        't' => g(4, [0b0100, 0b0100, 0b1110, 0b0100, 0b0100, 0b0101, 0b0010]),
        'u' => g(5, [0, 0, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101]),
        'v' => g(5, [0, 0, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'w' => g(5, [0, 0, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010]),
        'x' => g(5, [0, 0, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001]),
        'y' => descender([0, 0, 0b10001, 0b10001, 0b10001, 0b01111, 0b00001, 0b10001, 0b01110]),
        'z' => g(5, [0, 0, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111]),
        '.' => g(2, [0, 0, 0, 0, 0, 0b11, 0b11]),
        ',' => Glyph {
            width: 2,
            rows: [0, 0, 0, 0, 0, 0b11, 0b11, 0b01, 0b10],
        },
        ':' => g(2, [0, 0b11, 0b11, 0, 0b11, 0b11, 0]),
        '(' => g(3, [0b001, 0b010, 0b100, 0b100, 0b100, 0b010, 0b001]),
        ')' => g(3, [0b100, 0b010, 0b001, 0b001, 0b001, 0b010, 0b100]),
        '/' => g(5, [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000]),
        '-' => g(4, [0, 0, 0, 0b1111, 0, 0, 0]),
        '+' => g(5, [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0]),
        '=' => g(5, [0, 0, 0b11111, 0, 0b11111, 0, 0]),
        '%' => g(5, [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011]),
        '_' => g(5, [0, 0, 0, 0, 0, 0, 0b11111]),
        '\'' => g(1, [1, 1, 0, 0, 0, 0, 0]),
        _ => return None,
    })
}

fn advance(c: char) -> i32 {
    match c {
        ' ' => SPACE_WIDTH,
        c => glyph(c).unwrap_or(UNKNOWN).width as i32 + 1,
    }
}

/// Width of `text` in font columns. The last column is inter-glyph spacing.
fn columns(text: &str) -> i32 {
    (text.chars().map(advance).sum::<i32>() - 1).max(0)
}

/// Pixel range, inclusive, that cell `i` of `n` covers when `n` cells are
/// stretched or squeezed onto `extent` pixels. Never empty.
fn span(i: i32, n: i32, extent: i32) -> (i32, i32) {
    let start = i * extent / n;
    let end = ((i + 1) * extent / n).max(start + 1);
    (start, end - 1)
}

/// Wraps a backend and replaces its font rendering with the bitmap font.
pub struct GlyphTextBackend<DB> {
    inner: DB,
}

impl<DB> GlyphTextBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for GlyphTextBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.trim().is_empty() {
            return Ok(());
        }

        // Fill the box plotters laid the text out in, so labels stay inside
        // legends and label areas
        let ((min_x, min_y), (max_x, max_y)) = style
            .layout_box(text)
            .map_err(|e| DrawingErrorKind::FontError(Box::new(e)))?;
        let width = (max_x - min_x).max(1);
        let height = (max_y - min_y).max(1);
        let dx = match style.anchor().h_pos {
            HPos::Left => 0,
            HPos::Center => -width / 2,
            HPos::Right => -width,
        };
        let dy = match style.anchor().v_pos {
            VPos::Top => 0,
            VPos::Center => -height / 2,
            VPos::Bottom => -height,
        };
        let transform = style.transform();
        let total = columns(text).max(1);

        let mut cursor = 0;
        for c in text.chars() {
            if c == ' ' {
                cursor += advance(c);
                continue;
            }
            let glyph = glyph(c).unwrap_or(UNKNOWN);
            for (row, pattern) in glyph.rows.iter().enumerate() {
                let (y0, y1) = span(row as i32, CELL_ROWS as i32, height);
                for col in 0..glyph.width {
                    if pattern & (1 << (glyph.width - 1 - col)) == 0 {
                        continue;
                    }
                    let (x0, x1) = span(cursor + col as i32, total, width);
                    let a = transform.transform(dx + x0, dy + y0);
                    let b = transform.transform(dx + x1, dy + y1);
                    self.inner.draw_rect(
                        (pos.0 + a.0.min(b.0), pos.1 + a.1.min(b.1)),
                        (pos.0 + a.0.max(b.0), pos.1 + a.1.max(b.1)),
                        &color,
                        true,
                    )?;
                }
            }
            cursor += advance(c);
        }
        Ok(())
    }
}
