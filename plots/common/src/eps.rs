//! Encapsulated PostScript drawing backend.
//!
//! Text is set with the PostScript base fonts, so no font files are needed.
//! Coordinates are kept in backend pixels and emitted as points, with the y
//! axis flipped to PostScript's bottom-left origin.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Local;
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontFamily, FontStyle, FontTransform,
    text_anchor::{HPos, VPos},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EpsError {
    #[error("Write EPS file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct EpsBackend {
    path: PathBuf,
    size: (u32, u32),
    body: String,
}

impl EpsBackend {
    pub fn new<P: AsRef<Path>>(path: P, size: (u32, u32)) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            size,
            body: String::new(),
        }
    }

    /// The complete document for what has been drawn so far.
    pub fn document(&self) -> String {
        let (w, h) = self.size;
        let title = self
            .path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut doc = String::with_capacity(self.body.len() + 512);
        doc.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
        doc.push_str(&format!("%%BoundingBox: 0 0 {w} {h}\n"));
        doc.push_str(&format!("%%Title: {title}\n"));
        doc.push_str(&format!("%%Creator: {}\n", env!("CARGO_PKG_NAME")));
        doc.push_str(&format!(
            "%%CreationDate: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S %z")
        ));
        doc.push_str("%%Pages: 1\n%%EndComments\n");
        doc.push_str("1 setlinejoin 1 setlinecap\n");
        doc.push_str(&self.body);
        doc.push_str("showpage\n%%EOF\n");
        doc
    }

    fn flip(&self, (x, y): BackendCoord) -> (i32, i32) {
        (x, self.size.1 as i32 - y)
    }

    fn set_color(&mut self, color: BackendColor) {
        let (r, g, b) = color.rgb;
        self.body.push_str(&format!(
            "{} {} {} setrgbcolor\n",
            channel(r),
            channel(g),
            channel(b)
        ));
    }

    fn set_stroke<S: BackendStyle>(&mut self, style: &S) {
        self.set_color(style.color());
        self.body
            .push_str(&format!("{} setlinewidth\n", style.stroke_width().max(1)));
    }

    fn trace<I: IntoIterator<Item = BackendCoord>>(&mut self, path: I) -> usize {
        let mut count = 0;
        for point in path {
            let (x, y) = self.flip(point);
            let op = if count == 0 { "moveto" } else { "lineto" };
            self.body.push_str(&format!("{x} {y} {op}\n"));
            count += 1;
        }
        count
    }
}

fn channel(value: u8) -> String {
    let v = value as f64 / 255.0;
    let s = format!("{v:.3}");
    match s.trim_end_matches('0').trim_end_matches('.') {
        "" => "0".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

/// Escapes PostScript string delimiters. Characters outside ASCII have no
/// glyph in the standard encoding and become `?`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn font_name(family: FontFamily<'_>, style: FontStyle) -> &'static str {
    match (family, style) {
        (FontFamily::Serif, FontStyle::Normal) => "Times-Roman",
        (FontFamily::Serif, FontStyle::Bold) => "Times-Bold",
        (FontFamily::Serif, _) => "Times-Italic",
        (FontFamily::Monospace, FontStyle::Normal) => "Courier",
        (FontFamily::Monospace, FontStyle::Bold) => "Courier-Bold",
        (FontFamily::Monospace, _) => "Courier-Oblique",
        (_, FontStyle::Bold) => "Helvetica-Bold",
        (_, FontStyle::Normal) => "Helvetica",
        (_, _) => "Helvetica-Oblique",
    }
}

impl DrawingBackend for EpsBackend {
    type ErrorType = EpsError;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<EpsError>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<EpsError>> {
        fs::write(&self.path, self.document()).map_err(|source| {
            DrawingErrorKind::DrawingError(EpsError::Io {
                path: self.path.clone(),
                source,
            })
        })?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        if color.alpha == 0.0 {
            return Ok(());
        }
        self.set_color(color);
        let (x, y) = self.flip(point);
        self.body.push_str(&format!("{x} {} 1 1 rectfill\n", y - 1));
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        self.draw_path([from, to], style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let (x, y) = self.flip((upper_left.0, bottom_right.1));
        let w = bottom_right.0 - upper_left.0;
        let h = bottom_right.1 - upper_left.1;
        if fill {
            self.set_color(style.color());
            self.body
                .push_str(&format!("{x} {} {} {} rectfill\n", y - 1, w + 1, h + 1));
        } else {
            self.set_stroke(style);
            self.body.push_str(&format!("{x} {y} {w} {h} rectstroke\n"));
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_stroke(style);
        self.body.push_str("newpath\n");
        if self.trace(path) > 1 {
            self.body.push_str("stroke\n");
        } else {
            self.body.push_str("newpath\n");
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        if fill {
            self.set_color(style.color());
        } else {
            self.set_stroke(style);
        }
        let (x, y) = self.flip(center);
        let op = if fill { "fill" } else { "stroke" };
        self.body
            .push_str(&format!("newpath {x} {y} {radius} 0 360 arc closepath {op}\n"));
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_color(style.color());
        self.body.push_str("newpath\n");
        if self.trace(vert) > 2 {
            self.body.push_str("closepath fill\n");
        } else {
            self.body.push_str("newpath\n");
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<EpsError>> {
        let color = style.color();
        if color.alpha == 0.0 || text.is_empty() {
            return Ok(());
        }
        // plotters sizes fonts 1.24 em, as its SVG backend does
        let em = style.size() / 1.24;
        let ((min_x, _), (max_x, _)) = style
            .layout_box(text)
            .map_err(|e| DrawingErrorKind::FontError(Box::new(e)))?;
        let box_width = (max_x - min_x).max(1);
        let (x, y) = self.flip(pos);
        let angle = match style.transform() {
            FontTransform::None => 0,
            FontTransform::Rotate90 => -90,
            FontTransform::Rotate180 => 180,
            FontTransform::Rotate270 => 90,
        };
        let anchor = style.anchor();
        let h_factor = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -0.5,
            HPos::Right => -1.0,
        };
        // Baseline offset from the anchor, y up
        let baseline = match anchor.v_pos {
            VPos::Top => -0.76 * em,
            VPos::Center => -0.35 * em,
            VPos::Bottom => 0.24 * em,
        };

        self.body.push_str("gsave\n");
        self.body
            .push_str(&format!("{x} {y} translate {angle} rotate\n"));
        self.body.push_str(&format!(
            "/{} findfont {em:.1} scalefont setfont\n",
            font_name(style.family(), style.style())
        ));
        self.set_color(color);
        // Squeeze text wider than the box plotters laid out for it
        self.body.push_str(&format!(
            "({text}) dup stringwidth pop {box_width} exch div dup 1 gt {{ pop 1 }} if 1 scale\n\
             dup stringwidth pop {h_factor} mul {baseline:.2} moveto show\n",
            text = escape(text)
        ));
        self.body.push_str("grestore\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use plotters::prelude::*;

    use super::*;

    #[test]
    fn escapes_string_delimiters() {
        assert_eq!(escape("Crux (w/ index)"), r"Crux \(w/ index\)");
        assert_eq!(escape(r"a\b"), r"a\\b");
        assert_eq!(escape("5 µs"), "5 ?s");
    }

    #[test]
    fn channel_values_are_compact() {
        assert_eq!(channel(0), "0");
        assert_eq!(channel(255), "1");
        assert_eq!(channel(191), "0.749");
    }

    #[test]
    fn picks_postscript_fonts() {
        assert_eq!(font_name(FontFamily::SansSerif, FontStyle::Normal), "Helvetica");
        assert_eq!(font_name(FontFamily::Serif, FontStyle::Bold), "Times-Bold");
        assert_eq!(
            font_name(FontFamily::Monospace, FontStyle::Italic),
            "Courier-Oblique"
        );
    }

    #[test]
    fn writes_document_with_bounding_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.eps");
        {
            let root = EpsBackend::new(&path, (200, 100)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            root.draw(&PathElement::new(vec![(10, 10), (190, 90)], BLACK))
                .unwrap();
            root.draw(&Text::new(
                "Window (Da)",
                (20, 20),
                FontDesc::new(FontFamily::SansSerif, 12.0, FontStyle::Normal),
            ))
            .unwrap();
            root.present().unwrap();
        }

        let doc = fs::read_to_string(&path).unwrap();
        assert!(doc.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(doc.contains("%%BoundingBox: 0 0 200 100\n"));
        assert!(doc.contains("10 90 moveto\n190 10 lineto\nstroke\n"));
        assert!(doc.contains(r"(Window \(Da\)) dup stringwidth"));
        assert!(doc.contains("/Helvetica findfont 9.7 scalefont"));
        // squeezed to the 60 points plotters reserves for the label
        assert!(doc.contains(r"(Window \(Da\)) dup stringwidth pop 60 exch div"));
        assert!(doc.ends_with("showpage\n%%EOF\n"));
    }

    #[test]
    fn transparent_shapes_are_skipped() {
        let mut backend = EpsBackend::new("unused.eps", (10, 10));
        backend
            .draw_line((0, 0), (5, 5), &TRANSPARENT.to_backend_color())
            .unwrap();
        backend
            .fill_polygon([(0, 0), (1, 0), (0, 1)], &TRANSPARENT.to_backend_color())
            .unwrap();
        assert!(backend.body.is_empty());
    }
}
