use std::path::{Path, PathBuf};

use common::{
    config::{ChartConfig, LegendPosition},
    series::Series,
    style::{LineKind, LineStyle, Marker},
};
use eyre::Result;
use plotters::{prelude::*, series::DashedLineSeries};
use plotters_backend::BackendCoord;
use tracing::debug;

use crate::{PlotError, eps::EpsBackend, glyph::GlyphTextBackend};

const LINE_WIDTH: u32 = 2;
const MARKER_RADIUS: f64 = 5.0;
const LEGEND_WIDTH: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Eps,
    Svg,
    Bitmap,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, PlotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("eps" | "ps") => Ok(Self::Eps),
            Some("svg") => Ok(Self::Svg),
            Some("png" | "bmp" | "jpg" | "jpeg") => Ok(Self::Bitmap),
            _ => Err(PlotError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Draws every series as a log-log line chart into `path`.
pub fn render_loglog(path: &Path, series: &[Series], chart: &ChartConfig) -> Result<PathBuf> {
    let styles = series
        .iter()
        .map(|s| s.style.parse::<LineStyle>())
        .collect::<Result<Vec<_>, _>>()?;

    let format = OutputFormat::from_path(path)?;
    debug!("Rendering {} as {format:?}", path.display());
    match format {
        OutputFormat::Eps => draw_chart(EpsBackend::new(path, chart.size), series, &styles, chart)?,
        OutputFormat::Svg => draw_chart(SVGBackend::new(path, chart.size), series, &styles, chart)?,
        OutputFormat::Bitmap => draw_chart(
            GlyphTextBackend::new(BitMapBackend::new(path, chart.size)),
            series,
            &styles,
            chart,
        )?,
    }
    Ok(path.to_path_buf())
}

fn draw_chart<DB>(
    backend: DB,
    series: &[Series],
    styles: &[LineStyle],
    chart: &ChartConfig,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let font = chart.font_size as f64;
    let (x0, x1) = chart.x_range;
    let (y0, y1) = chart.y_range;
    let mut ctx = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size((font * 3.0) as u32)
        .y_label_area_size((font * 4.5) as u32)
        .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

    let axis_font = FontDesc::new(FontFamily::SansSerif, font, FontStyle::Normal);
    ctx.configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&BLACK.mix(0.1))
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(axis_font.color(&BLACK))
        .label_style(axis_font.color(&BLACK))
        .x_label_formatter(&|v: &f64| tick_label(*v))
        .y_label_formatter(&|v: &f64| tick_label(*v))
        .draw()?;

    for (s, style) in series.iter().zip(styles) {
        let color = RGBColor(style.color.0, style.color.1, style.color.2);
        let line_style = ShapeStyle {
            color: color.to_rgba(),
            filled: false,
            stroke_width: LINE_WIDTH,
        };
        let marker_style = ShapeStyle {
            color: color.to_rgba(),
            filled: true,
            stroke_width: 1,
        };
        let sample = LegendSample::new(style, line_style, marker_style);
        let legend = move |(x, y): BackendCoord| {
            EmptyElement::at((x, y))
                + PathElement::new(sample.left.clone(), sample.line_style)
                + PathElement::new(sample.right.clone(), sample.line_style)
                + Polygon::new(sample.marker.clone(), sample.marker_style)
        };
        let points = s.points.iter().copied();

        if style.line != LineKind::None {
            let anno = match dash_pattern(style.line) {
                None => ctx.draw_series(LineSeries::new(points.clone(), line_style))?,
                Some((dash, gap)) => ctx.draw_series(DashedLineSeries::new(
                    points.clone(),
                    dash,
                    gap,
                    line_style,
                ))?,
            };
            if style.marker.is_none() {
                anno.label(s.label.as_str()).legend(legend.clone());
            }
        }

        if let Some(marker) = style.marker {
            let outline = marker_outline(marker, MARKER_RADIUS);
            ctx.draw_series(
                points.map(|p| EmptyElement::at(p) + Polygon::new(outline.clone(), marker_style)),
            )?
            .label(s.label.as_str())
            .legend(legend);
        }
        debug!("Drew series {} with {} points", s.name, s.points.len());
    }

    ctx.configure_series_labels()
        .position(legend_position(chart.legend))
        .legend_area_size(LEGEND_WIDTH + 10)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.5))
        .label_font(FontDesc::new(FontFamily::SansSerif, font * 0.8, FontStyle::Normal).color(&BLACK))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Legend sample: the line, broken in the middle for dashed kinds, and the
/// marker centred on it. Offsets are relative to the legend anchor.
#[derive(Clone)]
struct LegendSample {
    left: Vec<BackendCoord>,
    right: Vec<BackendCoord>,
    line_style: ShapeStyle,
    marker: Vec<BackendCoord>,
    marker_style: ShapeStyle,
}

impl LegendSample {
    fn new(style: &LineStyle, line_style: ShapeStyle, marker_style: ShapeStyle) -> Self {
        let invisible = ShapeStyle {
            color: TRANSPARENT,
            filled: true,
            stroke_width: 1,
        };
        let mid = LEGEND_WIDTH / 2;
        let (left, right) = match style.line {
            LineKind::Solid => ((0, mid), (mid, LEGEND_WIDTH)),
            _ => ((0, mid - 4), (mid + 4, LEGEND_WIDTH)),
        };
        let (marker, marker_style) = match style.marker {
            Some(m) => (
                marker_outline(m, MARKER_RADIUS)
                    .into_iter()
                    .map(|(x, y)| (x + mid, y))
                    .collect(),
                marker_style,
            ),
            None => (vec![(mid, 0), (mid + 1, 0), (mid, 1)], invisible),
        };
        Self {
            left: vec![(left.0, 0), (left.1, 0)],
            right: vec![(right.0, 0), (right.1, 0)],
            line_style: if style.line == LineKind::None {
                invisible
            } else {
                line_style
            },
            marker,
            marker_style,
        }
    }
}

fn dash_pattern(line: LineKind) -> Option<(u32, u32)> {
    match line {
        LineKind::Dashed => Some((10, 6)),
        LineKind::DashDot => Some((12, 4)),
        LineKind::Dotted => Some((2, 4)),
        LineKind::Solid | LineKind::None => None,
    }
}

/// Marker outline as pixel offsets around the data point.
pub fn marker_outline(marker: Marker, r: f64) -> Vec<BackendCoord> {
    let polar = |n: usize, radius: f64, phase: f64| -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let t = phase + i as f64 * std::f64::consts::TAU / n as f64;
                (radius * t.cos(), radius * t.sin())
            })
            .collect()
    };
    let arm = (r / 4.0).max(1.0);
    let plus = vec![
        (-arm, -r),
        (arm, -r),
        (arm, -arm),
        (r, -arm),
        (r, arm),
        (arm, arm),
        (arm, r),
        (-arm, r),
        (-arm, arm),
        (-r, arm),
        (-r, -arm),
        (-arm, -arm),
    ];

    let points = match marker {
        Marker::Circle => polar(16, r, 0.0),
        Marker::Point => polar(8, r / 2.0, 0.0),
        Marker::Square => {
            let s = r * 0.85;
            vec![(-s, -s), (s, -s), (s, s), (-s, s)]
        }
        Marker::TriangleUp => vec![(0.0, -r), (r, r * 0.75), (-r, r * 0.75)],
        Marker::TriangleDown => vec![(0.0, r), (r, -r * 0.75), (-r, -r * 0.75)],
        Marker::Diamond => vec![(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)],
        Marker::ThinDiamond => vec![(0.0, -r), (r * 0.6, 0.0), (0.0, r), (-r * 0.6, 0.0)],
        Marker::Plus => plus,
        Marker::Cross => {
            let (sin, cos) = std::f64::consts::FRAC_PI_4.sin_cos();
            plus.into_iter()
                .map(|(x, y)| (x * cos - y * sin, x * sin + y * cos))
                .collect()
        }
    };
    points
        .into_iter()
        .map(|(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

/// Plain decimal tick labels, `0.001` rather than `1e-3`.
pub fn tick_label(value: f64) -> String {
    let s = format!("{value:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_owned()
    } else {
        s.to_owned()
    }
}

fn legend_position(position: LegendPosition) -> SeriesLabelPosition {
    match position {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperMiddle => SeriesLabelPosition::UpperMiddle,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::MiddleLeft => SeriesLabelPosition::MiddleLeft,
        LegendPosition::MiddleMiddle => SeriesLabelPosition::MiddleMiddle,
        LegendPosition::MiddleRight => SeriesLabelPosition::MiddleRight,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendPosition::LowerMiddle => SeriesLabelPosition::LowerMiddle,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("a/indexing.eps")).unwrap(),
            OutputFormat::Eps
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("indexing.PNG")).unwrap(),
            OutputFormat::Bitmap
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("indexing.svg")).unwrap(),
            OutputFormat::Svg
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("indexing.pdf")),
            Err(PlotError::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path(Path::new("indexing")).is_err());
    }

    #[test]
    fn tick_labels_are_plain_decimals() {
        assert_eq!(tick_label(0.001), "0.001");
        assert_eq!(tick_label(0.05), "0.05");
        assert_eq!(tick_label(1.0), "1");
        assert_eq!(tick_label(50.0), "50");
        assert_eq!(tick_label(0.30000000000000004), "0.3");
    }

    #[test]
    fn markers_are_centred() {
        for marker in [
            Marker::Circle,
            Marker::Square,
            Marker::Diamond,
            Marker::Plus,
            Marker::Cross,
        ] {
            let outline = marker_outline(marker, 5.0);
            let sx: i32 = outline.iter().map(|p| p.0).sum();
            let sy: i32 = outline.iter().map(|p| p.1).sum();
            assert!(sx.abs() <= 1 && sy.abs() <= 1, "{marker:?} off centre");
            assert!(outline.iter().all(|p| p.0.abs() <= 5 && p.1.abs() <= 5));
        }
        assert_eq!(marker_outline(Marker::Circle, 5.0).len(), 16);
        assert_eq!(marker_outline(Marker::TriangleUp, 4.0)[0], (0, -4));
    }

    #[test]
    fn only_broken_lines_have_dashes() {
        assert_eq!(dash_pattern(LineKind::Solid), None);
        assert_eq!(dash_pattern(LineKind::None), None);
        assert!(dash_pattern(LineKind::Dashed).is_some());
    }

    #[test]
    fn legend_text_stays_inside_the_png() {
        let config = common::config::Config::default();
        let series = config
            .series
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut s = Series::new(c);
                s.points = vec![(0.1, 0.01 * (i + 1) as f64), (1.0, 0.1), (3.0, 0.5)];
                s
            })
            .collect::<Vec<_>>();
        let styles = series
            .iter()
            .map(|s| s.style.parse::<LineStyle>().unwrap())
            .collect::<Vec<_>>();

        let (w, h) = config.chart.size;
        let mut buf = vec![0u8; (w * h * 3) as usize];
        draw_chart(
            GlyphTextBackend::new(BitMapBackend::with_buffer(&mut buf, (w, h))),
            &series,
            &styles,
            &config.chart,
        )
        .unwrap();

        // The chart margin on the right must stay blank
        let row_len = (w * 3) as usize;
        for row in buf.chunks(row_len) {
            for px in row[row_len - 10 * 3..].chunks(3) {
                assert_eq!(px, [255, 255, 255]);
            }
        }
    }
}
