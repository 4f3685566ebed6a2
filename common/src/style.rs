//! Compact line styles in the matplotlib format string notation, eg. `k--o`
//! for a black dashed line with circle markers.

use std::str::FromStr;

use crate::error::StyleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'b' => Rgb(0, 0, 255),
            'g' => Rgb(0, 128, 0),
            'r' => Rgb(255, 0, 0),
            'c' => Rgb(0, 191, 191),
            'm' => Rgb(191, 0, 191),
            'y' => Rgb(191, 191, 0),
            'k' => Rgb(0, 0, 0),
            'w' => Rgb(255, 255, 255),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    DashDot,
    Dotted,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Point,
    Square,
    TriangleUp,
    TriangleDown,
    Diamond,
    ThinDiamond,
    Plus,
    Cross,
}

impl Marker {
    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'o' => Marker::Circle,
            '.' => Marker::Point,
            's' => Marker::Square,
            '^' => Marker::TriangleUp,
            'v' => Marker::TriangleDown,
            'D' => Marker::Diamond,
            'd' => Marker::ThinDiamond,
            '+' => Marker::Plus,
            'x' => Marker::Cross,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub color: Rgb,
    pub line: LineKind,
    pub marker: Option<Marker>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            line: LineKind::Solid,
            marker: None,
        }
    }
}

impl FromStr for LineStyle {
    type Err = StyleError;

    /// Color, line and marker may come in any order. Giving only a marker
    /// draws no connecting line.
    fn from_str(style: &str) -> Result<Self, Self::Err> {
        let mut color = None;
        let mut line = None;
        let mut marker = None;

        let duplicate = |what| StyleError::Duplicate {
            style: style.to_owned(),
            what,
        };

        let mut rest = style;
        while let Some(c) = rest.chars().next() {
            let (kind, len) = if rest.starts_with("--") {
                (Some(LineKind::Dashed), 2)
            } else if rest.starts_with("-.") {
                (Some(LineKind::DashDot), 2)
            } else if c == '-' {
                (Some(LineKind::Solid), 1)
            } else if c == ':' {
                (Some(LineKind::Dotted), 1)
            } else {
                (None, c.len_utf8())
            };

            if let Some(kind) = kind {
                if line.replace(kind).is_some() {
                    return Err(duplicate("line"));
                }
            } else if let Some(rgb) = Rgb::from_code(c) {
                if color.replace(rgb).is_some() {
                    return Err(duplicate("color"));
                }
            } else if let Some(m) = Marker::from_code(c) {
                if marker.replace(m).is_some() {
                    return Err(duplicate("marker"));
                }
            } else {
                return Err(StyleError::Unrecognized {
                    style: style.to_owned(),
                    found: c,
                });
            }
            rest = &rest[len..];
        }

        let line = match (line, marker) {
            (Some(line), _) => line,
            (None, Some(_)) => LineKind::None,
            (None, None) => LineKind::Solid,
        };
        Ok(Self {
            color: color.unwrap_or(Rgb::BLACK),
            line,
            marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashed_black_circles() {
        let style: LineStyle = "k--o".parse().unwrap();
        assert_eq!(style.color, Rgb::BLACK);
        assert_eq!(style.line, LineKind::Dashed);
        assert_eq!(style.marker, Some(Marker::Circle));
    }

    #[test]
    fn parses_solid_magenta_squares() {
        let style: LineStyle = "m-s".parse().unwrap();
        assert_eq!(style.color, Rgb(191, 0, 191));
        assert_eq!(style.line, LineKind::Solid);
        assert_eq!(style.marker, Some(Marker::Square));
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!("o--k".parse::<LineStyle>(), "k--o".parse::<LineStyle>());
        assert_eq!(
            "-.r".parse::<LineStyle>().unwrap().line,
            LineKind::DashDot
        );
    }

    #[test]
    fn marker_only_has_no_line() {
        let style: LineStyle = "r^".parse().unwrap();
        assert_eq!(style.line, LineKind::None);
        assert_eq!(style.marker, Some(Marker::TriangleUp));
    }

    #[test]
    fn empty_style_is_solid_black() {
        assert_eq!("".parse::<LineStyle>(), Ok(LineStyle::default()));
        assert_eq!(":".parse::<LineStyle>().unwrap().line, LineKind::Dotted);
    }

    #[test]
    fn rejects_unknown_and_repeated_parts() {
        assert_eq!(
            "k-q".parse::<LineStyle>(),
            Err(StyleError::Unrecognized {
                style: "k-q".to_owned(),
                found: 'q'
            })
        );
        assert!(matches!(
            "kr-".parse::<LineStyle>(),
            Err(StyleError::Duplicate { what: "color", .. })
        ));
        assert!(matches!(
            "--o-".parse::<LineStyle>(),
            Err(StyleError::Duplicate { what: "line", .. })
        ));
    }
}
