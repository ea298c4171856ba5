//! Colors and color schemes for window borders and the bar
use crate::{Error, Result};
use std::convert::TryFrom;

/// A simple RGBA based color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

// helper for methods in Color
macro_rules! _f2u { { $f:expr, $s:expr } => { (($f * 255.0) as u32) << $s } }

impl Color {
    /// Create a new Color from a hex encoded u32: 0xRRGGBBAA
    pub fn new_from_hex(hex: u32) -> Self {
        let floats: Vec<f64> = hex
            .to_be_bytes()
            .iter()
            .map(|n| *n as f64 / 255.0)
            .collect();

        let (r, g, b, a) = (floats[0], floats[1], floats[2], floats[3]);

        Self { r, g, b, a }
    }

    /// The RGB information of this color as 0.0-1.0 range floats representing
    /// proportions of 255 for each of R, G, B
    pub fn rgb(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }

    /// 0xRRGGBB representation of this Color (no alpha information).
    ///
    /// This is the form expected for core protocol pixel values on the
    /// true color visuals girih assumes.
    pub fn rgb_u32(&self) -> u32 {
        _f2u!(self.r, 16) + _f2u!(self.g, 8) + _f2u!(self.b, 0)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::new_from_hex(hex)
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        let hex = u32::from_str_radix(s.strip_prefix('#').unwrap_or(s), 16)
            .map_err(|_| Error::InvalidHexColor(s.into()))?;

        if s.len() == 7 {
            Ok(Self::new_from_hex((hex << 8) + 0xFF))
        } else if s.len() == 9 {
            Ok(Self::new_from_hex(hex))
        } else {
            Err(Error::InvalidHexColor(s.into()))
        }
    }
}

/// The color triple used when rendering a bar element or client border.
///
/// Schemes come in pairs: one for unfocused elements and one for the
/// focused ones (see [Config](crate::config::Config)).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScheme {
    /// Foreground (text) color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Window border color
    pub border: Color,
}

impl ColorScheme {
    /// Parse a scheme from #RRGGBB hex strings.
    pub fn try_new(fg: &str, bg: &str, border: &str) -> Result<Self> {
        Ok(Self {
            fg: fg.try_into()?,
            bg: bg.try_into()?,
            border: border.try_into()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("#ffffff", 0xffffff; "white")]
    #[test_case("#000000", 0x000000; "black")]
    #[test_case("#005577", 0x005577; "dwm cyan")]
    #[test]
    fn hex_strings_parse(s: &str, expected: u32) {
        let c = Color::try_from(s).expect("valid hex string");

        assert_eq!(c.rgb_u32(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("#fff"; "short form")]
    #[test_case("#zzzzzz"; "invalid digits")]
    #[test]
    fn invalid_hex_strings_error(s: &str) {
        assert!(matches!(
            Color::try_from(s),
            Err(Error::InvalidHexColor(_))
        ));
    }
}
