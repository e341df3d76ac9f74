//! Hex color literals.
//!
//! Accepted forms, all prefixed with `#`:
//!
//! - `#rgb` and `#rrggbb`: opaque colors
//! - `#rgbAA` and `#rrggbbAA`: the trailing two characters are a decimal
//!   percentage for alpha (`#0078D480` has alpha `0.8`)
//!
//! Three-digit channels are scaled by 15, six-digit channels by 255.

use crate::error::ColorError;
use crate::util::float_literal;

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    /// Parses a `#`-prefixed hex literal.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let input = input.trim();
        let hex = input
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHashPrefix(input.to_string()))?;

        let (digits, alpha) = match hex.len() {
            5 | 8 => {
                let (digits, percent) = hex.split_at(hex.len() - 2);
                if !percent.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ColorError::InvalidHex(input.to_string()));
                }
                let percent: f64 = percent
                    .parse()
                    .map_err(|_| ColorError::InvalidHex(input.to_string()))?;
                (digits, percent / 100.0)
            }
            _ => (hex, 1.0),
        };

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(input.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(input.to_string()))?;

        match digits.len() {
            3 => Ok(Color {
                red: f64::from((value >> 8) & 0xF) / 15.0,
                green: f64::from((value >> 4) & 0xF) / 15.0,
                blue: f64::from(value & 0xF) / 15.0,
                alpha,
            }),
            6 => Ok(Color {
                red: f64::from((value >> 16) & 0xFF) / 255.0,
                green: f64::from((value >> 8) & 0xFF) / 255.0,
                blue: f64::from(value & 0xFF) / 255.0,
                alpha,
            }),
            len => Err(ColorError::InvalidLength {
                value: input.to_string(),
                len,
            }),
        }
    }

    pub fn to_swift(&self) -> String {
        format!(
            "UIColor(red: {}, green: {}, blue: {}, alpha: {})",
            float_literal(self.red),
            float_literal(self.green),
            float_literal(self.blue),
            float_literal(self.alpha)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_six_digit_opaque() {
        let color = Color::parse("#0078D4").unwrap();
        assert!(approx(color.red, 0.0));
        assert!(approx(color.green, 120.0 / 255.0));
        assert!(approx(color.blue, 212.0 / 255.0));
        assert!(approx(color.alpha, 1.0));
    }

    #[test]
    fn test_alpha_suffix_is_percentage() {
        let color = Color::parse("#0078D480").unwrap();
        assert!(approx(color.blue, 212.0 / 255.0));
        assert!(approx(color.alpha, 0.8));

        let short = Color::parse("#fff50").unwrap();
        assert!(approx(short.red, 1.0));
        assert!(approx(short.alpha, 0.5));
    }

    #[test]
    fn test_three_digit() {
        let color = Color::parse("#f80").unwrap();
        assert!(approx(color.red, 1.0));
        assert!(approx(color.green, 8.0 / 15.0));
        assert!(approx(color.blue, 0.0));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Color::parse("0078D4"),
            Err(ColorError::MissingHashPrefix(_))
        ));
        assert!(matches!(Color::parse("#zzzzzz"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::parse("#123456zz"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(
            Color::parse("#1234"),
            Err(ColorError::InvalidLength { len: 4, .. })
        ));
    }

    #[test]
    fn test_swift_literal() {
        assert_eq!(
            Color::parse("#ffffff").unwrap().to_swift(),
            "UIColor(red: 1.0, green: 1.0, blue: 1.0, alpha: 1.0)"
        );
    }
}
