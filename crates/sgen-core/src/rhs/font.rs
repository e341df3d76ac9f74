//! Font values.
//!
//! `font(...)` branches on its arguments:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `font(lightIcons)` | symbol font reference |
//! | `font(14)` | system font of size 14 |
//! | `font(body)` | dynamic-type font for a text style |
//! | `font(Helvetica, 14pt, bold)` | named font with size and traits |
//! | `font(System-semibold, headline)` | system font with weight and text style |
//!
//! The family name may be `System`, `SystemBold`, `SystemItalic`,
//! `System-<weight>` or `PreferredSystem`; any other name is a font family
//! looked up by name at runtime. Extra arguments after size or style are
//! weights or `-` separated traits (`bold-italic`).

use crate::error::RhsError;
use crate::util::{first_uppercased, float_literal, parse_number};

pub const WEIGHTS: [&str; 9] = [
    "ultraLight",
    "thin",
    "light",
    "regular",
    "medium",
    "semibold",
    "bold",
    "heavy",
    "black",
];

pub const TEXT_STYLES: [&str; 10] = [
    "caption2",
    "caption1",
    "footnote",
    "subheadline",
    "callout",
    "body",
    "headline",
    "title3",
    "title2",
    "title1",
];

const TRAITS: [&str; 4] = ["italic", "bold", "expanded", "condensed"];

/// Name of the generated enum of text styles, builtin and configured.
pub const TEXT_STYLE_ENUM: &str = "FontTextStyle";

#[derive(Debug, Clone, PartialEq)]
pub enum FontFamily {
    /// No family given.
    Default,
    Named(String),
    System,
    PreferredSystem,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextStyle {
    /// One of [`TEXT_STYLES`].
    Builtin(String),
    /// A style declared in the `typography` configuration.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Font {
    Symbol(String),
    Sized {
        family: FontFamily,
        size: f64,
        weight: Option<String>,
        traits: Vec<String>,
    },
    TextStyle {
        family: FontFamily,
        style: TextStyle,
        weight: Option<String>,
        traits: Vec<String>,
    },
}

impl Font {
    /// Builds a font from the textual arguments of `font(...)`.
    ///
    /// `typography` lists the configured custom text style names.
    pub fn from_args(source: &str, args: &[&str], typography: &[String]) -> Result<Self, RhsError> {
        let invalid = |reason: String| RhsError::InvalidFont {
            value: source.to_string(),
            reason,
        };
        let text_style = |name: &str| {
            if typography.iter().any(|t| t == name) {
                Some(TextStyle::Custom(name.to_string()))
            } else if TEXT_STYLES.contains(&name) {
                Some(TextStyle::Builtin(name.to_string()))
            } else {
                None
            }
        };

        match args {
            [] => return Err(invalid("expected at least one argument".into())),
            [only]
                if parse_number(only).is_none()
                    && text_style(*only).is_none()
                    && !only.starts_with("System")
                    && *only != "PreferredSystem" =>
            {
                return Ok(Font::Symbol(only.to_string()));
            }
            _ if args.len() > 4 => {
                return Err(invalid(format!("expected at most 4 arguments, got {}", args.len())))
            }
            _ => {}
        }

        let mut rest: Vec<&str> = args.to_vec();
        let first = rest.remove(0);

        let mut weight = None;
        let mut traits = Vec::new();

        let family = if parse_number(first).is_some() || text_style(first).is_some() {
            rest.insert(0, first);
            FontFamily::Default
        } else {
            parse_family(first, &mut weight, &mut traits).map_err(invalid)?
        };

        let has_size = rest.iter().any(|arg| parse_number(arg).is_some());
        let selector = if rest.is_empty() {
            None
        } else {
            Some(rest.remove(0))
        };

        for modifier in rest {
            apply_modifier(modifier, &mut weight, &mut traits).map_err(invalid)?;
        }

        if has_size {
            let size = selector
                .and_then(parse_number)
                .ok_or_else(|| invalid("size must follow the font name".into()))?;
            Ok(Font::Sized {
                family,
                size,
                weight,
                traits,
            })
        } else {
            let style = match selector {
                Some(name) => text_style(name)
                    .ok_or_else(|| invalid(format!("`{}` is not a text style", name)))?,
                None if family == FontFamily::PreferredSystem => {
                    TextStyle::Builtin("body".to_string())
                }
                None => return Err(invalid("expected a size or a text style".into())),
            };
            Ok(Font::TextStyle {
                family,
                style,
                weight,
                traits,
            })
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Font::Symbol(_))
    }

    pub fn swift_type(&self) -> &'static str {
        if self.is_symbol() {
            "String"
        } else {
            "UIFont"
        }
    }

    /// `enums` is the namespace of generated enums, used for custom text styles.
    pub fn to_swift(&self, enums: &str) -> String {
        let (family, size, style, weight, traits) = match self {
            Font::Symbol(name) => return format!("\"{}\"", name),
            Font::Sized {
                family,
                size,
                weight,
                traits,
            } => (family, Some(*size), None, weight, traits),
            Font::TextStyle {
                family,
                style,
                weight,
                traits,
            } => (family, None, Some(style), weight, traits),
        };

        let name = match family {
            FontFamily::Named(name) => format!("\"{}\"", name),
            _ => "nil".to_string(),
        };
        let size = size.map_or_else(|| "nil".to_string(), float_literal);
        let text_style = match style {
            Some(TextStyle::Builtin(style) | TextStyle::Custom(style)) => {
                format!("{}.{}.{}", enums, TEXT_STYLE_ENUM, style)
            }
            None => "nil".to_string(),
        };
        let weight = weight
            .as_ref()
            .map_or_else(|| "nil".to_string(), |w| format!("UIFont.Weight.{}", w));
        let traits = traits
            .iter()
            .map(|t| format!("UIFontDescriptor.SymbolicTraits.trait{}", first_uppercased(t)))
            .collect::<Vec<_>>()
            .join(", ");
        let scalable = style.is_some() || *family == FontFamily::PreferredSystem;

        format!(
            "UIFont.font(name: {}, size: {}, textStyle: {}, weight: {}, traits: [{}], traitCollection: traitCollection, isScalable: {})",
            name, size, text_style, weight, traits, scalable
        )
    }
}

fn parse_family(
    name: &str,
    weight: &mut Option<String>,
    traits: &mut Vec<String>,
) -> Result<FontFamily, String> {
    match name {
        "PreferredSystem" => return Ok(FontFamily::PreferredSystem),
        "System" => return Ok(FontFamily::System),
        "SystemBold" => {
            traits.push("bold".to_string());
            return Ok(FontFamily::System);
        }
        "SystemItalic" => {
            traits.push("italic".to_string());
            return Ok(FontFamily::System);
        }
        _ => {}
    }
    if let Some(system_weight) = name.strip_prefix("System-") {
        if !WEIGHTS.contains(&system_weight) {
            return Err(format!(
                "`{}` is not a system font weight, expected one of {}",
                system_weight,
                WEIGHTS.join(", ")
            ));
        }
        *weight = Some(system_weight.to_string());
        return Ok(FontFamily::System);
    }
    Ok(FontFamily::Named(name.to_string()))
}

fn apply_modifier(
    modifier: &str,
    weight: &mut Option<String>,
    traits: &mut Vec<String>,
) -> Result<(), String> {
    if WEIGHTS.contains(&modifier) {
        if weight.is_some() {
            return Err(format!("weight `{}` given twice", modifier));
        }
        *weight = Some(modifier.to_string());
        return Ok(());
    }
    for part in modifier.split('-') {
        if !TRAITS.contains(&part) {
            return Err(format!(
                "`{}` is neither a weight nor a trait ({})",
                part,
                TRAITS.join(", ")
            ));
        }
        if !traits.iter().any(|t| t == part) {
            traits.push(part.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(args: &[&str]) -> Result<Font, RhsError> {
        Font::from_args("font(..)", args, &["display".to_string()])
    }

    #[test]
    fn test_single_argument_forms() {
        assert_eq!(font(&["icons"]).unwrap(), Font::Symbol("icons".into()));
        assert!(matches!(
            font(&["14"]).unwrap(),
            Font::Sized { family: FontFamily::Default, size, .. } if size == 14.0
        ));
        assert!(matches!(
            font(&["body"]).unwrap(),
            Font::TextStyle { style: TextStyle::Builtin(_), .. }
        ));
        assert!(matches!(
            font(&["display"]).unwrap(),
            Font::TextStyle { style: TextStyle::Custom(_), .. }
        ));
    }

    #[test]
    fn test_named_sized_font_with_traits() {
        let parsed = font(&["Helvetica Neue", "14pt", "bold-italic"]).unwrap();
        assert_eq!(
            parsed,
            Font::Sized {
                family: FontFamily::Named("Helvetica Neue".into()),
                size: 14.0,
                weight: None,
                traits: vec!["bold".into(), "italic".into()],
            }
        );
    }

    #[test]
    fn test_system_weight_and_style() {
        let parsed = font(&["System-semibold", "headline"]).unwrap();
        assert!(matches!(
            parsed,
            Font::TextStyle {
                family: FontFamily::System,
                weight: Some(ref w),
                ..
            } if w == "semibold"
        ));
        let bold = font(&["SystemBold", "12"]).unwrap();
        assert!(matches!(bold, Font::Sized { ref traits, .. } if traits == &["bold".to_string()]));
    }

    #[test]
    fn test_invalid_fonts() {
        assert!(matches!(font(&["System-chunky", "12"]), Err(RhsError::InvalidFont { .. })));
        assert!(font(&["Helvetica", "body", "sparkly"]).is_err());
        assert!(font(&["Helvetica", "notAStyle"]).is_err());
        assert!(font(&[]).is_err());
        assert!(font(&["System"]).is_err());
    }

    #[test]
    fn test_preferred_system_defaults_to_body() {
        assert_eq!(
            font(&["PreferredSystem"]).unwrap(),
            Font::TextStyle {
                family: FontFamily::PreferredSystem,
                style: TextStyle::Builtin("body".into()),
                weight: None,
                traits: vec![],
            }
        );
    }

    #[test]
    fn test_swift_output() {
        let sized = font(&["Helvetica", "14", "bold"]).unwrap();
        assert_eq!(
            sized.to_swift("S"),
            "UIFont.font(name: \"Helvetica\", size: 14.0, textStyle: nil, weight: UIFont.Weight.bold, traits: [], traitCollection: traitCollection, isScalable: false)"
        );
        let dynamic = font(&["display"]).unwrap();
        assert!(dynamic.to_swift("S").contains("textStyle: S.FontTextStyle.display"));
        assert!(dynamic.to_swift("S").ends_with("isScalable: true)"));
        assert_eq!(font(&["icons"]).unwrap().to_swift("S"), "\"icons\"");
    }
}
