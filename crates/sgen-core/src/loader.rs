//! Loads stylesheet sources into the IR.
//!
//! A stylesheet source is a YAML mapping keyed by style declarations:
//!
//! ```yaml
//! import: [palette.yml]
//!
//! Button for UIButton:
//!   tint: $Palette.accent
//!   cornerRadius:
//!     "idiom = pad": 8
//!     default: 4
//!   title:
//!     - font: font(System-semibold, headline)
//!
//! __animator Motion:
//!   fadeIn:
//!     duration: 0.3
//!     repeatCount: 2
//!     keyFrames: [{relativeStartTime: 0, animationValues: [{type: opacity, to: 1}]}]
//! ```
//!
//! Property values map onto the IR by YAML node kind: a sequence of mappings
//! is a nested style, a mapping is a conditional value, any other sequence is
//! an array, and scalars go through the Rhs parser.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::condition::Condition;
use crate::error::{GeneratorError, RhsError};
use crate::ir::{Property, PropertyValue, Style, Stylesheet};
use crate::preprocess::preprocess;
use crate::rhs::{AnimationValue, Font, KeyFrame, ParseContext, RepeatCount, RhsValue};

/// Top-level key listing dependency files.
pub const IMPORT_KEY: &str = "import";
/// Prefix of the top-level key holding animations.
pub const ANIMATOR_PREFIX: &str = "__animator";
/// Name of the synthesized style holding symbol font names.
pub const SYMBOL_FONT_STYLE: &str = "__SymbolFont";
/// Enum listing symbol font weights.
pub const ICONIC_FONT_STYLE: &str = "IconicFontStyle";

const KEY_FRAMES: &str = "keyFrames";
const REPEAT_COUNT: &str = "repeatCount";

/// Font names of a symbol (icon) font, one per weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFont {
    pub light: String,
    pub regular: String,
}

impl SymbolFont {
    /// Placeholder used by a base stylesheet without a configured font.
    pub fn placeholder() -> Self {
        SymbolFont {
            light: "-".into(),
            regular: "-".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Custom text styles accepted by `font(...)`.
    pub typography: Vec<String>,
    pub symbol_font: Option<SymbolFont>,
}

/// Builds [`Stylesheet`]s from YAML sources.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Loader { options }
    }

    /// Loads a stylesheet file. `declaration` is `Name` or `Name:Base`.
    ///
    /// Imports are resolved relative to the file's directory.
    pub fn load_file(&self, path: &Path, declaration: &str) -> Result<Stylesheet, GeneratorError> {
        let source = read(path)?;
        log::debug!("loading stylesheet {} from {}", declaration, path.display());
        self.load_str(declaration, &source, path.parent())
    }

    /// Loads a stylesheet from source text.
    pub fn load_str(
        &self,
        declaration: &str,
        source: &str,
        base_dir: Option<&Path>,
    ) -> Result<Stylesheet, GeneratorError> {
        let mut sheet = Stylesheet::from_declaration(declaration);
        let root = parse_yaml(&sheet.name, source)?;
        let Value::Mapping(root) = root else {
            return Err(malformed(&sheet.name, "the root object is not a mapping"));
        };

        let builder = Builder {
            stylesheet: sheet.name.clone(),
            typography: &self.options.typography,
        };

        for (key, value) in &root {
            let key = key_string(&sheet.name, key)?;
            if key == IMPORT_KEY {
                for file in import_list(&sheet.name, value)? {
                    let path = base_dir.map_or_else(|| PathBuf::from(&file), |dir| dir.join(&file));
                    let dependency = self.dependency_loader().load_file(&path, &sheet.name)?;
                    log::debug!(
                        "stylesheet {} imports {} styles from {}",
                        sheet.name,
                        dependency.styles.len(),
                        file
                    );
                    sheet.styles.extend(dependency.styles.into_iter().map(|mut style| {
                        style.is_dependency = true;
                        style
                    }));
                    sheet.dependencies.push(file);
                }
            } else if let Some(name) = key.strip_prefix(ANIMATOR_PREFIX) {
                sheet.animator = Some(builder.animator(name.trim(), value)?);
            } else {
                let mut style = builder.style(&key, value)?;
                style.extends_stylesheet = sheet.superclass_name.clone();
                sheet.styles.push(style);
            }
        }

        if let Some(font) = &self.options.symbol_font {
            sheet.styles.push(builder.symbol_font(font, sheet.is_base())?);
            sheet.has_symbol_font = true;
        }

        Ok(sheet)
    }

    /// Imported files share typography but never synthesize a symbol font.
    fn dependency_loader(&self) -> Loader {
        Loader::new(LoadOptions {
            typography: self.options.typography.clone(),
            symbol_font: None,
        })
    }
}

struct Builder<'a> {
    stylesheet: String,
    typography: &'a [String],
}

impl Builder<'_> {
    fn style(&self, declaration: &str, value: &Value) -> Result<Style, GeneratorError> {
        let Value::Mapping(mapping) = value else {
            return Err(malformed(
                &self.stylesheet,
                &format!("malformed style definition `{}`", declaration),
            ));
        };
        let mut style = Style::from_declaration(declaration, self.properties(mapping)?);
        self.adopt(&mut style);
        Ok(style)
    }

    fn animator(&self, name: &str, value: &Value) -> Result<Style, GeneratorError> {
        let Value::Mapping(mapping) = value else {
            return Err(malformed(
                &self.stylesheet,
                &format!("malformed animator definition `{}`", name),
            ));
        };
        let mut properties = Vec::new();
        for (key, value) in mapping {
            let key = key_string(&self.stylesheet, key)?;
            let mut animation = self.style(&key, value)?;
            animation.is_animation = true;
            animation.nested_in = Some(name.to_string());
            properties.push(Property::style(animation));
        }
        let mut animator = Style::new(name, properties);
        animator.is_animation = true;
        animator.belongs_to = Some(self.stylesheet.clone());
        Ok(animator)
    }

    /// Sets the owning stylesheet and parent names of nested styles.
    fn adopt(&self, style: &mut Style) {
        style.belongs_to = Some(self.stylesheet.clone());
        let parent = style.name.clone();
        for nested in style.nested_styles_mut() {
            nested.nested_in = Some(parent.clone());
            self.adopt(nested);
        }
    }

    fn properties(&self, mapping: &Mapping) -> Result<Vec<Property>, GeneratorError> {
        mapping
            .iter()
            .map(|(key, value)| {
                let key = key_string(&self.stylesheet, key)?;
                self.property(&key, value)
            })
            .collect()
    }

    fn property(&self, key: &str, value: &Value) -> Result<Property, GeneratorError> {
        let illegal = |source: RhsError| GeneratorError::IllegalScalarValue {
            stylesheet: self.stylesheet.clone(),
            key: key.to_string(),
            source,
        };

        match value {
            Value::Sequence(items) if key == KEY_FRAMES => {
                let frames = items
                    .iter()
                    .map(|item| key_frame(item).map(RhsValue::KeyFrame))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(illegal)?;
                Ok(Property::rhs(key, RhsValue::Array(frames)))
            }
            Value::Sequence(items) if !items.is_empty() && items.iter().all(Value::is_mapping) => {
                let mut merged = Mapping::new();
                for item in items {
                    if let Value::Mapping(mapping) = item {
                        for (k, v) in mapping {
                            merged.insert(k.clone(), v.clone());
                        }
                    }
                }
                let style = Style::new(key, self.properties(&merged)?);
                Ok(Property::new(key, PropertyValue::Style(Box::new(style))))
            }
            _ if key == REPEAT_COUNT && !value.is_mapping() => {
                let text = scalar_text(value).ok_or_else(|| illegal(unsupported(value)))?;
                let count = RepeatCount::parse(&text)
                    .or_else(|_| self.value(key, value).and_then(|v| match v {
                        RhsValue::RepeatCount(count) => Ok(count),
                        _ => Err(RhsError::malformed(&text, "expected a repeat count")),
                    }))
                    .map_err(illegal)?;
                Ok(Property::rhs(key, RhsValue::RepeatCount(count)))
            }
            _ => self
                .value(key, value)
                .map(|value| Property::rhs(key, value))
                .map_err(illegal),
        }
    }

    /// Converts a YAML node into a value.
    fn value(&self, key: &str, value: &Value) -> Result<RhsValue, RhsError> {
        match value {
            Value::Bool(flag) => Ok(RhsValue::Bool(*flag)),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Ok(RhsValue::Int(int)),
                None => number
                    .as_f64()
                    .map(RhsValue::Float)
                    .ok_or_else(|| unsupported(value)),
            },
            Value::String(text) => {
                let ctx = ParseContext {
                    key: Some(key),
                    typography: self.typography,
                };
                RhsValue::parse(text, &ctx)
            }
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.value(key, item))
                .collect::<Result<Vec<_>, _>>()
                .map(RhsValue::Array),
            Value::Mapping(mapping) => {
                let mut branches = Vec::with_capacity(mapping.len());
                for (condition, branch) in mapping {
                    let condition = scalar_text(condition).ok_or_else(|| unsupported(condition))?;
                    if branch.is_mapping() {
                        return Err(unsupported(branch));
                    }
                    branches.push((Condition::parse(&condition)?, self.value(key, branch)?));
                }
                Ok(RhsValue::hash(branches))
            }
            Value::Null | Value::Tagged(_) => Err(unsupported(value)),
        }
    }

    fn symbol_font(&self, font: &SymbolFont, is_base: bool) -> Result<Style, GeneratorError> {
        let illegal = |key: &str, source: RhsError| GeneratorError::IllegalScalarValue {
            stylesheet: self.stylesheet.clone(),
            key: key.to_string(),
            source,
        };
        let mut properties = Vec::new();
        for (key, name) in [("lightFontName", &font.light), ("regularFontName", &font.regular)] {
            let symbol = Font::from_args(name, &[name.as_str()], &[])
                .map_err(|err| illegal(key, err))?;
            properties.push(Property::rhs(key, RhsValue::Font(symbol)));
        }
        if is_base {
            properties.push(Property::rhs(
                ICONIC_FONT_STYLE,
                RhsValue::EnumDef {
                    ty: ICONIC_FONT_STYLE.to_string(),
                    cases: vec!["light".into(), "regular".into()],
                },
            ));
        }
        let mut style = Style::new(SYMBOL_FONT_STYLE, properties);
        style.belongs_to = Some(self.stylesheet.clone());
        Ok(style)
    }
}

/// Builds a keyframe from its mapping form:
/// `{relativeStartTime: 0, relativeDuration: 0.5, animationValues: [{type: opacity, to: 1}]}`.
fn key_frame(value: &Value) -> Result<KeyFrame, RhsError> {
    if let Value::String(text) = value {
        return match RhsValue::parse(text, &ParseContext::default())? {
            RhsValue::KeyFrame(frame) => Ok(frame),
            _ => Err(RhsError::malformed(text.as_str(), "expected keyFrame(...)")),
        };
    }
    let Value::Mapping(mapping) = value else {
        return Err(unsupported(value));
    };
    let source = format!("{:?}", value);
    let number = |field: &str| -> Result<Option<f64>, RhsError> {
        match mapping.get(field) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| {
                    RhsError::malformed(&source, format!("`{}` must be a number", field))
                }),
        }
    };

    let mut frame = KeyFrame {
        relative_start_time: number("relativeStartTime")?.unwrap_or(0.0),
        relative_duration: number("relativeDuration")?,
        values: Vec::new(),
    };
    if let Some(values) = mapping.get("animationValues") {
        let Value::Sequence(items) = values else {
            return Err(RhsError::malformed(&source, "animationValues must be a list"));
        };
        for item in items {
            let property = item
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| RhsError::malformed(&source, "animation value needs `type`"))?;
            let from = item.get("from").and_then(Value::as_f64);
            let to = item.get("to").and_then(Value::as_f64);
            frame.values.push(AnimationValue::new(&source, property, from, to)?);
        }
    }
    Ok(frame)
}

fn read(path: &Path) -> Result<String, GeneratorError> {
    fs::read_to_string(path).map_err(|_| GeneratorError::FileDoesNotExist {
        path: path.to_path_buf(),
    })
}

fn parse_yaml(stylesheet: &str, source: &str) -> Result<Value, GeneratorError> {
    let value: Value = serde_yaml::from_str(&preprocess(source))
        .map_err(|err| malformed(stylesheet, &err.to_string()))?;
    if value.is_null() {
        return Err(malformed(stylesheet, "null root object"));
    }
    Ok(value)
}

fn malformed(stylesheet: &str, message: &str) -> GeneratorError {
    GeneratorError::MalformedYaml {
        stylesheet: stylesheet.to_string(),
        message: message.to_string(),
    }
}

fn key_string(stylesheet: &str, key: &Value) -> Result<String, GeneratorError> {
    scalar_text(key).ok_or_else(|| malformed(stylesheet, &format!("unsupported key {:?}", key)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn import_list(stylesheet: &str, value: &Value) -> Result<Vec<String>, GeneratorError> {
    match value {
        Value::String(file) => Ok(vec![file.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(stylesheet, "import entries must be file names"))
            })
            .collect(),
        _ => Err(malformed(stylesheet, "import must be a file name or a list of file names")),
    }
}

fn unsupported(value: &Value) -> RhsError {
    RhsError::UnsupportedYaml(format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhs::TimingFunction;

    fn load(source: &str) -> Result<Stylesheet, GeneratorError> {
        Loader::default().load_str("Default", source, None)
    }

    // =========================================================================
    // Styles and properties
    // =========================================================================

    #[test]
    fn test_basic_styles() {
        let sheet = load(
            r##"
Button for UIButton:
  cornerRadius: 4
  opacity: 0.5
  tint: "#0078D4"
  enabled: true
"##,
        )
        .unwrap();
        assert_eq!(sheet.styles.len(), 1);
        let button = &sheet.styles[0];
        assert_eq!(button.name, "Button");
        assert_eq!(button.view_class, "UIButton");
        assert_eq!(button.belongs_to.as_deref(), Some("Default"));
        assert_eq!(button.property("cornerRadius").unwrap().as_rhs(), Some(&RhsValue::Int(4)));
        assert_eq!(button.property("opacity").unwrap().as_rhs(), Some(&RhsValue::Float(0.5)));
        assert!(matches!(button.property("tint").unwrap().as_rhs(), Some(RhsValue::Color(_))));
        assert_eq!(button.property("enabled").unwrap().as_rhs(), Some(&RhsValue::Bool(true)));
    }

    #[test]
    fn test_bare_hex_color_is_preprocessed() {
        let sheet = load("Button:\n  tint: #0078D4\n").unwrap();
        assert!(matches!(
            sheet.styles[0].property("tint").unwrap().as_rhs(),
            Some(RhsValue::Color(_))
        ));
    }

    #[test]
    fn test_nested_style_from_sequence_of_mappings() {
        let sheet = load(
            r#"
Cell:
  title:
    - size: 12
    - color: color(333)
"#,
        )
        .unwrap();
        let cell = &sheet.styles[0];
        let title = cell.nested("title").unwrap();
        assert_eq!(title.properties.len(), 2);
        assert_eq!(title.nested_in.as_deref(), Some("Cell"));
    }

    #[test]
    fn test_conditional_values() {
        let sheet = load(
            r#"
Card:
  radius:
    default: 4
    "width > 600": 12
    "idiom = pad": 8
"#,
        )
        .unwrap();
        let radius = sheet.styles[0].property("radius").unwrap();
        let RhsValue::Hash(branches) = radius.as_rhs().unwrap() else {
            panic!("expected conditional value");
        };
        let raws: Vec<&str> = branches.iter().map(|(c, _)| c.raw()).collect();
        assert_eq!(raws.last(), Some(&"default"));
        assert_eq!(branches.len(), 3);
    }

    #[test]
    fn test_arrays_and_enum_defs() {
        let sheet = load(
            r#"
List:
  sizes: [1, 2, 3]
  Alignment: EnumDef(left, right)
"#,
        )
        .unwrap();
        let list = &sheet.styles[0];
        assert_eq!(list.property("sizes").unwrap().as_rhs().unwrap().swift_type(), "[Int]");
        assert!(matches!(
            list.property("Alignment").unwrap().as_rhs(),
            Some(RhsValue::EnumDef { ty, .. }) if ty == "Alignment"
        ));
    }

    // =========================================================================
    // Animations
    // =========================================================================

    #[test]
    fn test_animator() {
        let sheet = load(
            r#"
AN_Motion:
  fadeIn:
    duration: 0.3
    curve: timingFunction(easeIn)
    repeatCount: infinite
    keyFrames: [{relativeStartTime: 0, relativeDuration: 0.5, animationValues: [{type: opacity, from: 0, to: 1}]}]
"#,
        )
        .unwrap();
        assert_eq!(sheet.animator_name(), Some("Motion"));
        let fade = sheet.animations().next().unwrap();
        assert!(fade.is_animation);
        assert_eq!(
            fade.property("repeatCount").unwrap().as_rhs(),
            Some(&RhsValue::RepeatCount(RepeatCount::Infinite))
        );
        assert_eq!(
            fade.property("curve").unwrap().as_rhs(),
            Some(&RhsValue::TimingFunction(TimingFunction::Named("easeIn".into())))
        );
        let RhsValue::Array(frames) = fade.property("keyFrames").unwrap().as_rhs().unwrap() else {
            panic!("expected keyframes");
        };
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].swift_type(), "KeyFrame");
    }

    #[test]
    fn test_numeric_repeat_count() {
        let sheet = load("AN_Motion:\n  pulse:\n    repeatCount: 3\n").unwrap();
        let pulse = sheet.animations().next().unwrap();
        assert_eq!(
            pulse.property("repeatCount").unwrap().as_rhs(),
            Some(&RhsValue::RepeatCount(RepeatCount::Count(3)))
        );
    }

    // =========================================================================
    // Symbol fonts and imports
    // =========================================================================

    #[test]
    fn test_symbol_font_style() {
        let loader = Loader::new(LoadOptions {
            typography: vec![],
            symbol_font: Some(SymbolFont {
                light: "IconsLight".into(),
                regular: "IconsRegular".into(),
            }),
        });
        let sheet = loader.load_str("Default", "Button:\n  size: 1\n", None).unwrap();
        assert!(sheet.has_symbol_font);
        let symbols = sheet.style(SYMBOL_FONT_STYLE).unwrap();
        assert_eq!(
            symbols.property("lightFontName").unwrap().as_rhs(),
            Some(&RhsValue::Font(Font::Symbol("IconsLight".into())))
        );
        assert!(symbols.property(ICONIC_FONT_STYLE).is_some());

        let dark = loader.load_str("Dark:Default", "Button:\n  size: 2\n", None).unwrap();
        assert!(dark.style(SYMBOL_FONT_STYLE).unwrap().property(ICONIC_FONT_STYLE).is_none());
    }

    #[test]
    fn test_import_merges_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("palette.yml"), "Palette:\n  accent: color(f00)\n").unwrap();
        let main = dir.path().join("main.yml");
        std::fs::write(&main, "import: [palette.yml]\nButton:\n  tint: $Palette.accent\n").unwrap();

        let sheet = Loader::default().load_file(&main, "Default").unwrap();
        assert_eq!(sheet.dependencies, vec!["palette.yml".to_string()]);
        let palette = sheet.style("Palette").unwrap();
        assert!(palette.is_dependency);
        assert!(!sheet.style("Button").unwrap().is_dependency);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_errors() {
        assert!(matches!(load("- a\n- b\n"), Err(GeneratorError::MalformedYaml { .. })));
        assert!(matches!(load(""), Err(GeneratorError::MalformedYaml { .. })));
        assert!(matches!(load("Button: 3\n"), Err(GeneratorError::MalformedYaml { .. })));
        assert!(matches!(
            load("Button:\n  tint: bogus(1,2)\n"),
            Err(GeneratorError::IllegalScalarValue {
                ref key,
                source: RhsError::Malformed { .. },
                ..
            }) if key == "tint"
        ));
        assert!(matches!(
            load("Button:\n  size:\n    \"width ??? 5\": 3\n"),
            Err(GeneratorError::IllegalScalarValue { source: RhsError::Condition(_), .. })
        ));
        assert!(matches!(
            Loader::default().load_file(Path::new("/nonexistent/sgen.yml"), "Default"),
            Err(GeneratorError::FileDoesNotExist { .. })
        ));
    }
}
