//! `sgen.yml` parsing and validation.
//!
//! The file is read into a [`serde_yaml::Value`] and walked explicitly so
//! every error names the full key path (`stylesheet.output.path`).
//! Relative paths are resolved against the directory of the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use sgen_core::SymbolFont;
use thiserror::Error;

/// Key prefix of every configuration error.
pub const COMMAND: &str = "stylesheet";

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "sgen.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing entry {key}")]
    MissingEntry { key: String },

    #[error("wrong type for {key}: expected {expected}, got {got}")]
    WrongType {
        key: String,
        expected: &'static str,
        got: String,
    },

    #[error("path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Prepends `prefix` to the key path of key-related errors.
    pub fn with_key_prefix(self, prefix: &str) -> Self {
        match self {
            ConfigError::MissingEntry { key } => ConfigError::MissingEntry {
                key: join_key(prefix, &key),
            },
            ConfigError::WrongType { key, expected, got } => ConfigError::WrongType {
                key: join_key(prefix, &key),
                expected,
                got,
            },
            other => other,
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if key.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// Configuration model
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub import: Option<ImportConfig>,
    pub objc: bool,
    pub extended_name: Option<String>,
    pub namespace: Option<String>,
    pub generate_base_style: bool,
    pub generate_appearance_proxy_protocol: bool,
    pub generate_file_per_appearance_proxy: bool,
    pub base_style_path: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
    /// Stylesheet names, one per input.
    pub names: Vec<String>,
    pub symbols_font: Option<SymbolsFontConfig>,
    pub symbols_asset: Option<SymbolsAssetConfig>,
    /// Custom text styles.
    pub typography: Vec<String>,
    pub output: OutputConfig,
}

/// A framework whose stylesheet is extended.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Swift module name.
    pub name: String,
    pub base_style_path: PathBuf,
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolsFontConfig {
    pub inputs: Vec<PathBuf>,
    pub output: Option<OutputConfig>,
    /// Font names keyed by stylesheet name.
    pub names: BTreeMap<String, SymbolFont>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolsAssetConfig {
    pub icons: PathBuf,
    pub format: String,
    pub names: Vec<String>,
    pub inputs: Vec<PathBuf>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    pub link: Option<LinkConfig>,
    pub plist: Option<PathBuf>,
    pub folder_font_for_plist: Option<String>,
}

/// An Xcode project the generated files belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub project: PathBuf,
    pub target: String,
    pub group: Option<String>,
}

impl OutputConfig {
    /// Directory generated files are written to.
    ///
    /// Without an explicit path this is the project's directory joined
    /// with the group.
    pub fn dir(&self) -> PathBuf {
        match (&self.path, &self.link) {
            (Some(path), _) => path.clone(),
            (None, Some(link)) => {
                let project_dir = link.project.parent().unwrap_or_else(|| Path::new(""));
                match &link.group {
                    Some(group) => project_dir.join(group),
                    None => project_dir.to_path_buf(),
                }
            }
            (None, None) => PathBuf::new(),
        }
    }
}

impl Config {
    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&source, base_dir)
    }

    /// Parses configuration source, resolving relative paths against
    /// `base_dir`.
    pub fn parse(source: &str, base_dir: &Path) -> Result<Self> {
        let root: Value = serde_yaml::from_str(source)?;
        let Some(root) = root.as_mapping() else {
            return Err(wrong_type("", "mapping", &root).with_key_prefix(COMMAND));
        };
        let entry = Entry { map: root, base_dir };
        Self::from_entry(&entry).map_err(|err| err.with_key_prefix(COMMAND))
    }

    fn from_entry(entry: &Entry) -> Result<Self> {
        let import = match entry.mapping("import")? {
            Some(import) => Some(import_config(&import).map_err(|e| e.with_key_prefix("import"))?),
            None => None,
        };

        let input_dir = entry.path("inputDir")?;
        let inputs: Vec<PathBuf> = entry
            .strings("inputs")?
            .ok_or_else(|| missing("inputs"))?
            .iter()
            .map(|input| match &input_dir {
                Some(dir) => resolve(dir, input),
                None => resolve(entry.base_dir, input),
            })
            .collect();

        let names = match entry.strings("names")? {
            Some(names) if names.len() != inputs.len() => {
                return Err(ConfigError::WrongType {
                    key: "names".into(),
                    expected: "one name per input",
                    got: format!("{} names for {} inputs", names.len(), inputs.len()),
                })
            }
            Some(names) => names,
            None => inputs.iter().map(|input| file_stem(input)).collect(),
        };

        let symbols_font = match entry.mapping("symbolsFont")? {
            Some(font) => Some(
                symbols_font(&font, &names).map_err(|e| e.with_key_prefix("symbolsFont"))?,
            ),
            None => None,
        };
        let symbols_asset = match entry.mapping("symbolsAsset")? {
            Some(asset) => Some(
                symbols_asset(&asset).map_err(|e| e.with_key_prefix("symbolsAsset"))?,
            ),
            None => None,
        };
        let typography = match entry.mapping("typography")? {
            Some(typography) => typography_styles(&typography)
                .map_err(|e| e.with_key_prefix("typography"))?,
            None => Vec::new(),
        };

        let output = entry.mapping("output")?.ok_or_else(|| missing("output.path"))?;
        let output = output_config(&output).map_err(|e| e.with_key_prefix("output"))?;

        Ok(Config {
            import,
            objc: entry.bool("objc", false)?,
            extended_name: entry.string("extendedName")?,
            namespace: entry.string("namespace")?,
            generate_base_style: entry.bool("generateBaseStyle", false)?,
            generate_appearance_proxy_protocol: entry
                .bool("generateAppearanceProxyProtocol", true)?,
            generate_file_per_appearance_proxy: entry
                .bool("generateFilePerAppearanceProxy", false)?,
            base_style_path: entry.path("baseStylePath")?,
            inputs,
            names,
            symbols_font,
            symbols_asset,
            typography,
            output,
        })
    }

    /// Checks that every input exists and that the output directory can be
    /// created.
    pub fn check_paths(&self) -> Result<()> {
        let mut required: Vec<&Path> = Vec::new();
        required.extend(self.base_style_path.as_deref());
        required.extend(self.import.as_ref().map(|import| import.base_style_path.as_path()));
        required.extend(self.inputs.iter().map(PathBuf::as_path));
        for path in required {
            if !path.exists() {
                return Err(ConfigError::PathNotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let dir = self.output.dir();
        if let Some(parent) = dir.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if !parent.exists() {
                return Err(ConfigError::PathNotFound {
                    path: parent.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// Name of the base stylesheet, from its file name.
    pub fn base_name(&self) -> Option<String> {
        self.base_style_path.as_deref().map(file_stem)
    }
}

// =============================================================================
// Sections
// =============================================================================

fn symbols_font(entry: &Entry, stylesheets: &[String]) -> Result<SymbolsFontConfig> {
    let input_dir = entry.path("inputDir")?;
    let inputs: Vec<PathBuf> = entry
        .strings("inputs")?
        .unwrap_or_default()
        .iter()
        .map(|input| resolve(input_dir.as_deref().unwrap_or(entry.base_dir), input))
        .collect();
    let output = match entry.mapping("output")? {
        Some(output) => Some(output_config(&output).map_err(|e| e.with_key_prefix("output"))?),
        None => None,
    };
    match (inputs.is_empty(), &output) {
        (false, None) => return Err(missing("output")),
        (true, Some(_)) => return Err(missing("inputs")),
        _ => {}
    }

    let value = entry.get("names").ok_or_else(|| missing("names"))?;
    let mut names = BTreeMap::new();
    match value {
        Value::String(font) => {
            if let Some(stylesheet) = stylesheets.first() {
                names.insert(stylesheet.clone(), same_font(font));
            }
        }
        Value::Sequence(fonts) => {
            for (index, font) in fonts.iter().enumerate() {
                let key = format!("names.{}", index);
                let Some(stylesheet) = stylesheets.get(index) else {
                    return Err(ConfigError::WrongType {
                        key,
                        expected: "one font per stylesheet",
                        got: format!("{} fonts for {} stylesheets", fonts.len(), stylesheets.len()),
                    });
                };
                names.insert(stylesheet.clone(), font_names(&key, font)?);
            }
        }
        Value::Mapping(fonts) => {
            for (stylesheet, font) in fonts {
                let Some(stylesheet) = stylesheet.as_str() else {
                    return Err(wrong_type("names", "string key", stylesheet));
                };
                let key = format!("names.{}", stylesheet);
                names.insert(stylesheet.to_string(), font_names(&key, font)?);
            }
        }
        other => return Err(wrong_type("names", "string, sequence or mapping", other)),
    }

    Ok(SymbolsFontConfig { inputs, output, names })
}

fn same_font(name: &str) -> SymbolFont {
    SymbolFont {
        light: name.to_string(),
        regular: name.to_string(),
    }
}

/// A font name, or a `{light, regular}` mapping. A missing weight falls
/// back to the other one.
fn font_names(key: &str, value: &Value) -> Result<SymbolFont> {
    match value {
        Value::String(name) => Ok(same_font(name)),
        Value::Mapping(weights) => {
            let weight = |name: &str| -> Result<Option<String>> {
                match weights.get(name) {
                    None | Some(Value::Null) => Ok(None),
                    Some(Value::String(font)) => Ok(Some(font.clone())),
                    Some(other) => Err(wrong_type(&format!("{}.{}", key, name), "string", other)),
                }
            };
            match (weight("light")?, weight("regular")?) {
                (Some(light), Some(regular)) => Ok(SymbolFont { light, regular }),
                (Some(font), None) | (None, Some(font)) => Ok(same_font(&font)),
                (None, None) => Err(missing(&format!("{}.regular", key))),
            }
        }
        other => Err(wrong_type(key, "string or mapping", other)),
    }
}

fn symbols_asset(entry: &Entry) -> Result<SymbolsAssetConfig> {
    let output = entry.mapping("output")?.ok_or_else(|| missing("output"))?;
    Ok(SymbolsAssetConfig {
        icons: entry.required_path("icons")?,
        format: entry.required_string("format")?,
        names: entry.strings("names")?.ok_or_else(|| missing("names"))?,
        inputs: entry
            .strings("inputs")?
            .ok_or_else(|| missing("inputs"))?
            .iter()
            .map(|input| resolve(entry.base_dir, input))
            .collect(),
        output: output_config(&output).map_err(|e| e.with_key_prefix("output"))?,
    })
}

fn typography_styles(entry: &Entry) -> Result<Vec<String>> {
    match entry.get("styles") {
        None => Ok(Vec::new()),
        Some(Value::Mapping(styles)) => styles
            .keys()
            .map(|key| {
                key.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type("styles", "string key", key))
            })
            .collect(),
        Some(_) => Ok(entry.strings("styles")?.unwrap_or_default()),
    }
}

fn import_config(entry: &Entry) -> Result<ImportConfig> {
    Ok(ImportConfig {
        name: entry.required_string("name")?,
        base_style_path: entry.required_path("baseStylePath")?,
        styles: entry.strings("styles")?.unwrap_or_default(),
    })
}

fn link_config(entry: &Entry) -> Result<LinkConfig> {
    Ok(LinkConfig {
        project: entry.required_path("project")?,
        target: entry.required_string("target")?,
        group: entry
            .string("group")?
            .map(|group| group.trim_end_matches('/').to_string()),
    })
}

fn output_config(entry: &Entry) -> Result<OutputConfig> {
    let link = match entry.mapping("link")? {
        Some(link) => Some(link_config(&link).map_err(|e| e.with_key_prefix("link"))?),
        None => None,
    };

    let path = entry.path("path")?;
    if path.is_none() && link.is_none() {
        return Err(missing("path"));
    }

    Ok(OutputConfig {
        path,
        link,
        plist: entry.path("plist")?,
        folder_font_for_plist: entry
            .string("folderFontForPlist")?
            .map(|folder| folder.trim_start_matches('/').to_string()),
    })
}

// =============================================================================
// Value access
// =============================================================================

struct Entry<'a> {
    map: &'a Mapping,
    base_dir: &'a Path,
}

impl<'a> Entry<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    fn required_string(&self, key: &str) -> Result<String> {
        self.string(key)?.ok_or_else(|| missing(key))
    }

    fn path(&self, key: &str) -> Result<Option<PathBuf>> {
        Ok(self.string(key)?.map(|path| resolve(self.base_dir, &path)))
    }

    fn required_path(&self, key: &str) -> Result<PathBuf> {
        self.path(key)?.ok_or_else(|| missing(key))
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(value)) => Ok(*value),
            Some(other) => Err(wrong_type(key, "bool", other)),
        }
    }

    /// A string or a sequence of strings.
    fn strings(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(vec![value.clone()])),
            Some(Value::Sequence(values)) => values
                .iter()
                .enumerate()
                .map(|(index, value)| match value {
                    Value::String(value) => Ok(value.clone()),
                    other => Err(wrong_type(&format!("{}.{}", key, index), "string", other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(wrong_type(key, "string or sequence", other)),
        }
    }

    fn mapping(&self, key: &str) -> Result<Option<Entry<'a>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Mapping(map)) => Ok(Some(Entry {
                map,
                base_dir: self.base_dir,
            })),
            Some(other) => Err(wrong_type(key, "mapping", other)),
        }
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingEntry { key: key.to_string() }
}

fn wrong_type(key: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
        got: kind(value).to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// File name without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Config> {
        Config::parse(source, Path::new("/project"))
    }

    // =========================================================================
    // Defaults and paths
    // =========================================================================

    #[test]
    fn test_minimal_config() {
        let config = parse(
            r#"
inputs: Style/Default.yaml
output:
  path: Generated
"#,
        )
        .unwrap();

        assert_eq!(config.inputs, vec![PathBuf::from("/project/Style/Default.yaml")]);
        assert_eq!(config.names, vec!["Default".to_string()]);
        assert_eq!(config.output.dir(), PathBuf::from("/project/Generated"));
        assert!(!config.objc);
        assert!(!config.generate_base_style);
        assert!(config.generate_appearance_proxy_protocol);
        assert!(!config.generate_file_per_appearance_proxy);
        assert!(config.import.is_none());
    }

    #[test]
    fn test_input_dir_and_names() {
        let config = parse(
            r#"
baseStylePath: Style/Base.yaml
inputDir: Style
inputs: [Light.yaml, Dark.yaml, /abs/High.yaml]
names: [Light, Dark, HighContrast]
output:
  path: Generated
"#,
        )
        .unwrap();

        assert_eq!(config.base_style_path, Some(PathBuf::from("/project/Style/Base.yaml")));
        assert_eq!(config.base_name().as_deref(), Some("Base"));
        assert_eq!(
            config.inputs,
            vec![
                PathBuf::from("/project/Style/Light.yaml"),
                PathBuf::from("/project/Style/Dark.yaml"),
                PathBuf::from("/abs/High.yaml"),
            ]
        );
        assert_eq!(config.names, vec!["Light", "Dark", "HighContrast"]);
    }

    #[test]
    fn test_link_output_dir() {
        let config = parse(
            r#"
inputs: Default.yaml
output:
  link:
    project: App/App.xcodeproj
    target: App
    group: Generated/
  folderFontForPlist: /Fonts
"#,
        )
        .unwrap();

        let link = config.output.link.as_ref().unwrap();
        assert_eq!(link.group.as_deref(), Some("Generated"));
        assert_eq!(config.output.dir(), PathBuf::from("/project/App/Generated"));
        assert_eq!(config.output.folder_font_for_plist.as_deref(), Some("Fonts"));
    }

    #[test]
    fn test_import_and_flags() {
        let config = parse(
            r#"
import:
  name: Fluent
  baseStylePath: Fluent/FluentStyle.yaml
objc: true
extendedName: Outlook
namespace: Outlook
generateBaseStyle: true
generateAppearanceProxyProtocol: false
generateFilePerAppearanceProxy: true
inputs: Outlook.yaml
output:
  path: Generated
"#,
        )
        .unwrap();

        let import = config.import.unwrap();
        assert_eq!(import.name, "Fluent");
        assert_eq!(import.base_style_path, PathBuf::from("/project/Fluent/FluentStyle.yaml"));
        assert!(config.objc);
        assert_eq!(config.extended_name.as_deref(), Some("Outlook"));
        assert_eq!(config.namespace.as_deref(), Some("Outlook"));
        assert!(config.generate_base_style);
        assert!(!config.generate_appearance_proxy_protocol);
        assert!(config.generate_file_per_appearance_proxy);
    }

    // =========================================================================
    // Fonts and typography
    // =========================================================================

    #[test]
    fn test_symbol_font_names() {
        let config = parse(
            r#"
inputs: [Default.yaml, Dark.yaml]
symbolsFont:
  names:
    - Icons
    - light: IconsLight
      regular: IconsRegular
output:
  path: Generated
"#,
        )
        .unwrap();

        let names = config.symbols_font.unwrap().names;
        assert_eq!(names["Default"], same_font("Icons"));
        assert_eq!(
            names["Dark"],
            SymbolFont {
                light: "IconsLight".into(),
                regular: "IconsRegular".into()
            }
        );
    }

    #[test]
    fn test_symbol_font_inputs_need_output() {
        let err = parse(
            r#"
inputs: Default.yaml
symbolsFont:
  inputs: Icons.ttf
  names: Icons
output:
  path: Generated
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEntry { ref key } if key == "stylesheet.symbolsFont.output"
        ));
    }

    #[test]
    fn test_typography_styles() {
        let config = parse(
            r#"
inputs: Default.yaml
typography:
  styles:
    largeTitle: {}
    hero: {}
output:
  path: Generated
"#,
        )
        .unwrap();
        assert_eq!(config.typography, vec!["largeTitle", "hero"]);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_missing_inputs() {
        let err = parse("output:\n  path: Generated\n").unwrap_err();
        assert_eq!(err.to_string(), "missing entry stylesheet.inputs");
    }

    #[test]
    fn test_missing_output_path() {
        let err = parse("inputs: Default.yaml\noutput:\n  plist: Info.plist\n").unwrap_err();
        assert_eq!(err.to_string(), "missing entry stylesheet.output.path");

        let err = parse("inputs: Default.yaml\n").unwrap_err();
        assert_eq!(err.to_string(), "missing entry stylesheet.output.path");
    }

    #[test]
    fn test_wrong_type() {
        let err =
            parse("inputs: Default.yaml\nobjc: yes please\noutput:\n  path: out\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongType { ref key, expected: "bool", ref got }
                if key == "stylesheet.objc" && got == "string"
        ));

        let err = parse("inputs: [1]\noutput:\n  path: out\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongType { ref key, .. } if key == "stylesheet.inputs.0"
        ));
    }

    #[test]
    fn test_import_requires_name() {
        let err = parse(
            r#"
import:
  baseStylePath: Fluent.yaml
inputs: Default.yaml
output:
  path: out
"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "missing entry stylesheet.import.name");
    }

    #[test]
    fn test_names_must_match_inputs() {
        let err = parse("inputs: [A.yaml, B.yaml]\nnames: A\noutput:\n  path: out\n").unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { ref key, .. } if key == "stylesheet.names"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = parse("- inputs\n").unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { ref key, .. } if key == "stylesheet"));
    }
}
