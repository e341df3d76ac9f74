//! Intermediate representation: stylesheets, styles and properties.
//!
//! The loader builds this tree in a single pass over the YAML document. The
//! resolver then fills in the relationship flags (`is_override`,
//! `inherits`, ...) in place. Nothing mutates the tree once generation starts.

use crate::rhs::RhsValue;

/// Marker for styles that generate a view extension.
pub const APPEARANCE_PROXY_MARKER: &str = "__appearance_proxy";
/// Marker for styles whose members stay open for subclassing.
pub const OPEN_MARKER: &str = "__open";
/// Marker accepted for compatibility; has no effect.
pub const STYLE_MARKER: &str = "__style";
/// Prefix of a superclass that lives in the imported stylesheet.
pub const EXTERNAL_PREFIX: &str = "S.";

/// A property value: either a typed leaf or a nested style.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Rhs(RhsValue),
    Style(Box<Style>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name, with `.` replaced by `_`.
    pub key: String,
    pub value: PropertyValue,
    /// A property with the same key exists up the inheritance chain.
    pub is_override: bool,
    /// The generated accessor stays open for subclasses.
    pub is_overridable: bool,
}

impl Property {
    pub fn new(key: &str, value: PropertyValue) -> Self {
        Property {
            key: key.replace('.', "_"),
            value,
            is_override: false,
            is_overridable: false,
        }
    }

    pub fn rhs(key: &str, value: RhsValue) -> Self {
        Property::new(key, PropertyValue::Rhs(value))
    }

    pub fn style(style: Style) -> Self {
        let key = style.name.clone();
        Property::new(&key, PropertyValue::Style(Box::new(style)))
    }

    pub fn as_rhs(&self) -> Option<&RhsValue> {
        match &self.value {
            PropertyValue::Rhs(value) => Some(value),
            PropertyValue::Style(_) => None,
        }
    }

    pub fn as_style(&self) -> Option<&Style> {
        match &self.value {
            PropertyValue::Style(style) => Some(style),
            PropertyValue::Rhs(_) => None,
        }
    }

    pub fn as_style_mut(&mut self) -> Option<&mut Style> {
        match &mut self.value {
            PropertyValue::Style(style) => Some(style),
            PropertyValue::Rhs(_) => None,
        }
    }
}

/// A named group of properties, generated as one appearance proxy class.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub properties: Vec<Property>,
    /// Style named by `extends`, without the external prefix.
    pub superclass_name: Option<String>,
    /// View class given by `for <ViewClass>`.
    pub view_class: String,
    pub is_extension: bool,
    pub is_animation: bool,
    pub is_overridable: bool,
    /// `apply(view:)` is generated.
    pub is_applicable: bool,
    /// `apply(view:)` overrides an inherited one.
    pub is_apply_override: bool,
    /// The superclass lives in the imported stylesheet.
    pub is_external_override: bool,
    /// Synthesized by normalization rather than written in the source.
    pub is_injected: bool,
    /// Merged in from an `import`ed file.
    pub is_dependency: bool,
    pub belongs_to: Option<String>,
    pub extends_stylesheet: Option<String>,
    /// Name of the enclosing style for nested styles.
    pub nested_in: Option<String>,
    /// The accessor overrides an inherited accessor.
    pub is_override: bool,
    /// The nested accessor stays open for subclasses.
    pub is_nested_overridable: bool,
    /// Class name stem when it differs from `name`.
    pub override_name: Option<String>,
    /// Swift path of the superclass of the generated proxy class.
    pub inherits: Option<String>,
    /// Declared type of an overriding accessor: the class the overridden
    /// accessor returns.
    pub accessor_type: Option<String>,
}

impl Style {
    pub fn new(name: &str, properties: Vec<Property>) -> Self {
        Style {
            name: name.to_string(),
            properties,
            superclass_name: None,
            view_class: "UIView".to_string(),
            is_extension: false,
            is_animation: false,
            is_overridable: false,
            is_applicable: false,
            is_apply_override: false,
            is_external_override: false,
            is_injected: false,
            is_dependency: false,
            belongs_to: None,
            extends_stylesheet: None,
            nested_in: None,
            is_override: false,
            is_nested_overridable: false,
            override_name: None,
            inherits: None,
            accessor_type: None,
        }
    }

    /// Builds a style from its raw declaration key.
    ///
    /// The declaration is the style name, optionally surrounded by markers:
    ///
    /// ```text
    /// __appearance_proxy __open Button for UIButton extends BaseButton
    /// Card for Self
    /// Toolbar extends S.Toolbar
    /// ```
    pub fn from_declaration(declaration: &str, properties: Vec<Property>) -> Self {
        let mut style = Style::new("", properties);
        let mut words = declaration.split_whitespace().peekable();
        while let Some(word) = words.next() {
            match word {
                APPEARANCE_PROXY_MARKER => style.is_extension = true,
                OPEN_MARKER => style.is_overridable = true,
                STYLE_MARKER => {}
                "for" if words.peek().is_some() => {
                    style.is_applicable = true;
                    if let Some(view) = words.next().filter(|view| *view != "Self") {
                        style.view_class = view.to_string();
                    }
                }
                "extends" if words.peek().is_some() => {
                    if let Some(superclass) = words.next() {
                        match superclass.strip_prefix(EXTERNAL_PREFIX) {
                            Some(external) => {
                                style.is_external_override = true;
                                style.superclass_name = Some(external.to_string());
                            }
                            None => style.superclass_name = Some(superclass.to_string()),
                        }
                    }
                }
                _ => {
                    let mut name = word;
                    if let Some(rest) = name.strip_prefix(APPEARANCE_PROXY_MARKER) {
                        style.is_extension = true;
                        name = rest;
                    }
                    if let Some(rest) = name.strip_prefix(OPEN_MARKER) {
                        style.is_overridable = true;
                        name = rest;
                    }
                    style.name.push_str(name);
                }
            }
        }
        if style.is_overridable {
            for property in &mut style.properties {
                property.is_overridable = true;
            }
        }
        style
    }

    /// Stem of the generated class name.
    pub fn class_stem(&self) -> &str {
        self.override_name.as_deref().unwrap_or(&self.name)
    }

    /// Name of the generated proxy class.
    pub fn class_name(&self) -> String {
        let suffix = if self.is_animation && self.nested_in.is_none() {
            "AnimatorProxy"
        } else {
            "AppearanceProxy"
        };
        format!("{}{}", self.class_stem(), suffix)
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn nested(&self, name: &str) -> Option<&Style> {
        self.properties
            .iter()
            .filter_map(Property::as_style)
            .find(|style| style.name == name)
    }

    pub fn nested_styles(&self) -> impl Iterator<Item = &Style> {
        self.properties.iter().filter_map(Property::as_style)
    }

    pub fn nested_styles_mut(&mut self) -> impl Iterator<Item = &mut Style> {
        self.properties.iter_mut().filter_map(Property::as_style_mut)
    }

    /// Leaf values of this style, skipping nested styles.
    pub fn values(&self) -> impl Iterator<Item = (&str, &RhsValue)> {
        self.properties
            .iter()
            .filter_map(|p| p.as_rhs().map(|value| (p.key.as_str(), value)))
    }

    /// Sorts properties by key, recursively.
    pub fn ensure_determinism(&mut self) {
        self.properties.sort_by(|a, b| a.key.cmp(&b.key));
        for nested in self.nested_styles_mut() {
            nested.ensure_determinism();
        }
    }

    /// An empty copy that only keeps the nested structure.
    pub fn shadow(&self) -> Style {
        let mut shadow = Style::new(&self.name, Vec::new());
        shadow.is_animation = self.is_animation;
        shadow.is_injected = true;
        shadow.nested_in = self.nested_in.clone();
        shadow.properties = self
            .nested_styles()
            .map(|nested| Property::style(nested.shadow()))
            .collect();
        shadow
    }
}

/// A named collection of styles compiled from one YAML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub name: String,
    pub styles: Vec<Style>,
    /// The animator, whose nested styles are this stylesheet's animations.
    pub animator: Option<Style>,
    /// Stylesheet this one extends (`Name:Base`).
    pub superclass_name: Option<String>,
    pub has_symbol_font: bool,
    /// Files pulled in through `import`.
    pub dependencies: Vec<String>,
}

impl Stylesheet {
    pub fn new(name: &str) -> Self {
        Stylesheet {
            name: name.to_string(),
            styles: Vec::new(),
            animator: None,
            superclass_name: None,
            has_symbol_font: false,
            dependencies: Vec::new(),
        }
    }

    /// Parses a `Name` or `Name:Base` declaration.
    pub fn from_declaration(declaration: &str) -> Self {
        match declaration.split_once(':') {
            Some((name, base)) => {
                let mut sheet = Stylesheet::new(name.trim());
                let base = base.trim();
                if !base.is_empty() {
                    sheet.superclass_name = Some(base.to_string());
                }
                sheet
            }
            None => Stylesheet::new(declaration.trim()),
        }
    }

    pub fn is_base(&self) -> bool {
        self.superclass_name.is_none()
    }

    pub fn animator_name(&self) -> Option<&str> {
        self.animator.as_ref().map(|animator| animator.name.as_str())
    }

    pub fn animations(&self) -> impl Iterator<Item = &Style> {
        self.animator.iter().flat_map(Style::nested_styles)
    }

    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|style| style.name == name)
    }

    /// Top-level styles followed by the animator.
    pub fn all_styles(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter().chain(self.animator.iter())
    }

    pub fn all_styles_mut(&mut self) -> impl Iterator<Item = &mut Style> {
        self.styles.iter_mut().chain(self.animator.iter_mut())
    }

    /// Enum and option set definitions declared anywhere in the stylesheet,
    /// sorted by property key.
    pub fn global_values(&self) -> Vec<&RhsValue> {
        fn collect<'a>(style: &'a Style, out: &mut Vec<(&'a str, &'a RhsValue)>) {
            for property in &style.properties {
                match &property.value {
                    PropertyValue::Rhs(value) if value.is_global() => {
                        out.push((property.key.as_str(), value))
                    }
                    PropertyValue::Style(nested) => collect(nested, out),
                    PropertyValue::Rhs(_) => {}
                }
            }
        }
        let mut found = Vec::new();
        for style in self.all_styles() {
            collect(style, &mut found);
        }
        found.sort_by(|a, b| a.0.cmp(b.0));
        found.into_iter().map(|(_, value)| value).collect()
    }

    /// Sorts styles, animations and properties by name.
    pub fn ensure_determinism(&mut self) {
        self.styles.sort_by(|a, b| a.name.cmp(&b.name));
        for style in self.all_styles_mut() {
            style.ensure_determinism();
        }
    }
}
