//! Swift generation.
//!
//! [`Generator`] renders a resolved [`Registry`] into Swift sources: one file
//! per stylesheet, plus one file per top-level style when
//! [`Settings::generate_file_per_appearance_proxy`] is set.
//!
//! The base stylesheet file carries everything shared by the run: the
//! stylesheet manager, the `S` namespace of enums and option sets, the
//! appearance proxy protocol, the font helper and the animation types.
//! Subclass files only add their stylesheet class, and the first one adds
//! theme switching.
//!
//! The registry must have gone through [`crate::resolve::prepare`]; the
//! generator only reads it.

mod property;
mod style;
mod templates;

use std::fmt::Write;

use minijinja::context;
use serde::Serialize;

use crate::error::{GeneratorError, ResolveError, Result};
use crate::ir::{Style, Stylesheet};
use crate::loader::{ICONIC_FONT_STYLE, SYMBOL_FONT_STYLE};
use crate::registry::{Registry, StylesheetId};
use crate::rhs::animation::ANIMATABLE;
use crate::rhs::font::{TEXT_STYLES, TEXT_STYLE_ENUM};
use crate::rhs::ENUMS;
use crate::settings::Settings;
use crate::util::first_lowercased;

use style::StyleWriter;
use templates::Templates;

/// Extension shared by every generated file name.
pub const FILE_SUFFIX: &str = "generated.swift";

/// Storage keys of the associated objects used by view extensions.
const HANDLES: &str = "\
fileprivate var __AppearanceProxyHandle: UInt8 = 0
fileprivate var __ThemeAwareHandle: UInt8 = 0
fileprivate var __ObservingDidChangeThemeHandle: UInt8 = 0
";

/// A rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name, relative to the output directory.
    pub name: String,
    pub content: String,
}

#[derive(Serialize)]
struct ThemeCase {
    name: String,
    class: String,
}

#[derive(Serialize)]
struct TextStyleCase {
    name: String,
    native: String,
}

#[derive(Serialize)]
struct Subclass {
    proxy_type: String,
    accessor: String,
}

pub struct Generator<'a> {
    registry: &'a Registry,
    settings: &'a Settings,
    templates: Templates,
}

impl<'a> Generator<'a> {
    pub fn new(
        registry: &'a Registry,
        settings: &'a Settings,
    ) -> std::result::Result<Self, GeneratorError> {
        Ok(Generator {
            registry,
            settings,
            templates: Templates::new()?,
        })
    }

    /// Renders every stylesheet, base first.
    pub fn generate_all(&self) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        for id in self.registry.order()? {
            files.extend(self.generate(id)?);
        }
        Ok(files)
    }

    /// Renders one stylesheet: its main file, then its per-style files.
    pub fn generate(&self, id: StylesheetId) -> Result<Vec<GeneratedFile>> {
        if !self.registry.is_linked() {
            return Err(ResolveError::NotLinked.into());
        }
        let sheet = self.registry.sheet(id);
        if sheet.is_base() && !self.settings.generate_base_style {
            log::debug!("skipping base stylesheet {}", sheet.name);
            return Ok(Vec::new());
        }
        log::debug!("generating stylesheet {}", sheet.name);

        let split = self.settings.generate_file_per_appearance_proxy;
        let mut files = vec![GeneratedFile {
            name: self.file_name(&sheet.name),
            content: self.main_file(id, split)?,
        }];
        if split {
            for style in &sheet.styles {
                files.push(self.style_file(sheet, style)?);
            }
        }
        Ok(files)
    }

    /// `<name>[.<extendedName>].generated.swift`
    pub fn file_name(&self, sheet: &str) -> String {
        match &self.settings.extended_name {
            Some(extended) => format!("{}.{}.{}", sheet, extended, FILE_SUFFIX),
            None => format!("{}.{}", sheet, FILE_SUFFIX),
        }
    }

    fn main_file(&self, id: StylesheetId, split: bool) -> Result<String> {
        let sheet = self.registry.sheet(id);
        let base = self.base_type()?;
        let mut out = self.header()?;

        if sheet.is_base() {
            out.push_str(&self.shared_declarations(sheet, &base)?);
        } else if self.first_subclass()? == Some(id) {
            out.push_str(&self.theme(&base)?);
        }
        out.push_str(&self.globals(id)?);

        let namespace = self.settings.namespace.as_deref();
        match namespace {
            Some(ns) if sheet.is_base() => {
                if self.settings.objc {
                    let _ = writeln!(
                        out,
                        "@objc public enum {}: Int {{\n\tcase {}\n",
                        ns,
                        first_lowercased(ns)
                    );
                } else {
                    let _ = writeln!(out, "public enum {} {{\n", ns);
                }
            }
            Some(ns) => {
                let _ = writeln!(out, "extension {} {{\n", ns);
            }
            None => {}
        }

        let writer = StyleWriter {
            settings: self.settings,
            base_type: &base,
            sheet: &sheet.name,
        };
        let mut body = String::new();
        if !split {
            for style in &sheet.styles {
                writer.write_style(&mut body, style);
            }
        }
        if let Some(animator) = &sheet.animator {
            writer.write_style(&mut body, animator);
        }

        let superclass = match (&sheet.superclass_name, &self.settings.import) {
            (Some(superclass), _) => Some(superclass.clone()),
            (None, Some(import)) => {
                Some(format!("{}{}", self.settings.import_prefix(), import.stylesheet))
            }
            (None, None) if self.settings.objc => Some("NSObject".to_string()),
            (None, None) => None,
        };
        let is_subclass = sheet.superclass_name.is_some() || self.settings.import.is_some();
        out.push_str(&self.templates.render(
            templates::STYLESHEET,
            context! {
                objc => self.settings.objc,
                name => &sheet.name,
                superclass,
                is_subclass,
                body,
            },
        )?);
        out.push('\n');
        if namespace.is_some() {
            out.push_str("\n}\n");
        }

        out.push_str(&self.view_extensions(sheet, &base)?);
        Ok(out)
    }

    /// A top-level style in its own file, as an extension of its stylesheet.
    fn style_file(&self, sheet: &Stylesheet, style: &Style) -> Result<GeneratedFile> {
        let base = self.base_type()?;
        let writer = StyleWriter {
            settings: self.settings,
            base_type: &base,
            sheet: &sheet.name,
        };
        let mut out = self.header()?;
        let _ = writeln!(out, "\nextension {} {{", self.qualified(&sheet.name));
        writer.write_style(&mut out, style);
        out.push_str("}\n");
        Ok(GeneratedFile {
            name: format!("{}.{}.{}", sheet.name, style.name, FILE_SUFFIX),
            content: out,
        })
    }

    fn header(&self) -> Result<String> {
        let framework = self.settings.import.as_ref().map(|import| &import.framework);
        Ok(self.templates.render(templates::HEADER, context! { framework })?)
    }

    /// Manager, protocol, font helper and animation types.
    fn shared_declarations(&self, sheet: &Stylesheet, base: &str) -> Result<String> {
        let imported = self.settings.import.is_some();
        let manager = self.settings.manager_name();
        let mut out = String::from("\n");

        if !imported {
            if self.settings.generate_appearance_proxy_protocol {
                out.push_str(&self.templates.render(templates::PROTOCOL, context! {})?);
                out.push('\n');
            }

            let mut text_styles: Vec<TextStyleCase> = TEXT_STYLES
                .iter()
                .map(|name| TextStyleCase {
                    name: name.to_string(),
                    native: name.to_string(),
                })
                .collect();
            text_styles.extend(self.settings.typography.iter().map(|name| TextStyleCase {
                name: name.clone(),
                native: "body".to_string(),
            }));
            out.push_str(&self.templates.render(
                templates::FONT,
                context! {
                    enums => ENUMS,
                    text_style_enum => TEXT_STYLE_ENUM,
                    text_styles,
                    symbol_font => sheet.has_symbol_font,
                    iconic_enum => ICONIC_FONT_STYLE,
                    symbol_style => SYMBOL_FONT_STYLE,
                    manager => &manager,
                },
            )?);
            out.push('\n');

            let animated = self
                .registry
                .ids()
                .any(|id| self.registry.sheet(id).animator.is_some());
            if animated {
                let animations: Vec<String> =
                    sheet.animations().map(|animation| first_lowercased(&animation.name)).collect();
                out.push_str(&self.templates.render(
                    templates::ANIMATOR,
                    context! { animations, props => ANIMATABLE },
                )?);
                out.push('\n');
            }
        }

        out.push_str(&self.templates.render(
            templates::MANAGER,
            context! {
                content_size => self.settings.generate_appearance_proxy_protocol,
                imported,
                manager,
                base,
                objc => self.settings.objc,
                method_attr => if self.settings.objc { "@objc " } else { "" },
            },
        )?);
        out.push('\n');
        Ok(out)
    }

    /// Theme enum and theme switching, emitted once for all subclasses.
    fn theme(&self, base: &str) -> Result<String> {
        let cases: Vec<ThemeCase> = self
            .registry
            .order()?
            .into_iter()
            .map(|id| self.registry.sheet(id))
            .filter(|sheet| !sheet.is_base())
            .map(|sheet| ThemeCase {
                name: theme_case(&sheet.name),
                class: self.qualified(&sheet.name),
            })
            .collect();
        let first_case = cases.first().map(|case| case.name.clone()).unwrap_or_default();

        let mut theme_enum = self.templates.render(
            templates::THEME_ENUM,
            context! { objc => self.settings.objc, cases, base },
        )?;
        theme_enum.push('\n');
        let theme_type = match &self.settings.namespace {
            Some(ns) => {
                theme_enum = format!("extension {} {{\n{}}}\n", ns, theme_enum);
                format!("{}.Theme", ns)
            }
            None => "Theme".to_string(),
        };

        let mut out = String::from("\n");
        out.push_str(&self.templates.render(
            templates::THEME,
            context! {
                imported => self.settings.import.is_some(),
                theme_enum,
                manager => self.settings.manager_name(),
                base,
                theme_type,
                import_manager => self.settings.import_manager(),
                first_case,
            },
        )?);
        out.push('\n');
        Ok(out)
    }

    /// Enum and option set definitions. The base file always declares the
    /// `S` namespace; subclasses extend it only with definitions the base
    /// lacks.
    fn globals(&self, id: StylesheetId) -> Result<String> {
        let sheet = self.registry.sheet(id);
        let objc = self.settings.objc;
        let extends = self.settings.import.is_some() || !sheet.is_base();

        let mut declarations = Vec::new();
        if sheet.is_base() {
            for value in sheet.global_values() {
                declarations.extend(value.global_declaration(objc, !extends));
            }
        } else {
            let base = self.registry.sheet(self.registry.base()?);
            let inherited: Vec<String> = base
                .global_values()
                .iter()
                .filter_map(|value| value.global_declaration(objc, false))
                .collect();
            for value in sheet.global_values() {
                declarations.extend(
                    value
                        .global_declaration(objc, false)
                        .filter(|declaration| !inherited.contains(declaration)),
                );
            }
            if declarations.is_empty() {
                return Ok(String::new());
            }
        }

        let mut out = String::from("\n");
        if extends {
            let _ = writeln!(out, "public extension {} {{", ENUMS);
        } else if objc {
            let _ = writeln!(out, "@objc({0}) public class {0}: NSObject {{", ENUMS);
        } else {
            let _ = writeln!(out, "public struct {} {{", ENUMS);
        }
        for declaration in declarations {
            for line in declaration.lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "\t{}", line);
                }
            }
        }
        out.push_str("}\n\n");
        Ok(out)
    }

    /// `AppearanceProxyComponent` conformances for `__appearance_proxy`
    /// styles first declared in this stylesheet.
    fn view_extensions(&self, sheet: &Stylesheet, base: &str) -> Result<String> {
        let stylesheet = format!("{}.stylesheet({}.shared())", self.settings.manager_name(), base);
        let mut out = String::new();
        for style in sheet.styles.iter().filter(|style| style.is_extension && !style.is_override) {
            if out.is_empty() {
                out.push('\n');
                out.push_str(HANDLES);
            }
            let mut subclasses = Vec::new();
            collect_subclasses(sheet, &style.name, base, &mut Vec::new(), &mut subclasses);
            out.push_str(&self.templates.render(
                templates::VIEW_EXTENSION,
                context! {
                    view => &style.name,
                    proxy_type => format!("{}.{}", base, style.class_name()),
                    stylesheet => &stylesheet,
                    accessor => &style.name,
                    subclasses,
                },
            )?);
            out.push('\n');
        }
        Ok(out)
    }

    fn base_type(&self) -> Result<String> {
        let base = self.registry.sheet(self.registry.base()?);
        Ok(self.qualified(&base.name))
    }

    fn qualified(&self, name: &str) -> String {
        match &self.settings.namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => name.to_string(),
        }
    }

    fn first_subclass(&self) -> Result<Option<StylesheetId>> {
        Ok(self
            .registry
            .order()?
            .into_iter()
            .find(|id| !self.registry.sheet(*id).is_base()))
    }
}

/// `DarkStyle` -> `dark`, `Contrast` -> `contrast`.
fn theme_case(sheet: &str) -> String {
    let name = match sheet.strip_suffix("Style") {
        Some(stem) if sheet.len() > 5 => stem,
        _ => sheet,
    };
    first_lowercased(name)
}

/// Styles extending `name` within `sheet`, most derived first.
fn collect_subclasses(
    sheet: &Stylesheet,
    name: &str,
    base: &str,
    visited: &mut Vec<String>,
    out: &mut Vec<Subclass>,
) {
    for style in &sheet.styles {
        if style.is_external_override || style.superclass_name.as_deref() != Some(name) {
            continue;
        }
        if visited.contains(&style.name) {
            continue;
        }
        visited.push(style.name.clone());
        collect_subclasses(sheet, &style.name, base, visited, out);
        out.push(Subclass {
            proxy_type: format!("{}.{}", base, style.class_name()),
            accessor: style.name.clone(),
        });
    }
}
