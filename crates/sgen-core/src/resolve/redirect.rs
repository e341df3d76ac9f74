//! Redirect resolution.
//!
//! `$Style.property` and `$Style.Nested.property` are looked up in the
//! stylesheet the redirect appears in, then its superclass, then the imported
//! stylesheet; the first match wins. Chains of redirects are followed to the
//! first concrete value, whose type becomes the redirect's type.

use crate::error::ResolveError;
use crate::ir::{Property, PropertyValue, Style};
use crate::registry::{Registry, StylesheetId};
use crate::rhs::{Redirect, ResolvedRedirect, RhsValue};
use crate::settings::Settings;

/// Receiver of redirects into stylesheets of this run.
const MAIN_PROXY: &str = "mainProxy()";

pub(crate) fn resolve(
    registry: &mut Registry,
    id: StylesheetId,
    settings: &Settings,
) -> Result<(), ResolveError> {
    let mut styles = registry.sheet(id).styles.clone();
    let mut animator = registry.sheet(id).animator.clone();
    {
        let resolver = Resolver {
            registry,
            settings,
            sheet: id,
        };
        for style in styles.iter_mut().chain(animator.iter_mut()) {
            resolver.style(style)?;
        }
    }
    let sheet = registry.sheet_mut(id);
    sheet.styles = styles;
    sheet.animator = animator;
    Ok(())
}

/// Where a redirect target was found.
struct Target<'r> {
    sheet: StylesheetId,
    imported: bool,
    property: &'r Property,
}

struct Resolver<'r> {
    registry: &'r Registry,
    settings: &'r Settings,
    sheet: StylesheetId,
}

impl<'r> Resolver<'r> {
    fn style(&self, style: &mut Style) -> Result<(), ResolveError> {
        for property in &mut style.properties {
            match &mut property.value {
                PropertyValue::Style(nested) => self.style(nested)?,
                PropertyValue::Rhs(value) => {
                    value.try_for_each_redirect(&mut |redirect| self.redirect(redirect))?;
                    let types = value.branch_types();
                    if value.is_hash() && types.len() > 1 {
                        return Err(ResolveError::BranchTypeMismatch {
                            property: format!("{}.{}", style.name, property.key),
                            types,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn redirect(&self, redirect: &mut Redirect) -> Result<(), ResolveError> {
        let target = self.lookup(self.sheet, &redirect.path)?;
        let access = if target.imported {
            let manager = self
                .settings
                .import_manager()
                .unwrap_or(crate::settings::STYLESHEET_MANAGER);
            format!("{}.S.{}", manager, redirect.path)
        } else {
            format!("{}.{}", MAIN_PROXY, redirect.path)
        };

        let mut visited = vec![redirect.path.clone()];
        let ty = self.property_type(&target, &mut visited)?;
        log::debug!("redirect {} -> {}", redirect.path, ty);
        redirect.resolved = Some(ResolvedRedirect { access, ty });
        Ok(())
    }

    fn property_type(
        &self,
        target: &Target<'r>,
        visited: &mut Vec<String>,
    ) -> Result<String, ResolveError> {
        match &target.property.value {
            PropertyValue::Rhs(value) => self.value_type(target.sheet, value, visited),
            PropertyValue::Style(_) => Err(ResolveError::UnresolvedRedirect {
                redirect: visited.last().cloned().unwrap_or_default(),
                stylesheet: self.registry.sheet(target.sheet).name.clone(),
            }),
        }
    }

    /// Materialized type of a value found in `sheet`, following redirects.
    fn value_type(
        &self,
        sheet: StylesheetId,
        value: &RhsValue,
        visited: &mut Vec<String>,
    ) -> Result<String, ResolveError> {
        match value {
            RhsValue::Redirect(next) => {
                if visited.contains(&next.path) {
                    let mut path = visited.clone();
                    path.push(next.path.clone());
                    return Err(ResolveError::RedirectCycle { path });
                }
                visited.push(next.path.clone());
                let target = self.lookup(sheet, &next.path)?;
                self.property_type(&target, visited)
            }
            RhsValue::Hash(branches) => match branches.first() {
                Some((_, first)) => self.value_type(sheet, first, visited),
                None => Ok(value.swift_type()),
            },
            RhsValue::Array(items) => {
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    types.push(self.value_type(sheet, item, visited)?);
                }
                Ok(match types.split_first() {
                    Some((first, rest)) if rest.iter().all(|ty| ty == first) => {
                        format!("[{}]", first)
                    }
                    _ => "[Any]".to_string(),
                })
            }
            _ => Ok(value.swift_type()),
        }
    }

    /// Finds the property a redirect path points to, searching `sheet`, its
    /// superclass, then the imported stylesheet.
    fn lookup(&self, sheet: StylesheetId, path: &str) -> Result<Target<'r>, ResolveError> {
        let components: Vec<&str> = path.split('.').collect();
        let (style_name, nested, key) = match components.as_slice() {
            [style, key] => (*style, None, *key),
            [style, nested, key] => (*style, Some(*nested), *key),
            _ => return Err(ResolveError::InvalidRedirect(path.to_string())),
        };
        let key = key.replace('.', "_");

        let imported = self.registry.imported();
        let candidates = [Some(sheet), self.registry.superclass(sheet), imported];
        for candidate in candidates.into_iter().flatten() {
            let Some(mut style) = self.registry.lookup(candidate, style_name) else {
                continue;
            };
            if let Some(nested) = nested {
                match style.nested(nested) {
                    Some(inner) => style = inner,
                    None => continue,
                }
            }
            if let Some(property) = style.property(&key) {
                return Ok(Target {
                    sheet: candidate,
                    imported: Some(candidate) == imported,
                    property,
                });
            }
        }
        Err(ResolveError::UnresolvedRedirect {
            redirect: path.to_string(),
            stylesheet: self.registry.sheet(sheet).name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::ir::Stylesheet;
    use crate::rhs::ParseContext;

    fn rhs(input: &str) -> RhsValue {
        RhsValue::parse(input, &ParseContext::default()).unwrap()
    }

    fn style(name: &str, properties: &[(&str, RhsValue)]) -> Style {
        Style::new(
            name,
            properties
                .iter()
                .map(|(key, value)| Property::rhs(key, value.clone()))
                .collect(),
        )
    }

    fn linked(sheets: Vec<Stylesheet>) -> Registry {
        let mut registry = Registry::new();
        for sheet in sheets {
            registry.register(sheet).unwrap();
        }
        registry.link().unwrap();
        registry
    }

    fn resolved(
        registry: &Registry,
        sheet: StylesheetId,
        style: &str,
        key: &str,
    ) -> ResolvedRedirect {
        let value = registry.lookup(sheet, style).unwrap().property(key).unwrap().as_rhs().unwrap();
        value.as_redirect().unwrap().resolved.clone().unwrap()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    #[test]
    fn test_redirect_chain_resolves_to_concrete_type() {
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![
            style("Foo", &[("a", rhs("$Bar.b"))]),
            style("Bar", &[("b", RhsValue::Int(3))]),
            style("Baz", &[("c", rhs("$Foo.a"))]),
        ];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        resolve(&mut registry, id, &Settings::default()).unwrap();

        let a = resolved(&registry, id, "Foo", "a");
        assert_eq!(a.ty, "Int");
        assert_eq!(a.access, "mainProxy().Bar.b");
        assert_eq!(resolved(&registry, id, "Baz", "c").ty, "Int");
    }

    #[test]
    fn test_redirect_into_superclass_and_nested() {
        let mut base = Stylesheet::new("Default");
        let inner = style("title", &[("size", rhs("12pt"))]);
        base.styles = vec![Style::new("Typography", vec![Property::style(inner)])];

        let mut dark = Stylesheet::from_declaration("Dark:Default");
        dark.styles = vec![style("Label", &[("size", rhs("$Typography.title.size"))])];

        let mut registry = linked(vec![base, dark]);
        let dark_id = registry.find("Dark").unwrap();
        resolve(&mut registry, dark_id, &Settings::default()).unwrap();

        let size = resolved(&registry, dark_id, "Label", "size");
        assert_eq!(size.ty, "CGFloat");
        assert_eq!(size.access, "mainProxy().Typography.title.size");
    }

    #[test]
    fn test_redirect_into_imported_stylesheet() {
        let mut imported = Stylesheet::new("FluentStyle");
        imported.styles = vec![style("Colors", &[("brand", rhs("color(0078D4)"))])];
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![style("Button", &[("tint", rhs("$Colors.brand"))])];

        let mut registry = Registry::new();
        let id = registry.register(sheet).unwrap();
        registry.set_imported(imported);
        registry.link().unwrap();
        resolve(&mut registry, id, &Settings::default()).unwrap();

        let tint = resolved(&registry, id, "Button", "tint");
        assert_eq!(tint.ty, "UIColor");
        assert_eq!(tint.access, "StylesheetManager.S.Colors.brand");
    }

    #[test]
    fn test_redirects_inside_conditional_values() {
        let hash = RhsValue::hash(vec![
            (Condition::parse("default").unwrap(), rhs("$Bar.b")),
            (Condition::parse("width > 300").unwrap(), RhsValue::Int(2)),
        ]);
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![style("Foo", &[("a", hash)]), style("Bar", &[("b", RhsValue::Int(1))])];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        resolve(&mut registry, id, &Settings::default()).unwrap();

        let value = registry.lookup(id, "Foo").unwrap().property("a").unwrap().as_rhs().unwrap();
        assert_eq!(value.branch_types(), vec!["Int".to_string()]);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_redirect_cycle_is_detected() {
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![
            style("A", &[("a", rhs("$B.b"))]),
            style("B", &[("b", rhs("$A.a"))]),
        ];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        let err = resolve(&mut registry, id, &Settings::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::RedirectCycle {
                path: vec!["B.b".into(), "A.a".into(), "B.b".into()]
            }
        );
    }

    #[test]
    fn test_unresolved_and_invalid_redirects() {
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![style("A", &[("a", rhs("$Missing.value"))])];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        assert!(matches!(
            resolve(&mut registry, id, &Settings::default()),
            Err(ResolveError::UnresolvedRedirect { ref redirect, .. })
                if redirect == "Missing.value"
        ));

        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![style("A", &[("a", rhs("$justone"))])];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        assert_eq!(
            resolve(&mut registry, id, &Settings::default()),
            Err(ResolveError::InvalidRedirect("justone".into()))
        );
    }

    #[test]
    fn test_branch_type_mismatch() {
        let hash = RhsValue::hash(vec![
            (Condition::parse("default").unwrap(), RhsValue::Int(1)),
            (Condition::parse("width > 300").unwrap(), RhsValue::Bool(true)),
        ]);
        let mut sheet = Stylesheet::new("Default");
        sheet.styles = vec![style("Foo", &[("a", hash)])];
        let mut registry = linked(vec![sheet]);
        let id = registry.base().unwrap();
        assert!(matches!(
            resolve(&mut registry, id, &Settings::default()),
            Err(ResolveError::BranchTypeMismatch { ref property, .. }) if property == "Foo.a"
        ));
    }
}
