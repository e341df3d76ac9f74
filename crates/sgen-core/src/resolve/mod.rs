//! Cross-stylesheet resolution.
//!
//! Runs once over a linked [`Registry`], before generation. Stylesheets are
//! processed base first, so every subclass sees a fully resolved base:
//!
//! 1. [`normalize`]: inject shadows of base styles missing from a subclass.
//! 2. [`redirect`]: resolve `$Style.property` access paths and types.
//! 3. [`overrides`]: compute inheritance chains and override flags.
//!
//! Styles and properties are sorted by name before and after, so output does
//! not depend on YAML key order.

mod normalize;
mod overrides;
mod redirect;

use crate::error::ResolveError;
use crate::registry::Registry;
use crate::settings::Settings;

/// Resolves every registered stylesheet in place.
pub fn prepare(registry: &mut Registry, settings: &Settings) -> Result<(), ResolveError> {
    for id in registry.order()? {
        log::debug!("resolving stylesheet {}", registry.sheet(id).name);

        normalize::normalize(registry, id);
        registry.sheet_mut(id).ensure_determinism();
        registry.reindex(id);

        redirect::resolve(registry, id, settings)?;
        overrides::resolve(registry, id, settings)?;

        registry.sheet_mut(id).ensure_determinism();
        registry.reindex(id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Property, Style, Stylesheet};
    use crate::rhs::{ParseContext, RhsValue};

    fn prepared(sheets: Vec<Stylesheet>) -> Registry {
        let mut registry = Registry::new();
        for sheet in sheets {
            registry.register(sheet).unwrap();
        }
        registry.link().unwrap();
        prepare(&mut registry, &Settings::default()).unwrap();
        registry
    }

    #[test]
    fn test_requires_link() {
        let mut registry = Registry::new();
        registry.register(Stylesheet::new("Default")).unwrap();
        assert_eq!(
            prepare(&mut registry, &Settings::default()),
            Err(ResolveError::NotLinked)
        );
    }

    #[test]
    fn test_shadow_delegates_to_base() {
        let mut base = Stylesheet::new("Default");
        base.styles = vec![Style::new("Foo", vec![Property::rhs("a", RhsValue::Int(1))])];
        let dark = Stylesheet::from_declaration("Dark:Default");

        let registry = prepared(vec![base, dark]);
        let dark = registry.find("Dark").unwrap();
        let foo = registry.lookup(dark, "Foo").unwrap();
        assert!(foo.is_injected);
        assert!(foo.is_override);
        assert!(foo.properties.is_empty());
        assert_eq!(foo.inherits.as_deref(), Some("Default.FooAppearanceProxy"));
    }

    #[test]
    fn test_override_in_subclass() {
        let mut base = Stylesheet::new("Default");
        base.styles = vec![Style::new("Foo", vec![Property::rhs("a", RhsValue::Int(1))])];
        let mut dark = Stylesheet::from_declaration("Dark:Default");
        dark.styles = vec![Style::new("Foo", vec![Property::rhs("a", RhsValue::Int(2))])];

        let registry = prepared(vec![base, dark]);
        let dark = registry.find("Dark").unwrap();
        let a = registry.lookup(dark, "Foo").unwrap().property("a").unwrap();
        assert!(a.is_override);

        let base = registry.base().unwrap();
        let a = registry.lookup(base, "Foo").unwrap().property("a").unwrap();
        assert!(!a.is_override);
        assert!(a.is_overridable);
    }

    #[test]
    fn test_output_is_sorted() {
        let redirect = RhsValue::parse("$Bar.b", &ParseContext::default()).unwrap();
        let mut base = Stylesheet::new("Default");
        base.styles = vec![
            Style::new(
                "Foo",
                vec![Property::rhs("z", redirect), Property::rhs("a", RhsValue::Int(1))],
            ),
            Style::new("Bar", vec![Property::rhs("b", RhsValue::Int(3))]),
        ];
        let registry = prepared(vec![base]);
        let sheet = registry.sheet(registry.base().unwrap());
        let names: Vec<&str> = sheet.styles.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bar", "Foo"]);

        let foo = registry.lookup(registry.base().unwrap(), "Foo").unwrap();
        assert_eq!(foo.properties[0].key, "a");
        let z = foo.property("z").unwrap().as_rhs().unwrap();
        assert_eq!(z.swift_type(), "Int");
    }
}
