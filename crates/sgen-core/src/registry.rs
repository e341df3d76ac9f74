//! The set of stylesheets compiled together in one run.
//!
//! Stylesheets refer to each other by name in the source (`Dark:Default`,
//! `extends Button`, `$Palette.accent`). The registry turns those names into
//! handles once, in [`Registry::link`], so later passes look styles up by
//! index instead of searching by name.
//!
//! Usage is strictly ordered:
//!
//! 1. [`Registry::register`] every stylesheet (and optionally
//!    [`Registry::set_imported`] the imported framework stylesheet).
//! 2. [`Registry::link`].
//! 3. Resolve, then generate. Both only read cross-stylesheet data.
//!
//! Registering after linking drops the link.

use std::collections::HashMap;

use crate::error::ResolveError;
use crate::ir::{Style, Stylesheet};

/// Handle to a stylesheet in a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StylesheetId(usize);

/// Handle to a top-level style of a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId {
    pub sheet: StylesheetId,
    pub index: usize,
}

#[derive(Debug, Clone)]
struct Link {
    base: StylesheetId,
    /// Base stylesheet first, then the others in registration order.
    order: Vec<StylesheetId>,
    superclass: Vec<Option<StylesheetId>>,
    /// Style name to index, per stylesheet.
    styles: Vec<HashMap<String, usize>>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    sheets: Vec<Stylesheet>,
    imported: Option<StylesheetId>,
    link: Option<Link>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stylesheet. Names must be unique.
    pub fn register(&mut self, sheet: Stylesheet) -> Result<StylesheetId, ResolveError> {
        if self.find(&sheet.name).is_some() {
            return Err(ResolveError::DuplicateStylesheet(sheet.name));
        }
        log::debug!("registering stylesheet {}", sheet.name);
        self.link = None;
        self.sheets.push(sheet);
        Ok(StylesheetId(self.sheets.len() - 1))
    }

    /// Sets the stylesheet of the imported framework. It is searched for
    /// redirects and external superclasses but never generated.
    pub fn set_imported(&mut self, sheet: Stylesheet) -> StylesheetId {
        self.link = None;
        match self.imported {
            Some(id) => {
                self.sheets[id.0] = sheet;
                id
            }
            None => {
                self.sheets.push(sheet);
                let id = StylesheetId(self.sheets.len() - 1);
                self.imported = Some(id);
                id
            }
        }
    }

    /// Validates the stylesheet graph and builds the lookup indices.
    ///
    /// Exactly one registered stylesheet has no superclass; every other one
    /// extends it directly.
    pub fn link(&mut self) -> Result<(), ResolveError> {
        let registered: Vec<StylesheetId> = self.ids().collect();

        let bases: Vec<StylesheetId> = registered
            .iter()
            .copied()
            .filter(|id| self.sheet(*id).is_base())
            .collect();
        let base = match bases.as_slice() {
            [] => return Err(ResolveError::NoBaseStylesheet),
            [base] => *base,
            _ => {
                return Err(ResolveError::MultipleBaseStylesheets(
                    bases.iter().map(|id| self.sheet(*id).name.clone()).collect(),
                ))
            }
        };

        let mut superclass = vec![None; self.sheets.len()];
        for &id in &registered {
            let sheet = self.sheet(id);
            let Some(name) = &sheet.superclass_name else {
                continue;
            };
            let parent = self
                .find(name)
                .ok_or_else(|| ResolveError::UnknownSuperclass {
                    name: sheet.name.clone(),
                    superclass: name.clone(),
                })?;
            if parent != base {
                return Err(ResolveError::NestedSuperclass {
                    name: sheet.name.clone(),
                    superclass: name.clone(),
                });
            }
            superclass[id.0] = Some(parent);
        }

        let mut order = vec![base];
        order.extend(registered.iter().copied().filter(|id| *id != base));

        let styles = self.sheets.iter().map(index_styles).collect();
        self.link = Some(Link {
            base,
            order,
            superclass,
            styles,
        });
        log::debug!("linked {} stylesheets", registered.len());
        Ok(())
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    fn linked(&self) -> Result<&Link, ResolveError> {
        self.link.as_ref().ok_or(ResolveError::NotLinked)
    }

    pub fn base(&self) -> Result<StylesheetId, ResolveError> {
        self.linked().map(|link| link.base)
    }

    /// Stylesheets in dependency order: the base first.
    pub fn order(&self) -> Result<Vec<StylesheetId>, ResolveError> {
        self.linked().map(|link| link.order.clone())
    }

    pub fn superclass(&self, id: StylesheetId) -> Option<StylesheetId> {
        self.link.as_ref().and_then(|link| link.superclass[id.0])
    }

    pub fn imported(&self) -> Option<StylesheetId> {
        self.imported
    }

    /// Registered stylesheets in registration order, without the imported one.
    pub fn ids(&self) -> impl Iterator<Item = StylesheetId> + '_ {
        (0..self.sheets.len())
            .map(StylesheetId)
            .filter(move |id| Some(*id) != self.imported)
    }

    pub fn find(&self, name: &str) -> Option<StylesheetId> {
        self.ids().find(|id| self.sheet(*id).name == name)
    }

    pub fn sheet(&self, id: StylesheetId) -> &Stylesheet {
        &self.sheets[id.0]
    }

    pub(crate) fn sheet_mut(&mut self, id: StylesheetId) -> &mut Stylesheet {
        &mut self.sheets[id.0]
    }

    /// Looks up a top-level style by name. Requires a linked registry.
    pub fn find_style(&self, sheet: StylesheetId, name: &str) -> Option<StyleId> {
        let link = self.link.as_ref()?;
        link.styles[sheet.0]
            .get(name)
            .map(|&index| StyleId { sheet, index })
    }

    pub fn style(&self, id: StyleId) -> &Style {
        &self.sheets[id.sheet.0].styles[id.index]
    }

    /// A top-level style or the animator, by name.
    pub fn lookup(&self, sheet: StylesheetId, name: &str) -> Option<&Style> {
        match self.find_style(sheet, name) {
            Some(id) => Some(self.style(id)),
            None => self
                .sheet(sheet)
                .animator
                .as_ref()
                .filter(|animator| animator.name == name),
        }
    }

    /// Rebuilds the style index of one stylesheet after its styles changed.
    pub(crate) fn reindex(&mut self, sheet: StylesheetId) {
        let index = index_styles(&self.sheets[sheet.0]);
        if let Some(link) = self.link.as_mut() {
            link.styles[sheet.0] = index;
        }
    }
}

fn index_styles(sheet: &Stylesheet) -> HashMap<String, usize> {
    sheet
        .styles
        .iter()
        .enumerate()
        .map(|(index, style)| (style.name.clone(), index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(declaration: &str, styles: &[&str]) -> Stylesheet {
        let mut sheet = Stylesheet::from_declaration(declaration);
        sheet.styles = styles.iter().map(|name| Style::new(name, vec![])).collect();
        sheet
    }

    #[test]
    fn test_link_orders_base_first() {
        let mut registry = Registry::new();
        let dark = registry.register(sheet("Dark:Default", &[])).unwrap();
        let base = registry.register(sheet("Default", &["Button"])).unwrap();
        registry.link().unwrap();

        assert_eq!(registry.base().unwrap(), base);
        assert_eq!(registry.order().unwrap(), vec![base, dark]);
        assert_eq!(registry.superclass(dark), Some(base));
        assert_eq!(registry.superclass(base), None);
    }

    #[test]
    fn test_style_lookup() {
        let mut registry = Registry::new();
        let base = registry.register(sheet("Default", &["Button", "Label"])).unwrap();
        assert!(registry.find_style(base, "Label").is_none());
        registry.link().unwrap();

        let id = registry.find_style(base, "Label").unwrap();
        assert_eq!(registry.style(id).name, "Label");
        assert!(registry.find_style(base, "Missing").is_none());
    }

    #[test]
    fn test_base_validation() {
        let mut registry = Registry::new();
        registry.register(sheet("Dark:Default", &[])).unwrap();
        assert_eq!(registry.link(), Err(ResolveError::NoBaseStylesheet));

        let mut registry = Registry::new();
        registry.register(sheet("A", &[])).unwrap();
        registry.register(sheet("B", &[])).unwrap();
        assert!(matches!(
            registry.link(),
            Err(ResolveError::MultipleBaseStylesheets(names)) if names == vec!["A", "B"]
        ));
    }

    #[test]
    fn test_superclass_validation() {
        let mut registry = Registry::new();
        registry.register(sheet("Default", &[])).unwrap();
        registry.register(sheet("Dark:Missing", &[])).unwrap();
        assert!(matches!(registry.link(), Err(ResolveError::UnknownSuperclass { .. })));

        let mut registry = Registry::new();
        registry.register(sheet("Default", &[])).unwrap();
        registry.register(sheet("Dark:Default", &[])).unwrap();
        registry.register(sheet("Darker:Dark", &[])).unwrap();
        assert!(matches!(registry.link(), Err(ResolveError::NestedSuperclass { .. })));
    }

    #[test]
    fn test_duplicates_and_imported() {
        let mut registry = Registry::new();
        registry.register(sheet("Default", &[])).unwrap();
        assert_eq!(
            registry.register(sheet("Default", &[])),
            Err(ResolveError::DuplicateStylesheet("Default".into()))
        );

        let imported = registry.set_imported(sheet("Fluent", &["Toolbar"]));
        registry.link().unwrap();
        assert_eq!(registry.ids().count(), 1);
        assert!(registry.find("Fluent").is_none());
        assert!(registry.find_style(imported, "Toolbar").is_some());
    }

    #[test]
    fn test_register_after_link_unlinks() {
        let mut registry = Registry::new();
        registry.register(sheet("Default", &[])).unwrap();
        registry.link().unwrap();
        registry.register(sheet("Dark:Default", &[])).unwrap();
        assert!(!registry.is_linked());
        assert_eq!(registry.base(), Err(ResolveError::NotLinked));
    }
}
