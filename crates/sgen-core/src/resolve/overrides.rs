//! Override and inheritance marking.
//!
//! Every top-level style gets an inheritance chain: the classes its proxy
//! derives from, nearest first. The chain starts at
//!
//! 1. the same-named style of the base stylesheet, for styles of a subclass
//!    stylesheet (the accessor itself is an override),
//! 2. the imported style named by `extends S.Name`,
//! 3. the style named by `extends Name`, or
//!
//! is empty. Properties and nested styles are then marked as overrides when
//! a style of the chain already declares them.

use std::collections::{HashMap, HashSet};

use crate::error::ResolveError;
use crate::ir::Style;
use crate::registry::{Registry, StylesheetId};
use crate::settings::Settings;
use crate::util::first_uppercased;

pub(crate) fn resolve(
    registry: &mut Registry,
    id: StylesheetId,
    settings: &Settings,
) -> Result<(), ResolveError> {
    let (styles, animator) = Marker::new(registry, id, settings).run()?;
    let sheet = registry.sheet_mut(id);
    sheet.styles = styles;
    sheet.animator = animator;
    Ok(())
}

/// Where a style of a chain lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    /// The stylesheet being marked, as processed so far.
    Local,
    Sheet(StylesheetId),
    Imported,
}

#[derive(Debug, Clone)]
struct Link {
    /// Swift path of the proxy class.
    path: String,
    style: Style,
}

struct Marker<'r> {
    registry: &'r Registry,
    settings: &'r Settings,
    sheet: StylesheetId,
    processed: HashMap<String, Style>,
}

impl<'r> Marker<'r> {
    fn new(registry: &'r Registry, sheet: StylesheetId, settings: &'r Settings) -> Self {
        Marker {
            registry,
            settings,
            sheet,
            processed: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<(Vec<Style>, Option<Style>), ResolveError> {
        let sheet = self.registry.sheet(self.sheet);
        let is_base = sheet.is_base();
        let mut styles = sheet.styles.clone();

        let extended: HashSet<String> = styles
            .iter()
            .filter(|style| !style.is_external_override)
            .filter_map(|style| style.superclass_name.clone())
            .collect();
        for style in &mut styles {
            if is_base || extended.contains(&style.name) {
                open(style);
            }
        }
        if !is_base {
            mark_shared_nested(&mut styles);
        }

        let names: Vec<String> = styles.iter().map(|style| style.name.clone()).collect();
        let order = extension_order(&styles)?;
        let mut slots: Vec<Option<Style>> = styles.into_iter().map(Some).collect();
        for index in order {
            let Some(mut style) = slots[index].take() else {
                continue;
            };
            self.top_level(&mut style)?;
            self.processed.insert(style.name.clone(), style);
        }

        let mut animator = sheet.animator.clone();
        if let Some(animator) = &mut animator {
            if is_base {
                open(animator);
            }
            self.top_level(animator)?;
        }

        let styles = names
            .iter()
            .filter_map(|name| self.processed.remove(name))
            .collect();
        Ok((styles, animator))
    }

    fn top_level(&self, style: &mut Style) -> Result<(), ResolveError> {
        let sheet_name = &self.registry.sheet(self.sheet).name;
        let base = self.registry.superclass(self.sheet);

        let start = match base.filter(|base| self.registry.lookup(*base, &style.name).is_some()) {
            Some(base) => {
                style.is_override = true;
                style.override_name = Some(format!("{}{}", sheet_name, style.name));
                Some((Place::Sheet(base), style.name.clone()))
            }
            None => match &style.superclass_name {
                Some(superclass) if style.is_external_override => {
                    Some((Place::Imported, superclass.clone()))
                }
                Some(superclass) if self.processed.contains_key(superclass) => {
                    Some((Place::Local, superclass.clone()))
                }
                Some(superclass) => match base {
                    Some(base) if self.registry.lookup(base, superclass).is_some() => {
                        Some((Place::Sheet(base), superclass.clone()))
                    }
                    _ => return Err(self.unknown(style, superclass)),
                },
                None => None,
            },
        };

        let links = match start {
            Some((Place::Imported, superclass)) if self.registry.imported().is_none() => {
                let import = self
                    .settings
                    .import
                    .as_ref()
                    .ok_or_else(|| self.unknown(style, &superclass))?;
                style.inherits = Some(format!(
                    "{}{}.{}AppearanceProxy",
                    self.settings.import_prefix(),
                    import.stylesheet,
                    superclass
                ));
                Vec::new()
            }
            Some(start) => self.chain(start, style)?,
            None => Vec::new(),
        };

        if let Some(first) = links.first() {
            log::debug!("{}.{} inherits {}", sheet_name, style.name, first.path);
            style.inherits = Some(first.path.clone());
            if style.is_override {
                style.accessor_type = Some(accessor_type(first));
            }
        }
        inherit(style, &links);
        Ok(())
    }

    /// Follows superclasses from `start`, nearest first.
    fn chain(&self, start: (Place, String), owner: &Style) -> Result<Vec<Link>, ResolveError> {
        let mut links: Vec<Link> = Vec::new();
        let mut visited: Vec<(Place, String)> = Vec::new();
        let mut next = Some(start);

        while let Some((place, name)) = next.take() {
            if visited.contains(&(place, name.clone())) {
                break;
            }
            let Some(style) = self.find(place, &name) else {
                if links.is_empty() {
                    return Err(self.unknown(owner, &name));
                }
                break;
            };
            visited.push((place, name));

            next = if style.is_override && place == Place::Local {
                self.registry
                    .superclass(self.sheet)
                    .map(|base| (Place::Sheet(base), style.name.clone()))
            } else {
                style.superclass_name.as_ref().map(|superclass| {
                    let place = if style.is_external_override {
                        Place::Imported
                    } else {
                        place
                    };
                    (place, superclass.clone())
                })
            };
            links.push(Link {
                path: self.path(place, style),
                style: style.clone(),
            });
        }
        Ok(links)
    }

    fn find(&self, place: Place, name: &str) -> Option<&Style> {
        match place {
            Place::Local => self.processed.get(name),
            Place::Sheet(id) => self.registry.lookup(id, name),
            Place::Imported => self
                .registry
                .imported()
                .and_then(|id| self.registry.lookup(id, name)),
        }
    }

    fn path(&self, place: Place, style: &Style) -> String {
        match place {
            Place::Local => {
                format!("{}.{}", self.registry.sheet(self.sheet).name, style.class_name())
            }
            Place::Sheet(id) => format!("{}.{}", self.registry.sheet(id).name, style.class_name()),
            Place::Imported => {
                let sheet = self
                    .registry
                    .imported()
                    .map(|id| self.registry.sheet(id).name.as_str())
                    .unwrap_or_default();
                format!("{}{}.{}", self.settings.import_prefix(), sheet, style.class_name())
            }
        }
    }

    fn unknown(&self, style: &Style, superclass: &str) -> ResolveError {
        ResolveError::UnknownStyle {
            stylesheet: self.registry.sheet(self.sheet).name.clone(),
            style: style.name.clone(),
            superclass: superclass.to_string(),
        }
    }
}

fn accessor_type(link: &Link) -> String {
    link.style
        .accessor_type
        .clone()
        .unwrap_or_else(|| link.path.clone())
}

/// Marks properties and nested styles already declared along `links`.
fn inherit(style: &mut Style, links: &[Link]) {
    if let Some(applicable) = links.iter().find(|link| link.style.is_applicable) {
        if !style.is_applicable {
            style.view_class = applicable.style.view_class.clone();
        }
        style.is_applicable = true;
        style.is_apply_override = true;
    }

    let overridable = style.is_overridable;
    for property in &mut style.properties {
        property.is_overridable |= overridable;
        if property.as_rhs().is_some() {
            property.is_override = links.iter().any(|link| {
                link.style
                    .property(&property.key)
                    .is_some_and(|inherited| inherited.as_rhs().is_some())
            });
        }
    }

    let stem = style.class_stem().to_string();
    for nested in style.nested_styles_mut() {
        let chain: Vec<Link> = links
            .iter()
            .filter_map(|link| {
                link.style.nested(&nested.name).map(|inherited| Link {
                    path: format!("{}.{}", link.path, inherited.class_name()),
                    style: inherited.clone(),
                })
            })
            .collect();
        if let Some(first) = chain.first() {
            nested.is_override = true;
            nested.override_name = Some(format!("{}{}", stem, first_uppercased(&nested.name)));
            nested.inherits = Some(first.path.clone());
            nested.accessor_type = Some(accessor_type(first));
        }
        inherit(nested, &chain);
    }
}

/// Opens a style and everything below it for subclassing.
fn open(style: &mut Style) {
    style.is_overridable = true;
    for property in &mut style.properties {
        property.is_overridable = true;
    }
    for nested in style.nested_styles_mut() {
        nested.is_nested_overridable = true;
        open(nested);
    }
}

/// Nested styles whose name appears under more than one parent.
fn mark_shared_nested(styles: &mut [Style]) {
    let mut parents: HashMap<String, usize> = HashMap::new();
    for style in styles.iter() {
        for nested in style.nested_styles() {
            *parents.entry(nested.name.clone()).or_default() += 1;
        }
    }
    for style in styles.iter_mut() {
        for nested in style.nested_styles_mut() {
            if parents.get(&nested.name).copied().unwrap_or_default() > 1 {
                nested.is_nested_overridable = true;
            }
        }
    }
}

/// Orders styles so that every locally extended style comes before the
/// styles extending it.
fn extension_order(styles: &[Style]) -> Result<Vec<usize>, ResolveError> {
    let index: HashMap<&str, usize> = styles
        .iter()
        .enumerate()
        .map(|(i, style)| (style.name.as_str(), i))
        .collect();
    let mut done = vec![false; styles.len()];
    let mut order = Vec::with_capacity(styles.len());

    for start in 0..styles.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if done[i] {
                break;
            }
            if let Some(pos) = path.iter().position(|&p| p == i) {
                let mut names: Vec<String> =
                    path[pos..].iter().map(|&p| styles[p].name.clone()).collect();
                names.push(styles[i].name.clone());
                return Err(ResolveError::InheritanceCycle { path: names });
            }
            path.push(i);
            let style = &styles[i];
            current = style
                .superclass_name
                .as_deref()
                .filter(|_| !style.is_external_override)
                .and_then(|name| index.get(name).copied());
        }
        for &i in path.iter().rev() {
            done[i] = true;
            order.push(i);
        }
    }
    Ok(order)
}
