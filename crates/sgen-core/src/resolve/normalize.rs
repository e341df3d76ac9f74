//! Shadow hierarchy synthesis.
//!
//! A subclass stylesheet must declare every style and nested style its base
//! declares, so that each accessor of the base has an override returning the
//! subclass proxy. Missing ones are injected as empty shadows that inherit
//! every value from the base.

use crate::ir::{Property, Style};
use crate::registry::{Registry, StylesheetId};

pub(crate) fn normalize(registry: &mut Registry, id: StylesheetId) {
    let Some(base_id) = registry.superclass(id) else {
        return;
    };
    let base = registry.sheet(base_id).clone();
    let sheet = registry.sheet_mut(id);
    let mut injected = 0;

    for base_style in &base.styles {
        match sheet.styles.iter_mut().find(|style| style.name == base_style.name) {
            Some(style) => injected += shadow_nested(style, base_style),
            None => {
                let mut shadow = base_style.shadow();
                shadow.belongs_to = Some(sheet.name.clone());
                shadow.extends_stylesheet = Some(base.name.clone());
                sheet.styles.push(shadow);
                injected += 1;
            }
        }
    }

    if let Some(base_animator) = &base.animator {
        match &mut sheet.animator {
            Some(animator) if animator.name == base_animator.name => {
                injected += shadow_nested(animator, base_animator);
            }
            Some(_) => {}
            None => {
                let mut shadow = base_animator.shadow();
                shadow.belongs_to = Some(sheet.name.clone());
                sheet.animator = Some(shadow);
                injected += 1;
            }
        }
    }

    if injected > 0 {
        log::debug!("injected {} shadow styles into {}", injected, sheet.name);
    }
    registry.reindex(id);
}

/// Adds shadows for nested styles of `base` missing from `style`.
fn shadow_nested(style: &mut Style, base: &Style) -> usize {
    let mut injected = 0;
    for base_nested in base.nested_styles() {
        let existing = style.properties.iter().position(|property| {
            property.as_style().is_some_and(|nested| nested.name == base_nested.name)
        });
        if let Some(index) = existing {
            if let Some(nested) = style.properties[index].as_style_mut() {
                injected += shadow_nested(nested, base_nested);
            }
        } else if style.property(&base_nested.name).is_none() {
            let mut shadow = base_nested.shadow();
            shadow.nested_in = Some(style.name.clone());
            shadow.belongs_to = style.belongs_to.clone();
            style.properties.push(Property::style(shadow));
            injected += 1;
        }
    }
    injected
}
