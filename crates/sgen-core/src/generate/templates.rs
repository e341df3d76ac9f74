//! Embedded Swift scaffolding templates.
//!
//! Blocks with little logic (file header, manager, theme, stylesheet class
//! shell) are kept as MiniJinja templates next to the crate sources and
//! compiled into the binary.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::GeneratorError;

pub(crate) const HEADER: &str = "header";
pub(crate) const MANAGER: &str = "manager";
pub(crate) const THEME: &str = "theme";
pub(crate) const THEME_ENUM: &str = "theme_enum";
pub(crate) const STYLESHEET: &str = "stylesheet";
pub(crate) const PROTOCOL: &str = "protocol";
pub(crate) const FONT: &str = "font";
pub(crate) const ANIMATOR: &str = "animator";
pub(crate) const VIEW_EXTENSION: &str = "view_extension";

const SOURCES: [(&str, &str); 9] = [
    (HEADER, include_str!("../../templates/header.swift.j2")),
    (MANAGER, include_str!("../../templates/manager.swift.j2")),
    (THEME, include_str!("../../templates/theme.swift.j2")),
    (THEME_ENUM, include_str!("../../templates/theme_enum.swift.j2")),
    (STYLESHEET, include_str!("../../templates/stylesheet.swift.j2")),
    (PROTOCOL, include_str!("../../templates/protocol.swift.j2")),
    (FONT, include_str!("../../templates/font.swift.j2")),
    (ANIMATOR, include_str!("../../templates/animator.swift.j2")),
    (VIEW_EXTENSION, include_str!("../../templates/view_extension.swift.j2")),
];

/// The compiled template set.
pub(crate) struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub(crate) fn new() -> Result<Self, GeneratorError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        for (name, source) in SOURCES {
            env.add_template(name, source)?;
        }
        Ok(Templates { env })
    }

    pub(crate) fn render<S: Serialize>(
        &self,
        name: &str,
        ctx: S,
    ) -> Result<String, GeneratorError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}
