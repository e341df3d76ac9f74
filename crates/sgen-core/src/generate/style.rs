//! Appearance proxy classes.
//!
//! A style renders as an accessor on its owner (the stylesheet class for
//! top-level styles, the enclosing proxy for nested ones) followed by the
//! proxy class itself. Nested proxy classes are declared inside their
//! parent's class so inheritance paths read `Sheet.Parent.Child`.

use std::fmt::Write;

use crate::ir::{PropertyValue, Style};
use crate::settings::Settings;
use crate::util::{first_uppercased, swift_identifier};

use super::property::write_property;

pub(crate) struct StyleWriter<'a> {
    pub(crate) settings: &'a Settings,
    /// Type of the base stylesheet class, as seen from generated code.
    pub(crate) base_type: &'a str,
    /// Name of the stylesheet being written.
    pub(crate) sheet: &'a str,
}

impl StyleWriter<'_> {
    /// Writes a top-level style (or the animator) at class-body depth.
    pub(crate) fn write_style(&self, out: &mut String, style: &Style) {
        self.write(out, style, 1, self.sheet);
    }

    fn write(&self, out: &mut String, style: &Style, depth: usize, objc_prefix: &str) {
        let indent = "\t".repeat(depth);
        let class_name = style.class_name();
        let open = style.is_overridable || style.is_nested_overridable;
        let visibility = if open { "open" } else { "public" };
        let modifier = if style.is_override { "override " } else { "" };
        let proxy = if depth == 1 { "{ return self }" } else { "mainProxy" };
        let accessor_type = style.accessor_type.as_deref().unwrap_or(&class_name);

        let _ = writeln!(out, "\n{}//MARK: - {}", indent, style.name);
        let _ = writeln!(
            out,
            "{}{}{} var {}: {} {{",
            indent,
            modifier,
            visibility,
            swift_identifier(&style.name),
            accessor_type
        );
        let _ = writeln!(out, "{}\treturn {}(proxy: {})", indent, class_name, proxy);
        let _ = writeln!(out, "{}}}", indent);

        let objc_name = format!("{}{}", objc_prefix, first_uppercased(style.class_stem()));
        let attributes = if self.settings.objc {
            format!("@objc({}) @objcMembers ", objc_name)
        } else {
            String::new()
        };
        let superclass = match (&style.inherits, self.settings.objc) {
            (Some(inherits), _) => format!(": {}", inherits),
            (None, true) => ": NSObject".to_string(),
            (None, false) => String::new(),
        };
        let _ = writeln!(
            out,
            "{}{}{} class {}{} {{",
            indent, attributes, visibility, class_name, superclass
        );

        if style.inherits.is_none() {
            self.write_init(out, &indent);
        }

        let inner = format!("{}\t", indent);
        let import_manager = self.settings.import_manager();
        for property in &style.properties {
            match &property.value {
                PropertyValue::Rhs(value) if value.is_global() => {}
                PropertyValue::Rhs(value) => {
                    write_property(out, property, value, &inner, import_manager)
                }
                PropertyValue::Style(nested) => self.write(out, nested, depth + 1, &objc_name),
            }
        }

        if style.is_applicable {
            write_apply(out, style, &inner);
        }
        let _ = writeln!(out, "{}}}", indent);
    }

    /// Root proxies keep a handle on the stylesheet that vends them, so
    /// redirects resolve against the current theme.
    fn write_init(&self, out: &mut String, indent: &str) {
        let _ = writeln!(out, "{}\tpublic let mainProxy: () -> {}", indent, self.base_type);
        let _ = writeln!(
            out,
            "{}\tpublic init(proxy: @escaping () -> {}) {{",
            indent, self.base_type
        );
        let _ = writeln!(out, "{}\t\tself.mainProxy = proxy", indent);
        if self.settings.objc {
            let _ = writeln!(out, "{}\t\tsuper.init()", indent);
        }
        let _ = writeln!(out, "{}\t}}", indent);
    }
}

/// `apply(view:)` assigns every leaf value to the matching view property;
/// `layer_cornerRadius` assigns `view.layer.cornerRadius`.
fn write_apply(out: &mut String, style: &Style, indent: &str) {
    let leaves: Vec<&str> = style
        .values()
        .filter(|(_, value)| !value.is_global())
        .map(|(key, _)| key)
        .collect();
    if style.is_apply_override && leaves.is_empty() {
        return;
    }

    let modifier = if style.is_apply_override { "override " } else { "" };
    let _ = writeln!(
        out,
        "\n{}{}public func apply(view: {}) {{",
        indent, modifier, style.view_class
    );
    if style.is_apply_override {
        let _ = writeln!(out, "{}\tsuper.apply(view: view)", indent);
    }
    for key in leaves {
        let _ = writeln!(
            out,
            "{}\tview.{} = self.{}",
            indent,
            key.replace('_', "."),
            swift_identifier(key)
        );
    }
    let _ = writeln!(out, "{}}}", indent);
}
