//! Property accessors.
//!
//! Every leaf property becomes a `<key>Property(_:)` function evaluating the
//! conditional branches for a trait collection, plus a stored override and
//! a computed variable for direct access. Overrides only replace the
//! function; the storage lives in the class that declared the property
//! first.

use std::fmt::Write;

use crate::ir::Property;
use crate::rhs::RhsValue;
use crate::util::swift_identifier;

const TRAIT_COLLECTION: &str =
    "_ traitCollection: UITraitCollection? = UIScreen.main.traitCollection";

pub(crate) fn write_property(
    out: &mut String,
    property: &Property,
    value: &RhsValue,
    indent: &str,
    import_manager: Option<&str>,
) {
    let key = &property.key;
    let ty = value.swift_type();
    let visibility = if property.is_overridable { "open" } else { "public" };
    let modifier = if property.is_override { "override " } else { "" };

    let _ = writeln!(out, "\n{}//MARK: {}", indent, key);
    if !property.is_override {
        let _ = writeln!(out, "{}public var _{}: {}?", indent, key, ty);
    }
    let _ = writeln!(
        out,
        "{}{}{} func {}Property({}) -> {} {{",
        indent, modifier, visibility, key, TRAIT_COLLECTION, ty
    );
    let _ = writeln!(out, "{}\tif let override = _{} {{ return override }}", indent, key);
    let body_indent = format!("{}\t", indent);
    out.push_str(&value.to_swift_return(&body_indent, import_manager));
    let _ = writeln!(out, "{}}}", indent);

    if !property.is_override {
        let _ = writeln!(out, "{}public var {}: {} {{", indent, swift_identifier(key), ty);
        let _ = writeln!(out, "{}\tget {{ return self.{}Property() }}", indent, key);
        let _ = writeln!(out, "{}\tset {{ _{} = newValue }}", indent, key);
        let _ = writeln!(out, "{}}}", indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    fn render(property: &Property) -> String {
        let mut out = String::new();
        write_property(&mut out, property, property.as_rhs().unwrap(), "\t", None);
        out
    }

    #[test]
    fn test_plain_property() {
        let out = render(&Property::rhs("cornerRadius", RhsValue::Float(4.0)));
        assert!(out.contains("\t//MARK: cornerRadius\n"));
        assert!(out.contains("\tpublic var _cornerRadius: CGFloat?\n"));
        assert!(out.contains(
            "\tpublic func cornerRadiusProperty(_ traitCollection: UITraitCollection? = UIScreen.main.traitCollection) -> CGFloat {\n"
        ));
        assert!(out.contains("\t\tif let override = _cornerRadius { return override }\n"));
        assert!(out.contains("\t\treturn CGFloat(4.0)\n"));
        assert!(out.contains("\tpublic var cornerRadius: CGFloat {\n"));
        assert!(out.contains("\t\tset { _cornerRadius = newValue }\n"));
    }

    #[test]
    fn test_override_has_no_storage() {
        let mut property = Property::rhs("a", RhsValue::Int(2));
        property.is_override = true;
        property.is_overridable = true;
        let out = render(&property);
        assert!(out.contains("override open func aProperty("));
        assert!(!out.contains("public var _a"));
        assert!(!out.contains("public var a:"));
    }

    #[test]
    fn test_conditional_branches() {
        let value = RhsValue::hash(vec![
            (Condition::parse("default").unwrap(), RhsValue::Int(1)),
            (Condition::parse("idiom = pad").unwrap(), RhsValue::Int(2)),
        ]);
        let out = render(&Property::rhs("columns", value));
        let branch = out.rfind("\t\tif ").unwrap();
        let fallback = out.find("\t\treturn Int(1)").unwrap();
        assert!(out[branch..].contains("return Int(2) }"));
        assert!(branch < fallback);
    }

    #[test]
    fn test_keyword_names_are_escaped() {
        let out = render(&Property::rhs("default", RhsValue::Bool(true)));
        assert!(out.contains("public var `default`: Bool {"));
        assert!(out.contains("func defaultProperty("));
    }
}
