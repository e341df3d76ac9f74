//! Textual rewrites applied to stylesheet sources before YAML parsing.
//!
//! Two shorthands cannot survive a YAML parser untouched:
//!
//! - key prefixes `AN_` (animator), `AP_` (appearance proxy) and `@`, which
//!   are expanded to their `__` markers;
//! - bare hex colors (`tint: #0078D4`), which YAML reads as comments. They
//!   become `color(0078D4)`.
//!
//! Everything else, including quoted `"#0078D4"` values, is left to the Rhs
//! parser.

/// Rewrites a stylesheet source line by line.
pub fn preprocess(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        out.push_str(&preprocess_line(line));
        out.push('\n');
    }
    out
}

fn preprocess_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return line.to_string();
    }
    let indent = &line[..line.len() - trimmed.len()];

    let (marker, item) = match trimmed.strip_prefix("- ") {
        Some(item) => ("- ", item),
        None => ("", trimmed),
    };

    match split_key(item) {
        Some((key, value)) => format!(
            "{}{}{}:{}",
            indent,
            marker,
            expand_key(key),
            rewrite_value(value)
        ),
        None => format!("{}{}{}", indent, marker, rewrite_value(item)),
    }
}

/// Splits `key: value` at the first unquoted `:` followed by a space or the
/// end of the line.
fn split_key(item: &str) -> Option<(&str, &str)> {
    let mut quote = None;
    for (index, c) in item.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, ':') => {
                let rest = &item[index + 1..];
                if rest.is_empty() || rest.starts_with(' ') {
                    return Some((&item[..index], rest));
                }
            }
            (None, '#') if index > 0 && item[..index].ends_with(' ') => return None,
            _ => {}
        }
    }
    None
}

fn expand_key(key: &str) -> String {
    key.replace("AN_", "__animator ")
        .replace("AP_", "__appearance_proxy")
        .replace('@', "__")
}

/// Wraps a bare `#hex` value in `color(...)`, keeping any trailing comment.
fn rewrite_value(value: &str) -> String {
    let trimmed = value.trim_start();
    let Some(rest) = trimmed.strip_prefix('#') else {
        return value.to_string();
    };
    let hex_len = rest.chars().take_while(char::is_ascii_hexdigit).count();
    let tail = &rest[hex_len..];
    if !matches!(hex_len, 3 | 5 | 6 | 8) || !(tail.is_empty() || tail.starts_with(' ')) {
        return value.to_string();
    }
    let leading = &value[..value.len() - trimmed.len()];
    format!("{}color({}){}", leading, &rest[..hex_len], tail)
}
