//! Small string helpers shared by the parser and the generator.

/// Formats a number the way Swift prints floating point literals.
///
/// Integral values keep a trailing `.0` so the literal stays a float.
pub fn float_literal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Parses a structurally numeric string, optionally suffixed by `pt`, `dp` or `f`.
///
/// Surrounding quotes and whitespace are ignored. Words such as `inf` or
/// `nan`, which `f64::from_str` would accept, are rejected.
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let body = strip_unit_suffix(trimmed);
    if !is_numeric(body) {
        return None;
    }
    body.parse::<f64>().ok()
}

/// Returns true when the string carries a `pt`, `dp` or `f` unit suffix.
pub fn has_unit_suffix(input: &str) -> bool {
    let trimmed = input.trim();
    strip_unit_suffix(trimmed).len() != trimmed.len()
}

fn strip_unit_suffix(input: &str) -> &str {
    input
        .strip_suffix("pt")
        .or_else(|| input.strip_suffix("dp"))
        .or_else(|| input.strip_suffix('f'))
        .unwrap_or(input)
        .trim_end()
}

fn is_numeric(input: &str) -> bool {
    let digits = input
        .strip_prefix('-')
        .or_else(|| input.strip_prefix('+'))
        .unwrap_or(input);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

pub fn first_lowercased(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn first_uppercased(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wraps Swift keywords that are commonly used as names in backticks.
pub fn swift_identifier(name: &str) -> String {
    match name {
        "default" | "class" | "struct" | "enum" | "protocol" | "self" | "Type" | "in" | "is"
        | "as" | "func" | "let" | "var" | "return" => format!("`{}`", name),
        _ => name.to_string(),
    }
}
