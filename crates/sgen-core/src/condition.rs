//! Trait conditions used as keys of conditional values.
//!
//! A condition is a conjunction of comparisons between a screen or trait
//! metric and a constant or symbolic token:
//!
//! ```yaml
//! padding:
//!   "width >= 600 and idiom = pad": 24
//!   "horizontal = compact": 12
//!   default: 8
//! ```
//!
//! Parsing normalizes the raw string first: quote characters are removed,
//! everything is lowercased, the two-character operators `==`, `!=`, `<=`,
//! `>=` are replaced by single symbols and whitespace collapses to single
//! spaces, none around operators. `"Width >= 600"` becomes `width≥600`. The
//! normalized string is then split on the literal substring `and`.
//!
//! Any conjunct containing `default` makes the condition a tautology. Such
//! conditions are always tested last (see [`branch_order`]).
//!
//! # Example
//!
//! ```rust
//! use sgen_core::condition::{Condition, Lhs, Operator};
//!
//! let condition = Condition::parse("width >= 600 and idiom == pad").unwrap();
//! assert_eq!(condition.expressions().len(), 2);
//! assert_eq!(condition.expressions()[0].lhs(), Lhs::Width);
//! assert_eq!(condition.expressions()[0].operator(), Operator::GreaterThanOrEqual);
//! assert_eq!(
//!     condition.to_swift(),
//!     "UIScreen.main.bounds.size.width >= 600.0 && UIDevice.current.userInterfaceIdiom == UIUserInterfaceIdiom.pad"
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ConditionError;
use crate::util::float_literal;

const DEFAULT_TOKEN: &str = "default";
const CONJUNCTION: &str = "and";
const OPERATOR_CHARS: [char; 6] = ['=', '≠', '<', '≤', '>', '≥'];

/// Left-hand side of an expression: the metric being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lhs {
    /// Screen width in the fixed coordinate space.
    FixedWidth,
    /// Screen height in the fixed coordinate space.
    FixedHeight,
    /// Screen width in the current orientation.
    Width,
    /// Screen height in the current orientation.
    Height,
    /// Horizontal size class.
    Horizontal,
    /// Vertical size class.
    Vertical,
    /// Device idiom (phone, pad).
    Idiom,
    /// Preferred content size category.
    ContentSize,
    /// Placeholder for tautologies.
    Unspecified,
}

impl Lhs {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "fixedwidth" => Some(Lhs::FixedWidth),
            "fixedheight" => Some(Lhs::FixedHeight),
            "width" => Some(Lhs::Width),
            "height" => Some(Lhs::Height),
            "horizontal" => Some(Lhs::Horizontal),
            "vertical" => Some(Lhs::Vertical),
            "idiom" => Some(Lhs::Idiom),
            "contentsize" | "category" => Some(Lhs::ContentSize),
            _ => None,
        }
    }

    fn to_swift(self) -> &'static str {
        match self {
            Lhs::FixedWidth => "UIScreen.main.fixedCoordinateSpace.bounds.size.width",
            Lhs::FixedHeight => "UIScreen.main.fixedCoordinateSpace.bounds.size.height",
            Lhs::Width => "UIScreen.main.bounds.size.width",
            Lhs::Height => "UIScreen.main.bounds.size.height",
            Lhs::Horizontal => {
                "(traitCollection?.horizontalSizeClass ?? UIUserInterfaceSizeClass.unspecified)"
            }
            Lhs::Vertical => {
                "(traitCollection?.verticalSizeClass ?? UIUserInterfaceSizeClass.unspecified)"
            }
            Lhs::Idiom => "UIDevice.current.userInterfaceIdiom",
            Lhs::ContentSize => "Application.preferredContentSizeCategory()",
            Lhs::Unspecified => "true",
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=` or `==`.
    Equal,
    /// `≠` or `!=`.
    NotEqual,
    /// `<`.
    LessThan,
    /// `≤` or `<=`.
    LessThanOrEqual,
    /// `>`.
    GreaterThan,
    /// `≥` or `>=`.
    GreaterThanOrEqual,
    /// Placeholder for tautologies.
    Unspecified,
}

impl Operator {
    /// Operators in detection order.
    pub const ALL: [Operator; 6] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
    ];

    /// The single-character symbol used in normalized condition strings.
    pub fn symbol(self) -> Option<char> {
        match self {
            Operator::Equal => Some('='),
            Operator::NotEqual => Some('≠'),
            Operator::LessThan => Some('<'),
            Operator::LessThanOrEqual => Some('≤'),
            Operator::GreaterThan => Some('>'),
            Operator::GreaterThanOrEqual => Some('≥'),
            Operator::Unspecified => None,
        }
    }

    /// The operator as written in generated Swift.
    pub fn to_swift(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Unspecified => "",
        }
    }

    /// Returns the first operator whose symbol appears in `normalized`.
    fn detect(normalized: &str) -> Operator {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol().is_some_and(|symbol| normalized.contains(symbol)))
            .unwrap_or(Operator::Unspecified)
    }
}

/// Preferred content size categories, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentSize {
    ExtraSmall,
    Small,
    Medium,
    Large,
    ExtraLarge,
    ExtraExtraLarge,
    ExtraExtraExtraLarge,
    AccessibilityMedium,
    AccessibilityLarge,
    AccessibilityExtraLarge,
    AccessibilityExtraExtraLarge,
    AccessibilityExtraExtraExtraLarge,
}

impl ContentSize {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "xs" => Some(ContentSize::ExtraSmall),
            "s" => Some(ContentSize::Small),
            "m" => Some(ContentSize::Medium),
            "l" => Some(ContentSize::Large),
            "xl" => Some(ContentSize::ExtraLarge),
            "xxl" => Some(ContentSize::ExtraExtraLarge),
            "xxxl" => Some(ContentSize::ExtraExtraExtraLarge),
            "am" => Some(ContentSize::AccessibilityMedium),
            "al" => Some(ContentSize::AccessibilityLarge),
            "axl" => Some(ContentSize::AccessibilityExtraLarge),
            "axxl" => Some(ContentSize::AccessibilityExtraExtraLarge),
            "axxxl" => Some(ContentSize::AccessibilityExtraExtraExtraLarge),
            _ => None,
        }
    }

    fn to_swift(self) -> &'static str {
        match self {
            ContentSize::ExtraSmall => ".extraSmall",
            ContentSize::Small => ".small",
            ContentSize::Medium => ".medium",
            ContentSize::Large => ".large",
            ContentSize::ExtraLarge => ".extraLarge",
            ContentSize::ExtraExtraLarge => ".extraExtraLarge",
            ContentSize::ExtraExtraExtraLarge => ".extraExtraExtraLarge",
            ContentSize::AccessibilityMedium => ".accessibilityMedium",
            ContentSize::AccessibilityLarge => ".accessibilityLarge",
            ContentSize::AccessibilityExtraLarge => ".accessibilityExtraLarge",
            ContentSize::AccessibilityExtraExtraLarge => ".accessibilityExtraExtraLarge",
            ContentSize::AccessibilityExtraExtraExtraLarge => ".accessibilityExtraExtraExtraLarge",
        }
    }
}

/// Right-hand side of an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rhs {
    Regular,
    Compact,
    FixedWidth,
    FixedHeight,
    Width,
    Height,
    Pad,
    Phone,
    /// A numeric constant.
    Constant(f64),
    ContentSize(ContentSize),
    /// Placeholder for tautologies.
    Unspecified,
}

impl Rhs {
    fn from_token(token: &str) -> Option<Self> {
        if let Some(constant) = parse_constant(token) {
            return Some(Rhs::Constant(constant));
        }
        match token {
            "regular" => Some(Rhs::Regular),
            "compact" => Some(Rhs::Compact),
            "fixedwidth" => Some(Rhs::FixedWidth),
            "fixedheight" => Some(Rhs::FixedHeight),
            "width" => Some(Rhs::Width),
            "height" => Some(Rhs::Height),
            "pad" => Some(Rhs::Pad),
            "phone" => Some(Rhs::Phone),
            other => ContentSize::from_token(other).map(Rhs::ContentSize),
        }
    }

    fn to_swift(self) -> String {
        match self {
            Rhs::Regular => "UIUserInterfaceSizeClass.regular".to_string(),
            Rhs::Compact => "UIUserInterfaceSizeClass.compact".to_string(),
            Rhs::FixedWidth => Lhs::FixedWidth.to_swift().to_string(),
            Rhs::FixedHeight => Lhs::FixedHeight.to_swift().to_string(),
            Rhs::Width => Lhs::Width.to_swift().to_string(),
            Rhs::Height => Lhs::Height.to_swift().to_string(),
            Rhs::Pad => "UIUserInterfaceIdiom.pad".to_string(),
            Rhs::Phone => "UIUserInterfaceIdiom.phone".to_string(),
            Rhs::Constant(value) => float_literal(value),
            Rhs::ContentSize(size) => size.to_swift().to_string(),
            Rhs::Unspecified => String::new(),
        }
    }
}

/// Parses a term as a float only when it is structurally numeric.
fn parse_constant(token: &str) -> Option<f64> {
    let starts_numeric = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if !starts_numeric {
        return None;
    }
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// A single comparison: `lhs operator rhs`.
#[derive(Debug, Clone)]
pub struct Expression {
    raw: String,
    lhs: Lhs,
    operator: Operator,
    rhs: Rhs,
}

impl Expression {
    /// Parses one conjunct.
    pub fn parse(raw: &str) -> Result<Self, ConditionError> {
        let normalized = normalize(raw);
        if normalized.contains(DEFAULT_TOKEN) {
            return Ok(Expression {
                raw: normalized,
                lhs: Lhs::Unspecified,
                operator: Operator::Unspecified,
                rhs: Rhs::Unspecified,
            });
        }

        let malformed = |reason: &str| ConditionError::Malformed {
            condition: raw.trim().to_string(),
            reason: reason.to_string(),
        };

        let terms: Vec<&str> = normalized
            .split(|c| OPERATOR_CHARS.contains(&c))
            .map(str::trim)
            .collect();
        let operator = Operator::detect(&normalized);
        if terms.len() != 2 || operator == Operator::Unspecified {
            return Err(malformed("expected exactly one operator between two terms"));
        }

        let lhs = Lhs::from_token(terms[0])
            .ok_or_else(|| malformed(&format!("unknown left-hand term `{}`", terms[0])))?;
        let rhs = Rhs::from_token(terms[1])
            .ok_or_else(|| malformed(&format!("unknown right-hand term `{}`", terms[1])))?;

        Ok(Expression {
            raw: normalized,
            lhs,
            operator,
            rhs,
        })
    }

    /// The normalized source of this expression.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lhs(&self) -> Lhs {
        self.lhs
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn rhs(&self) -> Rhs {
        self.rhs
    }

    /// The numeric constant on the right-hand side, if any.
    pub fn constant(&self) -> Option<f64> {
        match self.rhs {
            Rhs::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// True for the `default` expression.
    pub fn is_tautology(&self) -> bool {
        self.lhs == Lhs::Unspecified
    }

    pub fn to_swift(&self) -> String {
        if self.is_tautology() {
            return Lhs::Unspecified.to_swift().to_string();
        }
        format!(
            "{} {} {}",
            self.lhs.to_swift(),
            self.operator.to_swift(),
            self.rhs.to_swift()
        )
    }
}

/// A conjunction of expressions.
///
/// Equality and hashing use the normalized raw string, so spellings that
/// differ only in case, quoting or spacing (`width >= 3` and `WIDTH>=3`) are
/// the same key.
#[derive(Debug, Clone)]
pub struct Condition {
    raw: String,
    expressions: Vec<Expression>,
}

impl Condition {
    /// Parses a condition string.
    ///
    /// Fails with [`ConditionError::Malformed`] if any conjunct lacks a
    /// recognized operator, has other than two terms, or uses an unknown token.
    pub fn parse(raw: &str) -> Result<Self, ConditionError> {
        let normalized = normalize(raw);
        let expressions = normalized
            .split(CONJUNCTION)
            .map(Expression::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Condition {
            raw: normalized,
            expressions,
        })
    }

    /// The normalized source of this condition.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// True when this is the fallback branch.
    pub fn is_default(&self) -> bool {
        self.raw.contains(DEFAULT_TOKEN)
    }

    /// Renders the condition as a Swift boolean expression.
    ///
    /// Conjuncts keep their source order, joined with `&&`.
    pub fn to_swift(&self) -> String {
        self.expressions
            .iter()
            .map(Expression::to_swift)
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Order in which conditional branches are tested.
///
/// Non-default conditions come first in ascending order of normalized
/// length, ties broken lexicographically; default conditions always sort
/// last. Spacing in the source does not affect the order.
pub fn branch_order(a: &Condition, b: &Condition) -> Ordering {
    a.is_default()
        .cmp(&b.is_default())
        .then_with(|| a.raw.chars().count().cmp(&b.raw.chars().count()))
        .then_with(|| a.raw.cmp(&b.raw))
}

/// Lowercases, strips quotes, folds two-character operators into their
/// single-character symbols and collapses whitespace. Operators carry no
/// surrounding spaces (`fixedwidth≥600 and idiom=pad`).
fn normalize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '"' | '\'')).collect();
    let folded = stripped
        .to_lowercase()
        .replace("!=", "≠")
        .replace("<=", "≤")
        .replace(">=", "≥")
        .replace("==", "=");

    let is_operator = |c: char| OPERATOR_CHARS.contains(&c);
    let mut normalized = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        let joins_operator = normalized.ends_with(is_operator) || word.starts_with(is_operator);
        if !normalized.is_empty() && !joins_operator {
            normalized.push(' ');
        }
        normalized.push_str(word);
    }
    normalized
}
