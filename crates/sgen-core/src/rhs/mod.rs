//! Right-hand side values.
//!
//! Every property leaf in a stylesheet is an [`RhsValue`]. Scalars come from
//! YAML directly (`12`, `true`); strings are parsed with a small call
//! language:
//!
//! ```yaml
//! Button:
//!   tint: color(#0078D4)
//!   title: font(System-semibold, headline)
//!   insets: edgeInsets(8, 12, 8, 12)
//!   highlighted: $Palette.accent
//!   style: enum(ButtonStyle.primary)
//! ```
//!
//! Parsing happens in two steps. The string is tokenized once and parsed into
//! a syntax tree ([`syntax::Expr`]); the call name is then mapped to a
//! [`Keyword`] with a single match and handed to the matching constructor.
//!
//! Each value knows its Swift type ([`RhsValue::swift_type`]) and how to print
//! itself as a Swift expression ([`RhsValue::to_swift`]).

pub mod animation;
pub mod color;
pub mod font;
pub mod lexer;
pub mod syntax;

use std::fmt::Write;

pub use animation::{AnimationValue, KeyFrame, RepeatCount, TimingFunction};
pub use color::Color;
pub use font::Font;

use crate::condition::{self, Condition};
use crate::error::RhsError;
use crate::util::{float_literal, has_unit_suffix, parse_number, swift_identifier};
use syntax::{Arg, Expr};

/// Namespace holding generated enum and option set definitions.
pub const ENUMS: &str = "S";

/// Enum case that is always declared first.
const ENUM_CASE_NONE: &str = "none";

/// Recognized call names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Font,
    Color,
    NamedColor,
    Image,
    Icon,
    Redirect,
    Point,
    Size,
    Rect,
    EdgeInsets,
    RepeatCount,
    TimingFunction,
    AnimationValue,
    KeyFrame,
    EnumDef,
    Enum,
    OptionDef,
    Option,
    Call,
}

impl Keyword {
    /// Looks up a call name. The first letter may be capitalized; the returned
    /// flag says whether it was.
    pub fn from_name(name: &str) -> Option<(Keyword, bool)> {
        let capitalized = name.chars().next().is_some_and(char::is_uppercase);
        let keyword = match crate::util::first_lowercased(name).as_str() {
            "font" => Keyword::Font,
            "color" => Keyword::Color,
            "namedColor" => Keyword::NamedColor,
            "image" => Keyword::Image,
            "icon" => Keyword::Icon,
            "redirect" => Keyword::Redirect,
            "point" => Keyword::Point,
            "size" => Keyword::Size,
            "rect" => Keyword::Rect,
            "edgeInsets" | "insets" => Keyword::EdgeInsets,
            "repeatCount" => Keyword::RepeatCount,
            "timingFunction" => Keyword::TimingFunction,
            "animationValue" => Keyword::AnimationValue,
            "keyFrame" => Keyword::KeyFrame,
            "enumDef" => Keyword::EnumDef,
            "enum" => Keyword::Enum,
            "optionDef" => Keyword::OptionDef,
            "option" => Keyword::Option,
            "call" => Keyword::Call,
            _ => return None,
        };
        Some((keyword, capitalized))
    }
}

/// Context a value string is parsed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext<'a> {
    /// Key of the property being parsed. Names the type of `EnumDef(...)`
    /// and `OptionDef(...)`.
    pub key: Option<&'a str>,
    /// Configured custom text styles accepted by `font(...)`.
    pub typography: &'a [String],
}

/// A redirect to another property, `$Style.property` or
/// `$Style.Nested.property`.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    /// The path as written, without `$`.
    pub path: String,
    /// Filled in by resolution.
    pub resolved: Option<ResolvedRedirect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    /// Swift expression the property accessor is called on.
    pub access: String,
    /// Swift type of the final, non-redirect value.
    pub ty: String,
}

/// An entry of an option set definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionEntry {
    Flag(String),
    /// `all:[top|bottom]`
    Composite { name: String, members: Vec<String> },
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum RhsValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Point { x: f64, y: f64 },
    Size { width: f64, height: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    EdgeInsets { top: f64, left: f64, bottom: f64, right: f64 },
    Font(Font),
    Color(Color),
    /// A color from an asset catalog.
    NamedColor(String),
    Image(String),
    Icon(String),
    Redirect(Redirect),
    /// Conditional branches, kept in evaluation order.
    Hash(Vec<(Condition, RhsValue)>),
    EnumDef { ty: String, cases: Vec<String> },
    Enum { ty: String, case: String },
    OptionDef { ty: String, entries: Vec<OptionEntry> },
    Option { ty: String, names: Vec<String> },
    TimingFunction(TimingFunction),
    KeyFrame(KeyFrame),
    AnimationValue(AnimationValue),
    RepeatCount(RepeatCount),
    Array(Vec<RhsValue>),
    /// A raw Swift expression with its declared type.
    Call { expr: String, ty: String },
}

impl RhsValue {
    /// Parses a value string.
    pub fn parse(input: &str, ctx: &ParseContext<'_>) -> Result<Self, RhsError> {
        let expr = syntax::parse_expr(input)?;
        interpret(input, &expr, ctx)
    }

    /// Builds a conditional value, ordering branches for evaluation.
    pub fn hash(mut branches: Vec<(Condition, RhsValue)>) -> Self {
        branches.sort_by(|(a, _), (b, _)| condition::branch_order(a, b));
        RhsValue::Hash(branches)
    }

    /// Enum and option set definitions are emitted once per stylesheet in
    /// the global namespace instead of as properties.
    pub fn is_global(&self) -> bool {
        matches!(self, RhsValue::EnumDef { .. } | RhsValue::OptionDef { .. })
    }

    pub fn is_hash(&self) -> bool {
        matches!(self, RhsValue::Hash(_))
    }

    pub fn as_redirect(&self) -> Option<&Redirect> {
        match self {
            RhsValue::Redirect(redirect) => Some(redirect),
            _ => None,
        }
    }

    /// The Swift type this value materializes to.
    pub fn swift_type(&self) -> String {
        match self {
            RhsValue::Int(_) => "Int".into(),
            RhsValue::Float(_) => "CGFloat".into(),
            RhsValue::Bool(_) => "Bool".into(),
            RhsValue::Point { .. } => "CGPoint".into(),
            RhsValue::Size { .. } => "CGSize".into(),
            RhsValue::Rect { .. } => "CGRect".into(),
            RhsValue::EdgeInsets { .. } => "UIEdgeInsets".into(),
            RhsValue::Font(font) => font.swift_type().into(),
            RhsValue::Color(_) | RhsValue::NamedColor(_) => "UIColor".into(),
            RhsValue::Image(_) => "UIImage".into(),
            RhsValue::Icon(_) => "IconicSymbol".into(),
            RhsValue::Redirect(redirect) => redirect
                .resolved
                .as_ref()
                .map_or_else(|| "Any".to_string(), |r| r.ty.clone()),
            RhsValue::Hash(branches) => branches
                .first()
                .map_or_else(|| "Any".to_string(), |(_, value)| value.swift_type()),
            RhsValue::EnumDef { ty, .. } | RhsValue::OptionDef { ty, .. } => ty.clone(),
            RhsValue::Enum { ty, .. } | RhsValue::Option { ty, .. } => format!("{}.{}", ENUMS, ty),
            RhsValue::TimingFunction(_) => "AnimationCurveType".into(),
            RhsValue::KeyFrame(_) => "KeyFrame".into(),
            RhsValue::AnimationValue(_) => "AnimatableProp".into(),
            RhsValue::RepeatCount(_) => "AnimationRepeatCount".into(),
            RhsValue::Array(values) => {
                let mut types = values.iter().map(RhsValue::swift_type);
                match types.next() {
                    Some(first) if types.all(|ty| ty == first) => format!("[{}]", first),
                    _ => "[Any]".into(),
                }
            }
            RhsValue::Call { ty, .. } => ty.clone(),
        }
    }

    /// Distinct types of the branches of a conditional value.
    pub fn branch_types(&self) -> Vec<String> {
        let RhsValue::Hash(branches) = self else {
            return vec![self.swift_type()];
        };
        let mut types: Vec<String> = Vec::new();
        for (_, value) in branches {
            let ty = value.swift_type();
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        types
    }

    /// Visits every redirect in this value, including inside arrays and
    /// conditional branches.
    pub fn try_for_each_redirect<E>(
        &mut self,
        f: &mut impl FnMut(&mut Redirect) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            RhsValue::Redirect(redirect) => f(redirect),
            RhsValue::Array(values) => {
                values.iter_mut().try_for_each(|v| v.try_for_each_redirect(f))
            }
            RhsValue::Hash(branches) => branches
                .iter_mut()
                .try_for_each(|(_, v)| v.try_for_each_redirect(f)),
            _ => Ok(()),
        }
    }

    /// Renders the value as a Swift expression.
    ///
    /// `import_manager` is the stylesheet manager of an imported framework;
    /// `call(...)` expressions starting with `S` are routed through it.
    /// Conditional values render their first branch; use
    /// [`RhsValue::to_swift_return`] to render the full branch chain.
    pub fn to_swift(&self, import_manager: Option<&str>) -> String {
        match self {
            RhsValue::Int(value) => format!("Int({})", value),
            RhsValue::Float(value) => format!("CGFloat({})", float_literal(*value)),
            RhsValue::Bool(value) => value.to_string(),
            RhsValue::Point { x, y } => {
                format!("CGPoint(x: {}, y: {})", float_literal(*x), float_literal(*y))
            }
            RhsValue::Size { width, height } => format!(
                "CGSize(width: {}, height: {})",
                float_literal(*width),
                float_literal(*height)
            ),
            RhsValue::Rect { x, y, width, height } => format!(
                "CGRect(x: {}, y: {}, width: {}, height: {})",
                float_literal(*x),
                float_literal(*y),
                float_literal(*width),
                float_literal(*height)
            ),
            RhsValue::EdgeInsets { top, left, bottom, right } => format!(
                "UIEdgeInsets(top: {}, left: {}, bottom: {}, right: {})",
                float_literal(*top),
                float_literal(*left),
                float_literal(*bottom),
                float_literal(*right)
            ),
            RhsValue::Font(font) => font.to_swift(ENUMS),
            RhsValue::Color(color) => color.to_swift(),
            RhsValue::NamedColor(name) => format!("UIColor(named: \"{}\")!", name),
            RhsValue::Image(name) => format!("UIImage(named: \"{}\")!", name),
            RhsValue::Icon(name) => format!("IconicSymbol.{}", name),
            RhsValue::Redirect(redirect) => {
                let access = redirect
                    .resolved
                    .as_ref()
                    .map_or(redirect.path.as_str(), |r| r.access.as_str());
                format!("{}Property(traitCollection)", access)
            }
            RhsValue::Hash(branches) => branches
                .first()
                .map_or_else(String::new, |(_, value)| value.to_swift(import_manager)),
            RhsValue::EnumDef { ty, .. } | RhsValue::OptionDef { ty, .. } => {
                format!("{}.{}", ENUMS, ty)
            }
            RhsValue::Enum { ty, case } => {
                format!("{}.{}.{}", ENUMS, ty, swift_identifier(case))
            }
            RhsValue::Option { ty, names } => {
                let members = names
                    .iter()
                    .map(|name| format!("{}.{}.{}", ENUMS, ty, name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", members)
            }
            RhsValue::TimingFunction(function) => function.to_swift(),
            RhsValue::KeyFrame(frame) => frame.to_swift(),
            RhsValue::AnimationValue(value) => value.to_swift(),
            RhsValue::RepeatCount(count) => count.to_swift(),
            RhsValue::Array(values) => {
                let items = values
                    .iter()
                    .map(|value| value.to_swift(import_manager))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", items)
            }
            RhsValue::Call { expr, .. } => match (import_manager, expr.strip_prefix('S')) {
                (Some(manager), Some(rest)) => format!("{}.S{}", manager, rest),
                _ => expr.clone(),
            },
        }
    }

    /// Renders the body of a property accessor: `return` statements, one per
    /// conditional branch, each line prefixed with `indent`.
    ///
    /// The default branch renders last as an unconditional return. Without
    /// one, the final branch doubles as the fallback.
    pub fn to_swift_return(&self, indent: &str, import_manager: Option<&str>) -> String {
        let RhsValue::Hash(branches) = self else {
            return format!("{}return {}\n", indent, self.to_swift(import_manager));
        };
        let mut out = String::new();
        for (condition, value) in branches.iter().filter(|(c, _)| !c.is_default()) {
            let _ = writeln!(
                out,
                "{}if {} {{ return {} }}",
                indent,
                condition.to_swift(),
                value.to_swift(import_manager)
            );
        }
        let fallback = branches
            .iter()
            .find(|(c, _)| c.is_default())
            .or_else(|| branches.last());
        if let Some((_, value)) = fallback {
            let _ = writeln!(out, "{}return {}", indent, value.to_swift(import_manager));
        }
        out
    }

    /// Renders an enum or option set definition. Other values render nothing.
    ///
    /// `public` marks members public; inside a `public extension` it is
    /// implied and must be left off.
    pub fn global_declaration(&self, objc: bool, public: bool) -> Option<String> {
        let visibility = if public { "public " } else { "" };
        let mut out = String::new();
        match self {
            RhsValue::EnumDef { ty, cases } => {
                let objc_prefix = if objc { "@objc " } else { "" };
                let raw = if objc { ": Int" } else { "" };
                let _ = writeln!(out, "{}{}enum {}{} {{", objc_prefix, visibility, ty, raw);
                let mut sorted: Vec<&String> = cases.iter().collect();
                sorted.sort();
                sorted.dedup();
                if sorted.iter().any(|c| *c == ENUM_CASE_NONE) {
                    let init = if objc { " = -1" } else { "" };
                    let _ = writeln!(out, "\tcase {}{}", ENUM_CASE_NONE, init);
                }
                for (index, case) in sorted.iter().filter(|c| **c != ENUM_CASE_NONE).enumerate() {
                    let init = if objc && index == 0 { " = 0" } else { "" };
                    let _ = writeln!(out, "\tcase {}{}", swift_identifier(case), init);
                }
                out.push_str("}\n");
            }
            RhsValue::OptionDef { ty, entries } => {
                let _ = writeln!(out, "{}struct {}: OptionSet, Hashable {{", visibility, ty);
                let _ = writeln!(out, "\t{}let rawValue: Int", visibility);
                let _ = writeln!(
                    out,
                    "\t{}init(rawValue: Int) {{ self.rawValue = rawValue }}\n",
                    visibility
                );
                let mut bit = 0;
                for entry in entries {
                    match entry {
                        OptionEntry::Flag(name) => {
                            let _ = writeln!(
                                out,
                                "\t{}static let {} = {}(rawValue: 1 << {})",
                                visibility, name, ty, bit
                            );
                            bit += 1;
                        }
                        OptionEntry::Composite { name, members } => {
                            let members = members
                                .iter()
                                .map(|m| format!(".{}", m))
                                .collect::<Vec<_>>()
                                .join(", ");
                            let _ = writeln!(
                                out,
                                "\t{}static let {}: {} = [{}]",
                                visibility, name, ty, members
                            );
                        }
                    }
                }
                out.push_str("}\n");
            }
            _ => return None,
        }
        Some(out)
    }
}

fn interpret(source: &str, expr: &Expr<'_>, ctx: &ParseContext<'_>) -> Result<RhsValue, RhsError> {
    match expr {
        Expr::Word(word) => scalar(word),
        Expr::Str(text) => Err(RhsError::malformed(
            source,
            format!("quoted string `{}` is not a value", text),
        )),
        Expr::Color(hex) => Ok(RhsValue::Color(Color::parse(&format!("#{}", hex))?)),
        Expr::Redirect(path) => Ok(redirect(path)),
        Expr::List(items) => items
            .iter()
            .map(|item| interpret(source, item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(RhsValue::Array),
        Expr::Call { name, args } => {
            let (keyword, capitalized) = Keyword::from_name(name).ok_or_else(|| {
                RhsError::malformed(source, format!("unknown value form `{}`", name))
            })?;
            call(source, keyword, capitalized, args, ctx)
        }
    }
}

/// Interprets a bare word: a boolean or a number.
fn scalar(word: &str) -> Result<RhsValue, RhsError> {
    match word {
        "true" => return Ok(RhsValue::Bool(true)),
        "false" => return Ok(RhsValue::Bool(false)),
        _ => {}
    }
    let number = parse_number(word)
        .ok_or_else(|| RhsError::malformed(word, "not a number, boolean or value form"))?;
    if has_unit_suffix(word) || word.contains('.') {
        Ok(RhsValue::Float(number))
    } else {
        word.trim()
            .parse::<i64>()
            .map(RhsValue::Int)
            .or(Ok(RhsValue::Float(number)))
    }
}

fn redirect(path: &str) -> RhsValue {
    RhsValue::Redirect(Redirect {
        path: path.trim().to_string(),
        resolved: None,
    })
}

fn call(
    source: &str,
    keyword: Keyword,
    capitalized: bool,
    args: &[Arg<'_>],
    ctx: &ParseContext<'_>,
) -> Result<RhsValue, RhsError> {
    let malformed = |reason: &str| RhsError::malformed(source, reason);
    let arity = |expected: usize, form: &str| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(RhsError::malformed(
                source,
                format!("expected {} argument(s), format: {}", expected, form),
            ))
        }
    };

    match keyword {
        Keyword::Font => {
            let texts = texts(source, args)?;
            Font::from_args(source, &texts, ctx.typography).map(RhsValue::Font)
        }
        Keyword::Color => {
            arity(1, "color(#rrggbb)")?;
            let hex = match &args[0].value {
                Expr::Color(hex) | Expr::Word(hex) | Expr::Str(hex) => hex.trim_start_matches('#'),
                _ => return Err(malformed("expected hex digits")),
            };
            Ok(RhsValue::Color(Color::parse(&format!("#{}", hex))?))
        }
        Keyword::NamedColor => {
            arity(1, "namedColor(Name)")?;
            Ok(RhsValue::NamedColor(text(source, &args[0])?.to_string()))
        }
        Keyword::Image => {
            arity(1, "image(Name)")?;
            Ok(RhsValue::Image(text(source, &args[0])?.to_string()))
        }
        Keyword::Icon => {
            arity(1, "icon(name)")?;
            Ok(RhsValue::Icon(text(source, &args[0])?.to_string()))
        }
        Keyword::Redirect => {
            arity(1, "redirect(Style.property)")?;
            match &args[0].value {
                Expr::Redirect(path) => Ok(redirect(path)),
                _ => Ok(redirect(text(source, &args[0])?)),
            }
        }
        Keyword::Point => {
            let [x, y] = numbers::<2>(source, args, "point(x, y)")?;
            Ok(RhsValue::Point { x, y })
        }
        Keyword::Size => {
            let [width, height] = numbers::<2>(source, args, "size(width, height)")?;
            Ok(RhsValue::Size { width, height })
        }
        Keyword::Rect => {
            let [x, y, width, height] = numbers::<4>(source, args, "rect(x, y, width, height)")?;
            Ok(RhsValue::Rect { x, y, width, height })
        }
        Keyword::EdgeInsets => {
            let [top, left, bottom, right] =
                numbers::<4>(source, args, "edgeInsets(top, left, bottom, right)")?;
            Ok(RhsValue::EdgeInsets { top, left, bottom, right })
        }
        Keyword::RepeatCount => {
            arity(1, "repeatCount(N|infinite)")?;
            RepeatCount::parse(text(source, &args[0])?).map(RhsValue::RepeatCount)
        }
        Keyword::TimingFunction => {
            let texts = texts(source, args)?;
            TimingFunction::from_args(source, &texts).map(RhsValue::TimingFunction)
        }
        Keyword::AnimationValue => animation_value(source, args).map(RhsValue::AnimationValue),
        Keyword::KeyFrame => {
            let mut frame = KeyFrame {
                relative_start_time: 0.0,
                relative_duration: None,
                values: Vec::new(),
            };
            for arg in args {
                match arg.label {
                    Some("relativeStartTime") => frame.relative_start_time = number(source, arg)?,
                    Some("relativeDuration") => {
                        frame.relative_duration = Some(number(source, arg)?)
                    }
                    Some("animationValues") => {
                        let Expr::List(items) = &arg.value else {
                            return Err(malformed("animationValues must be a list"));
                        };
                        for item in items {
                            match item {
                                Expr::Call { name, args }
                                    if Keyword::from_name(name).map(|(k, _)| k)
                                        == Some(Keyword::AnimationValue) =>
                                {
                                    frame.values.push(animation_value(source, args)?);
                                }
                                _ => {
                                    return Err(malformed(
                                        "animationValues items must be animationValue(...)",
                                    ))
                                }
                            }
                        }
                    }
                    _ => return Err(malformed("unknown keyFrame argument")),
                }
            }
            Ok(RhsValue::KeyFrame(frame))
        }
        Keyword::EnumDef => {
            let (ty, rest) = definition_type(source, capitalized, args, ctx)?;
            let cases = rest
                .iter()
                .map(|arg| text(source, arg).map(str::to_string))
                .collect::<Result<Vec<_>, _>>()?;
            if cases.is_empty() {
                return Err(malformed("enumDef needs at least one case"));
            }
            Ok(RhsValue::EnumDef { ty, cases })
        }
        Keyword::Enum => {
            arity(1, "enum(Type.value)")?;
            let (ty, case) = qualified(source, text(source, &args[0])?)?;
            Ok(RhsValue::Enum { ty, case })
        }
        Keyword::OptionDef => {
            let (ty, rest) = definition_type(source, capitalized, args, ctx)?;
            let mut entries = Vec::new();
            for arg in rest {
                match (arg.label, &arg.value) {
                    (Some(name), Expr::List(items)) => {
                        let members = items
                            .iter()
                            .map(|item| {
                                item.text()
                                    .map(str::to_string)
                                    .ok_or_else(|| malformed("option members must be names"))
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        entries.push(OptionEntry::Composite {
                            name: name.to_string(),
                            members,
                        });
                    }
                    (None, _) => entries.push(OptionEntry::Flag(text(source, arg)?.to_string())),
                    _ => return Err(malformed("composite options are written name:[a|b]")),
                }
            }
            if entries.is_empty() {
                return Err(malformed("optionDef needs at least one option"));
            }
            Ok(RhsValue::OptionDef { ty, entries })
        }
        Keyword::Option => {
            if args.is_empty() {
                return Err(malformed("format: option(Type.a, Type.b)"));
            }
            let mut ty = None;
            let mut names = Vec::new();
            for arg in args {
                let (arg_ty, name) = qualified(source, text(source, arg)?)?;
                if *ty.get_or_insert_with(|| arg_ty.clone()) != arg_ty {
                    return Err(malformed("options must share one type"));
                }
                names.push(name);
            }
            let ty = ty.unwrap_or_default();
            Ok(RhsValue::Option { ty, names })
        }
        Keyword::Call => {
            arity(2, "call(expression, Type)")?;
            Ok(RhsValue::Call {
                expr: args[0].raw.trim().to_string(),
                ty: text(source, &args[1])?.to_string(),
            })
        }
    }
}

fn text<'a>(source: &str, arg: &Arg<'a>) -> Result<&'a str, RhsError> {
    arg.value
        .text()
        .ok_or_else(|| RhsError::malformed(source, format!("expected a name, got `{}`", arg.raw)))
}

fn texts<'a>(source: &str, args: &[Arg<'a>]) -> Result<Vec<&'a str>, RhsError> {
    args.iter().map(|arg| text(source, arg)).collect()
}

fn number(source: &str, arg: &Arg<'_>) -> Result<f64, RhsError> {
    text(source, arg)
        .ok()
        .and_then(parse_number)
        .ok_or_else(|| RhsError::malformed(source, format!("`{}` is not a number", arg.raw)))
}

fn numbers<const N: usize>(
    source: &str,
    args: &[Arg<'_>],
    form: &str,
) -> Result<[f64; N], RhsError> {
    if args.len() != N {
        return Err(RhsError::malformed(
            source,
            format!("expected {} numbers, format: {}", N, form),
        ));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = number(source, arg)?;
    }
    Ok(out)
}

fn animation_value(source: &str, args: &[Arg<'_>]) -> Result<AnimationValue, RhsError> {
    let mut property = None;
    let mut from = None;
    let mut to = None;
    for arg in args {
        match arg.label {
            Some("type") => property = Some(text(source, arg)?),
            Some("from") => from = Some(number(source, arg)?),
            Some("to") => to = Some(number(source, arg)?),
            _ => {
                return Err(RhsError::malformed(
                    source,
                    "animationValue takes type:, from: and to: arguments",
                ))
            }
        }
    }
    let property =
        property.ok_or_else(|| RhsError::malformed(source, "animation value needs `type`"))?;
    AnimationValue::new(source, property, from, to)
}

/// Splits the type name off an `enumDef`/`optionDef` argument list.
///
/// Capitalized forms take the type from the property key.
fn definition_type<'s, 'a>(
    source: &str,
    capitalized: bool,
    args: &'s [Arg<'a>],
    ctx: &ParseContext<'_>,
) -> Result<(String, &'s [Arg<'a>]), RhsError> {
    if capitalized {
        if let Some(key) = ctx.key {
            return Ok((key.to_string(), args));
        }
    }
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| RhsError::malformed(source, "expected a type name"))?;
    Ok((text(source, first)?.to_string(), rest))
}

/// Splits `Type.value` (or `Outer.Type.value`) into type and value.
fn qualified(source: &str, input: &str) -> Result<(String, String), RhsError> {
    let parts: Vec<&str> = input.trim().split('.').collect();
    match parts.as_slice() {
        [ty, name] => Ok((ty.to_string(), name.to_string())),
        [outer, ty, name] => Ok((format!("{}.{}", outer, ty), name.to_string())),
        _ => Err(RhsError::malformed(
            source,
            format!("`{}` should be written Type.value", input),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<RhsValue, RhsError> {
        RhsValue::parse(input, &ParseContext::default())
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    #[test]
    fn test_numbers() {
        assert_eq!(parse("12").unwrap(), RhsValue::Int(12));
        assert_eq!(parse("12pt").unwrap(), RhsValue::Float(12.0));
        assert_eq!(parse("1.5").unwrap(), RhsValue::Float(1.5));
        assert_eq!(parse("-4dp").unwrap(), RhsValue::Float(-4.0));
        assert_eq!(parse("true").unwrap(), RhsValue::Bool(true));
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(parse("bogus(1,2)"), Err(RhsError::Malformed { .. })));
        assert!(matches!(parse("hello"), Err(RhsError::Malformed { .. })));
        assert!(matches!(parse("point(1)"), Err(RhsError::Malformed { .. })));
        assert!(matches!(parse("color(#12)"), Err(RhsError::InvalidColor(_))));
    }

    // =========================================================================
    // Call forms
    // =========================================================================

    #[test]
    fn test_geometry() {
        assert_eq!(parse("point(1, 2)").unwrap(), RhsValue::Point { x: 1.0, y: 2.0 });
        assert_eq!(
            parse("Insets(1, 2, 3, 4)").unwrap(),
            RhsValue::EdgeInsets { top: 1.0, left: 2.0, bottom: 3.0, right: 4.0 }
        );
        assert_eq!(
            parse("rect(0, 0, 10pt, 20pt)").unwrap().to_swift(None),
            "CGRect(x: 0.0, y: 0.0, width: 10.0, height: 20.0)"
        );
    }

    #[test]
    fn test_color_forms() {
        let a = parse("color(0078D4)").unwrap();
        let b = parse("#0078D4").unwrap();
        let c = parse("Color(#0078D4)").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.swift_type(), "UIColor");
    }

    #[test]
    fn test_redirect_forms() {
        let value = parse("$Typography.title").unwrap();
        assert_eq!(value.as_redirect().map(|r| r.path.as_str()), Some("Typography.title"));
        assert_eq!(value.swift_type(), "Any");
        assert_eq!(parse("redirect(Typography.title)").unwrap(), value);
    }

    #[test]
    fn test_enum_definitions() {
        let def = parse("enumDef(Alignment, right, left, none, default)").unwrap();
        let declaration = def.global_declaration(false, true).unwrap();
        assert_eq!(
            declaration,
            "public enum Alignment {\n\tcase none\n\tcase `default`\n\tcase left\n\tcase right\n}\n"
        );
        let objc = def.global_declaration(true, true).unwrap();
        assert!(objc.starts_with("@objc public enum Alignment: Int {\n\tcase none = -1\n\tcase `default` = 0\n"));
    }

    #[test]
    fn test_capitalized_definition_takes_key() {
        let ctx = ParseContext {
            key: Some("Edge"),
            typography: &[],
        };
        let def = RhsValue::parse("OptionDef(top, bottom, all:[top|bottom])", &ctx).unwrap();
        assert_eq!(def.swift_type(), "Edge");
        let declaration = def.global_declaration(false, false).unwrap();
        assert!(declaration.contains("\tstatic let top = Edge(rawValue: 1 << 0)\n"));
        assert!(declaration.contains("\tstatic let bottom = Edge(rawValue: 1 << 1)\n"));
        assert!(declaration.contains("\tstatic let all: Edge = [.top, .bottom]\n"));
    }

    #[test]
    fn test_enum_and_option_values() {
        let value = parse("enum(Alignment.left)").unwrap();
        assert_eq!(value.swift_type(), "S.Alignment");
        assert_eq!(value.to_swift(None), "S.Alignment.left");

        let option = parse("option(Edge.top, Edge.bottom)").unwrap();
        assert_eq!(option.to_swift(None), "[S.Edge.top, S.Edge.bottom]");
        assert!(parse("option(Edge.top, Corner.left)").is_err());
    }

    #[test]
    fn test_call_passthrough() {
        let value = parse("call(S.Colors.tint(), UIColor)").unwrap();
        assert_eq!(value.swift_type(), "UIColor");
        assert_eq!(value.to_swift(None), "S.Colors.tint()");
        assert_eq!(
            value.to_swift(Some("FluentStylesheetManager")),
            "FluentStylesheetManager.S.Colors.tint()"
        );
    }

    #[test]
    fn test_keyframe() {
        let value = parse(
            "keyFrame(relativeStartTime: 0.2, relativeDuration: 0.5, animationValues: [animationValue(type: opacity, from: 0, to: 1)])",
        )
        .unwrap();
        assert_eq!(
            value.to_swift(None),
            "KeyFrame(relativeStartTime: 0.2, relativeDuration: 0.5, values: [.opacity(from: CGFloat(0.0), to: CGFloat(1.0))])"
        );
    }

    // =========================================================================
    // Types
    // =========================================================================

    #[test]
    fn test_array_types() {
        assert_eq!(parse("[1, 2]").unwrap().swift_type(), "[Int]");
        assert_eq!(parse("[1, 2pt]").unwrap().swift_type(), "[Any]");
        assert_eq!(RhsValue::Array(vec![]).swift_type(), "[Any]");
    }

    #[test]
    fn test_hash_rendering() {
        let value = RhsValue::hash(vec![
            (Condition::parse("default").unwrap(), RhsValue::Int(1)),
            (Condition::parse("idiom = pad").unwrap(), RhsValue::Int(3)),
            (Condition::parse("width > 320").unwrap(), RhsValue::Int(2)),
        ]);
        assert_eq!(value.swift_type(), "Int");
        let body = value.to_swift_return("\t", None);
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0]
            .starts_with("\tif UIDevice.current.userInterfaceIdiom == UIUserInterfaceIdiom.pad"));
        assert!(lines[1].contains("UIScreen.main.bounds.size.width > 320.0"));
        assert_eq!(lines[2], "\treturn Int(1)");
    }

    #[test]
    fn test_branch_types() {
        let value = RhsValue::hash(vec![
            (Condition::parse("default").unwrap(), RhsValue::Int(1)),
            (Condition::parse("width > 3").unwrap(), RhsValue::Bool(true)),
        ]);
        assert_eq!(value.branch_types(), vec!["Bool".to_string(), "Int".to_string()]);
    }
}
