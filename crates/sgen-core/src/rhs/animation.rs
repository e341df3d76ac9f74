//! Animation values: timing curves, repeat counts and keyframes.

use crate::error::RhsError;
use crate::util::{float_literal, parse_number};

const CURVES: [&str; 4] = ["easeIn", "easeInOut", "easeOut", "linear"];

/// Properties an [`AnimationValue`] can animate.
pub const ANIMATABLE: [&str; 7] = [
    "opacity", "frame", "size", "width", "height", "left", "rotate",
];

#[derive(Debug, Clone, PartialEq)]
pub enum TimingFunction {
    /// One of the UIKit animation curves.
    Named(String),
    /// A cubic bezier given by two control points.
    ControlPoints([f64; 4]),
}

impl TimingFunction {
    pub fn from_args(source: &str, args: &[&str]) -> Result<Self, RhsError> {
        match args {
            [name] => {
                let name = name.trim();
                if CURVES.contains(&name) {
                    Ok(TimingFunction::Named(name.to_string()))
                } else {
                    Err(RhsError::malformed(
                        source,
                        format!(
                            "unknown timing function `{}`, expected one of {}",
                            name,
                            CURVES.join(", ")
                        ),
                    ))
                }
            }
            [c1, c2, c3, c4] => {
                let mut points = [0.0; 4];
                for (slot, arg) in points.iter_mut().zip([c1, c2, c3, c4]) {
                    *slot = parse_number(arg).ok_or_else(|| {
                        RhsError::malformed(
                            source,
                            format!("control point `{}` is not a number", arg),
                        )
                    })?;
                }
                Ok(TimingFunction::ControlPoints(points))
            }
            _ => Err(RhsError::malformed(
                source,
                "expected a curve name or four control points",
            )),
        }
    }

    pub fn to_swift(&self) -> String {
        match self {
            TimingFunction::Named(name) => format!(".native(UIView.AnimationCurve.{})", name),
            TimingFunction::ControlPoints([c1, c2, c3, c4]) => format!(
                ".timingParameters(UICubicTimingParameters(controlPoint1: CGPoint(x: {}, y: {}), controlPoint2: CGPoint(x: {}, y: {})))",
                float_literal(*c1),
                float_literal(*c2),
                float_literal(*c3),
                float_literal(*c4)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    Count(u32),
    Infinite,
}

impl RepeatCount {
    pub fn parse(input: &str) -> Result<Self, RhsError> {
        let trimmed = input.trim();
        if trimmed == "infinite" {
            return Ok(RepeatCount::Infinite);
        }
        trimmed
            .parse::<u32>()
            .map(RepeatCount::Count)
            .map_err(|_| RhsError::malformed(input, "repeat count must be a number or `infinite`"))
    }

    pub fn to_swift(self) -> String {
        match self {
            RepeatCount::Count(count) => format!("AnimationRepeatCount.count({})", count),
            RepeatCount::Infinite => "AnimationRepeatCount.infinite".to_string(),
        }
    }
}

/// The animated change of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationValue {
    pub property: String,
    pub from: Option<f64>,
    pub to: f64,
}

impl AnimationValue {
    pub fn new(
        source: &str,
        property: &str,
        from: Option<f64>,
        to: Option<f64>,
    ) -> Result<Self, RhsError> {
        if !ANIMATABLE.contains(&property) {
            return Err(RhsError::malformed(
                source,
                format!(
                    "`{}` is not animatable, expected one of {}",
                    property,
                    ANIMATABLE.join(", ")
                ),
            ));
        }
        let to = to.ok_or_else(|| RhsError::malformed(source, "animation value needs `to`"))?;
        Ok(AnimationValue {
            property: property.to_string(),
            from,
            to,
        })
    }

    pub fn to_swift(&self) -> String {
        let from = self
            .from
            .map_or_else(|| "nil".to_string(), |from| format!("CGFloat({})", float_literal(from)));
        format!(
            ".{}(from: {}, to: CGFloat({}))",
            self.property,
            from,
            float_literal(self.to)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
    pub relative_start_time: f64,
    pub relative_duration: Option<f64>,
    pub values: Vec<AnimationValue>,
}

impl KeyFrame {
    pub fn to_swift(&self) -> String {
        let duration = match self.relative_duration {
            Some(duration) if duration > 0.0 => float_literal(duration),
            _ => "nil".to_string(),
        };
        let values = self
            .values
            .iter()
            .map(AnimationValue::to_swift)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "KeyFrame(relativeStartTime: {}, relativeDuration: {}, values: [{}])",
            float_literal(self.relative_start_time),
            duration,
            values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_functions() {
        assert_eq!(
            TimingFunction::from_args("", &["easeIn"]).unwrap().to_swift(),
            ".native(UIView.AnimationCurve.easeIn)"
        );
        assert_eq!(
            TimingFunction::from_args("", &["0.1", "0", "0.2", "1"]).unwrap(),
            TimingFunction::ControlPoints([0.1, 0.0, 0.2, 1.0])
        );
        assert!(TimingFunction::from_args("", &["bouncy"]).is_err());
        assert!(TimingFunction::from_args("", &["1", "2"]).is_err());
    }

    #[test]
    fn test_repeat_count() {
        assert_eq!(RepeatCount::parse("3").unwrap(), RepeatCount::Count(3));
        assert_eq!(RepeatCount::parse("infinite").unwrap(), RepeatCount::Infinite);
        assert_eq!(RepeatCount::Infinite.to_swift(), "AnimationRepeatCount.infinite");
        assert!(RepeatCount::parse("often").is_err());
    }

    #[test]
    fn test_keyframe_swift() {
        let frame = KeyFrame {
            relative_start_time: 0.0,
            relative_duration: Some(0.5),
            values: vec![AnimationValue::new("", "opacity", None, Some(1.0)).unwrap()],
        };
        assert_eq!(
            frame.to_swift(),
            "KeyFrame(relativeStartTime: 0.0, relativeDuration: 0.5, values: [.opacity(from: nil, to: CGFloat(1.0))])"
        );
    }

    #[test]
    fn test_animation_value_validation() {
        assert!(AnimationValue::new("", "wiggle", None, Some(1.0)).is_err());
        assert!(AnimationValue::new("", "opacity", Some(0.0), None).is_err());
    }
}
