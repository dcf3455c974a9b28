//! Arguments: a single input word viewed through every type it could be.
//!
//! An [`Argument`] is built once per word and records which of the int,
//! float, bool and string interpretations are valid. Overload resolution asks
//! each argument whether it can be coerced to a parameter type and at what
//! cost.
//!
//! ## Coercion rules
//!
//! | Parameter | Accepts |
//! |-----------|---------|
//! | `string`  | any word, quoted or not |
//! | `int`     | unquoted words that parse as `i64` |
//! | `float`   | unquoted words that parse as a finite `f64`, **or** any valid int (widening) |
//! | `bool`    | unquoted `true` / `false`, case-insensitive |
//!
//! A quoted (literal) word is only ever a string, even when its text would
//! parse as a number.

use crate::error::ConversionError;
use crate::value::{ParamType, Value};

/// The result of coercing an argument to a parameter type.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    /// The coerced value.
    pub value: Value,
    /// Cost of the coercion (lower is better).
    pub cost: u32,
}

impl Coercion {
    /// Argument matched the parameter type directly.
    pub const COST_EXACT: u32 = 0;
    /// Integer text widened to a float parameter.
    pub const COST_INT_TO_FLOAT: u32 = 1;

    fn exact(value: Value) -> Self {
        Self {
            value,
            cost: Self::COST_EXACT,
        }
    }

    /// Whether the coercion needed no conversion.
    pub fn is_exact(&self) -> bool {
        self.cost == Self::COST_EXACT
    }
}

/// One input word with its candidate interpretations.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    text: String,
    literal: bool,
    int: Option<i64>,
    float: Option<f64>,
    boolean: Option<bool>,
}

impl Argument {
    /// Build an argument from a word's text and its literal flag.
    pub fn new(text: impl Into<String>, literal: bool) -> Self {
        let text = text.into();
        if literal {
            return Self {
                text,
                literal,
                int: None,
                float: None,
                boolean: None,
            };
        }

        let int = text.parse::<i64>().ok();
        let float = parse_float(&text);
        let boolean = parse_bool(&text);
        Self {
            text,
            literal,
            int,
            float,
            boolean,
        }
    }

    /// The word's text with quotes and escapes removed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the word was quoted.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// The integer interpretation, if valid.
    pub fn as_int(&self) -> Option<i64> {
        self.int
    }

    /// The float interpretation, if valid (integers widen).
    pub fn as_float(&self) -> Option<f64> {
        self.float.or(self.int.map(|v| v as f64))
    }

    /// The bool interpretation, if valid.
    pub fn as_bool(&self) -> Option<bool> {
        self.boolean
    }

    /// Check whether this argument can be coerced to `ty`.
    pub fn can_coerce(&self, ty: ParamType) -> bool {
        self.coerce(ty).is_ok()
    }

    /// Coerce this argument to `ty`, reporting the cost of the conversion.
    pub fn coerce(&self, ty: ParamType) -> Result<Coercion, ConversionError> {
        match ty {
            ParamType::String => Ok(Coercion::exact(Value::String(self.text.clone()))),
            _ if self.literal => Err(ConversionError::LiteralNotString {
                text: self.text.clone(),
            }),
            ParamType::Int => self
                .int
                .map(|v| Coercion::exact(Value::Int(v)))
                .ok_or_else(|| self.unparsable(ty)),
            ParamType::Float => {
                if let Some(v) = self.int {
                    // Integer text is also valid float text; record the widening.
                    Ok(Coercion {
                        value: Value::Float(v as f64),
                        cost: Coercion::COST_INT_TO_FLOAT,
                    })
                } else {
                    self.float
                        .map(|v| Coercion::exact(Value::Float(v)))
                        .ok_or_else(|| self.unparsable(ty))
                }
            }
            ParamType::Bool => self
                .boolean
                .map(|v| Coercion::exact(Value::Bool(v)))
                .ok_or_else(|| self.unparsable(ty)),
        }
    }

    /// Coerce to `ty`, discarding the cost.
    pub fn to_value(&self, ty: ParamType) -> Result<Value, ConversionError> {
        self.coerce(ty).map(|c| c.value)
    }

    fn unparsable(&self, ty: ParamType) -> ConversionError {
        ConversionError::Unparsable {
            text: self.text.clone(),
            target_type: ty.name(),
        }
    }
}

fn parse_float(text: &str) -> Option<f64> {
    // Rust accepts "inf" and "nan"; a console argument should not.
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_word_is_int_float_and_string() {
        let arg = Argument::new("5", false);
        assert_eq!(arg.as_int(), Some(5));
        assert_eq!(arg.as_float(), Some(5.0));
        assert_eq!(arg.as_bool(), None);
        assert!(arg.can_coerce(ParamType::String));
    }

    #[test]
    fn int_to_float_is_a_widening() {
        let arg = Argument::new("3", false);
        let exact = arg.coerce(ParamType::Int).unwrap();
        let widened = arg.coerce(ParamType::Float).unwrap();
        assert!(exact.is_exact());
        assert_eq!(widened.value, Value::Float(3.0));
        assert_eq!(widened.cost, Coercion::COST_INT_TO_FLOAT);
    }

    #[test]
    fn fractional_word_is_not_int() {
        let arg = Argument::new("2.5", false);
        assert!(!arg.can_coerce(ParamType::Int));
        assert_eq!(arg.to_value(ParamType::Float).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn bool_is_case_insensitive() {
        assert_eq!(Argument::new("TRUE", false).as_bool(), Some(true));
        assert_eq!(Argument::new("False", false).as_bool(), Some(false));
        assert_eq!(Argument::new("1", false).as_bool(), None);
    }

    #[test]
    fn literal_is_string_only() {
        let arg = Argument::new("5", true);
        assert!(arg.is_literal());
        assert!(!arg.can_coerce(ParamType::Int));
        assert!(!arg.can_coerce(ParamType::Float));
        assert!(matches!(
            arg.coerce(ParamType::Int),
            Err(ConversionError::LiteralNotString { .. })
        ));
        assert_eq!(
            arg.to_value(ParamType::String).unwrap(),
            Value::String("5".into())
        );
    }

    #[test]
    fn non_finite_floats_rejected() {
        assert!(!Argument::new("inf", false).can_coerce(ParamType::Float));
        assert!(!Argument::new("NaN", false).can_coerce(ParamType::Float));
    }

    #[test]
    fn unparsable_reports_target() {
        let err = Argument::new("abc", false)
            .coerce(ParamType::Bool)
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::Unparsable {
                text: "abc".into(),
                target_type: "bool",
            }
        );
    }
}
