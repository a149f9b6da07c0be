//! GGUF metadata value types.
//!
//! Header metadata arrives already parsed, but producers disagree on
//! encoding: some keep native GGUF types, others stringify everything
//! (numbers as `"4096"`, arrays as `"[0, 8, 0]"`). `coerce` folds the
//! stringified scalars back into numbers.

use std::collections::HashMap;
use std::fmt;

/// GGUF metadata value types.
#[derive(Debug, Clone, PartialEq)]
pub enum GgufValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    Bool(bool),
    String(String),
    Array(Vec<GgufValue>),
    U64(u64),
    I64(i64),
    F64(f64),
}

/// Raw header metadata keyed by full GGUF key (e.g. `llama.block_count`).
pub type RawMetadata = HashMap<String, GgufValue>;

impl fmt::Display for GgufValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            // Tokenizer vocabularies run to hundreds of thousands of entries
            Self::Array(arr) if arr.len() > 10 => {
                write!(f, "[Array with {} elements]", arr.len())
            }
            Self::Array(arr) => {
                let items: Vec<String> = arr.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl GgufValue {
    /// Non-negative integer view of the value.
    ///
    /// Floats qualify only when they hold a whole number.
    #[must_use]
    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            Self::I8(v) if *v >= 0 => Some(*v as u64),
            Self::I16(v) if *v >= 0 => Some(*v as u64),
            Self::I32(v) if *v >= 0 => Some(*v as u64),
            Self::I64(v) if *v >= 0 => Some(*v as u64),
            Self::F32(_) | Self::F64(_) => self
                .as_f64()
                .filter(|f| *f >= 0.0 && f.trunc() == *f && *f <= u64::MAX as f64)
                .map(|f| f as u64),
            _ => None,
        }
    }

    /// Real-valued view of any numeric value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            Self::U8(v) => Some(f64::from(*v)),
            Self::U16(v) => Some(f64::from(*v)),
            Self::U32(v) => Some(f64::from(*v)),
            Self::U64(v) => Some(*v as f64),
            Self::I8(v) => Some(f64::from(*v)),
            Self::I16(v) => Some(f64::from(*v)),
            Self::I32(v) => Some(f64::from(*v)),
            Self::I64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean view; integers count as flags (non-zero is `true`).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            other => other.as_u64().map(|v| v != 0),
        }
    }

    /// Try to get the value as a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an array slice.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Fold a stringified number back into a numeric value.
    ///
    /// Strings with a decimal point parse as `F64`, others as integers
    /// (`U64`, or `I64` when negative). Anything that does not parse, and
    /// every non-string value, is returned unchanged.
    #[must_use]
    pub fn coerce(&self) -> Self {
        let Self::String(raw) = self else {
            return self.clone();
        };
        let text = raw.trim();
        let parsed = if text.contains('.') {
            text.parse::<f64>().ok().map(Self::F64)
        } else {
            text.parse::<u64>()
                .map(Self::U64)
                .or_else(|_| text.parse::<i64>().map(Self::I64))
                .ok()
        };
        parsed.unwrap_or_else(|| self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> GgufValue {
        GgufValue::String(text.to_string())
    }

    #[test]
    fn test_as_u64() {
        assert_eq!(GgufValue::U32(4096).as_u64(), Some(4096));
        assert_eq!(GgufValue::I32(-1).as_u64(), None);
        assert_eq!(GgufValue::F64(4096.0).as_u64(), Some(4096));
        assert_eq!(GgufValue::F32(2.5).as_u64(), None);
        assert_eq!(s("4096").as_u64(), None);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(GgufValue::Bool(true).as_bool(), Some(true));
        assert_eq!(GgufValue::U8(0).as_bool(), Some(false));
        assert_eq!(GgufValue::I32(1).as_bool(), Some(true));
        assert_eq!(s("true").as_bool(), None);
    }

    #[test]
    fn test_coerce_integers_and_reals() {
        assert_eq!(s("32").coerce(), GgufValue::U64(32));
        assert_eq!(s(" 32 ").coerce(), GgufValue::U64(32));
        assert_eq!(s("-3").coerce(), GgufValue::I64(-3));
        assert_eq!(s("10000.0").coerce(), GgufValue::F64(10_000.0));
        assert_eq!(s("1e5").coerce(), s("1e5"));
    }

    #[test]
    fn test_coerce_keeps_unparseable() {
        assert_eq!(s("[0, 8, 0]").coerce(), s("[0, 8, 0]"));
        assert_eq!(s("llama").coerce(), s("llama"));
        assert_eq!(s("1.2.3").coerce(), s("1.2.3"));
        assert_eq!(GgufValue::U32(7).coerce(), GgufValue::U32(7));
    }

    #[test]
    fn test_display_truncates_large_arrays() {
        assert_eq!(GgufValue::U32(42).to_string(), "42");
        let small = GgufValue::Array(vec![GgufValue::U8(0), GgufValue::U8(8)]);
        assert_eq!(small.to_string(), "[0, 8]");
        let large = GgufValue::Array(vec![GgufValue::U8(0); 100]);
        assert!(large.to_string().contains("100 elements"));
    }
}
