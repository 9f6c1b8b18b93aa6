//! Type tags and tagged values.
//!
//! Every declaration carries a [`TypeTag`]: the scalar type of its values plus
//! whether it binds one value or a sequence. Raw tokens are converted by tag,
//! so the parser never needs to know the caller's Rust type. The typed side is
//! the [`ArgValue`] trait, implemented for the supported scalars and `Vec`s of
//! them.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConvertError;

/// Closed set of scalar types a token can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    I32,
    I64,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    String,
    Path,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::Path => "path",
        }
    }

    /// Convert a single raw token into a scalar of this type.
    ///
    /// Numeric parsing ignores surrounding whitespace. Strings and paths are
    /// taken verbatim.
    pub fn convert(self, raw: &str) -> Result<Scalar, ConvertError> {
        let fail = || ConvertError {
            raw: raw.to_string(),
            target: self,
        };
        let scalar = match self {
            Self::Bool => Scalar::Bool(parse_bool(raw).ok_or_else(fail)?),
            Self::I32 => Scalar::I32(raw.trim().parse().map_err(|_| fail())?),
            Self::I64 => Scalar::I64(raw.trim().parse().map_err(|_| fail())?),
            Self::U32 => Scalar::U32(raw.trim().parse().map_err(|_| fail())?),
            Self::U64 => Scalar::U64(raw.trim().parse().map_err(|_| fail())?),
            Self::Usize => Scalar::Usize(raw.trim().parse().map_err(|_| fail())?),
            Self::F32 => Scalar::F32(raw.trim().parse().map_err(|_| fail())?),
            Self::F64 => Scalar::F64(raw.trim().parse().map_err(|_| fail())?),
            Self::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Scalar::Char(c),
                    _ => return Err(fail()),
                }
            }
            Self::String => Scalar::String(raw.to_string()),
            Self::Path => Scalar::Path(PathBuf::from(raw)),
        };
        Ok(scalar)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// The bound type of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub scalar: ScalarType,
    pub multi: bool,
}

impl TypeTag {
    pub const fn single(scalar: ScalarType) -> Self {
        Self {
            scalar,
            multi: false,
        }
    }

    pub const fn multi(scalar: ScalarType) -> Self {
        Self {
            scalar,
            multi: true,
        }
    }

    /// A single `bool` option is a presence switch: it never consumes a token.
    pub fn is_switch(self) -> bool {
        self.scalar == ScalarType::Bool && !self.multi
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multi {
            write!(f, "Vec<{}>", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Path(PathBuf),
}

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Bool(_) => ScalarType::Bool,
            Self::I32(_) => ScalarType::I32,
            Self::I64(_) => ScalarType::I64,
            Self::U32(_) => ScalarType::U32,
            Self::U64(_) => ScalarType::U64,
            Self::Usize(_) => ScalarType::Usize,
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
            Self::Char(_) => ScalarType::Char,
            Self::String(_) => ScalarType::String,
            Self::Path(_) => ScalarType::Path,
        }
    }
}

/// A bound (or default) value: one scalar, or an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Single(Scalar),
    Multi(Vec<Scalar>),
}

impl Value {
    /// Whether this value fits a declaration of type `tag`.
    pub fn matches(&self, tag: TypeTag) -> bool {
        match self {
            Self::Single(s) => !tag.multi && s.scalar_type() == tag.scalar,
            Self::Multi(items) => tag.multi && items.iter().all(|s| s.scalar_type() == tag.scalar),
        }
    }
}

/// A Rust type that can be bound to a declaration.
pub trait ArgValue: Sized {
    const TAG: TypeTag;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_arg_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl ArgValue for $ty {
            const TAG: TypeTag = TypeTag::single(ScalarType::$variant);

            fn into_value(self) -> Value {
                Value::Single(Scalar::$variant(self))
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Single(Scalar::$variant(v)) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl ArgValue for Vec<$ty> {
            const TAG: TypeTag = TypeTag::multi(ScalarType::$variant);

            fn into_value(self) -> Value {
                Value::Multi(self.into_iter().map(Scalar::$variant).collect())
            }

            fn from_value(value: &Value) -> Option<Self> {
                let Value::Multi(items) = value else {
                    return None;
                };
                items
                    .iter()
                    .map(|s| match s {
                        Scalar::$variant(v) => Some(v.clone()),
                        _ => None,
                    })
                    .collect()
            }
        }
    )*};
}

impl_arg_value! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    PathBuf => Path,
}
