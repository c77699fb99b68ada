use std::fmt;

use crate::dtype::DType;

/// A single typed value, one case per [`DType`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    C64(f32, f32),
    C128(f64, f64),
}

macro_rules! impl_scalar_dtype {
    ($($variant:ident),*) => {
        impl Scalar {
            pub fn dtype(&self) -> DType {
                match self {
                    Scalar::Bool(_) => DType::Bool,
                    Scalar::C64(..) => DType::C64,
                    Scalar::C128(..) => DType::C128,
                    $(
                        Scalar::$variant(_) => DType::$variant,
                    )*
                }
            }
        }
    };
}

impl_scalar_dtype!(I8, I16, I32, I64, U8, U16, U32, U64, F32, F64);

impl Scalar {
    /// Real value as `f64`. `None` for complex values.
    pub fn to_f64(&self) -> Option<f64> {
        let v = match *self {
            Scalar::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Scalar::I8(v) => v as f64,
            Scalar::I16(v) => v as f64,
            Scalar::I32(v) => v as f64,
            Scalar::I64(v) => v as f64,
            Scalar::U8(v) => v as f64,
            Scalar::U16(v) => v as f64,
            Scalar::U32(v) => v as f64,
            Scalar::U64(v) => v as f64,
            Scalar::F32(v) => v as f64,
            Scalar::F64(v) => v,
            Scalar::C64(..) | Scalar::C128(..) => return None,
        };
        Some(v)
    }

    /// Builds a value of `dtype` from a real number, rounding and saturating
    /// like an `as` cast.
    pub fn from_f64(value: f64, dtype: DType) -> Scalar {
        match dtype {
            DType::Bool => Scalar::Bool(value != 0.0),
            DType::I8 => Scalar::I8(value as i8),
            DType::I16 => Scalar::I16(value as i16),
            DType::I32 => Scalar::I32(value as i32),
            DType::I64 => Scalar::I64(value as i64),
            DType::U8 => Scalar::U8(value as u8),
            DType::U16 => Scalar::U16(value as u16),
            DType::U32 => Scalar::U32(value as u32),
            DType::U64 => Scalar::U64(value as u64),
            DType::F32 => Scalar::F32(value as f32),
            DType::F64 => Scalar::F64(value),
            DType::C64 => Scalar::C64(value as f32, 0.0),
            DType::C128 => Scalar::C128(value, 0.0),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::F64(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::F32(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::I64(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::I32(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Bool(n) => write!(f, "{n}"),
            Scalar::I8(n) => write!(f, "{n}"),
            Scalar::I16(n) => write!(f, "{n}"),
            Scalar::I32(n) => write!(f, "{n}"),
            Scalar::I64(n) => write!(f, "{n}"),
            Scalar::U8(n) => write!(f, "{n}"),
            Scalar::U16(n) => write!(f, "{n}"),
            Scalar::U32(n) => write!(f, "{n}"),
            Scalar::U64(n) => write!(f, "{n}"),
            Scalar::F32(n) => write!(f, "{n}f"),
            Scalar::F64(n) => write!(f, "{n}"),
            Scalar::C64(re, im) => write!(f, "({re}{im:+}j)"),
            Scalar::C128(re, im) => write!(f, "({re}{im:+}j)"),
        }
    }
}
