use std::fmt;
use std::str::FromStr;

use crate::error::ScalarOpError;

// datatypes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    C64,
    C128,
}

/// The three disjoint type sets operators reason about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeClass {
    Discrete,
    Floating,
    Complex,
}

impl DType {
    pub const ALL: [DType; 13] = [
        DType::Bool,
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::U8,
        DType::U16,
        DType::U32,
        DType::U64,
        DType::F32,
        DType::F64,
        DType::C64,
        DType::C128,
    ];

    pub fn class(self) -> TypeClass {
        match self {
            DType::F32 | DType::F64 => TypeClass::Floating,
            DType::C64 | DType::C128 => TypeClass::Complex,
            _ => TypeClass::Discrete,
        }
    }

    pub fn is_float(self) -> bool {
        self.class() == TypeClass::Floating
    }

    pub fn is_complex(self) -> bool {
        self.class() == TypeClass::Complex
    }

    pub fn is_discrete(self) -> bool {
        self.class() == TypeClass::Discrete
    }

    pub fn is_signed(self) -> bool {
        matches!(self, DType::I8 | DType::I16 | DType::I32 | DType::I64)
    }

    pub fn bits(self) -> u32 {
        match self {
            DType::Bool | DType::U8 | DType::I8 => 8,
            DType::U16 | DType::I16 => 16,
            DType::U32 | DType::I32 | DType::F32 => 32,
            DType::U64 | DType::I64 | DType::F64 | DType::C64 => 64,
            DType::C128 => 128,
        }
    }

    pub fn size(self) -> usize {
        match self {
            DType::Bool => 1,
            _ => (self.bits() / 8) as usize,
        }
    }

    /// C spelling used by the code generator. Complex types have none.
    pub fn c_name(self) -> Option<&'static str> {
        let name = match self {
            DType::Bool => "unsigned char",
            DType::I8 => "signed char",
            DType::I16 => "short",
            DType::I32 => "int",
            DType::I64 => "long long",
            DType::U8 => "unsigned char",
            DType::U16 => "unsigned short",
            DType::U32 => "unsigned int",
            DType::U64 => "unsigned long long",
            DType::F32 => "float",
            DType::F64 => "double",
            DType::C64 | DType::C128 => return None,
        };
        Some(name)
    }

    /// Narrowest float able to hold every value of a real type.
    fn float_bits(self) -> u32 {
        match self {
            DType::F32 => 32,
            DType::F64 => 64,
            DType::Bool | DType::I8 | DType::I16 | DType::U8 | DType::U16 => 32,
            DType::C64 => 32,
            DType::C128 => 64,
            _ => 64,
        }
    }

    fn float_of_bits(bits: u32) -> DType {
        if bits <= 32 { DType::F32 } else { DType::F64 }
    }

    fn complex_of_component(bits: u32) -> DType {
        if bits <= 32 { DType::C64 } else { DType::C128 }
    }

    fn int_of_bits(bits: u32, signed: bool) -> DType {
        match (bits, signed) {
            (8, true) => DType::I8,
            (16, true) => DType::I16,
            (32, true) => DType::I32,
            (64, true) => DType::I64,
            (8, false) => DType::U8,
            (16, false) => DType::U16,
            (32, false) => DType::U32,
            _ => DType::U64,
        }
    }

    /// Joins two types into the narrowest type that represents both.
    pub fn upcast(self, other: DType) -> DType {
        if self == other {
            return self;
        }
        match (self, other) {
            (DType::Bool, t) | (t, DType::Bool) => t,
            (a, b) if a.is_complex() || b.is_complex() => {
                DType::complex_of_component(a.float_bits().max(b.float_bits()))
            }
            (a, b) if a.is_float() || b.is_float() => {
                DType::float_of_bits(a.float_bits().max(b.float_bits()))
            }
            (a, b) if a.is_signed() == b.is_signed() => {
                DType::int_of_bits(a.bits().max(b.bits()), a.is_signed())
            }
            (a, b) => {
                let (signed, unsigned) = if a.is_signed() { (a, b) } else { (b, a) };
                if signed.bits() > unsigned.bits() {
                    signed
                } else if unsigned.bits() < 64 {
                    DType::int_of_bits(unsigned.bits() * 2, true)
                } else {
                    DType::F64
                }
            }
        }
    }

    /// Folds `upcast` over a non-empty list of types.
    pub fn upcast_all(types: &[DType]) -> Option<DType> {
        let (first, rest) = types.split_first()?;
        Some(rest.iter().fold(*first, |acc, t| acc.upcast(*t)))
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::C64 => "complex64",
            DType::C128 => "complex128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DType {
    type Err = ScalarOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| ScalarOpError::UnknownType(s.to_string()))
    }
}
