//! Type promotion policies
//!
//! A policy maps the operand types of an operator to the type its result is
//! computed and stored in.

use crate::config::float_x;
use crate::dtype::DType;
use crate::error::{Result, ScalarOpError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    /// Discrete operands become the default float; the result is the join.
    UpgradeToFloat,
    /// Like `UpgradeToFloat`, but complex operands are rejected.
    UpgradeToFloatNoComplex,
    /// Always `float64`.
    UpgradeToFloat64,
    /// Result type equals the operand type.
    Unchanged,
}

impl Promotion {
    pub fn name(self) -> &'static str {
        match self {
            Promotion::UpgradeToFloat => "upgrade_to_float",
            Promotion::UpgradeToFloatNoComplex => "upgrade_to_float_no_complex",
            Promotion::UpgradeToFloat64 => "upgrade_to_float64",
            Promotion::Unchanged => "unchanged",
        }
    }

    pub fn promote(self, types: &[DType]) -> Result<DType> {
        if types.is_empty() {
            return Err(ScalarOpError::Arity {
                op: self.name(),
                expected: 1,
                got: 0,
            });
        }
        match self {
            Promotion::UpgradeToFloat => Ok(upgrade_to_float(types)),
            Promotion::UpgradeToFloatNoComplex => {
                if let Some(t) = types.iter().find(|t| t.is_complex()) {
                    return Err(ScalarOpError::unsupported(
                        self.name(),
                        *t,
                        "complex operands are not supported",
                    ));
                }
                Ok(upgrade_to_float(types))
            }
            Promotion::UpgradeToFloat64 => Ok(DType::F64),
            Promotion::Unchanged => Ok(DType::upcast_all(types).unwrap_or(types[0])),
        }
    }
}

fn upgrade_to_float(types: &[DType]) -> DType {
    let default = float_x();
    types
        .iter()
        .map(|t| if t.is_discrete() { default } else { *t })
        .reduce(DType::upcast)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const POLICIES: [Promotion; 4] = [
        Promotion::UpgradeToFloat,
        Promotion::UpgradeToFloatNoComplex,
        Promotion::UpgradeToFloat64,
        Promotion::Unchanged,
    ];

    fn any_dtype() -> impl Strategy<Value = DType> {
        proptest::sample::select(DType::ALL.to_vec())
    }

    #[rstest]
    #[case(&[DType::F32], DType::F32)]
    #[case(&[DType::F32, DType::F64], DType::F64)]
    #[case(&[DType::C64], DType::C64)]
    #[case(&[DType::C64, DType::F64], DType::C128)]
    fn test_upgrade_to_float_floats(#[case] types: &[DType], #[case] expected: DType) {
        assert_eq!(Promotion::UpgradeToFloat.promote(types).unwrap(), expected);
    }

    #[test]
    fn test_discrete_becomes_default_float() {
        for t in [DType::Bool, DType::I8, DType::I64, DType::U64] {
            assert_eq!(Promotion::UpgradeToFloat.promote(&[t]).unwrap(), float_x());
            assert_eq!(
                Promotion::UpgradeToFloatNoComplex.promote(&[t]).unwrap(),
                float_x()
            );
        }
    }

    #[test]
    fn test_no_complex_rejects_complex() {
        let err = Promotion::UpgradeToFloatNoComplex
            .promote(&[DType::F32, DType::C128])
            .unwrap_err();
        assert!(matches!(
            err,
            ScalarOpError::UnsupportedType {
                dtype: DType::C128,
                ..
            }
        ));
    }

    #[test]
    fn test_float64_policy() {
        assert_eq!(
            Promotion::UpgradeToFloat64.promote(&[DType::F32, DType::I8]).unwrap(),
            DType::F64
        );
    }

    #[test]
    fn test_empty_input_fails() {
        for policy in POLICIES {
            assert!(policy.promote(&[]).is_err());
        }
    }

    proptest! {
        #[test]
        fn prop_promotion_is_idempotent(types in proptest::collection::vec(any_dtype(), 1..4)) {
            for policy in POLICIES {
                if let Ok(once) = policy.promote(&types) {
                    prop_assert_eq!(policy.promote(&[once]).unwrap(), once);
                }
            }
        }

        #[test]
        fn prop_promotion_is_deterministic(types in proptest::collection::vec(any_dtype(), 1..4)) {
            for policy in POLICIES {
                let a = policy.promote(&types).ok();
                let b = policy.promote(&types).ok();
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn prop_float_policies_never_return_discrete(types in proptest::collection::vec(any_dtype(), 1..4)) {
            for policy in [Promotion::UpgradeToFloat, Promotion::UpgradeToFloatNoComplex, Promotion::UpgradeToFloat64] {
                if let Ok(t) = policy.promote(&types) {
                    prop_assert!(!t.is_discrete());
                }
            }
        }
    }
}
