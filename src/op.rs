//! The scalar operator contract
//!
//! Every catalog operator is a [`ScalarOp`]: a kind tag plus a promotion
//! policy. The kind selects the family module in [`crate::ops`] that holds its
//! numeric evaluator, differentiation rule and C emission rule.

use std::fmt;
use std::path::PathBuf;

use crate::backend::support::SupportCode;
use crate::backend::version::CacheVersion;
use crate::config::float_x;
use crate::dtype::DType;
use crate::error::{Result, ScalarOpError};
use crate::graph::{Expr, ExprOp};
use crate::ops::{activation, bessel, error_fn, gamma};
use crate::promote::Promotion;
use crate::scalar::Scalar;

// ============================================================================
// Operator kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Erf,
    Erfc,
    Erfcx,
    Erfinv,
    Erfcinv,
    Gamma,
    GammaLn,
    Psi,
    TriGamma,
    Chi2Sf,
    GammaInc,
    GammaIncC,
    GammaU,
    GammaL,
    Jv,
    J0,
    J1,
    Iv,
    I0,
    I1,
    Sigmoid,
    Softplus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    ErrorFn,
    Gamma,
    Bessel,
    Activation,
}

impl OpKind {
    pub const ALL: [OpKind; 22] = [
        OpKind::Erf,
        OpKind::Erfc,
        OpKind::Erfcx,
        OpKind::Erfinv,
        OpKind::Erfcinv,
        OpKind::Gamma,
        OpKind::GammaLn,
        OpKind::Psi,
        OpKind::TriGamma,
        OpKind::Chi2Sf,
        OpKind::GammaInc,
        OpKind::GammaIncC,
        OpKind::GammaU,
        OpKind::GammaL,
        OpKind::Jv,
        OpKind::J0,
        OpKind::J1,
        OpKind::Iv,
        OpKind::I0,
        OpKind::I1,
        OpKind::Sigmoid,
        OpKind::Softplus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OpKind::Erf => "erf",
            OpKind::Erfc => "erfc",
            OpKind::Erfcx => "erfcx",
            OpKind::Erfinv => "erfinv",
            OpKind::Erfcinv => "erfcinv",
            OpKind::Gamma => "gamma",
            OpKind::GammaLn => "gammaln",
            OpKind::Psi => "psi",
            OpKind::TriGamma => "tri_gamma",
            OpKind::Chi2Sf => "chi2sf",
            OpKind::GammaInc => "gammainc",
            OpKind::GammaIncC => "gammaincc",
            OpKind::GammaU => "gammau",
            OpKind::GammaL => "gammal",
            OpKind::Jv => "jv",
            OpKind::J0 => "j0",
            OpKind::J1 => "j1",
            OpKind::Iv => "iv",
            OpKind::I0 => "i0",
            OpKind::I1 => "i1",
            OpKind::Sigmoid => "sigmoid",
            OpKind::Softplus => "scalar_softplus",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            OpKind::Chi2Sf
            | OpKind::GammaInc
            | OpKind::GammaIncC
            | OpKind::GammaU
            | OpKind::GammaL
            | OpKind::Jv
            | OpKind::Iv => 2,
            _ => 1,
        }
    }

    pub const fn default_promotion(self) -> Promotion {
        match self {
            OpKind::Erfc | OpKind::Erfcx | OpKind::Erfinv | OpKind::Erfcinv => {
                Promotion::UpgradeToFloatNoComplex
            }
            OpKind::Chi2Sf => Promotion::UpgradeToFloat64,
            _ => Promotion::UpgradeToFloat,
        }
    }

    fn family(self) -> Family {
        match self {
            OpKind::Erf | OpKind::Erfc | OpKind::Erfcx | OpKind::Erfinv | OpKind::Erfcinv => {
                Family::ErrorFn
            }
            OpKind::Gamma
            | OpKind::GammaLn
            | OpKind::Psi
            | OpKind::TriGamma
            | OpKind::Chi2Sf
            | OpKind::GammaInc
            | OpKind::GammaIncC
            | OpKind::GammaU
            | OpKind::GammaL => Family::Gamma,
            OpKind::Jv | OpKind::J0 | OpKind::J1 | OpKind::Iv | OpKind::I0 | OpKind::I1 => {
                Family::Bessel
            }
            OpKind::Sigmoid | OpKind::Softplus => Family::Activation,
        }
    }
}

// ============================================================================
// Signature / Gradient
// ============================================================================

/// Resolved operand and result types of one operator application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub inputs: Vec<DType>,
    pub output: DType,
}

impl Signature {
    pub fn new(inputs: Vec<DType>, output: DType) -> Self {
        Self { inputs, output }
    }
}

/// Gradient of an operator output with respect to one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Defined(Expr),
    /// No closed form is provided for this input position
    NotImplemented { op: &'static str, input: usize },
}

impl Gradient {
    pub(crate) fn not_implemented(op: ScalarOp, input: usize) -> Self {
        Gradient::NotImplemented {
            op: op.name(),
            input,
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Gradient::Defined(e) => Some(e),
            Gradient::NotImplemented { .. } => None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Gradient::NotImplemented { .. })
    }

    pub fn into_result(self) -> Result<Expr> {
        match self {
            Gradient::Defined(e) => Ok(e),
            Gradient::NotImplemented { op, input } => {
                Err(ScalarOpError::NotImplementedGradient { op, input })
            }
        }
    }
}

impl From<Expr> for Gradient {
    fn from(e: Expr) -> Self {
        Gradient::Defined(e)
    }
}

// ============================================================================
// ScalarOp
// ============================================================================

/// An elementwise scalar operator.
///
/// Equality and hashing are structural over the kind and the promotion policy,
/// so two independently built `erf` operators are the same operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarOp {
    kind: OpKind,
    promotion: Promotion,
}

impl ScalarOp {
    /// Operator with its canonical promotion policy.
    pub const fn new(kind: OpKind) -> Self {
        Self {
            kind,
            promotion: kind.default_promotion(),
        }
    }

    pub const fn with_promotion(kind: OpKind, promotion: Promotion) -> Self {
        Self { kind, promotion }
    }

    /// Every catalog operator with its canonical policy.
    pub fn catalog() -> Vec<ScalarOp> {
        OpKind::ALL.iter().map(|k| ScalarOp::new(*k)).collect()
    }

    pub fn from_name(name: &str) -> Result<ScalarOp> {
        OpKind::ALL
            .iter()
            .find(|k| k.name() == name)
            .map(|k| ScalarOp::new(*k))
            .ok_or_else(|| ScalarOpError::UnknownOperator(name.to_string()))
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    pub fn promotion(&self) -> Promotion {
        self.promotion
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.arity() {
            return Err(ScalarOpError::Arity {
                op: self.name(),
                expected: self.arity(),
                got,
            });
        }
        Ok(())
    }

    pub fn output_type(&self, types: &[DType]) -> Result<DType> {
        self.check_arity(types.len())?;
        self.promotion.promote(types)
    }

    pub fn signature(&self, types: &[DType]) -> Result<Signature> {
        let output = self.output_type(types)?;
        Ok(Signature::new(types.to_vec(), output))
    }

    /// Builds the graph node `self(inputs...)`.
    pub fn apply(&self, inputs: &[Expr]) -> Result<Expr> {
        let types: Vec<DType> = inputs.iter().map(Expr::dtype).collect();
        let dtype = self.output_type(&types)?;
        Ok(Expr::from_parts(ExprOp::Apply(*self), inputs.to_vec(), dtype))
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Computes the operator on concrete values.
    ///
    /// Discrete operands are converted to the promoted float type. A float32
    /// result uses a single precision routine where one exists.
    pub fn evaluate(&self, args: &[Scalar]) -> Result<Scalar> {
        self.check_arity(args.len())?;
        if let Some(c) = args.iter().find(|a| a.dtype().is_complex()) {
            return Err(ScalarOpError::unsupported(
                self.name(),
                c.dtype(),
                "complex operands are not evaluated",
            ));
        }
        let types: Vec<DType> = args.iter().map(Scalar::dtype).collect();
        let out = self.output_type(&types)?;
        let values: Vec<f64> = args.iter().filter_map(Scalar::to_f64).collect();

        if out == DType::F32 {
            let single: Vec<f32> = values.iter().map(|v| *v as f32).collect();
            let value = match self.kind.family() {
                Family::ErrorFn => error_fn::evaluate_f32(self.kind, &single),
                Family::Gamma => gamma::evaluate_f32(self.kind, &single),
                Family::Bessel => bessel::evaluate_f32(self.kind, &single),
                Family::Activation => activation::evaluate_f32(self.kind, &single),
            };
            if let Some(v) = value {
                return Ok(Scalar::F32(v));
            }
        }

        let value = match self.kind.family() {
            Family::ErrorFn => error_fn::evaluate(self.kind, &values),
            Family::Gamma => gamma::evaluate(self.kind, &values),
            Family::Bessel => bessel::evaluate(self.kind, &values),
            Family::Activation => activation::evaluate(self.kind, &values),
        };
        Ok(Scalar::from_f64(value, out))
    }

    // ------------------------------------------------------------------------
    // Differentiation
    // ------------------------------------------------------------------------

    /// Gradients of the output with respect to each input, one per input.
    pub fn differentiate(
        &self,
        inputs: &[Expr],
        outputs: &[Expr],
        output_grads: &[Expr],
    ) -> Result<Vec<Gradient>> {
        self.check_arity(inputs.len())?;
        let (output, gz) = match (outputs, output_grads) {
            ([output], [gz]) => (output, gz),
            ([_], grads) => {
                return Err(ScalarOpError::Arity {
                    op: self.name(),
                    expected: 1,
                    got: grads.len(),
                });
            }
            (outs, _) => {
                return Err(ScalarOpError::Arity {
                    op: self.name(),
                    expected: 1,
                    got: outs.len(),
                });
            }
        };

        if let Some(c) = inputs.iter().find(|x| x.dtype().is_complex()) {
            return Err(ScalarOpError::unsupported(
                self.name(),
                c.dtype(),
                "gradient of complex operands is not defined",
            ));
        }

        if output.dtype().is_discrete() {
            return Ok(inputs
                .iter()
                .map(|x| {
                    let zero = if x.dtype().is_discrete() {
                        Expr::constant(0.0, float_x())
                    } else {
                        x.zeros_like()
                    };
                    Gradient::Defined(zero)
                })
                .collect());
        }

        match self.kind.family() {
            Family::ErrorFn => error_fn::differentiate(*self, inputs, output, gz),
            Family::Gamma => gamma::differentiate(*self, inputs, output, gz),
            Family::Bessel => bessel::differentiate(*self, inputs, output, gz),
            Family::Activation => activation::differentiate(*self, inputs, output, gz),
        }
    }

    // ------------------------------------------------------------------------
    // C emission
    // ------------------------------------------------------------------------

    /// C statement assigning `output` from the variables named in `inputs`.
    pub fn emit_c(&self, inputs: &[&str], output: &str, sig: &Signature) -> Result<String> {
        self.check_arity(inputs.len())?;
        self.check_arity(sig.inputs.len())?;
        if let Some(c) = sig
            .inputs
            .iter()
            .chain(std::iter::once(&sig.output))
            .find(|t| t.is_complex())
        {
            return Err(ScalarOpError::unsupported(
                self.name(),
                *c,
                "complex operands have no C implementation",
            ));
        }
        match self.kind.family() {
            Family::ErrorFn => error_fn::emit_c(*self, inputs, output, sig),
            Family::Gamma => gamma::emit_c(*self, inputs, output, sig),
            Family::Bessel => bessel::emit_c(*self, inputs, output, sig),
            Family::Activation => activation::emit_c(*self, inputs, output, sig),
        }
    }

    pub fn has_c_code(&self) -> bool {
        !matches!(
            self.kind,
            OpKind::Erfinv | OpKind::Erfcinv | OpKind::Jv | OpKind::Iv | OpKind::I0 | OpKind::I1
        )
    }

    /// Bundled C sources the emitted code calls into.
    pub fn support_code(&self) -> &'static [SupportCode] {
        match self.kind {
            OpKind::Erfcx => &[SupportCode::Erfcx],
            OpKind::Psi => &[SupportCode::Psi],
            OpKind::TriGamma => &[SupportCode::TriGamma],
            OpKind::Chi2Sf
            | OpKind::GammaInc
            | OpKind::GammaIncC
            | OpKind::GammaU
            | OpKind::GammaL => &[SupportCode::IncompleteGamma],
            _ => &[],
        }
    }

    pub fn header_dirs(&self) -> Vec<PathBuf> {
        self.support_code()
            .iter()
            .filter(|s| s.needs_header_dir())
            .map(|_| SupportCode::header_dir())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Cache versioning
    // ------------------------------------------------------------------------

    pub fn cache_version_suffix(&self) -> &'static [u32] {
        match self.kind {
            OpKind::Sigmoid | OpKind::Softplus => &[2],
            _ => &[],
        }
    }

    pub fn cache_version(&self) -> CacheVersion {
        self.cache_version_from(CacheVersion::base())
    }

    /// Version on top of `base`; an unversioned base stays unversioned.
    pub fn cache_version_from(&self, base: CacheVersion) -> CacheVersion {
        base.prepend(self.cache_version_suffix())
    }
}

impl fmt::Display for ScalarOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
