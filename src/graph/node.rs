use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::config::float_x;
use crate::dtype::DType;
use crate::op::ScalarOp;

/// Operation performed by a graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprOp {
    /// Named graph input
    Input(String),
    /// Literal, stored as `f64` and converted to the node type on use
    Const(f64),
    /// Application of a catalog operator
    Apply(ScalarOp),
    Add,
    Sub,
    Mul,
    Neg,
    Pow,
    Exp,
    Log,
}

impl ExprOp {
    pub fn name(&self) -> &'static str {
        match self {
            ExprOp::Input(_) => "input",
            ExprOp::Const(_) => "const",
            ExprOp::Apply(op) => op.name(),
            ExprOp::Add => "add",
            ExprOp::Sub => "sub",
            ExprOp::Mul => "mul",
            ExprOp::Neg => "neg",
            ExprOp::Pow => "pow",
            ExprOp::Exp => "exp",
            ExprOp::Log => "log",
        }
    }
}

#[derive(Debug)]
pub struct ExprInner {
    pub op: ExprOp,
    pub src: Vec<Expr>,
    pub dtype: DType,
}

/// Immutable, reference-counted handle to a typed scalar value in a graph.
///
/// Cloning is cheap. Two handles compare equal when they point to the same
/// node or when their operations, types and operands are structurally equal.
#[derive(Debug, Clone)]
pub struct Expr(pub(crate) Arc<ExprInner>);

/// Node identity (pointer of the shared node).
pub type NodeId = *const ExprInner;

fn float_type(dtype: DType) -> DType {
    if dtype.is_discrete() { float_x() } else { dtype }
}

impl Expr {
    pub(crate) fn from_parts(op: ExprOp, src: Vec<Expr>, dtype: DType) -> Self {
        Expr(Arc::new(ExprInner { op, src, dtype }))
    }

    pub fn input(name: impl Into<String>, dtype: DType) -> Self {
        Self::from_parts(ExprOp::Input(name.into()), vec![], dtype)
    }

    pub fn constant(value: f64, dtype: DType) -> Self {
        Self::from_parts(ExprOp::Const(value), vec![], dtype)
    }

    /// Zero of the same type.
    pub fn zeros_like(&self) -> Self {
        Self::constant(0.0, self.dtype())
    }

    pub fn op(&self) -> &ExprOp {
        &self.0.op
    }

    pub fn src(&self) -> &[Expr] {
        &self.0.src
    }

    pub fn dtype(&self) -> DType {
        self.0.dtype
    }

    pub fn id(&self) -> NodeId {
        Arc::as_ptr(&self.0)
    }

    pub fn is_leaf(&self) -> bool {
        self.0.src.is_empty()
    }

    /// Constant value, if this node is a literal.
    pub fn as_const(&self) -> Option<f64> {
        match self.0.op {
            ExprOp::Const(v) => Some(v),
            _ => None,
        }
    }

    /// Input name, if this node is a graph input.
    pub fn input_name(&self) -> Option<&str> {
        match &self.0.op {
            ExprOp::Input(name) => Some(name),
            _ => None,
        }
    }

    fn binary(op: ExprOp, lhs: &Expr, rhs: &Expr) -> Self {
        let dtype = lhs.dtype().upcast(rhs.dtype());
        Self::from_parts(op, vec![lhs.clone(), rhs.clone()], dtype)
    }

    pub fn exp(&self) -> Self {
        Self::from_parts(ExprOp::Exp, vec![self.clone()], float_type(self.dtype()))
    }

    pub fn log(&self) -> Self {
        Self::from_parts(ExprOp::Log, vec![self.clone()], float_type(self.dtype()))
    }

    pub fn pow(&self, exponent: &Expr) -> Self {
        Self::binary(ExprOp::Pow, self, exponent)
    }

    /// `self ^ exponent` with the exponent as a constant of this node's type.
    pub fn powf(&self, exponent: f64) -> Self {
        self.pow(&Expr::constant(exponent, self.dtype()))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.dtype == other.0.dtype
                && self.0.op == other.0.op
                && self.0.src == other.0.src)
    }
}

// ============================================================================
// Operator overloads
// ============================================================================

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl std::ops::$trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary(ExprOp::$variant, self, rhs)
            }
        }

        impl std::ops::$trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary(ExprOp::$variant, self, &rhs)
            }
        }

        impl std::ops::$trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary(ExprOp::$variant, &self, rhs)
            }
        }

        impl std::ops::$trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary(ExprOp::$variant, &self, &rhs)
            }
        }

        impl std::ops::$trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                let rhs = Expr::constant(rhs, self.dtype());
                Expr::binary(ExprOp::$variant, self, &rhs)
            }
        }

        impl std::ops::$trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                let rhs = Expr::constant(rhs, self.dtype());
                Expr::binary(ExprOp::$variant, &self, &rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);

impl std::ops::Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::from_parts(ExprOp::Neg, vec![self.clone()], self.dtype())
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -&self
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let src = self.src();
        match self.op() {
            ExprOp::Input(name) => write!(f, "{name}"),
            ExprOp::Const(v) => write!(f, "{v}"),
            ExprOp::Apply(op) => {
                write!(f, "{}(", op.name())?;
                for (i, s) in src.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{s}")?;
                }
                write!(f, ")")
            }
            ExprOp::Add => write!(f, "({} + {})", src[0], src[1]),
            ExprOp::Sub => write!(f, "({} - {})", src[0], src[1]),
            ExprOp::Mul => write!(f, "({} * {})", src[0], src[1]),
            ExprOp::Pow => write!(f, "({} ^ {})", src[0], src[1]),
            ExprOp::Neg => write!(f, "-{}", src[0]),
            ExprOp::Exp => write!(f, "exp({})", src[0]),
            ExprOp::Log => write!(f, "log({})", src[0]),
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Nodes reachable from `roots`, every node after all of its operands.
pub fn topological_sort(roots: &[Expr]) -> Vec<Expr> {
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack: Vec<(Expr, bool)> = roots.iter().rev().map(|r| (r.clone(), false)).collect();

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        stack.push((node.clone(), true));
        for s in node.src().iter().rev() {
            if !visited.contains(&s.id()) {
                stack.push((s.clone(), false));
            }
        }
    }
    order
}
