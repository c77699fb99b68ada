use std::fmt::Write;
use std::path::PathBuf;

use log::debug;
use rustc_hash::FxHashMap;

use super::KERNEL_ENTRY;
use crate::backend::support::SupportCode;
use crate::error::{Result, ScalarOpError};
use crate::graph::{Expr, ExprOp, NodeId, topological_sort};
use crate::op::{ScalarOp, Signature};

/// A C translation unit computing `outputs` from `inputs`.
///
/// The generated entry point has the signature
/// `void harp_kernel(const double *in, double *out)`: every input is read from
/// `in` and converted to its declared type, every output is widened to double.
pub struct CompilationUnit {
    inputs: Vec<Expr>,
    outputs: Vec<Expr>,
    nodes: Vec<Expr>,
}

impl CompilationUnit {
    pub fn new(inputs: &[Expr], outputs: &[Expr]) -> Result<Self> {
        if let Some(bad) = inputs.iter().find(|i| i.input_name().is_none()) {
            return Err(ScalarOpError::UnboundInput(bad.to_string()));
        }
        let nodes = topological_sort(outputs);
        for node in &nodes {
            if let Some(name) = node.input_name()
                && !inputs.contains(node)
            {
                return Err(ScalarOpError::UnboundInput(name.to_string()));
            }
        }
        Ok(Self {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            nodes,
        })
    }

    pub fn inputs(&self) -> &[Expr] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Expr] {
        &self.outputs
    }

    fn operators(&self) -> impl Iterator<Item = ScalarOp> + '_ {
        self.nodes.iter().filter_map(|n| match n.op() {
            ExprOp::Apply(op) => Some(*op),
            _ => None,
        })
    }

    /// Support sources in first-use order, each listed once.
    pub fn support_code(&self) -> Vec<SupportCode> {
        let mut seen = Vec::new();
        for op in self.operators() {
            for s in op.support_code() {
                if !seen.contains(s) {
                    seen.push(*s);
                }
            }
        }
        seen
    }

    pub fn header_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for op in self.operators() {
            for d in op.header_dirs() {
                if !dirs.contains(&d) {
                    dirs.push(d);
                }
            }
        }
        dirs
    }

    /// Deterministic key over every node's operation, type and, for
    /// operators, cache version, plus the `in` slot of every input and the
    /// nodes written to `out`. `None` if some operator must not be cached.
    pub fn cache_key(&self) -> Option<String> {
        let index: FxHashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id(), i))
            .collect();

        let mut key = String::new();
        for node in &self.nodes {
            let _ = write!(key, "{}:{}", node.op().name(), node.dtype());
            match node.op() {
                ExprOp::Apply(op) => {
                    let version = op.cache_version();
                    if !version.is_cacheable() {
                        return None;
                    }
                    let _ = write!(key, "@{version}");
                }
                ExprOp::Const(v) => {
                    let _ = write!(key, "={v:?}");
                }
                ExprOp::Input(name) => {
                    let slot = self.inputs.iter().position(|i| i == node)?;
                    let _ = write!(key, "={name}#{slot}");
                }
                _ => {}
            }
            let srcs: Vec<String> = node
                .src()
                .iter()
                .filter_map(|s| index.get(&s.id()))
                .map(|i| i.to_string())
                .collect();
            let _ = write!(key, "[{}];", srcs.join(","));
        }

        let outs: Vec<String> = self
            .outputs
            .iter()
            .filter_map(|o| index.get(&o.id()))
            .map(|i| i.to_string())
            .collect();
        let _ = write!(key, "out[{}]", outs.join(","));
        Some(key)
    }

    /// Renders the complete translation unit.
    pub fn source(&self) -> Result<String> {
        let mut code = String::from("#include <math.h>\n\n");
        for support in self.support_code() {
            debug!("splicing support code {}", support.file_name());
            let _ = writeln!(code, "/* {} */", support.file_name());
            code.push_str(support.source());
            code.push('\n');
        }

        let _ = writeln!(code, "void {KERNEL_ENTRY}(const double *in, double *out)\n{{");

        let mut names: FxHashMap<NodeId, String> = FxHashMap::default();
        for (i, node) in self.nodes.iter().enumerate() {
            let name = format!("v{i}");
            let ty = c_name(node)?;
            let operands: Vec<&str> = node
                .src()
                .iter()
                .map(|s| names[&s.id()].as_str())
                .collect();

            let stmt = match node.op() {
                ExprOp::Input(_) => {
                    let slot = self
                        .inputs
                        .iter()
                        .position(|i| i == node)
                        .ok_or_else(|| ScalarOpError::UnboundInput(node.to_string()))?;
                    format!("{ty} {name} = ({ty}) in[{slot}];")
                }
                ExprOp::Const(v) => format!("{ty} {name} = ({ty}) {};", c_literal(*v)),
                ExprOp::Apply(op) => {
                    let sig = Signature::new(
                        node.src().iter().map(Expr::dtype).collect(),
                        node.dtype(),
                    );
                    format!("{ty} {name};\n{}", op.emit_c(&operands, &name, &sig)?)
                }
                ExprOp::Add => binary(ty, &name, &operands, "+"),
                ExprOp::Sub => binary(ty, &name, &operands, "-"),
                ExprOp::Mul => binary(ty, &name, &operands, "*"),
                ExprOp::Neg => format!("{ty} {name} = ({ty}) (-(double) {});", operands[0]),
                ExprOp::Pow => format!(
                    "{ty} {name} = ({ty}) pow((double) {}, (double) {});",
                    operands[0], operands[1]
                ),
                ExprOp::Exp => format!("{ty} {name} = ({ty}) exp((double) {});", operands[0]),
                ExprOp::Log => format!("{ty} {name} = ({ty}) log((double) {});", operands[0]),
            };
            for line in stmt.lines() {
                let _ = writeln!(code, "    {line}");
            }
            names.insert(node.id(), name);
        }

        for (slot, out) in self.outputs.iter().enumerate() {
            let _ = writeln!(code, "    out[{slot}] = (double) {};", names[&out.id()]);
        }
        code.push_str("}\n");
        Ok(code)
    }
}

fn c_name(node: &Expr) -> Result<&'static str> {
    node.dtype().c_name().ok_or_else(|| {
        ScalarOpError::unsupported(node.op().name(), node.dtype(), "type has no C spelling")
    })
}

fn binary(ty: &str, name: &str, operands: &[&str], symbol: &str) -> String {
    format!(
        "{ty} {name} = ({ty}) ((double) {} {symbol} (double) {});",
        operands[0], operands[1]
    )
}

fn c_literal(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v == f64::INFINITY {
        "INFINITY".to_string()
    } else if v == f64::NEG_INFINITY {
        "(-INFINITY)".to_string()
    } else {
        format!("{v:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::ops;

    #[test]
    fn test_source_layout() {
        let x = Expr::input("x", DType::F64);
        let y = ops::psi().apply(&[&x * 2.0]).unwrap();
        let unit = CompilationUnit::new(&[x], &[y]).unwrap();
        let src = unit.source().unwrap();

        assert!(src.starts_with("#include <math.h>"));
        assert!(src.contains("void harp_kernel(const double *in, double *out)"));
        assert!(src.contains("double v0 = (double) in[0];"));
        assert!(src.contains("double v1 = (double) 2.0;"));
        assert!(src.contains("v3 = (double) _psi((double) v2);"));
        assert!(src.contains("out[0] = (double) v3;"));
    }

    #[test]
    fn test_support_code_spliced_once() {
        let k = Expr::input("k", DType::F64);
        let x = Expr::input("x", DType::F64);
        let p = ops::gammainc().apply(&[k.clone(), x.clone()]).unwrap();
        let q = ops::gammaincc().apply(&[k.clone(), x.clone()]).unwrap();
        let unit = CompilationUnit::new(&[k, x], &[p, q]).unwrap();

        assert_eq!(unit.support_code(), vec![SupportCode::IncompleteGamma]);
        let src = unit.source().unwrap();
        assert_eq!(src.matches("/* gamma.c */").count(), 1);
        assert!(unit.header_dirs().is_empty());
    }

    #[test]
    fn test_header_dirs_deduplicated() {
        let x = Expr::input("x", DType::F64);
        let a = ops::erfcx().apply(&[x.clone()]).unwrap();
        let b = ops::erfcx().apply(&[&x * 3.0]).unwrap();
        let unit = CompilationUnit::new(&[x], &[a, b]).unwrap();
        assert_eq!(unit.header_dirs(), vec![SupportCode::header_dir()]);
    }

    #[test]
    fn test_unbound_input() {
        let x = Expr::input("x", DType::F64);
        let y = Expr::input("y", DType::F64);
        let err = CompilationUnit::new(&[x.clone()], &[&x + &y]).err().unwrap();
        assert!(matches!(err, ScalarOpError::UnboundInput(name) if name == "y"));
    }

    #[test]
    fn test_unsupported_operator_fails_rendering() {
        let x = Expr::input("x", DType::F64);
        let y = ops::erfinv().apply(&[x.clone()]).unwrap();
        let unit = CompilationUnit::new(&[x], &[y]).unwrap();
        assert!(unit.source().unwrap_err().is_not_implemented());
    }

    #[test]
    fn test_cache_key() {
        let build = |op: ScalarOp| {
            let x = Expr::input("x", DType::F64);
            let y = op.apply(&[x.clone()]).unwrap();
            CompilationUnit::new(&[x], &[y]).unwrap()
        };
        let a = build(ops::sigmoid()).cache_key().unwrap();
        assert_eq!(a, build(ops::sigmoid()).cache_key().unwrap());
        assert_ne!(a, build(ops::softplus()).cache_key().unwrap());
        assert!(a.contains("sigmoid:float64@(2, 4)"));
    }

    #[test]
    fn test_cache_key_tracks_input_slots() {
        let x = Expr::input("x", DType::F64);
        let y = Expr::input("y", DType::F64);
        let d = &x - &y;
        let xy = CompilationUnit::new(&[x.clone(), y.clone()], &[d.clone()]).unwrap();
        let yx = CompilationUnit::new(&[y, x], &[d]).unwrap();

        assert_ne!(xy.source().unwrap(), yx.source().unwrap());
        assert_ne!(xy.cache_key().unwrap(), yx.cache_key().unwrap());
        assert!(xy.cache_key().unwrap().contains("=x#0"));
        assert!(yx.cache_key().unwrap().contains("=x#1"));
    }

    #[test]
    fn test_cache_key_tracks_outputs() {
        let x = Expr::input("x", DType::F64);
        let scaled = &x * 2.0;
        let e = ops::erf().apply(&[scaled.clone()]).unwrap();
        let single = CompilationUnit::new(&[x.clone()], &[e.clone()]).unwrap();
        let both = CompilationUnit::new(&[x.clone()], &[e.clone(), scaled.clone()]).unwrap();
        let swapped = CompilationUnit::new(&[x], &[scaled, e]).unwrap();

        let keys = [
            single.cache_key().unwrap(),
            both.cache_key().unwrap(),
            swapped.cache_key().unwrap(),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
        assert!(keys[0].ends_with("out[3]"));
    }
}
