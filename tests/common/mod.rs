#![allow(dead_code)]

use harp_scalar::prelude::*;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Evaluates `op` on float64 operands.
pub fn eval(op: ScalarOp, args: &[f64]) -> f64 {
    let args: Vec<Scalar> = args.iter().map(|v| Scalar::F64(*v)).collect();
    op.evaluate(&args)
        .unwrap()
        .to_f64()
        .expect("real result")
}

/// Central difference of `op` in operand `wrt`.
pub fn central_difference(op: ScalarOp, args: &[f64], wrt: usize) -> f64 {
    let h = 1e-6 * args[wrt].abs().max(1.0);
    let mut plus = args.to_vec();
    let mut minus = args.to_vec();
    plus[wrt] += h;
    minus[wrt] -= h;
    (eval(op, &plus) - eval(op, &minus)) / (2.0 * h)
}

/// Symbolic gradient of `op` in operand `wrt`, built by the backward pass and
/// evaluated by the interpreter.
pub fn symbolic_gradient(op: ScalarOp, args: &[f64], wrt: usize) -> f64 {
    let inputs: Vec<Expr> = (0..args.len())
        .map(|i| Expr::input(format!("a{i}"), DType::F64))
        .collect();
    let y = op.apply(&inputs).unwrap();
    let dx = grad(&y, &inputs[wrt]).unwrap().expect("connected");

    let mut interp = Interpreter::new();
    for (i, v) in args.iter().enumerate() {
        interp.set(format!("a{i}"), *v);
    }
    interp.eval(&dx).unwrap().to_f64().unwrap()
}

/// Skips the calling test when no C compiler is available.
pub fn compiler_or_skip() -> Option<CCompiler> {
    let compiler = CCompiler::new();
    if compiler.is_available() {
        Some(compiler)
    } else {
        eprintln!(
            "Skipping native test: C compiler '{}' not found.",
            compiler.compiler()
        );
        None
    }
}
