use libloading::{Library, Symbol};
use tempfile::TempDir;

use super::KERNEL_ENTRY;
use crate::error::{Result, ScalarOpError};

/// カーネル関数の型: `void harp_kernel(const double *in, double *out)`
type KernelFn = unsafe extern "C" fn(*const f64, *mut f64);

/// ロード済みの共有ライブラリ
///
/// ビルドディレクトリを保持し、CKernelがDropされると自動的に削除される
pub struct CKernel {
    // Drop順: ライブラリを閉じてからディレクトリを削除する
    library: Library,
    num_inputs: usize,
    num_outputs: usize,
    _dir: TempDir,
}

impl CKernel {
    pub(crate) fn new(library: Library, num_inputs: usize, num_outputs: usize, dir: TempDir) -> Self {
        Self {
            library,
            num_inputs,
            num_outputs,
            _dir: dir,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Runs the kernel once; inputs and outputs are passed as doubles.
    pub fn run(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.num_inputs {
            return Err(ScalarOpError::Arity {
                op: KERNEL_ENTRY,
                expected: self.num_inputs,
                got: inputs.len(),
            });
        }
        let mut outputs = vec![0.0f64; self.num_outputs];

        // SAFETY: the entry point was generated with exactly this signature and
        // reads `num_inputs` / writes `num_outputs` doubles.
        unsafe {
            let kernel: Symbol<KernelFn> = self
                .library
                .get(KERNEL_ENTRY.as_bytes())
                .map_err(|e| ScalarOpError::Library(format!("{KERNEL_ENTRY}: {e}")))?;
            kernel(inputs.as_ptr(), outputs.as_mut_ptr());
        }
        Ok(outputs)
    }
}
