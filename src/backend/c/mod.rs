pub mod compiler;
pub mod kernel;
pub mod unit;

pub use compiler::CCompiler;
pub use kernel::CKernel;
pub use unit::CompilationUnit;

/// 生成されるCカーネルのエントリーポイント名
///
/// `void harp_kernel(const double *in, double *out)`
pub const KERNEL_ENTRY: &str = "harp_kernel";
