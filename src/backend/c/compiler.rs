use std::process::Command;

use libloading::Library;
use log::debug;

use super::{CKernel, CompilationUnit};
use crate::config::config;
use crate::error::{Result, ScalarOpError};

/// Drives the system C compiler to turn a [`CompilationUnit`] into a loaded
/// shared library.
#[derive(Debug, Clone)]
pub struct CCompiler {
    cc: String,
    flags: Vec<String>,
}

impl Default for CCompiler {
    fn default() -> Self {
        Self::with_compiler(config().cc.clone())
    }
}

impl CCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler(cc: impl Into<String>) -> Self {
        Self {
            cc: cc.into(),
            flags: vec!["-shared".to_string(), "-fPIC".to_string(), "-O3".to_string()],
        }
    }

    pub fn compiler(&self) -> &str {
        &self.cc
    }

    /// コンパイラが実行可能かどうか
    pub fn is_available(&self) -> bool {
        match Command::new(&self.cc).arg("--version").output() {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    fn lib_name() -> &'static str {
        if cfg!(target_os = "macos") {
            "kernel.dylib"
        } else {
            "kernel.so"
        }
    }

    pub fn compile(&self, unit: &CompilationUnit) -> Result<CKernel> {
        let source = unit.source()?;

        // 一時ディレクトリはCKernelがDropされるまで保持する
        let dir = tempfile::Builder::new().prefix("harp-scalar").tempdir()?;
        let src_path = dir.path().join("kernel.c");
        std::fs::write(&src_path, &source)?;
        let lib_path = dir.path().join(Self::lib_name());

        let mut cmd = Command::new(&self.cc);
        cmd.args(&self.flags);
        for include in unit.header_dirs() {
            cmd.arg("-I").arg(include);
        }
        cmd.arg("-o").arg(&lib_path).arg(&src_path).arg("-lm");

        debug!("cache key: {:?}", unit.cache_key());
        debug!("running compile command: {cmd:?}");

        let output = cmd
            .output()
            .map_err(|e| ScalarOpError::Compile(format!("failed to run {}: {e}", self.cc)))?;
        if !output.status.success() {
            return Err(ScalarOpError::Compile(format!(
                "{} exited with {}:\n{}",
                self.cc,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        // SAFETY: the library was just built from generated code that has no
        // load-time side effects.
        let library = unsafe { Library::new(&lib_path) }
            .map_err(|e| ScalarOpError::Library(e.to_string()))?;

        Ok(CKernel::new(
            library,
            unit.inputs().len(),
            unit.outputs().len(),
            dir,
        ))
    }
}
