//! Bundled C implementations of special functions missing from libm

use std::path::PathBuf;

/// A C source embedded into the crate at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportCode {
    /// `_psi`
    Psi,
    /// `_tri_gamma`
    TriGamma,
    /// `GammaP`, `GammaQ`, `lowerGamma`, `upperGamma`
    IncompleteGamma,
    /// `harp_erfcx`, which includes `erfcx.h`
    Erfcx,
}

impl SupportCode {
    pub fn file_name(self) -> &'static str {
        match self {
            SupportCode::Psi => "psi.h",
            SupportCode::TriGamma => "tri_gamma.h",
            SupportCode::IncompleteGamma => "gamma.c",
            SupportCode::Erfcx => "erfcx.c",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            SupportCode::Psi => include_str!("../../assets/c/psi.h"),
            SupportCode::TriGamma => include_str!("../../assets/c/tri_gamma.h"),
            SupportCode::IncompleteGamma => include_str!("../../assets/c/gamma.c"),
            SupportCode::Erfcx => include_str!("../../assets/c/erfcx.c"),
        }
    }

    /// Whether the source includes headers from [`SupportCode::header_dir`].
    pub fn needs_header_dir(self) -> bool {
        matches!(self, SupportCode::Erfcx)
    }

    /// Directory holding the bundled sources and headers.
    pub fn header_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/c"))
    }
}
