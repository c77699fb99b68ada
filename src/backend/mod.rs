//! Native code generation
//!
//! - [`support`]: bundled C sources spliced into compilation units
//! - [`version`]: cache versions for compiled code
//! - [`c`]: compilation units, the C compiler driver and loaded kernels

pub mod c;
pub mod support;
pub mod version;

pub use support::SupportCode;
pub use version::{BASE_CACHE_VERSION, CacheVersion};
