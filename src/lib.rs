// ad — annotated hexadecimal dump utility

pub mod carray;
pub mod cli;
pub mod color;
pub mod config;
pub mod dump;
pub mod io;
pub mod kmp;
pub mod matcher;
pub mod reverse;
pub mod utf8;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the primary pipeline entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// The resolved run configuration consumed by every sink.
pub use config::Config;
/// The per-byte match engine.
pub use matcher::Matcher;
/// The push-back byte source feeding the engine.
pub use io::ByteSource;
/// Run the dump sink.
pub use dump::dump;
/// Run the C-array sink.
pub use carray::emit as emit_c_array;
/// Run reverse mode.
pub use reverse::reverse;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
