//! Native file system shim
//!
//! Maps a portable file interface onto the host's native file API:
//! - File: path handle with existence, permission, type, timestamp, size,
//!   copy/rename/link/remove, creation and volume space operations
//! - NativePath: wide encoding with verbatim prefix for long paths
//! - FsError / FailureKind: platform status codes translated into portable failures
//! - FsConfig: link policy and logging settings

#[cfg(not(any(windows, unix)))]
compile_error!("native_fs supports Windows and Unix hosts only");

mod capability;
pub mod config;
mod device;
pub mod error;
mod file;
pub mod filetime;
pub mod native_path;
mod sys;

pub use capability::LinkCapability;
pub use config::{FsConfig, LinksConfig, LoggingConfig, SymlinkPolicy};
pub use device::is_device_path;
pub use error::{kind_for_code, FailureKind, FsError, Result};
pub use file::{CopyOptions, File, LinkType};
pub use native_path::{strip_trailing_separator, to_native, NativePath};

/// Resolve process-wide capabilities from configuration.
/// Call once at startup; later calls keep the first configuration.
pub fn init(config: &FsConfig) -> &'static LinkCapability {
    capability::install(&config.links)
}
