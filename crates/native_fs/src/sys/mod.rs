//! Platform call-throughs
//!
//! Each backend exposes the same set of free functions taking the portable
//! path (for error reporting) and its native form (for the call itself).

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub(crate) use self::win32::*;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use self::unix::*;
