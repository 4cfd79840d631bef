//! NativePath - portable path string to platform encoding, with long path support

use std::path::PathBuf;

/// Verbatim prefix that turns off length limits and name parsing in Win32
pub const VERBATIM_PREFIX: &str = r"\\?\";

/// Verbatim prefix for UNC shares (`\\server\share` becomes `\\?\UNC\server\share`)
pub const VERBATIM_UNC_PREFIX: &str = r"\\?\UNC\";

/// Win32 device namespace prefix; such paths are passed through untouched
pub const DEVICE_PREFIX: &str = r"\\.\";

/// Conventional Win32 path limit
pub const MAX_PATH: usize = 260;

/// Longest wide path passed without the verbatim prefix.
/// `CreateDirectoryW` reserves room for an 8.3 file name below `MAX_PATH`.
pub const PATH_CEILING: usize = MAX_PATH - 12;

const BACKSLASH: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;
const COLON: u16 = b':' as u16;

/// Drop a trailing `\` or `/`, except on a one-character path or a bare drive root (`C:\`).
pub fn strip_trailing_separator(path: &str) -> &str {
    let bytes = path.as_bytes();
    let n = bytes.len();
    let is_drive_root = n == 3 && bytes[1] == b':';
    if n > 1 && (bytes[n - 1] == b'\\' || bytes[n - 1] == b'/') && !is_drive_root {
        &path[..n - 1]
    } else {
        path
    }
}

/// Encode a portable path as UTF-16, adding the verbatim prefix when a
/// rooted path runs past [`PATH_CEILING`].
///
/// The result carries no terminating NUL.
pub fn to_native(path: &str) -> Vec<u16> {
    let wide: Vec<u16> = path.encode_utf16().collect();
    if wide.len() <= PATH_CEILING {
        return wide;
    }

    let rooted = wide[0] == BACKSLASH || wide.get(1) == Some(&COLON);
    if !rooted || has_prefix(&wide, VERBATIM_PREFIX) || has_prefix(&wide, DEVICE_PREFIX) {
        return wide;
    }

    let is_unc = wide.get(1) == Some(&BACKSLASH);
    let (prefix, rest) = if is_unc {
        (VERBATIM_UNC_PREFIX, &wide[2..])
    } else {
        (VERBATIM_PREFIX, &wide[..])
    };

    let mut native: Vec<u16> = prefix.encode_utf16().collect();
    native.extend(rest.iter().map(|&c| if c == SLASH { BACKSLASH } else { c }));
    native
}

fn has_prefix(wide: &[u16], prefix: &str) -> bool {
    let prefix: Vec<u16> = prefix.encode_utf16().collect();
    wide.starts_with(&prefix)
}

/// Native form of a path, ready to hand to the platform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativePath {
    /// NUL-terminated wide string
    #[cfg(windows)]
    wide: Vec<u16>,

    #[cfg(not(windows))]
    raw: PathBuf,
}

impl NativePath {
    /// Encode an already stripped portable path
    pub fn new(path: &str) -> Self {
        #[cfg(windows)]
        {
            let mut wide = to_native(path);
            wide.push(0);
            Self { wide }
        }

        #[cfg(not(windows))]
        {
            Self {
                raw: PathBuf::from(path),
            }
        }
    }

    /// NUL-terminated wide string for `...W` calls
    #[cfg(windows)]
    pub fn as_wide(&self) -> &[u16] {
        &self.wide
    }

    #[cfg(windows)]
    pub(crate) fn as_pcwstr(&self) -> windows::core::PCWSTR {
        windows::core::PCWSTR(self.wide.as_ptr())
    }

    #[cfg(not(windows))]
    pub fn as_path(&self) -> &std::path::Path {
        &self.raw
    }

    /// Native path as a `PathBuf`, for use with `std::fs`
    pub fn to_path_buf(&self) -> PathBuf {
        #[cfg(windows)]
        {
            use std::os::windows::ffi::OsStringExt;

            let len = self.wide.len().saturating_sub(1);
            PathBuf::from(std::ffi::OsString::from_wide(&self.wide[..len]))
        }

        #[cfg(not(windows))]
        {
            self.raw.clone()
        }
    }

    /// Lossy display string without the verbatim prefix
    pub fn display(&self) -> String {
        let full = self.to_path_buf().to_string_lossy().to_string();
        if let Some(rest) = full.strip_prefix(VERBATIM_UNC_PREFIX) {
            format!(r"\\{}", rest)
        } else if let Some(rest) = full.strip_prefix(VERBATIM_PREFIX) {
            rest.to_string()
        } else {
            full
        }
    }
}
