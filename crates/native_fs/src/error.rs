//! Failure taxonomy and platform status code translation

use thiserror::Error;

/// Win32 status codes the translation table knows about
pub mod win32 {
    pub const ERROR_FILE_NOT_FOUND: u32 = 2;
    pub const ERROR_PATH_NOT_FOUND: u32 = 3;
    pub const ERROR_ACCESS_DENIED: u32 = 5;
    pub const ERROR_INVALID_DRIVE: u32 = 15;
    pub const ERROR_NOT_READY: u32 = 21;
    pub const ERROR_WRITE_FAULT: u32 = 29;
    pub const ERROR_READ_FAULT: u32 = 30;
    pub const ERROR_SHARING_VIOLATION: u32 = 32;
    pub const ERROR_LOCK_VIOLATION: u32 = 33;
    pub const ERROR_HANDLE_EOF: u32 = 38;
    pub const ERROR_HANDLE_DISK_FULL: u32 = 39;
    pub const ERROR_BAD_NETPATH: u32 = 53;
    pub const ERROR_FILE_EXISTS: u32 = 80;
    pub const ERROR_CANNOT_MAKE: u32 = 82;
    pub const ERROR_INVALID_PARAMETER: u32 = 87;
    pub const ERROR_DISK_FULL: u32 = 112;
    pub const ERROR_INVALID_NAME: u32 = 123;
    pub const ERROR_NEGATIVE_SEEK: u32 = 131;
    pub const ERROR_DIR_NOT_EMPTY: u32 = 145;
    pub const ERROR_BAD_PATHNAME: u32 = 161;
    pub const ERROR_ALREADY_EXISTS: u32 = 183;
    pub const ERROR_FILENAME_EXCED_RANGE: u32 = 206;
    pub const ERROR_DIRECTORY: u32 = 267;
    pub const ERROR_CANT_RESOLVE_FILENAME: u32 = 1921;
    pub const ERROR_FILE_READ_ONLY: u32 = 6009;

    /// Recover the Win32 code wrapped in an `HRESULT_FROM_WIN32` value.
    /// Any other HRESULT is returned as-is.
    pub fn code_from_hresult(hresult: i32) -> u32 {
        let raw = hresult as u32;
        if raw & 0xFFFF_0000 == 0x8007_0000 {
            raw & 0xFFFF
        } else {
            raw
        }
    }
}

/// Portable failure categories callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotFound,
    PathNotFound,
    AccessDenied,
    AlreadyExists,
    /// Invalid name or malformed path
    PathSyntax,
    ReadOnly,
    CannotCreate,
    DirectoryNotEmpty,
    WriteFault,
    ReadFault,
    SharingViolation,
    LockViolation,
    EndOfFile,
    DiskFull,
    NegativeSeek,
    Other,
}

impl FailureKind {
    pub fn describe(self) -> &'static str {
        match self {
            FailureKind::NotFound => "file not found",
            FailureKind::PathNotFound => "path not found",
            FailureKind::AccessDenied => "access denied",
            FailureKind::AlreadyExists => "file exists",
            FailureKind::PathSyntax => "bad path syntax",
            FailureKind::ReadOnly => "file is read-only",
            FailureKind::CannotCreate => "cannot create file",
            FailureKind::DirectoryNotEmpty => "directory not empty",
            FailureKind::WriteFault => "write fault",
            FailureKind::ReadFault => "read fault",
            FailureKind::SharingViolation => "sharing violation",
            FailureKind::LockViolation => "lock violation",
            FailureKind::EndOfFile => "EOF reached",
            FailureKind::DiskFull => "disk is full",
            FailureKind::NegativeSeek => "negative seek",
            FailureKind::Other => "file error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Translate a Win32 status code into its failure kind.
pub fn kind_for_code(code: u32) -> FailureKind {
    use win32::*;

    match code {
        ERROR_FILE_NOT_FOUND => FailureKind::NotFound,
        ERROR_PATH_NOT_FOUND | ERROR_BAD_NETPATH | ERROR_CANT_RESOLVE_FILENAME | ERROR_INVALID_DRIVE => {
            FailureKind::PathNotFound
        }
        ERROR_ACCESS_DENIED => FailureKind::AccessDenied,
        ERROR_ALREADY_EXISTS | ERROR_FILE_EXISTS => FailureKind::AlreadyExists,
        ERROR_INVALID_NAME | ERROR_DIRECTORY | ERROR_FILENAME_EXCED_RANGE | ERROR_BAD_PATHNAME => {
            FailureKind::PathSyntax
        }
        ERROR_FILE_READ_ONLY => FailureKind::ReadOnly,
        ERROR_CANNOT_MAKE => FailureKind::CannotCreate,
        ERROR_DIR_NOT_EMPTY => FailureKind::DirectoryNotEmpty,
        ERROR_WRITE_FAULT => FailureKind::WriteFault,
        ERROR_READ_FAULT => FailureKind::ReadFault,
        ERROR_SHARING_VIOLATION => FailureKind::SharingViolation,
        ERROR_LOCK_VIOLATION => FailureKind::LockViolation,
        ERROR_HANDLE_EOF => FailureKind::EndOfFile,
        ERROR_HANDLE_DISK_FULL | ERROR_DISK_FULL => FailureKind::DiskFull,
        ERROR_NEGATIVE_SEEK => FailureKind::NegativeSeek,
        _ => FailureKind::Other,
    }
}

/// Translate a POSIX errno into its failure kind.
#[cfg(unix)]
pub fn kind_for_errno(errno: i32) -> FailureKind {
    match errno {
        libc::ENOENT => FailureKind::NotFound,
        libc::ENOTDIR => FailureKind::PathNotFound,
        libc::EACCES | libc::EPERM => FailureKind::AccessDenied,
        libc::EEXIST => FailureKind::AlreadyExists,
        libc::ENAMETOOLONG | libc::EINVAL => FailureKind::PathSyntax,
        libc::EROFS => FailureKind::ReadOnly,
        libc::ENOTEMPTY => FailureKind::DirectoryNotEmpty,
        libc::ENOSPC | libc::EDQUOT => FailureKind::DiskFull,
        libc::EIO => FailureKind::WriteFault,
        libc::ETXTBSY => FailureKind::SharingViolation,
        _ => FailureKind::Other,
    }
}

/// Translate a raw OS code of the host platform.
pub fn kind_for_os_code(code: i64) -> FailureKind {
    #[cfg(windows)]
    {
        kind_for_code(code as u32)
    }

    #[cfg(unix)]
    {
        kind_for_errno(code as i32)
    }
}

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("{kind}: {path} (os error {code})")]
    Os {
        kind: FailureKind,
        path: String,
        code: i64,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FsError {
    /// Build a failure from a raw platform code for `path`.
    pub fn from_os_code(path: &str, code: i64) -> Self {
        let kind = kind_for_os_code(code);
        if kind == FailureKind::Other {
            tracing::warn!("Unmapped os error {} for {}", code, path);
        }
        FsError::Os {
            kind,
            path: path.to_string(),
            code,
        }
    }

    /// Build a failure from a std I/O error raised while working on `path`.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::from_os_code(path, code as i64),
            None => FsError::Os {
                kind: match err.kind() {
                    std::io::ErrorKind::NotFound => FailureKind::NotFound,
                    std::io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
                    std::io::ErrorKind::AlreadyExists => FailureKind::AlreadyExists,
                    std::io::ErrorKind::InvalidInput => FailureKind::PathSyntax,
                    std::io::ErrorKind::UnexpectedEof => FailureKind::EndOfFile,
                    _ => FailureKind::Other,
                },
                path: path.to_string(),
                code: 0,
            },
        }
    }

    /// Failure raised for an operation on an empty path
    pub fn empty_path() -> Self {
        FsError::Os {
            kind: FailureKind::PathSyntax,
            path: String::new(),
            code: 0,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            FsError::Os { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            FsError::Os { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::Os { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            Some(FailureKind::NotFound) | Some(FailureKind::PathNotFound)
        )
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::win32::*;
    use super::*;

    #[test]
    fn test_every_mapped_code() {
        let table = [
            (ERROR_FILE_NOT_FOUND, FailureKind::NotFound),
            (ERROR_PATH_NOT_FOUND, FailureKind::PathNotFound),
            (ERROR_BAD_NETPATH, FailureKind::PathNotFound),
            (ERROR_CANT_RESOLVE_FILENAME, FailureKind::PathNotFound),
            (ERROR_INVALID_DRIVE, FailureKind::PathNotFound),
            (ERROR_ACCESS_DENIED, FailureKind::AccessDenied),
            (ERROR_ALREADY_EXISTS, FailureKind::AlreadyExists),
            (ERROR_FILE_EXISTS, FailureKind::AlreadyExists),
            (ERROR_INVALID_NAME, FailureKind::PathSyntax),
            (ERROR_DIRECTORY, FailureKind::PathSyntax),
            (ERROR_FILENAME_EXCED_RANGE, FailureKind::PathSyntax),
            (ERROR_BAD_PATHNAME, FailureKind::PathSyntax),
            (ERROR_FILE_READ_ONLY, FailureKind::ReadOnly),
            (ERROR_CANNOT_MAKE, FailureKind::CannotCreate),
            (ERROR_DIR_NOT_EMPTY, FailureKind::DirectoryNotEmpty),
            (ERROR_WRITE_FAULT, FailureKind::WriteFault),
            (ERROR_READ_FAULT, FailureKind::ReadFault),
            (ERROR_SHARING_VIOLATION, FailureKind::SharingViolation),
            (ERROR_LOCK_VIOLATION, FailureKind::LockViolation),
            (ERROR_HANDLE_EOF, FailureKind::EndOfFile),
            (ERROR_HANDLE_DISK_FULL, FailureKind::DiskFull),
            (ERROR_DISK_FULL, FailureKind::DiskFull),
            (ERROR_NEGATIVE_SEEK, FailureKind::NegativeSeek),
        ];

        for (code, kind) in table {
            assert_eq!(kind_for_code(code), kind, "code {}", code);
        }
    }

    #[test]
    fn test_unmapped_codes_fall_through() {
        assert_eq!(kind_for_code(0), FailureKind::Other);
        assert_eq!(kind_for_code(ERROR_NOT_READY), FailureKind::Other);
        assert_eq!(kind_for_code(ERROR_INVALID_PARAMETER), FailureKind::Other);
        assert_eq!(kind_for_code(0xDEAD), FailureKind::Other);
    }

    #[test]
    fn test_code_from_hresult() {
        // HRESULT_FROM_WIN32(ERROR_ACCESS_DENIED)
        assert_eq!(code_from_hresult(0x8007_0005_u32 as i32), ERROR_ACCESS_DENIED);
        assert_eq!(code_from_hresult(0x8000_4005_u32 as i32), 0x8000_4005);
    }

    #[cfg(unix)]
    #[test]
    fn test_errno_mapping() {
        assert_eq!(kind_for_errno(libc::ENOENT), FailureKind::NotFound);
        assert_eq!(kind_for_errno(libc::EACCES), FailureKind::AccessDenied);
        assert_eq!(kind_for_errno(libc::EEXIST), FailureKind::AlreadyExists);
        assert_eq!(kind_for_errno(libc::ENOTEMPTY), FailureKind::DirectoryNotEmpty);
        assert_eq!(kind_for_errno(libc::ENOSPC), FailureKind::DiskFull);
        assert_eq!(kind_for_errno(libc::EBADF), FailureKind::Other);
    }

    #[test]
    fn test_error_carries_path_and_code() {
        let err = FsError::Os {
            kind: kind_for_code(ERROR_SHARING_VIOLATION),
            path: "C:\\data\\locked.db".to_string(),
            code: ERROR_SHARING_VIOLATION as i64,
        };
        assert_eq!(err.kind(), Some(FailureKind::SharingViolation));
        assert_eq!(err.path(), Some("C:\\data\\locked.db"));
        assert_eq!(err.code(), Some(32));
        assert_eq!(err.to_string(), "sharing violation: C:\\data\\locked.db (os error 32)");
        assert!(!err.is_not_found());
    }
}
