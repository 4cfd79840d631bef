//! POSIX backend

use crate::capability::LinkCapability;
use crate::error::FailureKind;
use crate::native_path::NativePath;
use crate::{FsError, Result};
use chrono::{DateTime, Utc};
use std::ffi::CString;
use std::fs::{self, FileTimes, OpenOptions, Permissions};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};

fn io_error(path: &str, err: std::io::Error) -> FsError {
    FsError::from_io(path, &err)
}

fn metadata(path: &str, native: &NativePath) -> Result<fs::Metadata> {
    fs::metadata(native.as_path()).map_err(|e| io_error(path, e))
}

fn c_path(path: &str, native: &NativePath) -> Result<CString> {
    CString::new(native.as_path().as_os_str().as_bytes())
        .map_err(|_| FsError::from_os_code(path, libc::EINVAL as i64))
}

/// `access(2)` probe: `Ok(false)` on EACCES, other failures escalate
fn access(path: &str, native: &NativePath, mode: libc::c_int) -> Result<bool> {
    let c_path = c_path(path, native)?;
    if unsafe { libc::access(c_path.as_ptr(), mode) } == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EACCES) => Ok(false),
        _ => Err(io_error(path, err)),
    }
}

fn already_exists(path: &str) -> FsError {
    FsError::Os {
        kind: FailureKind::AlreadyExists,
        path: path.to_string(),
        code: libc::EEXIST as i64,
    }
}

/// Set `owner_bit` plus its group/other twins where those classes can read, or clear all three
fn update_mode(path: &str, native: &NativePath, owner_bit: u32, flag: bool) -> Result<()> {
    let mode = metadata(path, native)?.permissions().mode() & 0o7777;
    let group_bit = owner_bit >> 3;
    let other_bit = owner_bit >> 6;

    let new_mode = if flag {
        let mut mode = mode | owner_bit;
        if mode & 0o040 != 0 {
            mode |= group_bit;
        }
        if mode & 0o004 != 0 {
            mode |= other_bit;
        }
        mode
    } else {
        mode & !(owner_bit | group_bit | other_bit)
    };

    fs::set_permissions(native.as_path(), Permissions::from_mode(new_mode))
        .map_err(|e| io_error(path, e))
}

/// Failures that mean "not there" rather than "cannot tell"
fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::ENOENT) | Some(libc::ENOTDIR))
}

pub fn exists(path: &str, native: &NativePath) -> Result<bool> {
    match fs::metadata(native.as_path()) {
        Ok(_) => Ok(true),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(io_error(path, e)),
    }
}

pub fn can_read(path: &str, native: &NativePath) -> Result<bool> {
    access(path, native, libc::R_OK)
}

pub fn can_write(path: &str, native: &NativePath) -> Result<bool> {
    Ok(!metadata(path, native)?.permissions().readonly())
}

pub fn can_execute(path: &str, native: &NativePath) -> Result<bool> {
    if metadata(path, native)?.is_dir() {
        return Ok(false);
    }
    access(path, native, libc::X_OK)
}

pub fn is_directory(path: &str, native: &NativePath) -> Result<bool> {
    Ok(metadata(path, native)?.is_dir())
}

/// Directory without following a final symlink
pub fn entry_is_directory(path: &str, native: &NativePath) -> Result<bool> {
    let meta = fs::symlink_metadata(native.as_path()).map_err(|e| io_error(path, e))?;
    Ok(meta.is_dir())
}

pub fn is_link(path: &str, native: &NativePath) -> Result<bool> {
    let meta = fs::symlink_metadata(native.as_path()).map_err(|e| io_error(path, e))?;
    Ok(meta.file_type().is_symlink())
}

pub fn is_reparse(path: &str, native: &NativePath) -> Result<bool> {
    is_link(path, native)
}

pub fn is_device(path: &str, native: &NativePath) -> Result<bool> {
    let file_type = metadata(path, native)?.file_type();
    Ok(file_type.is_char_device() || file_type.is_block_device())
}

/// Dot files are hidden
pub fn is_hidden(path: &str, native: &NativePath) -> Result<bool> {
    fs::symlink_metadata(native.as_path()).map_err(|e| io_error(path, e))?;
    Ok(native
        .as_path()
        .file_name()
        .map_or(false, |name| name.as_bytes().starts_with(b".")))
}

pub fn created(path: &str, native: &NativePath) -> Result<DateTime<Utc>> {
    let created = metadata(path, native)?
        .created()
        .map_err(|e| io_error(path, e))?;
    Ok(DateTime::<Utc>::from(created))
}

pub fn last_modified(path: &str, native: &NativePath) -> Result<DateTime<Utc>> {
    let modified = metadata(path, native)?
        .modified()
        .map_err(|e| io_error(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

pub fn set_last_modified(path: &str, native: &NativePath, ts: &DateTime<Utc>) -> Result<()> {
    let time = std::time::SystemTime::from(*ts);
    let file = fs::File::open(native.as_path()).map_err(|e| io_error(path, e))?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
        .map_err(|e| io_error(path, e))
}

pub fn size(path: &str, native: &NativePath) -> Result<u64> {
    Ok(metadata(path, native)?.len())
}

pub fn set_size(path: &str, native: &NativePath, size: u64) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(native.as_path())
        .map_err(|e| io_error(path, e))?;
    file.set_len(size).map_err(|e| io_error(path, e))
}

pub fn set_writeable(path: &str, native: &NativePath, flag: bool) -> Result<()> {
    update_mode(path, native, 0o200, flag)
}

pub fn set_executable(path: &str, native: &NativePath, flag: bool) -> Result<()> {
    update_mode(path, native, 0o100, flag)
}

pub fn copy_to(path: &str, native: &NativePath, dest: &NativePath, fail_on_overwrite: bool) -> Result<()> {
    if fail_on_overwrite && fs::symlink_metadata(dest.as_path()).is_ok() {
        return Err(already_exists(path));
    }
    fs::copy(native.as_path(), dest.as_path())
        .map(|_| ())
        .map_err(|e| io_error(path, e))
}

pub fn rename_to(path: &str, native: &NativePath, dest: &NativePath, fail_on_overwrite: bool) -> Result<()> {
    if fail_on_overwrite && fs::symlink_metadata(dest.as_path()).is_ok() {
        return Err(already_exists(path));
    }
    fs::rename(native.as_path(), dest.as_path()).map_err(|e| io_error(path, e))
}

pub fn hard_link(path: &str, native: &NativePath, dest: &NativePath) -> Result<()> {
    fs::hard_link(native.as_path(), dest.as_path()).map_err(|e| io_error(path, e))
}

pub fn symbolic_link(
    path: &str,
    native: &NativePath,
    dest: &NativePath,
    _capability: &LinkCapability,
) -> Result<()> {
    std::os::unix::fs::symlink(native.as_path(), dest.as_path()).map_err(|e| io_error(path, e))
}

pub fn remove_directory(path: &str, native: &NativePath) -> Result<()> {
    fs::remove_dir(native.as_path()).map_err(|e| io_error(path, e))
}

pub fn delete_file(path: &str, native: &NativePath) -> Result<()> {
    fs::remove_file(native.as_path()).map_err(|e| io_error(path, e))
}

pub fn create_file(path: &str, native: &NativePath) -> Result<bool> {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(native.as_path())
    {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(io_error(path, e)),
    }
}

pub fn create_directory(path: &str, native: &NativePath) -> Result<()> {
    fs::create_dir(native.as_path()).map_err(|e| io_error(path, e))
}

fn statvfs(path: &str, native: &NativePath) -> Result<libc::statvfs> {
    let c_path = c_path(path, native)?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) } != 0 {
        return Err(io_error(path, std::io::Error::last_os_error()));
    }
    Ok(stat)
}

#[allow(clippy::unnecessary_cast)]
pub fn total_space(path: &str, native: &NativePath) -> Result<u64> {
    let stat = statvfs(path, native)?;
    Ok(stat.f_blocks as u64 * stat.f_frsize as u64)
}

#[allow(clippy::unnecessary_cast)]
pub fn usable_space(path: &str, native: &NativePath) -> Result<u64> {
    let stat = statvfs(path, native)?;
    Ok(stat.f_bavail as u64 * stat.f_frsize as u64)
}

#[allow(clippy::unnecessary_cast)]
pub fn free_space(path: &str, native: &NativePath) -> Result<u64> {
    let stat = statvfs(path, native)?;
    Ok(stat.f_bfree as u64 * stat.f_frsize as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_absent_errors() {
        assert!(is_absent(&io::Error::from_raw_os_error(libc::ENOENT)));
        assert!(is_absent(&io::Error::from_raw_os_error(libc::ENOTDIR)));
        assert!(!is_absent(&io::Error::from_raw_os_error(libc::EIO)));
    }

    #[test]
    fn test_access_denied_is_not_absent() {
        let err = io::Error::from_raw_os_error(libc::EACCES);
        assert!(!is_absent(&err));

        let fs_err = io_error("/locked/inside.txt", err);
        assert_eq!(fs_err.kind(), Some(FailureKind::AccessDenied));
        assert_eq!(fs_err.code(), Some(libc::EACCES as i64));
        assert_eq!(fs_err.path(), Some("/locked/inside.txt"));
    }
}
