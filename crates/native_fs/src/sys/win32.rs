//! Win32 backend (wide-character `...W` calls)

use crate::capability::LinkCapability;
use crate::device::is_device_path;
use crate::error::win32::{self as codes, code_from_hresult};
use crate::filetime::{from_filetime, to_filetime};
use crate::native_path::NativePath;
use crate::{FsError, Result};
use chrono::{DateTime, Utc};
use windows::Win32::Foundation::{CloseHandle, GetLastError, BOOL, FILETIME, GENERIC_WRITE, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CopyFileW, CreateDirectoryW, CreateFileW, CreateHardLinkW, CreateSymbolicLinkW, DeleteFileW,
    GetDiskFreeSpaceExW, GetFileAttributesExW, GetFileAttributesW, GetFileExInfoStandard,
    MoveFileExW, RemoveDirectoryW, SetEndOfFile, SetFileAttributesW, SetFilePointerEx, SetFileTime,
    CREATE_NEW, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_READONLY,
    FILE_ATTRIBUTE_REPARSE_POINT, FILE_BEGIN, FILE_CREATION_DISPOSITION,
    FILE_FLAGS_AND_ATTRIBUTES, FILE_FLAG_BACKUP_SEMANTICS, FILE_SHARE_MODE, FILE_SHARE_READ,
    FILE_SHARE_WRITE, FILE_WRITE_ATTRIBUTES, INVALID_FILE_ATTRIBUTES, MOVEFILE_REPLACE_EXISTING,
    MOVE_FILE_FLAGS, OPEN_EXISTING, SYMBOLIC_LINK_FLAGS,
    SYMBOLIC_LINK_FLAG_ALLOW_UNPRIVILEGED_CREATE, SYMBOLIC_LINK_FLAG_DIRECTORY,
    WIN32_FILE_ATTRIBUTE_DATA,
};

/// Native handle scoped to a single call, closed on drop
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    fn open(
        path: &str,
        native: &NativePath,
        access: u32,
        share: FILE_SHARE_MODE,
        disposition: FILE_CREATION_DISPOSITION,
        flags: FILE_FLAGS_AND_ATTRIBUTES,
    ) -> Result<Self> {
        let handle = unsafe {
            CreateFileW(
                native.as_pcwstr(),
                access,
                share,
                None,
                disposition,
                flags,
                HANDLE::default(),
            )
        }
        .map_err(|e| translate(path, &e))?;
        Ok(Self(handle))
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }
}

fn last_error_code() -> u32 {
    unsafe { GetLastError() }.0
}

fn last_error(path: &str) -> FsError {
    FsError::from_os_code(path, last_error_code() as i64)
}

fn translate(path: &str, err: &windows::core::Error) -> FsError {
    FsError::from_os_code(path, code_from_hresult(err.code().0) as i64)
}

/// Attribute bits, or the raw status code on failure
fn raw_attributes(native: &NativePath) -> std::result::Result<u32, u32> {
    let attr = unsafe { GetFileAttributesW(native.as_pcwstr()) };
    if attr == INVALID_FILE_ATTRIBUTES {
        Err(last_error_code())
    } else {
        Ok(attr)
    }
}

fn attributes(path: &str, native: &NativePath) -> Result<u32> {
    raw_attributes(native).map_err(|code| FsError::from_os_code(path, code as i64))
}

fn attribute_data(path: &str, native: &NativePath) -> Result<WIN32_FILE_ATTRIBUTE_DATA> {
    let mut data = WIN32_FILE_ATTRIBUTE_DATA::default();
    unsafe {
        GetFileAttributesExW(
            native.as_pcwstr(),
            GetFileExInfoStandard,
            &mut data as *mut _ as *mut _,
        )
    }
    .map_err(|e| translate(path, &e))?;
    Ok(data)
}

pub fn exists(path: &str, native: &NativePath) -> Result<bool> {
    match raw_attributes(native) {
        Ok(_) => Ok(true),
        Err(
            codes::ERROR_FILE_NOT_FOUND
            | codes::ERROR_PATH_NOT_FOUND
            | codes::ERROR_NOT_READY
            | codes::ERROR_INVALID_DRIVE,
        ) => Ok(false),
        Err(code) => Err(FsError::from_os_code(path, code as i64)),
    }
}

pub fn can_read(path: &str, native: &NativePath) -> Result<bool> {
    match raw_attributes(native) {
        Ok(_) => Ok(true),
        Err(codes::ERROR_ACCESS_DENIED) => Ok(false),
        Err(code) => Err(FsError::from_os_code(path, code as i64)),
    }
}

pub fn can_write(path: &str, native: &NativePath) -> Result<bool> {
    let attr = attributes(path, native)?;
    Ok(attr & FILE_ATTRIBUTE_READONLY.0 == 0)
}

/// Executability is derived from the extension on this platform
pub fn can_execute(path: &str, _native: &NativePath) -> Result<bool> {
    Ok(std::path::Path::new(path)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("exe")))
}

pub fn is_directory(path: &str, native: &NativePath) -> Result<bool> {
    let attr = attributes(path, native)?;
    Ok(attr & FILE_ATTRIBUTE_DIRECTORY.0 != 0)
}

/// Attributes describe the entry itself, so directory links report as directories
pub fn entry_is_directory(path: &str, native: &NativePath) -> Result<bool> {
    is_directory(path, native)
}

pub fn is_link(path: &str, native: &NativePath) -> Result<bool> {
    let attr = attributes(path, native)?;
    Ok(attr & FILE_ATTRIBUTE_DIRECTORY.0 == 0 && attr & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0)
}

/// Any reparse point, including directory links and junctions
pub fn is_reparse(path: &str, native: &NativePath) -> Result<bool> {
    let attr = attributes(path, native)?;
    Ok(attr & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0)
}

pub fn is_device(path: &str, _native: &NativePath) -> Result<bool> {
    Ok(is_device_path(path))
}

pub fn is_hidden(path: &str, native: &NativePath) -> Result<bool> {
    let attr = attributes(path, native)?;
    Ok(attr & FILE_ATTRIBUTE_HIDDEN.0 != 0)
}

pub fn created(path: &str, native: &NativePath) -> Result<DateTime<Utc>> {
    let data = attribute_data(path, native)?;
    let ft = data.ftCreationTime;
    Ok(from_filetime(ft.dwLowDateTime, ft.dwHighDateTime))
}

pub fn last_modified(path: &str, native: &NativePath) -> Result<DateTime<Utc>> {
    let data = attribute_data(path, native)?;
    let ft = data.ftLastWriteTime;
    Ok(from_filetime(ft.dwLowDateTime, ft.dwHighDateTime))
}

pub fn set_last_modified(path: &str, native: &NativePath, ts: &DateTime<Utc>) -> Result<()> {
    let (low, high) = to_filetime(ts);
    let ft = FILETIME {
        dwLowDateTime: low,
        dwHighDateTime: high,
    };
    let handle = OwnedHandle::open(
        path,
        native,
        FILE_WRITE_ATTRIBUTES.0,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        OPEN_EXISTING,
        FILE_FLAG_BACKUP_SEMANTICS,
    )?;
    unsafe { SetFileTime(handle.0, None, Some(&ft as *const _), Some(&ft as *const _)) }
        .map_err(|e| translate(path, &e))
}

pub fn size(path: &str, native: &NativePath) -> Result<u64> {
    let data = attribute_data(path, native)?;
    Ok((data.nFileSizeHigh as u64) << 32 | data.nFileSizeLow as u64)
}

pub fn set_size(path: &str, native: &NativePath, size: u64) -> Result<()> {
    let handle = OwnedHandle::open(
        path,
        native,
        GENERIC_WRITE.0,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        OPEN_EXISTING,
        FILE_FLAGS_AND_ATTRIBUTES(0),
    )?;
    let offset = i64::try_from(size).map_err(|_| {
        FsError::from_os_code(path, codes::ERROR_NEGATIVE_SEEK as i64)
    })?;
    unsafe { SetFilePointerEx(handle.0, offset, None, FILE_BEGIN) }
        .map_err(|e| translate(path, &e))?;
    unsafe { SetEndOfFile(handle.0) }.map_err(|e| translate(path, &e))
}

pub fn set_writeable(path: &str, native: &NativePath, flag: bool) -> Result<()> {
    let mut attr = attributes(path, native)?;
    if flag {
        attr &= !FILE_ATTRIBUTE_READONLY.0;
    } else {
        attr |= FILE_ATTRIBUTE_READONLY.0;
    }
    unsafe { SetFileAttributesW(native.as_pcwstr(), FILE_FLAGS_AND_ATTRIBUTES(attr)) }
        .map_err(|e| translate(path, &e))
}

/// No-op: executability follows the file extension here, there is no bit to set.
pub fn set_executable(_path: &str, _native: &NativePath, _flag: bool) -> Result<()> {
    Ok(())
}

pub fn copy_to(path: &str, native: &NativePath, dest: &NativePath, fail_on_overwrite: bool) -> Result<()> {
    unsafe { CopyFileW(native.as_pcwstr(), dest.as_pcwstr(), BOOL::from(fail_on_overwrite)) }
        .map_err(|e| translate(path, &e))
}

pub fn rename_to(path: &str, native: &NativePath, dest: &NativePath, fail_on_overwrite: bool) -> Result<()> {
    let flags = if fail_on_overwrite {
        MOVE_FILE_FLAGS(0)
    } else {
        MOVEFILE_REPLACE_EXISTING
    };
    unsafe { MoveFileExW(native.as_pcwstr(), dest.as_pcwstr(), flags) }
        .map_err(|e| translate(path, &e))
}

pub fn hard_link(path: &str, native: &NativePath, dest: &NativePath) -> Result<()> {
    unsafe { CreateHardLinkW(dest.as_pcwstr(), native.as_pcwstr(), None) }
        .map_err(|e| translate(path, &e))
}

pub fn symbolic_link(
    path: &str,
    native: &NativePath,
    dest: &NativePath,
    capability: &LinkCapability,
) -> Result<()> {
    let mut flags = SYMBOLIC_LINK_FLAGS(0);
    if is_directory(path, native)? {
        flags |= SYMBOLIC_LINK_FLAG_DIRECTORY;
    }

    if capability.allow_unprivileged() {
        let unprivileged = flags | SYMBOLIC_LINK_FLAG_ALLOW_UNPRIVILEGED_CREATE;
        if unsafe { CreateSymbolicLinkW(dest.as_pcwstr(), native.as_pcwstr(), unprivileged) }.as_bool() {
            return Ok(());
        }
        let code = last_error_code();
        if code != codes::ERROR_INVALID_PARAMETER {
            return Err(FsError::from_os_code(path, code as i64));
        }
        // Older builds reject the flag itself
        capability.revoke_unprivileged();
    }

    if unsafe { CreateSymbolicLinkW(dest.as_pcwstr(), native.as_pcwstr(), flags) }.as_bool() {
        Ok(())
    } else {
        Err(last_error(path))
    }
}

pub fn remove_directory(path: &str, native: &NativePath) -> Result<()> {
    unsafe { RemoveDirectoryW(native.as_pcwstr()) }.map_err(|e| translate(path, &e))
}

pub fn delete_file(path: &str, native: &NativePath) -> Result<()> {
    unsafe { DeleteFileW(native.as_pcwstr()) }.map_err(|e| translate(path, &e))
}

pub fn create_file(path: &str, native: &NativePath) -> Result<bool> {
    let opened = unsafe {
        CreateFileW(
            native.as_pcwstr(),
            GENERIC_WRITE.0,
            FILE_SHARE_MODE(0),
            None,
            CREATE_NEW,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            HANDLE::default(),
        )
    };
    match opened {
        Ok(handle) => {
            drop(OwnedHandle(handle));
            Ok(true)
        }
        Err(e) if code_from_hresult(e.code().0) == codes::ERROR_FILE_EXISTS => Ok(false),
        Err(e) => Err(translate(path, &e)),
    }
}

pub fn create_directory(path: &str, native: &NativePath) -> Result<()> {
    unsafe { CreateDirectoryW(native.as_pcwstr(), None) }.map_err(|e| translate(path, &e))
}

/// `(caller available, total, total free)` bytes of the volume holding `native`
fn disk_space(path: &str, native: &NativePath) -> Result<(u64, u64, u64)> {
    let mut available = 0u64;
    let mut total = 0u64;
    let mut free = 0u64;
    unsafe {
        GetDiskFreeSpaceExW(
            native.as_pcwstr(),
            Some(&mut available as *mut u64),
            Some(&mut total as *mut u64),
            Some(&mut free as *mut u64),
        )
    }
    .map_err(|e| translate(path, &e))?;
    Ok((available, total, free))
}

pub fn total_space(path: &str, native: &NativePath) -> Result<u64> {
    disk_space(path, native).map(|(_, total, _)| total)
}

pub fn usable_space(path: &str, native: &NativePath) -> Result<u64> {
    disk_space(path, native).map(|(available, _, _)| available)
}

pub fn free_space(path: &str, native: &NativePath) -> Result<u64> {
    disk_space(path, native).map(|(_, _, free)| free)
}
