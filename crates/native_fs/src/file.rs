//! File - path handle with call-through operations

use crate::capability::{self, LinkCapability};
use crate::native_path::{strip_trailing_separator, NativePath};
use crate::{sys, FailureKind, FsError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, MAIN_SEPARATOR};

/// Behaviour when the destination of a copy or rename already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub fail_on_overwrite: bool,
}

impl CopyOptions {
    /// Replace an existing destination
    pub fn replace() -> Self {
        Self {
            fail_on_overwrite: false,
        }
    }

    /// Fail with `AlreadyExists` if the destination exists
    pub fn fail_on_overwrite() -> Self {
        Self {
            fail_on_overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Hard,
    Symbolic,
}

/// A portable path paired with its native encoding.
///
/// Holds no OS resource; every query opens and releases whatever it needs
/// within the call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    path: String,
    native: NativePath,
}

impl File {
    pub fn new<S: AsRef<str>>(path: S) -> Self {
        let mut file = Self::default();
        file.set_path(path);
        file
    }

    /// Reassign the handle to another path
    pub fn set_path<S: AsRef<str>>(&mut self, path: S) {
        self.path = strip_trailing_separator(path.as_ref()).to_string();
        self.native = NativePath::new(&self.path);
    }

    /// Portable path as given (minus a trailing separator)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn native(&self) -> &NativePath {
        &self.native
    }

    fn checked(&self) -> Result<(&str, &NativePath)> {
        if self.path.is_empty() {
            return Err(FsError::empty_path());
        }
        Ok((&self.path, &self.native))
    }

    /// `false` when the path (or one of its parents) is absent; other failures escalate
    pub fn exists(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        tracing::trace!("exists: {}", path);
        sys::exists(path, native)
    }

    pub fn can_read(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::can_read(path, native)
    }

    pub fn can_write(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::can_write(path, native)
    }

    pub fn can_execute(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::can_execute(path, native)
    }

    pub fn is_file(&self) -> Result<bool> {
        Ok(!self.is_directory()? && !self.is_device()?)
    }

    pub fn is_directory(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::is_directory(path, native)
    }

    pub fn is_link(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::is_link(path, native)
    }

    pub fn is_device(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::is_device(path, native)
    }

    pub fn is_hidden(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        sys::is_hidden(path, native)
    }

    pub fn created(&self) -> Result<DateTime<Utc>> {
        let (path, native) = self.checked()?;
        sys::created(path, native)
    }

    pub fn last_modified(&self) -> Result<DateTime<Utc>> {
        let (path, native) = self.checked()?;
        sys::last_modified(path, native)
    }

    /// Set both the last-write and last-access time
    pub fn set_last_modified(&self, ts: &DateTime<Utc>) -> Result<()> {
        let (path, native) = self.checked()?;
        tracing::debug!("set_last_modified: {} -> {}", path, ts);
        sys::set_last_modified(path, native, ts)
    }

    pub fn size(&self) -> Result<u64> {
        let (path, native) = self.checked()?;
        sys::size(path, native)
    }

    /// Truncate or extend (zero filled) to `size` bytes
    pub fn set_size(&self, size: u64) -> Result<()> {
        let (path, native) = self.checked()?;
        tracing::debug!("set_size: {} -> {}", path, size);
        sys::set_size(path, native, size)
    }

    pub fn set_writeable(&self, flag: bool) -> Result<()> {
        let (path, native) = self.checked()?;
        tracing::debug!("set_writeable: {} -> {}", path, flag);
        sys::set_writeable(path, native, flag)
    }

    pub fn set_read_only(&self, flag: bool) -> Result<()> {
        self.set_writeable(!flag)
    }

    /// On Windows this does nothing: executability comes from the extension.
    pub fn set_executable(&self, flag: bool) -> Result<()> {
        let (path, native) = self.checked()?;
        tracing::debug!("set_executable: {} -> {}", path, flag);
        sys::set_executable(path, native, flag)
    }

    pub fn copy_to<S: AsRef<str>>(&self, dest: S, options: CopyOptions) -> Result<()> {
        let (path, native) = self.checked()?;
        let dest = Self::new(dest);
        tracing::debug!("copy: {} -> {} ({:?})", path, dest.path, options);
        sys::copy_to(path, native, &dest.native, options.fail_on_overwrite)
    }

    /// Move to `dest`; on success the handle points at `dest`
    pub fn rename_to<S: AsRef<str>>(&mut self, dest: S, options: CopyOptions) -> Result<()> {
        let (path, native) = self.checked()?;
        let dest = Self::new(dest);
        tracing::debug!("rename: {} -> {} ({:?})", path, dest.path, options);
        sys::rename_to(path, native, &dest.native, options.fail_on_overwrite)?;
        *self = dest;
        Ok(())
    }

    /// Create a link at `dest` pointing to this path
    pub fn link_to<S: AsRef<str>>(&self, dest: S, link_type: LinkType) -> Result<()> {
        self.link_with(dest, link_type, capability::current())
    }

    /// `link_to` under an explicit capability instead of the process-wide one
    pub fn link_with<S: AsRef<str>>(
        &self,
        dest: S,
        link_type: LinkType,
        capability: &LinkCapability,
    ) -> Result<()> {
        let (path, native) = self.checked()?;
        let dest = Self::new(dest);
        tracing::debug!("link ({:?}): {} -> {}", link_type, dest.path, path);
        match link_type {
            LinkType::Hard => sys::hard_link(path, native, &dest.native),
            LinkType::Symbolic => {
                if !capability.symlinks() {
                    return Err(FsError::NotImplemented(
                        "Symbolic link support is disabled".to_string(),
                    ));
                }
                sys::symbolic_link(path, native, &dest.native, capability)
            }
        }
    }

    /// Delete a file or an empty directory. Links are removed, not followed.
    pub fn remove(&self) -> Result<()> {
        let (path, native) = self.checked()?;
        tracing::debug!("remove: {}", path);
        if sys::entry_is_directory(path, native)? {
            sys::remove_directory(path, native)
        } else {
            sys::delete_file(path, native)
        }
    }

    /// Delete a directory tree, children first
    pub fn remove_recursive(&self) -> Result<()> {
        let (path, native) = self.checked()?;
        if !sys::is_reparse(path, native)? && sys::entry_is_directory(path, native)? {
            for name in self.list()? {
                self.child(&name).remove_recursive()?;
            }
        }
        self.remove()
    }

    /// Entry names of a directory
    pub fn list(&self) -> Result<Vec<String>> {
        let (path, native) = self.checked()?;
        let entries =
            std::fs::read_dir(native.to_path_buf()).map_err(|e| FsError::from_io(path, &e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(path, &e))?;
            let name = entry.file_name().into_string().map_err(|_| FsError::Os {
                kind: FailureKind::PathSyntax,
                path: path.to_string(),
                code: 0,
            })?;
            names.push(name);
        }
        Ok(names)
    }

    fn child(&self, name: &str) -> Self {
        if self.path.ends_with(std::path::is_separator) {
            Self::new(format!("{}{}", self.path, name))
        } else {
            Self::new(format!("{}{}{}", self.path, MAIN_SEPARATOR, name))
        }
    }

    /// Create an empty file; `false` if it already exists
    pub fn create_file(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        let created = sys::create_file(path, native)?;
        tracing::debug!("create_file: {} (created: {})", path, created);
        Ok(created)
    }

    /// Create the directory; `false` if it already exists as a directory.
    /// A same-named file is an `AlreadyExists` failure.
    pub fn create_directory(&self) -> Result<bool> {
        let (path, native) = self.checked()?;
        if self.exists()? && self.is_directory()? {
            return Ok(false);
        }
        sys::create_directory(path, native)?;
        tracing::debug!("create_directory: {}", path);
        Ok(true)
    }

    /// Create the directory and any missing ancestors
    pub fn create_directories(&self) -> Result<bool> {
        self.checked()?;
        if self.exists()? && self.is_directory()? {
            return Ok(false);
        }

        if let Some(parent) = Path::new(&self.path).parent().and_then(Path::to_str) {
            if !parent.is_empty() {
                let parent = Self::new(parent);
                if !parent.exists()? {
                    parent.create_directories()?;
                }
            }
        }
        self.create_directory()
    }

    /// Size in bytes of the volume holding this path
    pub fn total_space(&self) -> Result<u64> {
        let (path, native) = self.checked()?;
        sys::total_space(path, native)
    }

    /// Bytes available to the calling user, honouring quotas
    pub fn usable_space(&self) -> Result<u64> {
        let (path, native) = self.checked()?;
        sys::usable_space(path, native)
    }

    pub fn free_space(&self) -> Result<u64> {
        let (path, native) = self.checked()?;
        sys::free_space(path, native)
    }
}

impl From<&str> for File {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for File {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinksConfig, SymlinkPolicy};
    use std::fs;
    use tempfile::TempDir;

    fn file_in(dir: &TempDir, name: &str) -> File {
        File::new(dir.path().join(name).to_str().unwrap())
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "missing.txt");
        assert!(!file.exists().unwrap());

        let nested = file_in(&dir, "no/such/dir/file.txt");
        assert!(!nested.exists().unwrap());

        assert!(file.create_file().unwrap());
        assert!(file.exists().unwrap());
        assert!(file.is_file().unwrap());
        assert!(!file.is_directory().unwrap());
    }

    #[test]
    fn test_create_file_twice() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "once.txt");
        assert!(file.create_file().unwrap());
        assert!(!file.create_file().unwrap());
        assert_eq!(file.size().unwrap(), 0);
    }

    #[test]
    fn test_trailing_separator_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().to_str().unwrap().to_string();
        let with_sep = format!("{}{}", plain, MAIN_SEPARATOR);
        assert_eq!(File::new(&with_sep), File::new(&plain));
        assert!(File::new(&with_sep).is_directory().unwrap());
    }

    #[test]
    fn test_set_size() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "sized.bin");
        fs::write(dir.path().join("sized.bin"), b"hello world").unwrap();

        file.set_size(5).unwrap();
        assert_eq!(file.size().unwrap(), 5);
        assert_eq!(fs::read(dir.path().join("sized.bin")).unwrap(), b"hello");

        file.set_size(8).unwrap();
        assert_eq!(file.size().unwrap(), 8);
        assert_eq!(fs::read(dir.path().join("sized.bin")).unwrap(), b"hello\0\0\0");
    }

    #[test]
    fn test_create_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = file_in(&dir, "sub");
        assert!(sub.create_directory().unwrap());
        assert!(!sub.create_directory().unwrap());
        assert!(sub.is_directory().unwrap());

        let clash = file_in(&dir, "clash");
        clash.create_file().unwrap();
        let err = clash.create_directory().unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::AlreadyExists));
        assert_eq!(err.path(), Some(clash.path()));
    }

    #[test]
    fn test_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let deep = file_in(&dir, "a/b/c");
        assert!(deep.create_directories().unwrap());
        assert!(deep.is_directory().unwrap());
        assert!(!deep.create_directories().unwrap());
    }

    #[test]
    fn test_copy_to() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("src.txt"), b"payload").unwrap();
        fs::write(dir.path().join("dst.txt"), b"old").unwrap();
        let src = file_in(&dir, "src.txt");
        let dst = file_in(&dir, "dst.txt");

        let err = src.copy_to(dst.path(), CopyOptions::fail_on_overwrite()).unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::AlreadyExists));
        assert_eq!(err.path(), Some(src.path()));
        assert_eq!(fs::read(dir.path().join("dst.txt")).unwrap(), b"old");

        src.copy_to(dst.path(), CopyOptions::replace()).unwrap();
        assert_eq!(fs::read(dir.path().join("dst.txt")).unwrap(), b"payload");
        assert!(src.exists().unwrap());
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = file_in(&dir, "ghost.txt");
        let err = src
            .copy_to(file_in(&dir, "copy.txt").path(), CopyOptions::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rename_to() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("from.txt"), b"data").unwrap();
        fs::write(dir.path().join("taken.txt"), b"keep").unwrap();
        let mut file = file_in(&dir, "from.txt");
        let original = file.path().to_string();

        let err = file
            .rename_to(file_in(&dir, "taken.txt").path(), CopyOptions::fail_on_overwrite())
            .unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::AlreadyExists));
        assert_eq!(file.path(), original);

        let target = file_in(&dir, "to.txt");
        file.rename_to(target.path(), CopyOptions::default()).unwrap();
        assert_eq!(file, target);
        assert!(!File::new(&original).exists().unwrap());
        assert_eq!(file.size().unwrap(), 4);
    }

    #[test]
    fn test_hard_link() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("target.txt"), b"shared").unwrap();
        let target = file_in(&dir, "target.txt");
        let link = file_in(&dir, "hard.txt");

        target.link_to(link.path(), LinkType::Hard).unwrap();
        assert_eq!(link.size().unwrap(), 6);
        assert!(!link.is_link().unwrap());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "gone.txt");
        file.create_file().unwrap();
        file.remove().unwrap();
        assert!(!file.exists().unwrap());

        let sub = file_in(&dir, "full");
        sub.create_directory().unwrap();
        sub.child("inner.txt").create_file().unwrap();
        let err = sub.remove().unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::DirectoryNotEmpty));
    }

    #[test]
    fn test_child_at_root() {
        let root = File::new(MAIN_SEPARATOR.to_string());
        assert_eq!(root.child("tmp").path(), format!("{}tmp", MAIN_SEPARATOR));

        let dir = File::new(format!("{}tmp", MAIN_SEPARATOR));
        assert_eq!(
            dir.child("x").path(),
            format!("{}tmp{}x", MAIN_SEPARATOR, MAIN_SEPARATOR)
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_child_at_drive_root() {
        assert_eq!(File::new(r"C:\").child("Windows").path(), r"C:\Windows");
    }

    #[test]
    fn test_remove_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let root = file_in(&dir, "tree");
        root.child("x/y").create_directories().unwrap();
        root.child("x/y/leaf.txt").create_file().unwrap();
        root.child("top.txt").create_file().unwrap();

        let mut names = root.list().unwrap();
        names.sort();
        assert_eq!(names, vec!["top.txt", "x"]);

        root.remove_recursive().unwrap();
        assert!(!root.exists().unwrap());
    }

    #[test]
    fn test_last_modified_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "stamp.txt");
        file.create_file().unwrap();

        let ts = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
        file.set_last_modified(&ts).unwrap();
        assert_eq!(file.last_modified().unwrap(), ts);
    }

    #[test]
    fn test_set_writeable() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "locked.txt");
        file.create_file().unwrap();
        assert!(file.can_write().unwrap());
        assert!(file.can_read().unwrap());

        file.set_writeable(false).unwrap();
        assert!(!file.can_write().unwrap());

        file.set_read_only(false).unwrap();
        assert!(file.can_write().unwrap());
    }

    #[test]
    fn test_missing_file_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "absent.bin");
        let err = file.size().unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::NotFound));
        assert_eq!(err.path(), Some(file.path()));
        assert!(err.code().unwrap() != 0);
    }

    #[test]
    fn test_is_hidden_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        for name in [".ghost", "ghost"] {
            let file = file_in(&dir, name);
            let err = file.is_hidden().unwrap_err();
            assert_eq!(err.kind(), Some(FailureKind::NotFound));
            assert_eq!(err.path(), Some(file.path()));
        }
    }

    #[test]
    fn test_symbolic_link_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), b"abc").unwrap();
        let target = file_in(&dir, "real.txt");
        let link = file_in(&dir, "soft.txt");
        let disabled = LinkCapability::from_config(&LinksConfig {
            symlinks: SymlinkPolicy::Disabled,
            allow_unprivileged: true,
        });

        let err = target
            .link_with(link.path(), LinkType::Symbolic, &disabled)
            .unwrap_err();
        assert!(matches!(err, FsError::NotImplemented(_)));
        assert_eq!(err.kind(), None);
        assert!(!link.exists().unwrap());

        // Hard links do not depend on the capability
        target
            .link_with(link.path(), LinkType::Hard, &disabled)
            .unwrap();
        assert_eq!(link.size().unwrap(), 3);
    }

    #[test]
    fn test_empty_path() {
        let err = File::new("").exists().unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::PathSyntax));
    }

    #[test]
    fn test_volume_space() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::new(dir.path().to_str().unwrap());
        let total = file.total_space().unwrap();
        assert!(total > 0);
        assert!(file.free_space().unwrap() <= total);
        assert!(file.usable_space().unwrap() <= total);
    }

    #[cfg(unix)]
    #[test]
    fn test_symbolic_link() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), b"abc").unwrap();
        let target = file_in(&dir, "real.txt");
        let link = file_in(&dir, "soft.txt");

        target.link_to(link.path(), LinkType::Symbolic).unwrap();
        assert!(link.is_link().unwrap());
        assert!(!target.is_link().unwrap());
        assert_eq!(link.size().unwrap(), 3);

        link.remove().unwrap();
        assert!(target.exists().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_set_executable() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_in(&dir, "run.sh");
        file.create_file().unwrap();
        file.set_executable(true).unwrap();
        assert!(file.can_execute().unwrap());
        assert!(!File::new(dir.path().to_str().unwrap()).can_execute().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_hidden_dot_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(file_in(&dir, ".profile").is_hidden().unwrap());
        assert!(!file_in(&dir, "profile").is_hidden().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_exists_under_unreadable_parent() {
        use std::os::unix::fs::PermissionsExt;

        // Permission bits do not bind the superuser
        if unsafe { libc::geteuid() } == 0 {
            eprintln!("skipping test_exists_under_unreadable_parent: running as root");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inside.txt"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = File::new(locked.join("inside.txt").to_str().unwrap()).exists();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.unwrap_err().kind(), Some(FailureKind::AccessDenied));
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_executable_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let exe = file_in(&dir, "tool.EXE");
        exe.create_file().unwrap();
        assert!(exe.can_execute().unwrap());
        exe.set_executable(false).unwrap();
        assert!(exe.can_execute().unwrap());
        assert!(!file_in(&dir, "notes.txt").can_execute().unwrap());
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_device_names() {
        assert!(File::new("NUL").is_device().unwrap());
        assert!(File::new("com3").is_device().unwrap());
        assert!(!File::new(r"C:\Windows").is_device().unwrap());
    }
}
