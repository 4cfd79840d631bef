//! Win32 device name detection

use crate::native_path::DEVICE_PREFIX;

/// Reserved names that address a device rather than a file
const RESERVED_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL"];

/// Numbered device families (`COM1`..`COM9`, `LPT1`..`LPT9`)
const NUMBERED_DEVICES: &[&str] = &["COM", "LPT"];

/// Check if a whole path names a device
pub fn is_device_path(path: &str) -> bool {
    if path.starts_with(DEVICE_PREFIX) {
        return true;
    }

    if RESERVED_NAMES.iter().any(|name| path.eq_ignore_ascii_case(name)) {
        return true;
    }

    let bytes = path.as_bytes();
    bytes.len() == 4
        && NUMBERED_DEVICES
            .iter()
            .any(|family| bytes[..3].eq_ignore_ascii_case(family.as_bytes()))
        && matches!(bytes[3], b'1'..=b'9')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_device_path("CON"));
        assert!(is_device_path("nul"));
        assert!(is_device_path("Aux"));
        assert!(!is_device_path("CON.txt"));
        assert!(!is_device_path(r"C:\CON"));
    }

    #[test]
    fn test_numbered_devices() {
        assert!(is_device_path("COM1"));
        assert!(is_device_path("lpt9"));
        assert!(!is_device_path("COM0"));
        assert!(!is_device_path("LPT10"));
        assert!(!is_device_path("COMX"));
    }

    #[test]
    fn test_device_namespace() {
        assert!(is_device_path(r"\\.\PhysicalDrive0"));
        assert!(!is_device_path(r"\\?\C:\data"));
    }
}
