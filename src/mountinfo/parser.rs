//! Minimal parser for lines in `/proc/[pid]/mountinfo` format.
//!
//! See [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html).
//! Only the fields needed to locate a filesystem by type are extracted.

use std::borrow::Cow;

/// The subset of a mountinfo line used for cgroup root detection.
#[derive(Debug, PartialEq, Eq)]
pub struct MountEntry<'a> {
    /// Mount point relative to the process's root, with octal escapes decoded.
    pub mount_point: Cow<'a, str>,
    /// Filesystem type (e.g., `ext4`, `cgroup2`).
    pub fs_type: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing separator ` - `")]
    MissingSeparator,
    #[error("missing mount point field")]
    MissingMountPoint,
    #[error("missing filesystem type field")]
    MissingFsType,
}

/// Parses a single mountinfo line.
///
/// The mount point is the fifth field before the ` - ` separator and the
/// filesystem type is the first field after it. Optional fields between the
/// two are skipped.
///
/// # Errors
///
/// Returns a [`ParseError`] if the separator or one of the two fields is missing.
pub fn parse_mount_entry(line: &str) -> Result<MountEntry<'_>, ParseError> {
    let (pre, post) = line
        .split_once(" - ")
        .ok_or(ParseError::MissingSeparator)?;

    let mount_point = pre
        .split_whitespace()
        .nth(4)
        .ok_or(ParseError::MissingMountPoint)?;
    let fs_type = post
        .split_whitespace()
        .next()
        .ok_or(ParseError::MissingFsType)?;

    Ok(MountEntry {
        mount_point: unescape(mount_point),
        fs_type,
    })
}

/// Decodes the `\ooo` octal escapes the kernel uses for spaces, tabs,
/// newlines and backslashes in mount paths.
fn unescape(field: &str) -> Cow<'_, str> {
    if !field.contains('\\') {
        return Cow::Borrowed(field);
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}
