use std::fs::Metadata;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

/// Home directory of the user behind `sudo`, when there is one.
fn sudo_home_dir() -> Option<PathBuf> {
    let uid = std::env::var("SUDO_UID").ok()?.parse::<u32>().ok()?;
    home_dir_for_uid(uid)
}

pub fn effective_home_dir() -> Result<PathBuf> {
    if let Some(home) = sudo_home_dir() {
        return Ok(home);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("環境変数 HOME が設定されていません"))
}

#[cfg(unix)]
fn home_dir_for_uid(uid: u32) -> Option<PathBuf> {
    use std::ffi::CStr;

    unsafe {
        let bufsize = libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX);
        let bufsize = if bufsize <= 0 {
            16 * 1024
        } else {
            bufsize as usize
        };
        let mut buf = vec![0u8; bufsize];
        let mut pwd: libc::passwd = std::mem::zeroed();
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let rc = libc::getpwuid_r(
            uid as libc::uid_t,
            &mut pwd,
            buf.as_mut_ptr() as *mut libc::c_char,
            buf.len(),
            &mut result,
        );
        if rc != 0 || result.is_null() {
            return None;
        }
        if pwd.pw_dir.is_null() {
            return None;
        }

        let dir = CStr::from_ptr(pwd.pw_dir).to_string_lossy().to_string();
        if dir.trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(dir))
    }
}

#[cfg(not(unix))]
fn home_dir_for_uid(_uid: u32) -> Option<PathBuf> {
    None
}

/// Bit for "write" in the others triad of a POSIX mode.
pub const OTHER_WRITE: u32 = 0o002;

/// Whether `meta` grants write to others. `None` when the platform has no
/// such permission class.
#[cfg(unix)]
pub fn others_can_write(meta: &Metadata) -> Option<bool> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode() & OTHER_WRITE != 0)
}

#[cfg(not(unix))]
pub fn others_can_write(_meta: &Metadata) -> Option<bool> {
    None
}

pub const fn supports_other_write() -> bool {
    cfg!(unix)
}
