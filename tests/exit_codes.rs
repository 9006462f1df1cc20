use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

fn seccheck_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_seccheck"));
    cmd.current_dir(home);
    cmd.env("HOME", home);
    cmd.env_remove("SUDO_UID");
    cmd.env_remove("SECCHECK_CONFIG");
    cmd.env_remove("SECCHECK_UI_COLOR");
    cmd.env_remove("SECCHECK_REPORT_PATH");
    cmd.env_remove("SECCHECK_SCAN_EXCLUDE");
    cmd.env_remove("SECCHECK_LOG_ENABLED");
    cmd.stdin(Stdio::null());
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    seccheck_cmd(home).args(args).output().expect("run seccheck")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!("seccheck-exit-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf8 path")
}

#[test]
fn completion_unknown_shell_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["completion", "nope"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn completion_bash_succeeds() {
    let home = make_temp_home();
    let out = run(&home, &["completion", "bash"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("seccheck"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_without_dir_and_no_tty_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["check", "--log", "/nonexistent.log"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!home.join("security_report.txt").exists());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_invalid_exclude_exits_2() {
    let home = make_temp_home();
    let out = run(
        &home,
        &[
            "check",
            "--dir",
            path_str(&home),
            "--log",
            "/nonexistent.log",
            "--exclude",
            "[",
        ],
    );
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_missing_directory_exits_10_and_writes_no_report() {
    let home = make_temp_home();
    let missing = home.join("no-such-dir");
    let out = run(
        &home,
        &["check", "--dir", path_str(&missing), "--log", "/nonexistent.log"],
    );
    assert_eq!(out.status.code(), Some(10));
    assert!(!home.join("security_report.txt").exists());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no-such-dir"), "stderr={stderr}");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_file_as_directory_exits_10() {
    let home = make_temp_home();
    let file = home.join("plain.txt");
    std::fs::write(&file, b"x").expect("write");
    let out = run(
        &home,
        &["check", "--dir", path_str(&file), "--log", "/nonexistent.log"],
    );
    assert_eq!(out.status.code(), Some(10));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_unwritable_report_exits_30() {
    let home = make_temp_home();
    let scan_dir = home.join("scan");
    std::fs::create_dir_all(&scan_dir).expect("mkdir");
    let report_as_dir = home.join("report-is-a-dir");
    std::fs::create_dir_all(&report_as_dir).expect("mkdir");

    let out = run(
        &home,
        &[
            "check",
            "--dir",
            path_str(&scan_dir),
            "--log",
            "/nonexistent.log",
            "--report",
            path_str(&report_as_dir),
        ],
    );
    assert_eq!(out.status.code(), Some(30));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn check_with_findings_still_exits_0() {
    let home = make_temp_home();
    let scan_dir = home.join("scan");
    std::fs::create_dir_all(&scan_dir).expect("mkdir");
    let file = scan_dir.join("open.txt");
    std::fs::write(&file, b"x").expect("write");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o666)).expect("chmod");
    }

    let out = run(
        &home,
        &[
            "--quiet",
            "check",
            "--dir",
            path_str(&scan_dir),
            "--log",
            "/nonexistent.log",
        ],
    );
    assert!(out.status.success());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_config_exits_2() {
    let home = make_temp_home();
    let cfg = home.join("bad.toml");
    std::fs::write(&cfg, b"[report\npath = ").expect("write");
    let out = run(&home, &["--config", path_str(&cfg), "config", "--show"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}
