use anyhow::Error;
use std::io::{self, Write};

use crate::engine::CheckOutcome;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub quiet: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Alert,
    Warn,
    Ok,
    Dim,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "エラー:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "原因:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "次に:");
    let _ = writeln!(
        stderr,
        "  - パスが存在し、読み取り/書き込み可能か確認してください"
    );
    let _ = writeln!(
        stderr,
        "  - 利用可能なコマンド/オプションは `seccheck --help` を参照してください"
    );
}

pub fn eprintln_warning(message: &str, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let color = cfg.color && cfg.stderr_is_tty;
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{} {message}", paint("[!]", Tone::Warn, color));
}

pub fn print_check(outcome: &CheckOutcome, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let color = cfg.color;
    let entry = &outcome.entry;
    let mut out = io::stdout().lock();

    let _ = writeln!(out, "走査ディレクトリ: {}", entry.directory.display());
    if entry.findings.is_empty() {
        let _ = writeln!(
            out,
            "{} world-writable なファイルは見つかりませんでした。",
            paint("[+]", Tone::Ok, color)
        );
    } else {
        let _ = writeln!(
            out,
            "{} world-writable なファイルが {} 件見つかりました:",
            paint("[!]", Tone::Alert, color),
            entry.findings.len()
        );
        for finding in &entry.findings {
            let _ = writeln!(out, "   - {}", finding.path.display());
        }
    }
    if cfg.verbose {
        let _ = writeln!(
            out,
            "{}",
            paint(
                &format!(
                    "    確認したファイル={} スキップ={}",
                    outcome.dir_scan.files_checked,
                    outcome.dir_scan.skipped()
                ),
                Tone::Dim,
                color
            )
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "走査ログ: {}", entry.log_path.display());
    let counts = entry
        .counts
        .iter()
        .map(|(k, n)| format!("{k}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let tone = if entry.counts.total() > 0 {
        Tone::Warn
    } else {
        Tone::Ok
    };
    let _ = writeln!(out, "{} {counts}", paint("[+]", tone, color));
    if cfg.verbose {
        let _ = writeln!(
            out,
            "{}",
            paint(
                &format!("    行数={}", outcome.log_scan.lines),
                Tone::Dim,
                color
            )
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "レポートに追記しました: {}",
        outcome.report_path.display()
    );
}

fn paint(s: &str, tone: Tone, color: bool) -> String {
    if !color {
        return s.to_string();
    }
    let code = match tone {
        Tone::Alert => "31",
        Tone::Warn => "33",
        Tone::Ok => "32",
        Tone::Dim => "90",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}
