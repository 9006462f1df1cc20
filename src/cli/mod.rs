use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::EffectiveConfig;
use crate::engine::{CheckRequest, Engine, EngineOptions};
use crate::ui::UiConfig;

mod interactive;

#[derive(Debug, Parser)]
#[command(
    name = "seccheck",
    version,
    about = "world-writable なファイルとログ中の FAILED/ERROR/DENIED を検査し、結果をレポートに追記する"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// ディレクトリ走査の制限時間（秒、0 で無制限）
    #[arg(long, default_value_t = 0, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Check(CheckArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// world-writable を検査するディレクトリ
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// FAILED/ERROR/DENIED を数えるログファイル
    #[arg(long)]
    pub log: Option<PathBuf>,
    /// 追記先のレポートファイル
    #[arg(long)]
    pub report: Option<PathBuf>,
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::platform::effective_home_dir()?;

    let env_config_path = std::env::var_os("SECCHECK_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Check(args) => {
            let opts = EngineOptions {
                timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
                show_progress: ui_cfg.stderr_is_tty && !cli.quiet && !cli.json,
            };
            run_check(args, opts, &cfg, &ui_cfg, &home_dir, cli.json)?;
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "seccheck", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: `seccheck config --show` を使用してください");
            }
        }
    }

    Ok(())
}

fn run_check(
    args: CheckArgs,
    opts: EngineOptions,
    cfg: &EffectiveConfig,
    ui_cfg: &UiConfig,
    home_dir: &Path,
    json: bool,
) -> Result<()> {
    let directory = resolve_path(
        args.dir,
        "world-writable を検査するディレクトリを入力してください: ",
        "--dir",
        ui_cfg,
    )?;
    let log_path = resolve_path(
        args.log,
        "走査するログファイルのパスを入力してください: ",
        "--log",
        ui_cfg,
    )?;
    let report_path = args
        .report
        .unwrap_or_else(|| PathBuf::from(&cfg.report.path));

    let mut exclude = cfg.scan.exclude.clone();
    exclude.extend(args.exclude);
    exclude.sort();
    exclude.dedup();
    crate::scan::validate_excludes(&exclude).map_err(crate::exit::invalid_args_err)?;

    let request = CheckRequest {
        directory,
        log_path,
        report_path,
        exclude,
        cancel: None,
    };

    let started_at = OffsetDateTime::now_utc();
    if ui_cfg.verbose && !ui_cfg.quiet {
        eprintln!("開始: {}", format_rfc3339(started_at));
    }

    let engine = Engine::new(opts);
    let result = engine.check(request.clone());
    let finished_at = OffsetDateTime::now_utc();

    if cfg.log.enabled {
        match crate::logs::write_check_log(
            home_dir,
            started_at,
            finished_at,
            &request,
            result.as_ref(),
        ) {
            Ok(path) => {
                if ui_cfg.verbose && !ui_cfg.quiet {
                    eprintln!("実行ログ: {}", path.display());
                }
            }
            Err(err) => crate::ui::eprintln_warning(
                &format!("実行ログを書き込めませんでした: {err:#}"),
                ui_cfg,
            ),
        }
    }

    let outcome = result.map_err(crate::exit::check_failed)?;

    if let Some(err) = outcome.log_scan.not_found_error() {
        crate::ui::eprintln_warning(&format!("{err}（カウントは 0 として記録します）"), ui_cfg);
    }

    if json {
        write_json(&outcome.summary())?;
    } else {
        crate::ui::print_check(&outcome, ui_cfg);
    }

    if ui_cfg.verbose && !ui_cfg.quiet {
        eprintln!("終了: {}", format_rfc3339(finished_at));
    }

    Ok(())
}

fn resolve_path(
    value: Option<PathBuf>,
    prompt: &str,
    flag: &str,
    ui_cfg: &UiConfig,
) -> Result<PathBuf> {
    if let Some(path) = value {
        if path.as_os_str().is_empty() {
            return Err(crate::exit::invalid_args(format!(
                "{flag} に空のパスは指定できません"
            )));
        }
        return Ok(path);
    }

    if !(ui_cfg.stdin_is_tty && ui_cfg.stderr_is_tty) {
        return Err(crate::exit::invalid_args(format!(
            "{flag} を指定してください（TTY でない場合は対話入力できません）"
        )));
    }

    interactive::prompt_path(prompt)?.ok_or_else(|| {
        crate::exit::invalid_args(format!("{flag}: パスが入力されませんでした"))
    })
}

fn format_rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "未対応のシェルです: {other}（bash|zsh|fish を指定してください）"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_tty() -> UiConfig {
        UiConfig {
            color: false,
            stdin_is_tty: false,
            stdout_is_tty: false,
            stderr_is_tty: false,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn resolve_path_passes_explicit_value_through() {
        let path = resolve_path(Some(PathBuf::from("/tmp")), "?", "--dir", &non_tty())
            .expect("explicit path");
        assert_eq!(path, PathBuf::from("/tmp"));
    }

    #[test]
    fn resolve_path_without_tty_is_invalid_args() {
        let err = resolve_path(None, "?", "--log", &non_tty()).expect_err("no tty");
        assert_eq!(crate::exit::exit_code(&err), 2);
        assert!(err.to_string().contains("--log"), "{err}");
    }

    #[test]
    fn parse_shell_rejects_unknown() {
        assert!(parse_shell("bash").is_ok());
        assert!(parse_shell(" ZSH ").is_ok());
        let err = parse_shell("nope").expect_err("unknown shell");
        assert_eq!(crate::exit::exit_code(&err), 2);
    }

    #[test]
    fn cli_parses_check_arguments() {
        let cli = Cli::try_parse_from([
            "seccheck",
            "--json",
            "check",
            "--dir",
            "/tmp/d",
            "--log",
            "/var/log/auth.log",
            "--exclude",
            "**/cache/**",
        ])
        .expect("parse");
        assert!(cli.json);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.dir, Some(PathBuf::from("/tmp/d")));
                assert_eq!(args.log, Some(PathBuf::from("/var/log/auth.log")));
                assert_eq!(args.report, None);
                assert_eq!(args.exclude, vec!["**/cache/**".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
