use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::DEFAULT_REPORT_FILE;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub ui: UiConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogConfig {
    pub enabled: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            ui: UiConfig { color: true },
            scan: ScanConfig { exclude: vec![] },
            report: ReportConfig {
                path: DEFAULT_REPORT_FILE.to_string(),
            },
            log: LogConfig { enabled: true },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    scan: Option<RawScanConfig>,
    report: Option<RawReportConfig>,
    log: Option<RawLogConfig>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawScanConfig {
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawReportConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogConfig {
    enabled: Option<bool>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/seccheck/config.toml")
}

/// Defaults, then the TOML file (if present), then `SECCHECK_*` variables.
pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("設定ファイルの読み取りに失敗しました: {}", path.display()))?;
        let raw: RawConfig =
            toml::from_str(&s).context("設定ファイル(TOML)の解析に失敗しました")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    } else if config_path.is_some() {
        return Err(anyhow::anyhow!(
            "設定ファイルが見つかりません: {}",
            path.display()
        ));
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(color) = raw.ui.and_then(|ui| ui.color) {
        cfg.ui.color = color;
    }

    if let Some(exclude) = raw.scan.and_then(|scan| scan.exclude) {
        cfg.scan.exclude = exclude;
    }

    if let Some(path) = raw.report.and_then(|report| report.path) {
        let path = path.trim();
        if !path.is_empty() {
            cfg.report.path = path.to_string();
        }
    }

    if let Some(enabled) = raw.log.and_then(|log| log.enabled) {
        cfg.log.enabled = enabled;
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("SECCHECK_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "SECCHECK_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("SECCHECK_REPORT_PATH") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.report.path = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("SECCHECK_SCAN_EXCLUDE") {
        let parts: Vec<String> = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        if !parts.is_empty() {
            cfg.scan.exclude = parts;
        }
    }
    if let Ok(v) = std::env::var("SECCHECK_LOG_ENABLED") {
        cfg.log.enabled = parse_bool(&v).with_context(|| "SECCHECK_LOG_ENABLED")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "真偽値が不正です: {s}（true|false|1|0|yes|no|on|off を指定してください）"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for s in ["1", "true", "YES", " on "] {
            assert!(parse_bool(s).unwrap());
        }
        for s in ["0", "False", "no", "off"] {
            assert!(!parse_bool(s).unwrap());
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn raw_config_overrides_defaults_section_by_section() {
        let raw: RawConfig = toml::from_str(
            r#"
[report]
path = "/var/tmp/audit.txt"

[scan]
exclude = ["**/proc/**"]
"#,
        )
        .expect("parse");
        let mut cfg = EffectiveConfig::default();
        apply_raw_config(&mut cfg, raw);

        assert_eq!(cfg.report.path, "/var/tmp/audit.txt");
        assert_eq!(cfg.scan.exclude, vec!["**/proc/**".to_string()]);
        assert!(cfg.ui.color);
        assert!(cfg.log.enabled);
    }

    #[test]
    fn blank_report_path_keeps_default() {
        let raw: RawConfig = toml::from_str("[report]\npath = \"  \"\n").expect("parse");
        let mut cfg = EffectiveConfig::default();
        apply_raw_config(&mut cfg, raw);
        assert_eq!(cfg.report.path, DEFAULT_REPORT_FILE);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(toml::from_str::<RawConfig>("[fix]\ndefault_risk_max = \"R1\"\n").is_err());
    }
}
