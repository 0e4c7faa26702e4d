//! Ledger configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::{LedgerError, LedgerResult};

/// How a yearly fee is split across the months of an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApportionmentPolicy {
    /// Every month carries `total / months` unrounded; the sum may drift from
    /// the total by the division remainder
    #[default]
    Even,
    /// Months are rounded down to the currency scale and the final month takes
    /// whatever is left, so the months sum to the total exactly
    LastMonthAbsorbs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    pub apportionment: ApportionmentPolicy,
    /// Decimal places of the currency's minor unit
    pub currency_scale: i64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            apportionment: ApportionmentPolicy::Even,
            currency_scale: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceSettings {
    /// Decimal places kept on attendance percentages
    pub percentage_scale: i64,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            percentage_scale: 2,
        }
    }
}

/// Top-level ledger configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub fees: FeeSettings,
    pub attendance: AttendanceSettings,
}

impl LedgerConfig {
    /// Parse a configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> LedgerResult<Self> {
        let config: LedgerConfig =
            toml::from_str(content).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> LedgerResult<()> {
        if !(0..=6).contains(&self.fees.currency_scale) {
            return Err(LedgerError::Config(format!(
                "fees.currency_scale must be between 0 and 6, got {}",
                self.fees.currency_scale
            )));
        }
        if !(0..=6).contains(&self.attendance.percentage_scale) {
            return Err(LedgerError::Config(format!(
                "attendance.percentage_scale must be between 0 and 6, got {}",
                self.attendance.percentage_scale
            )));
        }
        Ok(())
    }
}

/// Load a ledger configuration file
pub fn load_config(path: &Path) -> LedgerResult<LedgerConfig> {
    if !path.exists() {
        return Err(LedgerError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    let config: LedgerConfig = toml::from_str(&content).map_err(|e| LedgerError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    tracing::debug!(path = %path.display(), ?config, "loaded ledger config");
    Ok(config)
}

/// Template content for a ledger config file
pub const CONFIG_TEMPLATE: &str = r#"[fees]
apportionment = "even"        # or "last_month_absorbs"
currency_scale = 2

[attendance]
percentage_scale = 2
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = LedgerConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = LedgerConfig::from_toml_str(
            r#"[fees]
apportionment = "last_month_absorbs"
"#,
        )
        .unwrap();
        assert_eq!(
            config.fees.apportionment,
            ApportionmentPolicy::LastMonthAbsorbs
        );
        assert_eq!(config.fees.currency_scale, 2);
        assert_eq!(config.attendance.percentage_scale, 2);
    }

    #[test]
    fn test_out_of_range_scale_is_rejected() {
        let result = LedgerConfig::from_toml_str("[fees]\ncurrency_scale = 9\n");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[attendance]\npercentage_scale = 1\n").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.attendance.percentage_scale, 1);
    }

    #[test]
    fn test_load_config_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[fees\napportionment = ").unwrap();

        match load_config(file.path()) {
            Err(LedgerError::ConfigParse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("ledger.toml"));
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
