use crate::error::{AppError, Result};
use crate::render::ShadeStrategy;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DENSITY: f32 = 1.0;
const DEFAULT_MARK_TIMEOUT_MS: u64 = 500;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Display density: physical pixels per density-independent unit.
    pub density: f32,
    pub mark_timeout: Duration,
    pub shade_strategy: ShadeStrategy,
    /// Optional image for the crop handle; a built-in glyph is used otherwise.
    pub handle_glyph: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            mark_timeout: Duration::from_millis(DEFAULT_MARK_TIMEOUT_MS),
            shade_strategy: ShadeStrategy::ClipOut,
            handle_glyph: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let mut config = Config::default();

        if let Ok(raw) = env::var("SCANVIEW_DENSITY") {
            config.density = raw
                .trim()
                .parse::<f32>()
                .map_err(|_| AppError::config(format!("SCANVIEW_DENSITY is not a number: {raw}")))?;
        }

        if let Ok(raw) = env::var("SCANVIEW_MARK_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                AppError::config(format!("SCANVIEW_MARK_TIMEOUT_MS is not an integer: {raw}"))
            })?;
            config.mark_timeout = Duration::from_millis(ms);
        }

        if let Ok(raw) = env::var("SCANVIEW_OUTLINE_ONLY") {
            config.set_outline_only(parse_flag(&raw)?);
        }

        config.handle_glyph = env::var("SCANVIEW_HANDLE_GLYPH")
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn set_outline_only(&mut self, outline_only: bool) {
        self.shade_strategy = if outline_only {
            ShadeStrategy::OutlineOnly
        } else {
            ShadeStrategy::ClipOut
        };
    }

    /// Checks values that may have been overridden after loading.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for a non-positive or non-finite density.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(AppError::config(format!(
                "density must be a positive number, got {}",
                self.density
            )));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::config(format!(
            "SCANVIEW_OUTLINE_ONLY must be a boolean, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_overlay() {
        let config = Config::default();
        assert_eq!(config.density, 1.0);
        assert_eq!(config.mark_timeout, Duration::from_millis(500));
        assert_eq!(config.shade_strategy, ShadeStrategy::ClipOut);
        assert!(config.handle_glyph.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_density() {
        let zero = Config {
            density: 0.0,
            ..Config::default()
        };
        assert!(matches!(zero.validate(), Err(AppError::Config(_))));

        let nan = Config {
            density: f32::NAN,
            ..Config::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn outline_only_selects_degraded_strategy() {
        let mut config = Config::default();
        config.set_outline_only(true);
        assert_eq!(config.shade_strategy, ShadeStrategy::OutlineOnly);
        config.set_outline_only(false);
        assert_eq!(config.shade_strategy, ShadeStrategy::ClipOut);
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag(" 1 ").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
