#![forbid(unsafe_code)]

//! Configuration for the readiness gate, lifecycle controllers and
//! library-wide chart defaults.
//!
//! Sources, later wins:
//! 1. [`Default`] values (100 ms poll, 100 attempts, 30 DOM frames).
//! 2. JSON supplied by the host page ([`DashboardConfig::from_json_str`]).
//! 3. Environment overrides ([`DashboardConfig::with_env_overrides`]):
//!    `CHARTGATE_POLL_INTERVAL_MS`, `CHARTGATE_MAX_POLL_ATTEMPTS`,
//!    `CHARTGATE_DOM_RETRY_FRAMES`.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ConfigError;

const ENV_POLL_INTERVAL_MS: &str = "CHARTGATE_POLL_INTERVAL_MS";
const ENV_MAX_POLL_ATTEMPTS: &str = "CHARTGATE_MAX_POLL_ATTEMPTS";
const ENV_DOM_RETRY_FRAMES: &str = "CHARTGATE_DOM_RETRY_FRAMES";

/// Readiness poll settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Interval between checks of the library global (ms).
    pub poll_interval_ms: u64,
    /// Checks before the library is declared unavailable.
    pub max_poll_attempts: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_poll_attempts: 100,
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Worst-case time before the gate reports unavailability.
    #[must_use]
    pub fn hard_cap(&self) -> Duration {
        self.poll_interval()
            .saturating_mul(self.max_poll_attempts)
    }
}

/// Per-controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Animation frames to wait for a missing canvas before giving up.
    pub dom_retry_frames: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            dom_retry_frames: 30,
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn with_dom_retry_frames(mut self, frames: u32) -> Self {
        self.dom_retry_frames = frames;
        self
    }
}

/// Library-wide chart defaults applied once per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDefaults {
    pub color: String,
    pub border_color: String,
    pub background_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: String,
    pub legend_font_size: u32,
    pub tooltip_title_size: u32,
    pub tooltip_body_size: u32,
    pub tooltip_padding: u32,
    pub bar_border_width: u32,
    pub line_border_width: u32,
    pub point_radius: u32,
    pub point_hover_radius: u32,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            color: "#e0e8f0".into(),
            border_color: "rgba(255, 255, 255, 0.2)".into(),
            background_color: "rgba(32, 160, 132, 0.15)".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
            font_weight: "500".into(),
            legend_font_size: 12,
            tooltip_title_size: 14,
            tooltip_body_size: 12,
            tooltip_padding: 12,
            bar_border_width: 2,
            line_border_width: 3,
            point_radius: 6,
            point_hover_radius: 8,
        }
    }
}

impl ChartDefaults {
    /// Flatten into `(path, value)` assignments under the library's
    /// `defaults` object, parents before children.
    #[must_use]
    pub fn assignments(&self) -> Vec<(Vec<&'static str>, Value)> {
        vec![
            (vec!["color"], json!(self.color)),
            (vec!["borderColor"], json!(self.border_color)),
            (vec!["backgroundColor"], json!(self.background_color)),
            (vec!["font", "family"], json!(self.font_family)),
            (vec!["font", "size"], json!(self.font_size)),
            (vec!["font", "weight"], json!(self.font_weight)),
            (
                vec!["plugins", "legend", "labels", "font", "size"],
                json!(self.legend_font_size),
            ),
            (
                vec!["plugins", "tooltip", "titleFont"],
                json!({ "size": self.tooltip_title_size, "weight": "600" }),
            ),
            (
                vec!["plugins", "tooltip", "bodyFont"],
                json!({ "size": self.tooltip_body_size, "weight": self.font_weight }),
            ),
            (vec!["plugins", "tooltip", "padding"], json!(self.tooltip_padding)),
            (vec!["elements", "bar", "borderWidth"], json!(self.bar_border_width)),
            (vec!["elements", "line", "borderWidth"], json!(self.line_border_width)),
            (vec!["elements", "point", "radius"], json!(self.point_radius)),
            (
                vec!["elements", "point", "hoverRadius"],
                json!(self.point_hover_radius),
            ),
        ]
    }
}

/// Everything one dashboard page needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub gate: GateConfig,
    pub controller: ControllerConfig,
    pub defaults: ChartDefaults,
}

impl DashboardConfig {
    #[must_use]
    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = controller;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: ChartDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Parse host-supplied JSON; missing fields keep their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = parse_env(&lookup, ENV_POLL_INTERVAL_MS)? {
            self.gate.poll_interval_ms = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_MAX_POLL_ATTEMPTS)? {
            self.gate.max_poll_attempts = u32::try_from(v).map_err(|_| ConfigError::OutOfRange {
                field: "max_poll_attempts",
                value: v,
            })?;
        }
        if let Some(v) = parse_env(&lookup, ENV_DOM_RETRY_FRAMES)? {
            self.controller.dom_retry_frames =
                u32::try_from(v).map_err(|_| ConfigError::OutOfRange {
                    field: "dom_retry_frames",
                    value: v,
                })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values that would poll forever or never poll.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gate.poll_interval_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "poll_interval_ms",
                value: 0,
            });
        }
        if self.gate.max_poll_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_poll_attempts",
                value: 0,
            });
        }
        Ok(())
    }
}

fn parse_env(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value: raw }),
    }
}
