#![forbid(unsafe_code)]

//! Dashboard colours and the shared chart styling built from them.

use chartgate_core::chart_spec::{ScaleSpec, TooltipSpec};

pub const TEXT_MUTED: &str = "#a0aab8";
pub const AXIS_TEXT: &str = "rgba(167, 169, 169, 0.7)";
pub const LEGEND_TEXT: &str = "rgba(167, 169, 169, 1)";
pub const GRID: &str = "rgba(255,255,255,0.05)";
pub const GRID_SOFT: &str = "rgba(119, 124, 124, 0.2)";

pub const TOOLTIP_BG: &str = "rgba(15, 36, 56, 0.98)";
pub const TOOLTIP_TITLE: &str = "#f0f4f8";
pub const TOOLTIP_BODY: &str = "#cbd5e1";

pub const TEAL: &str = "#20A084";
pub const TEAL_FILL: &str = "rgba(32, 160, 132, 0.14)";
pub const TEAL_BAR: &str = "rgba(32, 160, 132, 0.7)";
pub const GREEN: &str = "#10b981";
pub const GREEN_FILL: &str = "rgba(16, 185, 129, 0.12)";
pub const ORANGE: &str = "#f97316";
pub const ORANGE_FILL: &str = "rgba(249, 115, 22, 0.10)";
pub const CYAN: &str = "rgba(50, 184, 198, 1)";
pub const CYAN_FILL: &str = "rgba(50, 184, 198, 0.1)";
pub const SUCCESS: &str = "rgba(34, 197, 94, 1)";
pub const DANGER: &str = "rgba(255, 84, 89, 1)";

/// `(fill, border)` for a three-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelColors {
    pub fill: &'static str,
    pub border: &'static str,
}

pub const HIGH: LevelColors = LevelColors {
    fill: "rgba(249, 115, 22, 0.7)",
    border: "#f97316",
};
pub const MEDIUM: LevelColors = LevelColors {
    fill: "rgba(251, 191, 36, 0.7)",
    border: "#fbbf24",
};
pub const LOW: LevelColors = LevelColors {
    fill: "rgba(16, 185, 129, 0.7)",
    border: "#10b981",
};
pub const CRITICAL: LevelColors = LevelColors {
    fill: "rgba(239, 68, 68, 0.7)",
    border: "#ef4444",
};

pub const IMPORTANT: LevelColors = LevelColors {
    fill: "rgba(50, 184, 198, 0.7)",
    border: "rgba(50, 184, 198, 1)",
};
pub const NOTABLE: LevelColors = LevelColors {
    fill: "rgba(230, 129, 97, 0.7)",
    border: "rgba(230, 129, 97, 1)",
};
pub const MINOR: LevelColors = LevelColors {
    fill: "rgba(167, 169, 169, 0.7)",
    border: "rgba(167, 169, 169, 1)",
};

/// Series colours cycled by index, `(border, fill)`.
pub const SERIES: [(&str, &str); 3] = [
    ("rgba(255, 84, 89, 1)", "rgba(255, 84, 89, 0.1)"),
    ("rgba(230, 129, 97, 1)", "rgba(230, 129, 97, 0.1)"),
    ("rgba(50, 184, 198, 1)", "rgba(50, 184, 198, 0.1)"),
];

/// Split per-point level colours into fill and border lists.
#[must_use]
pub fn split(levels: &[LevelColors]) -> (Vec<String>, Vec<String>) {
    levels
        .iter()
        .map(|c| (c.fill.to_string(), c.border.to_string()))
        .unzip()
}

/// Dark tooltip used by every dashboard chart.
#[must_use]
pub fn tooltip() -> TooltipSpec {
    TooltipSpec {
        background_color: Some(TOOLTIP_BG.into()),
        title_color: Some(TOOLTIP_TITLE.into()),
        body_color: Some(TOOLTIP_BODY.into()),
        border_color: Some(TEAL.into()),
        border_width: Some(1.0),
        padding: Some(12),
        ..TooltipSpec::default()
    }
}

/// Linear axis with muted ticks and a faint grid.
#[must_use]
pub fn axis() -> ScaleSpec {
    ScaleSpec::linear().tick_color(TEXT_MUTED).grid_color(GRID)
}

/// Category axis for labels.
#[must_use]
pub fn category_axis() -> ScaleSpec {
    ScaleSpec {
        scale_type: Some("category".into()),
        ..ScaleSpec::default()
    }
    .tick_color(TEXT_MUTED)
    .grid_color(GRID)
}
