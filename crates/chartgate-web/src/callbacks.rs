#![forbid(unsafe_code)]

//! Text produced by the tooltip and tick callbacks installed on each chart.
//!
//! The browser side only extracts indices and parsed values from the
//! library's callback context; every string is built here so it can be
//! tested without a browser.

use chartgate_core::chart_spec::{ChartKind, ChartSpec, TooltipText, format_value};

/// Which parsed coordinate carries the value of a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAxis {
    X,
    Y,
    /// Scatter points show both coordinates.
    Both,
}

impl ValueAxis {
    #[must_use]
    pub fn for_spec(spec: &ChartSpec) -> Self {
        if spec.kind == ChartKind::Scatter {
            Self::Both
        } else if spec.options.index_axis.as_deref() == Some("y") {
            Self::X
        } else {
            Self::Y
        }
    }
}

/// A parsed data point as handed to a callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    /// Radial charts parse to a bare number.
    Scalar(f64),
    Point { x: f64, y: f64 },
}

#[must_use]
pub fn value_text(parsed: Parsed, axis: ValueAxis) -> String {
    match (parsed, axis) {
        (Parsed::Scalar(v), _) => format_value(v),
        (Parsed::Point { x, .. }, ValueAxis::X) => format_value(x),
        (Parsed::Point { y, .. }, ValueAxis::Y) => format_value(y),
        (Parsed::Point { x, y }, ValueAxis::Both) => {
            format!("({}, {})", format_value(x), format_value(y))
        }
    }
}

/// Tooltip title for the hovered data index.
#[must_use]
pub fn title(text: &TooltipText, data_index: usize, label: &str) -> String {
    if let Some(title) = text.titles.get(data_index) {
        return title.clone();
    }
    match &text.title_prefix {
        Some(prefix) => format!("{prefix}{label}"),
        None => label.to_string(),
    }
}

/// One body line: `"<dataset>: <value><suffix>"`.
#[must_use]
pub fn label(text: &TooltipText, dataset_index: usize, dataset_label: &str, value: &str) -> String {
    let suffix = text
        .value_suffixes
        .get(dataset_index)
        .map_or("", String::as_str);
    if dataset_label.is_empty() {
        format!("{value}{suffix}")
    } else {
        format!("{dataset_label}: {value}{suffix}")
    }
}

#[must_use]
pub fn after_label(text: &TooltipText, data_index: usize) -> Vec<String> {
    text.extra_lines.get(data_index).cloned().unwrap_or_default()
}

#[must_use]
pub fn tick(value: f64, suffix: &str) -> String {
    format!("{}{suffix}", format_value(value))
}

/// Whether any tooltip callback is needed at all.
#[must_use]
pub fn needs_title(text: &TooltipText) -> bool {
    text.title_prefix.is_some() || !text.titles.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::chart_spec::{Dataset, TooltipSpec};
    use pretty_assertions::assert_eq;

    fn text() -> TooltipText {
        TooltipSpec::default()
            .title_prefix("📅 ")
            .titles(vec!["first".into()])
            .value_suffixes(vec![String::new(), "% risco".into()])
            .extra_lines(vec![vec!["a".into(), "b".into()]])
            .text
    }

    #[test]
    fn explicit_titles_win_over_prefix() {
        assert_eq!(title(&text(), 0, "Jan"), "first");
        assert_eq!(title(&text(), 3, "Abr"), "📅 Abr");
        assert_eq!(title(&TooltipText::default(), 1, "Fev"), "Fev");
    }

    #[test]
    fn labels_carry_per_dataset_suffix() {
        assert_eq!(label(&text(), 1, "Cabos de Fibra", "28"), "Cabos de Fibra: 28% risco");
        assert_eq!(label(&text(), 0, "x", "1.5"), "x: 1.5");
        assert_eq!(label(&text(), 7, "", "3"), "3");
    }

    #[test]
    fn extra_lines_by_index() {
        assert_eq!(after_label(&text(), 0), vec!["a".to_string(), "b".to_string()]);
        assert!(after_label(&text(), 1).is_empty());
    }

    #[test]
    fn value_axis_follows_chart_shape() {
        let bar = ChartSpec::bar()
            .labels(["a"])
            .dataset(Dataset::values("v", vec![1.0]));
        assert_eq!(ValueAxis::for_spec(&bar), ValueAxis::Y);
        assert_eq!(ValueAxis::for_spec(&bar.horizontal()), ValueAxis::X);
        assert_eq!(ValueAxis::for_spec(&ChartSpec::scatter()), ValueAxis::Both);

        let p = Parsed::Point { x: 85.0, y: 28.5 };
        assert_eq!(value_text(p, ValueAxis::X), "85");
        assert_eq!(value_text(p, ValueAxis::Both), "(85, 28.5)");
        assert_eq!(value_text(Parsed::Scalar(99.2), ValueAxis::Y), "99.2");
    }

    #[test]
    fn ticks_get_suffix() {
        assert_eq!(tick(40.0, "%"), "40%");
        assert_eq!(tick(2.5, " horas"), "2.5 horas");
    }
}
