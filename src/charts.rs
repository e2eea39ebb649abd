use crate::labels::LabelLocale;
use crate::models::{BarChart, Series};
use crate::sentiment::SentimentBreakdown;
use crate::sources::{SourceBreakdown, SourceCategory};

const TIMELINE_COLOR: &str = "#4285f4";
const TELEGRAM_COLOR: &str = "#30d0ff";
const ONLINE_MEDIA_COLOR: &str = "#d66e67";
const POSITIVE_COLOR: &str = "#4CAF50";
const NEUTRAL_COLOR: &str = "#FFC107";
const NEGATIVE_COLOR: &str = "#F44336";

/// Timeline bars labelled `1 июн (5)`.
pub fn timeline_chart(series: &Series, locale: LabelLocale) -> BarChart {
    let labels = series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, value)| format!("{label} ({value})"))
        .collect();
    BarChart {
        title: locale.publications().to_string(),
        labels,
        values: series.values.iter().map(|value| *value as f64).collect(),
        colors: vec![TIMELINE_COLOR.to_string(); series.len()],
        unit: None,
    }
}

pub fn sources_chart(breakdown: &SourceBreakdown, locale: LabelLocale) -> BarChart {
    let ranked = breakdown.ranked();
    let mut chart = BarChart {
        title: locale.sources().to_string(),
        labels: Vec::with_capacity(ranked.len()),
        values: Vec::with_capacity(ranked.len()),
        colors: Vec::with_capacity(ranked.len()),
        unit: None,
    };
    for (category, count) in ranked {
        let (name, color) = match category {
            SourceCategory::Telegram => (locale.telegram(), TELEGRAM_COLOR),
            SourceCategory::OnlineMedia => (locale.online_media(), ONLINE_MEDIA_COLOR),
        };
        chart
            .labels
            .push(format!("{name} ({}%)", breakdown.share_label(count)));
        chart.values.push(count as f64);
        chart.colors.push(color.to_string());
    }
    chart
}

pub fn sentiment_chart(breakdown: &SentimentBreakdown, locale: LabelLocale) -> BarChart {
    BarChart {
        title: locale.sentiment().to_string(),
        labels: vec![
            locale.positive().to_string(),
            locale.neutral().to_string(),
            locale.negative().to_string(),
        ],
        values: vec![breakdown.positive, breakdown.normal, breakdown.negative],
        colors: vec![
            POSITIVE_COLOR.to_string(),
            NEUTRAL_COLOR.to_string(),
            NEGATIVE_COLOR.to_string(),
        ],
        unit: Some("%".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_labels_carry_counts() {
        let series = Series {
            labels: vec!["1 июн".to_string(), "2 июн".to_string()],
            values: vec![5, 0],
        };
        let chart = timeline_chart(&series, LabelLocale::Russian);
        assert_eq!(chart.labels, vec!["1 июн (5)", "2 июн (0)"]);
        assert_eq!(chart.values, vec![5.0, 0.0]);
        assert_eq!(chart.colors.len(), 2);
        assert_eq!(chart.title, "Количество публикаций");
    }

    #[test]
    fn sources_chart_is_ranked_with_shares() {
        let breakdown = SourceBreakdown { telegram: 1, online_media: 3 };
        let chart = sources_chart(&breakdown, LabelLocale::Russian);
        assert_eq!(chart.labels, vec!["Интернет СМИ (75.0%)", "Telegram (25.0%)"]);
        assert_eq!(chart.values, vec![3.0, 1.0]);
        assert_eq!(chart.colors, vec![ONLINE_MEDIA_COLOR, TELEGRAM_COLOR]);
    }

    #[test]
    fn empty_sources_show_zero_shares() {
        let chart = sources_chart(&SourceBreakdown::default(), LabelLocale::English);
        assert_eq!(chart.labels, vec!["Telegram (0%)", "Online media (0%)"]);
    }

    #[test]
    fn sentiment_order_is_positive_neutral_negative() {
        let breakdown = SentimentBreakdown {
            positive: 50.0,
            negative: 20.0,
            normal: 30.0,
        };
        let chart = sentiment_chart(&breakdown, LabelLocale::Russian);
        let labels = vec!["Позитивные", "Нейтральные", "Негативные"];
        assert_eq!(chart.labels, labels);
        assert_eq!(chart.values, vec![50.0, 30.0, 20.0]);
        assert_eq!(chart.unit.as_deref(), Some("%"));
    }
}
