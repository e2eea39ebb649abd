use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

const RU_MONTHS: [&str; 12] = [
    "янв", "фев", "мар", "апр", "мая", "июн",
    "июл", "авг", "сен", "окт", "ноя", "дек",
];

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    #[default]
    Russian,
    English,
}

impl LabelLocale {
    /// Short day label, e.g. `5 июн`.
    pub fn day_label(self, date: NaiveDate) -> String {
        let month = match self {
            LabelLocale::Russian => RU_MONTHS[date.month0() as usize],
            LabelLocale::English => EN_MONTHS[date.month0() as usize],
        };
        format!("{} {}", date.day(), month)
    }

    pub fn telegram(self) -> &'static str {
        "Telegram"
    }

    pub fn online_media(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Интернет СМИ",
            LabelLocale::English => "Online media",
        }
    }

    pub fn positive(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Позитивные",
            LabelLocale::English => "Positive",
        }
    }

    pub fn neutral(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Нейтральные",
            LabelLocale::English => "Neutral",
        }
    }

    pub fn negative(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Негативные",
            LabelLocale::English => "Negative",
        }
    }

    pub fn publications(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Количество публикаций",
            LabelLocale::English => "Publications",
        }
    }

    pub fn sources(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Источники",
            LabelLocale::English => "Sources",
        }
    }

    pub fn sentiment(self) -> &'static str {
        match self {
            LabelLocale::Russian => "Тональность",
            LabelLocale::English => "Sentiment",
        }
    }
}

impl FromStr for LabelLocale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ru" | "ru-ru" | "ru_ru" => Ok(LabelLocale::Russian),
            "en" | "en-us" | "en_us" | "en-gb" => Ok(LabelLocale::English),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}
