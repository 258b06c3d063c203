use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en", alias = "en-US")]
    En,
    #[serde(rename = "zh-TW", alias = "zh_TW")]
    ZhTw,
}

impl Locale {
    pub fn parse(tag: &str) -> Option<Locale> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" => Some(Locale::En),
            "zh-tw" => Some(Locale::ZhTw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    LoadTablesFailed,
    LoadViewFailed,
    BackendUnavailable,
    NoTableSelected,
    Loading,
    Previous,
    Next,
    ResolveOwners,
    ExportCsv,
    ClearFilters,
    SearchPlaceholder,
}

pub fn text(locale: Locale, message: Message) -> &'static str {
    match locale {
        Locale::En => match message {
            Message::LoadTablesFailed => "Failed to load tables",
            Message::LoadViewFailed => "Failed to load table data",
            Message::BackendUnavailable => "Backend unavailable",
            Message::NoTableSelected => "Select a table",
            Message::Loading => "Loading…",
            Message::Previous => "Previous",
            Message::Next => "Next",
            Message::ResolveOwners => "Resolve owners",
            Message::ExportCsv => "Export CSV",
            Message::ClearFilters => "Clear filters",
            Message::SearchPlaceholder => "Search…",
        },
        Locale::ZhTw => match message {
            Message::LoadTablesFailed => "載入資料表清單失敗",
            Message::LoadViewFailed => "載入資料失敗",
            Message::BackendUnavailable => "無法連線後端",
            Message::NoTableSelected => "請選擇資料表",
            Message::Loading => "載入中…",
            Message::Previous => "上一頁",
            Message::Next => "下一頁",
            Message::ResolveOwners => "解析擁有者",
            Message::ExportCsv => "匯出 CSV",
            Message::ClearFilters => "清除篩選",
            Message::SearchPlaceholder => "搜尋…",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_tags() {
        assert_eq!(Locale::parse("zh_TW"), Some(Locale::ZhTw));
        assert_eq!(Locale::parse("EN-us"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
    }

    #[test]
    fn every_locale_names_the_listing_failure() {
        assert_eq!(text(Locale::En, Message::LoadTablesFailed), "Failed to load tables");
        assert_eq!(text(Locale::ZhTw, Message::LoadTablesFailed), "載入資料表清單失敗");
    }
}
