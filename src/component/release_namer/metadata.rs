use serde::{Deserialize, Deserializer, Serialize};

/// 人名紀錄（導演、編劇、演員）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub name: String,
}

/// 外部來源（PT-Gen 格式）提供的影片資訊，取得後即不再變動
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseMetadata {
    pub chinese_title: Option<String>,
    pub foreign_title: Option<String>,
    pub aka: Vec<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub current_season: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub director: Vec<Person>,
    pub writer: Vec<Person>,
    pub cast: Vec<Person>,
    /// 來源站點，例如 douban、imdb
    pub site: Option<String>,
    pub failed: bool,
    /// 失敗時的錯誤訊息
    pub error: Option<String>,
}

impl ReleaseMetadata {
    /// 取得失敗時的佔位資料
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            failed: true,
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(value) => value.to_string(),
        Raw::Float(value) => value.to_string(),
    }))
}
