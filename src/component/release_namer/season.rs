//! 季數與集數的解析及格式化

use regex::Regex;
use std::sync::LazyLock;

/// 批次下載用的集數佔位符，由外部下載器逐集替換
pub const EPISODE_PLACEHOLDER: &str = "<replace_episode>";

static REGEX_CHINESE_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"第\s*([一二三四五六七八九十百零〇两\d]+)\s*季").expect("Invalid regex")
});

static REGEX_ENGLISH_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Ss]eason[\s.]*(\d+)").expect("Invalid regex"));

static REGEX_MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static REGEX_MULTIPLE_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Invalid regex"));

/// 中文數字轉整數（支援到百位）
#[must_use]
pub fn chinese_numeral_to_u32(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = text.parse::<u32>() {
        return Some(value);
    }

    let mut total = 0u32;
    let mut current = 0u32;
    for c in text.chars() {
        match c {
            '零' | '〇' => current = 0,
            '一' => current = 1,
            '二' | '两' => current = 2,
            '三' => current = 3,
            '四' => current = 4,
            '五' => current = 5,
            '六' => current = 6,
            '七' => current = 7,
            '八' => current = 8,
            '九' => current = 9,
            '十' => {
                total = total.checked_add(current.max(1).checked_mul(10)?)?;
                current = 0;
            }
            '百' => {
                total = total.checked_add(current.max(1).checked_mul(100)?)?;
                current = 0;
            }
            d if d.is_ascii_digit() => {
                current = current.checked_mul(10)?.checked_add(d.to_digit(10)?)?;
            }
            _ => return None,
        }
    }
    total.checked_add(current)
}

/// 從中文標題拆出「第N季」
///
/// 回傳去除季數後的標題（空白已整併）與解析到的季數。
#[must_use]
pub fn split_title_season(title: &str) -> (String, Option<u32>) {
    let season = REGEX_CHINESE_SEASON
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| chinese_numeral_to_u32(m.as_str()));

    let stripped = REGEX_CHINESE_SEASON.replace_all(title, "");
    let collapsed = REGEX_MULTIPLE_SPACES.replace_all(&stripped, " ");
    (collapsed.trim().to_string(), season)
}

/// 外文名內嵌的 "Season N" 與預設季數相同時移除
#[must_use]
pub fn strip_english_season(name: &str, default_season: Option<u32>) -> String {
    let Some(default_season) = default_season else {
        return name.to_string();
    };

    let embedded = REGEX_ENGLISH_SEASON
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    if embedded != Some(default_season) {
        return name.to_string();
    }

    let stripped = REGEX_ENGLISH_SEASON.replace_all(name, "");
    let collapsed = REGEX_MULTIPLE_DOTS.replace_all(&stripped, ".");
    collapsed.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}

fn pad_number(prefix: char, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(match raw.parse::<u32>() {
        Ok(number) => format!("{prefix}{number:02}"),
        Err(_) => format!("{prefix}{raw}"),
    })
}

/// 季數格式化為 `S##`
#[must_use]
pub fn format_season(raw: &str) -> Option<String> {
    pad_number('S', raw)
}

/// 集數格式化：單集 `E##`，多集（逗號分隔）取首尾 `E##-E##`
#[must_use]
pub fn format_episodes(raw: &str) -> Option<String> {
    let episodes: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();

    match episodes.as_slice() {
        [] => None,
        [single] => pad_number('E', single),
        [first, .., last] => Some(format!(
            "{}-{}",
            pad_number('E', first)?,
            pad_number('E', last)?
        )),
    }
}

/// 依優先順序取第一個存在的季數來源
#[must_use]
pub fn resolve_season<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find_map(format_season)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_numerals() {
        assert_eq!(chinese_numeral_to_u32("二"), Some(2));
        assert_eq!(chinese_numeral_to_u32("十"), Some(10));
        assert_eq!(chinese_numeral_to_u32("十二"), Some(12));
        assert_eq!(chinese_numeral_to_u32("二十三"), Some(23));
        assert_eq!(chinese_numeral_to_u32("一百零五"), Some(105));
        assert_eq!(chinese_numeral_to_u32("3"), Some(3));
        assert_eq!(chinese_numeral_to_u32(""), None);
        assert_eq!(chinese_numeral_to_u32("abc"), None);
    }

    #[test]
    fn test_chinese_numerals_overflow_is_none() {
        assert_eq!(chinese_numeral_to_u32("99999999999"), None);
        assert_eq!(chinese_numeral_to_u32("4294967295"), Some(u32::MAX));
        assert_eq!(chinese_numeral_to_u32("4294967295十"), None);
        assert_eq!(
            split_title_season("某劇 第99999999999季"),
            ("某劇".to_string(), None)
        );
    }

    #[test]
    fn test_split_title_season() {
        assert_eq!(
            split_title_season("生活如沸 第二季"),
            ("生活如沸".to_string(), Some(2))
        );
        assert_eq!(
            split_title_season("某劇  第 12 季  特別篇"),
            ("某劇 特別篇".to_string(), Some(12))
        );
        assert_eq!(split_title_season("第二季"), (String::new(), Some(2)));
        assert_eq!(split_title_season("沒有季數"), ("沒有季數".to_string(), None));
    }

    #[test]
    fn test_strip_english_season_only_when_matching() {
        assert_eq!(
            strip_english_season("Show.Name.Season.2", Some(2)),
            "Show.Name"
        );
        assert_eq!(
            strip_english_season("Show.Name.Season.3", Some(2)),
            "Show.Name.Season.3"
        );
        assert_eq!(
            strip_english_season("Show.Name.Season.2", None),
            "Show.Name.Season.2"
        );
    }

    #[test]
    fn test_format_season() {
        assert_eq!(format_season("3").as_deref(), Some("S03"));
        assert_eq!(format_season("12").as_deref(), Some("S12"));
        assert_eq!(format_season(" 1 ").as_deref(), Some("S01"));
        assert_eq!(format_season(""), None);
    }

    #[test]
    fn test_format_episodes() {
        assert_eq!(format_episodes("5").as_deref(), Some("E05"));
        assert_eq!(format_episodes("1,2,3").as_deref(), Some("E01-E03"));
        assert_eq!(format_episodes("9, 10").as_deref(), Some("E09-E10"));
        assert_eq!(format_episodes(" , "), None);
    }

    #[test]
    fn test_resolve_season_priority() {
        assert_eq!(
            resolve_season([Some("4"), Some("2"), Some("1")]).as_deref(),
            Some("S04")
        );
        assert_eq!(
            resolve_season([None, Some("2"), Some("1")]).as_deref(),
            Some("S02")
        );
        assert_eq!(resolve_season([None, None, Some(" ")]), None);
        assert_eq!(resolve_season([None, None, None]), None);
    }
}
