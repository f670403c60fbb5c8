//! 中文標題的拼音轉寫

use pinyin::ToPinyin;

/// 將中文轉為拼音，音節以 `-` 分隔；非漢字原樣保留並合併為同一段
#[must_use]
pub fn to_pinyin_segments(text: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut in_plain_run = false;

    for c in text.chars() {
        if let Some(syllable) = c.to_pinyin() {
            segments.push(syllable.plain().to_string());
            in_plain_run = false;
        } else if c.is_whitespace() {
            in_plain_run = false;
        } else if in_plain_run {
            if let Some(last) = segments.last_mut() {
                last.push(c);
            }
        } else {
            segments.push(c.to_string());
            in_plain_run = true;
        }
    }

    segments.join("-")
}

/// 每個英文字詞首字大寫，其餘小寫
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            result.push(c);
            prev_is_letter = false;
        }
    }

    result
}

/// 以拼音產生替代名稱：連字號改為 `.`，並轉為字首大寫
#[must_use]
pub fn romanize_title(title: &str) -> String {
    title_case(&to_pinyin_segments(title.trim()).replace('-', "."))
}
