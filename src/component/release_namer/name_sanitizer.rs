//! 發行名稱清理
//!
//! 移除檔案系統保留字元與全形標點，並處理替代名稱的分隔符號

use regex::Regex;
use std::sync::LazyLock;

/// 常見檔案系統不允許的字元
pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

static REGEX_ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("Invalid regex"));

static REGEX_CJK_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{3000}-\x{303F}\x{FF00}-\x{FFEF}]").expect("Invalid regex"));

static REGEX_MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static REGEX_MULTIPLE_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Invalid regex"));

static REGEX_DOT_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.+-").expect("Invalid regex"));

/// 名稱清理器
pub struct NameSanitizer {
    regex_illegal_chars: &'static Regex,
    regex_cjk_marks: &'static Regex,
    regex_multiple_spaces: &'static Regex,
    regex_multiple_dots: &'static Regex,
    regex_dot_dash: &'static Regex,
}

impl Default for NameSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSanitizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex_illegal_chars: &REGEX_ILLEGAL_CHARS,
            regex_cjk_marks: &REGEX_CJK_MARKS,
            regex_multiple_spaces: &REGEX_MULTIPLE_SPACES,
            regex_multiple_dots: &REGEX_MULTIPLE_DOTS,
            regex_dot_dash: &REGEX_DOT_DASH,
        }
    }

    fn strip_forbidden(&self, text: &str) -> String {
        let result = self.regex_illegal_chars.replace_all(text, "");
        self.regex_cjk_marks.replace_all(&result, "").to_string()
    }

    /// 清理單一標記：移除非法字元、整併空白、去除首尾的 `.`
    #[must_use]
    pub fn sanitize_token(&self, token: &str) -> String {
        let result = self.strip_forbidden(token);
        let result = self.regex_multiple_spaces.replace_all(&result, " ");
        let result = self.regex_multiple_dots.replace_all(&result, ".");
        result
            .trim_matches(|c: char| c == '.' || c.is_whitespace())
            .to_string()
    }

    /// 清理完整名稱：被移除的標記留下的 `.-` 合併為 `-`
    #[must_use]
    pub fn sanitize_name(&self, name: &str) -> String {
        let result = self.strip_forbidden(name);
        let result = self.regex_multiple_dots.replace_all(&result, ".");
        self.regex_dot_dash.replace_all(&result, "-").to_string()
    }

    /// 替代名稱：逗號與連字號視為空白，空白整併後改為 `.`
    #[must_use]
    pub fn dotted_alias(&self, alias: &str) -> String {
        let result = alias.trim().replace([',', '-'], " ");
        let result = self.regex_multiple_spaces.replace_all(result.trim(), " ");
        result.replace(' ', ".")
    }
}

/// 是否全部為可列印的 ASCII 字元
#[must_use]
pub fn is_ascii_printable(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
}
