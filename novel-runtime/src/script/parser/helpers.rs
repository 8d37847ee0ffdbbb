//! # 辅助解析函数
//!
//! 手写的字符串解析辅助函数，无正则依赖。

/// 行内震动效果的起始标记
const SHAKE_OPEN: &str = "<shake>";
const SHAKE_CLOSE: &str = "</shake>";
/// 表现层使用的富文本链接标记
const LINK_SHAKE_OPEN: &str = "<link=shake>";
const LINK_CLOSE: &str = "</link>";

/// 标签名字符（字母、数字、下划线）
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 预处理脚本文本
///
/// 统一换行符，并把 `<shake>…</shake>` 改写为表现层的链接标记。
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(SHAKE_OPEN, LINK_SHAKE_OPEN)
        .replace(SHAKE_CLOSE, LINK_CLOSE)
}

/// 解析标签行
///
/// 输入: `[char img=alice enter=left]`
/// 输出: `Some(("char", Some("img=alice enter=left")))`
///
/// 标签名与内容之间至少需要一个空白字符；不符合语法时返回 `None`。
pub fn parse_tag_line(line: &str) -> Option<(&str, Option<&str>)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;

    let name_end = inner
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(inner.len(), |(i, _)| i);
    if name_end == 0 {
        return None;
    }

    let (name, rest) = inner.split_at(name_end);
    if rest.is_empty() {
        return Some((name, None));
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some((name, Some(rest.trim())))
}

/// 从标签内容中提取 `key=value` 属性
///
/// 值可以是裸词（不含空白和 `]`），也可以是单/双引号字符串（去掉引号）。
/// 不构成属性的文本被忽略。
pub fn parse_attributes(body: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = body;

    while !rest.is_empty() {
        match match_attribute(rest) {
            Some((key, value, consumed)) => {
                attrs.push((key.to_string(), value.to_string()));
                rest = &rest[consumed..];
            }
            None => {
                let skip = rest.chars().next().map_or(1, char::len_utf8);
                rest = &rest[skip..];
            }
        }
    }

    attrs
}

/// 尝试在字符串开头匹配一个属性，返回 (键, 值, 消耗的字节数)
fn match_attribute(s: &str) -> Option<(&str, &str, usize)> {
    let key_end = s
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(s.len(), |(i, _)| i);
    if key_end == 0 {
        return None;
    }

    let key = &s[..key_end];
    let after_eq = s[key_end..].strip_prefix('=')?;
    let value_start = key_end + 1;

    // 引号值
    if let Some(quote) = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let body = &after_eq[1..];
        if let Some(close) = body.find(quote) {
            return Some((key, &body[..close], value_start + close + 2));
        }
    }

    // 裸词值（未闭合的引号也按裸词处理）
    let bare_end = after_eq
        .char_indices()
        .find(|(_, c)| matches!(c, ' ' | '\t' | ']'))
        .map_or(after_eq.len(), |(i, _)| i);
    if bare_end == 0 {
        return None;
    }

    Some((key, &after_eq[..bare_end], value_start + bare_end))
}

/// 解析选择项行
///
/// 输入: `* 去森林 > forest`
/// 输出: `Some(("去森林", "forest"))`
///
/// 选项文本取第一个 `>` 之前的部分，`*` 与 `>` 之间至少要有一个字符
/// （可以只是空白，此时文本为空）；目标不能为空。
pub fn parse_choice_option(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('*')?;

    let (pos, _) = rest
        .match_indices('>')
        .find(|(pos, _)| *pos > 0)?;

    let text = rest[..pos].trim();
    let target = rest[pos + 1..].trim();
    if target.is_empty() {
        return None;
    }

    Some((text, target))
}
