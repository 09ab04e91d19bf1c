use crate::context::Patterns;
use regex::Regex;
use std::sync::LazyLock;
use tl::{HTMLTag, Parser, VDom};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

pub fn normalize_text(input: &str) -> String {
    let decoded = decode_entities(input);
    WHITESPACE_RE
        .replace_all(decoded.trim(), " ")
        .trim()
        .to_string()
}

pub fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace('\u{00A0}', " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

pub fn parse_dom(html: &str) -> Result<VDom<'_>, String> {
    tl::parse(html, tl::ParserOptions::default()).map_err(|e| format!("Failed to parse HTML: {e}"))
}

/// Splits a script argument list on top-level commas. Commas inside quoted
/// strings or nested parentheses stay part of their argument.
pub fn split_parameters(parameters: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth: i32 = 0;
    let mut previous: Option<char> = None;

    for ch in parameters.chars() {
        match ch {
            '\'' | '"' if previous != Some('\\') => {
                match quote {
                    None => quote = Some(ch),
                    Some(open) if open == ch => quote = None,
                    Some(_) => {}
                }
                current.push(ch);
            }
            '(' if quote.is_none() => {
                depth += 1;
                current.push(ch);
            }
            ')' if quote.is_none() => {
                depth -= 1;
                current.push(ch);
            }
            ',' if quote.is_none() && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
        previous = Some(ch);
    }

    if !current.is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

pub fn trim_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// Drops a trailing parenthesised qualifier: `Intro(Lecture)` becomes `Intro`.
/// Names without a qualifier, or that would become empty, are returned as-is.
pub fn strip_qualifier(name: &str) -> String {
    let trimmed = name.trim();
    match trimmed.rfind('(') {
        Some(index) => {
            let head = trimmed[..index].trim();
            if head.is_empty() {
                trimmed.to_string()
            } else {
                head.to_string()
            }
        }
        None => trimmed.to_string(),
    }
}

pub fn code_from_number(number: &str) -> String {
    match number.split_once('.') {
        Some((code, _)) => code.to_string(),
        None => String::new(),
    }
}

pub fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&ch)
}

pub fn contains_cjk(value: &str) -> bool {
    value.chars().any(is_cjk)
}

pub fn cjk_only(value: &str) -> String {
    value.chars().filter(|ch| is_cjk(*ch)).collect()
}

pub fn is_tag(tag: &HTMLTag, name: &str) -> bool {
    tag.name().as_utf8_str().eq_ignore_ascii_case(name)
}

pub fn attribute(tag: &HTMLTag, key: &str) -> Option<String> {
    let attributes = tag.attributes();
    let value = match key {
        "id" => attributes.id(),
        "class" => attributes.class(),
        _ => attributes.get(key).flatten(),
    };
    value.map(|value| value.as_utf8_str().trim().to_string())
}

pub fn has_class(tag: &HTMLTag, class: &str) -> bool {
    tag.attributes()
        .class()
        .map(|value| {
            value
                .as_utf8_str()
                .split_whitespace()
                .any(|item| item.contains(class))
        })
        .unwrap_or(false)
}

/// All descendant tags of `tag` with the given name, in document order.
pub fn descendant_tags<'a, 'b>(
    tag: &'a HTMLTag<'b>,
    parser: &'a Parser<'b>,
    name: &str,
) -> Vec<&'a HTMLTag<'b>> {
    tag.children()
        .all(parser)
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|child| is_tag(child, name))
        .collect()
}

/// Every `<table>` in the document accepted by `filter`.
pub fn tables<'a, 'b>(dom: &'a VDom<'b>, filter: impl Fn(&HTMLTag) -> bool) -> Vec<&'a HTMLTag<'b>> {
    dom.nodes()
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|tag| is_tag(tag, "table") && filter(*tag))
        .collect()
}

/// Timetable grids: class `gridtable` or an id mentioning `kbtable`.
pub fn is_schedule_table(tag: &HTMLTag) -> bool {
    has_class(tag, "gridtable")
        || attribute(tag, "id").is_some_and(|id| id.to_ascii_lowercase().contains("kbtable"))
}

pub fn is_results_table(tag: &HTMLTag) -> bool {
    has_class(tag, "gridtable")
}

pub fn cell_text(tag: &HTMLTag, parser: &Parser) -> String {
    normalize_text(&tag.inner_text(parser))
}

/// Visible lines of a cell, split on `<br>`.
pub fn cell_lines(tag: &HTMLTag, parser: &Parser) -> Vec<String> {
    let html = tag.inner_html(parser);
    BR_RE
        .split(&html)
        .map(|line| normalize_text(&strip_tags(line)))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Decodes a `TD<index>_<table>` cell id into `(day, period)`.
pub fn decode_slot(cell_id: &str, periods_per_day: u32, patterns: &Patterns) -> Option<(u8, u32)> {
    if periods_per_day == 0 {
        return None;
    }
    let captures = patterns.cell_id.captures(cell_id.trim())?;
    let index: u32 = captures[1].parse().ok()?;
    let day = u8::try_from(index / periods_per_day).ok()?;
    if day > 6 {
        return None;
    }
    Some((day, index % periods_per_day))
}

/// Splits a cell's first line into a name and an optional `[teacher]` bracket.
pub fn split_bracketed_teacher(line: &str) -> (String, String) {
    if let Some(open) = line.find('[') {
        if let Some(close_offset) = line[open..].find(']') {
            let close = open + close_offset;
            let teacher = line[open + 1..close].trim().to_string();
            let name = format!("{}{}", &line[..open], &line[close + 1..]);
            return (name.trim().to_string(), teacher);
        }
    }
    (line.trim().to_string(), String::new())
}
