use crate::context::ParserContext;
use crate::schedule::common::{
    attribute, cell_text, cjk_only, contains_cjk, descendant_tags, is_results_table, tables,
};
use crate::types::{CourseRecord, TeacherId};
use regex::Regex;
use std::collections::HashMap;
use tl::VDom;

const NAME_SEPARATORS: [char; 4] = [',', '，', ';', '、'];
const MIN_DIRECT_TEACHERS: usize = 5;

/// Teacher name → id, in first-seen order of precedence.
#[derive(Debug, Clone, Default)]
pub struct TeacherDirectory {
    ids: HashMap<String, i64>,
    folded: HashMap<String, i64>,
}

impl TeacherDirectory {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Keeps the first id seen for a name.
    pub fn insert(&mut self, name: &str, id: i64) -> bool {
        let name = name.trim();
        if name.is_empty() || self.ids.contains_key(name) {
            return false;
        }
        self.ids.insert(name.to_string(), id);
        self.folded.entry(name.to_lowercase()).or_insert(id);
        true
    }

    pub fn lookup(&self, name: &str) -> TeacherId {
        let name = name.trim();
        if name.is_empty() {
            return TeacherId::Unresolved;
        }
        self.ids
            .get(name)
            .or_else(|| self.folded.get(&name.to_lowercase()))
            .map_or(TeacherId::Unresolved, |id| TeacherId::Resolved(*id))
    }
}

/// One row of a rendered results table tying a course number to its teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherCorrelation {
    pub teacher_name: String,
    pub lesson_id: String,
    pub course_name: String,
}

pub fn extract_teacher_ids(html: &str, context: &ParserContext) -> TeacherDirectory {
    let patterns = &context.patterns;
    let mut directory = TeacherDirectory::default();

    for captures in patterns.teachers_single.captures_iter(html) {
        if let Ok(id) = captures[1].parse::<i64>() {
            directory.insert(&captures[2], id);
        }
    }

    if directory.is_empty() {
        insert_cjk_pairs(&mut directory, &patterns.teacher_generic, html);
    }

    if directory.len() < MIN_DIRECT_TEACHERS {
        for array in &patterns.teacher_arrays {
            for declaration in array.captures_iter(html) {
                insert_cjk_pairs(&mut directory, &patterns.teacher_item, &declaration[1]);
            }
        }
    }

    tracing::info!("[Schedule] Found {} teacher ids", directory.len());
    directory
}

fn insert_cjk_pairs(directory: &mut TeacherDirectory, pattern: &Regex, text: &str) {
    for captures in pattern.captures_iter(text) {
        let name = &captures[2];
        if !contains_cjk(name) {
            continue;
        }
        if let Ok(id) = captures[1].parse::<i64>() {
            if directory.insert(name, id) {
                tracing::debug!("[Schedule] Teacher {} has id {}", name, id);
            }
        }
    }
}

/// `course number → teacher` from results tables with a teacher column and a
/// course number column linking to `lesson.id=N`.
pub fn extract_teacher_correlation(
    dom: &VDom,
    context: &ParserContext,
) -> HashMap<String, TeacherCorrelation> {
    let parser = dom.parser();
    let keywords = &context.config.header_keywords;
    let mut correlation = HashMap::new();

    for table in tables(dom, is_results_table) {
        let mut teacher_index = None;
        let mut number_index = None;
        let mut name_index = None;
        for thead in descendant_tags(table, parser, "thead") {
            for (index, header) in descendant_tags(thead, parser, "th").iter().enumerate() {
                let text = cell_text(header, parser);
                if keywords.is_teacher(&text) {
                    teacher_index = Some(index);
                }
                if keywords.is_course_number(&text) {
                    number_index = Some(index);
                }
                if keywords.is_course_name(&text) {
                    name_index = Some(index);
                }
            }
        }
        let (Some(teacher_index), Some(number_index)) = (teacher_index, number_index) else {
            continue;
        };

        for tbody in descendant_tags(table, parser, "tbody") {
            for row in descendant_tags(tbody, parser, "tr") {
                let cells = descendant_tags(row, parser, "td");
                if cells.len() <= teacher_index.max(number_index) {
                    continue;
                }
                let Some(link) = descendant_tags(cells[number_index], parser, "a").first().copied()
                else {
                    continue;
                };
                let number = cell_text(link, parser);
                let href = attribute(link, "href").unwrap_or_default();
                let Some(lesson) = context.patterns.lesson_id.captures(&href) else {
                    continue;
                };
                if number.is_empty() {
                    continue;
                }
                let course_name = name_index
                    .and_then(|index| cells.get(index))
                    .map(|cell| cell_text(cell, parser))
                    .unwrap_or_default();
                tracing::debug!(
                    "[Schedule] Correlated {} with teacher {:?}, lesson {}",
                    number,
                    cell_text(cells[teacher_index], parser),
                    &lesson[1]
                );
                correlation.insert(
                    number,
                    TeacherCorrelation {
                        teacher_name: cell_text(cells[teacher_index], parser),
                        lesson_id: lesson[1].to_string(),
                        course_name,
                    },
                );
            }
        }
    }

    tracing::info!(
        "[Schedule] Correlated {} course numbers with teachers",
        correlation.len()
    );
    correlation
}

fn lookup_variants(directory: &TeacherDirectory, name: &str) -> TeacherId {
    let direct = directory.lookup(name);
    if direct.is_resolved() {
        return direct;
    }
    let first = name
        .split(NAME_SEPARATORS)
        .map(str::trim)
        .find(|part| !part.is_empty())
        .unwrap_or_default();
    let by_first = directory.lookup(first);
    if by_first.is_resolved() {
        return by_first;
    }
    directory.lookup(&cjk_only(name))
}

/// Attaches teacher identity to every record. A correlated table name takes
/// precedence over the script-declared name.
pub fn resolve_teachers(
    records: &mut [CourseRecord],
    directory: &TeacherDirectory,
    correlation: &HashMap<String, TeacherCorrelation>,
) {
    let mut matched = 0usize;
    for record in records.iter_mut() {
        let mut resolved = TeacherId::Unresolved;

        if let Some(entry) = correlation.get(&record.number) {
            if record.lesson_id.is_none() && !entry.lesson_id.is_empty() {
                record.lesson_id = Some(entry.lesson_id.clone());
            }
            if !entry.teacher_name.is_empty() {
                record.teacher_name = entry.teacher_name.clone();
                resolved = directory.lookup(&entry.teacher_name);
            }
        }

        if !resolved.is_resolved() && !record.teacher_name.is_empty() {
            resolved = lookup_variants(directory, &record.teacher_name);
        }

        if resolved.is_resolved() {
            matched += 1;
            record.teacher_id = resolved;
        }
    }
    tracing::info!(
        "[Schedule] Resolved teacher ids for {} of {} courses",
        matched,
        records.len()
    );
}
