use crate::context::ParserContext;
use crate::schedule::common::{
    cell_text, descendant_tags, is_results_table, normalize_text, tables,
};
use crate::types::CourseRecord;
use std::collections::HashMap;
use tl::{HTMLTag, Parser, VDom};

pub type CreditMap = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, Default)]
struct CreditColumns {
    credit: Option<usize>,
    number: Option<usize>,
    name: Option<usize>,
}

impl CreditColumns {
    fn qualifies(&self) -> bool {
        self.credit.is_some() && (self.number.is_some() || self.name.is_some())
    }
}

/// `course number → credit`, from a results table when one exists, otherwise
/// from five-cell rows found anywhere in the markup.
pub fn extract_credits(html: &str, dom: &VDom, context: &ParserContext) -> CreditMap {
    let mut credits = credits_from_tables(dom, context);
    if credits.is_empty() {
        credits = credits_from_markup(html, context);
    }
    tracing::info!("[Schedule] Found {} course credits", credits.len());
    credits
}

fn credits_from_tables(dom: &VDom, context: &ParserContext) -> CreditMap {
    let parser = dom.parser();
    let keywords = &context.config.header_keywords;
    let mut credits = CreditMap::new();

    for table in tables(dom, is_results_table) {
        let headers = descendant_tags(table, parser, "th");
        let mut columns = CreditColumns::default();
        for (index, header) in headers.iter().enumerate() {
            let text = cell_text(header, parser);
            if keywords.is_credit(&text) {
                columns.credit = Some(index);
            }
            if keywords.is_course_number(&text) {
                columns.number = Some(index);
            }
            if keywords.is_course_name(&text) {
                columns.name = Some(index);
            }
        }
        if !columns.qualifies() {
            continue;
        }
        let (Some(credit_index), Some(number_index)) = (columns.credit, columns.number) else {
            tracing::debug!("[Schedule] Credit table has no course number column");
            continue;
        };

        for row in descendant_tags(table, parser, "tr") {
            let cells = descendant_tags(row, parser, "td");
            if cells.len() <= credit_index.max(number_index) {
                continue;
            }
            let number = course_number_from_cell(cells[number_index], parser, context);
            if number.is_empty() {
                continue;
            }
            let credit_text = cell_text(cells[credit_index], parser);
            match parse_credit(&credit_text) {
                Some(credit) => {
                    tracing::debug!("[Schedule] Credit {} for {}", credit, number);
                    credits.insert(number, credit);
                }
                None => {
                    tracing::debug!(
                        "[Schedule] Ignoring credit {:?} for {}",
                        credit_text,
                        number
                    );
                }
            }
        }
    }

    credits
}

/// Finite, non-negative credit values only.
fn parse_credit(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|credit| credit.is_finite() && *credit >= 0.0)
}

fn course_number_from_cell(cell: &HTMLTag, parser: &Parser, context: &ParserContext) -> String {
    let text = cell_text(cell, parser);
    if let Some(found) = context.patterns.course_number.find(&text) {
        return found.as_str().to_string();
    }
    match descendant_tags(cell, parser, "a").first() {
        Some(link) => cell_text(link, parser),
        None => text,
    }
}

fn credits_from_markup(html: &str, context: &ParserContext) -> CreditMap {
    let mut credits = CreditMap::new();
    for captures in context.patterns.credit_row.captures_iter(html) {
        let number_cell = normalize_text(&captures[5]);
        let Some(number) = context.patterns.course_number.find(&number_cell) else {
            continue;
        };
        if let Some(credit) = parse_credit(&captures[4]) {
            credits.insert(number.as_str().to_string(), credit);
        }
    }
    credits
}

/// Sets `credit` on every record whose number has a known credit.
pub fn attach_credits(records: &mut [CourseRecord], credits: &CreditMap) {
    for record in records.iter_mut() {
        if record.number.is_empty() {
            continue;
        }
        if let Some(&credit) = credits.get(&record.number) {
            record.credit = Some(credit);
        }
    }
}
