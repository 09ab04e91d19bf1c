//! Week bit-strings as scraped from activity statements.
//!
//! Index 0 of the bit-string is reserved; week `i` is the character at index `i`.

/// 1-based week numbers whose bit is set.
pub fn week_numbers(bitmap: &str) -> Vec<u32> {
    bitmap
        .chars()
        .enumerate()
        .skip(1)
        .filter(|(_, bit)| *bit == '1')
        .filter_map(|(index, _)| u32::try_from(index).ok())
        .collect()
}

/// Display form of the bit-string: reversed, leading zeros dropped.
pub fn display_pattern(bitmap: &str) -> String {
    let reversed: String = bitmap.chars().rev().collect();
    reversed.trim_start_matches('0').to_string()
}
