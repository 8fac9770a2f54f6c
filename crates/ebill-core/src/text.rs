//! Cleanup of raw PDF text before pattern matching.
//!
//! PDF text extraction splits table header cells over two lines, pads cells
//! with runs of spaces and mixes full-width and ASCII punctuation. The
//! patterns in [`crate::bill`] are written against the cleaned form.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t\u{00a0}\u{3000}]+").unwrap();

    static ref LINE_EDGE_SPACE: Regex = Regex::new(r"(?m)^ +| +$").unwrap();

    // "抄见电量\n(千瓦时)" and "变/线损\n电量"; also a leading item ordinal "(1)"
    static ref WRAPPED_LABEL: Regex = Regex::new(
        r" ?(\(\d+\))?([\w/]+)(\([\w/]+\))?\n ?(\([\w/]+\)|电量)"
    ).unwrap();

    // Meter asset number glued to the reading type: "0300SG123有功总 ..."
    static ref GLUED_READING_TYPE: Regex = Regex::new(
        r"(?m)^(\w*\d)(有功总|无功总|尖|峰|平|谷) "
    ).unwrap();

    // Meter asset number broken over a line: "0300SG\n123 有功总 ..."
    static ref WRAPPED_ASSET_NUMBER: Regex = Regex::new(
        r"(?m)^(\w+)\n(\w+ (?:有功总|无功总|尖|峰|平|谷) )"
    ).unwrap();
}

/// Normalize raw page text for field matching.
pub fn normalize(raw: &str) -> String {
    let text: String = raw
        .replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '（' => '(',
            '）' => ')',
            '：' => ':',
            '\r' => '\n',
            other => other,
        })
        .collect();

    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = LINE_EDGE_SPACE.replace_all(&text, "");
    let text = WRAPPED_LABEL.replace_all(&text, " ${1}${2}${3}${4}");
    let text = GLUED_READING_TYPE.replace_all(&text, "${1} ${2} ");
    let text = WRAPPED_ASSET_NUMBER.replace_all(&text, "${1}${2}");

    text.into_owned()
}
