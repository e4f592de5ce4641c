use proptest::prelude::*;

/// Strategy for generating item names as they appear in tracker input files
pub fn item_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.:/-]{1,24}"
}

/// Strategy for a single raw input line: an item padded with whitespace, or
/// a blank line
pub fn raw_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (item_name_strategy(), "[ \t]{0,3}", "[ \t]{0,3}")
            .prop_map(|(name, lead, trail)| format!("{lead}{name}{trail}")),
        1 => "[ \t]{0,4}",
    ]
}

/// Strategy for a whole input document with mixed `\n` / `\r\n` endings
pub fn input_document_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec((raw_line_strategy(), any::<bool>()), 0..120),
        any::<bool>(),
    )
        .prop_map(|(lines, trailing_newline)| {
            let mut doc = String::new();
            let count = lines.len();
            for (index, (line, crlf)) in lines.into_iter().enumerate() {
                doc.push_str(&line);
                if index + 1 < count || trailing_newline {
                    doc.push_str(if crlf { "\r\n" } else { "\n" });
                }
            }
            doc
        })
}

/// Strategy for batch capacities, small enough to force several flushes
pub fn capacity_strategy() -> impl Strategy<Value = usize> {
    1usize..=16
}
