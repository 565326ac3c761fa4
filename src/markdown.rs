//! Turns the raw comparison summary returned by Gemini into structured
//! content: an optional markdown table plus typed text blocks.

/// Table extracted from the top of a comparison summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub remaining_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedContent {
    Table(ParsedTable),
    PlainText(String),
}

/// One displayable unit of prose.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet(String),
    Paragraph(String),
}

/// Extract the leading markdown table from `summary`, if there is one.
///
/// The table starts at the first line containing `|` whose next line contains
/// `---`, and runs while lines keep containing `|`. Anything shorter than
/// header + separator + one data row is not treated as a table.
pub fn parse_summary(summary: &str) -> ParsedContent {
    let lines: Vec<&str> = summary.trim().split('\n').collect();

    let table_start = (0..lines.len()).find(|&i| {
        lines[i].contains('|') && lines.get(i + 1).is_some_and(|next| next.contains("---"))
    });

    let Some(start) = table_start else {
        return ParsedContent::PlainText(summary.to_string());
    };

    let mut end = start;
    while end < lines.len() && lines[end].contains('|') {
        end += 1;
    }
    let table_lines = &lines[start..end];

    if table_lines.len() < 3 {
        return ParsedContent::PlainText(summary.to_string());
    }

    let headers = split_cells(table_lines[0]);
    // Index 1 is the separator row.
    let rows: Vec<Vec<String>> = table_lines[2..]
        .iter()
        .map(|line| split_cells(line))
        .filter(|row| !row.is_empty())
        .collect();
    let remaining_text = lines[end..].join("\n");

    ParsedContent::Table(ParsedTable {
        headers,
        rows,
        remaining_text,
    })
}

// Leading/trailing pipes produce empty segments; dropping empty-after-trim
// cells handles both `| a | b |` and `a | b` forms. Row widths are passed
// through as-is, never padded to the header count.
fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify each line of `text` into a display block. Blank lines emit
/// nothing; every other line emits exactly one block, in input order.
pub fn render_blocks(text: &str) -> Vec<Block> {
    text.split('\n')
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix("# ") {
                Some(Block::Heading {
                    level: 1,
                    text: rest.to_string(),
                })
            } else if let Some(rest) = line.strip_prefix("## ") {
                Some(Block::Heading {
                    level: 2,
                    text: rest.to_string(),
                })
            } else if let Some(rest) = line.strip_prefix("### ") {
                Some(Block::Heading {
                    level: 3,
                    text: rest.to_string(),
                })
            } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                Some(Block::Bullet(rest.to_string()))
            } else if line.trim().is_empty() {
                None
            } else {
                Some(Block::Paragraph(line.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: ParsedContent) -> ParsedTable {
        match content {
            ParsedContent::Table(t) => t,
            ParsedContent::PlainText(text) => panic!("expected table, got plain text: {text}"),
        }
    }

    #[test]
    fn test_parse_well_formed_table() {
        let input = "| Platform | Price |\n|---|---|\n| Amazon | ₹999 |\n| Flipkart | ₹949 |\n\n## Analysis\nFlipkart is cheaper.";
        let t = table(parse_summary(input));

        assert_eq!(t.headers, vec!["Platform", "Price"]);
        assert_eq!(
            t.rows,
            vec![vec!["Amazon", "₹999"], vec!["Flipkart", "₹949"]]
        );
        assert_eq!(t.remaining_text, "\n## Analysis\nFlipkart is cheaper.");

        let blocks = render_blocks(&t.remaining_text);
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 2,
                    text: "Analysis".to_string()
                },
                Block::Paragraph("Flipkart is cheaper.".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_pipes_is_plain_text() {
        let input = "Just a paragraph of analysis.\nAnd another one.";
        assert_eq!(
            parse_summary(input),
            ParsedContent::PlainText(input.to_string())
        );
    }

    #[test]
    fn test_header_and_separator_only_is_plain_text() {
        let input = "| Platform | Price |\n|---|---|";
        assert_eq!(
            parse_summary(input),
            ParsedContent::PlainText(input.to_string())
        );
    }

    #[test]
    fn test_separator_without_pipes_breaks_the_run() {
        // The `---` line has no `|`, so the contiguous run stops at one line
        // and the whole thing falls back to plain text.
        let input = "| Platform | Price |\n---\n| Amazon | ₹999 |";
        assert_eq!(
            parse_summary(input),
            ParsedContent::PlainText(input.to_string())
        );
    }

    #[test]
    fn test_prose_before_the_table_is_dropped() {
        let input = "Here is what I found:\n\n| A | B |\n|---|---|\n| 1 | 2 |";
        let t = table(parse_summary(input));
        assert_eq!(t.headers, vec!["A", "B"]);
        assert_eq!(t.rows, vec![vec!["1", "2"]]);
        assert_eq!(t.remaining_text, "");
    }

    #[test]
    fn test_row_width_mismatch_passes_through() {
        let input = "| A | B | C |\n|---|---|---|\n| 1 | 2 |\n| 1 | 2 | 3 | 4 |";
        let t = table(parse_summary(input));
        assert_eq!(t.headers.len(), 3);
        assert_eq!(t.rows[0], vec!["1", "2"]);
        assert_eq!(t.rows[1], vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_header_count_matches_nonempty_segments() {
        let t = table(parse_summary(
            "| Platform | Product Name | Price | Rating |\n|---|---|---|---|\n| x | y | z | w |",
        ));
        assert_eq!(t.headers.len(), 4);
    }

    #[test]
    fn test_blank_lines_emit_no_blocks() {
        let blocks = render_blocks("first\n\n   \nsecond");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("first".to_string()),
                Block::Paragraph("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_heading_and_bullet_prefixes() {
        let blocks = render_blocks("# Title\n## Sub\n### Deep\n- item\n* star item\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                Block::Heading {
                    level: 2,
                    text: "Sub".to_string()
                },
                Block::Heading {
                    level: 3,
                    text: "Deep".to_string()
                },
                Block::Bullet("item".to_string()),
                Block::Bullet("star item".to_string()),
                Block::Paragraph("plain".to_string()),
            ]
        );
    }

    #[test]
    fn test_indented_lines_are_paragraphs() {
        // Classification looks at the raw line, so an indented bullet does
        // not match the "- " prefix.
        let blocks = render_blocks("  - indented");
        assert_eq!(blocks, vec![Block::Paragraph("  - indented".to_string())]);
    }

    #[test]
    fn test_table_round_trip() {
        let input = "| A | B |\n|---|---|\n| 1 | 2 |\nafter\nmore";
        let lines: Vec<&str> = input.split('\n').collect();
        let t = table(parse_summary(input));

        // Table run + remaining text reconstructs everything from the start
        // of the table.
        let reconstructed = format!("{}\n{}", lines[..3].join("\n"), t.remaining_text);
        assert_eq!(reconstructed, input);
    }
}
