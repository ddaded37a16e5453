//! Small text-formatting helpers shared by [`crate::ir::printer`].

/// Indent every line of `text` by `levels * 4` spaces.
pub fn indent(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an unsigned integer as a `0b`-prefixed binary literal, used by the
/// synthesizer for the initial `truncate_flags` constant.
pub fn binary_literal(value: u32, bits: u32) -> String {
    format!("0b{:0width$b}", value, width = bits as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_each_nonempty_line() {
        let out = indent("a\n\nb", 1);
        assert_eq!(out, "    a\n\n    b");
    }

    #[test]
    fn binary_literal_pads_to_width() {
        assert_eq!(binary_literal(0b101, 5), "0b00101");
    }
}
