use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

static MARKDOWN_SPECIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[_*`\[]").expect("static markdown pattern is valid")
});

/// Escapes user-supplied text for Telegram's legacy `Markdown` parse mode.
///
/// Only `_`, `*`, `` ` `` and `[` are entity delimiters in that mode; each is
/// prefixed with a backslash so names like `snake_case` or `a*b` render verbatim
/// instead of breaking the message.
pub fn escape_markdown(input: &str) -> Cow<'_, str> {
    MARKDOWN_SPECIAL.replace_all(input, r"\$0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape_markdown("Ana Maria"), Cow::Borrowed("Ana Maria")));
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), r"a\_b\*c\`d\[e]");
    }
}
