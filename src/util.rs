use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `text` to at most `max_width` terminal columns, ending in `…` when cut
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// "1 exercise", "3 exercises"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("Burpees", 10), "Burpees");
        assert_eq!(truncate("Burpees", 7), "Burpees");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("Mountain climbers", 8), "Mountai…");
        assert_eq!(truncate("Mountain climbers", 8).width(), 8);
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is two columns wide
        let cut = truncate("腕立て伏せ", 6);
        assert!(cut.width() <= 6);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "exercise"), "1 exercise");
        assert_eq!(plural(0, "session"), "0 sessions");
        assert_eq!(plural(12, "rep"), "12 reps");
    }
}
