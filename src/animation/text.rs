/// One word of a title, with the separator that followed it kept attached so
/// rendered spans reproduce the original spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub line: usize,
    pub index: usize,
    pub text: String,
}

/// Split lines (separated by `\n`) into words. `index` runs across all lines so
/// it doubles as the stagger order.
pub fn segment_words(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut index = 0;
    for (line, content) in text.lines().enumerate() {
        let words: Vec<&str> = content.split(' ').filter(|w| !w.is_empty()).collect();
        let count = words.len();
        for (i, word) in words.into_iter().enumerate() {
            let text = if i + 1 < count { format!("{} ", word) } else { word.to_string() };
            segments.push(Segment { line, index, text });
            index += 1;
        }
    }
    segments
}

pub fn line_count(segments: &[Segment]) -> usize {
    segments.iter().map(|s| s.line + 1).max().unwrap_or(0)
}

pub fn segment_class(prefix: &str, segment: &Segment) -> String {
    format!("{prefix}-word {prefix}-word-{}", segment.index)
}

/// One selector per segment rendered with [`segment_class`], in stagger order.
pub fn segment_selectors(prefix: &str, segments: &[Segment]) -> Vec<String> {
    segments.iter().map(|s| format!(".{prefix}-word-{}", s.index)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_separators_between_words_only() {
        let words: Vec<String> = segment_words("be the future").into_iter().map(|s| s.text).collect();
        assert_eq!(words, vec!["be ", "the ", "future"]);
    }

    #[test]
    fn indexes_across_lines() {
        let segments = segment_words("rewiring\nreality today");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], Segment { line: 1, index: 1, text: "reality ".to_string() });
        assert_eq!(line_count(&segments), 2);
    }

    #[test]
    fn collapses_repeated_spaces() {
        let words: Vec<String> = segment_words("  a   b ").into_iter().map(|s| s.text).collect();
        assert_eq!(words, vec!["a ", "b"]);
        assert!(segment_words("").is_empty());
    }

    #[test]
    fn classes_match_selector() {
        let segments = segment_words("hello world");
        assert_eq!(segment_class("hero", &segments[1]), "hero-word hero-word-1");
        assert_eq!(segment_selectors("hero", &segments), vec![".hero-word-0", ".hero-word-1"]);
    }
}
