use unicode_segmentation::UnicodeSegmentation;

/// A slice of label text, classified for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fragment<'a> {
    Text(&'a str),
    Emoji(&'a str),
}

impl<'a> Fragment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Text(s) | Self::Emoji(s) => s,
        }
    }
}

/// Split `s` into alternating text and emoji fragments.
///
/// Emoji are detected per extended grapheme cluster, so ZWJ sequences, flags, skin tone
/// modifiers and keycaps stay in one fragment. Adjacent plain graphemes are merged.
pub fn split_emoji(s: &str) -> Vec<Fragment<'_>> {
    let mut out = Vec::new();
    let mut text_start: Option<usize> = None;

    for (idx, g) in s.grapheme_indices(true) {
        if is_emoji_grapheme(g) {
            if let Some(start) = text_start.take() {
                out.push(Fragment::Text(&s[start..idx]));
            }
            out.push(Fragment::Emoji(g));
        } else if text_start.is_none() {
            text_start = Some(idx);
        }
    }
    if let Some(start) = text_start {
        out.push(Fragment::Text(&s[start..]));
    }
    out
}

fn is_emoji_grapheme(g: &str) -> bool {
    g.chars()
        .any(|c| is_pictographic(c) || c == '\u{FE0F}' || c == '\u{20E3}')
}

fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x2300..=0x23FF
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/emoji.rs"]
mod tests;
