//! Text labels: raw string plus its wrapped lines.

/// Average glyph advance as a fraction of the font size
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBody {
    pub text: String,
    pub lines: Vec<String>,
}

/// Wrap `text` into lines no wider than `max_width` for the given font size.
///
/// Explicit newlines always break. Words longer than a line are split.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let char_width = (font_size * CHAR_WIDTH_FACTOR).max(f32::EPSILON);
    let max_chars = ((max_width / char_width).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if line_len == 0 {
                word.len()
            } else {
                line_len + 1 + word.len()
            };
            if needed > max_chars && line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }
    lines
}
