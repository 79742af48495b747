//! Fixed-window text splitting: windows of `size` characters advancing by
//! `size - overlap`, so consecutive chunks share exactly the overlap. The
//! final chunk may be shorter; the overlap keeps text at a window boundary
//! from being lost to both neighbours.

pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);

    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}
