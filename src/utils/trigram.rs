/// A trigram is a 3-byte sequence stored as u32 (only lower 24 bits used)
pub type Trigram = u32;

/// Pack three bytes into a trigram
#[inline]
pub fn bytes_to_trigram(a: u8, b: u8, c: u8) -> Trigram {
    ((a as u32) << 16) | ((b as u32) << 8) | (c as u32)
}

/// Extract the unique trigrams of a match form, sorted.
///
/// The form is padded with one space on each side so that short tokens
/// (`3-b`, `a`) and word boundaries still produce trigrams.
pub fn form_trigrams(form: &str) -> Vec<Trigram> {
    if form.is_empty() {
        return Vec::new();
    }

    let mut padded = Vec::with_capacity(form.len() + 2);
    padded.push(b' ');
    padded.extend_from_slice(form.as_bytes());
    padded.push(b' ');

    let mut trigrams: Vec<Trigram> = padded
        .windows(3)
        .map(|w| bytes_to_trigram(w[0], w[1], w[2]))
        .collect();
    trigrams.sort_unstable();
    trigrams.dedup();
    trigrams
}

/// Dice coefficient from a shared count and the two set sizes
#[inline]
pub fn dice(shared: usize, a_len: usize, b_len: usize) -> f64 {
    if a_len + b_len == 0 {
        0.0
    } else {
        (2 * shared) as f64 / (a_len + b_len) as f64
    }
}
