//! Bounded Damerau-Levenshtein distance (optimal string alignment variant).
//!
//! The computation stops as soon as every cell of a DP row exceeds the
//! cutoff; row minima never decrease, so no later row can come back under
//! it. Rows are kept in a reusable scratch buffer so scoring a batch of
//! candidates allocates once.

/// Reusable DP rows for repeated distance computations
#[derive(Debug, Default)]
pub struct EditDistance {
    prev2: Vec<usize>,
    prev: Vec<usize>,
    cur: Vec<usize>,
}

impl EditDistance {
    pub fn new() -> Self {
        Self::default()
    }

    /// OSA distance between `a` and `b`, or `None` if it exceeds `max`
    pub fn bounded(&mut self, a: &[char], b: &[char], max: usize) -> Option<usize> {
        let (la, lb) = (a.len(), b.len());
        if la.abs_diff(lb) > max {
            return None;
        }
        if la == 0 || lb == 0 {
            return Some(la.max(lb));
        }

        let width = lb + 1;
        self.prev2.clear();
        self.prev2.resize(width, 0);
        self.prev.clear();
        self.prev.extend(0..width);
        self.cur.clear();
        self.cur.resize(width, 0);

        for i in 1..=la {
            self.cur[0] = i;
            let mut row_min = i;

            for j in 1..=lb {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                let mut value = (self.prev[j] + 1)
                    .min(self.cur[j - 1] + 1)
                    .min(self.prev[j - 1] + cost);

                // Adjacent transposition
                if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                    value = value.min(self.prev2[j - 2] + 1);
                }

                self.cur[j] = value;
                row_min = row_min.min(value);
            }

            if row_min > max {
                return None;
            }

            std::mem::swap(&mut self.prev2, &mut self.prev);
            std::mem::swap(&mut self.prev, &mut self.cur);
        }

        let distance = self.prev[lb];
        (distance <= max).then_some(distance)
    }
}
