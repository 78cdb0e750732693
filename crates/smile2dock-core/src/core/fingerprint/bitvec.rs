/// A fixed-length bit vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    n_bits: usize,
}

impl Fingerprint {
    pub fn new(n_bits: usize) -> Self {
        Self {
            words: vec![0; n_bits.div_ceil(64)],
            n_bits,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n_bits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    /// Sets the bit at `hash` folded onto the vector length.
    pub fn set_hashed(&mut self, hash: u64) {
        if self.n_bits == 0 {
            return;
        }
        self.set((hash % self.n_bits as u64) as usize);
    }

    pub fn set(&mut self, bit: usize) {
        if bit < self.n_bits {
            self.words[bit / 64] |= 1 << (bit % 64);
        }
    }

    pub fn get(&self, bit: usize) -> bool {
        bit < self.n_bits && self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_bits).filter(|&b| self.get(b))
    }

    fn counts_with(&self, other: &Fingerprint) -> (usize, usize) {
        let longest = self.words.len().max(other.words.len());
        let word = |fp: &Fingerprint, i: usize| fp.words.get(i).copied().unwrap_or(0);
        (0..longest).fold((0, 0), |(and, or), i| {
            let (a, b) = (word(self, i), word(other, i));
            (
                and + (a & b).count_ones() as usize,
                or + (a | b).count_ones() as usize,
            )
        })
    }
}

/// Tanimoto coefficient `|a AND b| / |a OR b|`.
///
/// Two fingerprints without any set bit score 0. Vectors of different length
/// are compared as if the shorter one were padded with zeros.
pub fn tanimoto(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let (and, or) = a.counts_with(b);
    if or == 0 { 0.0 } else { and as f64 / or as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_bits() {
        let mut fp = Fingerprint::new(100);
        assert_eq!(fp.len(), 100);
        fp.set(3);
        fp.set(99);
        fp.set(150);
        assert!(fp.get(3) && fp.get(99));
        assert!(!fp.get(150));
        assert_eq!(fp.count_ones(), 2);
        assert_eq!(fp.ones().collect::<Vec<_>>(), vec![3, 99]);
    }

    #[test]
    fn hashed_bits_fold_onto_length() {
        let mut fp = Fingerprint::new(64);
        fp.set_hashed(64 + 5);
        assert!(fp.get(5));
    }

    #[test]
    fn tanimoto_edge_cases() {
        let empty = Fingerprint::new(64);
        assert_eq!(tanimoto(&empty, &empty), 0.0);

        let mut a = Fingerprint::new(64);
        let mut b = Fingerprint::new(64);
        a.set(1);
        a.set(2);
        b.set(2);
        b.set(3);
        assert!((tanimoto(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(tanimoto(&a, &a), 1.0);
    }
}
