//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from `LDIF_TEST_SEED` or a random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("LDIF_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random attribute name: a letter, then letters, digits or hyphens.
    /// Never one of the LDIF keywords.
    pub fn attr_name(&mut self) -> String {
        let len = 1 + self.geometric(0.7);
        let mut name = String::from("x");
        let chars = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-";
        for _ in 0..len {
            name.push(chars[self.rng.gen_range(0..chars.len())] as char);
        }
        name
    }

    /// Random safe value (no leading space, colon or angle bracket)
    pub fn value(&mut self) -> String {
        let len = 1 + self.geometric(0.85);
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789 =,.@-";
        let mut val = String::with_capacity(len);
        val.push(self.rng.gen_range(b'a'..=b'z') as char);
        for _ in 1..len {
            val.push(chars[self.rng.gen_range(0..chars.len())] as char);
        }
        val
    }

    /// Random distinguished name
    pub fn dn(&mut self) -> String {
        let depth = 1 + self.geometric(0.5);
        let mut parts = vec![format!("cn={}", self.attr_name())];
        for _ in 0..depth {
            parts.push(format!("dc={}", self.attr_name()));
        }
        parts.join(",")
    }

    /// Random comment line, line break included
    pub fn comment(&mut self) -> String {
        format!("# {}\n", self.value())
    }

    /// Random valid content record, without the terminating blank line
    pub fn content_record(&mut self) -> String {
        let mut out = format!("dn: {}\n", self.dn());
        let count = 1 + self.geometric(0.6);
        for _ in 0..count {
            out.push_str(&format!("{}: {}\n", self.attr_name(), self.value()));
        }
        out
    }

    /// Random reader chunk size, small enough to split lines
    pub fn chunk_size(&mut self) -> usize {
        1 + self.rng.gen_range(0..64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.content_record(), g2.content_record());
            assert_eq!(g1.geometric(0.9), g2.geometric(0.9));
        }
    }

    #[test]
    fn test_generated_record_is_valid() {
        let mut gen = Gen::new(7);
        for _ in 0..20 {
            let doc = ldif_core::parse_document(&gen.content_record());
            assert!(doc.is_valid(), "{}", doc);
        }
    }
}
