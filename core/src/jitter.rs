/// Small seeded generator for decorative randomness (sizes, drift, colours).
#[derive(Clone, Debug)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn unit(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mixed = splitmix64(self.state);
        let top = mixed >> 11;
        top as f64 / ((1u64 << 53) as f64)
    }

    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.unit()
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = ((self.unit() * items.len() as f64) as usize).min(items.len() - 1);
        items.get(index)
    }
}

fn splitmix64(mut value: u64) -> u64 {
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d049bb133111eb);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_within_bounds() {
        let mut jitter = Jitter::new(7);
        for _ in 0..1000 {
            let value = jitter.range(8.0, 18.0);
            assert!((8.0..18.0).contains(&value));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Jitter::new(42);
        let mut b = Jitter::new(42);
        for _ in 0..16 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
    }

    #[test]
    fn pick_handles_empty_and_full_slices() {
        let mut jitter = Jitter::new(1);
        let empty: [u8; 0] = [];
        assert!(jitter.pick(&empty).is_none());
        let items = [1, 2, 3];
        for _ in 0..100 {
            assert!(items.contains(jitter.pick(&items).expect("non-empty")));
        }
    }
}
