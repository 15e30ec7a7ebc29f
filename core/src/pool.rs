/// Generation-checked index into a [`Pool`]. A handle whose slot has been
/// vacated (and possibly reused) is never reported live again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolIndex {
    index: u32,
    generation: u32,
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, value: T) -> PoolIndex {
        self.len += 1;
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let (generation, next_free) = match slot {
                Slot::Vacant {
                    generation,
                    next_free,
                } => (generation.wrapping_add(1), *next_free),
                Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, value };
            self.free_head = next_free;
            return PoolIndex { index, generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        PoolIndex {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: PoolIndex) -> Option<&T> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied { generation, value } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, id: PoolIndex) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: PoolIndex) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {}
            _ => return None,
        }
        let vacant = Slot::Vacant {
            generation: id.generation,
            next_free: self.free_head,
        };
        let Slot::Occupied { value, .. } = std::mem::replace(slot, vacant) else {
            return None;
        };
        self.free_head = Some(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolIndex, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, value } => Some((
                    PoolIndex {
                        index: index as u32,
                        generation: *generation,
                    },
                    value,
                )),
                Slot::Vacant { .. } => None,
            })
    }

    /// Removes every entry matching `predicate` and hands the values back.
    pub fn drain_where<F>(&mut self, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let doomed: Vec<PoolIndex> = self
            .iter()
            .filter(|(_, value)| predicate(*value))
            .map(|(id, _)| id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slot_invalidates_old_index() {
        let mut pool = Pool::new();
        let first = pool.insert("a");
        assert_eq!(pool.remove(first), Some("a"));
        let second = pool.insert("b");
        assert_eq!(pool.capacity(), 1);
        assert!(!pool.contains(first));
        assert_eq!(pool.get(second), Some(&"b"));
        assert_eq!(pool.remove(first), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn drain_where_keeps_the_rest() {
        let mut pool = Pool::new();
        for value in 0..10 {
            pool.insert(value);
        }
        let mut drained = pool.drain_where(|value| value % 2 == 0);
        drained.sort();
        assert_eq!(drained, vec![0, 2, 4, 6, 8]);
        assert_eq!(pool.len(), 5);
        assert!(pool.iter().all(|(_, value)| value % 2 == 1));
    }
}
