//! Fixed-capacity slot pool
//!
//! All slots are allocated up front. A slot is either empty or holds a fully
//! built value; there is no half-initialised state. Spawning into a full pool
//! drops the request and returns `None`.

/// Index of an occupied slot, valid until that slot is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Pool<T> {
    slots: Vec<Option<T>>,
    active: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, active: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.active >= self.slots.len()
    }

    /// Place `value` in the first free slot
    pub fn spawn(&mut self, value: T) -> Option<SlotId> {
        if self.is_full() {
            return None;
        }
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(value);
        self.active += 1;
        Some(SlotId(index))
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Visit every occupied slot; slots for which `keep` returns false are
    /// released. Each slot is released at most once per call.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for slot in &mut self.slots {
            if let Some(value) = slot {
                if !keep(value) {
                    *slot = None;
                    self.active -= 1;
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Recount occupied slots from scratch
    #[cfg(test)]
    pub fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_fills_first_free_slot() {
        let mut pool = Pool::with_capacity(3);
        let a = pool.spawn('a').unwrap();
        let b = pool.spawn('b').unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);

        pool.retain_mut(|c| *c != 'a');
        let c = pool.spawn('c').unwrap();
        assert_eq!(c.index(), 0);
        assert_eq!(pool.get(c), Some(&'c'));
    }

    #[test]
    fn full_pool_drops_silently() {
        let mut pool = Pool::with_capacity(2);
        assert!(pool.spawn(1).is_some());
        assert!(pool.spawn(2).is_some());
        assert!(pool.is_full());
        assert!(pool.spawn(3).is_none());
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn active_count_tracks_occupied_slots() {
        let mut pool = Pool::with_capacity(16);
        for round in 0..10 {
            for i in 0..7 {
                pool.spawn(round * 10 + i);
            }
            pool.retain_mut(|v| *v % 3 != 0);
            assert!(pool.active_count() <= pool.capacity());
            assert_eq!(pool.active_count(), pool.occupied_slots());
        }
        pool.retain_mut(|_| false);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.occupied_slots(), 0);
    }

    #[test]
    fn retain_visits_each_value_once() {
        let mut pool = Pool::with_capacity(4);
        for i in 0..4 {
            pool.spawn(i);
        }
        let mut visits = 0;
        pool.retain_mut(|_| {
            visits += 1;
            false
        });
        assert_eq!(visits, 4);
        assert_eq!(pool.active_count(), 0);
    }
}
