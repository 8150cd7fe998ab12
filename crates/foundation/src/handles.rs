/// Generational handle: a slot index plus the generation the slot had when
/// the handle was issued. A handle whose generation no longer matches its
/// slot is stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32); // (index, generation)

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn handles_compare_by_index_and_generation() {
        let a = Handle::new(3, 0);
        let b = Handle::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert!(a < b);
    }
}
