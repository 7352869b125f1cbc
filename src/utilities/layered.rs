/// A value observed from the store together with a local provisional
/// overlay. The overlay wins until the next authoritative push replaces
/// both.
#[derive(Clone, Debug, Default)]
pub struct Layered<T: Clone> {
    authoritative: T,
    provisional: Option<T>,
}

impl<T: Clone> Layered<T> {
    pub fn new(authoritative: T) -> Self {
        Self {
            authoritative,
            provisional: None,
        }
    }

    pub fn current(&self) -> &T {
        self.provisional.as_ref().unwrap_or(&self.authoritative)
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional.is_some()
    }

    /// Apply a local change on top of the current view and return it.
    pub fn update_provisional<F>(&mut self, f: F) -> &T
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.current().clone();
        f(&mut next);
        self.provisional.insert(next)
    }

    pub fn apply_authoritative(&mut self, value: T) {
        self.authoritative = value;
        self.provisional = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_overlay_wins_until_next_push() {
        let mut liked = Layered::new(vec!["a".to_string()]);

        liked.update_provisional(|ids| ids.push("b".to_string()));
        assert!(liked.is_provisional());
        assert_eq!(liked.current(), &vec!["a".to_string(), "b".to_string()]);

        // The store never saw "b"; its push is the truth.
        liked.apply_authoritative(vec!["a".to_string()]);
        assert!(!liked.is_provisional());
        assert_eq!(liked.current(), &vec!["a".to_string()]);
    }

    #[test]
    fn provisional_updates_stack() {
        let mut counter = Layered::new(0);
        counter.update_provisional(|n| *n += 1);
        counter.update_provisional(|n| *n += 1);
        assert_eq!(*counter.current(), 2);
    }
}
