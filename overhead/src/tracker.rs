//! Keep track of which aircraft we already told the user about.
//!
//! The tracker holds the ids of every aircraft that was in range during the last cycle.  Each
//! cycle gives it the ids in range *now* and it answers with those that just appeared and those
//! that just went away.  Anything leaving is forgotten so coming back later is news again.
//!

use std::collections::HashSet;

use tracing::trace;

/// What changed between two cycles
///
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Update {
    /// Ids never seen before, in the order they were given
    pub new: Vec<String>,
    /// Ids gone since last cycle, sorted
    pub left: Vec<String>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.left.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SightingTracker {
    seen: HashSet<String>,
}

impl SightingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the ids in range for this cycle.  Ids are case-insensitive.
    ///
    pub fn update<I, S>(&mut self, current: I) -> Update
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        trace!("tracker::update");

        let mut ids = vec![];
        let mut here = HashSet::new();
        for id in current {
            let id = id.as_ref().to_lowercase();
            if here.insert(id.clone()) {
                ids.push(id);
            }
        }

        let new: Vec<String> = ids
            .into_iter()
            .filter(|id| !self.seen.contains(id))
            .collect();
        let mut left: Vec<String> = self.seen.difference(&here).cloned().collect();
        left.sort();

        self.seen = here;
        Update { new, left }
    }

    /// Forget everything
    ///
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(&id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_first_cycle_everything_new() {
        let mut t = SightingTracker::new();
        let u = t.update(["a1b2c3", "c0ffee"]);

        assert_eq!(vec!["a1b2c3", "c0ffee"], u.new);
        assert!(u.left.is_empty());
        assert_eq!(2, t.len());
    }

    #[test]
    fn test_same_cycle_twice() {
        let mut t = SightingTracker::new();
        t.update(["a1b2c3"]);
        let u = t.update(["a1b2c3"]);

        assert!(u.is_empty());
        assert!(t.contains("A1B2C3"));
    }

    #[test]
    fn test_duplicates_and_case() {
        let mut t = SightingTracker::new();
        let u = t.update(["ABCDEF", "abcdef", "123456", "AbCdEf"]);

        assert_eq!(vec!["abcdef", "123456"], u.new);
        assert_eq!(2, t.len());
    }

    #[test]
    fn test_reappearance_is_new() {
        let mut t = SightingTracker::new();
        assert_eq!(vec!["aaaaaa"], t.update(["aaaaaa"]).new);

        let u = t.update(Vec::<String>::new());
        assert_eq!(vec!["aaaaaa"], u.left);
        assert!(t.is_empty());

        assert_eq!(vec!["aaaaaa"], t.update(["aaaaaa"]).new);
    }

    #[test]
    fn test_reset() {
        let mut t = SightingTracker::new();
        t.update(["aaaaaa", "bbbbbb"]);
        t.reset();

        assert!(t.is_empty());
        assert_eq!(2, t.update(["aaaaaa", "bbbbbb"]).new.len());
    }

    // new ids at cycle k are exactly S(k) - S(k-1)
    //
    #[rstest]
    #[case(&[&["a", "b"][..], &["b", "c"], &["c"], &["a", "c"]], &[&["a", "b"][..], &["c"], &[], &["a"]])]
    #[case(&[&[][..], &["a"], &[], &["a"]], &[&[][..], &["a"], &[], &["a"]])]
    #[case(&[&["a", "b", "c"][..], &["c", "b", "a"]], &[&["a", "b", "c"][..], &[]])]
    fn test_new_is_difference(#[case] cycles: &[&[&str]], #[case] expected: &[&[&str]]) {
        let mut t = SightingTracker::new();

        for (ids, want) in cycles.iter().zip(expected.iter()) {
            let u = t.update(ids.iter());
            assert_eq!(want.to_vec(), u.new);
        }
    }
}
