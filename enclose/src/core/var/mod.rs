//! Variable domains
//!
//! A [`Domain`] binds each variable name in an expression to the interval of
//! values it may take, i.e. it describes an axis-aligned box.  Names are kept
//! in sorted order, so iteration (and therefore subdivision) is deterministic.
use crate::types::Interval;
use std::collections::BTreeMap;

/// Map from variable name to [`Interval`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Domain(BTreeMap<String, Interval>);

#[allow(missing_docs)]
impl Domain {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, name: &str) -> Option<Interval> {
        self.0.get(name).copied()
    }
    /// Binds a variable, returning its previous interval (if any)
    pub fn insert<I: Into<Interval>>(
        &mut self,
        name: &str,
        i: I,
    ) -> Option<Interval> {
        self.0.insert(name.to_owned(), i.into())
    }
    /// Iterates over `(name, interval)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Interval)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns a copy of this domain with one variable rebound
    pub fn with(&self, name: &str, i: Interval) -> Self {
        let mut out = self.clone();
        out.insert(name, i);
        out
    }

    /// Returns the variable with the widest interval among `names`
    ///
    /// Ties go to the first name in iteration order.  Names which are not
    /// bound in the domain are ignored.
    pub fn widest<'a, I>(&self, names: I) -> Option<(&'a str, Interval)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(&'a str, Interval)> = None;
        for n in names {
            let Some(i) = self.get(n) else {
                continue;
            };
            if best.is_none_or(|(_, b)| i.width() > b.width()) {
                best = Some((n, i));
            }
        }
        best
    }

    /// Returns the center of the box, in name order
    pub fn center(&self) -> Domain {
        self.iter()
            .map(|(k, v)| (k, Interval::from(v.midpoint())))
            .collect()
    }
}

impl<S: AsRef<str>, I: Into<Interval>> FromIterator<(S, I)> for Domain {
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        Domain(
            iter.into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v.into()))
                .collect(),
        )
    }
}

impl<S: AsRef<str>, I: Into<Interval>, const N: usize> From<[(S, I); N]>
    for Domain
{
    fn from(vs: [(S, I); N]) -> Self {
        vs.into_iter().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn domain_basics() {
        let mut d = Domain::new();
        assert!(d.is_empty());
        assert!(d.insert("x", (0.0, 1.0)).is_none());
        assert_eq!(d.insert("x", [0.0, 2.0]), Some([0.0, 1.0].into()));
        d.insert("y", 3.0);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("x"), Some([0.0, 2.0].into()));
        assert_eq!(d.get("z"), None);

        let names: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn domain_widest() {
        let d = Domain::from([
            ("a", (0.0, 1.0)),
            ("b", (0.0, 2.0)),
            ("c", (0.0, 2.0)),
        ]);
        assert_eq!(d.widest(["a", "b", "c"]).unwrap().0, "b");
        assert_eq!(d.widest(["c", "b"]).unwrap().0, "c");
        assert_eq!(d.widest(["a", "q"]).unwrap().0, "a");
        assert!(d.widest(["q"]).is_none());
    }

    #[test]
    fn domain_with() {
        let d = Domain::from([("x", (0.0, 1.0))]);
        let e = d.with("x", [0.0, 0.5].into());
        assert_eq!(d.get("x"), Some([0.0, 1.0].into()));
        assert_eq!(e.get("x"), Some([0.0, 0.5].into()));
        assert_eq!(d.center().get("x"), Some(0.5.into()));

        let u = d.with("y", Interval::entire());
        assert_eq!(u.center().get("y"), Some(0.0.into()));
    }
}
