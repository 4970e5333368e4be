use std::fmt::{self, Display, Formatter};
use std::ops::Index;

use crate::requests::Candidate;

/// ordered container of candidate path segments
///
/// items keep the order they were given in and may repeat; the probe loop
/// requests them strictly front to back
///
/// # Examples
///
/// ```
/// # use pathprobe::corpora::Wordlist;
/// let wordlist = Wordlist::new().word("admin").words(["v2", "backup"]);
///
/// assert_eq!(wordlist.len(), 3);
/// assert_eq!(wordlist[1].as_str(), "v2");
/// ```
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Wordlist {
    items: Vec<Candidate>,
}

/// non-consuming iterator over Wordlist
///
/// # Examples
///
/// ```
/// # use pathprobe::corpora::Wordlist;
/// let wordlist = Wordlist::with_words(["1", "2", "3"]);
///
/// let gathered: Vec<_> = (&wordlist).into_iter().map(|c| c.to_string()).collect();
///
/// assert_eq!(gathered, ["1", "2", "3"]);
/// ```
impl<'i> IntoIterator for &'i Wordlist {
    /// the type of the elements being iterated over
    type Item = <&'i [Candidate] as IntoIterator>::Item;

    /// the kind of iterator we're turning `Wordlist` into
    type IntoIter = <&'i [Candidate] as IntoIterator>::IntoIter;

    /// creates an iterator from `Wordlist.items`
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// consuming iterator over Wordlist
impl IntoIterator for Wordlist {
    /// the type of the elements being iterated over
    type Item = <Vec<Candidate> as IntoIterator>::Item;

    /// the kind of iterator we're turning `Wordlist` into
    type IntoIter = <Vec<Candidate> as IntoIterator>::IntoIter;

    /// creates an iterator from `Wordlist.items`
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> FromIterator<T> for Wordlist
where
    Candidate: From<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_words(iter)
    }
}

impl Wordlist {
    /// create an empty `Wordlist`
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// given a collection of items, create a new `Wordlist`
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::corpora::Wordlist;
    /// let wordlist = Wordlist::with_words(["admin", "config"]);
    ///
    /// assert_eq!(wordlist.len(), 2);
    /// ```
    pub fn with_words<I, T>(words: I) -> Self
    where
        Candidate: From<T>,
        I: IntoIterator<Item = T>,
    {
        Self {
            items: words.into_iter().map(Candidate::from).collect(),
        }
    }

    /// append a single item, builder-style
    #[must_use]
    pub fn word<T>(mut self, word: T) -> Self
    where
        Candidate: From<T>,
    {
        self.items.push(Candidate::from(word));
        self
    }

    /// append a collection of items, builder-style
    #[must_use]
    pub fn words<I, T>(mut self, words: I) -> Self
    where
        Candidate: From<T>,
        I: IntoIterator<Item = T>,
    {
        self.items.extend(words.into_iter().map(Candidate::from));
        self
    }

    /// get a reference to the inner collection
    #[must_use]
    #[inline]
    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    /// number of items in the wordlist
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// true if there's nothing to probe
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over the items in the wordlist.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }
}

impl Index<usize> for Wordlist {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl Display for Wordlist {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let top: Vec<&str> = self.items.iter().take(3).map(Candidate::as_str).collect();

        write!(f, "Wordlist::{{len={}, top-3={:?}}}", self.len(), top)
    }
}
