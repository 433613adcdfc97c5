//! Elements: values plus their dependency and distinctness predicates.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A value that can be ordered inside a [`DependencyTree`](crate::domain::DependencyTree).
///
/// Implementors decide what "depends on" means for their value domain. The
/// tree only ever asks two questions: must `self` hang beneath `other`, and
/// does `self` carry the same value as any of a set of siblings.
pub trait Element: fmt::Display {
    type Value: Clone + Eq + Hash + fmt::Debug;

    fn value(&self) -> &Self::Value;

    /// True iff `self` must appear as an ancestor of `other` in the tree.
    fn depends_on(&self, other: &Self) -> bool;

    /// True iff no element in `others` carries a value equal to ours.
    fn is_distinct_from<'a, I>(&self, others: I) -> bool
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        others.into_iter().all(|other| other.value() != self.value())
    }
}

/// Element-construction policy: turns a raw value into an element.
pub type ElementFactory<E> = fn(<E as Element>::Value) -> E;

/// Which way an [`Ordered`] element compares against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Greater values depend on smaller ones.
    #[default]
    Ascending,
    /// Smaller values depend on greater ones.
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => write!(f, "ascending"),
            Direction::Descending => write!(f, "descending"),
        }
    }
}

/// The base element: dependency is plain value ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ordered<T> {
    value: T,
    direction: Direction,
}

impl<T> Ordered<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(value: T) -> Self {
        Self {
            value,
            direction: Direction::Descending,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> From<T> for Ordered<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Display> fmt::Display for Ordered<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Element for Ordered<T>
where
    T: PartialOrd + Clone + Eq + Hash + fmt::Debug + fmt::Display,
{
    type Value = T;

    fn value(&self) -> &T {
        &self.value
    }

    fn depends_on(&self, other: &Self) -> bool {
        match self.direction {
            Direction::Ascending => self.value > other.value,
            Direction::Descending => self.value < other.value,
        }
    }
}

/// Picks the [`Ordered`] factory matching `direction`.
pub fn ordered_factory<T>(direction: Direction) -> ElementFactory<Ordered<T>>
where
    T: PartialOrd + Clone + Eq + Hash + fmt::Debug + fmt::Display,
{
    match direction {
        Direction::Ascending => Ordered::new,
        Direction::Descending => Ordered::descending,
    }
}
