//! Graph Traversal
//!
//! Two lazy iterators over the person graph:
//!
//! - [`Descendants`]: every person reachable through child edges, excluding
//!   the start. Depth-first (LIFO frontier), each person yielded once.
//! - [`Walk`]: neighborhood of the start over the undirected parent/child
//!   graph, including the start, optionally bounded by a radius and filtered by
//!   a predicate. Breadth-first, so tracked distances are shortest-path
//!   distances.
//!
//! Both iterators expand a person only when the caller asks for the next item,
//! so no store query is made before the first `next()`. Both mark persons on
//! discovery, which bounds them on convergent lineages and on malformed data
//! containing cycles. A store failure is yielded once as `Err` and the
//! iterator is fused afterwards.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::person::Person;
use crate::types::PersonId;

// ============================================================================
// Descendants
// ============================================================================

/// Lazy iterator over all descendants of a person
pub struct Descendants {
    start: PersonId,
    visited: HashSet<PersonId>,
    stack: Vec<Arc<Person>>,
    pending: Option<Arc<Person>>,
    finished: bool,
}

impl Descendants {
    pub fn new(start: Arc<Person>) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start.id());
        Self {
            start: start.id(),
            visited,
            stack: Vec::new(),
            pending: Some(start),
            finished: false,
        }
    }

    /// Number of persons discovered so far, the start included
    pub fn discovered(&self) -> usize {
        self.visited.len()
    }

    fn expand(&mut self, person: &Person) -> Result<()> {
        for child in person.children()? {
            if self.visited.insert(child.id()) {
                self.stack.push(child);
            }
        }
        Ok(())
    }
}

impl Iterator for Descendants {
    type Item = Result<Arc<Person>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(person) = self.pending.take() {
            if let Err(e) = self.expand(&person) {
                self.finished = true;
                return Some(Err(e));
            }
        }

        match self.stack.pop() {
            Some(next) => {
                self.pending = Some(Arc::clone(&next));
                Some(Ok(next))
            }
            None => {
                self.finished = true;
                debug!(
                    start = self.start,
                    count = self.visited.len() - 1,
                    "descendant traversal complete"
                );
                None
            }
        }
    }
}

// ============================================================================
// Walk
// ============================================================================

type Visitable<'a> = Box<dyn FnMut(&Person) -> bool + 'a>;

/// Lazy breadth-first walk over the neighborhood of a person
///
/// ```ignore
/// let nearby: Vec<_> = Walk::new(person)
///     .radius(2)
///     .visitable(|p| p.gender().ok().flatten() == Some(Gender::Female))
///     .collect::<Result<_>>()?;
/// ```
pub struct Walk<'a> {
    start: PersonId,
    frontier: VecDeque<Arc<Person>>,
    distances: HashMap<PersonId, u32>,
    pending: Option<Arc<Person>>,
    visitable: Option<Visitable<'a>>,
    radius: Option<u32>,
    yielded: usize,
    finished: bool,
}

impl<'a> Walk<'a> {
    /// Walk the unbounded neighborhood of `start`, start included
    pub fn new(start: Arc<Person>) -> Self {
        let mut distances = HashMap::new();
        distances.insert(start.id(), 0);
        Self {
            start: start.id(),
            frontier: VecDeque::from([start]),
            distances,
            pending: None,
            visitable: None,
            radius: None,
            yielded: 0,
            finished: false,
        }
    }

    /// Only yield (and expand) persons accepted by `predicate`.
    ///
    /// The predicate is evaluated once per discovered person, the start included.
    pub fn visitable(mut self, predicate: impl FnMut(&Person) -> bool + 'a) -> Self {
        self.visitable = Some(Box::new(predicate));
        self
    }

    /// Only yield persons at most `radius` edges away from the start
    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Shortest distance from the start, for any person discovered so far
    pub fn distance(&self, id: PersonId) -> Option<u32> {
        self.distances.get(&id).copied()
    }

    fn expand(&mut self, person: &Person) -> Result<()> {
        let next_distance = self.distances.get(&person.id()).copied().unwrap_or(0) + 1;
        let children = person.children()?;
        let parents = person.parents()?;

        for neighbor in children.into_iter().chain(parents) {
            if !self.distances.contains_key(&neighbor.id()) {
                self.distances.insert(neighbor.id(), next_distance);
                self.frontier.push_back(neighbor);
            }
        }
        Ok(())
    }

    fn within_radius(&self, distance: u32) -> bool {
        self.radius.map_or(true, |radius| distance < radius)
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<Arc<Person>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(person) = self.pending.take() {
            if let Err(e) = self.expand(&person) {
                self.finished = true;
                return Some(Err(e));
            }
        }

        while let Some(candidate) = self.frontier.pop_front() {
            let accepted = match self.visitable.as_mut() {
                Some(predicate) => predicate(&candidate),
                None => true,
            };
            if !accepted {
                continue;
            }

            // Neighbors of a person on the boundary would fall outside the radius
            let distance = self.distance(candidate.id()).unwrap_or(0);
            if self.within_radius(distance) {
                self.pending = Some(Arc::clone(&candidate));
            }
            self.yielded += 1;
            return Some(Ok(candidate));
        }

        self.finished = true;
        debug!(
            start = self.start,
            visited = self.yielded,
            discovered = self.distances.len(),
            "walk complete"
        );
        None
    }
}
