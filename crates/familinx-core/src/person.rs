//! Person Entity
//!
//! A [`Person`] is an id plus one [`LazyField`] per stored fact. Fields are
//! resolved through the owning [`Registry`]'s data store on first read and
//! cached until invalidated. Construction never touches the store.
//!
//! Edges are cached as id lists; [`Person::parents`] and [`Person::children`]
//! resolve those ids through the registry on every call, so a person never
//! holds a strong reference to another person.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use tracing::trace;

use crate::error::{GraphError, Result};
use crate::lazy::LazyField;
use crate::registry::{Registry, RegistryInner};
use crate::store::{DataStore, StoreError};
use crate::traversal::{Descendants, Walk};
use crate::types::{
    Field, FounderStats, Gender, Location, PersonId, PersonStats, Years,
};

/// One individual of the population graph
pub struct Person {
    id: PersonId,
    registry: Weak<RegistryInner>,
    age: LazyField<Option<i32>>,
    years: LazyField<Years>,
    gender: LazyField<Option<Gender>>,
    location: LazyField<Option<Location>>,
    parents: LazyField<Vec<PersonId>>,
    children: LazyField<Vec<PersonId>>,
    founder_stats: LazyField<Option<FounderStats>>,
}

impl Person {
    pub(crate) fn new(id: PersonId, registry: Weak<RegistryInner>) -> Self {
        Self {
            id,
            registry,
            age: LazyField::new(),
            years: LazyField::new(),
            gender: LazyField::new(),
            location: LazyField::new(),
            parents: LazyField::new(),
            children: LazyField::new(),
            founder_stats: LazyField::new(),
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    /// The registry this person belongs to
    pub fn registry(&self) -> Result<Registry> {
        self.registry
            .upgrade()
            .map(Registry::from_inner)
            .ok_or(GraphError::RegistryDropped { id: self.id })
    }

    fn resolve<T, F>(&self, field: Field, slot: &LazyField<T>, query: F) -> Result<T>
    where
        T: Clone,
        F: FnOnce(&dyn DataStore, PersonId) -> std::result::Result<T, StoreError>,
    {
        slot.get_or_try_init(|| {
            let registry = self.registry()?;
            trace!(person = self.id, field = field.as_str(), "resolving field");
            query(&**registry.store(), self.id)
                .map_err(|e| GraphError::store(self.id, field, e))
        })
    }

    // ========================================================================
    // Stored fields
    // ========================================================================

    pub fn age(&self) -> Result<Option<i32>> {
        self.resolve(Field::Age, &self.age, |store, id| store.age(id))
    }

    pub fn years(&self) -> Result<Years> {
        self.resolve(Field::Years, &self.years, |store, id| store.years(id))
    }

    pub fn birth_year(&self) -> Result<Option<i32>> {
        Ok(self.years()?.birth)
    }

    pub fn death_year(&self) -> Result<Option<i32>> {
        Ok(self.years()?.death)
    }

    /// Gender mapped from the stored code.
    ///
    /// An unknown code is an error and is not cached.
    pub fn gender(&self) -> Result<Option<Gender>> {
        self.gender.get_or_try_init(|| {
            let registry = self.registry()?;
            trace!(person = self.id, field = Field::Gender.as_str(), "resolving field");
            let code = registry
                .store()
                .gender_code(self.id)
                .map_err(|e| GraphError::store(self.id, Field::Gender, e))?;
            code.map(|code| Gender::from_code(self.id, code)).transpose()
        })
    }

    pub fn location(&self) -> Result<Option<Location>> {
        self.resolve(Field::Location, &self.location, |store, id| store.location(id))
    }

    pub fn founder_stats(&self) -> Result<Option<FounderStats>> {
        self.resolve(Field::FounderStats, &self.founder_stats, |store, id| {
            store.founder_stats(id)
        })
    }

    /// Ids of the immediate ancestors, in store order
    pub fn parent_ids(&self) -> Result<Vec<PersonId>> {
        self.resolve(Field::Parents, &self.parents, |store, id| store.parent_ids(id))
    }

    /// Ids of the immediate descendants, in store order
    pub fn child_ids(&self) -> Result<Vec<PersonId>> {
        self.resolve(Field::Children, &self.children, |store, id| store.child_ids(id))
    }

    // ========================================================================
    // Edges and derived views
    // ========================================================================

    pub fn parents(&self) -> Result<Vec<Arc<Person>>> {
        let ids = self.parent_ids()?;
        self.lookup(&ids)
    }

    pub fn children(&self) -> Result<Vec<Arc<Person>>> {
        let ids = self.child_ids()?;
        self.lookup(&ids)
    }

    fn lookup(&self, ids: &[PersonId]) -> Result<Vec<Arc<Person>>> {
        let registry = self.registry()?;
        Ok(ids.iter().map(|&id| registry.get_or_create(id)).collect())
    }

    /// First parent whose gender is female
    pub fn mother(&self) -> Result<Option<Arc<Person>>> {
        self.parent_with_gender(Gender::Female)
    }

    /// First parent whose gender is male
    pub fn father(&self) -> Result<Option<Arc<Person>>> {
        self.parent_with_gender(Gender::Male)
    }

    fn parent_with_gender(&self, gender: Gender) -> Result<Option<Arc<Person>>> {
        for parent in self.parents()? {
            if parent.gender()? == Some(gender) {
                return Ok(Some(parent));
            }
        }
        Ok(None)
    }

    /// Distinct co-parents of this person's children, in first-seen order
    pub fn partners(&self) -> Result<Vec<Arc<Person>>> {
        let mut seen = HashSet::new();
        let mut partner_ids = Vec::new();
        for child in self.children()? {
            for id in child.parent_ids()? {
                if id != self.id && seen.insert(id) {
                    partner_ids.push(id);
                }
            }
        }
        self.lookup(&partner_ids)
    }

    /// True if the person has no recorded parents
    pub fn is_founder(&self) -> Result<bool> {
        Ok(self.parent_ids()?.is_empty())
    }

    /// True if the person has no recorded children
    pub fn is_leaf(&self) -> Result<bool> {
        Ok(self.child_ids()?.is_empty())
    }

    /// Snapshot of the commonly used fields, resolving each of them
    pub fn stats(&self) -> Result<PersonStats> {
        let years = self.years()?;
        let location = self.location()?;
        Ok(PersonStats {
            id: self.id,
            parents: self.parent_ids()?,
            children: self.child_ids()?,
            age: self.age()?,
            birth: years.birth,
            death: years.death,
            gender: self.gender()?,
            lon: location.as_ref().map(|l| l.longitude),
            lat: location.as_ref().map(|l| l.latitude),
            country: location.as_ref().and_then(|l| l.country.clone()),
            continent: location.as_ref().and_then(|l| l.continent),
            resolution: location.as_ref().and_then(|l| l.resolution),
        })
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Every person reachable through child edges, excluding this one
    pub fn descendants(self: &Arc<Self>) -> Descendants {
        Descendants::new(Arc::clone(self))
    }

    /// Neighborhood walk over parent and child edges, starting here
    pub fn walk<'a>(self: &Arc<Self>) -> Walk<'a> {
        Walk::new(Arc::clone(self))
    }

    // ========================================================================
    // Cache control
    // ========================================================================

    /// Drop one cached field; returns true if it was cached
    pub fn invalidate(&self, field: Field) -> bool {
        match field {
            Field::Age => self.age.invalidate(),
            Field::Years => self.years.invalidate(),
            Field::Gender => self.gender.invalidate(),
            Field::Location => self.location.invalidate(),
            Field::Parents => self.parents.invalidate(),
            Field::Children => self.children.invalidate(),
            Field::FounderStats => self.founder_stats.invalidate(),
        }
    }

    /// Drop every cached field
    pub fn clear_cache(&self) {
        for field in Field::ALL {
            self.invalidate(field);
        }
    }

    pub fn is_cached(&self, field: Field) -> bool {
        match field {
            Field::Age => self.age.is_cached(),
            Field::Years => self.years.is_cached(),
            Field::Gender => self.gender.is_cached(),
            Field::Location => self.location.is_cached(),
            Field::Parents => self.parents.is_cached(),
            Field::Children => self.children.is_cached(),
            Field::FounderStats => self.founder_stats.is_cached(),
        }
    }

    // Bulk-loading setters. Each one short-circuits the store query for its field.

    pub fn set_age(&self, age: Option<i32>) {
        self.age.set(age);
    }

    pub fn set_years(&self, years: Years) {
        self.years.set(years);
    }

    pub fn set_gender(&self, gender: Option<Gender>) {
        self.gender.set(gender);
    }

    pub fn set_location(&self, location: Option<Location>) {
        self.location.set(location);
    }

    pub fn set_parent_ids(&self, ids: Vec<PersonId>) {
        self.parents.set(ids);
    }

    pub fn set_child_ids(&self, ids: Vec<PersonId>) {
        self.children.set(ids);
    }

    pub fn set_founder_stats(&self, stats: Option<FounderStats>) {
        self.founder_stats.set(stats);
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Person {}

impl Hash for Person {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person(id={})", self.id)
    }
}

impl fmt::Debug for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::SwitchableStore;
    use crate::store::{MeteredStore, SqliteStore};
    use crate::types::Continent;
    use pretty_assertions::assert_eq;

    fn fixture() -> (Registry, Arc<MeteredStore<SqliteStore>>) {
        let sqlite = SqliteStore::in_memory().unwrap();
        // 1 (male) + 2 (female) -> 3, 4
        sqlite.insert_gender_code(1, 1).unwrap();
        sqlite.insert_gender_code(2, 2).unwrap();
        sqlite.insert_age(3, Some(41)).unwrap();
        sqlite
            .insert_years(3, Years::new(Some(1801), Some(1842)))
            .unwrap();
        sqlite
            .insert_location(
                3,
                &Location {
                    longitude: 4.35,
                    latitude: 50.85,
                    country: Some("Belgium".to_string()),
                    continent: Some(Continent::Europe),
                    resolution: Some(2),
                },
            )
            .unwrap();
        sqlite
            .insert_relationships(&[(1, 3), (2, 3), (1, 4), (2, 4)])
            .unwrap();

        let store = Arc::new(MeteredStore::new(sqlite));
        let registry = Registry::new(Arc::clone(&store));
        (registry, store)
    }

    #[test]
    fn test_construction_is_lazy() {
        let (registry, store) = fixture();

        let person = registry.get_or_create(3);
        for field in Field::ALL {
            assert!(!person.is_cached(field));
        }
        assert_eq!(store.metrics().total(), 0);
    }

    #[test]
    fn test_field_resolves_once() {
        let (registry, store) = fixture();
        let person = registry.get_or_create(3);

        assert_eq!(person.age().unwrap(), Some(41));
        assert_eq!(person.age().unwrap(), Some(41));
        assert_eq!(store.metrics().age, 1);

        // Same instance via another lookup shares the cache
        assert_eq!(registry.get_or_create(3).age().unwrap(), Some(41));
        assert_eq!(store.metrics().age, 1);
    }

    #[test]
    fn test_invalidate_only_touches_one_field() {
        let (registry, store) = fixture();
        let person = registry.get_or_create(3);

        person.age().unwrap();
        person.years().unwrap();

        assert!(person.invalidate(Field::Age));
        assert!(!person.invalidate(Field::Age));
        assert!(person.is_cached(Field::Years));

        person.age().unwrap();
        person.years().unwrap();
        let metrics = store.metrics();
        assert_eq!(metrics.age, 2);
        assert_eq!(metrics.years, 1);

        person.clear_cache();
        assert!(!person.is_cached(Field::Years));
    }

    #[test]
    fn test_absent_facts() {
        let (registry, _store) = fixture();
        let person = registry.get_or_create(99);

        assert_eq!(person.age().unwrap(), None);
        assert_eq!(person.years().unwrap(), Years::UNKNOWN);
        assert_eq!(person.gender().unwrap(), None);
        assert_eq!(person.location().unwrap(), None);
        assert_eq!(person.founder_stats().unwrap(), None);
        assert!(person.parents().unwrap().is_empty());
        assert!(person.is_founder().unwrap());
        assert!(person.is_leaf().unwrap());
    }

    #[test]
    fn test_unknown_gender_code_not_cached() {
        let sqlite = SqliteStore::in_memory().unwrap();
        sqlite.insert_gender_code(5, 7).unwrap();
        let registry = Registry::new(sqlite);

        let person = registry.get_or_create(5);
        assert!(matches!(
            person.gender(),
            Err(GraphError::UnknownGenderCode { id: 5, code: 7 })
        ));
        assert!(!person.is_cached(Field::Gender));
    }

    #[test]
    fn test_store_failure_propagates_and_is_not_cached() {
        let sqlite = SqliteStore::in_memory().unwrap();
        sqlite.insert_age(3, Some(41)).unwrap();
        sqlite.insert_relationships(&[(3, 6)]).unwrap();
        let switch = Arc::new(SwitchableStore::new(sqlite));
        let store = Arc::new(MeteredStore::new(Arc::clone(&switch)));
        let registry = Registry::new(Arc::clone(&store));
        let person = registry.get_or_create(3);

        switch.set_offline(true);
        assert!(matches!(
            person.age(),
            Err(GraphError::Store {
                id: 3,
                field: Field::Age,
                source: StoreError::Io(_),
            })
        ));
        assert!(matches!(
            person.children(),
            Err(GraphError::Store {
                id: 3,
                field: Field::Children,
                ..
            })
        ));
        assert!(!person.is_cached(Field::Age));
        assert!(!person.is_cached(Field::Children));

        // The next read goes back to the store
        switch.set_offline(false);
        assert_eq!(person.age().unwrap(), Some(41));
        assert_eq!(person.child_ids().unwrap(), vec![6]);

        let metrics = store.metrics();
        assert_eq!(metrics.age, 2);
        assert_eq!(metrics.children, 2);
        assert_eq!(metrics.failures, 2);
    }

    #[test]
    fn test_mother_and_father() {
        let (registry, _store) = fixture();
        let child = registry.get_or_create(3);

        assert_eq!(child.father().unwrap().map(|p| p.id()), Some(1));
        assert_eq!(child.mother().unwrap().map(|p| p.id()), Some(2));

        // Parents without a recorded gender match neither
        let parent = registry.get_or_create(1);
        assert_eq!(parent.mother().unwrap(), None);
    }

    #[test]
    fn test_parents_resolve_through_registry() {
        let (registry, _store) = fixture();
        let child = registry.get_or_create(4);

        let parents = child.parents().unwrap();
        assert_eq!(parents.iter().map(|p| p.id()).collect::<Vec<_>>(), vec![1, 2]);
        assert!(Arc::ptr_eq(&parents[0], &registry.get_or_create(1)));
    }

    #[test]
    fn test_partners() {
        let (registry, _store) = fixture();

        let father = registry.get_or_create(1);
        let partners = father.partners().unwrap();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].id(), 2);
        assert!(!partners.contains(&father));
    }

    #[test]
    fn test_stats() {
        let (registry, _store) = fixture();

        let stats = registry.get_or_create(3).stats().unwrap();
        assert_eq!(
            stats,
            PersonStats {
                id: 3,
                parents: vec![1, 2],
                children: vec![],
                age: Some(41),
                birth: Some(1801),
                death: Some(1842),
                gender: None,
                lon: Some(4.35),
                lat: Some(50.85),
                country: Some("Belgium".to_string()),
                continent: Some(Continent::Europe),
                resolution: Some(2),
            }
        );

        let stats = registry.get_or_create(1).stats().unwrap();
        assert_eq!(stats.gender, Some(Gender::Male));
        assert_eq!(stats.lon, None);
        assert_eq!(stats.country, None);
    }

    #[test]
    fn test_setters_short_circuit_store() {
        let (registry, store) = fixture();
        let person = registry.get_or_create(50);

        person.set_age(Some(12));
        person.set_child_ids(vec![3]);
        assert_eq!(person.age().unwrap(), Some(12));
        assert_eq!(person.child_ids().unwrap(), vec![3]);
        assert_eq!(store.metrics().total(), 0);
    }

    #[test]
    fn test_registry_dropped() {
        let (registry, _store) = fixture();
        let person = registry.get_or_create(3);
        person.age().unwrap();
        drop(registry);

        // Cached fields stay readable, everything else fails
        assert_eq!(person.age().unwrap(), Some(41));
        assert!(matches!(
            person.years(),
            Err(GraphError::RegistryDropped { id: 3 })
        ));
    }

    #[test]
    fn test_identity_by_id() {
        let (registry, _store) = fixture();
        let a = registry.get_or_create(3);
        registry.evict(3);
        let b = registry.get_or_create(3);

        assert_eq!(a, b);
        let set: HashSet<Arc<Person>> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(registry.get_or_create(3).to_string(), "Person(id=3)");
        assert_eq!(format!("{:?}", registry.get_or_create(3)), "Person(id=3)");
    }
}
