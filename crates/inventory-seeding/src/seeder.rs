//! Seeders and dependency-ordered execution

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use inventory_core::{Document, Entity, Sector, Warehouse};
use inventory_store::DocumentStore;

use crate::error::{SeedError, SeedResult};
use crate::fixtures::Fixtures;

/// A unit of seeding work that owns one collection
#[async_trait]
pub trait Seeder: Send + Sync {
    /// Seeder name used for logging and dependency references
    fn name(&self) -> &str;

    /// Collection this seeder writes
    fn collection(&self) -> &str;

    /// Lower numbers run first among seeders that are ready at the same time
    fn priority(&self) -> i32 {
        100
    }

    /// Seeders that must run before this one
    fn dependencies(&self) -> Vec<String> {
        vec![]
    }

    /// Drop the collection; succeeds when it does not exist
    async fn reset(&self, store: &dyn DocumentStore) -> SeedResult<()> {
        store
            .drop_collection(self.collection())
            .await
            .map_err(|source| SeedError::Drop {
                collection: self.collection().to_string(),
                source,
            })
    }

    /// Insert the records, returning how many were written
    async fn run(&self, store: &dyn DocumentStore) -> SeedResult<usize>;
}

/// Seeder for a fixed list of documents
pub struct CollectionSeeder {
    name: String,
    collection: String,
    documents: Vec<Document>,
    priority: i32,
    dependencies: Vec<String>,
}

impl CollectionSeeder {
    pub fn new(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        let collection = collection.into();
        Self {
            name: collection.clone(),
            collection,
            documents,
            priority: 100,
            dependencies: vec![],
        }
    }

    /// Seeder named after the entity's collection
    pub fn from_entities<E: Entity>(entities: &[E]) -> SeedResult<Self> {
        let documents = entities
            .iter()
            .map(|e| e.to_document())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(E::COLLECTION, documents))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl Seeder for CollectionSeeder {
    fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    async fn run(&self, store: &dyn DocumentStore) -> SeedResult<usize> {
        tracing::debug!(
            seeder = %self.name,
            collection = %self.collection,
            documents = self.documents.len(),
            "Inserting documents"
        );

        store
            .insert_many(&self.collection, self.documents.clone())
            .await
            .map_err(|source| SeedError::Insert {
                collection: self.collection.clone(),
                source,
            })
    }
}

/// Runs a set of seeders in dependency order
#[derive(Default)]
pub struct SeederManager {
    seeders: Vec<Box<dyn Seeder>>,
}

impl SeederManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sectors, then warehouses, then log entries
    pub fn from_fixtures(fixtures: &Fixtures) -> SeedResult<Self> {
        let sectors = CollectionSeeder::from_entities(&fixtures.sectors)?.with_priority(10);
        let warehouses = CollectionSeeder::from_entities(&fixtures.warehouses)?
            .with_priority(20)
            .depends_on(vec![Sector::COLLECTION.to_string()]);
        let logdatas = CollectionSeeder::from_entities(&fixtures.logdatas)?
            .with_priority(30)
            .depends_on(vec![Warehouse::COLLECTION.to_string()]);

        Ok(Self::new().add(sectors).add(warehouses).add(logdatas))
    }

    /// Add a seeder to the manager
    pub fn add<S: Seeder + 'static>(mut self, seeder: S) -> Self {
        self.seeders.push(Box::new(seeder));
        self
    }

    pub fn len(&self) -> usize {
        self.seeders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty()
    }

    /// Topological order over declared dependencies (Kahn's algorithm).
    /// Among seeders that are ready together, lower priority goes first,
    /// then registration order.
    pub fn resolve_order(&self) -> SeedResult<Vec<&dyn Seeder>> {
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (index, seeder) in self.seeders.iter().enumerate() {
            if by_name.insert(seeder.name(), index).is_some() {
                return Err(SeedError::Dependency(format!(
                    "Seeder '{}' is registered more than once",
                    seeder.name()
                )));
            }
        }

        let mut in_degree = vec![0usize; self.seeders.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.seeders.len()];
        for (index, seeder) in self.seeders.iter().enumerate() {
            for dep in seeder.dependencies() {
                let Some(&dep_index) = by_name.get(dep.as_str()) else {
                    return Err(SeedError::Dependency(format!(
                        "Seeder '{}' depends on '{}', but '{}' was not found",
                        seeder.name(),
                        dep,
                        dep
                    )));
                };
                in_degree[index] += 1;
                dependents[dep_index].push(index);
            }
        }

        let mut ready: BTreeSet<(i32, usize)> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| (self.seeders[index].priority(), index))
            .collect();

        let mut order = Vec::with_capacity(self.seeders.len());
        while let Some((_, index)) = ready.pop_first() {
            order.push(index);
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert((self.seeders[dependent].priority(), dependent));
                }
            }
        }

        if order.len() != self.seeders.len() {
            let stuck: Vec<&str> = self
                .seeders
                .iter()
                .enumerate()
                .filter(|(index, _)| !order.contains(index))
                .map(|(_, seeder)| seeder.name())
                .collect();

            return Err(SeedError::Dependency(format!(
                "Circular dependency detected in seeders: {}",
                stuck.join(", ")
            )));
        }

        Ok(order.into_iter().map(|i| self.seeders[i].as_ref()).collect())
    }

    /// Drop every seeder's collection, dependents first
    pub async fn reset_all(&self, store: &dyn DocumentStore) -> SeedResult<()> {
        for seeder in self.resolve_order()?.into_iter().rev() {
            seeder.reset(store).await?;
            tracing::info!(collection = %seeder.collection(), "Dropped collection");
        }
        Ok(())
    }

    /// Run every seeder, dependencies first
    pub async fn run_all(&self, store: &dyn DocumentStore) -> SeedResult<Vec<(String, usize)>> {
        let ordered = self.resolve_order()?;
        tracing::info!("Running {} seeders", ordered.len());

        let mut inserted = Vec::with_capacity(ordered.len());
        for seeder in ordered {
            let count = seeder.run(store).await?;
            tracing::info!(seeder = %seeder.name(), collection = %seeder.collection(), count, "Seeder completed");
            inserted.push((seeder.collection().to_string(), count));
        }
        Ok(inserted)
    }

    /// Collections owned by the registered seeders, in run order
    pub fn collections(&self) -> SeedResult<Vec<String>> {
        Ok(self
            .resolve_order()?
            .into_iter()
            .map(|s| s.collection().to_string())
            .collect())
    }
}
