//! In-memory record stores.
//!
//! Every store is a `DashMap` keyed by record id. Reads hand out clones;
//! writes go through [`InMemoryRepository::update`], which runs the mutation
//! on a copy while holding the entry lock and only writes it back on success.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::models::{InventoryRecord, Location, Product, PurchaseOrder, Supplier};

/// A record that can live in an [`InMemoryRepository`].
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        })+
    };
}

impl_record!(InventoryRecord, Location, Product, PurchaseOrder, Supplier);

#[derive(Debug)]
pub struct InMemoryRepository<T: Record> {
    records: DashMap<Uuid, T>,
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: T) -> T {
        self.records.insert(record.id(), record.clone());
        record
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.records.contains_key(&id)
    }

    pub fn list(&self) -> Vec<T> {
        self.records.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .count()
    }

    /// Mutates one record under its entry lock.
    ///
    /// Returns `None` when the id is unknown. The closure works on a copy; if
    /// it returns `Err` the stored record is left exactly as it was.
    pub fn update<R, E, F>(&self, id: Uuid, mutate: F) -> Option<Result<(T, R), E>>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let mut entry = self.records.get_mut(&id)?;
        let mut draft = entry.value().clone();
        Some(mutate(&mut draft).map(|result| {
            *entry.value_mut() = draft.clone();
            (draft, result)
        }))
    }
}

/// Purchase orders plus the sequence that numbers them.
#[derive(Debug, Default)]
pub struct PurchaseOrderRepository {
    orders: InMemoryRepository<PurchaseOrder>,
    sequence: AtomicU64,
}

impl PurchaseOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next human-readable order number: `PO-001`, `PO-002`, ...
    pub fn next_po_number(&self) -> String {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("PO-{:03}", next)
    }

    pub fn orders(&self) -> &InMemoryRepository<PurchaseOrder> {
        &self.orders
    }

    pub fn find_by_supplier(&self, supplier_id: Uuid) -> Vec<PurchaseOrder> {
        newest_first(self.orders.filter(|order| order.supplier_id == Some(supplier_id)))
    }

    pub fn find_by_product(&self, product_id: Uuid) -> Vec<PurchaseOrder> {
        newest_first(self.orders.filter(|order| order.contains_product(product_id)))
    }
}

/// Orders by created date descending, then by PO number descending so orders
/// created on the same day keep a stable order.
pub fn newest_first(mut orders: Vec<PurchaseOrder>) -> Vec<PurchaseOrder> {
    orders.sort_by(|a, b| {
        b.created_date
            .cmp(&a.created_date)
            .then_with(|| po_sequence(&b.po_number).cmp(&po_sequence(&a.po_number)))
    });
    orders
}

fn po_sequence(po_number: &str) -> u64 {
    po_number
        .trim_start_matches("PO-")
        .parse()
        .unwrap_or_default()
}

/// Inventory records, unique per product/location pair.
#[derive(Debug, Default)]
pub struct InventoryRepository {
    records: InMemoryRepository<InventoryRecord>,
    slots: DashMap<(Uuid, Uuid), Uuid>,
}

impl InventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &InMemoryRepository<InventoryRecord> {
        &self.records
    }

    /// Inserts the record unless its product/location slot is taken, in which
    /// case the id of the existing record is returned as the error.
    pub fn insert_unique(&self, record: InventoryRecord) -> Result<InventoryRecord, Uuid> {
        match self.slots.entry((record.product_id, record.location_id)) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(record.id);
                Ok(self.records.insert(record))
            }
        }
    }

    pub fn find_by_product(&self, product_id: Uuid) -> Vec<InventoryRecord> {
        self.records.filter(|record| record.product_id == product_id)
    }
}

/// Every store the service layer works against.
#[derive(Debug, Default)]
pub struct Stores {
    pub products: InMemoryRepository<Product>,
    pub suppliers: InMemoryRepository<Supplier>,
    pub locations: InMemoryRepository<Location>,
    pub inventory: InventoryRepository,
    pub purchase_orders: PurchaseOrderRepository,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }
}
