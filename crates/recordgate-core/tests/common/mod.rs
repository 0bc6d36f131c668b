//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use recordgate_core::catalog::{RecordTypeDef, TypeCatalog};
use recordgate_core::proto::{
    Action, CollectedTerms, Constraint, DataAtomic, DataGroup, DataRecordLink, PermissionSet,
    PermissionTerm,
};
use recordgate_core::security::{Authorizer, Caller, RuleAuthorizer, TokenAuthenticator};
use recordgate_core::storage::{MemoryRecordStore, RecordStorage};
use recordgate_core::terms::{FieldTermCollector, TermCollector, TermDefinition};
use recordgate_core::{ConstraintRedactor, RecordEnhancer, Redactor, Result};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const OWNING_ORGANISATION: &str = "OWNING_ORGANISATION";

/// Route engine logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One authorizer call, as seen by [`CountingAuthorizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCall {
    pub action: Action,
    pub record_type: String,
}

/// Authorizer wrapper recording every call made to it.
#[derive(Default)]
pub struct CountingAuthorizer {
    pub rules: RuleAuthorizer,
    calls: Mutex<Vec<AuthCall>>,
}

impl CountingAuthorizer {
    fn record(&self, action: Action, record_type: &str) {
        self.calls.lock().push(AuthCall {
            action,
            record_type: record_type.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, action: Action) -> usize {
        self.calls.lock().iter().filter(|c| c.action == action).count()
    }

    pub fn calls_for_type(&self, action: Action, record_type: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.action == action && c.record_type == record_type)
            .count()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl Authorizer for CountingAuthorizer {
    fn check_record_part_permissions(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
        has_constraints: bool,
    ) -> Result<PermissionSet> {
        self.record(action, record_type);
        self.rules
            .check_record_part_permissions(caller, action, record_type, permission_terms, has_constraints)
    }

    fn is_authorized_for_type(&self, caller: &Caller, action: Action, record_type: &str) -> bool {
        self.record(action, record_type);
        self.rules.is_authorized_for_type(caller, action, record_type)
    }

    fn is_authorized_for_type_and_terms(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> bool {
        self.record(action, record_type);
        self.rules
            .is_authorized_for_type_and_terms(caller, action, record_type, permission_terms)
    }
}

/// Storage wrapper counting reads per id and incoming-link lookups.
#[derive(Default)]
pub struct CountingStorage {
    pub store: MemoryRecordStore,
    reads: Mutex<Vec<String>>,
    link_checks: Mutex<Vec<(String, String)>>,
}

impl CountingStorage {
    pub fn reads_of(&self, id: &str) -> usize {
        self.reads.lock().iter().filter(|r| r.as_str() == id).count()
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().len()
    }

    pub fn link_checks(&self) -> Vec<(String, String)> {
        self.link_checks.lock().clone()
    }

    pub fn reset(&self) {
        self.reads.lock().clear();
        self.link_checks.lock().clear();
    }
}

impl RecordStorage for CountingStorage {
    fn read(&self, types: &[String], id: &str) -> Result<DataGroup> {
        self.reads.lock().push(id.to_string());
        self.store.read(types, id)
    }

    fn links_exist_for_record(&self, record_type: &str, id: &str) -> Result<bool> {
        self.link_checks
            .lock()
            .push((record_type.to_string(), id.to_string()));
        self.store.links_exist_for_record(record_type, id)
    }
}

/// Term collector wrapper counting collections.
#[derive(Default)]
pub struct CountingTermCollector {
    pub inner: FieldTermCollector,
    collects: AtomicUsize,
}

impl CountingTermCollector {
    pub fn collects(&self) -> usize {
        self.collects.load(Ordering::SeqCst)
    }
}

impl TermCollector for CountingTermCollector {
    fn collect(&self, metadata_id: &str, record: &DataGroup) -> Result<CollectedTerms> {
        self.collects.fetch_add(1, Ordering::SeqCst);
        self.inner.collect(metadata_id, record)
    }
}

/// Redactor wrapper counting removals.
#[derive(Default)]
pub struct CountingRedactor {
    removals: AtomicUsize,
}

impl CountingRedactor {
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl Redactor for CountingRedactor {
    fn remove_unpermitted_fields(
        &self,
        metadata_id: &str,
        record: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        ConstraintRedactor.remove_unpermitted_fields(metadata_id, record, constraints, held)
    }

    fn replace_unpermitted_fields(
        &self,
        metadata_id: &str,
        original: &DataGroup,
        changed: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup> {
        ConstraintRedactor.replace_unpermitted_fields(metadata_id, original, changed, constraints, held)
    }
}

/// A type catalog, store, authorizer and term collector wired together.
///
/// Types:
/// - `recordType`: public meta-type describing record types
/// - `search`: type defining searches
/// - `place`: plain type with a linked search `placeSearch`
/// - `person`: type with a `personalNumber` read constraint
/// - `organisation`: public type
/// - `binary` with the child type `image`
pub struct TestContext {
    pub catalog: TypeCatalog,
    pub authorizer: CountingAuthorizer,
    pub terms: CountingTermCollector,
    pub storage: CountingStorage,
    pub tokens: TokenAuthenticator,
}

impl TestContext {
    pub fn new() -> Self {
        init_tracing();

        let catalog = TypeCatalog::with_types([
            RecordTypeDef::new("recordType", "recordTypeGroup")
                .public()
                .defining_record_types(),
            RecordTypeDef::new("search", "searchGroup").defining_searches(),
            RecordTypeDef::new("place", "placeGroup").with_search("placeSearch"),
            RecordTypeDef::new("person", "personGroup")
                .with_read_constraint(Constraint::new("personalNumber")),
            RecordTypeDef::new("organisation", "organisationGroup").public(),
            RecordTypeDef::new("binary", "binaryGroup"),
            RecordTypeDef::new("image", "imageGroup").with_parent("binary"),
        ]);

        let terms = CountingTermCollector::default();
        terms.inner.define(
            "placeGroup",
            TermDefinition::permission("placeOrgTerm", &["organisation"], OWNING_ORGANISATION),
        );
        terms.inner.define(
            "personGroup",
            TermDefinition::permission("personOrgTerm", &["organisation"], OWNING_ORGANISATION),
        );

        Self {
            catalog,
            authorizer: CountingAuthorizer::default(),
            terms,
            storage: CountingStorage::default(),
            tokens: TokenAuthenticator::new(),
        }
    }

    pub fn enhancer(&self) -> RecordEnhancer<'_> {
        RecordEnhancer::new(&self.catalog, &self.authorizer, &self.terms, &self.storage)
    }

    pub fn grant(&self, role: &str, rules: &[&str]) {
        self.authorizer.rules.grant_all(role, rules).unwrap();
    }

    /// Store a record and return it.
    pub fn store(&self, record: DataGroup) -> DataGroup {
        self.storage.store.insert_record(record.clone()).unwrap();
        record
    }
}

pub fn user() -> Caller {
    Caller::new("user-1").with_role("user")
}

pub fn place(id: &str) -> DataGroup {
    DataGroup::record("place", "place", id).with_child(DataAtomic::new("name", format!("Place {}", id)))
}

pub fn place_owned_by(id: &str, organisation: &str) -> DataGroup {
    place(id).with_child(DataRecordLink::new("organisation", "organisation", organisation))
}

pub fn person(id: &str) -> DataGroup {
    DataGroup::record("person", "person", id)
        .with_child(DataAtomic::new("name", "Kim"))
        .with_child(DataAtomic::new("personalNumber", "19800101-0000"))
}

/// A `recordType` record describing `described`.
pub fn record_type(described: &str) -> DataGroup {
    DataGroup::record("recordType", "recordType", described)
}

/// A search record searching in the given types.
pub fn search(id: &str, types: &[&str]) -> DataGroup {
    types.iter().enumerate().fold(
        DataGroup::record("search", "search", id),
        |group, (i, t)| {
            group.with_child(
                DataRecordLink::new("recordTypeToSearchIn", "recordType", *t).with_repeat_id(i.to_string()),
            )
        },
    )
}
