//! Integration tests for the record enhancer.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use recordgate_core::proto::{Action, ActionSet, DataGroup, DataRecordLink, PermissionSet};
use recordgate_core::security::{Caller, PermissionRule, TermCondition};
use recordgate_core::{Error, EnhancerConfig};

fn actions(list: &[Action]) -> ActionSet {
    list.iter().copied().collect()
}

fn permissions(list: &[&str]) -> PermissionSet {
    list.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_place_scenario() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,update,index:place"]);
    let record = ctx.store(place("p1"));
    let redactor = CountingRedactor::default();

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &redactor)
        .unwrap();

    assert_eq!(
        enhanced.actions,
        actions(&[Action::Read, Action::Update, Action::Index])
    );
    assert!(enhanced.read_permissions.is_empty());
    assert!(enhanced.write_permissions.is_empty());
    assert_eq!(redactor.removals(), 0);
    assert_eq!(enhanced.record.children.len(), record.children.len());
}

#[test]
fn test_terms_collected_once_per_record() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,update,delete,index:place"]);
    let record = place_owned_by("p1", "uu");

    ctx.enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert_eq!(ctx.terms.collects(), 1);
}

#[test]
fn test_public_type_read_skips_authorizer() {
    let ctx = TestContext::new();
    let record = DataGroup::record("organisation", "organisation", "uu");

    let enhanced = ctx
        .enhancer()
        .enhance(&Caller::guest(), "organisation", &record, &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.has_action(Action::Read));
    assert_eq!(ctx.authorizer.calls_for(Action::Read), 0);
    assert!(enhanced.read_permissions.is_empty());
}

#[test]
fn test_no_update_without_authorization() {
    let ctx = TestContext::new();
    ctx.authorizer.rules.grant(
        "user",
        PermissionRule::parse("read:person")
            .unwrap()
            .with_record_part_permission("personalNumber"),
    );

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "person", &person("x1"), &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.has_action(Action::Update));
    assert!(enhanced.write_permissions.is_empty());
    assert_eq!(enhanced.read_permissions, permissions(&["personalNumber"]));
    assert_eq!(ctx.authorizer.calls_for(Action::Update), 1);
}

#[test]
fn test_record_part_permissions_reported() {
    let ctx = TestContext::new();
    ctx.authorizer.rules.grant(
        "user",
        PermissionRule::parse("read,update:person")
            .unwrap()
            .with_record_part_permission("personalNumber"),
    );
    let record = person("x1");

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "person", &record, &CountingRedactor::default())
        .unwrap();

    assert_eq!(enhanced.read_permissions, permissions(&["personalNumber"]));
    assert_eq!(enhanced.write_permissions, permissions(&["personalNumber"]));
    assert_eq!(
        enhanced.record.first_atomic_value("personalNumber"),
        Some("19800101-0000")
    );
}

#[test]
fn test_read_constraints_redact_without_permission() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:person"]);
    let redactor = CountingRedactor::default();

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "person", &person("x1"), &redactor)
        .unwrap();

    assert!(enhanced.has_action(Action::Read));
    assert!(enhanced.read_permissions.is_empty());
    assert!(!enhanced.record.contains_child("personalNumber"));
    assert_eq!(enhanced.record.first_atomic_value("name"), Some("Kim"));
    assert_eq!(redactor.removals(), 1);
}

#[test]
fn test_denied_read_aborts_without_further_checks() {
    let ctx = TestContext::new();
    let redactor = CountingRedactor::default();

    let err = ctx
        .enhancer()
        .enhance(&user(), "person", &person("x1"), &redactor)
        .unwrap_err();

    match err {
        Error::AuthorizationDenied(denied) => {
            assert_eq!(denied.action, Action::Read);
            assert_eq!(denied.record_type, "person");
        }
        other => panic!("expected AuthorizationDenied, got {:?}", other),
    }
    assert_eq!(ctx.authorizer.calls().len(), 1);
    assert_eq!(redactor.removals(), 0);
    assert!(ctx.storage.link_checks().is_empty());
}

#[test]
fn test_ignoring_read_access_returns_redacted_record() {
    let ctx = TestContext::new();
    ctx.grant("user", &["update:person"]);
    let redactor = CountingRedactor::default();

    let enhanced = ctx
        .enhancer()
        .enhance_ignoring_read_access(&user(), "person", &person("x1"), &redactor)
        .unwrap();

    assert!(!enhanced.has_action(Action::Read));
    assert!(enhanced.has_action(Action::Update));
    assert!(enhanced.read_permissions.is_empty());
    assert!(!enhanced.record.contains_child("personalNumber"));
    assert_eq!(redactor.removals(), 1);
}

#[test]
fn test_ignoring_read_access_keeps_read_when_allowed() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place"]);

    let enhanced = ctx
        .enhancer()
        .enhance_ignoring_read_access(&user(), "place", &place("p1"), &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.has_action(Action::Read));
}

#[test]
fn test_delete_when_no_incoming_links() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,delete:place"]);
    let record = ctx.store(place("p1"));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.has_action(Action::Delete));
    assert!(!enhanced.has_action(Action::ReadIncomingLinks));
}

#[test]
fn test_incoming_links_on_own_type() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,delete:place"]);
    let record = ctx.store(place("p1"));
    ctx.store(place("p2").with_child(DataRecordLink::new("neighbour", "place", "p1")));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.has_action(Action::Delete));
    assert!(enhanced.has_action(Action::ReadIncomingLinks));
    assert_eq!(ctx.authorizer.calls_for(Action::Delete), 0);
}

#[test]
fn test_incoming_links_on_parent_type() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,delete:image"]);
    let image = ctx.store(DataGroup::record("image", "image", "i1"));
    ctx.store(place("p1").with_child(DataRecordLink::new("photo", "binary", "i1")));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "image", &image, &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.has_action(Action::Delete));
    assert!(enhanced.has_action(Action::ReadIncomingLinks));
    assert_eq!(
        ctx.storage.link_checks(),
        vec![
            ("image".to_string(), "i1".to_string()),
            ("binary".to_string(), "i1".to_string()),
        ]
    );
}

#[test]
fn test_delete_requires_authorization() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,update:place"]);

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &place("p1"), &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.has_action(Action::Delete));
    assert!(!enhanced.has_action(Action::ReadIncomingLinks));
}

#[test]
fn test_repeated_links_resolved_once() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place"]);
    ctx.store(place("p2"));
    let record = place("p1")
        .with_child(DataRecordLink::new("neighbour", "place", "p2").with_repeat_id("0"))
        .with_child(DataRecordLink::new("neighbour", "place", "p2").with_repeat_id("1"))
        .with_child(DataGroup::new("history").with_child(DataRecordLink::new("formerNeighbour", "place", "p2")));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    let links = enhanced.record.record_links();
    assert_eq!(links.len(), 4);
    assert!(links.iter().all(|l| l.has_read_action));
    assert_eq!(ctx.storage.reads_of("p2"), 1);
    // One check for the record itself, one for p2.
    assert_eq!(ctx.authorizer.calls_for_type(Action::Read, "place"), 2);
    assert_eq!(ctx.terms.collects(), 2);
}

#[test]
fn test_public_link_targets_need_no_io() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place"]);
    let record = place("p1")
        .with_child(DataRecordLink::new("organisation", "organisation", "uu"))
        .with_child(DataRecordLink::new("partner", "organisation", "kth"));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.record.record_links().iter().all(|l| l.has_read_action));
    assert_eq!(ctx.storage.total_reads(), 0);
}

#[test]
fn test_link_readability_follows_terms() {
    let ctx = TestContext::new();
    ctx.authorizer.rules.grant(
        "user",
        PermissionRule::parse("read:place")
            .unwrap()
            .with_term_condition(TermCondition::new(OWNING_ORGANISATION, ["uu"])),
    );
    ctx.store(place_owned_by("p2", "kth"));
    ctx.store(place_owned_by("p3", "uu"));
    let record = place_owned_by("p1", "uu")
        .with_child(DataRecordLink::new("west", "place", "p2"))
        .with_child(DataRecordLink::new("east", "place", "p3"));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.record.first_link("west").unwrap().has_read_action);
    assert!(enhanced.record.first_link("east").unwrap().has_read_action);
}

#[test]
fn test_link_to_parent_type_reads_child_record() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place", "read:image"]);
    ctx.store(DataGroup::record("image", "image", "i1"));
    let record = place("p1").with_child(DataRecordLink::new("photo", "binary", "i1"));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.record.first_link("photo").unwrap().has_read_action);
    assert_eq!(ctx.authorizer.calls_for_type(Action::Read, "image"), 1);
    assert_eq!(ctx.authorizer.calls_for_type(Action::Read, "binary"), 0);
}

#[test]
fn test_missing_link_target_is_not_an_error() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place"]);
    let record = place("p1").with_child(DataRecordLink::new("neighbour", "place", "gone"));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &record, &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.record.first_link("neighbour").unwrap().has_read_action);
}

#[test]
fn test_record_type_scenario() {
    let ctx = TestContext::new();
    ctx.grant("user", &["create,list,validate:place"]);

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "recordType", &record_type("place"), &CountingRedactor::default())
        .unwrap();

    assert_eq!(
        enhanced.actions,
        actions(&[Action::Read, Action::Create, Action::List, Action::Validate])
    );
    assert_eq!(ctx.authorizer.calls_for_type(Action::BatchIndex, "place"), 1);
    assert_eq!(ctx.authorizer.calls_for(Action::Index), 0);
}

#[test]
fn test_batch_index_on_described_type() {
    let ctx = TestContext::new();
    ctx.grant("user", &["batch_index:place"]);

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "recordType", &record_type("place"), &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.has_action(Action::BatchIndex));
    assert!(!enhanced.has_action(Action::Index));
    assert!(!enhanced.has_action(Action::Create));
}

#[test]
fn test_search_through_linked_search() {
    let ctx = TestContext::new();
    ctx.grant("user", &["search:place"]);
    ctx.store(search("placeSearch", &["place"]));

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "recordType", &record_type("place"), &CountingRedactor::default())
        .unwrap();

    assert!(enhanced.has_action(Action::Search));
    assert_eq!(ctx.storage.reads_of("placeSearch"), 1);
}

#[test]
fn test_missing_linked_search_gives_no_search() {
    let ctx = TestContext::new();
    ctx.grant("user", &["search:place"]);

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "recordType", &record_type("place"), &CountingRedactor::default())
        .unwrap();

    assert!(!enhanced.has_action(Action::Search));
}

#[test]
fn test_search_record_searchable_if_any_target_is() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read:search", "search:person"]);
    let record = search("placeSearch", &["place", "person"]);

    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "search", &record, &CountingRedactor::default())
        .unwrap();
    assert!(enhanced.has_action(Action::Search));

    let other = TestContext::new();
    other.grant("user", &["read:search", "search:organisation"]);
    let enhanced = other
        .enhancer()
        .enhance(&user(), "search", &record, &CountingRedactor::default())
        .unwrap();
    assert!(!enhanced.has_action(Action::Search));
}

#[test]
fn test_upload_for_binary_child() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,upload:image"]);

    let enhanced = ctx
        .enhancer()
        .enhance(
            &user(),
            "image",
            &DataGroup::record("image", "image", "i1"),
            &CountingRedactor::default(),
        )
        .unwrap();

    assert!(enhanced.has_action(Action::Upload));
}

#[test]
fn test_custom_config_names() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,upload:image"]);
    let enhancer = ctx
        .enhancer()
        .with_config(EnhancerConfig::new().with_binary_type("blob"));

    let enhanced = enhancer
        .enhance(
            &user(),
            "image",
            &DataGroup::record("image", "image", "i1"),
            &CountingRedactor::default(),
        )
        .unwrap();

    assert!(!enhanced.has_action(Action::Upload));
}

#[test]
fn test_enhance_list_filters_by_terms() {
    let ctx = TestContext::new();
    ctx.authorizer.rules.grant(
        "user",
        PermissionRule::parse("read:place")
            .unwrap()
            .with_term_condition(TermCondition::new(OWNING_ORGANISATION, ["uu"])),
    );
    let records = vec![
        place_owned_by("p1", "uu"),
        place_owned_by("p2", "kth"),
        place_owned_by("p3", "uu"),
    ];

    let enhanced = ctx
        .enhancer()
        .enhance_list(&user(), "place", &records, &CountingRedactor::default())
        .unwrap();

    let ids: Vec<_> = enhanced.iter().filter_map(|e| e.id()).collect();
    assert_eq!(ids, vec!["p1", "p3"]);
}

#[test]
fn test_enhanced_record_round_trips_as_json() {
    let ctx = TestContext::new();
    ctx.grant("user", &["read,update:place"]);
    let enhanced = ctx
        .enhancer()
        .enhance(&user(), "place", &place_owned_by("p1", "uu"), &CountingRedactor::default())
        .unwrap();

    let json = enhanced.to_json().unwrap();
    assert!(json.contains("\"has_read_action\":true"));
    let parsed = recordgate_core::proto::EnhancedRecord::from_json(&json).unwrap();
    assert_eq!(parsed, enhanced);
}

#[test]
fn test_concurrent_invocations_keep_separate_caches() {
    const THREADS: usize = 4;
    let ctx = TestContext::new();
    ctx.grant("user", &["read:place"]);
    ctx.store(place("hub"));
    for i in 0..THREADS {
        ctx.store(place(&format!("t{}", i)));
    }
    let enhancer = ctx.enhancer();
    let redactor = CountingRedactor::default();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let enhancer = &enhancer;
                let redactor = &redactor;
                s.spawn(move || {
                    let target = format!("t{}", i);
                    let record = place(&format!("p{}", i))
                        .with_child(DataRecordLink::new("west", "place", target.as_str()))
                        .with_child(DataRecordLink::new("west", "place", target.as_str()))
                        .with_child(DataRecordLink::new("centre", "place", "hub"))
                        .with_child(DataRecordLink::new("centre", "place", "hub"));
                    enhancer.enhance(&user(), "place", &record, redactor)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        let enhanced = result.unwrap();
        assert!(enhanced.record.record_links().iter().all(|l| l.has_read_action));
    }
    for i in 0..THREADS {
        assert_eq!(ctx.storage.reads_of(&format!("t{}", i)), 1);
    }
    // Each invocation reads the shared target once through its own cache.
    assert_eq!(ctx.storage.reads_of("hub"), THREADS);
}
