use labelgraph::graph::{props, GraphBackend, GraphStore, IndexHandle, Label, PropertyMap, PropertyValue};
use labelgraph::mapping::{ClassRef, ClassSpec, Mapper, QueryRoute};
use std::sync::Arc;

fn setup() -> (Arc<GraphStore>, Mapper, ClassRef, ClassRef) {
    let store = Arc::new(GraphStore::new());
    let mapper = Mapper::new(store.clone());
    let base = mapper.define(ClassSpec::new("Base").property("x")).unwrap();
    let sub = mapper.define(ClassSpec::new("Sub").extends(&base)).unwrap();
    (store, mapper, base, sub)
}

#[test]
fn test_sub_index_creates_entries_on_every_ancestor() {
    let (store, mapper, _base, sub) = setup();

    let handles = mapper.index(&sub, "x").unwrap();
    assert_eq!(handles, vec![IndexHandle::new("Base", "x"), IndexHandle::new("Sub", "x")]);
    assert_eq!(store.indexes(&Label::new("Base")).unwrap(), vec!["x".to_string()]);
    assert_eq!(store.indexes(&Label::new("Sub")).unwrap(), vec!["x".to_string()]);
}

#[test]
fn test_base_index_stays_on_base_label() {
    let (store, mapper, base, sub) = setup();

    let handles = mapper.index(&base, "x").unwrap();
    assert_eq!(handles, vec![IndexHandle::new("Base", "x")]);
    assert!(store.indexes(&Label::new("Sub")).unwrap().is_empty());
    assert!(!mapper.has_index(&sub, "x"));
}

#[test]
fn test_base_query_after_sub_index_falls_back_to_scan() {
    let (_store, mapper, base, sub) = setup();
    mapper.index(&sub, "x").unwrap();

    let plain = mapper.create(&base, props([("x", "v")])).unwrap();
    let derived = mapper.create(&sub, props([("x", "v")])).unwrap();
    mapper.create(&base, props([("x", "other")])).unwrap();

    let query = mapper.all(&base, props([("x", "v")])).unwrap();
    assert_eq!(query.route(), QueryRoute::LabelScan);
    let found = query.to_vec().unwrap();
    assert_eq!(found, vec![plain.clone(), derived.clone()]);

    // Materialized with the most specific class
    assert_eq!(found[0].class().map(|c| c.as_str()), Some("Base"));
    assert_eq!(found[1].class().map(|c| c.as_str()), Some("Sub"));

    let sub_query = mapper.all(&sub, props([("x", "v")])).unwrap();
    assert_eq!(sub_query.route(), QueryRoute::IndexLookup { property: "x".into() });
    assert_eq!(sub_query.to_vec().unwrap(), vec![derived]);
}

#[test]
fn test_index_does_not_change_results() {
    let (_store, mapper, base, sub) = setup();
    for i in 0..20i64 {
        let class = if i % 3 == 0 { &sub } else { &base };
        mapper.create(class, props([("x", PropertyValue::Integer(i % 4))])).unwrap();
    }

    let filter = props([("x", 2i64)]);
    let scanned = mapper.all(&base, filter.clone()).unwrap();
    assert_eq!(scanned.route(), QueryRoute::LabelScan);
    let by_scan = scanned.to_vec().unwrap();
    let first_by_scan = mapper.find(&base, filter.clone()).unwrap();

    mapper.index(&base, "x").unwrap();
    let indexed = mapper.all(&base, filter.clone()).unwrap();
    assert_eq!(indexed.route(), QueryRoute::IndexLookup { property: "x".into() });
    assert_eq!(indexed.to_vec().unwrap(), by_scan);
    assert_eq!(mapper.find(&base, filter).unwrap(), first_by_scan);
}

#[test]
fn test_index_backfills_existing_nodes() {
    let (_store, mapper, base, _sub) = setup();
    let early = mapper.create(&base, props([("x", "early")])).unwrap();

    mapper.index(&base, "x").unwrap();
    assert_eq!(mapper.find(&base, props([("x", "early")])).unwrap(), early);
}

#[test]
fn test_destroyed_node_is_gone_from_both_routes() {
    let (_store, mapper, base, _sub) = setup();
    let doomed = mapper.create(&base, props([("x", "gone")])).unwrap();
    let scan = mapper.all(&base, props([("x", "gone")])).unwrap();
    assert!(scan.contains(&doomed).unwrap());

    mapper.index(&base, "x").unwrap();
    let lookup = mapper.all(&base, props([("x", "gone")])).unwrap();
    assert!(lookup.contains(&doomed).unwrap());

    mapper.destroy(&doomed).unwrap();
    assert!(!scan.contains(&doomed).unwrap());
    assert!(!lookup.contains(&doomed).unwrap());
    assert!(!mapper.all(&base, PropertyMap::new()).unwrap().contains(&doomed).unwrap());
}

#[test]
fn test_three_level_hierarchy_propagates_to_ancestors_only() {
    let (store, mapper, _base, sub) = setup();
    let leaf = mapper.define(ClassSpec::new("Leaf").extends(&sub)).unwrap();

    let handles = mapper.index(&sub, "x").unwrap();
    assert_eq!(handles, vec![IndexHandle::new("Base", "x"), IndexHandle::new("Sub", "x")]);
    assert!(store.indexes(&Label::new("Leaf")).unwrap().is_empty());

    let handles = mapper.index(&leaf, "x").unwrap();
    assert_eq!(handles.len(), 3);
    assert!(mapper.has_index(&leaf, "x"));
    assert!(mapper.has_index(&sub, "x"));
}

#[test]
fn test_drop_index_reverts_to_scan() {
    let (_store, mapper, _base, sub) = setup();
    mapper.index(&sub, "x").unwrap();
    let created = mapper.create(&sub, props([("x", "v")])).unwrap();

    mapper.drop_index(&sub, "x").unwrap();
    let query = mapper.all(&sub, props([("x", "v")])).unwrap();
    assert_eq!(query.route(), QueryRoute::LabelScan);
    assert_eq!(query.first().unwrap(), Some(created));
}
