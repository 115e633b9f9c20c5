//! Integration tests for read model repositories (ReadModel + ReadModelRepository).


use std::thread;

use readmodels::{
    Configuration, DocumentId, InMemoryClient, InMemoryDatabase, ModelIdentity, ReadModel,
    ReadModelError, ReadModelRepository, ReadModelSettings, ReadModelsExt,
};
use recording::RecordingDatabase;
use views::{CarrierLookup, CustomerProfile, OrderSummary, ShipmentTracking};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> Configuration<InMemoryDatabase> {
    init_tracing();
    Configuration::new(InMemoryDatabase::new("integration"))
}

#[test]
fn collection_names_follow_type_names() {
    let config = config();

    let orders = config.read_models::<OrderSummary>().unwrap();
    let customers = config.read_models::<CustomerProfile>().unwrap();
    let shipments = config.read_models::<ShipmentTracking>().unwrap();

    assert_eq!(OrderSummary::TYPE_NAME, "Read.Orders.OrderSummary");
    assert_eq!(orders.collection_name().as_str(), "Orders.OrderSummary");
    assert_eq!(CustomerProfile::TYPE_NAME, "CustomerProfile");
    assert_eq!(customers.collection_name().as_str(), "CustomerProfile");
    assert_eq!(
        shipments.collection_name().as_str(),
        "Shipping.ShipmentTracking"
    );

    assert_eq!(
        config.database().collection_names().unwrap(),
        vec![
            "CustomerProfile".to_string(),
            "Orders.OrderSummary".to_string(),
            "Shipping.ShipmentTracking".to_string(),
        ]
    );
}

#[test]
fn insert_then_get_returns_equal_document() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    let order = OrderSummary::new("ord-1", "alice", 12_50);

    orders.insert(&order).unwrap();

    assert_eq!(orders.get_by_id("ord-1").unwrap(), Some(order));
}

#[test]
fn insert_twice_is_a_duplicate_key() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    let order = OrderSummary::new("ord-1", "alice", 100);

    orders.insert(&order).unwrap();
    let err = orders.insert(&order).unwrap_err();

    match err {
        ReadModelError::DuplicateKey { collection, id } => {
            assert_eq!(collection, "Orders.OrderSummary");
            assert_eq!(id, "ord-1");
        }
        other => panic!("expected duplicate key, got {:?}", other),
    }
}

#[test]
fn update_on_missing_id_inserts() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    let order = OrderSummary::new("ord-2", "bob", 900);

    orders.update(&order).unwrap();

    assert_eq!(orders.get_by_id("ord-2").unwrap(), Some(order));
}

#[test]
fn update_on_existing_id_replaces_all_fields() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    orders
        .insert(&OrderSummary::new("ord-3", "carol", 100))
        .unwrap();

    let mut replacement = OrderSummary::new("ord-3", "dave", 250);
    replacement.ship();
    orders.update(&replacement).unwrap();

    assert_eq!(orders.get_by_id("ord-3").unwrap(), Some(replacement));
    assert_eq!(orders.query().count().unwrap(), 1);
}

#[test]
fn delete_removes_and_tolerates_missing() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    let order = OrderSummary::new("ord-4", "erin", 10);
    orders.insert(&order).unwrap();

    orders.delete(&order).unwrap();
    assert_eq!(orders.get_by_id("ord-4").unwrap(), None);

    orders.delete(&order).unwrap();
    orders
        .delete(&OrderSummary::new("never-stored", "nobody", 0))
        .unwrap();
}

#[test]
fn get_never_inserted_is_none() {
    let config = config();
    let orders = config.read_models::<OrderSummary>().unwrap();
    let customers = config.read_models::<CustomerProfile>().unwrap();

    assert_eq!(orders.get_by_id("nope").unwrap(), None);
    assert_eq!(customers.get_by_id(uuid::Uuid::new_v4()).unwrap(), None);
}

#[test]
fn uuid_ids_roundtrip_through_binary_form() {
    let customers = config().read_models::<CustomerProfile>().unwrap();
    let mut profile = CustomerProfile::new("Frank");

    customers.insert(&profile).unwrap();
    assert_eq!(customers.get_by_id(profile.id).unwrap(), Some(profile.clone()));

    profile.email = Some("frank@example.com".into());
    customers.update(&profile).unwrap();
    let loaded = customers.get_by_id(profile.id).unwrap().unwrap();
    assert_eq!(loaded.email.as_deref(), Some("frank@example.com"));

    customers.delete(&profile).unwrap();
    assert_eq!(customers.get_by_id(profile.id).unwrap(), None);
}

#[test]
fn object_id_keyed_views() {
    let shipments = config().read_models::<ShipmentTracking>().unwrap();
    let mut tracking = ShipmentTracking::new("ord-5", "postnord");

    shipments.update(&tracking).unwrap();
    tracking.checkpoint("Oslo");
    tracking.checkpoint("Bergen");
    shipments.update(&tracking).unwrap();

    let loaded = shipments.get_by_id(tracking.id).unwrap().unwrap();
    assert_eq!(loaded.checkpoints, vec!["Oslo", "Bergen"]);
    assert_eq!(
        shipments.get_by_id(tracking.id.to_hex()).unwrap(),
        None,
        "a hex string is not the same id as the object id"
    );
}

#[test]
fn derived_identity_matches_field_identity() {
    let config = config();
    let orders: ReadModelRepository<OrderSummary, _, _> =
        ReadModelRepository::with_identity(&config, ModelIdentity).unwrap();
    let order = OrderSummary::new("ord-6", "grace", 77);

    orders.update(&order).unwrap();
    assert_eq!(
        orders.get_by_id(DocumentId::from("ord-6")).unwrap(),
        Some(order.clone())
    );

    orders.delete(&order).unwrap();
    assert_eq!(orders.get_by_id("ord-6").unwrap(), None);
}

#[test]
fn derived_identity_inserts_under_the_derived_id() {
    let config = config();
    let customers: ReadModelRepository<CustomerProfile, _, _> =
        ReadModelRepository::with_identity(&config, ModelIdentity).unwrap();
    let profile = CustomerProfile::new("Judy");

    customers.insert(&profile).unwrap();
    assert_eq!(customers.get_by_id(profile.id).unwrap(), Some(profile.clone()));

    customers.delete(&profile).unwrap();
    assert_eq!(customers.get_by_id(profile.id).unwrap(), None);
    assert_eq!(customers.query().count().unwrap(), 0);
}

#[test]
fn closure_identity_keys_views_without_an_id_field() {
    let config = config();
    let lookups: ReadModelRepository<CarrierLookup, _, _> =
        ReadModelRepository::with_identity(&config, |l: &CarrierLookup| {
            DocumentId::from(l.tracking_code.as_str())
        })
        .unwrap();
    let mut lookup = CarrierLookup::new("PN-123", "postnord");

    lookups.insert(&lookup).unwrap();
    assert_eq!(lookups.get_by_id("PN-123").unwrap(), Some(lookup.clone()));

    lookup.carrier = "bring".into();
    lookups.update(&lookup).unwrap();
    assert_eq!(lookups.query().count().unwrap(), 1);
    assert_eq!(
        lookups.get_by_id("PN-123").unwrap().map(|l| l.carrier),
        Some("bring".to_string())
    );

    lookups.delete(&lookup).unwrap();
    assert_eq!(lookups.get_by_id("PN-123").unwrap(), None);
    assert_eq!(lookups.query().count().unwrap(), 0);
}

#[test]
fn query_is_lazy_until_enumerated() {
    init_tracing();
    let db = RecordingDatabase::new("recorded");
    let config = Configuration::new(db.clone());
    let orders = config.read_models::<OrderSummary>().unwrap();

    orders.insert(&OrderSummary::new("a", "alice", 300)).unwrap();
    orders.insert(&OrderSummary::new("b", "bob", 100)).unwrap();
    orders.insert(&OrderSummary::new("c", "alice", 200)).unwrap();
    let before = db.calls();

    let query = orders
        .query()
        .where_eq("customer", "alice")
        .filter(|o| o.total_cents > 0)
        .order_by_key(|o| o.total_cents)
        .select(|o| o.order_number);
    assert_eq!(db.calls(), before);

    assert_eq!(query.fetch().unwrap(), vec!["c".to_string(), "a".to_string()]);
    assert_eq!(db.calls(), before + 1);
}

#[test]
fn each_terminal_call_runs_the_query_again() {
    init_tracing();
    let db = RecordingDatabase::new("recorded");
    let config = Configuration::new(db.clone());
    let orders = config.read_models::<OrderSummary>().unwrap();
    orders.insert(&OrderSummary::new("a", "alice", 300)).unwrap();
    orders.insert(&OrderSummary::new("b", "bob", 100)).unwrap();

    let query = orders.query().filter(|o| o.total_cents > 0);
    let before = db.calls();
    assert_eq!(query.fetch().unwrap().len(), 2);

    orders.delete(&OrderSummary::new("a", "alice", 300)).unwrap();
    assert_eq!(query.fetch().unwrap().len(), 1);
    assert_eq!(db.calls(), before + 3);
}

#[test]
fn unfiltered_count_is_a_single_store_count() {
    init_tracing();
    let db = RecordingDatabase::new("recorded");
    let config = Configuration::new(db.clone());
    let orders = config.read_models::<OrderSummary>().unwrap();
    for (number, customer) in [("a", "alice"), ("b", "bob"), ("c", "alice")] {
        orders.insert(&OrderSummary::new(number, customer, 1)).unwrap();
    }

    let before = db.calls();
    assert_eq!(orders.query().where_eq("customer", "alice").count().unwrap(), 2);
    assert_eq!(db.calls(), before + 1);
    assert_eq!(db.finds(), 0);
}

#[test]
fn query_sees_later_writes() {
    let orders = config().read_models::<OrderSummary>().unwrap();
    let open = orders.query().where_eq("status", "open");

    assert_eq!(open.count().unwrap(), 0);

    let mut order = OrderSummary::new("ord-7", "heidi", 5);
    orders.insert(&order).unwrap();
    assert_eq!(open.count().unwrap(), 1);

    order.ship();
    orders.update(&order).unwrap();
    assert_eq!(open.count().unwrap(), 0);
    assert!(orders.query().where_eq("status", "shipped").exists().unwrap());
}

#[test]
fn settings_select_database_and_overrides() {
    init_tracing();
    let client = InMemoryClient::new();
    let mut settings = ReadModelSettings::default();
    settings.database = "projections".into();
    settings.collections.push(readmodels::CollectionOverride {
        type_name: OrderSummary::TYPE_NAME.into(),
        collection: "order_summaries".into(),
    });

    let config = Configuration::from_settings(&client, &settings).unwrap();
    let orders = config.read_models::<OrderSummary>().unwrap();
    orders.insert(&OrderSummary::new("ord-8", "ivan", 1)).unwrap();

    assert_eq!(orders.collection_name().as_str(), "order_summaries");

    let reopened = Configuration::new(client.database("projections").unwrap())
        .with_collection(OrderSummary::TYPE_NAME, "order_summaries")
        .unwrap();
    let again = reopened.read_models::<OrderSummary>().unwrap();
    assert!(again.get_by_id("ord-8").unwrap().is_some());
}

#[test]
fn repositories_for_different_types_work_concurrently() {
    let config = config();
    let orders = config.read_models::<OrderSummary>().unwrap();
    let customers = config.read_models::<CustomerProfile>().unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..50 {
                let order = OrderSummary::new(&format!("ord-{}", i), "load", i);
                orders.update(&order).unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..50 {
                customers
                    .insert(&CustomerProfile::new(&format!("customer-{}", i)))
                    .unwrap();
            }
        });
    });

    assert_eq!(orders.query().count().unwrap(), 50);
    assert_eq!(customers.query().count().unwrap(), 50);
}
