use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use elif_blueprint::prelude::*;
use elif_blueprint::{CreateModelError, FactoryResult, Seed};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Wheel {
    name: Option<String>,
    option: Option<String>,
    size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Driver {
    name: Option<String>,
    age: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Car {
    make: Option<String>,
    wheels: Option<Vec<Wheel>>,
    spare: Option<Wheel>,
    driver: Option<Driver>,
}

impl_modeled!(Wheel);
impl_modeled!(Driver);
impl_modeled!(Car);

struct WheelBlueprint;

impl BlueprintDefinition for WheelBlueprint {
    fn blueprint() -> Blueprint {
        Blueprint::for_model::<Wheel>()
            .field(DefaultField::literal("name", "stock"))
            .field(DefaultField::literal("option", "base"))
            .field(DefaultField::literal("size", 16))
    }
}

struct CarBlueprint;

impl BlueprintDefinition for CarBlueprint {
    fn blueprint() -> Blueprint {
        Blueprint::for_model::<Car>()
            .field(DefaultField::literal("make", "Toyota"))
            .field(MappedListField::of::<Wheel>("wheels").size(4))
            .field(MappedField::of::<Wheel>("spare").nullable())
            .field(MappedField::of::<Driver>("driver"))
    }
}

fn driver_blueprint() -> Blueprint {
    Blueprint::for_model::<Driver>()
        .field(DefaultField::deferred("name", |seed: &Model| {
            format!("{} driver", seed.model_type())
        }))
        .field(DefaultField::literal("age", 30))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn factory() -> ModelFactory {
    init_tracing();
    let mut factory = ModelFactory::new();
    factory.register::<WheelBlueprint>().unwrap();
    factory.register::<CarBlueprint>().unwrap();
    factory.register_blueprint(driver_blueprint()).unwrap();
    factory
}

#[test]
fn test_car_scenario() -> FactoryResult<()> {
    let factory = factory();

    let mut car: Car = factory.create()?;
    assert_eq!(car.make.as_deref(), Some("Toyota"));

    let wheels = car.wheels.as_ref().expect("wheels populated");
    assert_eq!(wheels.len(), 4);
    assert!(wheels.iter().all(|wheel| wheel.name.as_deref() == Some("stock")));

    car.make = Some("X".to_string());
    car.wheels = Some(vec![Wheel {
        name: Some("Y".to_string()),
        ..Wheel::default()
    }]);

    let car = factory.create_from(&car)?;
    assert_eq!(car.make.as_deref(), Some("X"));

    let wheels = car.wheels.expect("wheels populated");
    assert_eq!(wheels.len(), 1);
    assert_eq!(wheels[0].name.as_deref(), Some("Y"));
    assert_eq!(wheels[0].option.as_deref(), Some("base"));
    assert_eq!(wheels[0].size, Some(16));
    Ok(())
}

#[test]
fn test_mapped_fields() -> FactoryResult<()> {
    let car: Car = factory().create()?;

    assert_eq!(car.spare, None);
    assert_eq!(
        car.driver,
        Some(Driver {
            name: Some("Driver driver".to_string()),
            age: Some(30),
        })
    );
    Ok(())
}

#[test]
fn test_seeded_mapped_field_is_kept_as_is() -> FactoryResult<()> {
    let seed = Car {
        spare: Some(Wheel {
            name: Some("donut".to_string()),
            ..Wheel::default()
        }),
        driver: Some(Driver {
            name: Some("Ayrton".to_string()),
            age: None,
        }),
        ..Car::default()
    };

    let car = factory().create_from(&seed)?;

    assert_eq!(car.spare, seed.spare);
    assert_eq!(car.driver, seed.driver);
    Ok(())
}

#[test]
fn test_list_elements_keep_seed_order() -> FactoryResult<()> {
    let names = ["front-left", "front-right", "rear"];
    let seed = Car {
        wheels: Some(
            names
                .iter()
                .map(|name| Wheel {
                    name: Some(name.to_string()),
                    size: Some(18),
                    ..Wheel::default()
                })
                .collect(),
        ),
        ..Car::default()
    };

    let car = factory().create_from(&seed)?;
    let wheels = car.wheels.expect("wheels populated");

    assert_eq!(
        wheels.iter().map(|w| w.name.as_deref()).collect::<Vec<_>>(),
        names.iter().map(|n| Some(*n)).collect::<Vec<_>>()
    );
    assert!(wheels.iter().all(|w| w.size == Some(18)));
    assert!(wheels.iter().all(|w| w.option.as_deref() == Some("base")));
    Ok(())
}

#[test]
fn test_empty_seed_list_stays_empty() -> FactoryResult<()> {
    let seed = Car {
        wheels: Some(Vec::new()),
        ..Car::default()
    };

    let car = factory().create_from(&seed)?;
    assert_eq!(car.wheels, Some(Vec::new()));
    Ok(())
}

#[test]
fn test_deferred_default_runs_on_every_construction() -> FactoryResult<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut factory = ModelFactory::new();
    factory.register_blueprint(Blueprint::new("Ticket").field(DefaultField::generated(
        "number",
        move || counter.fetch_add(1, Ordering::SeqCst) as u64,
    )))?;

    let tickets = factory.create_models("Ticket", 3)?;
    let numbers: Vec<_> = tickets.iter().map(|t| t.get("number").cloned()).collect();

    assert_eq!(numbers, vec![Some(json!(0)), Some(json!(1)), Some(json!(2))]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_sequence_generator() -> FactoryResult<()> {
    let mut factory = ModelFactory::new();
    factory.register_blueprint(
        Blueprint::new("User")
            .field(DefaultField::deferred("username", generators::sequence("user")))
            .field(DefaultField::generated("email", generators::random_email)),
    )?;

    let first = factory.create_model("User")?;
    let second = factory.create_model("User")?;

    assert_eq!(first.get("username"), Some(&json!("user0")));
    assert_eq!(second.get("username"), Some(&json!("user1")));
    assert_ne!(first.get("email"), second.get("email"));
    Ok(())
}

#[test]
fn test_null_default_leaves_field_unset() -> FactoryResult<()> {
    let mut factory = ModelFactory::new();
    factory.register_blueprint(
        Blueprint::new("Driver")
            .field(DefaultField::literal("name", JsonValue::Null))
            .field(DefaultField::literal("age", 30)),
    )?;

    let driver = factory.create_model("Driver")?;
    assert!(!driver.is_set("name"));
    assert_eq!(driver.get("age"), Some(&json!(30)));
    Ok(())
}

#[test]
fn test_set_field_deduplicates() -> FactoryResult<()> {
    let mut factory = ModelFactory::new();
    factory.register_blueprint(Blueprint::new("Tag").field(DefaultField::literal("label", "new")))?;
    factory.register_blueprint(
        Blueprint::new("Post").field(
            MappedSetField::new("tags", "Tag")
                .size(3)
                .implementation(CollectionImpl::BTreeSet),
        ),
    )?;

    let post = factory.create_model("Post")?;
    assert_eq!(post.get("tags"), Some(&json!([{"label": "new"}])));

    let seed = Model::new("Post").with(
        "tags",
        json!([{"label": "rust"}, {"label": "blueprint"}, {"label": "rust"}]),
    );
    let post = factory.create_model(seed)?;
    assert_eq!(
        post.get("tags"),
        Some(&json!([{"label": "blueprint"}, {"label": "rust"}]))
    );
    Ok(())
}

#[test]
fn test_seed_enum_from_conversions() {
    assert!(matches!(Seed::from("Car"), Seed::Type(ref t) if t == "Car"));
    assert!(matches!(Seed::from(Model::new("Car")), Seed::Instance(_)));
}

#[test]
fn test_unregistered_nested_target_fails() {
    let mut factory = ModelFactory::new();
    factory
        .register_blueprint(Blueprint::new("Garage").field(MappedField::new("owner", "Person")))
        .unwrap();

    let error = factory.create_model("Garage").unwrap_err();
    assert!(matches!(error, CreateModelError::UnregisteredBlueprint(ref t) if t == "Person"));
}

#[test]
fn test_cyclic_blueprints_hit_depth_limit() {
    let config = FactoryConfigBuilder::new()
        .max_depth(Some(8))
        .build()
        .expect("Failed to build config");
    let mut factory = ModelFactory::with_config(config);
    factory
        .register_blueprint(Blueprint::new("Node").field(MappedField::new("next", "Node")))
        .unwrap();

    let error = factory.create_model("Node").unwrap_err();
    assert!(matches!(
        error,
        CreateModelError::RecursionLimit { ref model_type, limit: 8 } if model_type == "Node"
    ));

    // A nullable back-reference terminates on its own
    let mut factory = ModelFactory::new();
    factory
        .register_blueprint(Blueprint::new("Node").field(MappedField::new("next", "Node").nullable()))
        .unwrap();
    assert!(!factory.create_model("Node").unwrap().is_set("next"));
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct User {
    username: Option<String>,
    emails: Option<Vec<String>>,
}

impl_modeled!(User);

#[test]
fn test_user_callbacks_yield_fresh_values() -> FactoryResult<()> {
    let mut factory = ModelFactory::new();
    factory.register_blueprint(
        Blueprint::for_model::<User>()
            .field(DefaultField::generated("username", || {
                format!("username{}", generators::random_uuid())
            }))
            .field(DefaultField::generated("emails", || {
                (0..3)
                    .map(|_| format!("email{}@test.net", generators::random_uuid()))
                    .collect::<Vec<_>>()
            })),
    )?;

    let users: Vec<User> = factory.create_many(2)?;
    assert_ne!(users[0].username, users[1].username);
    assert!(users[0]
        .username
        .as_deref()
        .is_some_and(|name| name.starts_with("username")));

    let emails = users[0].emails.clone().unwrap_or_default();
    assert_eq!(emails.len(), 3);
    assert!(emails.iter().all(|email| email.ends_with("@test.net")));

    let seeded = factory.create_from(&User {
        username: Some("ada".to_string()),
        emails: None,
    })?;
    assert_eq!(seeded.username.as_deref(), Some("ada"));
    assert_eq!(seeded.emails.map(|emails| emails.len()), Some(3));
    Ok(())
}
