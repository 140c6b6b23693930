//! Tests for configuring, validating and running mappings end to end.

mod common;

use common::{Kind, Source, Target, UpperTarget, init_tracing};
use memberwise_map::{
    Expr, MapError, MappingCache, MappingConfiguration, MappingMode, MappingOptions,
    NameComparer, NullableBehavior,
};
use memberwise_model::{Member, ModelError, Reflect, reflect};

#[derive(Debug, Clone, Default, PartialEq)]
struct NullableSource {
    id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct PlainTarget {
    id: i32,
}

reflect!(NullableSource { "ID" => id });
reflect!(PlainTarget { "ID" => id });

#[derive(Debug, Clone, Default)]
struct Twin {
    id: i32,
    big_id: i32,
}

reflect!(Twin { "Id" => id, "ID" => big_id });

#[derive(Debug, Clone, Default, PartialEq)]
struct Count {
    count: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct OptionalCount {
    count: Option<i32>,
}

reflect!(Count { "Count" => count });
reflect!(OptionalCount { "Count" => count });

#[derive(Debug, Clone, Default, PartialEq)]
struct Raw {
    kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RawOptional {
    kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Typed {
    kind: Kind,
}

reflect!(Raw { "Kind" => kind });
reflect!(RawOptional { "Kind" => kind });
reflect!(Typed { "Kind" => kind });

#[derive(Debug, Clone, Default)]
struct Order {
    qty: i32,
    price: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Invoice {
    total: f64,
}

reflect!(Order { "Qty" => qty, "Price" => price });
reflect!(Invoice { "Total" => total });

#[derive(Debug, Clone, Default)]
struct Flags {
    mark: bool,
}

#[derive(Debug, Clone, Default)]
struct Marks {
    mark: char,
}

reflect!(Flags { "Mark" => mark });
reflect!(Marks { "Mark" => mark });

fn sample() -> Source {
    Source {
        id: 5,
        value: "Test".to_string(),
    }
}

// === Scenarios ===

#[test]
fn case_insensitive_names_map_all_targets() {
    init_tracing();
    let mut config = MappingConfiguration::<Source, Target>::reflect();
    config
        .name_comparer(NameComparer::IgnoreCase)
        .mode(MappingMode::AllTargetMembers);
    let mapper = config.build_in(&MappingCache::new()).unwrap();

    let target = mapper.map_new(&sample()).unwrap();
    assert_eq!(
        target,
        Target {
            id: 5,
            value: "Test".to_string()
        }
    );
}

#[test]
fn ordinal_names_leave_differently_cased_targets_unmapped() {
    let config = MappingConfiguration::<Source, Target>::reflect();
    let err = config.validate().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"target member 'id' of Target is not mapped");

    let mut relaxed = MappingConfiguration::<Source, Target>::reflect();
    relaxed.mode(MappingMode::Relaxed);
    assert!(relaxed.validate().unwrap().is_empty());
}

#[test]
fn ignored_target_needs_cascade_or_override() {
    let mut config = MappingConfiguration::<Source, UpperTarget>::reflect();
    config.ignore_target("ID");
    let err = config.validate().unwrap_err();
    assert!(err.is_configuration_error());
    assert!(matches!(
        err,
        MapError::UnmappedSourceMember { ref member, .. } if member == "ID"
    ));

    let mut cascaded = MappingConfiguration::<Source, UpperTarget>::reflect();
    cascaded.ignore_target_cascading("ID");
    let target = cascaded
        .build_in(&MappingCache::new())
        .unwrap()
        .map_new(&sample())
        .unwrap();
    assert_eq!(target.id, 0);
    assert_eq!(target.value, "Test");

    let mut overridden = MappingConfiguration::<Source, UpperTarget>::reflect();
    overridden
        .ignore_target("ID")
        .map_expr("ID", Expr::call1("double", |id: i32| id * 2, Expr::member("ID")));
    let target = overridden
        .build_in(&MappingCache::new())
        .unwrap()
        .map_new(&sample())
        .unwrap();
    assert_eq!(target.id, 10);
}

#[test]
fn null_source_resets_plain_target_to_default() {
    let mapper = MappingConfiguration::<NullableSource, PlainTarget>::reflect()
        .build_in(&MappingCache::new())
        .unwrap();
    let mut target = PlainTarget { id: 1 };
    mapper.map(&NullableSource { id: None }, &mut target).unwrap();
    assert_eq!(target.id, 0);

    mapper
        .map(&NullableSource { id: Some(9) }, &mut target)
        .unwrap();
    assert_eq!(target.id, 9);
}

#[test]
fn ambiguous_source_names_fail_at_build() {
    let mut config = MappingConfiguration::<Twin, UpperTarget>::reflect();
    config
        .name_comparer(NameComparer::IgnoreCase)
        .mode(MappingMode::Relaxed);
    let err = config.build_in(&MappingCache::new()).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"members 'Id' and 'ID' of Twin both match name 'id'"
    );

    // Under ordinal comparison the two names are distinct.
    config.name_comparer(NameComparer::Ordinal);
    assert_eq!(config.validate().unwrap().len(), 1);
}

// === Nullable behavior ===

#[test]
fn default_values_become_null_by_default() {
    let mapper = MappingConfiguration::<Count, OptionalCount>::reflect()
        .build_in(&MappingCache::new())
        .unwrap();
    assert_eq!(
        mapper.map_new(&Count { count: 0 }).unwrap().count,
        None
    );
    assert_eq!(
        mapper.map_new(&Count { count: 4 }).unwrap().count,
        Some(4)
    );
}

#[test]
fn default_values_can_be_kept() {
    let mut config = MappingConfiguration::<Count, OptionalCount>::reflect();
    config.nullable_behavior(NullableBehavior::AssignDefaultAsIs);
    let mapper = config.build_in(&MappingCache::new()).unwrap();
    assert_eq!(
        mapper.map_new(&Count { count: 0 }).unwrap().count,
        Some(0)
    );
}

#[test]
fn nullable_targets_can_be_refused() {
    let mut config = MappingConfiguration::<Count, OptionalCount>::reflect();
    config.nullable_behavior(NullableBehavior::Error);
    let err = config.validate().unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"nullable target member 'Count' of OptionalCount cannot receive non-nullable i32"
    );
}

// === Enums ===

#[test]
fn strings_parse_into_enum_variants() {
    let mapper = MappingConfiguration::<Raw, Typed>::reflect()
        .build_in(&MappingCache::new())
        .unwrap();
    let parse = |kind: &str| {
        mapper.map_new(&Raw {
            kind: kind.to_string(),
        })
    };

    assert_eq!(parse("TEST").unwrap().kind, Kind::Test);
    assert_eq!(parse("Live").unwrap().kind, Kind::Live);

    let err = parse("test").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"failed to map target member 'Kind' of Typed: 'test' is not a variant of enum Kind"
    );
}

#[test]
fn absent_string_maps_to_first_variant() {
    let mapper = MappingConfiguration::<RawOptional, Typed>::reflect()
        .build_in(&MappingCache::new())
        .unwrap();
    let mut target = Typed { kind: Kind::Live };
    mapper.map(&RawOptional { kind: None }, &mut target).unwrap();
    assert_eq!(target.kind, Kind::Other);
}

#[test]
fn enum_variants_render_as_names() {
    let mapper = MappingConfiguration::<Typed, Raw>::reflect()
        .build_in(&MappingCache::new())
        .unwrap();
    let raw = mapper.map_new(&Typed { kind: Kind::Test }).unwrap();
    assert_eq!(raw.kind, "TEST");
}

// === Overrides ===

#[test]
fn expression_reads_satisfy_strict_mode() {
    let mut config = MappingConfiguration::<Order, Invoice>::reflect();
    config.map_expr(
        "Total",
        Expr::call2(
            "total",
            |qty: i32, price: f64| f64::from(qty) * price,
            Expr::member("Qty"),
            Expr::member("Price"),
        ),
    );
    let mapper = config.build_in(&MappingCache::new()).unwrap();
    let invoice = mapper
        .map_new(&Order {
            qty: 3,
            price: 2.5,
        })
        .unwrap();
    assert_eq!(invoice.total, 7.5);
    assert_eq!(
        mapper.mappings()[0].to_string(),
        "total(Order.Qty, Order.Price) -> Invoice.Total"
    );
}

#[test]
fn delegate_override_replaces_auto_pairing() {
    let mut config = MappingConfiguration::<Source, UpperTarget>::reflect();
    config
        .mode(MappingMode::AllTargetMembers)
        .map_with("Value", |source: &Source| source.value.to_uppercase());
    let target = config
        .build_in(&MappingCache::new())
        .unwrap()
        .map_new(&sample())
        .unwrap();
    assert_eq!(target.value, "TEST");
    assert_eq!(target.id, 5);
}

#[test]
fn override_of_read_only_target_is_rejected() {
    let targets = vec![Member::computed("Total", |target: &Target| target.id)];
    let mut config = MappingConfiguration::new(Source::members(), targets);
    config.mode(MappingMode::Relaxed).map_member("Total", "ID");
    assert!(matches!(
        config.validate(),
        Err(MapError::Model(ModelError::UnsupportedOperation { .. }))
    ));
}

#[test]
fn incompatible_types_are_reported_with_both_sides() {
    let err = MappingConfiguration::<Flags, Marks>::reflect()
        .validate()
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"cannot map Flags.Mark (bool) to Marks.Mark (char)");
}

// === Options and cache ===

#[test]
fn options_load_from_json() -> anyhow::Result<()> {
    let options: MappingOptions = serde_json::from_str(
        r#"{ "mode": "all_target_members", "name_comparer": "ignore_case" }"#,
    )?;
    assert_eq!(options.nullable_behavior, NullableBehavior::DefaultMapsToNull);

    let mut config = MappingConfiguration::<Source, Target>::reflect();
    config.options(options);
    let target = config.build_in(&MappingCache::new())?.map_new(&sample())?;
    assert_eq!(target.id, 5);
    Ok(())
}

#[test]
fn equal_configurations_share_one_compiled_mapping() -> anyhow::Result<()> {
    let cache = MappingCache::new();
    let mut first = MappingConfiguration::<Source, Target>::reflect();
    first.name_comparer(NameComparer::IgnoreCase);
    let mut second = MappingConfiguration::<Source, Target>::reflect();
    second
        .name_comparer(NameComparer::Normalized)
        .mode(MappingMode::AllTargetMembers);

    let a = first.build_in(&cache)?;
    let b = second.build_in(&cache)?;
    assert!(a.shares_compiled(&b));
    assert_eq!(cache.len(), 1);

    a.map_new(&sample())?;
    assert!(b.compiled().is_compiled());
    Ok(())
}

#[test]
fn distinct_getters_compile_separately_in_one_cache() -> anyhow::Result<()> {
    let cache = MappingCache::new();
    let build = |sources: Vec<Member<Source>>| {
        let mut config = MappingConfiguration::new(sources, UpperTarget::members());
        config.mode(MappingMode::Relaxed);
        config.build_in(&cache)
    };
    let plain = build(vec![Member::read_only("ID", |source: &Source| source.id)])?;
    let scaled = build(vec![Member::read_only("ID", |source: &Source| source.id * 100)])?;
    assert!(!plain.shares_compiled(&scaled));

    let source = Source {
        id: 1,
        value: String::new(),
    };
    assert_eq!(plain.map_new(&source)?.id, 1);
    assert_eq!(scaled.map_new(&source)?.id, 100);
    Ok(())
}

#[test]
fn override_wins_over_ignored_member_sharing_its_name() -> anyhow::Result<()> {
    let mut config = MappingConfiguration::<Source, Twin>::reflect();
    config
        .mode(MappingMode::Relaxed)
        .map_with("ID", |_: &Source| 99)
        .ignore_target("Id")
        .name_comparer(NameComparer::IgnoreCase);
    let twin = config.build_in(&MappingCache::new())?.map_new(&sample())?;
    assert_eq!((twin.id, twin.big_id), (0, 99));
    Ok(())
}
