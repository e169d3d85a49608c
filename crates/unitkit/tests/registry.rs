use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use unitkit::*;

#[test]
fn concurrent_synthesis_yields_one_quantity() {
    let dims: Dims = "cd2/mol3".parse().unwrap();
    assert!(registry().named_for_dims(dims).is_none());

    let found: Vec<&'static Quantity> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || registry().lookup_or_create(dims)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = found[0];
    assert!(first.is_synthesized());
    assert_eq!(first.dims(), dims);
    for quantity in &found {
        assert!(std::ptr::eq(*quantity, first));
    }
    assert!(std::ptr::eq(registry().lookup_or_create(dims), first));
    // synthesized quantities are not listed by name
    assert!(registry().quantities().iter().all(|q| !std::ptr::eq(*q, first)));
}

#[test]
fn concurrent_loads_publish_complete_quantities() {
    let local = Registry::new();
    let dims: Vec<Dims> = (1..=10)
        .flat_map(|a| (1..=10).map(move |b| format!("cd{a}/mol{b}")))
        .map(|text| text.parse().unwrap())
        .collect();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for (i, dims) in dims.iter().enumerate() {
                let table = UnitTable::parse(&format!(
                    r#"
                    [[quantity]]
                    name = "Gauge{i}"
                    dimensions = "{dims}"
                    absolute = "Level{i}"

                    [[quantity.unit]]
                    name = "gauge unit"
                    abbreviations = ["gu{i}"]
                    standard = true
                    prefixes = "all"

                    [[quantity]]
                    name = "Level{i}"
                    dimensions = "{dims}"
                    relative = "Gauge{i}"

                    [[quantity.unit]]
                    name = "level unit"
                    abbreviations = ["lu{i}"]
                    standard = true
                    "#
                ))
                .unwrap();
                local.load_table(&table).unwrap();
            }
            done.store(true, Ordering::Release);
        });
        scope.spawn(|| {
            while !done.load(Ordering::Acquire) {
                for quantity in local.quantities() {
                    quantity.standard_unit();
                    assert!(quantity.paired().is_some(), "{} is unpaired", quantity.name());
                }
                for dims in &dims {
                    local.lookup_or_create(*dims).standard_unit();
                }
            }
        });
    });

    assert_eq!(local.quantities().len(), 2 * dims.len());
    assert_eq!(local.unit_by_abbreviation("kgu7").unwrap().quantity().name(), "Gauge7");
}

#[test]
fn extend_bundled_quantity() {
    let table = UnitTable::parse(
        r#"
        [[quantity]]
        name = "Length"
        dimensions = "m"
        extend = true

        [[quantity.unit]]
        name = "furlong"
        abbreviations = ["fur"]
        scale = "201.168"
        "#,
    )
    .unwrap();
    registry().load_table(&table).unwrap();

    let race = Length::of(8.0, "fur").unwrap();
    assert!((race.si_value() - 1609.344).abs() < 1e-9);
    assert!((race.in_unit_of(Length::of(1.0, "mi").unwrap().display_unit()).unwrap() - 1.0).abs() < 1e-12);

    let generic = SiScalar::<f64>::parse("2 fur").unwrap();
    assert_eq!(generic.quantity().name(), "Length");

    // a second extension with the same abbreviation is rejected as a whole
    let clash = UnitTable::parse(
        r#"
        [[quantity]]
        name = "Length"
        dimensions = "m"
        extend = true

        [[quantity.unit]]
        name = "chain"
        abbreviations = ["ch"]
        scale = "20.1168"

        [[quantity.unit]]
        name = "other furlong"
        abbreviations = ["fur"]
        scale = "200"
        "#,
    )
    .unwrap();
    assert!(matches!(
        registry().load_table(&clash),
        Err(UnitsError::InvalidDefinition { .. })
    ));
    assert!(matches!(Length::parse("1 ch"), Err(UnitsError::UnknownUnit { .. })));
}

#[test]
fn load_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[quantity]]
name = "Jerk"
dimensions = "m/s3"

[[quantity.unit]]
name = "meter per second cubed"
abbreviations = ["m/s3"]
standard = true

[[quantity.unit]]
name = "standard gravity per second"
abbreviations = ["g0/s"]
scale = "9.80665"
"#
    )
    .unwrap();

    let table = UnitTable::from_file(file.path()).unwrap();
    registry().load_table(&table).unwrap();

    let jerk = registry().quantity("Jerk").unwrap();
    assert!(!jerk.is_synthesized());
    assert!(std::ptr::eq(registry().named_for_dims(jerk.dims()).unwrap(), jerk));

    let value = SiScalar::<f64>::parse("2 g0/s").unwrap();
    assert_eq!(value.quantity().name(), "Jerk");
    assert!((value.si_value() - 19.6133).abs() < 1e-12);

    let derived = arith::divide(&Acceleration::si(6.0), &Duration::si(2.0)).unwrap();
    assert!(std::ptr::eq(derived.quantity(), jerk));
    assert_eq!(derived.to_string(), "3 m/s3");

    assert!(matches!(
        registry().load_table(&table),
        Err(UnitsError::DuplicateQuantity { .. })
    ));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = UnitTable::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn private_registry_is_independent() {
    let local = Registry::with_defaults().unwrap();
    let table = UnitTable::parse(
        r#"
        [[quantity]]
        name = "Length"
        dimensions = "m"
        extend = true

        [[quantity.unit]]
        name = "league"
        abbreviations = ["lea"]
        scale = "4828.032"
        "#,
    )
    .unwrap();
    local.load_table(&table).unwrap();
    assert!(local.unit_by_abbreviation("lea").is_some());
    assert!(registry().unit_by_abbreviation("lea").is_none());
    assert!(local.quantity("Length").unwrap().contains_abbreviation("lea"));
}
