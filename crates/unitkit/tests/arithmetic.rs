use unitkit::arith::{self, Measured};
use unitkit::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn distance_over_time_is_speed() {
    let speed = Length::of(2.0, "km").unwrap().divide(Duration::of(1.0, "h").unwrap());
    let expected = Speed::of(2.0, "km/h").unwrap();
    assert!(close(speed.si_value(), expected.si_value()));
    assert!((speed.si_value() - 0.5556).abs() < 1e-4);
    assert_eq!(speed.display_unit().abbreviation(), "m/s");
}

#[test]
fn length_times_linear_density_is_dimensionless() {
    let ratio = Length::of(1.0, "m").unwrap() * LinearDensity::of(1.0, "1/m").unwrap();
    assert_eq!(ratio.si_value(), 1.0);
    assert_eq!(ratio.quantity().name(), "Dimensionless");
}

#[test]
fn generic_product_checks_casts() {
    let speed = Speed::of(10.0, "m/s").unwrap();
    let duration = Duration::of(1.0, "min").unwrap();

    let typed: Length = speed * duration;
    assert_eq!(typed.si_value(), 600.0);

    let generic = arith::multiply(&speed, &duration).unwrap();
    assert_eq!(generic.dims(), Dims::LENGTH);
    assert_eq!(generic.quantity().name(), "Length");
    assert_eq!(generic.as_length().unwrap(), typed);

    let err = generic.as_mass().unwrap_err();
    assert!(matches!(err, UnitsError::DimensionMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "Dimension mismatch: computed Length [m], expected Mass [kg]"
    );
    assert!(arith::multiply_as::<kind::Mass, _, _>(&speed, &duration).is_err());
    assert!(arith::multiply_as::<kind::Length, _, _>(&speed, &duration).is_ok());
}

#[test]
fn generic_quotient_matches_typed() {
    let distance = Length::of(42.195, "km").unwrap();
    let time = Duration::of(2.0, "h").unwrap();
    let generic = arith::divide(&distance, &time).unwrap().as_speed().unwrap();
    assert!(close(generic.si_value(), (distance / time).si_value()));
    let pace = arith::divide_as::<kind::Duration, _, _>(&time, &distance);
    assert!(matches!(pace, Err(UnitsError::DimensionMismatch { .. })));
}

#[test]
fn unnamed_dimensions_are_synthesized() {
    let jolt = arith::divide(&Acceleration::si(6.0), &Duration::si(2.0)).unwrap();
    assert_eq!(jolt.si_value(), 3.0);
    assert!(jolt.quantity().is_synthesized());
    assert_eq!(jolt.to_string(), "3 m/s3");

    let back = arith::multiply(&jolt, &Duration::si(2.0)).unwrap();
    assert_eq!(back.as_acceleration().unwrap().si_value(), 6.0);
}

#[test]
fn reciprocal_identity() {
    let samples: Vec<SiScalar> = vec![
        Speed::of(72.0, "km/h").unwrap().into(),
        Mass::of(3.0, "lb").unwrap().into(),
        Duration::of(250.0, "ms").unwrap().into(),
        SiScalar::parse("0.125 m/s3").unwrap(),
    ];
    for s in samples {
        let r = arith::reciprocal(&s).unwrap();
        assert_eq!(r.dims(), -s.dims());
        let rr = arith::reciprocal(&r).unwrap();
        assert_eq!(rr.quantity(), s.quantity());
        assert!(close(rr.si_value(), s.si_value()), "{s:?}");
    }

    let period = Duration::of(4.0, "ms").unwrap();
    assert!(close(period.reciprocal().reciprocal().si_value(), period.si_value()));
}

#[test]
fn interpolation_boundaries() {
    let zero = Length::of(1.0, "km").unwrap();
    let one = Length::of(3000.0, "m").unwrap();

    assert_eq!(Length::interpolate(zero, one, 0.0).unwrap(), zero);
    let end = Length::interpolate(zero, one, 1.0).unwrap();
    assert_eq!(end, one);
    assert_eq!(end.display_unit().abbreviation(), "km");

    let middle = Length::interpolate(zero, one, 0.5).unwrap();
    assert_eq!(middle.in_unit(), 2.0);
    assert_eq!(middle.display_unit().abbreviation(), "km");

    for ratio in [-0.1, 1.5, f64::NAN] {
        assert!(matches!(
            Length::interpolate(zero, one, ratio),
            Err(UnitsError::RangeViolation { .. })
        ));
    }
    assert_eq!(Length::extrapolate(zero, one, 2.0).in_unit(), 5.0);
}

#[test]
fn interpolation_uses_display_unit_of_zero() {
    let zero = AbsoluteTemperature::of(0.0, "°F").unwrap();
    let one = AbsoluteTemperature::of(100.0, "°C").unwrap();
    let middle = AbsoluteTemperature::interpolate(zero, one, 0.5).unwrap();
    assert_eq!(middle.display_unit().abbreviation(), "°F");
    assert!((middle.in_unit() - 106.0).abs() < 1e-9);
}

#[test]
fn max_min_prefer_first_on_ties() {
    let km = Length::of(1.0, "km").unwrap();
    let m = Length::of(1000.0, "m").unwrap();
    assert_eq!(km.max(m).display_unit().abbreviation(), "km");
    assert_eq!(m.min(km).display_unit().abbreviation(), "m");

    let values = [
        Length::of(5.0, "m").unwrap(),
        Length::of(2.0, "km").unwrap(),
        Length::of(2000.0, "m").unwrap(),
        Length::of(-1.0, "mi").unwrap(),
    ];
    let max = Length::max_of(values[0], values[1..].iter().copied());
    assert_eq!(max.display_unit().abbreviation(), "km");
    let min = Length::min_of(values[0], values[1..].iter().copied());
    assert_eq!(min.display_unit().abbreviation(), "mi");
    assert!(km <= m && km >= m);
    assert!(Length::of(1.0, "ft").unwrap() < Length::of(1.0, "yd").unwrap());
}

#[test]
fn dynamic_affine_rules() {
    let here = Position::of(10.0, "m").unwrap();
    let there = Position::of(25.0, "m").unwrap();
    let step = Length::of(5.0, "m").unwrap();

    let moved = arith::add(&here, &step).unwrap();
    assert_eq!(moved.si_value(), 15.0);
    assert_eq!(moved.quantity().name(), "Position");
    let moved = arith::add(&step, &here).unwrap();
    assert_eq!(moved.quantity().name(), "Position");

    let gap = arith::subtract(&there, &here).unwrap();
    assert_eq!(gap.si_value(), 15.0);
    assert_eq!(gap.as_length().unwrap().si_value(), 15.0);

    assert!(matches!(
        arith::add(&here, &there),
        Err(UnitsError::AbsoluteOperand { operation: "add", .. })
    ));
    assert!(matches!(
        arith::subtract(&step, &here),
        Err(UnitsError::AbsoluteOperand { .. })
    ));
    assert!(matches!(
        arith::multiply(&here, &step),
        Err(UnitsError::AbsoluteOperand { .. })
    ));
    assert!(matches!(
        arith::add(&step, &Mass::si(1.0)),
        Err(UnitsError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        arith::add(&here, &Duration::si(1.0)),
        Err(UnitsError::DimensionMismatch { .. })
    ));
}

#[test]
fn same_dimensions_different_quantities() {
    let torque = Torque::of(10.0, "N.m").unwrap();
    let generic = SiScalar::from(torque);
    assert_eq!(generic.quantity().name(), "Torque");
    // relative quantities with equal dimensions cast freely
    let energy = generic.as_energy().unwrap();
    assert_eq!(energy.si_value(), 10.0);
    assert_eq!(energy.display_unit().abbreviation(), "J");
    let work = Force::si(5.0) * Length::si(2.0);
    assert_eq!(work.quantity().name(), "Energy");
}

#[test]
fn unit_round_trip_for_every_registered_unit() {
    for quantity in registry().quantities() {
        for unit in quantity.units() {
            for value in [-1000.0, 0.5, 3.0, 1e6] {
                let back = unit.from_si(unit.to_si(value));
                assert!(close(back, value), "{} {}: {back} != {value}", quantity.name(), unit.name());
            }
        }
    }
}

#[test]
fn float_storage_truncates_each_step() {
    let inch = FloatLength::of(1.0, "in").unwrap();
    assert_eq!(inch.si_value(), 0.0254f32);
    let f64_inch = Length::of(1.0, "in").unwrap();
    assert_ne!(inch.si_value() as f64, f64_inch.si_value());
    let generic = arith::multiply(&inch, &inch).unwrap();
    let area: FloatArea = generic.as_area().unwrap();
    assert_eq!(area.si_value(), 0.0254f32 * 0.0254f32);
}

#[test]
fn constructors_reject_foreign_units() {
    let foot = kind::Length::quantity().unit_by_abbreviation_in("ft", &Locale::english()).unwrap();
    assert!(Length::new(1.0, foot).is_ok());
    assert!(matches!(
        Mass::new(1.0, foot),
        Err(UnitsError::UnknownUnit { .. })
    ));
    let scalar = Length::of(3.0, "ft").unwrap();
    assert!(close(scalar.in_unit_of(foot).unwrap(), 3.0));
    let metres = scalar.with_display_unit(Length::zero().display_unit()).unwrap();
    assert!(close(metres.in_unit(), 0.9144));
    assert_eq!(Measured::display_unit(&metres).abbreviation(), "m");
}

#[test]
fn special_values() {
    assert!(Length::nan().is_nan());
    assert!(!Length::positive_infinity().is_finite());
    assert!(Length::negative_infinity() < Length::zero());
    assert!(Length::zero().is_zero());
    assert_ne!(Length::nan(), Length::nan());
}
