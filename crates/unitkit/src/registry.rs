use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::dims::Dims;
use crate::error::{Result, UnitsError};
use crate::prefix::{PrefixPolicy, SI_PREFIXES};
use crate::quantity::{Quantity, Role};
use crate::table::{QuantityDef, UnitDef, UnitTable};
use crate::unit::{Unit, UnitSpec};

/// The process-wide registry, populated from the bundled table on first use.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::with_defaults().unwrap_or_else(|e| panic!("bundled unit table is invalid: {e}"))
    })
}

/// Quantities by name and by dimension vector, plus the cache of quantities
/// synthesized for dimension vectors nobody registered.
///
/// Everything is append-only: quantities and units handed out as `&'static`
/// are never removed or replaced.
pub struct Registry {
    quantities: RwLock<Vec<&'static Quantity>>,
    by_name: RwLock<HashMap<String, &'static Quantity>>,
    by_dims: RwLock<HashMap<Dims, &'static Quantity>>,
    abbreviations: RwLock<HashMap<String, &'static Unit>>,
    synthesized: Mutex<HashMap<Dims, &'static Quantity>>,
    loading: Mutex<()>,
}

/// A validated table entry, ready to be registered.
struct Planned<'t> {
    def: &'t QuantityDef,
    existing: Option<&'static Quantity>,
    units: Vec<UnitSpec>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            quantities: RwLock::new(Vec::new()),
            by_name: RwLock::new(HashMap::new()),
            by_dims: RwLock::new(HashMap::new()),
            abbreviations: RwLock::new(HashMap::new()),
            synthesized: Mutex::new(HashMap::new()),
            loading: Mutex::new(()),
        }
    }

    /// A registry holding the bundled table.
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::new();
        registry.load_table(&UnitTable::bundled()?)?;
        Ok(registry)
    }

    /// Validate a whole table, then register it. Nothing is registered when
    /// any entry is invalid, and a new quantity only becomes visible once its
    /// units and pairing are in place.
    pub fn load_table(&self, table: &UnitTable) -> Result<()> {
        let _loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);

        let mut plans = Vec::with_capacity(table.quantities.len());
        let mut declared = HashSet::new();
        let mut taken: HashMap<&str, HashMap<String, f64>> = HashMap::new();
        for def in &table.quantities {
            let existing = self.quantity(&def.name);
            if def.extend {
                let base = existing.ok_or_else(|| invalid(def, "extends an unknown quantity"))?;
                if base.dims() != def.dimensions {
                    return Err(invalid(
                        def,
                        format!("dimensions {} differ from {}", def.dimensions, base.dims()),
                    ));
                }
                if def.absolute.is_some() || def.relative.is_some() {
                    return Err(invalid(def, "an extension cannot change the pairing"));
                }
            } else if existing.is_some() || !declared.insert(def.name.as_str()) {
                return Err(UnitsError::DuplicateQuantity {
                    name: def.name.clone(),
                });
            }
            self.check_pairing(def, table)?;
            let taken = taken
                .entry(def.name.as_str())
                .or_insert_with(|| registered_abbreviations(existing));
            let units = plan_units(def, existing, taken)?;
            plans.push(Planned {
                def,
                existing,
                units,
            });
        }

        // Build new quantities off to the side.
        let mut created: Vec<&'static Quantity> = Vec::new();
        let mut targets = Vec::with_capacity(plans.len());
        for plan in plans {
            let quantity = match plan.existing {
                Some(quantity) => quantity,
                None => {
                    let role = if plan.def.relative.is_some() {
                        Role::Absolute
                    } else {
                        Role::Relative
                    };
                    let quantity = Quantity::leak(plan.def.name.clone(), plan.def.dimensions, role, false);
                    created.push(quantity);
                    quantity
                }
            };
            let count = plan.units.len();
            let mut units = Vec::with_capacity(count);
            for spec in plan.units {
                units.push(quantity.add_unit(spec)?);
            }
            log::debug!("Registered {count} units for quantity {}", quantity.describe());
            targets.push((quantity, units));
        }

        let resolve = |name: &str| {
            created
                .iter()
                .find(|q| q.name() == name)
                .copied()
                .or_else(|| self.quantity(name))
        };
        for def in &table.quantities {
            let Some(partner) = def.absolute.as_ref().or(def.relative.as_ref()) else {
                continue;
            };
            if let (Some(this), Some(other)) = (resolve(&def.name), resolve(partner)) {
                this.set_paired(other)?;
                other.set_paired(this)?;
            }
        }

        for &quantity in &created {
            self.publish(quantity);
        }
        let mut index = self.abbreviations.write().unwrap_or_else(PoisonError::into_inner);
        for (quantity, units) in targets {
            if quantity.is_absolute() {
                continue;
            }
            for unit in units {
                for abbreviation in unit.abbreviations() {
                    index.entry(abbreviation.clone()).or_insert(unit);
                }
            }
        }
        drop(index);

        log::debug!(
            "Loaded unit table: {} new quantities, {} total",
            created.len(),
            self.quantities().len()
        );
        Ok(())
    }

    fn publish(&self, quantity: &'static Quantity) {
        self.quantities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(quantity);
        self.by_name
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quantity.name().to_string(), quantity);
        if !quantity.is_absolute() {
            self.by_dims
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(quantity.dims())
                .or_insert(quantity);
        }
    }

    fn check_pairing(&self, def: &QuantityDef, table: &UnitTable) -> Result<()> {
        let (partner, wants_absolute) = match (&def.absolute, &def.relative) {
            (Some(_), Some(_)) => return Err(invalid(def, "cannot be both absolute and relative")),
            (Some(partner), None) => (partner, true),
            (None, Some(partner)) => (partner, false),
            (None, None) => return Ok(()),
        };

        if let Some(other) = table.quantities.iter().find(|q| q.name == *partner && !q.extend) {
            let back = if wants_absolute { &other.relative } else { &other.absolute };
            if other.dimensions != def.dimensions {
                return Err(invalid(def, format!("paired quantity {partner} has other dimensions")));
            }
            return match back {
                Some(name) if *name == def.name => Ok(()),
                _ => Err(invalid(def, format!("{partner} does not pair back"))),
            };
        }

        let other = self
            .quantity(partner)
            .ok_or_else(|| invalid(def, format!("paired quantity {partner} is unknown")))?;
        if other.dims() != def.dimensions || other.is_absolute() != wants_absolute {
            return Err(invalid(def, format!("cannot pair with {}", other.describe())));
        }
        match other.paired() {
            Some(current) if current.name() != def.name => {
                Err(invalid(def, format!("{partner} is already paired with {current}")))
            }
            _ => Ok(()),
        }
    }

    pub fn quantity(&self, name: &str) -> Option<&'static Quantity> {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Named quantities in registration order.
    pub fn quantities(&self) -> Vec<&'static Quantity> {
        self.quantities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The first relative quantity registered for `dims`, if any.
    pub fn named_for_dims(&self, dims: Dims) -> Option<&'static Quantity> {
        self.by_dims
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&dims)
            .copied()
    }

    /// The named quantity for `dims`, or the one quantity synthesized for it.
    ///
    /// Concurrent first lookups of the same vector are serialized, so every
    /// caller observes the same `&'static Quantity`.
    pub fn lookup_or_create(&self, dims: Dims) -> &'static Quantity {
        if let Some(quantity) = self.named_for_dims(dims) {
            return quantity;
        }
        let mut synthesized = self.synthesized.lock().unwrap_or_else(PoisonError::into_inner);
        *synthesized.entry(dims).or_insert_with(|| {
            log::debug!("Synthesizing quantity for {}", dims.describe());
            Quantity::synthesize(dims)
        })
    }

    /// A unit of any relative quantity by canonical abbreviation. The first
    /// quantity registering an abbreviation owns it.
    pub fn unit_by_abbreviation(&self, abbreviation: &str) -> Option<&'static Unit> {
        self.abbreviations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(abbreviation)
            .copied()
    }

    /// Resolve unit text for the generic regime: a registered abbreviation,
    /// else the SI-dimensions grammar (`kg.m/s2`).
    pub fn resolve_si_unit(&self, text: &str) -> Result<&'static Unit> {
        if let Some(unit) = self.unit_by_abbreviation(text) {
            return Ok(unit);
        }
        let dims: Dims = text.parse()?;
        log::trace!("Resolved '{text}' through the dimensions grammar as {dims}");
        Ok(self.lookup_or_create(dims).standard_unit())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(def: &QuantityDef, reason: impl Into<String>) -> UnitsError {
    UnitsError::InvalidDefinition {
        quantity: def.name.clone(),
        reason: reason.into(),
    }
}

fn to_f64(def: &QuantityDef, value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| invalid(def, format!("{value} is not representable")))
}

/// Abbreviations and scales of the units `existing` already has.
fn registered_abbreviations(existing: Option<&'static Quantity>) -> HashMap<String, f64> {
    let mut taken = HashMap::new();
    for unit in existing.into_iter().flat_map(|q| q.units()) {
        for abbreviation in unit.abbreviations() {
            taken.insert(abbreviation.clone(), unit.scale());
        }
    }
    taken
}

/// Declared units plus their generated prefixed variants. `taken` holds the
/// abbreviations already claimed for this quantity, by the registry or by an
/// earlier entry of the same table; generated ones that collide are dropped.
fn plan_units(
    def: &QuantityDef,
    existing: Option<&'static Quantity>,
    taken: &mut HashMap<String, f64>,
) -> Result<Vec<UnitSpec>> {
    let absolute = def.relative.is_some() || existing.is_some_and(|q| q.is_absolute());

    let mut standard = 0;
    let mut specs = Vec::new();
    for unit in &def.units {
        validate_unit(def, unit, absolute)?;
        if unit.standard {
            standard += 1;
        }
        let scale = to_f64(def, unit.scale)?;
        for abbreviation in &unit.abbreviations {
            if taken.insert(abbreviation.clone(), scale).is_some() {
                return Err(invalid(def, format!("abbreviation '{abbreviation}' is declared twice")));
            }
        }
        specs.push(UnitSpec {
            name: unit.name.clone(),
            abbreviations: unit.abbreviations.clone(),
            localized: unit.localized.clone(),
            scale,
            offset: to_f64(def, unit.offset)?,
            standard: unit.standard,
            prefixes: unit.prefixes,
        });
    }
    match (existing, standard) {
        (None, 1) | (Some(_), 0) => {}
        (None, n) => return Err(invalid(def, format!("needs exactly one standard unit, found {n}"))),
        (Some(_), _) => return Err(invalid(def, "an extension cannot add a standard unit")),
    }

    for unit in def.units.iter().filter(|u| u.prefixes != PrefixPolicy::None) {
        let base = to_f64(def, unit.scale)?;
        for prefix in &SI_PREFIXES {
            let mut abbreviations = Vec::new();
            let mut scale = None;
            for symbol in prefix.symbols() {
                for stem in &unit.abbreviations {
                    let Some((abbreviation, factor)) = unit.prefixes.apply(symbol, prefix.exponent, stem) else {
                        continue;
                    };
                    let prefixed = base * to_f64(def, factor)?;
                    match taken.get(&abbreviation) {
                        Some(declared) if same_scale(*declared, prefixed) => {
                            log::debug!("{}: '{abbreviation}' is already declared", def.name);
                        }
                        Some(_) => {
                            log::warn!(
                                "{}: generated unit '{abbreviation}' collides with a declared unit and is skipped",
                                def.name
                            );
                        }
                        None => {
                            taken.insert(abbreviation.clone(), prefixed);
                            abbreviations.push(abbreviation);
                            scale = Some(prefixed);
                        }
                    }
                }
            }
            let Some(scale) = scale else {
                continue;
            };
            specs.push(UnitSpec {
                name: format!("{}{}", prefix.name, unit.name),
                abbreviations,
                localized: Default::default(),
                scale,
                offset: to_f64(def, unit.offset)?,
                standard: false,
                prefixes: PrefixPolicy::None,
            });
        }
    }
    Ok(specs)
}

fn same_scale(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
}

fn validate_unit(def: &QuantityDef, unit: &UnitDef, absolute: bool) -> Result<()> {
    if unit.abbreviations.is_empty() {
        return Err(invalid(def, format!("unit '{}' has no abbreviation", unit.name)));
    }
    if unit.scale.is_zero() {
        return Err(invalid(def, format!("unit '{}' has a zero scale", unit.name)));
    }
    if unit.standard && (unit.scale != Decimal::ONE || !unit.offset.is_zero()) {
        return Err(invalid(
            def,
            format!("standard unit '{}' must have scale 1 and offset 0", unit.name),
        ));
    }
    if !absolute && !unit.offset.is_zero() {
        return Err(invalid(
            def,
            format!("unit '{}' has an offset but the quantity is not absolute", unit.name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: &str = r#"
        [[quantity]]
        name = "Stretch"
        dimensions = "m"
        absolute = "Spot"

        [[quantity.unit]]
        name = "meter"
        abbreviations = ["m"]
        standard = true
        prefixes = "all"

        [[quantity.unit]]
        name = "kilometer"
        abbreviations = ["km"]
        scale = 1000

        [[quantity.unit]]
        name = "megameter, the long way"
        abbreviations = ["Mm"]
        scale = 999

        [[quantity]]
        name = "Spot"
        dimensions = "m"
        relative = "Stretch"

        [[quantity.unit]]
        name = "meter"
        abbreviations = ["m"]
        standard = true

        [[quantity.unit]]
        name = "shifted meter"
        abbreviations = ["sm"]
        offset = 10
    "#;

    fn loaded() -> Registry {
        let registry = Registry::new();
        registry.load_table(&UnitTable::parse(WIDGETS).unwrap()).unwrap();
        registry
    }

    #[test]
    fn test_load_and_pair() {
        let registry = loaded();
        let stretch = registry.quantity("Stretch").unwrap();
        let spot = registry.quantity("Spot").unwrap();
        assert_eq!(stretch.paired(), Some(spot));
        assert_eq!(spot.paired(), Some(stretch));
        assert!(spot.is_absolute());
        assert_eq!(registry.named_for_dims(Dims::LENGTH), Some(stretch));
        assert_eq!(registry.quantities(), vec![stretch, spot]);
    }

    #[test]
    fn test_prefix_generation() {
        let registry = loaded();
        let stretch = registry.quantity("Stretch").unwrap();
        let mm = stretch.unit_by_abbreviation_in("mm", &Default::default()).unwrap();
        assert_eq!(mm.name(), "millimeter");
        assert!((mm.scale() - 0.001).abs() < 1e-18);
        for micro in ["µm", "μm", "um"] {
            assert!(stretch.contains_abbreviation(micro), "{micro}");
        }
        // declared km wins over the generated one, as does the odd Mm
        let km = stretch.unit_by_abbreviation_in("km", &Default::default()).unwrap();
        assert_eq!(km.name(), "kilometer");
        let big = stretch.unit_by_abbreviation_in("Mm", &Default::default()).unwrap();
        assert_eq!(big.scale(), 999.0);
    }

    #[test]
    fn test_global_abbreviations_skip_absolute() {
        let registry = loaded();
        assert!(registry.unit_by_abbreviation("sm").is_none());
        assert_eq!(registry.unit_by_abbreviation("m").unwrap().quantity().name(), "Stretch");
    }

    #[test]
    fn test_rejects_invalid_tables() {
        let registry = loaded();
        let cases = [
            // duplicate name
            "[[quantity]]\nname = \"Stretch\"\ndimensions = \"m\"\n[[quantity.unit]]\nname = \"m\"\nabbreviations = [\"m\"]\nstandard = true",
            // no standard unit
            "[[quantity]]\nname = \"A1\"\ndimensions = \"kg\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nscale = 2",
            // standard unit with a scale
            "[[quantity]]\nname = \"A2\"\ndimensions = \"kg\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nscale = 2\nstandard = true",
            // offset on a relative quantity
            "[[quantity]]\nname = \"A3\"\ndimensions = \"kg\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nstandard = true\n[[quantity.unit]]\nname = \"y\"\nabbreviations = [\"y\"]\noffset = 1",
            // pairing with an unknown quantity
            "[[quantity]]\nname = \"A4\"\ndimensions = \"kg\"\nabsolute = \"Nowhere\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nstandard = true",
            // pairing across dimensions
            "[[quantity]]\nname = \"A5\"\ndimensions = \"kg\"\nrelative = \"Stretch\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nstandard = true",
            // extension of an unknown quantity
            "[[quantity]]\nname = \"A6\"\ndimensions = \"kg\"\nextend = true",
            // abbreviation declared twice
            "[[quantity]]\nname = \"A7\"\ndimensions = \"kg\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nstandard = true\n[[quantity.unit]]\nname = \"y\"\nabbreviations = [\"x\"]\nscale = 2",
        ];
        for case in cases {
            let table = UnitTable::parse(case).unwrap();
            assert!(registry.load_table(&table).is_err(), "{case}");
        }
        assert_eq!(registry.quantities().len(), 2);
    }

    #[test]
    fn test_failed_load_registers_nothing() {
        let registry = Registry::new();
        let table = UnitTable::parse(
            "[[quantity]]\nname = \"Ok\"\ndimensions = \"kg\"\n[[quantity.unit]]\nname = \"x\"\nabbreviations = [\"x\"]\nstandard = true\n\
             [[quantity]]\nname = \"Bad\"\ndimensions = \"s\"\n[[quantity.unit]]\nname = \"y\"\nabbreviations = [\"y\"]\nscale = 2",
        )
        .unwrap();
        assert!(registry.load_table(&table).is_err());
        assert!(registry.quantity("Ok").is_none());
    }

    #[test]
    fn test_extend() {
        let registry = loaded();
        let table = UnitTable::parse(
            "[[quantity]]\nname = \"Stretch\"\ndimensions = \"m\"\nextend = true\n[[quantity.unit]]\nname = \"furlong\"\nabbreviations = [\"fur\"]\nscale = 201.168",
        )
        .unwrap();
        registry.load_table(&table).unwrap();
        let stretch = registry.quantity("Stretch").unwrap();
        assert!(stretch.contains_abbreviation("fur"));
        assert_eq!(registry.unit_by_abbreviation("fur").unwrap().quantity(), stretch);

        let clash = UnitTable::parse(
            "[[quantity]]\nname = \"Stretch\"\ndimensions = \"m\"\nextend = true\n[[quantity.unit]]\nname = \"again\"\nabbreviations = [\"km\"]\nscale = 1000",
        )
        .unwrap();
        assert!(registry.load_table(&clash).is_err());
    }

    #[test]
    fn test_repeated_extension_checks_across_entries() {
        let registry = loaded();
        let table = UnitTable::parse(
            "[[quantity]]\nname = \"Stretch\"\ndimensions = \"m\"\nextend = true\n[[quantity.unit]]\nname = \"chain\"\nabbreviations = [\"ch\"]\nscale = 20.1168\n\
             [[quantity]]\nname = \"Stretch\"\ndimensions = \"m\"\nextend = true\n[[quantity.unit]]\nname = \"other chain\"\nabbreviations = [\"ch\"]\nscale = 20",
        )
        .unwrap();
        assert!(matches!(
            registry.load_table(&table),
            Err(UnitsError::InvalidDefinition { .. })
        ));
        assert!(!registry.quantity("Stretch").unwrap().contains_abbreviation("ch"));
        assert!(registry.unit_by_abbreviation("ch").is_none());
    }

    #[test]
    fn test_lookup_or_create() {
        let registry = loaded();
        assert_eq!(registry.lookup_or_create(Dims::LENGTH).name(), "Stretch");
        let jerk: Dims = "m/s3".parse().unwrap();
        let first = registry.lookup_or_create(jerk);
        assert!(first.is_synthesized());
        assert!(std::ptr::eq(first, registry.lookup_or_create(jerk)));
    }

    #[test]
    fn test_resolve_si_unit() {
        let registry = loaded();
        assert_eq!(registry.resolve_si_unit("km").unwrap().name(), "kilometer");
        let unit = registry.resolve_si_unit("kg.m/s2").unwrap();
        assert_eq!(unit.quantity().dims(), "kgm/s2".parse::<Dims>().unwrap());
        assert!(matches!(
            registry.resolve_si_unit("furlongs"),
            Err(UnitsError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_bundled_registry() {
        let registry = Registry::with_defaults().unwrap();
        let temperature = registry.quantity("Temperature").unwrap();
        let absolute = registry.quantity("AbsoluteTemperature").unwrap();
        assert_eq!(temperature.paired(), Some(absolute));
        let celsius = absolute.unit_by_abbreviation_in("°C", &Default::default()).unwrap();
        assert!((celsius.to_si(0.0) - 273.15).abs() < 1e-9);
        assert_eq!(registry.unit_by_abbreviation("kWh").unwrap().quantity().name(), "Energy");
        assert_eq!(registry.unit_by_abbreviation("1/km").unwrap().quantity().name(), "LinearDensity");
        assert_eq!(registry.unit_by_abbreviation("N.m").unwrap().quantity().name(), "Torque");
        assert_eq!(registry.named_for_dims("kg.m2/s2".parse().unwrap()).unwrap().name(), "Energy");
    }
}
