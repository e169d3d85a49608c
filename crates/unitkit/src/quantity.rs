use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::dims::Dims;
use crate::error::{Result, UnitsError};
use crate::locale::Locale;
use crate::prefix::PrefixPolicy;
use crate::unit::{Unit, UnitSpec};

/// Whether a quantity is a full vector space or only supports affine operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Length, Duration, ...: add, subtract, scale.
    Relative,
    /// Position, Time, ...: only `absolute ± relative` and `absolute - absolute`.
    Absolute,
}

/// A physical kind of measurement: a dimension vector plus the units registered for it.
///
/// Quantities are append-only. Units may be added after creation, but nothing
/// is ever removed or rebound, so `&'static` references handed out stay valid.
pub struct Quantity {
    name: String,
    dims: Dims,
    role: Role,
    synthesized: bool,
    paired: OnceLock<&'static Quantity>,
    standard: OnceLock<&'static Unit>,
    units: RwLock<Vec<&'static Unit>>,
    index: RwLock<HashMap<String, &'static Unit>>,
    localized: RwLock<HashMap<String, HashMap<String, &'static Unit>>>,
}

impl Quantity {
    pub(crate) fn leak(name: String, dims: Dims, role: Role, synthesized: bool) -> &'static Quantity {
        Box::leak(Box::new(Quantity {
            name,
            dims,
            role,
            synthesized,
            paired: OnceLock::new(),
            standard: OnceLock::new(),
            units: RwLock::new(Vec::new()),
            index: RwLock::new(HashMap::new()),
            localized: RwLock::new(HashMap::new()),
        }))
    }

    /// Ephemeral quantity for a dimension vector without a named quantity.
    /// Its only unit is the SI combination spelled in the dimensions grammar.
    pub(crate) fn synthesize(dims: Dims) -> &'static Quantity {
        let symbol = dims.to_string();
        let quantity = Quantity::leak(symbol.clone(), dims, Role::Relative, true);
        let spec = UnitSpec {
            name: symbol.clone(),
            abbreviations: vec![symbol],
            localized: Default::default(),
            scale: 1.0,
            offset: 0.0,
            standard: true,
            prefixes: PrefixPolicy::None,
        };
        quantity
            .add_unit(spec)
            .expect("a fresh quantity has no units to collide with");
        quantity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_absolute(&self) -> bool {
        self.role == Role::Absolute
    }

    /// True for quantities created on demand by the registry for an unnamed dimension vector.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// The absolute quantity of a relative one, or the relative quantity of an absolute one.
    pub fn paired(&self) -> Option<&'static Quantity> {
        self.paired.get().copied()
    }

    pub(crate) fn set_paired(&self, other: &'static Quantity) -> Result<()> {
        let current = *self.paired.get_or_init(|| other);
        if !std::ptr::eq(current, other) {
            return Err(UnitsError::InvalidDefinition {
                quantity: self.name.clone(),
                reason: format!("already paired with {}", current.name),
            });
        }
        Ok(())
    }

    pub fn standard_unit(&self) -> &'static Unit {
        self.standard
            .get()
            .copied()
            .unwrap_or_else(|| panic!("quantity {} has no standard unit", self.name))
    }

    /// All units in registration order.
    pub fn units(&self) -> Vec<&'static Unit> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The unit SI prefixes are attached to when formatting: the standard unit
    /// if it takes prefixes, otherwise the first unit that does (gram for mass).
    pub fn prefix_base(&self) -> Option<&'static Unit> {
        let standard = self.standard_unit();
        if standard.prefixes() != PrefixPolicy::None {
            return Some(standard);
        }
        self.units()
            .into_iter()
            .find(|u| u.prefixes() != PrefixPolicy::None)
    }

    /// Look up a unit by abbreviation using the active locale.
    pub fn unit_by_abbreviation(&self, abbreviation: &str) -> Option<&'static Unit> {
        self.unit_by_abbreviation_in(abbreviation, &Locale::current())
    }

    /// Look up a unit by abbreviation: the locale's own textual forms first,
    /// then the canonical forms. Matching is case sensitive.
    pub fn unit_by_abbreviation_in(&self, abbreviation: &str, locale: &Locale) -> Option<&'static Unit> {
        if !locale.is_english() {
            let localized = self.localized.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(unit) = localized
                .get(locale.tag())
                .and_then(|forms| forms.get(abbreviation))
            {
                return Some(*unit);
            }
        }
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(abbreviation)
            .copied()
    }

    pub fn contains_abbreviation(&self, abbreviation: &str) -> bool {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(abbreviation)
    }

    /// Register a unit. Fails if one of its abbreviations is already taken
    /// within this quantity, or if it would be a second standard unit.
    pub(crate) fn add_unit(&'static self, spec: UnitSpec) -> Result<&'static Unit> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(taken) = spec.abbreviations.iter().find(|a| index.contains_key(*a)) {
            return Err(UnitsError::InvalidDefinition {
                quantity: self.name.clone(),
                reason: format!("abbreviation '{taken}' is already registered"),
            });
        }
        if spec.standard && self.standard.get().is_some() {
            return Err(UnitsError::InvalidDefinition {
                quantity: self.name.clone(),
                reason: format!("second standard unit '{}'", spec.name),
            });
        }

        let unit = Unit::leak(spec, self);
        for abbreviation in unit.abbreviations() {
            index.insert(abbreviation.clone(), unit);
        }
        drop(index);

        let mut localized = self.localized.write().unwrap_or_else(PoisonError::into_inner);
        for (tag, forms) in unit.localized() {
            let entry = localized.entry(tag.clone()).or_default();
            for form in forms {
                entry.entry(form.clone()).or_insert(unit);
            }
        }
        drop(localized);

        if unit.is_standard() {
            let _ = self.standard.set(unit);
        }
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(unit);
        Ok(unit)
    }

    /// Name and dimension vector, as used in error messages.
    pub fn describe(&self) -> String {
        format!("{} {}", self.name, self.dims.describe())
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Quantity {}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quantity")
            .field("name", &self.name)
            .field("dims", &self.dims)
            .field("role", &self.role)
            .field("synthesized", &self.synthesized)
            .finish()
    }
}
