//! Arithmetic with the result quantity decided at run time.
//!
//! The typed operators only exist for pairings declared in [`crate::kinds`].
//! These functions accept any two scalars, derive the result dimension vector
//! and look up (or synthesize) the matching quantity. Narrow the result with
//! [`SiScalar::as_quantity`], which re-checks the dimensions.

use crate::error::{Result, UnitsError};
use crate::quantity::Quantity;
use crate::registry::registry;
use crate::scalar::{Kind, Scalar};
use crate::si::SiScalar;
use crate::storage::Storage;
use crate::unit::Unit;

/// Anything carrying an SI value of a known quantity.
pub trait Measured {
    type Storage: Storage;

    fn si_value(&self) -> Self::Storage;

    fn display_unit(&self) -> &'static Unit;

    fn quantity(&self) -> &'static Quantity {
        self.display_unit().quantity()
    }
}

impl<Q: Kind, S: Storage> Measured for Scalar<Q, S> {
    type Storage = S;

    fn si_value(&self) -> S {
        Scalar::si_value(self)
    }

    fn display_unit(&self) -> &'static Unit {
        Scalar::display_unit(self)
    }
}

impl<S: Storage> Measured for SiScalar<S> {
    type Storage = S;

    fn si_value(&self) -> S {
        SiScalar::si_value(self)
    }

    fn display_unit(&self) -> &'static Unit {
        SiScalar::display_unit(self)
    }
}

fn relative_only(operand: &impl Measured, operation: &'static str) -> Result<()> {
    let quantity = operand.quantity();
    if quantity.is_absolute() {
        return Err(UnitsError::AbsoluteOperand {
            quantity: quantity.name().to_string(),
            operation,
        });
    }
    Ok(())
}

fn si<M: Measured>(operand: &M) -> f64 {
    operand.si_value().to_f64()
}

pub fn multiply<A, B>(a: &A, b: &B) -> Result<SiScalar<A::Storage>>
where
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    relative_only(a, "multiply")?;
    relative_only(b, "multiply")?;
    let quantity = registry().lookup_or_create(a.quantity().dims() + b.quantity().dims());
    Ok(SiScalar::from_si_f64(si(a) * si(b), quantity))
}

pub fn divide<A, B>(a: &A, b: &B) -> Result<SiScalar<A::Storage>>
where
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    relative_only(a, "divide")?;
    relative_only(b, "divide")?;
    let quantity = registry().lookup_or_create(a.quantity().dims() - b.quantity().dims());
    Ok(SiScalar::from_si_f64(si(a) / si(b), quantity))
}

/// `1 / a`.
pub fn reciprocal<A: Measured>(a: &A) -> Result<SiScalar<A::Storage>> {
    let one = SiScalar::<A::Storage>::with_dims(A::Storage::from_f64(1.0), Default::default());
    divide(&one, a)
}

/// [`multiply`] followed by a checked cast to `Q`.
pub fn multiply_as<Q, A, B>(a: &A, b: &B) -> Result<Scalar<Q, A::Storage>>
where
    Q: Kind,
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    multiply(a, b)?.as_quantity::<Q>()
}

/// [`divide`] followed by a checked cast to `Q`.
pub fn divide_as<Q, A, B>(a: &A, b: &B) -> Result<Scalar<Q, A::Storage>>
where
    Q: Kind,
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    divide(a, b)?.as_quantity::<Q>()
}

fn mismatch(computed: &Quantity, expected: &Quantity) -> UnitsError {
    UnitsError::DimensionMismatch {
        computed: computed.describe(),
        expected: expected.describe(),
    }
}

/// The relative partner of `absolute` must be `relative`'s quantity (or share
/// its dimensions, for values that went through the generic regime).
fn check_partner(absolute: &'static Quantity, relative: &'static Quantity) -> Result<()> {
    match absolute.paired() {
        Some(partner) if partner.dims() == relative.dims() => Ok(()),
        Some(partner) => Err(mismatch(relative, partner)),
        None => Err(mismatch(relative, absolute)),
    }
}

/// `a + b`: relative + relative, absolute + relative or relative + absolute.
/// The result takes the display unit of the absolute operand, else of `a`.
pub fn add<A, B>(a: &A, b: &B) -> Result<SiScalar<A::Storage>>
where
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    let (qa, qb) = (a.quantity(), b.quantity());
    let sum = si(a) + si(b);
    let unit = match (qa.is_absolute(), qb.is_absolute()) {
        (false, false) => {
            if qa.dims() != qb.dims() {
                return Err(mismatch(qb, qa));
            }
            a.display_unit()
        }
        (true, false) => {
            check_partner(qa, qb)?;
            a.display_unit()
        }
        (false, true) => {
            check_partner(qb, qa)?;
            b.display_unit()
        }
        (true, true) => {
            return Err(UnitsError::AbsoluteOperand {
                quantity: qb.name().to_string(),
                operation: "add",
            })
        }
    };
    Ok(SiScalar::from_parts(A::Storage::from_f64(sum), unit))
}

/// `a - b`: relative - relative, absolute - relative, or absolute - absolute
/// giving the paired relative quantity.
pub fn subtract<A, B>(a: &A, b: &B) -> Result<SiScalar<A::Storage>>
where
    A: Measured,
    B: Measured<Storage = A::Storage>,
{
    let (qa, qb) = (a.quantity(), b.quantity());
    let difference = si(a) - si(b);
    let unit = match (qa.is_absolute(), qb.is_absolute()) {
        (false, false) => {
            if qa.dims() != qb.dims() {
                return Err(mismatch(qb, qa));
            }
            a.display_unit()
        }
        (true, false) => {
            check_partner(qa, qb)?;
            a.display_unit()
        }
        (true, true) => {
            if !std::ptr::eq(qa, qb) {
                return Err(mismatch(qb, qa));
            }
            let relative = qa.paired().ok_or_else(|| mismatch(qb, qa))?;
            a.display_unit()
                .counterpart()
                .unwrap_or_else(|| relative.standard_unit())
        }
        (false, true) => {
            return Err(UnitsError::AbsoluteOperand {
                quantity: qb.name().to_string(),
                operation: "subtract",
            })
        }
    };
    Ok(SiScalar::from_parts(A::Storage::from_f64(difference), unit))
}
