//! The named quantities and the operations between them.
//!
//! Each table row expands to typed operator impls plus a compile-time check
//! that the dimension vectors add up, so a wrong row fails to build instead
//! of producing a mislabelled value.

use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::OnceLock;

use paste::paste;

use crate::dims::Dims;
use crate::error::Result;
use crate::quantity::{Quantity, Role};
use crate::registry::registry;
use crate::scalar::{product, quotient, relative_difference, Kind, Scalar};
use crate::si::SiScalar;
use crate::storage::Storage;

fn named(name: &str) -> &'static Quantity {
    registry()
        .quantity(name)
        .unwrap_or_else(|| panic!("quantity {name} is missing from the bundled unit table"))
}

macro_rules! define_quantities {
    (
        relative { $( $rel:ident = $dims:expr ),* $(,)? }
        absolute { $( $abs:ident of $partner:ident ),* $(,)? }
    ) => {
        /// Type-level names of the quantities, used as the `Q` parameter of [`Scalar`].
        pub mod kind {
            $(
                #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
                pub struct $rel;
            )*
            $(
                #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
                pub struct $abs;
            )*
        }

        $(
            define_quantities!(@kind $rel, $dims, Role::Relative);
            relative_ops!($rel);
        )*
        $(
            define_quantities!(@kind $abs, <kind::$partner as Kind>::DIMS, Role::Absolute);
            absolute_ops!($abs, $partner);
        )*

        /// Every declared kind with its dimensions and role.
        #[cfg(test)]
        pub(crate) const DECLARED: &[(&str, Dims, Role)] = &[
            $( (stringify!($rel), <kind::$rel as Kind>::DIMS, Role::Relative), )*
            $( (stringify!($abs), <kind::$abs as Kind>::DIMS, Role::Absolute), )*
        ];
    };

    (@kind $name:ident, $dims:expr, $role:expr) => {
        impl Kind for kind::$name {
            const NAME: &'static str = stringify!($name);
            const DIMS: Dims = $dims;
            const ROLE: Role = $role;

            fn quantity() -> &'static Quantity {
                static QUANTITY: OnceLock<&'static Quantity> = OnceLock::new();
                *QUANTITY.get_or_init(|| named(Self::NAME))
            }
        }

        paste! {
            pub type $name = Scalar<kind::$name, f64>;
            pub type [<Float $name>] = Scalar<kind::$name, f32>;

            impl<S: Storage> SiScalar<S> {
                #[doc = concat!("Cast to [`", stringify!($name), "`], checking the dimensions.")]
                pub fn [<as_ $name:snake>](&self) -> Result<Scalar<kind::$name, S>> {
                    self.as_quantity::<kind::$name>()
                }
            }
        }
    };
}

macro_rules! scale_ops {
    ($name:ident, $float:ty) => {
        impl Mul<$float> for Scalar<kind::$name, $float> {
            type Output = Self;

            fn mul(self, factor: $float) -> Self {
                self.with_si_f64(self.si_value().to_f64() * f64::from(factor))
            }
        }

        impl Mul<Scalar<kind::$name, $float>> for $float {
            type Output = Scalar<kind::$name, $float>;

            fn mul(self, scalar: Scalar<kind::$name, $float>) -> Self::Output {
                scalar * self
            }
        }

        impl Div<$float> for Scalar<kind::$name, $float> {
            type Output = Self;

            fn div(self, factor: $float) -> Self {
                self.with_si_f64(self.si_value().to_f64() / f64::from(factor))
            }
        }
    };
}

/// Vector-space operations of a relative quantity.
macro_rules! relative_ops {
    ($name:ident) => {
        impl<S: Storage> Add for Scalar<kind::$name, S> {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                self.with_si_f64(self.si_value().to_f64() + rhs.si_value().to_f64())
            }
        }

        impl<S: Storage> Sub for Scalar<kind::$name, S> {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                self.with_si_f64(self.si_value().to_f64() - rhs.si_value().to_f64())
            }
        }

        impl<S: Storage> Neg for Scalar<kind::$name, S> {
            type Output = Self;

            fn neg(self) -> Self {
                self.with_si_f64(-self.si_value().to_f64())
            }
        }

        impl<S: Storage> Div for Scalar<kind::$name, S> {
            type Output = Scalar<kind::Dimensionless, S>;

            fn div(self, rhs: Self) -> Self::Output {
                quotient(self, rhs)
            }
        }

        impl<S: Storage> Sum for Scalar<kind::$name, S> {
            /// Sum in the display unit of the first item; zero when empty.
            fn sum<I: Iterator<Item = Self>>(mut iter: I) -> Self {
                match iter.next() {
                    Some(first) => iter.fold(first, |acc, item| acc + item),
                    None => Self::zero(),
                }
            }
        }

        scale_ops!($name, f64);
        scale_ops!($name, f32);

        impl<S: Storage> Scalar<kind::$name, S> {
            pub fn abs(self) -> Self {
                self.with_si_f64(self.si_value().to_f64().abs())
            }

            /// Round up in the display unit.
            pub fn ceil(self) -> Self {
                self.map_in_unit(f64::ceil)
            }

            /// Round down in the display unit.
            pub fn floor(self) -> Self {
                self.map_in_unit(f64::floor)
            }

            /// Round to the nearest integer in the display unit.
            pub fn round(self) -> Self {
                self.map_in_unit(f64::round)
            }
        }
    };
}

/// Affine operations of an absolute quantity against its relative partner.
macro_rules! absolute_ops {
    ($abs:ident, $rel:ident) => {
        impl<S: Storage> Add<Scalar<kind::$rel, S>> for Scalar<kind::$abs, S> {
            type Output = Self;

            fn add(self, rhs: Scalar<kind::$rel, S>) -> Self {
                self.with_si_f64(self.si_value().to_f64() + rhs.si_value().to_f64())
            }
        }

        impl<S: Storage> Sub<Scalar<kind::$rel, S>> for Scalar<kind::$abs, S> {
            type Output = Self;

            fn sub(self, rhs: Scalar<kind::$rel, S>) -> Self {
                self.with_si_f64(self.si_value().to_f64() - rhs.si_value().to_f64())
            }
        }

        impl<S: Storage> Add<Scalar<kind::$abs, S>> for Scalar<kind::$rel, S> {
            type Output = Scalar<kind::$abs, S>;

            fn add(self, rhs: Scalar<kind::$abs, S>) -> Self::Output {
                rhs + self
            }
        }

        impl<S: Storage> Sub for Scalar<kind::$abs, S> {
            type Output = Scalar<kind::$rel, S>;

            fn sub(self, rhs: Self) -> Self::Output {
                relative_difference(self, rhs)
            }
        }

        impl<S: Storage> Scalar<kind::$abs, S> {
            /// Distance from `origin`.
            pub fn relative_to(self, origin: Self) -> Scalar<kind::$rel, S> {
                self - origin
            }
        }
    };
}

macro_rules! product_impl {
    ($a:ident, $b:ident, $out:ident) => {
        const _: () = assert!(
            <kind::$a as Kind>::DIMS
                .plus(<kind::$b as Kind>::DIMS)
                .same_as(<kind::$out as Kind>::DIMS),
            concat!(stringify!($a), " * ", stringify!($b), " is not ", stringify!($out))
        );

        impl<S: Storage> Mul<Scalar<kind::$b, S>> for Scalar<kind::$a, S> {
            type Output = Scalar<kind::$out, S>;

            fn mul(self, rhs: Scalar<kind::$b, S>) -> Self::Output {
                product(self, rhs)
            }
        }
    };
}

/// `A * B => C` declares one order, `A * B <=> C` both.
macro_rules! define_products {
    () => {};
    ($a:ident * $b:ident => $out:ident; $($rest:tt)*) => {
        product_impl!($a, $b, $out);
        define_products!($($rest)*);
    };
    ($a:ident * $b:ident <=> $out:ident; $($rest:tt)*) => {
        product_impl!($a, $b, $out);
        product_impl!($b, $a, $out);
        define_products!($($rest)*);
    };
}

macro_rules! define_quotients {
    ($( $a:ident / $b:ident => $out:ident; )*) => {
        $(
            const _: () = assert!(
                <kind::$a as Kind>::DIMS
                    .minus(<kind::$b as Kind>::DIMS)
                    .same_as(<kind::$out as Kind>::DIMS),
                concat!(stringify!($a), " / ", stringify!($b), " is not ", stringify!($out))
            );

            impl<S: Storage> Div<Scalar<kind::$b, S>> for Scalar<kind::$a, S> {
                type Output = Scalar<kind::$out, S>;

                fn div(self, rhs: Scalar<kind::$b, S>) -> Self::Output {
                    quotient(self, rhs)
                }
            }
        )*
    };
}

macro_rules! reciprocal_impl {
    ($a:ident, $b:ident) => {
        const _: () = assert!(
            <kind::$a as Kind>::DIMS
                .negate()
                .same_as(<kind::$b as Kind>::DIMS),
            concat!("1 / ", stringify!($a), " is not ", stringify!($b))
        );

        impl<S: Storage> Scalar<kind::$a, S> {
            #[doc = concat!("`1 / self` as [`", stringify!($b), "`].")]
            pub fn reciprocal(self) -> Scalar<kind::$b, S> {
                Scalar::from_si_f64(1.0 / self.si_value().to_f64())
            }
        }
    };
}

macro_rules! define_reciprocals {
    ($( $a:ident <=> $b:ident ),* $(,)?) => {
        $(
            reciprocal_impl!($a, $b);
            reciprocal_impl!($b, $a);
        )*
    };
}

const MASS: Dims = Dims::MASS;
const LENGTH: Dims = Dims::LENGTH;
const TIME: Dims = Dims::TIME;

define_quantities! {
    relative {
        Dimensionless = Dims::DIMENSIONLESS,
        Length = LENGTH,
        LinearDensity = LENGTH.negate(),
        Area = LENGTH.powi(2),
        Volume = LENGTH.powi(3),
        Duration = TIME,
        Frequency = TIME.negate(),
        Angle = Dims::ANGLE,
        SolidAngle = Dims::SOLID_ANGLE,
        AngularVelocity = Dims::ANGLE.minus(TIME),
        Mass = MASS,
        Speed = LENGTH.minus(TIME),
        Acceleration = LENGTH.minus(TIME.powi(2)),
        Force = MASS.plus(LENGTH).minus(TIME.powi(2)),
        Energy = MASS.plus(LENGTH.powi(2)).minus(TIME.powi(2)),
        Torque = MASS.plus(LENGTH.powi(2)).minus(TIME.powi(2)),
        Power = MASS.plus(LENGTH.powi(2)).minus(TIME.powi(3)),
        Momentum = MASS.plus(LENGTH).minus(TIME),
        Pressure = MASS.minus(LENGTH).minus(TIME.powi(2)),
        Density = MASS.minus(LENGTH.powi(3)),
        FlowVolume = LENGTH.powi(3).minus(TIME),
        FlowMass = MASS.minus(TIME),
        Temperature = Dims::TEMPERATURE,
        ElectricalCurrent = Dims::CURRENT,
        ElectricalCharge = TIME.plus(Dims::CURRENT),
        ElectricalPotential = MASS.plus(LENGTH.powi(2)).minus(TIME.powi(3)).minus(Dims::CURRENT),
        ElectricalResistance = MASS
            .plus(LENGTH.powi(2))
            .minus(TIME.powi(3))
            .minus(Dims::CURRENT.powi(2)),
        AmountOfSubstance = Dims::AMOUNT,
        LuminousIntensity = Dims::LUMINOUS_INTENSITY,
    }
    absolute {
        Position of Length,
        Time of Duration,
        Direction of Angle,
        AbsoluteTemperature of Temperature,
    }
}

define_products! {
    Length * Length => Area;
    Length * Area <=> Volume;
    Length * LinearDensity <=> Dimensionless;
    Frequency * Duration <=> Dimensionless;
    Frequency * Length <=> Speed;
    Frequency * Angle <=> AngularVelocity;
    Speed * Duration <=> Length;
    Acceleration * Duration <=> Speed;
    AngularVelocity * Duration <=> Angle;
    Mass * Acceleration <=> Force;
    Mass * Speed <=> Momentum;
    Force * Duration <=> Momentum;
    Force * Length => Energy;
    Force * Speed <=> Power;
    Power * Duration <=> Energy;
    Pressure * Area <=> Force;
    Pressure * Volume <=> Energy;
    Density * Volume <=> Mass;
    Area * Speed <=> FlowVolume;
    FlowVolume * Duration <=> Volume;
    FlowMass * Duration <=> Mass;
    ElectricalCurrent * Duration <=> ElectricalCharge;
    ElectricalPotential * ElectricalCurrent <=> Power;
    ElectricalResistance * ElectricalCurrent <=> ElectricalPotential;
}

define_quotients! {
    Length / Duration => Speed;
    Length / Speed => Duration;
    Speed / Duration => Acceleration;
    Speed / Acceleration => Duration;
    Speed / Length => Frequency;
    Speed / Frequency => Length;
    Area / Length => Length;
    Volume / Length => Area;
    Volume / Area => Length;
    Volume / Duration => FlowVolume;
    Angle / Duration => AngularVelocity;
    Force / Mass => Acceleration;
    Force / Acceleration => Mass;
    Force / Area => Pressure;
    Force / Pressure => Area;
    Energy / Duration => Power;
    Energy / Power => Duration;
    Energy / Length => Force;
    Energy / Force => Length;
    Energy / Volume => Pressure;
    Power / Speed => Force;
    Power / Force => Speed;
    Power / ElectricalCurrent => ElectricalPotential;
    Power / ElectricalPotential => ElectricalCurrent;
    Mass / Volume => Density;
    Mass / Density => Volume;
    Mass / Duration => FlowMass;
    Momentum / Mass => Speed;
    Momentum / Speed => Mass;
    ElectricalCharge / Duration => ElectricalCurrent;
    ElectricalCharge / ElectricalCurrent => Duration;
    ElectricalPotential / ElectricalCurrent => ElectricalResistance;
    ElectricalPotential / ElectricalResistance => ElectricalCurrent;
    Dimensionless / Duration => Frequency;
    Dimensionless / Frequency => Duration;
    Dimensionless / Length => LinearDensity;
    Dimensionless / LinearDensity => Length;
}

define_reciprocals! {
    Duration <=> Frequency,
    Length <=> LinearDensity,
}
