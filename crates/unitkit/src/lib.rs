//! Units-of-measure arithmetic with dimension checking.
//!
//! Values are tagged with a unit of a physical quantity and stored in the
//! quantity's standard (SI) unit. Only dimensionally consistent operations
//! are allowed, and the quantity of a result follows from the operands:
//!
//! * [`Scalar<Q, S>`] is the typed regime. `Q` is a marker from [`kind`]
//!   and the operators between quantities are generated from the tables in
//!   [`kinds`], each checked at compile time (`Length / Duration` is a
//!   [`Speed`]).
//! * [`SiScalar`] is the generic regime. [`arith::multiply`] and friends
//!   accept any operands and look up, or synthesize, the quantity of the
//!   result; [`SiScalar::as_quantity`] casts back after re-checking the
//!   dimension vector.
//!
//! Quantities and units come from a TOML table ([`table::UnitTable`]). The
//! bundled table is registered in the process-wide [`Registry`] on first use
//! and further tables can be added with [`Registry::load_table`].
//!
//! Text has the form `<number> <abbreviation>` (`"12.5 m/s"`, `"3m"`,
//! `"-4.2E3 kg"`); the generic regime also accepts SI dimension expressions
//! such as `"9.81 kg.m/s2"`.

pub mod arith;
pub mod dims;
mod error;
mod format;
pub mod kinds;
pub mod locale;
mod parse;
pub mod prefix;
pub mod quantity;
pub mod registry;
pub mod scalar;
pub mod si;
pub mod storage;
pub mod table;
pub mod unit;

pub use dims::{BaseDimension, Dims};
pub use error::{Result, UnitsError};
pub use kinds::*;
pub use locale::Locale;
pub use prefix::PrefixPolicy;
pub use quantity::{Quantity, Role};
pub use registry::{registry, Registry};
pub use scalar::{Kind, Scalar};
pub use si::SiScalar;
pub use storage::Storage;
pub use table::UnitTable;
pub use unit::Unit;
