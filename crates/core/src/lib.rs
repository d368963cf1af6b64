//! Accrue Core - Domain types
//!
//! This crate contains the fundamental types used across Accrue:
//! - `Amount`: Exact token quantity (`u128`), with the `ENTIRE_BALANCE` sentinel
//! - `Rate`: Per-second interest rate in 1e18 fixed point
//! - `Address`: Normalized account / component identity
//! - `Timestamp` and `Clock`: Whole-second time source for accrual

pub mod address;
pub mod amount;
pub mod clock;
pub mod rate;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use rate::{Rate, RateError, PRECISION_FACTOR};
