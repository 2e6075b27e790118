//! Shared building blocks for the loyalty platform.
//!
//! Both services link against this crate. It deliberately stays small: the
//! [`Points`] value type and the [`luhn`] checks are the vocabulary the two
//! services share on the wire and in their databases, and the [`logging`] and
//! [`request_log`] modules give them the same observability surface.

pub mod logging;
pub mod luhn;
pub mod request_log;

mod points;

pub use points::Points;
