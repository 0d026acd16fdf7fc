//! Record abstraction consumed by the field updaters.
//!
//! The pipeline owns the real record type; this crate only needs to read,
//! write and test for fields addressed by a [`FieldRef`]. [`Event`] is the
//! JSON-object backed implementation used by the binary and the tests.

mod event;
mod field_ref;
mod template;
pub use event::*;
pub use field_ref::*;
pub use template::*;

#[cfg(test)]
mod template_test;

#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::Result;

#[cfg_attr(test, automock)]
pub trait Record: Send {
    /// Owned copy of the value at `field`
    fn get(
        &self,
        field: &FieldRef,
    ) -> Option<Value>;

    /// Writes `value`, creating intermediate objects as needed
    fn set(
        &mut self,
        field: &FieldRef,
        value: Value,
    ) -> Result<()>;

    fn includes(
        &self,
        field: &FieldRef,
    ) -> bool;
}
