//! Physical units.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{ChangeSignal, Deserializable, ObjectRef, Serializable, Watchable};
use crate::util::Result;
use crate::wire::{read_struct, FieldSpec, TypeTag, WireReader, WireWriter};

const FIELDS: &[FieldSpec] = &[FieldSpec::new("unitstr", TypeTag::String)];

/// A physical unit kept as its textual form, e.g. `m`, `A`, `m/s`.
///
/// The empty string is the dimensionless unit.
#[derive(Debug, Default)]
pub struct SiUnit {
    unit: RefCell<String>,
    changed: ChangeSignal,
}

impl SiUnit {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: RefCell::new(unit.into()),
            changed: ChangeSignal::new(),
        }
    }

    pub fn unit_string(&self) -> String {
        self.unit.borrow().clone()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.borrow().is_empty()
    }

    /// Change the unit; emits the change signal only if it differs.
    pub fn set_unit_string(&self, unit: &str) {
        if *self.unit.borrow() == unit {
            return;
        }
        *self.unit.borrow_mut() = unit.to_owned();
        self.emit_changed();
    }

    /// Units compare by their textual form.
    pub fn equal(&self, other: &SiUnit) -> bool {
        *self.unit.borrow() == *other.unit.borrow()
    }
}

impl Serializable for SiUnit {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        writer.field_str("unitstr", &self.unit.borrow())
    }

    fn duplicate(&self) -> Result<ObjectRef> {
        Ok(Rc::new(Self::new(self.unit_string())))
    }
}

impl Watchable for SiUnit {
    fn changed_signal(&self) -> &ChangeSignal {
        &self.changed
    }
}

impl Deserializable for SiUnit {
    const TYPE_NAME: &'static str = "SiUnit";

    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut fields = read_struct(reader, FIELDS)?;
        Ok(Self::new(fields.take_string("unitstr").unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_same_unit_is_silent() {
        let unit = SiUnit::new("m");
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        unit.changed_signal().connect(move |_| c.set(c.get() + 1));

        unit.set_unit_string("m");
        assert_eq!(count.get(), 0);
        unit.set_unit_string("A");
        assert_eq!(count.get(), 1);
        assert!(unit.equal(&SiUnit::new("A")));
    }

    #[test]
    fn test_missing_field_is_dimensionless() {
        let mut reader = WireReader::new(&[]);
        let unit = SiUnit::deserialize(&mut reader).unwrap();
        assert!(unit.is_dimensionless());
    }
}
