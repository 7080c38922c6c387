//! List of strings.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{ChangeSignal, Deserializable, ObjectRef, Serializable, Watchable};
use crate::util::Result;
use crate::wire::{read_struct, FieldSpec, TypeTag, WireReader, WireWriter};

const FIELDS: &[FieldSpec] = &[FieldSpec::new("strings", TypeTag::StringArray)];

/// Ordered list of strings, e.g. recent file names or channel titles.
#[derive(Debug, Default)]
pub struct StringList {
    strings: RefCell<Vec<String>>,
    changed: ChangeSignal,
}

impl StringList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: RefCell::new(strings.into_iter().map(Into::into).collect()),
            changed: ChangeSignal::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<String> {
        self.strings.borrow().get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.strings.borrow().clone()
    }

    /// Append a string and emit the change signal.
    pub fn append(&self, s: impl Into<String>) {
        self.strings.borrow_mut().push(s.into());
        self.emit_changed();
    }

    /// Replace the string at `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, s: impl Into<String>) -> bool {
        {
            let mut strings = self.strings.borrow_mut();
            match strings.get_mut(index) {
                Some(slot) => *slot = s.into(),
                None => return false,
            }
        }
        self.emit_changed();
        true
    }

    pub fn clear(&self) {
        if self.is_empty() {
            return;
        }
        self.strings.borrow_mut().clear();
        self.emit_changed();
    }
}

impl Serializable for StringList {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        writer.field_str_array("strings", &self.strings.borrow()[..])
    }

    fn duplicate(&self) -> Result<ObjectRef> {
        Ok(Rc::new(Self::from_strings(self.to_vec())))
    }
}

impl Watchable for StringList {
    fn changed_signal(&self) -> &ChangeSignal {
        &self.changed
    }
}

impl Deserializable for StringList {
    const TYPE_NAME: &'static str = "StringList";

    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut fields = read_struct(reader, FIELDS)?;
        Ok(Self::from_strings(
            fields.take_string_array("strings").unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_mutation_emits_changed() {
        let list = StringList::from_strings(["a"]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        list.changed_signal().connect(move |_| c.set(c.get() + 1));

        list.append("b");
        assert!(list.set(0, "z"));
        assert!(!list.set(5, "nope"));
        assert_eq!(list.to_vec(), vec!["z", "b"]);
        assert_eq!(count.get(), 2);
    }
}
