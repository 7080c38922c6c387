//! Named parameter sets.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::{ChangeSignal, Deserializable, Serializable, Watchable};
use crate::inventory::{codec_copy, InventoryItem, ItemType};
use crate::util::Result;
use crate::wire::{read_struct, FieldSpec, TypeTag, WireReader, WireWriter};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", TypeTag::String),
    FieldSpec::new("params", TypeTag::DoubleArray),
];

/// A named list of numeric parameters, such as a fit preset or a false
/// color map definition.
///
/// Presets shipped with the application are marked fixed; fixed presets
/// cannot be renamed or deleted from an inventory. The flag is not
/// serialized, so copies are always editable.
///
/// The name is changed only through [`Inventory::rename`], which keeps
/// the inventory's name index and order in step:
///
/// ```compile_fail
/// use gwystore::objects::Preset;
///
/// let preset = Preset::new("Gauss", vec![1.0]);
/// preset.set_name("Zeta");
/// ```
///
/// [`Inventory::rename`]: crate::inventory::Inventory::rename
#[derive(Debug, Default)]
pub struct Preset {
    name: RefCell<String>,
    params: RefCell<Vec<f64>>,
    fixed: Cell<bool>,
    changed: ChangeSignal,
}

impl Preset {
    pub fn new(name: impl Into<String>, params: Vec<f64>) -> Self {
        Self {
            name: RefCell::new(name.into()),
            params: RefCell::new(params),
            fixed: Cell::new(false),
            changed: ChangeSignal::new(),
        }
    }

    /// A preset that cannot be renamed or deleted.
    pub fn fixed(name: impl Into<String>, params: Vec<f64>) -> Self {
        let preset = Self::new(name, params);
        preset.fixed.set(true);
        preset
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.get()
    }

    pub fn name_string(&self) -> String {
        self.name.borrow().clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_owned();
        self.emit_changed();
    }

    pub fn params(&self) -> Vec<f64> {
        self.params.borrow().clone()
    }

    pub fn set_params(&self, params: Vec<f64>) {
        *self.params.borrow_mut() = params;
        self.emit_changed();
    }

    /// Item type for inventories of presets: sorted by name, renamable,
    /// copied through the wire codec, fixed presets protected.
    pub fn item_type() -> ItemType<Rc<Preset>> {
        ItemType::by_name()
            .with_rename(|preset: &mut Rc<Preset>, name: &str| preset.set_name(name))
            .with_copy(codec_copy::<Preset>)
            .with_fixed(|preset: &Rc<Preset>| preset.is_fixed())
    }
}

impl InventoryItem for Preset {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.name_string())
    }
}

impl Serializable for Preset {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        writer.field_str("name", &self.name.borrow())?;
        writer.field_f64_array("params", &self.params.borrow())
    }
}

impl Watchable for Preset {
    fn changed_signal(&self) -> &ChangeSignal {
        &self.changed
    }
}

impl Deserializable for Preset {
    const TYPE_NAME: &'static str = "Preset";

    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut fields = read_struct(reader, FIELDS)?;
        Ok(Self::new(
            fields.take_string("name").unwrap_or_default(),
            fields.take_f64_array("params").unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Inventory;

    #[test]
    fn test_preset_inventory() {
        let mut inv = Inventory::new(Preset::item_type());
        inv.insert(Rc::new(Preset::fixed("Linear", vec![0.0, 1.0])))
            .unwrap();
        inv.insert(Rc::new(Preset::new("Gauss", vec![1.0, 2.0, 3.0])))
            .unwrap();

        let pos = inv.new_item(Some("Linear"), None).unwrap();
        let copy = inv.get_nth(pos).unwrap();
        assert_eq!(copy.name_string(), "Linear 2");
        assert_eq!(copy.params(), vec![0.0, 1.0]);
        assert!(!copy.is_fixed());
        assert!(!Rc::ptr_eq(copy, inv.get("Linear").unwrap()));

        assert!(inv.delete("Linear").is_err());
        inv.rename("Linear 2", "Aaa").unwrap();
        assert_eq!(inv.names(), vec!["Aaa", "Gauss", "Linear"]);
        assert!(inv.delete("Aaa").is_ok());
    }

    #[test]
    fn test_rename_keeps_names_unique() {
        let mut inv = Inventory::new(Preset::item_type());
        inv.insert(Rc::new(Preset::new("Gauss", vec![1.0]))).unwrap();
        inv.insert(Rc::new(Preset::new("Linear", vec![0.0]))).unwrap();

        let changes = Rc::new(Cell::new(0));
        let c = Rc::clone(&changes);
        inv.get("Gauss")
            .unwrap()
            .changed_signal()
            .connect(move |_| c.set(c.get() + 1));

        inv.rename("Gauss", "Zeta").unwrap();
        assert_eq!(changes.get(), 1);
        assert!(inv.get("Gauss").is_none());
        assert_eq!(inv.get("Zeta").unwrap().name_string(), "Zeta");
        assert_eq!(inv.names(), vec!["Linear", "Zeta"]);

        assert!(matches!(
            inv.insert(Rc::new(Preset::new("Zeta", vec![]))),
            Err(crate::util::Error::DuplicateName(_))
        ));
        assert_eq!(inv.len(), 2);
    }
}
