//! Integration tests for inventories of shared object items.

use std::cell::RefCell;
use std::rc::Rc;

use gwystore::objects::Preset;
use gwystore::{Error, Inventory, InventoryEvent, ValueStore};

fn builtin_presets() -> Inventory<Rc<Preset>> {
    let presets = vec![
        Rc::new(Preset::new("Custom", vec![2.0])),
        Rc::new(Preset::fixed("Gaussian", vec![0.0, 1.0])),
        Rc::new(Preset::fixed("Lorentzian", vec![0.0, 1.0])),
    ];
    Inventory::with_items(Preset::item_type(), presets).expect("Failed to build inventory")
}

#[test]
fn test_presets_sorted_on_build() {
    let inv = builtin_presets();
    assert!(inv.is_sorted());
    assert_eq!(inv.names(), vec!["Custom", "Gaussian", "Lorentzian"]);
}

#[test]
fn test_unsorted_build_keeps_order() {
    let presets = vec![
        Rc::new(Preset::fixed("Gaussian", vec![0.0, 1.0])),
        Rc::new(Preset::new("Custom", vec![2.0])),
    ];
    let mut inv = Inventory::with_items(Preset::item_type(), presets).unwrap();
    assert!(!inv.is_sorted());
    assert_eq!(inv.names(), vec!["Gaussian", "Custom"]);

    // Unsorted inventories append
    assert_eq!(inv.insert(Rc::new(Preset::new("Alpha", vec![]))).unwrap(), 2);

    inv.restore_order();
    assert!(inv.is_sorted());
    assert_eq!(inv.names(), vec!["Alpha", "Custom", "Gaussian"]);
}

#[test]
fn test_copy_rename_delete_cycle() {
    let mut inv = builtin_presets();
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    inv.connect(move |e| l.borrow_mut().push(e.clone()));

    // Copy of a fixed preset is editable
    let pos = inv.new_item(Some("Gaussian"), Some("Wide")).unwrap();
    assert_eq!(inv.names(), vec!["Custom", "Gaussian", "Lorentzian", "Wide"]);
    assert_eq!(pos, 3);
    assert!(!inv.get("Wide").unwrap().is_fixed());

    inv.rename("Wide", "Broad").unwrap();
    assert_eq!(inv.names(), vec!["Broad", "Custom", "Gaussian", "Lorentzian"]);

    assert!(matches!(inv.rename("Gaussian", "G"), Err(Error::FixedItem(_))));
    assert!(matches!(inv.delete("Lorentzian"), Err(Error::FixedItem(_))));
    assert!(matches!(inv.rename("Broad", "Custom"), Err(Error::DuplicateName(_))));

    let removed = inv.delete("Broad").unwrap();
    assert_eq!(removed.name_string(), "Broad");

    let events = log.borrow();
    assert_eq!(events.first(), Some(&InventoryEvent::Inserted(3)));
    assert!(matches!(events[1], InventoryEvent::Reordered(_)));
    assert_eq!(events[2], InventoryEvent::Updated(0));
    assert_eq!(events.last(), Some(&InventoryEvent::Deleted(0)));
}

#[test]
fn test_default_item() {
    let mut inv = builtin_presets();
    assert!(inv.default_item().is_none());

    inv.set_default_name(Some("Gaussian"));
    assert_eq!(inv.get_or_default(Some("nope")).unwrap().name_string(), "Gaussian");
    assert_eq!(inv.get_or_default(Some("Custom")).unwrap().name_string(), "Custom");

    // Copy from the default when no source is named
    inv.new_item(None, None).unwrap();
    assert!(inv.contains("Gaussian 2"));
}

#[test]
fn test_presets_stored_in_store() {
    let inv = builtin_presets();
    let mut store = ValueStore::new();
    for (i, preset) in inv.iter().enumerate() {
        store.set_object(format!("/presets/{i}").as_str(), Rc::clone(preset));
    }

    let back = ValueStore::deserialize(&store.serialize().unwrap()).unwrap();
    let restored: Vec<Rc<Preset>> = back
        .keys_with_prefix(Some("/presets"))
        .into_iter()
        .map(|k| back.get_object_as::<Preset, _>(k).unwrap())
        .collect();

    // The fixed flag does not survive serialization
    let rebuilt = Inventory::with_items(Preset::item_type(), restored).unwrap();
    assert_eq!(rebuilt.names(), inv.names());
    assert!(rebuilt.iter().all(|p| !p.is_fixed()));
}
