//! One-dimensional sampled data.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::core::{downcast_object, ChangeSignal, Deserializable, Serializable, Watchable};
use crate::util::{Error, Result};
use crate::wire::{read_struct, FieldSpec, TypeTag, WireReader, WireWriter};

use super::SiUnit;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("res", TypeTag::Int32),
    FieldSpec::new("real", TypeTag::Double),
    FieldSpec::new("off", TypeTag::Double),
    FieldSpec::new("data", TypeTag::DoubleArray),
    FieldSpec::new("si_unit_x", TypeTag::Object),
    FieldSpec::new("si_unit_y", TypeTag::Object),
];

/// Evenly sampled profile with physical length and units.
///
/// Has no native duplicate: copies go through encode then decode, which
/// also copies the unit objects.
#[derive(Debug)]
pub struct DataLine {
    data: RefCell<Vec<f64>>,
    real: Cell<f64>,
    offset: Cell<f64>,
    si_unit_x: Rc<SiUnit>,
    si_unit_y: Rc<SiUnit>,
    changed: ChangeSignal,
}

impl DataLine {
    /// Zero-filled line of `res` samples spanning `real`.
    pub fn new(res: usize, real: f64) -> Self {
        Self::from_data(vec![0.0; res], real)
    }

    pub fn from_data(data: Vec<f64>, real: f64) -> Self {
        Self {
            data: RefCell::new(data),
            real: Cell::new(real),
            offset: Cell::new(0.0),
            si_unit_x: Rc::new(SiUnit::default()),
            si_unit_y: Rc::new(SiUnit::default()),
            changed: ChangeSignal::new(),
        }
    }

    /// Number of samples.
    pub fn res(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn real(&self) -> f64 {
        self.real.get()
    }

    pub fn set_real(&self, real: f64) {
        self.real.set(real);
    }

    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    pub fn set_offset(&self, offset: f64) {
        self.offset.set(offset);
    }

    pub fn data(&self) -> Ref<'_, Vec<f64>> {
        self.data.borrow()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.data.borrow().get(i).copied()
    }

    /// Modify the samples in place; length changes are allowed.
    ///
    /// Does not emit the change signal; call
    /// [`Watchable::emit_changed`] when done with a batch of edits.
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut Vec<f64>) -> R) -> R {
        f(&mut self.data.borrow_mut())
    }

    pub fn si_unit_x(&self) -> &Rc<SiUnit> {
        &self.si_unit_x
    }

    pub fn si_unit_y(&self) -> &Rc<SiUnit> {
        &self.si_unit_y
    }

    pub fn sum(&self) -> f64 {
        self.data.borrow().iter().sum()
    }
}

impl Serializable for DataLine {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        let data = self.data.borrow();
        let res = i32::try_from(data.len()).map_err(|_| Error::FrameTooLarge(data.len()))?;
        writer.field_i32("res", res)?;
        writer.field_f64("real", self.real())?;
        if self.offset() != 0.0 {
            writer.field_f64("off", self.offset())?;
        }
        writer.field_f64_array("data", &data)?;
        writer.field_object("si_unit_x", &*self.si_unit_x)?;
        writer.field_object("si_unit_y", &*self.si_unit_y)
    }
}

impl Watchable for DataLine {
    fn changed_signal(&self) -> &ChangeSignal {
        &self.changed
    }
}

fn take_unit(fields: &mut crate::wire::StructFields, name: &str) -> Result<Rc<SiUnit>> {
    match fields.take_object(name) {
        None => Ok(Rc::new(SiUnit::default())),
        Some(obj) => downcast_object::<SiUnit>(&obj).ok_or_else(|| {
            Error::invalid_data(
                DataLine::TYPE_NAME,
                format!("{name} is a {}, not a SiUnit", obj.type_name()),
            )
        }),
    }
}

impl Deserializable for DataLine {
    const TYPE_NAME: &'static str = "DataLine";

    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut fields = read_struct(reader, FIELDS)?;

        let res = fields
            .i32("res")
            .ok_or_else(|| Error::invalid_data(Self::TYPE_NAME, "missing res"))?;
        let data = fields
            .take_f64_array("data")
            .ok_or_else(|| Error::invalid_data(Self::TYPE_NAME, "missing data"))?;
        if usize::try_from(res).ok() != Some(data.len()) {
            return Err(Error::invalid_data(
                Self::TYPE_NAME,
                format!("res {res} does not match {} samples", data.len()),
            ));
        }
        let real = fields.f64("real").unwrap_or(1.0);

        let si_unit_x = take_unit(&mut fields, "si_unit_x")?;
        let si_unit_y = take_unit(&mut fields, "si_unit_y")?;

        Ok(Self {
            data: RefCell::new(data),
            real: Cell::new(real),
            offset: Cell::new(fields.f64("off").unwrap_or(0.0)),
            si_unit_x,
            si_unit_y,
            changed: ChangeSignal::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{downcast_object, ObjectRef};
    use crate::wire::{self, WireWriter};

    #[test]
    fn test_codec_duplicate_is_deep() {
        let line = DataLine::from_data(vec![1.0, 2.0, 3.0], 3e-6);
        line.si_unit_x().set_unit_string("m");
        line.set_offset(0.5);
        let original: ObjectRef = Rc::new(line);

        let copy = wire::duplicate_object(&original).unwrap();
        assert!(!Rc::ptr_eq(&original, &copy));

        let a = downcast_object::<DataLine>(&original).unwrap();
        let b = downcast_object::<DataLine>(&copy).unwrap();
        assert_eq!(*b.data(), vec![1.0, 2.0, 3.0]);
        assert_eq!(b.real(), 3e-6);
        assert_eq!(b.offset(), 0.5);
        assert_eq!(b.si_unit_x().unit_string(), "m");
        assert!(!Rc::ptr_eq(a.si_unit_x(), b.si_unit_x()));

        a.with_data_mut(|d| d[0] = 100.0);
        assert_eq!(b.get(0), Some(1.0));
    }

    #[test]
    fn test_any_real_survives_codec() {
        for real in [0.0, -2.5] {
            let line: ObjectRef = Rc::new(DataLine::new(4, real));
            let copy = wire::duplicate_object(&line).unwrap();
            assert_eq!(downcast_object::<DataLine>(&copy).unwrap().real(), real);
        }

        let line: ObjectRef = Rc::new(DataLine::new(2, f64::NAN));
        let copy = wire::duplicate_object(&line).unwrap();
        assert!(downcast_object::<DataLine>(&copy).unwrap().real().is_nan());
    }

    #[test]
    fn test_res_mismatch_rejected() {
        let mut w = WireWriter::new();
        w.field_i32("res", 4).unwrap();
        w.field_f64("real", 1.0).unwrap();
        w.field_f64_array("data", &[1.0, 2.0]).unwrap();
        let bytes = w.into_bytes();

        let err = DataLine::deserialize(&mut WireReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::InvalidData { type_name: "DataLine", .. }));
    }

    #[test]
    fn test_wrong_unit_type_rejected() {
        let mut w = WireWriter::new();
        w.field_i32("res", 1).unwrap();
        w.field_f64_array("data", &[1.0]).unwrap();
        w.field_object("si_unit_x", &crate::objects::StringList::new())
            .unwrap();
        let bytes = w.into_bytes();

        assert!(DataLine::deserialize(&mut WireReader::new(&bytes)).is_err());
    }
}
