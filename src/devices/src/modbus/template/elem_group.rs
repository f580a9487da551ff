use serde::Serialize;
use types::devices::modbus::{ElemType, TableType};

use super::byte_order::ByteOrder;

/// One data point of an element group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Elem {
    pub name: String,
    pub elem_type: ElemType,

    pub(crate) byte_order: Option<ByteOrder>,
    pub(crate) byte_order_str: String,
}

impl Elem {
    pub fn new(name: impl Into<String>, elem_type: ElemType) -> Self {
        Self {
            name: name.into(),
            elem_type,
            byte_order: None,
            byte_order_str: String::new(),
        }
    }

    /// Effective byte order, possibly inherited from the template settings.
    pub fn byte_order(&self) -> Option<&ByteOrder> {
        self.byte_order.as_ref()
    }

    /// Byte order as written in the template, empty when inherited.
    pub fn byte_order_str(&self) -> &str {
        &self.byte_order_str
    }

    pub fn set_byte_order_str(&mut self, text: impl Into<String>) {
        self.byte_order_str = text.into();
        self.byte_order = ByteOrder::parse(&self.byte_order_str);
    }

    pub fn set_byte_order(&mut self, byte_order: Option<ByteOrder>) {
        self.byte_order_str = ByteOrder::format(byte_order.as_ref());
        self.byte_order = byte_order;
    }

    pub fn quantity(&self) -> usize {
        self.elem_type.quantity()
    }
}

/// Elements read from one table with a single request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElemGroup {
    table_type: TableType,
    pub name: String,
    pub address: u16,
    pub active: bool,
    /// Decode order of the values returned for the group.
    pub elems: Vec<Elem>,

    pub(crate) start_tag_index: usize,
    pub(crate) start_signal: usize,
}

impl ElemGroup {
    pub fn new(table_type: TableType) -> Self {
        Self {
            table_type,
            name: String::new(),
            address: 0,
            active: true,
            elems: vec![],
            start_tag_index: 0,
            start_signal: 0,
        }
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn default_elem_type(&self) -> ElemType {
        self.table_type.default_elem_type()
    }

    pub fn max_elem_cnt(&self) -> usize {
        self.table_type.max_elem_cnt()
    }

    /// Whether the group can be polled: at least one element and no more than
    /// the table allows in one request.
    pub fn has_valid_size(&self) -> bool {
        (1..=self.max_elem_cnt()).contains(&self.elems.len())
    }

    /// 0-based index of the group's first tag, assigned on load.
    pub fn start_tag_index(&self) -> usize {
        self.start_tag_index
    }

    /// 1-based signal number of the group's first element, assigned on load.
    pub fn start_signal(&self) -> usize {
        self.start_signal
    }

    /// Registers (or bits) covered by the group.
    pub fn register_count(&self) -> usize {
        match self.table_type.is_register() {
            true => self.elems.iter().map(Elem::quantity).sum(),
            false => self.elems.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group() {
        let group = ElemGroup::new(TableType::Coils);
        assert_eq!(group.table_type(), TableType::Coils);
        assert!(group.active);
        assert_eq!(group.default_elem_type(), ElemType::Bool);
        assert_eq!(group.max_elem_cnt(), 2000);
        assert!(!group.has_valid_size());
    }

    #[test]
    fn test_valid_size() {
        let mut group = ElemGroup::new(TableType::InputRegisters);
        group.elems = (0..125)
            .map(|i| Elem::new(format!("e{}", i), ElemType::UShort))
            .collect();
        assert!(group.has_valid_size());
        group.elems.push(Elem::new("extra", ElemType::UShort));
        assert!(!group.has_valid_size());
    }

    #[test]
    fn test_register_count() {
        let mut group = ElemGroup::new(TableType::HoldingRegisters);
        group.elems.push(Elem::new("a", ElemType::UShort));
        group.elems.push(Elem::new("b", ElemType::Float));
        group.elems.push(Elem::new("c", ElemType::Double));
        assert_eq!(group.register_count(), 7);

        let mut group = ElemGroup::new(TableType::DiscreteInputs);
        group.elems.push(Elem::new("a", ElemType::Bool));
        group.elems.push(Elem::new("b", ElemType::Bool));
        assert_eq!(group.register_count(), 2);
    }

    #[test]
    fn test_elem_byte_order() {
        let mut elem = Elem::new("flow", ElemType::Float);
        elem.set_byte_order_str("2,3,0,1");
        assert_eq!(elem.byte_order().unwrap().as_slice(), &[2, 3, 0, 1]);

        elem.set_byte_order(None);
        assert_eq!(elem.byte_order_str(), "");
        assert_eq!(elem.byte_order(), None);
    }
}
