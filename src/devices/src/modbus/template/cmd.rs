use serde::Serialize;
use types::devices::modbus::{ElemType, TableType};

use super::byte_order::ByteOrder;

/// A write operation the driver performs on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cmd {
    table_type: TableType,
    /// Write multiple coils/registers instead of a single one.
    pub multiple: bool,
    pub elem_cnt: usize,
    pub elem_type: ElemType,
    pub address: u16,
    pub name: String,
    /// User facing number the command is looked up by.
    pub cmd_num: u16,

    pub(crate) byte_order: Option<ByteOrder>,
    pub(crate) byte_order_str: String,
}

impl Cmd {
    /// An `elem_cnt` of 0 is raised to 1, the smallest count a command can write.
    pub fn new(table_type: TableType, multiple: bool, elem_cnt: usize) -> Self {
        Self {
            table_type,
            multiple,
            elem_cnt: elem_cnt.max(1),
            elem_type: table_type.default_elem_type(),
            address: 0,
            name: String::new(),
            cmd_num: 0,
            byte_order: None,
            byte_order_str: String::new(),
        }
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn default_elem_type(&self) -> ElemType {
        self.table_type.default_elem_type()
    }

    /// A byte order only matters when register bytes have to be arranged:
    /// multi-register writes or values wider than one register.
    pub fn byte_order_enabled(&self) -> bool {
        match self.table_type {
            TableType::DiscreteInputs | TableType::Coils => false,
            TableType::InputRegisters | TableType::HoldingRegisters => {
                self.multiple || self.elem_type.quantity() > 1
            }
        }
    }

    pub fn byte_order(&self) -> Option<&ByteOrder> {
        self.byte_order.as_ref()
    }

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

    /// Registers (or coils) written by the command.
    pub fn register_count(&self) -> usize {
        match self.table_type.is_register() {
            true => self.elem_cnt * self.elem_type.quantity(),
            false => self.elem_cnt,
        }
    }
}
