use std::fmt;

use serde::{Deserialize, Serialize};

/// The four address spaces of a modbus device.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableType {
    DiscreteInputs,   // bit, read only
    Coils,            // bit, read/write
    InputRegisters,   // 16-bit word, read only
    HoldingRegisters, // 16-bit word, read/write
}

impl TableType {
    pub const ALL: [TableType; 4] = [
        TableType::DiscreteInputs,
        TableType::Coils,
        TableType::InputRegisters,
        TableType::HoldingRegisters,
    ];

    /// Element type used when a template does not name one.
    pub fn default_elem_type(&self) -> ElemType {
        match self {
            TableType::DiscreteInputs | TableType::Coils => ElemType::Bool,
            TableType::InputRegisters | TableType::HoldingRegisters => ElemType::UShort,
        }
    }

    /// Largest number of elements a single read request may cover.
    pub fn max_elem_cnt(&self) -> usize {
        match self {
            TableType::DiscreteInputs | TableType::Coils => 2000,
            TableType::InputRegisters | TableType::HoldingRegisters => 125,
        }
    }

    pub fn is_register(&self) -> bool {
        match self {
            TableType::DiscreteInputs | TableType::Coils => false,
            TableType::InputRegisters | TableType::HoldingRegisters => true,
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            TableType::DiscreteInputs | TableType::InputRegisters => false,
            TableType::Coils | TableType::HoldingRegisters => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::DiscreteInputs => "DiscreteInputs",
            TableType::Coils => "Coils",
            TableType::InputRegisters => "InputRegisters",
            TableType::HoldingRegisters => "HoldingRegisters",
        }
    }
}

impl TryFrom<&str> for TableType {
    type Error = ();

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discreteinputs" => Ok(TableType::DiscreteInputs),
            "coils" => Ok(TableType::Coils),
            "inputregisters" => Ok(TableType::InputRegisters),
            "holdingregisters" => Ok(TableType::HoldingRegisters),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a single template element.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElemType {
    Undefined,
    UShort,
    Short,
    UInt,
    Int,
    ULong,
    Long,
    Float,
    Double,
    Bool,
}

impl ElemType {
    /// Number of 16-bit registers the value occupies.
    pub fn quantity(&self) -> usize {
        match self {
            ElemType::Undefined | ElemType::UShort | ElemType::Short | ElemType::Bool => 1,
            ElemType::UInt | ElemType::Int | ElemType::Float => 2,
            ElemType::ULong | ElemType::Long | ElemType::Double => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElemType::Undefined => "undefined",
            ElemType::UShort => "ushort",
            ElemType::Short => "short",
            ElemType::UInt => "uint",
            ElemType::Int => "int",
            ElemType::ULong => "ulong",
            ElemType::Long => "long",
            ElemType::Float => "float",
            ElemType::Double => "double",
            ElemType::Bool => "bool",
        }
    }
}

impl TryFrom<&str> for ElemType {
    type Error = ();

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "undefined" => Ok(ElemType::Undefined),
            "ushort" => Ok(ElemType::UShort),
            "short" => Ok(ElemType::Short),
            "uint" => Ok(ElemType::UInt),
            "int" => Ok(ElemType::Int),
            "ulong" => Ok(ElemType::ULong),
            "long" => Ok(ElemType::Long),
            "float" => Ok(ElemType::Float),
            "double" => Ok(ElemType::Double),
            "bool" => Ok(ElemType::Bool),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_type_parse_ignores_case() {
        assert_eq!(
            TableType::try_from("holdingregisters"),
            Ok(TableType::HoldingRegisters)
        );
        assert_eq!(TableType::try_from(" Coils "), Ok(TableType::Coils));
        assert_eq!(TableType::try_from("coil"), Err(()));

        for table_type in TableType::ALL {
            assert_eq!(TableType::try_from(table_type.as_str()), Ok(table_type));
        }
    }

    #[test]
    fn test_table_type_defaults() {
        assert_eq!(TableType::Coils.default_elem_type(), ElemType::Bool);
        assert_eq!(TableType::DiscreteInputs.default_elem_type(), ElemType::Bool);
        assert_eq!(TableType::InputRegisters.default_elem_type(), ElemType::UShort);
        assert_eq!(TableType::Coils.max_elem_cnt(), 2000);
        assert_eq!(TableType::HoldingRegisters.max_elem_cnt(), 125);
        assert!(!TableType::InputRegisters.is_writable());
        assert!(TableType::HoldingRegisters.is_register());
    }

    #[test]
    fn test_elem_type() {
        assert_eq!(ElemType::try_from("Float"), Ok(ElemType::Float));
        assert_eq!(ElemType::try_from("ULONG"), Ok(ElemType::ULong));
        assert_eq!(ElemType::try_from("float32"), Err(()));
        assert_eq!(ElemType::Double.quantity(), 4);
        assert_eq!(ElemType::Int.quantity(), 2);
        assert_eq!(ElemType::Bool.to_string(), "bool");
    }
}
