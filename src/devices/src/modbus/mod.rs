pub mod template;

pub use template::{
    ByteOrder, ByteOrderOwner, Cmd, DeviceTemplate, Diagnostic, Elem, ElemGroup, LoadReport,
    SaveOptions, Settings,
};
