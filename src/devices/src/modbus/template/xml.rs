//! Document model of the persisted template.
//!
//! Every attribute is kept as optional text here; defaults, enum parsing and
//! validation happen while the typed template is built.
//!
//! Lists pick up only children with the expected name (`ElemGroup`, `Elem`,
//! `Cmd`), wherever they appear among their siblings. Other elements are
//! skipped.

use common::error::Cause;
use serde::{Deserialize, Serialize};

use super::{cmd::Cmd, elem_group::ElemGroup, settings::Settings, DeviceTemplate};

pub(super) const ROOT: &str = "DevTemplate";
pub(super) const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename = "DevTemplate")]
pub(super) struct DevTemplateXml {
    #[serde(rename = "Settings", skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsXml>,
    #[serde(rename = "ElemGroups", skip_serializing_if = "Option::is_none")]
    pub elem_groups: Option<ElemGroupsXml>,
    #[serde(rename = "Cmds", skip_serializing_if = "Option::is_none")]
    pub cmds: Option<CmdsXml>,
}

// Settings are written as child elements; attributes of the same name are
// accepted on read.
#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct SettingsXml {
    #[serde(rename = "@ZeroAddr", skip_serializing_if = "Option::is_none")]
    pub zero_addr_attr: Option<String>,
    #[serde(rename = "@DecAddr", skip_serializing_if = "Option::is_none")]
    pub dec_addr_attr: Option<String>,
    #[serde(rename = "@DefByteOrder", skip_serializing_if = "Option::is_none")]
    pub def_byte_order_attr: Option<String>,

    #[serde(rename = "ZeroAddr", skip_serializing_if = "Option::is_none")]
    pub zero_addr: Option<String>,
    #[serde(rename = "DecAddr", skip_serializing_if = "Option::is_none")]
    pub dec_addr: Option<String>,
    #[serde(rename = "DefByteOrder", skip_serializing_if = "Option::is_none")]
    pub def_byte_order: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct ElemGroupsXml {
    #[serde(rename = "ElemGroup", default)]
    pub items: Vec<ElemGroupXml>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct ElemGroupXml {
    #[serde(rename = "@active", skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(rename = "@tableType", skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[serde(rename = "@address", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Elem", default)]
    pub elems: Vec<ElemXml>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct ElemXml {
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(rename = "@byteOrder", skip_serializing_if = "Option::is_none")]
    pub byte_order: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct CmdsXml {
    #[serde(rename = "Cmd", default)]
    pub items: Vec<CmdXml>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub(super) struct CmdXml {
    #[serde(rename = "@tableType", skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[serde(rename = "@multiple", skip_serializing_if = "Option::is_none")]
    pub multiple: Option<String>,
    #[serde(rename = "@address", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "@elemType", skip_serializing_if = "Option::is_none")]
    pub elem_type: Option<String>,
    #[serde(rename = "@elemCnt", skip_serializing_if = "Option::is_none")]
    pub elem_cnt: Option<String>,
    #[serde(rename = "@byteOrder", skip_serializing_if = "Option::is_none")]
    pub byte_order: Option<String>,
    #[serde(rename = "@cmdNum", skip_serializing_if = "Option::is_none")]
    pub cmd_num: Option<String>,
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn parse_bool(
    name: &'static str,
    value: Option<&str>,
    default: bool,
) -> Result<bool, Cause> {
    let Some(value) = present(value) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

pub(super) fn parse_int(
    name: &'static str,
    value: Option<&str>,
    default: i32,
) -> Result<i32, Cause> {
    match present(value) {
        Some(value) => value.parse().map_err(|_| invalid(name, value)),
        None => Ok(default),
    }
}

/// Case-insensitive enum attribute, `None` when absent or blank.
pub(super) fn parse_enum<T>(name: &'static str, value: Option<&str>) -> Result<Option<T>, Cause>
where
    T: for<'a> TryFrom<&'a str>,
{
    match present(value) {
        Some(value) => T::try_from(value)
            .map(Some)
            .map_err(|_| invalid(name, value)),
        None => Ok(None),
    }
}

pub(super) fn require<T>(name: &'static str, value: Option<T>) -> Result<T, Cause> {
    value.ok_or(Cause::MissingAttr { name })
}

fn invalid(name: &'static str, value: &str) -> Cause {
    Cause::InvalidAttr {
        name,
        value: value.to_owned(),
    }
}

fn bool_text(value: bool) -> String {
    match value {
        true => "true".to_owned(),
        false => "false".to_owned(),
    }
}

impl From<&Settings> for SettingsXml {
    fn from(settings: &Settings) -> Self {
        SettingsXml {
            zero_addr: Some(bool_text(settings.zero_addr)),
            dec_addr: Some(bool_text(settings.dec_addr)),
            def_byte_order: Some(settings.def_byte_order_str().to_owned()),
            ..Default::default()
        }
    }
}

impl From<&ElemGroup> for ElemGroupXml {
    fn from(elem_group: &ElemGroup) -> Self {
        // Bit tables are implicitly single-bit, so type and byte order are
        // only persisted for registers.
        let write_elem_type = elem_group.table_type().is_register();
        ElemGroupXml {
            active: Some(bool_text(elem_group.active)),
            table_type: Some(elem_group.table_type().to_string()),
            address: Some(elem_group.address.to_string()),
            name: Some(elem_group.name.clone()),
            elems: elem_group
                .elems
                .iter()
                .map(|elem| ElemXml {
                    name: Some(elem.name.clone()),
                    typ: write_elem_type.then(|| elem.elem_type.to_string()),
                    byte_order: write_elem_type.then(|| elem.byte_order_str().to_owned()),
                })
                .collect(),
        }
    }
}

impl From<&Cmd> for CmdXml {
    fn from(cmd: &Cmd) -> Self {
        CmdXml {
            table_type: Some(cmd.table_type().to_string()),
            multiple: Some(bool_text(cmd.multiple)),
            address: Some(cmd.address.to_string()),
            elem_type: Some(cmd.elem_type.to_string()),
            elem_cnt: Some(cmd.elem_cnt.to_string()),
            byte_order: cmd
                .byte_order_enabled()
                .then(|| cmd.byte_order_str().to_owned()),
            cmd_num: Some(cmd.cmd_num.to_string()),
            name: Some(cmd.name.clone()),
        }
    }
}

impl From<&DeviceTemplate> for DevTemplateXml {
    fn from(template: &DeviceTemplate) -> Self {
        DevTemplateXml {
            settings: Some(SettingsXml::from(&template.settings)),
            elem_groups: Some(ElemGroupsXml {
                items: template.elem_groups.iter().map(ElemGroupXml::from).collect(),
            }),
            cmds: Some(CmdsXml {
                items: template.cmds.iter().map(CmdXml::from).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use types::devices::modbus::{ElemType, TableType};

    use super::*;
    use crate::modbus::template::Elem;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("active", None, true).unwrap());
        assert!(!parse_bool("active", Some(""), false).unwrap());
        assert!(!parse_bool("active", Some("False"), true).unwrap());
        assert!(parse_bool("active", Some(" TRUE "), false).unwrap());
        assert!(matches!(
            parse_bool("active", Some("yes"), true),
            Err(Cause::InvalidAttr { name: "active", .. })
        ));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("elemCnt", None, 1).unwrap(), 1);
        assert_eq!(parse_int("address", Some("40"), 0).unwrap(), 40);
        assert_eq!(parse_int("address", Some("-3"), 0).unwrap(), -3);
        assert!(parse_int("address", Some("0x10"), 0).is_err());
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(
            parse_enum::<TableType>("tableType", Some("coils")).unwrap(),
            Some(TableType::Coils)
        );
        assert_eq!(parse_enum::<ElemType>("type", Some(" ")).unwrap(), None);
        assert!(parse_enum::<ElemType>("type", Some("real")).is_err());
        assert!(matches!(
            require::<TableType>("tableType", None),
            Err(Cause::MissingAttr { name: "tableType" })
        ));
    }

    #[test]
    fn test_coil_elems_omit_type() {
        let mut elem_group = ElemGroup::new(TableType::Coils);
        elem_group.elems.push(Elem::new("relay", ElemType::Bool));
        let xml = ElemGroupXml::from(&elem_group);
        assert_eq!(xml.elems[0].typ, None);
        assert_eq!(xml.elems[0].byte_order, None);
        assert_eq!(xml.table_type.as_deref(), Some("Coils"));
        assert_eq!(xml.active.as_deref(), Some("true"));
    }
}
