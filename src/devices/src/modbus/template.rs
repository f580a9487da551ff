//! Modbus device template: which tables, addresses and value types a device
//! exposes, and which write commands it accepts.

use std::{fmt, fs, path::Path};

use common::error::{Cause, TemplateError, TemplateResult};
use serde::Serialize;
use tracing::{debug, warn};
use types::devices::modbus::{ElemType, TableType};

mod byte_order;
mod cmd;
mod elem_group;
mod settings;
mod xml;

pub use byte_order::ByteOrder;
pub use cmd::Cmd;
pub use elem_group::{Elem, ElemGroup};
pub use settings::Settings;

use xml::{CmdXml, DevTemplateXml, ElemGroupXml, ElemXml, SettingsXml};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeviceTemplate {
    pub settings: Settings,
    pub elem_groups: Vec<ElemGroup>,
    pub cmds: Vec<Cmd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Spaces per nesting level; 0 writes the document on one line.
    pub indent: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Problems that were tolerated while loading a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The group had no elements or more than the table allows; its tag
    /// indices were not consumed.
    GroupDropped {
        position: usize,
        elem_cnt: usize,
        max: usize,
    },
    /// The command number was outside `1..=65535`.
    CmdDropped { position: usize, cmd_num: i32 },
    ByteOrderIgnored { owner: ByteOrderOwner, text: String },
    ElemCntNormalized { position: usize, value: i32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::GroupDropped {
                position,
                elem_cnt,
                max,
            } => write!(
                f,
                "element group #{} dropped: {} elements, expected 1 to {}",
                position, elem_cnt, max
            ),
            Diagnostic::CmdDropped { position, cmd_num } => write!(
                f,
                "command #{} dropped: command number {} is out of range",
                position, cmd_num
            ),
            Diagnostic::ByteOrderIgnored { owner, text } => write!(
                f,
                "{} byte order `{}` is malformed and was ignored",
                owner, text
            ),
            Diagnostic::ElemCntNormalized { position, value } => write!(
                f,
                "command #{} element count {} replaced by 1",
                position, value
            ),
        }
    }
}

/// Document position of the element or command a byte order was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrderOwner {
    Elem { group: usize, elem: usize },
    Cmd { position: usize },
}

impl fmt::Display for ByteOrderOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrderOwner::Elem { group, elem } => {
                write!(f, "element group #{} element #{}", group, elem)
            }
            ByteOrderOwner::Cmd { position } => write!(f, "command #{}", position),
        }
    }
}

struct Loaded {
    settings: Settings,
    elem_groups: Vec<ElemGroup>,
    cmds: Vec<Cmd>,
}

impl DeviceTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_to_default(&mut self) {
        self.settings.set_to_default();
        self.elem_groups.clear();
        self.cmds.clear();
    }

    /// First command with the given number, in document order.
    pub fn find_cmd(&self, cmd_num: u16) -> Option<&Cmd> {
        self.cmds.iter().find(|cmd| cmd.cmd_num == cmd_num)
    }

    pub fn active_elem_groups(&self) -> impl Iterator<Item = &ElemGroup> {
        self.elem_groups.iter().filter(|elem_group| elem_group.active)
    }

    /// Replaces the groups and commands with copies of those in `src`.
    /// Settings are left untouched.
    ///
    /// Parsed byte orders are shared with `src` rather than duplicated, see
    /// [`ByteOrder::shares_storage_with`].
    pub fn copy_from(&mut self, src: &DeviceTemplate) {
        self.elem_groups.clear();
        self.cmds.clear();
        self.elem_groups.extend(src.elem_groups.iter().cloned());
        self.cmds.extend(src.cmds.iter().cloned());
    }

    /// Loads the template from a file, replacing all current content.
    ///
    /// On failure the template is left reset to its defaults.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TemplateResult<LoadReport> {
        let path = path.as_ref();
        self.set_to_default();
        let report = fs::read_to_string(path)
            .map_err(Cause::from)
            .and_then(|text| self.load_xml(&text))
            .map_err(TemplateError::Load)?;
        debug!(
            ?path,
            elem_groups = self.elem_groups.len(),
            cmds = self.cmds.len(),
            "device template loaded"
        );
        Ok(report)
    }

    pub fn load_from_str(&mut self, text: &str) -> TemplateResult<LoadReport> {
        self.set_to_default();
        self.load_xml(text).map_err(TemplateError::Load)
    }

    fn load_xml(&mut self, text: &str) -> Result<LoadReport, Cause> {
        let doc: DevTemplateXml =
            quick_xml::de::from_str(text).map_err(|e| Cause::Xml(e.to_string()))?;
        let mut report = LoadReport::default();
        let loaded = Loaded::build(doc, &mut report.diagnostics)?;
        self.settings = loaded.settings;
        self.elem_groups = loaded.elem_groups;
        self.cmds = loaded.cmds;
        Ok(report)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> TemplateResult<()> {
        self.save_with(path, &SaveOptions::default())
    }

    /// Writes the template to a file. A failed write may leave a truncated
    /// file behind.
    pub fn save_with(&self, path: impl AsRef<Path>, options: &SaveOptions) -> TemplateResult<()> {
        let path = path.as_ref();
        let text = self.to_xml_string(options)?;
        fs::write(path, text).map_err(|e| TemplateError::Save(e.into()))?;
        debug!(?path, "device template saved");
        Ok(())
    }

    pub fn to_xml_string(&self, options: &SaveOptions) -> TemplateResult<String> {
        let doc = DevTemplateXml::from(self);
        let mut text = String::from(xml::DECLARATION);
        text.push('\n');
        let mut ser = quick_xml::se::Serializer::with_root(&mut text, Some(xml::ROOT))
            .map_err(|e| TemplateError::Save(Cause::Xml(e.to_string())))?;
        if options.indent > 0 {
            ser.indent(' ', options.indent);
        }
        doc.serialize(ser)
            .map_err(|e| TemplateError::Save(Cause::Xml(e.to_string())))?;
        text.push('\n');
        Ok(text)
    }
}

impl Loaded {
    fn build(doc: DevTemplateXml, diagnostics: &mut Vec<Diagnostic>) -> Result<Self, Cause> {
        let settings = match &doc.settings {
            Some(settings) => load_settings(settings)?,
            None => Settings::default(),
        };

        let elem_groups = match doc.elem_groups {
            Some(elem_groups) => load_elem_groups(elem_groups.items, &settings, diagnostics)?,
            None => vec![],
        };

        let cmds = match doc.cmds {
            Some(cmds) => load_cmds(cmds.items, &settings, diagnostics)?,
            None => vec![],
        };

        Ok(Self {
            settings,
            elem_groups,
            cmds,
        })
    }
}

fn load_settings(raw: &SettingsXml) -> Result<Settings, Cause> {
    let mut settings = Settings::default();
    settings.zero_addr = xml::parse_bool(
        "ZeroAddr",
        raw.zero_addr.as_deref().or(raw.zero_addr_attr.as_deref()),
        false,
    )?;
    settings.dec_addr = xml::parse_bool(
        "DecAddr",
        raw.dec_addr.as_deref().or(raw.dec_addr_attr.as_deref()),
        true,
    )?;
    settings.set_def_byte_order_str(
        raw.def_byte_order
            .as_deref()
            .or(raw.def_byte_order_attr.as_deref())
            .unwrap_or_default(),
    );
    Ok(settings)
}

/// Parsed byte order of an element or command, falling back to the template
/// default. The default is shared, not copied.
fn resolve_byte_order(
    owner: ByteOrderOwner,
    text: &str,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ByteOrder> {
    let parsed = ByteOrder::parse(text);
    if parsed.is_none() && !text.trim().is_empty() {
        warn!(%owner, text, "ignoring malformed byte order");
        diagnostics.push(Diagnostic::ByteOrderIgnored {
            owner,
            text: text.to_owned(),
        });
    }
    parsed.or_else(|| settings.def_byte_order().cloned())
}

fn load_elem_groups(
    raw: Vec<ElemGroupXml>,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<ElemGroup>, Cause> {
    // Tag indices are handed out only to accepted groups.
    let (elem_groups, _) = raw.into_iter().enumerate().try_fold(
        (Vec::new(), 0usize),
        |(mut elem_groups, tag_index), (position, raw)| -> Result<(Vec<ElemGroup>, usize), Cause> {
            let mut elem_group = load_elem_group(position, raw, settings, diagnostics)?;
            if !elem_group.has_valid_size() {
                warn!(
                    position,
                    name = %elem_group.name,
                    elem_cnt = elem_group.elems.len(),
                    "dropping element group with invalid element count"
                );
                diagnostics.push(Diagnostic::GroupDropped {
                    position,
                    elem_cnt: elem_group.elems.len(),
                    max: elem_group.max_elem_cnt(),
                });
                return Ok((elem_groups, tag_index));
            }

            elem_group.start_tag_index = tag_index;
            elem_group.start_signal = tag_index + 1;
            let next_tag_index = tag_index + elem_group.elems.len();
            elem_groups.push(elem_group);
            Ok((elem_groups, next_tag_index))
        },
    )?;
    Ok(elem_groups)
}

fn load_elem_group(
    position: usize,
    raw: ElemGroupXml,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<ElemGroup, Cause> {
    let table_type: TableType = xml::require(
        "tableType",
        xml::parse_enum("tableType", raw.table_type.as_deref())?,
    )?;
    let mut elem_group = ElemGroup::new(table_type);
    elem_group.name = raw.name.unwrap_or_default();
    // narrowed like a register address: only the low 16 bits are kept
    elem_group.address = xml::parse_int("address", raw.address.as_deref(), 0)? as u16;
    elem_group.active = xml::parse_bool("active", raw.active.as_deref(), true)?;
    elem_group.elems = raw
        .elems
        .into_iter()
        .enumerate()
        .map(|(elem, raw)| {
            let owner = ByteOrderOwner::Elem {
                group: position,
                elem,
            };
            load_elem(owner, raw, table_type, settings, diagnostics)
        })
        .collect::<Result<_, _>>()?;
    Ok(elem_group)
}

fn load_elem(
    owner: ByteOrderOwner,
    raw: ElemXml,
    table_type: TableType,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Elem, Cause> {
    let elem_type = match table_type.is_register() {
        true => xml::parse_enum("type", raw.typ.as_deref())?
            .unwrap_or_else(|| table_type.default_elem_type()),
        false => ElemType::Bool,
    };
    let mut elem = Elem::new(raw.name.unwrap_or_default(), elem_type);
    elem.byte_order_str = raw.byte_order.unwrap_or_default();
    elem.byte_order = resolve_byte_order(owner, &elem.byte_order_str, settings, diagnostics);
    Ok(elem)
}

fn load_cmds(
    raw: Vec<CmdXml>,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Cmd>, Cause> {
    let mut cmds = Vec::with_capacity(raw.len());
    for (position, raw) in raw.into_iter().enumerate() {
        let cmd_num = xml::parse_int("cmdNum", raw.cmd_num.as_deref(), 0)?;
        let mut cmd = load_cmd(position, raw, settings, diagnostics)?;
        match u16::try_from(cmd_num) {
            Ok(cmd_num) if cmd_num > 0 => {
                cmd.cmd_num = cmd_num;
                cmds.push(cmd);
            }
            _ => {
                warn!(position, cmd_num, "dropping command with invalid number");
                diagnostics.push(Diagnostic::CmdDropped { position, cmd_num });
            }
        }
    }
    Ok(cmds)
}

fn load_cmd(
    position: usize,
    raw: CmdXml,
    settings: &Settings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Cmd, Cause> {
    let table_type: TableType = xml::require(
        "tableType",
        xml::parse_enum("tableType", raw.table_type.as_deref())?,
    )?;
    let multiple = xml::parse_bool("multiple", raw.multiple.as_deref(), false)?;
    let elem_cnt = xml::parse_int("elemCnt", raw.elem_cnt.as_deref(), 1)?;
    let elem_cnt = match usize::try_from(elem_cnt) {
        Ok(elem_cnt) if elem_cnt > 0 => elem_cnt,
        _ => {
            warn!(position, elem_cnt, "command element count must be positive");
            diagnostics.push(Diagnostic::ElemCntNormalized {
                position,
                value: elem_cnt,
            });
            1
        }
    };

    let mut cmd = Cmd::new(table_type, multiple, elem_cnt);
    if table_type.is_register() {
        cmd.elem_type = xml::parse_enum("elemType", raw.elem_type.as_deref())?
            .unwrap_or_else(|| table_type.default_elem_type());
    }
    cmd.address = xml::parse_int("address", raw.address.as_deref(), 0)? as u16;
    cmd.name = raw.name.unwrap_or_default();

    if cmd.byte_order_enabled() {
        cmd.byte_order_str = raw.byte_order.unwrap_or_default();
        cmd.byte_order = resolve_byte_order(
            ByteOrderOwner::Cmd { position },
            &cmd.byte_order_str,
            settings,
            diagnostics,
        );
    }

    Ok(cmd)
}
