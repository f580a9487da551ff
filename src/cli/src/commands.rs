use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use common::config::Config;
use devices::modbus::{DeviceTemplate, LoadReport, SaveOptions};
use tracing::{info, warn};

#[derive(clap::Subcommand)]
pub enum Command {
    /// Load a template and report what was accepted and what was dropped.
    Check { file: PathBuf },
    /// Print the element groups and commands of a template.
    Show {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Load a template and write it back in canonical form.
    Normalize { input: PathBuf, output: PathBuf },
}

pub fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Check { file } => {
            let (template, report) = load(&file)?;
            print!("{}", summary(&template, &report));
        }
        Command::Show { file, json } => {
            let (template, _) = load(&file)?;
            match json {
                true => println!(
                    "{}",
                    serde_json::to_string_pretty(&template).context("could not serialize template")?
                ),
                false => print!("{}", tables(&template)),
            }
        }
        Command::Normalize { input, output } => {
            let (template, _) = load(&input)?;
            let options = SaveOptions {
                indent: config.save.indent,
            };
            template.save_with(&output, &options)?;
            info!(?input, ?output, "template normalized");
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<(DeviceTemplate, LoadReport)> {
    let mut template = DeviceTemplate::new();
    let report = template.load(path)?;
    for diagnostic in &report.diagnostics {
        warn!(%diagnostic, ?path, "template loaded with warnings");
    }
    Ok((template, report))
}

fn summary(template: &DeviceTemplate, report: &LoadReport) -> String {
    let elem_cnt: usize = template.elem_groups.iter().map(|g| g.elems.len()).sum();
    let mut out = format!(
        "element groups: {} ({} active)\nelements: {}\ncommands: {}\n",
        template.elem_groups.len(),
        template.active_elem_groups().count(),
        elem_cnt,
        template.cmds.len(),
    );
    if !report.diagnostics.is_empty() {
        out.push_str("warnings:\n");
        for diagnostic in &report.diagnostics {
            out.push_str(&format!("  {}\n", diagnostic));
        }
    }
    out
}

fn tables(template: &DeviceTemplate) -> String {
    let settings = &template.settings;

    let mut groups = Table::new();
    groups
        .set_header(vec!["Group", "Table", "Address", "Elements", "Signal", "Active"])
        .set_content_arrangement(ContentArrangement::Dynamic);
    for elem_group in &template.elem_groups {
        let elems = elem_group
            .elems
            .iter()
            .map(|e| format!("{} ({})", e.name, e.elem_type))
            .collect::<Vec<_>>()
            .join("\n");
        groups.add_row(vec![
            elem_group.name.clone(),
            elem_group.table_type().to_string(),
            settings.address_range(elem_group.address, elem_group.register_count()),
            elems,
            elem_group.start_signal().to_string(),
            elem_group.active.to_string(),
        ]);
    }

    let mut cmds = Table::new();
    cmds.set_header(vec!["Number", "Command", "Table", "Address", "Type", "Count", "Byte order"])
        .set_content_arrangement(ContentArrangement::Dynamic);
    for cmd in &template.cmds {
        cmds.add_row(vec![
            cmd.cmd_num.to_string(),
            cmd.name.clone(),
            cmd.table_type().to_string(),
            settings.address_range(cmd.address, cmd.register_count()),
            cmd.elem_type.to_string(),
            cmd.elem_cnt.to_string(),
            cmd.byte_order()
                .map(|b| b.to_string())
                .unwrap_or_default(),
        ]);
    }

    format!("{}\n{}\n", groups, cmds)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const TEMPLATE: &str = r#"<DevTemplate>
      <ElemGroups>
        <ElemGroup tableType="HoldingRegisters" address="0" name="Meters">
          <Elem name="Voltage" type="float" />
        </ElemGroup>
        <ElemGroup tableType="Coils" address="0" name="Empty" />
      </ElemGroups>
      <Cmds>
        <Cmd tableType="Coils" address="4" cmdNum="3" name="Start" />
      </Cmds>
    </DevTemplate>"#;

    #[test]
    fn test_summary() {
        let mut template = DeviceTemplate::new();
        let report = template.load_from_str(TEMPLATE).unwrap();
        let out = summary(&template, &report);
        assert!(out.starts_with("element groups: 1 (1 active)\nelements: 1\ncommands: 1\n"));
        assert!(out.contains("warnings:\n  element group #1 dropped"));
    }

    #[test]
    fn test_tables() {
        let mut template = DeviceTemplate::new();
        template.load_from_str(TEMPLATE).unwrap();
        let out = tables(&template);
        assert!(out.contains("Meters"));
        assert!(out.contains("1-2"));
        assert!(out.contains("Voltage (float)"));
        assert!(out.contains("Start"));
    }

    #[test]
    fn test_normalize() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xml");
        let output = dir.path().join("out.xml");
        fs::write(&input, TEMPLATE).unwrap();

        let mut config = Config::default();
        config.save.indent = 4;
        run(
            Command::Normalize {
                input,
                output: output.clone(),
            },
            &config,
        )
        .unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("\n    <ElemGroups>"));
        assert!(!text.contains("Empty"));
    }

    #[test]
    fn test_check_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            Command::Check {
                file: dir.path().join("missing.xml"),
            },
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("failed to load template"));
    }
}
