//! Per-package mustpass outputs: filtered case lists, `mustpass.xml` and
//! `AndroidTest.xml`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::case_list::{read_lines, write_lines};
use crate::error::{Error, IoContext};
use crate::filter::apply_filters;
use crate::project::{Configuration, Module, Package, Project};

pub const RUNNER_CLASS: &str = "com.drawelements.deqp.runner.DeqpTestRunner";
pub const APK_NAME: &str = "com.drawelements.deqp.apk";

/// File name of the case list for `config`, e.g. `vk-default.txt`.
pub fn case_list_file_name(module: &Module, config: &Configuration) -> String {
    format!("{}.txt", case_list_stem(module, config))
}

fn case_list_stem(module: &Module, config: &Configuration) -> String {
    format!("{}-{}", module.api.to_lowercase(), config.name)
}

/// Native test runner arguments for `config`.
pub fn command_line(config: &Configuration) -> String {
    let mut args = Vec::new();
    if let Some(glconfig) = &config.glconfig {
        args.push(format!("--deqp-gl-config-name={}", glconfig));
    }
    if let Some(rotation) = &config.rotation {
        args.push(format!("--deqp-screen-rotation={}", rotation));
    }
    if let Some(surface) = &config.surfacetype {
        args.push(format!("--deqp-surface-type={}", surface));
    }
    args.push(String::from("--deqp-watchdog=disable"));
    args.join(" ")
}

/// Groups cases by their top-level group, in order of first appearance.
pub fn split_by_group(cases: &[String]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut index = HashMap::new();
    for case in cases {
        let mut parts = case.split('.');
        let first = parts.next().unwrap_or_default();
        let group = parts.next().unwrap_or(first);
        let i = *index.entry(group.to_string()).or_insert_with(|| {
            groups.push((group.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(case.clone());
    }
    groups
}

fn xml_writer(out: &mut Vec<u8>) -> EventWriter<&mut Vec<u8>> {
    EmitterConfig::new()
        .perform_indent(true)
        .indent_string("\t")
        .create_writer(out)
}

fn into_string(out: Vec<u8>) -> String {
    let mut text = String::from_utf8_lossy(&out).into_owned();
    text.push('\n');
    text
}

pub fn mustpass_xml(project: &Project, package: &Package) -> Result<String, Error> {
    let mut out = Vec::new();
    {
        let mut w = xml_writer(&mut out);
        w.write(XmlEvent::start_element("Mustpass").attr("version", &project.version))?;
        w.write(XmlEvent::start_element("TestPackage").attr("name", &package.module.name))?;
        for config in &package.configurations {
            let file = case_list_file_name(&package.module, config);
            let cmd = command_line(config);
            w.write(
                XmlEvent::start_element("Configuration")
                    .attr("caseListFile", &file)
                    .attr("commandLine", &cmd)
                    .attr("name", &config.name),
            )?;
            w.write(XmlEvent::end_element())?;
        }
        w.write(XmlEvent::end_element())?;
        w.write(XmlEvent::end_element())?;
    }
    Ok(into_string(out))
}

fn option(w: &mut EventWriter<&mut Vec<u8>>, name: &str, value: &str) -> Result<(), Error> {
    w.write(XmlEvent::start_element("option").attr("name", name).attr("value", value))?;
    w.write(XmlEvent::end_element())?;
    Ok(())
}

/// Tradefed configuration running every default configuration of `package`.
pub fn android_test_xml(package: &Package) -> Result<String, Error> {
    let mut out = Vec::new();
    {
        let mut w = xml_writer(&mut out);
        let description = format!("Config for CTS {} test cases", package.module.name);
        w.write(XmlEvent::start_element("configuration").attr("description", &description))?;
        option(&mut w, "test-suite-tag", "cts")?;
        w.write(
            XmlEvent::start_element("option")
                .attr("name", "config-descriptor:metadata")
                .attr("key", "component")
                .attr("value", "deqp"),
        )?;
        w.write(XmlEvent::end_element())?;

        w.write(
            XmlEvent::start_element("target_preparer")
                .attr("class", "com.android.tradefed.targetprep.suite.SuiteApkInstaller"),
        )?;
        option(&mut w, "cleanup-apks", "true")?;
        option(&mut w, "test-file-name", APK_NAME)?;
        w.write(XmlEvent::end_element())?;

        for config in package.configurations.iter().filter(|c| c.run_by_default) {
            w.write(XmlEvent::start_element("test").attr("class", RUNNER_CLASS))?;
            option(&mut w, "deqp-package", &package.module.name)?;
            option(
                &mut w,
                "deqp-caselist-file",
                &case_list_file_name(&package.module, config),
            )?;
            if let Some(glconfig) = &config.glconfig {
                option(&mut w, "deqp-gl-config-name", glconfig)?;
            }
            if let Some(surface) = &config.surfacetype {
                option(&mut w, "deqp-surface-type", surface)?;
            }
            if let Some(rotation) = &config.rotation {
                option(&mut w, "deqp-screen-rotation", rotation)?;
            }
            if let Some(runtime) = &config.runtime {
                option(&mut w, "runtime-hint", runtime)?;
            }
            if config.required {
                option(&mut w, "deqp-config-required", "true")?;
            }
            w.write(XmlEvent::end_element())?;
        }
        w.write(XmlEvent::end_element())?;
    }
    Ok(into_string(out))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub name: String,
    pub total: usize,
    pub kept: usize,
    pub unused_patterns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub name: String,
    pub dir: PathBuf,
    pub configurations: Vec<ConfigReport>,
}

fn write_case_lists(dir: &Path, stem: &str, cases: &[String], split: bool) -> Result<(), Error> {
    let main = dir.join(format!("{}.txt", stem));
    if !split {
        return write_lines(&main, cases);
    }
    let mut files = Vec::new();
    for (group, group_cases) in split_by_group(cases) {
        let name = format!("{}/{}.txt", stem, group);
        write_lines(&dir.join(&name), &group_cases)?;
        files.push(name);
    }
    write_lines(&main, &files)
}

pub fn build_package(project: &Project, package: &Package) -> Result<PackageReport, Error> {
    let module = &package.module;
    info!("Building mustpass for {}", module.name);
    let cases = read_lines(&project.src_root.join(&module.case_list))?;
    let dir = project.dst_root.join(&module.name);
    fs::create_dir_all(&dir).at(&dir)?;

    let mut reports = Vec::new();
    for config in &package.configurations {
        let filters = project.load_filters(config)?;
        let (kept, usage) = apply_filters(&cases, &filters);
        usage.warn_unused(&filters);
        info!("  {}: {} of {} cases", config.name, kept.len(), cases.len());
        write_case_lists(&dir, &case_list_stem(module, config), &kept, config.split)?;
        reports.push(ConfigReport {
            name: config.name.clone(),
            total: cases.len(),
            kept: kept.len(),
            unused_patterns: usage.unused(&filters).count(),
        });
    }

    let path = dir.join("mustpass.xml");
    debug!("Writing {}", path.display());
    fs::write(&path, mustpass_xml(project, package)?).at(&path)?;
    let path = dir.join("AndroidTest.xml");
    debug!("Writing {}", path.display());
    fs::write(&path, android_test_xml(package)?).at(&path)?;

    Ok(PackageReport {
        name: module.name.clone(),
        dir,
        configurations: reports,
    })
}

pub fn build(project: &Project) -> Result<Vec<PackageReport>, Error> {
    project
        .packages
        .iter()
        .map(|package| build_package(project, package))
        .collect()
}
