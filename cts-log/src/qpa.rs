//! Test log (`.qpa`) parsing.
//!
//! A log is a sequence of `#`-prefixed control lines. Each test case result
//! is an XML document between `#beginTestCaseResult <name>` and
//! `#endTestCaseResult`, or is cut short by `#terminateTestCaseResult
//! <reason>`.

use log::{debug, warn};
use xml::reader::{EventReader, XmlEvent};

use crate::error::LogError;

/// Status of a case whose result section never ended.
pub const STATUS_CRASH: &str = "Crash";
/// Status of a case whose result XML could not be read.
pub const STATUS_INTERNAL_ERROR: &str = "InternalError";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    pub name: String,
    pub status: String,
    pub details: String,
}

impl TestCaseResult {
    pub fn is_allowed(&self) -> bool {
        ALLOWED_STATUSES.contains(&self.status.as_str())
    }
}

/// Statuses that count as passing for conformance.
pub const ALLOWED_STATUSES: &[&str] = &["Pass", "NotSupported", "QualityWarning", "CompatibilityWarning", "Waiver"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestLog {
    /// `#sessionInfo` key/value pairs in log order.
    pub session_info: Vec<(String, String)>,
    pub results: Vec<TestCaseResult>,
}

/// Status code and text of the `<Result>` element.
fn parse_result_xml(body: &str) -> Result<(String, String), String> {
    let mut in_result = false;
    let mut status = None;
    let mut details = String::new();
    for event in EventReader::new(body.as_bytes()) {
        match event.map_err(|e| e.to_string())? {
            XmlEvent::StartElement { name, attributes, .. } if name.local_name == "Result" => {
                in_result = true;
                status = attributes
                    .into_iter()
                    .find(|a| a.name.local_name == "StatusCode")
                    .map(|a| a.value);
            }
            XmlEvent::Characters(text) if in_result => details.push_str(&text),
            XmlEvent::EndElement { name } if name.local_name == "Result" => in_result = false,
            _ => {}
        }
    }
    match status {
        Some(status) => Ok((status, details.trim().to_string())),
        None => Err(String::from("no Result element with a StatusCode")),
    }
}

struct OpenCase {
    name: String,
    body: String,
}

fn finish(open: OpenCase) -> TestCaseResult {
    match parse_result_xml(&open.body) {
        Ok((status, details)) => TestCaseResult {
            name: open.name,
            status,
            details,
        },
        Err(message) => {
            warn!("{}: {}", open.name, message);
            TestCaseResult {
                name: open.name,
                status: String::from(STATUS_INTERNAL_ERROR),
                details: message,
            }
        }
    }
}

fn crashed(open: OpenCase) -> TestCaseResult {
    warn!("{}: result was not completed", open.name);
    TestCaseResult {
        name: open.name,
        status: String::from(STATUS_CRASH),
        details: String::from("Incomplete test case result"),
    }
}

pub fn parse(text: &str) -> Result<TestLog, LogError> {
    let mut log = TestLog::default();
    let mut open: Option<OpenCase> = None;

    for (i, line) in text.lines().enumerate() {
        let err = |message: &str| LogError::ParseError {
            line: i + 1,
            message: message.to_string(),
        };
        let trimmed = line.trim_end();
        if let Some(rest) = trimmed.strip_prefix("#beginTestCaseResult ") {
            if let Some(previous) = open.take() {
                log.results.push(crashed(previous));
            }
            open = Some(OpenCase {
                name: rest.trim().to_string(),
                body: String::new(),
            });
        } else if trimmed == "#endTestCaseResult" {
            let case = open.take().ok_or_else(|| err("#endTestCaseResult without a test case"))?;
            log.results.push(finish(case));
        } else if let Some(reason) = trimmed.strip_prefix("#terminateTestCaseResult") {
            let case = open
                .take()
                .ok_or_else(|| err("#terminateTestCaseResult without a test case"))?;
            log.results.push(TestCaseResult {
                name: case.name,
                status: reason.trim().to_string(),
                details: String::new(),
            });
        } else if let Some(info) = trimmed.strip_prefix("#sessionInfo ") {
            let (key, value) = info.split_once(' ').unwrap_or((info, ""));
            log.session_info.push((key.to_string(), value.trim().to_string()));
        } else if let Some(case) = open.as_mut() {
            case.body.push_str(line);
            case.body.push('\n');
        } else if !trimmed.is_empty() {
            debug!("ignoring line {}: {}", i + 1, trimmed);
        }
    }
    if let Some(case) = open {
        log.results.push(crashed(case));
    }
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_element() {
        let body = r#"<?xml version="1.0"?>
<TestCaseResult Version="0.3.4" CasePath="a.b" CaseType="SelfValidate">
<Text>something</Text>
<Result StatusCode="Fail">Got 3, expected 4</Result>
</TestCaseResult>"#;
        assert_eq!(
            parse_result_xml(body),
            Ok((String::from("Fail"), String::from("Got 3, expected 4")))
        );
        assert!(parse_result_xml("<TestCaseResult></TestCaseResult>").is_err());
        assert!(parse_result_xml("<TestCaseResult><Res").is_err());
    }
}
