use cts_log::csv::{quote, write_csv};
use cts_log::qpa::{STATUS_CRASH, STATUS_INTERNAL_ERROR};
use cts_log::{parse, verify};

const LOG: &str = r#"#sessionInfo releaseName git-1234
#sessionInfo targetName "Android"
#beginSession
#beginTestCaseResult dEQP-VK.api.smoke.create_sampler
<?xml version="1.0" encoding="UTF-8"?>
<TestCaseResult Version="0.3.4" CasePath="dEQP-VK.api.smoke.create_sampler" CaseType="SelfValidate">
 <Result StatusCode="Pass">Pass</Result>
</TestCaseResult>

#endTestCaseResult
#beginTestCaseResult dEQP-VK.api.smoke.triangle
<?xml version="1.0" encoding="UTF-8"?>
<TestCaseResult Version="0.3.4" CasePath="dEQP-VK.api.smoke.triangle" CaseType="SelfValidate">
 <Text>Comparing images</Text>
 <Result StatusCode="Fail">Image comparison failed, 12 pixels differ</Result>
</TestCaseResult>

#endTestCaseResult
#beginTestCaseResult dEQP-VK.api.smoke.timeout
<?xml version="1.0" encoding="UTF-8"?>
<TestCaseResult Version="0.3.4" CasePath="dEQP-VK.api.smoke.timeout" CaseType="SelfValidate">
#terminateTestCaseResult Timeout
#beginTestCaseResult dEQP-VK.info.device
<?xml version="1.0" encoding="UTF-8"?>
<TestCaseResult Version="0.3.4" CasePath="dEQP-VK.info.device" CaseType="SelfValidate">
 <Result StatusCode="NotSupported">VK_KHR_foo not supported</Result>
</TestCaseResult>

#endTestCaseResult
#beginTestCaseResult dEQP-VK.info.crash
<?xml version="1.0" encoding="UTF-8"?>
#beginTestCaseResult dEQP-VK.info.broken
<TestCaseResult>
#endTestCaseResult
#endSession
"#;

#[test]
fn parses_results_in_order() {
    let log = parse(LOG).unwrap();
    assert_eq!(log.session_info[0], ("releaseName".to_string(), "git-1234".to_string()));
    let summary: Vec<(&str, &str)> = log
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.status.as_str()))
        .collect();
    assert_eq!(
        summary,
        [
            ("dEQP-VK.api.smoke.create_sampler", "Pass"),
            ("dEQP-VK.api.smoke.triangle", "Fail"),
            ("dEQP-VK.api.smoke.timeout", "Timeout"),
            ("dEQP-VK.info.device", "NotSupported"),
            ("dEQP-VK.info.crash", STATUS_CRASH),
            ("dEQP-VK.info.broken", STATUS_INTERNAL_ERROR),
        ]
    );
    assert_eq!(log.results[1].details, "Image comparison failed, 12 pixels differ");
}

#[test]
fn unmatched_end_is_an_error() {
    assert!(parse("#beginSession\n#endTestCaseResult\n").is_err());
    assert!(parse("#terminateTestCaseResult Crash\n").is_err());
}

#[test]
fn csv_rows() {
    let log = parse(LOG).unwrap();
    let mut out = Vec::new();
    let rows = write_csv(&mut out, &log.results, false).unwrap();
    assert_eq!(rows, 6);
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("case,status,details"));
    assert_eq!(lines.next(), Some("dEQP-VK.api.smoke.create_sampler,Pass,Pass"));
    assert_eq!(
        lines.next(),
        Some("dEQP-VK.api.smoke.triangle,Fail,\"Image comparison failed, 12 pixels differ\"")
    );

    let mut out = Vec::new();
    assert_eq!(write_csv(&mut out, &log.results, true).unwrap(), 4);
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("create_sampler"));
    assert!(!text.contains("info.device"));
}

#[test]
fn quoting() {
    assert_eq!(quote("plain"), "plain");
    assert_eq!(quote("a,b"), "\"a,b\"");
    assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
}

#[test]
fn verify_against_must_pass() {
    let log = parse(LOG).unwrap();
    let must_pass: Vec<String> = [
        "dEQP-VK.api.smoke.create_sampler",
        "dEQP-VK.api.smoke.triangle",
        "dEQP-VK.info.device",
        "dEQP-VK.info.never_run",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let v = verify(&log, &must_pass);
    assert!(!v.is_ok());
    assert_eq!(v.passed, 2);
    assert_eq!(v.missing, ["dEQP-VK.info.never_run"]);
    assert_eq!(
        v.unexpected,
        ["dEQP-VK.api.smoke.timeout", "dEQP-VK.info.crash", "dEQP-VK.info.broken"]
    );
    assert_eq!(v.failed.len(), 1);
    assert_eq!(v.failed[0].name, "dEQP-VK.api.smoke.triangle");
    assert!(v.to_string().ends_with("2 passed, 1 failed, 1 missing, 3 unexpected"));
}

#[test]
fn rerun_result_replaces_earlier_one() {
    let log = parse(
        "#beginTestCaseResult a.b\n#terminateTestCaseResult Crash\n\
         #beginTestCaseResult a.b\n<TestCaseResult><Result StatusCode=\"Pass\">ok</Result></TestCaseResult>\n#endTestCaseResult\n",
    )
    .unwrap();
    let v = verify(&log, &["a.b".to_string()]);
    assert!(v.is_ok(), "{}", v);
    assert_eq!(v.passed, 1);
}
