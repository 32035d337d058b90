use cts_mustpass::Hierarchy;

/// Drops the declaration and indentation and unifies empty elements.
fn normalize(xml: &str) -> String {
    let body = match xml.find("?>") {
        Some(i) => &xml[i + 2..],
        None => xml,
    };
    body.lines()
        .map(str::trim)
        .collect::<String>()
        .replace(" />", "/>")
}

#[test]
fn single_case() {
    let tree = Hierarchy::parse("GROUP: G\nGROUP: G.A\nTEST: G.A.case1\n").unwrap();
    assert_eq!(
        normalize(&tree.to_cts_xml("dEQP-VK").unwrap()),
        "<TestPackage name=\"dEQP-VK\">\
         <TestSuite name=\"G\"><TestSuite name=\"A\"><TestCase name=\"A\"><Test name=\"case1\"/></TestCase></TestSuite></TestSuite>\
         </TestPackage>"
    );
}

#[test]
fn empty_groups_are_skipped() {
    let tree = Hierarchy::parse("GROUP: G\nGROUP: G.empty\nGROUP: G.empty.deeper\nGROUP: G.A\nTEST: G.A.t\n").unwrap();
    let xml = tree.to_cts_xml("p").unwrap();
    assert!(!xml.contains("empty"));
    assert!(!xml.contains("deeper"));
    assert!(xml.contains("<Test name=\"t\""));
}

#[test]
fn every_test_is_a_leaf_once() {
    let text = "GROUP: a\nTEST: a.x\nGROUP: a.b\nTEST: a.b.y\nTEST: a.b.z\nGROUP: c\nTEST: c.w\n";
    let tree = Hierarchy::parse(text).unwrap();
    assert_eq!(tree.test_count(), 4);
    let mut paths = tree.test_paths();
    paths.sort();
    assert_eq!(paths, ["a.b.y", "a.b.z", "a.x", "c.w"]);
    let xml = tree.to_cts_xml("p").unwrap();
    assert_eq!(xml.matches("<Test ").count(), 4);
}

#[test]
fn output_is_deterministic() {
    let text = "GROUP: a\nGROUP: a.b\nTEST: a.b.one\nTEST: a.b.two\nGROUP: a.c\nTEST: a.c.three\n";
    let first = Hierarchy::parse(text).unwrap().to_cts_xml("p").unwrap();
    let second = Hierarchy::parse(text).unwrap().to_cts_xml("p").unwrap();
    assert_eq!(first, second);
    assert!(first.find("one").unwrap() < first.find("two").unwrap());
    assert!(first.find("two").unwrap() < first.find("three").unwrap());
}

#[test]
fn attributes_are_escaped() {
    let tree = Hierarchy::parse("GROUP: g\nTEST: g.a<b>&\"c\"\n").unwrap();
    let xml = tree.to_cts_xml("p").unwrap();
    assert!(xml.contains("a&lt;b&gt;&amp;&quot;c&quot;"), "{}", xml);
}

#[test]
fn bad_input_is_rejected() {
    assert!(Hierarchy::parse("GROUP: g\nSOMETHING: g.x\n").is_err());
    assert!(Hierarchy::parse("TEST: lonely\n").is_err());
    assert!(Hierarchy::parse("GROUP: g\nTEST: g.x\nTEST: g.x\n").is_err());
}
