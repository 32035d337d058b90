use std::path::Path;

use cts_mustpass::{apply_filters, Filter, FilterKind};

/// Plain recursive `*`/`?` matcher.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (Some(b'*'), _) => {
            glob_match(&pattern[1..], text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        (Some(b'?'), Some(_)) => glob_match(&pattern[1..], &text[1..]),
        (Some(p), Some(t)) if p == t => glob_match(&pattern[1..], &text[1..]),
        _ => false,
    }
}

/// Kept cases and per-pattern match counts. Each filter only sees the cases
/// the earlier ones kept.
fn reference(cases: &[String], filters: &[(FilterKind, Vec<String>)]) -> (Vec<String>, Vec<Vec<usize>>) {
    let mut counts: Vec<Vec<usize>> = filters.iter().map(|(_, p)| vec![0; p.len()]).collect();
    let mut kept = Vec::new();
    for case in cases {
        let mut keep = true;
        for ((kind, patterns), counts) in filters.iter().zip(counts.iter_mut()) {
            if !keep {
                break;
            }
            let mut matched = false;
            for (pattern, count) in patterns.iter().zip(counts.iter_mut()) {
                if glob_match(pattern.as_bytes(), case.as_bytes()) {
                    *count += 1;
                    matched = true;
                }
            }
            keep = match kind {
                FilterKind::Include => matched,
                FilterKind::Exclude => !matched,
            };
        }
        if keep {
            kept.push(case.clone());
        }
    }
    (kept, counts)
}

/// Small deterministic generator so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

const WORDS: &[&str] = &["api", "draw", "info", "smoke", "basic", "copy"];

fn random_case(rng: &mut Lcg) -> String {
    let depth = 1 + rng.next(3);
    let mut case = String::from("dEQP-VK");
    for _ in 0..depth {
        case.push('.');
        case.push_str(WORDS[rng.next(WORDS.len())]);
    }
    case
}

fn random_pattern(rng: &mut Lcg) -> String {
    let mut pattern = random_case(rng);
    match rng.next(4) {
        0 => pattern.push_str(".*"),
        1 => {
            let i = rng.next(pattern.len());
            pattern.replace_range(i..i + 1, "?");
        }
        2 => pattern = format!("*{}", &pattern[pattern.len() - 3..]),
        _ => {}
    }
    pattern
}

#[test]
fn matches_reference_implementation() {
    let mut rng = Lcg(0x5eed);
    let source = Path::new("generated.txt");
    for _ in 0..200 {
        let cases: Vec<String> = (0..1 + rng.next(30)).map(|_| random_case(&mut rng)).collect();
        let mut specs = Vec::new();
        let mut filters = Vec::new();
        for _ in 0..rng.next(4) {
            let kind = if rng.next(2) == 0 { FilterKind::Include } else { FilterKind::Exclude };
            let patterns: Vec<String> = (0..1 + rng.next(4)).map(|_| random_pattern(&mut rng)).collect();
            let mut filter = Filter::new(kind);
            filter.add_text(&patterns.join("\n"), source).unwrap();
            filters.push(filter);
            specs.push((kind, patterns));
        }
        let (kept, usage) = apply_filters(&cases, &filters);
        let (expected, counts) = reference(&cases, &specs);
        assert_eq!(kept, expected, "cases {:?} filters {:?}", cases, specs);
        for (f, counts) in counts.iter().enumerate() {
            for (p, count) in counts.iter().enumerate() {
                assert_eq!(usage.count(f, p), *count, "filter {} pattern {} in {:?}", f, p, specs);
            }
        }
    }
}

#[test]
fn no_filters_keeps_everything_in_order() {
    let cases: Vec<String> = vec!["b".into(), "a".into(), "c".into()];
    let (kept, _) = apply_filters(&cases, &[]);
    assert_eq!(kept, cases);
}

#[test]
fn usage_counts_and_unused_patterns() {
    let source = Path::new("filters/default.txt");
    let cases: Vec<String> = ["dEQP-VK.api.a", "dEQP-VK.api.b", "dEQP-VK.draw.a"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut include = Filter::new(FilterKind::Include);
    include.add_text("dEQP-VK.api.*\ndEQP-VK.draw.a\n# comment\ndEQP-VK.gone\n", source).unwrap();
    let mut exclude = Filter::new(FilterKind::Exclude);
    exclude.add_text("dEQP-VK.api.b", source).unwrap();
    let filters = [include, exclude];

    let (kept, usage) = apply_filters(&cases, &filters);
    assert_eq!(kept, ["dEQP-VK.api.a", "dEQP-VK.draw.a"]);
    assert_eq!(filters[0].patterns().len(), 3);
    assert_eq!(usage.count(0, 0), 2);
    assert_eq!(usage.count(0, 1), 1);
    assert_eq!(usage.count(1, 0), 1);
    let unused: Vec<&str> = usage.unused(&filters).map(|p| p.text.as_str()).collect();
    assert_eq!(unused, ["dEQP-VK.gone"]);
}

#[test]
fn exclude_after_include_only_sees_included_cases() {
    let source = Path::new("f.txt");
    let cases: Vec<String> = vec!["x.a".into(), "x.b".into()];
    let mut include = Filter::new(FilterKind::Include);
    include.add_text("x.a", source).unwrap();
    let mut exclude = Filter::new(FilterKind::Exclude);
    exclude.add_text("x.*", source).unwrap();
    let filters = [include, exclude];
    let (kept, usage) = apply_filters(&cases, &filters);
    assert!(kept.is_empty());
    assert_eq!(usage.count(0, 0), 1);
    assert_eq!(usage.count(1, 0), 1);

    let mut stale = Filter::new(FilterKind::Exclude);
    stale.add_text("x.b", source).unwrap();
    let filters = [filters[0].clone(), stale];
    let (kept, usage) = apply_filters(&cases, &filters);
    assert_eq!(kept, ["x.a"]);
    assert_eq!(usage.count(1, 0), 0);
    let unused: Vec<&str> = usage.unused(&filters).map(|p| p.text.as_str()).collect();
    assert_eq!(unused, ["x.b"]);
}

#[test]
fn repeated_exact_pattern_counts_every_copy() {
    let source = Path::new("f.txt");
    let cases: Vec<String> = vec!["x.a".into(), "x.b".into()];
    let mut include = Filter::new(FilterKind::Include);
    include.add_text("x.a\nx.b\nx.a\n", source).unwrap();
    let filters = [include];
    let (kept, usage) = apply_filters(&cases, &filters);
    assert_eq!(kept, cases);
    assert_eq!(usage.count(0, 0), 1);
    assert_eq!(usage.count(0, 2), 1);
    assert_eq!(usage.unused(&filters).count(), 0);
}
