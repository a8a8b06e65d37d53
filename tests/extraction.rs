// file: tests/extraction.rs
// description: end-to-end extraction behaviour over realistic report text
// reference: public extractor api

use pretty_assertions::assert_eq;
use threat_ingest::extractor::{ExtractorKind, ExtractorSet, normalize_url};
use threat_ingest::models::ObservableType;

const MIXED_INDICATORS: &str = "\
185.220.101[.]4
update-check[.]net
45.153.160[.]2
91.219.236[.]166
cdn-sync[.]org
194.165.16[.]11
5.252.177[.]21
185.141.63[.]120
login-portal[.]com
80.66.88[.]145
46.161.27[.]117
23.106.215[.]76
mail-relay[.]ru
103.224.182[.]245
141.98.10[.]35
37.120.238[.]58
193.42.33[.]7
assets-static[.]io
89.44.9[.]243
31.184.198[.]23
2.58.56[.]14
152.89.196[.]111
77.91.68[.]52
";

fn values(set: &ExtractorSet, kind: ExtractorKind, text: &str) -> Vec<String> {
    set.get(kind).extract(text).map(|o| o.value).collect()
}

#[test]
fn test_standalone_indicators_are_not_urls() {
    let set = ExtractorSet::new();
    assert_eq!(MIXED_INDICATORS.lines().count(), 23);

    let ips = values(&set, ExtractorKind::Ipv4, MIXED_INDICATORS);
    assert_eq!(ips.len(), 18);
    assert_eq!(ips[0], "185.220.101.4");
    assert!(ips.iter().all(|ip| !ip.contains('[')));

    assert!(values(&set, ExtractorKind::Url, MIXED_INDICATORS).is_empty());
    assert_eq!(values(&set, ExtractorKind::Domain, MIXED_INDICATORS).len(), 5);
}

#[test]
fn test_defanged_download_url() {
    let set = ExtractorSet::new();
    let text = "The loader pulls its second stage from hxxp://mb[.]glbaitech[.]com/mboard.dll daily.";

    let urls: Vec<_> = set
        .get(ExtractorKind::Url)
        .extract(text)
        .collect();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].kind, ObservableType::Url);
    assert_eq!(urls[0].value, "http://mb.glbaitech.com/mboard.dll");
}

#[test]
fn test_unknown_tlds_yield_no_domains() {
    let set = ExtractorSet::new();
    let text = "dropped payload.qwertyuiop next to staging[.]notatld and svchost.notatld";
    assert!(values(&set, ExtractorKind::Domain, text).is_empty());
}

#[test]
fn test_normalize_url_is_idempotent() {
    for raw in [
        "hxxps://cdn[.]evil[.]com/a.js",
        "fxp://files[dot]example[.]org/drop.bin",
        "evil[.]com/gate.php?id=1",
        "hxxp:__evil[.]com/a",
        "http://[2001:db8::1]/admin",
        "hxxp://evil[.]com/a.]",
        "evil[.]com/r?u=https://good.example/x",
    ] {
        let once = normalize_url(raw).expect("candidate parses");
        assert_eq!(normalize_url(&once), Some(once.clone()), "input {raw}");
    }
}

#[test]
fn test_extracted_urls_are_already_normalized() {
    let set = ExtractorSet::new();
    let text = "Sources: [hxxp://evil[.]com/a.] and the redirector \
                evil[.]com/r?u=https://good.example/x (see appendix).";

    let urls = values(&set, ExtractorKind::Url, text);
    assert_eq!(
        urls,
        vec![
            "http://evil.com/a",
            "https://good.example/x",
            "http://evil.com/r?u=https://good.example/x",
        ]
    );
    for url in &urls {
        assert_eq!(normalize_url(url).as_deref(), Some(url.as_str()));
    }
}
