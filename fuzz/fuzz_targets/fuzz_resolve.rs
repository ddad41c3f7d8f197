#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oplookup::query::{QueryService, ResolveOptions, Resolution, Snapshot};
use oplookup::store::RecordStore;
use oplookup::utils::ResolverConfig;
use std::sync::LazyLock;

const SNAPSHOT: &str = r#"{"operators":{
    "101 energy corporation":{"name":"101 ENERGY CORPORATION","status":"OPEN"},
    "3-b oil co llc":{"name":"3-B OIL CO LLC","status":"OPEN"},
    "5-buck's oil company llc":{"name":"5-BUCK'S OIL COMPANY LLC","status":"OPEN"},
    "acme oil & gas llc":{"name":"ACME OIL & GAS LLC","status":"CANCELLED"},
    "anadarko company (the)":{"name":"ANADARKO COMPANY (THE)","status":"OPEN"},
    "red fork resources inc dba redfork energy":{
        "name":"RED FORK RESOURCES INC DBA REDFORK ENERGY","status":"OPEN"
    }
}}"#;

static SERVICE: LazyLock<QueryService> = LazyLock::new(|| {
    let store = RecordStore::from_json_str(SNAPSHOT).expect("fuzz snapshot is valid");
    QueryService::new(Snapshot::new(store), ResolverConfig::default())
});

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    query: &'a str,
    max_candidates: Option<u16>,
    floor: Option<f64>,
}

fuzz_target!(|input: Input<'_>| {
    let options = ResolveOptions {
        status_filter: None,
        max_candidates: input.max_candidates.map(usize::from),
        similarity_floor: input.floor,
    };

    // Resolution never panics and candidates stay ranked and bounded
    if let Resolution::Ambiguous { candidates } = SERVICE.resolve(input.query, &options) {
        assert!(!candidates.is_empty());
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(candidates.iter().all(|c| (0.0..=1.0).contains(&c.score)));
    }
});
