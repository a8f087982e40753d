//! End-to-end checks of the hiking rule semantics

use rayon::prelude::*;
use trailflag::{AcceptDecision, HikeConfig, HikeProfile, PriorityCode, Properties, WayTags};

macro_rules! way {
    {} => { WayTags::default() };
    {$($k:literal : $v:literal),+ $(,)?} => {
        [$( ($k, $v) ),+].into_iter().collect::<WayTags>()
    };
}

fn profile() -> HikeProfile {
    HikeProfile::default()
}

#[test]
fn deterministic_across_repeated_calls() {
    let p = profile();
    let w = way! {"highway": "trunk", "sidewalk": "no", "bicycle": "designated"};

    let first = (p.decide(&w), p.resolve(&w));
    for _ in 0..100 {
        assert_eq!((p.decide(&w), p.resolve(&w)), first);
    }
}

#[test]
fn deterministic_across_threads() {
    let p = profile();
    let ways = vec![
        way! {"highway": "footway"},
        way! {"highway": "trunk", "sidewalk": "none"},
        way! {"route": "ferry", "foot": "yes"},
        way! {"highway": "motorway"},
        way! {"highway": "unclassified", "maxspeed": "51"},
    ];

    let expected: Vec<_> = ways
        .iter()
        .map(|w| (p.decide(w), p.resolve(w)))
        .collect();

    for _ in 0..8 {
        let parallel: Vec<_> = ways
            .par_iter()
            .map(|w| (p.decide(w), p.resolve(w)))
            .collect();
        assert_eq!(parallel, expected);
    }
}

#[test]
fn sidewalk_escape_hatch_beats_allow_list() {
    let p = profile();
    let w = way! {"highway": "motorway", "sidewalk": "yes"};
    assert_eq!(p.decide(&w), AcceptDecision::Accept);

    // Every sidewalk-present value works, not just "yes".
    for value in ["both", "left", "right"] {
        let mut w = WayTags::new();
        w.insert("highway", "motorway");
        w.insert("sidewalk", value);
        assert_eq!(p.decide(&w), AcceptDecision::Accept);
    }
}

#[test]
fn ferry_branch_is_exclusive_to_missing_highway() {
    let p = profile();

    assert_eq!(
        p.decide(&way! {"route": "ferry", "foot": "no"}),
        AcceptDecision::Reject
    );
    assert_eq!(
        p.decide(&way! {"route": "ferry", "foot": "yes"}),
        AcceptDecision::AcceptFerry
    );
    assert_eq!(p.decide(&way! {"route": "ferry"}), AcceptDecision::AcceptFerry);

    // With a highway tag the way goes through the normal gate instead.
    assert_eq!(
        p.decide(&way! {"highway": "residential", "route": "ferry", "foot": "no"}),
        AcceptDecision::Reject
    );
    assert_eq!(
        p.decide(&way! {"highway": "residential", "route": "ferry"}),
        AcceptDecision::Accept
    );
}

#[test]
fn allow_list_rejects_motorways() {
    let p = profile();
    assert_eq!(p.decide(&way! {"highway": "motorway"}), AcceptDecision::Reject);
    assert_eq!(
        p.decide(&way! {"highway": "motorway_link"}),
        AcceptDecision::Reject
    );
    assert_eq!(
        p.decide(&way! {"highway": "bridleway"}),
        AcceptDecision::Reject
    );
}

#[test]
fn designated_foot_dominates_avoided_road() {
    let p = profile();
    let w = way! {"highway": "trunk", "foot": "designated"};
    assert_eq!(p.decide(&w), AcceptDecision::Accept);
    assert_eq!(p.resolve(&w), PriorityCode::Prefer);
}

#[test]
fn ford_blocking_toggle() {
    let blocked = profile();
    assert_eq!(blocked.decide(&way! {"highway": "ford"}), AcceptDecision::Reject);

    let props = Properties::parse_str("block_fords=false");
    let open = HikeProfile::from_properties(&props);
    assert_eq!(open.decide(&way! {"highway": "ford"}), AcceptDecision::Accept);
}

#[test]
fn tunnel_overrides_safe_highway_preference() {
    let p = profile();

    let plain = way! {"highway": "residential"};
    assert_eq!(p.resolve(&plain), PriorityCode::Prefer);

    let tunnel = way! {"highway": "residential", "tunnel": "yes"};
    assert_eq!(p.resolve(&tunnel), PriorityCode::Unchanged);

    let dark_tunnel = way! {"highway": "residential", "tunnel": "yes", "sidewalk": "no"};
    assert_eq!(p.resolve(&dark_tunnel), PriorityCode::ReachDest);
}

#[test]
fn speed_threshold_boundaries() {
    let p = profile();

    // "unclassified" is allowed but neither safe nor avoided, so only the
    // speed terms decide.
    let slow = way! {"highway": "unclassified", "maxspeed": "20"};
    assert_eq!(p.resolve(&slow), PriorityCode::Prefer);

    let fifty = way! {"highway": "unclassified", "maxspeed": "50"};
    assert_eq!(p.resolve(&fifty), PriorityCode::Unchanged);

    let fifty_one = way! {"highway": "unclassified", "maxspeed": "51"};
    assert_eq!(p.resolve(&fifty_one), PriorityCode::ReachDest);

    let fifty_one_no_sidewalk =
        way! {"highway": "unclassified", "maxspeed": "51", "sidewalk": "no"};
    assert_eq!(p.resolve(&fifty_one_no_sidewalk), PriorityCode::Worst);
}

#[test]
fn missing_speed_fires_no_speed_rule() {
    let p = profile();
    assert_eq!(
        p.resolve(&way! {"highway": "unclassified", "maxspeed": "none"}),
        PriorityCode::Unchanged
    );
}

#[test]
fn properties_configure_the_profile() {
    let props = Properties::parse_str("speed_bits=6|speed_factor=0.5|block_fords=false");
    let p = HikeProfile::from_properties(&props);
    assert_eq!(p.config().speed_bits, 6);
    assert_eq!(p.config().speed_factor, 0.5);
    assert!(!p.config().block_fords);

    // Defaults when nothing is overridden.
    let p = HikeProfile::from_properties(&Properties::new());
    assert_eq!(p.config(), &HikeConfig::default());
    assert!(p.config().block_fords);
}

#[test]
fn advisory_does_not_change_behavior() {
    let p = profile();
    assert!(p.advisory().is_some());
    assert_eq!(p.decide(&way! {"highway": "path"}), AcceptDecision::Accept);
}
