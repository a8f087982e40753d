//! Hiking profile - way acceptance and priority scoring
//!
//! Decides, once per way during graph construction, whether a way is usable
//! on foot and how desirable it is relative to alternatives of the same
//! accept class. Both decisions are pure functions over the way's tags and
//! tables fixed at construction, so they may run concurrently across ways.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::priority::{PriorityCandidates, PriorityCode};
use crate::properties::Properties;
use crate::tagset::TagSet;
use crate::way::WayTags;

/// Acceptance verdict for a single way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptDecision {
    Reject,
    Accept,
    AcceptFerry,
    AcceptPlatform,
}

impl AcceptDecision {
    pub fn is_accepted(self) -> bool {
        self != AcceptDecision::Reject
    }
}

/// Feature queries the surrounding pipeline may ask of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Capability {
    /// The path-search cost function may consume the resolved priority code.
    PriorityWeighting,
}

/// Profile tuning knobs, overridable via [`Properties`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HikeConfig {
    /// Bit width of the persisted speed field.
    pub speed_bits: u32,
    /// km/h represented by one stored speed increment.
    pub speed_factor: f64,
    /// Reject fords. On by default for this profile, unlike a generic foot
    /// profile.
    pub block_fords: bool,
}

impl Default for HikeConfig {
    fn default() -> Self {
        Self {
            speed_bits: 4,
            speed_factor: 1.0,
            block_fords: true,
        }
    }
}

impl HikeConfig {
    pub fn from_properties(props: &Properties) -> Self {
        let defaults = Self::default();
        Self {
            speed_bits: props.get_u32("speed_bits", defaults.speed_bits),
            speed_factor: props.get_f64("speed_factor", defaults.speed_factor),
            block_fords: props.get_bool("block_fords", defaults.block_fords),
        }
    }
}

/// Named acceptance rule. Rules run in declaration order; the first one
/// returning a decision wins. The order is load-bearing: sidewalk presence
/// and explicit foot intent bypass the highway allow-list, motorroad and
/// ford checks, but not the no-highway branch.
struct AcceptRule {
    name: &'static str,
    eval: fn(&HikeProfile, &WayTags) -> Option<AcceptDecision>,
}

/// Priority heuristic. Heuristics run unconditionally, in order, and append
/// weighted candidates.
type PriorityRule = fn(&HikeProfile, &WayTags, &mut PriorityCandidates);

const SAFE_HIGHWAYS: &[&str] = &[
    "footway",
    "path",
    "steps",
    "pedestrian",
    "living_street",
    "track",
    "residential",
    "service",
];

// Walkable but not pleasant. "ford" sits in the allow list so that the
// block_fords toggle alone governs it.
const EXTRA_ALLOWED_HIGHWAYS: &[&str] = &[
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "cycleway",
    "unclassified",
    "road",
    "ford",
];

const AVOID_HIGHWAYS: &[&str] = &[
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
];

const SIDEWALK_VALUES: &[&str] = &["yes", "both", "left", "right"];
const SIDEWALK_NO_VALUES: &[&str] = &["no", "none", "separate"];
const INTENDED_VALUES: &[&str] = &["yes", "designated", "official", "permissive"];
const FERRY_VALUES: &[&str] = &["ferry", "shuttle_train"];
const RESTRICTED_VALUES: &[&str] = &["no", "private", "restricted", "military", "emergency"];

/// Keys checked for access restrictions, most specific first.
const RESTRICTION_KEYS: &[&str] = &["foot", "access"];

/// Tag tables fixed at profile construction.
#[derive(Debug)]
struct HikeTagSets {
    allowed_highways: TagSet,
    avoid_highways: TagSet,
    safe_highways: TagSet,
    sidewalk_values: TagSet,
    sidewalk_no_values: TagSet,
    intended_values: TagSet,
    ferry_values: TagSet,
    restricted_values: TagSet,
}

impl HikeTagSets {
    fn new() -> Self {
        Self {
            allowed_highways: SAFE_HIGHWAYS
                .iter()
                .chain(EXTRA_ALLOWED_HIGHWAYS)
                .copied()
                .collect(),
            avoid_highways: TagSet::new(AVOID_HIGHWAYS.iter().copied()),
            safe_highways: TagSet::new(SAFE_HIGHWAYS.iter().copied()),
            sidewalk_values: TagSet::new(SIDEWALK_VALUES.iter().copied()),
            sidewalk_no_values: TagSet::new(SIDEWALK_NO_VALUES.iter().copied()),
            intended_values: TagSet::new(INTENDED_VALUES.iter().copied()),
            ferry_values: TagSet::new(FERRY_VALUES.iter().copied()),
            restricted_values: TagSet::new(RESTRICTED_VALUES.iter().copied()),
        }
    }
}

/// Hiking travel profile.
///
/// Immutable after construction; a single instance may serve arbitrarily
/// many concurrent per-way calls.
pub struct HikeProfile {
    config: HikeConfig,
    tags: HikeTagSets,
    network_priority: FxHashMap<&'static str, PriorityCode>,
    accept_rules: &'static [AcceptRule],
    priority_rules: &'static [PriorityRule],
}

impl HikeProfile {
    /// Stable identifier for the profile registry and diagnostics.
    pub const NAME: &'static str = "hiking";

    /// Flag-format version. The storage layer must check it against a
    /// persisted graph at load time; a mismatch is fatal.
    pub const VERSION: u32 = 2;

    pub fn new(config: HikeConfig) -> Self {
        let mut network_priority = FxHashMap::default();
        network_priority.insert("iwn", PriorityCode::Best);
        network_priority.insert("nwn", PriorityCode::Best);
        network_priority.insert("rwn", PriorityCode::VeryNice);
        network_priority.insert("lwn", PriorityCode::VeryNice);

        Self {
            config,
            tags: HikeTagSets::new(),
            network_priority,
            accept_rules: ACCEPT_RULES,
            priority_rules: PRIORITY_RULES,
        }
    }

    pub fn from_properties(props: &Properties) -> Self {
        Self::new(HikeConfig::from_properties(props))
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn version(&self) -> u32 {
        Self::VERSION
    }

    pub fn config(&self) -> &HikeConfig {
        &self.config
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::PriorityWeighting => true,
        }
    }

    /// Deprecation notice for the caller to surface. Advisory only; no
    /// functional behavior depends on it.
    pub fn advisory(&self) -> Option<&'static str> {
        Some("the \"hiking\" profile is superseded; prefer the \"hike\" profile")
    }

    /// Priority for a hiking-network marker (iwn/nwn/rwn/lwn). Consulted by
    /// the relation-processing stage, not by [`decide`](Self::decide) or
    /// [`resolve`](Self::resolve).
    pub fn network_priority(&self, network: &str) -> Option<PriorityCode> {
        self.network_priority.get(network).copied()
    }

    /// Acceptance gate: can this way be used on foot at all, and in which
    /// accept class.
    pub fn decide(&self, way: &WayTags) -> AcceptDecision {
        self.explain(way).0
    }

    /// Like [`decide`](Self::decide), also naming the rule that fired.
    pub fn explain(&self, way: &WayTags) -> (AcceptDecision, &'static str) {
        for rule in self.accept_rules {
            if let Some(decision) = (rule.eval)(self, way) {
                return (decision, rule.name);
            }
        }
        // The rule table ends with an unconditional default.
        (AcceptDecision::Accept, "default_accept")
    }

    /// Preference score for an already-accepted way.
    pub fn resolve(&self, way: &WayTags) -> PriorityCode {
        let mut candidates = PriorityCandidates::new();
        for rule in self.priority_rules {
            rule(self, way, &mut candidates);
        }
        candidates.resolve()
    }
}

impl Default for HikeProfile {
    fn default() -> Self {
        Self::new(HikeConfig::default())
    }
}

const ACCEPT_RULES: &[AcceptRule] = &[
    AcceptRule {
        name: "no_highway",
        eval: accept_no_highway,
    },
    AcceptRule {
        name: "sidewalk_present",
        eval: accept_sidewalk,
    },
    AcceptRule {
        name: "foot_intended",
        eval: accept_foot_intended,
    },
    AcceptRule {
        name: "highway_allowed",
        eval: reject_unknown_highway,
    },
    AcceptRule {
        name: "motorroad",
        eval: reject_motorroad,
    },
    AcceptRule {
        name: "ford",
        eval: reject_ford,
    },
    AcceptRule {
        name: "access_restricted",
        eval: reject_restricted,
    },
    AcceptRule {
        name: "default_accept",
        eval: accept_default,
    },
];

/// Ferries and platforms carry no highway tag; everything else without one
/// is not part of the walkable network.
fn accept_no_highway(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    if way.has("highway") {
        return None;
    }
    if way.has_any("route", &profile.tags.ferry_values) {
        // An explicit foot value other than "yes" keeps us off the ferry.
        return match way.get("foot") {
            None | Some("yes") => Some(AcceptDecision::AcceptFerry),
            Some(_) => Some(AcceptDecision::Reject),
        };
    }
    if way.has_value("railway", "platform") {
        return Some(AcceptDecision::AcceptPlatform);
    }
    Some(AcceptDecision::Reject)
}

/// A mapped sidewalk makes the way walkable regardless of road category.
fn accept_sidewalk(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    way.has_any("sidewalk", &profile.tags.sidewalk_values)
        .then_some(AcceptDecision::Accept)
}

/// Explicit pedestrian intent bypasses the category and ford checks.
fn accept_foot_intended(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    way.has_any("foot", &profile.tags.intended_values)
        .then_some(AcceptDecision::Accept)
}

fn reject_unknown_highway(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    let highway = way.get("highway").unwrap_or_default();
    (!profile.tags.allowed_highways.contains(highway)).then_some(AcceptDecision::Reject)
}

fn reject_motorroad(_profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    way.has_value("motorroad", "yes")
        .then_some(AcceptDecision::Reject)
}

fn reject_ford(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    if !profile.config.block_fords {
        return None;
    }
    (way.has_value("highway", "ford") || way.has("ford")).then_some(AcceptDecision::Reject)
}

fn reject_restricted(profile: &HikeProfile, way: &WayTags) -> Option<AcceptDecision> {
    RESTRICTION_KEYS
        .iter()
        .any(|key| way.has_any(key, &profile.tags.restricted_values))
        .then_some(AcceptDecision::Reject)
}

fn accept_default(_profile: &HikeProfile, _way: &WayTags) -> Option<AcceptDecision> {
    Some(AcceptDecision::Accept)
}

const PRIORITY_RULES: &[PriorityRule] = &[prio_foot_designated, prio_road_class, prio_bicycle];

/// A dedicated foot way is the strongest signal and dominates everything
/// the other heuristics propose.
fn prio_foot_designated(_profile: &HikeProfile, way: &WayTags, out: &mut PriorityCandidates) {
    if way.has_value("foot", "designated") {
        out.push(100.0, PriorityCode::Prefer);
    }
}

/// Quiet roads are preferred, fast or major roads avoided; a tunnel or a
/// missing sidewalk dampens either judgement.
fn prio_road_class(profile: &HikeProfile, way: &WayTags, out: &mut PriorityCandidates) {
    let highway = way.get("highway").unwrap_or_default();
    let max_speed = way.max_speed();

    if profile.tags.safe_highways.contains(highway) || (max_speed > 0.0 && max_speed <= 20.0) {
        out.push(40.0, PriorityCode::Prefer);
        if way.has_any("tunnel", &profile.tags.intended_values) {
            // Same-weight push overwrites the Prefer above.
            if way.has_any("sidewalk", &profile.tags.sidewalk_no_values) {
                out.push(40.0, PriorityCode::ReachDest);
            } else {
                out.push(40.0, PriorityCode::Unchanged);
            }
        }
    } else if max_speed > 50.0 || profile.tags.avoid_highways.contains(highway) {
        if way.has_any("sidewalk", &profile.tags.sidewalk_no_values) {
            out.push(45.0, PriorityCode::Worst);
        } else {
            out.push(45.0, PriorityCode::ReachDest);
        }
    }
}

fn prio_bicycle(_profile: &HikeProfile, way: &WayTags, out: &mut PriorityCandidates) {
    if way.has_value("bicycle", "official") || way.has_value("bicycle", "designated") {
        out.push(44.0, PriorityCode::AvoidIfPossible);
    }
}
