//! Colony journal - typed, icon-decorated log lines.
//!
//! Every line reads `Day {n}: {icon} {text}`. The journal keeps the 500
//! most recent lines and drops the oldest first, which bounds both the UI
//! list and the save size.
//!
//! Ambient flavor (weather, rumors, small warnings, the day-one prologue)
//! has no gameplay effect. It draws from the caller's RNG so a seeded
//! engine stays reproducible.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hard cap on retained journal lines
pub const MAX_LOG_LINES: usize = 500;

/// Category of a journal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Exploration,
    Milestone,
    Construction,
    Research,
    Population,
    Resources,
    Capacity,
    General,
    Environment,
    Warning,
    Celebration,
    Narrative,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::Exploration,
        EventKind::Milestone,
        EventKind::Construction,
        EventKind::Research,
        EventKind::Population,
        EventKind::Resources,
        EventKind::Capacity,
        EventKind::General,
        EventKind::Environment,
        EventKind::Warning,
        EventKind::Celebration,
        EventKind::Narrative,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            EventKind::Exploration => "🔎",
            EventKind::Milestone => "📍",
            EventKind::Construction => "🏗",
            EventKind::Research => "🔬",
            EventKind::Population => "👥",
            EventKind::Resources => "🍎",
            EventKind::Capacity => "🏠",
            EventKind::General => "ℹ️",
            EventKind::Environment => "🌦",
            EventKind::Warning => "⚠️",
            EventKind::Celebration => "🎉",
            EventKind::Narrative => "📖",
        }
    }

    /// Recover the category of a formatted line from its icon.
    pub fn of_line(line: &str) -> Option<EventKind> {
        let body = line.split_once(": ").map(|(_, rest)| rest)?;
        EventKind::ALL
            .into_iter()
            .find(|kind| body.starts_with(kind.icon()))
    }
}

/// Bounded, append-only journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VecDeque<String>", into = "VecDeque<String>")]
pub struct EventLog {
    entries: VecDeque<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a typed line for `day`.
    pub fn push(&mut self, day: u32, kind: EventKind, body: impl AsRef<str>) {
        self.push_line(format!("Day {day}: {} {}", kind.icon(), body.as_ref()));
    }

    /// Append a preformatted line.
    pub fn push_line(&mut self, line: String) {
        self.entries.push_back(line);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > MAX_LOG_LINES {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&String> {
        self.entries.back()
    }

    /// Number of lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries.iter().filter(|l| l.contains(needle)).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|l| l.contains(needle))
    }

    /// The `n` most recent lines, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &String> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }
}

impl From<VecDeque<String>> for EventLog {
    fn from(entries: VecDeque<String>) -> Self {
        let mut log = Self { entries };
        log.trim();
        log
    }
}

impl From<EventLog> for VecDeque<String> {
    fn from(log: EventLog) -> Self {
        log.entries
    }
}

// ── Flavor pools ───────────────────────────────────────────────────────

const DISCOVERY_ITEMS: &[&str] = &[
    "amber reeds",
    "salt flats",
    "basalt springs",
    "silver moss",
    "glow beetles",
    "lichen crystals",
    "reed sugar",
    "spice pods",
    "wind-polished stones",
    "luminescent fungi",
    "a sweetwater pool",
    "iron shards",
    "mica dunes",
    "wild grain",
    "copper vines",
];

const DISCOVERY_VERBS: &[&str] = &["Found", "Spotted", "Catalogued", "Sampled", "Noted"];

const STARTER_SUPPLIES: &[&str] = &[
    "seed packs",
    "tool kits",
    "water filters",
    "bandages",
    "solar cells",
    "spare antenna clips",
    "camp stoves",
    "blankets",
    "navigation beacons",
    "field notebooks",
];

const SKY_PHENOMENA: &[&str] = &[
    "a soft twin-moon rise",
    "a slow meteor ribbon",
    "emerald auroras over the dunes",
    "glow-clouds drifting low",
    "a ring-shadow sweeping the valley",
];

const WEATHER_NOTES: &[&str] = &[
    "Gentle rain freshened the greenhouses",
    "A dust breeze coated everything in gold",
    "A cool fog curled along the river flats",
    "Bright sun made the reeds sing",
    "Night frost sparkled on the walkways",
];

const FAUNA_RUMORS: &[&str] = &[
    "tiny shellbacks nest near the sweetwater pool",
    "reed-mice gather around lanterns",
    "glow beetles dance at dusk",
    "sandcrabs like shiny stones",
    "wind moths follow footsteps",
];

const MINOR_WARNINGS: &[&str] = &[
    "Dust gusts expected by evening",
    "Watch for loose walkway planks near the river",
    "Conserve lantern oil, the supply run is late",
    "Radio static increasing around the ridge",
];

/// Discoveries named on a breakthrough, by the tech level just reached
fn tech_discoveries(level: i64) -> &'static [&'static str] {
    match level {
        1 => &["basic irrigation", "stone masonry", "reed weaving", "fire pits"],
        2 => &["metal tools", "greenhouse automation", "copper smelting", "basic medicine"],
        3 => &["wind turbines", "water purification", "glassmaking", "simple machinery"],
        4 => &["advanced optics", "chemical fertilizers", "steam engines", "solar stills"],
        5 => &["bioluminescent lighting", "hydroponic towers", "electric storage", "radio beacons"],
        _ => &[],
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    rng.gen_range(0..100) < percent
}

// ── Exploration ────────────────────────────────────────────────────────

pub fn exploration_milestone(log: &mut EventLog, day: u32, km: i64) {
    log.push(day, EventKind::Milestone, format!("Scouted out to {km} km"));
}

/// Progress line; `discovery` appends a short find to it.
pub fn exploration_progress(
    log: &mut EventLog,
    day: u32,
    delta_km: f64,
    total_km: f64,
    discovery: Option<String>,
) {
    let mut msg = format!("Explored surroundings (+{delta_km:.2} km, total {total_km:.2} km)");
    if let Some(find) = discovery {
        msg.push(' ');
        msg.push_str(&find);
    }
    log.push(day, EventKind::Exploration, msg);
}

/// 35% chance of a "Spotted silver moss" style find.
pub fn roll_discovery<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    if !roll(rng, 35) {
        return None;
    }
    let verb = DISCOVERY_VERBS.choose(rng)?;
    let item = DISCOVERY_ITEMS.choose(rng)?;
    Some(format!("{verb} {item}"))
}

// ── Food & capacity ────────────────────────────────────────────────────

pub fn food_surplus(log: &mut EventLog, day: u32, rations: i64) {
    log.push(
        day,
        EventKind::Resources,
        format!("Surplus food detected (+{rations} units)"),
    );
}

pub fn food_deficit(log: &mut EventLog, day: u32, rations: i64) {
    log.push(
        day,
        EventKind::General,
        format!("Food deficit today (~{rations} rations)"),
    );
}

pub fn growth_paused_for_food(log: &mut EventLog, day: u32) {
    log.push(day, EventKind::Capacity, "Growth paused due to food shortage");
}

pub fn housing_at_capacity(log: &mut EventLog, day: u32) {
    log.push(
        day,
        EventKind::Capacity,
        "Population growth halted, housing at capacity",
    );
}

// ── Construction ───────────────────────────────────────────────────────

pub fn construction_planned(log: &mut EventLog, day: u32, name: &str) {
    log.push(day, EventKind::Construction, format!("Queued: {name}"));
}

pub fn construction_started(log: &mut EventLog, day: u32, name: &str, days: u32) {
    log.push(
        day,
        EventKind::Construction,
        format!("Construction started: {name}, estimated {days} days to complete"),
    );
}

pub fn construction_progress(log: &mut EventLog, day: u32, name: &str, percent: u32) {
    log.push(
        day,
        EventKind::Construction,
        format!("Construction underway: {name} {percent}% complete"),
    );
}

pub fn built_house(log: &mut EventLog, day: u32, name: &str, beds_added: i64) {
    log.push(
        day,
        EventKind::Construction,
        format!("Built a {name} (+{beds_added} beds)"),
    );
}

pub fn built_greenhouse(log: &mut EventLog, day: u32, name: &str) {
    log.push(day, EventKind::Construction, format!("Built a {name} (+food)"));
}

pub fn opened_school(log: &mut EventLog, day: u32, name: &str) {
    log.push(day, EventKind::Construction, format!("Opened a {name} (+Tech)"));
}

pub fn idle_builders(log: &mut EventLog, day: u32) {
    log.push(
        day,
        EventKind::Construction,
        "Builders idle, no projects in queue",
    );
}

// ── Research & population ──────────────────────────────────────────────

/// Breakthrough line; `mastered` names what was learned.
pub fn breakthrough(log: &mut EventLog, day: u32, tech_level: i64, mastered: Option<&str>) {
    let mut msg = format!("Breakthrough! Tech is now {tech_level}");
    if let Some(item) = mastered {
        msg.push_str(&format!(" Mastered: {item}"));
    }
    log.push(day, EventKind::Research, msg);
}

pub fn roll_mastery<R: Rng + ?Sized>(rng: &mut R, tech_level: i64) -> Option<&'static str> {
    tech_discoveries(tech_level).choose(rng).copied()
}

pub fn arrivals(log: &mut EventLog, day: u32, count: i64) {
    log.push(day, EventKind::Population, format!("New arrivals: +{count} Liri"));
}

// ── Ambient ────────────────────────────────────────────────────────────

/// Opening journal for a fresh colony.
pub fn prologue<R: Rng + ?Sized>(log: &mut EventLog, day: u32, rng: &mut R) {
    log.push(day, EventKind::Narrative, "Touchdown successful. Instruments nominal");
    log.push(
        day,
        EventKind::Construction,
        "Raised first shelter and set a small campfire",
    );
    let mut supplies = STARTER_SUPPLIES.choose_multiple(rng, 2);
    if let (Some(a), Some(b)) = (supplies.next(), supplies.next()) {
        log.push(day, EventKind::General, format!("Unpacked {a} and {b}"));
    }
    log.push(day, EventKind::Construction, "Started building a greenhouse");
    if let Some(sky) = SKY_PHENOMENA.choose(rng) {
        log.push(day, EventKind::Narrative, format!("Camp quiet. We watched {sky}"));
    }
}

/// End-of-day ambience: 70% weather, 40% rumor, 20% minor warning.
pub fn ambient_daily<R: Rng + ?Sized>(log: &mut EventLog, day: u32, rng: &mut R) {
    if roll(rng, 70) {
        if let Some(note) = WEATHER_NOTES.choose(rng) {
            log.push(day, EventKind::Environment, note);
        }
    }
    if roll(rng, 40) {
        if let Some(rumor) = FAUNA_RUMORS.choose(rng) {
            log.push(day, EventKind::Narrative, format!("Report: {rumor}"));
        }
    }
    if roll(rng, 20) {
        if let Some(warning) = MINOR_WARNINGS.choose(rng) {
            log.push(day, EventKind::Warning, warning);
        }
    }
}
