//! PortalMaze Headless Simulation Harness
//!
//! Generates levels and validates the movement rules end to end.
//! Runs entirely in-process with no input loop.
//!
//! Usage:
//!   cargo run -p portalmaze-simtest
//!   cargo run -p portalmaze-simtest -- --verbose
//!   cargo run -p portalmaze-simtest -- --config level.json --seed 42 --json

mod render;

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};
use portalmaze_logic::boundary::{BoundaryKind, Passage, PortalState};
use portalmaze_logic::config::{LevelConfig, StartPolicy};
use portalmaze_logic::error::LevelError;
use portalmaze_logic::generator::BoundaryGenerator;
use portalmaze_logic::level::{CharacterId, Level, LevelStats};
use portalmaze_logic::point::{Direction, Point};
use portalmaze_logic::room::RoomId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── Command line ────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "portalmaze-simtest", about = "Generate PortalMaze levels and validate the movement rules")]
struct Options {
    /// Print every result and the rendered levels; log at debug level.
    #[arg(short, long)]
    verbose: bool,
    /// Print a JSON summary of one generated level instead of running checks.
    #[arg(long)]
    json: bool,
    /// JSON level configuration; missing fields take their defaults.
    #[arg(long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,
    /// Seed overriding the configuration.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Rooms per side overriding the configuration.
    #[arg(long, value_name = "ROOMS")]
    size: Option<usize>,
}

impl Options {
    /// Config file (or defaults) with command-line overrides applied.
    fn level_config(&self) -> Result<LevelConfig, HarnessError> {
        let mut config = match &self.config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => LevelConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(size) = self.size {
            config.size = size;
        }
        // Without a seed the run is not reproducible; pick one and report it
        if config.seed.is_none() {
            config.seed = Some(rand::thread_rng().gen());
        }
        config.validate()?;
        Ok(config)
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
enum HarnessError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Level(LevelError),
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        HarnessError::Io(e)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Json(e)
    }
}

impl From<LevelError> for HarnessError {
    fn from(e: LevelError) -> Self {
        HarnessError::Level(e)
    }
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Io(e) => write!(f, "IO error: {}", e),
            HarnessError::Json(e) => write!(f, "Config error: {}", e),
            HarnessError::Level(e) => write!(f, "Level error: {}", e),
        }
    }
}

impl std::error::Error for HarnessError {}

// ── JSON summary ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct LevelSummary {
    config: LevelConfig,
    stats: LevelStats,
    characters: Vec<CharacterSummary>,
    map: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CharacterSummary {
    name: String,
    position: Option<Point>,
}

fn summarize(config: &LevelConfig, level: &Level) -> LevelSummary {
    LevelSummary {
        config: config.clone(),
        stats: level.stats(),
        characters: level
            .characters()
            .map(|(id, c)| CharacterSummary {
                name: c.name().to_string(),
                position: level.point_of(id),
            })
            .collect(),
        map: render::render(level).lines().map(str::to_string).collect(),
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }

    fn failed(name: &str, err: impl std::fmt::Display) -> Self {
        Self::check(name, false, err.to_string())
    }
}

fn main() {
    let options = Options::parse();

    let default_filter = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match options.level_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if options.json {
        match Level::build(&config, &["hunter", "prey"], &mut config.rng()) {
            Ok(level) => match serde_json::to_string_pretty(&summarize(&config, &level)) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}", HarnessError::from(e));
                    std::process::exit(2);
                }
            },
            Err(e) => {
                eprintln!("{}", HarnessError::from(e));
                std::process::exit(2);
            }
        }
        return;
    }

    println!("=== PortalMaze Simulation Harness ===\n");
    info!(
        "size={} seed={:?} walls<={}% portal={} ticks start={:?}",
        config.size, config.seed, config.max_wall_percent, config.portal_duration, config.start_policy
    );

    let mut results = Vec::new();

    // 1. Grid construction and boundary wiring
    results.extend(validate_generation(&config, options.verbose));

    // 2. Wall density cap over a seed sweep
    results.extend(validate_wall_cap(&config));

    // 3. Wall / door / portal passage
    results.extend(validate_passage(&config));

    // 4. Portal abandonment
    results.extend(validate_portal_abandon(&config));

    // 5. Placement and positional queries
    results.extend(validate_placement(&config));

    // 6. Two characters meeting
    results.extend(validate_encounter(&config, options.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Results of a group, or a single failure if it could not run.
fn or_failure(name: &str, outcome: Result<Vec<TestResult>, LevelError>) -> Vec<TestResult> {
    outcome.unwrap_or_else(|e| vec![TestResult::failed(name, e)])
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(config: &LevelConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();

    let level = match Level::generate(config, &mut config.rng()) {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult::failed("generation_build", e));
            return results;
        }
    };

    if verbose {
        println!("{}", render::render(&level));
    }

    let stats = level.stats();
    let expected_internal = BoundaryGenerator::internal_boundaries_amount(config.size);
    results.push(TestResult::check(
        "generation_internal_count",
        stats.internal_total() == expected_internal,
        format!(
            "{} internal boundaries (expected {})",
            stats.internal_total(),
            expected_internal
        ),
    ));

    let expected_external = BoundaryGenerator::external_boundaries_amount(config.size);
    results.push(TestResult::check(
        "generation_external_count",
        stats.external_walls == expected_external,
        format!(
            "{} outer walls (expected {})",
            stats.external_walls, expected_external
        ),
    ));

    let open: Vec<Point> = level
        .rooms()
        .iter()
        .filter(|r| !r.is_enclosed())
        .map(|r| r.location())
        .collect();
    results.push(TestResult::check(
        "generation_rooms_enclosed",
        open.is_empty(),
        if open.is_empty() {
            "every room has four boundaries".to_string()
        } else {
            format!("{} rooms with empty slots, first at {}", open.len(), open[0])
        },
    ));

    // Each boundary is referenced back by exactly the rooms it names
    let mut mismatches = 0;
    for room in level.rooms() {
        for (direction, slot) in room.slots() {
            let Some(boundary) = slot.and_then(|id| level.boundary(id)) else {
                continue;
            };
            let neighbour = room
                .location()
                .step(direction)
                .and_then(|p| level.room_id_at(p));
            if !boundary.touches(room.id()) || boundary.other_side(room.id()) != neighbour {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult::check(
        "generation_mutual_references",
        mismatches == 0,
        format!("{} slot/boundary mismatches", mismatches),
    ));

    results
}

// ── 2. Wall cap ─────────────────────────────────────────────────────────

fn validate_wall_cap(config: &LevelConfig) -> Vec<TestResult> {
    println!("--- Wall Cap ---");
    let mut results = Vec::new();

    if config.size < 2 {
        results.push(TestResult::check(
            "wall_cap_sweep",
            true,
            "no internal edges to cap",
        ));
        return results;
    }

    let base = config.seed.unwrap_or(0);
    let mut worst = 0.0f32;
    let mut violations = 0;
    for offset in 0..50 {
        let sweep = LevelConfig {
            seed: Some(base.wrapping_add(offset)),
            ..config.clone()
        };
        match Level::generate(&sweep, &mut sweep.rng()) {
            Ok(level) => {
                let stats = level.stats();
                worst = worst.max(stats.wall_percent());
                if stats.internal_walls * 100 > config.max_wall_percent as usize * stats.internal_total() {
                    violations += 1;
                }
            }
            Err(e) => {
                results.push(TestResult::failed("wall_cap_sweep", e));
                return results;
            }
        }
    }

    results.push(TestResult::check(
        "wall_cap_sweep",
        violations == 0,
        format!(
            "50 seeds, worst {:.1}% walls (cap {}%), {} violations",
            worst, config.max_wall_percent, violations
        ),
    ));

    results
}

// ── 3. Passage ──────────────────────────────────────────────────────────

/// Rooms and directions whose boundary is of `kind` and leads somewhere.
fn crossings(level: &Level, kind: BoundaryKind) -> Vec<(Point, Direction)> {
    level
        .rooms()
        .iter()
        .flat_map(|r| Direction::ALL.map(|d| (r, d)))
        .filter(|(r, d)| {
            level
                .boundary_towards(r.id(), *d)
                .map_or(false, |b| b.kind() == kind && !b.is_one_sided())
        })
        .map(|(r, d)| (r.location(), d))
        .collect()
}

fn validate_passage(config: &LevelConfig) -> Vec<TestResult> {
    println!("--- Passage ---");
    or_failure("passage_run", check_passage(config))
}

fn check_passage(config: &LevelConfig) -> Result<Vec<TestResult>, LevelError> {
    let mut results = Vec::new();
    let mut level = Level::generate(config, &mut config.rng())?;
    let walker = level.add_character("walker")?;

    // Walls, including the outer ones
    let mut walls = 0;
    let mut moved = 0;
    for room in 0..level.rooms().len() {
        let start = level.rooms()[room].location();
        for direction in Direction::ALL {
            let kind = level
                .boundary_towards(RoomId::from_index(room), direction)
                .map(|b| b.kind());
            if kind != Some(BoundaryKind::Wall) {
                continue;
            }
            walls += 1;
            level.place(walker, start)?;
            level.try_go(walker, direction)?;
            if level.point_of(walker) != Some(start) {
                moved += 1;
            }
        }
    }
    results.push(TestResult::check(
        "passage_walls_block",
        moved == 0,
        format!("{} wall attempts, {} moved", walls, moved),
    ));

    // Doors: one step across, one step back
    let doors = crossings(&level, BoundaryKind::Door);
    let mut broken = 0;
    for &(start, direction) in &doors {
        level.place(walker, start)?;
        let there = level.try_go(walker, direction)?.crossed()
            && level.point_of(walker) == start.step(direction);
        let back = level.try_go(walker, direction.opposite())?.crossed()
            && level.point_of(walker) == Some(start);
        if !(there && back) {
            broken += 1;
        }
    }
    results.push(TestResult::check(
        "passage_doors_round_trip",
        broken == 0,
        format!("{} door crossings, {} failed", doors.len(), broken),
    ));

    // Portals: exactly `portal_duration` attempts
    let portals = crossings(&level, BoundaryKind::Portal);
    let mut wrong = 0;
    for &(start, direction) in &portals {
        level.place(walker, start)?;
        let mut attempts = 0;
        loop {
            attempts += 1;
            if level.try_go(walker, direction)?.crossed() || attempts > config.portal_duration {
                break;
            }
        }
        if attempts != config.portal_duration || level.point_of(walker) != start.step(direction) {
            wrong += 1;
        }
    }
    results.push(TestResult::check(
        "passage_portal_duration",
        wrong == 0,
        format!(
            "{} portal crossings at {} attempts each, {} wrong",
            portals.len(),
            config.portal_duration,
            wrong
        ),
    ));

    Ok(results)
}

// ── 4. Portal abandonment ───────────────────────────────────────────────

fn validate_portal_abandon(config: &LevelConfig) -> Vec<TestResult> {
    println!("--- Portal Abandonment ---");
    if config.portal_duration < 2 {
        return vec![TestResult::check(
            "portal_abandon",
            true,
            "portals open on the first attempt; nothing to abandon",
        )];
    }
    or_failure("portal_abandon", check_portal_abandon(config))
}

fn check_portal_abandon(config: &LevelConfig) -> Result<Vec<TestResult>, LevelError> {
    let mut results = Vec::new();
    let mut level = Level::generate(config, &mut config.rng())?;
    let Some(&(start, direction)) = crossings(&level, BoundaryKind::Portal).first() else {
        results.push(TestResult::check("portal_abandon", true, "level has no portals"));
        return Ok(results);
    };
    let portal = level
        .room_id_at(start)
        .and_then(|room| level.room(room))
        .and_then(|room| room.boundary(direction))
        .ok_or(LevelError::OutOfBounds {
            point: start,
            size: config.size,
        })?;

    let hero = level.add_character("hero")?;
    let rival = level.add_character("rival")?;

    // Walk away mid-charge
    level.place(hero, start)?;
    level.try_go(hero, direction)?;
    let turned = Direction::ALL
        .into_iter()
        .find(|d| *d != direction)
        .unwrap_or(direction.opposite());
    level.try_go(hero, turned)?;
    let state = level.boundary(portal).and_then(|b| b.portal()).map(|p| p.state());
    results.push(TestResult::check(
        "portal_abandon_on_turn",
        state == Some(PortalState::Idle),
        format!("state after turning away: {:?}", state),
    ));

    // Someone else steps in mid-charge
    level.place(hero, start)?;
    level.try_go(hero, direction)?;
    let across = start.step(direction).ok_or(LevelError::OutOfBounds {
        point: start,
        size: config.size,
    })?;
    level.place(rival, across)?;
    let rival_try = level.try_go(rival, direction.opposite())?;
    let hero_try = level.try_go(hero, direction)?;
    let expected = Passage::Charging {
        elapsed: 1,
        required: config.portal_duration,
    };
    results.push(TestResult::check(
        "portal_abandon_on_rival",
        rival_try == expected && hero_try == expected,
        format!("rival {:?}, hero {:?}", rival_try, hero_try),
    ));

    Ok(results)
}

// ── 5. Placement ────────────────────────────────────────────────────────

fn validate_placement(config: &LevelConfig) -> Vec<TestResult> {
    println!("--- Placement ---");
    or_failure("placement_run", check_placement(config))
}

fn check_placement(config: &LevelConfig) -> Result<Vec<TestResult>, LevelError> {
    let mut results = Vec::new();
    let names = ["ann", "bob", "cat", "dan"];
    let mut level = Level::build(config, &names, &mut config.rng())?;
    let ids: Vec<CharacterId> = level.characters().map(|(id, _)| id).collect();

    let placed = ids.iter().filter(|&&id| level.room_of(id).is_some()).count();
    results.push(TestResult::check(
        "placement_all_placed",
        placed == names.len(),
        format!("{}/{} characters placed ({:?})", placed, names.len(), config.start_policy),
    ));

    if config.start_policy == StartPolicy::Corner {
        let at_origin = ids
            .iter()
            .filter(|&&id| level.point_of(id) == Some(Point::new(0, 0)))
            .count();
        results.push(TestResult::check(
            "placement_corner",
            at_origin == names.len(),
            format!("{} characters at (0, 0)", at_origin),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
    let mut inconsistent = 0;
    for turn in 0..1000 {
        let who = ids[rng.gen_range(0..ids.len())];
        level.try_go(who, Direction::ALL[rng.gen_range(0..4)])?;
        if turn % ids.len() == 0 {
            level.tick();
        }
        for &id in &ids {
            let consistent = level
                .room_of(id)
                .map_or(false, |room| level.characters_at(room).any(|c| c == id));
            if !consistent {
                inconsistent += 1;
            }
        }
    }
    results.push(TestResult::check(
        "placement_query_consistency",
        inconsistent == 0,
        format!("1000 random moves, {} inconsistent lookups", inconsistent),
    ));

    Ok(results)
}

// ── 6. Encounter ────────────────────────────────────────────────────────

/// Shortest non-wall route between two rooms.
fn route(level: &Level, from: RoomId, to: RoomId) -> Option<Vec<Direction>> {
    let mut queue = VecDeque::from([(from, Vec::new())]);
    let mut visited = HashSet::from([from]);

    while let Some((current, path)) = queue.pop_front() {
        if current == to {
            return Some(path);
        }
        for direction in Direction::ALL {
            let next = level
                .boundary_towards(current, direction)
                .filter(|b| b.kind() != BoundaryKind::Wall)
                .and_then(|b| b.other_side(current));
            if let Some(next) = next {
                if visited.insert(next) {
                    let mut path = path.clone();
                    path.push(direction);
                    queue.push_back((next, path));
                }
            }
        }
    }
    None
}

fn validate_encounter(config: &LevelConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Encounter ---");
    or_failure("encounter_run", check_encounter(config, verbose))
}

fn check_encounter(config: &LevelConfig, verbose: bool) -> Result<Vec<TestResult>, LevelError> {
    let mut results = Vec::new();
    let base = config.seed.unwrap_or(0);

    // First seed from the configured one whose 4x4 layout joins the corners
    let mut found = None;
    for offset in 0..100 {
        let candidate = LevelConfig {
            size: 4,
            seed: Some(base.wrapping_add(offset)),
            ..config.clone()
        };
        let level = Level::generate(&candidate, &mut candidate.rng())?;
        let corners = (
            level.room_id_at(Point::new(0, 0)),
            level.room_id_at(Point::new(3, 3)),
        );
        if let (Some(from), Some(to)) = corners {
            if let Some(path) = route(&level, from, to) {
                found = Some((candidate, level, path));
                break;
            }
        }
    }
    let Some((candidate, mut level, path)) = found else {
        results.push(TestResult::check(
            "encounter_route",
            false,
            "no connected 4x4 layout in 100 seeds",
        ));
        return Ok(results);
    };
    debug!("encounter seed {:?}, route {:?}", candidate.seed, path);

    let hunter = level.add_character("hunter")?;
    let prey = level.add_character("prey")?;
    level.place(hunter, Point::new(0, 0))?;
    level.place(prey, Point::new(3, 3))?;

    let mut attempts = 0;
    for &direction in &path {
        for _ in 0..candidate.portal_duration {
            attempts += 1;
            if level.try_go(hunter, direction)?.crossed() {
                break;
            }
        }
    }

    if verbose {
        println!("{}", render::render(&level));
    }

    let meeting = level.room_of(prey);
    let met = meeting.is_some()
        && level.room_of(hunter) == meeting
        && meeting.map_or(0, |room| level.characters_at(room).count()) == 2;
    results.push(TestResult::check(
        "encounter_meet",
        met,
        format!(
            "seed {:?}: {} steps, {} attempts, hunter at {:?}",
            candidate.seed,
            path.len(),
            attempts,
            level.point_of(hunter)
        ),
    ));

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("portalmaze-simtest").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_flags() {
        let options = options(&["--verbose", "--seed", "9", "--size", "5"]).unwrap();
        assert!(options.verbose);
        assert!(!options.json);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.size, Some(5));
        assert_eq!(options.config_path, None);

        let config = options.level_config().unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.size, 5);
    }

    #[test]
    fn test_parse_config_path_and_json() {
        let options = options(&["-v", "--json", "--config", "level.json"]).unwrap();
        assert!(options.verbose);
        assert!(options.json);
        assert_eq!(options.config_path, Some(PathBuf::from("level.json")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(options(&["--seed", "x"]).is_err());
        assert!(options(&["--seed", "-3"]).is_err());
        assert!(options(&["--size"]).is_err());
        assert!(options(&["--frobnicate"]).is_err());
    }

    #[test]
    fn test_bad_size_override_is_reported() {
        let options = options(&["--size", "0"]).unwrap();
        let err = options.level_config().unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_all_groups_pass_on_seeded_config() {
        for policy in [StartPolicy::Random, StartPolicy::Corner] {
            let config = LevelConfig {
                size: 6,
                seed: Some(42),
                start_policy: policy,
                ..LevelConfig::default()
            };
            let mut results = Vec::new();
            results.extend(validate_generation(&config, false));
            results.extend(validate_wall_cap(&config));
            results.extend(validate_passage(&config));
            results.extend(validate_portal_abandon(&config));
            results.extend(validate_placement(&config));
            results.extend(validate_encounter(&config, false));
            for r in &results {
                assert!(r.passed, "{}: {}", r.name, r.detail);
            }
        }
    }

    #[test]
    fn test_single_room_level() {
        let config = LevelConfig {
            size: 1,
            seed: Some(3),
            ..LevelConfig::default()
        };
        for r in validate_generation(&config, false)
            .into_iter()
            .chain(validate_wall_cap(&config))
            .chain(validate_passage(&config))
        {
            assert!(r.passed, "{}: {}", r.name, r.detail);
        }
    }

    #[test]
    fn test_summary_serializes() {
        let config = LevelConfig {
            size: 3,
            seed: Some(1),
            ..LevelConfig::default()
        };
        let level = Level::build(&config, &["hunter", "prey"], &mut config.rng()).unwrap();
        let json = serde_json::to_value(summarize(&config, &level)).unwrap();
        assert_eq!(json["config"]["size"], 3);
        assert_eq!(json["characters"].as_array().unwrap().len(), 2);
        assert_eq!(json["map"].as_array().unwrap().len(), 9);
    }
}
