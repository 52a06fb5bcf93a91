//! Unit and scenario tests for rg-sim.

use rg_core::{CellId, SimConfig, Tick, TrainId};
use rg_spatial::{AStarPathfinder, Grid, Route};

use crate::{Sim, SimBuilder, SimObserver, TickReport, Train, TrainState};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `A###B`: A at (0,0), B at (4,0).
const CORRIDOR: &str = "A###B";

/// A corridor with a loop underneath, so the top line can be bypassed.
const LOOP: &str = "
A###B
#...#
#####
";

fn test_config() -> SimConfig {
    SimConfig {
        dwell_ticks: 3,
        dwell_retry_ticks: 2,
        ..SimConfig::default()
    }
}

fn sim_on(map: &str) -> Sim<AStarPathfinder> {
    SimBuilder::new(test_config(), Grid::from_ascii(map).unwrap(), AStarPathfinder::default())
        .build()
        .unwrap()
}

fn cell(x: i32, y: i32) -> CellId {
    CellId::new(x, y)
}

/// A non-cyclic train on `cells`, standing at `index`.
fn train(id: u32, cells: &[(i32, i32)], index: usize, priority: u8) -> Train {
    let route = Route { cells: cells.iter().map(|&c| CellId::from(c)).collect(), cost: 0 };
    let mut t = Train::new(TrainId(id), format!("t{id}"), route, priority, false);
    t.path_index = index;
    t
}

const EASTBOUND: [(i32, i32); 5] = [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)];
const WESTBOUND: [(i32, i32); 5] = [(4, 0), (3, 0), (2, 0), (1, 0), (0, 0)];

/// Records what the simulation reports.
#[derive(Default)]
struct Recorder {
    tick_starts: u64,
    spawned:     Vec<TrainId>,
    removed:     Vec<TrainId>,
    failed:      usize,
    deadlocks:   Vec<Tick>,
    snapshots:   Vec<Tick>,
    stations:    Vec<CellId>,
    /// Non-station cells seen holding two trains at once.
    collisions:  Vec<(Tick, CellId)>,
    finished:    Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, _tick: Tick) {
        self.tick_starts += 1;
    }

    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        self.spawned.extend(&report.spawned);
        self.removed.extend(&report.removed);
        self.failed += report.failed.len();
        if report.deadlock {
            self.deadlocks.push(tick);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, trains: &[Train]) {
        self.snapshots.push(tick);
        for (i, a) in trains.iter().enumerate() {
            for b in &trains[i + 1..] {
                let c = a.current_cell();
                if c == b.current_cell() && !self.stations.contains(&c) {
                    self.collisions.push((tick, c));
                }
            }
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.finished = Some(final_tick);
    }
}

fn recorder_for(sim: &Sim<AStarPathfinder>) -> Recorder {
    Recorder {
        stations: sim.grid().stations().map(|(_, c)| c).collect(),
        ..Recorder::default()
    }
}

// ── Train ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod train {
    use super::*;

    #[test]
    fn new_train_waits_at_origin() {
        let t = train(0, &EASTBOUND, 0, 5);
        assert_eq!(t.state, TrainState::Waiting);
        assert_eq!(t.from, cell(0, 0));
        assert_eq!(t.to, cell(4, 0));
        assert_eq!(t.current_cell(), cell(0, 0));
        assert_eq!(t.next_cell(), Some(cell(1, 0)));
        assert!(!t.at_destination());
    }

    #[test]
    fn lookahead_clips_at_destination() {
        let mut t = train(0, &EASTBOUND, 0, 5);
        assert_eq!(t.lookahead(3), [cell(1, 0), cell(2, 0), cell(3, 0)]);
        t.path_index = 3;
        assert_eq!(t.lookahead(3), [cell(4, 0)]);
        t.path_index = 4;
        assert!(t.lookahead(3).is_empty());
        assert!(t.at_destination());
    }

    #[test]
    fn only_moving_trains_claim_next_cell() {
        let mut t = train(0, &EASTBOUND, 1, 5);
        assert_eq!(t.occupant().next, None);
        t.state = TrainState::Moving;
        assert_eq!(t.occupant().next, Some(cell(2, 0)));
        assert_eq!(t.occupant().cell, cell(1, 0));
    }

    #[test]
    fn splice_keeps_travelled_prefix() {
        let mut t = train(0, &EASTBOUND, 2, 5);
        t.splice(Route { cells: vec![cell(2, 0), cell(2, 1), cell(3, 1)], cost: 0 });
        assert_eq!(t.path, vec![cell(0, 0), cell(1, 0), cell(2, 0), cell(2, 1), cell(3, 1)]);
        assert_eq!(t.current_cell(), cell(2, 0));
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;
    use crate::TickEngine;

    fn corridor() -> Grid {
        Grid::from_ascii(CORRIDOR).unwrap()
    }

    #[test]
    fn higher_priority_reserves_first() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let low = train(0, &EASTBOUND, 0, 2);
        let high = train(1, &EASTBOUND, 0, 9);

        let out = engine.advance(vec![low, high]);
        assert_eq!(out.trains[0].id, TrainId(1), "processing order is by priority");
        assert_eq!(out.trains[0].state, TrainState::Moving);
        assert_eq!(out.trains[1].state, TrainState::Waiting);
        assert_eq!(out.trains[1].waiting_ticks, 1);
    }

    #[test]
    fn equal_priorities_keep_relative_order() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let out = engine.advance(vec![
            train(5, &EASTBOUND, 0, 3),
            train(2, &EASTBOUND, 0, 3),
            train(9, &EASTBOUND, 0, 3),
        ]);
        let ids: Vec<u32> = out.trains.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn moving_train_steps_a_cell_after_full_progress() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let mut t = train(0, &EASTBOUND, 1, 5);
        t.state = TrainState::Moving;
        t.progress = 0.75;

        let out = engine.advance(vec![t]);
        let t = &out.trains[0];
        assert_eq!(t.path_index, 2);
        assert_eq!(t.progress, 0.0);
        assert_eq!(t.state, TrainState::Waiting);
    }

    #[test]
    fn speed_multiplier_scales_progress() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let mut t = train(0, &EASTBOUND, 0, 5);
        t.state = TrainState::Moving;

        let out = TickEngine::new(&grid, &pf, &cfg, 2.0).advance(vec![t]);
        assert_eq!(out.trains[0].progress, 0.5);
    }

    #[test]
    fn arrived_is_visible_for_one_tick() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);

        let out = engine.advance(vec![train(0, &EASTBOUND, 4, 5)]);
        assert_eq!(out.trains[0].state, TrainState::Arrived);
        assert!(out.removed.is_empty());

        let out = engine.advance(out.trains);
        assert!(out.trains.is_empty());
        assert_eq!(out.removed, vec![TrainId(0)]);
    }

    #[test]
    fn destination_platform_is_shared() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        // `incoming` is one cell from B; `parked` stands on B, blocked itself.
        let incoming = train(0, &EASTBOUND, 3, 9);
        let parked = train(1, &WESTBOUND, 0, 1);

        let out = engine.advance(vec![parked, incoming]);
        assert_eq!(out.trains[0].id, TrainId(0));
        assert_eq!(out.trains[0].state, TrainState::Moving);
        assert_eq!(out.trains[1].state, TrainState::Waiting);
    }

    #[test]
    fn occupied_track_blocks_window() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let east = train(0, &EASTBOUND, 1, 5);
        let west = train(1, &WESTBOUND, 1, 5);

        let out = engine.advance(vec![east, west]);
        assert!(out.trains.iter().all(|t| t.state == TrainState::Waiting));
        assert!(out.trains.iter().all(|t| t.waiting_ticks == 1));
    }

    #[test]
    fn blocked_train_reroutes_around_reservation() {
        let grid = Grid::from_ascii(LOOP).unwrap();
        let (pf, cfg) = (AStarPathfinder::default(), SimConfig::default());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        // `blocker` is about to move west along the top line and reserves it.
        let blocker = train(0, &[(3, 0), (2, 0), (1, 0), (0, 0)], 0, 9);
        let follower = train(1, &EASTBOUND, 0, 1);

        let out = engine.advance(vec![blocker, follower]);
        let f = out.trains.iter().find(|t| t.id == TrainId(1)).unwrap();
        assert_eq!(f.state, TrainState::Moving);
        assert_eq!(f.path.first(), Some(&cell(0, 0)));
        assert_eq!(f.path.last(), Some(&cell(4, 0)));
        assert!(!f.path.contains(&cell(2, 0)), "path {:?}", f.path);
        for pair in f.path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn soft_reroute_fires_on_the_interval() {
        let grid = Grid::from_ascii(
            "
A#####B
#.....#
#######
",
        )
        .unwrap();
        let pf = AStarPathfinder::default();
        // Slow enough that the blockers never finish their step here.
        let cfg = SimConfig { train_speed: 0.05, soft_reroute_interval: 4, ..SimConfig::default() };
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);

        // One blocker reserves (3,0),(4,0) on the top line, the other (3,2)
        // on the bottom line, so no strict reroute exists.
        let mut top = train(0, &[(2, 0), (3, 0), (4, 0)], 0, 9);
        top.state = TrainState::Moving;
        let mut bottom = train(1, &[(2, 2), (3, 2)], 0, 8);
        bottom.state = TrainState::Moving;
        let top_line: Vec<(i32, i32)> = (0..=6).map(|x| (x, 0)).collect();
        let follower = train(2, &top_line, 0, 1);

        let mut trains = vec![top, bottom, follower];
        for tick in 0..cfg.soft_reroute_interval {
            trains = engine.advance(trains).trains;
            let f = trains.iter().find(|t| t.id == TrainId(2)).unwrap();
            assert_eq!(f.state, TrainState::Waiting, "tick {tick}");
            assert_eq!(f.waiting_ticks, tick + 1);
            assert!(f.path.contains(&cell(3, 0)), "tick {tick}: {:?}", f.path);
        }

        trains = engine.advance(trains).trains;
        let f = trains.iter().find(|t| t.id == TrainId(2)).unwrap();
        assert_eq!(f.state, TrainState::Moving);
        assert_eq!(f.waiting_ticks, 0);
        assert!(f.path.contains(&cell(3, 2)), "path {:?}", f.path);
        assert!(!f.path.contains(&cell(3, 0)));
        assert_eq!(f.path.last(), Some(&cell(6, 0)));
        assert!(trains.iter().filter(|t| t.id != TrainId(2)).all(|t| t.state == TrainState::Moving));
    }

    #[test]
    fn cyclic_arrival_starts_dwelling() {
        let (grid, pf, cfg) = (corridor(), AStarPathfinder::default(), test_config());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let mut t = train(0, &EASTBOUND, 4, 5);
        t.cyclic = true;
        t.state = TrainState::Arrived;

        let out = engine.advance(vec![t]);
        assert_eq!(out.trains[0].state, TrainState::Dwelling);
        assert_eq!(out.trains[0].dwell_remaining, 3);
        assert!(out.removed.is_empty());
    }

    #[test]
    fn dwell_retries_without_return_path() {
        let mut grid = Grid::from_ascii(CORRIDOR).unwrap();
        grid.erase(cell(2, 0)).unwrap();
        let (pf, cfg) = (AStarPathfinder::default(), test_config());
        let engine = TickEngine::new(&grid, &pf, &cfg, 1.0);
        let mut t = train(0, &EASTBOUND, 4, 5);
        t.cyclic = true;
        t.state = TrainState::Dwelling;
        t.dwell_remaining = 1;

        let out = engine.advance(vec![t]);
        assert_eq!(out.trains[0].state, TrainState::Dwelling);
        assert_eq!(out.trains[0].dwell_remaining, 2);
    }
}

// ── Deadlock ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod deadlock {
    use super::*;
    use crate::{is_deadlocked, DeadlockMonitor};

    fn waiting(id: u32, ticks: u32) -> Train {
        let mut t = train(id, &EASTBOUND, 0, 5);
        t.waiting_ticks = ticks;
        t
    }

    #[test]
    fn needs_two_or_more_trains() {
        assert!(!is_deadlocked(&[], 20));
        assert!(!is_deadlocked(&[waiting(0, 100)], 20));
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!is_deadlocked(&[waiting(0, 20), waiting(1, 50)], 20));
        assert!(is_deadlocked(&[waiting(0, 21), waiting(1, 50)], 20));
    }

    #[test]
    fn any_non_waiting_train_clears_it() {
        let mut moving = waiting(1, 0);
        moving.state = TrainState::Moving;
        assert!(!is_deadlocked(&[waiting(0, 30), moving], 20));

        let mut dwelling = waiting(1, 30);
        dwelling.state = TrainState::Dwelling;
        assert!(!is_deadlocked(&[waiting(0, 30), dwelling], 20));
    }

    #[test]
    fn monitor_tracks_flag() {
        let mut m = DeadlockMonitor::new();
        let stuck = [waiting(0, 30), waiting(1, 30)];
        assert!(m.update(Tick(1), &stuck, 20));
        assert!(m.warning());
        assert!(!m.update(Tick(2), &stuck[..1], 20));
        assert!(!m.warning());
    }

    #[test]
    fn head_on_trains_raise_warning() {
        let mut sim = sim_on(CORRIDOR);
        sim.trains = vec![train(0, &EASTBOUND, 1, 5), train(1, &WESTBOUND, 1, 5)];
        sim.next_train_id = TrainId(2);
        let mut rec = recorder_for(&sim);

        sim.run_ticks(20, &mut rec);
        assert!(rec.deadlocks.is_empty());
        assert!(!sim.deadlock_warning());

        let report = sim.step(&mut rec);
        assert!(report.deadlock);
        assert!(sim.deadlock_warning());
        assert!(sim.trains().iter().all(|t| t.waiting_ticks == 21));
        assert!(rec.collisions.is_empty());
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use std::time::Duration;

    use crate::TickScheduler;

    #[test]
    fn carries_remainder() {
        let mut s = TickScheduler::new(100, 10);
        assert_eq!(s.advance(Duration::from_millis(250)), 2);
        assert_eq!(s.pending(), Duration::from_millis(50));
        assert_eq!(s.advance(Duration::from_millis(50)), 1);
        assert_eq!(s.pending(), Duration::ZERO);
    }

    #[test]
    fn speed_shortens_interval() {
        let mut s = TickScheduler::new(100, 10);
        s.set_speed(4.0);
        assert_eq!(s.interval(), Duration::from_millis(25));
        assert_eq!(s.advance(Duration::from_millis(100)), 4);
    }

    #[test]
    fn catch_up_is_capped() {
        let mut s = TickScheduler::new(100, 10);
        assert_eq!(s.advance(Duration::from_secs(60)), 10);
        assert_eq!(s.pending(), Duration::ZERO);
    }

    #[test]
    fn reset_drops_carry() {
        let mut s = TickScheduler::new(100, 10);
        s.advance(Duration::from_millis(99));
        s.reset();
        assert_eq!(s.advance(Duration::from_millis(1)), 0);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rg_dispatch::ScheduleItem;

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_stopped_at_tick_zero() {
        let sim = sim_on(CORRIDOR);
        assert!(!sim.is_running());
        assert_eq!(sim.now(), Tick(0));
        assert!(sim.trains().is_empty());
        assert_eq!(sim.speed(), 1.0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SimConfig { lookahead_cells: 0, ..SimConfig::default() };
        let result =
            SimBuilder::new(config, Grid::from_ascii(CORRIDOR).unwrap(), AStarPathfinder::default())
                .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_speed_rejected() {
        let result = SimBuilder::new(
            SimConfig::default(),
            Grid::from_ascii(CORRIDOR).unwrap(),
            AStarPathfinder::default(),
        )
        .speed(f64::NAN)
        .build();
        assert!(matches!(result, Err(SimError::InvalidSpeed(_))));
    }

    #[test]
    fn schedule_is_queued() {
        let sim = SimBuilder::new(
            SimConfig::default(),
            Grid::from_ascii(CORRIDOR).unwrap(),
            AStarPathfinder::default(),
        )
        .schedule(vec![ScheduleItem::new("A", "B", Tick(4), 5, false)])
        .build()
        .unwrap();
        assert_eq!(sim.dispatch_queue().len(), 1);
    }
}

// ── Control ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod control {
    use std::time::Duration;

    use super::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn speed_must_be_positive_and_finite() {
        let mut sim = sim_on(CORRIDOR);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(sim.set_speed(bad), Err(SimError::InvalidSpeed(_))));
        }
        sim.set_speed(2.0).unwrap();
        assert_eq!(sim.speed(), 2.0);
    }

    #[test]
    fn pump_runs_only_while_started() {
        let mut sim = sim_on(CORRIDOR);
        assert_eq!(sim.pump(Duration::from_millis(500), &mut NoopObserver), 0);
        assert_eq!(sim.now(), Tick(0));

        sim.start();
        assert_eq!(sim.pump(Duration::from_millis(250), &mut NoopObserver), 2);
        assert_eq!(sim.now(), Tick(2));

        // 50 ms carried over plus 100 ms at a 50 ms interval.
        sim.set_speed(2.0).unwrap();
        assert_eq!(sim.pump(Duration::from_millis(100), &mut NoopObserver), 3);
        assert_eq!(sim.now(), Tick(5));
    }

    #[test]
    fn reset_clears_everything_but_the_map() {
        let mut sim = sim_on(CORRIDOR);
        sim.dispatch_manual("A", "B", 5, false).unwrap();
        sim.generate_batch(3, 5, 1..=10).unwrap();
        sim.start();
        sim.run_ticks(3, &mut NoopObserver);

        sim.reset();
        assert!(!sim.is_running());
        assert!(sim.trains().is_empty());
        assert!(sim.dispatch_queue().is_empty());
        assert_eq!(sim.now(), Tick(0));
        assert_eq!(sim.grid().station_count(), 2);
        assert_eq!(sim.dispatch_manual("A", "B", 5, false).unwrap(), TrainId(0));
    }

    #[test]
    fn editing_only_while_stopped() {
        let mut sim = sim_on(CORRIDOR);
        sim.start();
        assert!(matches!(sim.set_track(cell(0, 0)), Err(SimError::EditWhileRunning)));
        assert!(matches!(sim.set_station(cell(2, 0), "M"), Err(SimError::EditWhileRunning)));
        assert!(matches!(sim.erase(cell(1, 0)), Err(SimError::EditWhileRunning)));
        assert!(sim.grid_mut().is_err());

        sim.stop();
        sim.set_station(cell(2, 0), "M").unwrap();
        assert_eq!(sim.grid().station("M"), Some(cell(2, 0)));
        assert!(matches!(sim.erase(cell(9, 9)), Err(SimError::Spatial(_))));
    }

    #[test]
    fn snapshots_follow_output_interval() {
        let mut sim = SimBuilder::new(
            SimConfig { output_interval_ticks: 2, ..SimConfig::default() },
            Grid::from_ascii(CORRIDOR).unwrap(),
            AStarPathfinder::default(),
        )
        .build()
        .unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(6, &mut rec);
        assert_eq!(rec.tick_starts, 6);
        assert_eq!(rec.snapshots, vec![Tick(0), Tick(2), Tick(4)]);

        sim.config.output_interval_ticks = 0;
        sim.run_ticks(4, &mut rec);
        assert_eq!(rec.snapshots.len(), 3);
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch {
    use rg_dispatch::{DispatchError, ScheduleItem};

    use super::*;
    use crate::SimError;

    #[test]
    fn manual_dispatch_creates_waiting_train() {
        let mut sim = sim_on(CORRIDOR);
        let id = sim.dispatch_manual(" A ", "B", 7, true).unwrap();
        let t = sim.train(id).unwrap();
        assert_eq!(t.state, TrainState::Waiting);
        assert_eq!(t.priority, 7);
        assert!(t.cyclic);
        assert_eq!(t.path.len(), 5);
    }

    #[test]
    fn manual_failures_are_returned() {
        let mut sim = sim_on("A#.#B");
        assert!(matches!(
            sim.dispatch_manual("A", "B", 5, false),
            Err(SimError::Dispatch(DispatchError::NoRoute { .. }))
        ));
        assert!(matches!(
            sim.dispatch_manual("A", "A", 5, false),
            Err(SimError::Dispatch(DispatchError::SameEndpoints(_)))
        ));
        assert!(matches!(
            sim.dispatch_manual("A", "B", 11, false),
            Err(SimError::Dispatch(DispatchError::InvalidPriority(11)))
        ));
        assert!(sim.trains().is_empty());
    }

    #[test]
    fn queued_failures_are_reported_not_dropped() {
        let mut sim = sim_on(CORRIDOR);
        sim.enqueue_schedule(ScheduleItem::new("A", "Nowhere", Tick(0), 5, false));
        sim.enqueue_schedule(ScheduleItem::new("A", "B", Tick(0), 5, false));

        let report = sim.step(&mut crate::NoopObserver);
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].error, DispatchError::UnknownStation(_)));
        assert_eq!(report.failed[0].request.to, "Nowhere");
        assert!(sim.dispatch_queue().schedule().iter().all(|i| i.dispatched));
    }

    #[test]
    fn json_schedule_fires_at_offset() {
        let mut sim = sim_on(CORRIDOR);
        let load = sim
            .load_schedule_json(
                r#"[{"timeOffset": 3, "from": "A", "to": "B", "priority": 5},
                    {"timeOffset": 1, "from": "A", "to": "Q", "priority": 5}]"#,
            )
            .unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.rejected.len(), 1);

        let mut rec = Recorder::default();
        sim.run_ticks(3, &mut rec);
        assert!(rec.spawned.is_empty());
        sim.step(&mut rec);
        assert_eq!(rec.spawned, vec![TrainId(0)]);
    }

    #[test]
    fn random_batch_spawns_every_item() {
        let mut sim = sim_on("A###B###C");
        assert_eq!(sim.generate_batch(5, 2, 1..=10).unwrap(), 5);
        let mut rec = Recorder::default();
        sim.run_ticks(10, &mut rec);
        assert_eq!(rec.spawned.len(), 5);
        assert_eq!(rec.failed, 0);
    }

    #[test]
    fn batch_needs_two_stations() {
        let mut sim = sim_on("A###.");
        assert!(matches!(
            sim.generate_batch(1, 1, 1..=10),
            Err(SimError::Dispatch(DispatchError::NotEnoughStations(1)))
        ));
    }

    #[test]
    fn same_seed_same_batch() {
        let mut a = sim_on("A###B###C");
        let mut b = sim_on("A###B###C");
        a.generate_batch(10, 1, 1..=10).unwrap();
        b.generate_batch(10, 1, 1..=10).unwrap();
        let pa: Vec<_> = a.dispatch_queue().batch().map(|(t, i)| (t, i.clone())).collect();
        let pb: Vec<_> = b.dispatch_queue().batch().map(|(t, i)| (t, i.clone())).collect();
        assert_eq!(pa, pb);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn corridor_both_directions_complete() {
        let mut sim = sim_on(CORRIDOR);
        let east = sim.dispatch_manual("A", "B", 5, false).unwrap();
        let west = sim.dispatch_manual("B", "A", 5, false).unwrap();
        let mut rec = recorder_for(&sim);

        let ran = sim.run_until_idle(500, &mut rec);
        assert!(ran < 500, "corridor did not clear");
        assert!(sim.trains().is_empty());
        assert!(rec.removed.contains(&east));
        assert!(rec.removed.contains(&west));
        assert!(rec.collisions.is_empty(), "{:?}", rec.collisions);
        assert!(rec.deadlocks.is_empty());
        assert_eq!(rec.finished, Some(sim.now()));
    }

    #[test]
    fn opposing_train_waits_for_the_corridor() {
        let mut sim = sim_on(CORRIDOR);
        let east = sim.dispatch_manual("A", "B", 5, false).unwrap();
        let mut rec = recorder_for(&sim);

        while sim.train(east).unwrap().path_index < 2 {
            sim.step(&mut rec);
            assert!(sim.now() < Tick(100), "eastbound train never got going");
        }
        let west = sim.dispatch_manual("B", "A", 5, false).unwrap();

        let mut west_waited = false;
        for _ in 0..500 {
            if sim.trains().is_empty() {
                break;
            }
            sim.step(&mut rec);
            let east_on_line = sim.train(east).is_some_and(|t| t.state != TrainState::Arrived);
            if let Some(w) = sim.train(west) {
                if east_on_line {
                    assert_ne!(w.state, TrainState::Moving, "{} left B early", sim.now());
                    assert_eq!(w.path_index, 0);
                }
                west_waited |= w.waiting_ticks > 0;
            }
        }

        assert!(west_waited);
        assert!(sim.trains().is_empty());
        assert_eq!(rec.removed, vec![east, west]);
        assert!(rec.collisions.is_empty(), "{:?}", rec.collisions);
    }

    #[test]
    fn priority_wins_and_waiting_count_resets() {
        let mut sim = sim_on(CORRIDOR);
        let low = sim.dispatch_manual("A", "B", 2, false).unwrap();
        let high = sim.dispatch_manual("A", "B", 9, false).unwrap();
        let mut rec = recorder_for(&sim);

        sim.step(&mut rec);
        assert_eq!(sim.trains()[0].id, high);
        assert_eq!(sim.train(high).unwrap().state, TrainState::Moving);
        assert_eq!(sim.train(low).unwrap().waiting_ticks, 1);

        let mut prev = 1;
        let mut departed = false;
        for _ in 0..200 {
            sim.step(&mut rec);
            let Some(t) = sim.train(low) else { break };
            match t.state {
                TrainState::Waiting if !departed => {
                    assert_eq!(t.waiting_ticks, prev + 1);
                    prev = t.waiting_ticks;
                    // The low-priority train stays home while the other is on the line.
                    assert_eq!(t.path_index, 0);
                }
                TrainState::Moving if !departed => {
                    assert_eq!(t.waiting_ticks, 0);
                    departed = true;
                }
                _ => {}
            }
        }
        assert!(departed);
        assert!(rec.collisions.is_empty(), "{:?}", rec.collisions);
    }

    #[test]
    fn cyclic_train_shuttles() {
        let mut sim = sim_on(CORRIDOR);
        let (a, b) = (cell(0, 0), cell(4, 0));
        let id = sim.dispatch_manual("A", "B", 5, true).unwrap();

        let mut turns = Vec::new();
        let mut last = TrainState::Waiting;
        for _ in 0..300 {
            sim.step(&mut NoopObserver);
            let t = sim.train(id).expect("cyclic trains are never removed");
            if last == TrainState::Dwelling && t.state == TrainState::Waiting {
                assert_eq!(t.path_index, 0);
                assert_eq!(t.path.first(), Some(&t.from));
                assert_eq!(t.path.last(), Some(&t.to));
                turns.push((t.from, t.to));
            }
            last = t.state;
        }
        assert!(turns.len() >= 3, "turns: {turns:?}");
        assert_eq!(turns[0], (b, a));
        assert_eq!(turns[1], (a, b));
        assert_eq!(turns[2], (b, a));
    }

    #[test]
    fn edited_map_forces_reroute() {
        let mut sim = sim_on(LOOP);
        let id = sim.dispatch_manual("A", "B", 5, false).unwrap();
        assert!(sim.train(id).unwrap().path.contains(&cell(2, 0)));

        sim.erase(cell(2, 0)).unwrap();
        sim.step(&mut NoopObserver);
        let t = sim.train(id).unwrap();
        assert_eq!(t.state, TrainState::Moving);
        assert!(!t.path.contains(&cell(2, 0)));
        assert_eq!(t.path.last(), Some(&cell(4, 0)));

        let ran = sim.run_until_idle(500, &mut NoopObserver);
        assert!(ran < 500);
    }
}
