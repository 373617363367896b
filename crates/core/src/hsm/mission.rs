//! Top-level mission sequencer
//!
//! Owns one chart instance per mission phase and runs exactly one of them
//! at a time. Every live event is delegated to the active sub-machine; the
//! event that comes back decides whether the phase is over. A consumed
//! event never reaches this layer, so completion conditions are expressed
//! purely in terms of what a sub-machine declines to handle.
//!
//! Sub-machines are initialized once, at mission init, and never again.
//! Re-entering a phase hands `Entry` to the sub-machine's current state,
//! so each phase resumes where it last left off. The unload charts end
//! their cycle back in their retreat state for exactly this reason.

use crate::events::{Event, EventKind, TapeFlags, WireFlags};
use crate::hsm::ammo_load::AmmoLoadChart;
use crate::hsm::ammo_search::AmmoSearchChart;
use crate::hsm::first_target_search::FirstTargetSearchChart;
use crate::hsm::second_target_approach::SecondTargetApproachChart;
use crate::hsm::second_target_search::SecondTargetSearchChart;
use crate::hsm::target_unload::TargetUnloadChart;
use crate::hsm::{init_chart, run_chart, Chart, Context, Verdict};
use crate::runtime::timer;
use crate::services::TapeSide;

/// Mission phase, in loop order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InitPseudo,
    AmmoSearch,
    AmmoLoad,
    FirstTargetSearch,
    FirstTargetUnload,
    SecondTargetSearch,
    SecondTargetApproach,
    SecondTargetUnload,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Phase::InitPseudo => "init",
            Phase::AmmoSearch => "ammo-search",
            Phase::AmmoLoad => "ammo-load",
            Phase::FirstTargetSearch => "first-target-search",
            Phase::FirstTargetUnload => "first-target-unload",
            Phase::SecondTargetSearch => "second-target-search",
            Phase::SecondTargetApproach => "second-target-approach",
            Phase::SecondTargetUnload => "second-target-unload",
        }
    }
}

/// The whole autonomous behavior, one phase active at a time.
#[derive(Debug)]
pub struct MissionChart {
    phase: Phase,
    ammo_search: AmmoSearchChart,
    ammo_load: AmmoLoadChart,
    first_search: FirstTargetSearchChart,
    first_unload: TargetUnloadChart,
    second_search: SecondTargetSearchChart,
    second_approach: SecondTargetApproachChart,
    second_unload: TargetUnloadChart,
}

impl MissionChart {
    pub const fn new() -> Self {
        Self {
            phase: Phase::InitPseudo,
            ammo_search: AmmoSearchChart::new(),
            ammo_load: AmmoLoadChart::new(),
            first_search: FirstTargetSearchChart::new(),
            first_unload: TargetUnloadChart::new(),
            second_search: SecondTargetSearchChart::new(),
            second_approach: SecondTargetApproachChart::new(),
            second_unload: TargetUnloadChart::new(),
        }
    }

    /// Currently active mission phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Default for MissionChart {
    fn default() -> Self {
        Self::new()
    }
}

const FRONT_CORNERS: TapeFlags = TapeFlags::FRONT_RIGHT.union(TapeFlags::FRONT_LEFT);

/// Front-corner tape contact, the completion condition of both target
/// search phases.
fn front_corner_tape(ev: Event) -> bool {
    ev.kind == EventKind::TapeTriggered
        && TapeFlags::from_bits_truncate(ev.param).intersects(FRONT_CORNERS)
}

fn front_wire(ev: Event) -> bool {
    ev.kind == EventKind::TwTriggered
        && WireFlags::from_bits_truncate(ev.param).contains(WireFlags::FRONT)
}

/// What the sequencer does with an event the active phase handed back.
fn absorb(ret: Event) -> Verdict<Phase> {
    if ret.is_none() {
        Verdict::Consume
    } else {
        Verdict::Rewrite(ret)
    }
}

impl Chart for MissionChart {
    type State = Phase;
    const INITIAL: Phase = Phase::InitPseudo;

    fn state(&self) -> Phase {
        self.phase
    }

    fn set_state(&mut self, state: Phase) {
        self.phase = state;
    }

    fn dispatch(&mut self, phase: Phase, event: Event, ctx: &mut Context<'_>) -> Verdict<Phase> {
        match phase {
            Phase::InitPseudo => match event.kind {
                EventKind::Init => {
                    let ok = init_chart(&mut self.ammo_search, ctx)
                        && init_chart(&mut self.ammo_load, ctx)
                        && init_chart(&mut self.first_search, ctx)
                        && init_chart(&mut self.first_unload, ctx)
                        && init_chart(&mut self.second_search, ctx)
                        && init_chart(&mut self.second_approach, ctx)
                        && init_chart(&mut self.second_unload, ctx);
                    if !ok {
                        return Verdict::Stay;
                    }
                    // Entry actions during init arm timers no active phase owns
                    for id in timer::MISSION_TIMERS {
                        ctx.timers.stop(id);
                    }
                    Verdict::Transition(Phase::AmmoSearch)
                }
                _ => Verdict::Stay,
            },

            Phase::AmmoSearch => {
                let ret = run_chart(&mut self.ammo_search, event, ctx);
                if front_wire(ret) && ctx.snapshot.last_tape != TapeSide::NotFollowing {
                    return Verdict::Transition(Phase::AmmoLoad);
                }
                absorb(ret)
            }

            Phase::AmmoLoad => {
                let ret = run_chart(&mut self.ammo_load, event, ctx);
                if ret.kind == EventKind::Unloaded {
                    return Verdict::Transition(Phase::FirstTargetSearch);
                }
                absorb(ret)
            }

            Phase::FirstTargetSearch => {
                let ret = run_chart(&mut self.first_search, event, ctx);
                if front_corner_tape(ret) {
                    return Verdict::Transition(Phase::FirstTargetUnload);
                }
                absorb(ret)
            }

            Phase::FirstTargetUnload => {
                let ret = run_chart(&mut self.first_unload, event, ctx);
                if ret.kind == EventKind::Unloaded {
                    return Verdict::Transition(Phase::SecondTargetSearch);
                }
                absorb(ret)
            }

            Phase::SecondTargetSearch => {
                let ret = run_chart(&mut self.second_search, event, ctx);
                if ret.kind == EventKind::BeaconTriggered && ret.param != 0 {
                    return Verdict::Transition(Phase::SecondTargetApproach);
                }
                absorb(ret)
            }

            Phase::SecondTargetApproach => {
                let ret = run_chart(&mut self.second_approach, event, ctx);
                if front_corner_tape(ret) {
                    return Verdict::Transition(Phase::SecondTargetUnload);
                }
                absorb(ret)
            }

            Phase::SecondTargetUnload => {
                let ret = run_chart(&mut self.second_unload, event, ctx);
                if ret.kind == EventKind::Unloaded {
                    // Both targets served, go reload and do it again
                    return Verdict::Transition(Phase::AmmoSearch);
                }
                absorb(ret)
            }
        }
    }
}
