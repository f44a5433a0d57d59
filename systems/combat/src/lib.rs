#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolver: soldier melee exchanges and tower fire.

use forum_defence_core::{AgentId, AgentKind, CellCoord, Event, SimulationConfig};
use forum_defence_system_agents::Agents;
use forum_defence_system_invasion::Invasion;
use tracing::debug;

/// Combat resolver that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct Combat {
    soldiers: Vec<(AgentId, CellCoord)>,
}

impl Combat {
    /// Creates a resolver with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one round of melee for every soldier.
    ///
    /// Each soldier engages the nearest live invader within the engagement
    /// range. When the two stand on the same or adjacent cells both deal
    /// damage at once: neither side's death prevents its own blow. Fallen
    /// soldiers are removed immediately; killed invaders stay flagged dead
    /// until the invasion engine sweeps them.
    pub fn resolve_melee(
        &mut self,
        agents: &mut Agents,
        invasion: &mut Invasion,
        config: &SimulationConfig,
        out: &mut Vec<Event>,
    ) {
        self.soldiers.clear();
        self.soldiers.extend(
            agents
                .iter()
                .filter(|agent| agent.kind() == AgentKind::Soldier)
                .map(|agent| (agent.id(), agent.current())),
        );

        for &(soldier, cell) in &self.soldiers {
            let Some(foe) = invasion.find_nearest(cell, config.engagement_range) else {
                continue;
            };
            if cell.manhattan_distance(foe.cell()) > 1 {
                continue;
            }
            let (invader, invader_cell, retaliation) = (foe.id(), foe.cell(), foe.damage());

            out.push(Event::SoldierHit {
                agent: soldier,
                invader,
                cell: invader_cell,
            });
            if invasion.damage(invader, config.soldier_damage) {
                debug!(invader = invader.get(), cell = ?invader_cell, "invader cut down");
                out.push(Event::InvaderKilled {
                    invader,
                    cell: invader_cell,
                });
            }

            let fell = agents
                .get_mut(soldier)
                .is_some_and(|agent| agent.take_damage(retaliation));
            if fell {
                let _ = agents.remove(soldier);
                debug!(agent = soldier.get(), "soldier fell");
                out.push(Event::SoldierFell { agent: soldier });
            }
        }
    }

    /// Lets every tower fire once at the nearest live invader in range.
    pub fn fire_towers(
        &mut self,
        towers: &[CellCoord],
        invasion: &mut Invasion,
        config: &SimulationConfig,
        out: &mut Vec<Event>,
    ) {
        for &tower in towers {
            let Some(target) = invasion.find_nearest(tower, config.tower_range) else {
                continue;
            };
            let (invader, cell) = (target.id(), target.cell());

            out.push(Event::TowerFired {
                from: tower,
                to: cell,
            });
            if invasion.damage(invader, config.tower_damage) {
                out.push(Event::InvaderKilled { invader, cell });
            }
        }
    }
}
