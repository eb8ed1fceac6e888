//! ASCII level loading.
//!
//! Builds a [`State`] from a text map, one glyph per cell:
//!
//! | glyph     | entities spawned                  |
//! |-----------|-----------------------------------|
//! | `#`       | wall (blocking)                   |
//! | `B`       | box (pushable)                    |
//! | `A`       | agent                             |
//! | `C`       | coin (collectible)                |
//! | `E`       | exit                              |
//! | `*`       | exit with a box on it             |
//! | `+`       | exit with an agent on it          |
//! | `.` / ` ` | nothing                           |
//!
//! Blank lines before and after the map are ignored. Entities are spawned in
//! row-major order, so ids are stable for a given map.

use gridworld_ecs::prelude::*;

use crate::config::GridConfig;
use crate::state::State;
use crate::EngineError;

/// A parsed level: the initial state and its agents in spawn order.
#[derive(Debug, Clone)]
pub struct Level {
    pub state: State,
    pub agents: Vec<EntityId>,
}

impl Level {
    /// The first agent on the map, if any.
    pub fn agent(&self) -> Option<EntityId> {
        self.agents.first().copied()
    }
}

fn wall(at: Position) -> ComponentBundle {
    ComponentBundle::new()
        .with(at)
        .with(Blocking)
        .with(Collidable)
        .with(Appearance::new(AppearanceName::Wall))
}

fn crate_box(at: Position) -> ComponentBundle {
    ComponentBundle::new()
        .with(at)
        .with(Pushable)
        .with(Collidable)
        .with(Appearance::new(AppearanceName::Box))
}

fn agent(at: Position) -> ComponentBundle {
    ComponentBundle::new()
        .with(at)
        .with(Agent)
        .with(Collidable)
        .with(Inventory::default())
        .with(Appearance::new(AppearanceName::Human))
}

fn coin(at: Position) -> ComponentBundle {
    ComponentBundle::new()
        .with(at)
        .with(Collectible)
        .with(Appearance::new(AppearanceName::Coin))
}

fn exit(at: Position) -> ComponentBundle {
    ComponentBundle::new()
        .with(at)
        .with(Exit)
        .with(Appearance::new(AppearanceName::Exit))
}

/// Parse an ASCII map into a [`Level`].
///
/// Width and height come from the map; only `config.seed` is used.
///
/// # Errors
///
/// - [`EngineError::EmptyLevel`] if the map has no rows.
/// - [`EngineError::RaggedRow`] if rows differ in length.
/// - [`EngineError::UnknownGlyph`] for a character not in the table above.
pub fn parse_level(text: &str, config: GridConfig) -> Result<Level, EngineError> {
    let rows: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let first = rows.iter().position(|r| !r.is_empty());
    let last = rows.iter().rposition(|r| !r.is_empty());
    let rows = match (first, last) {
        (Some(first), Some(last)) => &rows[first..=last],
        _ => return Err(EngineError::EmptyLevel),
    };

    let width = rows[0].chars().count();
    let mut world = World::new();
    let mut agents = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(EngineError::RaggedRow {
                row: y,
                expected: width,
                found,
            });
        }
        for (x, glyph) in row.chars().enumerate() {
            let at = Position::new(x as i32, y as i32);
            match glyph {
                '.' | ' ' => {}
                '#' => {
                    world.spawn_bundle(wall(at));
                }
                'B' => {
                    world.spawn_bundle(crate_box(at));
                }
                'C' => {
                    world.spawn_bundle(coin(at));
                }
                'E' => {
                    world.spawn_bundle(exit(at));
                }
                '*' => {
                    world.spawn_bundle(exit(at));
                    world.spawn_bundle(crate_box(at));
                }
                'A' => agents.push(world.spawn_bundle(agent(at))),
                '+' => {
                    world.spawn_bundle(exit(at));
                    agents.push(world.spawn_bundle(agent(at)));
                }
                other => {
                    return Err(EngineError::UnknownGlyph {
                        glyph: other,
                        x,
                        y,
                    })
                }
            }
        }
    }

    let config = GridConfig {
        width: width as i32,
        height: rows.len() as i32,
        seed: config.seed,
    };
    tracing::debug!(
        width = config.width,
        height = config.height,
        entities = world.entity_count(),
        agents = agents.len(),
        "parsed level"
    );
    let state = State::new(config, world)?;
    Ok(Level { state, agents })
}
