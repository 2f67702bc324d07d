//! One simulation tick
//!
//! Playing: behaviours set velocities, the collision world resolves
//! positions, then the post-resolution state is inspected for stomps, deaths,
//! pickups and the win condition. The resolved state is recorded last.
//!
//! Replay: no physics at all. The snapshot under the playback cursor is
//! copied over the entities; the tick that shows the last one ends the replay.

use super::entities::{Contact, TickInput, classify_contact};
use super::phase::GamePhase;
use super::state::{DeathCause, GameEvent, Simulation};
use crate::consts::WORLD_HEIGHT;

/// Advance the simulation by one tick and return the events it produced
pub fn tick<'a>(sim: &'a mut Simulation, input: &TickInput) -> &'a [GameEvent] {
    sim.events.clear();
    sim.time_ticks += 1;

    match sim.phase.current() {
        GamePhase::Playing => tick_playing(sim, input),
        GamePhase::Replay => tick_replay(sim),
        GamePhase::Menu | GamePhase::GameOver | GamePhase::Win => {}
    }
    &sim.events
}

fn tick_playing(sim: &mut Simulation, input: &TickInput) {
    // Player
    let was_on_ground = sim.player.body.on_ground;
    let (res, jumped) = sim.player.step(input, &sim.world, &sim.tuning);
    if jumped {
        sim.events.push(GameEvent::Jumped);
    }
    if res.on_ground && !was_on_ground {
        sim.events.push(GameEvent::Landed);
    }

    if sim.player.rect().top() > WORLD_HEIGHT {
        if sim.settings.fall_out_is_fatal {
            end_attempt(sim, GamePhase::GameOver);
            sim.events.push(GameEvent::PlayerKilled {
                cause: DeathCause::FellOut,
            });
            return;
        }
        log::debug!("Player fell out, respawning");
        sim.respawn_player();
        sim.events.push(GameEvent::Respawned);
    }

    // Enemies
    for enemy in sim.enemies.iter_mut() {
        enemy.patrol(&sim.world, &sim.tuning, &mut sim.rng);
    }

    // Player vs enemies, all classified against the same resolved state
    let mut stomped = Vec::new();
    let mut fatal = None;
    for enemy in &sim.enemies {
        match classify_contact(&sim.player, enemy, &sim.tuning) {
            Contact::Stomp => stomped.push(enemy.id),
            Contact::Fatal => fatal = fatal.or(Some(enemy.id)),
            Contact::None => {}
        }
    }
    if !stomped.is_empty() {
        sim.enemies.retain(|e| !stomped.contains(&e.id));
        sim.player.bounce(&sim.tuning);
        for id in stomped {
            log::debug!("Enemy {id} stomped");
            sim.player.score = sim.player.score.saturating_add(sim.tuning.stomp_bonus);
            sim.events.push(GameEvent::EnemyStomped { id });
        }
    }
    if let Some(id) = fatal {
        log::debug!("Player hit by enemy {id}");
        end_attempt(sim, GamePhase::GameOver);
        sim.events.push(GameEvent::PlayerKilled {
            cause: DeathCause::Enemy(id),
        });
        return;
    }

    // Collectibles
    let player_rect = sim.player.rect();
    for (index, collectible) in sim.collectibles.iter_mut().enumerate() {
        collectible.animate();
        if collectible.try_collect(&player_rect) {
            sim.player.collected_count += 1;
            sim.player.score = sim.player.score.saturating_add(sim.tuning.collect_bonus);
            sim.events.push(GameEvent::Collected { index });
        }
    }

    if sim.enemies.is_empty() && sim.collectibles.iter().all(|c| c.collected) {
        let level = sim.level_number();
        log::info!("Level {level} complete, score {}", sim.player.score);
        end_attempt(sim, GamePhase::Win);
        sim.events.push(GameEvent::LevelComplete { level });
        return;
    }

    let snapshot = sim.snapshot();
    sim.recorder.record(snapshot);
}

/// Stop recording and leave `playing`. The ending tick is not recorded.
fn end_attempt(sim: &mut Simulation, next: GamePhase) {
    let frames = sim.recorder.stop();
    sim.events.push(GameEvent::RecordingStopped { frames });
    sim.enter_phase(next);
}

fn tick_replay(sim: &mut Simulation) {
    let Some(player) = sim.playback.as_mut() else {
        panic!("replay phase without an active playback");
    };
    let step = player.step();
    let frame = step.shown;
    let snapshot = player.recording().snapshots[frame].clone();

    sim.apply_snapshot(&snapshot);
    for collectible in sim.collectibles.iter_mut() {
        collectible.animate();
    }

    if step.finished {
        log::info!("Replay finished at frame {frame}");
        sim.playback = None;
        sim.events.push(GameEvent::ReplayFinished { frame });
        sim.enter_phase(GamePhase::Menu);
    }
}
