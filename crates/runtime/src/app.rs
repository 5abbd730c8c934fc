//! # Simulation Loop
//!
//! Builds the scene, then for each step: applies pending reloads, runs the
//! controller chain, steps physics, and runs the post-tick hooks. Progress is
//! logged every [`REPORT_INTERVAL`] steps.

use crate::watcher::{self, SceneWatcher};
use crate::Cli;
use anyhow::{ensure, Context, Result};
use ik::{BalanceController, ControllerChain, UprightController};
use phenotype::{Phenotype, Scene};
use physics::{transform, PhysicsSim, Ragdoll, RagdollConfig, Vec3};
use std::collections::HashMap;
use std::path::Path;

const REPORT_INTERVAL: usize = 50;

/// Run the simulation described by `cli`.
///
/// # Errors
///
/// Returns any error from loading the scene, the controllers, the physics
/// engine or writing the saved state. A failed reload is logged and the
/// previous gains are kept.
pub fn run(cli: &Cli) -> Result<()> {
    let mut scene = match &cli.scene {
        Some(path) => Phenotype::from_path(path)?.into_scene()?,
        None => {
            tracing::info!("No scene given, using the built-in ragdoll.");
            default_scene()?
        }
    };
    if let Some(dt) = cli.dt {
        ensure!(dt > 0.0 && dt.is_finite(), "--dt must be positive, got {dt}");
        scene.sim.params.dt = dt;
    }

    let scene_watcher = match (&cli.scene, cli.watch) {
        (Some(path), true) => match watcher::start(path) {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::error!("Failed to start scene watcher: {e:?}");
                None
            }
        },
        _ => None,
    };

    let dt = scene.sim.params.dt;
    tracing::info!(
        "Starting simulation loop for {} steps with dt = {}...",
        cli.steps,
        dt
    );
    for step in 0..cli.steps {
        if let (Some(w), Some(path)) = (&scene_watcher, &cli.scene) {
            poll_reload(w, path, &mut scene);
        }
        if cli.kinematic_after == Some(step) {
            scene.ragdoll.set_kinematic_mode(&mut scene.sim.bodies);
            scene.chain.set_all_enabled(false);
            tracing::info!(step, "Ragdoll switched to kinematic mode, controllers disabled.");
        }

        scene
            .chain
            .pre_tick(&mut scene.sim, &scene.ragdoll, dt)
            .with_context(|| format!("controllers at step {step}"))?;
        scene.sim.step_cpu();
        scene
            .chain
            .post_tick(&mut scene.sim, &scene.ragdoll, dt)
            .with_context(|| format!("controllers at step {step}"))?;

        if (step + 1) % REPORT_INTERVAL == 0 {
            report(step + 1, &scene)?;
        }
    }
    tracing::info!("Simulation loop finished after {} steps.", cli.steps);

    if let Some(path) = &cli.save_state {
        save_state(path, &scene.chain)?;
    }
    Ok(())
}

/// Torso-and-two-legs ragdoll with a balance controller on the torso and an
/// upright controller on every link.
fn default_scene() -> Result<Scene> {
    let mut sim = PhysicsSim::new();
    let ragdoll = Ragdoll::build(&mut sim, Vec3::ZERO, &RagdollConfig::default());
    let support = ragdoll.center_of_support(&sim.bodies)?;

    let mut chain = ControllerChain::new();
    chain.push(ragdoll.torso(), BalanceController::new(support));
    for &link in ragdoll.links() {
        chain.push(link, UprightController::new(Vec3::UNIT_Y)?);
    }

    let mut ids = HashMap::new();
    for (name, &foot) in ["left_leg", "right_leg"].into_iter().zip(ragdoll.feet()) {
        ids.insert(name.to_owned(), foot);
    }
    ids.insert("torso".to_owned(), ragdoll.torso());

    Ok(Scene {
        sim,
        ragdoll,
        chain,
        ids,
    })
}

fn poll_reload(w: &SceneWatcher, path: &Path, scene: &mut Scene) {
    if !w.changed() {
        return;
    }
    let running = scene.chain.save();
    let retuned = Phenotype::from_path(path)
        .and_then(|p| p.gains(&running))
        .and_then(|gains| scene.chain.retune(&gains).map_err(Into::into));
    match retuned {
        Ok(()) => tracing::info!("Controllers retuned from {}", path.display()),
        Err(e) => tracing::warn!("Keeping previous gains, reload failed: {e:#}"),
    }
}

fn report(step: usize, scene: &Scene) -> Result<()> {
    let bodies = &scene.sim.bodies;
    let torso = scene.sim.body(scene.ragdoll.torso())?;
    let com = scene.ragdoll.center_of_mass(bodies)?;
    let support = scene.ragdoll.center_of_support(bodies)?;
    let mut offset = com.location - support;
    offset.y = 0.0;
    let up = transform::rotate(torso.orientation, Vec3::UNIT_Y);
    let tilt = up.y.clamp(-1.0, 1.0).acos().to_degrees();
    tracing::info!(
        "Simulation step {} complete. Torso_y: {:.3}, com offset: {:.3}, tilt: {:.1} deg",
        step,
        torso.pos.y,
        offset.length(),
        tilt
    );
    Ok(())
}

fn save_state(path: &Path, chain: &ControllerChain) -> Result<()> {
    let json = serde_json::to_string_pretty(&chain.save())?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Controller state saved to {}", path.display());
    Ok(())
}
