#![deny(clippy::all, clippy::pedantic)]
//! # Phenotype
//!
//! JSON description of a ragdoll scene: rigid bodies, the ball joints that
//! connect them, which bodies form the ragdoll, and the controllers that keep
//! it standing.
//!
//! ```json
//! {
//!   "bodies": [
//!     { "id": "torso", "shape": "box", "mass": 30, "pos": [0, 1.2, 0], "half_extents": [0.2, 0.3, 0.1] },
//!     { "id": "leg", "shape": "sphere", "mass": 8, "pos": [0, 0.45, 0], "radius": 0.45 }
//!   ],
//!   "joints": [ { "body_a": "torso", "body_b": "leg", "anchor": [0, 0.9, 0] } ],
//!   "ragdoll": { "links": ["leg", "torso"], "torso": "torso", "feet": ["leg"] },
//!   "controllers": [
//!     { "kind": "balance", "link": "torso" },
//!     { "kind": "upright", "link": "torso", "direction": [0, 1, 0] }
//!   ]
//! }
//! ```

use anyhow::{anyhow, ensure, Context, Result};
use ik::balance::{DEFAULT_LOCATION_GAIN_FACTOR, DEFAULT_VELOCITY_GAIN_FACTOR};
use ik::upright::{DEFAULT_DELTA_GAIN_FACTOR, DEFAULT_ERROR_GAIN_FACTOR};
use ik::{BalanceController, BalanceState, ControllerChain, ControllerState, UprightController, UprightState};
use physics::{PhysicsSim, Ragdoll, RigidBody, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Debug, Deserialize)]
pub struct Phenotype {
    #[serde(default)]
    pub gravity: Option<[f32; 3]>,
    /// Ground plane height; `null` removes the ground.
    #[serde(default = "default_ground")]
    pub ground: Option<f32>,
    #[serde(default)]
    pub dt: Option<f32>,
    pub bodies: Vec<BodyDef>,
    #[serde(default)]
    pub joints: Vec<JointDef>,
    pub ragdoll: RagdollDef,
    #[serde(default)]
    pub controllers: Vec<ControllerDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BodyDef {
    pub id: String,
    pub mass: f32,
    pub pos: [f32; 3],
    /// Quaternion, `[x, y, z, w]`.
    #[serde(default)]
    pub orientation: Option<[f32; 4]>,
    #[serde(default)]
    pub vel: [f32; 3],
    #[serde(flatten)]
    pub shape: Shape,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
    /// Axis along body-local Y.
    Cylinder { radius: f32, half_height: f32 },
}

#[derive(Clone, Debug, Deserialize)]
pub struct JointDef {
    pub body_a: String,
    pub body_b: String,
    /// World-space pivot at construction time.
    pub anchor: [f32; 3],
}

#[derive(Clone, Debug, Deserialize)]
pub struct RagdollDef {
    pub links: Vec<String>,
    pub torso: String,
    #[serde(default)]
    pub feet: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerDef {
    Balance {
        link: String,
        /// Defaults to the ragdoll's center of support when the scene is
        /// built; a reload keeps the running controller's.
        #[serde(default)]
        center_of_support: Option<[f32; 3]>,
        #[serde(default = "default_location_gain")]
        location_gain_factor: f32,
        #[serde(default = "default_velocity_gain")]
        velocity_gain_factor: f32,
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
    Upright {
        link: String,
        direction: [f32; 3],
        #[serde(default = "default_delta_gain")]
        delta_gain_factor: f32,
        #[serde(default = "default_error_gain")]
        error_gain_factor: f32,
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

#[allow(clippy::unnecessary_wraps)]
fn default_ground() -> Option<f32> {
    Some(0.0)
}

fn default_enabled() -> bool {
    true
}

fn default_location_gain() -> f32 {
    DEFAULT_LOCATION_GAIN_FACTOR
}

fn default_velocity_gain() -> f32 {
    DEFAULT_VELOCITY_GAIN_FACTOR
}

fn default_delta_gain() -> f32 {
    DEFAULT_DELTA_GAIN_FACTOR
}

fn default_error_gain() -> f32 {
    DEFAULT_ERROR_GAIN_FACTOR
}

/// A built scene, ready to step.
#[derive(Debug)]
pub struct Scene {
    pub sim: PhysicsSim,
    pub ragdoll: Ragdoll,
    pub chain: ControllerChain,
    /// Body index for every id in the description.
    pub ids: HashMap<String, usize>,
}

impl ControllerDef {
    #[must_use]
    pub fn link(&self) -> &str {
        match self {
            Self::Balance { link, .. } | Self::Upright { link, .. } => link,
        }
    }

    /// `default_support` is consulted only by a balance controller that
    /// leaves its support point out.
    fn state(&self, default_support: impl FnOnce() -> Result<Vec3>) -> Result<ControllerState> {
        Ok(match *self {
            Self::Balance {
                center_of_support,
                location_gain_factor,
                velocity_gain_factor,
                enabled,
                ..
            } => {
                let center_of_support = match center_of_support {
                    Some(c) => Vec3::from_array(c),
                    None => default_support()?,
                };
                ControllerState::Balance(BalanceState {
                    enabled,
                    location_gain_factor,
                    velocity_gain_factor,
                    center_of_support,
                })
            }
            Self::Upright {
                direction,
                delta_gain_factor,
                error_gain_factor,
                enabled,
                ..
            } => {
                let direction = Vec3::from_array(direction);
                ensure!(
                    direction.is_finite() && direction.length_squared() > 0.0,
                    "upright direction must be finite and non-zero, got {direction:?}"
                );
                ControllerState::Upright(UprightState {
                    enabled,
                    delta_gain_factor,
                    error_gain_factor,
                    direction_in_link_body: direction,
                    previous_error: Vec3::ZERO,
                })
            }
        })
    }
}

impl FromStr for Phenotype {
    type Err = anyhow::Error;

    fn from_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid phenotype JSON")
    }
}

impl Phenotype {
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid description.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        json.parse().with_context(|| format!("parsing {}", path.display()))
    }

    /// Build the physics world, the ragdoll and its controller chain.
    ///
    /// # Errors
    ///
    /// Fails on duplicate or unknown body ids, an empty ragdoll, or an
    /// invalid controller setting.
    pub fn into_scene(self) -> Result<Scene> {
        let mut sim = PhysicsSim::new();
        if let Some(g) = self.gravity {
            sim.params.gravity = Vec3::from_array(g);
        }
        sim.params.ground_height = self.ground;
        if let Some(dt) = self.dt {
            ensure!(dt > 0.0 && dt.is_finite(), "dt must be positive, got {dt}");
            sim.params.dt = dt;
        }

        let mut ids = HashMap::with_capacity(self.bodies.len());
        for def in &self.bodies {
            ensure!(!ids.contains_key(&def.id), "duplicate body id {:?}", def.id);
            let idx = sim.add_body(def.to_body());
            ids.insert(def.id.clone(), idx);
        }

        let lookup = |id: &str| ids.get(id).copied().ok_or_else(|| anyhow!("unknown body {id:?}"));

        for joint in &self.joints {
            let a = lookup(&joint.body_a)?;
            let b = lookup(&joint.body_b)?;
            sim.add_ball_joint(a, b, Vec3::from_array(joint.anchor))
                .with_context(|| format!("joint {} - {}", joint.body_a, joint.body_b))?;
        }

        let links = self
            .ragdoll
            .links
            .iter()
            .map(|id| lookup(id))
            .collect::<Result<Vec<_>>>()?;
        let feet = self
            .ragdoll
            .feet
            .iter()
            .map(|id| lookup(id))
            .collect::<Result<Vec<_>>>()?;
        let torso = lookup(&self.ragdoll.torso)?;
        let ragdoll = Ragdoll::new(links, torso, feet).context("invalid ragdoll")?;

        let mut chain = ControllerChain::new();
        for (i, def) in self.controllers.iter().enumerate() {
            let link = lookup(def.link())?;
            ensure!(
                ragdoll.links().contains(&link),
                "controller {i} is attached to {:?}, which is not a ragdoll link",
                def.link()
            );
            let state = def
                .state(|| Ok(ragdoll.center_of_support(&sim.bodies)?))
                .with_context(|| format!("controller {i}"))?;
            match state {
                ControllerState::Balance(s) => {
                    chain.push(link, BalanceController::from_state(&s));
                }
                ControllerState::Upright(s) => {
                    let controller = UprightController::from_state(&s).with_context(|| format!("controller {i}"))?;
                    chain.push(link, controller);
                }
            }
        }

        tracing::info!(
            bodies = sim.bodies.len(),
            joints = sim.joints.len(),
            controllers = chain.len(),
            "scene built"
        );
        Ok(Scene {
            sim,
            ragdoll,
            chain,
            ids,
        })
    }

    /// Controller settings only, in chain order, for retuning a running
    /// scene whose controllers currently hold `current`. Balance controllers
    /// without an explicit support point keep their current one.
    ///
    /// # Errors
    ///
    /// Fails on an invalid controller setting, or a balance controller
    /// without a support point whose running counterpart is not a balance
    /// controller.
    pub fn gains(&self, current: &[ControllerState]) -> Result<Vec<ControllerState>> {
        self.controllers
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let running_support = || match current.get(i) {
                    Some(ControllerState::Balance(s)) => Ok(s.center_of_support),
                    _ => Err(anyhow!("no running balance controller to keep the support point of")),
                };
                def.state(running_support).with_context(|| format!("controller {i}"))
            })
            .collect()
    }
}

impl BodyDef {
    fn to_body(&self) -> RigidBody {
        let pos = Vec3::from_array(self.pos);
        let mut body = match self.shape {
            Shape::Sphere { radius } => RigidBody::new_sphere(pos, radius, self.mass),
            Shape::Box { half_extents } => RigidBody::new_box(pos, Vec3::from_array(half_extents), self.mass),
            Shape::Cylinder { radius, half_height } => RigidBody::new_cylinder(pos, radius, half_height, self.mass),
        };
        if let Some(q) = self.orientation {
            body = body.with_orientation(q);
        }
        body.vel = Vec3::from_array(self.vel);
        body
    }
}
