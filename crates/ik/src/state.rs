//! Persisted controller state.
//!
//! Each controller exposes its tunables and per-tick memory as a plain
//! struct. The structs serialize with serde, and also have a fixed binary
//! form: a `bytemuck` record whose first word is [`STATE_VERSION`], in native
//! byte order.

use crate::error::IkError;
use bytemuck::{Pod, Zeroable};
use physics::Vec3;
use serde::{Deserialize, Serialize};

pub const STATE_VERSION: u32 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceState {
    pub enabled: bool,
    pub location_gain_factor: f32,
    pub velocity_gain_factor: f32,
    /// Physics-space coordinates.
    pub center_of_support: Vec3,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UprightState {
    pub enabled: bool,
    pub delta_gain_factor: f32,
    pub error_gain_factor: f32,
    /// Link-body coordinates.
    pub direction_in_link_body: Vec3,
    pub previous_error: Vec3,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerState {
    Balance(BalanceState),
    Upright(UprightState),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BalanceRecord {
    version: u32,
    enabled: u32,
    location_gain_factor: f32,
    velocity_gain_factor: f32,
    center_of_support: Vec3,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct UprightRecord {
    version: u32,
    enabled: u32,
    delta_gain_factor: f32,
    error_gain_factor: f32,
    direction_in_link_body: Vec3,
    previous_error: Vec3,
}

fn read_record<T: Pod>(bytes: &[u8]) -> Result<T, IkError> {
    let expected = std::mem::size_of::<T>();
    if bytes.len() != expected {
        return Err(IkError::StateLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

fn check_version(version: u32) -> Result<(), IkError> {
    if version == STATE_VERSION {
        Ok(())
    } else {
        Err(IkError::UnsupportedVersion(version))
    }
}

impl BalanceState {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let record = BalanceRecord {
            version: STATE_VERSION,
            enabled: u32::from(self.enabled),
            location_gain_factor: self.location_gain_factor,
            velocity_gain_factor: self.velocity_gain_factor,
            center_of_support: self.center_of_support,
        };
        bytemuck::bytes_of(&record).to_vec()
    }

    /// # Errors
    ///
    /// Fails on a record of the wrong length or version.
    pub fn decode(bytes: &[u8]) -> Result<Self, IkError> {
        let record: BalanceRecord = read_record(bytes)?;
        check_version(record.version)?;
        Ok(Self {
            enabled: record.enabled != 0,
            location_gain_factor: record.location_gain_factor,
            velocity_gain_factor: record.velocity_gain_factor,
            center_of_support: record.center_of_support,
        })
    }
}

impl UprightState {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let record = UprightRecord {
            version: STATE_VERSION,
            enabled: u32::from(self.enabled),
            delta_gain_factor: self.delta_gain_factor,
            error_gain_factor: self.error_gain_factor,
            direction_in_link_body: self.direction_in_link_body,
            previous_error: self.previous_error,
        };
        bytemuck::bytes_of(&record).to_vec()
    }

    /// # Errors
    ///
    /// Fails on a record of the wrong length or version.
    pub fn decode(bytes: &[u8]) -> Result<Self, IkError> {
        let record: UprightRecord = read_record(bytes)?;
        check_version(record.version)?;
        Ok(Self {
            enabled: record.enabled != 0,
            delta_gain_factor: record.delta_gain_factor,
            error_gain_factor: record.error_gain_factor,
            direction_in_link_body: record.direction_in_link_body,
            previous_error: record.previous_error,
        })
    }
}
