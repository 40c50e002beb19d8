//! Operator control of a running engine
//!
//! A [`ControlCommand`] is one mutation or query issued by a front-end. The
//! [`ControlPanel`] applies commands to a [`SharedEngine`] and remembers what
//! it needs between commands: the parameter block handed to
//! `set_mode`/`reset`, and the Euler angles it last applied (nudges are
//! relative to those, not to the engine's integrated orientation).
//!
//! Commands arrive either as JSON (`{"type": "SetMode", "mode": "circular"}`)
//! or as a short text line, see [`ControlCommand::parse_line`].

pub mod console;

use crate::core::rotation::{Quaternion, euler_to_quaternion};
use crate::core::types::Vector3;
use crate::engine::{
    Clock, EngineSnapshot, MonotonicClock, SharedEngine, TrajectoryMode, TrajectoryParams,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Position nudge step (meters)
pub const POSITION_STEP: f64 = 0.1;

/// Orientation nudge step (degrees)
pub const ANGLE_STEP: f64 = 1.0;

/// Cartesian axis for position nudges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Euler angle for orientation nudges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EulerAxis {
    Yaw,
    Pitch,
    Roll,
}

impl EulerAxis {
    fn index(self) -> usize {
        match self {
            Self::Yaw => 0,
            Self::Pitch => 1,
            Self::Roll => 2,
        }
    }
}

/// Commands accepted by the control front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlCommand {
    /// Overwrite position (meters)
    SetPosition { position: Vector3 },
    /// Overwrite orientation, scalar first. Stored as given.
    SetOrientation { w: f64, x: f64, y: f64, z: f64 },
    /// Overwrite orientation from Euler angles (degrees)
    SetEuler { yaw: f64, pitch: f64, roll: f64 },
    SetVelocity { velocity: Vector3 },
    SetAcceleration { acceleration: Vector3 },
    /// Angular velocity in degrees/second
    SetAngularVelocity { angular_velocity: Vector3 },
    SetMode { mode: TrajectoryMode },
    Reset,
    /// Move `steps` × 0.1 m along `axis`
    NudgePosition { axis: Axis, steps: i32 },
    /// Turn `steps` × 1° about `axis`
    NudgeEuler { axis: EulerAxis, steps: i32 },
    /// Report the current engine state
    Show,
    /// Stop the daemon
    Shutdown,
}

/// Text command reference for interactive front-ends.
pub const HELP: &str = "\
Commands:
  mode <static|lissajous|circular|kinematic>
  pos <x> <y> <z>            set position (m)
  euler <yaw> <pitch> <roll> set orientation (deg)
  quat <w> <x> <y> <z>       set orientation quaternion
  vel <vx> <vy> <vz>         set velocity (m/s)
  acc <ax> <ay> <az>         set acceleration (m/s^2)
  rate <wx> <wy> <wz>        set angular velocity (deg/s)
  nudge <x|y|z> <steps>      move by steps * 0.1 m
  nudge <yaw|pitch|roll> <steps>  turn by steps * 1 deg
  reset | show | quit
  or a JSON command, e.g. {\"type\": \"SetMode\", \"mode\": \"circular\"}";

impl ControlCommand {
    /// Parse one command line, JSON or text form.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| Error::InvalidCommand(e.to_string()));
        }

        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(Error::InvalidCommand("empty command".to_string()));
        };
        let args: Vec<&str> = words.collect();

        let cmd = match keyword.to_ascii_lowercase().as_str() {
            "mode" => {
                let [name] = expect_args::<1>(keyword, &args)?;
                let mode = TrajectoryMode::from_config(name).ok_or_else(|| {
                    Error::InvalidCommand(format!("unknown mode '{}'", name))
                })?;
                Self::SetMode { mode }
            }
            "pos" | "position" => Self::SetPosition {
                position: parse_vector(keyword, &args)?,
            },
            "euler" => {
                let [yaw, pitch, roll] = parse_vector(keyword, &args)?;
                Self::SetEuler { yaw, pitch, roll }
            }
            "quat" | "orientation" => {
                let [w, x, y, z] = parse_floats::<4>(keyword, &args)?;
                Self::SetOrientation { w, x, y, z }
            }
            "vel" | "velocity" => Self::SetVelocity {
                velocity: parse_vector(keyword, &args)?,
            },
            "acc" | "accel" | "acceleration" => Self::SetAcceleration {
                acceleration: parse_vector(keyword, &args)?,
            },
            "rate" | "omega" => Self::SetAngularVelocity {
                angular_velocity: parse_vector(keyword, &args)?,
            },
            "nudge" => {
                let [axis, steps] = expect_args::<2>(keyword, &args)?;
                let steps: i32 = steps.parse().map_err(|_| {
                    Error::InvalidCommand(format!("invalid step count '{}'", steps))
                })?;
                match axis.to_ascii_lowercase().as_str() {
                    "x" => Self::NudgePosition { axis: Axis::X, steps },
                    "y" => Self::NudgePosition { axis: Axis::Y, steps },
                    "z" => Self::NudgePosition { axis: Axis::Z, steps },
                    "yaw" => Self::NudgeEuler { axis: EulerAxis::Yaw, steps },
                    "pitch" => Self::NudgeEuler { axis: EulerAxis::Pitch, steps },
                    "roll" => Self::NudgeEuler { axis: EulerAxis::Roll, steps },
                    _ => {
                        return Err(Error::InvalidCommand(format!("unknown axis '{}'", axis)));
                    }
                }
            }
            "reset" => Self::Reset,
            "show" | "status" => Self::Show,
            "quit" | "exit" | "shutdown" => Self::Shutdown,
            _ => {
                return Err(Error::InvalidCommand(format!("unknown command '{}'", keyword)));
            }
        };
        Ok(cmd)
    }
}

fn expect_args<'a, const N: usize>(keyword: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        Error::InvalidCommand(format!(
            "'{}' takes {} argument(s), got {}",
            keyword,
            N,
            args.len()
        ))
    })
}

fn parse_floats<const N: usize>(keyword: &str, args: &[&str]) -> Result<[f64; N]> {
    let words = expect_args::<N>(keyword, args)?;
    let mut values = [0.0; N];
    for (value, word) in values.iter_mut().zip(words) {
        *value = word
            .parse()
            .map_err(|_| Error::InvalidCommand(format!("invalid number '{}'", word)))?;
    }
    Ok(values)
}

fn parse_vector(keyword: &str, args: &[&str]) -> Result<Vector3> {
    parse_floats::<3>(keyword, args)
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    Applied,
    Snapshot(EngineSnapshot),
    Shutdown,
}

/// Applies control commands to a shared engine.
pub struct ControlPanel<C: Clock = MonotonicClock> {
    engine: SharedEngine<C>,
    params: TrajectoryParams,
    /// (yaw, pitch, roll) last applied through this panel, degrees
    euler: Vector3,
}

impl<C: Clock> ControlPanel<C> {
    pub fn new(engine: SharedEngine<C>, params: TrajectoryParams) -> Self {
        Self {
            engine,
            params,
            euler: params.initial.euler_degrees,
        }
    }

    pub fn engine(&self) -> &SharedEngine<C> {
        &self.engine
    }

    pub fn params(&self) -> &TrajectoryParams {
        &self.params
    }

    /// Euler angles the panel last applied, degrees.
    pub fn euler_degrees(&self) -> Vector3 {
        self.euler
    }

    /// Execute one command. Each command takes the engine lock once.
    pub fn apply(&mut self, cmd: ControlCommand) -> ControlOutcome {
        log::debug!("Control command: {:?}", cmd);
        match cmd {
            ControlCommand::SetPosition { position } => self.engine.set_pose(position),
            ControlCommand::SetOrientation { w, x, y, z } => {
                self.engine.set_orientation(Quaternion::new(w, x, y, z));
            }
            ControlCommand::SetEuler { yaw, pitch, roll } => {
                self.euler = [yaw, pitch, roll];
                self.engine.set_orientation(euler_to_quaternion(yaw, pitch, roll));
            }
            ControlCommand::SetVelocity { velocity } => self.engine.set_velocity(velocity),
            ControlCommand::SetAcceleration { acceleration } => {
                self.engine.set_acceleration(acceleration);
            }
            ControlCommand::SetAngularVelocity { angular_velocity } => {
                self.engine.set_angular_velocity(angular_velocity);
            }
            ControlCommand::SetMode { mode } => {
                self.engine.set_mode(mode, &self.params);
                if mode == TrajectoryMode::KinematicIntegration {
                    // Entering integration restores the initial orientation
                    self.euler = self.params.initial.euler_degrees;
                }
            }
            ControlCommand::Reset => {
                self.engine.reset(&self.params);
                self.euler = self.params.initial.euler_degrees;
            }
            ControlCommand::NudgePosition { axis, steps } => {
                let delta = f64::from(steps) * POSITION_STEP;
                self.engine.with(|e| {
                    let mut position = e.pose().position;
                    position[axis.index()] += delta;
                    e.set_pose(position);
                });
            }
            ControlCommand::NudgeEuler { axis, steps } => {
                self.euler[axis.index()] += f64::from(steps) * ANGLE_STEP;
                let [yaw, pitch, roll] = self.euler;
                self.engine.set_orientation(euler_to_quaternion(yaw, pitch, roll));
            }
            ControlCommand::Show => return ControlOutcome::Snapshot(self.engine.snapshot()),
            ControlCommand::Shutdown => return ControlOutcome::Shutdown,
        }
        ControlOutcome::Applied
    }
}
