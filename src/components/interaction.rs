//! Click interaction state machine of a single pack.
//!
//! Each pack entity owns one [`PackInteraction`]. The phase is private: the
//! outside world can only *request* transitions (pointer enter/leave, begin a
//! selection, open, reset, deliver cards) and each request is ignored when the
//! current phase does not allow it. Time advances through
//! [`PackInteraction::advance`], called once per frame, which eases the pose
//! towards the phase's target and returns the lifecycle signals produced by
//! that frame.
//!
//! ```text
//! Idle ⇄ Hovered ──click──▶ FlyingToCenter ──converged──▶ Selected
//!   ▲                                                        │ click
//!   │                                                        ▼
//! Resetting ◀──reset── RevealShown ◀──dropped & 360°── SpinningDown
//! ```
//!
//! Any phase other than `Idle`, `Hovered` and `Resetting` can be reset.

use bevy_ecs::prelude::Component;
use cgmath::{MetricSpace, Vector3};
use smallvec::SmallVec;

use crate::components::pose::AnimationPose;
use crate::geometry::{Quat, Vec3, face_camera, yaw};
use crate::resources::tuning::AnimationTuning;

/// Full turn the pack must complete while dropping.
pub const FULL_SPIN_DEGREES: f32 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionPhase {
    Idle,
    Hovered,
    FlyingToCenter,
    Selected,
    SpinningDown,
    RevealShown,
    Resetting,
}

impl InteractionPhase {
    /// Idle or hovered: clickable, bobbing allowed.
    pub fn is_at_rest(self) -> bool {
        matches!(self, InteractionPhase::Idle | InteractionPhase::Hovered)
    }

    /// Phases that at most one pack of a pool may be in.
    pub fn is_exclusive(self) -> bool {
        matches!(
            self,
            InteractionPhase::FlyingToCenter
                | InteractionPhase::Selected
                | InteractionPhase::SpinningDown
        )
    }
}

/// Signals produced by [`PackInteraction::advance`] and
/// [`PackInteraction::deliver_cards`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackSignal {
    /// The drop and the full spin both finished.
    AnimationComplete,
    /// The reveal overlay should be shown now.
    OverlayShown,
    /// The pack is back at its original pose.
    ResetComplete,
}

pub type PackSignals = SmallVec<[PackSignal; 2]>;

/// Read-only view of a pack's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackSnapshot {
    pub phase: InteractionPhase,
    pub pose: AnimationPose,
    pub spin_degrees: f32,
    pub cards_ready: bool,
}

#[derive(Component, Debug, Clone)]
pub struct PackInteraction {
    phase: InteractionPhase,
    pose: AnimationPose,
    target: Option<AnimationPose>,
    original: AnimationPose,
    /// Orientation facing the camera, computed at click time.
    face_rotation: Quat,
    spin_degrees: f32,
    cards_ready: bool,
    overlay_shown: bool,
}

impl PackInteraction {
    pub fn new(original: AnimationPose) -> Self {
        Self {
            phase: InteractionPhase::Idle,
            pose: original,
            target: None,
            original,
            face_rotation: original.orientation,
            spin_degrees: 0.0,
            cards_ready: false,
            overlay_shown: false,
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn pose(&self) -> &AnimationPose {
        &self.pose
    }

    pub fn original(&self) -> &AnimationPose {
        &self.original
    }

    pub fn target(&self) -> Option<&AnimationPose> {
        self.target.as_ref()
    }

    pub fn spin_degrees(&self) -> f32 {
        self.spin_degrees
    }

    pub fn snapshot(&self) -> PackSnapshot {
        PackSnapshot {
            phase: self.phase,
            pose: self.pose,
            spin_degrees: self.spin_degrees,
            cards_ready: self.cards_ready,
        }
    }

    pub fn pointer_enter(&mut self) -> bool {
        if self.phase == InteractionPhase::Idle {
            self.phase = InteractionPhase::Hovered;
            return true;
        }
        false
    }

    pub fn pointer_leave(&mut self) -> bool {
        if self.phase == InteractionPhase::Hovered {
            self.phase = InteractionPhase::Idle;
            return true;
        }
        false
    }

    /// First click: fly to `focus_point` and turn towards the camera.
    ///
    /// The caller is responsible for holding the pool's selection lock.
    pub fn begin_selection(
        &mut self,
        focus_point: Vec3,
        camera_position: Vec3,
        tuning: &AnimationTuning,
    ) -> bool {
        if !self.phase.is_at_rest() {
            return false;
        }
        self.face_rotation = face_camera(focus_point, camera_position, self.original.orientation);
        self.target = Some(
            AnimationPose {
                position: focus_point,
                orientation: self.face_rotation,
                scale: self.original.scale,
            }
            .scaled(tuning.click_scale),
        );
        self.phase = InteractionPhase::FlyingToCenter;
        self.spin_degrees = 0.0;
        self.cards_ready = false;
        self.overlay_shown = false;
        true
    }

    /// Second click: spin a full turn while dropping below the focus point.
    pub fn open(&mut self, tuning: &AnimationTuning) -> bool {
        if self.phase != InteractionPhase::Selected {
            return false;
        }
        let Some(center) = self.target else {
            return false;
        };
        let drop = center.position - Vector3::unit_y() * tuning.drop_distance;
        self.target = Some(center.with_position(drop));
        self.phase = InteractionPhase::SpinningDown;
        self.spin_degrees = 0.0;
        true
    }

    /// Head back to the original pose. No-op when already idle, hovered or resetting.
    pub fn reset(&mut self) -> bool {
        if self.phase.is_at_rest() || self.phase == InteractionPhase::Resetting {
            return false;
        }
        self.phase = InteractionPhase::Resetting;
        self.target = Some(self.original);
        self.cards_ready = false;
        self.overlay_shown = false;
        true
    }

    /// The awarded cards arrived. Returns [`PackSignal::OverlayShown`] when the
    /// reveal was only waiting for them.
    pub fn deliver_cards(&mut self) -> Option<PackSignal> {
        match self.phase {
            InteractionPhase::Selected | InteractionPhase::SpinningDown => {
                self.cards_ready = true;
                None
            }
            InteractionPhase::RevealShown => {
                self.cards_ready = true;
                self.show_overlay()
            }
            _ => None,
        }
    }

    fn show_overlay(&mut self) -> Option<PackSignal> {
        if self.cards_ready && !self.overlay_shown {
            self.overlay_shown = true;
            return Some(PackSignal::OverlayShown);
        }
        None
    }

    fn rest_target(&self, tuning: &AnimationTuning) -> AnimationPose {
        if self.phase == InteractionPhase::Hovered {
            return self.original.scaled(tuning.hover_scale);
        }
        self.original
    }

    /// Advance one frame of `dt` seconds.
    ///
    /// `rest_height` is the bobbing height; while at rest it is applied to the
    /// pose as is, and only the remaining components are eased.
    pub fn advance(
        &mut self,
        dt: f32,
        rest_height: Option<f32>,
        tuning: &AnimationTuning,
    ) -> PackSignals {
        let mut signals = PackSignals::new();
        let rate = tuning.lerp_rate;
        let eps = tuning.epsilon;

        match self.phase {
            InteractionPhase::Idle | InteractionPhase::Hovered => {
                let rest = self.rest_target(tuning);
                self.pose.step_toward(&rest, rate);
                if let Some(y) = rest_height {
                    self.pose.position.y = y;
                }
            }
            InteractionPhase::FlyingToCenter => {
                if let Some(target) = self.target {
                    self.pose.step_toward(&target, rate);
                    if self.pose.converged(&target, eps) {
                        self.pose = target;
                        self.phase = InteractionPhase::Selected;
                    }
                }
            }
            InteractionPhase::Selected | InteractionPhase::RevealShown => {
                if let Some(target) = self.target {
                    self.pose.step_toward(&target, rate);
                }
            }
            InteractionPhase::SpinningDown => {
                if let Some(target) = self.target {
                    self.spin_degrees += tuning.spin_speed * dt.max(0.0);
                    let spin = self.spin_degrees.min(FULL_SPIN_DEGREES);
                    let orientation = self.face_rotation * yaw(spin);
                    let mut moving = target;
                    moving.orientation = self.pose.orientation;
                    self.pose.step_toward(&moving, rate);
                    self.pose.orientation = orientation;

                    let dropped = self.pose.position.distance(target.position) < eps;
                    if dropped && self.spin_degrees >= FULL_SPIN_DEGREES {
                        self.pose = target;
                        self.phase = InteractionPhase::RevealShown;
                        signals.push(PackSignal::AnimationComplete);
                        if let Some(shown) = self.show_overlay() {
                            signals.push(shown);
                        }
                    }
                }
            }
            InteractionPhase::Resetting => {
                let target = self.original;
                self.pose.step_toward(&target, rate);
                if self.pose.converged(&target, eps) {
                    self.pose = target;
                    self.target = None;
                    self.spin_degrees = 0.0;
                    self.phase = InteractionPhase::Idle;
                    signals.push(PackSignal::ResetComplete);
                }
            }
        }
        signals
    }
}
