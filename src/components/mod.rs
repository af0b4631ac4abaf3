//! ECS components attached to pack entities.
//!
//! Every pack of the pool is one entity carrying all of its own state; no
//! global registry of animation state exists.
//!
//! Submodules overview:
//! - [`bobbing`] – idle vertical float parameters
//! - [`interaction`] – the click interaction state machine and its snapshot
//! - [`packinstance`] – pool index, set index and pick volume of a pack
//! - [`packtexture`] – cover inputs and the latest composited texture
//! - [`pose`] – position/orientation/scale with per-frame easing

pub mod bobbing;
pub mod interaction;
pub mod packinstance;
pub mod packtexture;
pub mod pose;
