//! Vertical motion of the player entity

use crate::{Entity, ModeParams};

///Advances the entity by `dt` seconds.
///
///Gravity is accumulated first; a pending flap then overrides the velocity
///outright, so the post-tick velocity of a flap tick is exactly the mode's
///flap impulse. Position is integrated with the resulting velocity.
///Returns true if a flap was consumed this tick.
pub fn integrate(entity: &mut Entity, params: &ModeParams, dt: f32) -> bool {
    entity.vy += params.gravity * dt;

    let flapped = entity.flap_requested;
    if flapped {
        entity.vy = params.flap_impulse;
        entity.flap_requested = false;
    }

    entity.y += entity.vy * dt;
    flapped
}
