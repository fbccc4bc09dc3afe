//! Forgiving axis-aligned hit tests and pass scoring
//!
//! Hitboxes are shrunk by the mode's inset before testing.

use crate::{Entity, Field, ModeParams, Obstacle, OBSTACLE_HEIGHT, OBSTACLE_WIDTH};

///Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    ///Strict overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    ///Returns true if the point lies inside or on the edge of the rectangle.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    ///Returns the rectangle shrunk by `inset` on every side.
    pub fn inset(&self, inset: f32) -> Rect {
        Rect {
            x: self.x + inset,
            y: self.y + inset,
            w: self.w - 2.0 * inset,
            h: self.h - 2.0 * inset,
        }
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Entity left the top of the field
    Ceiling,
    /// Entity dropped below the ground line
    Ground,
    /// Entity hit an obstacle segment
    Obstacle,
}

/// Top segment (ends at the gap) and bottom segment (starts below the gap).
///
/// The inset trims the far end of each segment; the gap edges stay exact.
pub fn obstacle_segments(obstacle: &Obstacle, params: &ModeParams) -> [Rect; 2] {
    let inset = params.hitbox_inset;
    let top = Rect::new(
        obstacle.x,
        obstacle.gap_y - OBSTACLE_HEIGHT + inset,
        OBSTACLE_WIDTH,
        OBSTACLE_HEIGHT - inset,
    );
    let bottom = Rect::new(
        obstacle.x,
        obstacle.gap_y + params.gap_size,
        OBSTACLE_WIDTH,
        OBSTACLE_HEIGHT - inset,
    );
    [top, bottom]
}

/// Reports the first collision found for this tick, if any.
///
/// Field bounds are checked before obstacles.
pub fn detect_collision(
    entity: &Entity,
    obstacles: &[Obstacle],
    field: &Field,
    params: &ModeParams,
) -> Option<CollisionKind> {
    if entity.y < 0.0 {
        return Some(CollisionKind::Ceiling);
    }
    if entity.y + entity.height > field.ground_line() {
        return Some(CollisionKind::Ground);
    }

    let hitbox = entity.bounds().inset(params.hitbox_inset);
    let hit = obstacles.iter().any(|obstacle| {
        obstacle_segments(obstacle, params)
            .iter()
            .any(|segment| hitbox.intersects(segment))
    });

    hit.then_some(CollisionKind::Obstacle)
}

/// Marks every obstacle whose trailing edge has passed the entity's leading
/// edge as scored. Each obstacle is counted at most once.
/// Returns the number of newly scored obstacles.
pub fn award_passes(entity: &Entity, obstacles: &mut [Obstacle]) -> u32 {
    let mut awarded = 0;
    for obstacle in obstacles.iter_mut() {
        if !obstacle.scored && obstacle.trailing_edge() < entity.x {
            obstacle.scored = true;
            awarded += 1;
        }
    }
    awarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;

    fn field() -> Field {
        Field::new(480.0, 800.0)
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(10.0, 0.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c), "touching edges must not intersect");
    }

    #[test]
    fn test_rect_inset() {
        let r = Rect::new(10.0, 20.0, 50.0, 40.0).inset(5.0);
        assert_eq!(r, Rect::new(15.0, 25.0, 40.0, 30.0));
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(30.0, 30.0));
        assert!(!r.contains(31.0, 15.0));
    }

    #[test]
    fn test_entity_in_gap_is_safe() {
        let params = Mode::Classic.defaults();
        let obstacle = Obstacle::new(100.0, 300.0);
        // gap spans 300..480, entity is 64.6 tall
        let entity = Entity::new(90.0, 350.0);

        assert_eq!(
            detect_collision(&entity, &[obstacle], &field(), &params),
            None
        );
    }

    #[test]
    fn test_hits_top_segment() {
        let params = Mode::Classic.defaults();
        let obstacle = Obstacle::new(100.0, 300.0);
        let entity = Entity::new(90.0, 250.0);

        assert_eq!(
            detect_collision(&entity, &[obstacle], &field(), &params),
            Some(CollisionKind::Obstacle)
        );
    }

    #[test]
    fn test_hits_bottom_segment() {
        let params = Mode::Classic.defaults();
        let obstacle = Obstacle::new(100.0, 300.0);
        let entity = Entity::new(90.0, 450.0);

        assert_eq!(
            detect_collision(&entity, &[obstacle], &field(), &params),
            Some(CollisionKind::Obstacle)
        );
    }

    #[test]
    fn test_inset_forgives_grazing() {
        let params = Mode::Classic.defaults();
        let obstacle = Obstacle::new(100.0, 300.0);
        // entity overlaps the top segment by 4px: within the 6px entity inset
        let entity = Entity::new(90.0, 296.0);

        assert_eq!(
            detect_collision(&entity, &[obstacle], &field(), &params),
            None
        );
    }

    #[test]
    fn test_ceiling_and_ground() {
        let params = Mode::Classic.defaults();
        let field = field();

        let above = Entity::new(90.0, -1.0);
        assert_eq!(
            detect_collision(&above, &[], &field, &params),
            Some(CollisionKind::Ceiling)
        );

        let below = Entity::new(90.0, field.ground_line() - 60.0);
        assert_eq!(
            detect_collision(&below, &[], &field, &params),
            Some(CollisionKind::Ground)
        );

        let resting = Entity::new(90.0, field.ground_line() - 70.0);
        assert_eq!(detect_collision(&resting, &[], &field, &params), None);
    }

    #[test]
    fn test_award_passes_once() {
        let entity = Entity::new(96.0, 300.0);
        let mut obstacles = vec![
            Obstacle::new(40.0, 300.0),
            Obstacle::new(44.0, 300.0),
            Obstacle::new(200.0, 300.0),
        ];

        assert_eq!(award_passes(&entity, &mut obstacles), 1);
        assert!(obstacles[0].scored);
        assert!(!obstacles[1].scored, "trailing edge level with the leading edge is not a pass");
        assert!(!obstacles[2].scored);

        assert_eq!(award_passes(&entity, &mut obstacles), 0);

        obstacles[1].x = 40.0;
        assert_eq!(award_passes(&entity, &mut obstacles), 1);
        assert_eq!(award_passes(&entity, &mut obstacles), 0);
    }
}
