//! Collision resolution against static platforms
//!
//! Moves are resolved one axis at a time: horizontal first, all or nothing,
//! then vertical against the new x position, snapping to the contact surface.
//! World-boundary clamps run last.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::body::MotionBody;

/// Tolerance for a zero-velocity body sitting on a platform top
const REST_EPSILON: f32 = 1e-3;

/// Platform flavour (cosmetic for renderers; physics treats all kinds alike)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Full-width floor of a level
    Ground,
    #[default]
    Ledge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Aabb,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        Self {
            rect: Aabb::new(x, y, width, height),
            kind,
        }
    }
}

/// How simultaneous vertical contacts are settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeamPolicy {
    /// Sweep the whole move and snap to the closest surface
    #[default]
    NearestContact,
    /// Test only the destination rect; the last overlapping platform in
    /// iteration order decides the snap. Can jitter where platforms meet.
    IterationOrder,
}

/// World edges applied after platform resolution. `None` disables an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub floor: Option<f32>,
}

impl WorldBounds {
    /// No edges at all
    pub const OPEN: WorldBounds = WorldBounds {
        left: None,
        right: None,
        top: None,
        floor: None,
    };
}

/// Which world edges clamped the body this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryHits {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub floor: bool,
}

impl BoundaryHits {
    #[inline]
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Outcome of resolving one body for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resolution {
    /// Displacement actually applied
    pub dx: f32,
    pub dy: f32,
    pub on_ground: bool,
    /// A platform stopped the horizontal move
    pub blocked_x: bool,
    /// A platform stopped an upward move
    pub hit_ceiling: bool,
    pub bounds: BoundaryHits,
}

/// The static geometry of a level
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    platforms: Vec<Platform>,
    bounds: WorldBounds,
    policy: SeamPolicy,
}

impl CollisionWorld {
    pub fn new(platforms: Vec<Platform>, bounds: WorldBounds, policy: SeamPolicy) -> Self {
        Self {
            platforms,
            bounds,
            policy,
        }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn policy(&self) -> SeamPolicy {
        self.policy
    }

    /// Swap in a new level's platform set as a whole
    pub fn replace_platforms(&mut self, platforms: Vec<Platform>) {
        self.platforms = platforms;
    }

    /// True if `rect` intersects any platform
    pub fn overlaps_any(&self, rect: &Aabb) -> bool {
        self.platforms.iter().any(|p| p.rect.intersects(rect))
    }

    /// Resolve a proposed move of (dx, dy) for `body`, writing the resulting
    /// position, velocity and ground flag back into it.
    ///
    /// `dy` is the body's vertical velocity for this tick; its sign decides
    /// whether a vertical contact is a landing or a ceiling bump.
    pub fn resolve(&self, body: &mut MotionBody, dx: f32, dy: f32) -> Resolution {
        let origin = body.pos;
        let mut out = Resolution::default();
        body.on_ground = false;

        // Horizontal: full stop on any contact
        if dx != 0.0 {
            let start = body.rect();
            let reach = match self.policy {
                SeamPolicy::NearestContact => start.swept(dx, 0.0),
                SeamPolicy::IterationOrder => start.translated(dx, 0.0),
            };
            if self.overlaps_any(&reach) {
                out.blocked_x = true;
                body.vel.x = 0.0;
            } else {
                body.pos.x += dx;
            }
        }

        // Vertical, from the new x position
        if dy != 0.0 {
            let moving_up = dy < 0.0;
            let contact = match self.policy {
                SeamPolicy::NearestContact => self.nearest_vertical_contact(&body.rect(), dy),
                SeamPolicy::IterationOrder => self.last_vertical_contact(&body.rect(), dy),
            };
            match contact {
                Some(surface) if moving_up => {
                    body.pos.y = surface;
                    body.vel.y = 0.0;
                    out.hit_ceiling = true;
                }
                Some(surface) => {
                    body.pos.y = surface - body.size.y;
                    body.vel.y = 0.0;
                    body.on_ground = true;
                }
                None => body.pos.y += dy,
            }
        } else if self.resting_on_platform(&body.rect()) {
            body.on_ground = true;
        }

        out.bounds = self.clamp_to_bounds(body);
        out.on_ground = body.on_ground;
        out.dx = body.pos.x - origin.x;
        out.dy = body.pos.y - origin.y;
        out
    }

    /// Closest surface crossed by the sweep: the highest platform top when
    /// falling, the lowest platform bottom when rising. Platforms already
    /// overlapping the starting rect are ignored.
    fn nearest_vertical_contact(&self, start: &Aabb, dy: f32) -> Option<f32> {
        let sweep = start.swept(0.0, dy);
        let hits = self
            .platforms
            .iter()
            .filter(|p| p.rect.intersects(&sweep) && !p.rect.intersects(start));
        if dy < 0.0 {
            hits.map(|p| p.rect.bottom()).reduce(f32::max)
        } else {
            hits.map(|p| p.rect.top()).reduce(f32::min)
        }
    }

    /// A platform top flush with the rect's bottom counts as a downward
    /// contact for a body with no vertical velocity
    fn resting_on_platform(&self, rect: &Aabb) -> bool {
        self.platforms
            .iter()
            .any(|p| p.rect.overlaps_x(rect) && (p.rect.top() - rect.bottom()).abs() <= REST_EPSILON)
    }

    /// Surface of the last platform (in iteration order) overlapping the
    /// destination rect
    fn last_vertical_contact(&self, start: &Aabb, dy: f32) -> Option<f32> {
        let dest = start.translated(0.0, dy);
        self.platforms
            .iter()
            .filter(|p| p.rect.intersects(&dest))
            .last()
            .map(|p| if dy < 0.0 { p.rect.bottom() } else { p.rect.top() })
    }

    fn clamp_to_bounds(&self, body: &mut MotionBody) -> BoundaryHits {
        let mut hits = BoundaryHits::default();
        let b = &self.bounds;

        if let Some(left) = b.left {
            if body.pos.x < left {
                body.pos.x = left;
                body.vel.x = 0.0;
                hits.left = true;
            }
        }
        if let Some(right) = b.right {
            if body.pos.x + body.size.x > right {
                body.pos.x = right - body.size.x;
                body.vel.x = 0.0;
                hits.right = true;
            }
        }
        if let Some(top) = b.top {
            if body.pos.y < top {
                body.pos.y = top;
                body.vel.y = 0.0;
                hits.top = true;
            }
        }
        if let Some(floor) = b.floor {
            if body.pos.y + body.size.y > floor {
                body.pos.y = floor - body.size.y;
                body.vel.y = 0.0;
                body.on_ground = true;
                hits.floor = true;
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn ground_world(policy: SeamPolicy) -> CollisionWorld {
        CollisionWorld::new(
            vec![Platform::new(0.0, 560.0, 800.0, 40.0, PlatformKind::Ground)],
            WorldBounds::OPEN,
            policy,
        )
    }

    fn body_at(x: f32, y: f32) -> MotionBody {
        MotionBody::new(Vec2::new(x, y), Vec2::splat(32.0))
    }

    #[test]
    fn test_landing_sets_ground_and_zeroes_velocity() {
        for policy in [SeamPolicy::NearestContact, SeamPolicy::IterationOrder] {
            let world = ground_world(policy);
            let mut body = body_at(100.0, 520.0);
            body.vel.y = 12.0;

            let res = world.resolve(&mut body, 0.0, 12.0);

            assert!(res.on_ground);
            assert!(body.on_ground);
            assert_eq!(body.vel.y, 0.0);
            assert_eq!(body.rect().bottom(), 560.0);
            assert_eq!(res.dy, 8.0);
        }
    }

    #[test]
    fn test_resting_body_stays_grounded_under_gravity() {
        let world = ground_world(SeamPolicy::NearestContact);
        let mut body = body_at(100.0, 528.0);
        for _ in 0..10 {
            body.vel.y += 0.5;
            let dy = body.vel.y;
            let res = world.resolve(&mut body, 0.0, dy);
            assert!(res.on_ground);
            assert_eq!(body.pos.y, 528.0);
        }
    }

    #[test]
    fn test_zero_vertical_velocity_keeps_ground_contact() {
        for policy in [SeamPolicy::NearestContact, SeamPolicy::IterationOrder] {
            let world = ground_world(policy);
            let mut body = body_at(100.0, 528.0);

            let res = world.resolve(&mut body, 0.0, 0.0);
            assert!(res.on_ground);
            assert_eq!(body.pos.y, 528.0);

            // Hovering a few units up is not contact
            let mut above = body_at(100.0, 520.0);
            assert!(!world.resolve(&mut above, 0.0, 0.0).on_ground);

            // Walked off the edge: no x overlap with the platform
            let mut beyond = body_at(800.0, 528.0);
            assert!(!world.resolve(&mut beyond, 0.0, 0.0).on_ground);
        }
    }

    #[test]
    fn test_ground_flag_is_not_sticky() {
        let world = ground_world(SeamPolicy::NearestContact);
        let mut body = body_at(100.0, 528.0);
        body.vel.y = 0.5;
        assert!(world.resolve(&mut body, 0.0, 0.5).on_ground);

        body.vel.y = -12.0;
        let res = world.resolve(&mut body, 0.0, -12.0);
        assert!(!res.on_ground);
        assert!(!body.on_ground);
        assert_eq!(body.pos.y, 516.0);
    }

    #[test]
    fn test_ceiling_bump_snaps_below_platform() {
        let world = CollisionWorld::new(
            vec![Platform::new(0.0, 100.0, 200.0, 20.0, PlatformKind::Ledge)],
            WorldBounds::OPEN,
            SeamPolicy::NearestContact,
        );
        let mut body = body_at(50.0, 125.0);
        body.vel.y = -12.0;

        let res = world.resolve(&mut body, 0.0, -12.0);

        assert!(res.hit_ceiling);
        assert!(!res.on_ground);
        assert_eq!(body.pos.y, 120.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_horizontal_contact_is_all_or_nothing() {
        let world = CollisionWorld::new(
            vec![Platform::new(135.0, 400.0, 20.0, 200.0, PlatformKind::Ledge)],
            WorldBounds::OPEN,
            SeamPolicy::NearestContact,
        );
        let mut body = body_at(100.0, 450.0);
        body.vel.x = 5.0;

        // 3 units of clearance, 5 requested: no partial step
        let res = world.resolve(&mut body, 5.0, 0.0);
        assert!(res.blocked_x);
        assert_eq!(res.dx, 0.0);
        assert_eq!(body.pos.x, 100.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_sweep_stops_tunnelling_through_thin_ledge() {
        let thin = vec![Platform::new(0.0, 300.0, 200.0, 4.0, PlatformKind::Ledge)];
        let mut fast = body_at(50.0, 260.0);
        fast.vel.y = 15.0;

        let legacy = CollisionWorld::new(thin.clone(), WorldBounds::OPEN, SeamPolicy::IterationOrder);
        let mut tunnelled = fast.clone();
        // bottom 292 -> 307: the destination rect overlaps, so legacy still catches this one
        legacy.resolve(&mut tunnelled, 0.0, 15.0);
        assert!(tunnelled.on_ground);

        // From further away the destination clears the ledge entirely
        let mut far = body_at(50.0, 255.0);
        far.vel.y = 50.0;
        let mut far_legacy = far.clone();
        legacy.resolve(&mut far_legacy, 0.0, 50.0);
        assert!(!far_legacy.on_ground);

        let swept = CollisionWorld::new(thin, WorldBounds::OPEN, SeamPolicy::NearestContact);
        swept.resolve(&mut far, 0.0, 50.0);
        assert!(far.on_ground);
        assert_eq!(far.rect().bottom(), 300.0);
    }

    #[test]
    fn test_seam_last_platform_wins_in_iteration_order() {
        // Two overlapping ledges of different heights under one body
        let platforms = vec![
            Platform::new(0.0, 410.0, 120.0, 20.0, PlatformKind::Ledge),
            Platform::new(110.0, 420.0, 120.0, 20.0, PlatformKind::Ledge),
        ];
        let mut body = body_at(100.0, 375.0);
        body.vel.y = 15.0;

        let legacy = CollisionWorld::new(platforms.clone(), WorldBounds::OPEN, SeamPolicy::IterationOrder);
        let mut a = body.clone();
        legacy.resolve(&mut a, 0.0, 15.0);
        // Snapped onto the second (lower) ledge, still sunk into the first
        assert_eq!(a.rect().bottom(), 420.0);
        assert!(legacy.overlaps_any(&a.rect()));

        let nearest = CollisionWorld::new(platforms, WorldBounds::OPEN, SeamPolicy::NearestContact);
        let mut b = body;
        nearest.resolve(&mut b, 0.0, 15.0);
        assert_eq!(b.rect().bottom(), 410.0);
        assert!(!nearest.overlaps_any(&b.rect()));
    }

    #[test]
    fn test_bounds_clamp_after_platforms_and_zero_velocity() {
        let world = CollisionWorld::new(
            Vec::new(),
            WorldBounds {
                left: Some(0.0),
                right: Some(800.0),
                top: Some(0.0),
                floor: Some(600.0),
            },
            SeamPolicy::NearestContact,
        );

        let mut body = body_at(2.0, 10.0);
        body.vel = Vec2::new(-5.0, -12.0);
        let res = world.resolve(&mut body, -5.0, -12.0);
        assert!(res.bounds.left && res.bounds.top);
        assert_eq!(body.pos, Vec2::ZERO);
        assert_eq!(body.vel, Vec2::ZERO);

        let mut body = body_at(766.0, 560.0);
        body.vel = Vec2::new(5.0, 15.0);
        let res = world.resolve(&mut body, 5.0, 15.0);
        assert!(res.bounds.right && res.bounds.floor);
        assert!(res.on_ground);
        assert_eq!(body.pos, Vec2::new(768.0, 568.0));
        assert_eq!(body.vel, Vec2::ZERO);
    }

    fn half_units(range: std::ops::Range<i32>) -> impl Strategy<Value = f32> {
        range.prop_map(|v| v as f32 * 0.5)
    }

    fn platform_strategy() -> impl Strategy<Value = Platform> {
        (
            half_units(-400..1600),
            half_units(-400..1600),
            half_units(2..400),
            half_units(2..120),
        )
            .prop_map(|(x, y, w, h)| Platform::new(x, y, w, h, PlatformKind::Ledge))
    }

    proptest! {
        #[test]
        fn prop_resolve_never_leaves_overlap(
            platforms in prop::collection::vec(platform_strategy(), 1..8),
            x in half_units(-200..1400),
            y in half_units(-200..1400),
            dx in half_units(-20..21),
            dy in half_units(-60..61),
        ) {
            let world = CollisionWorld::new(platforms, WorldBounds::OPEN, SeamPolicy::NearestContact);
            let mut body = body_at(x, y);
            prop_assume!(!world.overlaps_any(&body.rect()));
            body.vel = Vec2::new(dx, dy);

            let res = world.resolve(&mut body, dx, dy);

            prop_assert!(!world.overlaps_any(&body.rect()));
            if res.on_ground {
                prop_assert_eq!(body.vel.y, 0.0);
            }
        }

        #[test]
        fn prop_falling_onto_platform_lands_same_tick(
            px in half_units(0..400),
            width in half_units(80..400),
            gap in half_units(0..30),
            dy in half_units(31..61),
        ) {
            // Body starts `gap` above the platform and falls further than that
            let world = CollisionWorld::new(
                vec![Platform::new(px, 500.0, width, 20.0, PlatformKind::Ledge)],
                WorldBounds::OPEN,
                SeamPolicy::NearestContact,
            );
            let mut body = body_at(px + 8.0, 500.0 - 32.0 - gap);
            body.vel.y = dy;

            let res = world.resolve(&mut body, 0.0, dy);

            prop_assert!(res.on_ground);
            prop_assert_eq!(body.vel.y, 0.0);
            prop_assert_eq!(body.rect().bottom(), 500.0);
        }
    }
}
