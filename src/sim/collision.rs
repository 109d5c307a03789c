//! Collision detection and response against walls, openings, paddles and bricks
//!
//! Every test is a discrete point/circle test at the post-integration position.
//! There is no swept collision: a movable faster than an obstacle is thick can
//! pass straight through it in one tick, and that is kept as-is.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::rect::{Rect, Span};
use super::state::{Brick, Movable, Side};

/// Which walls of a bounding box a movable is touching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Sides {
    /// Only the top and bottom contacts
    pub fn vertical_only(self) -> Self {
        Self {
            left: false,
            right: false,
            ..self
        }
    }

    /// Everything except the bottom (breakout loses the ball there)
    pub fn without_bottom(self) -> Self {
        Self {
            bottom: false,
            ..self
        }
    }

    pub fn any(self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Walls the movable's circle touches or has crossed
pub fn wall_contacts(m: &Movable, bounds: &Rect) -> Sides {
    let max = bounds.max();
    Sides {
        left: m.pos.x <= bounds.min.x + m.radius,
        right: m.pos.x >= max.x - m.radius,
        top: m.pos.y <= bounds.min.y + m.radius,
        bottom: m.pos.y >= max.y - m.radius,
    }
}

/// Elastic reflection: negate the component perpendicular to each touched wall.
///
/// No penetration correction; a movable left beyond a wall flips again next
/// tick if it is still beyond it.
#[inline]
pub fn reflect_off(vel: Vec2, sides: Sides) -> Vec2 {
    let mut out = vel;
    if sides.left || sides.right {
        out.x = -out.x;
    }
    if sides.top || sides.bottom {
        out.y = -out.y;
    }
    out
}

/// A scoring gap in a side wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    /// Wall the opening is cut into; that side concedes the goal
    pub wall: Side,
    /// Vertical extent of the mouth
    pub span: Span,
    /// Crossing this x (outward) counts as a goal
    pub goal_line: f32,
}

impl Opening {
    /// The side credited when the movable goes through
    pub fn scorer(&self) -> Side {
        self.wall.opponent()
    }

    pub fn crossed(&self, p: Vec2) -> bool {
        let past_line = match self.wall {
            Side::Left => p.x <= self.goal_line,
            Side::Right => p.x >= self.goal_line,
        };
        past_line && self.span.contains(p.y)
    }
}

/// Outcome of the side-wall pass of a paddle game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideContact {
    Clear,
    Rebound,
    Goal { scorer: Side },
}

/// Resolve the left/right walls of a paddle-game field.
///
/// A movable through an opening scores. Outside an opening's span a side wall
/// pushes the velocity back into the field; inside the span reflection is
/// suppressed so the movable can travel on to the goal line.
pub fn resolve_side_walls(m: &mut Movable, bounds: &Rect, openings: &[Opening]) -> SideContact {
    if let Some(opening) = openings.iter().find(|o| o.crossed(m.pos)) {
        return SideContact::Goal {
            scorer: opening.scorer(),
        };
    }

    let in_mouth = |wall: Side, y: f32| {
        openings
            .iter()
            .any(|o| o.wall == wall && o.span.contains(y))
    };

    let mut contact = SideContact::Clear;
    if m.pos.x <= bounds.min.x + m.radius && !in_mouth(Side::Left, m.pos.y) {
        m.vel.x = m.vel.x.abs();
        contact = SideContact::Rebound;
    }
    if m.pos.x >= bounds.max().x - m.radius && !in_mouth(Side::Right, m.pos.y) {
        m.vel.x = -m.vel.x.abs();
        contact = SideContact::Rebound;
    }
    contact
}

/// Circle-vs-circle deflection (puck vs round paddle).
///
/// On overlap the puck is sent off at a fixed `speed` along the normal from the
/// paddle centre to the puck centre. Not an elastic exchange.
pub fn deflect_circle(puck: &Movable, center: Vec2, radius: f32, speed: f32) -> Option<Vec2> {
    let d = puck.pos - center;
    if d.length() < puck.radius + radius {
        let angle = d.y.atan2(d.x);
        Some(Vec2::new(angle.cos(), angle.sin()) * speed)
    } else {
        None
    }
}

/// Horizontal paddle at the bottom of the field (breakout).
///
/// Hit when the ball centre is at or below the paddle top (extended up by the
/// ball radius) and within the paddle's x extent. The ball is always sent
/// upward and gains `steer_gain` horizontal speed per pixel of offset from the
/// paddle centre.
pub fn paddle_rebound(ball: &Movable, paddle: &Rect, steer_gain: f32) -> Option<Vec2> {
    let hit = ball.pos.y >= paddle.min.y - ball.radius
        && ball.pos.x >= paddle.min.x
        && ball.pos.x <= paddle.max().x;
    if !hit {
        return None;
    }
    let offset = ball.pos.x - paddle.center().x;
    Some(Vec2::new(ball.vel.x + offset * steer_gain, -ball.vel.y.abs()))
}

/// Vertical paddle guarding one side (pong).
///
/// The paddle's face toward the field is extended to the wall behind it, so a
/// ball anywhere between the face and the wall within the paddle's y extent
/// counts as a hit.
pub fn side_paddle_contact(ball: &Movable, paddle: &Rect, guards: Side) -> bool {
    let max = paddle.max();
    let past_face = match guards {
        Side::Left => ball.pos.x <= max.x,
        Side::Right => ball.pos.x >= paddle.min.x,
    };
    past_face && ball.pos.y >= paddle.min.y && ball.pos.y <= max.y
}

/// How many vertical flips one tick applies when several bricks break at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickReflection {
    /// One flip per tick regardless of how many bricks broke
    #[default]
    Single,
    /// One flip per broken brick (two bricks cancel out)
    PerBrick,
}

/// Break every visible brick containing the ball centre.
///
/// Bricks are flagged, never removed. Returns indices of the bricks broken
/// this tick, in layout order.
pub fn strike_bricks(ball: &mut Movable, bricks: &mut [Brick], policy: BrickReflection) -> Vec<usize> {
    let mut broken = Vec::new();
    for (idx, brick) in bricks.iter_mut().enumerate() {
        if brick.visible && brick.rect.contains(ball.pos) {
            brick.visible = false;
            broken.push(idx);
            if policy == BrickReflection::PerBrick {
                ball.vel.y = -ball.vel.y;
            }
        }
    }
    if policy == BrickReflection::Single && !broken.is_empty() {
        ball.vel.y = -ball.vel.y;
    }
    broken
}

/// Grid cell outside a `size.x` by `size.y` board
#[inline]
pub fn outside_grid(cell: IVec2, size: IVec2) -> bool {
    cell.x < 0 || cell.y < 0 || cell.x >= size.x || cell.y >= size.y
}

/// Whether `cell` is already occupied by the body
pub fn hits_body<'a>(cell: IVec2, body: impl IntoIterator<Item = &'a IVec2>) -> bool {
    body.into_iter().any(|c| *c == cell)
}
