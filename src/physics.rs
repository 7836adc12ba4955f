/*
 * Physics Module
 *
 * This module defines the contract the simulation expects from a rigid-body
 * physics world, and ArenaPhysics, the small engine bundled with the crate.
 *
 * ArenaPhysics keeps to what the herbivore arena needs:
 * - Zero gravity, unit time scale
 * - Every body is one or more convex hulls (circles are approximated by
 *   regular polygons), so a single separating-axis test covers all shapes
 * - Dynamic bodies integrate velocity with air friction
 * - Dynamic bodies are pushed out of static bodies, leaving a small slop of
 *   overlap so that resting contact still reports as a collision
 * - Collision filters decide which pairs are resolved; `collides` ignores them
 */

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::fmt;

use nannou::prelude::{vec2, Vec2};
use thiserror::Error;

use crate::color::Color;

pub const CATEGORY_DEFAULT: u32 = 0x0001;
pub const CATEGORY_HERBIVORES: u32 = 0x0002;

// Velocities are expressed per base step of 1000/60 ms
const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
const AIR_FRICTION: f32 = 0.01;
const DENSITY: f32 = 0.001;
const CONTACT_SLOP: f32 = 0.05;
const MAX_CIRCLE_SIDES: usize = 25;

/// Opaque reference to a body owned by a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("body {0} is not in the physics world")]
    UnknownBody(BodyHandle),
}

/// Which bodies a body is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: CATEGORY_DEFAULT,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

/// Everything needed to add a body to a physics world.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub angle: f32,
    /// Convex hulls relative to `position`
    pub parts: Vec<Vec<Vec2>>,
    pub is_static: bool,
    pub filter: CollisionFilter,
    pub fill: Color,
}

impl BodyDesc {
    fn from_hull(position: Vec2, hull: Vec<Vec2>) -> Self {
        Self {
            position,
            angle: 0.0,
            parts: vec![hull],
            is_static: false,
            filter: CollisionFilter::default(),
            fill: Color::new(0xff, 0xff, 0xff),
        }
    }

    /// Circle approximated by an even-sided regular polygon
    pub fn circle(position: Vec2, radius: f32) -> Self {
        let mut sides = radius.max(10.0).ceil().min(MAX_CIRCLE_SIDES as f32) as usize;
        if sides % 2 == 1 {
            sides += 1;
        }
        Self::from_hull(position, regular_hull(sides, radius))
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`
    pub fn polygon(position: Vec2, sides: usize, radius: f32) -> Self {
        Self::from_hull(position, regular_hull(sides.max(3), radius))
    }

    pub fn rectangle(position: Vec2, width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let hull = vec![vec2(-hw, -hh), vec2(hw, -hh), vec2(hw, hh), vec2(-hw, hh)];
        Self::from_hull(position, hull)
    }

    /// Merge several bodies into one, positioned at the mean of their positions
    pub fn compound(parts: Vec<BodyDesc>) -> Self {
        let count = parts.len().max(1) as f32;
        let position = parts.iter().fold(Vec2::ZERO, |acc, p| acc + p.position) / count;
        let hulls = parts
            .iter()
            .flat_map(|part| {
                part.parts.iter().map(move |hull| {
                    hull.iter()
                        .map(|v| part.position - position + rotate(*v, part.angle))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        Self {
            parts: hulls,
            ..Self::from_hull(position, Vec::new())
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }
}

fn regular_hull(sides: usize, radius: f32) -> Vec<Vec2> {
    let theta = TAU / sides as f32;
    let offset = theta * 0.5;
    (0..sides)
        .map(|i| {
            let angle = offset + i as f32 * theta;
            vec2(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    vec2(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

fn hull_area(hull: &[Vec2]) -> f32 {
    let n = hull.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let (a, b) = (hull[i], hull[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// A body living in a physics world.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub handle: BodyHandle,
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub is_static: bool,
    pub filter: CollisionFilter,
    pub fill: Color,
    parts: Vec<Vec<Vec2>>,
    force: Vec2,
    torque: f32,
    mass: f32,
    inertia: f32,
}

impl Body {
    fn new(handle: BodyHandle, desc: BodyDesc) -> Self {
        let mut body = Self {
            handle,
            position: desc.position,
            angle: desc.angle,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            is_static: desc.is_static,
            filter: desc.filter,
            fill: desc.fill,
            parts: desc.parts,
            force: Vec2::ZERO,
            torque: 0.0,
            mass: 0.0,
            inertia: 0.0,
        };
        body.update_mass();
        body
    }

    fn update_mass(&mut self) {
        let area: f32 = self.parts.iter().map(|hull| hull_area(hull)).sum();
        self.mass = (area * DENSITY).max(f32::EPSILON);

        // Approximate rotational inertia from the mean squared vertex radius
        let (sum, count) = self
            .parts
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, c), v| (s + v.length_squared(), c + 1));
        let mean_sq = if count > 0 { sum / count as f32 } else { 0.0 };
        self.inertia = (self.mass * mean_sq / 2.0).max(f32::EPSILON);
    }

    /// Hulls in world coordinates
    pub fn world_parts(&self) -> Vec<Vec<Vec2>> {
        self.parts
            .iter()
            .map(|hull| hull.iter().map(|v| self.position + rotate(*v, self.angle)).collect())
            .collect()
    }
}

/// The commands and queries the simulation issues to its physics world.
pub trait PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Removing a body that is not present is an error, never a no-op.
    fn remove_body(&mut self, handle: BodyHandle) -> Result<Body, PhysicsError>;

    /// Advance the world by `delta_ms` milliseconds
    fn update(&mut self, delta_ms: f32);

    fn body(&self, handle: BodyHandle) -> Result<&Body, PhysicsError>;

    fn bodies<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Body> + 'a>;

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;

    /// Apply `force` at world point `point` until the next update
    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) -> Result<(), PhysicsError>;

    /// Scale the body's shape about its position
    fn scale(&mut self, handle: BodyHandle, sx: f32, sy: f32) -> Result<(), PhysicsError>;

    /// Whether the two bodies currently overlap
    fn collides(&self, a: BodyHandle, b: BodyHandle) -> Result<bool, PhysicsError>;

    fn position(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(self.body(handle)?.position)
    }

    fn angle(&self, handle: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.body(handle)?.angle)
    }

    fn velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(self.body(handle)?.velocity)
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_ok()
    }
}

/// Apply a force given in the body's own frame at a point in the body's own frame
pub fn apply_relative_force<P: PhysicsWorld + ?Sized>(
    physics: &mut P,
    handle: BodyHandle,
    relative_point: Vec2,
    relative_force: Vec2,
) -> Result<(), PhysicsError> {
    let body = physics.body(handle)?;
    let point = body.position + rotate(relative_point, body.angle);
    let force = rotate(relative_force, body.angle);
    physics.apply_force(handle, point, force)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    /// Unit vector pointing from the second hull towards the first
    normal: Vec2,
    depth: f32,
}

// Separating-axis test between two convex hulls
fn sat_contact(a: &[Vec2], b: &[Vec2]) -> Option<Contact> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let mut best: Option<Contact> = None;
    for hull in [a, b] {
        let n = hull.len();
        for i in 0..n {
            let edge = hull[(i + 1) % n] - hull[i];
            let length = edge.length();
            if length <= f32::EPSILON {
                continue;
            }
            let axis = vec2(-edge.y, edge.x) / length;

            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if overlap <= 0.0 {
                return None;
            }
            if best.map_or(true, |c| overlap < c.depth) {
                best = Some(Contact { normal: axis, depth: overlap });
            }
        }
    }

    best.map(|mut contact| {
        if (centroid(a) - centroid(b)).dot(contact.normal) < 0.0 {
            contact.normal = -contact.normal;
        }
        contact
    })
}

fn project(hull: &[Vec2], axis: Vec2) -> (f32, f32) {
    hull.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        let d = v.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

fn centroid(hull: &[Vec2]) -> Vec2 {
    hull.iter().fold(Vec2::ZERO, |acc, v| acc + *v) / hull.len().max(1) as f32
}

/// Bundled physics world for the arena
#[derive(Debug, Clone, Default)]
pub struct ArenaPhysics {
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u64,
}

impl ArenaPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies currently in the world, walls included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.bodies.get_mut(&handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn integrate(&mut self, delta_ms: f32) {
        let t = delta_ms / BASE_DELTA_MS;
        let friction = (1.0 - AIR_FRICTION * t).max(0.0);

        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            body.velocity = body.velocity * friction + body.force / body.mass * t;
            body.angular_velocity = body.angular_velocity * friction + body.torque / body.inertia * t;
            body.position += body.velocity * t;
            body.angle += body.angular_velocity * t;

            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }

    // Push dynamic bodies out of the static bodies they are allowed to hit
    fn resolve_static_contacts(&mut self) {
        let obstacles: Vec<(CollisionFilter, Vec<Vec<Vec2>>)> = self
            .bodies
            .values()
            .filter(|b| b.is_static)
            .map(|b| (b.filter, b.world_parts()))
            .collect();

        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            for (filter, obstacle_parts) in &obstacles {
                if !body.filter.can_collide(filter) {
                    continue;
                }
                for obstacle in obstacle_parts {
                    for hull in body.world_parts() {
                        let Some(contact) = sat_contact(&hull, obstacle) else {
                            continue;
                        };
                        if contact.depth <= CONTACT_SLOP {
                            continue;
                        }
                        body.position += contact.normal * (contact.depth - CONTACT_SLOP);

                        // Drop the velocity component heading into the obstacle
                        let into = body.velocity.dot(contact.normal);
                        if into < 0.0 {
                            body.velocity -= contact.normal * into;
                        }
                    }
                }
            }
        }
    }
}

impl PhysicsWorld for ArenaPhysics {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, Body::new(handle, desc));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Result<Body, PhysicsError> {
        self.bodies.remove(&handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn update(&mut self, delta_ms: f32) {
        self.integrate(delta_ms);
        self.resolve_static_contacts();
    }

    fn body(&self, handle: BodyHandle) -> Result<&Body, PhysicsError> {
        self.bodies.get(&handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn bodies<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Body> + 'a> {
        Box::new(self.bodies.values())
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.is_static {
            body.velocity = velocity;
        }
        Ok(())
    }

    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        let offset = point - body.position;
        body.force += force;
        body.torque += offset.x * force.y - offset.y * force.x;
        Ok(())
    }

    fn scale(&mut self, handle: BodyHandle, sx: f32, sy: f32) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        for v in body.parts.iter_mut().flatten() {
            v.x *= sx;
            v.y *= sy;
        }
        body.update_mass();
        Ok(())
    }

    fn collides(&self, a: BodyHandle, b: BodyHandle) -> Result<bool, PhysicsError> {
        let parts_a = self.body(a)?.world_parts();
        let parts_b = self.body(b)?.world_parts();

        Ok(parts_a
            .iter()
            .any(|ha| parts_b.iter().any(|hb| sat_contact(ha, hb).is_some())))
    }
}
