//! View projection between object space and 2D region coordinates.
//!
//! Region coordinates are pixels with the origin at the bottom-left corner of
//! the viewport region, x to the right and y up. A [`ViewProjection`] bundles
//! the camera's view-projection matrix with the object's world transform so
//! that both directions (point to region, region to ray) can be computed in
//! either world or object space.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Clip-space w below which a point counts as behind the view
const MIN_CLIP_W: f32 = 1e-6;

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Camera and object transforms for one viewport region
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    view_proj: Mat4,
    inverse_view_proj: Mat4,
    object_to_world: Mat4,
    world_to_object: Mat4,
    region_size: Vec2,
}

impl ViewProjection {
    /// Build from a combined view-projection matrix, the object's world
    /// transform and the region size in pixels
    pub fn new(view_proj: Mat4, object_to_world: Mat4, region_size: Vec2) -> Self {
        Self {
            view_proj,
            inverse_view_proj: view_proj.inverse(),
            object_to_world,
            world_to_object: object_to_world.inverse(),
            region_size,
        }
    }

    /// Perspective camera looking from `eye` at `target`
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_radians: f32,
        object_to_world: Mat4,
        region_size: Vec2,
    ) -> Self {
        let aspect = if region_size.y > 0.0 {
            region_size.x / region_size.y
        } else {
            1.0
        };
        let proj = Mat4::perspective_rh(fov_y_radians, aspect, 0.1, 1000.0);
        let view = Mat4::look_at_rh(eye, target, up);
        Self::new(proj * view, object_to_world, region_size)
    }

    /// Top-down orthographic view where world x/y equal region pixels
    ///
    /// Looks down -Z; world points with z in [-100, 100] are visible.
    pub fn orthographic_region(width: f32, height: f32) -> Self {
        let proj = Mat4::orthographic_rh(0.0, width, 0.0, height, -100.0, 100.0);
        Self::new(proj, Mat4::IDENTITY, Vec2::new(width, height))
    }

    /// Same camera with a different object transform
    pub fn with_object_transform(&self, object_to_world: Mat4) -> Self {
        Self::new(self.view_proj, object_to_world, self.region_size)
    }

    pub fn region_size(&self) -> Vec2 {
        self.region_size
    }

    pub fn object_to_world(&self) -> Mat4 {
        self.object_to_world
    }

    pub fn world_to_object(&self) -> Mat4 {
        self.world_to_object
    }

    /// Whether a region point lies inside `[0, width] x [0, height]`
    pub fn contains_region_point(&self, point: Vec2) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.region_size.x
            && point.y <= self.region_size.y
    }

    /// Project a world-space point to region pixels
    ///
    /// Returns `None` for points at or behind the camera plane.
    pub fn world_to_region(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        Some((ndc + Vec2::ONE) * 0.5 * self.region_size)
    }

    /// Project an object-space point to region pixels
    pub fn object_to_region(&self, object: Vec3) -> Option<Vec2> {
        self.world_to_region(self.object_to_world.transform_point3(object))
    }

    /// World-space ray through a region pixel, starting on the near plane
    pub fn region_to_ray(&self, region: Vec2) -> Option<Ray> {
        if self.region_size.x <= 0.0 || self.region_size.y <= 0.0 {
            return None;
        }
        let ndc = region / self.region_size * 2.0 - Vec2::ONE;
        let near = self
            .inverse_view_proj
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = self
            .inverse_view_proj
            .project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = far - near;
        if !near.is_finite() || !direction.is_finite() || direction.length_squared() == 0.0 {
            return None;
        }
        Some(Ray::new(near, direction))
    }

    /// Object-space ray through a region pixel
    pub fn region_to_object_ray(&self, region: Vec2) -> Option<Ray> {
        let world = self.region_to_ray(region)?;
        let origin = self.world_to_object.transform_point3(world.origin);
        let direction = self.world_to_object.transform_vector3(world.direction);
        if direction.length_squared() == 0.0 {
            return None;
        }
        Some(Ray::new(origin, direction))
    }
}
