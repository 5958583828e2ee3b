use glam::{Mat4, Vec3};
use wavescope_common::{Transform, Viewport};
use wavescope_scene::{CameraPose, DisplayRect};

/// Depth of the display plane the scene is projected onto:
/// -1 / tan(fov / 2) for the 45 degree reference fov, so the display rect
/// maps onto the near frustum at unit scale.
pub const Z_PLANE: f32 = -2.414_213;

/// Object pose as a column-major model matrix.
pub fn model_matrix(pose: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(pose.scale, pose.rotation, pose.translation)
}

/// Combined view-projection for the current camera, viewport, and display
/// rect: rotate, scale to the rect, translate to the display plane, then
/// apply perspective.
///
/// A degenerate viewport collapses the scale to zero instead of dividing
/// by it; the result stays finite.
pub fn view_projection(camera: &CameraPose, viewport: Viewport, rect: DisplayRect) -> Mat4 {
    let (scale, offset_x, offset_y) = if viewport.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let width = viewport.width as f32;
        let height = viewport.height as f32;
        let sx = rect.width() / width;
        let sy = rect.height() / height;
        (
            sy,
            -1.0 + sx + 2.0 * rect.left / width,
            -1.0 + sy + 2.0 * rect.bottom / height,
        )
    };

    let rotation = Mat4::from_quat(camera.orientation());
    let scaling = Mat4::from_scale(Vec3::splat(scale));
    let translation =
        Mat4::from_translation(Vec3::new(offset_x, offset_y, Z_PLANE) - camera.position);
    let projection = Mat4::perspective_rh(camera.fov, viewport.aspect(), camera.near, camera.far);

    projection * translation * scaling * rotation
}

/// Inverse of the camera rotation, for transforming surface normals.
pub fn normal_rotation(camera: &CameraPose) -> Mat4 {
    Mat4::from_quat(camera.orientation()).inverse()
}

/// Screen-space transform mapping the unit square [0, 1]^2 onto the
/// display rect in normalized device coordinates. Backdrop panels use
/// this instead of the perspective pipeline, so they stay axis-aligned
/// regardless of camera orientation.
pub fn rect_transform(viewport: Viewport, rect: DisplayRect) -> Mat4 {
    if viewport.is_empty() {
        return Mat4::from_scale(Vec3::ZERO);
    }
    let width = viewport.width as f32;
    let height = viewport.height as f32;
    let translation = Vec3::new(
        2.0 * rect.left / width - 1.0,
        2.0 * rect.bottom / height - 1.0,
        0.0,
    );
    let scale = Vec3::new(2.0 * rect.width() / width, 2.0 * rect.height() / height, 1.0);
    Mat4::from_translation(translation) * Mat4::from_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_finite(m: &Mat4) {
        for c in 0..4 {
            let col = m.col(c);
            assert!(col.is_finite(), "non-finite column {c}: {col:?}");
        }
    }

    #[test]
    fn model_matrix_identity() {
        let m = model_matrix(&Transform::default());
        assert_eq!(m, Mat4::IDENTITY);
    }

    #[test]
    fn view_projection_finite_for_normal_viewport() {
        let viewport = Viewport::new(800, 600);
        let rect = DisplayRect::from_viewport(viewport);
        let vp = view_projection(&CameraPose::tilted(), viewport, rect);
        assert_finite(&vp);
        assert_ne!(vp, Mat4::ZERO);
    }

    #[test]
    fn view_projection_finite_for_zero_viewport() {
        let viewport = Viewport::new(0, 0);
        let rect = DisplayRect::from_viewport(viewport);
        let vp = view_projection(&CameraPose::default(), viewport, rect);
        assert_finite(&vp);
    }

    #[test]
    fn origin_projects_inside_clip_volume() {
        let viewport = Viewport::new(800, 800);
        let rect = DisplayRect::from_viewport(viewport);
        let vp = view_projection(&CameraPose::default(), viewport, rect);
        let clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() <= 1.0 + 1e-4);
        assert!(ndc.y.abs() <= 1.0 + 1e-4);
    }

    #[test]
    fn rect_transform_maps_unit_square_to_rect() {
        let viewport = Viewport::new(800, 600);
        let rect = DisplayRect::from_viewport(viewport);
        let m = rect_transform(viewport, rect);

        // (0, 0) maps to the rect's lower-left corner in NDC.
        let low = m * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((low.x - (2.0 * rect.left / 800.0 - 1.0)).abs() < 1e-5);
        // (1, 1) maps to the upper-right corner.
        let high = m * glam::Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((high.x - (2.0 * rect.right / 800.0 - 1.0)).abs() < 1e-5);
        assert!((high.y - (2.0 * rect.top / 600.0 - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn rect_transform_zero_viewport_collapses() {
        let viewport = Viewport::new(0, 0);
        let m = rect_transform(viewport, DisplayRect::from_viewport(viewport));
        let v = m * glam::Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!(v.is_finite());
    }

    #[test]
    fn normal_rotation_inverts_orientation() {
        let camera = CameraPose::tilted();
        let composed = normal_rotation(&camera) * Mat4::from_quat(camera.orientation());
        let diff = (composed - Mat4::IDENTITY).to_cols_array();
        assert!(diff.iter().all(|v| v.abs() < 1e-5));
    }
}
