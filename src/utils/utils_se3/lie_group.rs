use nalgebra::{Isometry3, Matrix3, Quaternion, Translation3, UnitQuaternion, Vector3, Vector6};
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;

/// A spatial velocity (twist) with a linear and an angular part.  This is the tangent space
/// element of SE(3) used by `exp6` and `log6`.  When flattened, the linear part comes first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>
}
impl Motion {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self {
            linear,
            angular
        }
    }
    pub fn new_zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
    pub fn new_from_slice(s: &[f64]) -> Result<Self, OptimaError> {
        if s.len() != 6 {
            return Err(OptimaError::new_wrong_vec_length_error("Motion::new_from_slice", s.len(), 6, file!(), line!()));
        }
        return Ok(Self::new(Vector3::new(s[0], s[1], s[2]), Vector3::new(s[3], s[4], s[5])));
    }
    /// Returns the motion as `[linear; angular]`.
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(self.linear[0], self.linear[1], self.linear[2], self.angular[0], self.angular[1], self.angular[2])
    }
    pub fn to_array(&self) -> [f64; 6] {
        [self.linear[0], self.linear[1], self.linear[2], self.angular[0], self.angular[1], self.angular[2]]
    }
}

/// Convenience struct that groups together Lie group operations on SO(3) and SE(3).
pub struct SE3LieGroupUtils;
impl SE3LieGroupUtils {
    /// Exponential map from a rotation vector to a unit quaternion.
    pub fn exp3(w: &Vector3<f64>) -> UnitQuaternion<f64> {
        let theta_sq = w.norm_squared();
        if theta_sq == 0.0 { return UnitQuaternion::identity(); }

        let theta = theta_sq.sqrt();
        if theta < 1e-8 {
            return UnitQuaternion::new_normalize(Quaternion::new(1.0, 0.5 * w[0], 0.5 * w[1], 0.5 * w[2]));
        }

        let half = 0.5 * theta;
        let s = half.sin() / theta;
        return UnitQuaternion::new_unchecked(Quaternion::new(half.cos(), s * w[0], s * w[1], s * w[2]));
    }
    /// Logarithmic map from a unit quaternion to a rotation vector with angle in [0, pi].
    pub fn log3(r: &UnitQuaternion<f64>) -> Vector3<f64> {
        let q = r.quaternion();
        let mut v = Vector3::new(q.i, q.j, q.k);
        let mut w = q.w;
        if w < 0.0 { v = -v; w = -w; }

        let n = v.norm();
        if n < 1e-12 {
            return if w == 0.0 { Vector3::zeros() } else { v * (2.0 / w) };
        }

        let theta = 2.0 * n.atan2(w);
        return v * (theta / n);
    }
    /// Exponential map from a twist to a rigid transform.
    pub fn exp6(m: &Motion) -> Isometry3<f64> {
        let w = &m.angular;
        let rotation = Self::exp3(w);

        let theta_sq = w.norm_squared();
        let (a, b) = if theta_sq < 1e-6 {
            (0.5 - theta_sq / 24.0 + theta_sq * theta_sq / 720.0,
             1.0 / 6.0 - theta_sq / 120.0 + theta_sq * theta_sq / 5040.0)
        } else {
            let theta = theta_sq.sqrt();
            ((1.0 - theta.cos()) / theta_sq, (theta - theta.sin()) / (theta_sq * theta))
        };

        let skew = w.cross_matrix();
        let v_mat = Matrix3::identity() + skew * a + skew * skew * b;
        let translation = v_mat * m.linear;

        return Isometry3::from_parts(Translation3::from(translation), rotation);
    }
    /// Logarithmic map from a rigid transform to a twist.  This is the "error twist" between the
    /// identity and the given transform: it is zero if and only if the transform is the identity.
    pub fn log6(m: &Isometry3<f64>) -> Motion {
        let w = Self::log3(&m.rotation);

        let theta_sq = w.norm_squared();
        let c = if theta_sq < 1e-6 {
            1.0 / 12.0 + theta_sq / 720.0 + theta_sq * theta_sq / 30240.0
        } else {
            let theta = theta_sq.sqrt();
            (1.0 - theta * theta.sin() / (2.0 * (1.0 - theta.cos()))) / theta_sq
        };

        let skew = w.cross_matrix();
        let v_inv = Matrix3::identity() - skew * 0.5 + skew * skew * c;
        let linear = v_inv * m.translation.vector;

        return Motion::new(linear, w);
    }
    /// Returns `[x, y, z, qx, qy, qz, qw]`.
    pub fn isometry_to_xyz_quat(m: &Isometry3<f64>) -> [f64; 7] {
        let t = &m.translation.vector;
        let q = m.rotation.quaternion();
        [t[0], t[1], t[2], q.i, q.j, q.k, q.w]
    }
    /// Builds a transform from a translation and fixed-axis roll, pitch, yaw angles (the URDF
    /// convention).
    pub fn isometry_from_xyz_rpy(xyz: &[f64; 3], rpy: &[f64; 3]) -> Isometry3<f64> {
        let rotation = UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]);
        return Isometry3::from_parts(Translation3::new(xyz[0], xyz[1], xyz[2]), rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exp6_of_zero_is_identity() {
        let m = SE3LieGroupUtils::exp6(&Motion::new_zero());
        assert_eq!(m, Isometry3::identity());
    }

    #[test]
    fn log6_inverts_exp6() {
        let motions = vec![
            Motion::new(Vector3::new(0.1, -0.2, 0.3), Vector3::new(0.4, 0.2, -0.7)),
            Motion::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1e-5)),
            Motion::new(Vector3::new(-0.3, 0.5, 0.05), Vector3::new(1.2, -1.1, 0.9)),
        ];
        for m in motions {
            let back = SE3LieGroupUtils::log6(&SE3LieGroupUtils::exp6(&m));
            assert_relative_eq!(back.linear, m.linear, epsilon = 1e-10);
            assert_relative_eq!(back.angular, m.angular, epsilon = 1e-10);
        }
    }

    #[test]
    fn log6_of_pure_translation_is_the_translation() {
        let m = Isometry3::translation(0.0, 0.3, -0.1);
        let log = SE3LieGroupUtils::log6(&m);
        assert_relative_eq!(log.linear, Vector3::new(0.0, 0.3, -0.1), epsilon = 1e-14);
        assert_relative_eq!(log.angular, Vector3::zeros(), epsilon = 1e-14);
    }

    #[test]
    fn log3_handles_small_and_flipped_quaternions() {
        let w = Vector3::new(1e-9, -2e-9, 3e-9);
        assert_relative_eq!(SE3LieGroupUtils::log3(&SE3LieGroupUtils::exp3(&w)), w, epsilon = 1e-20);

        let q = SE3LieGroupUtils::exp3(&Vector3::new(0.0, 0.0, 0.5));
        let flipped = UnitQuaternion::new_unchecked(-q.into_inner());
        assert_relative_eq!(SE3LieGroupUtils::log3(&flipped), Vector3::new(0.0, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn xyz_quat_layout() {
        let m = SE3LieGroupUtils::isometry_from_xyz_rpy(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]);
        assert_eq!(SE3LieGroupUtils::isometry_to_xyz_quat(&m), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
