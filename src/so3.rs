/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
//! Rotation group SO(3) helpers on plain `Matrix3` values
//!
//! Rotation vectors are axis-angle vectors `w = θ a`, `|a| = 1`.
use crate::Real;
use nalgebra as na;
use na::{Matrix3, Vector3};

/// Below this angle the closed forms are replaced by their Taylor expansions
///
/// `ε^(1/4)` keeps the truncation error under the machine precision of `T`.
#[inline]
pub(crate) fn small_angle_threshold<T: Real>() -> T {
    T::default_epsilon().sqrt().sqrt()
}

fn half<T: Real>() -> T {
    na::convert(0.5)
}

/// Skew-symmetric matrix of `w`, `hat(w) v = w × v`
///
/// # Examples
///
/// ```
/// use kdiff::{so3, Vector3};
///
/// let w = Vector3::new(1.0, 2.0, 3.0);
/// let v = Vector3::new(-0.5, 0.1, 2.0);
/// assert!((so3::hat(&w) * v - w.cross(&v)).norm() < 1e-12);
/// ```
#[rustfmt::skip]
pub fn hat<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    Matrix3::new(
        T::zero(), -w[2], w[1],
        w[2], T::zero(), -w[0],
        -w[1], w[0], T::zero(),
    )
}

/// Inverse of `hat`. Only the lower triangle `(m21, m02, m10)` is read.
pub fn vee<T: Real>(m: &Matrix3<T>) -> Vector3<T> {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Pairs a 3x3 matrix with the skew basis, `project(m) · w = <m, hat(w)>`
pub fn project<T: Real>(m: &Matrix3<T>) -> Vector3<T> {
    Vector3::new(
        m[(2, 1)] - m[(1, 2)],
        m[(0, 2)] - m[(2, 0)],
        m[(1, 0)] - m[(0, 1)],
    )
}

/// `(sin θ / θ, (1 - cos θ) / θ², (θ - sin θ) / θ³)`
pub(crate) fn rodrigues_coefficients<T: Real>(theta: T) -> (T, T, T) {
    let theta2 = theta * theta;
    if theta < small_angle_threshold() {
        let c6: T = na::convert(1.0 / 6.0);
        let c24: T = na::convert(1.0 / 24.0);
        let c120: T = na::convert(1.0 / 120.0);
        (
            T::one() - theta2 * c6,
            half::<T>() - theta2 * c24,
            c6 - theta2 * c120,
        )
    } else {
        let sin = theta.sin();
        let half_sin = (theta * half()).sin();
        let two: T = na::convert(2.0);
        (
            sin / theta,
            two * half_sin * half_sin / theta2,
            (theta - sin) / (theta2 * theta),
        )
    }
}

/// Rotation matrix of the rotation vector `w` (Rodrigues formula)
pub fn exp<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    let (a, b, _) = rodrigues_coefficients(w.norm());
    let w_hat = hat(w);
    Matrix3::identity() + w_hat * a + w_hat * w_hat * b
}

/// Rotation vector of `r`, with `|log(r)| ∈ [0, π]`
///
/// # Examples
///
/// ```
/// use kdiff::{so3, Vector3};
///
/// let w = Vector3::new(0.1, -0.4, 0.3);
/// assert!((so3::log(&so3::exp(&w)) - w).norm() < 1e-12);
/// ```
pub fn log<T: Real>(r: &Matrix3<T>) -> Vector3<T> {
    let cos = ((r.trace() - T::one()) * half()).clamp(-T::one(), T::one());
    // 2 sin θ a
    let skew = project(r);
    let sin = skew.norm() * half();
    let theta = sin.atan2(cos);
    if cos >= T::zero() {
        let scale = if theta < small_angle_threshold() {
            let c12: T = na::convert(1.0 / 12.0);
            half::<T>() + theta * theta * c12
        } else {
            theta / (sin + sin)
        };
        skew * scale
    } else {
        // a aᵀ = (sym(R) - cos θ I) / (1 - cos θ) is well conditioned away from θ = 0
        let symmetric = (r + r.transpose()) * half::<T>();
        let outer = (symmetric - Matrix3::identity() * cos) / (T::one() - cos);
        let k = outer.diagonal().imax();
        let pivot = outer[(k, k)].max(T::zero()).sqrt();
        let mut axis = outer.column(k) / pivot;
        if axis.dot(&skew) < T::zero() {
            axis = -axis;
        }
        axis * theta
    }
}

/// Left Jacobian `Jl(w)`, `exp(w + δ) ≈ exp(Jl(w) δ) exp(w)`
pub fn left_jacobian<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    let (_, b, c) = rodrigues_coefficients(w.norm());
    let w_hat = hat(w);
    Matrix3::identity() + w_hat * b + w_hat * w_hat * c
}

/// Right Jacobian `Jr(w) = Jl(-w)`, `exp(w + δ) ≈ exp(w) exp(Jr(w) δ)`
pub fn right_jacobian<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    left_jacobian(&-w)
}

/// `1 / θ² - (1 + cos θ) / (2 θ sin θ)`
fn inverse_jacobian_coefficient<T: Real>(theta: T) -> T {
    let theta2 = theta * theta;
    if theta < small_angle_threshold() {
        let c12: T = na::convert(1.0 / 12.0);
        let c720: T = na::convert(1.0 / 720.0);
        c12 + theta2 * c720
    } else {
        let half_theta = theta * half();
        let (sin, cos) = half_theta.sin_cos();
        (T::one() - half_theta * cos / sin) / theta2
    }
}

/// Inverse of `left_jacobian`, singular at `|w| = 2π`
pub fn left_jacobian_inverse<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    let e = inverse_jacobian_coefficient(w.norm());
    let w_hat = hat(w);
    Matrix3::identity() - w_hat * half::<T>() + w_hat * w_hat * e
}

/// Inverse of `right_jacobian`
pub fn right_jacobian_inverse<T: Real>(w: &Vector3<T>) -> Matrix3<T> {
    left_jacobian_inverse(&-w)
}

/// Rotation by `angle` around the x axis
#[rustfmt::skip]
pub fn rotation_x<T: Real>(angle: T) -> Matrix3<T> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        T::one(), T::zero(), T::zero(),
        T::zero(), c, -s,
        T::zero(), s, c,
    )
}

/// Rotation by `angle` around the y axis
#[rustfmt::skip]
pub fn rotation_y<T: Real>(angle: T) -> Matrix3<T> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, T::zero(), s,
        T::zero(), T::one(), T::zero(),
        -s, T::zero(), c,
    )
}

/// Rotation by `angle` around the z axis
#[rustfmt::skip]
pub fn rotation_z<T: Real>(angle: T) -> Matrix3<T> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, T::zero(),
        s, c, T::zero(),
        T::zero(), T::zero(), T::one(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::{Rotation3, Unit};

    #[test]
    fn exp_matches_nalgebra() {
        for w in [
            Vector3::new(0.3, -0.2, 0.9),
            Vector3::new(1e-9, 0.0, -2e-9),
            Vector3::new(0.0, 3.1, 0.0),
        ] {
            let expected = Rotation3::new(w);
            assert_relative_eq!(exp(&w), *expected.matrix(), epsilon = 1e-12);
        }
        assert_relative_eq!(exp(&Vector3::<f64>::zeros()), Matrix3::identity());
    }

    #[test]
    fn principal_rotations() {
        let angle = 0.7;
        assert_relative_eq!(
            rotation_x(angle),
            exp(&Vector3::new(angle, 0.0, 0.0)),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rotation_y(angle),
            exp(&Vector3::new(0.0, angle, 0.0)),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rotation_z(angle),
            exp(&Vector3::new(0.0, 0.0, angle)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn log_round_trip() {
        for w in [
            Vector3::new(0.3, -0.2, 0.9),
            Vector3::new(1e-7, 2e-7, 0.0),
            Vector3::new(-1.0, 0.5, 1.2),
            Vector3::new(0.0, 0.0, 3.0),
        ] {
            assert_relative_eq!(log(&exp(&w)), w, epsilon = 1e-10);
        }
        assert_relative_eq!(log(&Matrix3::<f64>::identity()), Vector3::zeros());
    }

    #[test]
    fn log_near_pi() {
        let axis = Unit::new_normalize(Vector3::new(1.0, -2.0, 0.5));
        let w = axis.into_inner() * (std::f64::consts::PI - 1e-9);
        assert_relative_eq!(log(&exp(&w)), w, epsilon = 1e-7);

        let w = Vector3::new(0.0, std::f64::consts::PI, 0.0);
        let back = log(&exp(&w));
        assert_relative_eq!(back.norm(), std::f64::consts::PI, epsilon = 1e-10);
        assert_relative_eq!(exp(&back), exp(&w), epsilon = 1e-10);
    }

    #[test]
    fn left_jacobian_inverse_is_inverse() {
        for w in [
            Vector3::new(0.3, -0.2, 0.9),
            Vector3::new(1e-6, 0.0, 1e-6),
            Vector3::new(2.0, 1.0, -1.5),
        ] {
            assert_relative_eq!(
                left_jacobian(&w) * left_jacobian_inverse(&w),
                Matrix3::identity(),
                epsilon = 1e-10
            );
            assert_relative_eq!(
                right_jacobian(&w) * right_jacobian_inverse(&w),
                Matrix3::identity(),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn right_jacobian_by_finite_difference() {
        let w = Vector3::new(0.4, -0.3, 0.8);
        let jr = right_jacobian(&w);
        let r_inv = exp(&w).transpose();
        let h = 1e-6;
        for i in 0..3 {
            let mut delta = Vector3::zeros();
            delta[i] = h;
            let plus = log(&(r_inv * exp(&(w + delta))));
            let minus = log(&(r_inv * exp(&(w - delta))));
            let column = (plus - minus) / (2.0 * h);
            assert_relative_eq!(column, jr.column(i).into_owned(), epsilon = 1e-7);
        }
    }

    #[test]
    fn project_pairs_with_hat() {
        let m = Matrix3::new(0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9);
        let w = Vector3::new(1.0, -2.0, 0.5);
        assert_relative_eq!(project(&m).dot(&w), m.dot(&hat(&w)), epsilon = 1e-12);
        assert_relative_eq!(vee(&hat(&w)), w);
    }
}
