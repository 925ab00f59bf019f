use nalgebra::{DMatrix, DVector};

pub struct FiniteDifferenceUtils;
impl FiniteDifferenceUtils {
    /// Central difference gradient of a scalar function.  The perturbation along each coordinate
    /// is `h * max(1, |x_i|)`.
    pub fn central_gradient<F: Fn(&[f64]) -> f64>(f: F, x: &[f64], h: f64) -> DVector<f64> {
        let n = x.len();
        let mut out = DVector::zeros(n);
        let mut x_perturbed = x.to_vec();

        for i in 0..n {
            let step = Self::step_size(h, x[i]);

            x_perturbed[i] = x[i] + step;
            let f_plus = f(&x_perturbed);
            x_perturbed[i] = x[i] - step;
            let f_minus = f(&x_perturbed);
            x_perturbed[i] = x[i];

            out[i] = (f_plus - f_minus) / (2.0 * step);
        }

        out
    }
    /// Central difference Jacobian of a vector function with `m` outputs.  Row `i` of the
    /// output holds the gradient of output `i`.
    pub fn central_jacobian<F: Fn(&[f64], &mut [f64])>(f: F, x: &[f64], m: usize, h: f64) -> DMatrix<f64> {
        let n = x.len();
        let mut out = DMatrix::zeros(m, n);
        let mut x_perturbed = x.to_vec();
        let mut f_plus = vec![0.0; m];
        let mut f_minus = vec![0.0; m];

        for j in 0..n {
            let step = Self::step_size(h, x[j]);

            x_perturbed[j] = x[j] + step;
            f(&x_perturbed, &mut f_plus);
            x_perturbed[j] = x[j] - step;
            f(&x_perturbed, &mut f_minus);
            x_perturbed[j] = x[j];

            for i in 0..m {
                out[(i, j)] = (f_plus[i] - f_minus[i]) / (2.0 * step);
            }
        }

        out
    }
    fn step_size(h: f64, x_i: f64) -> f64 {
        h * x_i.abs().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gradient_of_quadratic() {
        let f = |x: &[f64]| x[0] * x[0] + 3.0 * x[0] * x[1] - x[1];
        let g = FiniteDifferenceUtils::central_gradient(f, &[1.0, 2.0], 1e-6);
        assert_relative_eq!(g[0], 8.0, epsilon = 1e-6);
        assert_relative_eq!(g[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn jacobian_rows_are_output_gradients() {
        let f = |x: &[f64], out: &mut [f64]| {
            out[0] = x[0] * x[1];
            out[1] = x[0].sin();
            out[2] = 2.0 * x[1];
        };
        let j = FiniteDifferenceUtils::central_jacobian(f, &[0.5, -1.0], 3, 1e-6);
        assert_eq!(j.shape(), (3, 2));
        assert_relative_eq!(j[(0, 0)], -1.0, epsilon = 1e-6);
        assert_relative_eq!(j[(0, 1)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(j[(1, 0)], 0.5f64.cos(), epsilon = 1e-6);
        assert_relative_eq!(j[(1, 1)], 0.0, epsilon = 1e-9);
        assert_relative_eq!(j[(2, 1)], 2.0, epsilon = 1e-6);
    }
}
