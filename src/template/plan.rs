//! Template plan precomputation for ZNCC scoring.

use crate::image::ImageView;
use crate::util::{TaskSweepError, TaskSweepResult};

/// Precomputed zero-mean template and its energy.
///
/// With `t' = t - mean(t)` and `var_t = sum(t'^2)`, the ZNCC score at a
/// placement with window `I` is `sum(t' * I) / sqrt(var_t * var_i)` where
/// `var_i = sum(I^2) - sum(I)^2 / n`. This equals OpenCV's normalized
/// correlation-coefficient surface.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f32,
    var_t: f32,
    t_prime: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Fails with [`TaskSweepError::DegenerateTemplate`] for a flat template,
    /// whose correlation surface is undefined.
    pub fn from_view(tpl: ImageView<'_, u8>) -> TaskSweepResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(TaskSweepError::InvalidDimensions { width, height })?;

        let mut values = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).ok_or(TaskSweepError::BufferTooSmall {
                needed: count,
                got: values.len(),
            })?;
            values.extend(row.iter().map(|&v| f64::from(v)));
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let t_prime: Vec<f32> = values.iter().map(|v| (v - mean) as f32).collect();
        let var_t: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        if var_t <= 1e-8 {
            return Err(TaskSweepError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            mean: mean as f32,
            var_t: var_t as f32,
            t_prime,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mean intensity of the template.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Zero-mean template values in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}
