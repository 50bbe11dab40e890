use crate::grid::IndexBox;
use crate::reconstruction::Stencil;
use rayon::prelude::*;
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("VOF_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

pub(crate) fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

/// Evaluates `f` at every index of `bx` in storage order, in parallel for large
/// boxes.
pub fn map_cells<T: Send>(bx: IndexBox, f: impl Fn([i32; 3]) -> T + Sync) -> Vec<T> {
    let len = bx.size();
    if should_parallel(len) {
        (0..len).into_par_iter().map(|i| f(bx.point(i))).collect()
    } else {
        (0..len).map(|i| f(bx.point(i))).collect()
    }
}

/// Cell- or face-indexed scalar data over an `IndexBox`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field3 {
    bx: IndexBox,
    data: Vec<f64>,
}

impl Field3 {
    pub fn new(bx: IndexBox, fill: f64) -> Self {
        let data = vec![fill; bx.size()];
        Self { bx, data }
    }

    pub fn from_data(bx: IndexBox, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), bx.size(), "field data mismatch");
        Self { bx, data }
    }

    pub fn from_fn(bx: IndexBox, f: impl Fn([i32; 3]) -> f64 + Sync) -> Self {
        Self {
            bx,
            data: map_cells(bx, f),
        }
    }

    pub fn index_box(&self) -> IndexBox {
        self.bx
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, p: [i32; 3]) -> f64 {
        self.data[self.bx.idx(p)]
    }

    pub fn get_or(&self, p: [i32; 3], default: f64) -> f64 {
        if self.bx.contains(p) {
            self.get(p)
        } else {
            default
        }
    }

    pub fn set(&mut self, p: [i32; 3], value: f64) {
        let i = self.bx.idx(p);
        self.data[i] = value;
    }

    pub fn sample_clamped(&self, p: [i32; 3]) -> f64 {
        self.get(self.bx.clamp(p))
    }

    /// 3×3×3 neighbourhood of `p`, clamped to the field bounds.
    pub fn stencil(&self, p: [i32; 3]) -> Stencil {
        Stencil::from_fn(|di, dj, dk| self.sample_clamped([p[0] + di, p[1] + dj, p[2] + dk]))
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    pub fn fill_with_index(&mut self, f: impl Fn([i32; 3]) -> f64 + Sync) {
        let bx = self.bx;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                *value = f(bx.point(i));
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                *value = f(bx.point(i));
            }
        }
    }

    /// Rewrites the entries inside `region`; entries outside keep their value.
    pub fn update_in_box(&mut self, region: IndexBox, f: impl Fn([i32; 3], f64) -> f64 + Sync) {
        assert!(self.bx.contains_box(&region), "update region outside field");
        let bx = self.bx;
        let apply = |(i, value): (usize, &mut f64)| {
            let p = bx.point(i);
            if region.contains(p) {
                *value = f(p, *value);
            }
        };
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(apply);
        } else {
            self.data.iter_mut().enumerate().for_each(apply);
        }
    }

    pub fn sum(&self) -> f64 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().sum()
        } else {
            self.data.iter().sum()
        }
    }

    pub fn sum_over(&self, region: IndexBox) -> f64 {
        assert!(self.bx.contains_box(&region), "sum region outside field");
        region.cells().map(|p| self.get(p)).sum()
    }

    pub fn max_abs(&self) -> f64 {
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .map(|value| value.abs())
                .reduce(|| 0.0_f64, f64::max)
        } else {
            self.data
                .iter()
                .map(|value| value.abs())
                .fold(0.0_f64, f64::max)
        }
    }

    pub fn min_max_over(&self, region: IndexBox) -> (f64, f64) {
        let mut iter = region
            .cells()
            .map(|p| self.get(p))
            .filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), value| (lo.min(value), hi.max(value)))
    }

    pub fn abs_diff_sum_over(&self, other: &Self, region: IndexBox) -> f64 {
        region
            .cells()
            .map(|p| (self.get(p) - other.get(p)).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn from_fn_uses_signed_indices() {
        let bx = IndexBox::new([-1, 0, 0], [1, 1, 0]);
        let field = Field3::from_fn(bx, |p| (p[0] * 10 + p[1]) as f64);
        assert_eq!(field.get([-1, 0, 0]), -10.0);
        assert_eq!(field.get([1, 1, 0]), 11.0);
        assert_eq!(field.get_or([2, 0, 0], 7.0), 7.0);
    }

    #[test]
    fn stencil_clamps_at_edges() {
        let bx = IndexBox::from_extent([2, 2, 2]);
        let field = Field3::from_fn(bx, |p| p[0] as f64);
        let stencil = field.stencil([0, 0, 0]);
        assert_eq!(stencil.get(-1, 0, 0), 0.0);
        assert_eq!(stencil.get(1, 1, 1), 1.0);
    }

    #[test]
    fn update_in_box_leaves_outside_untouched() {
        let bx = IndexBox::from_extent([3, 3, 3]);
        let mut field = Field3::new(bx, 1.0);
        let inner = IndexBox::new([1, 1, 1], [1, 1, 1]);
        field.update_in_box(inner, |_, value| value + 1.0);
        assert_eq!(field.get([1, 1, 1]), 2.0);
        assert_eq!(field.get([0, 1, 1]), 1.0);
        assert_close(field.sum(), 28.0, 1e-12);
    }

    #[test]
    fn min_max_and_diff_over_region() {
        let bx = IndexBox::from_extent([4, 1, 1]);
        let a = Field3::from_fn(bx, |p| p[0] as f64 * 0.25);
        let b = Field3::new(bx, 0.0);
        let region = IndexBox::new([1, 0, 0], [2, 0, 0]);
        assert_eq!(a.min_max_over(region), (0.25, 0.5));
        assert_close(a.abs_diff_sum_over(&b, region), 0.75, 1e-12);
        assert_close(a.sum_over(region), 0.75, 1e-12);
    }
}
