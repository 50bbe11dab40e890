pub const GHOST_LAYERS: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining axes in cyclic order after `self`.
    pub fn transverse(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Reorders a vector so the component along `self` comes first, followed by
    /// the transverse components in cyclic order.
    pub fn permute(self, v: [f64; 3]) -> [f64; 3] {
        let (a, b) = self.transverse();
        [v[self.index()], v[a.index()], v[b.index()]]
    }

    pub fn shift(self, p: [i32; 3], by: i32) -> [i32; 3] {
        let mut out = p;
        out[self.index()] += by;
        out
    }
}

/// Inclusive cell-index bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    lo: [i32; 3],
    hi: [i32; 3],
}

impl IndexBox {
    pub fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        for d in 0..3 {
            assert!(lo[d] <= hi[d], "box lo must not exceed hi");
        }
        Self { lo, hi }
    }

    pub fn from_extent(n: [usize; 3]) -> Self {
        assert!(n.iter().all(|len| *len > 0), "extent must be > 0");
        Self::new(
            [0, 0, 0],
            [n[0] as i32 - 1, n[1] as i32 - 1, n[2] as i32 - 1],
        )
    }

    pub fn lo(&self) -> [i32; 3] {
        self.lo
    }

    pub fn hi(&self) -> [i32; 3] {
        self.hi
    }

    pub fn len_along(&self, axis: Axis) -> usize {
        let d = axis.index();
        (self.hi[d] - self.lo[d] + 1) as usize
    }

    pub fn extent(&self) -> [usize; 3] {
        [
            self.len_along(Axis::X),
            self.len_along(Axis::Y),
            self.len_along(Axis::Z),
        ]
    }

    pub fn size(&self) -> usize {
        let [nx, ny, nz] = self.extent();
        nx * ny * nz
    }

    pub fn contains(&self, p: [i32; 3]) -> bool {
        (0..3).all(|d| p[d] >= self.lo[d] && p[d] <= self.hi[d])
    }

    pub fn contains_box(&self, other: &IndexBox) -> bool {
        self.contains(other.lo) && self.contains(other.hi)
    }

    pub fn grow(&self, layers: i32) -> Self {
        Self::new(
            [self.lo[0] - layers, self.lo[1] - layers, self.lo[2] - layers],
            [self.hi[0] + layers, self.hi[1] + layers, self.hi[2] + layers],
        )
    }

    /// Face-index box for faces normal to `axis`: one extra entry along `axis`.
    pub fn face_box(&self, axis: Axis) -> Self {
        let mut hi = self.hi;
        hi[axis.index()] += 1;
        Self::new(self.lo, hi)
    }

    pub fn idx(&self, p: [i32; 3]) -> usize {
        debug_assert!(self.contains(p), "index {p:?} outside {self:?}");
        let [nx, ny, _] = self.extent();
        let x = (p[0] - self.lo[0]) as usize;
        let y = (p[1] - self.lo[1]) as usize;
        let z = (p[2] - self.lo[2]) as usize;
        (z * ny + y) * nx + x
    }

    pub fn point(&self, idx: usize) -> [i32; 3] {
        let [nx, ny, _] = self.extent();
        let x = idx % nx;
        let y = (idx / nx) % ny;
        let z = idx / (nx * ny);
        [
            self.lo[0] + x as i32,
            self.lo[1] + y as i32,
            self.lo[2] + z as i32,
        ]
    }

    pub fn clamp(&self, p: [i32; 3]) -> [i32; 3] {
        [
            p[0].clamp(self.lo[0], self.hi[0]),
            p[1].clamp(self.lo[1], self.hi[1]),
            p[2].clamp(self.lo[2], self.hi[2]),
        ]
    }

    pub fn cells(&self) -> impl Iterator<Item = [i32; 3]> + '_ {
        (0..self.size()).map(move |i| self.point(i))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid3 {
    n: [usize; 3],
    dx: [f64; 3],
    origin: [f64; 3],
}

impl Grid3 {
    pub fn new(n: [usize; 3], dx: [f64; 3], origin: [f64; 3]) -> Self {
        assert!(n.iter().all(|len| *len > 0), "cell counts must be > 0");
        assert!(dx.iter().all(|h| *h > 0.0), "dx must be > 0");
        Self { n, dx, origin }
    }

    /// Grid covering `[origin, origin + length]` with `n` cells per axis.
    pub fn with_length(n: [usize; 3], length: [f64; 3], origin: [f64; 3]) -> Self {
        let dx = [
            length[0] / n[0] as f64,
            length[1] / n[1] as f64,
            length[2] / n[2] as f64,
        ];
        Self::new(n, dx, origin)
    }

    pub fn n(&self) -> [usize; 3] {
        self.n
    }

    pub fn dx(&self) -> [f64; 3] {
        self.dx
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    pub fn cell_volume(&self) -> f64 {
        self.dx[0] * self.dx[1] * self.dx[2]
    }

    pub fn cell_box(&self) -> IndexBox {
        IndexBox::from_extent(self.n)
    }

    pub fn ghost_box(&self) -> IndexBox {
        self.cell_box().grow(GHOST_LAYERS)
    }

    pub fn cell_center(&self, p: [i32; 3]) -> [f64; 3] {
        [
            self.origin[0] + (p[0] as f64 + 0.5) * self.dx[0],
            self.origin[1] + (p[1] as f64 + 0.5) * self.dx[1],
            self.origin[2] + (p[2] as f64 + 0.5) * self.dx[2],
        ]
    }

    pub fn dtdx(&self, axis: Axis, dt: f64) -> f64 {
        dt / self.dx[axis.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permute_puts_sweep_component_first() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(Axis::X.permute(v), [1.0, 2.0, 3.0]);
        assert_eq!(Axis::Y.permute(v), [2.0, 3.0, 1.0]);
        assert_eq!(Axis::Z.permute(v), [3.0, 1.0, 2.0]);
    }

    #[test]
    fn index_round_trips_with_negative_lo() {
        let bx = IndexBox::new([-1, -1, -1], [3, 2, 4]);
        assert_eq!(bx.extent(), [5, 4, 6]);
        for (i, p) in bx.cells().enumerate() {
            assert_eq!(bx.idx(p), i);
        }
        assert_eq!(bx.point(0), [-1, -1, -1]);
        assert_eq!(bx.point(bx.size() - 1), [3, 2, 4]);
    }

    #[test]
    fn face_box_adds_one_along_axis() {
        let bx = IndexBox::from_extent([4, 3, 2]);
        assert_eq!(bx.face_box(Axis::X).extent(), [5, 3, 2]);
        assert_eq!(bx.face_box(Axis::Y).extent(), [4, 4, 2]);
        assert_eq!(bx.face_box(Axis::Z).extent(), [4, 3, 3]);
    }

    #[test]
    fn ghost_box_wraps_cells() {
        let grid = Grid3::with_length([4, 4, 4], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);
        let ghost = grid.ghost_box();
        assert_eq!(ghost.lo(), [-1, -1, -1]);
        assert_eq!(ghost.hi(), [4, 4, 4]);
        assert!(ghost.contains_box(&grid.cell_box()));
        assert_eq!(grid.cell_center([0, 1, 3]), [0.125, 0.375, 0.875]);
        assert_eq!(grid.dtdx(Axis::Y, 0.5), 2.0);
    }
}
