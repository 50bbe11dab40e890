use crate::field::Field3;
use crate::grid::{Axis, IndexBox};

/// Face-centred velocity on a staggered (MAC) layout: the component along an
/// axis lives on the faces normal to that axis.
#[derive(Clone, Debug, PartialEq)]
pub struct MacVelocity3 {
    cells: IndexBox,
    u: Field3,
    v: Field3,
    w: Field3,
}

impl MacVelocity3 {
    pub fn new(cells: IndexBox, fill: [f64; 3]) -> Self {
        Self {
            cells,
            u: Field3::new(cells.face_box(Axis::X), fill[0]),
            v: Field3::new(cells.face_box(Axis::Y), fill[1]),
            w: Field3::new(cells.face_box(Axis::Z), fill[2]),
        }
    }

    pub fn from_components(cells: IndexBox, u: Field3, v: Field3, w: Field3) -> Self {
        assert_eq!(u.index_box(), cells.face_box(Axis::X), "u box mismatch");
        assert_eq!(v.index_box(), cells.face_box(Axis::Y), "v box mismatch");
        assert_eq!(w.index_box(), cells.face_box(Axis::Z), "w box mismatch");
        Self { cells, u, v, w }
    }

    pub fn cells(&self) -> IndexBox {
        self.cells
    }

    pub fn component(&self, axis: Axis) -> &Field3 {
        match axis {
            Axis::X => &self.u,
            Axis::Y => &self.v,
            Axis::Z => &self.w,
        }
    }

    pub fn component_mut(&mut self, axis: Axis) -> &mut Field3 {
        match axis {
            Axis::X => &mut self.u,
            Axis::Y => &mut self.v,
            Axis::Z => &mut self.w,
        }
    }

    pub fn max_abs(&self) -> f64 {
        self.u.max_abs().max(self.v.max_abs()).max(self.w.max_abs())
    }

    /// Discrete divergence of cell `p` in index units.
    pub fn divergence(&self, p: [i32; 3]) -> f64 {
        Axis::ALL
            .iter()
            .map(|axis| {
                let face = self.component(*axis);
                face.get(axis.shift(p, 1)) - face.get(p)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_live_on_face_boxes() {
        let cells = IndexBox::new([-1, -1, -1], [2, 2, 2]);
        let velocity = MacVelocity3::new(cells, [1.0, 2.0, -3.0]);
        assert_eq!(velocity.component(Axis::X).index_box().hi(), [3, 2, 2]);
        assert_eq!(velocity.component(Axis::Z).index_box().hi(), [2, 2, 3]);
        assert_eq!(velocity.max_abs(), 3.0);
    }

    #[test]
    fn uniform_velocity_is_divergence_free() {
        let cells = IndexBox::from_extent([3, 3, 3]);
        let velocity = MacVelocity3::new(cells, [0.4, -0.2, 0.1]);
        assert_eq!(velocity.divergence([1, 1, 1]), 0.0);
    }

    #[test]
    fn component_mut_writes_through() {
        let cells = IndexBox::from_extent([2, 2, 2]);
        let mut velocity = MacVelocity3::new(cells, [0.0; 3]);
        velocity.component_mut(Axis::Y).set([0, 2, 0], 1.5);
        assert_eq!(velocity.component(Axis::Y).get([0, 2, 0]), 1.5);
        assert_eq!(velocity.divergence([0, 1, 0]), 1.5);
    }
}
