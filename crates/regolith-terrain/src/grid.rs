use regolith_core::{Scalar, Vec3};

/// Dense uniform grid over the bed box, rebuilt from scratch each advance.
/// Cell size is one particle diameter, so contacts only occur between neighbouring cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct CellGrid {
    origin: Vec3,
    inv_cell: Scalar,
    dims: [usize; 3],
    start: Vec<u32>,
    items: Vec<u32>,
    cell_of: Vec<u32>,
}

impl CellGrid {
    pub fn new(min: Vec3, max: Vec3, cell: Scalar) -> Self {
        let ext = (max - min).max(Vec3::ZERO);
        let d = |e: Scalar| (e / cell).floor() as usize + 1;
        let dims = [d(ext.x), d(ext.y), d(ext.z)];
        let n = dims[0] * dims[1] * dims[2];
        Self { origin: min, inv_cell: 1.0 / cell, dims, start: vec![0; n + 1], items: Vec::new(), cell_of: Vec::new() }
    }

    #[inline] fn coord(&self, p: Vec3) -> [usize; 3] {
        let c = ((p - self.origin) * self.inv_cell).floor();
        let clamp = |v: Scalar, n: usize| (v.max(0.0) as usize).min(n - 1);
        [clamp(c.x, self.dims[0]), clamp(c.y, self.dims[1]), clamp(c.z, self.dims[2])]
    }

    #[inline] fn idx(&self, c: [usize; 3]) -> usize {
        c[0] + c[1] * self.dims[0] + c[2] * self.dims[0] * self.dims[1]
    }

    /// Counting sort of particle indices by cell. Order inside a cell follows particle order.
    pub fn rebuild(&mut self, pos: &[Vec3]) {
        self.cell_of.clear();
        self.start.iter_mut().for_each(|s| *s = 0);
        for p in pos {
            let c = self.idx(self.coord(*p)) as u32;
            self.cell_of.push(c);
            self.start[c as usize + 1] += 1;
        }
        for i in 1..self.start.len() {
            self.start[i] += self.start[i - 1];
        }
        let mut fill = self.start.clone();
        self.items.clear();
        self.items.resize(pos.len(), 0);
        for (i, &c) in self.cell_of.iter().enumerate() {
            let slot = &mut fill[c as usize];
            self.items[*slot as usize] = i as u32;
            *slot += 1;
        }
    }

    /// Visit every candidate pair `(i, j)` with `i < j` in neighbouring cells, once.
    pub fn for_each_pair(&self, pos: &[Vec3], mut f: impl FnMut(usize, usize)) {
        for (i, p) in pos.iter().enumerate() {
            let [cx, cy, cz] = self.coord(*p);
            for z in cz.saturating_sub(1)..(cz + 2).min(self.dims[2]) {
                for y in cy.saturating_sub(1)..(cy + 2).min(self.dims[1]) {
                    for x in cx.saturating_sub(1)..(cx + 2).min(self.dims[0]) {
                        let c = self.idx([x, y, z]);
                        for &j in &self.items[self.start[c] as usize..self.start[c + 1] as usize] {
                            if (j as usize) > i {
                                f(i, j as usize);
                            }
                        }
                    }
                }
            }
        }
    }
}
