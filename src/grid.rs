use glam::IVec3;
use std::collections::TryReserveError;

/// Lattice neighbour offsets in enumeration order: -x, +x, -y, +y, -z, +z.
/// Ties in neighbour scoring are broken by this order.
pub const NEIGHBOR_OFFSETS: [IVec3; 6] = [
    IVec3::new(-1, 0, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 0, 1),
];

/// Taxicab distance between two lattice positions.
#[inline]
pub fn manhattan_distance(a: IVec3, b: IVec3) -> i32 {
    let d = (a - b).abs();
    d.x + d.y + d.z
}

/// Extent of a 3-D lattice, stored x-fastest (`x + y*sx + z*sx*sy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub size: IVec3,
}

impl GridDims {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self {
            size: IVec3::new(x as i32, y as i32, z as i32),
        }
    }

    /// A cube of `length` cells per side.
    pub fn cube(length: u32) -> Self {
        Self::new(length, length, length)
    }

    /// Like [`GridDims::cube`], but `None` when the lattice cannot be addressed.
    pub fn checked_cube(length: u32) -> Option<Self> {
        if length > i32::MAX as u32 {
            return None;
        }
        let dims = Self::cube(length);
        dims.checked_len().map(|_| dims)
    }

    /// A 1-D row of `count` elements, the layout used for agent arrays.
    pub fn row(count: u32) -> Self {
        Self::new(count, 1, 1)
    }

    /// Total element count, or `None` if it overflows `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        (self.size.x as usize)
            .checked_mul(self.size.y as usize)?
            .checked_mul(self.size.z as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size.x as usize * self.size.y as usize * self.size.z as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.size).all()
    }

    /// Clamps a position onto the lattice; positions never wrap.
    #[inline]
    pub fn clamp(&self, pos: IVec3) -> IVec3 {
        pos.clamp(IVec3::ZERO, self.size - IVec3::ONE)
    }

    /// Linear index of an in-bounds position.
    #[inline]
    pub fn index(&self, pos: IVec3) -> usize {
        debug_assert!(self.contains(pos), "{pos} outside {}", self.size);
        let sx = self.size.x as usize;
        let sy = self.size.y as usize;
        pos.x as usize + pos.y as usize * sx + pos.z as usize * sx * sy
    }

    /// Inverse of [`GridDims::index`].
    #[inline]
    pub fn position(&self, index: usize) -> IVec3 {
        let sx = self.size.x as usize;
        let sxy = sx * self.size.y as usize;
        let z = index / sxy;
        let rem = index % sxy;
        IVec3::new((rem % sx) as i32, (rem / sx) as i32, z as i32)
    }

    /// The six lattice neighbours of `pos`, clamped to the grid.
    /// On a face the clamped neighbour is `pos` itself.
    #[inline]
    pub fn neighbors(&self, pos: IVec3) -> [IVec3; 6] {
        NEIGHBOR_OFFSETS.map(|offset| self.clamp(pos + offset))
    }

    /// Cell in the middle of the lattice.
    pub fn center(&self) -> IVec3 {
        self.size / 2
    }
}

/// Two equally-shaped buffers with a role flag.
///
/// One buffer is the committed snapshot kernels read from (`previous`), the other is
/// the output of the tick in progress (`current`). `swap` flips the flag; no element
/// is ever copied between the two.
#[derive(Debug, Clone)]
pub struct DoubleBufferedGrid<T> {
    dims: GridDims,
    buffers: [Vec<T>; 2],
    current: usize,
}

impl<T: Clone> DoubleBufferedGrid<T> {
    /// Allocates both buffers filled with `fill`, reporting allocation failure instead of aborting.
    pub fn try_new(dims: GridDims, fill: T) -> Result<Self, TryReserveError> {
        let len = dims.len();
        Ok(Self {
            dims,
            buffers: [try_filled(len, fill.clone())?, try_filled(len, fill)?],
            current: 1,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// The committed snapshot: the input of the next tick and what readers observe.
    #[inline]
    pub fn read(&self) -> &[T] {
        &self.buffers[1 - self.current]
    }

    /// Mutable slot in the output buffer of the tick in progress.
    #[inline]
    pub fn write(&mut self, index: usize) -> &mut T {
        &mut self.buffers[self.current][index]
    }

    /// The output buffer of the tick in progress.
    #[inline]
    pub fn current(&self) -> &[T] {
        &self.buffers[self.current]
    }

    /// Borrows the input snapshot and the output buffer at once, for a kernel pass.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        let [first, second] = &mut self.buffers;
        if self.current == 1 {
            (first.as_slice(), second.as_mut_slice())
        } else {
            (second.as_slice(), first.as_mut_slice())
        }
    }

    /// Exchanges the roles of the two buffers in O(1).
    #[inline]
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Overwrites both buffers with `values`, reusing their storage.
    ///
    /// Panics if `values` does not match the grid length; callers validate first.
    pub fn load(&mut self, values: &[T]) {
        assert_eq!(values.len(), self.len(), "snapshot length mismatch");
        for buffer in &mut self.buffers {
            buffer.clone_from_slice(values);
        }
    }

    /// Regenerates the snapshot element by element, then mirrors it into the output buffer.
    /// `init` is called once per index in ascending order.
    pub fn reset_with(&mut self, mut init: impl FnMut(usize) -> T) {
        let read = 1 - self.current;
        for (index, slot) in self.buffers[read].iter_mut().enumerate() {
            *slot = init(index);
        }
        let [first, second] = &mut self.buffers;
        if read == 0 {
            second.clone_from_slice(first);
        } else {
            first.clone_from_slice(second);
        }
    }
}

fn try_filled<T: Clone>(len: usize, fill: T) -> Result<Vec<T>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, fill);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_position_roundtrip() {
        let dims = GridDims::new(4, 3, 5);
        for i in 0..dims.len() {
            let pos = dims.position(i);
            assert!(dims.contains(pos));
            assert_eq!(dims.index(pos), i);
        }
        assert_eq!(dims.index(IVec3::new(1, 2, 3)), 1 + 2 * 4 + 3 * 12);
    }

    #[test]
    fn test_neighbors_order_and_clamping() {
        let dims = GridDims::cube(4);
        let inner = dims.neighbors(IVec3::new(1, 1, 1));
        assert_eq!(inner[0], IVec3::new(0, 1, 1));
        assert_eq!(inner[1], IVec3::new(2, 1, 1));
        assert_eq!(inner[2], IVec3::new(1, 0, 1));
        assert_eq!(inner[3], IVec3::new(1, 2, 1));
        assert_eq!(inner[4], IVec3::new(1, 1, 0));
        assert_eq!(inner[5], IVec3::new(1, 1, 2));

        let corner = dims.neighbors(IVec3::ZERO);
        assert_eq!(corner[0], IVec3::ZERO);
        assert_eq!(corner[2], IVec3::ZERO);
        assert_eq!(corner[4], IVec3::ZERO);
        assert!(corner.iter().all(|&n| dims.contains(n)));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan_distance(IVec3::ZERO, IVec3::new(3, -2, 1)), 6);
        assert_eq!(manhattan_distance(IVec3::splat(4), IVec3::splat(4)), 0);
        let dims = GridDims::cube(8);
        assert_eq!(manhattan_distance(IVec3::ZERO, dims.size - IVec3::ONE), 21);
    }

    #[test]
    fn test_checked_cube_rejects_unaddressable_sizes() {
        assert!(GridDims::checked_cube(u32::MAX).is_none());
        if usize::BITS <= 64 {
            assert!(GridDims::checked_cube(i32::MAX as u32).is_none());
        }
        assert_eq!(GridDims::checked_cube(8).and_then(|d| d.checked_len()), Some(512));
    }

    #[test]
    fn test_write_lands_in_current_and_swap_commits() {
        let mut grid = DoubleBufferedGrid::try_new(GridDims::row(3), 0u32).unwrap();
        *grid.write(1) = 7;
        assert_eq!(grid.current(), &[0, 7, 0]);
        assert_eq!(grid.read(), &[0, 0, 0]);
        grid.swap();
        assert_eq!(grid.read(), &[0, 7, 0]);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        let mut grid = DoubleBufferedGrid::try_new(GridDims::row(4), 0i32).unwrap();
        grid.load(&[1, 2, 3, 4]);
        {
            let (_, out) = grid.split();
            out.copy_from_slice(&[5, 6, 7, 8]);
        }
        let before_read = grid.read().to_vec();
        let before_current = grid.current().to_vec();

        grid.swap();
        assert_eq!(grid.read(), before_current.as_slice());
        grid.swap();

        assert_eq!(grid.read(), before_read.as_slice());
        assert_eq!(grid.current(), before_current.as_slice());
    }

    #[test]
    fn test_split_separates_roles() {
        let mut grid = DoubleBufferedGrid::try_new(GridDims::row(2), 1u8).unwrap();
        for _ in 0..2 {
            let (input, output) = grid.split();
            for (o, i) in output.iter_mut().zip(input) {
                *o = i + 1;
            }
            grid.swap();
        }
        assert_eq!(grid.read(), &[3, 3]);
    }
}
