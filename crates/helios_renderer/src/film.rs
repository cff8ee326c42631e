//! Films: the pixel rasters the renderer writes into.
//!
//! Pixels are linear RGB radiance in `[0,1]`, stored row-major with the
//! origin at the bottom-left. Writers emitting top-left formats flip the
//! row index on output.

use helios_math::{IVec2, Vec3};

/// A raster a scene is projected onto.
pub trait Film {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get(&self, x: u32, y: u32) -> Vec3;
    fn set(&mut self, x: u32, y: u32, pixel: Vec3);
}

/// A film backed by a contiguous pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectFilm {
    width: u32,
    height: u32,
    buffer: Vec<Vec3>,
}

impl DirectFilm {
    /// Create a film of the given size, filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    /// The raw pixel buffer, row-major from the bottom-left.
    pub fn data(&self) -> &[Vec3] {
        &self.buffer
    }
}

impl Film for DirectFilm {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, x: u32, y: u32) -> Vec3 {
        self.buffer[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32, pixel: Vec3) {
        self.buffer[(y * self.width + x) as usize] = pixel;
    }
}

/// A film composed of disjoint sub-films (tiles) whose union is the film.
///
/// The requested tile count `n` is factored as `columns x rows` with
/// `columns` the largest divisor of `n` not exceeding `sqrt(n)`. Tiles in
/// the last column and row absorb the width and height remainders.
#[derive(Debug, Clone)]
pub struct PartitionedFilm {
    width: u32,
    height: u32,
    tiles: Vec<DirectFilm>,
    columns: u32,
    rows: u32,
    /// Base tile size; the last column/row may be larger
    tile_width: u32,
    tile_height: u32,
}

impl PartitionedFilm {
    pub fn new(width: u32, height: u32, partitions: u32) -> Self {
        let mut columns = (partitions as f32).sqrt() as u32;
        while partitions % columns != 0 {
            columns -= 1;
        }
        let rows = partitions / columns;

        let tile_width = width / columns;
        let tile_height = height / rows;
        let remainder_x = width % columns;
        let remainder_y = height % rows;

        let mut tiles = Vec::with_capacity(partitions as usize);
        for row in 0..rows {
            for column in 0..columns {
                tiles.push(DirectFilm::new(
                    tile_width + if column == columns - 1 { remainder_x } else { 0 },
                    tile_height + if row == rows - 1 { remainder_y } else { 0 },
                ));
            }
        }

        Self {
            width,
            height,
            tiles,
            columns,
            rows,
            tile_width,
            tile_height,
        }
    }

    /// The number of tiles in the film.
    pub fn partitions(&self) -> usize {
        self.tiles.len()
    }

    /// The offset of a tile within the film.
    pub fn offset(&self, index: usize) -> IVec2 {
        IVec2::new(
            (index as u32 % self.columns * self.tile_width) as i32,
            (index as u32 / self.columns * self.tile_height) as i32,
        )
    }

    /// Borrow a tile.
    pub fn tile(&self, index: usize) -> &DirectFilm {
        &self.tiles[index]
    }

    /// An empty film with the same dimensions as the given tile, used by
    /// workers to render into before the tile is installed.
    pub fn blank_tile(&self, index: usize) -> DirectFilm {
        let tile = &self.tiles[index];
        DirectFilm::new(tile.width(), tile.height())
    }

    /// Install a rendered tile. The tile dimensions must match the slot.
    pub fn set_tile(&mut self, index: usize, tile: DirectFilm) {
        debug_assert_eq!(tile.width(), self.tiles[index].width());
        debug_assert_eq!(tile.height(), self.tiles[index].height());
        self.tiles[index] = tile;
    }

    /// The tile index owning the given pixel.
    fn resolve(&self, x: u32, y: u32) -> usize {
        let column = (x / self.tile_width).min(self.columns - 1);
        let row = (y / self.tile_height).min(self.rows - 1);
        (row * self.columns + column) as usize
    }
}

impl Film for PartitionedFilm {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, x: u32, y: u32) -> Vec3 {
        let index = self.resolve(x, y);
        let offset = self.offset(index);
        self.tiles[index].get(x - offset.x as u32, y - offset.y as u32)
    }

    fn set(&mut self, x: u32, y: u32, pixel: Vec3) {
        let index = self.resolve(x, y);
        let offset = self.offset(index);
        self.tiles[index].set(x - offset.x as u32, y - offset.y as u32, pixel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_film_roundtrip() {
        let mut film = DirectFilm::new(4, 3);
        film.set(3, 2, Vec3::ONE);

        assert_eq!(film.get(3, 2), Vec3::ONE);
        assert_eq!(film.get(0, 0), Vec3::ZERO);
        assert_eq!(film.data().len(), 12);
    }

    #[test]
    fn test_partition_factoring() {
        let film = PartitionedFilm::new(64, 64, 64);
        assert_eq!((film.columns, film.rows), (8, 8));

        let film = PartitionedFilm::new(64, 64, 6);
        assert_eq!((film.columns, film.rows), (2, 3));

        // Primes degenerate to a single column
        let film = PartitionedFilm::new(64, 64, 7);
        assert_eq!((film.columns, film.rows), (1, 7));

        let film = PartitionedFilm::new(64, 64, 1);
        assert_eq!((film.columns, film.rows), (1, 1));
    }

    #[test]
    fn test_last_row_and_column_absorb_remainders() {
        let film = PartitionedFilm::new(100, 100, 7);
        // 1 column of width 100, 7 rows of height 14, last row 16
        assert_eq!(film.tile(0).height(), 14);
        assert_eq!(film.tile(6).height(), 16);

        let total: u32 = (0..film.partitions())
            .map(|i| film.tile(i).width() * film.tile(i).height())
            .sum();
        assert_eq!(total, 100 * 100);
    }

    #[test]
    fn test_tiles_cover_film_exactly() {
        let film = PartitionedFilm::new(97, 53, 12);

        // Every pixel resolves to exactly one tile and a valid local
        // coordinate within it.
        let mut counts = vec![0u32; film.partitions()];
        for y in 0..53 {
            for x in 0..97 {
                let index = film.resolve(x, y);
                let offset = film.offset(index);
                let local_x = x as i32 - offset.x;
                let local_y = y as i32 - offset.y;
                assert!(local_x >= 0 && (local_x as u32) < film.tile(index).width());
                assert!(local_y >= 0 && (local_y as u32) < film.tile(index).height());
                counts[index] += 1;
            }
        }

        let per_tile: Vec<u32> = (0..film.partitions())
            .map(|i| film.tile(i).width() * film.tile(i).height())
            .collect();
        assert_eq!(counts, per_tile);
    }

    #[test]
    fn test_partitioned_film_pixel_access() {
        let mut film = PartitionedFilm::new(16, 16, 4);
        let pixel = Vec3::new(0.25, 0.5, 0.75);

        film.set(11, 13, pixel);
        assert_eq!(film.get(11, 13), pixel);
        // Lands in the top-right tile
        assert_eq!(film.tile(3).get(3, 5), pixel);
    }

    #[test]
    fn test_set_tile() {
        let mut film = PartitionedFilm::new(16, 16, 4);
        let mut tile = film.blank_tile(1);
        tile.set(0, 0, Vec3::ONE);

        film.set_tile(1, tile);
        assert_eq!(film.get(8, 0), Vec3::ONE);
    }
}
