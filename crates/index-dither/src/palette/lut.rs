//! Lookup-table construction over the 128³ quantized color cube.
//!
//! The build fans out over red planes, then over green rows inside each
//! plane; a leaf task scans the palette for all 128 blue cells of one row.
//! Results are copied into the flat tables sequentially once every leaf has
//! finished, so the tables are fully populated before a `Palette` exists.
//!
//! Each cell is represented by its even-valued color `(2·ri, 2·gi, 2·bi)`.

use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::color::{weighted_distance, Rgb, CUBE_SIDE, LUT_SIZE};

/// Flat cube tables indexed by [`crate::color::lut_index`].
pub(crate) struct LookupTables {
    pub index_map: Box<[u8]>,
    pub full_color_map: Box<[u32]>,
}

/// Index of the candidate closest to `query`, scanning from `start`.
///
/// Ties keep the lowest index. Returns 0 when the scan range is empty.
pub(crate) fn best_match(candidates: &[Rgb], start: usize, query: Rgb) -> u8 {
    let mut best = 0usize;
    let mut best_distance = f32::MAX;
    for (i, &candidate) in candidates.iter().enumerate().skip(start) {
        let distance = weighted_distance(query, candidate);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best as u8
}

/// Build both tables for `colors`, on `pool` when given, else on the
/// global rayon pool.
pub(crate) fn build(colors: &[u32], search_start: usize, pool: Option<&ThreadPool>) -> LookupTables {
    let started = Instant::now();
    let candidates: Vec<Rgb> = colors.iter().map(|&c| Rgb::from_packed(c)).collect();

    let planes = match pool {
        Some(pool) => pool.install(|| red_planes(&candidates, search_start)),
        None => red_planes(&candidates, search_start),
    };

    let mut index_map = vec![0u8; LUT_SIZE].into_boxed_slice();
    let mut full_color_map = vec![0u32; LUT_SIZE].into_boxed_slice();
    let plane_len = CUBE_SIDE * CUBE_SIDE;
    for (ri, plane) in planes.iter().enumerate() {
        let base = ri * plane_len;
        index_map[base..base + plane_len].copy_from_slice(plane);
        for (slot, &index) in full_color_map[base..base + plane_len].iter_mut().zip(plane.iter()) {
            *slot = colors[index as usize];
        }
    }

    tracing::debug!(
        colors = colors.len(),
        search_start,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Built palette lookup tables"
    );

    LookupTables {
        index_map,
        full_color_map,
    }
}

fn red_planes(candidates: &[Rgb], start: usize) -> Vec<Vec<u8>> {
    (0..CUBE_SIDE)
        .into_par_iter()
        .map(|ri| red_plane(candidates, start, (ri << 1) as u8))
        .collect()
}

fn red_plane(candidates: &[Rgb], start: usize, r: u8) -> Vec<u8> {
    let rows: Vec<[u8; CUBE_SIDE]> = (0..CUBE_SIDE)
        .into_par_iter()
        .map(|gi| blue_row(candidates, start, r, (gi << 1) as u8))
        .collect();
    let mut plane = Vec::with_capacity(CUBE_SIDE * CUBE_SIDE);
    for row in &rows {
        plane.extend_from_slice(row);
    }
    plane
}

fn blue_row(candidates: &[Rgb], start: usize, r: u8, g: u8) -> [u8; CUBE_SIDE] {
    let mut row = [0u8; CUBE_SIDE];
    for (bi, slot) in row.iter_mut().enumerate() {
        *slot = best_match(candidates, start, Rgb::new(r, g, (bi << 1) as u8));
    }
    row
}
