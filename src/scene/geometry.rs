//! Normalization of composite and unstructured datasets to [`PolyData`].
//!
//! The receiver only renders polygonal data, so multi-block composites and
//! unstructured grids are converted on the fly: volumetric cells contribute
//! their boundary faces, lower-dimensional cells pass through, and blocks
//! are appended into a single dataset.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    count_cells, ArrayData, CellType, DataArray, DataObject, DataSetAttributes, MultiBlockDataSet,
    PolyData, UnstructuredGrid,
};

const VERTS: usize = 0;
const LINES: usize = 1;
const POLYS: usize = 2;
const STRIPS: usize = 3;

/// Output connectivity per cell category, plus the source cell of every
/// output cell (for remapping cell attributes).
#[derive(Default)]
struct CellBuckets {
    connectivity: [Vec<i64>; 4],
    sources: [Vec<usize>; 4],
}

impl CellBuckets {
    fn push(&mut self, category: usize, ids: &[i64], source: usize) {
        let conn = &mut self.connectivity[category];
        conn.push(ids.len() as i64);
        conn.extend_from_slice(ids);
        self.sources[category].push(source);
    }

    /// Source cells in polydata cell order (verts, lines, polys, strips).
    fn cell_order(&self) -> Vec<usize> {
        self.sources.iter().flatten().copied().collect()
    }

    fn apply(self, poly: &mut PolyData) {
        let [verts, lines, polys, strips] = self.connectivity.map(connectivity_array);
        poly.verts = verts;
        poly.lines = lines;
        poly.polys = polys;
        poly.strips = strips;
    }
}

fn connectivity_array(conn: Vec<i64>) -> Option<Arc<DataArray>> {
    if conn.is_empty() {
        None
    } else {
        Some(Arc::new(DataArray::new(None, 1, ArrayData::IdType(conn))))
    }
}

/// Surface of an unstructured grid.
///
/// Points and point attributes are shared with the grid, not compacted.
/// Faces shared by two volumetric cells are interior and dropped.
pub fn extract_surface(grid: &UnstructuredGrid) -> PolyData {
    let mut buckets = CellBuckets::default();
    let mut faces: Vec<(Vec<i64>, usize)> = Vec::new();
    let mut face_uses: HashMap<Vec<i64>, usize> = HashMap::new();

    for (index, cell) in grid.cells.iter().enumerate() {
        let ids = cell.point_ids.as_slice();
        match cell.kind {
            CellType::Vertex | CellType::PolyVertex => buckets.push(VERTS, ids, index),
            CellType::Line | CellType::PolyLine => buckets.push(LINES, ids, index),
            CellType::Triangle | CellType::Quad | CellType::Polygon => {
                buckets.push(POLYS, ids, index)
            }
            CellType::Pixel => {
                if let &[a, b, c, d, ..] = ids {
                    buckets.push(POLYS, &[a, b, d, c], index);
                }
            }
            CellType::TriangleStrip => buckets.push(STRIPS, ids, index),
            kind if kind.is_volumetric() => {
                for local in kind.faces() {
                    let Some(face) = local.iter().map(|&i| ids.get(i).copied()).collect::<Option<Vec<_>>>() else {
                        continue;
                    };
                    *face_uses.entry(face_key(&face)).or_insert(0) += 1;
                    faces.push((face, index));
                }
            }
            _ => {}
        }
    }

    for (face, index) in faces {
        if face_uses.get(&face_key(&face)) == Some(&1) {
            buckets.push(POLYS, &face, index);
        }
    }

    let order = buckets.cell_order();
    let cell_picks: Vec<(usize, usize)> = order.into_iter().map(|c| (0, c)).collect();

    let mut poly = PolyData::new();
    poly.points = grid.points.clone();
    poly.point_data = grid.point_data.clone();
    poly.cell_data = assemble_attributes(&[&grid.cell_data], &cell_picks);
    buckets.apply(&mut poly);
    poly
}

fn face_key(face: &[i64]) -> Vec<i64> {
    let mut key = face.to_vec();
    key.sort_unstable();
    key
}

/// Append every polygonal leaf of a composite into one dataset.
///
/// Image blocks have no polygonal form and are skipped.
pub fn merge_blocks(composite: &MultiBlockDataSet) -> PolyData {
    let mut leaves = Vec::new();
    collect_leaves(&composite.blocks, &mut leaves);

    let width = leaves
        .iter()
        .find_map(|l| l.points.as_ref().map(|p| p.components()))
        .unwrap_or(3);
    leaves.retain(|l| l.num_points() > 0 && l.points.as_ref().is_some_and(|p| p.components() == width));

    if leaves.len() <= 1 {
        return leaves.pop().unwrap_or_default();
    }

    let mut out = PolyData::new();

    let point_counts: Vec<usize> = leaves.iter().map(PolyData::num_points).collect();
    let point_picks: Vec<(usize, usize)> = point_counts
        .iter()
        .enumerate()
        .flat_map(|(s, &n)| (0..n).map(move |t| (s, t)))
        .collect();

    let Some(points) = merge_points(&leaves, width, &point_picks) else {
        return out;
    };
    out.points = Some(Arc::new(points));

    let mut buckets = CellBuckets::default();
    let mut cell_picks = Vec::new();
    let mut offsets = Vec::with_capacity(leaves.len());
    let mut offset = 0i64;
    for &n in &point_counts {
        offsets.push(offset);
        offset += n as i64;
    }

    let leaf_cells: Vec<[Vec<i64>; 4]> = leaves.iter().map(leaf_connectivity).collect();
    for category in [VERTS, LINES, POLYS, STRIPS] {
        for (s, cells) in leaf_cells.iter().enumerate() {
            // Cell tuples of a leaf are ordered by category.
            let base: usize = cells[..category].iter().map(|c| count_cells(c)).sum();
            let conn = &cells[category];
            append_offset(&mut buckets.connectivity[category], conn, offsets[s]);
            let n = count_cells(conn);
            cell_picks.extend((0..n).map(|c| (s, base + c)));
        }
    }
    buckets.apply(&mut out);

    let point_attrs: Vec<&DataSetAttributes> = leaves.iter().map(|l| &l.point_data).collect();
    let cell_attrs: Vec<&DataSetAttributes> = leaves.iter().map(|l| &l.cell_data).collect();
    out.point_data = assemble_attributes(&point_attrs, &point_picks);
    out.cell_data = assemble_attributes(&cell_attrs, &cell_picks);
    out
}

/// View a dataset as polygonal data, converting when needed.
///
/// Returns `None` for image data, which has no polygonal form.
pub fn to_polydata(object: &DataObject) -> Option<Cow<'_, PolyData>> {
    match object {
        DataObject::PolyData(poly) => Some(Cow::Borrowed(poly)),
        DataObject::UnstructuredGrid(grid) => Some(Cow::Owned(extract_surface(grid))),
        DataObject::MultiBlock(composite) => match composite.blocks.as_slice() {
            [single] => to_polydata(single),
            _ => Some(Cow::Owned(merge_blocks(composite))),
        },
        DataObject::ImageData(_) => None,
    }
}

fn collect_leaves(blocks: &[DataObject], out: &mut Vec<PolyData>) {
    for block in blocks {
        match block {
            DataObject::PolyData(poly) => out.push(poly.clone()),
            DataObject::UnstructuredGrid(grid) => out.push(extract_surface(grid)),
            DataObject::MultiBlock(nested) => collect_leaves(&nested.blocks, out),
            DataObject::ImageData(_) => tracing::trace!("merge: skipping image block"),
        }
    }
}

fn merge_points(leaves: &[PolyData], width: usize, picks: &[(usize, usize)]) -> Option<DataArray> {
    let arrays: Vec<&Arc<DataArray>> = leaves.iter().filter_map(|l| l.points.as_ref()).collect();
    let guards: Vec<_> = arrays.iter().map(|a| a.read()).collect();
    let stores: Vec<&ArrayData> = guards.iter().map(|g| &**g).collect();

    let data = ArrayData::assemble(&stores, width, picks).or_else(|| {
        // Mixed precision: promote everything to f64.
        let promoted: Vec<ArrayData> = stores.iter().map(|d| ArrayData::Float64(d.to_f64_vec())).collect();
        let refs: Vec<&ArrayData> = promoted.iter().collect();
        ArrayData::assemble(&refs, width, picks)
    })?;
    Some(DataArray::new(arrays[0].name(), width, data))
}

fn leaf_connectivity(leaf: &PolyData) -> [Vec<i64>; 4] {
    [&leaf.verts, &leaf.lines, &leaf.polys, &leaf.strips]
        .map(|c| c.as_ref().map(|a| a.read().to_i64_vec()).unwrap_or_default())
}

fn append_offset(out: &mut Vec<i64>, conn: &[i64], offset: i64) {
    let mut i = 0;
    while i < conn.len() {
        let n = conn[i].max(0) as usize;
        let end = (i + 1 + n).min(conn.len());
        out.push((end - i - 1) as i64);
        out.extend(conn[i + 1..end].iter().map(|&id| id + offset));
        i = end;
    }
}

/// Rebuild attribute sets into one by picking `(source, tuple)` pairs.
///
/// An array survives only if every source carries a match (same name, or
/// same position when unnamed) with equal type and width. An active slot
/// survives only if every source designates the matched array.
fn assemble_attributes(sources: &[&DataSetAttributes], picks: &[(usize, usize)]) -> DataSetAttributes {
    let mut out = DataSetAttributes::new();
    let Some(first) = sources.first() else {
        return out;
    };

    // Per output array: its index in every source.
    let mut matched: Vec<Vec<usize>> = Vec::new();

    for (i, array) in first.arrays().iter().enumerate() {
        let Some(indices) = sources
            .iter()
            .map(|s| find_match(s, array, i))
            .collect::<Option<Vec<usize>>>()
        else {
            continue;
        };

        let guards: Vec<_> = sources
            .iter()
            .zip(&indices)
            .map(|(s, &j)| s.arrays()[j].read())
            .collect();
        let stores: Vec<&ArrayData> = guards.iter().map(|g| &**g).collect();
        let Some(data) = ArrayData::assemble(&stores, array.components(), picks) else {
            continue;
        };

        let merged = DataArray::new(array.name(), array.components(), data).with_component_names_of(array);
        out.add_array(Arc::new(merged));
        matched.push(indices);
    }

    let mut active = [None; 3];
    for (slot, value) in active.iter_mut().enumerate() {
        *value = matched.iter().position(|indices| {
            sources
                .iter()
                .zip(indices)
                .all(|(s, &j)| s.active_indices()[slot] == Some(j))
        });
    }
    out.set_active_indices(active);
    out
}

fn find_match(source: &DataSetAttributes, like: &DataArray, position: usize) -> Option<usize> {
    let index = match like.name() {
        Some(name) => source.arrays().iter().position(|a| a.name() == Some(name))?,
        None => position,
    };
    let candidate = source.arrays().get(index)?;
    (candidate.scalar_type() == like.scalar_type() && candidate.components() == like.components())
        .then_some(index)
}
