//! Dataset kinds: polygonal, image, unstructured and composite data.

use std::sync::Arc;

use glam::DMat3;

use super::{DataArray, Identity, NodeRef, SceneObject};

/// Arrays attached to points or cells, with the active attribute slots.
#[derive(Clone, Debug, Default)]
pub struct DataSetAttributes {
    arrays: Vec<Arc<DataArray>>,
    scalars: Option<usize>,
    normals: Option<usize>,
    tcoords: Option<usize>,
}

impl DataSetAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an array; returns its index. An array already present
    /// (same identity) is not added twice.
    pub fn add_array(&mut self, array: Arc<DataArray>) -> usize {
        if let Some(i) = self.arrays.iter().position(|a| Arc::ptr_eq(a, &array)) {
            return i;
        }
        self.arrays.push(array);
        self.arrays.len() - 1
    }

    /// Add an array and make it the active scalars.
    pub fn set_scalars(&mut self, array: Arc<DataArray>) {
        self.scalars = Some(self.add_array(array));
    }

    /// Add an array and make it the active normals.
    pub fn set_normals(&mut self, array: Arc<DataArray>) {
        self.normals = Some(self.add_array(array));
    }

    /// Add an array and make it the active texture coordinates.
    pub fn set_tcoords(&mut self, array: Arc<DataArray>) {
        self.tcoords = Some(self.add_array(array));
    }

    pub fn arrays(&self) -> &[Arc<DataArray>] {
        &self.arrays
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// First array with the given name.
    pub fn array(&self, name: &str) -> Option<&Arc<DataArray>> {
        self.arrays.iter().find(|a| a.name() == Some(name))
    }

    pub fn scalars(&self) -> Option<&Arc<DataArray>> {
        self.scalars.and_then(|i| self.arrays.get(i))
    }

    pub fn normals(&self) -> Option<&Arc<DataArray>> {
        self.normals.and_then(|i| self.arrays.get(i))
    }

    pub fn tcoords(&self) -> Option<&Arc<DataArray>> {
        self.tcoords.and_then(|i| self.arrays.get(i))
    }

    pub(crate) fn active_indices(&self) -> [Option<usize>; 3] {
        [self.scalars, self.normals, self.tcoords]
    }

    pub(crate) fn set_active_indices(&mut self, active: [Option<usize>; 3]) {
        let valid = |i: Option<usize>| i.filter(|&i| i < self.arrays.len());
        self.scalars = valid(active[0]);
        self.normals = valid(active[1]);
        self.tcoords = valid(active[2]);
    }
}

/// Polygonal dataset.
///
/// Cell arrays use the legacy connectivity layout `[n, id0 .. idn-1, ...]`.
#[derive(Clone, Debug)]
pub struct PolyData {
    id: Identity,
    pub class_name: String,
    pub points: Option<Arc<DataArray>>,
    pub verts: Option<Arc<DataArray>>,
    pub lines: Option<Arc<DataArray>>,
    pub polys: Option<Arc<DataArray>>,
    pub strips: Option<Arc<DataArray>>,
    pub point_data: DataSetAttributes,
    pub cell_data: DataSetAttributes,
}

impl PolyData {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkPolyData".into(),
            points: None,
            verts: None,
            lines: None,
            polys: None,
            strips: None,
            point_data: DataSetAttributes::new(),
            cell_data: DataSetAttributes::new(),
        }
    }

    pub fn with_points(mut self, points: Arc<DataArray>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_polys(mut self, polys: Arc<DataArray>) -> Self {
        self.polys = Some(polys);
        self
    }

    pub fn num_points(&self) -> usize {
        self.points.as_ref().map_or(0, |p| p.num_tuples())
    }
}

impl Default for PolyData {
    fn default() -> Self {
        Self::new()
    }
}

/// Regular volumetric grid.
#[derive(Clone, Debug)]
pub struct ImageData {
    id: Identity,
    pub class_name: String,
    pub dimensions: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub direction: DMat3,
    pub point_data: DataSetAttributes,
}

impl ImageData {
    pub fn new(dimensions: [usize; 3]) -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkImageData".into(),
            dimensions,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            direction: DMat3::IDENTITY,
            point_data: DataSetAttributes::new(),
        }
    }
}

/// VTK cell type codes understood by the surface extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellType {
    Vertex = 1,
    PolyVertex = 2,
    Line = 3,
    PolyLine = 4,
    Triangle = 5,
    TriangleStrip = 6,
    Polygon = 7,
    Pixel = 8,
    Quad = 9,
    Tetra = 10,
    Voxel = 11,
    Hexahedron = 12,
    Wedge = 13,
    Pyramid = 14,
}

impl CellType {
    pub const fn from_vtk(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Vertex),
            2 => Some(Self::PolyVertex),
            3 => Some(Self::Line),
            4 => Some(Self::PolyLine),
            5 => Some(Self::Triangle),
            6 => Some(Self::TriangleStrip),
            7 => Some(Self::Polygon),
            8 => Some(Self::Pixel),
            9 => Some(Self::Quad),
            10 => Some(Self::Tetra),
            11 => Some(Self::Voxel),
            12 => Some(Self::Hexahedron),
            13 => Some(Self::Wedge),
            14 => Some(Self::Pyramid),
            _ => None,
        }
    }

    /// True for linear 3D cells whose boundary faces become polygons.
    pub const fn is_volumetric(self) -> bool {
        matches!(self, Self::Tetra | Self::Voxel | Self::Hexahedron | Self::Wedge | Self::Pyramid)
    }

    /// Boundary faces as local point indices, outward oriented.
    pub const fn faces(self) -> &'static [&'static [usize]] {
        match self {
            Self::Tetra => &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]],
            Self::Voxel => &[
                &[0, 4, 6, 2], &[1, 3, 7, 5], &[0, 1, 5, 4],
                &[2, 6, 7, 3], &[0, 2, 3, 1], &[4, 5, 7, 6],
            ],
            Self::Hexahedron => &[
                &[0, 4, 7, 3], &[1, 2, 6, 5], &[0, 1, 5, 4],
                &[3, 7, 6, 2], &[0, 3, 2, 1], &[4, 5, 6, 7],
            ],
            Self::Wedge => &[&[0, 1, 2], &[3, 5, 4], &[0, 3, 4, 1], &[1, 4, 5, 2], &[2, 5, 3, 0]],
            Self::Pyramid => &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
            _ => &[],
        }
    }
}

/// One cell of an unstructured grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub kind: CellType,
    pub point_ids: Vec<i64>,
}

impl Cell {
    pub fn new(kind: CellType, point_ids: impl Into<Vec<i64>>) -> Self {
        Self { kind, point_ids: point_ids.into() }
    }
}

/// Dataset of arbitrary cells. Serialized through surface extraction.
#[derive(Clone, Debug)]
pub struct UnstructuredGrid {
    id: Identity,
    pub class_name: String,
    pub points: Option<Arc<DataArray>>,
    pub cells: Vec<Cell>,
    pub point_data: DataSetAttributes,
    pub cell_data: DataSetAttributes,
}

impl UnstructuredGrid {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkUnstructuredGrid".into(),
            points: None,
            cells: Vec::new(),
            point_data: DataSetAttributes::new(),
            cell_data: DataSetAttributes::new(),
        }
    }
}

impl Default for UnstructuredGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite dataset of ordered blocks.
#[derive(Clone, Debug)]
pub struct MultiBlockDataSet {
    id: Identity,
    pub class_name: String,
    pub blocks: Vec<DataObject>,
}

impl MultiBlockDataSet {
    pub fn new(blocks: Vec<DataObject>) -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkMultiBlockDataSet".into(),
            blocks,
        }
    }
}

/// Any dataset a mapper or texture can consume.
#[derive(Clone, Debug)]
pub enum DataObject {
    PolyData(PolyData),
    ImageData(ImageData),
    UnstructuredGrid(UnstructuredGrid),
    MultiBlock(MultiBlockDataSet),
}

impl DataObject {
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Self::PolyData(d) => d.as_node(),
            Self::ImageData(d) => d.as_node(),
            Self::UnstructuredGrid(d) => d.as_node(),
            Self::MultiBlock(d) => d.as_node(),
        }
    }
}

impl From<PolyData> for DataObject {
    fn from(d: PolyData) -> Self {
        Self::PolyData(d)
    }
}

impl From<ImageData> for DataObject {
    fn from(d: ImageData) -> Self {
        Self::ImageData(d)
    }
}

impl From<UnstructuredGrid> for DataObject {
    fn from(d: UnstructuredGrid) -> Self {
        Self::UnstructuredGrid(d)
    }
}

impl From<MultiBlockDataSet> for DataObject {
    fn from(d: MultiBlockDataSet) -> Self {
        Self::MultiBlock(d)
    }
}

impl_scene_object!(
    PolyData => PolyData,
    ImageData => ImageData,
    UnstructuredGrid => UnstructuredGrid,
    MultiBlockDataSet => MultiBlock,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_attributes() {
        let mut attrs = DataSetAttributes::new();
        let temp = DataArray::shared("temp", 1, vec![1.0f32, 2.0]);
        let normals = DataArray::shared("Normals", 3, vec![0.0f32; 6]);
        attrs.set_scalars(temp.clone());
        attrs.set_normals(normals);
        attrs.add_array(temp.clone());

        assert_eq!(attrs.len(), 2);
        assert!(Arc::ptr_eq(attrs.scalars().unwrap(), &temp));
        assert_eq!(attrs.normals().unwrap().name(), Some("Normals"));
        assert!(attrs.tcoords().is_none());
        assert!(attrs.array("temp").is_some());
        assert!(attrs.array("missing").is_none());
    }

    #[test]
    fn test_cell_type_faces() {
        assert_eq!(CellType::Tetra.faces().len(), 4);
        assert_eq!(CellType::Hexahedron.faces().len(), 6);
        assert!(CellType::Triangle.faces().is_empty());
        assert!(CellType::Wedge.is_volumetric());
        assert_eq!(CellType::from_vtk(12), Some(CellType::Hexahedron));
    }

    #[test]
    fn test_data_object_node() {
        let grid = UnstructuredGrid::new();
        let obj = DataObject::from(grid);
        assert_eq!(obj.as_node().class_name(), "vtkUnstructuredGrid");
    }
}
