use crate::{Aabb, SchemaError};

/// A point cloud stored as parallel attribute arrays.
///
/// Positions are always present. Colors and normals are either present for
/// every point or absent for the whole cloud; [`PointCloud::validate`] checks
/// that the arrays agree with the point count.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub normals: Option<Normals>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normals {
    pub nx: Vec<f32>,
    pub ny: Vec<f32>,
    pub nz: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Normals {
    pub fn len(&self) -> usize {
        self.nx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nx.is_empty()
    }

    pub fn normal(&self, i: usize) -> [f32; 3] {
        [self.nx[i], self.ny[i], self.nz[i]]
    }
}

impl Colors {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn color(&self, i: usize) -> [u8; 3] {
        [self.r[i], self.g[i], self.b[i]]
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            normals: None,
            colors: None,
        }
    }

    pub fn with_colors(mut self, colors: Colors) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_normals(mut self, normals: Normals) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Check that every attribute array matches the point count and that all
    /// positions are finite.
    ///
    /// Fields are public, so a cloud assembled by hand can be inconsistent;
    /// every consumer that relies on the layout calls this first.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.check_lengths()?;

        if let Some(index) = self
            .iter_points()
            .position(|p| !p.iter().all(|v| v.is_finite()))
        {
            return Err(SchemaError::NonFinitePosition { index });
        }

        Ok(())
    }

    /// The length half of [`PointCloud::validate`]: every attribute array has
    /// one entry per point. Non-finite values are allowed.
    pub fn check_lengths(&self) -> Result<(), SchemaError> {
        let n = self.x.len();
        check_len("y", n, self.y.len())?;
        check_len("z", n, self.z.len())?;

        if let Some(normals) = &self.normals {
            check_len("nx", n, normals.nx.len())?;
            check_len("ny", n, normals.ny.len())?;
            check_len("nz", n, normals.nz.len())?;
        }

        if let Some(colors) = &self.colors {
            check_len("red", n, colors.r.len())?;
            check_len("green", n, colors.g.len())?;
            check_len("blue", n, colors.b.len())?;
        }

        Ok(())
    }

    /// Gather every present attribute at `indices`, in the given order, into a
    /// new cloud.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let normals = self.normals.as_ref().map(|n| Normals {
            nx: indices.iter().map(|&idx| n.nx[idx]).collect(),
            ny: indices.iter().map(|&idx| n.ny[idx]).collect(),
            nz: indices.iter().map(|&idx| n.nz[idx]).collect(),
        });

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self {
            x,
            y,
            z,
            normals,
            colors,
        }
    }
}

fn check_len(attribute: &'static str, expected: usize, actual: usize) -> Result<(), SchemaError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SchemaError::LengthMismatch {
            attribute,
            expected,
            actual,
        })
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
