use splatprep_core::{Colors, Normals, PointCloud};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::PlyError;

const POSITION_NAMES: [&str; 3] = ["x", "y", "z"];
const NORMAL_NAMES: [&str; 3] = ["nx", "ny", "nz"];
const COLOR_NAMES: [&str; 3] = ["red", "green", "blue"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    fn header_name(self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
        }
    }
}

/// Scalar property type as declared in the PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => ScalarType::Char,
            "uchar" | "uint8" => ScalarType::UChar,
            "short" | "int16" => ScalarType::Short,
            "ushort" | "uint16" => ScalarType::UShort,
            "int" | "int32" => ScalarType::Int,
            "uint" | "uint32" => ScalarType::UInt,
            "float" | "float32" => ScalarType::Float,
            "double" | "float64" => ScalarType::Double,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    fn byte_size(self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    fn is_float(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }

    /// Inclusive value range of an integer type.
    fn int_range(self) -> (i64, i64) {
        match self {
            ScalarType::Char => (i8::MIN as i64, i8::MAX as i64),
            ScalarType::UChar => (0, u8::MAX as i64),
            ScalarType::Short => (i16::MIN as i64, i16::MAX as i64),
            ScalarType::UShort => (0, u16::MAX as i64),
            ScalarType::Int => (i32::MIN as i64, i32::MAX as i64),
            ScalarType::UInt => (0, u32::MAX as i64),
            ScalarType::Float | ScalarType::Double => (i64::MIN, i64::MAX),
        }
    }

    /// Decode one value from the start of `bytes`, which must hold at least
    /// `byte_size()` bytes. Every PLY scalar is exactly representable in f64.
    fn decode(self, bytes: &[u8], big_endian: bool) -> f64 {
        macro_rules! decode_as {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                if big_endian {
                    <$t>::from_be_bytes(raw) as f64
                } else {
                    <$t>::from_le_bytes(raw) as f64
                }
            }};
        }

        match self {
            ScalarType::Char => bytes[0] as i8 as f64,
            ScalarType::UChar => bytes[0] as f64,
            ScalarType::Short => decode_as!(i16, 2),
            ScalarType::UShort => decode_as!(u16, 2),
            ScalarType::Int => decode_as!(i32, 4),
            ScalarType::UInt => decode_as!(u32, 4),
            ScalarType::Float => decode_as!(f32, 4),
            ScalarType::Double => decode_as!(f64, 8),
        }
    }

    fn parse_token(self, token: &str) -> Result<f64, String> {
        // Parsing `float` straight to f32 avoids rounding twice on the way
        // through f64.
        match self {
            ScalarType::Float => {
                return token
                    .parse::<f32>()
                    .map(f64::from)
                    .map_err(|e| format!("invalid {} `{}`: {}", self.name(), token, e));
            }
            ScalarType::Double => {
                return token
                    .parse::<f64>()
                    .map_err(|e| format!("invalid {} `{}`: {}", self.name(), token, e));
            }
            _ => {}
        }

        let v = token
            .parse::<i64>()
            .map_err(|e| format!("invalid {} `{}`: {}", self.name(), token, e))?;
        let (lo, hi) = self.int_range();
        if v < lo || v > hi {
            return Err(format!("`{}` is out of range for {}", token, self.name()));
        }
        Ok(v as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyKind {
    Scalar(ScalarType),
    List,
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    kind: PropertyKind,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

impl Element {
    fn has_lists(&self) -> bool {
        self.properties.iter().any(|p| p.kind == PropertyKind::List)
    }

    /// Scalar types in declaration order. Only meaningful without lists.
    fn scalar_types(&self) -> Vec<ScalarType> {
        self.properties
            .iter()
            .filter_map(|p| match p.kind {
                PropertyKind::Scalar(t) => Some(t),
                PropertyKind::List => None,
            })
            .collect()
    }

    fn row_size(&self) -> usize {
        self.scalar_types().iter().map(|t| t.byte_size()).sum()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

/// Parsed header information.
#[derive(Debug)]
struct PlyHeader {
    format: PlyFormat,
    elements: Vec<Element>,
    body_offset: usize, // byte offset just after the end_header line
}

fn header_err(msg: impl Into<String>) -> PlyError {
    PlyError::Header(msg.into())
}

fn parse_ply_header(data: &[u8]) -> Result<PlyHeader, PlyError> {
    let mut offset = 0usize;
    let mut format = None;
    let mut elements: Vec<Element> = Vec::new();
    let mut first_line = true;

    loop {
        let rest = &data[offset..];
        let newline = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| header_err("missing end_header"))?;
        let line = std::str::from_utf8(&rest[..newline])
            .map_err(|_| header_err("header is not valid UTF-8"))?
            .trim();
        offset += newline + 1;

        if first_line {
            if line != "ply" {
                return Err(header_err("file does not start with 'ply'"));
            }
            first_line = false;
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["end_header"] => break,
            ["comment", ..] | ["obj_info", ..] => {}
            ["format", name, _version] => {
                format = Some(match *name {
                    "ascii" => PlyFormat::Ascii,
                    "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                    "binary_big_endian" => PlyFormat::BinaryBigEndian,
                    other => {
                        return Err(PlyError::Unsupported(format!("PLY format `{}`", other)));
                    }
                });
            }
            ["element", name, count] => {
                let count = count
                    .parse::<usize>()
                    .map_err(|e| header_err(format!("invalid count for element `{}`: {}", name, e)))?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count_type, item_type, name] => {
                for t in [count_type, item_type] {
                    if ScalarType::parse(t).is_none() {
                        return Err(PlyError::Unsupported(format!("property type `{}`", t)));
                    }
                }
                push_property(&mut elements, name, PropertyKind::List)?;
            }
            ["property", ty, name] => {
                let ty = ScalarType::parse(ty)
                    .ok_or_else(|| PlyError::Unsupported(format!("property type `{}`", ty)))?;
                push_property(&mut elements, name, PropertyKind::Scalar(ty))?;
            }
            _ => return Err(header_err(format!("unexpected header line `{}`", line))),
        }
    }

    let format = format.ok_or_else(|| header_err("format line missing"))?;

    Ok(PlyHeader {
        format,
        elements,
        body_offset: offset,
    })
}

fn push_property(elements: &mut [Element], name: &str, kind: PropertyKind) -> Result<(), PlyError> {
    let element = elements
        .last_mut()
        .ok_or_else(|| header_err(format!("property `{}` declared before any element", name)))?;
    element.properties.push(Property {
        name: name.to_string(),
        kind,
    });
    Ok(())
}

/// Where the schema fields live in a vertex row.
struct VertexLayout {
    types: Vec<ScalarType>,
    position: [usize; 3],
    normal: Option<[usize; 3]>,
    color: Option<[usize; 3]>,
}

impl VertexLayout {
    fn new(vertex: &Element) -> Result<Self, PlyError> {
        if vertex.has_lists() {
            return Err(PlyError::Unsupported(
                "list properties on the vertex element".to_string(),
            ));
        }

        let mut position = [0usize; 3];
        for (slot, name) in position.iter_mut().zip(POSITION_NAMES) {
            *slot = vertex.find(name).ok_or(PlyError::MissingProperty(name))?;
        }

        let triple = |names: [&str; 3]| -> Option<[usize; 3]> {
            Some([
                vertex.find(names[0])?,
                vertex.find(names[1])?,
                vertex.find(names[2])?,
            ])
        };

        Ok(Self {
            types: vertex.scalar_types(),
            position,
            normal: triple(NORMAL_NAMES),
            color: triple(COLOR_NAMES),
        })
    }
}

/// Accumulates converted vertex rows into point cloud columns.
struct CloudBuilder {
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    normals: Option<Normals>,
    colors: Option<Colors>,
}

impl CloudBuilder {
    fn new(layout: &VertexLayout, capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            normals: layout.normal.map(|_| Normals {
                nx: Vec::with_capacity(capacity),
                ny: Vec::with_capacity(capacity),
                nz: Vec::with_capacity(capacity),
            }),
            colors: layout.color.map(|_| Colors {
                r: Vec::with_capacity(capacity),
                g: Vec::with_capacity(capacity),
                b: Vec::with_capacity(capacity),
            }),
        }
    }

    fn push(&mut self, layout: &VertexLayout, index: usize, row: &[f64]) -> Result<(), PlyError> {
        let [ix, iy, iz] = layout.position;
        self.x.push(to_f32(row[ix], index, POSITION_NAMES[0])?);
        self.y.push(to_f32(row[iy], index, POSITION_NAMES[1])?);
        self.z.push(to_f32(row[iz], index, POSITION_NAMES[2])?);

        if let (Some(normals), Some([inx, iny, inz])) = (self.normals.as_mut(), layout.normal) {
            normals.nx.push(to_f32(row[inx], index, NORMAL_NAMES[0])?);
            normals.ny.push(to_f32(row[iny], index, NORMAL_NAMES[1])?);
            normals.nz.push(to_f32(row[inz], index, NORMAL_NAMES[2])?);
        }

        if let (Some(colors), Some([ir, ig, ib])) = (self.colors.as_mut(), layout.color) {
            colors.r.push(to_color(row[ir], layout.types[ir], index, COLOR_NAMES[0])?);
            colors.g.push(to_color(row[ig], layout.types[ig], index, COLOR_NAMES[1])?);
            colors.b.push(to_color(row[ib], layout.types[ib], index, COLOR_NAMES[2])?);
        }

        Ok(())
    }

    fn finish(self) -> PointCloud {
        PointCloud {
            x: self.x,
            y: self.y,
            z: self.z,
            normals: self.normals,
            colors: self.colors,
        }
    }
}

/// Narrow to f32. NaN and infinities pass through; finite values beyond the
/// f32 range are an error rather than turning into infinities.
fn to_f32(value: f64, index: usize, property: &'static str) -> Result<f32, PlyError> {
    if value.is_finite() && value.abs() > f32::MAX as f64 {
        return Err(PlyError::Conversion {
            index,
            property,
            value,
            target: "f32",
        });
    }
    Ok(value as f32)
}

/// Integer channels must already be in 0..=255. Float channels are read as
/// 0..1 intensities, rounded to the nearest byte and saturated.
fn to_color(value: f64, ty: ScalarType, index: usize, property: &'static str) -> Result<u8, PlyError> {
    let err = || PlyError::Conversion {
        index,
        property,
        value,
        target: "u8",
    };

    if ty.is_float() {
        if value.is_nan() {
            return Err(err());
        }
        return Ok((value * 255.0).round().clamp(0.0, 255.0) as u8);
    }

    if (0.0..=255.0).contains(&value) {
        Ok(value as u8)
    } else {
        Err(err())
    }
}

/// Read the vertex element of a PLY file into a point cloud.
///
/// `x`, `y`, `z` are required. Normals (`nx`, `ny`, `nz`) and colors
/// (`red`, `green`, `blue`) are loaded when all three of their properties are
/// present. Any other vertex property is skipped.
pub fn read_ply(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let cloud = read_ply_bytes(&data)?;
    debug!(
        path = %path.display(),
        points = cloud.len(),
        normals = cloud.normals.is_some(),
        colors = cloud.colors.is_some(),
        "read PLY"
    );
    Ok(cloud)
}

/// [`read_ply`] over an in-memory file.
pub fn read_ply_bytes(data: &[u8]) -> Result<PointCloud, PlyError> {
    let header = parse_ply_header(data)?;

    let vertex_pos = header
        .elements
        .iter()
        .position(|e| e.name == "vertex")
        .ok_or_else(|| header_err("no vertex element"))?;
    let vertex = &header.elements[vertex_pos];
    let preceding = &header.elements[..vertex_pos];
    let layout = VertexLayout::new(vertex)?;
    let body = &data[header.body_offset..];

    match header.format {
        PlyFormat::Ascii => read_ascii_body(body, preceding, vertex, &layout),
        PlyFormat::BinaryLittleEndian => read_binary_body(body, preceding, vertex, &layout, false),
        PlyFormat::BinaryBigEndian => read_binary_body(body, preceding, vertex, &layout, true),
    }
}

fn read_ascii_body(
    body: &[u8],
    preceding: &[Element],
    vertex: &Element,
    layout: &VertexLayout,
) -> Result<PointCloud, PlyError> {
    let body = std::str::from_utf8(body).map_err(|_| header_err("ascii body is not valid UTF-8"))?;
    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());

    for element in preceding {
        for i in 0..element.count {
            lines.next().ok_or_else(|| PlyError::Parse {
                index: 0,
                message: format!("file ends inside element `{}` (row {})", element.name, i),
            })?;
        }
    }

    let mut builder = CloudBuilder::new(layout, vertex.count.min(body.len()));
    let mut row = vec![0.0f64; layout.types.len()];

    for index in 0..vertex.count {
        let line = lines.next().ok_or_else(|| PlyError::Parse {
            index,
            message: "unexpected end of file".to_string(),
        })?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < layout.types.len() {
            return Err(PlyError::Parse {
                index,
                message: format!(
                    "line has {} fields, expected {}",
                    tokens.len(),
                    layout.types.len()
                ),
            });
        }

        for (slot, (ty, token)) in row.iter_mut().zip(layout.types.iter().zip(&tokens)) {
            *slot = ty
                .parse_token(token)
                .map_err(|message| PlyError::Parse { index, message })?;
        }
        builder.push(layout, index, &row)?;
    }

    Ok(builder.finish())
}

fn read_binary_body(
    body: &[u8],
    preceding: &[Element],
    vertex: &Element,
    layout: &VertexLayout,
    big_endian: bool,
) -> Result<PointCloud, PlyError> {
    let overflow = || header_err("element sizes overflow");

    let mut skip = 0usize;
    for element in preceding {
        if element.has_lists() {
            return Err(PlyError::Unsupported(format!(
                "element `{}` with list properties before the vertex element",
                element.name
            )));
        }
        let size = element
            .count
            .checked_mul(element.row_size())
            .ok_or_else(overflow)?;
        skip = skip.checked_add(size).ok_or_else(overflow)?;
    }

    let stride = vertex.row_size();
    let needed = vertex
        .count
        .checked_mul(stride)
        .and_then(|n| n.checked_add(skip))
        .ok_or_else(overflow)?;
    if body.len() < needed {
        return Err(PlyError::Truncated {
            needed,
            got: body.len(),
        });
    }

    let mut offsets = Vec::with_capacity(layout.types.len());
    let mut acc = 0usize;
    for ty in &layout.types {
        offsets.push(acc);
        acc += ty.byte_size();
    }

    let mut builder = CloudBuilder::new(layout, vertex.count);
    let mut row = vec![0.0f64; layout.types.len()];

    for index in 0..vertex.count {
        let start = skip + index * stride;
        let bytes = &body[start..start + stride];
        for (slot, (ty, &off)) in row.iter_mut().zip(layout.types.iter().zip(&offsets)) {
            *slot = ty.decode(&bytes[off..], big_endian);
        }
        builder.push(layout, index, &row)?;
    }

    Ok(builder.finish())
}

/// Write a PLY file in ASCII format.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<(), PlyError> {
    let file = fs::File::create(path)?;
    write_ply_to(BufWriter::new(file), cloud, PlyFormat::Ascii)
}

/// Write a PLY file in binary_little_endian format.
///
/// Binary PLY is ~3-4x smaller and faster to read/write than ASCII PLY, and
/// round-trips every value bit for bit.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<(), PlyError> {
    let file = fs::File::create(path)?;
    write_ply_to(BufWriter::new(file), cloud, PlyFormat::BinaryLittleEndian)
}

/// Write `cloud` as a PLY stream: `x y z` as float, then `nx ny nz` as float
/// and `red green blue` as uchar when the cloud carries them.
///
/// ASCII output prints the shortest text that parses back to the same f32.
pub fn write_ply_to<W: Write>(
    mut w: W,
    cloud: &PointCloud,
    format: PlyFormat,
) -> Result<(), PlyError> {
    cloud.check_lengths()?;

    writeln!(w, "ply")?;
    writeln!(w, "format {} 1.0", format.header_name())?;
    writeln!(w, "element vertex {}", cloud.len())?;
    for name in POSITION_NAMES {
        writeln!(w, "property float {}", name)?;
    }
    if cloud.normals.is_some() {
        for name in NORMAL_NAMES {
            writeln!(w, "property float {}", name)?;
        }
    }
    if cloud.colors.is_some() {
        for name in COLOR_NAMES {
            writeln!(w, "property uchar {}", name)?;
        }
    }
    writeln!(w, "end_header")?;

    for i in 0..cloud.len() {
        let mut floats = vec![cloud.x[i], cloud.y[i], cloud.z[i]];
        if let Some(normals) = &cloud.normals {
            floats.extend_from_slice(&normals.normal(i));
        }
        let color = cloud.colors.as_ref().map(|c| c.color(i));

        match format {
            PlyFormat::Ascii => {
                let mut fields: Vec<String> = floats.iter().map(|v| v.to_string()).collect();
                if let Some(rgb) = color {
                    fields.extend(rgb.iter().map(|v| v.to_string()));
                }
                writeln!(w, "{}", fields.join(" "))?;
            }
            PlyFormat::BinaryLittleEndian | PlyFormat::BinaryBigEndian => {
                let big_endian = format == PlyFormat::BinaryBigEndian;
                for v in floats {
                    let raw = if big_endian {
                        v.to_be_bytes()
                    } else {
                        v.to_le_bytes()
                    };
                    w.write_all(&raw)?;
                }
                if let Some(rgb) = color {
                    w.write_all(&rgb)?;
                }
            }
        }
    }

    w.flush()?;
    Ok(())
}
