//! Recording engine for tests.
//!
//! Primitives are logged as [`RecordedOp`]s instead of touching real pixels;
//! only dimensions, metadata and a sparse color grid (for region tests) are
//! tracked. Failures can be injected per primitive name, on region open,
//! and on a specific row commit.

use std::cell::Cell;
use std::collections::BTreeMap;

use super::{
    ColorType, CompositeOperator, EngineError, Interlace, PixelEngine, RegionCursor, RegionPixel,
    ResizeFilter,
};
use crate::color::Color;
use crate::decode::Orientation;
use crate::transform::compute_rotated_bounds;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    SetFormat(String),
    SetProperty { key: String, value: String },
    ApplyProfile(String),
    SetCoderOption { key: String, value: String },
    SetOrientation(Orientation),
    Strip,
    Resize {
        width: u32,
        height: u32,
        filter: ResizeFilter,
        blur: f64,
    },
    Crop {
        width: u32,
        height: u32,
        x: i64,
        y: i64,
    },
    Extent {
        width: u32,
        height: u32,
        x: i64,
        y: i64,
    },
    Rotate { fill: Color, degrees: f64 },
    Flip,
    Flop,
    BrightnessContrast { brightness: f64, contrast: f64 },
    SetColorType(ColorType),
    SepiaTone(f64),
    Colorize { tint: Color, opacity: Color },
    Composite {
        operator: CompositeOperator,
        x: i64,
        y: i64,
    },
    SetInterlace(Interlace),
    SetCompressionQuality(u8),
    OpenRegion {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    SyncRow(u32),
}

impl RecordedOp {
    fn name(&self) -> &'static str {
        match self {
            RecordedOp::SetFormat(_) => "set_format",
            RecordedOp::SetProperty { .. } => "set_property",
            RecordedOp::ApplyProfile(_) => "apply_profile",
            RecordedOp::SetCoderOption { .. } => "set_coder_option",
            RecordedOp::SetOrientation(_) => "set_orientation",
            RecordedOp::Strip => "strip",
            RecordedOp::Resize { .. } => "resize",
            RecordedOp::Crop { .. } => "crop",
            RecordedOp::Extent { .. } => "extent",
            RecordedOp::Rotate { .. } => "rotate",
            RecordedOp::Flip => "flip",
            RecordedOp::Flop => "flop",
            RecordedOp::BrightnessContrast { .. } => "brightness_contrast",
            RecordedOp::SetColorType(_) => "set_color_type",
            RecordedOp::SepiaTone(_) => "sepia_tone",
            RecordedOp::Colorize { .. } => "colorize",
            RecordedOp::Composite { .. } => "composite",
            RecordedOp::SetInterlace(_) => "set_interlace",
            RecordedOp::SetCompressionQuality(_) => "set_compression_quality",
            RecordedOp::OpenRegion { .. } => "open_region",
            RecordedOp::SyncRow(_) => "sync_row",
        }
    }
}

/// Mock engine that records primitives without executing them.
#[derive(Debug, Clone)]
pub struct MockEngine {
    width: u32,
    height: u32,
    format: String,
    orientation: Orientation,
    properties: BTreeMap<String, String>,
    /// Explicitly written pixels; everything else reads as `fill`.
    pixels: BTreeMap<(u32, u32), Color>,
    fill: Color,
    quantum: u32,
    quantum_queries: Cell<u32>,
    fail_on: Option<&'static str>,
    fail_sync_at: Option<u32>,
    operations: Vec<RecordedOp>,
}

impl MockEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: "JPEG".to_string(),
            orientation: Orientation::Undefined,
            properties: BTreeMap::new(),
            pixels: BTreeMap::new(),
            fill: Color::BLACK,
            quantum: 65535,
            quantum_queries: Cell::new(0),
            fail_on: None,
            fail_sync_at: None,
            operations: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Fill the whole grid with one color.
    pub fn filled(mut self, color: Color) -> Self {
        self.pixels.clear();
        self.fill = color;
        self
    }

    /// Make the named primitive (see [`RecordedOp`]) fail.
    pub fn failing_on(mut self, primitive: &'static str) -> Self {
        self.fail_on = Some(primitive);
        self
    }

    /// Make the commit of region row `row` fail.
    pub fn failing_sync_at(mut self, row: u32) -> Self {
        self.fail_sync_at = Some(row);
        self
    }

    pub fn operations(&self) -> &[RecordedOp] {
        &self.operations
    }

    /// How many times the quantum range was read from the engine.
    pub fn quantum_queries(&self) -> u32 {
        self.quantum_queries.get()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels.get(&(x, y)).copied().unwrap_or(self.fill)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.pixels.insert((x, y), color);
    }

    fn record(&mut self, op: RecordedOp) -> Result<(), EngineError> {
        if self.fail_on == Some(op.name()) {
            return Err(EngineError::Primitive(format!("injected {} failure", op.name())));
        }
        self.operations.push(op);
        Ok(())
    }

    fn reshape(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.fill = Color::TRANSPARENT;
    }
}

impl PixelEngine for MockEngine {
    type Region<'a>
        = MockRegion<'a>
    where
        Self: 'a;

    fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::Decode("empty blob".to_string()));
        }
        Ok(Self::new(1, 1))
    }

    fn encode(&self) -> Result<Vec<u8>, EngineError> {
        Ok(self.format.as_bytes().to_vec())
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn set_format(&mut self, format: &str) -> Result<(), EngineError> {
        self.record(RecordedOp::SetFormat(format.to_string()))?;
        self.format = format.to_string();
        Ok(())
    }

    fn quantum_range(&self) -> u32 {
        self.quantum_queries.set(self.quantum_queries.get() + 1);
        self.quantum
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        self.record(RecordedOp::SetProperty {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        self.properties
            .insert(key.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn apply_profile(&mut self, name: &str, _data: &[u8]) -> Result<(), EngineError> {
        self.record(RecordedOp::ApplyProfile(name.to_string()))
    }

    fn set_coder_option(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        self.record(RecordedOp::SetCoderOption {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: Orientation) -> Result<(), EngineError> {
        self.record(RecordedOp::SetOrientation(orientation))?;
        self.orientation = orientation;
        Ok(())
    }

    fn strip(&mut self) -> Result<(), EngineError> {
        self.record(RecordedOp::Strip)?;
        self.properties.clear();
        Ok(())
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        filter: ResizeFilter,
        blur: f64,
    ) -> Result<(), EngineError> {
        self.record(RecordedOp::Resize {
            width,
            height,
            filter,
            blur,
        })?;
        self.reshape(width, height);
        Ok(())
    }

    fn crop(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError> {
        self.record(RecordedOp::Crop {
            width,
            height,
            x,
            y,
        })?;
        let right = (x + width as i64).min(self.width as i64);
        let bottom = (y + height as i64).min(self.height as i64);
        let (left, top) = (x.max(0), y.max(0));
        if right <= left || bottom <= top {
            return Err(EngineError::InvalidGeometry {
                width,
                height,
                x,
                y,
            });
        }
        self.reshape((right - left) as u32, (bottom - top) as u32);
        Ok(())
    }

    fn extent(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError> {
        self.record(RecordedOp::Extent {
            width,
            height,
            x,
            y,
        })?;
        self.reshape(width, height);
        Ok(())
    }

    fn rotate(&mut self, fill: Color, degrees: f64) -> Result<(), EngineError> {
        self.record(RecordedOp::Rotate { fill, degrees })?;
        let (w, h) = compute_rotated_bounds(self.width, self.height, degrees);
        self.reshape(w, h);
        Ok(())
    }

    fn flip(&mut self) -> Result<(), EngineError> {
        self.record(RecordedOp::Flip)
    }

    fn flop(&mut self) -> Result<(), EngineError> {
        self.record(RecordedOp::Flop)
    }

    fn brightness_contrast(&mut self, brightness: f64, contrast: f64) -> Result<(), EngineError> {
        self.record(RecordedOp::BrightnessContrast {
            brightness,
            contrast,
        })
    }

    fn set_color_type(&mut self, color_type: ColorType) -> Result<(), EngineError> {
        self.record(RecordedOp::SetColorType(color_type))
    }

    fn sepia_tone(&mut self, threshold: f64) -> Result<(), EngineError> {
        self.record(RecordedOp::SepiaTone(threshold))
    }

    fn colorize(&mut self, tint: Color, opacity: Color) -> Result<(), EngineError> {
        self.record(RecordedOp::Colorize { tint, opacity })
    }

    fn composite(
        &mut self,
        _overlay: &Self,
        operator: CompositeOperator,
        x: i64,
        y: i64,
    ) -> Result<(), EngineError> {
        self.record(RecordedOp::Composite { operator, x, y })
    }

    fn set_interlace(&mut self, interlace: Interlace) -> Result<(), EngineError> {
        self.record(RecordedOp::SetInterlace(interlace))
    }

    fn set_compression_quality(&mut self, quality: u8) -> Result<(), EngineError> {
        self.record(RecordedOp::SetCompressionQuality(quality))
    }

    fn region(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> Result<MockRegion<'_>, EngineError> {
        self.record(RecordedOp::OpenRegion {
            x,
            y,
            width,
            height,
        })?;

        let fits = x >= 0
            && y >= 0
            && x.checked_add(width as i64).is_some_and(|end| end <= self.width as i64)
            && y.checked_add(height as i64).is_some_and(|end| end <= self.height as i64);
        if !fits {
            return Err(EngineError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                canvas_width: self.width,
                canvas_height: self.height,
            });
        }

        Ok(MockRegion {
            engine: self,
            x: x as u32,
            y: y as u32,
            width,
            height,
            next: 0,
            current: None,
            row: Vec::new(),
        })
    }
}

pub struct MockRegion<'a> {
    engine: &'a mut MockEngine,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    next: u32,
    current: Option<u32>,
    row: Vec<RegionPixel>,
}

impl RegionCursor for MockRegion<'_> {
    fn next_row(&mut self) -> Option<&mut [RegionPixel]> {
        if self.next >= self.height {
            self.current = None;
            return None;
        }

        let row = self.next;
        self.next += 1;
        self.current = Some(row);

        let py = self.y + row;
        self.row = (self.x..self.x + self.width)
            .map(|px| RegionPixel::new(self.engine.pixel(px, py)))
            .collect();
        Some(&mut self.row)
    }

    fn sync_row(&mut self) -> Result<(), EngineError> {
        let row = self.current.take().ok_or(EngineError::NoCurrentRow)?;
        if self.engine.fail_sync_at == Some(row) {
            return Err(EngineError::Sync {
                row,
                reason: "injected sync failure".to_string(),
            });
        }
        self.engine.record(RecordedOp::SyncRow(row))?;

        let py = self.y + row;
        for (i, pixel) in self.row.iter().enumerate() {
            if pixel.is_dirty() {
                self.engine
                    .set_pixel(self.x + i as u32, py, pixel.to_color());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut engine = MockEngine::new(4, 2);
        engine.flip().unwrap();
        engine.rotate(Color::TRANSPARENT, 90.0).unwrap();

        assert_eq!(
            engine.operations(),
            &[
                RecordedOp::Flip,
                RecordedOp::Rotate {
                    fill: Color::TRANSPARENT,
                    degrees: 90.0
                },
            ]
        );
        assert_eq!((engine.width(), engine.height()), (2, 4));
    }

    #[test]
    fn test_injected_failure_is_not_recorded() {
        let mut engine = MockEngine::new(4, 2).failing_on("flop");
        assert!(engine.flop().is_err());
        assert!(engine.operations().is_empty());
        engine.flip().unwrap();
        assert_eq!(engine.operations(), &[RecordedOp::Flip]);
    }

    #[test]
    fn test_region_writes_back_synced_rows() {
        let mut engine = MockEngine::new(2, 2).failing_sync_at(1);
        {
            let mut region = engine.region(0, 0, 2, 2).unwrap();
            region.next_row().unwrap()[0].assign(Color::WHITE);
            region.sync_row().unwrap();
            region.next_row().unwrap()[0].assign(Color::WHITE);
            assert!(matches!(region.sync_row(), Err(EngineError::Sync { row: 1, .. })));
        }
        assert_eq!(engine.pixel(0, 0), Color::WHITE);
        assert_eq!(engine.pixel(0, 1), Color::BLACK);
    }
}
