/// SharedArrayBuffer layout.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 20 floats]
/// [Row transforms: rows_visible × 4 floats]
/// [Tile attributes: 3 × rows_visible × columns floats]
///     (visibility, then seeds, then answer ownership)
/// [Element transforms: ELEMENT_SLOTS × 4 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::engine::EngineConfig;
use crate::terrain::binder::ELEMENT_SLOTS;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 20;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PROTOCOL_VERSION: usize = 2;
pub const HEADER_ROWS_VISIBLE: usize = 3;
pub const HEADER_COLUMNS: usize = 4;
pub const HEADER_TILE_SIZE: usize = 5;
pub const HEADER_MAX_Z: usize = 6;
pub const HEADER_STAGE: usize = 7;
pub const HEADER_DISTANCE: usize = 8;
pub const HEADER_SCROLL_POS: usize = 9;
pub const HEADER_SPEED_FACTOR: usize = 10;
pub const HEADER_ATTRS_DIRTY: usize = 11;
pub const HEADER_EVENT_COUNT: usize = 12;
pub const HEADER_MAX_EVENTS: usize = 13;
pub const HEADER_ELEMENT_SLOTS: usize = 14;
pub const HEADER_PLAYER_X: usize = 15;
pub const HEADER_PLAYER_Y: usize = 16;
pub const HEADER_PLAYER_Z: usize = 17;
pub const HEADER_BUFFER_UNDERRUNS: usize = 18;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per row transform: x, y, z, wraps (wire format — never changes).
pub const ROW_TRANSFORM_FLOATS: usize = 4;

/// Attribute streams per tile: visibility, seed, answer ownership.
pub const ATTRIBUTE_STREAMS: usize = 3;

/// Floats per element transform: x, y, z, active (wire format — never changes).
pub const ELEMENT_FLOATS: usize = 4;

/// Floats per engine event: kind, a, b, c (wire format — never changes).
pub const EVENT_FLOATS: usize = 4;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    /// Visible row slots.
    pub rows_visible: usize,
    /// Tiles per row.
    pub columns: usize,
    /// Maximum engine events per frame.
    pub max_events: usize,

    /// Size of the row transform section in floats.
    pub row_data_floats: usize,
    /// Size of the tile attribute section in floats.
    pub attribute_floats: usize,
    /// Size of the element transform section in floats.
    pub element_floats: usize,
    /// Size of the event section in floats.
    pub event_floats: usize,

    /// Offset (in floats) where row transforms begin.
    pub row_data_offset: usize,
    /// Offset (in floats) where tile attributes begin.
    pub attribute_offset: usize,
    /// Offset (in floats) where element transforms begin.
    pub element_offset: usize,
    /// Offset (in floats) where events begin.
    pub event_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(rows_visible: usize, columns: usize, max_events: usize) -> Self {
        let row_data_floats = rows_visible * ROW_TRANSFORM_FLOATS;
        let attribute_floats = ATTRIBUTE_STREAMS * rows_visible * columns;
        let element_floats = ELEMENT_SLOTS * ELEMENT_FLOATS;
        let event_floats = max_events * EVENT_FLOATS;

        let row_data_offset = HEADER_FLOATS;
        let attribute_offset = row_data_offset + row_data_floats;
        let element_offset = attribute_offset + attribute_floats;
        let event_offset = element_offset + element_floats;
        let buffer_total_floats = event_offset + event_floats;

        Self {
            rows_visible,
            columns,
            max_events,
            row_data_floats,
            attribute_floats,
            element_floats,
            event_floats,
            row_data_offset,
            attribute_offset,
            element_offset,
            event_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.geometry.rows_visible,
            config.geometry.columns,
            config.max_events,
        )
    }

    /// Offset of one attribute stream (0 = visibility, 1 = seeds,
    /// 2 = answer ownership).
    pub fn attribute_stream_offset(&self, stream: usize) -> usize {
        self.attribute_offset + stream * self.rows_visible * self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_contiguous() {
        let layout = ProtocolLayout::new(30, 9, 32);
        assert_eq!(layout.row_data_offset, HEADER_FLOATS);
        assert_eq!(
            layout.attribute_offset,
            layout.row_data_offset + layout.row_data_floats
        );
        assert_eq!(
            layout.element_offset,
            layout.attribute_offset + layout.attribute_floats
        );
        assert_eq!(
            layout.event_offset,
            layout.element_offset + layout.element_floats
        );
        assert_eq!(
            layout.buffer_total_floats,
            layout.event_offset + layout.event_floats
        );
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn production_sizes() {
        let layout = ProtocolLayout::from_config(&EngineConfig::default());
        assert_eq!(layout.row_data_floats, 30 * 4);
        assert_eq!(layout.attribute_floats, 3 * 30 * 9);
        assert_eq!(layout.element_floats, ELEMENT_SLOTS * 4);
        assert_eq!(layout.event_floats, 32 * 4);
    }

    #[test]
    fn attribute_streams_partition_their_section() {
        let layout = ProtocolLayout::new(4, 3, 8);
        let tiles = 4 * 3;
        assert_eq!(layout.attribute_stream_offset(0), layout.attribute_offset);
        assert_eq!(
            layout.attribute_stream_offset(1),
            layout.attribute_offset + tiles
        );
        assert_eq!(
            layout.attribute_stream_offset(2),
            layout.attribute_offset + 2 * tiles
        );
        assert_eq!(
            layout.attribute_stream_offset(2) + tiles,
            layout.element_offset
        );
    }

    #[test]
    fn header_fields_fit() {
        assert!(HEADER_BUFFER_UNDERRUNS < HEADER_FLOATS);
    }
}
