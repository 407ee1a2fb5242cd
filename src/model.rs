//! Immutable snapshot of a card's KMS objects
//!
//! Objects refer to each other by index into the owning [`Card`]'s vectors,
//! so a snapshot can be built by hand (tests) or from a live device
//! ([`crate::device`]) without lifetimes tying them together.

use std::fmt;

use crate::videomode::Videomode;

/// Connection state reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorStatus {
    Connected,
    Disconnected,
    Unknown,
}

/// DRM connector
#[derive(Debug, Clone)]
pub struct Connector {
    pub id: u32,
    pub idx: usize,
    /// Interface name plus interface id, e.g. `HDMI-A-1`
    pub fullname: String,
    pub status: ConnectorStatus,
    /// Indices into [`Card::encoders`], in the kernel's order
    pub encoders: Vec<usize>,
    pub modes: Vec<Videomode>,
}

impl Connector {
    pub fn connected(&self) -> bool {
        self.status == ConnectorStatus::Connected
    }
}

/// Encoder types (matching the kernel's DRM_MODE_ENCODER_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderType {
    None,
    Dac,
    Tmds,
    Lvds,
    TvDac,
    Virtual,
    Dsi,
    DpMst,
    Dpi,
    Unknown,
}

impl EncoderType {
    pub fn as_str(self) -> &'static str {
        match self {
            EncoderType::None => "NONE",
            EncoderType::Dac => "DAC",
            EncoderType::Tmds => "TMDS",
            EncoderType::Lvds => "LVDS",
            EncoderType::TvDac => "TVDAC",
            EncoderType::Virtual => "VIRTUAL",
            EncoderType::Dsi => "DSI",
            EncoderType::DpMst => "DPMST",
            EncoderType::Dpi => "DPI",
            EncoderType::Unknown => "UNKNOWN",
        }
    }
}

/// DRM encoder
#[derive(Debug, Clone)]
pub struct Encoder {
    pub id: u32,
    pub idx: usize,
    pub kind: EncoderType,
    /// Index into [`Card::crtcs`] of the CRTC currently driving this encoder
    pub crtc: Option<usize>,
}

/// DRM CRTC
#[derive(Debug, Clone)]
pub struct Crtc {
    pub id: u32,
    pub idx: usize,
    /// Present only when the kernel reports a valid, configured mode
    pub mode: Option<Videomode>,
}

impl Crtc {
    pub fn mode_valid(&self) -> bool {
        self.mode.is_some()
    }
}

/// A 16.16 fixed-point property value, as used by the plane SRC_* properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fixed16(pub u32);

impl Fixed16 {
    /// Integer part; the 16 fractional bits are discarded
    pub fn whole(self) -> u32 {
        self.0 >> 16
    }
}

impl From<u64> for Fixed16 {
    fn from(raw: u64) -> Self {
        Fixed16(raw as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect<P, S> {
    pub x: P,
    pub y: P,
    pub w: S,
    pub h: S,
}

/// Plane scanout geometry: framebuffer source area and CRTC destination area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneGeometry {
    pub src: Rect<Fixed16, Fixed16>,
    pub dst: Rect<i32, u32>,
}

/// Pixel format as a little-endian fourcc code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat(pub u32);

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.to_le_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// DRM plane
#[derive(Debug, Clone)]
pub struct Plane {
    pub id: u32,
    pub idx: usize,
    pub fb_id: Option<u32>,
    /// Indices into [`Card::crtcs`] this plane can be attached to
    pub possible_crtcs: Vec<usize>,
    pub formats: Vec<PixelFormat>,
    /// Read only when the card has atomic support
    pub geometry: Option<PlaneGeometry>,
}

/// DRM framebuffer
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// Any KMS object the formatters know how to render
#[derive(Debug, Clone, Copy)]
pub enum DrmObject<'a> {
    Connector(&'a Connector),
    Encoder(&'a Encoder),
    Crtc(&'a Crtc),
    Plane(&'a Plane),
    Framebuffer(&'a Framebuffer),
}

/// Everything discovered on a card when it was opened
#[derive(Debug, Clone, Default)]
pub struct Card {
    pub has_atomic: bool,
    pub connectors: Vec<Connector>,
    pub encoders: Vec<Encoder>,
    pub crtcs: Vec<Crtc>,
    pub planes: Vec<Plane>,
    pub framebuffers: Vec<Framebuffer>,
}

impl Card {
    /// Encoders a connector can be paired with, in the connector's order
    pub fn connector_encoders<'a>(
        &'a self,
        connector: &'a Connector,
    ) -> impl Iterator<Item = &'a Encoder> + 'a {
        connector
            .encoders
            .iter()
            .filter_map(move |&idx| self.encoders.get(idx))
    }

    /// The CRTC currently driving an encoder, if any
    pub fn encoder_crtc(&self, encoder: &Encoder) -> Option<&Crtc> {
        encoder.crtc.and_then(|idx| self.crtcs.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed16_whole() {
        assert_eq!(Fixed16::from(0x0028_0000u64).whole(), 40);
        assert_eq!(Fixed16(0x0028_8000).whole(), 40);
        assert_eq!(Fixed16(0xffff).whole(), 0);
    }

    #[test]
    fn test_pixel_format_fourcc() {
        // 'XR24' and 'RG16'
        assert_eq!(PixelFormat(0x3432_5258).to_string(), "XR24");
        assert_eq!(PixelFormat(0x3631_4752).to_string(), "RG16");
    }

    #[test]
    fn test_dangling_indices_are_skipped() {
        let card = Card {
            encoders: vec![Encoder {
                id: 31,
                idx: 0,
                kind: EncoderType::Tmds,
                crtc: Some(4),
            }],
            ..Default::default()
        };
        let conn = Connector {
            id: 7,
            idx: 0,
            fullname: "HDMI-A-1".to_string(),
            status: ConnectorStatus::Connected,
            encoders: vec![0, 9],
            modes: Vec::new(),
        };

        let encoders: Vec<_> = card.connector_encoders(&conn).collect();
        assert_eq!(encoders.len(), 1);
        assert!(card.encoder_crtc(encoders[0]).is_none());
    }
}
