//! DRM card access
//!
//! Opens a card node and reads every KMS object into a [`Card`] snapshot.
//! Nothing here issues a modeset or any other write to the device.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, BorrowedFd};
use std::path::{Path, PathBuf};

use drm::control::{connector, crtc, encoder, plane, Device as ControlDevice, Mode, ResourceHandles};
use drm::{ClientCapability, Device};
use tracing::{debug, info, warn};

use crate::model::{
    Card, Connector, ConnectorStatus, Crtc, Encoder, EncoderType, Fixed16, Framebuffer,
    PixelFormat, Plane, PlaneGeometry, Rect,
};
use crate::videomode::Videomode;
use crate::{Error, Result};

/// Environment variable naming the card to open when no path is given
pub const DEVICE_ENV: &str = "KMSPRINT_DEVICE";

/// Highest `/dev/dri/cardN` probed when searching for a card
const MAX_CARDS: u32 = 16;

/// Plane properties making up [`PlaneGeometry`], in field order
const GEOMETRY_PROPS: [&str; 8] = [
    "SRC_X", "SRC_Y", "SRC_W", "SRC_H", "CRTC_X", "CRTC_Y", "CRTC_W", "CRTC_H",
];

/// An open DRM card node
pub struct DrmCard(File);

impl AsFd for DrmCard {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl Device for DrmCard {}
impl ControlDevice for DrmCard {}

impl DrmCard {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .or_else(|_| OpenOptions::new().read(true).open(path))
            .map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let card = DrmCard(file);
        // Only reads state, so don't hold master if we were handed it
        let _ = card.release_master_lock();

        info!(path = %path.display(), "Opened DRM card");
        Ok(card)
    }

    /// Take a snapshot of every KMS object on the card
    pub fn snapshot(&self) -> Result<Card> {
        if let Err(e) = self.set_client_capability(ClientCapability::UniversalPlanes, true) {
            warn!("Universal planes not supported: {}", e);
        }
        let has_atomic = self
            .set_client_capability(ClientCapability::Atomic, true)
            .is_ok();
        debug!(has_atomic, "Client capabilities set");

        let res = self
            .resource_handles()
            .map_err(|e| Error::drm("resource handles", e))?;

        let crtcs = self.read_crtcs(&res)?;
        let encoders = self.read_encoders(&res)?;
        let connectors = self.read_connectors(&res)?;
        let planes = self.read_planes(&res, has_atomic)?;
        let framebuffers = self.read_framebuffers(&res);

        debug!(
            connectors = connectors.len(),
            encoders = encoders.len(),
            crtcs = crtcs.len(),
            planes = planes.len(),
            framebuffers = framebuffers.len(),
            "Read KMS objects"
        );

        Ok(Card {
            has_atomic,
            connectors,
            encoders,
            crtcs,
            planes,
            framebuffers,
        })
    }

    fn read_crtcs(&self, res: &ResourceHandles) -> Result<Vec<Crtc>> {
        res.crtcs()
            .iter()
            .enumerate()
            .map(|(idx, &handle)| {
                let info = self
                    .get_crtc(handle)
                    .map_err(|e| Error::drm(format!("crtc {}", u32::from(handle)), e))?;

                Ok(Crtc {
                    id: handle.into(),
                    idx,
                    mode: info.mode().as_ref().map(videomode_from),
                })
            })
            .collect()
    }

    fn read_encoders(&self, res: &ResourceHandles) -> Result<Vec<Encoder>> {
        res.encoders()
            .iter()
            .enumerate()
            .map(|(idx, &handle)| {
                let info = self
                    .get_encoder(handle)
                    .map_err(|e| Error::drm(format!("encoder {}", u32::from(handle)), e))?;

                Ok(Encoder {
                    id: handle.into(),
                    idx,
                    kind: encoder_type(info.kind()),
                    crtc: info.crtc().and_then(|c| crtc_index(res, c)),
                })
            })
            .collect()
    }

    fn read_connectors(&self, res: &ResourceHandles) -> Result<Vec<Connector>> {
        res.connectors()
            .iter()
            .enumerate()
            .map(|(idx, &handle)| {
                let info = self
                    .get_connector(handle, false)
                    .map_err(|e| Error::drm(format!("connector {}", u32::from(handle)), e))?;

                let status = match info.state() {
                    connector::State::Connected => ConnectorStatus::Connected,
                    connector::State::Disconnected => ConnectorStatus::Disconnected,
                    _ => ConnectorStatus::Unknown,
                };

                let encoders = info
                    .encoders()
                    .iter()
                    .filter_map(|e| res.encoders().iter().position(|x| x == e))
                    .collect();

                Ok(Connector {
                    id: handle.into(),
                    idx,
                    fullname: format!("{}-{}", info.interface().as_str(), info.interface_id()),
                    status,
                    encoders,
                    modes: info.modes().iter().map(videomode_from).collect(),
                })
            })
            .collect()
    }

    fn read_planes(&self, res: &ResourceHandles, has_atomic: bool) -> Result<Vec<Plane>> {
        let handles = self
            .plane_handles()
            .map_err(|e| Error::drm("plane handles", e))?;

        handles
            .iter()
            .enumerate()
            .map(|(idx, &handle)| {
                let info = self
                    .get_plane(handle)
                    .map_err(|e| Error::drm(format!("plane {}", u32::from(handle)), e))?;

                let possible_crtcs = res
                    .filter_crtcs(info.possible_crtcs())
                    .into_iter()
                    .filter_map(|c| crtc_index(res, c))
                    .collect();

                let geometry = if has_atomic {
                    self.plane_geometry(handle)?
                } else {
                    None
                };

                Ok(Plane {
                    id: handle.into(),
                    idx,
                    fb_id: info.framebuffer().map(u32::from),
                    possible_crtcs,
                    formats: info.formats().iter().copied().map(PixelFormat).collect(),
                    geometry,
                })
            })
            .collect()
    }

    /// Read the SRC_* and CRTC_* properties of a plane
    ///
    /// Returns `None` if any of them is missing.
    fn plane_geometry(&self, handle: plane::Handle) -> Result<Option<PlaneGeometry>> {
        let props = self
            .get_properties(handle)
            .map_err(|e| Error::drm(format!("plane {} properties", u32::from(handle)), e))?;

        let (ids, values) = props.as_props_and_values();
        let mut by_name = HashMap::new();
        for (&id, &value) in ids.iter().zip(values) {
            let prop = self
                .get_property(id)
                .map_err(|e| Error::drm(format!("property {}", u32::from(id)), e))?;
            if let Ok(name) = prop.name().to_str() {
                by_name.insert(name.to_string(), value);
            }
        }

        let geometry = geometry_from(&by_name);
        if geometry.is_none() {
            debug!(plane = u32::from(handle), "Plane is missing geometry properties");
        }

        Ok(geometry)
    }

    fn read_framebuffers(&self, res: &ResourceHandles) -> Vec<Framebuffer> {
        res.framebuffers()
            .iter()
            .filter_map(|&handle| match self.get_framebuffer(handle) {
                Ok(info) => {
                    let (width, height) = info.size();
                    Some(Framebuffer {
                        id: handle.into(),
                        width,
                        height,
                    })
                }
                Err(e) => {
                    warn!("Skipping framebuffer {}: {}", u32::from(handle), e);
                    None
                }
            })
            .collect()
    }
}

/// Decode plane geometry from its property values, keyed by property name
///
/// Returns `None` if any of SRC_X/Y/W/H or CRTC_X/Y/W/H is missing.
fn geometry_from(by_name: &HashMap<String, u64>) -> Option<PlaneGeometry> {
    let raw: Vec<u64> = GEOMETRY_PROPS
        .iter()
        .map(|name| by_name.get(*name).copied())
        .collect::<Option<_>>()?;

    Some(PlaneGeometry {
        src: Rect {
            x: Fixed16::from(raw[0]),
            y: Fixed16::from(raw[1]),
            w: Fixed16::from(raw[2]),
            h: Fixed16::from(raw[3]),
        },
        dst: Rect {
            // CRTC_X/Y are signed; the kernel sign-extends them into the u64
            x: raw[4] as i64 as i32,
            y: raw[5] as i64 as i32,
            w: raw[6] as u32,
            h: raw[7] as u32,
        },
    })
}

fn crtc_index(res: &ResourceHandles, handle: crtc::Handle) -> Option<usize> {
    res.crtcs().iter().position(|&c| c == handle)
}

fn encoder_type(kind: encoder::Kind) -> EncoderType {
    match kind {
        encoder::Kind::None => EncoderType::None,
        encoder::Kind::DAC => EncoderType::Dac,
        encoder::Kind::TMDS => EncoderType::Tmds,
        encoder::Kind::LVDS => EncoderType::Lvds,
        encoder::Kind::TVDAC => EncoderType::TvDac,
        encoder::Kind::Virtual => EncoderType::Virtual,
        encoder::Kind::DSI => EncoderType::Dsi,
        encoder::Kind::DPMST => EncoderType::DpMst,
        encoder::Kind::DPI => EncoderType::Dpi,
    }
}

fn videomode_from(mode: &Mode) -> Videomode {
    let (hdisplay, vdisplay) = mode.size();
    let (hsync_start, hsync_end, htotal) = mode.hsync();
    let (vsync_start, vsync_end, vtotal) = mode.vsync();

    Videomode {
        clock: mode.clock(),
        hdisplay,
        hsync_start,
        hsync_end,
        htotal,
        vdisplay,
        vsync_start,
        vsync_end,
        vtotal,
        vrefresh: mode.vrefresh(),
        flags: mode.flags().bits(),
        mode_type: mode.mode_type().bits(),
    }
}

/// Candidate card nodes, `/dev/dri/card0` first
fn card_nodes() -> impl Iterator<Item = PathBuf> {
    (0..MAX_CARDS).map(|n| PathBuf::from(format!("/dev/dri/card{}", n)))
}

/// Open the first card node that has at least one connector
pub fn open_first_card() -> Result<DrmCard> {
    for path in card_nodes().filter(|p| p.exists()) {
        let card = match DrmCard::open(&path) {
            Ok(card) => card,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        match card.resource_handles() {
            Ok(res) if !res.connectors().is_empty() => return Ok(card),
            Ok(_) => debug!("Skipping {}: no connectors", path.display()),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    Err(Error::NoDevice)
}

/// Open `path`, or the first usable card when no path is given, and
/// snapshot it
pub fn open(path: Option<&Path>) -> Result<Card> {
    let card = match path {
        Some(path) => DrmCard::open(path)?,
        None => open_first_card()?,
    };

    card.snapshot()
}
