//! One-line renderings of KMS objects

use crate::model::{Connector, ConnectorStatus, Crtc, DrmObject, Encoder, Framebuffer, Plane};
use crate::videomode::format_mode_short;

fn join<T>(items: impl IntoIterator<Item = T>, f: impl Fn(T) -> String) -> String {
    items.into_iter().map(f).collect::<Vec<_>>().join(" ")
}

pub fn format_connector(c: &Connector) -> String {
    let status = match c.status {
        ConnectorStatus::Connected => "connected",
        ConnectorStatus::Disconnected => "disconnected",
        ConnectorStatus::Unknown => "unknown",
    };

    format!("Connector {} ({}) {} ({})", c.idx, c.id, c.fullname, status)
}

pub fn format_encoder(e: &Encoder) -> String {
    format!("Encoder {} ({}) {}", e.idx, e.id, e.kind.as_str())
}

pub fn format_crtc(c: &Crtc) -> String {
    let mut s = format!("Crtc {} ({})", c.idx, c.id);

    if let Some(mode) = &c.mode {
        s.push(' ');
        s.push_str(&format_mode_short(mode));
    }

    s
}

pub fn format_plane(p: &Plane) -> String {
    let mut s = format!("Plane {} ({})", p.idx, p.id);

    if let Some(fb) = p.fb_id {
        s += &format!(" fb-id: {}", fb);
    }

    let crtcs = join(&p.possible_crtcs, |idx| idx.to_string());
    s += &format!(" (crtcs: {})", crtcs);

    if let Some(g) = &p.geometry {
        s += &format!(
            " {},{} {}x{} -> {},{} {}x{}",
            g.src.x.whole(),
            g.src.y.whole(),
            g.src.w.whole(),
            g.src.h.whole(),
            g.dst.x,
            g.dst.y,
            g.dst.w,
            g.dst.h
        );
    }

    s += &format!(" ({})", join(&p.formats, |f| f.to_string()));

    s
}

pub fn format_fb(fb: &Framebuffer) -> String {
    format!("FB {} {}x{}", fb.id, fb.width, fb.height)
}

/// Render any object with the formatter for its kind
pub fn format_ob(ob: DrmObject<'_>) -> String {
    match ob {
        DrmObject::Connector(c) => format_connector(c),
        DrmObject::Encoder(e) => format_encoder(e),
        DrmObject::Crtc(c) => format_crtc(c),
        DrmObject::Plane(p) => format_plane(p),
        DrmObject::Framebuffer(fb) => format_fb(fb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EncoderType, Fixed16, PixelFormat, PlaneGeometry, Rect};
    use crate::videomode::test_mode_1080p;

    fn connector(status: ConnectorStatus) -> Connector {
        Connector {
            id: 7,
            idx: 2,
            fullname: "HDMI-A-1".to_string(),
            status,
            encoders: Vec::new(),
            modes: Vec::new(),
        }
    }

    fn plane(geometry: Option<PlaneGeometry>) -> Plane {
        Plane {
            id: 33,
            idx: 0,
            fb_id: Some(90),
            possible_crtcs: vec![0, 1],
            formats: vec![PixelFormat(0x3432_5258), PixelFormat(0x3432_5241)],
            geometry,
        }
    }

    #[test]
    fn test_connector_status_suffix() {
        assert_eq!(
            format_connector(&connector(ConnectorStatus::Connected)),
            "Connector 2 (7) HDMI-A-1 (connected)"
        );
        assert!(
            format_connector(&connector(ConnectorStatus::Disconnected)).ends_with(" (disconnected)")
        );
        assert!(format_connector(&connector(ConnectorStatus::Unknown)).ends_with(" (unknown)"));
    }

    #[test]
    fn test_encoder() {
        let e = Encoder {
            id: 31,
            idx: 0,
            kind: EncoderType::Tmds,
            crtc: None,
        };
        assert_eq!(format_encoder(&e), "Encoder 0 (31) TMDS");
    }

    #[test]
    fn test_crtc_mode_suffix() {
        let mut c = Crtc {
            id: 5,
            idx: 1,
            mode: None,
        };
        assert_eq!(format_crtc(&c), "Crtc 1 (5)");

        c.mode = Some(test_mode_1080p());
        assert_eq!(
            format_crtc(&c),
            format!("Crtc 1 (5) {}", format_mode_short(&test_mode_1080p()))
        );
    }

    #[test]
    fn test_plane_legacy() {
        assert_eq!(
            format_plane(&plane(None)),
            "Plane 0 (33) fb-id: 90 (crtcs: 0 1) (XR24 AR24)"
        );
    }

    #[test]
    fn test_plane_atomic_geometry() {
        let geometry = PlaneGeometry {
            src: Rect {
                x: Fixed16(0),
                y: Fixed16(0x0001_8000),
                w: Fixed16::from(0x0028_0000u64),
                h: Fixed16(0x0438_0000),
            },
            dst: Rect {
                x: -8,
                y: 16,
                w: 40,
                h: 1080,
            },
        };
        let mut p = plane(Some(geometry));
        p.fb_id = None;
        assert_eq!(
            format_plane(&p),
            "Plane 0 (33) (crtcs: 0 1) 0,1 40x1080 -> -8,16 40x1080 (XR24 AR24)"
        );
    }

    #[test]
    fn test_fb() {
        let fb = Framebuffer {
            id: 90,
            width: 1920,
            height: 1080,
        };
        assert_eq!(format_fb(&fb), "FB 90 1920x1080");
    }

    #[test]
    fn test_dispatch_matches_direct_formatters() {
        let conn = connector(ConnectorStatus::Connected);
        let enc = Encoder {
            id: 31,
            idx: 0,
            kind: EncoderType::Dsi,
            crtc: None,
        };
        let crtc = Crtc {
            id: 5,
            idx: 1,
            mode: Some(test_mode_1080p()),
        };
        let p = plane(None);
        let fb = Framebuffer {
            id: 90,
            width: 64,
            height: 64,
        };

        assert_eq!(format_ob(DrmObject::Connector(&conn)), format_connector(&conn));
        assert_eq!(format_ob(DrmObject::Encoder(&enc)), format_encoder(&enc));
        assert_eq!(format_ob(DrmObject::Crtc(&crtc)), format_crtc(&crtc));
        assert_eq!(format_ob(DrmObject::Plane(&p)), format_plane(&p));
        assert_eq!(format_ob(DrmObject::Framebuffer(&fb)), format_fb(&fb));
    }
}
