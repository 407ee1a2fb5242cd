//! Topology report: connectors, their encoders, active CRTC modes and
//! connector modes, in a fixed order.

use std::io::{self, Write};

use crate::format::{format_encoder, format_ob};
use crate::model::{Card, DrmObject};
use crate::videomode::{format_mode, ModeRole};

/// Print the mode report for every connected connector of `card`
///
/// For each connected connector this emits, in order: the connector line,
/// one indented line per possible encoder (each followed by an
/// `Encoder map` line when its current CRTC has a valid mode), one line per
/// card-wide CRTC with a valid mode, then one line per connector mode.
///
/// Connector mode lines carry the id of the last encoder listed for that
/// connector, whichever encoder can actually drive the mode.
pub fn print_modes<W: Write>(card: &Card, out: &mut W) -> io::Result<()> {
    for conn in card.connectors.iter().filter(|c| c.connected()) {
        writeln!(out, "{}", format_ob(DrmObject::Connector(conn)))?;

        let mut encoder_id = 0;
        for e in card.connector_encoders(conn) {
            writeln!(out, " {}", format_encoder(e))?;
            encoder_id = e.id;

            if let Some(crtc) = card.encoder_crtc(e).filter(|c| c.mode_valid()) {
                writeln!(out, "Encoder map: {:2} to {:2}", e.id, crtc.id)?;
            }
        }

        for crtc in &card.crtcs {
            if let Some(mode) = &crtc.mode {
                let line = format_mode(mode, crtc.idx, ModeRole::Crtc, crtc.id);
                writeln!(out, "{}", line)?;
            }
        }

        for (i, mode) in conn.modes.iter().enumerate() {
            let line = format_mode(mode, i, ModeRole::Connector, encoder_id);
            writeln!(out, "{}", line)?;
        }
    }

    Ok(())
}

/// List every CRTC, plane and framebuffer of the card, one line each
pub fn print_objects<W: Write>(card: &Card, out: &mut W) -> io::Result<()> {
    let objects = card
        .crtcs
        .iter()
        .map(DrmObject::Crtc)
        .chain(card.planes.iter().map(DrmObject::Plane))
        .chain(card.framebuffers.iter().map(DrmObject::Framebuffer));

    for ob in objects {
        writeln!(out, "{}", format_ob(ob))?;
    }

    Ok(())
}
