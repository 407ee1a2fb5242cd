//! Display timing descriptor and its text renderings

/// Mode flag bits (matching the kernel's DRM_MODE_FLAG_*)
pub mod mode_flags {
    pub const PHSYNC: u32 = 1 << 0;
    pub const NHSYNC: u32 = 1 << 1;
    pub const PVSYNC: u32 = 1 << 2;
    pub const NVSYNC: u32 = 1 << 3;
    pub const INTERLACE: u32 = 1 << 4;
}

/// Which kind of object a mode line is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRole {
    Connector,
    Crtc,
}

impl ModeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ModeRole::Connector => "connector",
            ModeRole::Crtc => "crtc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolarity {
    Undefined,
    Positive,
    Negative,
}

impl SyncPolarity {
    fn as_char(self) -> char {
        match self {
            SyncPolarity::Undefined => '?',
            SyncPolarity::Positive => '+',
            SyncPolarity::Negative => '-',
        }
    }
}

/// DRM mode info (matching kernel's drm_mode_modeinfo)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Videomode {
    /// Pixel clock in kHz
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub vrefresh: u32,
    pub flags: u32,
    pub mode_type: u32,
}

impl Videomode {
    pub fn hfp(&self) -> u16 {
        self.hsync_start.wrapping_sub(self.hdisplay)
    }

    pub fn hsw(&self) -> u16 {
        self.hsync_end.wrapping_sub(self.hsync_start)
    }

    pub fn hbp(&self) -> u16 {
        self.htotal.wrapping_sub(self.hsync_end)
    }

    pub fn vfp(&self) -> u16 {
        self.vsync_start.wrapping_sub(self.vdisplay)
    }

    pub fn vsw(&self) -> u16 {
        self.vsync_end.wrapping_sub(self.vsync_start)
    }

    pub fn vbp(&self) -> u16 {
        self.vtotal.wrapping_sub(self.vsync_end)
    }

    pub fn hsync(&self) -> SyncPolarity {
        polarity(self.flags, mode_flags::PHSYNC, mode_flags::NHSYNC)
    }

    pub fn vsync(&self) -> SyncPolarity {
        polarity(self.flags, mode_flags::PVSYNC, mode_flags::NVSYNC)
    }

    pub fn interlace(&self) -> bool {
        self.flags & mode_flags::INTERLACE != 0
    }

    /// Refresh rate derived from the timings, rounded to 1/100 Hz
    pub fn calculated_vrefresh(&self) -> f64 {
        let total = self.htotal as f64 * self.vtotal as f64;
        if total == 0.0 {
            return 0.0;
        }

        let mut refresh = self.clock as f64 * 1000.0 / total;
        if self.interlace() {
            refresh *= 2.0;
        }

        (refresh * 100.0).round() / 100.0
    }

    /// `1920x1080@60.00`, with an `i` after the size for interlaced modes
    pub fn to_string_short(&self) -> String {
        format!(
            "{}x{}{}@{:.2}",
            self.hdisplay,
            self.vdisplay,
            if self.interlace() { "i" } else { "" },
            self.calculated_vrefresh()
        )
    }

    /// Compact form used wherever a mode is named without further context
    pub fn to_string_long(&self) -> String {
        let h = format!(
            "{}/{}/{}/{}/{}",
            self.hdisplay,
            self.hfp(),
            self.hsw(),
            self.hbp(),
            self.hsync().as_char()
        );
        let v = format!(
            "{}/{}/{}/{}/{}",
            self.vdisplay,
            self.vfp(),
            self.vsw(),
            self.vbp(),
            self.vsync().as_char()
        );

        format!(
            "{} {:.3} {} {} {} ({:.2}) {:#x} {:#x}",
            self.to_string_short(),
            self.clock as f64 / 1000.0,
            h,
            v,
            self.vrefresh,
            self.calculated_vrefresh(),
            self.flags,
            self.mode_type
        )
    }

    /// Whitespace separated timing fields that follow the tag of an indexed line
    pub fn to_string_tagged(&self) -> String {
        format!(
            "{} {} {:.2} {} {} {} {} {} {} {} {} {:#x}",
            self.hdisplay,
            self.vdisplay,
            self.calculated_vrefresh(),
            self.clock,
            self.hfp(),
            self.hsw(),
            self.hbp(),
            self.vfp(),
            self.vsw(),
            self.vbp(),
            self.interlace() as u8,
            self.flags
        )
    }
}

fn polarity(flags: u32, positive: u32, negative: u32) -> SyncPolarity {
    if flags & positive != 0 {
        SyncPolarity::Positive
    } else if flags & negative != 0 {
        SyncPolarity::Negative
    } else {
        SyncPolarity::Undefined
    }
}

/// The compact rendering of a mode, as embedded in a CRTC line
pub fn format_mode_short(mode: &Videomode) -> String {
    mode.to_string_long()
}

/// Indexed rendering: `Mode: <idx> <role> <id> <timings>`
///
/// `id` is the encoder (connector role) or CRTC (crtc role) the mode is
/// associated with, so lines from different objects stay distinguishable.
pub fn format_mode(mode: &Videomode, idx: usize, role: ModeRole, id: u32) -> String {
    format!("Mode: {} {} {} {}", idx, role.as_str(), id, mode.to_string_tagged())
}

#[cfg(test)]
pub(crate) fn test_mode_1080p() -> Videomode {
    Videomode {
        clock: 148_500,
        hdisplay: 1920,
        hsync_start: 2008,
        hsync_end: 2052,
        htotal: 2200,
        vdisplay: 1080,
        vsync_start: 1084,
        vsync_end: 1089,
        vtotal: 1125,
        vrefresh: 60,
        flags: mode_flags::PHSYNC | mode_flags::PVSYNC,
        mode_type: 0x48,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porches() {
        let m = test_mode_1080p();
        assert_eq!((m.hfp(), m.hsw(), m.hbp()), (88, 44, 148));
        assert_eq!((m.vfp(), m.vsw(), m.vbp()), (4, 5, 36));
    }

    #[test]
    fn test_calculated_refresh() {
        let m = test_mode_1080p();
        assert!((m.calculated_vrefresh() - 60.0).abs() < 0.001);

        let empty = Videomode::default();
        assert_eq!(empty.calculated_vrefresh(), 0.0);
    }

    #[test]
    fn test_interlace_doubles_refresh() {
        let mut m = test_mode_1080p();
        m.flags |= mode_flags::INTERLACE;
        assert!((m.calculated_vrefresh() - 120.0).abs() < 0.001);
        assert_eq!(m.to_string_short(), "1920x1080i@120.00");
    }

    #[test]
    fn test_long_form() {
        let m = test_mode_1080p();
        assert_eq!(
            format_mode_short(&m),
            "1920x1080@60.00 148.500 1920/88/44/148/+ 1080/4/5/36/+ 60 (60.00) 0x5 0x48"
        );
    }

    #[test]
    fn test_sync_polarity() {
        let mut m = test_mode_1080p();
        m.flags = mode_flags::NHSYNC;
        assert_eq!(m.hsync(), SyncPolarity::Negative);
        assert_eq!(m.vsync(), SyncPolarity::Undefined);
    }

    #[test]
    fn test_indexed_form() {
        let m = test_mode_1080p();
        assert_eq!(
            format_mode(&m, 3, ModeRole::Connector, 31),
            "Mode: 3 connector 31 1920 1080 60.00 148500 88 44 148 4 5 36 0 0x5"
        );
        assert!(format_mode(&m, 0, ModeRole::Crtc, 41).starts_with("Mode: 0 crtc 41 1920 1080"));
    }
}
