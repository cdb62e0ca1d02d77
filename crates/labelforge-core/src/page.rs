//! Page geometry: paper size, orientation, resolution and margins.
//!
//! All lengths are millimetres. Integer codes match the values written by
//! earlier versions of the label format.

use kurbo::{Rect, Size};

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    #[default]
    A4,
    B5,
    Letter,
    Legal,
    Executive,
    A0,
    A1,
    A2,
    A3,
    A5,
    A6,
    A7,
    A8,
    A9,
    Custom,
}

impl PageSize {
    /// Persisted integer code.
    pub fn code(self) -> i32 {
        match self {
            PageSize::A4 => 0,
            PageSize::B5 => 1,
            PageSize::Letter => 2,
            PageSize::Legal => 3,
            PageSize::Executive => 4,
            PageSize::A0 => 5,
            PageSize::A1 => 6,
            PageSize::A2 => 7,
            PageSize::A3 => 8,
            PageSize::A5 => 9,
            PageSize::A6 => 10,
            PageSize::A7 => 11,
            PageSize::A8 => 12,
            PageSize::A9 => 13,
            PageSize::Custom => 30,
        }
    }

    /// Unknown codes fall back to A4.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PageSize::A4,
            1 => PageSize::B5,
            2 => PageSize::Letter,
            3 => PageSize::Legal,
            4 => PageSize::Executive,
            5 => PageSize::A0,
            6 => PageSize::A1,
            7 => PageSize::A2,
            8 => PageSize::A3,
            9 => PageSize::A5,
            10 => PageSize::A6,
            11 => PageSize::A7,
            12 => PageSize::A8,
            13 => PageSize::A9,
            30 => PageSize::Custom,
            other => {
                log::warn!("Unknown page size code {}, using A4", other);
                PageSize::A4
            }
        }
    }

    /// Portrait dimensions, `None` for [`PageSize::Custom`].
    pub fn dimensions(self) -> Option<Size> {
        let (w, h) = match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::B5 => (176.0, 250.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Executive => (184.15, 266.7),
            PageSize::A0 => (841.0, 1189.0),
            PageSize::A1 => (594.0, 841.0),
            PageSize::A2 => (420.0, 594.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::A6 => (105.0, 148.0),
            PageSize::A7 => (74.0, 105.0),
            PageSize::A8 => (52.0, 74.0),
            PageSize::A9 => (37.0, 52.0),
            PageSize::Custom => return None,
        };
        Some(Size::new(w, h))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn code(self) -> i32 {
        match self {
            Orientation::Portrait => 0,
            Orientation::Landscape => 1,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Orientation::Landscape,
            0 => Orientation::Portrait,
            other => {
                log::warn!("Unknown orientation code {}, using portrait", other);
                Orientation::Portrait
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// Page configuration of a label document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSettings {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Used when `page_size` is [`PageSize::Custom`].
    pub custom_size: Size,
    pub dpi: u32,
    pub margins: Margins,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            custom_size: Size::new(210.0, 297.0),
            dpi: 300,
            margins: Margins::default(),
        }
    }
}

impl PageSettings {
    /// Effective page size in mm. Standard sizes follow the orientation;
    /// custom sizes are used as given.
    pub fn page_real_size(&self) -> Size {
        match self.page_size.dimensions() {
            None => self.custom_size,
            Some(size) => match self.orientation {
                Orientation::Portrait => size,
                Orientation::Landscape => Size::new(size.height, size.width),
            },
        }
    }

    /// Printable area in mm: the page minus its margins.
    pub fn content_rect(&self) -> Rect {
        let size = self.page_real_size();
        Rect::new(
            self.margins.left,
            self.margins.top,
            size.width - self.margins.right,
            size.height - self.margins.bottom,
        )
    }

    /// Convert millimetres to device pixels at the page resolution.
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm / 25.4 * self.dpi as f64
    }

    /// Page size in device pixels.
    pub fn pixel_size(&self) -> Size {
        let size = self.page_real_size();
        Size::new(self.mm_to_px(size.width), self.mm_to_px(size.height))
    }
}
