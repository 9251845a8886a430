use crate::Error;

/// Color model of the stored samples, as given by the `IHDR` color type byte
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ColorType {
    /// greyscale: 1, 2, 4, 8, 16 bit
    Grayscale = 0,
    /// RGB: 8, 16 bit
    Truecolor = 2,
    /// palette: 1, 2, 4, 8 bit
    Indexed = 3,
    /// greyscale with alpha: 8, 16 bit
    GrayscaleAlpha = 4,
    /// RGB with alpha: 8, 16 bit
    TruecolorAlpha = 6,
}

impl ColorType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Grayscale,
            2 => Self::Truecolor,
            3 => Self::Indexed,
            4 => Self::GrayscaleAlpha,
            6 => Self::TruecolorAlpha,
            _ => return None,
        })
    }

    /// Samples per pixel
    pub fn channels(self) -> u8 {
        match self {
            Self::Grayscale | Self::Indexed => 1,
            Self::GrayscaleAlpha => 2,
            Self::Truecolor => 3,
            Self::TruecolorAlpha => 4,
        }
    }

    /// Bit depths the PNG format allows for this color type
    pub fn allowed_bit_depths(self) -> &'static [u8] {
        match self {
            Self::Grayscale => &[1, 2, 4, 8, 16],
            Self::Indexed => &[1, 2, 4, 8],
            Self::Truecolor | Self::GrayscaleAlpha | Self::TruecolorAlpha => &[8, 16],
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::GrayscaleAlpha | Self::TruecolorAlpha)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "Grayscale",
            Self::Truecolor => "Truecolour",
            Self::Indexed => "Indexed-colour",
            Self::GrayscaleAlpha => "Grayscale with alpha",
            Self::TruecolorAlpha => "Truecolor with alpha",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum InterlaceMethod {
    None = 0,
    Adam7 = 1,
}

/// Validated contents of the `IHDR` chunk.
///
/// Can only be constructed from a valid combination of fields, and can't be changed afterwards.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: ColorType,
    compression_method: u8,
    filter_method: u8,
    interlace_method: InterlaceMethod,
}

impl Header {
    /// Checks the fields in order: dimensions, color type, bit depth, compression, filter, interlace.
    ///
    /// Adam7 interlacing is accepted here, see `check_supported`.
    pub fn new(width: u32, height: u32, bit_depth: u8, color_type: u8, compression_method: u8, filter_method: u8, interlace_method: u8) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let color_type = ColorType::from_u8(color_type).ok_or(Error::InvalidColorType(color_type))?;
        if !color_type.allowed_bit_depths().contains(&bit_depth) {
            return Err(Error::InvalidBitDepth { bit_depth, color_type });
        }
        if compression_method != 0 {
            return Err(Error::UnsupportedCompression(compression_method));
        }
        if filter_method != 0 {
            return Err(Error::UnsupportedFilter(filter_method));
        }
        let interlace_method = match interlace_method {
            0 => InterlaceMethod::None,
            1 => InterlaceMethod::Adam7,
            m => return Err(Error::InvalidInterlace(m)),
        };
        Ok(Self { width, height, bit_depth, color_type, compression_method, filter_method, interlace_method })
    }

    /// Parses the 13-byte `IHDR` payload
    pub fn from_ihdr(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 13 {
            return Err(Error::HeaderLength { length: data.len() as u32 });
        }
        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        Self::new(width, height, data[8], data[9], data[10], data[11], data[12])
    }

    /// Fails for headers that are valid PNG, but which this decoder can't decode
    pub fn check_supported(&self) -> Result<(), Error> {
        match self.interlace_method {
            InterlaceMethod::None => Ok(()),
            InterlaceMethod::Adam7 => Err(Error::UnsupportedInterlace),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 { self.width }
    #[inline]
    pub fn height(&self) -> u32 { self.height }
    #[inline]
    pub fn bit_depth(&self) -> u8 { self.bit_depth }
    #[inline]
    pub fn color_type(&self) -> ColorType { self.color_type }
    #[inline]
    pub fn compression_method(&self) -> u8 { self.compression_method }
    #[inline]
    pub fn filter_method(&self) -> u8 { self.filter_method }
    #[inline]
    pub fn interlace_method(&self) -> InterlaceMethod { self.interlace_method }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.color_type.channels()
    }

    /// bits per pixel is amount of channels * bits per channel
    #[inline]
    pub fn bits_per_pixel(&self) -> u32 {
        u32::from(self.channels()) * u32::from(self.bit_depth)
    }

    /// Bytes in one scanline, without the filter type byte. Sub-byte pixels are rounded up to a whole byte.
    pub fn row_bytes(&self) -> u64 {
        (u64::from(self.width) * u64::from(self.bits_per_pixel()) + 7) / 8
    }

    /// Distance in bytes to the corresponding byte of the pixel to the left,
    /// 1 when pixels are smaller than a byte
    pub fn filter_unit(&self) -> usize {
        (self.bits_per_pixel() as usize / 8).max(1)
    }

    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Field names with their raw values
    pub fn info(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Width", self.width.to_string()),
            ("Height", self.height.to_string()),
            ("Bit depth", self.bit_depth.to_string()),
            ("Color type", (self.color_type as u8).to_string()),
            ("Compression method", self.compression_method.to_string()),
            ("Filter method", self.filter_method.to_string()),
            ("Interlace method", (self.interlace_method as u8).to_string()),
        ]
    }

    /// Field names with human-readable descriptions
    pub fn detailed_info(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Width", self.width.to_string()),
            ("Height", self.height.to_string()),
            ("Bit depth", self.bit_depth.to_string()),
            ("Color type", self.color_type.name().into()),
            ("Compression method", "deflate/inflate compression".into()),
            ("Filter method", "adaptive filtering with five basic filter types".into()),
            ("Interlace method", match self.interlace_method {
                InterlaceMethod::None => "no interlace",
                InterlaceMethod::Adam7 => "Adam7 interlace",
            }.into()),
        ]
    }
}
