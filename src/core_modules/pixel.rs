// THEORY (Color Space Conversion):
// The `Pixel` module is the most fundamental unit of the classifier. It is a
// "dumb" container for a single RGBA8 sample plus the single-pixel heuristics
// every other stage needs: hue, saturation and value in the HSV model.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbors or history.
// 2) Total functions: black, white and every gray map to hue 0, saturation 0,
//    the standard convention at chroma = 0. No input can fail.
// 3) Normalized sRGB channels only, no linearization.

pub mod pixel {
    use crate::constants::frame::CHANNELS;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type SaturationHSV = f32;
    pub type ValueHSV = f32;
    pub type Chroma = f32;

    const CHROMA_EPSILON: f32 = 1e-6;

    /// One color in HSV space: hue in degrees [0, 360), saturation and value in [0, 1].
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Hsv {
        pub hue: Hue,
        pub saturation: SaturationHSV,
        pub value: ValueHSV,
    }

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha channel value (0-255). Carried, never analyzed.
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        #[inline]
        fn normalized(&self) -> (NormalizedChannel, NormalizedChannel, NormalizedChannel) {
            (
                self.red as NormalizedChannel / 255.0,
                self.green as NormalizedChannel / 255.0,
                self.blue as NormalizedChannel / 255.0,
            )
        }

        /// HSV Value (V): brightness defined as max(R, G, B).
        pub fn value_hsv(&self) -> ValueHSV {
            let (r, g, b) = self.normalized();
            r.max(g.max(b))
        }

        /// Chroma (C): color purity = max(R,G,B) - min(R,G,B).
        pub fn chroma(&self) -> Chroma {
            let (r, g, b) = self.normalized();
            r.max(g.max(b)) - r.min(g.min(b))
        }

        /// Saturation (HSV): chroma / value. Zero for black.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let maximum_channel = self.value_hsv();
            if maximum_channel <= CHROMA_EPSILON {
                return 0.0;
            }
            self.chroma() / maximum_channel
        }

        /// Hue angle in degrees [0, 360). Zero when the pixel is achromatic.
        pub fn hue(&self) -> Hue {
            let (r, g, b) = self.normalized();
            let maximum_channel = r.max(g.max(b));
            let chroma = maximum_channel - r.min(g.min(b));

            if chroma <= CHROMA_EPSILON {
                return 0.0;
            }

            let (base_difference, sector_offset) = if maximum_channel == r {
                (g - b, 0.0)
            } else if maximum_channel == g {
                (b - r, 2.0)
            } else {
                (r - g, 4.0)
            };

            normalize_degrees((base_difference / chroma + sector_offset) * 60.0)
        }

        /// All three HSV heuristics at once.
        pub fn hsv(&self) -> Hsv {
            Hsv {
                hue: self.hue(),
                saturation: self.saturation_hsv(),
                value: self.value_hsv(),
            }
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    /// Folds any angle into [0, 360).
    #[inline]
    pub fn normalize_degrees(degrees: f32) -> f32 {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Converts one RGB triple (0-255 per channel) to HSV.
    pub fn rgb_to_hsv(red: Channel, green: Channel, blue: Channel) -> Hsv {
        Pixel::new(red, green, blue, u8::MAX).hsv()
    }

    /// Converts HSV back to RGB bytes. Out-of-range saturation and value are clamped.
    pub fn hsv_to_rgb(hue: Hue, saturation: SaturationHSV, value: ValueHSV) -> (Channel, Channel, Channel) {
        let hue = normalize_degrees(hue);
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let chroma = value * saturation;
        let secondary = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let floor = value - chroma;

        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };

        let to_byte = |channel: f32| ((channel + floor) * 255.0).round().clamp(0.0, 255.0) as Channel;
        (to_byte(r), to_byte(g), to_byte(b))
    }

    /// Renders an HSL color (hue in degrees, saturation and lightness in percent) as `#rrggbb`.
    pub fn hsl_to_hex(hue: f64, saturation_percent: f64, lightness_percent: f64) -> String {
        let saturation = saturation_percent / 100.0;
        let lightness = lightness_percent / 100.0;
        let amplitude = saturation * lightness.min(1.0 - lightness);

        let channel = |n: f64| -> u8 {
            let k = (n + hue / 30.0) % 12.0;
            let level = lightness - amplitude * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
            (255.0 * level).round().clamp(0.0, 255.0) as u8
        };

        format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
    }
}
