//! Rasterizing a colored grid into an 8-bit image.

use crate::color::{Rgb, RgbGrid};
use crate::{Error, Result};

/// Settings for rasterizing a colored Newton fractal.
#[derive(Default)]
pub struct NewtonRenderer {}

impl NewtonRenderer {
    /// Render the colored grid into an 8-bit image.
    ///
    /// Grid row 0 is the bottom of the sampled rectangle (`y_min`), so rows are flipped:
    /// the top of the image is `y_max`.
    pub fn render(&self, colors: &RgbGrid) -> Result<image::DynamicImage> {
        let size = colors.size();
        if colors.pixels().len() != size.area() {
            return Err(Error::InvalidParameter(format!(
                "data size != width * height: {} != {} * {}",
                colors.pixels().len(),
                size.width,
                size.height
            )));
        }
        let width = u32::try_from(size.width)
            .map_err(|_| Error::InvalidParameter(format!("width {} too large", size.width)))?;
        let height = u32::try_from(size.height)
            .map_err(|_| Error::InvalidParameter(format!("height {} too large", size.height)))?;

        let mut img = image::ImageBuffer::<image::Rgb<u8>, _>::new(width, height);
        img.rows_mut()
            .zip(colors.pixels().chunks(size.width.max(1)).rev())
            .for_each(|(row, values)| {
                row.zip(values).for_each(|(pixel, value)| {
                    *pixel = to_rgb8(value);
                })
            });

        Ok(img.into())
    }
}

fn to_rgb8(value: &Rgb) -> image::Rgb<u8> {
    image::Rgb(value.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Encode an image as PNG.
pub fn encode_png(image: &image::DynamicImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buffer = std::io::Cursor::new(Vec::<u8>::new());
    image.write_to(&mut buffer, image::ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}
