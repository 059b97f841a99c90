//! Fixtures shared by the unit tests.

use crate::models::prediction_types::{AlternatePrediction, LocationRef, PredictionResult, Recyclable, VideoRef};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png_bytes() -> Vec<u8> {
    png_sized(4, 3)
}

pub fn png_sized(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 200, 30])));
    encode(&img, ImageFormat::Png)
}

pub fn result(id: &str, product: &str) -> PredictionResult {
    PredictionResult {
        id: id.to_string(),
        product: product.to_string(),
        probability: 0.873,
        description: format!("{} description", product),
        recyclable: Recyclable::Yes,
        tutorials: vec![
            VideoRef("https://www.youtube.com/watch?v=dQw4w9WgXcQ".into()),
            VideoRef("https://example.com/how-to-recycle".into()),
        ],
        disposal_locations: vec![LocationRef(
            "https://www.google.com/maps/place/Green+Depot/@51.5,-0.1,15z".into(),
        )],
        alternates: vec![
            AlternatePrediction {
                object: "Glass Bottle".into(),
                probability: 0.08,
            },
            AlternatePrediction {
                object: "Jar".into(),
                probability: 0.03,
            },
        ],
    }
}
