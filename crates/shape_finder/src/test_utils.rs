//! Synthetic contours and scans shared by the unit tests.

use std::f64::consts::TAU;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::types::Contour;

pub const PAPER: Rgb<u8> = Rgb([245, 245, 245]);
pub const INK: Rgb<u8> = Rgb([20, 20, 30]);

/// `n` points on a circle, rounded to the pixel grid
pub fn circle_contour(cx: f64, cy: f64, r: f64, n: usize) -> Contour {
    ellipse_contour(cx, cy, r, r, n)
}

/// `n` points on an axis-aligned ellipse with semi-axes `a` (x) and `b` (y)
pub fn ellipse_contour(cx: f64, cy: f64, a: f64, b: f64, n: usize) -> Contour {
    let points = (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            [(cx + a * t.cos()).round() as i32, (cy + b * t.sin()).round() as i32]
        })
        .collect();
    Contour::new(points)
}

pub fn blank_scan(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, PAPER)
}

/// Solid ink disk
pub fn disk_scan(width: u32, height: u32, center: (i32, i32), radius: i32) -> DynamicImage {
    let mut scan = blank_scan(width, height);
    draw_filled_circle_mut(&mut scan, center, radius, INK);
    DynamicImage::ImageRgb8(scan)
}

/// Pen-drawn rings, `stroke` pixels wide, one per `(center, radius)`
pub fn ring_scan(width: u32, height: u32, rings: &[((i32, i32), i32)], stroke: i32) -> DynamicImage {
    let mut scan = blank_scan(width, height);
    for &(center, radius) in rings {
        draw_filled_circle_mut(&mut scan, center, radius, INK);
        draw_filled_circle_mut(&mut scan, center, radius - stroke, PAPER);
    }
    DynamicImage::ImageRgb8(scan)
}

/// Solid ink square
pub fn square_scan(width: u32, height: u32, origin: (i32, i32), side: u32) -> DynamicImage {
    let mut scan = blank_scan(width, height);
    draw_filled_rect_mut(&mut scan, Rect::at(origin.0, origin.1).of_size(side, side), INK);
    DynamicImage::ImageRgb8(scan)
}

/// Thin plus sign centered at `center`
pub fn plus_scan(width: u32, height: u32, center: (i32, i32), arm: u32, thickness: u32) -> DynamicImage {
    let mut scan = blank_scan(width, height);
    let (cx, cy) = center;
    let half_arm = arm as i32 / 2;
    let half_thick = thickness as i32 / 2;
    draw_filled_rect_mut(&mut scan, Rect::at(cx - half_arm, cy - half_thick).of_size(arm, thickness), INK);
    draw_filled_rect_mut(&mut scan, Rect::at(cx - half_thick, cy - half_arm).of_size(thickness, arm), INK);
    DynamicImage::ImageRgb8(scan)
}
