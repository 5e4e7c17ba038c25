//! Thumbnail compositing for the file browser
//!
//! Three card styles:
//! - publish card: thumbnail centered on a transparent 512x400 canvas
//! - folder card: thumbnail inlaid into a 512x400 folder graphic
//! - user publish: 75x75 thumbnail with the author's avatar in the corner
//!
//! Images with a zero dimension count as "no image" and are skipped, the
//! canvas is still returned.

use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

/// Card canvas size
pub const CANVAS_WIDTH: u32 = 512;
pub const CANVAS_HEIGHT: u32 = 400;
/// Rounded corner radius of inlaid thumbnails
pub const CORNER_RADIUS: u32 = 10;

/// Largest thumbnail fitting inside the folder graphic
pub const FOLDER_THUMB_WIDTH: u32 = 460;
pub const FOLDER_THUMB_HEIGHT: u32 = 280;
/// Pushes the inlay below center to sit inside the folder body
pub const FOLDER_INLAY_DROP: i64 = 30;

pub const USER_THUMB_SIZE: u32 = 75;
pub const USER_BADGE_SIZE: u32 = 30;
pub const USER_BADGE_OFFSET: i64 = 42;

/// How a scaled image relates to its target box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectMode {
    /// Largest size fitting inside the box
    Fit,
    /// Smallest size covering the box
    Cover,
}

/// Size of `(w, h)` scaled into `(tw, th)` keeping the aspect ratio
pub fn scaled_size(w: u32, h: u32, tw: u32, th: u32, mode: AspectMode) -> (u32, u32) {
    if w == 0 || h == 0 {
        return (0, 0);
    }
    let rw = u64::from(th) * u64::from(w) / u64::from(h);
    let use_height = match mode {
        AspectMode::Fit => rw <= u64::from(tw),
        AspectMode::Cover => rw >= u64::from(tw),
    };
    let (sw, sh) = if use_height {
        (rw, u64::from(th))
    } else {
        (u64::from(tw), u64::from(tw) * u64::from(h) / u64::from(w))
    };
    let clamp = |v: u64| v.clamp(1, u64::from(u32::MAX)) as u32;
    (clamp(sw), clamp(sh))
}

fn is_empty(img: &RgbaImage) -> bool {
    img.width() == 0 || img.height() == 0
}

fn scale(img: &RgbaImage, tw: u32, th: u32, mode: AspectMode) -> RgbaImage {
    let (w, h) = scaled_size(img.width(), img.height(), tw, th, mode);
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    imageops::resize(img, w, h, FilterType::CatmullRom)
}

/// Alpha-over `src` onto `canvas` inside a (rounded) rectangle.
///
/// The rectangle starts at `origin` on the canvas and shows `src` from its
/// top-left corner; pixels outside either image are clipped.
fn paint(canvas: &mut RgbaImage, src: &RgbaImage, origin: (i64, i64), size: (u32, u32), radius: u32) {
    let (w, h) = size;
    for y in 0..h.min(src.height()) {
        let cy = origin.1 + i64::from(y);
        if cy < 0 || cy >= i64::from(canvas.height()) {
            continue;
        }
        for x in 0..w.min(src.width()) {
            let cx = origin.0 + i64::from(x);
            if cx < 0 || cx >= i64::from(canvas.width()) {
                continue;
            }
            if !inside_rounded(x, y, w, h, radius) {
                continue;
            }
            canvas
                .get_pixel_mut(cx as u32, cy as u32)
                .blend(src.get_pixel(x, y));
        }
    }
}

/// Pixel-center test against a `w`x`h` rectangle with corner radius `r`
fn inside_rounded(x: u32, y: u32, w: u32, h: u32, r: u32) -> bool {
    let r = r.min(w / 2).min(h / 2);
    if r == 0 {
        return true;
    }
    let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
    let (wf, hf, rf) = (f64::from(w), f64::from(h), f64::from(r));
    let cx = if px < rf {
        rf
    } else if px > wf - rf {
        wf - rf
    } else {
        return true;
    };
    let cy = if py < rf {
        rf
    } else if py > hf - rf {
        hf - rf
    } else {
        return true;
    };
    (px - cx).powi(2) + (py - cy).powi(2) <= rf * rf
}

/// Rounded inlay of `thumb` centered on a canvas-sized area, nudged down by `drop`
fn inlay(canvas: &mut RgbaImage, thumb: &RgbaImage, max: (u32, u32), drop: i64) {
    if is_empty(thumb) {
        return;
    }
    let scaled = scale(thumb, max.0, max.1, AspectMode::Fit);

    let width_difference = i64::from(CANVAS_WIDTH) - i64::from(scaled.width());
    let height_difference = i64::from(CANVAS_HEIGHT) - i64::from(scaled.height());
    let half_radius = i64::from(CORNER_RADIUS / 2);
    let origin = (
        width_difference.div_euclid(2) + half_radius,
        height_difference.div_euclid(2) + half_radius + drop,
    );
    let size = (
        scaled.width().saturating_sub(CORNER_RADIUS),
        scaled.height().saturating_sub(CORNER_RADIUS),
    );

    paint(canvas, &scaled, origin, size, CORNER_RADIUS);
}

/// 512x400 transparent card with `thumb` centered as a rounded inlay
pub fn publish_thumbnail(thumb: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    inlay(&mut canvas, thumb, (CANVAS_WIDTH, CANVAS_HEIGHT), 0);
    canvas
}

/// Folder graphic with `thumb` inlaid into its body.
///
/// `folder` is expected to be the 512x400 folder artwork; placement is
/// computed against that size.
pub fn folder_thumbnail(folder: &RgbaImage, thumb: &RgbaImage) -> RgbaImage {
    let mut canvas = folder.clone();
    inlay(
        &mut canvas,
        thumb,
        (FOLDER_THUMB_WIDTH, FOLDER_THUMB_HEIGHT),
        FOLDER_INLAY_DROP,
    );
    canvas
}

/// 75x75 square of `publish` with an optional `user` avatar badge
pub fn user_publish_thumbnail(publish: &RgbaImage, user: Option<&RgbaImage>) -> RgbaImage {
    let mut canvas = RgbaImage::new(USER_THUMB_SIZE, USER_THUMB_SIZE);

    if !is_empty(publish) {
        let scaled = scale(publish, USER_THUMB_SIZE, USER_THUMB_SIZE, AspectMode::Cover);
        paint(&mut canvas, &scaled, (0, 0), (USER_THUMB_SIZE, USER_THUMB_SIZE), 0);
    }

    if let Some(user) = user.filter(|u| !is_empty(u)) {
        let scaled = scale(user, USER_BADGE_SIZE, USER_BADGE_SIZE, AspectMode::Cover);
        paint(
            &mut canvas,
            &scaled,
            (USER_BADGE_OFFSET, USER_BADGE_OFFSET),
            (USER_BADGE_SIZE, USER_BADGE_SIZE),
            0,
        );
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(w: u32, h: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(w, h, color)
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(1920, 1080, 512, 400, AspectMode::Fit), (512, 288));
        assert_eq!(scaled_size(1080, 1920, 512, 400, AspectMode::Fit), (225, 400));
        assert_eq!(scaled_size(1920, 1080, 75, 75, AspectMode::Cover), (133, 75));
        assert_eq!(scaled_size(1080, 1920, 75, 75, AspectMode::Cover), (75, 133));
        assert_eq!(scaled_size(0, 10, 75, 75, AspectMode::Cover), (0, 0));
    }

    #[test]
    fn test_publish_thumbnail_centered() {
        // 1024x576 fits as 512x288 -> inlay 502x278 at (5, 61)
        let card = publish_thumbnail(&solid(1024, 576, RED));
        assert_eq!(card.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));

        assert_eq!(card.get_pixel(256, 200), &RED);
        assert_eq!(card.get_pixel(4, 200)[3], 0);
        assert_eq!(card.get_pixel(5, 200), &RED);
        assert_eq!(card.get_pixel(506, 200), &RED);
        assert_eq!(card.get_pixel(507, 200)[3], 0);
        assert_eq!(card.get_pixel(256, 60)[3], 0);
        assert_eq!(card.get_pixel(256, 61), &RED);
        assert_eq!(card.get_pixel(256, 338), &RED);
        assert_eq!(card.get_pixel(256, 339)[3], 0);
        // Rounded corner leaves the very corner transparent
        assert_eq!(card.get_pixel(5, 61)[3], 0);
    }

    #[test]
    fn test_publish_thumbnail_empty_input() {
        let card = publish_thumbnail(&RgbaImage::new(0, 0));
        assert_eq!(card.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(card.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_folder_thumbnail_drop() {
        let folder = solid(CANVAS_WIDTH, CANVAS_HEIGHT, BLUE);
        // 920x560 fits 460x280 -> inlay 450x270 at (31, 95)
        let card = folder_thumbnail(&folder, &solid(920, 560, RED));
        assert_eq!(card.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert_eq!(card.get_pixel(256, 94), &BLUE);
        assert_eq!(card.get_pixel(256, 95), &RED);
        assert_eq!(card.get_pixel(256, 364), &RED);
        assert_eq!(card.get_pixel(256, 365), &BLUE);
        assert_eq!(card.get_pixel(30, 200), &BLUE);
        assert_eq!(card.get_pixel(31, 200), &RED);
    }

    #[test]
    fn test_folder_without_thumb_is_untouched() {
        let folder = solid(CANVAS_WIDTH, CANVAS_HEIGHT, BLUE);
        assert_eq!(folder_thumbnail(&folder, &RgbaImage::new(0, 0)), folder);
    }

    #[test]
    fn test_user_publish_thumbnail() {
        let card = user_publish_thumbnail(&solid(200, 100, RED), Some(&solid(64, 64, BLUE)));
        assert_eq!(card.dimensions(), (USER_THUMB_SIZE, USER_THUMB_SIZE));
        assert_eq!(card.get_pixel(0, 0), &RED);
        assert_eq!(card.get_pixel(41, 41), &RED);
        assert_eq!(card.get_pixel(42, 42), &BLUE);
        assert_eq!(card.get_pixel(71, 71), &BLUE);
        assert_eq!(card.get_pixel(74, 74), &RED);
    }

    #[test]
    fn test_user_publish_without_images() {
        let card = user_publish_thumbnail(&RgbaImage::new(0, 0), None);
        assert!(card.pixels().all(|p| p[3] == 0));

        let card = user_publish_thumbnail(&RgbaImage::new(0, 0), Some(&solid(30, 30, BLUE)));
        assert_eq!(card.get_pixel(10, 10)[3], 0);
        assert_eq!(card.get_pixel(50, 50), &BLUE);
    }

    #[test]
    fn test_translucent_blend() {
        let mut canvas = solid(4, 4, Rgba([0, 0, 255, 255]));
        paint(&mut canvas, &solid(4, 4, Rgba([255, 0, 0, 0])), (0, 0), (4, 4), 0);
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
    }
}
