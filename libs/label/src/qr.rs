//! QR module matrix for the label.

use qrcode::{Color, EcLevel, QrCode};

use crate::LabelError;

/// A square grid of QR modules, without quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encodes `payload` verbatim at error-correction level M.
    pub fn encode(payload: &str) -> Result<Self, LabelError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(LabelError::Qr)?;

        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self {
            width: code.width(),
            dark,
        })
    }

    /// Number of modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Horizontal runs of dark modules in row `y`, as `(start, len)`.
    pub(crate) fn dark_runs(&self, y: usize) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut x = 0;
        while x < self.width {
            if self.is_dark(x, y) {
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                runs.push((start, x - start));
            } else {
                x += 1;
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rasterizes the matrix with a quiet zone and scans it back.
    fn scan(matrix: &QrMatrix) -> String {
        const QUIET: usize = 4;
        const SCALE: usize = 4;
        let side = (matrix.width() + 2 * QUIET) * SCALE;

        let mut img = rqrr::PreparedImage::prepare_from_greyscale(side, side, |x, y| {
            let mx = (x / SCALE).checked_sub(QUIET);
            let my = (y / SCALE).checked_sub(QUIET);
            match (mx, my) {
                (Some(mx), Some(my)) if matrix.is_dark(mx, my) => 0,
                _ => 255,
            }
        });

        let grids = img.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR code");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_scans_back_to_payload() {
        let matrix = QrMatrix::encode("oJZWV").unwrap();
        assert_eq!(scan(&matrix), "oJZWV");
    }

    #[test]
    fn test_payload_is_not_a_url() {
        let matrix = QrMatrix::encode("gB0NV05e").unwrap();
        let content = scan(&matrix);
        assert_eq!(content, "gB0NV05e");
        assert!(!content.contains('/'));
    }

    #[test]
    fn test_finder_pattern_corners_dark() {
        let matrix = QrMatrix::encode("abcde").unwrap();
        let last = matrix.width() - 1;
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(last, 0));
        assert!(matrix.is_dark(0, last));
    }

    #[test]
    fn test_out_of_range_is_light() {
        let matrix = QrMatrix::encode("abcde").unwrap();
        assert!(!matrix.is_dark(matrix.width(), 0));
    }

    #[test]
    fn test_dark_runs_cover_dark_modules() {
        let matrix = QrMatrix::encode("abcde").unwrap();
        for y in 0..matrix.width() {
            let covered: usize = matrix.dark_runs(y).iter().map(|(_, len)| len).sum();
            let dark = (0..matrix.width()).filter(|&x| matrix.is_dark(x, y)).count();
            assert_eq!(covered, dark);
        }
    }
}
