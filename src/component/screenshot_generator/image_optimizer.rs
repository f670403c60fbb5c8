use crate::error::ToolInvocationError;
use image::ImageEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use log::debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 就地最佳化影像檔，內容必須維持不失真
pub trait ImageOptimizer: Send + Sync {
    fn optimize(&self, path: &Path) -> Result<(), ToolInvocationError>;
}

/// 以最高壓縮等級重新編碼 PNG
#[derive(Debug, Clone, Copy, Default)]
pub struct PngOptimizer;

impl PngOptimizer {
    fn recompress(path: &Path, temp_path: &Path) -> Result<(), ToolInvocationError> {
        let tool = "png-optimizer";
        let img = image::open(path).map_err(|e| ToolInvocationError::new(tool, path, e))?;

        let file = File::create(temp_path).map_err(|e| ToolInvocationError::new(tool, temp_path, e))?;
        let mut writer = BufWriter::new(file);
        let encoder =
            PngEncoder::new_with_quality(&mut writer, CompressionType::Best, FilterType::Adaptive);
        encoder
            .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
            .map_err(|e| ToolInvocationError::new(tool, path, e))?;
        writer
            .flush()
            .map_err(|e| ToolInvocationError::new(tool, temp_path, e))?;
        drop(writer);

        fs::rename(temp_path, path).map_err(|e| ToolInvocationError::new(tool, path, e))
    }
}

impl ImageOptimizer for PngOptimizer {
    fn optimize(&self, path: &Path) -> Result<(), ToolInvocationError> {
        let temp_path = path.with_extension("png.tmp");
        let before = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let result = Self::recompress(path, &temp_path);
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        } else {
            let after = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            debug!("最佳化 {}: {before} -> {after} bytes", path.display());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_optimize_preserves_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shot.png");
        let img = RgbImage::from_fn(32, 16, |x, y| Rgb([(x * 8) as u8, (y * 16) as u8, 128]));
        img.save(&path).unwrap();

        PngOptimizer.optimize(&path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, img);
        assert!(!path.with_extension("png.tmp").exists());
    }

    #[test]
    fn test_optimize_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();

        let err = PngOptimizer.optimize(&path).unwrap_err();
        assert_eq!(err.tool, "png-optimizer");
        assert_eq!(fs::read(&path).unwrap(), b"not a png");
        assert!(!path.with_extension("png.tmp").exists());
    }
}
