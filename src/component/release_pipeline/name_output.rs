use crate::component::release_namer::expand_batch_template;
use crate::error::PipelineError;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 只產生名稱時寫出的側檔
pub const NAME_FILE: &str = "filename.txt";

/// 只產生名稱時的輸出方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameOutput {
    /// 在主要檔案旁寫出 `filename.txt`
    #[default]
    SideChannel,
    /// 將主要檔案就地改名為 `<名稱>.<副檔名>`
    Rename,
}

/// 依輸出方式寫出名稱，回傳寫出或改名後的路徑
pub fn write_name(output: NameOutput, main_file: &Path, name: &str) -> Result<PathBuf, PipelineError> {
    let parent = main_file.parent().unwrap_or_else(|| Path::new("."));

    match output {
        NameOutput::SideChannel => {
            let path = parent.join(NAME_FILE);
            fs::write(&path, name).map_err(|e| PipelineError::io(&path, e))?;
            info!("名稱已寫入: {}", path.display());
            Ok(path)
        }
        NameOutput::Rename => {
            // 檔名不能帶批次佔位符
            let stem = expand_batch_template(name).directory;
            let file_name = match main_file.extension() {
                Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
                None => stem,
            };
            let target = parent.join(file_name);

            if target == main_file {
                return Ok(target);
            }
            if target.exists() {
                return Err(PipelineError::io(
                    &target,
                    io::Error::new(io::ErrorKind::AlreadyExists, "目標檔案已存在"),
                ));
            }

            fs::rename(main_file, &target).map_err(|e| PipelineError::io(main_file, e))?;
            info!("已重新命名: {} -> {}", main_file.display(), target.display());
            Ok(target)
        }
    }
}
