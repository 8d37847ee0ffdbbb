//! 基于目录的立绘资源目录
//!
//! 目录下每个文件以两种名字登记：文件名（不含扩展名）以及
//! 相对路径（不含扩展名，`/` 分隔）。

use std::collections::HashSet;
use std::path::Path;

use novel_stage::AssetCatalog;
use tracing::debug;
use walkdir::WalkDir;

/// 目录资源
#[derive(Debug, Clone, Default)]
pub struct DirectoryCatalog {
    names: HashSet<String>,
}

impl DirectoryCatalog {
    /// 扫描目录
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, walkdir::Error> {
        let dir = dir.as_ref();
        let mut names = HashSet::new();

        for entry in WalkDir::new(dir) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if let Some(stem) = path.file_stem() {
                names.insert(stem.to_string_lossy().into_owned());
            }
            if let Ok(relative) = path.strip_prefix(dir) {
                let relative = relative
                    .with_extension("")
                    .to_string_lossy()
                    .replace('\\', "/");
                names.insert(relative);
            }
        }

        debug!(dir = %dir.display(), count = names.len(), "立绘目录扫描完成");
        Ok(Self { names })
    }

    /// 登记的名字数量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AssetCatalog for DirectoryCatalog {
    fn contains(&self, image: &str) -> bool {
        self.names.contains(image)
    }
}
