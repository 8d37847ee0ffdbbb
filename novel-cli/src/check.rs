//! # Check 模块
//!
//! 脚本静态检查：解析警告、跳转目标、立绘引用。

use std::io::Write;
use std::path::{Path, PathBuf};

use novel_runtime::{
    Diagnostic, DiagnosticResult, Parser, analyze_program, extract_image_references,
};
use novel_stage::AssetCatalog;
use walkdir::WalkDir;

use crate::config::SCRIPT_EXTENSION;

/// 检查结果
#[derive(Debug, Default)]
pub struct CheckReport {
    /// 检查的脚本数量
    pub scripts_checked: usize,
    /// 诊断结果
    pub diagnostics: DiagnosticResult,
}

impl CheckReport {
    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// 收集要检查的脚本：单个文件，或目录下所有 `.txt`
pub fn collect_script_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("路径不存在: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == SCRIPT_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// 检查一组脚本
///
/// `catalog` 为 None 时跳过立绘检查。
pub fn check_files(files: &[PathBuf], catalog: Option<&dyn AssetCatalog>) -> CheckReport {
    let mut report = CheckReport::default();
    for file in files {
        report.scripts_checked += 1;
        let id = file.display().to_string();
        match std::fs::read_to_string(file) {
            Ok(text) => report.diagnostics.merge(check_source(&id, &text, catalog)),
            Err(e) => report
                .diagnostics
                .push(Diagnostic::error(&id, "无法读取文件").with_detail(e.to_string())),
        }
    }
    report
}

/// 检查单个脚本文本
pub fn check_source(
    program_id: &str,
    text: &str,
    catalog: Option<&dyn AssetCatalog>,
) -> DiagnosticResult {
    let mut parser = Parser::new();
    let program = parser.parse(program_id, text);

    let mut result = DiagnosticResult::new();
    for warning in parser.warnings() {
        result.push(Diagnostic::warn(program_id, warning.clone()));
    }
    result.merge(analyze_program(&program));

    if let Some(catalog) = catalog {
        for reference in extract_image_references(&program) {
            if !catalog.contains(&reference.image) {
                result.push(
                    Diagnostic::error(program_id, format!("立绘不存在: {}", reference.image))
                        .with_line(reference.line)
                        .with_detail(format!("[{}] 引用的立绘在立绘目录中找不到", reference.kind)),
                );
            }
        }
    }

    result
}

/// 输出检查结果
pub fn print_report<W: Write>(report: &CheckReport, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "检查完成: {} 个脚本", report.scripts_checked)?;

    for diag in &report.diagnostics.diagnostics {
        writeln!(out, "{}", diag)?;
    }

    let error_count = report.diagnostics.error_count();
    let warn_count = report.diagnostics.warn_count();
    if error_count > 0 {
        writeln!(out, "❌ {} 个错误, {} 个警告", error_count, warn_count)?;
    } else if warn_count > 0 {
        writeln!(out, "⚠️  0 个错误, {} 个警告", warn_count)?;
    } else {
        writeln!(out, "✅ 检查通过，无错误")?;
    }
    Ok(())
}
