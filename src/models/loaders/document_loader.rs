use crate::error::{AppResult, DocumentError};
use crate::models::page::Page;
use std::path::Path;
use tokio::fs;

/// 纯文本文件中的分页符
const FORM_FEED: char = '\u{000C}';

/// 从文档中加载页面
///
/// - `.pdf` 按页提取文本
/// - `.txt` / `.md` 按分页符切分，没有分页符时整个文件视为一页
///
/// 空白页会被过滤掉（保留原始页码），然后截取前 `limit` 页。
pub async fn load_pages(path: &Path, limit: usize) -> AppResult<Vec<Page>> {
    let display = path.display().to_string();

    if !fs::try_exists(path).await? {
        return Err(DocumentError::NotFound { path: display }.into());
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    let raw_pages = match extension.as_deref() {
        Some("pdf") => {
            let bytes = fs::read(path).await?;
            extract_pdf_pages(bytes, &display).await?
        }
        Some("txt") | Some("md") => {
            let content = fs::read_to_string(path).await?;
            split_text_pages(&content)
        }
        _ => return Err(DocumentError::UnsupportedFormat { path: display }.into()),
    };

    let total = raw_pages.len();
    let pages = select_text_pages(raw_pages, limit);

    if pages.is_empty() {
        return Err(DocumentError::NoTextPages { path: display }.into());
    }

    tracing::info!(
        "成功加载 {} 页文本 (文档共 {} 页, 上限 {} 页)",
        pages.len(),
        total,
        limit
    );

    Ok(pages)
}

/// 在阻塞线程中解析 PDF
async fn extract_pdf_pages(bytes: Vec<u8>, path: &str) -> AppResult<Vec<String>> {
    let path_owned = path.to_string();
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocumentError::PdfParsing {
                path: path_owned,
                message: e.to_string(),
            }
        })
    })
    .await??;

    Ok(pages)
}

/// 按分页符切分纯文本
fn split_text_pages(content: &str) -> Vec<String> {
    content.split(FORM_FEED).map(str::to_string).collect()
}

/// 过滤空白页并截取前 `limit` 页，页码从1开始
fn select_text_pages(raw_pages: Vec<String>, limit: usize) -> Vec<Page> {
    raw_pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .take(limit)
        .map(|(index, text)| Page::new(index + 1, text))
        .collect()
}
