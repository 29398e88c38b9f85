use std::process::Stdio;

use tokio::process::Command;

use crate::utils::error::{MenuError, Result};

/// Converts PDF bytes to layout-preserving plain text by shelling out
/// to `pdftotext`. The column parsers depend on `-layout` keeping the
/// horizontal arrangement of the page.
pub async fn extract_text(pdf: &[u8], first_page_only: bool) -> Result<String> {
    let dir = tempfile::tempdir()?;
    let pdf_path = dir.path().join("menu.pdf");
    let txt_path = dir.path().join("menu.txt");
    tokio::fs::write(&pdf_path, pdf).await?;

    let mut command = Command::new("pdftotext");
    if first_page_only {
        command.args(["-l", "1"]);
    }
    let output = command
        .arg("-layout")
        .arg(&pdf_path)
        .arg(&txt_path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| MenuError::PdfExtract {
            message: format!("failed to run pdftotext: {e}"),
        })?;

    if !output.status.success() {
        return Err(MenuError::PdfExtract {
            message: format!(
                "pdftotext exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(tokio::fs::read_to_string(&txt_path).await?)
}
