use crate::error::{PharmError, Result};

/// PDF 바이트에서 텍스트 레이어를 추출한다
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PharmError::PdfExtraction(e.to_string()))?;
    tracing::debug!(chars = text.chars().count(), "PDF 텍스트 추출 완료");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_pdf() {
        let result = extract_pdf_text(b"hello");
        assert!(matches!(result, Err(PharmError::PdfExtraction(_))));
    }
}
