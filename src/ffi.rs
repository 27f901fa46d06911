//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using docx2pdf from other
//! languages such as C#, Python, and Node.js.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::render::JsonFormat;
use crate::{convert_file, convert_with_options, parse_file_with_options, ConvertOptions, ParseOptions};

/// String result returned by FFI functions.
#[repr(C)]
pub struct Docx2PdfStringResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Freed by `docx2pdf_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Freed by `docx2pdf_free_result`.
    pub error: *mut c_char,
}

impl Docx2PdfStringResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

/// Binary result returned by FFI functions that produce PDF bytes.
#[repr(C)]
pub struct Docx2PdfBytesResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The PDF bytes (null if failed). Freed by `docx2pdf_free_bytes`.
    pub data: *mut u8,
    /// Length of `data` in bytes.
    pub len: usize,
    /// Error message (null if succeeded). Freed by `docx2pdf_free_bytes`.
    pub error: *mut c_char,
}

impl Docx2PdfBytesResult {
    fn success(data: Vec<u8>) -> Self {
        let len = data.len();
        let data = Box::into_raw(data.into_boxed_slice()) as *mut u8;
        Self {
            success: true,
            data,
            len,
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            len: 0,
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

unsafe fn path_arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{} cannot be null", what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {}", what.to_lowercase()))
}

/// Convert DOCX bytes to PDF bytes.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `docx2pdf_free_bytes`.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_convert_bytes(data: *const u8, len: usize) -> Docx2PdfBytesResult {
    if data.is_null() {
        return Docx2PdfBytesResult::error("Data cannot be null".to_string());
    }

    let input = std::slice::from_raw_parts(data, len);
    match convert_with_options(input, &ConvertOptions::default()) {
        Ok(result) => Docx2PdfBytesResult::success(result.content),
        Err(e) => Docx2PdfBytesResult::error(e.to_string()),
    }
}

/// Convert a DOCX file and write the PDF to `output`.
///
/// On success `data` holds the layout statistics as JSON.
///
/// # Safety
///
/// `input` and `output` must be valid null-terminated UTF-8 strings.
/// The returned result must be freed with `docx2pdf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_convert_file(
    input: *const c_char,
    output: *const c_char,
) -> Docx2PdfStringResult {
    let input = match path_arg(input, "Input path") {
        Ok(s) => s,
        Err(e) => return Docx2PdfStringResult::error(e),
    };
    let output = match path_arg(output, "Output path") {
        Ok(s) => s,
        Err(e) => return Docx2PdfStringResult::error(e),
    };

    match convert_file(input, output) {
        Ok(stats) => Docx2PdfStringResult::success(
            serde_json::to_string(&stats).unwrap_or_else(|_| "{}".to_string()),
        ),
        Err(e) => Docx2PdfStringResult::error(e.to_string()),
    }
}

/// Extract plain text from a DOCX file.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `docx2pdf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_to_text(path: *const c_char) -> Docx2PdfStringResult {
    let path = match path_arg(path, "Path") {
        Ok(s) => s,
        Err(e) => return Docx2PdfStringResult::error(e),
    };

    match crate::extract_text(path) {
        Ok(text) => Docx2PdfStringResult::success(text),
        Err(e) => Docx2PdfStringResult::error(e.to_string()),
    }
}

/// Convert a DOCX file to a JSON document tree.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `docx2pdf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_to_json(path: *const c_char, pretty: bool) -> Docx2PdfStringResult {
    let path = match path_arg(path, "Path") {
        Ok(s) => s,
        Err(e) => return Docx2PdfStringResult::error(e),
    };

    let format = if pretty {
        JsonFormat::Pretty
    } else {
        JsonFormat::Compact
    };

    match crate::to_json(path, format) {
        Ok(json) => Docx2PdfStringResult::success(json),
        Err(e) => Docx2PdfStringResult::error(e.to_string()),
    }
}

/// Get document information as JSON.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `docx2pdf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_get_info(path: *const c_char) -> Docx2PdfStringResult {
    let path = match path_arg(path, "Path") {
        Ok(s) => s,
        Err(e) => return Docx2PdfStringResult::error(e),
    };

    match get_info_internal(Path::new(path)) {
        Ok(info) => Docx2PdfStringResult::success(info),
        Err(e) => Docx2PdfStringResult::error(e.to_string()),
    }
}

fn get_info_internal(path: &Path) -> crate::Result<String> {
    let parsed = parse_file_with_options(path, ParseOptions::new())?;
    let doc = &parsed.document;
    let info = serde_json::json!({
        "title": doc.metadata.title,
        "author": doc.metadata.author,
        "subject": doc.metadata.subject,
        "keywords": doc.metadata.keywords,
        "created": doc.metadata.created.map(|d| d.to_rfc3339()),
        "modified": doc.metadata.modified.map(|d| d.to_rfc3339()),
        "paragraphs": doc.paragraphs().count(),
        "tables": doc.tables().count(),
        "images": doc.images().count(),
        "media_entries": parsed.media.len(),
    });
    serde_json::to_string_pretty(&info)
        .map_err(|e| crate::Error::Render(format!("JSON serialization error: {}", e)))
}

/// Check if a file looks like a DOCX package.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_is_docx(path: *const c_char) -> bool {
    match path_arg(path, "Path") {
        Ok(path) => matches!(
            crate::detect::detect_format_from_path(Path::new(path)),
            Ok(crate::PackageFormat::Docx)
        ),
        Err(_) => false,
    }
}

/// Free a string result.
///
/// # Safety
///
/// The `result` must have been returned by a docx2pdf function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_free_result(result: Docx2PdfStringResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a bytes result.
///
/// # Safety
///
/// The `result` must have been returned by `docx2pdf_convert_bytes`.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn docx2pdf_free_bytes(result: Docx2PdfBytesResult) {
    if !result.data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(result.data, result.len)));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Get the version of the docx2pdf library.
///
/// The returned string is statically allocated and must not be freed.
#[no_mangle]
pub extern "C" fn docx2pdf_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = docx2pdf_version();
        assert!(!version.is_null());
        let text = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(text, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_null_path() {
        unsafe {
            let result = docx2pdf_to_text(ptr::null());
            assert!(!result.success);
            assert!(!result.error.is_null());
            docx2pdf_free_result(result);
        }
    }

    #[test]
    fn test_convert_invalid_bytes() {
        let data = b"not a docx";
        unsafe {
            let result = docx2pdf_convert_bytes(data.as_ptr(), data.len());
            assert!(!result.success);
            assert!(result.data.is_null());
            docx2pdf_free_bytes(result);
        }
    }

    #[test]
    fn test_convert_bytes() {
        let data = crate::container::tests::build_zip(&[(
            crate::container::DOCUMENT_PART,
            br#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>ffi</w:t></w:r></w:p></w:body></w:document>"#,
        )]);
        unsafe {
            let result = docx2pdf_convert_bytes(data.as_ptr(), data.len());
            assert!(result.success);
            let pdf = std::slice::from_raw_parts(result.data, result.len);
            assert!(pdf.starts_with(b"%PDF-"));
            docx2pdf_free_bytes(result);
        }
    }

    #[test]
    fn test_is_docx_null() {
        unsafe {
            assert!(!docx2pdf_is_docx(ptr::null()));
        }
    }
}
