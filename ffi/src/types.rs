//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointer + length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use countries_core::error::ApiError;
use countries_core::http::HttpMethod;
use countries_core::pipeline::Section;
use countries_core::storage::KeyValueStore;
use countries_core::{
    CountriesClient, CountryDetail, CountryDirectory, CountryRow, LoadStatus, Palette, Theme,
    ThemeStore,
};

/// Opaque handle to a `CountriesClient`.
pub struct FfiCountriesClient {
    pub(crate) inner: CountriesClient,
}

/// Opaque handle to a `CountryDirectory`.
pub struct FfiCountryDirectory {
    pub(crate) inner: CountryDirectory,
}

/// Opaque handle to a `ThemeStore` over a host-chosen backend.
pub struct FfiThemeStore {
    pub(crate) inner: ThemeStore<Box<dyn KeyValueStore>>,
}

/// Convert an owned string into a heap C string. Interior NULs, which C
/// cannot represent, are dropped.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a C string produced by `to_c_string`. Null is ignored.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak a `Vec` as a pointer + length pair. Empty vectors become null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let boxed = items.into_boxed_slice();
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a pointer + length pair produced by `into_raw_parts`.
unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `countries_build_*` functions. The host executes the request and
/// passes the response back through the matching parse/complete function.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: countries_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: to_c_string(k),
                value: to_c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: to_c_string(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), to_c_string),
        }))
    }

    /// Release a request created by `from_core`.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.path);
            free_c_string(req.body);
            for h in from_raw_parts(req.headers, req.headers_len) {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host builds this on the stack after executing a request. The FFI
/// layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// View-model types
// ---------------------------------------------------------------------------

/// One list row.
#[repr(C)]
pub struct FfiCountryRow {
    pub title: *mut c_char,
    pub subtitle: *mut c_char,
    pub flag_url: *mut c_char,
    pub detail_key: *mut c_char,
}

impl From<CountryRow> for FfiCountryRow {
    fn from(row: CountryRow) -> Self {
        Self {
            title: to_c_string(row.title),
            subtitle: to_c_string(row.subtitle),
            flag_url: to_c_string(row.flag_url),
            detail_key: to_c_string(row.detail_key),
        }
    }
}

impl FfiCountryRow {
    unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.title);
            free_c_string(self.subtitle);
            free_c_string(self.flag_url);
            free_c_string(self.detail_key);
        }
    }
}

/// A lettered section of rows.
#[repr(C)]
pub struct FfiSection {
    pub title: *mut c_char,
    pub rows: *mut FfiCountryRow,
    pub rows_len: u32,
}

/// All sections of the list screen. `len == 0` means "no results".
#[repr(C)]
pub struct FfiSectionList {
    pub sections: *mut FfiSection,
    pub len: u32,
}

impl FfiSectionList {
    pub(crate) fn from_core(sections: &[Section]) -> *mut Self {
        let sections: Vec<FfiSection> = sections
            .iter()
            .map(|s| {
                let rows: Vec<FfiCountryRow> = s
                    .data
                    .iter()
                    .map(|c| CountryRow::from(c).into())
                    .collect();
                let (rows, rows_len) = into_raw_parts(rows);
                FfiSection {
                    title: to_c_string(s.title.as_str()),
                    rows,
                    rows_len,
                }
            })
            .collect();
        let (sections, len) = into_raw_parts(sections);
        Box::into_raw(Box::new(FfiSectionList { sections, len }))
    }

    pub(crate) unsafe fn free(list: *mut Self) {
        let list = unsafe { Box::from_raw(list) };
        for section in unsafe { from_raw_parts(list.sections, list.len) } {
            unsafe {
                free_c_string(section.title);
                for row in from_raw_parts(section.rows, section.rows_len) {
                    row.free_fields();
                }
            }
        }
    }
}

/// A list of C strings, e.g. the continent filter options.
#[repr(C)]
pub struct FfiStringList {
    pub items: *mut *mut c_char,
    pub len: u32,
}

impl FfiStringList {
    pub(crate) fn from_core(items: &[String]) -> *mut Self {
        let items: Vec<*mut c_char> = items.iter().map(|s| to_c_string(s.as_str())).collect();
        let (items, len) = into_raw_parts(items);
        Box::into_raw(Box::new(FfiStringList { items, len }))
    }

    pub(crate) unsafe fn free(list: *mut Self) {
        let list = unsafe { Box::from_raw(list) };
        for item in unsafe { from_raw_parts(list.items, list.len) } {
            unsafe { free_c_string(item) };
        }
    }
}

/// Formatted detail screen. Empty strings mean "unknown".
#[repr(C)]
pub struct FfiCountryDetail {
    pub common_name: *mut c_char,
    pub flag_url: *mut c_char,
    pub population: *mut c_char,
    pub region: *mut c_char,
    pub capital: *mut c_char,
    pub languages: *mut c_char,
    pub currencies: *mut c_char,
    pub independent: *mut c_char,
    pub area: *mut c_char,
    pub gini: *mut c_char,
    pub timezones: *mut c_char,
    pub numeric_code: *mut c_char,
    pub driving_side: *mut c_char,
}

impl From<CountryDetail> for FfiCountryDetail {
    fn from(d: CountryDetail) -> Self {
        Self {
            common_name: to_c_string(d.common_name),
            flag_url: to_c_string(d.flag_url),
            population: to_c_string(d.population),
            region: to_c_string(d.region),
            capital: to_c_string(d.capital),
            languages: to_c_string(d.languages),
            currencies: to_c_string(d.currencies),
            independent: to_c_string(d.independent),
            area: to_c_string(d.area),
            gini: to_c_string(d.gini),
            timezones: to_c_string(d.timezones),
            numeric_code: to_c_string(d.numeric_code),
            driving_side: to_c_string(d.driving_side),
        }
    }
}

impl FfiCountryDetail {
    unsafe fn free_fields(&self) {
        for field in [
            self.common_name,
            self.flag_url,
            self.population,
            self.region,
            self.capital,
            self.languages,
            self.currencies,
            self.independent,
            self.area,
            self.gini,
            self.timezones,
            self.numeric_code,
            self.driving_side,
        ] {
            unsafe { free_c_string(field) };
        }
    }
}

// ---------------------------------------------------------------------------
// Theme types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTheme {
    Light = 0,
    Dark = 1,
}

impl From<Theme> for FfiTheme {
    fn from(t: Theme) -> Self {
        match t {
            Theme::Light => FfiTheme::Light,
            Theme::Dark => FfiTheme::Dark,
        }
    }
}

impl From<FfiTheme> for Theme {
    fn from(t: FfiTheme) -> Self {
        match t {
            FfiTheme::Light => Theme::Light,
            FfiTheme::Dark => Theme::Dark,
        }
    }
}

/// System colour scheme as reported by the host at startup.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiSystemScheme {
    Unspecified = 0,
    Light = 1,
    Dark = 2,
}

impl FfiSystemScheme {
    pub(crate) fn to_core(self) -> Option<Theme> {
        match self {
            FfiSystemScheme::Unspecified => None,
            FfiSystemScheme::Light => Some(Theme::Light),
            FfiSystemScheme::Dark => Some(Theme::Dark),
        }
    }
}

/// Theme change callback. `user_data` is passed back untouched.
pub type FfiThemeCallback = extern "C" fn(theme: FfiTheme, user_data: *mut c_void);

/// Host pointer carried into a subscriber closure.
pub(crate) struct UserData(pub(crate) *mut c_void);

impl UserData {
    pub(crate) fn get(&self) -> *mut c_void {
        self.0
    }
}

// The host promises the pointer is valid on whichever thread drives the
// theme store; the core never dereferences it.
unsafe impl Send for UserData {}

/// Theme colours as C strings.
#[repr(C)]
pub struct FfiPalette {
    pub background: *mut c_char,
    pub text: *mut c_char,
    pub secondary_text: *mut c_char,
    pub border: *mut c_char,
    pub divider: *mut c_char,
    pub input_background: *mut c_char,
    pub input_border: *mut c_char,
    pub icon: *mut c_char,
    pub accent: *mut c_char,
}

impl From<&Palette> for FfiPalette {
    fn from(p: &Palette) -> Self {
        Self {
            background: to_c_string(p.background),
            text: to_c_string(p.text),
            secondary_text: to_c_string(p.secondary_text),
            border: to_c_string(p.border),
            divider: to_c_string(p.divider),
            input_background: to_c_string(p.input_background),
            input_border: to_c_string(p.input_border),
            icon: to_c_string(p.icon),
            accent: to_c_string(p.accent),
        }
    }
}

impl FfiPalette {
    pub(crate) unsafe fn free(palette: *mut Self) {
        let p = unsafe { Box::from_raw(palette) };
        for field in [
            p.background,
            p.text,
            p.secondary_text,
            p.border,
            p.divider,
            p.input_background,
            p.input_border,
            p.icon,
            p.accent,
        ] {
            unsafe { free_c_string(field) };
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Load status of the list screen.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLoadStatus {
    Loading = 0,
    Ready = 1,
    Failed = 2,
}

impl From<&LoadStatus> for FfiLoadStatus {
    fn from(s: &LoadStatus) -> Self {
        match s {
            LoadStatus::Loading => FfiLoadStatus::Loading,
            LoadStatus::Ready => FfiLoadStatus::Ready,
            LoadStatus::Failed(_) => FfiLoadStatus::Failed,
        }
    }
}

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    FetchFailed = 4,
    Panic = 5,
    NullArg = 6,
    /// A load completion arrived for a superseded load and was ignored.
    Stale = 7,
}

/// Tag that tells `countries_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Detail = 1,
}

/// Result envelope for parse and load operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload tagged by `data_tag` (or is null for `None`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: Option<String>,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: error_message.map_or(std::ptr::null_mut(), to_c_string),
            http_status,
            data_tag,
            data,
        }))
    }

    pub(crate) fn ok_detail(detail: CountryDetail) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiCountryDetail::from(detail))) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, None, 0, FfiDataTag::Detail, data)
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            None,
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn from_error(err: &ApiError) -> *mut Self {
        let (code, status) = match err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::FetchFailed(_) => (FfiErrorCode::FetchFailed, 0),
        };
        Self::boxed(
            code,
            Some(err.to_string()),
            status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn stale() -> *mut Self {
        Self::boxed(
            FfiErrorCode::Stale,
            Some("load superseded".to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            Some(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            Some(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Detail => {
                let detail = unsafe { Box::from_raw(result.data as *mut FfiCountryDetail) };
                unsafe { detail.free_fields() };
            }
            FfiDataTag::None => {}
        }
    }
}
