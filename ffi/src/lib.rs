//! C-ABI wrapper around `countries-core`.
//!
//! # Overview
//! Exposes the country list, the detail lookup and the theme store through
//! `extern "C"` functions so a mobile host can drive the core from Swift,
//! Kotlin or plain C while keeping networking and UI on its own side.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `countries_build_*` produce requests; the host executes them and passes
//!   the response to the matching parse or `complete_load` function.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `countries_free_*` function to release them.
//! - Handles are not thread-safe; the host serializes access to each one.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use countries_core::http::HttpResponse;
use countries_core::storage::KeyValueStore;
use countries_core::theme::SubscriptionId;
use countries_core::{
    ApiError, CoreConfig, CountryDetail, CountryDirectory, JsonFileStore, LoadStatus, LoadToken,
    MemoryStore, Theme, ThemeStore,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use types::*;

/// Borrow a C string as `&str`. Invalid UTF-8 reads as empty.
unsafe fn str_arg<'a>(s: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` is an `EnvFilter` directive such as `"countries_core=debug"`.
/// When null, `COUNTRIES_LOG` or the default `"info"` is used. Returns false
/// if a subscriber is already installed.
#[unsafe(no_mangle)]
pub extern "C" fn countries_init_logging(filter: *const c_char) -> bool {
    catch_unwind(|| {
        let directive = if filter.is_null() {
            CoreConfig::default().with_env_overrides().log_filter
        } else {
            unsafe { str_arg(filter) }.to_string()
        };
        let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CountriesClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `countries_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_client_new(base_url: *const c_char) -> *mut FfiCountriesClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { str_arg(base_url) };
        let client = countries_core::CountriesClient::new(url);
        Box::into_raw(Box::new(FfiCountriesClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a TOML config file plus environment overrides.
///
/// `config_path` may be null or point to a missing file; both mean defaults.
/// Returns null if the file exists but cannot be read or parsed.
#[unsafe(no_mangle)]
pub extern "C" fn countries_client_from_config(
    config_path: *const c_char,
) -> *mut FfiCountriesClient {
    catch_unwind(|| {
        let config = if config_path.is_null() {
            Ok(CoreConfig::default())
        } else {
            CoreConfig::load(Path::new(unsafe { str_arg(config_path) }))
        };
        match config {
            Ok(config) => {
                let client = config.with_env_overrides().client();
                Box::into_raw(Box::new(FfiCountriesClient { inner: client }))
            }
            Err(e) => {
                warn!(error = %e, "failed to load config");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `countries_client_new` or
/// `countries_client_from_config`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_client_free(client: *mut FfiCountriesClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the request for the list screen.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `countries_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_build_list_countries(
    client: *const FfiCountriesClient,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_countries())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the detail lookup for a row's `detail_key`.
///
/// Returns null if `client` or `capital` is null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_build_country_by_capital(
    client: *const FfiCountriesClient,
    capital: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || capital.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let capital = unsafe { str_arg(capital) };
        FfiHttpRequest::from_core(client.inner.build_country_by_capital(capital))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { str_arg(resp.body) }.to_string()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse a capital lookup into the formatted detail screen.
///
/// Returns a result with `data_tag = Detail` on success.
#[unsafe(no_mangle)]
pub extern "C" fn countries_parse_country_by_capital(
    client: *const FfiCountriesClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_country_by_capital(core_resp) {
            Ok(country) => FfiResult::ok_detail(CountryDetail::from(&country)),
            Err(e) => FfiResult::from_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in countries_parse_country_by_capital"))
}

// ---------------------------------------------------------------------------
// Directory (list screen)
// ---------------------------------------------------------------------------

/// Create an empty directory in the `Loading` state.
/// The caller must free it with `countries_directory_free`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_new() -> *mut FfiCountryDirectory {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiCountryDirectory {
            inner: CountryDirectory::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a directory. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_free(dir: *mut FfiCountryDirectory) {
    if !dir.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(dir) });
        }));
    }
}

/// Start a load. The returned token must accompany its completion; `0`
/// means `dir` was null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_begin_load(dir: *mut FfiCountryDirectory) -> u64 {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return 0;
        }
        unsafe { &mut *dir }.inner.begin_load().as_raw()
    }))
    .unwrap_or(0)
}

/// Parse a list response and apply it to the directory.
///
/// Returns `Ok` with `data_tag = None` when the list was applied, `Stale`
/// when a newer load superseded `token`, or the parse error, which also
/// moves the directory to the `Failed` state.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_complete_load(
    dir: *mut FfiCountryDirectory,
    client: *const FfiCountriesClient,
    token: u64,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return FfiResult::null_arg("dir");
        }
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let dir = unsafe { &mut *dir };
        let client = unsafe { &*client };
        let outcome = client
            .inner
            .parse_list_countries(ffi_response_to_core(unsafe { &*response }));
        let failure = outcome.as_ref().err().cloned();
        if !dir.inner.complete_load(LoadToken::from_raw(token), outcome) {
            return FfiResult::stale();
        }
        match failure {
            None => FfiResult::ok_empty(),
            Some(e) => FfiResult::from_error(&e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in countries_directory_complete_load"))
}

/// Report a transport failure for the load identified by `token`.
///
/// Returns false if `dir` is null or the token is stale.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_fail_load(
    dir: *mut FfiCountryDirectory,
    token: u64,
    message: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return false;
        }
        let message = if message.is_null() {
            String::new()
        } else {
            unsafe { str_arg(message) }.to_string()
        };
        unsafe { &mut *dir }
            .inner
            .complete_load(LoadToken::from_raw(token), Err(ApiError::FetchFailed(message)))
    }))
    .unwrap_or(false)
}

/// Drop loaded data and filters, as when the list screen unmounts.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_reset(dir: *mut FfiCountryDirectory) {
    if !dir.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            unsafe { &mut *dir }.inner.reset();
        }));
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_status(dir: *const FfiCountryDirectory) -> FfiLoadStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return FfiLoadStatus::Loading;
        }
        FfiLoadStatus::from(unsafe { &*dir }.inner.status())
    }))
    .unwrap_or(FfiLoadStatus::Loading)
}

/// Message of the failed load, or null unless the status is `Failed`.
/// Free with `countries_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_error_message(dir: *const FfiCountryDirectory) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return std::ptr::null_mut();
        }
        match unsafe { &*dir }.inner.status() {
            LoadStatus::Failed(e) => to_c_string(e.to_string()),
            _ => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Set the search box text. Null clears the search.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_set_search_text(
    dir: *mut FfiCountryDirectory,
    text: *const c_char,
) {
    if dir.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let text = if text.is_null() {
            ""
        } else {
            unsafe { str_arg(text) }
        };
        unsafe { &mut *dir }.inner.set_search_text(text);
    }));
}

/// Select a continent chip. Null selects `"All"`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_select_continent(
    dir: *mut FfiCountryDirectory,
    continent: *const c_char,
) {
    if dir.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let dir = unsafe { &mut *dir };
        if continent.is_null() {
            dir.inner.clear_continent();
        } else {
            dir.inner.select_continent(unsafe { str_arg(continent) });
        }
    }));
}

/// Current sections for the list screen. An empty list after a successful
/// load means "No countries found".
///
/// Returns null if `dir` is null. Free with `countries_free_sections`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_sections(dir: *mut FfiCountryDirectory) -> *mut FfiSectionList {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return std::ptr::null_mut();
        }
        FfiSectionList::from_core(unsafe { &mut *dir }.inner.sections())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Continent filter options, `"All"` first.
///
/// Returns null if `dir` is null. Free with `countries_free_string_list`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_directory_continents(
    dir: *const FfiCountryDirectory,
) -> *mut FfiStringList {
    catch_unwind(AssertUnwindSafe(|| {
        if dir.is_null() {
            return std::ptr::null_mut();
        }
        FfiStringList::from_core(unsafe { &*dir }.inner.continents())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Theme store
// ---------------------------------------------------------------------------

/// Create the theme store.
///
/// `prefs_path` names the JSON preferences file; null keeps the theme in
/// memory only. `system_scheme` is consulted when nothing was persisted.
/// Free with `countries_theme_store_free`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_new(
    prefs_path: *const c_char,
    system_scheme: FfiSystemScheme,
) -> *mut FfiThemeStore {
    catch_unwind(|| {
        let storage: Box<dyn KeyValueStore> = if prefs_path.is_null() {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::new(unsafe { str_arg(prefs_path) }))
        };
        let inner = ThemeStore::initialize(storage, system_scheme.to_core());
        Box::into_raw(Box::new(FfiThemeStore { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a theme store and drop its subscriptions. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_free(store: *mut FfiThemeStore) {
    if !store.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(store) });
        }));
    }
}

/// Current theme. A null store reads as light.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_value(store: *const FfiThemeStore) -> FfiTheme {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return FfiTheme::Light;
        }
        unsafe { &*store }.inner.value().into()
    }))
    .unwrap_or(FfiTheme::Light)
}

/// Flip the theme, run subscribers, persist. Returns the new theme.
///
/// Subscribers must not re-enter `store`; see
/// `countries_theme_store_subscribe`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_toggle(store: *mut FfiThemeStore) -> FfiTheme {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return FfiTheme::Light;
        }
        unsafe { &mut *store }.inner.toggle().into()
    }))
    .unwrap_or(FfiTheme::Light)
}

/// Register `callback` to run on every theme change with `user_data`.
///
/// Callbacks run inside `countries_theme_store_toggle` while the store is
/// mutably borrowed. They must not call back into the same store handle
/// (`_value`, `_toggle`, `_subscribe`, `_unsubscribe`, `_free`); read the new
/// value from the `theme` argument instead.
///
/// Returns the subscription id for `countries_theme_store_unsubscribe`, or
/// `u64::MAX` if `store` is null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_subscribe(
    store: *mut FfiThemeStore,
    callback: FfiThemeCallback,
    user_data: *mut c_void,
) -> u64 {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return u64::MAX;
        }
        let user_data = UserData(user_data);
        let id = unsafe { &mut *store }
            .inner
            .subscribe(move |theme: Theme| callback(theme.into(), user_data.get()));
        id.as_raw()
    }))
    .unwrap_or(u64::MAX)
}

/// Remove a subscription. Returns false if it was unknown.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_store_unsubscribe(store: *mut FfiThemeStore, id: u64) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return false;
        }
        unsafe { &mut *store }
            .inner
            .unsubscribe(SubscriptionId::from_raw(id))
    }))
    .unwrap_or(false)
}

/// Colours for `theme`. Free with `countries_free_palette`.
#[unsafe(no_mangle)]
pub extern "C" fn countries_theme_palette(theme: FfiTheme) -> *mut FfiPalette {
    catch_unwind(|| {
        let palette = Theme::from(theme).palette();
        Box::into_raw(Box::new(FfiPalette::from(palette)))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `countries_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_request(req: *mut FfiHttpRequest) {
    if !req.is_null() {
        let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
    }
}

/// Free an `FfiResult`. Uses `data_tag` to determine what `data` points to.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_result(result: *mut FfiResult) {
    if !result.is_null() {
        let _ = catch_unwind(|| unsafe { FfiResult::free(result) });
    }
}

/// Free a section list. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_sections(list: *mut FfiSectionList) {
    if !list.is_null() {
        let _ = catch_unwind(|| unsafe { FfiSectionList::free(list) });
    }
}

/// Free a string list. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_string_list(list: *mut FfiStringList) {
    if !list.is_null() {
        let _ = catch_unwind(|| unsafe { FfiStringList::free(list) });
    }
}

/// Free a palette. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_palette(palette: *mut FfiPalette) {
    if !palette.is_null() {
        let _ = catch_unwind(|| unsafe { FfiPalette::free(palette) });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn countries_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LIST_BODY: &str = r#"[
        {"name":{"common":"Ghana","official":"Republic of Ghana"},"capital":["Accra"],
         "flags":{"png":"gh.png"},"continents":["Africa"]},
        {"name":{"common":"France","official":"French Republic"},"capital":["Paris"],
         "flags":{"png":"fr.png"},"continents":["Europe"]}
    ]"#;

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn new_client() -> *mut FfiCountriesClient {
        let url = CString::new("http://localhost:3000").unwrap();
        countries_client_new(url.as_ptr())
    }

    fn load(dir: *mut FfiCountryDirectory, client: *const FfiCountriesClient, body: &str) {
        let token = countries_directory_begin_load(dir);
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_directory_complete_load(dir, client, token, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        countries_free_result(result);
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        countries_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(countries_client_new(std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        countries_client_free(std::ptr::null_mut());
    }

    #[test]
    fn client_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.toml");
        std::fs::write(&path, "api_base_url = \"http://10.0.2.2:3000/\"\n").unwrap();
        let path = CString::new(path.to_str().unwrap()).unwrap();

        let client = countries_client_from_config(path.as_ptr());
        assert!(!client.is_null());
        let req = countries_build_list_countries(client);
        let path = c_str(unsafe { &*req }.path);
        assert!(path.ends_with("/all?fields=name,capital,flags,continents"));

        countries_free_request(req);
        countries_client_free(client);
    }

    #[test]
    fn client_from_invalid_config_returns_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.toml");
        std::fs::write(&path, "api_base_url = [").unwrap();
        let path = CString::new(path.to_str().unwrap()).unwrap();
        assert!(countries_client_from_config(path.as_ptr()).is_null());
    }

    #[test]
    fn build_list_countries_returns_correct_request() {
        let client = new_client();
        let req = countries_build_list_countries(client);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(
            c_str(req_ref.path),
            "http://localhost:3000/all?fields=name,capital,flags,continents"
        );
        assert!(req_ref.body.is_null());
        assert_eq!(req_ref.headers_len, 1);
        let header = unsafe { &*req_ref.headers };
        assert_eq!(c_str(header.key), "accept");
        assert_eq!(c_str(header.value), "application/json");

        countries_free_request(req);
        countries_client_free(client);
    }

    #[test]
    fn build_list_countries_null_client_returns_null() {
        assert!(countries_build_list_countries(std::ptr::null()).is_null());
    }

    #[test]
    fn build_country_by_capital_encodes_path() {
        let client = new_client();
        let capital = CString::new("Buenos Aires").unwrap();
        let req = countries_build_country_by_capital(client, capital.as_ptr());
        assert!(!req.is_null());
        assert_eq!(
            c_str(unsafe { &*req }.path),
            "http://localhost:3000/capital/Buenos%20Aires"
        );

        countries_free_request(req);
        countries_client_free(client);
    }

    #[test]
    fn build_country_by_capital_null_capital_returns_null() {
        let client = new_client();
        assert!(countries_build_country_by_capital(client, std::ptr::null()).is_null());
        countries_client_free(client);
    }

    #[test]
    fn parse_country_by_capital_success() {
        let client = new_client();
        let body = CString::new(
            r#"[{"name":{"common":"Ghana","official":"Republic of Ghana"},
                "capital":["Accra"],"population":31072945,"region":"Africa",
                "car":{"side":"right"},"independent":true}]"#,
        )
        .unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_parse_country_by_capital(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.data_tag, FfiDataTag::Detail);

        let detail = unsafe { &*(r.data as *const FfiCountryDetail) };
        assert_eq!(c_str(detail.common_name), "Ghana");
        assert_eq!(c_str(detail.population), "31,072,945");
        assert_eq!(c_str(detail.capital), "Accra");
        assert_eq!(c_str(detail.independent), "TRUE");
        assert_eq!(c_str(detail.driving_side), "Right");

        countries_free_result(result);
        countries_client_free(client);
    }

    #[test]
    fn parse_country_by_capital_empty_array_is_not_found() {
        let client = new_client();
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_parse_country_by_capital(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NotFound);
        assert!(!r.error_message.is_null());
        assert!(r.data.is_null());

        countries_free_result(result);
        countries_client_free(client);
    }

    #[test]
    fn parse_country_by_capital_server_error() {
        let client = new_client();
        let body = CString::new("boom").unwrap();
        let resp = FfiHttpResponse {
            status: 500,
            body: body.as_ptr(),
        };
        let result = countries_parse_country_by_capital(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 500);

        countries_free_result(result);
        countries_client_free(client);
    }

    #[test]
    fn parse_null_args_return_null_arg() {
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_parse_country_by_capital(std::ptr::null(), &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        countries_free_result(result);

        let client = new_client();
        let result = countries_parse_country_by_capital(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        countries_free_result(result);
        countries_client_free(client);
    }

    #[test]
    fn directory_load_filter_and_sections() {
        let client = new_client();
        let dir = countries_directory_new();
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Loading);

        load(dir, client, LIST_BODY);
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Ready);
        assert!(countries_directory_error_message(dir).is_null());

        let continents = countries_directory_continents(dir);
        let list = unsafe { &*continents };
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        let names: Vec<&str> = items.iter().map(|p| c_str(*p)).collect();
        assert_eq!(names, ["All", "Africa", "Europe"]);
        countries_free_string_list(continents);

        let search = CString::new("acc").unwrap();
        countries_directory_set_search_text(dir, search.as_ptr());
        let sections = countries_directory_sections(dir);
        let list = unsafe { &*sections };
        assert_eq!(list.len, 1);
        let section = unsafe { &*list.sections };
        assert_eq!(c_str(section.title), "R");
        assert_eq!(section.rows_len, 1);
        let row = unsafe { &*section.rows };
        assert_eq!(c_str(row.title), "Republic of Ghana");
        assert_eq!(c_str(row.subtitle), "Accra");
        assert_eq!(c_str(row.detail_key), "Accra");
        countries_free_sections(sections);

        let asia = CString::new("Asia").unwrap();
        countries_directory_set_search_text(dir, std::ptr::null());
        countries_directory_select_continent(dir, asia.as_ptr());
        let sections = countries_directory_sections(dir);
        assert_eq!(unsafe { &*sections }.len, 0);
        assert!(unsafe { &*sections }.sections.is_null());
        countries_free_sections(sections);

        countries_directory_select_continent(dir, std::ptr::null());
        let sections = countries_directory_sections(dir);
        assert_eq!(unsafe { &*sections }.len, 2);
        countries_free_sections(sections);

        countries_directory_free(dir);
        countries_client_free(client);
    }

    #[test]
    fn directory_discards_stale_completion() {
        let client = new_client();
        let dir = countries_directory_new();
        let stale = countries_directory_begin_load(dir);
        let current = countries_directory_begin_load(dir);
        assert_ne!(stale, current);

        let body = CString::new(LIST_BODY).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_directory_complete_load(dir, client, stale, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Stale);
        countries_free_result(result);
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Loading);

        assert!(!countries_directory_fail_load(dir, stale, std::ptr::null()));
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Loading);

        countries_directory_free(dir);
        countries_client_free(client);
    }

    #[test]
    fn directory_records_fetch_failure() {
        let dir = countries_directory_new();
        let token = countries_directory_begin_load(dir);
        let message = CString::new("connection refused").unwrap();
        assert!(countries_directory_fail_load(dir, token, message.as_ptr()));
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Failed);

        let error = countries_directory_error_message(dir);
        assert!(c_str(error).contains("connection refused"));
        countries_free_string(error);

        let sections = countries_directory_sections(dir);
        assert_eq!(unsafe { &*sections }.len, 0);
        countries_free_sections(sections);
        countries_directory_free(dir);
    }

    #[test]
    fn directory_bad_body_fails_load() {
        let client = new_client();
        let dir = countries_directory_new();
        let token = countries_directory_begin_load(dir);
        let body = CString::new("not json").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = countries_directory_complete_load(dir, client, token, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Deserialization);
        countries_free_result(result);
        assert_eq!(countries_directory_status(dir), FfiLoadStatus::Failed);

        countries_directory_free(dir);
        countries_client_free(client);
    }

    #[test]
    fn directory_null_handles_are_safe() {
        assert_eq!(countries_directory_begin_load(std::ptr::null_mut()), 0);
        assert_eq!(
            countries_directory_status(std::ptr::null()),
            FfiLoadStatus::Loading
        );
        assert!(countries_directory_sections(std::ptr::null_mut()).is_null());
        countries_directory_set_search_text(std::ptr::null_mut(), std::ptr::null());
        countries_directory_reset(std::ptr::null_mut());
        countries_directory_free(std::ptr::null_mut());
    }

    extern "C" fn record_theme(theme: FfiTheme, user_data: *mut c_void) {
        let seen = unsafe { &mut *(user_data as *mut Vec<FfiTheme>) };
        seen.push(theme);
    }

    extern "C" fn count_changes(_theme: FfiTheme, user_data: *mut c_void) {
        let counter = unsafe { &*(user_data as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn theme_store_in_memory_uses_system_scheme() {
        let store = countries_theme_store_new(std::ptr::null(), FfiSystemScheme::Dark);
        assert_eq!(countries_theme_store_value(store), FfiTheme::Dark);
        assert_eq!(countries_theme_store_toggle(store), FfiTheme::Light);
        countries_theme_store_free(store);

        let store = countries_theme_store_new(std::ptr::null(), FfiSystemScheme::Unspecified);
        assert_eq!(countries_theme_store_value(store), FfiTheme::Light);
        countries_theme_store_free(store);
    }

    #[test]
    fn theme_store_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = CString::new(dir.path().join("prefs.json").to_str().unwrap()).unwrap();

        let store = countries_theme_store_new(path.as_ptr(), FfiSystemScheme::Light);
        assert_eq!(countries_theme_store_toggle(store), FfiTheme::Dark);
        countries_theme_store_free(store);

        let reopened = countries_theme_store_new(path.as_ptr(), FfiSystemScheme::Light);
        assert_eq!(countries_theme_store_value(reopened), FfiTheme::Dark);
        countries_theme_store_free(reopened);
    }

    #[test]
    fn theme_store_callbacks_until_unsubscribed() {
        let counter = AtomicUsize::new(0);
        let store = countries_theme_store_new(std::ptr::null(), FfiSystemScheme::Unspecified);
        let id = countries_theme_store_subscribe(
            store,
            count_changes,
            &counter as *const AtomicUsize as *mut c_void,
        );

        countries_theme_store_toggle(store);
        countries_theme_store_toggle(store);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        assert!(countries_theme_store_unsubscribe(store, id));
        assert!(!countries_theme_store_unsubscribe(store, id));
        countries_theme_store_toggle(store);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        countries_theme_store_free(store);
    }

    #[test]
    fn theme_callback_receives_new_value() {
        let mut seen: Vec<FfiTheme> = Vec::new();
        let store = countries_theme_store_new(std::ptr::null(), FfiSystemScheme::Light);
        countries_theme_store_subscribe(
            store,
            record_theme,
            &mut seen as *mut Vec<FfiTheme> as *mut c_void,
        );

        assert_eq!(countries_theme_store_toggle(store), FfiTheme::Dark);
        assert_eq!(countries_theme_store_toggle(store), FfiTheme::Light);
        countries_theme_store_free(store);

        assert_eq!(seen, vec![FfiTheme::Dark, FfiTheme::Light]);
    }

    #[test]
    fn palette_matches_theme() {
        let palette = countries_theme_palette(FfiTheme::Dark);
        let p = unsafe { &*palette };
        assert_eq!(c_str(p.background), "#000F24");
        assert_eq!(c_str(p.icon), "#FFD700");
        countries_free_palette(palette);

        let palette = countries_theme_palette(FfiTheme::Light);
        assert_eq!(c_str(unsafe { &*palette }.background), "#FFFFFF");
        countries_free_palette(palette);
    }

    #[test]
    fn free_functions_accept_null() {
        countries_free_request(std::ptr::null_mut());
        countries_free_result(std::ptr::null_mut());
        countries_free_sections(std::ptr::null_mut());
        countries_free_string_list(std::ptr::null_mut());
        countries_free_palette(std::ptr::null_mut());
        countries_free_string(std::ptr::null_mut());
        countries_theme_store_free(std::ptr::null_mut());
    }

    #[test]
    fn to_c_string_strips_interior_nul() {
        let s = to_c_string("ab\0c");
        assert_eq!(c_str(s), "abc");
        countries_free_string(s);
    }
}
