//! End-to-end flow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the core the way a
//! host does: build a request, execute it over real HTTP with ureq, hand the
//! response to the parser, and feed the result into the directory model.

use countries_core::{
    ApiError, CountriesClient, CountryDetail, CountryDirectory, CountryRow, HttpMethod,
    HttpRequest, HttpResponse, LoadStatus,
};

/// Execute an `HttpRequest` using ureq, the way a host would.
///
/// Status codes are returned as data so the core interprets them; transport
/// failures become `FetchFailed`.
fn execute(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut builder = match req.method {
        HttpMethod::Get => agent.get(&req.path),
    };
    for (key, value) in &req.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    let mut response = builder
        .call()
        .map_err(|e| ApiError::FetchFailed(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

/// Start the mock server on a random port and return its base URL.
fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn list_search_and_detail_flow() {
    let client = CountriesClient::new(&start_mock_server());

    // Step 1: load the list into the directory.
    let mut directory = CountryDirectory::new();
    let token = directory.begin_load();
    let outcome = execute(client.build_list_countries())
        .and_then(|resp| client.parse_list_countries(resp));
    assert!(directory.complete_load(token, outcome));
    assert_eq!(directory.status(), &LoadStatus::Ready);

    // Step 2: the list request only carried the pipeline fields.
    assert!(directory.countries().iter().all(|c| c.population.is_none()));
    assert_eq!(directory.continents()[0], "All");
    assert!(directory.continents().iter().any(|c| c == "Antarctica"));

    // Step 3: unfiltered sections cover every record.
    let total: usize = directory.sections().iter().map(|s| s.data.len()).sum();
    assert_eq!(total, directory.countries().len());

    // Step 4: search by capital.
    directory.set_search_text("acc");
    let sections = directory.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "R");
    let row = CountryRow::from(&sections[0].data[0]);
    assert_eq!(row.title, "Republic of Ghana");
    assert_eq!(row.detail_key, "Accra");

    // Step 5: open the detail screen.
    let detail_req = client.build_country_by_capital(&row.detail_key);
    let country = client
        .parse_country_by_capital(execute(detail_req).unwrap())
        .unwrap();
    let detail = CountryDetail::from(&country);
    assert_eq!(detail.common_name, "Ghana");
    assert_eq!(detail.population, "31,072,945");
    assert_eq!(detail.driving_side, "Right");

    // Step 6: continent filter combined with an empty search.
    directory.set_search_text("");
    directory.select_continent("Asia");
    let sections = directory.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].data[0].official_name(), "Russian Federation");
}

#[test]
fn capital_with_spaces_round_trips() {
    let client = CountriesClient::new(&start_mock_server());

    let req = client.build_country_by_capital("Buenos Aires");
    let country = client
        .parse_country_by_capital(execute(req).unwrap())
        .unwrap();
    assert_eq!(country.official_name(), "Argentine Republic");
}

#[test]
fn unknown_capital_is_not_found() {
    let client = CountriesClient::new(&start_mock_server());

    let req = client.build_country_by_capital("No capital");
    let err = client
        .parse_country_by_capital(execute(req).unwrap())
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[test]
fn unreachable_server_surfaces_fetch_failed() {
    // Grab a free port, then release it so nothing listens there.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = CountriesClient::new(&format!("http://{addr}"));

    let mut directory = CountryDirectory::new();
    let token = directory.begin_load();
    let outcome = execute(client.build_list_countries())
        .and_then(|resp| client.parse_list_countries(resp));
    directory.complete_load(token, outcome);

    assert!(matches!(
        directory.status(),
        LoadStatus::Failed(ApiError::FetchFailed(_))
    ));
    assert!(directory.sections().is_empty());
}
