use newsdigest::ingestion;

const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Artemis</title>
  <id>urn:test</id>
  <updated>2026-10-18T10:00:00Z</updated>
  <entry>
    <title>Florida renewals</title>
    <id>urn:test:1</id>
    <link href="https://artemis.example.com/florida"/>
    <published>2026-10-18T10:00:00Z</published>
    <updated>2026-10-18T10:00:00Z</updated>
    <summary>Rates softened at mid-year.</summary>
  </entry>
</feed>"#;

#[tokio::test]
async fn fetches_and_flattens_atom_feed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/atom")
        .match_header("user-agent", "newsdigest-test")
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(ATOM)
        .create_async()
        .await;

    let client = ingestion::build_client(5, "newsdigest-test").expect("client");
    let entries = ingestion::fetch_entries(&client, &format!("{}/atom", server.url()))
        .await
        .expect("entries");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Florida renewals");
    assert_eq!(entries[0].link, "https://artemis.example.com/florida");
    assert_eq!(entries[0].summary, "Rates softened at mid-year.");
    assert!(entries[0].published.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone")
        .with_status(410)
        .create_async()
        .await;

    let client = ingestion::build_client(5, "newsdigest-test").expect("client");
    let err = ingestion::fetch_entries(&client, &format!("{}/gone", server.url()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("410"));
}

#[tokio::test]
async fn unparseable_body_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/html")
        .with_status(200)
        .with_body("<html><body>not a feed</body></html>")
        .create_async()
        .await;

    let client = ingestion::build_client(5, "newsdigest-test").expect("client");
    let err = ingestion::fetch_entries(&client, &format!("{}/html", server.url()))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("failed to parse feed"));
}
