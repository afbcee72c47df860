//! Mock-based ingestion tests using wiremock.
//!
//! These tests verify search, fetch and parsing against a mocked E-utilities API.

use std::time::{Duration, Instant};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pubmed_digest::client::PubMedClient;
use pubmed_digest::config::Config;
use pubmed_digest::models::NO_ABSTRACT;
use pubmed_digest::pipeline::IngestionPipeline;

const ESEARCH: &str = "/entrez/eutils/esearch.fcgi";
const EFETCH: &str = "/entrez/eutils/efetch.fcgi";

fn setup_client(mock_server: &MockServer) -> PubMedClient {
    let config = Config::for_testing(&mock_server.uri());
    PubMedClient::new(config.pubmed).unwrap()
}

fn setup_pipeline(mock_server: &MockServer) -> IngestionPipeline {
    IngestionPipeline::new(setup_client(mock_server))
}

/// Sample esearch response body.
fn esearch_xml(ids: &[&str]) -> String {
    let id_list: String = ids.iter().map(|id| format!("<Id>{id}</Id>")).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult><Count>{count}</Count><RetMax>{count}</RetMax><RetStart>0</RetStart><IdList>
{id_list}
</IdList></eSearchResult>"#,
        count = ids.len()
    )
}

/// Sample PubmedArticle element.
fn article_xml(pmid: &str, title: &str) -> String {
    format!(
        r#"<PubmedArticle>
  <MedlineCitation Status="Publisher" Owner="NLM">
    <PMID Version="1">{pmid}</PMID>
    <Article PubModel="Print-Electronic">
      <Journal><Title>Critical Care Medicine</Title></Journal>
      <ArticleTitle>{title}</ArticleTitle>
      <Abstract>
        <AbstractText Label="BACKGROUND">Sepsis is common.</AbstractText>
        <AbstractText Label="RESULTS">Mortality fell.</AbstractText>
      </Abstract>
    </Article>
  </MedlineCitation>
  <PubmedData>
    <ArticleIdList>
      <ArticleId IdType="pubmed">{pmid}</ArticleId>
      <ArticleId IdType="doi">10.1000/{pmid}</ArticleId>
    </ArticleIdList>
  </PubmedData>
</PubmedArticle>"#
    )
}

fn efetch_xml(articles: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>\n{}\n</PubmedArticleSet>",
        articles.join("\n")
    )
}

async fn mount_search(mock_server: &MockServer, term: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .and(query_param("term", term))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_xml(ids)))
        .mount(mock_server)
        .await;
}

// =============================================================================
// SearchStage
// =============================================================================

#[tokio::test]
async fn test_search_sends_recency_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "sepsis"))
        .and(query_param("reldate", "1"))
        .and(query_param("datetype", "pdat"))
        .and(query_param("retmax", "7"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_xml(&["11", "22"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let ids = client.search("sepsis", 7).await;
    assert_eq!(ids, vec!["11", "22"]);
}

#[tokio::test]
async fn test_search_single_identifier_is_not_split() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "rare", &["39000001"]).await;

    let client = setup_client(&mock_server);
    assert_eq!(client.search("rare", 5).await, vec!["39000001"]);
}

#[tokio::test]
async fn test_search_empty_id_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<eSearchResult><Count>0</Count><IdList/></eSearchResult>",
        ))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    assert!(client.search("nothing", 5).await.is_empty());
}

#[tokio::test]
async fn test_search_server_error_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    assert!(client.search("sepsis", 5).await.is_empty());
}

#[tokio::test]
async fn test_search_timeout_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_xml(&["1"]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.pubmed.request_timeout = Duration::from_millis(200);
    let client = PubMedClient::new(config.pubmed).unwrap();

    let started = Instant::now();
    assert!(client.search("sepsis", 5).await.is_empty());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_search_malformed_xml_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<eSearchResult><IdList>"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    assert!(client.search("sepsis", 5).await.is_empty());
}

// =============================================================================
// FetchStage
// =============================================================================

#[tokio::test]
async fn test_fetch_joins_identifiers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "1,2"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[
            article_xml("1", "One"),
            article_xml("2", "Two"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let raw = client.fetch(&["1".to_string(), "2".to_string()]).await;
    assert_eq!(raw.len(), 2);
}

#[tokio::test]
async fn test_fetch_single_article_is_wrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(efetch_xml(&[article_xml("9", "Only")])),
        )
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let raw = client.fetch(&["9".to_string()]).await;
    assert_eq!(raw.len(), 1);
    assert!(raw[0].get("MedlineCitation").is_some());
}

#[tokio::test]
async fn test_fetch_without_identifiers_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    assert!(client.fetch(&[]).await.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    assert!(client.fetch(&["1".to_string()]).await.is_empty());
}

// =============================================================================
// IngestionPipeline
// =============================================================================

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "sepsis", &["101", "102"]).await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .and(query_param("id", "101,102"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[
            article_xml("101", "Early antibiotics in sepsis"),
            article_xml("102", "Fluids in <i>septic</i> shock"),
        ])))
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    let papers = pipeline.run("sepsis", 10).await;

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Early antibiotics in sepsis");
    assert_eq!(papers[0].journal, "Critical Care Medicine");
    assert_eq!(papers[0].r#abstract, "Sepsis is common. Mortality fell.");
    assert_eq!(papers[0].doi, "10.1000/101");
    assert_eq!(papers[1].title, "Fluids in septic shock");
    assert!(papers[1].url.ends_with("/102/"));
}

#[tokio::test]
async fn test_pipeline_short_circuits_without_identifiers() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "nothing new", &[]).await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    assert!(pipeline.run("nothing new", 10).await.is_empty());
}

#[tokio::test]
async fn test_pipeline_isolates_malformed_article() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "mixed", &["1", "2", "3"]).await;

    let broken = "<PubmedArticle><MedlineCitation><Article><ArticleTitle>No PMID</ArticleTitle>\
                  </Article></MedlineCitation></PubmedArticle>"
        .to_string();

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[
            article_xml("1", "Good one"),
            broken,
            article_xml("3", "Good three"),
        ])))
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    let papers = pipeline.run("mixed", 10).await;

    let ids: Vec<&str> = papers.iter().map(|p| p.pmid.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_pipeline_article_without_abstract_or_ids() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "bare", &["5"]).await;

    let bare = r#"<PubmedArticle><MedlineCitation><PMID Version="1">5</PMID>
<Article><Journal><Title>BMJ</Title></Journal><ArticleTitle>Letter</ArticleTitle></Article>
</MedlineCitation></PubmedArticle>"#
        .to_string();

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(&[bare])))
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    let papers = pipeline.run("bare", 10).await;

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].r#abstract, NO_ABSTRACT);
    assert_eq!(papers[0].doi, "");
}

#[tokio::test]
async fn test_pipeline_fetch_failure_yields_empty() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "sepsis", &["1"]).await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not xml at all <"))
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    assert!(pipeline.run("sepsis", 10).await.is_empty());
}
