mod helpers;

use article_enricher::config::Config;
use article_enricher::pipeline::outcome::{INVALID_URL, NETWORK_FAILURE, READ_COUNT_NOT_MATCHED};
use article_enricher::pipeline::{HttpPageSource, Pipeline, PipelineError};
use article_enricher::snapshot;
use helpers::{fixture, read_output, unreachable_url, write_gbk};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="gbk"><title>春季运动会圆满落幕</title></head>
<body>
  <div id="js_content">
    <p>四月十二日，学校春季运动会在东操场圆满落幕。</p>
    <p>文：<span>张三</span>  李四</p>
    <p>图：王五</p>
  </div>
</body>
</html>"#;

async fn article_server() -> MockServer {
    let mock_server = MockServer::start().await;
    let (body, _, _) = encoding_rs::GBK.encode(ARTICLE_PAGE);

    Mock::given(method("GET"))
        .and(path("/s/spring-games"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.into_owned())
                .insert_header("Content-Type", "text/html; charset=gbk"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_server
}

fn test_config(dir: &std::path::Path) -> Config {
    Config::from_env()
        .unwrap()
        .with_input_csv(dir.join("1.csv"))
        .with_output_csv(dir.join("out.csv"))
        .with_snapshot_html(fixture("publish_history.html"))
        .with_columns(Some(3), Some(2))
        .with_input_encoding("gbk")
        .unwrap()
        .with_fetch_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_enriches_every_row_and_survives_failures() {
    let server = article_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let reachable = format!("{}/s/spring-games", server.uri());
    let unreachable = unreachable_url("/s/library");
    write_gbk(
        config.input_csv(),
        &format!(
            "序号,发布日期,标题,链接\n\
             1,2024-04-12,春季运动会圆满落幕,{reachable}\n\
             2,2024-04-10,图书馆闭馆通知,{unreachable}\n\
             3,2024-03-01,开学典礼,\n"
        ),
    );

    // One event in the fixture has a raw quote where &quot; belongs.
    let index = snapshot::load_index(config.snapshot_html());
    assert_eq!(index.len(), 4);
    assert_eq!(index.get("校史馆开放日"), Some(451));

    let pipeline = Pipeline::new(HttpPageSource, config.pipeline_settings());
    let summary = pipeline
        .run(config.input_csv(), config.output_csv(), &index)
        .await
        .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.matched, 3);

    let rows = read_output(config.output_csv());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], ["序号", "发布日期", "标题", "链接", "通讯员", "阅读数"]);

    assert_eq!(rows[1][..4], ["1", "2024-04-12", "春季运动会圆满落幕", reachable.as_str()]);
    assert_eq!(rows[1][4], "张三 李四");
    assert_eq!(rows[1][5], "1532");

    assert!(
        rows[2][4].starts_with(NETWORK_FAILURE),
        "unexpected cell {:?}",
        rows[2][4]
    );
    assert_eq!(rows[2][5], "210");

    // No URL, but the read-count lookup still runs on the title.
    assert_eq!(rows[3][3], "");
    assert_eq!(rows[3][4], INVALID_URL);
    assert_eq!(rows[3][5], "980");
}

#[tokio::test]
async fn test_missing_snapshot_reports_every_row_unmatched() {
    let server = article_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_snapshot_html(dir.path().join("发表记录.txt"));

    let reachable = format!("{}/s/spring-games", server.uri());
    write_gbk(
        config.input_csv(),
        &format!("序号,发布日期,标题,链接\n1,2024-04-12,春季运动会圆满落幕,{reachable}\n"),
    );

    let index = snapshot::load_index(config.snapshot_html());
    assert!(index.is_empty());

    let pipeline = Pipeline::new(HttpPageSource, config.pipeline_settings());
    pipeline
        .run(config.input_csv(), config.output_csv(), &index)
        .await
        .unwrap();

    let rows = read_output(config.output_csv());
    assert_eq!(rows[1][4], "张三 李四");
    assert_eq!(rows[1][5], READ_COUNT_NOT_MATCHED);
}

#[tokio::test]
async fn test_missing_input_aborts_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let pipeline = Pipeline::new(HttpPageSource, config.pipeline_settings());
    let result = pipeline
        .run(config.input_csv(), config.output_csv(), &Default::default())
        .await;

    assert!(matches!(result, Err(PipelineError::InputNotFound { .. })));
    assert!(!config.output_csv().exists());
}
