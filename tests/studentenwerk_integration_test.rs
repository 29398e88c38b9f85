use httpmock::prelude::*;
use mensa_etl::core::fetch::HttpClient;
use mensa_etl::core::studentenwerk::StudentenwerkSource;
use mensa_etl::{output, Canteen, Label, MenuSource, Week};
use tempfile::TempDir;

const DAY_PAGE: &str = r#"<html><body>
<div class="c-schedule__item">
  <p><strong>13.09.2021</strong></p>
  <ul>
    <li class="c-schedule__list-item u-clearfix clearfix js-menu__list-item"
        data-essen-zusatz="" data-essen-allergene="Gl,Sl" data-essen-typ=""
        data-essen-fleischlos="1">
      <dt><span class="stwm-artname">Tagesgericht 1</span></dt>
      <dd><p class="js-schedule-dish-description">Salat</p></dd>
    </li>
    <li class="c-schedule__list-item u-clearfix clearfix js-menu__list-item"
        data-essen-zusatz="2" data-essen-allergene="Ei" data-essen-typ=""
        data-essen-fleischlos="0">
      <dt><span class="stwm-artname">Tagesgericht 2</span></dt>
      <dd><p class="js-schedule-dish-description">Salat</p></dd>
    </li>
    <li class="c-schedule__list-item u-clearfix clearfix js-menu__list-item"
        data-essen-zusatz="" data-essen-allergene="ScH" data-essen-typ=""
        data-essen-fleischlos="2">
      <dt><span class="stwm-artname"></span></dt>
      <dd><p class="js-schedule-dish-description">Nusskuchen</p></dd>
    </li>
  </ul>
</div>
<div class="c-schedule__item">
  <p><strong>14.09.2021</strong></p>
  <ul>
    <li class="c-schedule__list-item u-clearfix clearfix js-menu__list-item"
        data-essen-zusatz="" data-essen-allergene="Gl" data-essen-typ="R"
        data-essen-fleischlos="0">
      <dt><span class="stwm-artname">Tagesgericht 1</span></dt>
      <dd><p class="js-schedule-dish-description">Rindergulasch</p></dd>
    </li>
  </ul>
</div>
</body></html>"#;

#[tokio::test]
async fn test_fetch_parse_group_and_jsonify() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/speiseplan_431_-de.html");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(DAY_PAGE);
    });

    let http = HttpClient::new().unwrap();
    let source = StudentenwerkSource::with_base_url(http, server.base_url());
    let menus = source.parse(Canteen::MensaLothstr).await.unwrap();

    page_mock.assert();
    assert_eq!(menus.len(), 2);

    // two dishes share the display name: the second gets a suffix and
    // keeps its own attributes
    let monday = &menus[&chrono::NaiveDate::from_ymd_opt(2021, 9, 13).unwrap()];
    assert_eq!(monday.dishes[0].name, "Salat");
    assert_eq!(monday.dishes[1].name, "Salat (2)");
    assert!(monday.dishes[0].labels.contains(&Label::Gluten));
    assert!(monday.dishes[1].labels.contains(&Label::ChickenEggs));
    assert_ne!(monday.dishes[0].prices, monday.dishes[1].prices);

    // forward-filled dish type plus hazelnut supertype expansion
    assert_eq!(monday.dishes[2].dish_type, "Tagesgericht 2");
    assert!(monday.dishes[2].labels.contains(&Label::Hazelnuts));
    assert!(monday.dishes[2].labels.contains(&Label::ShellFruits));
    assert!(monday.dishes[2].labels.contains(&Label::Vegan));

    // static table pricing at a classic canteen
    assert_eq!(
        monday.dishes[0].prices.students.as_ref().unwrap().base_price,
        Some(1.00)
    );

    let weeks = Week::to_weeks(&menus);
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[&37].days.len(), 2);

    let temp_dir = TempDir::new().unwrap();
    output::jsonify(&weeks, temp_dir.path(), Canteen::MensaLothstr, true).unwrap();

    let combined: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join("combined").join("combined.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(combined["canteen_id"], "mensa-lothstr");
    let dishes = &combined["weeks"][0]["days"][0]["dishes"];
    assert_eq!(dishes[1]["name"], "Salat (2)");
    assert_eq!(dishes[1]["dish_type"], "Tagesgericht 2");
    let labels: Vec<&str> = dishes[0]["labels"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(labels.contains(&"GLUTEN"));
    assert!(labels.contains(&"VEGETARIAN"));
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/speiseplan_431_-de.html");
        then.status(404);
    });

    let http = HttpClient::new().unwrap();
    let source = StudentenwerkSource::with_base_url(http, server.base_url());
    assert!(source.parse(Canteen::MensaLothstr).await.is_err());
}
