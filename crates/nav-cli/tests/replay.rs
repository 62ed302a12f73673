//! End-to-end scenario replays.

use insta::assert_json_snapshot;
use nav_cli::replay::{DeliveredResult, replay};
use nav_cli::scenario::Scenario;
use nav_cli::summary::render_report;

const DESTINATIONS: &str = r#"
[[destination]]
kind = "home"

[[destination]]
kind = "detail"

[[destination]]
kind = "picker"
returns_result = true

[[destination]]
kind = "sheet"
push = false
present = true

[[container]]
key = "main"
initial = ["home"]
"#;

fn scenario(events: &str) -> Scenario {
    Scenario::from_toml_str(&format!("{DESTINATIONS}\n{events}"))
        .unwrap()
        .validated()
        .unwrap()
}

fn browse_and_pick() -> Scenario {
    scenario(
        r#"
        [[event]]
        type = "open"
        kind = "detail"
        payload = { id = 7 }

        [[event]]
        type = "open_for_result"
        kind = "picker"
        from = "detail"
        channel = "color"

        [[event]]
        type = "close_with_result"
        container = "main"
        value = "blue"

        [[event]]
        type = "open"
        kind = "sheet"
        direction = "present"
        "#,
    )
}

#[test]
fn picked_value_reaches_the_opener() {
    let report = replay(&browse_and_pick()).unwrap();
    assert_json_snapshot!(report, @r#"
    {
      "containers": [
        {
          "key": "main",
          "owner": "app",
          "backstack": [
            "home",
            "detail",
            "sheet"
          ],
          "active": "sheet",
          "selected": true
        }
      ],
      "delivered": [
        {
          "channel": "detail/color",
          "value": "blue"
        }
      ],
      "pending_results": 0
    }
    "#);
}

#[test]
fn pending_result_is_delivered_after_restore() {
    let scenario = scenario(
        r#"
        [[event]]
        type = "open_for_result"
        kind = "picker"
        from = "home"
        channel = "color"

        [[event]]
        type = "open"
        kind = "detail"

        [[event]]
        type = "close_with_result"
        instance = "picker"
        value = "blue"

        [[event]]
        type = "snapshot"

        [[event]]
        type = "restore"

        [[event]]
        type = "close"
        container = "main"
        "#,
    );
    let report = replay(&scenario).unwrap();
    assert_eq!(report.containers[0].backstack, vec!["home"]);
    assert_eq!(
        report.delivered,
        vec![DeliveredResult {
            channel: "home/color".to_string(),
            value: Some(serde_json::json!("blue")),
        }]
    );
    assert_eq!(report.pending_results, 0);
}

#[test]
fn plain_report_lists_the_selected_container() {
    let report = replay(&browse_and_pick()).unwrap();
    let rendered = render_report(&report, false);
    assert!(rendered.contains("* main"));
    assert!(rendered.contains("home > detail > sheet"));
    assert!(rendered.contains("detail/color"));
    assert!(rendered.contains("\"blue\""));
    assert!(!rendered.contains("waiting for their owner"));
}

#[test]
fn failing_event_is_named_in_the_error() {
    let scenario = scenario(
        r#"
        [[event]]
        type = "open"
        kind = "detail"

        [[event]]
        type = "close"
        instance = "ghost"
        "#,
    );
    let error = replay(&scenario).unwrap_err();
    assert_eq!(
        format!("{error:#}"),
        "event 2 (close): unknown instance 'ghost'"
    );
}

#[test]
fn removed_container_is_left_out_of_the_report() {
    let scenario = scenario(
        r#"
        [[event]]
        type = "create_container"
        key = "sidebar"
        accepts = ["detail"]

        [[event]]
        type = "remove_container"
        container = "sidebar"
        "#,
    );
    let report = replay(&scenario).unwrap();
    let keys: Vec<_> = report.containers.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["main"]);
}
