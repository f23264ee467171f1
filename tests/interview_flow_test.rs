mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use simhire_backend::config::InterviewPolicy;
use tokio::sync::Notify;
use uuid::Uuid;

use common::{app, app_with_policy, apply, create_job, recruiter_token, send, ScriptedGateway};

#[tokio::test]
async fn candidate_flow_end_to_end() {
    let app = app(Arc::new(ScriptedGateway::default()));
    let owner = Uuid::new_v4();
    let (_, share_token) = create_job(&app, owner).await;

    let (status, job) = send(&app, "GET", &format!("/api/public/jobs/{}", share_token), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["title"], "Customer Success Lead");
    assert_eq!(job["num_questions"], 3);
    assert!(job.get("share_token").is_none());

    let app_id = apply(&app, &share_token).await;

    let (status, opening) = send(&app, "POST", &format!("/api/public/applications/{}/start", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK, "{opening}");
    assert_eq!(opening["stage"], "introduction");
    assert_eq!(opening["question_count"], 1);
    assert_eq!(opening["num_questions"], 3);
    assert_eq!(opening["time_limit_minutes"], 30);
    assert_eq!(opening["reply"]["role"], "assistant");

    for (i, answer) in ["I would call the customer first.", "whatever, they will renew anyway"]
        .iter()
        .enumerate()
    {
        let (status, turn) = send(
            &app,
            "POST",
            &format!("/api/public/applications/{}/messages", app_id),
            None,
            Some(json!({ "content": answer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{turn}");
        assert_eq!(turn["question_count"], i + 2);
        assert_eq!(turn["time_limit_minutes"], 30);
        assert_eq!(turn["stage"], "questioning");
        assert!(turn.get("flags").is_none());
    }

    let (status, transcript) = send(&app, "GET", &format!("/api/public/applications/{}", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript["status"], "in_progress");
    let roles: Vec<_> = transcript["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(roles, ["assistant", "user", "assistant", "user", "assistant"]);
    assert_eq!(transcript["messages"][1]["content"], "I would call the customer first.");

    let (status, submitted) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK, "{submitted}");
    assert_eq!(submitted["status"], "evaluated");
    assert!(submitted["submitted_at"].is_string());

    let token = recruiter_token(owner);
    let (status, report) = send(
        &app,
        "GET",
        &format!("/api/recruiter/applications/{}/report", app_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["evaluation"]["overall_score"], 68);
    assert_eq!(report["evaluation"]["recommendation"], "hire");
    assert_eq!(report["messages"].as_array().unwrap().len(), 5);
    let flags = report["flags"].as_array().unwrap();
    assert!(!flags.is_empty());
    assert_eq!(flags[0]["severity"], "high");
    assert_eq!(report["application"]["location"], "Lisbon");
    assert!(report["application"]["availability"].is_null());
}

#[tokio::test]
async fn reopened_application_resubmits_without_rescoring() {
    let gateway = Arc::new(ScriptedGateway::default());
    let app = app(gateway.clone());
    let owner = Uuid::new_v4();
    let token = recruiter_token(owner);
    let (_, share_token) = create_job(&app, owner).await;
    let app_id = apply(&app, &share_token).await;

    send(&app, "POST", &format!("/api/public/applications/{}/messages", app_id), None, Some(json!({"content": "hello"}))).await;
    let (_, first) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(first["status"], "evaluated");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/recruiter/applications/{}/status", app_id),
        Some(&token),
        Some(json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let calls_before = gateway.calls.load(Ordering::SeqCst);
    let (status, second) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK, "{second}");
    assert_eq!(second["status"], "evaluated");
    assert_eq!(gateway.calls.load(Ordering::SeqCst), calls_before);

    let (_, report) = send(&app, "GET", &format!("/api/recruiter/applications/{}/report", app_id), Some(&token), None).await;
    assert_eq!(report["application"]["status"], "evaluated");
    assert_eq!(report["evaluation"]["overall_score"], 68);

    send(
        &app,
        "POST",
        &format!("/api/recruiter/applications/{}/status", app_id),
        Some(&token),
        Some(json!({"status": "submitted"})),
    )
    .await;
    let (status, evaluation) = send(
        &app,
        "POST",
        &format!("/api/recruiter/applications/{}/evaluate", app_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{evaluation}");
    assert_eq!(evaluation["application_id"], app_id.as_str());
    assert_eq!(evaluation["id"], report["evaluation"]["id"]);
    assert_eq!(evaluation["recommendation"], "hire");
    assert_eq!(gateway.calls.load(Ordering::SeqCst), calls_before);
}

#[tokio::test]
async fn closed_interview_rejects_turns_and_second_submit() {
    let app = app(Arc::new(ScriptedGateway::default()));
    let (_, share_token) = create_job(&app, Uuid::new_v4()).await;
    let app_id = apply(&app, &share_token).await;

    send(&app, "POST", &format!("/api/public/applications/{}/messages", app_id), None, Some(json!({"content": "hello"}))).await;
    let (status, _) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/applications/{}/messages", app_id),
        None,
        Some(json!({"content": "one more thing"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, transcript) = send(&app, "GET", &format!("/api/public/applications/{}", app_id), None, None).await;
    assert_eq!(transcript["messages"].as_array().unwrap().len(), 2);
    assert_eq!(transcript["status"], "evaluated");
}

#[tokio::test]
async fn scoring_failure_still_submits_with_neutral_scorecard() {
    let gateway = Arc::new(ScriptedGateway {
        fail_scoring: true,
        ..Default::default()
    });
    let app = app(gateway);
    let owner = Uuid::new_v4();
    let (_, share_token) = create_job(&app, owner).await;
    let app_id = apply(&app, &share_token).await;

    send(&app, "POST", &format!("/api/public/applications/{}/messages", app_id), None, Some(json!({"content": "I escalate"}))).await;
    let (status, submitted) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK, "{submitted}");

    let token = recruiter_token(owner);
    let (_, report) = send(
        &app,
        "GET",
        &format!("/api/recruiter/applications/{}/report", app_id),
        Some(&token),
        None,
    )
    .await;
    let evaluation = &report["evaluation"];
    for key in [
        "overall_score",
        "decision_quality",
        "communication_clarity",
        "structured_process",
        "risk_awareness",
        "professional_judgment",
    ] {
        assert_eq!(evaluation[key], 50, "{key}");
    }
    assert_eq!(evaluation["recommendation"], "maybe");
    assert_eq!(evaluation["strengths"].as_array().unwrap().len(), 1);
    assert_eq!(evaluation["concerns"].as_array().unwrap().len(), 1);
    assert!(evaluation["summary"].as_str().unwrap().contains("manual review"));
}

#[tokio::test]
async fn interview_failure_falls_back_without_erroring() {
    let gateway = Arc::new(ScriptedGateway {
        fail_interview: true,
        ..Default::default()
    });
    let app = app(gateway);
    let (_, share_token) = create_job(&app, Uuid::new_v4()).await;
    let app_id = apply(&app, &share_token).await;

    let (status, opening) = send(&app, "POST", &format!("/api/public/applications/{}/start", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opening["stage"], "introduction");

    let (status, turn) = send(
        &app,
        "POST",
        &format!("/api/public/applications/{}/messages", app_id),
        None,
        Some(json!({"content": "I would triage by impact"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["stage"], "questioning");
    assert!(!turn["reply"]["content"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_submission_is_left_unscored() {
    let gateway = Arc::new(ScriptedGateway::default());
    let app = app(gateway.clone());
    let owner = Uuid::new_v4();
    let (_, share_token) = create_job(&app, owner).await;
    let app_id = apply(&app, &share_token).await;

    let (status, submitted) = send(&app, "POST", &format!("/api/public/applications/{}/submit", app_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "submitted");
    assert_eq!(gateway.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

    let token = recruiter_token(owner);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/recruiter/applications/{}/evaluate", app_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_candidate_input_is_rejected() {
    let app = app(Arc::new(ScriptedGateway::default()));
    let (_, share_token) = create_job(&app, Uuid::new_v4()).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/jobs/{}/applications", share_token),
        None,
        Some(json!({"candidate_name": "Sam", "candidate_email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/public/jobs/does-not-exist/applications",
        None,
        Some(json!({"candidate_name": "Sam", "candidate_email": "sam@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let app_id = apply(&app, &share_token).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/applications/{}/messages", app_id),
        None,
        Some(json!({"content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/public/applications/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn question_budget_cap_when_enforced() {
    let app = app_with_policy(
        Arc::new(ScriptedGateway::default()),
        InterviewPolicy {
            enforce_question_budget: true,
        },
    );
    let (_, share_token) = create_job(&app, Uuid::new_v4()).await;
    let app_id = apply(&app, &share_token).await;
    let uri = format!("/api/public/applications/{}/messages", app_id);

    for answer in ["one", "two", "three"] {
        let (status, _) = send(&app, "POST", &uri, None, Some(json!({"content": answer}))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, "POST", &uri, None, Some(json!({"content": "four"}))).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn concurrent_turn_for_same_application_is_refused() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let gateway = Arc::new(ScriptedGateway {
        gate: Some((entered.clone(), release.clone())),
        ..Default::default()
    });
    let app = app(gateway);
    let (_, share_token) = create_job(&app, Uuid::new_v4()).await;
    let app_id = apply(&app, &share_token).await;
    let uri = format!("/api/public/applications/{}/messages", app_id);

    let first = {
        let app = app.clone();
        let uri = uri.clone();
        tokio::spawn(async move { send(&app, "POST", &uri, None, Some(json!({"content": "first"}))).await })
    };
    entered.notified().await;

    let (status, _) = send(&app, "POST", &uri, None, Some(json!({"content": "second"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    release.notify_one();
    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let (_, transcript) = send(&app, "GET", &format!("/api/public/applications/{}", app_id), None, None).await;
    let contents: Vec<_> = transcript["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0], "first");
}
