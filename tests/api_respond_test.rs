//! Integration tests for the invitee response endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{TestApp, body_to_json, test_app};

    /// Creates an event spanning two days and returns the app with one
    /// invitee's token
    async fn invited() -> (TestApp, i64, String) {
        let app = test_app().await;
        let organizer = app.organizer("org@example.com").await;
        app.create_event(
            organizer,
            "2024-06-01T09:00",
            "2024-06-02T12:00",
            &["guest@example.com"],
        )
        .await;
        let token = app.token_for("guest@example.com").await;
        (app, organizer, token)
    }

    /// Tests the response page data includes the slot grid
    #[tokio::test]
    async fn it_returns_the_slot_grid() {
        let (app, _, token) = invited().await;

        let response = app.get(&format!("/api/respond/{}", token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;

        assert_eq!(body["event"]["title"], "Team Offsite");
        assert_eq!(body["invitee"]["email"], "guest@example.com");
        assert_eq!(body["invitee"]["status"], "pending");
        assert_eq!(body["selected_slots"], json!([]));

        let days = body["time_slots"].as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["label"], "2024-06-01 (Sat)");
        assert_eq!(days[1]["label"], "2024-06-02 (Sun)");
        let slots = days[0]["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0]["value"], "2024-06-01T09:00:00");
        assert_eq!(slots[0]["display"], "09:00");
        assert_eq!(slots[2]["display"], "11:00");
    }

    /// Tests unknown tokens return 404
    #[tokio::test]
    async fn it_returns_404_for_unknown_tokens() {
        let (app, _, _) = invited().await;

        let response = app.get("/api/respond/not-a-token", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .post_json(
                "/api/respond/not-a-token",
                None,
                json!({"action": "decline"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests attending again replaces the earlier selection
    #[tokio::test]
    async fn it_replaces_slots_on_resubmission() {
        let (app, _, token) = invited().await;
        let uri = format!("/api/respond/{}", token);

        let response = app
            .post_json(
                &uri,
                None,
                json!({
                    "action": "attend",
                    "available_slots": ["2024-06-01T09:00", "2024-06-01T10:00"],
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["accepted"], true);
        assert_eq!(body["status"], "attending");

        let response = app
            .post_json(
                &uri,
                None,
                json!({
                    "action": "attend",
                    "available_slots": ["2024-06-02T11:00", "2024-06-02T11:00"],
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.get(&uri, None).await;
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["invitee"]["status"], "attending");
        assert_eq!(body["selected_slots"], json!(["2024-06-02T11:00:00"]));
    }

    /// Tests declining is recorded and repeating it is harmless
    #[tokio::test]
    async fn it_records_declines() {
        let (app, _, token) = invited().await;
        let uri = format!("/api/respond/{}", token);

        for _ in 0..2 {
            let response = app
                .post_json(&uri, None, json!({"action": "decline"}))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_to_json(response.into_body()).await;
            assert_eq!(body["accepted"], true);
            assert_eq!(body["status"], "declined");
        }

        // Declined invitees cannot come back as attending
        let response = app
            .post_json(
                &uri,
                None,
                json!({"action": "attend", "available_slots": ["2024-06-01T09:00"]}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    /// Tests unrecognized actions change nothing
    #[tokio::test]
    async fn it_ignores_unknown_actions() {
        let (app, _, token) = invited().await;
        let uri = format!("/api/respond/{}", token);

        let response = app
            .post_json(&uri, None, json!({"action": "maybe"}))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["accepted"], false);
        assert_eq!(body["status"], "pending");
    }

    /// Tests slots outside the grid are rejected and nothing is stored
    #[tokio::test]
    async fn it_rejects_slots_off_the_grid() {
        let (app, _, token) = invited().await;
        let uri = format!("/api/respond/{}", token);

        for slot in ["2024-06-01T15:00", "2024-06-01T09:30", "2024-06-03T09:00", "soon"] {
            let response = app
                .post_json(
                    &uri,
                    None,
                    json!({"action": "attend", "available_slots": ["2024-06-01T09:00", slot]}),
                )
                .await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }

        let response = app.get(&uri, None).await;
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["invitee"]["status"], "pending");
        assert_eq!(body["selected_slots"], json!([]));
    }

    /// Tests responses are closed once the event is confirmed
    #[tokio::test]
    async fn it_rejects_responses_after_confirmation() {
        let (app, organizer, token) = invited().await;
        let uri = format!("/api/respond/{}", token);
        app.post_json(
            &uri,
            None,
            json!({"action": "attend", "available_slots": ["2024-06-01T10:00"]}),
        )
        .await;

        let response = app
            .post_json(
                "/api/events/1/finalize",
                Some(organizer),
                json!({"final_datetime": "2024-06-01T10:00"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .post_json(&uri, None, json!({"action": "decline"}))
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
